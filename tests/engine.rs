//! Swap engine tests over a scripted chain client.

use alloy::{
    consensus::{Transaction, TxEnvelope},
    eips::Decodable2718,
    primitives::{Address, Bytes, TxHash, U256},
    rpc::json_rpc::ErrorPayload,
    sol_types::SolCall,
    transports::RpcError,
};
use async_trait::async_trait;
use desk::{
    chain::{ChainClient, ReceiptOutcome, Result as ChainResult},
    config::DeskConfig,
    error::{StepError, SwapError},
    swap::{SwapEngine, Stage},
    types::{
        SellAmount, Wallet,
        contracts::{exactInputSingleCall, withdrawCall},
    },
};
use rust_decimal::dec;
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

const BLOCK_TIMESTAMP: u64 = 1_700_000_000;

/// A broadcast transaction, decoded for assertions.
#[derive(Debug, Clone)]
struct SentTx {
    hash: TxHash,
    nonce: u64,
    to: Address,
    value: U256,
    input: Bytes,
}

/// Scripted [`ChainClient`]: static balances, receipt outcomes by broadcast
/// order, and an account nonce derived from the number of broadcasts.
#[derive(Default)]
struct MockChain {
    base_nonce: u64,
    nonce_reads: AtomicU64,
    balances: Mutex<HashMap<(Address, Address), U256>>,
    broadcasts: Mutex<Vec<SentTx>>,
    outcomes: Mutex<VecDeque<ReceiptOutcome>>,
    fail_broadcast_at: Mutex<Option<usize>>,
}

impl MockChain {
    fn with_balance(self, token: Address, owner: Address, balance: U256) -> Self {
        self.balances.lock().unwrap().insert((token, owner), balance);
        self
    }

    fn with_outcomes(self, outcomes: impl IntoIterator<Item = ReceiptOutcome>) -> Self {
        self.outcomes.lock().unwrap().extend(outcomes);
        self
    }

    fn sent(&self) -> Vec<SentTx> {
        self.broadcasts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn transaction_count(&self, _address: Address) -> ChainResult<u64> {
        self.nonce_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.base_nonce + self.broadcasts.lock().unwrap().len() as u64)
    }

    async fn native_balance(&self, _address: Address) -> ChainResult<U256> {
        Ok(U256::ZERO)
    }

    async fn erc20_balance(&self, token: Address, owner: Address) -> ChainResult<U256> {
        Ok(self.balances.lock().unwrap().get(&(token, owner)).copied().unwrap_or_default())
    }

    async fn latest_block_timestamp(&self) -> ChainResult<u64> {
        Ok(BLOCK_TIMESTAMP)
    }

    async fn send_raw_transaction(&self, encoded: &[u8]) -> ChainResult<TxHash> {
        {
            let mut fail_at = self.fail_broadcast_at.lock().unwrap();
            if *fail_at == Some(self.broadcasts.lock().unwrap().len()) {
                *fail_at = None;
                return Err(RpcError::ErrorResp(ErrorPayload {
                    code: -32000,
                    message: "nonce too low".into(),
                    data: None,
                }));
            }
        }

        let envelope = TxEnvelope::decode_2718(&mut &encoded[..]).expect("valid raw transaction");
        let sent = SentTx {
            hash: *envelope.tx_hash(),
            nonce: envelope.nonce(),
            to: envelope.to().expect("all steps are calls"),
            value: envelope.value(),
            input: envelope.input().clone(),
        };
        let hash = sent.hash;
        self.broadcasts.lock().unwrap().push(sent);
        Ok(hash)
    }

    async fn wait_for_receipt(
        &self,
        _tx_hash: TxHash,
        _timeout: Duration,
    ) -> ChainResult<ReceiptOutcome> {
        Ok(self.outcomes.lock().unwrap().pop_front().unwrap_or(ReceiptOutcome::Confirmed))
    }
}

fn test_config() -> DeskConfig {
    let mut config = DeskConfig::default();
    config.fees.recipient = Address::repeat_byte(0xfe);
    config
}

fn engine_over(chain: Arc<MockChain>) -> SwapEngine {
    SwapEngine::new(chain, test_config())
}

const TOKEN: Address = Address::repeat_byte(0x70);

const TENTH_ETH_FEE: u128 = 1_000_000_000_000_000; // 1% of 0.10
const TENTH_ETH_NET: u128 = 99_000_000_000_000_000;

#[tokio::test]
async fn buy_runs_four_steps_with_sequential_nonces() {
    let config = test_config();
    let wallet = Wallet::random(1);

    let chain = Arc::new(
        MockChain { base_nonce: 7, ..Default::default() }
            .with_balance(
                config.contracts.wrapped_native,
                wallet.address,
                U256::from(TENTH_ETH_NET),
            )
            .with_balance(config.contracts.trading_token, wallet.address, U256::from(4321u64)),
    );

    let tx_hash =
        engine_over(chain.clone()).buy(&wallet, TOKEN, dec!(0.10), None).await.unwrap();

    let sent = chain.sent();
    assert_eq!(sent.len(), 4);
    assert_eq!(chain.nonce_reads.load(Ordering::SeqCst), 1);
    assert_eq!(sent.iter().map(|tx| tx.nonce).collect::<Vec<_>>(), vec![7, 8, 9, 10]);
    assert_eq!(tx_hash, sent[3].hash);

    // Fee transfer: 1% of 0.10 ETH to the fee recipient.
    assert_eq!(sent[0].to, config.fees.recipient);
    assert_eq!(sent[0].value, U256::from(TENTH_ETH_FEE));
    assert!(sent[0].input.is_empty());

    // Wrap: the net amount into WETH.
    assert_eq!(sent[1].to, config.contracts.wrapped_native);
    assert_eq!(sent[1].value, U256::from(TENTH_ETH_NET));

    // First hop: the full net amount, WETH -> trading asset.
    let swap = exactInputSingleCall::abi_decode(&sent[2].input).unwrap();
    assert_eq!(sent[2].to, config.contracts.router);
    assert_eq!(swap.params.tokenIn, config.contracts.wrapped_native);
    assert_eq!(swap.params.tokenOut, config.contracts.trading_token);
    assert_eq!(swap.params.amountIn, U256::from(TENTH_ETH_NET));
    assert_eq!(swap.params.recipient, wallet.address);
    assert_eq!(swap.params.deadline, U256::from(BLOCK_TIMESTAMP + 600));
    assert_eq!(swap.params.amountOutMinimum, U256::ONE);

    // Second hop consumes the full trading-asset balance.
    let swap = exactInputSingleCall::abi_decode(&sent[3].input).unwrap();
    assert_eq!(swap.params.tokenIn, config.contracts.trading_token);
    assert_eq!(swap.params.tokenOut, TOKEN);
    assert_eq!(swap.params.amountIn, U256::from(4321u64));
}

#[tokio::test]
async fn buy_aborting_at_wrap_reports_one_confirmed_step() {
    let wallet = Wallet::random(1);
    let chain = Arc::new(
        MockChain::default()
            .with_outcomes([ReceiptOutcome::Confirmed, ReceiptOutcome::Reverted]),
    );

    let err = engine_over(chain.clone()).buy(&wallet, TOKEN, dec!(0.10), None).await.unwrap_err();

    match err {
        SwapError::Aborted { stage, confirmed, cause } => {
            assert_eq!(stage, Stage::Wrap);
            assert_eq!(confirmed.len(), 1);
            assert_eq!(confirmed[0].stage, Stage::FeeTransfer);
            assert!(matches!(cause, StepError::Reverted { .. }));
        }
        other => panic!("expected abort at wrap, got {other:?}"),
    }
    // No router swap was attempted.
    assert_eq!(chain.sent().len(), 2);
}

#[tokio::test]
async fn receipt_timeout_is_not_reported_as_revert() {
    let wallet = Wallet::random(1);
    let chain = Arc::new(
        MockChain::default()
            .with_outcomes([ReceiptOutcome::Confirmed, ReceiptOutcome::TimedOut]),
    );

    let err = engine_over(chain).buy(&wallet, TOKEN, dec!(0.10), None).await.unwrap_err();

    match err {
        SwapError::Aborted { stage, cause, .. } => {
            assert_eq!(stage, Stage::Wrap);
            assert!(matches!(cause, StepError::Timeout { .. }));
        }
        other => panic!("expected timeout abort, got {other:?}"),
    }
}

#[tokio::test]
async fn non_positive_buy_amount_is_rejected_before_any_work() {
    let wallet = Wallet::random(1);
    let chain = Arc::new(MockChain::default());

    let err = engine_over(chain.clone()).buy(&wallet, TOKEN, dec!(0), None).await.unwrap_err();

    assert!(matches!(err, SwapError::InvalidAmount(_)));
    assert!(chain.sent().is_empty());
    assert_eq!(chain.nonce_reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sell_runs_two_hops_and_unwraps_the_full_wrapped_balance() {
    let config = test_config();
    let wallet = Wallet::random(1);
    let balance = U256::from(1000u64);
    let virtual_out = U256::from(777u64);
    let weth_out = U256::from(555u64);

    let chain = Arc::new(
        MockChain::default()
            .with_balance(TOKEN, wallet.address, balance)
            .with_balance(config.contracts.trading_token, wallet.address, virtual_out)
            .with_balance(config.contracts.wrapped_native, wallet.address, weth_out),
    );

    let tx_hash = engine_over(chain.clone())
        .sell(&wallet, TOKEN, SellAmount::Percentage(100), None)
        .await
        .unwrap();

    let sent = chain.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(
        sent.iter().map(|tx| tx.nonce).collect::<Vec<_>>(),
        vec![0, 1, 2],
    );
    assert_eq!(tx_hash, sent[2].hash);

    // Percentage(100) resolves to the full balance.
    let swap = exactInputSingleCall::abi_decode(&sent[0].input).unwrap();
    assert_eq!(swap.params.tokenIn, TOKEN);
    assert_eq!(swap.params.amountIn, balance);

    // The middle hop consumes the full trading-asset balance.
    let swap = exactInputSingleCall::abi_decode(&sent[1].input).unwrap();
    assert_eq!(swap.params.tokenIn, config.contracts.trading_token);
    assert_eq!(swap.params.amountIn, virtual_out);

    // The unwrap withdraws the wrapped balance read right before the step.
    let withdraw = withdrawCall::abi_decode(&sent[2].input).unwrap();
    assert_eq!(sent[2].to, config.contracts.wrapped_native);
    assert_eq!(withdraw.wad, weth_out);
}

#[tokio::test]
async fn percentage_sell_floors_the_amount() {
    let wallet = Wallet::random(1);
    let chain = Arc::new(
        MockChain::default()
            .with_balance(TOKEN, wallet.address, U256::from(999u64))
            .with_balance(test_config().contracts.trading_token, wallet.address, U256::ONE)
            .with_balance(test_config().contracts.wrapped_native, wallet.address, U256::ONE),
    );

    engine_over(chain.clone())
        .sell(&wallet, TOKEN, SellAmount::Percentage(25), None)
        .await
        .unwrap();

    let swap = exactInputSingleCall::abi_decode(&chain.sent()[0].input).unwrap();
    // floor(999 * 25 / 100)
    assert_eq!(swap.params.amountIn, U256::from(249u64));
}

#[tokio::test]
async fn empty_positions_fail_before_any_transaction_is_built() {
    let wallet = Wallet::random(1);

    for amount in [SellAmount::Percentage(100), SellAmount::Percentage(0), SellAmount::Initials] {
        let chain = Arc::new(MockChain::default());
        let err =
            engine_over(chain.clone()).sell(&wallet, TOKEN, amount, None).await.unwrap_err();

        assert!(matches!(err, SwapError::NoPositionFound { token } if token == TOKEN));
        assert!(chain.sent().is_empty());
        assert_eq!(chain.nonce_reads.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn initials_sell_uses_the_recorded_investment() {
    let config = test_config();
    let mut wallet = Wallet::random(1);
    wallet.initial_investment = Some(U256::from(500u64));

    let chain = Arc::new(
        MockChain::default()
            .with_balance(TOKEN, wallet.address, U256::from(10_000u64))
            .with_balance(config.contracts.trading_token, wallet.address, U256::ONE)
            .with_balance(config.contracts.wrapped_native, wallet.address, U256::ONE),
    );

    engine_over(chain.clone())
        .sell(&wallet, TOKEN, SellAmount::Initials, None)
        .await
        .unwrap();

    let swap = exactInputSingleCall::abi_decode(&chain.sent()[0].input).unwrap();
    assert_eq!(swap.params.amountIn, U256::from(500u64));
}

#[tokio::test]
async fn literal_sell_exceeding_the_balance_aborts_before_broadcast() {
    let wallet = Wallet::random(1);
    let chain = Arc::new(MockChain::default().with_balance(TOKEN, wallet.address, U256::from(50u64)));

    let err = engine_over(chain.clone())
        .sell(&wallet, TOKEN, SellAmount::Literal(U256::from(100u64)), None)
        .await
        .unwrap_err();

    match err {
        SwapError::Aborted { confirmed, cause, .. } => {
            assert!(confirmed.is_empty());
            assert!(matches!(cause, StepError::InsufficientBalance { .. }));
        }
        other => panic!("expected insufficient balance, got {other:?}"),
    }
    assert!(chain.sent().is_empty());
}

#[tokio::test]
async fn nonce_conflicts_surface_without_retry() {
    let wallet = Wallet::random(1);
    let chain = Arc::new(MockChain::default());
    *chain.fail_broadcast_at.lock().unwrap() = Some(1);

    let err = engine_over(chain.clone()).buy(&wallet, TOKEN, dec!(0.10), None).await.unwrap_err();

    match err {
        SwapError::Aborted { stage, cause, .. } => {
            assert_eq!(stage, Stage::Wrap);
            assert!(matches!(cause, StepError::NonceConflict { nonce: 1, .. }));
        }
        other => panic!("expected nonce conflict, got {other:?}"),
    }
    // The fee transfer went out; nothing was rebroadcast after the conflict.
    assert_eq!(chain.sent().len(), 1);
}

#[tokio::test]
async fn concurrent_sells_for_one_wallet_serialize() {
    let config = test_config();
    let wallet = Wallet::random(1);

    let chain = Arc::new(
        MockChain::default()
            .with_balance(TOKEN, wallet.address, U256::from(1000u64))
            .with_balance(config.contracts.trading_token, wallet.address, U256::ONE)
            .with_balance(config.contracts.wrapped_native, wallet.address, U256::ONE),
    );
    let engine = engine_over(chain.clone());

    let (first, second) = tokio::join!(
        engine.sell(&wallet, TOKEN, SellAmount::Percentage(25), None),
        engine.sell(&wallet, TOKEN, SellAmount::Percentage(25), None),
    );
    first.unwrap();
    second.unwrap();

    // The second flow observed the nonce state produced by the first instead
    // of racing it: six broadcasts, strictly sequential nonces, one nonce
    // seed per flow.
    let nonces = chain.sent().iter().map(|tx| tx.nonce).collect::<Vec<_>>();
    assert_eq!(nonces, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(chain.nonce_reads.load(Ordering::SeqCst), 2);
}
