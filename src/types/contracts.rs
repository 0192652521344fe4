//! Contract interfaces of the fixed swap route.

use alloy::sol;

sol! {
    /// Parameters for a single-hop exact-input swap.
    #[derive(Debug)]
    struct ExactInputSingleParams {
        /// Asset being paid in.
        address tokenIn;
        /// Asset being bought.
        address tokenOut;
        /// Pool fee tier, in hundredths of a bip.
        uint24 fee;
        /// Receiver of the output asset.
        address recipient;
        /// Unix timestamp after which the swap is rejected.
        uint256 deadline;
        /// Exact input amount.
        uint256 amountIn;
        /// Minimum acceptable output amount.
        uint256 amountOutMinimum;
        /// Price bound for the pool; zero disables it.
        uint160 sqrtPriceLimitX96;
    }

    /// Swaps an exact input amount along a single pool.
    function exactInputSingle(ExactInputSingleParams calldata params) external payable returns (uint256 amountOut);

    /// Wraps the sent value into the wrapped native asset.
    function deposit() external payable;

    /// Unwraps `wad` of the wrapped native asset back into the native coin.
    function withdraw(uint256 wad) external;

    /// Returns the token balance of `owner`.
    function balanceOf(address owner) external view returns (uint256);
}
