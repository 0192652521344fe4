//! Swap orchestration: turning one intent into a sequence of dependent
//! on-chain transactions.

mod engine;
pub use engine::SwapEngine;

mod executor;
pub use executor::{StepExecutor, TransactionRecord};

mod metrics;
pub use metrics::SwapMetrics;

mod plan;
pub use plan::{Stage, StepAmount, StepPlan, StepSpec};
