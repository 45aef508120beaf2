pub mod check;
pub mod config;
pub mod engine;
pub mod flow;
pub mod limits;
pub mod model;
pub mod normalize;
pub mod observability;

pub use engine::{
    Engine, EngineError, TierPolicy, compute_quote, compute_risk_warning, deposit_remainder,
    filter_blocking_reservations, max_consecutive_run,
};
