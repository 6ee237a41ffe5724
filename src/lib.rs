//! Gate.io ladder orders
//!
//! Spreads a buy or sell amount over a range of limit (or price-triggered)
//! orders on a Gate.io spot pair, and reports open and filled orders.

pub mod config;
pub mod error;
pub mod exchange;
pub mod gateio;
pub mod ladder;
pub mod math;
pub mod prompt;
pub mod report;
pub mod types;
pub mod workflow;

pub use config::{Action, LadderArgs, LadderConfig};
pub use error::{GatewayError, LadderError};
pub use exchange::Exchange;
pub use types::*;
pub use workflow::{run, RunOutcome};
