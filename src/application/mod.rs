mod error;
mod ledger;
mod service;

pub use error::*;
pub use ledger::{DEFAULT_MAX_LOOKBACK_MONTHS, LedgerBuilder};
pub use service::*;
