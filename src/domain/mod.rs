mod budget;
mod ledger;
mod money;
mod month;
mod transaction;

pub use budget::*;
pub use ledger::*;
pub use money::*;
pub use month::*;
pub use transaction::*;
