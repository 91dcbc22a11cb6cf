mod ledger;
mod operation;
mod record;

pub use ledger::*;
pub use operation::*;
pub use record::*;
