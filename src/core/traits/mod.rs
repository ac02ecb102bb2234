mod ledger;

pub use ledger::{LedgerStore, StudentLedger};
