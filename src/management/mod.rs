mod ledger;

pub use ledger::DownloadLedger;
pub use ledger::LedgerManager;
