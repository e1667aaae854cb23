pub mod config;
pub mod ledger;
pub mod sync;
pub mod watch;
