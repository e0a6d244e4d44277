mod catalog;
mod ledger;
mod money;
mod subscription;
mod wallet;

pub use catalog::*;
pub use ledger::*;
pub use money::*;
pub use subscription::*;
pub use wallet::*;
