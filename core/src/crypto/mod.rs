
pub mod types;
pub mod kdf;
pub mod mac;
pub mod cipher;
pub mod ledger;

pub use types::*;
pub use kdf::*;
pub use mac::*;
pub use cipher::*;
pub use ledger::*;
