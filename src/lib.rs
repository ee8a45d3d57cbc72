pub mod cli;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod logging;
pub mod password;
pub mod snapshot;

pub use codec::{Codec, CodecOptions, Format};
pub use errors::{CodecError, Result};
pub use password::Password;
pub use snapshot::FinancialSnapshot;
