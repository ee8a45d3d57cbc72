//! Project-level configuration (`.finvault.toml`).

pub mod settings;

pub use settings::Settings;
