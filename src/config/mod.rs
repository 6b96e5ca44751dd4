//! Configuration loaded from `config.toml`.

pub mod settings;

pub use settings::{RelockPolicy, Settings};
