//! Server configuration.
//!
//! Parsing lives in `pulseboard-core` so integration tests can build a
//! config without the server binary; `state` and `main` import it from here.
pub use pulseboard_core::config::Config;
