pub mod config;
pub mod derive;
pub mod error;
pub mod export;
pub mod metrics;
pub mod store;
pub mod view;
