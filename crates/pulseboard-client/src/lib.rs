pub mod api;
pub mod cache;
pub mod config;
pub mod fallback;
pub mod policy;
pub mod refresh;
pub mod resolver;

pub use api::{ApiError, DashboardApi, FailureClass, HttpApi};
pub use cache::{DashboardCache, DataSource, DemoMode, Domain, Resolved};
pub use config::{ClientConfig, FallbackMode};
pub use refresh::RefreshScheduler;
pub use resolver::Resolver;
