pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod metadata;
pub mod placer;
pub mod reconcile;
pub mod scanner;
pub mod similarity;
pub mod storage;

pub use config::AppConfig;
pub use engine::{ReconcileEngine, RunSummary};
pub use error::Error;
