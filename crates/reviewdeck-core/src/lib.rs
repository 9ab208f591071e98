pub mod backend;
pub mod config;
pub mod error;
pub mod feed;
pub mod review;
pub mod storage;

pub use config::AppConfig;
pub use error::{Error, Result};
