pub mod cloudflare;
pub mod config;
pub mod error;
pub mod server;
pub mod storage;

pub use error::{Error, Result};
