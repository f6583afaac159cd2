mod client;
mod key;
mod r2;
mod types;

pub use client::*;
pub use key::object_key;
pub use r2::R2Store;
pub use types::*;
