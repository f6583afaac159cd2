mod envelope;
mod schema;
mod workers_ai;

pub use schema::*;
pub use workers_ai::*;
