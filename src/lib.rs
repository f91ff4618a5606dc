pub mod config;
pub mod order_log;
pub mod parser;
pub mod query;
pub mod report;
pub mod types;

pub use order_log::{IngestError, OrderLog};
pub use query::OrderLogQueryEngine;
