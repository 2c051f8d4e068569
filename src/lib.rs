//! # cloudwatch_emf_logger
//!
//! Builds log lines in the CloudWatch Embedded Metric Format so metrics can be extracted
//! straight from log output.
//!
//! <https://docs.aws.amazon.com/AmazonCloudWatch/latest/monitoring/CloudWatch_Embedded_Metric_Format_Specification.html>
//!
//! # Example
//! ```
//! use cloudwatch_emf_logger::{Logger, Unit};
//!
//! let mut logger = Logger::builder()
//!     .with_writer(Vec::new())
//!     .with_timestamp_millis(1687657545423)
//!     .without_dimensions()
//!     .build();
//!
//! logger.dimension("Operation", "Checkout").metric("Orders", 1);
//! logger.new_context().namespace("Payments").metric_as("Latency", 42, Unit::Milliseconds);
//! logger.log();
//!
//! let output = String::from_utf8(logger.into_inner()).unwrap();
//! assert!(output.ends_with('\n'));
//! ```

pub use {
    builder::Builder,
    emf::{Dimension, DimensionSet},
    environment::Environment,
    logger::{Context, Logger},
    unit::Unit,
};

mod builder;
mod emf;
mod environment;
mod logger;
mod unit;

/// Errors surfaced by the fallible entry points of this crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to serialize embedded metrics document: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write embedded metrics document: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown CloudWatch unit: {0}")]
    UnknownUnit(String),
}
