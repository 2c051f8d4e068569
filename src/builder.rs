use super::{Environment, Logger};
use serde_json::value::{Map, Value};
use std::io::{Stdout, Write};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Builder for the embedded metrics [Logger]
///
/// Every option may be given more than once, the last one wins.
///
/// # Example
/// ```
///  let mut logger = cloudwatch_emf_logger::Builder::new()
///      .with_writer(std::io::stderr())
///      .without_dimensions()
///      .build();
///
///  logger.namespace("MyApplication").metric("requests", 1).log();
/// ```
pub struct Builder<W = Stdout> {
    writer: W,
    timestamp: Option<i64>,
    without_dimensions: bool,
    environment: Option<Environment>,
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            writer: std::io::stdout(),
            timestamp: None,
            without_dimensions: false,
            environment: None,
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Shorthand for [Builder::new]
    pub fn builder() -> Builder {
        Builder::new()
    }
}

impl<W: Write> Builder<W> {
    /// Sets where documents are written, defaults to stdout
    pub fn with_writer<T: Write>(self, writer: T) -> Builder<T> {
        Builder {
            writer,
            timestamp: self.timestamp,
            without_dimensions: self.without_dimensions,
            environment: self.environment,
        }
    }

    /// Sets a fixed timestamp, truncated to whole milliseconds
    /// * Defaults to the time [Builder::build] is called
    pub fn with_timestamp(self, timestamp: SystemTime) -> Self {
        self.with_timestamp_millis(unix_millis(timestamp))
    }

    /// Sets a fixed timestamp in milliseconds since the epoch
    pub fn with_timestamp_millis(self, timestamp: i64) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..self
        }
    }

    /// Ignores the default AWS Lambda properties and dimensions
    /// * A sampled trace id is still recorded
    pub fn without_dimensions(mut self) -> Self {
        self.without_dimensions = true;
        self
    }

    /// Uses the given ambient signals instead of reading the process environment
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Consume the builder into a [Logger], reading the process environment unless
    /// [Builder::with_environment] was given
    pub fn build(self) -> Logger<W> {
        let timestamp = self.timestamp.unwrap_or_else(|| unix_millis(SystemTime::now()));
        let environment = self.environment.unwrap_or_else(Environment::from_env);

        let mut values = Map::new();
        let mut service_name = None;

        if !self.without_dimensions {
            if let Some(function_name) = &environment.function_name {
                debug!("Lambda function {function_name} detected, adding default properties and dimensions");

                let mut insert = |key: &str, value: &Option<String>| {
                    values.insert(key.to_string(), Value::String(value.clone().unwrap_or_default()));
                };
                insert("executionEnvironment", &environment.execution_env);
                insert("memorySize", &environment.memory_size);
                insert("functionVersion", &environment.function_version);
                insert("logStreamId", &environment.log_stream_name);

                service_name = Some(function_name.clone());
            }
        }

        // Only collect traces which have been sampled
        if let Some(trace_id) = environment.sampled_trace_id() {
            values.insert("traceId".to_string(), Value::String(trace_id.to_string()));
        }

        Logger::from_parts(self.writer, timestamp, values, service_name)
    }
}

/// Milliseconds since the epoch, negative before it, saturating at the range of i64
fn unix_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => i64::try_from(since.as_millis()).unwrap_or(i64::MAX),
        Err(err) => i64::try_from(err.duration().as_millis())
            .map(|millis| -millis)
            .unwrap_or(i64::MIN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn timestamp_truncates_to_millis() {
        let time = UNIX_EPOCH + Duration::from_nanos(1_687_657_545_423_999_999);
        let logger = Builder::new()
            .with_writer(Vec::new())
            .with_environment(Environment::default())
            .with_timestamp(time)
            .build();

        assert_eq!(logger.timestamp(), 1687657545423);
    }

    #[test]
    fn timestamp_before_epoch() {
        assert_eq!(unix_millis(UNIX_EPOCH - Duration::from_millis(1500)), -1500);
    }

    #[test]
    fn timestamp_saturates() {
        if let Some(far_future) = UNIX_EPOCH.checked_add(Duration::from_secs(u64::MAX / 4)) {
            assert_eq!(unix_millis(far_future), i64::MAX);
        }

        if let Some(far_past) = UNIX_EPOCH.checked_sub(Duration::from_secs(u64::MAX / 4)) {
            assert_eq!(unix_millis(far_past), i64::MIN);
        }
    }

    #[test]
    fn last_option_wins() {
        let logger = Builder::new()
            .with_timestamp_millis(1)
            .with_environment(Environment {
                function_name: Some("first".to_string()),
                ..Default::default()
            })
            .with_writer(Vec::new())
            .with_timestamp_millis(2)
            .with_environment(Environment::default())
            .build();

        assert_eq!(logger.timestamp(), 2);
        assert!(logger.values().is_empty());
    }

    #[test]
    fn default_timestamp_is_build_time() {
        let before = unix_millis(SystemTime::now());
        let logger = Builder::new()
            .with_writer(Vec::new())
            .with_environment(Environment::default())
            .build();
        let after = unix_millis(SystemTime::now());

        assert!(before <= logger.timestamp() && logger.timestamp() <= after);
    }
}
