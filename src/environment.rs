//! # Environment
//!
//! Snapshot of the ambient AWS Lambda signals used to decorate every document

pub const AWS_LAMBDA_FUNCTION_NAME: &str = "AWS_LAMBDA_FUNCTION_NAME";
pub const AWS_EXECUTION_ENV: &str = "AWS_EXECUTION_ENV";
pub const AWS_LAMBDA_FUNCTION_MEMORY_SIZE: &str = "AWS_LAMBDA_FUNCTION_MEMORY_SIZE";
pub const AWS_LAMBDA_FUNCTION_VERSION: &str = "AWS_LAMBDA_FUNCTION_VERSION";
pub const AWS_LAMBDA_LOG_STREAM_NAME: &str = "AWS_LAMBDA_LOG_STREAM_NAME";
pub const X_AMZN_TRACE_ID: &str = "_X_AMZN_TRACE_ID";

/// Marker present in trace ids that X-Ray decided to sample
const SAMPLED: &str = "Sampled=1";

/// Ambient signals captured once when a [Logger](super::Logger) is built
///
/// Empty values are treated the same as missing ones.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    pub function_name: Option<String>,
    pub execution_env: Option<String>,
    pub memory_size: Option<String>,
    pub function_version: Option<String>,
    pub log_stream_name: Option<String>,
    pub trace_id: Option<String>,
}

impl Environment {
    /// Read the signals from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the signals from an arbitrary key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Self {
            function_name: read(AWS_LAMBDA_FUNCTION_NAME),
            execution_env: read(AWS_EXECUTION_ENV),
            memory_size: read(AWS_LAMBDA_FUNCTION_MEMORY_SIZE),
            function_version: read(AWS_LAMBDA_FUNCTION_VERSION),
            log_stream_name: read(AWS_LAMBDA_LOG_STREAM_NAME),
            trace_id: read(X_AMZN_TRACE_ID),
        }
    }

    /// The trace id, only if it was sampled
    pub fn sampled_trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref().filter(|trace_id| trace_id.contains(SAMPLED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn from_lookup() {
        let vars = HashMap::from([
            (AWS_LAMBDA_FUNCTION_NAME, "some-func-name"),
            (AWS_EXECUTION_ENV, ""),
            (AWS_LAMBDA_FUNCTION_MEMORY_SIZE, "128"),
        ]);
        let env = Environment::from_lookup(|key| vars.get(key).map(|value| value.to_string()));

        assert_eq!(env.function_name.as_deref(), Some("some-func-name"));
        assert_eq!(env.execution_env, None);
        assert_eq!(env.memory_size.as_deref(), Some("128"));
        assert_eq!(env.trace_id, None);
    }

    #[test]
    fn sampled_trace_id() {
        let mut env = Environment {
            trace_id: Some("Root=1-5759e988;Sampled=1".to_string()),
            ..Default::default()
        };
        assert_eq!(env.sampled_trace_id(), Some("Root=1-5759e988;Sampled=1"));

        env.trace_id = Some("Root=1-5759e988;Sampled=0".to_string());
        assert_eq!(env.sampled_trace_id(), None);
    }
}
