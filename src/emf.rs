//! # EMF
//!
//! Helpers for serializing CloudWatch Embedded Metrics via serde_json
//!
//! <https://docs.aws.amazon.com/AmazonCloudWatch/latest/monitoring/CloudWatch_Embedded_Metric_Format_Specification.html>

use super::Unit;
use serde::Serialize;

/// Key the metadata object is written under in every document
pub const AWS_KEY: &str = "_aws";

/// Namespace used until a directive is given its own
pub const DEFAULT_NAMESPACE: &str = "aws-embedded-metrics";

/// Ordered group of dimension keys, the values live in the document itself
pub type DimensionSet = Vec<String>;

/// A dimension key and the value written for it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dimension {
    pub key: String,
    pub value: String,
}

impl Dimension {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for Dimension {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

#[derive(Serialize)]
pub struct Metadata<'a> {
    #[serde(rename = "Timestamp")]
    pub timestamp: i64,
    #[serde(rename = "CloudWatchMetrics")]
    pub cloudwatch_metrics: Vec<&'a MetricDirective>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricDirective {
    #[serde(rename = "Namespace")]
    pub namespace: String,
    #[serde(rename = "Dimensions")]
    pub dimensions: Vec<DimensionSet>,
    #[serde(rename = "Metrics")]
    pub metrics: Vec<MetricDefinition>,
}

impl Default for MetricDirective {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            dimensions: Vec::new(),
            metrics: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricDefinition {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Unit")]
    #[serde(skip_serializing_if = "Unit::is_none")]
    pub unit: Unit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata() {
        let mut directive = MetricDirective {
            namespace: "GameServerMetrics".to_string(),
            dimensions: vec![vec!["Address".to_string(), "Port".to_string()]],
            metrics: Vec::new(),
        };

        directive.metrics.push(MetricDefinition {
            name: "FrameTime".to_string(),
            unit: Unit::Milliseconds,
        });
        directive.metrics.push(MetricDefinition {
            name: "CpuUsage".to_string(),
            unit: Unit::Percent,
        });
        directive.metrics.push(MetricDefinition {
            name: "Players".to_string(),
            unit: Unit::None,
        });

        let metadata = Metadata {
            timestamp: 1687394207903,
            cloudwatch_metrics: vec![&directive],
        };

        assert_eq!(
            serde_json::to_string(&metadata).unwrap(),
            r#"{"Timestamp":1687394207903,"CloudWatchMetrics":[{"Namespace":"GameServerMetrics","Dimensions":[["Address","Port"]],"Metrics":[{"Name":"FrameTime","Unit":"Milliseconds"},{"Name":"CpuUsage","Unit":"Percent"},{"Name":"Players"}]}]}"#
        );
    }

    #[test]
    fn empty_directive() {
        assert_eq!(
            serde_json::to_string(&MetricDirective::default()).unwrap(),
            r#"{"Namespace":"aws-embedded-metrics","Dimensions":[],"Metrics":[]}"#
        );
    }

    #[test]
    fn dimension_from_tuple() {
        assert_eq!(Dimension::from(("a", "b")), Dimension::new("a", String::from("b")));
    }
}
