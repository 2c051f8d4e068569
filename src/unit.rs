//! CloudWatch metric units
//!
//! <https://docs.aws.amazon.com/AmazonCloudWatch/latest/APIReference/API_MetricDatum.html>

use super::Error;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unit attached to a metric definition
///
/// [Unit::None] is the default and leaves the `Unit` field out of the document entirely
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Unit {
    #[default]
    None,
    Seconds,
    Microseconds,
    Milliseconds,
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
    Terabytes,
    Bits,
    Kilobits,
    Megabits,
    Gigabits,
    Terabits,
    Percent,
    Count,
    BytesPerSecond,
    KilobytesPerSecond,
    MegabytesPerSecond,
    GigabytesPerSecond,
    TerabytesPerSecond,
    BitsPerSecond,
    KilobitsPerSecond,
    MegabitsPerSecond,
    GigabitsPerSecond,
    TerabitsPerSecond,
    CountPerSecond,
}

impl Unit {
    const ALL: [Unit; 27] = [
        Unit::None,
        Unit::Seconds,
        Unit::Microseconds,
        Unit::Milliseconds,
        Unit::Bytes,
        Unit::Kilobytes,
        Unit::Megabytes,
        Unit::Gigabytes,
        Unit::Terabytes,
        Unit::Bits,
        Unit::Kilobits,
        Unit::Megabits,
        Unit::Gigabits,
        Unit::Terabits,
        Unit::Percent,
        Unit::Count,
        Unit::BytesPerSecond,
        Unit::KilobytesPerSecond,
        Unit::MegabytesPerSecond,
        Unit::GigabytesPerSecond,
        Unit::TerabytesPerSecond,
        Unit::BitsPerSecond,
        Unit::KilobitsPerSecond,
        Unit::MegabitsPerSecond,
        Unit::GigabitsPerSecond,
        Unit::TerabitsPerSecond,
        Unit::CountPerSecond,
    ];

    /// The CloudWatch label for this unit
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::None => "None",
            Unit::Seconds => "Seconds",
            Unit::Microseconds => "Microseconds",
            Unit::Milliseconds => "Milliseconds",
            Unit::Bytes => "Bytes",
            Unit::Kilobytes => "Kilobytes",
            Unit::Megabytes => "Megabytes",
            Unit::Gigabytes => "Gigabytes",
            Unit::Terabytes => "Terabytes",
            Unit::Bits => "Bits",
            Unit::Kilobits => "Kilobits",
            Unit::Megabits => "Megabits",
            Unit::Gigabits => "Gigabits",
            Unit::Terabits => "Terabits",
            Unit::Percent => "Percent",
            Unit::Count => "Count",
            Unit::BytesPerSecond => "Bytes/Second",
            Unit::KilobytesPerSecond => "Kilobytes/Second",
            Unit::MegabytesPerSecond => "Megabytes/Second",
            Unit::GigabytesPerSecond => "Gigabytes/Second",
            Unit::TerabytesPerSecond => "Terabytes/Second",
            Unit::BitsPerSecond => "Bits/Second",
            Unit::KilobitsPerSecond => "Kilobits/Second",
            Unit::MegabitsPerSecond => "Megabits/Second",
            Unit::GigabitsPerSecond => "Gigabits/Second",
            Unit::TerabitsPerSecond => "Terabits/Second",
            Unit::CountPerSecond => "Count/Second",
        }
    }

    /// True for the placeholder unit that is left out of serialized metric definitions
    pub fn is_none(&self) -> bool {
        *self == Unit::None
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::ALL
            .iter()
            .find(|unit| unit.as_str() == s)
            .copied()
            .ok_or_else(|| Error::UnknownUnit(s.to_string()))
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Convert a metrics::Unit into the closest CloudWatch unit
impl From<metrics::Unit> for Unit {
    fn from(unit: metrics::Unit) -> Self {
        match unit {
            metrics::Unit::Count => Unit::Count,
            metrics::Unit::Percent => Unit::Percent,
            metrics::Unit::Seconds => Unit::Seconds,
            metrics::Unit::Milliseconds => Unit::Milliseconds,
            metrics::Unit::Microseconds => Unit::Microseconds,
            // CloudWatch has no nanosecond unit
            metrics::Unit::Nanoseconds => Unit::None,
            metrics::Unit::Tebibytes => Unit::Terabytes,
            metrics::Unit::Gibibytes => Unit::Gigabytes,
            metrics::Unit::Mebibytes => Unit::Megabytes,
            metrics::Unit::Kibibytes => Unit::Kilobytes,
            metrics::Unit::Bytes => Unit::Bytes,
            metrics::Unit::TerabitsPerSecond => Unit::TerabitsPerSecond,
            metrics::Unit::GigabitsPerSecond => Unit::GigabitsPerSecond,
            metrics::Unit::MegabitsPerSecond => Unit::MegabitsPerSecond,
            metrics::Unit::KilobitsPerSecond => Unit::KilobitsPerSecond,
            metrics::Unit::BitsPerSecond => Unit::BitsPerSecond,
            metrics::Unit::CountPerSecond => Unit::CountPerSecond,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_every_label() {
        for unit in Unit::ALL {
            assert_eq!(unit.as_str().parse::<Unit>().unwrap(), unit);
        }
    }

    #[test]
    fn parse_unknown_label() {
        let err = "Parsecs".parse::<Unit>().unwrap_err();
        assert!(matches!(err, Error::UnknownUnit(ref label) if label == "Parsecs"));
    }

    #[test]
    fn serializes_as_label() {
        assert_eq!(serde_json::to_string(&Unit::BytesPerSecond).unwrap(), r#""Bytes/Second""#);
        assert_eq!(Unit::CountPerSecond.to_string(), "Count/Second");
    }

    #[test]
    fn from_metrics_unit() {
        assert_eq!(Unit::from(metrics::Unit::Kibibytes), Unit::Kilobytes);
        assert_eq!(Unit::from(metrics::Unit::CountPerSecond), Unit::CountPerSecond);
        assert_eq!(Unit::from(metrics::Unit::Nanoseconds), Unit::None);
    }
}
