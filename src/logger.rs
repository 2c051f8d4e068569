//! # Logger
//!
//! Accumulates metrics, dimensions and properties, then writes them out as a single
//! embedded metrics document returned from [Builder](super::Builder)

use super::emf::{self, Dimension, MetricDefinition, MetricDirective};
use super::{Error, Unit};
use serde_json::value::{Map, Value};
use std::io::{Stdout, Write};
use tracing::{debug, error};

const SERVICE_NAME: &str = "ServiceName";
const SERVICE_TYPE: &str = "ServiceType";
const LAMBDA_SERVICE_TYPE: &str = "AWS::Lambda::Function";

/// Embedded metrics document builder + emitter
///
/// Use [Builder](super::Builder) to construct
///
/// # Example
/// ```
/// let mut logger = cloudwatch_emf_logger::Logger::builder()
///     .with_writer(Vec::new())
///     .build();
///
/// logger
///     .namespace("MyApplication")
///     .dimension("Method", "Default")
///     .property("RequestId", "ABC123")
///     .metric("requests", 1)
///     .log();
/// ```
pub struct Logger<W = Stdout> {
    writer: W,
    timestamp: i64,
    default_directive: MetricDirective,
    directives: Vec<MetricDirective>,
    /// Values for every metric, dimension and property across all directives
    values: Map<String, Value>,
    /// Function name when Lambda defaults are enabled and detected
    service_name: Option<String>,
}

impl<W: Write> Logger<W> {
    pub(crate) fn from_parts(
        writer: W,
        timestamp: i64,
        values: Map<String, Value>,
        service_name: Option<String>,
    ) -> Self {
        let mut logger = Self {
            writer,
            timestamp,
            default_directive: MetricDirective::default(),
            directives: Vec::new(),
            values,
            service_name,
        };
        if let Some(service_name) = logger.service_name.as_deref() {
            Context {
                directive: &mut logger.default_directive,
                values: &mut logger.values,
            }
            .service_dimensions(service_name);
        }
        logger
    }

    /// Sets the namespace of the default directive
    pub fn namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.default_context().namespace(namespace);
        self
    }

    /// Set a property to emit with the metrics
    /// * Properties are shared by every directive and persist across log calls
    /// * Setting a property, dimension or metric with the same name overwrites the previous value
    pub fn property(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), Value::String(value.into()));
        self
    }

    /// Adds a single dimension set on the default directive
    pub fn dimension(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.default_context().dimension(key, value);
        self
    }

    /// Adds a dimension set made of all the given dimensions, in order, on the default directive
    pub fn dimension_set<I, D>(&mut self, dimensions: I) -> &mut Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Dimension>,
    {
        self.default_context().dimension_set(dimensions);
        self
    }

    /// Puts an integer metric on the default directive
    pub fn metric(&mut self, name: impl Into<String>, value: i64) -> &mut Self {
        self.default_context().metric(name, value);
        self
    }

    /// Puts a float metric on the default directive
    pub fn metric_float(&mut self, name: impl Into<String>, value: f64) -> &mut Self {
        self.default_context().metric_float(name, value);
        self
    }

    /// Puts an integer metric with a unit on the default directive
    pub fn metric_as(&mut self, name: impl Into<String>, value: i64, unit: Unit) -> &mut Self {
        self.default_context().metric_as(name, value, unit);
        self
    }

    /// Puts a float metric with a unit on the default directive
    pub fn metric_float_as(&mut self, name: impl Into<String>, value: f64, unit: Unit) -> &mut Self {
        self.default_context().metric_float_as(name, value, unit);
        self
    }

    /// Puts all of the integer metrics on the default directive, see [Context::metrics]
    pub fn metrics<I, K>(&mut self, metrics: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        self.default_context().metrics(metrics);
        self
    }

    /// Puts all of the integer metrics with a unit on the default directive
    pub fn metrics_as<I, K>(&mut self, metrics: I, unit: Unit) -> &mut Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        self.default_context().metrics_as(metrics, unit);
        self
    }

    /// Puts all of the float metrics on the default directive
    pub fn metrics_float<I, K>(&mut self, metrics: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        self.default_context().metrics_float(metrics);
        self
    }

    /// Puts all of the float metrics with a unit on the default directive
    pub fn metrics_float_as<I, K>(&mut self, metrics: I, unit: Unit) -> &mut Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        self.default_context().metrics_float_as(metrics, unit);
        self
    }

    /// Creates another directive sharing this logger's values and returns a handle to it
    ///
    /// The new directive starts with the default namespace and, like the default directive,
    /// the Lambda service dimensions when those are enabled.
    pub fn new_context(&mut self) -> Context<'_> {
        self.directives.push(MetricDirective::default());
        let index = self.directives.len() - 1;
        let service_name = self.service_name.as_deref();

        let mut context = Context {
            directive: &mut self.directives[index],
            values: &mut self.values,
        };
        if let Some(service_name) = service_name {
            context.service_dimensions(service_name);
        }
        context
    }

    /// Handle to the default directive
    pub fn default_context(&mut self) -> Context<'_> {
        Context {
            directive: &mut self.default_directive,
            values: &mut self.values,
        }
    }

    /// Handle to a directive created by [Logger::new_context], numbered from zero in creation order
    pub fn context(&mut self, index: usize) -> Option<Context<'_>> {
        let directive = self.directives.get_mut(index)?;
        Some(Context {
            directive,
            values: &mut self.values,
        })
    }

    /// Number of directives created by [Logger::new_context]
    pub fn context_count(&self) -> usize {
        self.directives.len()
    }

    /// Milliseconds since the epoch written with every document
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Every value written so far, in insertion order
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// The writer documents are written to
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Mutable access to the writer documents are written to
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consume the logger, returning its writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write every directive holding at least one metric as a single line
    ///
    /// Nothing is written when no directive holds a metric. Failures are logged and dropped,
    /// use [Logger::try_log] to observe them.
    pub fn log(&mut self) {
        if let Err(err) = self.try_log() {
            error!("Failed to write embedded metrics document: {err}");
        }
    }

    /// Same as [Logger::log] but returns serialization and write failures
    pub fn try_log(&mut self) -> Result<(), Error> {
        let cloudwatch_metrics: Vec<&MetricDirective> = std::iter::once(&self.default_directive)
            .chain(&self.directives)
            .filter(|directive| !directive.metrics.is_empty())
            .collect();

        // Skip if we have no data to flush
        if cloudwatch_metrics.is_empty() {
            debug!("No metrics to log, skipping embedded metrics document");
            return Ok(());
        }

        let aws = serde_json::to_value(emf::Metadata {
            timestamp: self.timestamp,
            cloudwatch_metrics,
        })?;
        // Always the last key of the document
        self.values.shift_remove(emf::AWS_KEY);
        self.values.insert(emf::AWS_KEY.to_string(), aws);

        let mut line = serde_json::to_vec(&self.values)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Handle to one directive of a [Logger]
///
/// Each directive becomes its own entry of `CloudWatchMetrics`, while values are written to
/// the document shared by the whole logger. Only the logger can emit.
pub struct Context<'a> {
    directive: &'a mut MetricDirective,
    values: &'a mut Map<String, Value>,
}

impl Context<'_> {
    /// Sets the namespace of this directive
    pub fn namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.directive.namespace = namespace.into();
        self
    }

    /// Adds a single dimension set
    pub fn dimension(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        self.values.insert(key.clone(), Value::String(value.into()));
        self.directive.dimensions.push(vec![key]);
        self
    }

    /// Adds a dimension set made of all the given dimensions, in order
    /// * An empty iterator adds an empty dimension set
    pub fn dimension_set<I, D>(&mut self, dimensions: I) -> &mut Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Dimension>,
    {
        let mut set = Vec::new();
        for dimension in dimensions {
            let Dimension { key, value } = dimension.into();
            self.values.insert(key.clone(), Value::String(value));
            set.push(key);
        }
        self.directive.dimensions.push(set);
        self
    }

    /// Puts an integer metric
    pub fn metric(&mut self, name: impl Into<String>, value: i64) -> &mut Self {
        self.put(name.into(), value.into(), Unit::None)
    }

    /// Puts a float metric
    pub fn metric_float(&mut self, name: impl Into<String>, value: f64) -> &mut Self {
        self.put(name.into(), value.into(), Unit::None)
    }

    /// Puts an integer metric with a unit
    pub fn metric_as(&mut self, name: impl Into<String>, value: i64, unit: Unit) -> &mut Self {
        self.put(name.into(), value.into(), unit)
    }

    /// Puts a float metric with a unit
    pub fn metric_float_as(&mut self, name: impl Into<String>, value: f64, unit: Unit) -> &mut Self {
        self.put(name.into(), value.into(), unit)
    }

    /// Puts all of the integer metrics
    ///
    /// Metrics are added in lexicographic order of their names so the document does not depend
    /// on the iteration order of the source collection.
    pub fn metrics<I, K>(&mut self, metrics: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        self.metrics_as(metrics, Unit::None)
    }

    /// Puts all of the integer metrics with a unit, see [Context::metrics]
    pub fn metrics_as<I, K>(&mut self, metrics: I, unit: Unit) -> &mut Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        for (name, value) in sorted(metrics) {
            self.put(name, value.into(), unit);
        }
        self
    }

    /// Puts all of the float metrics, see [Context::metrics]
    pub fn metrics_float<I, K>(&mut self, metrics: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        self.metrics_float_as(metrics, Unit::None)
    }

    /// Puts all of the float metrics with a unit, see [Context::metrics]
    pub fn metrics_float_as<I, K>(&mut self, metrics: I, unit: Unit) -> &mut Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        for (name, value) in sorted(metrics) {
            self.put(name, value.into(), unit);
        }
        self
    }

    /// Lambda service dimensions, rewriting the same values is harmless
    fn service_dimensions(&mut self, service_name: &str) {
        self.directive
            .dimensions
            .push(vec![SERVICE_NAME.to_string(), SERVICE_TYPE.to_string()]);
        self.values
            .insert(SERVICE_TYPE.to_string(), Value::String(LAMBDA_SERVICE_TYPE.to_string()));
        self.values
            .insert(SERVICE_NAME.to_string(), Value::String(service_name.to_string()));
    }

    // The only way to declare a metric, so every definition has a value
    fn put(&mut self, name: String, value: Value, unit: Unit) -> &mut Self {
        self.values.insert(name.clone(), value);
        self.directive.metrics.push(MetricDefinition { name, unit });
        self
    }
}

fn sorted<I, K, V>(entries: I) -> Vec<(String, V)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
{
    let mut entries: Vec<(String, V)> = entries.into_iter().map(|(name, value)| (name.into(), value)).collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}
