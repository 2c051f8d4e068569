use cloudwatch_emf_logger::{Logger, Unit};
use std::time::Instant;
use tracing::info;

fn handle_request(logger: &mut Logger, method: &str) {
    let started = Instant::now();

    info!("Handling {method} request");

    logger
        .dimension("Method", method)
        .property("RequestId", "4bd2d365-3792-46c8-9b6c-6132f9630fbb")
        .metric_as("requests", 1, Unit::Count);

    logger
        .new_context()
        .namespace("MetricsTest/Latency")
        .dimension_set([("Method", method), ("Region", "us-east-1")])
        .metric_float_as("latency", started.elapsed().as_secs_f64() * 1000.0, Unit::Milliseconds);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_target(false)
        .without_time()
        .compact()
        .with_writer(std::io::stderr)
        .init();

    // Picks up AWS_LAMBDA_FUNCTION_NAME and friends when running inside Lambda
    let mut logger = Logger::builder().build();
    logger.namespace("MetricsTest");

    handle_request(&mut logger, "Default");

    logger.log();
}
