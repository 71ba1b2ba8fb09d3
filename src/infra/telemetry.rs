use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing::Subscriber;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install the global subscriber. Fails if one is already installed.
///
/// `RUST_LOG` directives refine the configured base level.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default())
        .with(output_layer(logging.format))
        .try_init()
        .map_err(|err| InfraError::telemetry(err.to_string()))?;

    tracing::debug!(
        target: "presswire::telemetry",
        level = %logging.level,
        format = ?logging.format,
        "Tracing subscriber installed"
    );
    Ok(())
}

fn output_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    }
}

/// Register descriptions for the fetch cache counters. Safe to call repeatedly.
pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "presswire_fetch_cache_hit_total",
            Unit::Count,
            "Content API responses served from the fetch cache."
        );
        describe_counter!(
            "presswire_fetch_cache_miss_total",
            Unit::Count,
            "Fetch cache lookups that had to reach the content API."
        );
        describe_counter!(
            "presswire_fetch_cache_stale_total",
            Unit::Count,
            "Fetch cache entries dropped because their freshness window elapsed."
        );
        describe_counter!(
            "presswire_fetch_cache_evict_total",
            Unit::Count,
            "Fetch cache entries evicted due to capacity."
        );
        describe_counter!(
            "presswire_fetch_cache_invalidated_total",
            Unit::Count,
            "Fetch cache entries removed by tag revalidation."
        );
    });
}
