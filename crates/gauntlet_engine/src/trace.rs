//! Trace output configuration.
//!
//! The engine logs through the `tracing` facade and never installs a
//! subscriber on its own. Embedders with their own subscriber setup
//! need nothing from this module; binaries and tests can use
//! [`TraceConfig`] to get a formatted subscriber on stderr with one
//! call.
//!
//! # Example
//!
//! ```
//! use gauntlet_engine::trace::{TraceConfig, TraceFormat};
//! use tracing::Level;
//!
//! TraceConfig::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TraceFormat::Compact)
//!     .init();
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ─────────────────────────────────────────────────────────────────────────────
// TraceFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Trace output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraceFormat {
    /// Human-readable multi-line output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TraceConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for the trace subscriber.
///
/// # Configuration Options
///
/// ```
/// use gauntlet_engine::trace::{TraceConfig, TraceFormat};
/// use tracing::Level;
///
/// // Development: readable output with span enter/exit events
/// let dev = TraceConfig::new()
///     .with_level(Level::DEBUG)
///     .with_span_events(true);
///
/// // CI: JSON output, per-target levels
/// let ci = TraceConfig::new()
///     .with_format(TraceFormat::Json)
///     .with_env_filter("gauntlet_engine=debug,rayon=warn");
/// ```
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Maximum log level.
    level: Level,
    /// Output format.
    format: TraceFormat,
    /// Environment filter (e.g., "gauntlet_engine=debug,rayon=warn").
    env_filter: Option<String>,
    /// Whether to include span events (enter/exit).
    span_events: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TraceFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TraceConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TraceFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a custom environment filter string.
    ///
    /// Format: `target=level,target=level,...`. An unparsable filter
    /// falls back to the configured level.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Installs the global subscriber.
    ///
    /// Safe to call more than once: if a subscriber is already
    /// installed, the call leaves it in place.
    pub fn init(&self) {
        let env_filter = match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        };

        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        // try_init().ok() ignores errors if already initialized.
        match self.format {
            TraceFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_span_events(span_events),
                    )
                    .try_init()
                    .ok();
            }
            TraceFormat::Compact => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_span_events(span_events),
                    )
                    .try_init()
                    .ok();
            }
            TraceFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_span_events(span_events),
                    )
                    .try_init()
                    .ok();
            }
        }

        tracing::debug!(
            level = %self.level,
            format = ?self.format,
            "trace output initialized"
        );
    }
}
