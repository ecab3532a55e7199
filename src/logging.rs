//! Tracing subscriber and Sentry setup.
//!
//! Log lines put the target before span context:
//! `2026-01-15T08:30:00.123Z  INFO flightdesk::web: request{id=1a2b3c4d}: message`

use std::fmt;
use std::io::IsTerminal;

use chrono::Utc;
use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

/// Event formatter that writes `timestamp LEVEL target: spans: message`
pub struct TargetFirstFormat {
    ansi: bool,
}

impl TargetFirstFormat {
    pub fn new(ansi: bool) -> Self {
        Self { ansi }
    }

    fn level_color(level: &tracing::Level) -> &'static str {
        match *level {
            tracing::Level::ERROR => "\x1b[31m",
            tracing::Level::WARN => "\x1b[33m",
            tracing::Level::INFO => "\x1b[32m",
            tracing::Level::DEBUG => "\x1b[34m",
            tracing::Level::TRACE => "\x1b[35m",
        }
    }
}

impl<S, N> FormatEvent<S, N> for TargetFirstFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let level = metadata.level();

        write!(writer, "{} ", Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"))?;
        if self.ansi {
            write!(writer, "{}{:>5}\x1b[0m ", Self::level_color(level), level)?;
        } else {
            write!(writer, "{:>5} ", level)?;
        }
        write!(writer, "{}: ", metadata.target())?;

        if let Some(scope) = ctx.event_scope() {
            let spans: Vec<String> = scope
                .from_root()
                .map(|span| {
                    let extensions = span.extensions();
                    match extensions.get::<tracing_subscriber::fmt::FormattedFields<N>>() {
                        Some(fields) if !fields.is_empty() => {
                            format!("{}{{{}}}", span.name(), fields)
                        }
                        _ => span.name().to_string(),
                    }
                })
                .collect();
            if !spans.is_empty() {
                write!(writer, "{}: ", spans.join(":"))?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
///
/// When Sentry is enabled, error events are forwarded to it as well.
pub fn init_tracing(sentry_enabled: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .event_format(TargetFirstFormat::new(std::io::stdout().is_terminal()));

    let registry = tracing_subscriber::registry().with(filter).with(fmt_layer);
    let result = if sentry_enabled {
        registry.with(sentry_tracing::layer()).try_init()
    } else {
        registry.try_init()
    };

    // Tests and repeated CLI calls may already have a subscriber
    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Start Sentry when a DSN is configured. Keep the guard alive for the
/// lifetime of the process so queued events are flushed on exit.
pub fn init_sentry(config: &Config) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(config.environment.clone().into()),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    guard.is_enabled().then_some(guard)
}
