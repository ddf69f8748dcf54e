//! Tracing setup.
//!
//! The terminal is in the alternate screen while the dream runs, so events go
//! to an optional log file and into a small in-memory console that the HUD
//! shows.

use crate::config::Config;
use anyhow::Context as _;
use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::fs::File;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tfmt, EnvFilter};

pub const LOG_ENV: &str = "PAPRIKA_LOG";
const CONSOLE_CAPACITY: usize = 64;

/// Bounded line buffer; the oldest line is evicted when full.
#[derive(Debug, Clone)]
pub struct LogRing {
    lines: VecDeque<String>,
    capacity: usize,
    total: usize,
}

impl LogRing {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.total = self.total.saturating_add(1);
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines ever pushed, evicted ones included.
    pub fn total_count(&self) -> usize {
        self.total
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    /// Up to `n` most recent lines, oldest first.
    pub fn recent(&self, n: usize) -> Vec<String> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).cloned().collect()
    }
}

/// Shared handle to the in-app console.
#[derive(Debug, Clone)]
pub struct Console {
    ring: Arc<Mutex<LogRing>>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new(CONSOLE_CAPACITY)
    }
}

impl Console {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Arc::new(Mutex::new(LogRing::new(capacity))),
        }
    }

    pub fn layer(&self) -> ConsoleLayer {
        ConsoleLayer {
            ring: Arc::clone(&self.ring),
        }
    }

    pub fn last(&self) -> Option<String> {
        self.ring.lock().ok()?.last().map(str::to_string)
    }

    pub fn recent(&self, n: usize) -> Vec<String> {
        self.ring.lock().map(|r| r.recent(n)).unwrap_or_default()
    }

    pub fn total_count(&self) -> usize {
        self.ring.lock().map(|r| r.total_count()).unwrap_or(0)
    }
}

/// Records every event's message (and fields) into the console ring.
pub struct ConsoleLayer {
    ring: Arc<Mutex<LogRing>>,
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        if let Ok(mut ring) = self.ring.lock() {
            ring.push(visitor.finish());
        }
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields
        } else {
            format!("{} {}", self.message, self.fields)
        }
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.record_debug(field, &value);
        }
    }

    // f32 fields arrive widened; print them as they were written.
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push_field(field.name(), &compact_f64(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
            return;
        }
        self.push_field(field.name(), &format!("{value:?}"));
    }
}

impl LineVisitor {
    fn push_field(&mut self, name: &str, value: &str) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

/// Six decimals at most, trailing zeros dropped.
fn compact_f64(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    let s = format!("{v:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn build_filter(directive: Option<&str>) -> anyhow::Result<EnvFilter> {
    match directive {
        Some(d) => EnvFilter::try_new(d).with_context(|| format!("invalid log filter {d:?}")),
        None => Ok(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))),
    }
}

/// Installs the global subscriber and returns the console it feeds.
pub fn init(cfg: &Config) -> anyhow::Result<Console> {
    let console = Console::default();
    let filter = build_filter(cfg.log_level.as_deref())?;

    let file_layer = match cfg.log_file.as_deref() {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("create log file {path}"))?;
            Some(
                tfmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console.layer())
        .try_init()
        .context("install tracing subscriber")?;

    Ok(console)
}
