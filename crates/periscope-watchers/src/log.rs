//! Log watcher - a `tracing` layer that mirrors application log records
//!
//! Records from this toolkit's own crates are skipped, otherwise capturing a
//! log would itself emit logs and loop.

use periscope_core::normalize::{self, RawLog};
use periscope_core::Recorder;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer};

/// Mirrors every application-level log record as a `log` event
pub struct LogWatcher {
    recorder: Recorder,
}

impl LogWatcher {
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }
}

impl<S: tracing::Subscriber> Layer<S> for LogWatcher {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target().starts_with("periscope") {
            return;
        }
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.recorder.record_at(
            normalize::log(RawLog {
                level: event.metadata().level().to_string(),
                message: visitor.message,
                context: visitor.fields,
            }),
            None,
        );
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn set(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.set(field, Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.set(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.set(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.set(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.set(field, Value::from(value));
    }
}
