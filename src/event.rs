//! Log events under construction.
//!
//! The logger never talks to `tracing` directly. It asks an [`EventFactory`]
//! for a fresh [`Event`] at the target level, attaches the configured string
//! fields, and finalizes it with the formatted message. Swapping the factories
//! redirects output anywhere, which is also how tests observe emissions.

use std::fmt;
use std::sync::Arc;

use tracing::Level;

/// Target used for events emitted by [`TracingEvent`].
pub const TARGET: &str = "sea_orm_logger";

/// A single log line under construction.
///
/// `str` consumes and returns the event so a set of fields can be folded onto
/// it without intermediate bindings. `msgf` consumes it for good: an event is
/// sent exactly once.
pub trait Event {
    /// Attach a string key/value pair.
    fn str(self: Box<Self>, key: &str, value: &str) -> Box<dyn Event>;

    /// Format the message and send the event.
    fn msgf(self: Box<Self>, args: fmt::Arguments<'_>);
}

/// Builds a fresh [`Event`] for one log line.
pub type EventFactory = Arc<dyn Fn() -> Box<dyn Event> + Send + Sync>;

/// Wrap a closure as an [`EventFactory`].
pub fn factory<F>(f: F) -> EventFactory
where
    F: Fn() -> Box<dyn Event> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Default event backed by the global `tracing` dispatcher.
#[derive(Debug, Clone)]
pub struct TracingEvent {
    level: Level,
    fields: Vec<(String, String)>,
}

impl TracingEvent {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            fields: Vec::new(),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

impl Event for TracingEvent {
    fn str(mut self: Box<Self>, key: &str, value: &str) -> Box<dyn Event> {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some(field) => field.1 = value.to_string(),
            None => self.fields.push((key.to_string(), value.to_string())),
        }
        self
    }

    fn msgf(self: Box<Self>, args: fmt::Arguments<'_>) {
        let fields = Fields(&self.fields);

        // tracing needs the level at compile time
        match self.level {
            Level::ERROR => tracing::error!(target: TARGET, fields = %fields, "{}", args),
            Level::WARN => tracing::warn!(target: TARGET, fields = %fields, "{}", args),
            Level::INFO => tracing::info!(target: TARGET, fields = %fields, "{}", args),
            Level::DEBUG => tracing::debug!(target: TARGET, fields = %fields, "{}", args),
            _ => tracing::trace!(target: TARGET, fields = %fields, "{}", args),
        }
    }
}

/// Renders attached fields as `key=value` pairs sorted by key.
struct Fields<'a>(&'a [(String, String)]);

impl fmt::Display for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sorted: Vec<_> = self.0.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        for (i, (key, value)) in sorted.into_iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// New info-level event on the global dispatcher.
pub fn new_info_event() -> Box<dyn Event> {
    Box::new(TracingEvent::new(Level::INFO))
}

/// New warn-level event on the global dispatcher.
pub fn new_warn_event() -> Box<dyn Event> {
    Box::new(TracingEvent::new(Level::WARN))
}

/// New error-level event on the global dispatcher.
pub fn new_error_event() -> Box<dyn Event> {
    Box::new(TracingEvent::new(Level::ERROR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tracing::field::{Field, Visit};
    use tracing::Subscriber;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    #[derive(Debug, Default, Clone)]
    struct Captured {
        level: Option<Level>,
        target: String,
        message: String,
        fields: String,
    }

    struct CaptureLayer(Arc<Mutex<Vec<Captured>>>);

    struct CaptureVisitor<'a>(&'a mut Captured);

    impl Visit for CaptureVisitor<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            match field.name() {
                "message" => self.0.message = format!("{:?}", value),
                "fields" => self.0.fields = format!("{:?}", value),
                _ => {}
            }
        }
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut captured = Captured {
                level: Some(*event.metadata().level()),
                target: event.metadata().target().to_string(),
                ..Default::default()
            };
            event.record(&mut CaptureVisitor(&mut captured));
            self.0.lock().unwrap().push(captured);
        }
    }

    fn capture<F: FnOnce()>(f: F) -> Vec<Captured> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(CaptureLayer(events.clone()));
        tracing::subscriber::with_default(subscriber, f);
        let captured = events.lock().unwrap().clone();
        captured
    }

    #[test]
    fn test_str_chains_and_overwrites() {
        let event = Box::new(TracingEvent::new(Level::INFO));
        let event = event.str("a", "1").str("b", "2").str("a", "3");
        // finalize to make sure the chained event is still usable
        let captured = capture(|| event.msgf(format_args!("done")));
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].fields, "a=3 b=2");
    }

    #[test]
    fn test_default_events_emit_at_their_level() {
        let captured = capture(|| {
            new_info_event().msgf(format_args!("info {}", 1));
            new_warn_event().msgf(format_args!("warn {}", 2));
            new_error_event()
                .str("request_id", "abc")
                .msgf(format_args!("error {:.3}ms", 1.5));
        });

        assert_eq!(captured.len(), 3);
        assert_eq!(captured[0].level, Some(Level::INFO));
        assert_eq!(captured[0].message, "info 1");
        assert_eq!(captured[1].level, Some(Level::WARN));
        assert_eq!(captured[1].message, "warn 2");
        assert_eq!(captured[2].level, Some(Level::ERROR));
        assert_eq!(captured[2].message, "error 1.500ms");
        assert_eq!(captured[2].fields, "request_id=abc");
        assert!(captured.iter().all(|c| c.target == TARGET));
    }

    #[test]
    fn test_fields_render_sorted() {
        let fields = vec![
            ("zone".to_string(), "eu".to_string()),
            ("app".to_string(), "api".to_string()),
        ];
        assert_eq!(Fields(&fields).to_string(), "app=api zone=eu");
        assert_eq!(Fields(&[]).to_string(), "");
    }
}
