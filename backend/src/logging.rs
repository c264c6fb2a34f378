use tracing::{Event, Subscriber};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, EnvFilter, Layer, Registry};

const DEFAULT_FILTER: &str = "warn,backend=info,shared=info";

#[derive(Default)]
struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0.push_str(&format!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.0.push_str(value);
        }
    }
}

struct DrawLogLayer;

impl<S: Subscriber> Layer<S> for DrawLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if visitor.0.is_empty() {
            return;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        match *metadata.level() {
            tracing::Level::ERROR => eprintln!("[{}] ❌ Error: {} - {}", timestamp, metadata.target(), visitor.0),
            tracing::Level::WARN => println!("[{}] ⚠️ Warning: {} - {}", timestamp, metadata.target(), visitor.0),
            tracing::Level::INFO => println!("[{}] ℹ️ {} - {}", timestamp, metadata.target(), visitor.0),
            // per-frame chatter only from the engine itself
            tracing::Level::DEBUG if metadata.target().starts_with("shared") => {
                println!("[{}] 🔄 {} - {}", timestamp, metadata.target(), visitor.0)
            }
            _ => {}
        }
    }
}

/// Installs the global subscriber. `log` records from the shared crate are
/// bridged into it. Calling this twice is harmless.
pub fn setup() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = Registry::default()
        .with(env_filter)
        .with(DrawLogLayer)
        .try_init();
    if installed.is_err() {
        tracing::debug!("Logging already initialised");
    }
}
