use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

/// Receives human-readable progress messages from the workflows and the
/// transfer engine.
pub trait LogSink {
    fn accept(&self, message: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str),
{
    fn accept(&self, message: &str) {
        self(message)
    }
}

// Forwards progress to the informational tracing stream
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn accept(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

// Keeps every message in memory
#[derive(Debug, Default)]
pub struct CapturingSink {
    messages: Mutex<Vec<String>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.lock().iter().any(|m| m.contains(needle))
    }
}

impl LogSink for CapturingSink {
    fn accept(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Keeps an already installed subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
