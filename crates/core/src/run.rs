//! Host logging interface.
//!
//! The surrounding upload orchestration owns the channel that user-facing
//! messages travel on. The core only ever talks to it through [`RunLog`],
//! so a host can route messages to its own run object while the library's
//! internal diagnostics stay on `tracing`.

use std::sync::Mutex;
use tracing::info;

/// Symbolic codes for structured host logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCode {
    /// A file group was excluded because of disallowed extensions.
    InvalidExtensions,
    /// A file group was excluded and a target format was suggested.
    ConversionSuggested,
    /// A document conversion attempt failed; the original file passes through.
    ConversionFailed,
    /// One page of a document was converted to an image.
    PageConverted,
    /// A whole document was converted into per-page file groups.
    DocumentConverted,
}

/// Best-effort informational logging supplied by the host.
///
/// Implementations must tolerate being called zero or many times and must
/// not panic back into the core.
pub trait RunLog: Send + Sync {
    /// Emit one informational line.
    fn log_message(&self, text: &str);

    /// Structured variant carrying a symbolic code. Hosts that only have
    /// a plain text channel get the default forwarding behavior.
    fn log_message_with_code(&self, _code: LogCode, text: &str) {
        self.log_message(text);
    }
}

/// [`RunLog`] implementation that forwards to the `tracing` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRun;

impl RunLog for TracingRun {
    fn log_message(&self, text: &str) {
        info!("{}", text);
    }

    fn log_message_with_code(&self, code: LogCode, text: &str) {
        info!(code = ?code, "{}", text);
    }
}

/// [`RunLog`] implementation that collects messages in memory.
///
/// Useful for hosts that batch-report at the end of a run, and for
/// asserting on emitted messages in tests.
#[derive(Debug, Default)]
pub struct BufferedRun {
    messages: Mutex<Vec<String>>,
}

impl BufferedRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all messages logged so far, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("run log lock poisoned").clone()
    }

    /// Number of messages logged so far.
    pub fn len(&self) -> usize {
        self.messages.lock().expect("run log lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RunLog for BufferedRun {
    fn log_message(&self, text: &str) {
        self.messages
            .lock()
            .expect("run log lock poisoned")
            .push(text.to_string());
    }
}
