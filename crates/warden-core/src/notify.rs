use tracing::{info, warn};

/// Icon/severity of an operator popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Plain,
    Warning,
    Information,
}

/// Shows messages to the person at the machine.
///
/// Implementations must not block the caller until the message is
/// dismissed; reaction scripts keep running while a popup is open.
pub trait Notifier: Send + Sync {
    fn popup(&self, kind: MessageKind, text: &str);
}

/// Fallback notifier that writes popups to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn popup(&self, kind: MessageKind, text: &str) {
        match kind {
            MessageKind::Warning => warn!(popup = text),
            MessageKind::Plain | MessageKind::Information => info!(popup = text),
        }
    }
}
