//! User-facing notices.
//!
//! Cart failures are reported to the shopper as short transient messages.
//! A [`Notifier`] decides where they go: the log, or a channel drained by
//! whatever renders the UI.

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A transient message for the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// Adding a product failed (catalog lookup or storage write).
    ProductAddFailed,
    /// Removing a product failed.
    ProductRemovalFailed,
    /// The requested amount is above the stock ceiling.
    InsufficientStock,
    /// Changing a line amount failed (stock lookup, invalid amount, storage write).
    AmountChangeFailed,
}

impl Notice {
    /// Text shown to the shopper (pt-BR, matching the storefront).
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::ProductAddFailed => "Erro na adição do produto",
            Self::ProductRemovalFailed => "Erro na remoção do produto",
            Self::InsufficientStock => "Quantidade solicitada fora de estoque",
            Self::AmountChangeFailed => "Erro na alteração de quantidade do produto",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Sink for notices.
pub trait Notifier: Send + Sync {
    /// Surface `notice` to the shopper.
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log at `WARN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        warn!(notice = ?notice, "{}", notice.message());
    }
}

/// Forwards notices over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver its notices arrive on.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if self.sender.send(notice).is_err() {
            debug!(notice = ?notice, "Notice receiver dropped");
        }
    }
}
