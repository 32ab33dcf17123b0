//! Request cancellation module.
//!
//! This module provides [`CancellationToken`] which is threaded through every
//! layer of a send operation (sender, verb, transport). The core only passes
//! the token along; honoring it is up to the response-producing callback.

use async_channel::{Receiver, Sender};

/// Cloneable cancellation signal.
///
/// All clones observe the same state. Cancellation is one-way: once
/// [`cancel`] was called the token stays cancelled.
///
/// [`cancel`]: CancellationToken::cancel
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancel_tx: Sender<()>,
    cancel_rx: Receiver<()>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    /// Create a token which is not cancelled.
    pub fn new() -> Self {
        let (cancel_tx, cancel_rx) = async_channel::bounded(1);
        Self {
            cancel_tx,
            cancel_rx,
        }
    }

    /// Signal cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.cancel_tx.close();
    }

    /// Whether [`cancel`] was called on this token or one of its clones.
    ///
    /// [`cancel`]: CancellationToken::cancel
    pub fn is_cancelled(&self) -> bool {
        self.cancel_rx.is_closed()
    }

    /// Wait until the token is cancelled.
    pub async fn cancelled(&self) {
        // Nothing is ever sent, so `recv` only returns once the channel closes.
        while self.cancel_rx.recv().await.is_ok() {}
    }
}
