//! Bounded per-connection outbound mailbox.
//!
//! Any number of `MailboxSender`s (the owning connection, every room it has
//! joined, server-side push) feed one `Mailbox`, drained by the outbound pump.
//! Delivery never blocks: a full mailbox is reported to the caller, who decides
//! between dropping the message and closing the mailbox.
//!
//! Closing is a signal separate from dropping senders, because rooms keep their
//! sender clones after evicting a member. Messages already buffered at close
//! time are still drained; after that `recv` yields `None`.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::realtime::types::PreparedMsg;

/// Why a non-blocking delivery failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliverError {
    /// The consumer is not draining fast enough.
    Full,
    /// The mailbox was closed (connection is being torn down).
    Closed,
}

pub fn mailbox(capacity: usize) -> (MailboxSender, Mailbox) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let (closed_tx, closed_rx) = watch::channel(false);
    (
        MailboxSender {
            tx,
            closed: Arc::new(closed_tx),
        },
        Mailbox {
            rx,
            closed: closed_rx,
        },
    )
}

#[derive(Clone)]
pub struct MailboxSender {
    tx: mpsc::Sender<PreparedMsg>,
    closed: Arc<watch::Sender<bool>>,
}

impl MailboxSender {
    pub fn try_deliver(&self, msg: PreparedMsg) -> Result<(), DeliverError> {
        if self.is_closed() {
            return Err(DeliverError::Closed);
        }
        self.tx.try_send(msg).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliverError::Full,
            mpsc::error::TrySendError::Closed(_) => DeliverError::Closed,
        })
    }

    /// Idempotent.
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow() || self.tx.is_closed()
    }
}

pub struct Mailbox {
    rx: mpsc::Receiver<PreparedMsg>,
    closed: watch::Receiver<bool>,
}

impl Mailbox {
    /// Next message in delivery order, or `None` once closed and drained.
    pub async fn recv(&mut self) -> Option<PreparedMsg> {
        let closed = *self.closed.borrow();
        if !closed {
            tokio::select! {
                biased;
                msg = self.rx.recv() => return msg,
                _ = self.closed.wait_for(|c| *c) => {}
            }
        }
        self.rx.try_recv().ok()
    }
}
