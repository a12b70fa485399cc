//! Connection actor: one client's session.
//!
//! The inbound pump owns the `Connection` (joined rooms are plain local state,
//! mutated only there). The outbound pump owns the `Mailbox`. They share the
//! transport only through its split halves and stop each other through the
//! mailbox close signal (inbound -> outbound) and the writer-done future
//! (outbound -> inbound).

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use axum::extract::ws::Message;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::time::{self, Instant, MissedTickBehavior};

use rtbroker_core::error::{BrokerError, Result};
use rtbroker_core::Envelope;

use crate::realtime::core::broker::{BrokerContext, ConnectionHandle};
use crate::realtime::core::mailbox::{mailbox, DeliverError, Mailbox, MailboxSender};
use crate::realtime::core::room::{Member, RoomHandle};
use crate::realtime::types::{ConnId, PreparedMsg, PumpSettings};
use crate::transport::codec::{self, Inbound};

pub struct Connection {
    id: ConnId,
    privilege: Arc<str>,
    mailbox: MailboxSender,
    rooms: HashMap<String, RoomHandle>,
    broker: Arc<BrokerContext>,
}

impl Connection {
    /// Admit a connection: generate its id and register it with the broker.
    /// The returned `Mailbox` belongs to the outbound pump.
    pub fn open(broker: Arc<BrokerContext>, privilege: impl Into<Arc<str>>) -> (Self, Mailbox) {
        let (tx, rx) = mailbox(broker.settings().mailbox_capacity);
        let conn = Self {
            id: ConnId::generate(),
            privilege: privilege.into(),
            mailbox: tx,
            rooms: HashMap::new(),
            broker,
        };
        conn.broker.register_connection(ConnectionHandle {
            id: conn.id.clone(),
            privilege: Arc::clone(&conn.privilege),
            mailbox: conn.mailbox.clone(),
        });
        tracing::info!(conn = %conn.id, privilege = %conn.privilege, "connection opened");
        (conn, rx)
    }

    pub fn id(&self) -> &ConnId {
        &self.id
    }

    pub fn privilege(&self) -> &str {
        &self.privilege
    }

    pub fn broker(&self) -> &Arc<BrokerContext> {
        &self.broker
    }

    pub fn is_elevated(&self) -> bool {
        *self.privilege == *self.broker.settings().admin_role
    }

    pub fn joined_rooms(&self) -> Vec<&str> {
        self.rooms.keys().map(String::as_str).collect()
    }

    /// Join `name`, creating the room on first use. Re-joining re-sends the
    /// join notification.
    pub async fn join(&mut self, name: &str) -> Result<()> {
        let room = self.broker.room_or_create(name);
        room.join(Member {
            id: self.id.clone(),
            mailbox: self.mailbox.clone(),
        })
        .await?;
        self.rooms.insert(name.to_string(), room);
        Ok(())
    }

    /// No-op when the room does not exist.
    pub async fn leave(&mut self, name: &str) -> Result<()> {
        let Some(room) = self.broker.room(name) else {
            return Ok(());
        };
        self.rooms.remove(name);
        room.leave(self.id.clone()).await
    }

    /// Broadcast to `env.room` if it exists.
    pub async fn emit(&self, env: &Envelope) {
        self.broker.emit(env).await;
    }

    /// Queue directly into this connection's own mailbox.
    pub fn reply(&self, env: &Envelope) -> Result<()> {
        let prepared = PreparedMsg::prepare(env)?;
        self.mailbox.try_deliver(prepared).map_err(|e| match e {
            DeliverError::Full => BrokerError::Internal("own mailbox full".into()),
            DeliverError::Closed => BrokerError::Transport("own mailbox closed".into()),
        })
    }

    pub async fn dispatch(&mut self, env: Envelope) -> Result<()> {
        let broker = Arc::clone(&self.broker);
        broker.dispatcher().dispatch(self, env).await
    }

    /// Inbound pump. Runs until the transport fails, the peer closes, the
    /// read deadline passes without a pong, a frame is oversized, or
    /// `writer_done` resolves. Always ends with `close`.
    pub async fn run_inbound<S, E, F>(mut self, mut stream: S, limits: PumpSettings, writer_done: F)
    where
        S: Stream<Item = std::result::Result<Message, E>> + Unpin,
        E: Display,
        F: Future<Output = ()>,
    {
        tokio::pin!(writer_done);
        let mut deadline = Instant::now() + limits.pong_wait;

        loop {
            let incoming = tokio::select! {
                biased;
                _ = &mut writer_done => {
                    tracing::debug!(conn = %self.id, "writer gone");
                    break;
                }
                r = time::timeout_at(deadline, stream.next()) => r,
            };

            let msg = match incoming {
                Err(_) => {
                    tracing::info!(conn = %self.id, "read deadline elapsed, peer presumed dead");
                    break;
                }
                Ok(None) => break,
                Ok(Some(Err(e))) => {
                    tracing::info!(conn = %self.id, error = %e, "read failed");
                    break;
                }
                Ok(Some(Ok(msg))) => msg,
            };

            match codec::decode(msg, limits.max_frame_bytes) {
                Ok(Inbound::Envelope(env)) => {
                    let event = env.event.clone();
                    if let Err(e) = self.dispatch(env).await {
                        tracing::warn!(conn = %self.id, %event, code = e.code().as_str(), error = %e, "dispatch failed");
                    }
                }
                Ok(Inbound::Pong) => deadline = Instant::now() + limits.pong_wait,
                Ok(Inbound::Ping) => {}
                Ok(Inbound::Close) => break,
                Err(e) if e.is_fatal() => {
                    tracing::info!(conn = %self.id, code = e.code().as_str(), error = %e, "frame rejected");
                    break;
                }
                Err(e) => {
                    tracing::warn!(conn = %self.id, code = e.code().as_str(), error = %e, "decode failed");
                }
            }
        }

        self.close().await;
    }

    /// Leave every joined room, unregister, then close the mailbox so the
    /// outbound pump sends its close frame.
    pub async fn close(mut self) {
        let rooms = std::mem::take(&mut self.rooms);
        for (name, room) in rooms {
            if let Err(e) = room.leave(self.id.clone()).await {
                tracing::debug!(conn = %self.id, room = %name, error = %e, "leave on close failed");
            }
        }
        self.broker.unregister_connection(&self.id);
        self.mailbox.close();
        tracing::info!(conn = %self.id, "connection closed");
    }
}

/// Outbound pump: drain the mailbox in order, ping on a fixed interval. Any
/// failed or late write ends the pump; a closed mailbox ends it with a close
/// frame. The sink is closed on exit.
pub async fn run_outbound<W>(mut mailbox: Mailbox, mut sink: W, limits: PumpSettings)
where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    let mut ping = time::interval_at(Instant::now() + limits.ping_every, limits.ping_every);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let frame = tokio::select! {
            msg = mailbox.recv() => match msg {
                Some(msg) => msg.to_ws_message(),
                None => {
                    let _ = write_frame(&mut sink, Message::Close(None), &limits).await;
                    break;
                }
            },
            _ = ping.tick() => Message::Ping(Vec::new()),
        };

        if let Err(e) = write_frame(&mut sink, frame, &limits).await {
            tracing::info!(code = e.code().as_str(), error = %e, "write failed");
            break;
        }
    }

    let _ = time::timeout(limits.write_wait, sink.close()).await;
}

async fn write_frame<W>(sink: &mut W, frame: Message, limits: &PumpSettings) -> Result<()>
where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    match time::timeout(limits.write_wait, sink.send(frame)).await {
        Err(_) => Err(BrokerError::Timeout),
        Ok(Err(e)) => Err(BrokerError::Transport(e.to_string())),
        Ok(Ok(())) => Ok(()),
    }
}
