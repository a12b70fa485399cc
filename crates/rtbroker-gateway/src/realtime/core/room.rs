//! Room actor: one named broadcast group.
//!
//! Every membership change and every fan-out runs on the room's own task, in
//! the order the events were queued. Nothing else ever touches the membership
//! set, so it needs no lock. Handles are cheap clones of the queue sender.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use rtbroker_core::error::{BrokerError, Result};
use rtbroker_core::protocol::events;
use rtbroker_core::Envelope;

use crate::config::SlowConsumerPolicy;
use crate::realtime::core::mailbox::{DeliverError, MailboxSender};
use crate::realtime::types::{ConnId, PreparedMsg};

/// A connection as seen by a room: its id and a sender into its mailbox.
/// Membership is a relation; the room never owns the connection.
#[derive(Clone)]
pub struct Member {
    pub id: ConnId,
    pub mailbox: MailboxSender,
}

enum RoomEvent {
    Join(Member),
    /// Notifies every member, the leaver included, then removes the leaver.
    Leave(ConnId),
    Broadcast(PreparedMsg),
    Members(oneshot::Sender<Vec<ConnId>>),
}

#[derive(Clone)]
pub struct RoomHandle {
    name: Arc<str>,
    events: mpsc::Sender<RoomEvent>,
    stop: Arc<watch::Sender<bool>>,
}

impl RoomHandle {
    /// Start the room loop on the current runtime.
    pub fn spawn(name: &str, queue_capacity: usize, policy: SlowConsumerPolicy) -> Self {
        let (events_tx, events_rx) = mpsc::channel(queue_capacity.max(1));
        let (stop_tx, stop_rx) = watch::channel(false);

        let actor = RoomActor {
            name: Arc::from(name),
            members: HashMap::new(),
            policy,
        };
        tokio::spawn(actor.run(events_rx, stop_rx));

        Self {
            name: Arc::from(name),
            events: events_tx,
            stop: Arc::new(stop_tx),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn join(&self, member: Member) -> Result<()> {
        self.submit(RoomEvent::Join(member)).await
    }

    pub async fn leave(&self, id: ConnId) -> Result<()> {
        self.submit(RoomEvent::Leave(id)).await
    }

    /// Serialize once, then queue for fan-out.
    pub async fn broadcast(&self, env: &Envelope) -> Result<()> {
        let prepared = PreparedMsg::prepare(env)?;
        self.submit(RoomEvent::Broadcast(prepared)).await
    }

    /// Membership snapshot, answered by the room loop itself.
    pub async fn members(&self) -> Result<Vec<ConnId>> {
        let (tx, rx) = oneshot::channel();
        self.submit(RoomEvent::Members(tx)).await?;
        rx.await.map_err(|_| BrokerError::RoomStopped(self.name.to_string()))
    }

    /// Terminal. Events still queued are discarded.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop.borrow() || self.events.is_closed()
    }

    async fn submit(&self, ev: RoomEvent) -> Result<()> {
        if self.is_stopped() {
            return Err(BrokerError::RoomStopped(self.name.to_string()));
        }
        self.events
            .send(ev)
            .await
            .map_err(|_| BrokerError::RoomStopped(self.name.to_string()))
    }
}

struct RoomActor {
    name: Arc<str>,
    members: HashMap<ConnId, Member>,
    policy: SlowConsumerPolicy,
}

impl RoomActor {
    async fn run(mut self, mut events: mpsc::Receiver<RoomEvent>, mut stop: watch::Receiver<bool>) {
        tracing::debug!(room = %self.name, "room started");
        loop {
            tokio::select! {
                biased;
                _ = stop.wait_for(|s| *s) => break,
                ev = events.recv() => match ev {
                    Some(ev) => self.handle(ev),
                    None => break,
                },
            }
        }
        // Closing the receiver makes every later submit fail fast.
        events.close();
        tracing::debug!(room = %self.name, members = self.members.len(), "room stopped");
    }

    fn handle(&mut self, ev: RoomEvent) {
        match ev {
            RoomEvent::Join(member) => {
                let id = member.id.clone();
                self.members.insert(id.clone(), member);
                tracing::debug!(room = %self.name, conn = %id, "member joined");
                self.notify(events::JOIN, &id);
            }
            RoomEvent::Leave(id) => {
                if !self.members.contains_key(&id) {
                    return;
                }
                self.notify(events::LEAVE, &id);
                self.members.remove(&id);
                tracing::debug!(room = %self.name, conn = %id, "member left");
            }
            RoomEvent::Broadcast(msg) => self.fan_out(&msg),
            RoomEvent::Members(reply) => {
                let _ = reply.send(self.members.keys().cloned().collect());
            }
        }
    }

    /// Tell every member (the subject included) that `id` joined or left.
    fn notify(&mut self, event: &str, id: &ConnId) {
        let env = Envelope::new(self.name.as_ref(), event, id.as_str());
        match PreparedMsg::prepare(&env) {
            Ok(msg) => self.fan_out(&msg),
            Err(e) => {
                tracing::warn!(room = %self.name, event, code = e.code().as_str(), error = %e, "notification encode failed");
            }
        }
    }

    fn fan_out(&mut self, msg: &PreparedMsg) {
        let mut evicted = Vec::new();

        for (id, member) in &self.members {
            match member.mailbox.try_deliver(msg.clone()) {
                Ok(()) => {}
                Err(DeliverError::Full) => match self.policy {
                    SlowConsumerPolicy::Evict => {
                        member.mailbox.close();
                        evicted.push(id.clone());
                    }
                    SlowConsumerPolicy::Drop => {
                        tracing::trace!(room = %self.name, conn = %id, "mailbox full, message dropped");
                    }
                },
                Err(DeliverError::Closed) => evicted.push(id.clone()),
            }
        }

        for id in evicted {
            self.members.remove(&id);
            tracing::warn!(room = %self.name, conn = %id, "slow or closed member evicted");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::realtime::core::mailbox::{mailbox, Mailbox};

    fn member(id: &str, capacity: usize) -> (Member, Mailbox) {
        let (tx, rx) = mailbox(capacity);
        (Member { id: ConnId::from(id), mailbox: tx }, rx)
    }

    async fn next_env(rx: &mut Mailbox) -> Envelope {
        Envelope::decode(rx.recv().await.unwrap().as_str()).unwrap()
    }

    #[tokio::test]
    async fn join_then_leave_restores_membership() {
        let room = RoomHandle::spawn("lobby", 16, SlowConsumerPolicy::Evict);
        let (a, mut a_rx) = member("a", 16);

        let before = room.members().await.unwrap();
        room.join(a).await.unwrap();
        room.leave(ConnId::from("a")).await.unwrap();
        assert_eq!(room.members().await.unwrap(), before);

        let joined = next_env(&mut a_rx).await;
        assert_eq!((joined.event.as_str(), joined.payload.as_str()), ("join", "a"));
        let left = next_env(&mut a_rx).await;
        assert_eq!((left.event.as_str(), left.payload.as_str()), ("leave", "a"));
    }

    #[tokio::test]
    async fn leave_of_non_member_is_silent() {
        let room = RoomHandle::spawn("lobby", 16, SlowConsumerPolicy::Evict);
        let (a, mut a_rx) = member("a", 16);
        room.join(a).await.unwrap();
        let _ = next_env(&mut a_rx).await;

        room.leave(ConnId::from("ghost")).await.unwrap();
        room.broadcast(&Envelope::new("lobby", "chat", "x")).await.unwrap();
        assert_eq!(next_env(&mut a_rx).await.event, "chat");
    }

    #[tokio::test]
    async fn slow_member_is_evicted_and_fast_member_gets_everything() {
        let room = RoomHandle::spawn("root", 64, SlowConsumerPolicy::Evict);
        let (a, mut a_rx) = member("a", 64);
        let (b, mut b_rx) = member("b", 4);
        room.join(a).await.unwrap();
        room.join(b).await.unwrap();

        // a: join(a), join(b). b: join(b).
        let _ = next_env(&mut a_rx).await;
        let _ = next_env(&mut a_rx).await;

        for n in 0..10 {
            room.broadcast(&Envelope::new("root", "tick", n.to_string())).await.unwrap();
            assert_eq!(next_env(&mut a_rx).await.payload, n.to_string());
        }

        assert_eq!(room.members().await.unwrap(), vec![ConnId::from("a")]);

        // b got its own join plus what fit before saturation, then the close.
        let mut seen = 0;
        while b_rx.recv().await.is_some() {
            seen += 1;
        }
        assert_eq!(seen, 4);
    }

    #[tokio::test]
    async fn drop_policy_keeps_slow_member() {
        let room = RoomHandle::spawn("root", 64, SlowConsumerPolicy::Drop);
        let (b, _b_rx) = member("b", 1);
        room.join(b).await.unwrap();
        for n in 0..5 {
            room.broadcast(&Envelope::new("root", "tick", n.to_string())).await.unwrap();
        }
        assert_eq!(room.members().await.unwrap(), vec![ConnId::from("b")]);
    }

    #[tokio::test]
    async fn stopped_room_rejects_events() {
        let room = RoomHandle::spawn("gone", 4, SlowConsumerPolicy::Evict);
        room.stop();
        assert!(room.is_stopped());
        let (a, _a_rx) = member("a", 4);
        let err = room.join(a).await.unwrap_err();
        assert_eq!(err.code().as_str(), "ROOM_STOPPED");
    }
}
