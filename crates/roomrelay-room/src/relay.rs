//! Event relay: pushes outbound frames to connections.
//!
//! Each connection registers one unbounded channel sender. Its connection
//! handler drains the receiver into the socket, so everything sent to one
//! target arrives in the order it was sent.

use std::collections::HashMap;

use roomrelay_protocol::ConnectionId;
use tokio::sync::mpsc;

/// Channel sender for delivering outbound messages to one connection.
pub type OutboundSender<M> = mpsc::UnboundedSender<M>;

/// Who a fan-out is addressed to, within a member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every member.
    All,
    /// Just this connection.
    Only(ConnectionId),
    /// Every member except this one (usually the sender).
    AllExcept(ConnectionId),
}

impl Recipient {
    fn includes(self, id: ConnectionId) -> bool {
        match self {
            Self::All => true,
            Self::Only(target) => target == id,
            Self::AllExcept(excluded) => excluded != id,
        }
    }
}

/// Routes messages of type `M` to connected clients.
#[derive(Debug)]
pub struct EventRelay<M> {
    senders: HashMap<ConnectionId, OutboundSender<M>>,
}

impl<M> Default for EventRelay<M> {
    fn default() -> Self {
        Self {
            senders: HashMap::new(),
        }
    }
}

impl<M: Clone> EventRelay<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the outbound channel for a connection, replacing any
    /// previous one.
    pub fn attach(&mut self, id: ConnectionId, sender: OutboundSender<M>) {
        self.senders.insert(id, sender);
    }

    /// Forgets a connection. Pending messages already queued still drain.
    pub fn detach(&mut self, id: ConnectionId) -> bool {
        self.senders.remove(&id).is_some()
    }

    pub fn is_attached(&self, id: ConnectionId) -> bool {
        self.senders.contains_key(&id)
    }

    /// Sends one message to one connection. Silently drops if the
    /// connection is gone; returns whether it was queued.
    pub fn send_to(&self, id: ConnectionId, msg: M) -> bool {
        match self.senders.get(&id) {
            Some(sender) => sender.send(msg).is_ok(),
            None => false,
        }
    }

    /// Sends `msg` to the selected subset of `members`.
    ///
    /// Returns how many connections it was queued for.
    pub fn dispatch(
        &self,
        members: &[ConnectionId],
        recipient: Recipient,
        msg: M,
    ) -> usize {
        members
            .iter()
            .filter(|id| recipient.includes(**id))
            .filter(|id| self.send_to(**id, msg.clone()))
            .count()
    }

    /// Number of attached connections.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn attached(
        relay: &mut EventRelay<&'static str>,
        id: u64,
    ) -> mpsc::UnboundedReceiver<&'static str> {
        let (tx, rx) = mpsc::unbounded_channel();
        relay.attach(cid(id), tx);
        rx
    }

    #[test]
    fn test_dispatch_all_except_skips_sender() {
        let mut relay = EventRelay::new();
        let mut rx1 = attached(&mut relay, 1);
        let mut rx2 = attached(&mut relay, 2);
        let mut rx3 = attached(&mut relay, 3);

        let sent = relay.dispatch(
            &[cid(1), cid(2), cid(3)],
            Recipient::AllExcept(cid(2)),
            "hi",
        );

        assert_eq!(sent, 2);
        assert_eq!(rx1.try_recv().unwrap(), "hi");
        assert!(rx2.try_recv().is_err());
        assert_eq!(rx3.try_recv().unwrap(), "hi");
    }

    #[test]
    fn test_dispatch_only_reaches_one() {
        let mut relay = EventRelay::new();
        let mut rx1 = attached(&mut relay, 1);
        let mut rx2 = attached(&mut relay, 2);

        relay.dispatch(&[cid(1), cid(2)], Recipient::Only(cid(2)), "dm");

        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().unwrap(), "dm");
    }

    #[test]
    fn test_send_to_preserves_order_per_target() {
        let mut relay = EventRelay::new();
        let mut rx = attached(&mut relay, 1);

        for msg in ["a", "b", "c"] {
            relay.send_to(cid(1), msg);
        }

        let got: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(got, ["a", "b", "c"]);
    }

    #[test]
    fn test_send_to_detached_or_closed_is_dropped() {
        let mut relay = EventRelay::new();
        let rx = attached(&mut relay, 1);
        drop(rx);

        assert!(!relay.send_to(cid(1), "lost"));
        assert!(relay.detach(cid(1)));
        assert!(!relay.send_to(cid(1), "lost"));
        assert!(!relay.detach(cid(1)));
    }
}
