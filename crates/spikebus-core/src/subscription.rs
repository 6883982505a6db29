//! Subscription records binding a receiver to a set of senders

use ahash::AHashSet;

use crate::uid::Uid;

/// A subscription of one receiver to messages of one kind from a set of
/// senders.
///
/// Exactly one subscription exists per (message kind, receiver) pair on an
/// endpoint. The sender set only grows through [`add_senders`]; the inbox is
/// append-only between routing and [`take_messages`].
///
/// [`add_senders`]: Subscription::add_senders
/// [`take_messages`]: Subscription::take_messages
#[derive(Debug, Clone)]
pub struct Subscription<M> {
    receiver: Uid,
    senders: AHashSet<Uid>,
    messages: Vec<M>,
}

impl<M> Subscription<M> {
    /// Create a subscription for `receiver` with an empty sender set.
    pub fn new(receiver: Uid) -> Self {
        Self {
            receiver,
            senders: AHashSet::new(),
            messages: Vec::new(),
        }
    }

    /// UID of the receiving entity.
    pub fn receiver_uid(&self) -> Uid {
        self.receiver
    }

    /// Add one sender. Returns 1 if it was newly added, 0 if already present.
    pub fn add_sender(&mut self, uid: Uid) -> usize {
        usize::from(self.senders.insert(uid))
    }

    /// Add several senders. Returns the number newly added.
    pub fn add_senders(&mut self, senders: &[Uid]) -> usize {
        senders.iter().map(|&uid| self.add_sender(uid)).sum()
    }

    /// Remove a sender. Returns 1 if it was present, 0 otherwise.
    pub fn remove_sender(&mut self, uid: Uid) -> usize {
        usize::from(self.senders.remove(&uid))
    }

    /// Check whether `uid` is among this subscription's senders.
    pub fn has_sender(&self, uid: Uid) -> bool {
        self.senders.contains(&uid)
    }

    /// Number of distinct senders.
    pub fn sender_count(&self) -> usize {
        self.senders.len()
    }

    /// Append a routed message to the inbox.
    pub fn push(&mut self, message: M) {
        self.messages.push(message);
    }

    /// Messages currently in the inbox.
    pub fn messages(&self) -> &[M] {
        &self.messages
    }

    /// Take the inbox contents, leaving it empty.
    pub fn take_messages(&mut self) -> Vec<M> {
        std::mem::take(&mut self.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::SpikeMessage;

    #[test]
    fn test_add_senders_counts_new_only() {
        let mut sub: Subscription<SpikeMessage> = Subscription::new(Uid::new());
        let a = Uid::new();
        let b = Uid::new();

        assert_eq!(sub.add_senders(&[a, b]), 2);
        assert_eq!(sub.add_senders(&[a, b]), 0);
        assert_eq!(sub.sender_count(), 2);

        let c = Uid::new();
        assert_eq!(sub.add_senders(&[b, c]), 1);
        assert_eq!(sub.sender_count(), 3);
    }

    #[test]
    fn test_remove_sender() {
        let mut sub: Subscription<SpikeMessage> = Subscription::new(Uid::new());
        let a = Uid::new();
        sub.add_sender(a);

        assert_eq!(sub.remove_sender(a), 1);
        assert_eq!(sub.remove_sender(a), 0);
        assert!(!sub.has_sender(a));
    }

    #[test]
    fn test_inbox_take_clears() {
        let mut sub: Subscription<SpikeMessage> = Subscription::new(Uid::new());
        sub.push(SpikeMessage {
            sender_uid: Uid::new(),
            send_time: 0,
            neuron_indexes: vec![1],
        });
        assert_eq!(sub.messages().len(), 1);

        let taken = sub.take_messages();
        assert_eq!(taken.len(), 1);
        assert!(sub.messages().is_empty());
        assert!(sub.take_messages().is_empty());
    }
}
