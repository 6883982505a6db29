//! Typed publish/subscribe message bus and its endpoints
//!
//! Senders post messages to the bus without knowing their receivers; routing
//! copies each pending message into the inbox of every subscription whose
//! sender set contains the message's sender. Endpoints hold the subscription
//! tables; a bus may serve several endpoints (e.g. a backend plus external
//! input and observer endpoints).

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::messaging::{MessageVariant, SpikeMessage, SynapticImpactMessage};
use crate::subscription::Subscription;
use crate::uid::Uid;

/// Per-kind subscription tables of one endpoint.
#[derive(Debug, Default)]
pub struct SubscriptionStore {
    spikes: AHashMap<Uid, Subscription<SpikeMessage>>,
    impacts: AHashMap<Uid, Subscription<SynapticImpactMessage>>,
}

/// A message type routable over the bus.
///
/// Sealed: the set of bus message kinds is closed; kernels dispatch on it by
/// tag.
pub trait BusMessage: Clone + Into<MessageVariant> + sealed::Sealed {
    /// Human-readable kind name, used in diagnostics.
    const KIND: &'static str;

    /// UID of the entity that sent this message.
    fn sender_uid(&self) -> Uid;

    #[doc(hidden)]
    fn table(store: &SubscriptionStore) -> &AHashMap<Uid, Subscription<Self>>;

    #[doc(hidden)]
    fn table_mut(store: &mut SubscriptionStore) -> &mut AHashMap<Uid, Subscription<Self>>;
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::SpikeMessage {}
    impl Sealed for super::SynapticImpactMessage {}
}

impl BusMessage for SpikeMessage {
    const KIND: &'static str = "SpikeMessage";

    fn sender_uid(&self) -> Uid {
        self.sender_uid
    }

    fn table(store: &SubscriptionStore) -> &AHashMap<Uid, Subscription<Self>> {
        &store.spikes
    }

    fn table_mut(store: &mut SubscriptionStore) -> &mut AHashMap<Uid, Subscription<Self>> {
        &mut store.spikes
    }
}

impl BusMessage for SynapticImpactMessage {
    const KIND: &'static str = "SynapticImpactMessage";

    fn sender_uid(&self) -> Uid {
        self.sender_uid
    }

    fn table(store: &SubscriptionStore) -> &AHashMap<Uid, Subscription<Self>> {
        &store.impacts
    }

    fn table_mut(store: &mut SubscriptionStore) -> &mut AHashMap<Uid, Subscription<Self>> {
        &mut store.impacts
    }
}

/// The message bus: a pending queue plus the endpoints it routes into.
///
/// Cloning yields another handle onto the same bus.
#[derive(Debug, Clone, Default)]
pub struct MessageBus {
    pending: Arc<Mutex<Vec<MessageVariant>>>,
    stores: Arc<Mutex<Vec<Arc<Mutex<SubscriptionStore>>>>>,
}

impl MessageBus {
    /// Create an empty bus with no endpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new endpoint attached to this bus.
    pub fn create_endpoint(&self) -> MessageEndpoint {
        let store = Arc::new(Mutex::new(SubscriptionStore::default()));
        self.stores.lock().push(Arc::clone(&store));
        MessageEndpoint {
            pending: Arc::clone(&self.pending),
            store,
        }
    }

    /// Drain the pending queue, delivering each message to every matching
    /// subscription inbox. Returns the number of messages routed.
    ///
    /// Messages are routed in send order; a message whose sender appears in no
    /// subscription is dropped.
    pub fn route_messages(&self) -> usize {
        let drained = std::mem::take(&mut *self.pending.lock());
        if drained.is_empty() {
            return 0;
        }
        log::trace!("routing {} messages", drained.len());
        let stores = self.stores.lock();
        for message in &drained {
            for store in stores.iter() {
                deliver(&mut store.lock(), message);
            }
        }
        drained.len()
    }
}

fn deliver(store: &mut SubscriptionStore, message: &MessageVariant) {
    match message {
        MessageVariant::Spike(m) => deliver_to(&mut store.spikes, m),
        MessageVariant::SynapticImpact(m) => deliver_to(&mut store.impacts, m),
    }
}

fn deliver_to<M: BusMessage>(table: &mut AHashMap<Uid, Subscription<M>>, message: &M) {
    for subscription in table.values_mut() {
        if subscription.has_sender(message.sender_uid()) {
            subscription.push(message.clone());
        }
    }
}

/// A per-agent handle onto the bus, holding its subscriptions and inboxes.
#[derive(Debug, Clone)]
pub struct MessageEndpoint {
    pending: Arc<Mutex<Vec<MessageVariant>>>,
    store: Arc<Mutex<SubscriptionStore>>,
}

impl MessageEndpoint {
    /// Ensure a subscription for `(M, receiver)` and union `senders` into its
    /// sender set. Idempotent; returns the number of senders newly added.
    pub fn subscribe<M: BusMessage>(&self, receiver: Uid, senders: &[Uid]) -> usize {
        let mut store = self.store.lock();
        M::table_mut(&mut store)
            .entry(receiver)
            .or_insert_with(|| Subscription::new(receiver))
            .add_senders(senders)
    }

    /// Remove the subscription for `(M, receiver)` entirely.
    /// Returns true if one existed.
    pub fn unsubscribe<M: BusMessage>(&self, receiver: Uid) -> bool {
        let mut store = self.store.lock();
        M::table_mut(&mut store).remove(&receiver).is_some()
    }

    /// Remove one sender from the subscription for `(M, receiver)`.
    /// Returns 1 if the sender was present, 0 otherwise.
    pub fn remove_sender<M: BusMessage>(&self, receiver: Uid, sender: Uid) -> usize {
        let mut store = self.store.lock();
        M::table_mut(&mut store)
            .get_mut(&receiver)
            .map_or(0, |sub| sub.remove_sender(sender))
    }

    /// Post a message to the bus's pending queue. Does not deliver.
    pub fn send_message(&self, message: impl Into<MessageVariant>) {
        self.pending.lock().push(message.into());
    }

    /// Move routed messages from the bus into local inboxes.
    ///
    /// In this single-process configuration routing delivers straight into the
    /// shared subscription inboxes, so this is a no-op kept for API parity
    /// with multi-endpoint transports. Returns the number of messages moved.
    pub fn receive_all_messages(&self) -> usize {
        0
    }

    /// Return and clear the inbox for `(M, receiver)`.
    ///
    /// Unloading a subscription that was never created returns an empty
    /// vector; it is not an error.
    pub fn unload_messages<M: BusMessage>(&self, receiver: Uid) -> Vec<M> {
        let mut store = self.store.lock();
        M::table_mut(&mut store)
            .get_mut(&receiver)
            .map(Subscription::take_messages)
            .unwrap_or_default()
    }

    /// Number of senders currently subscribed for `(M, receiver)`.
    pub fn sender_count<M: BusMessage>(&self, receiver: Uid) -> usize {
        let store = self.store.lock();
        M::table(&store).get(&receiver).map_or(0, Subscription::sender_count)
    }
}
