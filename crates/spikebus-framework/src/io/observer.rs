//! Message observers: subscription-driven output consumption

use spikebus_core::{BusMessage, MessageEndpoint, Uid};

/// Closure invoked with each batch of observed messages.
pub type MessageProcessor<M> = Box<dyn FnMut(Vec<M>) + Send>;

/// An observer that receives messages of one kind and hands them to a
/// processing closure. Use it for statistics collection or result output.
pub struct MessageObserver<M: BusMessage> {
    uid: Uid,
    endpoint: MessageEndpoint,
    processor: MessageProcessor<M>,
}

impl<M: BusMessage> MessageObserver<M> {
    /// Create an observer over `endpoint` with a fresh UID.
    pub fn new(endpoint: MessageEndpoint, processor: MessageProcessor<M>) -> Self {
        Self {
            uid: Uid::new(),
            endpoint,
            processor,
        }
    }

    /// UID of this observer.
    pub fn get_uid(&self) -> Uid {
        self.uid
    }

    /// Subscribe to messages from the given senders.
    pub fn subscribe(&self, senders: &[Uid]) {
        self.endpoint.subscribe::<M>(self.uid, senders);
    }

    /// Receive and process everything routed since the last update.
    pub fn update(&mut self) {
        self.endpoint.receive_all_messages();
        let messages = self.endpoint.unload_messages::<M>(self.uid);
        if !messages.is_empty() {
            (self.processor)(messages);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use spikebus_core::messaging::SpikeMessage;
    use spikebus_core::MessageBus;

    #[test]
    fn test_observer_sees_subscribed_senders_only() {
        let bus = MessageBus::new();
        let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut observer: MessageObserver<SpikeMessage> = MessageObserver::new(
            bus.create_endpoint(),
            Box::new(move |messages| {
                sink.lock().unwrap().extend(messages.iter().map(|m| m.send_time));
            }),
        );

        let watched = Uid::new();
        let ignored = Uid::new();
        observer.subscribe(&[watched]);

        let sender_endpoint = bus.create_endpoint();
        sender_endpoint.send_message(SpikeMessage {
            sender_uid: watched,
            send_time: 1,
            neuron_indexes: vec![0],
        });
        sender_endpoint.send_message(SpikeMessage {
            sender_uid: ignored,
            send_time: 2,
            neuron_indexes: vec![0],
        });
        bus.route_messages();
        observer.update();

        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }
}
