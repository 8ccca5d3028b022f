//! # Message Bus
//!
//! Topic-addressed broadcast channels. Each topic gets its own channel the
//! first time it is published to or subscribed to. Publishing to a topic
//! nobody listens on drops the message.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use super::errors::{SchedulerError, SchedulerResult};
use crate::config::Config;
use crate::value::Value;

/// Cloneable handle to a set of topic channels
#[derive(Debug, Clone)]
pub struct MessageBus {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<Value>>>>,
    capacity: usize,
}

impl MessageBus {
    /// Creates a bus buffering up to `capacity` messages per topic.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.bus_capacity)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Publishes `value` on `topic`, returning how many subscribers got it.
    pub fn publish(&self, topic: &str, value: Value) -> SchedulerResult<usize> {
        let sender = self.sender(topic)?;
        // An error only means there are no subscribers right now
        Ok(sender.send(value).unwrap_or(0))
    }

    /// Subscribes to messages published on `topic` from now on.
    pub fn subscribe(&self, topic: &str) -> SchedulerResult<broadcast::Receiver<Value>> {
        Ok(self.sender(topic)?.subscribe())
    }

    /// Known topics in sorted order
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self
            .channels
            .read()
            .map(|channels| channels.keys().cloned().collect())
            .unwrap_or_default();
        topics.sort();
        topics
    }

    fn sender(&self, topic: &str) -> SchedulerResult<broadcast::Sender<Value>> {
        if let Some(sender) = self
            .channels
            .read()
            .map_err(|_| SchedulerError::Internal("Lock poisoned".into()))?
            .get(topic)
        {
            return Ok(sender.clone());
        }

        let mut channels = self
            .channels
            .write()
            .map_err(|_| SchedulerError::Internal("Lock poisoned".into()))?;
        let sender = channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Ok(sender.clone())
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let bus = MessageBus::new(8);
        let mut a = bus.subscribe("greetings").unwrap();
        let mut b = bus.subscribe("greetings").unwrap();

        assert_eq!(bus.publish("greetings", Value::from("hi")).unwrap(), 2);
        assert_eq!(a.recv().await.unwrap(), Value::from("hi"));
        assert_eq!(b.recv().await.unwrap(), Value::from("hi"));
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let bus = MessageBus::new(8);
        assert_eq!(bus.publish("void", Value::Int(1)).unwrap(), 0);
        assert_eq!(bus.topics(), vec!["void"]);
    }

    #[test]
    fn test_topics_are_isolated_and_sorted() {
        let bus = MessageBus::new(8);
        let mut rx = bus.subscribe("b").unwrap();
        bus.publish("a", Value::Int(1)).unwrap();

        assert!(rx.try_recv().is_err());
        assert_eq!(bus.topics(), vec!["a", "b"]);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        assert_eq!(MessageBus::new(0).capacity(), 1);
    }
}
