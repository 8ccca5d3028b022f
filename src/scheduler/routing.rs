//! # Routing Table
//!
//! Maps each scheduled node to its inbox and the topic it receives on.
//! Delivery is best-effort: an inbox whose node has gone away counts as a
//! failed delivery and is otherwise ignored.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::mpsc;

use super::NodeId;
use crate::node::Signal;
use crate::value::Value;

/// Sending half of a node inbox
pub(crate) type InboxSender = mpsc::UnboundedSender<Signal>;

/// Receiving half of a node inbox
pub(crate) type InboxReceiver = mpsc::UnboundedReceiver<Signal>;

#[derive(Debug)]
struct Inbox {
    topic: String,
    sender: InboxSender,
}

/// Inboxes by node id
#[derive(Debug, Default)]
pub(crate) struct RoutingTable {
    inboxes: RwLock<HashMap<NodeId, Inbox>>,
}

impl RoutingTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers an inbox for `node_id` on `topic`.
    pub(crate) fn insert(&self, node_id: NodeId, topic: &str) -> Option<InboxReceiver> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inboxes = self.inboxes.write().ok()?;
        inboxes.insert(
            node_id,
            Inbox {
                topic: topic.to_string(),
                sender: tx,
            },
        );
        Some(rx)
    }

    /// Removes the inbox of `node_id`, returning its topic.
    pub(crate) fn remove(&self, node_id: &str) -> Option<String> {
        self.inboxes
            .write()
            .ok()?
            .remove(node_id)
            .map(|inbox| inbox.topic)
    }

    pub(crate) fn contains(&self, node_id: &str) -> bool {
        self.inboxes
            .read()
            .map(|inboxes| inboxes.contains_key(node_id))
            .unwrap_or(false)
    }

    pub(crate) fn len(&self) -> usize {
        self.inboxes.read().map(|inboxes| inboxes.len()).unwrap_or(0)
    }

    /// Delivers `value` to every inbox registered on `topic`.
    pub(crate) fn dispatch(&self, topic: &str, value: &Value) -> DispatchResult {
        let mut result = DispatchResult::default();

        let inboxes = match self.inboxes.read() {
            Ok(inboxes) => inboxes,
            Err(_) => return result,
        };

        for inbox in inboxes.values().filter(|inbox| inbox.topic == topic) {
            result.matched += 1;
            match inbox.sender.send(Signal::Message(value.clone())) {
                Ok(_) => result.delivered += 1,
                Err(_) => result.failed += 1,
            }
        }

        result
    }

    /// Sends `Stop` to every inbox and empties the table.
    pub(crate) fn stop_all(&self) -> usize {
        let drained: Vec<Inbox> = match self.inboxes.write() {
            Ok(mut inboxes) => inboxes.drain().map(|(_, inbox)| inbox).collect(),
            Err(_) => return 0,
        };

        drained
            .iter()
            .filter(|inbox| inbox.sender.send(Signal::Stop).is_ok())
            .count()
    }
}

/// Result of dispatching a message
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    /// Number of inboxes registered on the topic
    pub matched: usize,
    /// Number of messages delivered
    pub delivered: usize,
    /// Number of failed deliveries
    pub failed: usize,
}
