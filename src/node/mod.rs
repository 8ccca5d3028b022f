//! Message-processing nodes
//!
//! A node is a function bound to a pair of topics: it receives messages
//! published on `receiving` and its results are published on `sending`.
//! `Signal::Stop` ends a node.

mod errors;

use std::fmt;
use std::sync::Arc;

use crate::entity::{EntityDef, EntityError};
use crate::validator::{ValidationError, ROOT_PATH};
use crate::value::Value;

pub use errors::{NodeError, NodeResult};

/// Topics a node listens and answers on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topics {
    pub receiving: String,
    pub sending: String,
}

impl Topics {
    pub fn new(receiving: impl Into<String>, sending: impl Into<String>) -> Self {
        Self {
            receiving: receiving.into(),
            sending: sending.into(),
        }
    }
}

/// What a node can be sent
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Message(Value),
    Stop,
}

type Handler = Arc<dyn Fn(Value) -> NodeResult<Value> + Send + Sync>;

/// A function bound to a receiving and a sending topic
#[derive(Clone)]
pub struct Node {
    topics: Topics,
    handler: Handler,
}

impl Node {
    /// Creates a node from an infallible handler.
    pub fn new<F>(topics: Topics, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self::fallible(topics, move |value| Ok(f(value)))
    }

    /// Creates a node whose handler may fail.
    pub fn fallible<F>(topics: Topics, f: F) -> Self
    where
        F: Fn(Value) -> NodeResult<Value> + Send + Sync + 'static,
    {
        Self {
            topics,
            handler: Arc::new(f),
        }
    }

    /// Creates a node that adapts each message into an entity of `def`.
    ///
    /// Entities of `def` pass through unchanged; maps are validated; anything
    /// else is rejected.
    pub fn validating(topics: Topics, def: Arc<EntityDef>) -> Self {
        Self::fallible(topics, move |value| match value {
            Value::Entity(entity) if entity.name() == def.name() => Ok(Value::Entity(entity)),
            Value::Map(data) => Ok(Value::Entity(def.create(data)?)),
            other => {
                let err = ValidationError::type_mismatch(ROOT_PATH, def.name(), other.type_name());
                Err(NodeError::Rejected(EntityError::Validation(err)))
            }
        })
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Runs the handler on one message.
    pub fn process(&self, value: Value) -> NodeResult<Value> {
        (self.handler)(value)
    }

    /// Handles a signal: `Some(result)` for a message, `None` once stopped.
    pub fn handle(&self, signal: Signal) -> NodeResult<Option<Value>> {
        match signal {
            Signal::Message(value) => self.process(value).map(Some),
            Signal::Stop => Ok(None),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("topics", &self.topics)
            .finish_non_exhaustive()
    }
}

/// Binds `topics` first and the handler later.
///
/// ```ignore
/// let on_orders = node(Topics::new("orders", "invoices"));
/// let invoicer = on_orders(|order: Value| order);
/// ```
pub fn node<F>(topics: Topics) -> impl Fn(F) -> Node
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    move |f| Node::new(topics.clone(), f)
}
