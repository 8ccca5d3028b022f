//! Topic bus and node scheduling
//!
//! Nodes never talk to each other directly: results go to the bus under
//! the node's sending topic, and the scheduler forwards bus messages to the
//! nodes receiving on that topic.
//!
//! ```ignore
//! let bus = MessageBus::new(1024);
//! let scheduler = Scheduler::new(bus.clone());
//! scheduler.schedule_node(Node::new(Topics::new("in", "out"), |v| v))?;
//! bus.publish("in", Value::from("hello"))?;
//! ```

mod bus;
mod errors;
mod routing;
#[allow(clippy::module_inception)]
mod scheduler;

pub use bus::MessageBus;
pub use errors::{SchedulerError, SchedulerResult};
pub use routing::DispatchResult;
pub use scheduler::Scheduler;

/// Identifier of a scheduled node
pub type NodeId = String;
