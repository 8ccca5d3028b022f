//! nonobvious - immutable, validated domain models
//!
//! - `frozen`: persistent map, list and set containers
//! - `value`: the dynamic value model entities are built from
//! - `validator`: composable validators with path-aware errors
//! - `entity`: declarative entity definitions, instances and the registry
//! - `funk`: functional combinators
//! - `node` / `scheduler`: message-processing nodes wired through a topic bus

pub mod cli;
pub mod config;
pub mod entity;
pub mod frozen;
pub mod funk;
pub mod node;
pub mod observability;
pub mod scheduler;
pub mod validator;
pub mod value;

pub use entity::{Entity, EntityDef, EntityError, EntityRegistry, Field};
pub use value::Value;
