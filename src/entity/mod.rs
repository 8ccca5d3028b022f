//! Entities: declarative, validated, immutable domain models
//!
//! Design principles:
//! - A definition is an ordered list of typed fields
//! - Construction validates every field; on any failure nothing is built
//! - Instances never change; updates produce new, re-validated instances
//! - Definitions are registered by name so fields can embed other entities

mod def;
mod embedded;
mod errors;
mod field;
mod instance;
mod loader;
mod registry;

pub use def::{EntityDef, EntityDefBuilder};
pub use errors::{EntityError, EntityResult};
pub use field::{EntityRef, Field, FieldKind};
pub use instance::Entity;
pub use loader::DefinitionLoader;
pub use registry::EntityRegistry;
