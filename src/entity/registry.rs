//! Registry of entity definitions by name
//!
//! Definitions refer back to the registry they were defined in through a weak
//! handle so embedded fields can resolve other entities by name at
//! validation time without keeping the registry alive.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock, Weak};

use tracing::debug;

use super::def::{EntityDef, EntityDefBuilder};
use super::errors::{EntityError, EntityResult};
use super::instance::Entity;
use crate::frozen::FrozenMap;
use crate::validator::ValidationError;
use crate::value::Value;

type Definitions = RwLock<BTreeMap<String, Arc<EntityDef>>>;

/// Slot shared by a definition and its embedded validators, filled once the
/// definition joins a registry.
pub(crate) type RegistrySlot = Arc<OnceLock<WeakRegistry>>;

/// Non-owning handle to a registry
#[derive(Clone)]
pub(crate) struct WeakRegistry {
    inner: Weak<Definitions>,
}

impl WeakRegistry {
    pub(crate) fn upgrade(&self) -> Option<EntityRegistry> {
        self.inner.upgrade().map(|inner| EntityRegistry { inner })
    }
}

impl fmt::Debug for WeakRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakRegistry")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Cloneable handle to a set of entity definitions
#[derive(Clone, Default)]
pub struct EntityRegistry {
    inner: Arc<Definitions>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a definition that registers itself here when built.
    pub fn define(&self, name: impl Into<String>) -> EntityDefBuilder {
        EntityDefBuilder::new(name).registry(self.clone())
    }

    /// Registers a definition.
    ///
    /// Names are unique; a second definition under the same name is rejected.
    pub fn register(&self, def: Arc<EntityDef>) -> EntityResult<()> {
        let mut defs = self
            .inner
            .write()
            .map_err(|_| EntityError::Internal("Lock poisoned".into()))?;

        if defs.contains_key(def.name()) {
            return Err(EntityError::DuplicateEntity(def.name().to_string()));
        }

        def.bind(self.downgrade());
        debug!(entity = def.name(), fields = def.fields().len(), "Registered entity");
        defs.insert(def.name().to_string(), def);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<EntityDef>> {
        self.inner
            .read()
            .ok()
            .and_then(|defs| defs.get(name).cloned())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner
            .read()
            .map(|defs| defs.contains_key(name))
            .unwrap_or(false)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|defs| defs.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|defs| defs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates an instance of the named entity.
    pub fn create(&self, name: &str, data: FrozenMap<String, Value>) -> EntityResult<Entity> {
        let def = self
            .get(name)
            .ok_or_else(|| EntityError::UnknownEntity(name.to_string()))?;
        def.create(data)
    }

    /// Checks that every embedded reference by name resolves.
    pub fn check_references(&self) -> EntityResult<()> {
        let defs: Vec<Arc<EntityDef>> = self
            .inner
            .read()
            .map_err(|_| EntityError::Internal("Lock poisoned".into()))?
            .values()
            .cloned()
            .collect();

        defs.iter().try_for_each(|def| self.check_definition(def))
    }

    /// Checks the embedded references of a single definition, then the
    /// defaults that depend on them.
    pub fn check_definition(&self, def: &EntityDef) -> EntityResult<()> {
        for field in def.fields() {
            for target in field.kind().named_refs() {
                if !self.contains(target) {
                    let path = format!("{}.{}", def.name(), field.key());
                    return Err(ValidationError::unknown_entity(path, target).into());
                }
            }
        }
        Ok(def.check_deferred_defaults()?)
    }

    pub(crate) fn downgrade(&self) -> WeakRegistry {
        WeakRegistry {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("entities", &self.names())
            .finish()
    }
}
