//! Named effect and condition factories.
//!
//! Skill documents refer to behaviours by name (`<effect name="...">`).
//! The compiler resolves those names against a [`Handlers`] bundle; every
//! registered name maps to a factory that builds the behaviour from its
//! resolved parameter set.

pub mod conditions;
pub mod effects;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::skills::{Skill, StatSet, StatSetError};

/// Failure while building a behaviour from its parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandlerError {
    #[error("bad parameter: {0}")]
    Param(#[from] StatSetError),

    #[error("invalid '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Runtime view of a creature, supplied by the game world.
pub trait Caster {
    fn object_id(&self) -> i32;
    fn level(&self) -> i32;

    fn current_hp_percent(&self) -> f64 {
        100.0
    }

    fn assassination_points(&self) -> i32 {
        0
    }

    fn is_in_water(&self) -> bool {
        false
    }

    /// Instance zone id, `0` outside instances.
    fn instance_id(&self) -> i32 {
        0
    }

    /// Whether this creature is of `instance_type` (e.g. `Player`,
    /// `Monster`). Every creature is a `Creature`.
    fn is_instance_type(&self, instance_type: &str) -> bool {
        instance_type == "Creature"
    }
}

/// An effect attached to a skill.
pub trait Effect: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;
}

/// A precondition attached to a skill.
pub trait SkillCondition: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn can_use(&self, caster: &dyn Caster, skill: &Skill) -> bool;
}

/// Builds a behaviour from its parameter set.
pub type Factory<T> = Arc<dyn Fn(&StatSet) -> Result<Arc<T>, HandlerError> + Send + Sync>;

/// Name → factory map for one behaviour family.
pub struct HandlerRegistry<T: ?Sized> {
    factories: HashMap<String, Factory<T>>,
}

impl<T: ?Sized> Default for HandlerRegistry<T> {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }
}

impl<T: ?Sized> HandlerRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&StatSet) -> Result<Arc<T>, HandlerError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn get(&self, name: &str) -> Option<&Factory<T>> {
        self.factories.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl<T: ?Sized> fmt::Debug for HandlerRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("HandlerRegistry").field("names", &names).finish()
    }
}

/// Effect and condition registries used by one load.
#[derive(Debug, Default)]
pub struct Handlers {
    pub effects: HandlerRegistry<dyn Effect>,
    pub conditions: HandlerRegistry<dyn SkillCondition>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registries pre-populated with the handlers shipped in this crate.
    pub fn with_builtins() -> Self {
        let mut handlers = Self::new();
        effects::register_builtins(&mut handlers.effects);
        conditions::register_builtins(&mut handlers.conditions);
        handlers
    }
}
