use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::scope::{EffectScope, SkillConditionScope};
use super::stat_set::{StatSet, StatSetError};
use super::table::skill_hash_code;
use crate::handlers::{Caster, Effect, SkillCondition};

/// One compiled `(id, level, sub_level)` of a skill.
///
/// Built by the definition compiler and shared read-only as `Arc<Skill>`
/// once it enters a [`SkillTable`](super::SkillTable).
pub struct Skill {
    id: u32,
    level: i32,
    sub_level: i32,
    name: String,
    operate_type: Option<String>,
    magic_level: i32,
    cast_range: i32,
    reuse_delay: i32,
    hit_time: i32,
    mp_consume: i32,
    stats: StatSet,
    effects: BTreeMap<EffectScope, Vec<Arc<dyn Effect>>>,
    conditions: BTreeMap<SkillConditionScope, Vec<Arc<dyn SkillCondition>>>,
}

impl Skill {
    /// Build a skill from its merged attribute set. `.id`, `.level` and
    /// `.subLevel` are required.
    pub fn from_stats(stats: StatSet) -> Result<Self, StatSetError> {
        let raw_id = stats.get_i64(".id")?;
        let id = u32::try_from(raw_id).map_err(|_| StatSetError::WrongType {
            key: ".id".to_string(),
            expected: "unsigned 32-bit id",
            found: raw_id.to_string(),
        })?;

        let operate_type = if stats.contains("operateType") {
            Some(stats.get_string("operateType")?)
        } else {
            None
        };

        Ok(Self {
            id,
            level: stats.get_int(".level")?,
            sub_level: stats.get_int(".subLevel")?,
            name: stats.get_string_or(".name", "")?,
            operate_type,
            magic_level: stats.get_int_or("magicLevel", 0)?,
            cast_range: stats.get_int_or("castRange", 0)?,
            reuse_delay: stats.get_int_or("reuseDelay", 0)?,
            hit_time: stats.get_int_or("hitTime", 0)?,
            mp_consume: stats.get_int_or("mpConsume", 0)?,
            stats,
            effects: BTreeMap::new(),
            conditions: BTreeMap::new(),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn sub_level(&self) -> i32 {
        self.sub_level
    }

    pub fn hash_code(&self) -> i64 {
        skill_hash_code(self.id, self.level, self.sub_level)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operate_type(&self) -> Option<&str> {
        self.operate_type.as_deref()
    }

    pub fn is_passive(&self) -> bool {
        self.operate_type.as_deref().is_some_and(|t| t.eq_ignore_ascii_case("P"))
    }

    pub fn magic_level(&self) -> i32 {
        self.magic_level
    }

    pub fn cast_range(&self) -> i32 {
        self.cast_range
    }

    pub fn reuse_delay(&self) -> i32 {
        self.reuse_delay
    }

    pub fn hit_time(&self) -> i32 {
        self.hit_time
    }

    pub fn mp_consume(&self) -> i32 {
        self.mp_consume
    }

    /// Every merged attribute of this level, metadata keys included.
    pub fn stats(&self) -> &StatSet {
        &self.stats
    }

    pub fn effects(&self, scope: EffectScope) -> &[Arc<dyn Effect>] {
        self.effects.get(&scope).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn conditions(&self, scope: SkillConditionScope) -> &[Arc<dyn SkillCondition>] {
        self.conditions.get(&scope).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when every condition of `scope` accepts `caster`.
    pub fn check_conditions(&self, scope: SkillConditionScope, caster: &dyn Caster) -> bool {
        self.conditions(scope).iter().all(|c| c.can_use(caster, self))
    }

    pub(crate) fn add_effect(&mut self, scope: EffectScope, effect: Arc<dyn Effect>) {
        self.effects.entry(scope).or_default().push(effect);
    }

    pub(crate) fn add_condition(
        &mut self,
        scope: SkillConditionScope,
        condition: Arc<dyn SkillCondition>,
    ) {
        self.conditions.entry(scope).or_default().push(condition);
    }
}

impl fmt::Debug for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Skill")
            .field("id", &self.id)
            .field("level", &self.level)
            .field("sub_level", &self.sub_level)
            .field("name", &self.name)
            .field("operate_type", &self.operate_type)
            .field("effects", &self.effects)
            .field("conditions", &self.conditions)
            .finish()
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Skill[{}] id={} level={} subLevel={}",
            self.name, self.id, self.level, self.sub_level
        )
    }
}
