//! Frozen skill index and the builder that produces it.

use std::collections::HashMap;
use std::sync::Arc;

use super::skill::Skill;

/// Seal of Ruler.
pub const SEAL_OF_RULER: u32 = 246;
pub const BUILD_HEADQUARTERS: u32 = 247;
pub const BUILD_ADVANCED_HEADQUARTERS: u32 = 326;
pub const OUTPOST_CONSTRUCTION: u32 = 844;
pub const OUTPOST_DEMOLITION: u32 = 845;

/// Composite lookup key: `id * 2^32 + sub_level * 65536 + level`.
///
/// Level and sub-level occupy disjoint 16-bit ranges below the id, so the
/// key is unique while both stay within `0..65536`. Ids above `i32::MAX`
/// wrap into the negative range, which keeps the key unique.
pub fn skill_hash_code(id: u32, level: i32, sub_level: i32) -> i64 {
    i64::from(id)
        .wrapping_mul(4_294_967_296)
        .wrapping_add(i64::from(sub_level) * 65_536)
        .wrapping_add(i64::from(level))
}

/// Immutable skill index. A new table is built for every load and swapped
/// in whole; it is never mutated after [`SkillTableBuilder::build`].
#[derive(Debug, Default)]
pub struct SkillTable {
    skills: HashMap<i64, Arc<Skill>>,
    max_levels: HashMap<u32, i32>,
}

impl SkillTable {
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Exact lookup, no fallback.
    pub fn get_exact(&self, id: u32, level: i32, sub_level: i32) -> Option<&Arc<Skill>> {
        self.skills.get(&skill_hash_code(id, level, sub_level))
    }

    /// Lookup with the max-level fallback.
    ///
    /// When the exact key is missing and `level` exceeds the highest known
    /// level of `id`, the skill at `(id, max_level, 0)` is returned instead.
    /// That second lookup does not fall back any further.
    pub fn get_skill(&self, id: u32, level: i32, sub_level: i32) -> Option<Arc<Skill>> {
        if let Some(skill) = self.get_exact(id, level, sub_level) {
            return Some(Arc::clone(skill));
        }

        let max_level = self.max_level(id);
        if max_level > 0 && level > max_level {
            tracing::warn!(
                "[skill_db] call to unexisting skill level id={id} level={level} max={max_level}"
            );
            return self.get_exact(id, max_level, 0).cloned();
        }

        tracing::warn!(
            "[skill_db] no skill info found for skill id={id} level={level} subLevel={sub_level}"
        );
        None
    }

    /// Highest level seen for `id`, `0` when unknown.
    pub fn max_level(&self, id: u32) -> i32 {
        self.max_levels.get(&id).copied().unwrap_or(0)
    }

    /// Siege skills at level 1. `add_noble` adds Build Advanced
    /// Headquarters, `has_castle` the outpost skills. Ids missing from the
    /// table are left out.
    pub fn siege_skills(&self, add_noble: bool, has_castle: bool) -> Vec<Arc<Skill>> {
        let mut ids = vec![SEAL_OF_RULER, BUILD_HEADQUARTERS];
        if add_noble {
            ids.push(BUILD_ADVANCED_HEADQUARTERS);
        }
        if has_castle {
            ids.push(OUTPOST_CONSTRUCTION);
            ids.push(OUTPOST_DEMOLITION);
        }
        ids.into_iter()
            .filter_map(|id| self.get_exact(id, 1, 0).cloned())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Skill>> {
        self.skills.values()
    }
}

/// Mutable build state for a [`SkillTable`]. Never visible to readers.
#[derive(Debug, Default)]
pub struct SkillTableBuilder {
    table: SkillTable,
    duplicates: usize,
}

impl SkillTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `skill`, replacing any earlier skill with the same key.
    /// Returns `true` when an earlier entry was replaced.
    pub fn insert(&mut self, skill: Skill) -> bool {
        let id = skill.id();
        let level = skill.level();
        let replaced = self.table.skills.insert(skill.hash_code(), Arc::new(skill)).is_some();
        if replaced {
            self.duplicates += 1;
        }
        self.table
            .max_levels
            .entry(id)
            .and_modify(|max| *max = (*max).max(level))
            .or_insert(level);
        replaced
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn build(self) -> SkillTable {
        self.table
    }
}
