//! Enchant routes derived from the skill table.
//!
//! An enchanted skill level is stored under a sub-level of the form
//! `route * 1000 + enchant`. The first enchant of every route
//! (`sub_level % 1000 == 1`) marks the route as available for that skill
//! level. The table is rebuilt whenever the skill table is reloaded.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use super::skill_db::ReloadListener;
use crate::skills::{Skill, SkillTable};

const ROUTE_STRIDE: i32 = 1000;

/// `(skill id, level)` → enchant routes available at that level.
#[derive(Debug, Default)]
pub struct EnchantRoutes {
    routes: RwLock<BTreeMap<(u32, i32), BTreeSet<i32>>>,
}

impl EnchantRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `skill`'s route if it is the first enchant of one.
    /// Returns the route id when one was recorded.
    pub fn add_route_for_skill(&self, skill: &Skill) -> Option<i32> {
        let route = route_of(skill.sub_level())?;
        self.routes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry((skill.id(), skill.level()))
            .or_default()
            .insert(route);
        Some(route)
    }

    /// Routes for `(id, level)` in ascending order.
    pub fn routes_for(&self, id: u32, level: i32) -> Vec<i32> {
        self.routes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(id, level))
            .map(|r| r.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_enchantable(&self, id: u32, level: i32) -> bool {
        !self.routes_for(id, level).is_empty()
    }

    /// Number of `(id, level)` pairs with at least one route.
    pub fn len(&self) -> usize {
        self.routes.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn route_of(sub_level: i32) -> Option<i32> {
    (sub_level > 0 && sub_level % ROUTE_STRIDE == 1).then_some(sub_level / ROUTE_STRIDE)
}

impl ReloadListener for EnchantRoutes {
    fn on_reload(&self, table: &SkillTable) {
        // build the new map before taking the write lock
        let mut routes: BTreeMap<(u32, i32), BTreeSet<i32>> = BTreeMap::new();
        for skill in table.iter() {
            if let Some(route) = route_of(skill.sub_level()) {
                routes.entry((skill.id(), skill.level())).or_default().insert(route);
            }
        }
        let count = routes.len();
        *self.routes.write().unwrap_or_else(|e| e.into_inner()) = routes;
        tracing::info!("[enchant_db] {count} enchantable skill levels");
    }
}
