//! Sparse level × sub-level storage with wildcard fallback.

use std::collections::{BTreeMap, BTreeSet};

use super::stat_set::StatSet;

/// Level or sub-level key meaning "every level/sub-level without a more
/// specific entry".
pub const WILDCARD: i32 = -1;

/// Two-level sparse map: level → sub-level → `T`.
///
/// Ordered maps keep iteration (and therefore effect attachment order and
/// log output) deterministic across runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    cells: BTreeMap<i32, BTreeMap<i32, T>>,
}

impl<T> Default for Grid<T> {
    fn default() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }
}

impl<T> Grid<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, level: i32, sub_level: i32) -> Option<&T> {
        self.cells.get(&level).and_then(|subs| subs.get(&sub_level))
    }

    pub fn insert(&mut self, level: i32, sub_level: i32, value: T) {
        self.cells.entry(level).or_default().insert(sub_level, value);
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(BTreeMap::is_empty)
    }

    /// All `(level, sub_level, value)` cells, wildcards included.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, &T)> {
        self.cells
            .iter()
            .flat_map(|(&level, subs)| subs.iter().map(move |(&sub, v)| (level, sub, v)))
    }

    /// Cells where neither axis is the wildcard.
    pub fn concrete_keys(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.iter()
            .filter(|&(level, sub, _)| level != WILDCARD && sub != WILDCARD)
            .map(|(level, sub, _)| (level, sub))
    }
}

impl<T: Default> Grid<T> {
    pub fn entry(&mut self, level: i32, sub_level: i32) -> &mut T {
        self.cells.entry(level).or_default().entry(sub_level).or_default()
    }
}

impl Grid<StatSet> {
    /// Resolve the attribute set for a concrete `(level, sub_level)`.
    ///
    /// Starts from the exact cell, then fills missing keys from
    /// `(level, -1)` and finally from `(-1, -1)`. A key found earlier in
    /// that chain is never replaced.
    pub fn merged(&self, level: i32, sub_level: i32) -> StatSet {
        let mut set = self.get(level, sub_level).cloned().unwrap_or_default();
        if let Some(level_general) = self.get(level, WILDCARD) {
            set.fill_missing_from(level_general);
        }
        if let Some(general) = self.get(WILDCARD, WILDCARD) {
            set.fill_missing_from(general);
        }
        set
    }
}

/// The concrete `(level, sub_level)` pairs a definition compiles into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelSet {
    levels: BTreeMap<i32, BTreeSet<i32>>,
}

impl LevelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, level: i32, sub_level: i32) {
        self.levels.entry(level).or_default().insert(sub_level);
    }

    /// Add every concrete key of `grid`.
    pub fn add_grid<T>(&mut self, grid: &Grid<T>) {
        for (level, sub) in grid.concrete_keys() {
            self.add(level, sub);
        }
    }

    pub fn len(&self) -> usize {
        self.levels.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, level: i32, sub_level: i32) -> bool {
        self.levels.get(&level).is_some_and(|s| s.contains(&sub_level))
    }

    /// Pairs in ascending level, then sub-level order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.levels
            .iter()
            .flat_map(|(&level, subs)| subs.iter().map(move |&sub| (level, sub)))
    }
}
