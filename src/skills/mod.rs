//! Skill definition model and compiler.
//!
//! Definitions are parsed into sparse level grids ([`grid`]), resolved
//! into per-level attribute sets ([`value`], [`stat_set`]) and compiled
//! into [`Skill`]s ([`compiler`]), which are indexed in a [`SkillTable`].

pub mod compiler;
pub mod error;
pub mod expr;
pub mod grid;
pub mod scope;
pub mod skill;
pub mod stat_set;
pub mod table;
pub mod value;

pub use compiler::{
    compile_definition, compile_document, CompiledDocument, Diagnostics, NamedParamInfo,
};
pub use error::SkillDataError;
pub use grid::{Grid, LevelSet, WILDCARD};
pub use scope::{EffectScope, SkillConditionScope};
pub use skill::Skill;
pub use stat_set::{StatSet, StatSetError, Value};
pub use table::{skill_hash_code, SkillTable, SkillTableBuilder};
