//! Runtime data tables built from the skill documents.

pub mod enchant_db;
pub mod skill_db;

pub use enchant_db::EnchantRoutes;
pub use skill_db::{build_table, LoadReport, ReloadListener, SkillData};
