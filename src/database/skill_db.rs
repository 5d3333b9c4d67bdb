//! Process-wide skill table.
//!
//! `SkillData` owns the currently published [`SkillTable`]. A load compiles
//! every document into a fresh table off to the side and then swaps it in,
//! so readers either see the previous table or the new one, never a mix.

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use rayon::prelude::*;

use crate::config::LoaderConfig;
use crate::document::{DirectorySource, DocumentSource};
use crate::handlers::Handlers;
use crate::skills::{
    compile_document, Diagnostics, Skill, SkillDataError, SkillTable, SkillTableBuilder,
};

/// Counters from one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub documents: usize,
    pub definitions: usize,
    pub failed_definitions: usize,
    pub skills: usize,
    pub missing_handlers: usize,
    pub failed_handlers: usize,
    pub scope_mismatches: usize,
    pub duplicates: usize,
}

impl LoadReport {
    fn add_diagnostics(&mut self, diagnostics: Diagnostics) {
        self.missing_handlers += diagnostics.missing_handlers;
        self.failed_handlers += diagnostics.failed_handlers;
        self.scope_mismatches += diagnostics.scope_mismatches;
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} skills from {} definitions in {} documents",
            self.skills, self.definitions, self.documents
        )?;
        write!(
            f,
            " ({} failed, {} duplicates",
            self.failed_definitions, self.duplicates
        )?;
        write!(
            f,
            ", {} missing handlers, {} failed handlers",
            self.missing_handlers, self.failed_handlers
        )?;
        write!(f, ", {} scope mismatches)", self.scope_mismatches)
    }
}

/// Notified with the freshly published table after every successful load.
pub trait ReloadListener: Send + Sync {
    fn on_reload(&self, table: &SkillTable);
}

/// Compile every document of `source` into a new table.
///
/// Documents are compiled in parallel but inserted in source order, so a
/// later document overrides an earlier one for the same key.
pub fn build_table(
    source: &dyn DocumentSource,
    handlers: &Handlers,
    config: &LoaderConfig,
) -> Result<(SkillTable, LoadReport), SkillDataError> {
    let documents = source.documents()?;
    let compiled: Vec<_> = documents
        .par_iter()
        .map(|doc| (doc, compile_document(doc, handlers)))
        .collect();

    let mut report = LoadReport {
        documents: documents.len(),
        ..LoadReport::default()
    };
    let mut builder = SkillTableBuilder::new();
    for (doc, out) in compiled {
        tracing::debug!(
            "[skill_db] {}: {} definitions, {} skills",
            doc.path.display(),
            out.definitions,
            out.skills.len()
        );
        report.definitions += out.definitions;
        report.failed_definitions += out.failed_definitions;
        report.add_diagnostics(out.diagnostics);
        for skill in out.skills {
            let (id, level, sub_level) = (skill.id(), skill.level(), skill.sub_level());
            if builder.insert(skill) && config.warn_on_duplicate {
                tracing::warn!(
                    "[skill_db] {}: duplicate skill id={id} level={level} subLevel={sub_level}",
                    doc.path.display()
                );
            }
        }
    }

    report.duplicates = builder.duplicates();
    report.skills = builder.len();
    Ok((builder.build(), report))
}

/// Loaded skills plus the machinery to reload them.
pub struct SkillData {
    config: LoaderConfig,
    handlers: Handlers,
    source: Box<dyn DocumentSource>,
    table: RwLock<Arc<SkillTable>>,
    load_lock: Mutex<()>,
    listeners: RwLock<Vec<Arc<dyn ReloadListener>>>,
}

impl SkillData {
    /// Service reading from the directories named by `config`. Nothing is
    /// loaded until [`load`](Self::load).
    pub fn new(config: LoaderConfig, handlers: Handlers) -> Self {
        let source = DirectorySource::from_config(&config);
        Self::with_source(config, handlers, Box::new(source))
    }

    pub fn with_source(
        config: LoaderConfig,
        handlers: Handlers,
        source: Box<dyn DocumentSource>,
    ) -> Self {
        Self {
            config,
            handlers,
            source,
            table: RwLock::new(Arc::new(SkillTable::default())),
            load_lock: Mutex::new(()),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Build a new table and publish it. On error the previous table stays.
    pub fn load(&self) -> Result<LoadReport, SkillDataError> {
        // one load at a time; a poisoned lock only means an earlier load panicked
        let _guard = self.load_lock.lock().unwrap_or_else(|e| e.into_inner());

        let (table, report) = build_table(self.source.as_ref(), &self.handlers, &self.config)?;
        let table = Arc::new(table);
        {
            let mut current = self.table.write().unwrap_or_else(|e| e.into_inner());
            *current = Arc::clone(&table);
        }
        tracing::info!("[skill_db] Loaded {report}");

        let listeners = self.listeners.read().unwrap_or_else(|e| e.into_inner()).clone();
        for listener in listeners {
            listener.on_reload(&table);
        }
        Ok(report)
    }

    /// Same as [`load`](Self::load); kept separate for call sites that
    /// mean "replace what is there".
    pub fn reload(&self) -> Result<LoadReport, SkillDataError> {
        self.load()
    }

    pub fn add_listener(&self, listener: Arc<dyn ReloadListener>) {
        self.listeners.write().unwrap_or_else(|e| e.into_inner()).push(listener);
    }

    /// Snapshot of the current table. Stays valid across reloads.
    pub fn table(&self) -> Arc<SkillTable> {
        Arc::clone(&*self.table.read().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn get_skill(&self, id: u32, level: i32) -> Option<Arc<Skill>> {
        self.get_skill_sub(id, level, 0)
    }

    pub fn get_skill_sub(&self, id: u32, level: i32, sub_level: i32) -> Option<Arc<Skill>> {
        self.table().get_skill(id, level, sub_level)
    }

    pub fn get_max_level(&self, id: u32) -> i32 {
        self.table().max_level(id)
    }

    pub fn get_siege_skills(&self, add_noble: bool, has_castle: bool) -> Vec<Arc<Skill>> {
        self.table().siege_skills(add_noble, has_castle)
    }
}

impl fmt::Debug for SkillData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillData")
            .field("config", &self.config)
            .field("handlers", &self.handlers)
            .field("skills", &self.table().len())
            .finish()
    }
}

static SKILL_DATA: OnceLock<SkillData> = OnceLock::new();

/// Create the process-wide instance with the built-in handlers and load it.
///
/// The instance is only registered once its first load succeeds, so a
/// failed call can be retried. Later calls return the registered instance
/// untouched.
pub fn init(config: LoaderConfig) -> Result<&'static SkillData, SkillDataError> {
    if let Some(data) = SKILL_DATA.get() {
        return Ok(data);
    }
    let data = SkillData::new(config, Handlers::with_builtins());
    data.load()?;
    // a concurrent init may have registered first; its instance wins
    Ok(SKILL_DATA.get_or_init(|| data))
}

/// The process-wide instance, once [`init`] has run.
pub fn instance() -> Option<&'static SkillData> {
    SKILL_DATA.get()
}
