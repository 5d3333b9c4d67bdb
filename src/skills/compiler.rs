//! Compiles `<skill>` definitions into per-level [`Skill`]s.
//!
//! A definition is parsed into three kinds of grids (general attributes,
//! effect parameters per scope, condition parameters per scope). Every
//! concrete `(level, sub_level)` found in any of them becomes one skill,
//! whose attributes and behaviour parameters are resolved through the
//! `(level, sub) → (level, -1) → (-1, -1)` fallback chain.

use std::collections::BTreeMap;

use super::grid::{Grid, LevelSet, WILDCARD};
use super::scope::{EffectScope, SkillConditionScope};
use super::skill::Skill;
use super::stat_set::StatSet;
use super::value::{
    int_attr, parse_attributes, parse_info, parse_values, Bindings, Variables,
};
use super::SkillDataError;
use crate::document::{Document, Node};
use crate::handlers::Handlers;

/// Recoverable problems met while binding handlers. Counted rather than
/// raised so one bad effect never costs the whole skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub missing_handlers: usize,
    pub failed_handlers: usize,
    pub scope_mismatches: usize,
}

/// Parameters of one `<effect>` or `<condition>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParamInfo {
    name: String,
    from_level: Option<i32>,
    to_level: Option<i32>,
    from_sub_level: Option<i32>,
    to_sub_level: Option<i32>,
    info: Grid<StatSet>,
}

impl NamedParamInfo {
    /// `fromLevel`/`toLevel` default to `level`, `fromSubLevel`/`toSubLevel`
    /// to `subLevel`. With none of them set the element applies everywhere.
    pub fn parse(node: &Node, variables: &Variables) -> Result<Self, SkillDataError> {
        let name = required_name(node)?.to_string();
        let level = int_attr(node, "level")?;
        let sub_level = int_attr(node, "subLevel")?;

        let mut info = Grid::new();
        for child in &node.children {
            parse_info(child, variables, &mut info)?;
        }

        Ok(Self {
            name,
            from_level: int_attr(node, "fromLevel")?.or(level),
            to_level: int_attr(node, "toLevel")?.or(level),
            from_sub_level: int_attr(node, "fromSubLevel")?.or(sub_level),
            to_sub_level: int_attr(node, "toSubLevel")?.or(sub_level),
            info,
        })
    }

    /// Whether this element is in range for `(level, sub_level)`. A missing
    /// bound leaves that side of the range open.
    pub fn applies_to(&self, level: i32, sub_level: i32) -> bool {
        in_range(self.from_level, self.to_level, level)
            && in_range(self.from_sub_level, self.to_sub_level, sub_level)
    }

    /// Add the keys this element declares: every concrete grid key, plus
    /// its explicit level range (at sub-level 0 unless a sub-level range is
    /// declared too).
    pub fn add_levels(&self, levels: &mut LevelSet) {
        levels.add_grid(&self.info);
        if let (Some(from), Some(to)) = (self.from_level, self.to_level) {
            for level in from..=to {
                match (self.from_sub_level, self.to_sub_level) {
                    (Some(from_sub), Some(to_sub)) => {
                        for sub in from_sub..=to_sub {
                            levels.add(level, sub);
                        }
                    }
                    _ => levels.add(level, 0),
                }
            }
        }
    }

    /// Resolved parameters for `(level, sub_level)` with the handler name
    /// stored under `.name`.
    pub fn params(&self, level: i32, sub_level: i32) -> StatSet {
        let mut params = self.info.merged(level, sub_level);
        params.set(".name", self.name.as_str());
        params
    }
}

fn required_name(node: &Node) -> Result<&str, SkillDataError> {
    node.attr("name").ok_or_else(|| SkillDataError::MissingAttribute {
        node: node.name.clone(),
        attribute: "name",
    })
}

fn in_range(from: Option<i32>, to: Option<i32>, value: i32) -> bool {
    from.is_none_or(|f| f <= value) && to.is_none_or(|t| value <= t)
}

/// Output of one document.
#[derive(Debug, Default)]
pub struct CompiledDocument {
    pub skills: Vec<Skill>,
    pub definitions: usize,
    pub failed_definitions: usize,
    pub diagnostics: Diagnostics,
}

/// Compile every `<skill>` under the document's `<list>` root. A failing
/// definition is logged and skipped; the rest of the document still loads.
pub fn compile_document(doc: &Document, handlers: &Handlers) -> CompiledDocument {
    let mut out = CompiledDocument::default();
    if doc.root.name != "list" {
        tracing::warn!(
            "[skill_db] {}: expected <list> root, found <{}>; skipping",
            doc.path.display(),
            doc.root.name
        );
        return out;
    }

    for definition in doc.root.children_named("skill") {
        out.definitions += 1;
        match compile_definition(definition, handlers, &mut out.diagnostics) {
            Ok(skills) => out.skills.extend(skills),
            Err(e) => {
                out.failed_definitions += 1;
                tracing::warn!(
                    "[skill_db] {}: skill id={} not loaded: {e}",
                    doc.path.display(),
                    definition.attr("id").unwrap_or("?")
                );
            }
        }
    }
    out
}

/// Compile one `<skill>` element into one [`Skill`] per concrete
/// `(level, sub_level)`, ordered by level then sub-level.
pub fn compile_definition(
    element: &Node,
    handlers: &Handlers,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Skill>, SkillDataError> {
    let mut skill_info: Grid<StatSet> = Grid::new();
    parse_attributes(
        element,
        "",
        skill_info.entry(WILDCARD, WILDCARD),
        &Bindings::new(),
    )?;

    // Variables are collected up front so later references resolve no
    // matter where the declaration sits.
    let mut variables = Variables::new();
    for node in element
        .children
        .iter()
        .filter(|n| n.name.eq_ignore_ascii_case("variable"))
    {
        let name = required_name(node)?;
        variables.insert(format!("@{name}"), parse_values(node)?);
    }

    let mut effect_params: BTreeMap<EffectScope, Vec<NamedParamInfo>> = BTreeMap::new();
    let mut condition_params: BTreeMap<SkillConditionScope, Vec<NamedParamInfo>> =
        BTreeMap::new();

    for node in &element.children {
        if node.name.eq_ignore_ascii_case("variable") {
            continue;
        }
        if let Some(scope) = EffectScope::find_by_name(&node.name) {
            for effect in node.children_named("effect") {
                let info = NamedParamInfo::parse(effect, &variables)?;
                effect_params.entry(scope).or_default().push(info);
            }
        } else if let Some(scope) = SkillConditionScope::find_by_xml_name(&node.name) {
            for condition in node.children_named("condition") {
                let info = NamedParamInfo::parse(condition, &variables)?;
                condition_params.entry(scope).or_default().push(info);
            }
        } else {
            parse_info(node, &variables, &mut skill_info)?;
        }
    }

    let levels = collect_levels(&skill_info, &effect_params, &condition_params)?;

    let mut skills = Vec::with_capacity(levels.len());
    for (level, sub_level) in levels.iter() {
        let mut stats = skill_info.merged(level, sub_level);
        stats.set(".level", level);
        stats.set(".subLevel", sub_level);
        let mut skill = Skill::from_stats(stats)?;

        bind_effects(&mut skill, &effect_params, handlers, diagnostics);
        bind_conditions(&mut skill, &condition_params, handlers, diagnostics);
        skills.push(skill);
    }
    Ok(skills)
}

/// Every concrete key the definition compiles into: the skill's own
/// `.fromLevel..=.toLevel` at sub-level 0, every concrete key of the
/// general grid, and every key or range declared by an effect/condition.
fn collect_levels(
    skill_info: &Grid<StatSet>,
    effect_params: &BTreeMap<EffectScope, Vec<NamedParamInfo>>,
    condition_params: &BTreeMap<SkillConditionScope, Vec<NamedParamInfo>>,
) -> Result<LevelSet, SkillDataError> {
    let mut levels = LevelSet::new();
    let general = skill_info.get(WILDCARD, WILDCARD).cloned().unwrap_or_default();
    let from_level = general.get_int_or(".fromLevel", 1)?;
    let to_level = general.get_int_or(".toLevel", 0)?;
    for level in from_level..=to_level {
        levels.add(level, 0);
    }

    levels.add_grid(skill_info);
    for info in effect_params
        .values()
        .chain(condition_params.values())
        .flatten()
    {
        info.add_levels(&mut levels);
    }
    Ok(levels)
}

fn take_name(params: &mut StatSet) -> String {
    params.remove(".name").map(|v| v.to_string()).unwrap_or_default()
}

fn bind_effects(
    skill: &mut Skill,
    effect_params: &BTreeMap<EffectScope, Vec<NamedParamInfo>>,
    handlers: &Handlers,
    diagnostics: &mut Diagnostics,
) {
    let (level, sub_level) = (skill.level(), skill.sub_level());
    for (&scope, infos) in effect_params {
        for info in infos.iter().filter(|i| i.applies_to(level, sub_level)) {
            let mut params = info.params(level, sub_level);
            let name = take_name(&mut params);
            let Some(factory) = handlers.effects.get(&name) else {
                diagnostics.missing_handlers += 1;
                tracing::warn!("[skill_db] missing effect {name} ({scope}) for {skill}");
                continue;
            };
            match factory(&params) {
                Ok(effect) => skill.add_effect(scope, effect),
                Err(e) => {
                    diagnostics.failed_handlers += 1;
                    tracing::warn!(
                        "[skill_db] failed loading effect {name} ({scope}) for {skill}: {e}"
                    );
                }
            }
        }
    }
}

fn bind_conditions(
    skill: &mut Skill,
    condition_params: &BTreeMap<SkillConditionScope, Vec<NamedParamInfo>>,
    handlers: &Handlers,
    diagnostics: &mut Diagnostics,
) {
    let (level, sub_level) = (skill.level(), skill.sub_level());
    for (&scope, infos) in condition_params {
        for info in infos.iter().filter(|i| i.applies_to(level, sub_level)) {
            let mut params = info.params(level, sub_level);
            let name = take_name(&mut params);
            let Some(factory) = handlers.conditions.get(&name) else {
                diagnostics.missing_handlers += 1;
                tracing::warn!("[skill_db] missing condition {name} ({scope}) for {skill}");
                continue;
            };

            let passive_scope = scope == SkillConditionScope::Passive;
            if skill.is_passive() && !passive_scope {
                diagnostics.scope_mismatches += 1;
                tracing::warn!("[skill_db] non passive condition {name} for passive {skill}");
            } else if !skill.is_passive() && passive_scope {
                diagnostics.scope_mismatches += 1;
                tracing::warn!("[skill_db] passive condition {name} for non passive {skill}");
            }

            match factory(&params) {
                Ok(condition) => skill.add_condition(scope, condition),
                Err(e) => {
                    diagnostics.failed_handlers += 1;
                    tracing::warn!(
                        "[skill_db] failed loading condition {name} ({scope}) for {skill}: {e}"
                    );
                }
            }
        }
    }
}
