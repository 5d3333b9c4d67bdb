use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use skilldata::config::LoaderConfig;
use skilldata::database::{EnchantRoutes, SkillData};
use skilldata::handlers::Handlers;
use skilldata::skills::{EffectScope, Skill, SkillConditionScope};

const USAGE: &str = "Usage: skill_inspect [--conf FILE] [--skill ID LEVEL [SUBLEVEL]] [--siege]";
const DEFAULT_CONF: &str = "conf/skills.yaml";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut conf_file: Option<String> = None;
    let mut query: Option<(u32, i32, i32)> = None;
    let mut siege = false;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "--h" | "--?" | "/?" => {
                println!("{USAGE}");
                return Ok(());
            }
            "--conf" => {
                if i + 1 < args.len() {
                    i += 1;
                    conf_file = Some(args[i].clone());
                } else {
                    eprintln!("Error: --conf requires a FILE argument");
                    return Ok(());
                }
            }
            "--skill" => {
                if i + 2 >= args.len() {
                    eprintln!("Error: --skill requires ID and LEVEL");
                    return Ok(());
                }
                let (raw_id, raw_level) = (&args[i + 1], &args[i + 2]);
                let id = raw_id
                    .parse()
                    .with_context(|| format!("Bad skill id: {raw_id}"))?;
                let level = raw_level
                    .parse()
                    .with_context(|| format!("Bad level: {raw_level}"))?;
                i += 2;
                let mut sub_level = 0;
                if let Some(raw) = args.get(i + 1).filter(|a| !a.starts_with("--")) {
                    sub_level = raw.parse().with_context(|| format!("Bad sub level: {raw}"))?;
                    i += 1;
                }
                query = Some((id, level, sub_level));
            }
            "--siege" => siege = true,
            other => eprintln!("Ignoring unknown argument: {other}"),
        }
        i += 1;
    }

    let config = match conf_file {
        Some(path) => {
            LoaderConfig::from_file(&path).with_context(|| format!("Cannot load config: {path}"))?
        }
        None if Path::new(DEFAULT_CONF).exists() => LoaderConfig::from_file(DEFAULT_CONF)?,
        None => LoaderConfig::default(),
    };
    tracing::info!("[skill_inspect] reading {}", config.skills_path().display());

    let data = SkillData::new(config, Handlers::with_builtins());
    let routes = Arc::new(EnchantRoutes::new());
    data.add_listener(routes.clone());

    let report = data.load().context("Cannot load skills")?;
    println!("{report}");
    println!("{} enchantable skill levels", routes.len());

    if let Some((id, level, sub_level)) = query {
        match data.get_skill_sub(id, level, sub_level) {
            Some(skill) => {
                print_skill(&skill);
                let enchant = routes.routes_for(skill.id(), skill.level());
                if !enchant.is_empty() {
                    println!("  enchant routes: {enchant:?}");
                }
            }
            None => println!("No skill id={id} level={level} subLevel={sub_level}"),
        }
    }

    if siege {
        for skill in data.get_siege_skills(true, true) {
            println!("{skill}");
        }
    }

    Ok(())
}

fn print_skill(skill: &Skill) {
    println!("{skill}");
    println!(
        "  operateType={} magicLevel={} castRange={} reuseDelay={} hitTime={} mpConsume={}",
        skill.operate_type().unwrap_or("-"),
        skill.magic_level(),
        skill.cast_range(),
        skill.reuse_delay(),
        skill.hit_time(),
        skill.mp_consume()
    );

    let mut stats: Vec<_> = skill.stats().iter().collect();
    stats.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in stats {
        println!("  {key} = {value}");
    }

    for scope in EffectScope::ALL {
        for effect in skill.effects(scope) {
            println!("  [{scope}] effect {effect:?}");
        }
    }
    for scope in SkillConditionScope::ALL {
        for condition in skill.conditions(scope) {
            println!("  [{scope}] condition {condition:?}");
        }
    }
}
