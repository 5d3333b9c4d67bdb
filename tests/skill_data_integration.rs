use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use skilldata::config::LoaderConfig;
use skilldata::database::{EnchantRoutes, SkillData};
use skilldata::handlers::{Caster, Handlers};
use skilldata::skills::{EffectScope, SkillConditionScope};

const MAIN_SKILLS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<list>
    <skill id="3" toLevel="3" name="Power Strike">
        <!-- shared by every level -->
        <operateType>A1</operateType>
        <castRange>40</castRange>
        <variable name="power">
            <value level="1">25</value>
            <value level="2">27</value>
            <value level="3">30</value>
        </variable>
        <mpConsume>
            <value fromLevel="1" toLevel="3">{8 + index}</value>
        </mpConsume>
        <conditions>
            <condition name="NotInUnderwater"/>
            <condition name="AssassinationPoints" fromLevel="3" toLevel="3">
                <amount>2</amount>
            </condition>
        </conditions>
        <effects>
            <effect name="TriggerSkillByDamage">
                <skillId>5123</skillId>
                <chance>@power</chance>
            </effect>
            <effect name="NotRegistered"/>
        </effects>
        <pvpEffects>
            <effect name="TriggerSkillByDamage" fromLevel="3" toLevel="3"
                    fromSubLevel="1001" toSubLevel="1002">
                <skillId>5124</skillId>
            </effect>
        </pvpEffects>
    </skill>
    <skill id="246" toLevel="1" name="Seal of Ruler"/>
    <skill id="247" toLevel="1" name="Build Headquarters"/>
    <skill id="845" toLevel="1" name="Outpost Demolition"/>
    <skill id="900" toLevel="1" name="Broken">
        <castRange>@undefined</castRange>
    </skill>
</list>
"#;

const CUSTOM_SKILLS: &str = r#"<list>
    <skill id="3" toLevel="1" name="Custom Strike">
        <operateType>A1</operateType>
    </skill>
</list>
"#;

struct Fighter {
    in_water: bool,
    points: i32,
}

impl Caster for Fighter {
    fn object_id(&self) -> i32 {
        10
    }

    fn level(&self) -> i32 {
        40
    }

    fn is_in_water(&self) -> bool {
        self.in_water
    }

    fn assassination_points(&self) -> i32 {
        self.points
    }
}

/// Fresh data pack under the temp dir; removed again on drop.
struct DataPack {
    root: PathBuf,
}

impl DataPack {
    fn new(name: &str) -> Self {
        let root =
            std::env::temp_dir().join(format!("skilldata_it_{name}_{}", std::process::id()));
        fs::remove_dir_all(&root).ok();
        fs::create_dir_all(root.join("stats/skills/custom")).unwrap();
        Self { root }
    }

    fn write(&self, relative: &str, contents: &str) {
        fs::write(self.root.join(relative), contents).unwrap();
    }

    fn config(&self) -> LoaderConfig {
        LoaderConfig {
            data_dir: self.root.to_string_lossy().into_owned(),
            ..LoaderConfig::default()
        }
    }
}

impl Drop for DataPack {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.root).ok();
    }
}

#[test]
fn test_load_from_directory() {
    let pack = DataPack::new("load");
    pack.write("stats/skills/00001-00099.xml", MAIN_SKILLS);
    pack.write("stats/skills/readme.txt", "not a skill document");
    pack.write("stats/skills/broken.xml", "<list><skill id=\"1\"></list>");

    let data = SkillData::new(pack.config(), Handlers::with_builtins());
    let report = data.load().unwrap();

    assert_eq!(report.documents, 1);
    assert_eq!(report.definitions, 5);
    assert_eq!(report.failed_definitions, 1);
    // levels 1..=3 plus the two enchanted sub-levels of level 3
    assert_eq!(data.get_max_level(3), 3);
    assert_eq!(report.skills, 5 + 3);
    // "NotRegistered" once per compiled level of skill 3
    assert_eq!(report.missing_handlers, 5);
    assert_eq!(report.failed_handlers, 0);

    let strike = data.get_skill(3, 2).unwrap();
    assert_eq!(strike.name(), "Power Strike");
    assert_eq!(strike.cast_range(), 40);
    assert_eq!(strike.mp_consume(), 10);
    assert_eq!(strike.effects(EffectScope::General).len(), 1);
    assert!(strike.effects(EffectScope::Pvp).is_empty());

    let enchanted = data.get_skill_sub(3, 3, 1002).unwrap();
    assert_eq!(enchanted.effects(EffectScope::Pvp).len(), 1);
    assert_eq!(enchanted.mp_consume(), 11);

    assert!(data.get_skill(900, 1).is_none());
}

#[test]
fn test_conditions_follow_levels() {
    let pack = DataPack::new("conditions");
    pack.write("stats/skills/skills.xml", MAIN_SKILLS);

    let data = SkillData::new(pack.config(), Handlers::with_builtins());
    data.load().unwrap();

    let dry = Fighter {
        in_water: false,
        points: 0,
    };
    let wet = Fighter {
        in_water: true,
        points: 0,
    };
    let assassin = Fighter {
        in_water: false,
        points: 20_000,
    };

    let level1 = data.get_skill(3, 1).unwrap();
    assert!(level1.check_conditions(SkillConditionScope::General, &dry));
    assert!(!level1.check_conditions(SkillConditionScope::General, &wet));

    let level3 = data.get_skill(3, 3).unwrap();
    assert_eq!(level3.conditions(SkillConditionScope::General).len(), 2);
    assert!(!level3.check_conditions(SkillConditionScope::General, &dry));
    assert!(level3.check_conditions(SkillConditionScope::General, &assassin));
}

#[test]
fn test_lookup_fallback_and_siege() {
    let pack = DataPack::new("fallback");
    pack.write("stats/skills/skills.xml", MAIN_SKILLS);

    let data = SkillData::new(pack.config(), Handlers::with_builtins());
    data.load().unwrap();

    let capped = data.get_skill(3, 50).unwrap();
    assert_eq!((capped.level(), capped.sub_level()), (3, 0));
    assert!(data.get_skill(3, 0).is_none());
    assert!(data.get_skill_sub(3, 2, 1001).is_none());

    let ids = |add_noble, has_castle| {
        data.get_siege_skills(add_noble, has_castle)
            .iter()
            .map(|s| s.id())
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(false, false), vec![246, 247]);
    assert_eq!(ids(true, true), vec![246, 247, 845]);
}

#[test]
fn test_reload_is_idempotent() {
    let pack = DataPack::new("reload");
    pack.write("stats/skills/skills.xml", MAIN_SKILLS);

    let data = SkillData::new(pack.config(), Handlers::with_builtins());
    let first = data.load().unwrap();
    let snapshot = data.table();
    let second = data.reload().unwrap();

    assert_eq!(first, second);
    let reloaded = data.table();
    assert!(!Arc::ptr_eq(&snapshot, &reloaded));
    assert_eq!(snapshot.len(), reloaded.len());

    for before in snapshot.iter() {
        let after = reloaded
            .get_exact(before.id(), before.level(), before.sub_level())
            .unwrap();
        assert_eq!(after.name(), before.name());
        assert_eq!(after.stats(), before.stats());
        for scope in EffectScope::ALL {
            assert_eq!(
                format!("{:?}", after.effects(scope)),
                format!("{:?}", before.effects(scope))
            );
        }
        for scope in SkillConditionScope::ALL {
            assert_eq!(
                format!("{:?}", after.conditions(scope)),
                format!("{:?}", before.conditions(scope))
            );
        }
    }
    assert_eq!(reloaded.max_level(3), snapshot.max_level(3));
}

#[test]
fn test_custom_skills_override() {
    let pack = DataPack::new("custom");
    pack.write("stats/skills/skills.xml", MAIN_SKILLS);
    pack.write("stats/skills/custom/override.xml", CUSTOM_SKILLS);

    let config = LoaderConfig {
        custom_skills_load: true,
        warn_on_duplicate: true,
        ..pack.config()
    };
    let data = SkillData::new(config, Handlers::with_builtins());
    let report = data.load().unwrap();

    assert_eq!(report.documents, 2);
    assert_eq!(report.duplicates, 1);
    assert_eq!(data.get_skill(3, 1).unwrap().name(), "Custom Strike");
    assert_eq!(data.get_skill(3, 2).unwrap().name(), "Power Strike");
}

#[test]
fn test_enchant_routes_refresh_on_reload() {
    let pack = DataPack::new("enchant");
    pack.write("stats/skills/skills.xml", MAIN_SKILLS);

    let data = SkillData::new(pack.config(), Handlers::with_builtins());
    let routes = Arc::new(EnchantRoutes::new());
    data.add_listener(routes.clone());
    data.load().unwrap();

    assert_eq!(routes.routes_for(3, 3), vec![1]);
    assert!(routes.routes_for(3, 2).is_empty());

    pack.write("stats/skills/skills.xml", CUSTOM_SKILLS);
    data.reload().unwrap();
    assert!(routes.is_empty());
}

#[test]
fn test_missing_directory_keeps_empty_table() {
    let config = LoaderConfig {
        data_dir: std::env::temp_dir()
            .join("skilldata_it_does_not_exist")
            .to_string_lossy()
            .into_owned(),
        ..LoaderConfig::default()
    };
    let data = SkillData::new(config, Handlers::with_builtins());
    assert!(data.load().is_err());
    assert!(data.table().is_empty());
}
