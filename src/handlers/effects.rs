//! Built-in effects.

use std::sync::Arc;

use super::{Caster, Effect, HandlerError, HandlerRegistry};
use crate::skills::StatSet;

/// A skill reference by id and level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillHolder {
    pub skill_id: i32,
    pub skill_level: i32,
}

/// A single damage hit delivered to a creature carrying the effect.
pub struct DamageEvent<'a> {
    pub attacker: &'a dyn Caster,
    pub target: &'a dyn Caster,
    pub damage: f64,
    pub damage_over_time: bool,
}

/// Casts a skill back when its bearer takes damage.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerSkillByDamage {
    min_attacker_level: i32,
    max_attacker_level: i32,
    min_damage: i32,
    chance: i32,
    hp_percent: i32,
    skill: SkillHolder,
    target_type: String,
    attacker_type: String,
    skill_level_scale_to: i32,
    trigger_skills: Option<Vec<SkillHolder>>,
}

impl TriggerSkillByDamage {
    pub fn new(params: &StatSet) -> Result<Self, HandlerError> {
        let trigger_skills = params.get_string_or("triggerSkills", "")?;
        Ok(Self {
            min_attacker_level: params.get_int_or("minAttackerLevel", 1)?,
            max_attacker_level: params.get_int_or("maxAttackerLevel", i32::MAX)?,
            min_damage: params.get_int_or("minDamage", 1)?,
            chance: params.get_int_or("chance", 100)?,
            hp_percent: params.get_int_or("hpPercent", 100)?,
            skill: SkillHolder {
                skill_id: params.get_int_or("skillId", 0)?,
                skill_level: params.get_int_or("skillLevel", 1)?,
            },
            target_type: params.get_string_or("targetType", "SELF")?,
            attacker_type: params.get_string_or("attackerType", "Creature")?,
            skill_level_scale_to: params.get_int_or("skillLevelScaleTo", 0)?,
            trigger_skills: parse_trigger_skills(&trigger_skills)?,
        })
    }

    pub fn skill(&self) -> SkillHolder {
        self.skill
    }

    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    pub fn skill_level_scale_to(&self) -> i32 {
        self.skill_level_scale_to
    }

    pub fn trigger_skills(&self) -> Option<&[SkillHolder]> {
        self.trigger_skills.as_deref()
    }

    /// Whether `event` passes every gate of this effect. `roll` is a
    /// uniform draw in `0..100` supplied by the caller.
    pub fn should_trigger(&self, event: &DamageEvent<'_>, roll: i32) -> bool {
        if event.damage_over_time || self.chance == 0 {
            return false;
        }
        let no_skill = self.skill.skill_id == 0 || self.skill.skill_level == 0;
        if self.trigger_skills.is_none() && no_skill {
            return false;
        }
        if event.attacker.object_id() == event.target.object_id() {
            return false;
        }
        let attacker_level = event.attacker.level();
        if attacker_level < self.min_attacker_level || attacker_level > self.max_attacker_level {
            return false;
        }
        if event.damage < f64::from(self.min_damage) {
            return false;
        }
        if self.chance < 100 && roll > self.chance {
            return false;
        }
        if self.hp_percent < 100 && event.target.current_hp_percent() > f64::from(self.hp_percent) {
            return false;
        }
        event.attacker.is_instance_type(&self.attacker_type)
    }
}

impl Effect for TriggerSkillByDamage {
    fn name(&self) -> &'static str {
        "TriggerSkillByDamage"
    }
}

/// `id,level;id,level` → holders. Empty input means "not set".
fn parse_trigger_skills(raw: &str) -> Result<Option<Vec<SkillHolder>>, HandlerError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let invalid = |reason: String| HandlerError::Invalid {
        key: "triggerSkills",
        reason,
    };
    raw.split(';')
        .map(|entry| {
            let (id, level) = entry
                .split_once(',')
                .ok_or_else(|| invalid(format!("'{entry}' is not id,level")))?;
            let skill_id = id
                .trim()
                .parse()
                .map_err(|_| invalid(format!("bad skill id '{id}'")))?;
            let skill_level = level
                .trim()
                .parse()
                .map_err(|_| invalid(format!("bad level '{level}'")))?;
            Ok(SkillHolder {
                skill_id,
                skill_level,
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

pub fn register_builtins(registry: &mut HandlerRegistry<dyn Effect>) {
    registry.register("TriggerSkillByDamage", |p: &StatSet| {
        Ok(Arc::new(TriggerSkillByDamage::new(p)?) as Arc<dyn Effect>)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Creature {
        id: i32,
        level: i32,
        hp: f64,
        player: bool,
    }

    impl Caster for Creature {
        fn object_id(&self) -> i32 {
            self.id
        }
        fn level(&self) -> i32 {
            self.level
        }
        fn current_hp_percent(&self) -> f64 {
            self.hp
        }
        fn is_instance_type(&self, instance_type: &str) -> bool {
            instance_type == "Creature" || (self.player && instance_type == "Player")
        }
    }

    fn params(pairs: &[(&str, &str)]) -> StatSet {
        pairs.iter().map(|(k, v)| (k.to_string(), (*v).into())).collect()
    }

    #[test]
    fn test_defaults() {
        let effect = TriggerSkillByDamage::new(&params(&[("skillId", "5123")])).unwrap();
        assert_eq!(
            effect.skill(),
            SkillHolder {
                skill_id: 5123,
                skill_level: 1,
            }
        );
        assert_eq!(effect.target_type(), "SELF");
        assert_eq!(effect.trigger_skills(), None);
    }

    #[test]
    fn test_trigger_skill_list() {
        let effect =
            TriggerSkillByDamage::new(&params(&[("triggerSkills", "100,1; 101,2")])).unwrap();
        assert_eq!(
            effect.trigger_skills().unwrap(),
            &[
                SkillHolder {
                    skill_id: 100,
                    skill_level: 1,
                },
                SkillHolder {
                    skill_id: 101,
                    skill_level: 2,
                },
            ]
        );

        let err = TriggerSkillByDamage::new(&params(&[("triggerSkills", "100")])).unwrap_err();
        assert!(matches!(err, HandlerError::Invalid { key: "triggerSkills", .. }));
    }

    fn hit<'a>(attacker: &'a Creature, target: &'a Creature, damage: f64) -> DamageEvent<'a> {
        DamageEvent {
            attacker,
            target,
            damage,
            damage_over_time: false,
        }
    }

    #[test]
    fn test_gates() {
        let effect = TriggerSkillByDamage::new(&params(&[
            ("skillId", "5123"),
            ("chance", "30"),
            ("minDamage", "50"),
            ("hpPercent", "60"),
            ("attackerType", "Player"),
        ]))
        .unwrap();

        let attacker = Creature {
            id: 1,
            level: 80,
            hp: 100.0,
            player: true,
        };
        let hurt = Creature {
            id: 2,
            level: 80,
            hp: 40.0,
            player: false,
        };
        let healthy = Creature {
            id: 3,
            level: 80,
            hp: 90.0,
            player: false,
        };
        let monster = Creature {
            id: 4,
            level: 80,
            hp: 100.0,
            player: false,
        };

        assert!(effect.should_trigger(&hit(&attacker, &hurt, 100.0), 10));
        assert!(!effect.should_trigger(&hit(&attacker, &hurt, 100.0), 31), "chance roll");
        assert!(!effect.should_trigger(&hit(&attacker, &hurt, 10.0), 10), "min damage");
        assert!(!effect.should_trigger(&hit(&attacker, &healthy, 100.0), 10), "hp percent");
        assert!(!effect.should_trigger(&hit(&monster, &hurt, 100.0), 10), "attacker type");
        assert!(!effect.should_trigger(&hit(&attacker, &attacker, 100.0), 10), "self hit");

        let dot = DamageEvent {
            damage_over_time: true,
            ..hit(&attacker, &hurt, 100.0)
        };
        assert!(!effect.should_trigger(&dot, 10));
    }
}
