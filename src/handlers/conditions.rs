//! Built-in skill conditions.

use std::sync::Arc;

use super::{Caster, HandlerError, HandlerRegistry, SkillCondition};
use crate::skills::{Skill, StatSet};

/// Assassination points are stored scaled by this factor.
const ASSASSINATION_POINT_SCALE: i32 = 10_000;

/// Caster must hold at least `amount` assassination points.
#[derive(Debug, Clone, PartialEq)]
pub struct AssassinationPoints {
    amount: i32,
}

impl AssassinationPoints {
    pub fn new(params: &StatSet) -> Result<Self, HandlerError> {
        let amount = params.get_int("amount")?;
        let amount = amount
            .checked_mul(ASSASSINATION_POINT_SCALE)
            .ok_or_else(|| HandlerError::Invalid {
                key: "amount",
                reason: format!("{amount} overflows"),
            })?;
        Ok(Self { amount })
    }
}

impl SkillCondition for AssassinationPoints {
    fn name(&self) -> &'static str {
        "AssassinationPoints"
    }

    fn can_use(&self, caster: &dyn Caster, _skill: &Skill) -> bool {
        caster.assassination_points() >= self.amount
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotInUnderwater;

impl SkillCondition for NotInUnderwater {
    fn name(&self) -> &'static str {
        "NotInUnderwater"
    }

    fn can_use(&self, caster: &dyn Caster, _skill: &Skill) -> bool {
        !caster.is_in_water()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpNotInstantzone;

impl SkillCondition for OpNotInstantzone {
    fn name(&self) -> &'static str {
        "OpNotInstantzone"
    }

    fn can_use(&self, caster: &dyn Caster, _skill: &Skill) -> bool {
        caster.instance_id() == 0
    }
}

pub fn register_builtins(registry: &mut HandlerRegistry<dyn SkillCondition>) {
    registry.register("AssassinationPoints", |p: &StatSet| {
        Ok(Arc::new(AssassinationPoints::new(p)?) as Arc<dyn SkillCondition>)
    });
    registry.register("NotInUnderwater", |_: &StatSet| {
        Ok(Arc::new(NotInUnderwater) as Arc<dyn SkillCondition>)
    });
    registry.register("OpNotInstantzone", |_: &StatSet| {
        Ok(Arc::new(OpNotInstantzone) as Arc<dyn SkillCondition>)
    });
}
