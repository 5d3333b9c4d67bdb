//! Element names that group effects and conditions inside a skill definition.

use std::fmt;

/// Phase an effect is applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EffectScope {
    General,
    Start,
    SelfScope,
    Channeling,
    Pvp,
    Pve,
    End,
}

impl EffectScope {
    pub const ALL: [EffectScope; 7] = [
        EffectScope::General,
        EffectScope::Start,
        EffectScope::SelfScope,
        EffectScope::Channeling,
        EffectScope::Pvp,
        EffectScope::Pve,
        EffectScope::End,
    ];

    /// Element name used in skill documents.
    pub fn xml_name(self) -> &'static str {
        match self {
            EffectScope::General => "effects",
            EffectScope::Start => "startEffects",
            EffectScope::SelfScope => "selfEffects",
            EffectScope::Channeling => "channelingEffects",
            EffectScope::Pvp => "pvpEffects",
            EffectScope::Pve => "pveEffects",
            EffectScope::End => "endEffects",
        }
    }

    pub fn find_by_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.xml_name() == name)
    }
}

impl fmt::Display for EffectScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.xml_name())
    }
}

/// When a skill condition is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkillConditionScope {
    General,
    Target,
    Passive,
}

impl SkillConditionScope {
    pub const ALL: [SkillConditionScope; 3] = [
        SkillConditionScope::General,
        SkillConditionScope::Target,
        SkillConditionScope::Passive,
    ];

    pub fn xml_name(self) -> &'static str {
        match self {
            SkillConditionScope::General => "conditions",
            SkillConditionScope::Target => "targetConditions",
            SkillConditionScope::Passive => "passiveConditions",
        }
    }

    pub fn find_by_xml_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.xml_name() == name)
    }
}

impl fmt::Display for SkillConditionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.xml_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_lookup() {
        assert_eq!(EffectScope::find_by_name("pvpEffects"), Some(EffectScope::Pvp));
        assert_eq!(EffectScope::find_by_name("conditions"), None);
        assert_eq!(
            SkillConditionScope::find_by_xml_name("passiveConditions"),
            Some(SkillConditionScope::Passive)
        );
        assert_eq!(SkillConditionScope::find_by_xml_name("effects"), None);
    }

    #[test]
    fn test_names_round_trip() {
        for scope in EffectScope::ALL {
            assert_eq!(EffectScope::find_by_name(scope.xml_name()), Some(scope));
        }
        for scope in SkillConditionScope::ALL {
            assert_eq!(SkillConditionScope::find_by_xml_name(scope.xml_name()), Some(scope));
        }
    }
}
