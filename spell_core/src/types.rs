use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A persisted status name that matches no [`StatusKind`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status name: '{0}'")]
pub struct UnknownStatus(pub String);

/// Spell elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    #[default]
    Neutral,
    Fire,
    Water,
    Earth,
    Air,
    Light,
    Dark,
}

impl Element {
    /// Get all element variants
    pub fn all() -> &'static [Element] {
        &[
            Element::Neutral,
            Element::Fire,
            Element::Water,
            Element::Earth,
            Element::Air,
            Element::Light,
            Element::Dark,
        ]
    }

    /// Parse a persisted element name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Element> {
        let name = name.trim();
        Element::all()
            .iter()
            .copied()
            .find(|e| e.to_string().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Neutral => write!(f, "Neutral"),
            Element::Fire => write!(f, "Fire"),
            Element::Water => write!(f, "Water"),
            Element::Earth => write!(f, "Earth"),
            Element::Air => write!(f, "Air"),
            Element::Light => write!(f, "Light"),
            Element::Dark => write!(f, "Dark"),
        }
    }
}

/// How a spell picks its base target pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellType {
    /// Caster plus every living opponent; one target is chosen
    SingleTarget,
    /// Every living opponent at once
    AreaOfEffect,
    /// Caster only, fires automatically at the start of the caster's turn
    Passive,
}

impl SpellType {
    /// Parse the persisted spell type name ("Single Target", "Area of Effect", "Passive")
    pub fn from_name(name: &str) -> Option<SpellType> {
        match name.trim().to_ascii_lowercase().as_str() {
            "single target" | "single_target" => Some(SpellType::SingleTarget),
            "area of effect" | "area_of_effect" | "aoe" => Some(SpellType::AreaOfEffect),
            "passive" => Some(SpellType::Passive),
            _ => None,
        }
    }

    pub fn is_passive(&self) -> bool {
        matches!(self, SpellType::Passive)
    }
}

impl fmt::Display for SpellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpellType::SingleTarget => write!(f, "Single Target"),
            SpellType::AreaOfEffect => write!(f, "Area of Effect"),
            SpellType::Passive => write!(f, "Passive"),
        }
    }
}

/// Status effect kinds a spell can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    // Duration-gated debuffs
    Paralyze,
    Frozen,
    Burning,
    Poisoned,
    Charmed,
    Confusion,
    Taunt,
    Leech,
    // Duration-gated buffs
    Regenerating,
    // Instantaneous
    Blessed,
    ManaBoost,
    HealthBoost,
    ExtremeSpeed,
    Armor,
    FireWeakness,
    WaterWeakness,
    EarthWeakness,
    AirWeakness,
}

impl StatusKind {
    /// Get all status kinds
    pub fn all() -> &'static [StatusKind] {
        &[
            StatusKind::Paralyze,
            StatusKind::Frozen,
            StatusKind::Burning,
            StatusKind::Poisoned,
            StatusKind::Charmed,
            StatusKind::Confusion,
            StatusKind::Taunt,
            StatusKind::Leech,
            StatusKind::Regenerating,
            StatusKind::Blessed,
            StatusKind::ManaBoost,
            StatusKind::HealthBoost,
            StatusKind::ExtremeSpeed,
            StatusKind::Armor,
            StatusKind::FireWeakness,
            StatusKind::WaterWeakness,
            StatusKind::EarthWeakness,
            StatusKind::AirWeakness,
        ]
    }

    /// Parse a persisted status name such as "Mana Boost" or "Fire Weakness".
    ///
    /// Returns `Ok(None)` for the persisted "None" marker.
    pub fn from_name(name: &str) -> Result<Option<StatusKind>, UnknownStatus> {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        let normalized: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect();
        StatusKind::all()
            .iter()
            .copied()
            .find(|k| {
                let display: String = k.to_string().chars().filter(|c| *c != ' ').collect();
                display.eq_ignore_ascii_case(&normalized)
            })
            .map(Some)
            .ok_or_else(|| UnknownStatus(name.to_string()))
    }

    /// Instantaneous kinds mutate the target once on cast, skip the chance
    /// roll and never attach to the target's status list.
    pub fn is_instant(&self) -> bool {
        matches!(
            self,
            StatusKind::Blessed
                | StatusKind::ManaBoost
                | StatusKind::HealthBoost
                | StatusKind::ExtremeSpeed
                | StatusKind::Armor
                | StatusKind::FireWeakness
                | StatusKind::WaterWeakness
                | StatusKind::EarthWeakness
                | StatusKind::AirWeakness
        )
    }

    /// Element recorded by the elemental weakness kinds
    pub fn weakness_element(&self) -> Option<Element> {
        match self {
            StatusKind::FireWeakness => Some(Element::Fire),
            StatusKind::WaterWeakness => Some(Element::Water),
            StatusKind::EarthWeakness => Some(Element::Earth),
            StatusKind::AirWeakness => Some(Element::Air),
            _ => None,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusKind::Paralyze => "Paralyze",
            StatusKind::Frozen => "Frozen",
            StatusKind::Burning => "Burning",
            StatusKind::Poisoned => "Poisoned",
            StatusKind::Charmed => "Charmed",
            StatusKind::Confusion => "Confusion",
            StatusKind::Taunt => "Taunt",
            StatusKind::Leech => "Leech",
            StatusKind::Regenerating => "Regenerating",
            StatusKind::Blessed => "Blessed",
            StatusKind::ManaBoost => "Mana Boost",
            StatusKind::HealthBoost => "Health Boost",
            StatusKind::ExtremeSpeed => "Extreme Speed",
            StatusKind::Armor => "Armor",
            StatusKind::FireWeakness => "Fire Weakness",
            StatusKind::WaterWeakness => "Water Weakness",
            StatusKind::EarthWeakness => "Earth Weakness",
            StatusKind::AirWeakness => "Air Weakness",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names_round_trip_display() {
        for kind in StatusKind::all() {
            assert_eq!(StatusKind::from_name(&kind.to_string()), Ok(Some(*kind)));
        }
    }

    #[test]
    fn test_status_from_persisted_names() {
        assert_eq!(StatusKind::from_name("None"), Ok(None));
        assert_eq!(
            StatusKind::from_name("mana_boost"),
            Ok(Some(StatusKind::ManaBoost))
        );
        assert_eq!(
            StatusKind::from_name(" extreme speed "),
            Ok(Some(StatusKind::ExtremeSpeed))
        );
        assert!(StatusKind::from_name("Petrified").is_err());
    }

    #[test]
    fn test_instant_kinds() {
        assert!(StatusKind::Blessed.is_instant());
        assert!(StatusKind::AirWeakness.is_instant());
        assert!(!StatusKind::Burning.is_instant());
        assert!(!StatusKind::Taunt.is_instant());
        assert_eq!(StatusKind::all().len(), 18);
    }

    #[test]
    fn test_spell_type_names() {
        assert_eq!(SpellType::from_name("Single Target"), Some(SpellType::SingleTarget));
        assert_eq!(SpellType::from_name("Area of Effect"), Some(SpellType::AreaOfEffect));
        assert_eq!(SpellType::from_name("passive"), Some(SpellType::Passive));
        assert_eq!(SpellType::from_name("Cone"), None);
    }

    #[test]
    fn test_element_names() {
        assert_eq!(Element::from_name("fire"), Some(Element::Fire));
        assert_eq!(Element::from_name("WATER"), Some(Element::Water));
        assert_eq!(Element::from_name("Plasma"), None);
        assert_eq!(StatusKind::EarthWeakness.weakness_element(), Some(Element::Earth));
        assert_eq!(StatusKind::Leech.weakness_element(), None);
    }
}
