/// Kind of a simulated entity as reported by the host.
///
/// The set covers every kind the engine cares about: hostile creatures that
/// may be stacked, a few passive creatures that never are, and the marker kind
/// used for stack indicators. Hosts advertise the subset they actually
/// support through [`crate::env::WorldOracle::supported_kinds`]; kinds
/// introduced by newer hosts (`Breeze`, `Bogged`, `Creaking`) are simply
/// missing from older capability tables.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EntityKind {
    // Hostile creatures
    EnderDragon,
    Wither,
    Guardian,
    ElderGuardian,
    Spider,
    CaveSpider,
    Blaze,
    Creeper,
    Drowned,
    Endermite,
    Evoker,
    Ghast,
    Hoglin,
    Husk,
    MagmaCube,
    Phantom,
    PiglinBrute,
    Pillager,
    Ravager,
    Shulker,
    Silverfish,
    Skeleton,
    Stray,
    WitherSkeleton,
    Slime,
    Vex,
    Vindicator,
    Warden,
    Witch,
    Zoglin,
    Zombie,
    ZombieVillager,
    // Introduced by newer hosts
    Breeze,
    Bogged,
    Creaking,
    // Passive creatures
    Cow,
    Pig,
    Sheep,
    Villager,
    IronGolem,
    // Non-living
    DisplayMarker,
}

impl EntityKind {
    /// Kinds that are stacked unless the configuration overrides the list.
    pub const DEFAULT_STACKABLE: &'static [EntityKind] = &[
        EntityKind::EnderDragon,
        EntityKind::Wither,
        EntityKind::Guardian,
        EntityKind::ElderGuardian,
        EntityKind::Spider,
        EntityKind::CaveSpider,
        EntityKind::Blaze,
        EntityKind::Creeper,
        EntityKind::Drowned,
        EntityKind::Endermite,
        EntityKind::Evoker,
        EntityKind::Ghast,
        EntityKind::Hoglin,
        EntityKind::Husk,
        EntityKind::MagmaCube,
        EntityKind::Phantom,
        EntityKind::PiglinBrute,
        EntityKind::Pillager,
        EntityKind::Ravager,
        EntityKind::Shulker,
        EntityKind::Silverfish,
        EntityKind::Skeleton,
        EntityKind::Stray,
        EntityKind::WitherSkeleton,
        EntityKind::Slime,
        EntityKind::Vex,
        EntityKind::Vindicator,
        EntityKind::Warden,
        EntityKind::Witch,
        EntityKind::Zoglin,
        EntityKind::Zombie,
        EntityKind::ZombieVillager,
        EntityKind::Breeze,
        EntityKind::Bogged,
        EntityKind::Creaking,
    ];

    /// Returns true for kinds that represent creatures rather than markers.
    pub const fn is_living(self) -> bool {
        !matches!(self, EntityKind::DisplayMarker)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parses_snake_case_names() {
        assert_eq!(
            EntityKind::from_str("wither_skeleton").unwrap(),
            EntityKind::WitherSkeleton
        );
        assert_eq!(EntityKind::from_str("ZOMBIE").unwrap(), EntityKind::Zombie);
        assert_eq!(EntityKind::MagmaCube.to_string(), "magma_cube");
    }

    #[test]
    fn markers_are_not_living_or_stackable() {
        assert!(!EntityKind::DisplayMarker.is_living());
        assert!(!EntityKind::DEFAULT_STACKABLE.contains(&EntityKind::DisplayMarker));
        assert!(!EntityKind::DEFAULT_STACKABLE.contains(&EntityKind::Cow));
    }
}
