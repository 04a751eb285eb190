//! Closed category sets
//!
//! Structure tiers, elite monster kinds and rank tiers. Each maps to a fixed
//! column or ordinal; anything outside the set is an `UnknownCategory` error.

use crate::{FeatureError, Result};
use std::fmt;
use std::str::FromStr;

/// Destroyed structure tier, ordered from furthest to closest to the nexus
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TowerTier {
    Outer,
    Inner,
    Base,
    Undefined,
    Nexus,
}

impl TowerTier {
    pub const COUNT: usize = 5;

    pub const ALL: [TowerTier; Self::COUNT] = [
        TowerTier::Outer,
        TowerTier::Inner,
        TowerTier::Base,
        TowerTier::Undefined,
        TowerTier::Nexus,
    ];

    /// Column in the buildings matrix
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TowerTier::Outer => "OUTER_TURRET",
            TowerTier::Inner => "INNER_TURRET",
            TowerTier::Base => "BASE_TURRET",
            TowerTier::Undefined => "UNDEFINED_TURRET",
            TowerTier::Nexus => "NEXUS_TURRET",
        }
    }
}

impl FromStr for TowerTier {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self> {
        TowerTier::ALL
            .into_iter()
            .find(|tier| tier.name() == s)
            .ok_or_else(|| FeatureError::unknown("tower tier", s))
    }
}

impl fmt::Display for TowerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Elite neutral objective. Dragons are split by element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MonsterKind {
    Baron,
    RiftHerald,
    AirDragon,
    EarthDragon,
    WaterDragon,
    FireDragon,
    ElderDragon,
}

impl MonsterKind {
    pub const COUNT: usize = 7;

    pub const ALL: [MonsterKind; Self::COUNT] = [
        MonsterKind::Baron,
        MonsterKind::RiftHerald,
        MonsterKind::AirDragon,
        MonsterKind::EarthDragon,
        MonsterKind::WaterDragon,
        MonsterKind::FireDragon,
        MonsterKind::ElderDragon,
    ];

    /// Monster type whose concrete kind lives in the sub-type field
    pub const DRAGON: &'static str = "DRAGON";

    /// Column in the monsters matrix
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            MonsterKind::Baron => "BARON_NASHOR",
            MonsterKind::RiftHerald => "RIFTHERALD",
            MonsterKind::AirDragon => "AIR_DRAGON",
            MonsterKind::EarthDragon => "EARTH_DRAGON",
            MonsterKind::WaterDragon => "WATER_DRAGON",
            MonsterKind::FireDragon => "FIRE_DRAGON",
            MonsterKind::ElderDragon => "ELDER_DRAGON",
        }
    }

    /// Resolve an elite monster event's kind from its type and sub-type fields
    pub fn resolve(monster_type: &str, monster_sub_type: Option<&str>) -> Result<Self> {
        if monster_type == Self::DRAGON {
            let sub_type =
                monster_sub_type.ok_or_else(|| FeatureError::missing("monsterSubType"))?;
            sub_type.parse()
        } else {
            monster_type.parse()
        }
    }
}

impl FromStr for MonsterKind {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self> {
        MonsterKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| FeatureError::unknown("monster kind", s))
    }
}

impl fmt::Display for MonsterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Highest ranked tier a player reached in the season
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RankTier {
    Unranked,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Challenger,
}

impl RankTier {
    pub const COUNT: usize = 8;

    pub const ALL: [RankTier; Self::COUNT] = [
        RankTier::Unranked,
        RankTier::Bronze,
        RankTier::Silver,
        RankTier::Gold,
        RankTier::Platinum,
        RankTier::Diamond,
        RankTier::Master,
        RankTier::Challenger,
    ];

    /// Ordinal code, 0 (unranked) to 7 (challenger)
    pub fn ordinal(self) -> i64 {
        self as i64
    }

    pub fn name(self) -> &'static str {
        match self {
            RankTier::Unranked => "UNRANKED",
            RankTier::Bronze => "BRONZE",
            RankTier::Silver => "SILVER",
            RankTier::Gold => "GOLD",
            RankTier::Platinum => "PLATINUM",
            RankTier::Diamond => "DIAMOND",
            RankTier::Master => "MASTER",
            RankTier::Challenger => "CHALLENGER",
        }
    }
}

impl FromStr for RankTier {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self> {
        RankTier::ALL
            .into_iter()
            .find(|tier| tier.name() == s)
            .ok_or_else(|| FeatureError::unknown("rank tier", s))
    }
}

impl fmt::Display for RankTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
