//! Scripted actions. Immutable at runtime; lists of them live in the catalog.

use serde::{Deserialize, Serialize};

use crate::base::BaseId;
use crate::fixed_point::Fixed;
use crate::object::AdmiralId;

/// Exclusive filter value that switches eligibility to level-key matching.
pub const MATCH_LEVEL_KEY: u32 = 0xFFFF_FFFF;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerFilter {
    #[default]
    Any,
    Different,
    Same,
}

impl OwnerFilter {
    pub fn admits(self, subject: Option<AdmiralId>, direct: Option<AdmiralId>) -> bool {
        match self {
            Self::Any => true,
            Self::Different => subject != direct,
            Self::Same => subject == direct,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub verb: Verb,
    #[serde(default)]
    pub reflexive: bool,
    #[serde(default)]
    pub inclusive_filter: u32,
    #[serde(default)]
    pub exclusive_filter: u32,
    #[serde(default)]
    pub owner: OwnerFilter,
    #[serde(default)]
    pub delay: i32,
    #[serde(default)]
    pub initial_subject_override: Option<u32>,
    #[serde(default)]
    pub initial_direct_override: Option<u32>,
}

impl Action {
    pub fn new(verb: Verb) -> Self {
        Self {
            verb,
            reflexive: false,
            inclusive_filter: 0,
            exclusive_filter: 0,
            owner: OwnerFilter::Any,
            delay: 0,
            initial_subject_override: None,
            initial_direct_override: None,
        }
    }

    pub fn reflexive(mut self) -> Self {
        self.reflexive = true;
        self
    }

    pub fn delayed(mut self, delay: i32) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateObjectArgs {
    pub base: BaseId,
    pub how_many_min: i32,
    pub how_many_range: i32,
    pub velocity_relative: bool,
    pub direction_relative: bool,
    pub random_distance: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundArgs {
    pub id_min: i32,
    pub id_range: i32,
    pub volume: i32,
    pub persistence: i32,
    pub priority: u8,
    pub absolute: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparkArgs {
    pub how_many: i32,
    pub speed: i32,
    pub velocity_range: Fixed,
    pub color: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DieKind {
    #[default]
    Normal,
    Expire,
    Destroy,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlterKind {
    #[default]
    Damage,
    Energy,
    Hidden,
    Cloak,
    Spin,
    Offline,
    Velocity,
    MaxVelocity,
    Thrust,
    BaseType,
    Owner,
    ConditionTrueYet,
    Occupation,
    AbsoluteCash,
    Age,
    Location,
    AbsoluteLocation,
    Weapon1,
    Weapon2,
    Special,
    LevelKeyTag,
}

/// `minimum` and `range` are raw 24.8 values for the velocity, thrust, spin
/// and offline sub-verbs, integers otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlterArgs {
    pub alter: AlterKind,
    pub relative: bool,
    pub minimum: i32,
    pub range: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verb {
    NoAction,
    CreateObject(CreateObjectArgs),
    CreateObjectSetDest(CreateObjectArgs),
    PlaySound(SoundArgs),
    MakeSparks(SparkArgs),
    Die {
        #[serde(default)]
        how: DieKind,
    },
    NilTarget,
    Alter(AlterArgs),
    LandAt {
        speed: i32,
    },
    EnterWarp,
    DisplayMessage {
        res_id: i32,
        page_count: i32,
    },
    ChangeScore {
        #[serde(default)]
        player: Option<AdmiralId>,
        which: i32,
        amount: i32,
    },
    DeclareWinner {
        #[serde(default)]
        player: Option<AdmiralId>,
        next_level: i32,
        text_id: i32,
    },
    SetDestination,
    ActivateSpecial,
    ColorFlash {
        length: i32,
        color: u8,
        shade: u8,
    },
    EnableKeys {
        mask: u32,
    },
    DisableKeys {
        mask: u32,
    },
    SetZoom {
        level: i32,
    },
    ComputerSelect {
        screen: i32,
        line: i32,
    },
    AssumeInitialObject {
        which: i32,
    },
}
