use core::fmt;

use crate::base::BaseId;

/// Structural invariants checked by `Simulation::validate_invariants`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleCode {
    ActiveListHead,
    ActiveListLink,
    ActiveListMembership,
    ActiveListCount,
    ObjectIdRange,
    ObjectEnergyRange,
    QueueOrder,
    QueueLink,
    QueueCapacity,
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActiveListHead => write!(f, "ACTIVE_LIST_HEAD"),
            Self::ActiveListLink => write!(f, "ACTIVE_LIST_LINK"),
            Self::ActiveListMembership => write!(f, "ACTIVE_LIST_MEMBERSHIP"),
            Self::ActiveListCount => write!(f, "ACTIVE_LIST_COUNT"),
            Self::ObjectIdRange => write!(f, "OBJECT_ID_RANGE"),
            Self::ObjectEnergyRange => write!(f, "OBJECT_ENERGY_RANGE"),
            Self::QueueOrder => write!(f, "QUEUE_ORDER"),
            Self::QueueLink => write!(f, "QUEUE_LINK"),
            Self::QueueCapacity => write!(f, "QUEUE_CAPACITY"),
        }
    }
}

/// Soft failures from object creation. Callers log and carry on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnError {
    PoolFull,
    UnknownBaseObject { base: BaseId },
    SpriteUnavailable { base: BaseId },
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoolFull => write!(f, "object pool is full"),
            Self::UnknownBaseObject { base } => write!(f, "unknown base object {base}"),
            Self::SpriteUnavailable { base } => {
                write!(f, "no sprite could be attached for base object {base}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SpawnError {}

/// Malformed catalog data, rejected before a simulation is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogError {
    UnknownBaseObject {
        referenced_by: &'static str,
        base: BaseId,
    },
    ActionListOutOfRange {
        base: BaseId,
        start: u32,
        count: u32,
        actions: usize,
    },
    NotAWeapon {
        base: BaseId,
        weapon: BaseId,
    },
    EmptyWeaponPositions {
        base: BaseId,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBaseObject {
                referenced_by,
                base,
            } => write!(f, "{referenced_by} references unknown base object {base}"),
            Self::ActionListOutOfRange {
                base,
                start,
                count,
                actions,
            } => write!(
                f,
                "base object {base} action list {start}+{count} exceeds {actions} actions"
            ),
            Self::NotAWeapon { base, weapon } => write!(
                f,
                "base object {base} mounts {weapon}, which has no weapon frame"
            ),
            Self::EmptyWeaponPositions { base } => {
                write!(f, "base object {base} mounts a weapon with no fire positions")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CatalogError {}
