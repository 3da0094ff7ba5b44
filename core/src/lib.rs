#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod action;
pub mod attributes;
pub mod base;
pub mod constants;
pub mod error;
pub mod fixed_point;
pub mod host;
pub mod object;
pub mod pool;
pub mod queue;
pub mod rng;
pub mod sim;

pub use error::{CatalogError, RuleCode, SpawnError};
pub use host::{EventLog, Host, HostEvent};
pub use sim::{Simulation, TickCheckpoint, WorldSnapshot};
