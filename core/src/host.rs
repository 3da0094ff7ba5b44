//! The narrow surface through which the simulation reaches rendering, audio,
//! messaging, admiral bookkeeping and scenario scripting.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::action::SparkArgs;
use crate::base::BaseId;
use crate::fixed_point::Point;
use crate::object::{AdmiralId, TinyColor};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRequest {
    pub slot: usize,
    pub base: BaseId,
    pub sprite_id: i32,
    pub layer: i32,
    pub scale: i32,
    pub tiny_size: i32,
    pub color: TinyColor,
    pub location: Point,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpriteAttach {
    Attached(u32),
    /// No sprite table; the object lives on without a visual.
    Missing,
    /// The renderer could not supply a sprite at all. Ends the session.
    Exhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundRequest {
    pub id: i32,
    pub volume: i32,
    pub persistence: i32,
    pub priority: u8,
    /// `None` plays at absolute volume; otherwise attenuated by distance.
    pub at: Option<Point>,
}

/// External collaborators. Every method has an inert default so a host only
/// implements what it observes.
pub trait Host {
    fn attach_sprite(&mut self, _request: &SpriteRequest) -> SpriteAttach {
        SpriteAttach::Missing
    }
    fn recolor_sprite(&mut self, _slot: usize, _color: TinyColor) {}
    fn scale_sprite(&mut self, _slot: usize, _scale: i32) {}
    fn play_sound(&mut self, _request: &SoundRequest) {}
    fn make_sparks(&mut self, _sparks: &SparkArgs, _location: Point) {}
    fn warp_cue(&mut self, _slot: usize, _step: i32) {}
    fn cloak_cue(&mut self, _slot: usize, _cloaking: bool) {}
    fn start_long_message(&mut self, _first: i32, _last: i32) {}
    fn status_message(&mut self, _text: &str) {}
    fn color_flash(&mut self, _length: i32, _color: u8, _shade: u8) {}
    fn zoom_changed(&mut self, _level: i32) {}
    fn computer_select(&mut self, _screen: i32, _line: i32) {}

    fn admiral_name(&self, admiral: AdmiralId) -> String {
        format!("Admiral {admiral}")
    }
    fn pay_admiral(&mut self, _admiral: Option<AdmiralId>, _amount: i32) {}
    fn pay_admiral_absolute(&mut self, _admiral: Option<AdmiralId>, _amount: i32) {}
    fn alter_admiral_score(&mut self, _admiral: AdmiralId, _which: i32, _amount: i32) {}
    fn admiral_score(&self, _admiral: AdmiralId, _which: i32) -> i32 {
        0
    }
    fn add_kill(&mut self, _owner: Option<AdmiralId>) {}
    fn declare_winner(&mut self, _winner: Option<AdmiralId>, _next_level: i32, _text_id: i32) {}
    fn recalc_build_data(&mut self) {}

    fn destination_captured(&mut self, _slot: usize, _owner: AdmiralId) {}
    fn stop_building(&mut self, _slot: usize) {}
    fn clear_occupants(&mut self, _slot: usize) {}
    /// Apply an occupation change and return the new tally for `owner`.
    fn alter_occupation(&mut self, _slot: usize, _owner: Option<AdmiralId>, _amount: i32) -> i32 {
        0
    }
    fn remove_destination(&mut self, _slot: usize) {}
    fn remove_from_destination(&mut self, _slot: usize) {}
    fn give_command(&mut self, _slot: usize) {}

    fn set_condition_true_yet(&mut self, _condition: i32, _value: bool) {}
    fn check_scenario_conditions(&mut self) {}

    fn player_ship_changed(&mut self, _owner: Option<AdmiralId>, _slot: usize) {}
    fn player_body_lost(&mut self, _owner: Option<AdmiralId>) {}
    fn autopilot_toggled(&mut self, _slot: usize, _on: bool) {}
}

/// Everything the simulation asked of its host, in call order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostEvent {
    SpriteAttached { slot: usize, base: BaseId },
    Sound { id: i32, absolute: bool },
    Sparks { count: i32, location: Point },
    WarpCue { slot: usize, step: i32 },
    CloakCue { slot: usize, cloaking: bool },
    LongMessage { first: i32, last: i32 },
    Status(String),
    ColorFlash { length: i32, color: u8, shade: u8 },
    Zoom(i32),
    ComputerSelect { screen: i32, line: i32 },
    Score { admiral: AdmiralId, which: i32, amount: i32 },
    Kill { owner: Option<AdmiralId> },
    Winner { winner: Option<AdmiralId>, next_level: i32, text_id: i32 },
    BuildDataRecalculated,
    DestinationCaptured { slot: usize, owner: AdmiralId },
    DestinationRemoved { slot: usize },
    ConditionTrueYet { condition: i32, value: bool },
    ConditionsChecked,
    PlayerShipChanged { owner: Option<AdmiralId>, slot: usize },
    PlayerBodyLost { owner: Option<AdmiralId> },
    AutoPilot { slot: usize, on: bool },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpritePolicy {
    #[default]
    Attach,
    Missing,
    Exhausted,
}

/// Recording host with a minimal admiral ledger.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    pub events: Vec<HostEvent>,
    pub cash: BTreeMap<AdmiralId, i32>,
    pub scores: BTreeMap<(AdmiralId, i32), i32>,
    pub kills: BTreeMap<AdmiralId, u32>,
    pub occupation: BTreeMap<(usize, AdmiralId), i32>,
    pub sprite_policy: SpritePolicy,
    next_sprite: u32,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sprite_policy(sprite_policy: SpritePolicy) -> Self {
        Self {
            sprite_policy,
            ..Self::default()
        }
    }

    pub fn cash(&self, admiral: AdmiralId) -> i32 {
        self.cash.get(&admiral).copied().unwrap_or(0)
    }

    pub fn count(&self, matches: impl Fn(&HostEvent) -> bool) -> usize {
        self.events.iter().filter(|event| matches(event)).count()
    }
}

impl Host for EventLog {
    fn attach_sprite(&mut self, request: &SpriteRequest) -> SpriteAttach {
        match self.sprite_policy {
            SpritePolicy::Attach => {
                self.next_sprite += 1;
                self.events.push(HostEvent::SpriteAttached {
                    slot: request.slot,
                    base: request.base,
                });
                SpriteAttach::Attached(self.next_sprite)
            }
            SpritePolicy::Missing => SpriteAttach::Missing,
            SpritePolicy::Exhausted => SpriteAttach::Exhausted,
        }
    }

    fn play_sound(&mut self, request: &SoundRequest) {
        self.events.push(HostEvent::Sound {
            id: request.id,
            absolute: request.at.is_none(),
        });
    }

    fn make_sparks(&mut self, sparks: &SparkArgs, location: Point) {
        self.events.push(HostEvent::Sparks {
            count: sparks.how_many,
            location,
        });
    }

    fn warp_cue(&mut self, slot: usize, step: i32) {
        self.events.push(HostEvent::WarpCue { slot, step });
    }

    fn cloak_cue(&mut self, slot: usize, cloaking: bool) {
        self.events.push(HostEvent::CloakCue { slot, cloaking });
    }

    fn start_long_message(&mut self, first: i32, last: i32) {
        self.events.push(HostEvent::LongMessage { first, last });
    }

    fn status_message(&mut self, text: &str) {
        self.events.push(HostEvent::Status(String::from(text)));
    }

    fn color_flash(&mut self, length: i32, color: u8, shade: u8) {
        self.events.push(HostEvent::ColorFlash {
            length,
            color,
            shade,
        });
    }

    fn zoom_changed(&mut self, level: i32) {
        self.events.push(HostEvent::Zoom(level));
    }

    fn computer_select(&mut self, screen: i32, line: i32) {
        self.events.push(HostEvent::ComputerSelect { screen, line });
    }

    fn pay_admiral(&mut self, admiral: Option<AdmiralId>, amount: i32) {
        if let Some(admiral) = admiral {
            *self.cash.entry(admiral).or_insert(0) += amount;
        }
    }

    fn pay_admiral_absolute(&mut self, admiral: Option<AdmiralId>, amount: i32) {
        self.pay_admiral(admiral, amount);
    }

    fn alter_admiral_score(&mut self, admiral: AdmiralId, which: i32, amount: i32) {
        *self.scores.entry((admiral, which)).or_insert(0) += amount;
        self.events.push(HostEvent::Score {
            admiral,
            which,
            amount,
        });
    }

    fn admiral_score(&self, admiral: AdmiralId, which: i32) -> i32 {
        self.scores.get(&(admiral, which)).copied().unwrap_or(0)
    }

    fn add_kill(&mut self, owner: Option<AdmiralId>) {
        if let Some(owner) = owner {
            *self.kills.entry(owner).or_insert(0) += 1;
        }
        self.events.push(HostEvent::Kill { owner });
    }

    fn declare_winner(&mut self, winner: Option<AdmiralId>, next_level: i32, text_id: i32) {
        self.events.push(HostEvent::Winner {
            winner,
            next_level,
            text_id,
        });
    }

    fn recalc_build_data(&mut self) {
        self.events.push(HostEvent::BuildDataRecalculated);
    }

    fn destination_captured(&mut self, slot: usize, owner: AdmiralId) {
        self.events
            .push(HostEvent::DestinationCaptured { slot, owner });
    }

    fn alter_occupation(&mut self, slot: usize, owner: Option<AdmiralId>, amount: i32) -> i32 {
        let Some(owner) = owner else {
            return 0;
        };
        let tally = self.occupation.entry((slot, owner)).or_insert(0);
        *tally += amount;
        *tally
    }

    fn clear_occupants(&mut self, slot: usize) {
        self.occupation.retain(|(occupied, _), _| *occupied != slot);
    }

    fn remove_destination(&mut self, slot: usize) {
        self.events.push(HostEvent::DestinationRemoved { slot });
    }

    fn set_condition_true_yet(&mut self, condition: i32, value: bool) {
        self.events
            .push(HostEvent::ConditionTrueYet { condition, value });
    }

    fn check_scenario_conditions(&mut self) {
        self.events.push(HostEvent::ConditionsChecked);
    }

    fn player_ship_changed(&mut self, owner: Option<AdmiralId>, slot: usize) {
        self.events
            .push(HostEvent::PlayerShipChanged { owner, slot });
    }

    fn player_body_lost(&mut self, owner: Option<AdmiralId>) {
        self.events.push(HostEvent::PlayerBodyLost { owner });
    }

    fn autopilot_toggled(&mut self, slot: usize, on: bool) {
        self.events.push(HostEvent::AutoPilot { slot, on });
    }
}
