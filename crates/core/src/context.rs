/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! The per-tick boundary between the AI core and the world.
//!
//! Each tick, for each agent, the host's perception layer builds a context:
//! a read-only snapshot of what the agent can see this tick, plus the handle
//! through which the chosen action writes its result back onto the agent.
//! The context is passed explicitly through every call in this crate (there
//! is no ambient state) and is discarded at the end of the tick; nothing in
//! the core retains it.
//!
//! The write side is the *only* sanctioned side-effect channel out of the
//! core: actions mutate the agent through `set_motion_state`,
//! `set_animation` and `set_velocity`, and through nothing else.

use bevy::reflect::Reflect;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::kinematics::GroundVec2;

/// Animation tags the bundled actions request from the host.
pub mod animation_tags {
    pub const IDLE: &str = "idle";
    pub const WALK: &str = "walk";
    pub const RUN: &str = "run";
}

/// Behavioral states the bundled actions put an agent into.
#[derive(Reflect, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum MotionState {
    Idle,
    Wandering,
    Flocking,
    Evading,
}

/// One perceived ally, as captured by the perception layer this tick.
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct AllySnapshot {
    pub position: GroundVec2,
    pub velocity: GroundVec2,
}

impl AllySnapshot {
    pub fn new(position: GroundVec2, velocity: GroundVec2) -> Self {
        Self { position, velocity }
    }
}

/// The per-tick world boundary an agent's AI evaluates against.
pub trait AgentContext {
    /// Whether the perception layer flagged a threat this tick.
    fn in_danger(&self) -> bool;

    /// Number of allies currently perceived.
    fn ally_count(&self) -> usize;

    fn has_allies(&self) -> bool {
        self.ally_count() > 0
    }

    /// The agent's own ground-plane position.
    fn position(&self) -> GroundVec2;

    /// The agent's ground-plane velocity as of the start of the tick.
    fn velocity(&self) -> GroundVec2;

    /// Snapshots of every perceived ally.
    fn allies(&self) -> &[AllySnapshot];

    /// Direction from the agent toward the current threat, if perception
    /// could localize one. Meaningless unless `in_danger` is true.
    fn threat_direction(&self) -> Option<GroundVec2> {
        None
    }

    fn set_motion_state(&mut self, state: MotionState);

    fn set_animation(&mut self, tag: &str);

    fn set_velocity(&mut self, velocity: GroundVec2);
}

/// A batteries-included `AgentContext` over an owned perception snapshot.
///
/// The write side records what the action applied; hosts that batch their
/// world mutations read the `applied_*` accessors back after the tick and
/// commit them however they like. Also the workhorse of this crate's tests.
#[derive(Clone, Debug, Default)]
pub struct TickContext {
    position: GroundVec2,
    velocity: GroundVec2,
    allies: Vec<AllySnapshot>,
    danger: bool,
    threat: Option<GroundVec2>,

    applied_state: Option<MotionState>,
    applied_animation: Option<String>,
    applied_velocity: Option<GroundVec2>,
}

impl TickContext {
    pub fn new(position: GroundVec2, velocity: GroundVec2) -> Self {
        Self {
            position,
            velocity,
            ..Default::default()
        }
    }

    pub fn with_allies(mut self, allies: Vec<AllySnapshot>) -> Self {
        self.allies = allies;
        self
    }

    /// Flags danger, optionally with a localized threat direction.
    pub fn with_danger(mut self, threat: Option<GroundVec2>) -> Self {
        self.danger = true;
        self.threat = threat;
        self
    }

    /// What the action set the agent's state to this tick, if anything.
    pub fn applied_state(&self) -> Option<MotionState> {
        self.applied_state
    }

    pub fn applied_animation(&self) -> Option<&str> {
        self.applied_animation.as_deref()
    }

    pub fn applied_velocity(&self) -> Option<GroundVec2> {
        self.applied_velocity
    }
}

impl AgentContext for TickContext {
    fn in_danger(&self) -> bool {
        self.danger
    }

    fn ally_count(&self) -> usize {
        self.allies.len()
    }

    fn position(&self) -> GroundVec2 {
        self.position
    }

    fn velocity(&self) -> GroundVec2 {
        self.velocity
    }

    fn allies(&self) -> &[AllySnapshot] {
        &self.allies
    }

    fn threat_direction(&self) -> Option<GroundVec2> {
        self.threat
    }

    fn set_motion_state(&mut self, state: MotionState) {
        self.applied_state = Some(state);
    }

    fn set_animation(&mut self, tag: &str) {
        self.applied_animation = Some(tag.to_owned());
    }

    fn set_velocity(&mut self, velocity: GroundVec2) {
        self.applied_velocity = Some(velocity);
    }
}
