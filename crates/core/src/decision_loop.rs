/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Core AI decision loop.
//!
//! One selector per agent, called once per tick by whatever owns the
//! simulation loop. The selector ranks every registered action by
//! `score(ctx) * base_priority()` and runs the single best one, every tick,
//! unconditionally. There is no memory of the previous winner and no
//! enter/exit lifecycle; continuity is the actions' own business.
//!
//! Selection is deterministic: actions are evaluated in registration order
//! and only a *strictly* greater effective score dethrones the current
//! frontrunner, so ties go to the action registered first. Two runs over the
//! same roster and the same context pick the same winner, which is what
//! makes agent behavior reproducible under test.

use bevy::ecs::component::Component;

use crate::actions::UtilityAction;
use crate::context::AgentContext;
use crate::errors::AiConfigError;
use crate::types::UtilityScore;

/// Picks and runs the best utility action for one agent, each tick.
///
/// Owns its action roster for the lifetime of the agent's AI. Derives
/// `Component` so ECS hosts can hang one selector off each agent entity;
/// nothing else about it is ECS-aware.
#[derive(Component)]
pub struct UtilitySelector {
    actions: Vec<Box<dyn UtilityAction>>,
}

impl UtilitySelector {
    /// A selector over a non-empty action roster.
    ///
    /// An empty roster is a configuration error: a selector that can never
    /// act leaves its agent frozen in a way that is miserable to debug from
    /// the outside, so it is rejected here rather than tolerated at tick
    /// time.
    pub fn new(actions: Vec<Box<dyn UtilityAction>>) -> Result<Self, AiConfigError> {
        match actions.is_empty() {
            true => Err(AiConfigError::EmptyActionRoster),
            false => Ok(Self { actions }),
        }
    }

    /// Appends another candidate to the roster.
    ///
    /// Registration order matters: it is the tie-break order, and earlier
    /// actions win draws.
    pub fn register(&mut self, action: Box<dyn UtilityAction>) -> &mut Self {
        self.actions.push(action);
        self
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// The would-be winner's name for the given context, without running it.
    pub fn peek(&self, ctx: &dyn AgentContext) -> &str {
        let (winner, _) = self.select(ctx);
        self.actions[winner].name()
    }

    /// Runs one decision: scores every action, executes the winner, returns
    /// its name for diagnostics.
    pub fn tick(&mut self, ctx: &mut dyn AgentContext) -> &str {
        let (winner, _score) = self.select(ctx);

        #[cfg(feature = "logging")]
        bevy::log::debug!(
            "utility selector picked {:?} w/ effective score {:?}",
            self.actions[winner].name(),
            _score,
        );

        self.actions[winner].execute(ctx);
        self.actions[winner].name()
    }

    /// Index and effective score of the best action for this context.
    ///
    /// Scores are taken at face value; out-of-range values are not clamped
    /// here, they just rank wherever they land.
    fn select(&self, ctx: &dyn AgentContext) -> (usize, UtilityScore) {
        let mut best: Option<(usize, UtilityScore)> = None;

        for (idx, action) in self.actions.iter().enumerate() {
            let effective = action.score(ctx) * action.base_priority();

            #[cfg(feature = "logging")]
            bevy::log::debug!(
                "utility selector scored {:?} at {:?}",
                action.name(),
                effective,
            );

            let beats_frontrunner = match &best {
                None => true,
                Some((_, top)) => effective > *top,
            };
            if beats_frontrunner {
                best = Some((idx, effective));
            }
        }

        best.expect("selector roster is never empty")
    }
}

impl core::fmt::Debug for UtilitySelector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UtilitySelector")
            .field(
                "actions",
                &self.actions.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
