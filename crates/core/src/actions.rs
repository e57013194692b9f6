/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Utility actions: the candidate behaviors an agent chooses between.
//!
//! An action pairs a desirability score with an effect. The selector calls
//! `score` on every registered action each tick and `execute` on the winner,
//! unconditionally, even if the same action won last tick. There is no
//! enter/exit lifecycle; an action must be safe to re-invoke every tick and
//! carries any continuity it needs itself (Wander's heading, for example,
//! survives inside the action's pipeline).
//!
//! Three variants ship with the library. `FlockAction` is the centerpiece:
//! it owns a full boids pipeline and scores on ally density. `RoamAction` is
//! the ever-eligible fallback that keeps lone agents ambling instead of
//! freezing. `EvadeAction` answers the danger flag.

use crate::behaviors::{
    Alignment, AlignmentParams, Cohesion, CohesionParams, Separation, SeparationParams, Wander,
    WanderParams,
};
use crate::context::{AgentContext, MotionState, animation_tags};
use crate::errors::AiConfigError;
use crate::kinematics::GroundVec2;
use crate::pipeline::SteeringPipeline;
use crate::types::{MIN_UTILITY_SCORE, UtilityScore};

use bevy::reflect::Reflect;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// One candidate behavior for the utility selector.
///
/// `score` is expected on the unit interval by convention; the selector does
/// not clamp or validate it, so an implementation that wanders out of range
/// simply wins or loses accordingly. That is the implementer's obligation,
/// not a guarded invariant.
pub trait UtilityAction: Send + Sync {
    /// Stable identifier, used for diagnostics and logging.
    fn name(&self) -> &str;

    /// Desirability of this action against the current tick.
    fn score(&self, ctx: &dyn AgentContext) -> UtilityScore;

    /// The action's effect; writes back onto the agent through the context.
    fn execute(&mut self, ctx: &mut dyn AgentContext);

    /// Intrinsic multiplier applied on top of `score` when ranking.
    fn base_priority(&self) -> UtilityScore {
        1.0
    }
}

// Stage weights for the flocking pipeline. Separation leads so the flock
// does not collapse into a point; wander stays a whisper on top.
const SEPARATION_WEIGHT: f32 = 1.4;
const COHESION_WEIGHT: f32 = 1.0;
const ALIGNMENT_WEIGHT: f32 = 0.9;
const WANDER_WEIGHT: f32 = 0.25;

/// Tuning for `FlockAction`.
#[derive(Reflect, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct FlockParams {
    /// Speed cap for the internal pipeline.
    pub max_speed: f32,
    /// Fraction of `max_speed` actually applied as locomotion.
    pub applied_fraction: f32,
    /// Below this many allies the flock is too thin to be worth it.
    pub min_flock_allies: usize,
    /// Score when allies exist but are below `min_flock_allies`.
    pub lone_score: UtilityScore,
    /// Score floor once a real flock is available.
    pub base_score: UtilityScore,
    /// Score bonus per perceived ally.
    pub ally_bonus: UtilityScore,
    /// Ceiling on the accumulated ally bonus.
    pub bonus_cap: UtilityScore,
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            max_speed: 4.0,
            applied_fraction: 0.7,
            min_flock_allies: 2,
            lone_score: 0.2,
            base_score: 0.5,
            ally_bonus: 0.05,
            bonus_cap: 0.3,
        }
    }
}

/// Move with the herd: separation, cohesion, alignment and a gentle wander,
/// blended and written back as the agent's velocity.
pub struct FlockAction {
    params: FlockParams,
    pipeline: SteeringPipeline,
}

impl FlockAction {
    /// Flocking with the standard pipeline and an ambient wander seed.
    pub fn new(params: FlockParams) -> Result<Self, AiConfigError> {
        Self::build(params, Wander::new(WanderParams::gentle()))
    }

    /// Same pipeline, wander seeded for reproducible runs.
    pub fn with_seed(params: FlockParams, seed: u64) -> Result<Self, AiConfigError> {
        Self::build(params, Wander::with_seed(WanderParams::gentle(), seed))
    }

    /// Flocking over a caller-assembled pipeline.
    pub fn with_pipeline(params: FlockParams, pipeline: SteeringPipeline) -> Self {
        Self { params, pipeline }
    }

    fn build(params: FlockParams, wander: Wander) -> Result<Self, AiConfigError> {
        let pipeline = SteeringPipeline::new(params.max_speed)?
            .add_behavior(Separation::new(SeparationParams::default()), SEPARATION_WEIGHT)?
            .add_behavior(Cohesion::new(CohesionParams::default()), COHESION_WEIGHT)?
            .add_behavior(Alignment::new(AlignmentParams::default()), ALIGNMENT_WEIGHT)?
            .add_behavior(wander, WANDER_WEIGHT)?;

        Ok(Self { params, pipeline })
    }
}

impl UtilityAction for FlockAction {
    fn name(&self) -> &str {
        "flock"
    }

    fn score(&self, ctx: &dyn AgentContext) -> UtilityScore {
        // Hard disqualifiers first, before any other work.
        if ctx.in_danger() || !ctx.has_allies() {
            return MIN_UTILITY_SCORE;
        }

        let allies = ctx.ally_count();
        if allies < self.params.min_flock_allies {
            return self.params.lone_score;
        }

        // Diminishing returns: more company helps, up to the cap.
        let bonus = (allies as UtilityScore * self.params.ally_bonus).min(self.params.bonus_cap);
        self.params.base_score + bonus
    }

    fn execute(&mut self, ctx: &mut dyn AgentContext) {
        ctx.set_motion_state(MotionState::Flocking);
        ctx.set_animation(animation_tags::WALK);

        let steering = self.pipeline.calculate(ctx);
        // Second-stage cap: the pipeline bounds the raw steering force, this
        // bounds the fraction of it actually applied to locomotion.
        let velocity = steering
            .linear
            .limit(self.params.max_speed * self.params.applied_fraction);
        ctx.set_velocity(velocity);
    }
}

/// Tuning for `RoamAction`.
#[derive(Reflect, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct RoamParams {
    pub max_speed: f32,
    pub applied_fraction: f32,
    /// Constant desirability; low, so anything situational outbids it.
    pub score: UtilityScore,
}

impl Default for RoamParams {
    fn default() -> Self {
        Self {
            max_speed: 2.0,
            applied_fraction: 0.5,
            score: 0.1,
        }
    }
}

/// The idle-motion fallback: a gentle wander so an agent with nothing
/// better to do still looks alive.
pub struct RoamAction {
    params: RoamParams,
    pipeline: SteeringPipeline,
}

impl RoamAction {
    pub fn new(params: RoamParams) -> Result<Self, AiConfigError> {
        Self::build(params, Wander::new(WanderParams::gentle()))
    }

    pub fn with_seed(params: RoamParams, seed: u64) -> Result<Self, AiConfigError> {
        Self::build(params, Wander::with_seed(WanderParams::gentle(), seed))
    }

    fn build(params: RoamParams, wander: Wander) -> Result<Self, AiConfigError> {
        let pipeline = SteeringPipeline::new(params.max_speed)?.add_behavior(wander, 1.0)?;
        Ok(Self { params, pipeline })
    }
}

impl UtilityAction for RoamAction {
    fn name(&self) -> &str {
        "roam"
    }

    fn score(&self, _ctx: &dyn AgentContext) -> UtilityScore {
        self.params.score
    }

    fn execute(&mut self, ctx: &mut dyn AgentContext) {
        ctx.set_motion_state(MotionState::Wandering);
        ctx.set_animation(animation_tags::WALK);

        let steering = self.pipeline.calculate(ctx);
        let velocity = steering
            .linear
            .limit(self.params.max_speed * self.params.applied_fraction);
        ctx.set_velocity(velocity);
    }
}

/// Tuning for `EvadeAction`.
#[derive(Reflect, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct EvadeParams {
    /// Flat-out escape speed.
    pub max_speed: f32,
    /// Desirability whenever danger is flagged.
    pub score: UtilityScore,
    /// Intrinsic priority multiplier; danger should outrank social niceties.
    pub priority: UtilityScore,
}

impl Default for EvadeParams {
    fn default() -> Self {
        Self {
            max_speed: 4.5,
            score: 0.9,
            priority: 1.25,
        }
    }
}

/// Run from the threat. No pipeline: evasion steers directly away from the
/// perceived threat direction at full speed, or freezes when perception
/// cannot localize one.
pub struct EvadeAction {
    params: EvadeParams,
}

impl EvadeAction {
    pub fn new(params: EvadeParams) -> Self {
        Self { params }
    }
}

impl UtilityAction for EvadeAction {
    fn name(&self) -> &str {
        "evade"
    }

    fn score(&self, ctx: &dyn AgentContext) -> UtilityScore {
        match ctx.in_danger() {
            true => self.params.score,
            false => MIN_UTILITY_SCORE,
        }
    }

    fn execute(&mut self, ctx: &mut dyn AgentContext) {
        ctx.set_motion_state(MotionState::Evading);
        ctx.set_animation(animation_tags::RUN);

        let velocity = match ctx.threat_direction() {
            Some(toward_threat) => {
                (-toward_threat).normalized_or_zero() * self.params.max_speed
            }
            // Danger with no bearing on it: stop and let the host's
            // perception catch up next tick.
            None => GroundVec2::ZERO,
        };
        ctx.set_velocity(velocity);
    }

    fn base_priority(&self) -> UtilityScore {
        self.params.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AllySnapshot, TickContext};

    const EPS: f32 = 1e-5;

    fn herd(count: usize) -> Vec<AllySnapshot> {
        (0..count)
            .map(|i| {
                AllySnapshot::new(
                    GroundVec2::new(1. + i as f32, 1.),
                    GroundVec2::new(0.5, 0.),
                )
            })
            .collect()
    }

    #[test]
    fn flock_score_is_zero_without_allies() {
        let action = FlockAction::with_seed(FlockParams::default(), 0).unwrap();
        let ctx = TickContext::default();
        assert_eq!(action.score(&ctx), 0.);
    }

    #[test]
    fn flock_score_is_zero_in_danger_no_matter_the_crowd() {
        let action = FlockAction::with_seed(FlockParams::default(), 0).unwrap();
        let ctx = TickContext::default()
            .with_allies(herd(12))
            .with_danger(None);
        assert_eq!(action.score(&ctx), 0.);
    }

    #[test]
    fn flock_score_is_the_lone_score_below_the_threshold() {
        let action = FlockAction::with_seed(FlockParams::default(), 0).unwrap();
        let ctx = TickContext::default().with_allies(herd(1));
        assert!((action.score(&ctx) - 0.2).abs() < EPS);
    }

    #[test]
    fn flock_score_saturates_with_ally_count() {
        let action = FlockAction::with_seed(FlockParams::default(), 0).unwrap();

        let five = TickContext::default().with_allies(herd(5));
        assert!((action.score(&five) - 0.75).abs() < EPS);

        // Monotonically non-decreasing up to the cap, never past it.
        let mut previous = 0.;
        for count in 2..=12 {
            let ctx = TickContext::default().with_allies(herd(count));
            let score = action.score(&ctx);
            assert!(score >= previous);
            assert!(score <= 0.5 + 0.3 + EPS);
            previous = score;
        }

        let crowd = TickContext::default().with_allies(herd(30));
        assert!((action.score(&crowd) - 0.8).abs() < EPS);
    }

    #[test]
    fn flock_execute_writes_state_animation_and_bounded_velocity() {
        let params = FlockParams::default();
        let mut action = FlockAction::with_seed(params, 42).unwrap();
        let mut ctx = TickContext::default().with_allies(herd(5));

        action.execute(&mut ctx);

        assert_eq!(ctx.applied_state(), Some(MotionState::Flocking));
        assert_eq!(ctx.applied_animation(), Some(animation_tags::WALK));
        let velocity = ctx.applied_velocity().unwrap();
        assert!(velocity.length() <= params.max_speed * params.applied_fraction + EPS);
    }

    #[test]
    fn roam_score_is_constant() {
        let action = RoamAction::with_seed(RoamParams::default(), 0).unwrap();
        let calm = TickContext::default();
        let crowded = TickContext::default().with_allies(herd(9)).with_danger(None);
        assert_eq!(action.score(&calm), 0.1);
        assert_eq!(action.score(&crowded), 0.1);
    }

    #[test]
    fn roam_execute_keeps_the_agent_gently_moving() {
        let params = RoamParams::default();
        let mut action = RoamAction::with_seed(params, 5).unwrap();
        let mut ctx = TickContext::default();

        action.execute(&mut ctx);

        assert_eq!(ctx.applied_state(), Some(MotionState::Wandering));
        let velocity = ctx.applied_velocity().unwrap();
        assert!(velocity.length() > 0.);
        assert!(velocity.length() <= params.max_speed * params.applied_fraction + EPS);
    }

    #[test]
    fn evade_scores_only_under_danger() {
        let action = EvadeAction::new(EvadeParams::default());
        assert_eq!(action.score(&TickContext::default()), 0.);
        let scared = TickContext::default().with_danger(None);
        assert!((action.score(&scared) - 0.9).abs() < EPS);
    }

    #[test]
    fn evade_runs_directly_away_from_the_threat() {
        let params = EvadeParams::default();
        let mut action = EvadeAction::new(params);
        let mut ctx =
            TickContext::default().with_danger(Some(GroundVec2::new(1., 0.)));

        action.execute(&mut ctx);

        assert_eq!(ctx.applied_state(), Some(MotionState::Evading));
        assert_eq!(ctx.applied_animation(), Some(animation_tags::RUN));
        let velocity = ctx.applied_velocity().unwrap();
        assert!(velocity.x < 0.);
        assert!((velocity.length() - params.max_speed).abs() < EPS);
    }

    #[test]
    fn evade_freezes_without_a_threat_bearing() {
        let mut action = EvadeAction::new(EvadeParams::default());
        let mut ctx = TickContext::default().with_danger(None);

        action.execute(&mut ctx);
        assert_eq!(ctx.applied_velocity(), Some(GroundVec2::ZERO));
    }

    #[test]
    fn default_base_priority_is_unity() {
        let roam = RoamAction::with_seed(RoamParams::default(), 0).unwrap();
        assert_eq!(roam.base_priority(), 1.0);
        let evade = EvadeAction::new(EvadeParams::default());
        assert_eq!(evade.base_priority(), 1.25);
    }
}
