/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Steering behaviors: independent strategies that each map the current tick
//! context to one motion contribution.
//!
//! Every behavior caps its own output to its `max_speed` parameter *before*
//! the pipeline applies stage weights. This keeps weights meaningful as
//! influence ratios between behaviors rather than absolute magnitude knobs;
//! a Separation twice as weighted as Cohesion pushes twice as hard, no
//! matter how dramatic either raw contribution happened to be.
//!
//! Behaviors are stateless across ticks, with one exception: Wander persists
//! its heading and owns the random stream that jitters it, so its output is
//! time-coherent instead of white noise. Give it a fixed seed when you need
//! reproducible runs.

use bevy::reflect::Reflect;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::context::AgentContext;
use crate::kinematics::{GroundVec2, SteeringOutput};

/// One steering strategy, pure in the tick context and its own parameters.
///
/// `compute` overwrites `out` with this behavior's contribution; it must not
/// accumulate into it. The scratch instance handed in comes from the owning
/// pipeline's pool and may carry a previous contribution.
pub trait SteeringBehavior: Send + Sync {
    fn compute(&mut self, ctx: &dyn AgentContext, out: &mut SteeringOutput);
}

/// Pushes the agent away from allies that crowd it.
#[derive(Reflect, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct SeparationParams {
    /// Allies beyond this distance exert no push.
    pub radius: f32,
    /// Cap on the summed repulsion.
    pub max_speed: f32,
}

impl Default for SeparationParams {
    fn default() -> Self {
        Self {
            radius: 2.5,
            max_speed: 4.0,
        }
    }
}

pub struct Separation {
    params: SeparationParams,
}

impl Separation {
    pub fn new(params: SeparationParams) -> Self {
        Self { params }
    }
}

impl SteeringBehavior for Separation {
    fn compute(&mut self, ctx: &dyn AgentContext, out: &mut SteeringOutput) {
        out.clear();
        let position = ctx.position();

        let mut push = GroundVec2::ZERO;
        for ally in ctx.allies() {
            let away = position - ally.position;
            let dist = away.length();
            if dist >= self.params.radius || dist <= f32::EPSILON {
                // Out of range, or stacked exactly on top of us with no
                // usable direction to push along.
                continue;
            }
            // Full strength at zero distance, fading out at the radius.
            let falloff = 1. - dist / self.params.radius;
            push += away * (falloff / dist);
        }

        out.linear = push.limit(self.params.max_speed);
    }
}

/// Pulls the agent toward the centroid of its nearby allies.
#[derive(Reflect, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct CohesionParams {
    /// Allies beyond this distance do not attract.
    pub radius: f32,
    /// Cap on the pull toward the centroid.
    pub max_speed: f32,
}

impl Default for CohesionParams {
    fn default() -> Self {
        Self {
            radius: 8.0,
            max_speed: 4.0,
        }
    }
}

pub struct Cohesion {
    params: CohesionParams,
}

impl Cohesion {
    pub fn new(params: CohesionParams) -> Self {
        Self { params }
    }
}

impl SteeringBehavior for Cohesion {
    fn compute(&mut self, ctx: &dyn AgentContext, out: &mut SteeringOutput) {
        out.clear();
        let position = ctx.position();
        let radius_sq = self.params.radius * self.params.radius;

        let mut sum = GroundVec2::ZERO;
        let mut count = 0usize;
        for ally in ctx.allies() {
            if (ally.position - position).length_squared() > radius_sq {
                continue;
            }
            sum += ally.position;
            count += 1;
        }

        if count == 0 {
            return;
        }

        let centroid = sum * (1. / count as f32);
        out.linear = (centroid - position).limit(self.params.max_speed);
    }
}

/// Matches the agent's velocity to the average of its nearby allies.
#[derive(Reflect, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct AlignmentParams {
    /// Allies beyond this distance are not averaged in.
    pub radius: f32,
    /// Cap on the velocity-matching correction.
    pub max_speed: f32,
}

impl Default for AlignmentParams {
    fn default() -> Self {
        Self {
            radius: 6.0,
            max_speed: 4.0,
        }
    }
}

pub struct Alignment {
    params: AlignmentParams,
}

impl Alignment {
    pub fn new(params: AlignmentParams) -> Self {
        Self { params }
    }
}

impl SteeringBehavior for Alignment {
    fn compute(&mut self, ctx: &dyn AgentContext, out: &mut SteeringOutput) {
        out.clear();
        let position = ctx.position();
        let radius_sq = self.params.radius * self.params.radius;

        let mut sum = GroundVec2::ZERO;
        let mut count = 0usize;
        for ally in ctx.allies() {
            if (ally.position - position).length_squared() > radius_sq {
                continue;
            }
            sum += ally.velocity;
            count += 1;
        }

        if count == 0 {
            return;
        }

        let average = sum * (1. / count as f32);
        out.linear = (average - ctx.velocity()).limit(self.params.max_speed);
    }
}

/// Low-frequency pseudo-random drift, independent of allies.
///
/// Keeps otherwise-idle agents from looking like statues.
#[derive(Reflect, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct WanderParams {
    /// Magnitude of the drift contribution.
    pub strength: f32,
    /// Max heading change per tick, radians.
    pub turn_jitter: f32,
    /// Cap on the contribution; normally above `strength` and inert.
    pub max_speed: f32,
}

impl Default for WanderParams {
    fn default() -> Self {
        Self {
            strength: 1.2,
            turn_jitter: 0.5,
            max_speed: 4.0,
        }
    }
}

impl WanderParams {
    /// Low-magnitude, low-frequency preset for ambient motion.
    pub fn gentle() -> Self {
        Self {
            strength: 0.4,
            turn_jitter: 0.15,
            max_speed: 4.0,
        }
    }
}

pub struct Wander {
    params: WanderParams,
    heading: f32,
    rng: SmallRng,
}

impl Wander {
    /// Wander with an ambient seed; runs will differ between constructions.
    pub fn new(params: WanderParams) -> Self {
        Self::with_seed(params, rand::rng().random())
    }

    /// Wander with a fixed seed, for reproducible simulations and tests.
    pub fn with_seed(params: WanderParams, seed: u64) -> Self {
        Self {
            params,
            heading: 0.,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn gentle() -> Self {
        Self::new(WanderParams::gentle())
    }
}

impl SteeringBehavior for Wander {
    fn compute(&mut self, _ctx: &dyn AgentContext, out: &mut SteeringOutput) {
        let jitter = self.params.turn_jitter;
        let turn = self.rng.random_range(-jitter..=jitter);
        self.heading += turn;

        out.clear();
        out.linear =
            (GroundVec2::from_angle(self.heading) * self.params.strength).limit(self.params.max_speed);
        out.angular = turn;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AllySnapshot, TickContext};

    const EPS: f32 = 1e-5;

    fn ally_at(x: f32, z: f32) -> AllySnapshot {
        AllySnapshot::new(GroundVec2::new(x, z), GroundVec2::ZERO)
    }

    fn moving_ally(x: f32, z: f32, vx: f32, vz: f32) -> AllySnapshot {
        AllySnapshot::new(GroundVec2::new(x, z), GroundVec2::new(vx, vz))
    }

    #[test]
    fn separation_pushes_away_from_a_close_ally() {
        let mut behavior = Separation::new(SeparationParams::default());
        let ctx = TickContext::default().with_allies(vec![ally_at(1., 0.)]);

        let mut out = SteeringOutput::default();
        behavior.compute(&ctx, &mut out);

        // Ally sits at +x, so the push points toward -x.
        assert!(out.linear.x < 0.);
        assert!(out.linear.z.abs() < EPS);
    }

    #[test]
    fn separation_grows_as_allies_close_in() {
        let mut behavior = Separation::new(SeparationParams::default());
        let mut out_near = SteeringOutput::default();
        let mut out_far = SteeringOutput::default();

        let near = TickContext::default().with_allies(vec![ally_at(0.5, 0.)]);
        let far = TickContext::default().with_allies(vec![ally_at(2., 0.)]);
        behavior.compute(&near, &mut out_near);
        behavior.compute(&far, &mut out_far);

        assert!(out_near.linear.length() > out_far.linear.length());
    }

    #[test]
    fn separation_ignores_allies_beyond_the_radius() {
        let mut behavior = Separation::new(SeparationParams {
            radius: 2.,
            max_speed: 4.,
        });
        let ctx = TickContext::default().with_allies(vec![ally_at(5., 5.)]);

        let mut out = SteeringOutput::default();
        behavior.compute(&ctx, &mut out);
        assert_eq!(out.linear, GroundVec2::ZERO);
    }

    #[test]
    fn separation_skips_perfectly_stacked_allies() {
        let mut behavior = Separation::new(SeparationParams::default());
        let ctx = TickContext::default().with_allies(vec![ally_at(0., 0.)]);

        let mut out = SteeringOutput::default();
        behavior.compute(&ctx, &mut out);
        assert_eq!(out.linear, GroundVec2::ZERO);
    }

    #[test]
    fn separation_respects_its_own_cap() {
        let max_speed = 1.5;
        let mut behavior = Separation::new(SeparationParams {
            radius: 5.,
            max_speed,
        });
        let crowd: Vec<_> = (1..20).map(|i| ally_at(0.1 * i as f32, 0.)).collect();
        let ctx = TickContext::default().with_allies(crowd);

        let mut out = SteeringOutput::default();
        behavior.compute(&ctx, &mut out);
        assert!(out.linear.length() <= max_speed + EPS);
    }

    #[test]
    fn cohesion_pulls_toward_the_centroid() {
        let mut behavior = Cohesion::new(CohesionParams::default());
        let ctx =
            TickContext::default().with_allies(vec![ally_at(2., 0.), ally_at(4., 0.)]);

        let mut out = SteeringOutput::default();
        behavior.compute(&ctx, &mut out);

        // Centroid is at (3, 0); pull is straight down +x.
        assert!(out.linear.x > 0.);
        assert!(out.linear.z.abs() < EPS);
    }

    #[test]
    fn cohesion_is_quiet_with_no_allies_in_range() {
        let mut behavior = Cohesion::new(CohesionParams {
            radius: 1.,
            max_speed: 4.,
        });
        let ctx = TickContext::default().with_allies(vec![ally_at(10., 0.)]);

        let mut out = SteeringOutput::new(GroundVec2::new(9., 9.), 3.);
        behavior.compute(&ctx, &mut out);
        assert!(out.is_zero());
    }

    #[test]
    fn alignment_matches_the_average_ally_velocity() {
        let mut behavior = Alignment::new(AlignmentParams::default());
        let ctx = TickContext::default().with_allies(vec![
            moving_ally(1., 0., 2., 0.),
            moving_ally(0., 1., 0., 2.),
        ]);

        let mut out = SteeringOutput::default();
        behavior.compute(&ctx, &mut out);

        // Stationary agent, average ally velocity (1, 1).
        assert!((out.linear.x - 1.).abs() < EPS);
        assert!((out.linear.z - 1.).abs() < EPS);
    }

    #[test]
    fn alignment_corrects_relative_to_own_velocity() {
        let mut behavior = Alignment::new(AlignmentParams::default());
        let ctx = TickContext::new(GroundVec2::ZERO, GroundVec2::new(2., 0.))
            .with_allies(vec![moving_ally(1., 0., 2., 0.)]);

        let mut out = SteeringOutput::default();
        behavior.compute(&ctx, &mut out);

        // Already moving with the flock; nothing to correct.
        assert!(out.linear.length() < EPS);
    }

    #[test]
    fn wander_is_reproducible_under_a_fixed_seed() {
        let ctx = TickContext::default();
        let mut first = Wander::with_seed(WanderParams::gentle(), 99);
        let mut second = Wander::with_seed(WanderParams::gentle(), 99);

        for _ in 0..32 {
            let mut out_a = SteeringOutput::default();
            let mut out_b = SteeringOutput::default();
            first.compute(&ctx, &mut out_a);
            second.compute(&ctx, &mut out_b);
            assert_eq!(out_a, out_b);
        }
    }

    #[test]
    fn wander_diverges_across_seeds() {
        let ctx = TickContext::default();
        let mut first = Wander::with_seed(WanderParams::default(), 1);
        let mut second = Wander::with_seed(WanderParams::default(), 2);

        let mut diverged = false;
        for _ in 0..8 {
            let mut out_a = SteeringOutput::default();
            let mut out_b = SteeringOutput::default();
            first.compute(&ctx, &mut out_a);
            second.compute(&ctx, &mut out_b);
            diverged |= out_a != out_b;
        }
        assert!(diverged);
    }

    #[test]
    fn gentle_wander_stays_gentle() {
        let ctx = TickContext::default();
        let params = WanderParams::gentle();
        let mut behavior = Wander::with_seed(params, 7);

        for _ in 0..64 {
            let mut out = SteeringOutput::default();
            behavior.compute(&ctx, &mut out);
            assert!((out.linear.length() - params.strength).abs() < EPS);
            assert!(out.angular.abs() <= params.turn_jitter);
        }
    }
}
