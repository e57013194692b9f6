/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Blends steering behaviors into one bounded motion command.
//!
//! A pipeline is assembled once at action-construction time and never
//! mutated per tick: an ordered list of (behavior, weight) stages plus a
//! speed cap. Each tick, `calculate` asks every stage for its contribution
//! in insertion order, accumulates the weighted sum, and clamps the linear
//! result to the cap, so the output is bounded no matter how many stages
//! there are or how constructively they interfere.
//!
//! Insertion order is preserved exactly. The blend itself is commutative,
//! but floating-point summation is not, so a fixed order keeps results
//! bit-for-bit reproducible between runs.

use crate::behaviors::SteeringBehavior;
use crate::context::AgentContext;
use crate::errors::AiConfigError;
use crate::kinematics::SteeringOutput;
use crate::object_pool::ObjectPool;
use crate::types::SteeringWeight;

// Scratch instances alive at once inside `calculate`: the accumulator and
// the per-stage contribution.
const SCRATCH_IN_FLIGHT: usize = 2;

pub struct SteeringPipeline {
    stages: Vec<(Box<dyn SteeringBehavior>, SteeringWeight)>,
    max_speed: f32,
    scratch: ObjectPool<SteeringOutput>,
}

impl SteeringPipeline {
    /// An empty pipeline clamped to `max_speed`.
    pub fn new(max_speed: f32) -> Result<Self, AiConfigError> {
        if !(max_speed > 0.) {
            return Err(AiConfigError::NonPositiveMaxSpeed(max_speed));
        }

        Ok(Self {
            stages: Vec::new(),
            max_speed,
            scratch: ObjectPool::with_size(
                SteeringOutput::default,
                SteeringOutput::clear,
                SCRATCH_IN_FLIGHT,
            ),
        })
    }

    /// Appends a weighted stage; chains with `?`.
    ///
    /// ```
    /// use herdmind_core::behaviors::{Separation, SeparationParams, Wander};
    /// use herdmind_core::pipeline::SteeringPipeline;
    ///
    /// # fn main() -> Result<(), herdmind_core::errors::AiConfigError> {
    /// let pipeline = SteeringPipeline::new(4.0)?
    ///     .add_behavior(Separation::new(SeparationParams::default()), 1.4)?
    ///     .add_behavior(Wander::gentle(), 0.25)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn add_behavior(
        mut self,
        behavior: impl SteeringBehavior + 'static,
        weight: SteeringWeight,
    ) -> Result<Self, AiConfigError> {
        if !(weight > 0.) {
            return Err(AiConfigError::NonPositiveWeight(weight));
        }
        self.stages.push((Box::new(behavior), weight));
        Ok(self)
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Runs every stage against `ctx` and blends the results.
    ///
    /// The returned output's linear magnitude never exceeds `max_speed`.
    pub fn calculate(&mut self, ctx: &dyn AgentContext) -> SteeringOutput {
        // Pooled scratch; both come back cleared, courtesy of the release
        // path, so accumulation starts from the identity.
        let mut total = self.scratch.acquire();
        let mut contribution = self.scratch.acquire();

        for (behavior, weight) in self.stages.iter_mut() {
            behavior.compute(ctx, &mut contribution);
            total.add_weighted(&contribution, *weight);
        }

        total.linear = total.linear.limit(self.max_speed);

        #[cfg(feature = "logging")]
        bevy::log::debug!(
            "steering pipeline blended {:?} stages into {:?}",
            self.stages.len(),
            total,
        );

        let result = total.clone();
        self.scratch.release(contribution);
        self.scratch.release(total);
        result
    }
}

impl core::fmt::Debug for SteeringPipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SteeringPipeline")
            .field("stages", &self.stages.len())
            .field("max_speed", &self.max_speed)
            .finish()
    }
}
