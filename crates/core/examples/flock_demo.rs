//! A terminal-only herd: a handful of agents perceiving each other, deciding
//! and steering for a few seconds of simulated time.
//!
//! Run with `cargo run --example flock_demo`.

use herdmind_core::actions::{
    EvadeAction, EvadeParams, FlockAction, FlockParams, RoamAction, RoamParams,
};
use herdmind_core::context::{AllySnapshot, TickContext};
use herdmind_core::decision_loop::UtilitySelector;
use herdmind_core::errors::AiConfigError;
use herdmind_core::kinematics::GroundVec2;

const AGENTS: usize = 6;
const TICKS: usize = 100;
const PERCEPTION_RADIUS: f32 = 10.;
const DT: f32 = 0.1;

fn main() -> Result<(), AiConfigError> {
    let mut selectors = Vec::with_capacity(AGENTS);
    for i in 0..AGENTS {
        let seed = 1000 + i as u64;
        selectors.push(UtilitySelector::new(vec![
            Box::new(FlockAction::with_seed(FlockParams::default(), seed)?),
            Box::new(RoamAction::with_seed(RoamParams::default(), seed ^ 0xbeef)?),
            Box::new(EvadeAction::new(EvadeParams::default())),
        ])?);
    }

    let mut positions: Vec<_> = (0..AGENTS)
        .map(|i| GroundVec2::new((i % 3) as f32 * 4., (i / 3) as f32 * 4.))
        .collect();
    let mut velocities = vec![GroundVec2::ZERO; AGENTS];

    for tick in 0..TICKS {
        // Danger drill halfway through: a threat appears north of the herd.
        let threat = (tick >= TICKS / 2 && tick < TICKS / 2 + 10)
            .then(|| GroundVec2::new(0., 1.));

        for i in 0..AGENTS {
            let allies: Vec<_> = (0..AGENTS)
                .filter(|&j| j != i)
                .filter(|&j| (positions[j] - positions[i]).length() <= PERCEPTION_RADIUS)
                .map(|j| AllySnapshot::new(positions[j], velocities[j]))
                .collect();

            let mut ctx = TickContext::new(positions[i], velocities[i]).with_allies(allies);
            if threat.is_some() {
                ctx = ctx.with_danger(threat);
            }

            let picked = selectors[i].tick(&mut ctx);
            if let Some(applied) = ctx.applied_velocity() {
                velocities[i] = applied;
            }

            if tick % 20 == 0 && i == 0 {
                println!(
                    "tick {tick:3}: agent 0 -> {picked:6} at ({:6.2}, {:6.2}), speed {:.2}",
                    positions[i].x,
                    positions[i].z,
                    velocities[i].length(),
                );
            }
        }

        for i in 0..AGENTS {
            positions[i] += velocities[i] * DT;
        }
    }

    println!("final positions:");
    for (i, position) in positions.iter().enumerate() {
        println!("  agent {i}: ({:6.2}, {:6.2})", position.x, position.z);
    }

    Ok(())
}
