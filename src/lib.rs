#![doc = include_str!("../README.md")]

pub use herdmind_core::*;

pub mod prelude {
    pub use herdmind_core::*;
    pub use herdmind_core::actions::{
        EvadeAction, EvadeParams, FlockAction, FlockParams, RoamAction, RoamParams, UtilityAction,
    };
    pub use herdmind_core::behaviors::{
        Alignment, AlignmentParams, Cohesion, CohesionParams, Separation, SeparationParams,
        SteeringBehavior, Wander, WanderParams,
    };
    pub use herdmind_core::context::{
        AgentContext, AllySnapshot, MotionState, TickContext, animation_tags,
    };
    pub use herdmind_core::decision_loop::UtilitySelector;
    pub use herdmind_core::errors::AiConfigError;
    pub use herdmind_core::kinematics::{GroundVec2, SteeringOutput};
    pub use herdmind_core::object_pool::ObjectPool;
    pub use herdmind_core::pipeline::SteeringPipeline;
    pub use herdmind_core::types::*;
}
