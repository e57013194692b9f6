//! Type aliases and shared score constants.

/// Desirability of an action for the current tick.
///
/// By convention scores live on the unit interval; the selector does not
/// enforce this (see `UtilityAction::score` for the contract).
pub type UtilityScore = f32;

pub const MIN_UTILITY_SCORE: UtilityScore = 0.;
pub const MAX_UTILITY_SCORE: UtilityScore = 1.;

/// Blend ratio of one steering behavior inside a pipeline.
pub type SteeringWeight = f32;

// Type alias - to express intent better.
pub type AgentEntity = bevy::ecs::entity::Entity;
