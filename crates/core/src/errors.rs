/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Setup-time error types.
//!
//! Everything in here is a *configuration* error: a problem that can only be
//! introduced while wiring an agent up, never by world state at tick time.
//! They are reported synchronously from the fallible constructors so a bad
//! roster or pipeline fails before the simulation starts instead of quietly
//! degrading halfway through it.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AiConfigError {
    /// A selector was constructed with nothing to select from.
    ///
    /// A selector with an empty roster could only ever no-op, which makes the
    /// agent look frozen at runtime; rejecting it here is much easier to
    /// diagnose.
    #[error("utility selector requires at least one registered action")]
    EmptyActionRoster,

    /// Pipeline weights are blend ratios and must be positive reals.
    #[error("steering behavior weight must be positive, got {0}")]
    NonPositiveWeight(f32),

    /// A speed cap at or below zero would silently zero out all motion.
    #[error("max speed must be positive, got {0}")]
    NonPositiveMaxSpeed(f32),
}
