//! Shoot-on-the-move fire control.
//!
//! Computes a motion-compensated firing solution at a fixed control-loop rate
//! so a mobile launcher platform can fire without stopping. Flight time is a
//! function of target distance, and distance is a function of the very aim
//! point being solved for; [`solver`] runs that lookup to a fixed point each
//! time [`cycle::FiringCycle`] recomputes, and the cycle sequences solve,
//! track, fire (through a one-shot feed latch), and re-solve.
//!
//! The crate owns no hardware and never blocks. An external scheduler calls
//! [`cycle::FiringCycle::tick`] once per period, and all actuation flows
//! through the traits in [`interfaces`].

pub mod acceleration;
pub mod aim;
pub mod ballistics;
pub mod cycle;
pub mod interfaces;
pub mod interp;
pub mod math;
pub mod readiness;
pub mod solver;
