//! Clock, tick scheduler, session, and runner for the idle farm engine.
//!
//! This crate ties the ledger and the farm grid together into a playable
//! session and drives it through time.
//!
//! # Modules
//!
//! - [`clock`] -- [`Clock`] trait with system, manual, and monotonic
//!   implementations.
//! - [`config`] -- Configuration loading from `idlefarm-config.yaml` into
//!   strongly-typed structs.
//! - [`scheduler`] -- The [`TickScheduler`]: growth, auto-harvest, and
//!   auto-plant gated by elapsed time.
//! - [`session`] -- The [`GameSession`] query and command surface.
//! - [`command`] -- [`Command`] values for queued player intents.
//! - [`runner`] -- Async frame loop that drains the command queue and ticks
//!   the session.
//!
//! [`Clock`]: clock::Clock
//! [`TickScheduler`]: scheduler::TickScheduler
//! [`GameSession`]: session::GameSession
//! [`Command`]: command::Command

pub mod clock;
pub mod command;
pub mod config;
pub mod runner;
pub mod scheduler;
pub mod session;
