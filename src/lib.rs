//! Survival Mode: a single-player arcade shooter.
//!
//! The simulation (`entities`, `compute`, `session`) is independent of any
//! host. A host supplies a [`render::Surface`], forwards key events to the
//! [`session::GameSession`] and reacts to the events it emits.

pub mod audio;
pub mod clock;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod input;
pub mod render;
pub mod session;
