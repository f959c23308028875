//! # Interface Layer
//!
//! User-facing entry points: the handlers behind each text command.

pub mod commands;
