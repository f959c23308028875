//! # Application Layer
//!
//! Contains the core business logic and orchestration of the bot.
//! This includes the survey repository, the session engine, the trigger listener and command routing.

pub mod parsing;
pub mod registry;
pub mod repository;
pub mod router;
pub mod session;
#[cfg(test)]
pub mod testing;
pub mod transcript;
pub mod triggers;
