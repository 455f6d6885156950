//! IdeaForge server: HTTP API, agent gateway and the stage chat flows on top
//! of [`ideaforge_core`].

pub mod agent;
pub mod api;
pub mod chat;
pub mod config;
pub mod propagation;
