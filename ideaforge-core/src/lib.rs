//! Core library for IdeaForge.
//!
//! This crate provides the pipeline's domain models, the SQLite store and the
//! stage services, independent of any transport layer or agent backend.
//!
//! # Usage
//!
//! ```no_run
//! use ideaforge_core::models::CreateIdeaInput;
//! use ideaforge_core::services::StageServices;
//! use ideaforge_core::Database;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let services = StageServices::from_database(db);
//! let idea = services.ideation.create(CreateIdeaInput {
//!     title: "Plant swap".into(),
//!     objective: "Trade cuttings locally".into(),
//!     problem: "Nurseries are expensive".into(),
//!     scope: "One city".into(),
//!     ..Default::default()
//! })?;
//! let plan = services.action_plans.create(idea.id)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod ports;
pub mod services;

// Re-export commonly used types at crate root
pub use db::{Database, DbError};
pub use error::{CoreError, CoreResult};
