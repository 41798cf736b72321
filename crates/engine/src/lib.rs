//! Storyteller Engine library.
//!
//! Server-side code for the interactive storyteller.
//!
//! ## Structure
//!
//! - `use_cases/` - Turn orchestration and the live emotion feed
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `stores/` - In-memory session state
//! - `api/` - HTTP entry points
//! - `app` - Application composition
//! - `config` - Environment configuration

pub mod api;
pub mod app;
pub mod config;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

pub use app::App;
pub use config::EngineConfig;
