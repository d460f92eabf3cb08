//! Playcast Engine library.
//!
//! This crate contains all server-side code for the Playcast replay service.
//!
//! ## Structure
//!
//! - `use_cases/` - Replay control, commentary generation, game listings
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP and SSE entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
