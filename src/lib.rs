//! Core library surface for the LibraDesk terminal console.
//!
//! The modules exposed here keep a small, deliberate API: `main.rs` wires the
//! persisted settings and the HTTP client into the TUI, and the same pieces
//! stay reusable for external tooling that wants to talk to the backend
//! without the interface.
pub mod api;
pub mod config;
pub mod models;
pub mod ui;
pub mod validate;

/// The HTTP client plus the status probe used across the UI.
pub use api::{ApiClient, ApiError, ApiStatus};

/// Persisted endpoint configuration.
pub use config::Settings;

/// The primary domain types the view layer renders.
pub use models::{Book, Loan, LoanStatus, Member};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
