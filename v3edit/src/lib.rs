//! Command-line front end for the province feature map engine.
//!
//! Loads a session from a resource tree ([`loader`]) configured by
//! `editor_settings.json` ([`settings`]).

pub mod loader;
pub mod settings;
pub mod testing;

pub use loader::load_session;
pub use settings::EditorSettings;
