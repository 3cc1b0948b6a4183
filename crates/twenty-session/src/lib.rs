//! twenty-session: drives one tile-merge game per player from reaction
//! events, with a timeout on every wait.
//!
//! The host feeds `input::InputEvent`s into a channel and executes the
//! `host::HostCommand`s the session sends back. `pipeline::start_session`
//! ties a session to the process-wide `registry::SessionRegistry`.

pub mod config;
pub mod host;
pub mod input;
pub mod pipeline;
pub mod registry;
pub mod session;
pub mod terminal;
