//! Session management module
//!
//! Owns the live session collection and the option store the console
//! operates on. The console core talks to this module only through the
//! `SessionManager` interface.

pub mod session_manager;

pub use session_manager::{Session, SessionId, SessionManager};
