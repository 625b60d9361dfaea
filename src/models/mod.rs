//! Data models for the remote user directory.
//!
//! A single entity lives here: `User`, the typed shape of one profile
//! entry from the remote endpoint.

pub mod user;

pub use user::User;
