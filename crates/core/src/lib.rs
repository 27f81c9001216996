//! Gonasi domain logic.
//!
//! Everything in this crate is pure: no database, no HTTP. The `db` and
//! `api` crates build on these types.

pub mod error;
pub mod interaction;
pub mod ordering;
pub mod plugins;
pub mod progress;
pub mod roles;
pub mod scoring;
pub mod settings;
pub mod storage;
pub mod types;
