//! Domain logic for the template manager.
//!
//! Everything in this crate is pure: no database, network, or clock access
//! beyond type definitions. The `db` and `api` crates build on top of it.

pub mod colors;
pub mod error;
pub mod roles;
pub mod sanitize;
pub mod template;
pub mod types;
pub mod validation;
pub mod variables;
