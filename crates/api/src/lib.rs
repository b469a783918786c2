//! Template manager API server library.
//!
//! Exposes the core building blocks (config, state, error handling, routes,
//! send orchestration) so integration tests and the binary entrypoints can
//! both access them.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod orchestrator;
pub mod query;
pub mod router;
pub mod routes;
pub mod state;
