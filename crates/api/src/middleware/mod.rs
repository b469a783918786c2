//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `ManageUsers` capability.
//! - [`rbac::RequireEditor`] -- Requires the `EditContent` capability.
//! - [`rbac::RequireSender`] -- Requires the `SendMail` capability.

pub mod auth;
pub mod rbac;
