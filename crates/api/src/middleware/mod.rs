//! Authentication and authorization.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::require_org_role`] -- Checks the caller's role in an organization.

pub mod auth;
pub mod rbac;
