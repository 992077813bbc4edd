//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the profile behind a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- requires the `ADM` role.
//! - [`rbac::RequireManager`] -- requires `GERENTE` or `ADM`.
//! - [`rbac::RequireAuth`] -- requires any authenticated profile.

pub mod auth;
pub mod rbac;
