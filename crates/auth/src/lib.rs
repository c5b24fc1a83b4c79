//! `storefront-auth` — typed identity boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. It models who
//! is making a request: an authenticated user with an explicit role, or a
//! guest with no identity at all.

pub mod identity;
pub mod role;

pub use identity::Identity;
pub use role::Role;
