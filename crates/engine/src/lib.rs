//! Resource registry, group registry, and the authorization engine.
//!
//! Control flow for a decision: resolve name -> ids via
//! [`ResourceRegistry`], then ask [`GroupRegistry`] whether any group holds
//! both the user and the grant.

pub mod authz;
pub mod groups;
pub mod resources;

pub use authz::AuthorizationEngine;
pub use groups::GroupRegistry;
pub use resources::ResourceRegistry;
