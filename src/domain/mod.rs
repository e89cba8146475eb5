//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (errors, timestamps)
//! - `subscription` - Billing events, verification, and the subscription record

pub mod foundation;
pub mod subscription;
