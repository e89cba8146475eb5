//! GLP-1 Tracker billing backend
//!
//! Receives Stripe webhook deliveries, verifies their signatures, reconciles
//! the local subscription record for each customer, and answers whether a
//! customer currently has premium access.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
