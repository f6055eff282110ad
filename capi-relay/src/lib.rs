//! Replicates recorded marketing events to third-party Conversion API
//! destinations.
//!
//! One [`registry::CapiRegistry`] holds a stateless adapter per destination
//! plus a shared HTTP client. A delivery attempt validates, builds the
//! destination payload, strips excluded fields, deep-cleans, and issues a
//! single POST; ineligible events come back as [`adapter::Delivery::Skipped`]
//! rather than errors so one destination never blocks its siblings.

pub mod adapter;
pub mod adapters;
pub mod config;
pub mod device;
pub mod error;
pub mod registry;
