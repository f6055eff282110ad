//! Shared types and pure transforms for conversion-event replication.
//!
//! Everything in this crate is side-effect free: record shapes consumed from
//! the ingestion layer, the canonical-to-destination event name mapper, the
//! dot-path redaction engine, the deep-clean normalizer and the personal-data
//! hashing helpers. The HTTP-facing half lives in `capi-relay`.

pub mod clean;
pub mod event;
pub mod hashing;
pub mod mapping;
pub mod platform;
pub mod redact;
