//! Typed wrappers for each Honeycomb resource.
//!
//! Every operation is one round trip through [`crate::client::ApiClient`];
//! nothing is cached between calls.

pub mod auth;
pub mod boards;
pub mod burn_alerts;
pub mod columns;
pub mod datasets;
pub mod derived_columns;
pub mod marker_settings;
pub mod markers;
pub mod queries;
pub mod query_annotations;
pub mod query_results;
pub mod slos;

use serde::{Deserialize, Serialize};

/// Key/value tag shared by boards and SLOs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}
