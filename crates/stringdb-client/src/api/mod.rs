//! STRING REST API access
//!
//! Thin request/response layer over the public web service: URL builders,
//! a retrying HTTP client, response types and a TSV table wrapper.

pub mod client;
pub mod endpoints;
pub mod tsv;
pub mod types;

pub use client::{ApiClient, Form};
pub use tsv::TsvTable;
pub use types::*;
