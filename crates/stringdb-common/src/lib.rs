//! stringdb common library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging and error handling for the stringdb workspace.
//!
//! - **Types**: [`TaxonId`](types::TaxonId) and the [`Identifier`](types::Identifier)
//!   value object every request is built from
//! - **Logging**: `tracing` subscriber setup
//! - **Errors**: [`CommonError`]
//!
//! # Example
//!
//! ```
//! use stringdb_common::types::{Identifier, TaxonId};
//!
//! let ids = Identifier::new(TaxonId::HUMAN, ["TP53", "MDM2"]);
//! assert_eq!(ids.serialize().unwrap(), "TP53\rMDM2");
//! ```

pub mod error;
pub mod logging;
pub mod types;

pub use error::{CommonError, Result};
