//! VexDB - collection registry for a vector database
//!
//! VexDB keeps the authoritative record of which vector collections exist
//! and answers "does collection X exist?" while other collections are being
//! created and dropped concurrently.
//!
//! # Quick Start
//!
//! ```ignore
//! use vexdb::{CollectionConfig, CollectionRegistry, Distance};
//!
//! let registry = CollectionRegistry::open("./data")?;
//! registry.create_collection("docs", CollectionConfig::new(384, Distance::Cosine))?;
//!
//! assert!(registry.collection_exists("docs"));
//! assert_eq!(registry.list_collections(), vec!["docs".to_string()]);
//!
//! registry.drop_collection("docs")?;
//! ```
//!
//! # Architecture
//!
//! - `vexdb-core`: names, lifecycle states, configs, errors
//! - `vexdb-engine`: the registry, backing stores, `vexdb.toml`
//! - `vexdb-api`: transport-agnostic collection endpoints
//!
//! [`logging::init`] installs the process-wide `tracing` subscriber.

pub mod logging;

pub use vexdb_api::{ApiError, ApiResponse, CollectionsApi};
pub use vexdb_core::*;
pub use vexdb_engine::*;
