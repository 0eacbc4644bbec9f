//! Collection endpoint handlers
//!
//! | Endpoint | Handler |
//! |----------|---------|
//! | `PUT /collections/{name}` | [`CollectionsApi::create_collection`] |
//! | `DELETE /collections/{name}` | [`CollectionsApi::delete_collection`] |
//! | `GET /collections/{name}/exists` | [`CollectionsApi::collection_exists`] |
//! | `GET /collections` | [`CollectionsApi::list_collections`] |
//! | `GET /collections/{name}` | [`CollectionsApi::get_collection`] |
//!
//! Handlers take already-extracted path parameters and bodies and return an
//! [`ApiResponse`]; routing and the wire belong to the embedding server.

use crate::error::ApiError;
use crate::response::{process_response, ApiResponse};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use vexdb_core::{CollectionConfig, CollectionEntry, CollectionState, RegistryError, Timestamp};
use vexdb_engine::CollectionRegistry;

/// Result of `GET /collections/{name}/exists`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionExistence {
    /// Whether the collection exists and is usable
    pub exists: bool,
}

/// One element of the collection list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDescription {
    /// Collection name
    pub name: String,
}

/// Result of `GET /collections`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionsResponse {
    /// Ready collections, sorted by name
    pub collections: Vec<CollectionDescription>,
}

/// Result of `GET /collections/{name}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name
    pub name: String,
    /// Lifecycle state
    pub status: CollectionState,
    /// Version of the last transition
    pub version: u64,
    /// Creation configuration
    pub config: CollectionConfig,
    /// When the collection was created
    pub created_at: DateTime<Utc>,
    /// When the collection last changed state
    pub last_modified_at: DateTime<Utc>,
}

/// Epoch if the timestamp is beyond what `DateTime` can hold
fn to_datetime(ts: Timestamp) -> DateTime<Utc> {
    i64::try_from(ts.as_micros())
        .ok()
        .and_then(|micros| Utc.timestamp_micros(micros).single())
        .unwrap_or_default()
}

impl From<CollectionEntry> for CollectionInfo {
    fn from(entry: CollectionEntry) -> Self {
        CollectionInfo {
            name: entry.name,
            status: entry.state,
            version: entry.version.as_u64(),
            config: entry.config,
            created_at: to_datetime(entry.created_at),
            last_modified_at: to_datetime(entry.last_modified_at),
        }
    }
}

/// Handlers for the collection endpoints
#[derive(Clone)]
pub struct CollectionsApi {
    registry: Arc<CollectionRegistry>,
}

impl CollectionsApi {
    /// Serve requests against `registry`
    pub fn new(registry: Arc<CollectionRegistry>) -> Self {
        Self { registry }
    }

    /// The registry behind these handlers
    pub fn registry(&self) -> &Arc<CollectionRegistry> {
        &self.registry
    }

    /// `PUT /collections/{name}`
    pub fn create_collection(&self, name: &str, config: CollectionConfig) -> ApiResponse<bool> {
        let timing = Instant::now();
        debug!(target: "vexdb::api", collection = name, "Create collection request");

        let response = self
            .registry
            .create_collection(name, config)
            .map(|_| true);

        process_response(response, timing)
    }

    /// `PUT /collections/{name}` with the raw JSON body
    ///
    /// A body that does not parse as a collection config is a 400.
    pub fn create_collection_json(&self, name: &str, body: &str) -> ApiResponse<bool> {
        match serde_json::from_str::<CollectionConfig>(body) {
            Ok(config) => self.create_collection(name, config),
            Err(e) => ApiResponse::error(
                ApiError::bad_request(format!("Invalid collection config: {}", e)),
                Instant::now(),
            ),
        }
    }

    /// `DELETE /collections/{name}`
    pub fn delete_collection(&self, name: &str) -> ApiResponse<bool> {
        let timing = Instant::now();
        debug!(target: "vexdb::api", collection = name, "Delete collection request");

        let response = self.registry.drop_collection(name).map(|_| true);

        process_response(response, timing)
    }

    /// `GET /collections/{name}/exists`
    ///
    /// Always 200: a missing collection is `{"exists": false}`.
    pub fn collection_exists(&self, name: &str) -> ApiResponse<CollectionExistence> {
        let timing = Instant::now();
        let exists = self.registry.collection_exists(name);
        ApiResponse::ok(CollectionExistence { exists }, timing)
    }

    /// `GET /collections`
    pub fn list_collections(&self) -> ApiResponse<CollectionsResponse> {
        let timing = Instant::now();
        let collections = self
            .registry
            .list_collections()
            .into_iter()
            .map(|name| CollectionDescription { name })
            .collect();
        ApiResponse::ok(CollectionsResponse { collections }, timing)
    }

    /// `GET /collections/{name}`
    ///
    /// 404 unless the collection is Ready.
    pub fn get_collection(&self, name: &str) -> ApiResponse<CollectionInfo> {
        let timing = Instant::now();
        let response = self
            .registry
            .get_collection(name)
            .filter(|versioned| versioned.value.is_ready())
            .map(|versioned| CollectionInfo::from(versioned.into_value()))
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            });

        process_response(response, timing)
    }
}
