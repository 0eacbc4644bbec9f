//! Collection endpoints for VexDB
//!
//! Transport-agnostic handlers for the collection REST surface. Each handler
//! calls into a shared [`CollectionRegistry`](vexdb_engine::CollectionRegistry)
//! and returns an [`ApiResponse`]: an HTTP status code plus the JSON body
//! `{"result": ..., "status": "ok", "time": ...}`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collections;
pub mod error;
pub mod response;

pub use collections::{
    CollectionDescription, CollectionExistence, CollectionInfo, CollectionsApi,
    CollectionsResponse,
};
pub use error::{status_for, ApiError};
pub use response::{process_response, ApiResponse, ResponseBody, ResponseStatus};
