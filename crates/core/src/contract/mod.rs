//! Contract types shared by every layer
//!
//! - [`Version`]: monotonically increasing transition counter
//! - [`Timestamp`]: microseconds since Unix epoch
//! - [`Versioned`]: a value together with the version and time it was published

mod timestamp;
mod version;
mod versioned;

pub use timestamp::Timestamp;
pub use version::Version;
pub use versioned::Versioned;
