//! japi Core - addressing, fingerprinting and the shared facilities
//!
//! This crate provides the pieces of the snapshot store that do no I/O:
//! - `EntityKey` and the `PathResolver` that maps keys to directories
//! - `FingerprintCodec` for canonical serialization and content hashing
//! - The extraction model and the `Extractor` trait consumed by the driver
//! - The error facility (`JapiError`, `ExError`) and the logging facility

pub mod errors;
pub mod extract;
pub mod fingerprint;
pub mod key;
pub mod logging_facility;

#[doc(hidden)]
pub use japi_core_types as __types;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, JapiError, Result};
pub use extract::{
    ActionVersion, Extractor, FunctionExtract, PackageExtract, ProjectExtract, ProjectProperties,
};
pub use fingerprint::{Fingerprint, FingerprintCodec};
pub use key::{Depth, EntityKey, PathResolver};
