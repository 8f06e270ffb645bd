//! postmeta-store: verified backups of the files the pipeline rewrites
//!
//! Every in-place rewrite is preceded by a timestamped copy whose blake3
//! hash is recorded in a manifest, so a failed run can be rolled back to
//! exactly the bytes it started from.

pub mod hash;
pub mod manifest;
pub mod store;

pub use hash::{hash_file, short_hash};
pub use manifest::{BackupEntry, BackupManifest};
pub use store::{BackupStore, VerifyResult};
