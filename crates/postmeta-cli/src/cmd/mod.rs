pub mod backups;
pub mod cleanup;
pub mod episodes;
pub mod feed;
pub mod merge;
pub mod subscribers;
pub mod validate;
