/// Delimited-file item reader.
pub mod csv;

/// Process-memory library store, used by tests and dry runs.
pub mod memory;

/// MongoDB library store.
pub mod mongodb;

/// Repository traits shared by the stores.
pub mod repository;
