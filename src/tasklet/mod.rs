//! # Tasklet Module
//!
//! Single-task steps that don't follow the chunk-oriented processing pattern.

pub mod cleaner;
