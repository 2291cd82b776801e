//! # Catalogue import
//!
//! The pieces of the three import stages: the field-set mappers giving each
//! stage its view of a line, the run-scoped dedupe filter, the processors,
//! the bulk writers, the logging listeners and the job assembling them.

pub mod dedup;

pub mod job;

pub mod listener;

pub mod mapper;

pub mod processor;

pub mod writer;
