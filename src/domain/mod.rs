/// Authors, genres, books and comments as stored.
pub mod model;

/// Author and genre value objects built from parsed fields.
pub mod normalizer;

/// Field splitting and typing of catalogue lines.
pub mod parser;
