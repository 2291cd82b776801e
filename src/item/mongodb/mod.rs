/// MongoDB implementation of the repository traits.
pub mod mongodb_repository;
