use rand::distr::{Alphanumeric, SampleString};

/// Reader, processor and writer contracts.
pub mod item;

/// Job, sequencing steps and tracking the run status.
pub mod job;

/// Hooks around jobs, steps, chunks and items.
pub mod listener;

/// Chunk-oriented and tasklet steps.
pub mod step;

/// Generates a random name consisting of alphanumeric characters.
fn build_name() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 8)
}
