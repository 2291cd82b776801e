//! # Repository Cleaning Tasklet
//!
//! Empties the library store before an import, so that a run starts from a
//! blank catalogue.
//!
//! ```rust
//! use book_import_batch::core::step::{Step, StepBuilder, StepExecution};
//! use book_import_batch::domain::model::Genre;
//! use book_import_batch::item::memory::InMemoryLibraryRepository;
//! use book_import_batch::item::repository::LibraryRepository;
//! use book_import_batch::tasklet::cleaner::CleanRepositoryTasklet;
//!
//! # fn example() -> Result<(), book_import_batch::BatchError> {
//! let repository = InMemoryLibraryRepository::new();
//! repository.save_genres(&[Genre::new("Poetry")])?;
//!
//! let tasklet = CleanRepositoryTasklet::new(&repository);
//! let step = StepBuilder::new("clean").tasklet(&tasklet).build();
//!
//! let mut step_execution = StepExecution::new("clean");
//! step.execute(&mut step_execution)?;
//!
//! assert!(repository.genres().is_empty());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use log::info;

use crate::{
    BatchError,
    core::step::{RepeatStatus, StepExecution, Tasklet},
    item::repository::RepositoryCleaner,
};

pub struct CleanRepositoryTasklet<'a> {
    cleaner: &'a dyn RepositoryCleaner,
}

impl<'a> CleanRepositoryTasklet<'a> {
    pub fn new(cleaner: &'a dyn RepositoryCleaner) -> Self {
        Self { cleaner }
    }
}

impl Tasklet for CleanRepositoryTasklet<'_> {
    fn execute(&self, step_execution: &StepExecution) -> Result<RepeatStatus, BatchError> {
        info!("Cleaning library store in step {}", step_execution.name);

        self.cleaner.clear_all()?;

        info!("Library store cleaned");
        Ok(RepeatStatus::Finished)
    }
}
