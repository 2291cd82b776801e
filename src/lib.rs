#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # Book Import Batch

 A chunk-oriented batch job loading a semicolon-delimited book catalogue
 into MongoDB. The job is built on a small Spring Batch style toolkit: a
 `Job` runs `Step`s in order, and each chunk-oriented step reads items one
 by one, processes them, and writes them a chunk at a time.

 ## Core Concepts

- **Job:** the whole import. It runs an optional `clean` step, then the
  `authors`, `genres` and `books` stages.
- **Step:** one stage of the import. Every stage re-reads the catalogue
  from its first line.
- **ItemReader:** turns the lines of the catalogue into items. Each stage
  plugs its own field-set mapper, so it parses only the columns it needs.
- **ItemProcessor:** business logic. The first two stages drop entities
  already stored or already met in the run. The books stage resolves
  references and computes the age of the book.
- **ItemWriter:** bulk inserts of the surviving items.

 ## Input

```text
Dune;1965-08-01;Frank Herbert;Science Fiction
Good Omens;1990-05-01;Terry Pratchett, Neil Gaiman;Fantasy
```

 Columns are `name;publishedDate;authors;genre`. Authors are a
 comma-separated list of `Name Surname`.

 ## Getting Started

```rust
# use std::io::Write;
use book_import_batch::{
    config::ImportConfig,
    core::job::{Job, JobStatus},
    import::job::BookImportJobBuilder,
    item::memory::InMemoryLibraryRepository,
};

# fn main() -> Result<(), book_import_batch::BatchError> {
# let mut file = tempfile::NamedTempFile::new()?;
# writeln!(file, "Dune;1965-08-01;Frank Herbert;Science Fiction")?;
let config = ImportConfig {
    input_path: file.path().to_string_lossy().into_owned(),
    ..ImportConfig::default()
};
let repository = InMemoryLibraryRepository::new();

let job = BookImportJobBuilder::new(&config)
    .repository(&repository)
    .build();
let execution = job.run()?;

assert_eq!(execution.status, JobStatus::Completed);
assert_eq!(repository.books()[0].title, "Dune");
# Ok(())
# }
```

 Against MongoDB, use `MongoLibraryRepository::connect` instead of the
 in-memory store, or run the `book-import` binary with a JSON settings file.

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Settings of an import run
pub mod config;

/// Core module for batch operations
pub mod core;

/// Catalogue entities, line parsing and normalization
pub mod domain;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// The three-stage catalogue import
pub mod import;

/// Item readers and the library stores
pub mod item;

/// Single-task steps
pub mod tasklet;
