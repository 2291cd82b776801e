mod common;

use mockall::{Sequence, predicate::eq};
use mongodb::bson::oid::ObjectId;

use book_import_batch::{
    BatchError,
    core::job::{Job, JobStatus},
    domain::model::{Author, Country, Genre},
    import::job::BookImportJobBuilder,
};

use common::{MockLibraryRepository, config_for, csv_file, init_logger, today};

fn stored_author(name: &str, surname: &str) -> Author {
    Author {
        id: Some(ObjectId::new()),
        ..Author::new(name, surname, Country::None)
    }
}

fn stored_genre(name: &str) -> Genre {
    Genre {
        id: Some(ObjectId::new()),
        name: name.to_string(),
    }
}

#[test]
fn stored_references_are_never_written_again() {
    init_logger();
    let file = csv_file("Dune;1965-08-01;Frank Herbert;Science Fiction\n");
    let config = config_for(&file);

    let mut repository = MockLibraryRepository::new();
    repository
        .expect_find_author()
        .with(eq("Frank"), eq("Herbert"))
        .returning(|name, surname| Ok(Some(stored_author(name, surname))));
    repository
        .expect_find_genre()
        .with(eq("Science Fiction"))
        .returning(|name| Ok(Some(stored_genre(name))));
    repository.expect_save_authors().never();
    repository.expect_save_genres().never();
    repository
        .expect_save_books()
        .withf(|books| books.len() == 1 && books[0].age == 60)
        .times(1)
        .returning(|_| Ok(()));

    let job = BookImportJobBuilder::new(&config)
        .repository(&repository)
        .today(today())
        .build();
    let execution = job.run().unwrap();

    assert_eq!(execution.step_executions[0].filter_count, 1);
    assert_eq!(execution.step_executions[1].filter_count, 1);
    assert_eq!(execution.step_executions[2].write_count, 1);
}

#[test]
fn genres_are_written_one_chunk_at_a_time() {
    init_logger();
    let file = csv_file(
        "A;2001-01-01;Ann Lee;Poetry
B;2002-01-01;Ann Lee;Drama
C;2003-01-01;Ann Lee;Essay
D;2004-01-01;Ann Lee;Poetry
E;2005-01-01;Ann Lee;Satire
",
    );
    let config = config_for(&file);

    let mut repository = MockLibraryRepository::new();
    repository
        .expect_find_author()
        .returning(|name, surname| Ok(Some(stored_author(name, surname))));
    repository.expect_find_genre().returning(|_| Ok(None));
    repository.expect_save_authors().never();

    let mut seq = Sequence::new();
    repository
        .expect_save_genres()
        .withf(|genres| {
            genres.iter().map(|g| g.name.as_str()).collect::<Vec<_>>()
                == ["Poetry", "Drama", "Essay"]
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    repository
        .expect_save_genres()
        .withf(|genres| genres.len() == 1 && genres[0].name == "Satire")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    repository.expect_save_books().never();

    let job = BookImportJobBuilder::new(&config)
        .repository(&repository)
        .today(today())
        .build();
    let error = job.run().unwrap_err();

    // the mock keeps no genre, so the books stage cannot resolve the first one
    assert!(matches!(
        error.root_cause(),
        BatchError::MissingReference { kind: "genre", .. }
    ));
    assert_eq!(job.get_status(), JobStatus::Failed);
}

#[test]
fn store_failure_fails_the_job() {
    init_logger();
    let file = csv_file("Dune;1965-08-01;Frank Herbert;Science Fiction\n");
    let config = config_for(&file);

    let mut repository = MockLibraryRepository::new();
    repository
        .expect_find_author()
        .times(1)
        .returning(|_, _| Err(BatchError::Store("connection refused".to_string())));
    repository.expect_find_genre().never();
    repository.expect_save_authors().never();
    repository.expect_save_genres().never();
    repository.expect_save_books().never();

    let job = BookImportJobBuilder::new(&config)
        .repository(&repository)
        .build();

    match job.run() {
        Err(BatchError::Step { name, source }) => {
            assert_eq!(name, "authors");
            assert!(matches!(*source, BatchError::Store(_)));
        }
        other => panic!("job should have failed: {:?}", other.map(|e| e.status)),
    }
    assert_eq!(job.get_status(), JobStatus::Failed);
}

#[test]
fn write_failure_is_reported_as_root_cause() {
    init_logger();
    let file = csv_file("Dune;1965-08-01;Frank Herbert;Science Fiction\n");
    let config = config_for(&file);

    let mut repository = MockLibraryRepository::new();
    repository.expect_find_author().returning(|_, _| Ok(None));
    repository
        .expect_save_authors()
        .times(1)
        .returning(|_| Err(BatchError::Store("duplicate key".to_string())));

    let job = BookImportJobBuilder::new(&config)
        .repository(&repository)
        .build();
    let error = job.run().unwrap_err();

    assert!(matches!(error.root_cause(), BatchError::Store(message) if message == "duplicate key"));
}
