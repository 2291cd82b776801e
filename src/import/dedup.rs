use std::{
    collections::HashSet,
    fmt::Display,
    hash::Hash,
    sync::{Mutex, MutexGuard, PoisonError},
};

use log::debug;

use crate::{
    BatchError,
    core::{
        listener::{ListenerResult, StepListener},
        step::StepExecution,
    },
};

/// Run-scoped memory of the identities admitted by a step.
///
/// A candidate is admitted when the store does not hold it yet and no other
/// candidate with the same key was admitted since the step started. The
/// set is emptied at step start and at step end, so nothing leaks from one
/// run to the next.
///
/// `admit` can be called from several threads: the set insertion is the
/// only decision point, so two concurrent candidates sharing a key can never
/// both be admitted.
pub struct DedupFilter<K> {
    entity: &'static str,
    seen: Mutex<HashSet<K>>,
}

impl<K> DedupFilter<K>
where
    K: Eq + Hash + Display,
{
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Decides whether `key` must be written.
    ///
    /// `is_stored` is asked first; a key already in the store is rejected and
    /// not remembered.
    pub fn admit<F>(&self, key: K, is_stored: F) -> Result<bool, BatchError>
    where
        F: FnOnce(&K) -> Result<bool, BatchError>,
    {
        if is_stored(&key)? {
            debug!("{} {} already stored, skipping", self.entity, key);
            return Ok(false);
        }

        let admitted = self.lock().insert(key);
        if !admitted {
            debug!("{} already admitted in this run, skipping", self.entity);
        }
        Ok(admitted)
    }

    /// Forgets an admitted key, so that a later candidate can be admitted
    /// again. Used when the item carrying the key was never written.
    pub fn release(&self, key: &K) -> bool {
        let released = self.lock().remove(key);
        if released {
            debug!("{} {} released", self.entity, key);
        }
        released
    }

    pub fn seen_count(&self) -> usize {
        self.lock().len()
    }

    pub fn reset(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<K>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K> StepListener for DedupFilter<K>
where
    K: Eq + Hash + Display,
{
    fn before_step(&self, _step_execution: &StepExecution) -> ListenerResult {
        self.reset();
        Ok(())
    }

    fn after_step(&self, step_execution: &StepExecution) -> ListenerResult {
        debug!(
            "Step {} admitted {} distinct {}",
            step_execution.name,
            self.seen_count(),
            self.entity
        );
        self.reset();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Barrier,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
    };

    use super::*;

    fn nothing_stored(_: &String) -> Result<bool, BatchError> {
        Ok(false)
    }

    #[test]
    fn admits_each_key_once() {
        let filter = DedupFilter::new("genre");

        assert!(filter.admit("Fantasy".to_string(), nothing_stored).unwrap());
        assert!(!filter.admit("Fantasy".to_string(), nothing_stored).unwrap());
        assert!(filter.admit("Romance".to_string(), nothing_stored).unwrap());
        assert_eq!(filter.seen_count(), 2);
    }

    #[test]
    fn stored_key_is_rejected_and_not_remembered() {
        let filter = DedupFilter::new("genre");

        let admitted = filter
            .admit("Fantasy".to_string(), |_| Ok(true))
            .unwrap();

        assert!(!admitted);
        assert_eq!(filter.seen_count(), 0);
    }

    #[test]
    fn store_errors_propagate() {
        let filter: DedupFilter<String> = DedupFilter::new("genre");

        let result = filter.admit("Fantasy".to_string(), |_| {
            Err(BatchError::Store("connection refused".to_string()))
        });

        assert!(matches!(result, Err(BatchError::Store(_))));
        assert_eq!(filter.seen_count(), 0);
    }

    #[test]
    fn released_key_can_be_admitted_again() {
        let filter = DedupFilter::new("genre");
        filter.admit("Fantasy".to_string(), nothing_stored).unwrap();

        assert!(filter.release(&"Fantasy".to_string()));
        assert!(!filter.release(&"Fantasy".to_string()));
        assert!(filter.admit("Fantasy".to_string(), nothing_stored).unwrap());
    }

    #[test]
    fn step_boundaries_reset_the_set() {
        let filter = DedupFilter::new("genre");
        let execution = StepExecution::new("genres");
        filter.admit("Fantasy".to_string(), nothing_stored).unwrap();

        filter.after_step(&execution).unwrap();
        assert_eq!(filter.seen_count(), 0);

        filter.admit("Fantasy".to_string(), nothing_stored).unwrap();
        filter.before_step(&execution).unwrap();
        assert!(filter.admit("Fantasy".to_string(), nothing_stored).unwrap());
    }

    #[test]
    fn concurrent_candidates_with_same_key_admit_exactly_one() {
        let filter = DedupFilter::new("author");
        let threads = 8;
        let barrier = Barrier::new(threads);
        let admitted = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..threads {
                scope.spawn(|| {
                    barrier.wait();
                    if filter.admit("Frank Herbert".to_string(), nothing_stored).unwrap() {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(admitted.load(Ordering::SeqCst), 1);
        assert_eq!(filter.seen_count(), 1);
    }
}
