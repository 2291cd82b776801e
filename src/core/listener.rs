//! Lifecycle hooks invoked by jobs and steps.
//!
//! Every hook has a no-op default so a listener only implements what it
//! observes. Hooks return a `Result`, but an error coming back from a hook is
//! only logged: listeners never change the outcome of a step or a job.

use log::warn;

use crate::BatchError;

use super::{job::JobExecution, step::StepExecution};

pub type ListenerResult = Result<(), BatchError>;

pub trait JobListener {
    fn before_job(&self, _job_execution: &JobExecution) -> ListenerResult {
        Ok(())
    }

    fn after_job(&self, _job_execution: &JobExecution) -> ListenerResult {
        Ok(())
    }
}

pub trait StepListener {
    fn before_step(&self, _step_execution: &StepExecution) -> ListenerResult {
        Ok(())
    }

    fn after_step(&self, _step_execution: &StepExecution) -> ListenerResult {
        Ok(())
    }
}

pub trait ChunkListener {
    fn before_chunk(&self, _step_execution: &StepExecution) -> ListenerResult {
        Ok(())
    }

    fn after_chunk(&self, _step_execution: &StepExecution) -> ListenerResult {
        Ok(())
    }

    fn after_chunk_error(&self, _step_execution: &StepExecution) -> ListenerResult {
        Ok(())
    }
}

pub trait ItemReadListener<I> {
    fn before_read(&self) -> ListenerResult {
        Ok(())
    }

    fn after_read(&self, _item: &I) -> ListenerResult {
        Ok(())
    }

    fn on_read_error(&self, _error: &BatchError) -> ListenerResult {
        Ok(())
    }
}

pub trait ItemProcessListener<I, O> {
    fn before_process(&self, _item: &I) -> ListenerResult {
        Ok(())
    }

    /// `result` is `None` when the processor filtered the item.
    fn after_process(&self, _item: &I, _result: Option<&O>) -> ListenerResult {
        Ok(())
    }

    fn on_process_error(&self, _item: &I, _error: &BatchError) -> ListenerResult {
        Ok(())
    }
}

pub trait ItemWriteListener<O> {
    fn before_write(&self, _items: &[O]) -> ListenerResult {
        Ok(())
    }

    fn after_write(&self, _items: &[O]) -> ListenerResult {
        Ok(())
    }

    fn on_write_error(&self, _error: &BatchError, _items: &[O]) -> ListenerResult {
        Ok(())
    }
}

/// Calls `hook` on every listener in registration order, logging failures.
pub(crate) fn notify<L: ?Sized>(
    listeners: &[&L],
    hook_name: &str,
    hook: impl Fn(&L) -> ListenerResult,
) {
    for listener in listeners {
        if let Err(error) = hook(*listener) {
            warn!("Listener {} failed: {}", hook_name, error);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct Recorder {
        calls: RefCell<Vec<&'static str>>,
        fail: bool,
    }

    impl StepListener for Recorder {
        fn before_step(&self, _step_execution: &StepExecution) -> ListenerResult {
            self.calls.borrow_mut().push("before_step");
            if self.fail {
                return Err(BatchError::ItemProcessor("boom".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn notify_runs_every_listener_even_after_a_failure() {
        let failing = Recorder {
            calls: RefCell::new(Vec::new()),
            fail: true,
        };
        let healthy = Recorder {
            calls: RefCell::new(Vec::new()),
            fail: false,
        };
        let listeners: Vec<&dyn StepListener> = vec![&failing, &healthy];
        let execution = StepExecution::new("authors");

        notify(&listeners, "before_step", |l| l.before_step(&execution));

        assert_eq!(*failing.calls.borrow(), vec!["before_step"]);
        assert_eq!(*healthy.calls.borrow(), vec!["before_step"]);
    }
}
