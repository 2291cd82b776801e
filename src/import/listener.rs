use log::{debug, info, warn};

use crate::{
    BatchError,
    core::{
        job::{JobExecution, JobStatus},
        listener::{
            ChunkListener, ItemProcessListener, ItemReadListener, ItemWriteListener, JobListener,
            ListenerResult, StepListener,
        },
        step::StepExecution,
    },
};

/// Logs the lifecycle of one import stage, naming the entity it handles.
pub struct StageLogger {
    entity: &'static str,
}

impl StageLogger {
    pub fn new(entity: &'static str) -> Self {
        Self { entity }
    }
}

impl StepListener for StageLogger {
    fn before_step(&self, step_execution: &StepExecution) -> ListenerResult {
        info!("Start of {} import, step {}", self.entity, step_execution.name);
        Ok(())
    }

    fn after_step(&self, step_execution: &StepExecution) -> ListenerResult {
        info!(
            "End of {} import: {:?}, read {}, filtered {}, written {} in {:?}",
            self.entity,
            step_execution.status,
            step_execution.read_count,
            step_execution.filter_count,
            step_execution.write_count,
            step_execution.duration
        );
        Ok(())
    }
}

impl ChunkListener for StageLogger {
    fn before_chunk(&self, _step_execution: &StepExecution) -> ListenerResult {
        info!("Start of {} chunk", self.entity);
        Ok(())
    }

    fn after_chunk(&self, _step_execution: &StepExecution) -> ListenerResult {
        info!("End of {} chunk", self.entity);
        Ok(())
    }

    fn after_chunk_error(&self, _step_execution: &StepExecution) -> ListenerResult {
        warn!("Error in {} chunk", self.entity);
        Ok(())
    }
}

impl<I> ItemReadListener<I> for StageLogger {
    fn before_read(&self) -> ListenerResult {
        debug!("Start reading {}", self.entity);
        Ok(())
    }

    fn after_read(&self, _item: &I) -> ListenerResult {
        debug!("End reading {}", self.entity);
        Ok(())
    }

    fn on_read_error(&self, error: &BatchError) -> ListenerResult {
        warn!("Error reading {}: {}", self.entity, error);
        Ok(())
    }
}

impl<I, O> ItemProcessListener<I, O> for StageLogger {
    fn before_process(&self, _item: &I) -> ListenerResult {
        debug!("Start processing {}", self.entity);
        Ok(())
    }

    fn after_process(&self, _item: &I, result: Option<&O>) -> ListenerResult {
        if result.is_some() {
            debug!("End processing {}", self.entity);
        } else {
            debug!("End processing {}: filtered", self.entity);
        }
        Ok(())
    }

    fn on_process_error(&self, _item: &I, error: &BatchError) -> ListenerResult {
        warn!("Error processing {}: {}", self.entity, error);
        Ok(())
    }
}

impl<O> ItemWriteListener<O> for StageLogger {
    fn before_write(&self, items: &[O]) -> ListenerResult {
        info!("Start writing {} {}", items.len(), self.entity);
        Ok(())
    }

    fn after_write(&self, items: &[O]) -> ListenerResult {
        info!("End writing {} {}", items.len(), self.entity);
        Ok(())
    }

    fn on_write_error(&self, error: &BatchError, items: &[O]) -> ListenerResult {
        warn!("Error writing {} {}: {}", items.len(), self.entity, error);
        Ok(())
    }
}

#[derive(Default)]
pub struct JobLogger;

impl JobListener for JobLogger {
    fn before_job(&self, job_execution: &JobExecution) -> ListenerResult {
        info!("Start of job {}", job_execution.name);
        Ok(())
    }

    fn after_job(&self, job_execution: &JobExecution) -> ListenerResult {
        match job_execution.status {
            JobStatus::Completed => info!(
                "End of job {}: completed in {:?}",
                job_execution.name, job_execution.duration
            ),
            _ => warn!(
                "End of job {}: {:?} after {} step(s)",
                job_execution.name,
                job_execution.status,
                job_execution.step_executions.len()
            ),
        }
        Ok(())
    }
}
