use std::{
    cell::RefCell,
    time::{Duration, Instant},
};

use log::{error, info};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    listener::{JobListener, notify},
    step::{Step, StepExecution},
};

/// Type alias for job execution results.
///
/// A `JobResult` is a `Result` that contains either:
/// - A successful `JobExecution` with execution details
/// - A `BatchError` indicating what went wrong
type JobResult<T> = Result<T, BatchError>;

/// Lifecycle of a job run.
///
/// `NotStarted -> Running(step) -> ... -> Completed`, and any running step may
/// move the job to `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    NotStarted,
    /// Running the step with the given name.
    Running(String),
    Completed,
    Failed,
}

/// Represents a job that can be executed.
///
/// A job is a container for a sequence of steps that are executed in order.
/// The job is responsible for orchestrating the steps and reporting the
/// overall result.
pub trait Job {
    /// Runs the job and returns the result of the job execution.
    ///
    /// # Returns
    /// - `Ok(JobExecution)` when every step succeeded
    /// - `Err(BatchError::Step { .. })` naming the first failing step
    fn run(&self) -> JobResult<JobExecution>;
}

/// Represents the execution of a job.
#[derive(Debug, Clone)]
pub struct JobExecution {
    pub id: Uuid,
    pub name: String,
    pub status: JobStatus,
    /// The time when the job started executing
    pub start: Instant,
    /// The time when the job finished executing
    pub end: Instant,
    /// The total duration of the job execution
    pub duration: Duration,
    /// One entry per step that was started, in execution order
    pub step_executions: Vec<StepExecution>,
}

/// Represents an instance of a job.
///
/// A `JobInstance` is created through the `JobBuilder` and executed by calling
/// the `run` method. The steps are executed in the order they were added.
pub struct JobInstance<'a> {
    /// Unique identifier for this job instance
    id: Uuid,
    /// Human-readable name for the job
    name: String,
    /// Collection of steps that make up this job, in execution order
    steps: Vec<&'a dyn Step>,
    listeners: Vec<&'a dyn JobListener>,
    status: RefCell<JobStatus>,
}

impl JobInstance<'_> {
    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_status(&self) -> JobStatus {
        self.status.borrow().clone()
    }

    fn transition(&self, job_execution: &mut JobExecution, status: JobStatus) {
        info!("Job {} is now {:?}", self.name, status);
        *self.status.borrow_mut() = status.clone();
        job_execution.status = status;
    }
}

impl Job for JobInstance<'_> {
    /// Runs the job by executing its steps in sequence.
    ///
    /// A failing step stops the job: later steps are not started and the
    /// error is returned wrapped in `BatchError::Step`. Job listeners are
    /// called on both outcomes.
    fn run(&self) -> JobResult<JobExecution> {
        let start = Instant::now();

        let mut job_execution = JobExecution {
            id: self.id,
            name: self.name.clone(),
            status: JobStatus::NotStarted,
            start,
            end: start,
            duration: Duration::default(),
            step_executions: Vec::with_capacity(self.steps.len()),
        };

        info!("Start of job: {}, id: {}", self.name, self.id);
        notify(&self.listeners, "before_job", |l| l.before_job(&job_execution));

        let mut failure = None;

        for step in &self.steps {
            let running = JobStatus::Running(step.get_name().to_owned());
            self.transition(&mut job_execution, running);

            let mut step_execution = StepExecution::new(step.get_name());
            let result = step.execute(&mut step_execution);
            job_execution.step_executions.push(step_execution);

            if let Err(error) = result {
                error!("Job {} aborted in step {}", self.name, step.get_name());
                failure = Some(BatchError::Step {
                    name: step.get_name().to_owned(),
                    source: Box::new(error),
                });
                break;
            }
        }

        let final_status = if failure.is_some() {
            JobStatus::Failed
        } else {
            JobStatus::Completed
        };
        self.transition(&mut job_execution, final_status);

        job_execution.end = Instant::now();
        job_execution.duration = start.elapsed();

        notify(&self.listeners, "after_job", |l| l.after_job(&job_execution));
        info!("End of job: {}, id: {}", self.name, self.id);

        match failure {
            Some(error) => Err(error),
            None => Ok(job_execution),
        }
    }
}

/// Builder for creating a job instance.
///
/// ```
/// use book_import_batch::core::job::{Job, JobBuilder, JobStatus};
///
/// let job = JobBuilder::new().name("nothing-to-do".to_string()).build();
/// assert_eq!(job.get_status(), JobStatus::NotStarted);
///
/// let execution = job.run().unwrap();
/// assert_eq!(execution.status, JobStatus::Completed);
/// ```
#[derive(Default)]
pub struct JobBuilder<'a> {
    /// Optional name for the job (generated randomly if not specified)
    name: Option<String>,
    /// Collection of steps to be executed, in order
    steps: Vec<&'a dyn Step>,
    listeners: Vec<&'a dyn JobListener>,
}

impl<'a> JobBuilder<'a> {
    pub fn new() -> Self {
        Self {
            name: None,
            steps: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn name(mut self, name: String) -> JobBuilder<'a> {
        self.name = Some(name);
        self
    }

    /// Sets the first step of the job.
    ///
    /// Identical to `next()`, reads better for the initial step.
    pub fn start(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    /// Adds a step to the job. Steps are executed in the order they are added.
    pub fn next(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    pub fn listener(mut self, listener: &'a dyn JobListener) -> JobBuilder<'a> {
        self.listeners.push(listener);
        self
    }

    /// Builds the `JobInstance`. If no name has been provided, a random
    /// name is generated.
    pub fn build(self) -> JobInstance<'a> {
        JobInstance {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            steps: self.steps,
            listeners: self.listeners,
            status: RefCell::new(JobStatus::NotStarted),
        }
    }
}
