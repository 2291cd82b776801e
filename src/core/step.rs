use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::BatchError;

use super::{
    item::{ItemProcessor, ItemReader, ItemWriter},
    listener::{
        ChunkListener, ItemProcessListener, ItemReadListener, ItemWriteListener, StepListener,
        notify,
    },
};

#[derive(Debug, PartialEq)]
pub enum ChunkStatus {
    /// The chunk reached its size, more items may follow.
    Full,
    /// The reader is exhausted, the chunk holds the last items (possibly none).
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Starting,
    Started,
    Success,
    ReadError,
    ProcessorError,
    WriteError,
    Failed,
}

/// Counters and timing of one step run.
#[derive(Debug, Clone)]
pub struct StepExecution {
    /// Unique identifier for this step run
    pub id: Uuid,
    pub name: String,
    pub status: StepStatus,
    pub start_time: Option<Instant>,
    pub end_time: Option<Instant>,
    pub duration: Duration,
    /// Number of items successfully read
    pub read_count: usize,
    /// Number of items the processor rejected without error
    pub filter_count: usize,
    /// Number of items successfully written
    pub write_count: usize,
    /// Number of items the reader failed to produce
    pub read_error_count: usize,
    /// Number of items the processor failed on
    pub process_error_count: usize,
    /// Number of failed write calls, one per chunk whatever its size
    pub write_error_count: usize,
    /// Number of chunks that carried at least one item
    pub chunk_count: usize,
}

impl StepExecution {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: StepStatus::Starting,
            start_time: None,
            end_time: None,
            duration: Duration::default(),
            read_count: 0,
            filter_count: 0,
            write_count: 0,
            read_error_count: 0,
            process_error_count: 0,
            write_error_count: 0,
            chunk_count: 0,
        }
    }
}

pub trait Step {
    fn get_name(&self) -> &str;

    /// Executes the step, recording counters and status in `step_execution`.
    ///
    /// # Returns
    /// - `Ok(())`: the step completed successfully
    /// - `Err(BatchError)`: the error that stopped the step
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError>;
}

#[derive(Debug, PartialEq)]
pub enum RepeatStatus {
    /// The tasklet wants to be called again.
    Continuable,
    /// The tasklet has finished executing.
    Finished,
}

/// A single unit of work run as a step, outside the read/process/write model.
pub trait Tasklet {
    fn execute(&self, step_execution: &StepExecution) -> Result<RepeatStatus, BatchError>;
}

pub struct TaskletStep<'a> {
    name: String,
    tasklet: &'a dyn Tasklet,
    step_listeners: Vec<&'a dyn StepListener>,
}

impl Step for TaskletStep<'_> {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let start_time = Instant::now();
        step_execution.start_time = Some(start_time);
        step_execution.status = StepStatus::Started;

        info!(
            "Start of step: {}, id: {}",
            step_execution.name, step_execution.id
        );
        notify(&self.step_listeners, "before_step", |l| {
            l.before_step(step_execution)
        });

        let result = loop {
            match self.tasklet.execute(step_execution) {
                Ok(RepeatStatus::Continuable) => continue,
                Ok(RepeatStatus::Finished) => break Ok(()),
                Err(error) => break Err(error),
            }
        };

        step_execution.status = if result.is_ok() {
            StepStatus::Success
        } else {
            StepStatus::Failed
        };
        step_execution.end_time = Some(Instant::now());
        step_execution.duration = start_time.elapsed();

        if let Err(error) = &result {
            error!("Step {} failed: {}", step_execution.name, error);
        }

        notify(&self.step_listeners, "after_step", |l| {
            l.after_step(step_execution)
        });
        info!(
            "End of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        result
    }
}

/// A step reading items one by one, processing them and writing them in
/// chunks of `chunk_size`.
///
/// Errors are counted per kind: one per failed read, one per failed
/// process, one per failed chunk write. As long as the total stays within
/// `skip_limit` the faulty item (or chunk) is dropped and the step goes on; the first
/// error over the limit aborts the current chunk and fails the step. With the
/// default limit of 0 every error is fatal. Chunks already written stay
/// written.
pub struct ChunkOrientedStep<'a, I, O> {
    name: String,
    /// Component responsible for reading items from the source
    reader: &'a dyn ItemReader<I>,
    /// Component responsible for processing items
    processor: &'a dyn ItemProcessor<I, O>,
    /// Component responsible for writing items to the destination
    writer: &'a dyn ItemWriter<O>,
    /// Number of items to process in each chunk
    chunk_size: u16,
    /// Maximum number of errors allowed before failing the step
    skip_limit: u16,
    step_listeners: Vec<&'a dyn StepListener>,
    chunk_listeners: Vec<&'a dyn ChunkListener>,
    read_listeners: Vec<&'a dyn ItemReadListener<I>>,
    process_listeners: Vec<&'a dyn ItemProcessListener<I, O>>,
    write_listeners: Vec<&'a dyn ItemWriteListener<O>>,
}

impl<I, O> Step for ChunkOrientedStep<'_, I, O> {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let start_time = Instant::now();
        step_execution.start_time = Some(start_time);
        step_execution.status = StepStatus::Started;

        info!(
            "Start of step: {}, id: {}",
            step_execution.name, step_execution.id
        );
        notify(&self.step_listeners, "before_step", |l| {
            l.before_step(step_execution)
        });

        let result = self.run_chunks(step_execution);

        Self::manage_error(self.writer.close());

        step_execution.end_time = Some(Instant::now());
        step_execution.duration = start_time.elapsed();

        match &result {
            Ok(()) => step_execution.status = StepStatus::Success,
            Err(error) => {
                if step_execution.status == StepStatus::Started {
                    step_execution.status = StepStatus::Failed;
                }
                error!("Step {} failed: {}", step_execution.name, error);
            }
        }

        notify(&self.step_listeners, "after_step", |l| {
            l.after_step(step_execution)
        });
        info!(
            "End of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        result
    }
}

impl<I, O> ChunkOrientedStep<'_, I, O> {
    fn run_chunks(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        if let Err(error) = self.writer.open() {
            step_execution.status = StepStatus::WriteError;
            return Err(error);
        }

        loop {
            notify(&self.chunk_listeners, "before_chunk", |l| {
                l.before_chunk(step_execution)
            });

            match self.run_chunk(step_execution) {
                Ok(ChunkStatus::Full) => {
                    notify(&self.chunk_listeners, "after_chunk", |l| {
                        l.after_chunk(step_execution)
                    });
                }
                Ok(ChunkStatus::Finished) => {
                    notify(&self.chunk_listeners, "after_chunk", |l| {
                        l.after_chunk(step_execution)
                    });
                    return Ok(());
                }
                Err(error) => {
                    notify(&self.chunk_listeners, "after_chunk_error", |l| {
                        l.after_chunk_error(step_execution)
                    });
                    return Err(error);
                }
            }
        }
    }

    fn run_chunk(&self, step_execution: &mut StepExecution) -> Result<ChunkStatus, BatchError> {
        let (read_items, chunk_status) = self.read_chunk(step_execution)?;

        if !read_items.is_empty() {
            let processed_items = self.process_chunk(step_execution, &read_items)?;
            self.write_chunk(step_execution, &processed_items)?;
            step_execution.chunk_count += 1;
        }

        Ok(chunk_status)
    }

    /// Reads up to `chunk_size` items.
    ///
    /// # Returns
    /// - `Ok((items, ChunkStatus::Full))`: the chunk is full
    /// - `Ok((items, ChunkStatus::Finished))`: the reader is exhausted
    /// - `Err(BatchError)`: a read failed and the skip limit was reached
    fn read_chunk(
        &self,
        step_execution: &mut StepExecution,
    ) -> Result<(Vec<I>, ChunkStatus), BatchError> {
        debug!("Start reading chunk");

        let mut read_items = Vec::with_capacity(self.chunk_size as usize);

        loop {
            notify(&self.read_listeners, "before_read", |l| l.before_read());

            match self.reader.read() {
                Ok(Some(item)) => {
                    notify(&self.read_listeners, "after_read", |l| l.after_read(&item));
                    read_items.push(item);
                    step_execution.read_count += 1;

                    if read_items.len() >= self.chunk_size as usize {
                        debug!("End reading chunk: FULL");
                        return Ok((read_items, ChunkStatus::Full));
                    }
                }
                Ok(None) => {
                    debug!("End reading chunk: FINISHED");
                    return Ok((read_items, ChunkStatus::Finished));
                }
                Err(error) => {
                    notify(&self.read_listeners, "on_read_error", |l| {
                        l.on_read_error(&error)
                    });
                    warn!("Error reading item: {}", error);
                    step_execution.read_error_count += 1;

                    if self.is_skip_limit_reached(step_execution) {
                        step_execution.status = StepStatus::ReadError;
                        return Err(error);
                    }
                }
            }
        }
    }

    /// Applies the processor to every read item, dropping filtered ones.
    fn process_chunk(
        &self,
        step_execution: &mut StepExecution,
        read_items: &[I],
    ) -> Result<Vec<O>, BatchError> {
        debug!("Processing chunk of {} items", read_items.len());
        let mut result = Vec::with_capacity(read_items.len());

        for item in read_items {
            notify(&self.process_listeners, "before_process", |l| {
                l.before_process(item)
            });

            match self.processor.process(item) {
                Ok(Some(processed_item)) => {
                    notify(&self.process_listeners, "after_process", |l| {
                        l.after_process(item, Some(&processed_item))
                    });
                    result.push(processed_item);
                }
                Ok(None) => {
                    notify(&self.process_listeners, "after_process", |l| {
                        l.after_process(item, None)
                    });
                    step_execution.filter_count += 1;
                }
                Err(error) => {
                    notify(&self.process_listeners, "on_process_error", |l| {
                        l.on_process_error(item, &error)
                    });
                    warn!("Error processing item: {}", error);
                    step_execution.process_error_count += 1;

                    if self.is_skip_limit_reached(step_execution) {
                        step_execution.status = StepStatus::ProcessorError;
                        return Err(error);
                    }
                }
            }
        }

        Ok(result)
    }

    fn write_chunk(
        &self,
        step_execution: &mut StepExecution,
        processed_items: &[O],
    ) -> Result<(), BatchError> {
        debug!("Writing chunk of {} items", processed_items.len());

        if processed_items.is_empty() {
            debug!("No items to write, skipping write call");
            return Ok(());
        }

        notify(&self.write_listeners, "before_write", |l| {
            l.before_write(processed_items)
        });

        match self
            .writer
            .write(processed_items)
            .and_then(|()| self.writer.flush())
        {
            Ok(()) => {
                step_execution.write_count += processed_items.len();
                notify(&self.write_listeners, "after_write", |l| {
                    l.after_write(processed_items)
                });
                Ok(())
            }
            Err(error) => {
                notify(&self.write_listeners, "on_write_error", |l| {
                    l.on_write_error(&error, processed_items)
                });
                warn!("Error writing items: {}", error);
                step_execution.write_error_count += 1;

                if self.is_skip_limit_reached(step_execution) {
                    step_execution.status = StepStatus::WriteError;
                    return Err(error);
                }
                Ok(())
            }
        }
    }

    fn is_skip_limit_reached(&self, step_execution: &StepExecution) -> bool {
        step_execution.read_error_count
            + step_execution.write_error_count
            + step_execution.process_error_count
            > self.skip_limit.into()
    }

    /// Logs errors from operations that must not fail the step.
    fn manage_error(result: Result<(), BatchError>) {
        if let Err(error) = result {
            warn!("Non-fatal error: {}", error);
        }
    }
}

pub struct ChunkOrientedStepBuilder<'a, I, O> {
    name: String,
    reader: Option<&'a dyn ItemReader<I>>,
    processor: Option<&'a dyn ItemProcessor<I, O>>,
    writer: Option<&'a dyn ItemWriter<O>>,
    chunk_size: u16,
    skip_limit: u16,
    step_listeners: Vec<&'a dyn StepListener>,
    chunk_listeners: Vec<&'a dyn ChunkListener>,
    read_listeners: Vec<&'a dyn ItemReadListener<I>>,
    process_listeners: Vec<&'a dyn ItemProcessListener<I, O>>,
    write_listeners: Vec<&'a dyn ItemWriteListener<O>>,
}

impl<'a, I, O> ChunkOrientedStepBuilder<'a, I, O> {
    /// Creates a builder with a chunk size of 10 and a skip limit of 0.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reader: None,
            processor: None,
            writer: None,
            chunk_size: 10,
            skip_limit: 0,
            step_listeners: Vec::new(),
            chunk_listeners: Vec::new(),
            read_listeners: Vec::new(),
            process_listeners: Vec::new(),
            write_listeners: Vec::new(),
        }
    }

    /// Sets the item reader. Required.
    pub fn reader(mut self, reader: &'a dyn ItemReader<I>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Sets the item processor. Required.
    pub fn processor(mut self, processor: &'a dyn ItemProcessor<I, O>) -> Self {
        self.processor = Some(processor);
        self
    }

    /// Sets the item writer. Required.
    pub fn writer(mut self, writer: &'a dyn ItemWriter<O>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Sets the number of items read before a write. A size of 0 is raised to 1.
    pub fn chunk_size(mut self, chunk_size: u16) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets how many errors the step tolerates before failing.
    ///
    /// Read and process errors count one per item, a failed write counts
    /// one per chunk.
    pub fn skip_limit(mut self, skip_limit: u16) -> Self {
        self.skip_limit = skip_limit;
        self
    }

    /// Adds a listener called before and after the step.
    ///
    /// Listeners of every kind are called in registration order.
    pub fn step_listener(mut self, listener: &'a dyn StepListener) -> Self {
        self.step_listeners.push(listener);
        self
    }

    /// Adds a listener called around each chunk.
    pub fn chunk_listener(mut self, listener: &'a dyn ChunkListener) -> Self {
        self.chunk_listeners.push(listener);
        self
    }

    /// Adds a listener called around each read, including failed ones.
    pub fn read_listener(mut self, listener: &'a dyn ItemReadListener<I>) -> Self {
        self.read_listeners.push(listener);
        self
    }

    /// Adds a listener called around each item processing.
    ///
    /// A filtered item is reported to `after_process` with `None`.
    pub fn process_listener(mut self, listener: &'a dyn ItemProcessListener<I, O>) -> Self {
        self.process_listeners.push(listener);
        self
    }

    /// Adds a listener called around each chunk write.
    ///
    /// `on_write_error` receives the whole chunk that failed.
    pub fn write_listener(mut self, listener: &'a dyn ItemWriteListener<O>) -> Self {
        self.write_listeners.push(listener);
        self
    }

    /// Builds the step.
    ///
    /// # Panics
    /// Panics if the reader, the processor or the writer is missing.
    pub fn build(self) -> ChunkOrientedStep<'a, I, O> {
        ChunkOrientedStep {
            name: self.name,
            reader: self.reader.expect("Reader is required for building a step"),
            processor: self
                .processor
                .expect("Processor is required for building a step"),
            writer: self.writer.expect("Writer is required for building a step"),
            chunk_size: self.chunk_size.max(1),
            skip_limit: self.skip_limit,
            step_listeners: self.step_listeners,
            chunk_listeners: self.chunk_listeners,
            read_listeners: self.read_listeners,
            process_listeners: self.process_listeners,
            write_listeners: self.write_listeners,
        }
    }
}

pub struct TaskletStepBuilder<'a> {
    name: String,
    tasklet: Option<&'a dyn Tasklet>,
    step_listeners: Vec<&'a dyn StepListener>,
}

impl<'a> TaskletStepBuilder<'a> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tasklet: None,
            step_listeners: Vec::new(),
        }
    }

    /// Sets the unit of work. Required.
    pub fn tasklet(mut self, tasklet: &'a dyn Tasklet) -> Self {
        self.tasklet = Some(tasklet);
        self
    }

    pub fn step_listener(mut self, listener: &'a dyn StepListener) -> Self {
        self.step_listeners.push(listener);
        self
    }

    pub fn build(self) -> TaskletStep<'a> {
        TaskletStep {
            name: self.name,
            tasklet: self
                .tasklet
                .expect("Tasklet is required for building a step"),
            step_listeners: self.step_listeners,
        }
    }
}

/// Entry point for building either kind of step.
///
/// ```
/// use book_import_batch::core::step::{RepeatStatus, Step, StepBuilder, StepExecution, Tasklet};
/// use book_import_batch::BatchError;
///
/// struct Hello;
///
/// impl Tasklet for Hello {
///     fn execute(&self, _step_execution: &StepExecution) -> Result<RepeatStatus, BatchError> {
///         Ok(RepeatStatus::Finished)
///     }
/// }
///
/// let step = StepBuilder::new("hello").tasklet(&Hello).build();
/// let mut step_execution = StepExecution::new(step.get_name());
/// assert!(step.execute(&mut step_execution).is_ok());
/// ```
pub struct StepBuilder {
    name: String,
}

impl StepBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Starts a step running `tasklet` until it reports `Finished`.
    pub fn tasklet(self, tasklet: &dyn Tasklet) -> TaskletStepBuilder<'_> {
        TaskletStepBuilder::new(&self.name).tasklet(tasklet)
    }

    /// Starts a chunk-oriented step reading `I` items and writing `O` items.
    pub fn chunk<'a, I, O>(self, chunk_size: u16) -> ChunkOrientedStepBuilder<'a, I, O> {
        ChunkOrientedStepBuilder::new(&self.name).chunk_size(chunk_size)
    }
}
