use crate::error::BatchError;

/// Result of a single read: `Ok(None)` once the source is exhausted.
pub type ItemReaderResult<I> = Result<Option<I>, BatchError>;

/// Result of processing an item: `Ok(None)` filters the item out of the chunk.
pub type ItemProcessorResult<O> = Result<Option<O>, BatchError>;

pub type ItemWriterResult = Result<(), BatchError>;

/// Retrieves input for a step, one item at a time.
pub trait ItemReader<I> {
    fn read(&self) -> ItemReaderResult<I>;
}

/// Business logic applied to each read item.
///
/// Returning `Ok(None)` means the item is rejected without error, it is
/// counted as filtered and never reaches the writer.
pub trait ItemProcessor<I, O> {
    fn process(&self, item: &I) -> ItemProcessorResult<O>;
}

/// Output of a step, one chunk of items at a time.
pub trait ItemWriter<O> {
    fn write(&self, items: &[O]) -> ItemWriterResult;

    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }

    fn open(&self) -> ItemWriterResult {
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        Ok(())
    }
}
