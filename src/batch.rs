//! Runs a submitted batch, one variation request per upload.

use crate::image::{request_variations, SourceImage, VariationCount, VariationProvider, VariationSize};
use crate::result::ResultSet;
use futures::StreamExt;
use std::time::Instant;
use tracing::instrument;

/// Maximum uploads processed at once by [`VariationBatch::run_concurrent`].
pub const MAX_CONCURRENCY: usize = 5;

/// Uploads sharing one count and size, ready to be processed.
///
/// Built by [`crate::InputCollector::submit`], so it always holds at least
/// one upload.
#[derive(Debug, Clone)]
pub struct VariationBatch {
    sources: Vec<SourceImage>,
    count: VariationCount,
    size: VariationSize,
}

impl VariationBatch {
    pub(crate) fn new(sources: Vec<SourceImage>, count: VariationCount, size: VariationSize) -> Self {
        Self {
            sources,
            count,
            size,
        }
    }

    /// Returns the uploads in upload order.
    pub fn sources(&self) -> &[SourceImage] {
        &self.sources
    }

    /// Returns the shared variation count.
    pub fn count(&self) -> VariationCount {
        self.count
    }

    /// Returns the shared output size.
    pub fn size(&self) -> VariationSize {
        self.size
    }

    /// Returns the number of uploads.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true if the batch holds no uploads.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Processes uploads one after another.
    ///
    /// Every upload gets exactly one attempt and exactly one entry in the
    /// returned set, in upload order. A failed upload never stops the rest.
    #[instrument(skip_all, fields(uploads = self.len(), count = self.count.get(), size = %self.size))]
    pub async fn run<P>(&self, provider: &P) -> ResultSet
    where
        P: VariationProvider + ?Sized,
    {
        let start = Instant::now();
        let mut results = ResultSet::with_capacity(self.len());

        for source in &self.sources {
            let result = request_variations(provider, source, self.count, self.size).await;
            results.push(source.name(), result);
        }

        log_summary(&results, start);
        results
    }

    /// Processes up to `concurrency` uploads at once.
    ///
    /// `concurrency` is clamped to `1..=MAX_CONCURRENCY`. Results keep upload
    /// order and there is still one entry per upload.
    #[instrument(skip_all, fields(uploads = self.len(), concurrency = tracing::field::Empty))]
    pub async fn run_concurrent<P>(&self, provider: &P, concurrency: usize) -> ResultSet
    where
        P: VariationProvider + ?Sized,
    {
        let concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        tracing::Span::current().record("concurrency", concurrency);
        let start = Instant::now();
        let (count, size) = (self.count, self.size);

        let outcomes: Vec<_> = futures::stream::iter(&self.sources)
            .map(|source| async move {
                let result = request_variations(provider, source, count, size).await;
                (source.name(), result)
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut results = ResultSet::with_capacity(self.len());
        for (name, result) in outcomes {
            results.push(name, result);
        }

        log_summary(&results, start);
        results
    }
}

fn log_summary(results: &ResultSet, start: Instant) {
    tracing::info!(
        succeeded = results.succeeded(),
        failed = results.failed(),
        images = results.image_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "batch complete"
    );
}
