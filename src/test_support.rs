//! Shared fixtures for unit tests.

use crate::error::{EmoteError, Result};
use crate::image::{
    GeneratedImage, ImageRef, SourceImage, VariationCount, VariationProvider, VariationSize,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

pub(crate) fn png_source(name: &str) -> SourceImage {
    SourceImage::new(name, PNG_MAGIC.to_vec()).unwrap()
}

enum Step {
    Success,
    Images(usize),
    Error(EmoteError),
}

/// In-memory provider answering each call with the next scripted step.
///
/// Once the script runs out every call succeeds.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    steps: Mutex<VecDeque<(Step, Duration)>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn then(self, step: Step, delay: Duration) -> Self {
        self.steps.lock().unwrap().push_back((step, delay));
        self
    }

    pub(crate) fn then_success(self) -> Self {
        self.then(Step::Success, Duration::ZERO)
    }

    pub(crate) fn then_success_after(self, delay: Duration) -> Self {
        self.then(Step::Success, delay)
    }

    pub(crate) fn then_images(self, n: usize) -> Self {
        self.then(Step::Images(n), Duration::ZERO)
    }

    pub(crate) fn then_error(self, err: EmoteError) -> Self {
        self.then(Step::Error(err), Duration::ZERO)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Source names in the order they reached the provider.
    pub(crate) fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl VariationProvider for ScriptedProvider {
    async fn create_variations(
        &self,
        image: &SourceImage,
        count: VariationCount,
        size: VariationSize,
    ) -> Result<Vec<ImageRef>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .unwrap()
            .push(image.name().to_string());
        let (step, delay) = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((Step::Success, Duration::ZERO));

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let images = |n: usize| -> Vec<ImageRef> {
            (0..n)
                .map(|i| ImageRef::Url(format!("https://cdn.test/{call}/{size}/{i}.png")))
                .collect()
        };
        match step {
            Step::Success => Ok(images(usize::from(count.get()))),
            Step::Images(n) => Ok(images(n)),
            Step::Error(e) => Err(e),
        }
    }

    async fn fetch(&self, image: &ImageRef) -> Result<GeneratedImage> {
        match image.decode_inline() {
            Some(decoded) => Ok(GeneratedImage::from_bytes(decoded?)),
            None => Ok(GeneratedImage::from_bytes(PNG_MAGIC.to_vec())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Provider whose every call fails at the transport level.
pub(crate) struct OfflineProvider;

#[async_trait]
impl VariationProvider for OfflineProvider {
    async fn create_variations(
        &self,
        _image: &SourceImage,
        _count: VariationCount,
        _size: VariationSize,
    ) -> Result<Vec<ImageRef>> {
        Err(EmoteError::UnexpectedResponse("connection refused".into()))
    }

    async fn fetch(&self, _image: &ImageRef) -> Result<GeneratedImage> {
        Err(EmoteError::UnexpectedResponse("connection refused".into()))
    }

    fn name(&self) -> &str {
        "offline"
    }
}
