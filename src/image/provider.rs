//! Variation provider trait and the per-item request operation.

use crate::error::{EmoteError, Result};
use crate::image::types::{GeneratedImage, ImageRef, SourceImage, VariationCount, VariationSize};
use crate::result::VariationResult;
use async_trait::async_trait;
use std::time::Instant;

/// Trait for services that create variations of an existing image.
#[async_trait]
pub trait VariationProvider: Send + Sync {
    /// Issues one request for `count` variations of `image` at `size`.
    async fn create_variations(
        &self,
        image: &SourceImage,
        count: VariationCount,
        size: VariationSize,
    ) -> Result<Vec<ImageRef>>;

    /// Downloads or decodes a reference this provider returned.
    async fn fetch(&self, image: &ImageRef) -> Result<GeneratedImage>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;
}

/// Requests variations for one source emote and folds every outcome into a
/// [`VariationResult`].
///
/// Makes exactly one call to `provider` and never retries. A success must
/// carry exactly `count` references; any other length is reported as an
/// unexpected response.
pub async fn request_variations<P>(
    provider: &P,
    image: &SourceImage,
    count: VariationCount,
    size: VariationSize,
) -> VariationResult
where
    P: VariationProvider + ?Sized,
{
    let start = Instant::now();
    tracing::debug!(
        source = image.name(),
        count = count.get(),
        size = %size,
        provider = provider.name(),
        "requesting variations"
    );

    let outcome = provider
        .create_variations(image, count, size)
        .await
        .and_then(|images| {
            if images.len() == usize::from(count.get()) {
                Ok(images)
            } else {
                Err(EmoteError::UnexpectedResponse(format!(
                    "expected {} variations, service returned {}",
                    count,
                    images.len()
                )))
            }
        });

    let elapsed_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok(images) => {
            tracing::debug!(source = image.name(), elapsed_ms, "variations ready");
            VariationResult::Success { images }
        }
        Err(e) => {
            let result = VariationResult::from_error(&e);
            tracing::warn!(
                source = image.name(),
                kind = ?result.failure_kind(),
                elapsed_ms,
                "variation request failed: {e}"
            );
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::FailureKind;
    use crate::test_support::{png_source, ScriptedProvider};

    #[tokio::test]
    async fn test_success_returns_exactly_count_refs() {
        let provider = ScriptedProvider::new().then_success();
        let count = VariationCount::new(4).unwrap();

        let result =
            request_variations(&provider, &png_source("a.png"), count, VariationSize::Small).await;

        assert_eq!(result.images().len(), 4);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_wrong_length_is_unexpected() {
        let provider = ScriptedProvider::new().then_images(2);
        let count = VariationCount::new(3).unwrap();

        let result =
            request_variations(&provider, &png_source("a.png"), count, VariationSize::Small).await;

        assert_eq!(result.failure_kind(), Some(FailureKind::Unexpected));
    }

    #[tokio::test]
    async fn test_billing_rejection() {
        let provider = ScriptedProvider::new().then_error(EmoteError::Billing(
            "You exceeded your current quota".into(),
        ));

        let result = request_variations(
            &provider,
            &png_source("a.png"),
            VariationCount::default(),
            VariationSize::Medium,
        )
        .await;

        match result {
            VariationResult::Failure { kind, message } => {
                assert_eq!(kind, FailureKind::BillingLimitReached);
                assert_eq!(message, crate::error::BILLING_GUIDANCE);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_request_keeps_service_message() {
        let provider = ScriptedProvider::new().then_error(EmoteError::Api {
            status: 400,
            code: None,
            message: "Invalid input image - format must be in ['RGBA', 'LA', 'L']".into(),
        });

        let result = request_variations(
            &provider,
            &png_source("a.png"),
            VariationCount::default(),
            VariationSize::Large,
        )
        .await;

        assert_eq!(
            result,
            VariationResult::Failure {
                kind: FailureKind::InvalidRequest,
                message: "Invalid input image - format must be in ['RGBA', 'LA', 'L']".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_timeout_is_unexpected() {
        let provider = ScriptedProvider::new().then_error(EmoteError::Timeout(
            std::time::Duration::from_secs(120),
        ));

        let result = request_variations(
            &provider,
            &png_source("a.png"),
            VariationCount::default(),
            VariationSize::Small,
        )
        .await;

        assert_eq!(result.failure_kind(), Some(FailureKind::Unexpected));
    }
}
