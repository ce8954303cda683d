//! Per-item outcomes and the ordered result set of a batch.

use crate::error::EmoteError;
use crate::image::ImageRef;
use serde::{Deserialize, Serialize};

/// Why a single source emote produced no variations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The provider account is out of credit or quota.
    BillingLimitReached,
    /// The service rejected the request.
    InvalidRequest,
    /// Transport failure, timeout or a response of the wrong shape.
    Unexpected,
}

impl FailureKind {
    /// Returns a short label for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BillingLimitReached => "billing_limit_reached",
            Self::InvalidRequest => "invalid_request",
            Self::Unexpected => "unexpected",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of requesting variations for one source emote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
#[must_use = "a variation result should be recorded or rendered"]
pub enum VariationResult {
    /// Variations were generated.
    Success {
        /// References in the order the service returned them.
        images: Vec<ImageRef>,
    },
    /// No variations were generated.
    Failure {
        /// Classification of the failure.
        kind: FailureKind,
        /// Message meant for the user.
        message: String,
    },
}

impl VariationResult {
    /// Builds a failure from an error, classifying it.
    pub fn from_error(err: &EmoteError) -> Self {
        Self::Failure {
            kind: err.failure_kind(),
            message: err.user_message(),
        }
    }

    /// Returns true for `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the images of a success, or an empty slice.
    pub fn images(&self) -> &[ImageRef] {
        match self {
            Self::Success { images } => images,
            Self::Failure { .. } => &[],
        }
    }

    /// Returns the failure kind, if any.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// One row of a result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// Display name of the source emote.
    pub name: String,
    /// What happened to it.
    pub result: VariationResult,
}

/// Results of a batch, one entry per upload in upload order.
///
/// Names may repeat when two uploads share a file name, so this is an
/// ordered list rather than a map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    entries: Vec<ResultEntry>,
}

impl ResultSet {
    /// Creates an empty set sized for `capacity` uploads.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Appends the outcome for the next upload.
    pub(crate) fn push(&mut self, name: impl Into<String>, result: VariationResult) {
        self.entries.push(ResultEntry {
            name: name.into(),
            result,
        });
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in upload order.
    pub fn iter(&self) -> std::slice::Iter<'_, ResultEntry> {
        self.entries.iter()
    }

    /// Returns the first entry with the given display name.
    pub fn get(&self, name: &str) -> Option<&VariationResult> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.result)
    }

    /// Number of successful entries.
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_success()).count()
    }

    /// Number of failed entries.
    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Total number of variation references across all successes.
    pub fn image_count(&self) -> usize {
        self.entries.iter().map(|e| e.result.images().len()).sum()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ResultEntry;
    type IntoIter = std::slice::Iter<'a, ResultEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = ResultEntry;
    type IntoIter = std::vec::IntoIter<ResultEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(n: usize) -> VariationResult {
        VariationResult::Success {
            images: (0..n)
                .map(|i| ImageRef::Url(format!("https://example.com/{i}.png")))
                .collect(),
        }
    }

    #[test]
    fn test_from_error_classifies() {
        let result = VariationResult::from_error(&EmoteError::Billing("quota".into()));
        assert_eq!(result.failure_kind(), Some(FailureKind::BillingLimitReached));
        assert!(!result.is_success());
        assert!(result.images().is_empty());
    }

    #[test]
    fn test_result_set_keeps_duplicates_in_order() {
        let mut set = ResultSet::with_capacity(3);
        set.push("a.png", success(2));
        set.push(
            "a.png",
            VariationResult::Failure {
                kind: FailureKind::Unexpected,
                message: "boom".into(),
            },
        );
        set.push("b.png", success(2));

        let names: Vec<&str> = set.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.png", "a.png", "b.png"]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.succeeded(), 2);
        assert_eq!(set.failed(), 1);
        assert_eq!(set.image_count(), 4);
        assert!(set.get("a.png").unwrap().is_success());
        assert!(set.get("missing.png").is_none());
    }

    #[test]
    fn test_result_set_serialization() {
        let mut set = ResultSet::default();
        set.push("a.png", success(1));
        set.push(
            "b.png",
            VariationResult::Failure {
                kind: FailureKind::InvalidRequest,
                message: "bad size".into(),
            },
        );

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json[0]["name"], "a.png");
        assert_eq!(json[0]["result"]["status"], "success");
        assert_eq!(json[0]["result"]["images"][0]["type"], "url");
        assert_eq!(json[1]["result"]["status"], "failure");
        assert_eq!(json[1]["result"]["kind"], "invalid_request");
        assert_eq!(json[1]["result"]["message"], "bad size");
    }
}
