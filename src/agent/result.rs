//! Normalized operation results

use serde::{Deserialize, Serialize, Serializer};

/// Status tag carried by every [`GenerationResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Generated,
    Failed,
    Synthesized,
    Packaged,
    Watermarked,
    Adapted,
    Enhanced,
    Consistent,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Generated => "generated",
            Status::Failed => "failed",
            Status::Synthesized => "synthesized",
            Status::Packaged => "packaged",
            Status::Watermarked => "watermarked",
            Status::Adapted => "adapted",
            Status::Enhanced => "enhanced",
            Status::Consistent => "consistent",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error carried when a completed result is built with the failed status
pub const UNSPECIFIED_FAILURE: &str = "Operation failed";

/// Result of a content-producing operation.
///
/// A failed result carries only its error; a completed one carries its
/// operation-specific payload. Serializes to a flat map with a `status` key
/// and, on failure, an `error` key.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult<T>(Outcome<T>);

#[derive(Debug, Clone, PartialEq)]
enum Outcome<T> {
    Completed { status: Status, output: T },
    Failed { error: String },
}

impl<T> GenerationResult<T> {
    /// A completed result. [`Status::Failed`] has no payload form and
    /// yields a failed result with [`UNSPECIFIED_FAILURE`].
    pub fn completed(status: Status, output: T) -> Self {
        if status == Status::Failed {
            return Self::failed(UNSPECIFIED_FAILURE);
        }
        GenerationResult(Outcome::Completed { status, output })
    }

    pub fn failed(error: impl Into<String>) -> Self {
        GenerationResult(Outcome::Failed { error: error.into() })
    }

    pub fn status(&self) -> Status {
        match &self.0 {
            Outcome::Completed { status, .. } => *status,
            Outcome::Failed { .. } => Status::Failed,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.0, Outcome::Failed { .. })
    }

    pub fn output(&self) -> Option<&T> {
        match &self.0 {
            Outcome::Completed { output, .. } => Some(output),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.0 {
            Outcome::Completed { .. } => None,
            Outcome::Failed { error } => Some(error),
        }
    }
}

impl<T: Serialize> Serialize for GenerationResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Flat<'a, T> {
            #[serde(flatten)]
            output: Option<&'a T>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<&'a str>,
            status: Status,
        }

        Flat {
            output: self.output(),
            error: self.error(),
            status: self.status(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, PartialEq)]
    struct Payload {
        text: String,
        count: usize,
    }

    #[test]
    fn test_completed_serializes_flat() {
        let result = GenerationResult::completed(
            Status::Generated,
            Payload {
                text: "hi".to_string(),
                count: 1,
            },
        );
        let value = serde_json::to_value(&result).expect("serialize");
        assert_eq!(value["status"], "generated");
        assert_eq!(value["text"], "hi");
        assert_eq!(value["count"], 1);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_failed_has_error_and_nothing_else() {
        let result: GenerationResult<Payload> = GenerationResult::failed("boom");
        assert!(result.is_failed());
        assert_eq!(result.status(), Status::Failed);
        assert!(result.output().is_none());

        let value = serde_json::to_value(&result).expect("serialize");
        let object = value.as_object().expect("object");
        assert_eq!(object.len(), 2);
        assert_eq!(value["status"], "failed");
        assert_eq!(value["error"], "boom");
    }

    #[test]
    fn test_completed_with_failed_status_carries_error() {
        let result = GenerationResult::completed(
            Status::Failed,
            Payload {
                text: "partial".to_string(),
                count: 0,
            },
        );
        assert!(result.is_failed());
        assert!(result.output().is_none());
        assert_eq!(result.error(), Some(UNSPECIFIED_FAILURE));

        let value = serde_json::to_value(&result).expect("serialize");
        assert_eq!(value["status"], "failed");
        assert_eq!(value["error"], UNSPECIFIED_FAILURE);
        assert!(value.get("text").is_none());
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(Status::Watermarked.to_string(), "watermarked");
        assert_eq!(
            serde_json::to_value(Status::Consistent).expect("serialize"),
            "consistent"
        );
    }
}
