// src/error.rs
use thiserror::Error;

/// 加载实验记录时可能出现的错误
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("resource unavailable: {location}: {reason}")]
    ResourceUnavailable { location: String, reason: String },

    #[error("malformed data in {location}: {source}")]
    MalformedData {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected record shape in {location}: {reason}")]
    ShapeMismatch { location: String, reason: String },

    #[error("host document has no element with id '{id}'")]
    MissingElement { id: String },
}

/// 错误类别，便于测试和日志字段使用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ResourceUnavailable,
    MalformedData,
    ShapeMismatch,
    MissingElement,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ResourceUnavailable => "resource_unavailable",
            ErrorKind::MalformedData => "malformed_data",
            ErrorKind::ShapeMismatch => "shape_mismatch",
            ErrorKind::MissingElement => "missing_element",
        }
    }
}

impl LoadError {
    pub fn unavailable(location: &str, reason: impl ToString) -> Self {
        LoadError::ResourceUnavailable {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn shape(location: &str, reason: impl ToString) -> Self {
        LoadError::ShapeMismatch {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn missing_element(id: &str) -> Self {
        LoadError::MissingElement { id: id.to_string() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::ResourceUnavailable { .. } => ErrorKind::ResourceUnavailable,
            LoadError::MalformedData { .. } => ErrorKind::MalformedData,
            LoadError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            LoadError::MissingElement { .. } => ErrorKind::MissingElement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let err = LoadError::unavailable("./mlruns/experiments.json", "HTTP status 404 Not Found");
        assert_eq!(err.kind(), ErrorKind::ResourceUnavailable);
        assert_eq!(err.kind().as_str(), "resource_unavailable");

        let err = LoadError::shape("x.json", "missing field `tags`");
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);

        let err = LoadError::missing_element("run-name");
        assert_eq!(err.kind(), ErrorKind::MissingElement);
    }

    #[test]
    fn test_display_contains_location() {
        let err = LoadError::unavailable("./mlruns/experiments.json", "connection refused");
        assert_eq!(
            err.to_string(),
            "resource unavailable: ./mlruns/experiments.json: connection refused"
        );

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = LoadError::MalformedData {
            location: "data.json".to_string(),
            source,
        };
        assert_eq!(err.kind(), ErrorKind::MalformedData);
        assert!(err.to_string().starts_with("malformed data in data.json"));
    }
}
