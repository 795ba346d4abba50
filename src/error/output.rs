use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("invalid template at offset {offset}: {message}")]
    InvalidTemplate { offset: usize, message: String },

    #[error("unknown template field: .{field}")]
    UnknownField { field: String },

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),
}

impl OutputError {
    pub fn invalid_template(offset: usize, message: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            offset,
            message: message.into(),
        }
    }

    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_display() {
        let err = OutputError::unknown_field("Range.Middle");
        assert_eq!(err.to_string(), "unknown template field: .Range.Middle");
    }

    #[test]
    fn test_invalid_template_display() {
        let err = OutputError::invalid_template(3, "unclosed action");
        assert_eq!(
            err.to_string(),
            "invalid template at offset 3: unclosed action"
        );
    }
}
