//! Domain error types.

/// Top-level error type for tradeqa.
#[derive(Debug, thiserror::Error)]
pub enum TradeQaError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("dataset is empty: accuracy is undefined for zero trades")]
    EmptyDataset,

    #[error("malformed trade file {file}: {reason}")]
    Csv { file: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradeQaError {
    /// Process exit status for this error.
    pub fn exit_status(&self) -> u8 {
        match self {
            TradeQaError::Io(_) | TradeQaError::Csv { .. } => 1,
            TradeQaError::ConfigParse { .. }
            | TradeQaError::ConfigMissing { .. }
            | TradeQaError::ConfigInvalid { .. } => 2,
            TradeQaError::EmptyDataset => 3,
        }
    }
}

impl From<&TradeQaError> for std::process::ExitCode {
    fn from(err: &TradeQaError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_exit_code_two() {
        let err = TradeQaError::ConfigMissing {
            section: "generator".into(),
            key: "record_count".into(),
        };
        assert_eq!(err.exit_status(), 2);
        assert_eq!(err.to_string(), "missing config key [generator] record_count");
    }

    #[test]
    fn empty_dataset_maps_to_exit_code_three() {
        assert_eq!(TradeQaError::EmptyDataset.exit_status(), 3);
    }

    #[test]
    fn io_error_is_transparent() {
        let err = TradeQaError::from(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(err.exit_status(), 1);
    }
}
