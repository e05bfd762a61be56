use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// Input table empty or unusable before matching starts.
    Validation(String),
    /// Required columns absent from a CSV header.
    MissingColumn { table: String, columns: Vec<String> },
    /// Unit cost cell that is not a non-negative amount.
    AmountParse { table: String, record: String, value: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (threshold out of range, empty path, etc.).
    ConfigValidation(String),
    /// Malformed CSV (ragged rows, bad quoting).
    Csv(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl ReconError {
    /// True for failures raised before any matching work is done.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::MissingColumn { .. } | Self::AmountParse { .. })
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
            Self::MissingColumn { table, columns } => {
                write!(f, "{table} data: missing required columns: {}", columns.join(", "))
            }
            Self::AmountParse { table, record, value } => {
                write!(f, "{table} data, record '{record}': cannot parse amount '{value}'")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl From<csv::Error> for ReconError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

impl From<std::io::Error> for ReconError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_names_every_column() {
        let err = ReconError::MissingColumn {
            table: "invoice".into(),
            columns: vec!["Unit_Cost".into(), "PO_Number".into()],
        };
        assert_eq!(
            err.to_string(),
            "invoice data: missing required columns: Unit_Cost, PO_Number"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn config_errors_are_not_validation() {
        assert!(!ReconError::ConfigValidation("x".into()).is_validation());
        assert!(!ReconError::Io("x".into()).is_validation());
    }
}
