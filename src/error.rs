use thiserror::Error;

pub type MappingResult<T> = Result<T, MappingError>;

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Workbook missing sheet '{0}'")]
    MissingSheet(String),

    #[error("Parse error at {location}: column '{column}' cannot read {raw}: {message}")]
    Parse {
        location: String,
        column: String,
        raw: String,
        message: String,
    },

    #[error("Validation error at {location}: {message}")]
    Validation { location: String, message: String },

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Export error: {0}")]
    Export(String),
}

/// Failure of a single field assignment, before sheet context is attached.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("cannot parse {raw}: {message}")]
    Parse { raw: String, message: String },

    #[error("{0}")]
    Invalid(String),
}

impl FieldError {
    /// Attach the column name and a location (`Sheet!C4` or `Type.field`).
    pub fn into_mapping_error(self, column: &str, location: String) -> MappingError {
        match self {
            FieldError::Parse { raw, message } => MappingError::Parse {
                location,
                column: column.to_string(),
                raw,
                message,
            },
            FieldError::Invalid(message) => MappingError::Validation { location, message },
        }
    }
}
