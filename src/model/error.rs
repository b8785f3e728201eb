use std::path::PathBuf;

/// Errors raised while loading or indexing a catalog.
///
/// These are structural problems with the catalog itself. Problems with an
/// individual metric are reported as validation issues instead.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file '{}': {source}", .path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Duplicate semantic model name: '{0}'")]
    DuplicateModel(String),

    #[error("Duplicate metric name: '{0}'")]
    DuplicateMetric(String),

    #[error("Measure '{measure}' is defined on both '{first_model}' and '{second_model}'")]
    DuplicateMeasure {
        measure: String,
        first_model: String,
        second_model: String,
    },

    #[error("Primary entity '{entity}' is declared by both '{first_model}' and '{second_model}'")]
    DuplicatePrimaryEntity {
        entity: String,
        first_model: String,
        second_model: String,
    },

    #[error("Semantic model '{0}' declares more than one primary entity")]
    MultiplePrimaryEntities(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
