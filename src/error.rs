use std::path::PathBuf;

use thiserror::Error;

/// Run-level failures. Row-level problems never show up here; bad rows are
/// dropped by the normalizer.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no input file selected; pass --input <FILE>")]
    MissingInput,

    #[error("failed to decode input table: {0}")]
    Decode(#[from] csv::Error),

    #[error("no usable data: none of the {rows_read} rows had the required columns ({rows_skipped} skipped)")]
    EmptySeries { rows_read: usize, rows_skipped: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
