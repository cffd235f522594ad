use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to persist the report: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("Failed to build the workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to read the workbook back: {0}")]
    ReadBack(#[from] calamine::XlsxError),

    #[error("Failed to encode or decode the artifact manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Rate {0} cannot be represented as a spreadsheet number")]
    InvalidValue(String),
}
