use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Rate provider error: {0}")]
    Api(#[from] api_client::error::ApiError),

    #[error("Rate extraction error for {pair}: {source}")]
    Extract {
        pair: String,
        #[source]
        source: api_client::ExtractError,
    },

    #[error("Report error: {0}")]
    Report(#[from] report::ReportError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] alerter::error::AlerterError),
}
