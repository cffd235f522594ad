use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlerterError {
    #[error("Invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build the email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("Failed to attach the report: {0}")]
    Attachment(#[from] std::io::Error),

    #[error("Failed to inspect the report before sending: {0}")]
    Report(#[from] report::ReportError),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("The mail transport rejected the message: {0}")]
    Rejected(String),
}
