use crate::error::ApiError;
use async_trait::async_trait;
use configuration::ProviderSettings;
use core_types::{CurrencyPair, ReportPeriod};
use reqwest::header::{HeaderValue, USER_AGENT};

pub mod error;
pub mod extractor;
pub mod responses;

// --- Public API ---
pub use error::ExtractError;
pub use extractor::{RateExtractor, EVENING_CLEARING_HOUR};

/// The abstract interface for the source of raw rate payloads.
/// The report engine only talks to this trait, so a fake source can stand in
/// for the provider in tests.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches the raw export for one pair over the whole period.
    async fn fetch(&self, pair: &CurrencyPair, period: &ReportPeriod) -> Result<String, ApiError>;
}

/// A client for the MOEX indicative currency rate export.
#[derive(Clone)]
pub struct MoexClient {
    client: reqwest::Client,
    base_url: String,
    language: String,
    user_agent: HeaderValue,
}

impl MoexClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ApiError> {
        let user_agent = HeaderValue::from_str(&settings.user_agent)
            .map_err(|e| ApiError::InvalidConfig(format!("invalid user agent: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            language: settings.language.clone(),
            user_agent,
        })
    }

    /// Builds the export request for one pair and period without sending it.
    pub fn build_request(
        &self,
        pair: &CurrencyPair,
        period: &ReportPeriod,
    ) -> Result<reqwest::Request, ApiError> {
        let moment_start = period.moment_start();
        let moment_end = period.moment_end();

        let request = self
            .client
            .get(&self.base_url)
            .header(USER_AGENT, self.user_agent.clone())
            .query(&[
                ("language", self.language.as_str()),
                ("currency", pair.as_str()),
                ("moment_start", moment_start.as_str()),
                ("moment_end", moment_end.as_str()),
            ])
            .build()?;

        Ok(request)
    }
}

#[async_trait]
impl RateSource for MoexClient {
    async fn fetch(&self, pair: &CurrencyPair, period: &ReportPeriod) -> Result<String, ApiError> {
        let request = self.build_request(pair, period)?;
        tracing::info!(pair = %pair, url = %request.url(), "Requesting rates from provider.");

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}
