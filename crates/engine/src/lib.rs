//! # Fixing Report Engine
//!
//! Runs one monthly report end to end: check the artifact on disk, fetch and
//! extract both rate series if needed, render the spreadsheet, and email it.
//! Every step happens in sequence and any failure stops the run.

use alerter::EmailNotifier;
use api_client::{RateExtractor, RateSource};
use configuration::Settings;
use core_types::{CurrencyPair, RateSeries, ReportPeriod};
use report::{ArtifactState, Manifest, ReportArtifact, ReportRenderer, ReportTable};
use std::path::PathBuf;
use std::sync::Arc;

pub mod error;

pub use error::EngineError;

/// One report to produce.
#[derive(Debug, Clone)]
pub struct ReportJob {
    pub period: ReportPeriod,
    /// Column order of the report; the ratio is `pairs[0] / pairs[1]`.
    pub pairs: [CurrencyPair; 2],
    /// Regenerate even if a current artifact exists.
    pub force: bool,
}

/// How the artifact for a run came to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Generated(Manifest),
    Reused(Manifest),
}

impl Generation {
    pub fn manifest(&self) -> &Manifest {
        match self {
            Generation::Generated(manifest) | Generation::Reused(manifest) => manifest,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub artifact: PathBuf,
    pub generation: Generation,
    pub emailed: bool,
}

/// The orchestrator for a report run.
pub struct ReportEngine {
    source: Arc<dyn RateSource>,
    extractor: RateExtractor,
    renderer: ReportRenderer,
    reports_dir: PathBuf,
    notifier: Option<EmailNotifier>,
    resend_cached: bool,
}

impl ReportEngine {
    pub fn new(
        source: Arc<dyn RateSource>,
        extractor: RateExtractor,
        renderer: ReportRenderer,
        reports_dir: PathBuf,
    ) -> Self {
        Self {
            source,
            extractor,
            renderer,
            reports_dir,
            notifier: None,
            resend_cached: true,
        }
    }

    /// Builds an engine from the application settings. Delivery stays off until
    /// a notifier is attached.
    pub fn from_settings(settings: &Settings, source: Arc<dyn RateSource>) -> Self {
        Self::new(
            source,
            RateExtractor::new(settings.report.evening_clearing_hour),
            ReportRenderer::new(settings.report.alignment),
            settings.report.reports_dir.clone(),
        )
        .resend_cached(settings.delivery.resend_cached)
    }

    /// Emails the report after each run.
    pub fn with_notifier(mut self, notifier: EmailNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Whether a reused artifact is emailed again.
    pub fn resend_cached(mut self, resend: bool) -> Self {
        self.resend_cached = resend;
        self
    }

    pub fn artifact_for(&self, period: &ReportPeriod) -> ReportArtifact {
        ReportArtifact::new(&self.reports_dir, period)
    }

    /// Fetches and extracts one pair. Pairs are always fetched one after another.
    pub async fn fetch_series(
        &self,
        pair: &CurrencyPair,
        period: &ReportPeriod,
    ) -> Result<RateSeries, EngineError> {
        let payload = self.source.fetch(pair, period).await?;
        self.extractor
            .extract(pair, &payload)
            .map_err(|source| EngineError::Extract {
                pair: pair.to_string(),
                source,
            })
    }

    /// Fetches both pairs and lays them out, without touching the disk.
    pub async fn build_table(&self, job: &ReportJob) -> Result<ReportTable, EngineError> {
        let [first_pair, second_pair] = &job.pairs;
        let first = self.fetch_series(first_pair, &job.period).await?;
        let second = self.fetch_series(second_pair, &job.period).await?;
        tracing::info!(
            first = %first_pair,
            first_rows = first.len(),
            second = %second_pair,
            second_rows = second.len(),
            "Server request successful."
        );
        Ok(self.renderer.layout(&first, &second))
    }

    /// Produces the report for `job` unless a current one exists, then delivers it.
    pub async fn run(&self, job: &ReportJob) -> Result<RunOutcome, EngineError> {
        let artifact = self.artifact_for(&job.period);
        tracing::info!(path = %artifact.path().display(), "Checking for existing report.");

        let state = if job.force {
            ArtifactState::Stale("regeneration was forced".to_string())
        } else {
            artifact.inspect(&job.period, &job.pairs)?
        };

        let generation = match state {
            ArtifactState::Current(manifest) => {
                tracing::info!(generated_at = %manifest.generated_at, "Found current report, skipping generation.");
                Generation::Reused(manifest)
            }
            ArtifactState::Missing => {
                tracing::info!("Report not found, requesting data from server.");
                Generation::Generated(self.generate(job, &artifact).await?)
            }
            ArtifactState::Stale(reason) => {
                tracing::warn!(%reason, "Existing report cannot be reused, regenerating.");
                Generation::Generated(self.generate(job, &artifact).await?)
            }
        };

        let emailed = self.deliver(&artifact, &generation).await?;

        Ok(RunOutcome {
            artifact: artifact.path().to_path_buf(),
            generation,
            emailed,
        })
    }

    async fn generate(
        &self,
        job: &ReportJob,
        artifact: &ReportArtifact,
    ) -> Result<Manifest, EngineError> {
        let table = self.build_table(job).await?;
        let manifest = self.renderer.render(&table, &job.period, artifact)?;
        tracing::info!("Report generation successful.");
        Ok(manifest)
    }

    async fn deliver(
        &self,
        artifact: &ReportArtifact,
        generation: &Generation,
    ) -> Result<bool, EngineError> {
        let Some(notifier) = &self.notifier else {
            tracing::info!("Email delivery is disabled.");
            return Ok(false);
        };
        if matches!(generation, Generation::Reused(_)) && !self.resend_cached {
            tracing::info!("Report was already generated earlier, not emailing it again.");
            return Ok(false);
        }

        notifier.notify(artifact.path()).await?;
        tracing::info!("Report email sent.");
        Ok(true)
    }
}
