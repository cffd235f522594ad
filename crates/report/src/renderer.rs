use crate::artifact::{Manifest, ReportArtifact};
use crate::error::ReportError;
use crate::table::ReportTable;
use crate::writer::write_workbook;
use core_types::{RateSeries, ReportPeriod, RowAlignment};

/// Lays out two rate series and writes them as the monthly spreadsheet.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportRenderer {
    alignment: RowAlignment,
}

impl ReportRenderer {
    pub fn new(alignment: RowAlignment) -> Self {
        Self { alignment }
    }

    /// Builds the in-memory table; `first` fills the left column block.
    pub fn layout(&self, first: &RateSeries, second: &RateSeries) -> ReportTable {
        ReportTable::build(first, second, self.alignment)
    }

    /// Writes `table` as the artifact for `period`, fully replacing any previous file.
    pub fn render(
        &self,
        table: &ReportTable,
        period: &ReportPeriod,
        artifact: &ReportArtifact,
    ) -> Result<Manifest, ReportError> {
        let bytes = write_workbook(table)?;
        let manifest = artifact.store(period, table.pairs(), table.len(), &bytes)?;

        tracing::info!(
            path = %artifact.path().display(),
            rows = manifest.rows,
            sha256 = %manifest.sha256,
            "Report written."
        );
        Ok(manifest)
    }
}
