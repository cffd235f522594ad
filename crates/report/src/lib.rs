//! # Fixing Report Renderer
//!
//! Turns two evening clearing rate series into the monthly spreadsheet.
//!
//! - `ReportTable`: the two series joined into rows, with the header labels.
//! - `ReportRenderer`: writes a table as an `.xlsx` workbook with live ratio formulas.
//! - `ReportArtifact`: the file for one month and the manifest that decides
//!   whether it can be reused.
//! - `count_data_rows`: reads a finished workbook back for delivery.

// Declare the modules that constitute this crate.
pub mod artifact;
pub mod error;
pub mod reader;
pub mod renderer;
pub mod table;
pub mod writer;

// Re-export the key components to create a clean, public-facing API.
pub use artifact::{ArtifactState, Manifest, ReportArtifact};
pub use error::ReportError;
pub use reader::count_data_rows;
pub use renderer::ReportRenderer;
pub use table::{ratio_formula, ReportRow, ReportTable};
pub use writer::{write_workbook, SHEET_NAME};
