use serde::{Deserialize, Serialize};

/// How the two rate series are joined into report rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAlignment {
    /// Row `i` pairs record `i` of each series. The shorter series is padded with blanks.
    #[default]
    Positional,
    /// Rows are keyed by calendar date in first-appearance order.
    ByDate,
}
