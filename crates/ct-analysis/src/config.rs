//! Run configuration.

use serde::Deserialize;

use crate::{AnalysisError, AnalysisResult};

/// Settings for one analysis run.
///
/// Deserializable so applications can keep it in a JSON file next to the
/// event log:
///
/// ```json
/// { "sample_size": 0.1, "run_id": "ruhr-10pct", "study_area_name": "Ruhrgebiet" }
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Fraction of the full demand present in the simulated population,
    /// in `(0, 1]`.
    pub sample_size: f64,

    /// Prefix for every report file (`{run_id}.{report}.csv`).
    pub run_id: String,

    /// Field delimiter of the person attribute table.
    pub attribute_delimiter: char,

    /// Display name of the study area.  Only used in logs and reports.
    pub study_area_name: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_size:         1.0,
            run_id:              "commercial".to_owned(),
            attribute_delimiter: ';',
            study_area_name:     None,
        }
    }
}

impl AnalysisConfig {
    /// Check the sampling rate and delimiter.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::Config`] unless `0 < sample_size <= 1` and the
    /// delimiter is a single ASCII character.
    pub fn validate(&self) -> AnalysisResult<()> {
        let s = self.sample_size;
        if !s.is_finite() || s <= 0.0 || s > 1.0 {
            return Err(AnalysisError::Config(format!(
                "sample_size must be in (0, 1], got {s}"
            )));
        }
        if !self.attribute_delimiter.is_ascii() {
            return Err(AnalysisError::Config(format!(
                "attribute_delimiter {:?} is not an ASCII character",
                self.attribute_delimiter
            )));
        }
        if (1.0 / s).fract() != 0.0 {
            log::warn!(
                "1 / sample_size = {} is not integral; counts are scaled by {}",
                1.0 / s,
                self.sample_factor()
            );
        }
        Ok(())
    }

    /// Per-event volume increment: `floor(1 / sample_size)`.
    ///
    /// Truncated, not rounded: a 30 % sample counts each vehicle 3 times.
    #[inline]
    pub fn sample_factor(&self) -> f64 {
        (1.0 / self.sample_size).floor()
    }

    /// `{run_id}.{report}.csv`
    pub fn report_file_name(&self, report: &str) -> String {
        format!("{}.{report}.csv", self.run_id)
    }
}
