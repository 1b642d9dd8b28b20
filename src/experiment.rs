// experiment.rs

use std::path::Path;

/// Prefix and extension of the data-set file that classifies an experiment.
const DATASET_PREFIX: &str = "DS_";
const DATASET_EXTENSION: &str = ".csv";

/// Number of trailing characters of the data-set file stem that carry the tag.
const TAG_LEN: usize = 3;

/// Experiment classification, taken from the last three characters of the
/// `DS_*.csv` file stem. Selects the voltage labels drawn on score plots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExperimentClass {
    /// `_07`: -0.05 V / -0.4 V steps.
    Step07,
    /// `_08`: -0.4 V / -0.8 V steps.
    Step08,
    /// `_09`: -0.8 V / -1.1 V steps.
    Step09,
    /// Any other tag; score plots carry no voltage labels.
    Unrecognized(String),
}

impl ExperimentClass {
    pub(crate) fn from_tag(tag: &str) -> Self {
        match tag {
            "_07" => ExperimentClass::Step07,
            "_08" => ExperimentClass::Step08,
            "_09" => ExperimentClass::Step09,
            other => ExperimentClass::Unrecognized(other.to_string()),
        }
    }

    /// Classifies a `DS_*.csv` file name; `None` for any other file.
    pub(crate) fn from_dataset_file_name(file_name: &str) -> Option<Self> {
        if !file_name.starts_with(DATASET_PREFIX) || !file_name.ends_with(DATASET_EXTENSION) {
            return None;
        }
        let stem = Path::new(file_name).file_stem()?.to_string_lossy();
        let chars: Vec<char> = stem.chars().collect();
        let tag: String = chars[chars.len().saturating_sub(TAG_LEN)..].iter().collect();
        Some(Self::from_tag(&tag))
    }

    pub(crate) fn tag(&self) -> &str {
        match self {
            ExperimentClass::Step07 => "_07",
            ExperimentClass::Step08 => "_08",
            ExperimentClass::Step09 => "_09",
            ExperimentClass::Unrecognized(tag) => tag,
        }
    }

    /// The two labels alternated across the score-plot intervals.
    pub(crate) fn voltage_labels(&self) -> Option<[&'static str; 2]> {
        match self {
            ExperimentClass::Step07 => Some(["-0.05 V", "-0.4 V"]),
            ExperimentClass::Step08 => Some(["-0.4 V", "-0.8 V"]),
            ExperimentClass::Step09 => Some(["-0.8 V", "-1.1 V"]),
            ExperimentClass::Unrecognized(_) => None,
        }
    }
}
