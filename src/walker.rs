// walker.rs
//
// Directory walk and per-folder dispatch of the chart generators.

// --- External Crate Imports ---
use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::charts::{EigenspectraChart, ScoreChart, ScoreLayout, VarianceChart};
use crate::diagnostics::{
    CorrelationHeatmap, ScatterMatrix, ScoreColumns, HEATMAP_FILE, SCATTER_MATRIX_FILE,
};
use crate::experiment::ExperimentClass;
use crate::palette::ComponentPalette;
use crate::render::{save_figure, save_raster_figure};
use crate::tables::{ComponentTable, VarianceTable};

/// Output tree created directly under the root folder.
pub(crate) const OUTPUT_DIR_NAME: &str = "PCA plots";
/// Subfolder holding the raster-only correlation diagnostics.
pub(crate) const CORRELATIONS_DIR_NAME: &str = "Scores correlations";

/// What to produce from a recognised input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArtifactKind {
    Variance,
    /// Flat score chart plus both correlation diagnostics.
    Scores,
    StackedScores,
    Eigenspectra,
}

/// Recognised file names, visited in this order in every directory.
const DISPATCH_TABLE: [(&str, ArtifactKind); 4] = [
    ("PCA_CVE.txt", ArtifactKind::Variance),
    ("PCA_scores.txt", ArtifactKind::Scores),
    ("PCA_scores.txt", ArtifactKind::StackedScores),
    ("PCA_eigenspectra.txt", ArtifactKind::Eigenspectra),
];

/// Outcome of one run over a root folder.
#[derive(Debug, Default)]
pub(crate) struct RunSummary {
    pub(crate) directories_visited: usize,
    pub(crate) written: Vec<PathBuf>,
}

/// Shared, read-only state for one run.
struct RunContext<'a> {
    output_root: PathBuf,
    num_components: usize,
    palette: &'a ComponentPalette,
    experiment: &'a ExperimentClass,
}

/// First `DS_*.csv` file in the root's own listing, sorted by name.
fn find_classification_file(root: &Path) -> Result<Option<(PathBuf, ExperimentClass)>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(root)
        .with_context(|| format!("Failed to list directory {}", root.display()))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    entries.sort();

    Ok(entries.into_iter().find_map(|path| {
        let name = path.file_name()?.to_string_lossy().into_owned();
        ExperimentClass::from_dataset_file_name(&name).map(|class| (path, class))
    }))
}

fn is_output_tree(entry: &DirEntry) -> bool {
    entry.depth() == 1 && entry.file_type().is_dir() && entry.file_name() == OUTPUT_DIR_NAME
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        debug!("Created {}", dir.display());
    }
    Ok(())
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("Input path {} has no file name", path.display()))
}

/// Renders every chart for the `DS_*`-classified experiment under `root`.
///
/// Without a classification file in `root` the run logs an error and returns
/// an empty summary; nothing is created on disk.
pub(crate) fn process_pca_tree(root: &Path, num_components: usize) -> Result<RunSummary> {
    if num_components == 0 {
        return Err(anyhow!("Number of components must be at least 1"));
    }

    let Some((ds_path, experiment)) = find_classification_file(root)? else {
        error!(
            "No DS_*.csv classification file found in {}; nothing to plot.",
            root.display()
        );
        return Ok(RunSummary::default());
    };
    info!(
        "Classification file {} (tag '{}')",
        ds_path.display(),
        experiment.tag()
    );

    let palette = ComponentPalette::new(num_components);
    let output_root = root.join(OUTPUT_DIR_NAME);
    ensure_dir(&output_root)?;

    let context = RunContext {
        output_root,
        num_components,
        palette: &palette,
        experiment: &experiment,
    };

    let spinner_style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
        .map_err(|e| anyhow!("Failed to create progress spinner style: {}", e))?;
    let spinner = ProgressBar::new_spinner().with_style(spinner_style);

    let mut summary = RunSummary::default();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_output_tree(entry));
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        spinner.set_message(format!("Visiting {}", entry.path().display()));
        spinner.tick();
        summary.directories_visited += 1;
        let written = process_directory(entry.path(), &context)?;
        summary.written.extend(written);
    }
    spinner.finish_with_message(format!(
        "Visited {} directories, wrote {} files.",
        summary.directories_visited,
        summary.written.len()
    ));

    Ok(summary)
}

/// Runs every dispatch-table entry whose file exists in `dir`.
fn process_directory(dir: &Path, context: &RunContext<'_>) -> Result<Vec<PathBuf>> {
    let folder_name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.to_string_lossy().into_owned());
    let destination = context.output_root.join(&folder_name);
    let k = context.num_components;

    let mut written = Vec::new();
    for (file_name, kind) in DISPATCH_TABLE {
        let input = dir.join(file_name);
        if !input.is_file() {
            continue;
        }
        info!("{:?}: {}", kind, input.display());
        ensure_dir(&destination)?;
        let stem = file_stem(&input)?;

        match kind {
            ArtifactKind::Variance => {
                let table = VarianceTable::load(&input)?;
                let chart = VarianceChart::new(&table, k);
                written.extend(save_figure(&chart, &format!("{}1_to_{}", stem, k), &destination)?);
            }
            ArtifactKind::Scores => {
                let table = ComponentTable::load(&input)?;
                let chart =
                    ScoreChart::new(&table, k, context.palette, context.experiment, ScoreLayout::Flat)?;
                written.extend(save_figure(&chart, &format!("{}1_to_{}", stem, k), &destination)?);
                written.extend(write_correlations(&table, k, &destination)?);
            }
            ArtifactKind::StackedScores => {
                let table = ComponentTable::load(&input)?;
                let chart = ScoreChart::new(
                    &table,
                    k,
                    context.palette,
                    context.experiment,
                    ScoreLayout::Stacked,
                )?;
                written.extend(save_figure(
                    &chart,
                    &format!("{}_stacked1_to_{}", stem, k),
                    &destination,
                )?);
            }
            ArtifactKind::Eigenspectra => {
                let table = ComponentTable::load(&input)?;
                let chart = EigenspectraChart::new(&table, k, context.palette)?;
                written.extend(save_figure(&chart, &format!("{}1_to_{}", stem, k), &destination)?);
            }
        }
    }
    Ok(written)
}

fn write_correlations(table: &ComponentTable, k: usize, destination: &Path) -> Result<Vec<PathBuf>> {
    let dir = destination.join(CORRELATIONS_DIR_NAME);
    ensure_dir(&dir)?;
    let columns = ScoreColumns::from_table(table, k)?;

    let scatter = save_raster_figure(&ScatterMatrix::new(&columns), &dir.join(SCATTER_MATRIX_FILE))?;
    let heatmap = save_raster_figure(&CorrelationHeatmap::new(&columns), &dir.join(HEATMAP_FILE))?;
    Ok(vec![scatter, heatmap])
}
