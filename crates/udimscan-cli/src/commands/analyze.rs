//! Analyze command implementation
//!
//! Loads a scene, runs UDIM tile and UV overlap analysis and prints the
//! results as text or JSON.

use crate::input::load_scene;
use crate::sink::{AnalyzeOutput, JsonSink, TextSink};
use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use udimscan_core::{AnalysisConfig, Analyzer, CancellationToken, TileAssignment};

/// Options of `udimscan analyze`.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeArgs {
    pub input: PathBuf,
    pub json: bool,
    /// JSON config file; command-line overrides are applied on top.
    pub config: Option<PathBuf>,
    pub tolerance: Option<f64>,
    pub tile_assignment: Option<TileAssignment>,
    /// Fail when shared tiles or overlaps are found.
    pub strict: bool,
    /// Print progress checkpoints in text mode.
    pub progress: bool,
}

/// Builds the effective config from the file and overrides.
pub fn resolve_config(args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }
    if let Some(assignment) = args.tile_assignment {
        config.tile_assignment = assignment;
    }
    config.validate().context("Invalid analysis settings")?;
    Ok(config)
}

/// Run the analyze command.
///
/// # Returns
/// Exit code: 0 on success, 1 on a fatal error or, with `--strict`, when
/// shared tiles or overlaps were found.
pub fn run(args: &AnalyzeArgs) -> Result<ExitCode> {
    let stdout = io::stdout();
    let passed = analyze_to(args, &mut stdout.lock())?;
    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Runs the analysis and writes the output to `out`.
///
/// Returns whether the run passed. Errors that happen before analysis (a
/// missing file, a bad config) are returned in text mode and written as an
/// error document in JSON mode.
pub fn analyze_to<W: Write>(args: &AnalyzeArgs, out: &mut W) -> Result<bool> {
    let input = args.input.display().to_string();

    let prepared = resolve_config(args).and_then(|config| {
        let scene = load_scene(Path::new(&args.input))?;
        Ok((config, scene))
    });
    let (config, scene) = match prepared {
        Ok(prepared) => prepared,
        Err(e) if args.json => {
            AnalyzeOutput::from_error(&input, format!("{:#}", e)).write_to(out)?;
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    let analyzer = Analyzer::new(config);
    let cancel = CancellationToken::new();

    if args.json {
        let mut sink = JsonSink::new(&mut *out, input).with_strict(args.strict);
        let result = analyzer.run(&*scene, &mut sink, &cancel);
        let passed = sink.success().unwrap_or(false);
        sink.into_inner().context("Failed to write output")?;
        return Ok(result.is_ok() && passed);
    }

    let mut sink = TextSink::new(&mut *out)
        .with_progress(args.progress)
        .with_strict(args.strict);
    let result = analyzer.run(&*scene, &mut sink, &cancel);
    sink.into_inner().context("Failed to write output")?;

    Ok(match result {
        Ok(report) => !args.strict || report.is_clean(),
        Err(_) => false,
    })
}
