//! Orchestration of the three analysis phases.

use crate::cancel::CancellationToken;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::mapper::compute_material_tiles;
use crate::overlap::compute_overlaps;
use crate::report::AnalysisReport;
use crate::scene::SceneQuery;
use crate::shared::compute_shared_tiles;
use crate::sink::{PresentationSink, ProgressSink};
use tracing::{debug, info, warn};

/// Progress points reported during a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    ProcessingMaterials,
    IdentifyingShared,
    CheckingOverlap,
    Rendering,
    Completed,
}

impl Checkpoint {
    pub const ALL: [Checkpoint; 5] = [
        Checkpoint::ProcessingMaterials,
        Checkpoint::IdentifyingShared,
        Checkpoint::CheckingOverlap,
        Checkpoint::Rendering,
        Checkpoint::Completed,
    ];

    pub fn percent(self) -> u8 {
        match self {
            Checkpoint::ProcessingMaterials => 0,
            Checkpoint::IdentifyingShared => 33,
            Checkpoint::CheckingOverlap => 66,
            Checkpoint::Rendering => 90,
            Checkpoint::Completed => 100,
        }
    }

    pub fn status(self) -> &'static str {
        match self {
            Checkpoint::ProcessingMaterials => "Processing materials...",
            Checkpoint::IdentifyingShared => "Identifying shared UDIMs...",
            Checkpoint::CheckingOverlap => "Checking UV overlap...",
            Checkpoint::Rendering => "Rendering results...",
            Checkpoint::Completed => "Completed!",
        }
    }

    fn emit<P: ProgressSink + ?Sized>(self, progress: &mut P) {
        progress.report_progress(self.percent(), self.status());
    }
}

/// Runs tile mapping, shared-tile detection and overlap detection.
///
/// An analyzer holds only its configuration, so running it again on an
/// unchanged scene produces the same report.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyzes `scene`, reporting every checkpoint to `progress`.
    ///
    /// Per-mesh failures end up in [`AnalysisReport::diagnostics`]. Only a
    /// failure to list the scene's materials, or cancellation, is an error.
    pub fn analyze<S, P>(
        &self,
        scene: &S,
        progress: &mut P,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport, AnalysisError>
    where
        S: SceneQuery + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let report = self.compute(scene, progress, cancel)?;
        Checkpoint::Rendering.emit(progress);
        Checkpoint::Completed.emit(progress);
        Ok(report)
    }

    /// Analyzes `scene` and hands the outcome to `sink`.
    ///
    /// On error the sink gets [`PresentationSink::render_error`] and no
    /// partial results. The outcome is also returned to the caller.
    pub fn run<S, K>(
        &self,
        scene: &S,
        sink: &mut K,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport, AnalysisError>
    where
        S: SceneQuery + ?Sized,
        K: PresentationSink + ?Sized,
    {
        match self.compute(scene, sink, cancel) {
            Ok(report) => {
                Checkpoint::Rendering.emit(sink);
                sink.render_results(&report);
                Checkpoint::Completed.emit(sink);
                Ok(report)
            }
            Err(error) => {
                warn!(%error, "analysis failed");
                sink.render_error(&error.to_string());
                Err(error)
            }
        }
    }

    fn compute<S, P>(
        &self,
        scene: &S,
        progress: &mut P,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport, AnalysisError>
    where
        S: SceneQuery + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let mut diagnostics = Vec::new();

        Checkpoint::ProcessingMaterials.emit(progress);
        let materials = scene.list_materials()?;
        debug!(materials = materials.len(), "mapping UDIM tiles");
        let material_tiles = compute_material_tiles(scene, &materials, &mut diagnostics, cancel)?;

        Checkpoint::IdentifyingShared.emit(progress);
        let shared_tiles = compute_shared_tiles(&material_tiles);
        debug!(shared = shared_tiles.len(), "shared tiles identified");

        Checkpoint::CheckingOverlap.emit(progress);
        let overlaps = compute_overlaps(
            scene,
            &material_tiles,
            &self.config,
            &mut diagnostics,
            cancel,
        )?;

        info!(
            materials = material_tiles.len(),
            shared_tiles = shared_tiles.len(),
            overlaps = overlaps.len(),
            skipped = diagnostics.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            material_tiles,
            shared_tiles,
            overlaps,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoints_increase() {
        let percents: Vec<u8> = Checkpoint::ALL.iter().map(|c| c.percent()).collect();
        assert_eq!(percents, vec![0, 33, 66, 90, 100]);
        assert_eq!(Checkpoint::Completed.status(), "Completed!");
    }
}
