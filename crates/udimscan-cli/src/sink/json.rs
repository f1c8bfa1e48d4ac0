//! Machine-readable JSON output.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use udimscan_core::{AnalysisReport, OverlapsByTile, PresentationSink, ProgressSink};

/// Counts for quick inspection without walking the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeSummary {
    pub materials: usize,
    pub shared_tiles: usize,
    pub overlapping_face_pairs: usize,
    pub skipped: usize,
}

impl AnalyzeSummary {
    pub fn from_report(report: &AnalysisReport) -> Self {
        Self {
            materials: report.material_tiles.len(),
            shared_tiles: report.shared_tiles.len(),
            overlapping_face_pairs: report.overlaps.len(),
            skipped: report.diagnostics.len(),
        }
    }
}

/// JSON document printed by `udimscan analyze --json`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeOutput {
    /// False on a fatal error, or in strict mode when the report is not clean.
    pub success: bool,
    /// Path to the analyzed scene.
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<AnalyzeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AnalysisReport>,
    /// Overlaps as tile to mesh to overlapping meshes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaps_by_tile: Option<OverlapsByTile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyzeOutput {
    pub fn from_report(input: &str, report: &AnalysisReport, strict: bool) -> Self {
        Self {
            success: !strict || report.is_clean(),
            input: input.to_string(),
            summary: Some(AnalyzeSummary::from_report(report)),
            report: Some(report.clone()),
            overlaps_by_tile: Some(report.overlaps.by_tile()),
            error: None,
        }
    }

    pub fn from_error(input: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            input: input.to_string(),
            summary: None,
            report: None,
            overlaps_by_tile: None,
            error: Some(message.into()),
        }
    }

    /// Pretty-prints the document followed by a newline.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)
    }
}

/// Writes one [`AnalyzeOutput`] document. Progress is not printed.
pub struct JsonSink<W: Write> {
    out: W,
    input: String,
    strict: bool,
    success: Option<bool>,
    write_error: Option<io::Error>,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W, input: impl Into<String>) -> Self {
        Self {
            out,
            input: input.into(),
            strict: false,
            success: None,
            write_error: None,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The `success` flag of the written document, if one was written.
    pub fn success(&self) -> Option<bool> {
        self.success
    }

    pub fn into_inner(self) -> io::Result<W> {
        match self.write_error {
            Some(e) => Err(e),
            None => Ok(self.out),
        }
    }

    fn emit(&mut self, output: AnalyzeOutput) {
        self.success = Some(output.success);
        if let Err(e) = output.write_to(&mut self.out) {
            self.write_error = Some(e);
        }
    }
}

impl<W: Write> ProgressSink for JsonSink<W> {
    fn report_progress(&mut self, percent: u8, status: &str) {
        tracing::debug!(percent, status, "progress");
    }
}

impl<W: Write> PresentationSink for JsonSink<W> {
    fn render_results(&mut self, report: &AnalysisReport) {
        let output = AnalyzeOutput::from_report(&self.input, report, self.strict);
        self.emit(output);
    }

    fn render_error(&mut self, message: &str) {
        let output = AnalyzeOutput::from_error(&self.input, message);
        self.emit(output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use udimscan_core::{Analyzer, CancellationToken, MemoryMesh, MemoryScene};

    fn render(scene: &MemoryScene, strict: bool) -> (Value, Option<bool>) {
        let mut sink = JsonSink::new(Vec::new(), "scene.json").with_strict(strict);
        let _ = Analyzer::default().run(scene, &mut sink, &CancellationToken::new());
        let success = sink.success();
        let bytes = sink.into_inner().unwrap();
        (serde_json::from_slice(&bytes).unwrap(), success)
    }

    fn overlapping_scene() -> MemoryScene {
        MemoryScene::new()
            .with_material("mat1", &["mesh1"])
            .with_material("mat2", &["mesh2"])
            .with_mesh(MemoryMesh::new("mesh1").with_quad(0.1, 0.1, 0.6, 0.6))
            .with_mesh(MemoryMesh::new("mesh2").with_quad(0.4, 0.4, 0.9, 0.9))
    }

    #[test]
    fn test_results_document() {
        let (doc, success) = render(&overlapping_scene(), false);
        assert_eq!(success, Some(true));
        assert_eq!(doc["success"], true);
        assert_eq!(doc["input"], "scene.json");
        assert_eq!(doc["summary"]["overlapping_face_pairs"], 1);
        assert_eq!(doc["report"]["shared_tiles"]["1001"][0], "mat1");
        assert_eq!(
            doc["overlaps_by_tile"]["1001"]["mesh2"][0],
            serde_json::json!(["mesh1", "mat2", "mat1"])
        );
        assert!(doc.get("error").is_none());
    }

    #[test]
    fn test_strict_fails_on_findings() {
        let (doc, success) = render(&overlapping_scene(), true);
        assert_eq!(success, Some(false));
        assert_eq!(doc["success"], false);
    }

    #[test]
    fn test_error_document() {
        let scene = MemoryScene::new().with_listing_failure("no scene open");
        let (doc, success) = render(&scene, false);
        assert_eq!(success, Some(false));
        assert_eq!(doc["error"], "scene query failed: no scene open");
        assert!(doc.get("report").is_none());
    }
}
