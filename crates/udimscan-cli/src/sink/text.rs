//! Human-readable terminal output.

use colored::Colorize;
use std::collections::HashSet;
use std::fmt::Display;
use std::io::{self, Write};
use udimscan_core::{AnalysisReport, PresentationSink, ProgressSink};

/// Renders results as plain sections on a writer, progress on stderr.
pub struct TextSink<W: Write> {
    out: W,
    show_progress: bool,
    strict: bool,
    write_error: Option<io::Error>,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            show_progress: false,
            strict: false,
            write_error: None,
        }
    }

    /// Print progress checkpoints to stderr.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Report shared tiles and overlaps as a failure in the summary line.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Returns the writer, or the first write error encountered.
    pub fn into_inner(self) -> io::Result<W> {
        match self.write_error {
            Some(e) => Err(e),
            None => Ok(self.out),
        }
    }

    fn line(&mut self, text: impl Display) {
        if self.write_error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out, "{}", text) {
            self.write_error = Some(e);
        }
    }

    fn heading(&mut self, title: &str) {
        self.line(title.cyan().bold());
    }

    fn render_material_tiles(&mut self, report: &AnalysisReport) {
        self.heading("Materials and their UDIMs");
        for entry in report.material_tiles.iter() {
            self.line(format!("Material: {}", entry.material.as_str().bold()));
            for tile in &entry.tiles {
                self.line(format!("  UDIM: {}", tile));
            }
        }
    }

    fn render_shared_tiles(&mut self, report: &AnalysisReport) {
        self.heading("Shared UDIMs");
        if report.shared_tiles.is_empty() {
            self.line("No shared UDIMs found.".green());
            return;
        }
        for (tile, materials) in &report.shared_tiles {
            self.line(format!("UDIM {} is shared by:", tile.to_string().yellow()));
            for material in materials {
                self.line(format!("  Material: {}", material));
            }
        }
    }

    fn render_overlaps(&mut self, report: &AnalysisReport) {
        self.heading("UV Overlap");
        if report.overlaps.is_empty() {
            self.line("No UV overlaps found.".green());
            return;
        }
        self.line("Meshes with overlapping UVs:");
        for tile in report.overlaps.tiles() {
            self.line(format!("UDIM {}:", tile.to_string().yellow()));

            let mut shown: HashSet<(String, String)> = HashSet::new();
            for pair in report.overlaps.mesh_pairs(tile) {
                let a = pair.mesh_a.short_name().to_string();
                let b = pair.mesh_b.short_name().to_string();
                let key = if a <= b {
                    (a.clone(), b.clone())
                } else {
                    (b.clone(), a.clone())
                };
                if !shown.insert(key) {
                    continue;
                }
                if pair.is_self_overlap() {
                    self.line(format!(
                        "  {} ({}) has self-overlapping UVs",
                        a, pair.material_a
                    ));
                } else {
                    self.line(format!(
                        "  {} ({}) overlaps with {} ({})",
                        a, pair.material_a, b, pair.material_b
                    ));
                }
            }
        }
    }

    fn render_diagnostics(&mut self, report: &AnalysisReport) {
        if report.diagnostics.is_empty() {
            return;
        }
        self.line("");
        self.heading("Diagnostics");
        for diagnostic in &report.diagnostics {
            let material = diagnostic
                .material
                .as_ref()
                .map(|m| format!(" [{}]", m))
                .unwrap_or_default();
            self.line(format!(
                "  {}{} {}",
                "!".yellow(),
                material.dimmed(),
                diagnostic.message
            ));
        }
    }

    fn render_summary(&mut self, report: &AnalysisReport) {
        let summary = format!(
            "{} material(s), {} shared tile(s), {} overlapping face pair(s), {} skipped",
            report.material_tiles.len(),
            report.shared_tiles.len(),
            report.overlaps.len(),
            report.diagnostics.len()
        );
        self.line("");
        if self.strict && !report.is_clean() {
            self.line(format!("{} {}", "FAILED".red().bold(), summary.dimmed()));
        } else {
            self.line(format!("{} {}", "PASSED".green().bold(), summary.dimmed()));
        }
    }
}

impl<W: Write> ProgressSink for TextSink<W> {
    fn report_progress(&mut self, percent: u8, status: &str) {
        if self.show_progress {
            eprintln!("{} {}", format!("[{:>3}%]", percent).dimmed(), status);
        }
    }
}

impl<W: Write> PresentationSink for TextSink<W> {
    fn render_results(&mut self, report: &AnalysisReport) {
        if report.material_tiles.is_empty() {
            self.line("No materials with UVs found.".bold());
        } else {
            self.render_material_tiles(report);
            self.line("");
            self.render_shared_tiles(report);
            self.line("");
            self.render_overlaps(report);
        }
        self.render_diagnostics(report);
        self.render_summary(report);
    }

    fn render_error(&mut self, message: &str) {
        self.line(format!("{} {}", "An error occurred:".red().bold(), message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use udimscan_core::{Analyzer, CancellationToken, MemoryMesh, MemoryScene};

    fn render(scene: &MemoryScene, strict: bool) -> String {
        colored::control::set_override(false);
        let mut sink = TextSink::new(Vec::new()).with_strict(strict);
        let _ = Analyzer::default().run(scene, &mut sink, &CancellationToken::new());
        String::from_utf8(sink.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_empty_scene() {
        let text = render(&MemoryScene::new(), false);
        assert!(text.starts_with("No materials with UVs found.\n"));
        assert!(!text.contains("Materials and their UDIMs"));
        assert!(!text.contains("Shared UDIMs"));
        assert!(!text.contains("UV Overlap"));
        assert!(text.contains("PASSED"));
    }

    #[test]
    fn test_sections() {
        let scene = MemoryScene::new()
            .with_material("skin", &["|char|body"])
            .with_material("cloth", &["|char|shirt"])
            .with_mesh(
                MemoryMesh::new("|char|body")
                    .with_quad(0.1, 0.1, 0.5, 0.5)
                    .with_quad(0.2, 0.2, 0.6, 0.6),
            )
            .with_mesh(MemoryMesh::new("|char|shirt").with_quad(0.4, 0.4, 0.9, 0.9));

        let text = render(&scene, true);
        assert!(text.contains("Material: skin\n  UDIM: 1001\n"));
        assert!(text.contains("UDIM 1001 is shared by:\n  Material: skin\n  Material: cloth\n"));
        assert!(text.contains("Meshes with overlapping UVs:\nUDIM 1001:\n"));
        assert!(text.contains("  body (skin) has self-overlapping UVs\n"));
        assert!(text.contains("  body (skin) overlaps with shirt (cloth)\n"));
        assert!(text.contains("FAILED"));
        assert!(!text.contains("Diagnostics"));
    }

    #[test]
    fn test_diagnostics_listed() {
        let scene = MemoryScene::new()
            .with_material("skin", &["ghost"])
            .with_material("cloth", &["shirt"])
            .with_mesh(MemoryMesh::new("shirt").with_quad(0.4, 0.4, 0.9, 0.9));

        let text = render(&scene, false);
        assert!(text.contains("Diagnostics"));
        assert!(text.contains("[skin] mesh 'ghost' is detached or does not exist"));
    }

    #[test]
    fn test_error_message() {
        let scene = MemoryScene::new().with_listing_failure("no scene open");
        let text = render(&scene, false);
        assert_eq!(
            text,
            "An error occurred: scene query failed: no scene open\n"
        );
    }
}
