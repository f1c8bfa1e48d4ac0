//! Where progress and results go.

use crate::report::AnalysisReport;

/// Receives progress checkpoints during a run.
pub trait ProgressSink {
    /// `percent` is in `0..=100` and never decreases within a run.
    fn report_progress(&mut self, percent: u8, status: &str);
}

/// Displays the outcome of a run.
///
/// Exactly one of [`render_results`](Self::render_results) and
/// [`render_error`](Self::render_error) is called per run.
pub trait PresentationSink: ProgressSink {
    fn render_results(&mut self, report: &AnalysisReport);

    fn render_error(&mut self, message: &str);
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report_progress(&mut self, _percent: u8, _status: &str) {}
}

impl<T: ProgressSink + ?Sized> ProgressSink for &mut T {
    fn report_progress(&mut self, percent: u8, status: &str) {
        (**self).report_progress(percent, status);
    }
}

/// Keeps everything it is given. Useful for hosts that render later.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSink {
    pub progress: Vec<(u8, String)>,
    pub results: Option<AnalysisReport>,
    pub error: Option<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for RecordingSink {
    fn report_progress(&mut self, percent: u8, status: &str) {
        self.progress.push((percent, status.to_string()));
    }
}

impl PresentationSink for RecordingSink {
    fn render_results(&mut self, report: &AnalysisReport) {
        self.results = Some(report.clone());
    }

    fn render_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }
}
