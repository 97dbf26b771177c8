use std::sync::Mutex;

use gradeline::ReportProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Interactive progress reporter using indicatif.
///
/// One bar tracks completed courses. It starts as a spinner while the
/// course list is fetched, or on the first event of per-user reports that
/// never announce a course count.
pub struct InteractiveReporter {
    multi: MultiProgress,
    bar: Mutex<Option<ProgressBar>>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self::with_multi(MultiProgress::new())
    }

    /// A reporter that draws nothing.
    #[cfg(test)]
    pub fn hidden() -> Self {
        let target = indicatif::ProgressDrawTarget::hidden();
        Self::with_multi(MultiProgress::with_draw_target(target))
    }

    fn with_multi(multi: MultiProgress) -> Self {
        Self {
            multi,
            bar: Mutex::new(None),
        }
    }

    pub fn handle(&self, event: ReportProgress) {
        let mut bar = self.bar.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            ReportProgress::FetchingCourses { account } => {
                let pb = self.spinner(&account);
                pb.set_message("Fetching courses...");
                *bar = Some(pb);
            }

            ReportProgress::CoursesFetched { account, total } => {
                let pb = bar.get_or_insert_with(|| self.spinner(&account));
                pb.disable_steady_tick();
                pb.set_length(total as u64);
                pb.set_position(0);
                pb.set_style(Self::bar_style());
                pb.set_message(format!("{total} courses"));
            }

            ReportProgress::CourseCompleted {
                course,
                rows,
                completed,
                ..
            } => {
                let pb = bar.get_or_insert_with(|| self.spinner("Courses"));
                pb.set_position(completed as u64);
                pb.set_message(format!("{course} ({rows} rows)"));
            }

            ReportProgress::EnrollmentSkipped { course_id, reason } => {
                let pb = bar.get_or_insert_with(|| self.spinner("Enrollments"));
                pb.inc(1);
                // Release lock before printing to avoid holding it during I/O
                drop(bar);
                self.multi
                    .println(format!("⚠ course {course_id} skipped: {reason}"))
                    .ok();
            }

            ReportProgress::ReportComplete { rows } => {
                let pb = bar.get_or_insert_with(|| self.spinner("Report"));
                pb.finish_with_message(format!("✓ {rows} rows"));
            }

            _ => {}
        }
    }

    /// Finish the bar if a run stopped early.
    pub fn finish(&self) {
        let bar = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(ref pb) = *bar
            && !pb.is_finished()
        {
            pb.finish();
        }
    }

    /// Current bar position, if a bar exists.
    #[cfg(test)]
    pub fn position(&self) -> Option<u64> {
        let bar = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        bar.as_ref().map(ProgressBar::position)
    }

    fn spinner(&self, prefix: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(format!("{:12}", truncate(prefix, 12)));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .expect("Invalid template")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .expect("Invalid template")
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
