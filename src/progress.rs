//! Progress reporting: thin wrapper around `indicatif` bars.

use indicatif::{ProgressBar, ProgressStyle};

fn styled(pb: ProgressBar, template: &str) -> ProgressBar {
    let style = ProgressStyle::with_template(template)
        .expect("static progress template")
        .progress_chars("█▉▊▋▌▍▎▏  ");
    pb.set_style(style);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// A small, ergonomic progress handle. `ProgressScope::bytes(..)` or
/// `ProgressScope::count(..)` to create, `inc(..)` to advance, `finish(msg)`
/// to finalize. `ProgressScope::disabled()` draws nothing.
pub struct ProgressScope {
    pb: ProgressBar,
}

impl ProgressScope {
    pub fn bytes<T: Into<String>>(label: T, total_bytes: u64) -> Self {
        let pb = styled(
            ProgressBar::new(total_bytes),
            "{spinner:.green} {msg} {bytes:>10}/{total_bytes:<10} [{bar:.cyan/blue}] {percent:>3}%  \
             {bytes_per_sec}  elapsed: {elapsed_precise}  eta: {eta_precise}",
        );
        pb.set_message(label.into());
        Self { pb }
    }

    pub fn count<T: Into<String>>(label: T, total: u64) -> Self {
        let pb = styled(
            ProgressBar::new(total),
            "{spinner:.green} {msg} {pos}/{len} [{bar:.cyan/blue}] {percent:>3}%  \
             it/s: {per_sec}  elapsed: {elapsed_precise}  eta: {eta_precise}",
        );
        pb.set_message(label.into());
        Self { pb }
    }

    pub fn disabled() -> Self {
        Self { pb: ProgressBar::hidden() }
    }

    #[inline]
    pub fn inc(&self, delta: u64) {
        self.pb.inc(delta);
    }

    pub fn finish<T: Into<String>>(&self, msg: T) {
        self.pb.finish_with_message(msg.into());
    }
}
