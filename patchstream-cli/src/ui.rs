//! Terminal multi-bar progress rendering.

use std::io::Read;
use std::sync::Arc;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use patchstream::{ProgressHandle, ProgressSink};

/// One byte-styled bar per in-flight transfer, stacked by `MultiProgress`.
pub struct TerminalSink {
    multi: MultiProgress,
    style: ProgressStyle,
}

impl TerminalSink {
    pub fn new() -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{msg:30!} {bytes:>10} / {total_bytes:10} {bar:30.cyan/blue} {bytes_per_sec:>12} {eta:>4}",
        )
        .expect("static progress template")
        .progress_chars("##-");

        Arc::new(Self {
            multi: MultiProgress::new(),
            style,
        })
    }
}

impl ProgressSink for TerminalSink {
    fn add_bar(&self, label: &str, total: u64) -> Box<dyn ProgressHandle> {
        let bar = self.multi.add(ProgressBar::new(total));
        bar.set_style(self.style.clone());
        bar.set_message(label.to_string());
        Box::new(TerminalHandle { bar })
    }

    fn wait(&self) {
        // indicatif renders synchronously; nothing to drain.
    }
}

struct TerminalHandle {
    bar: ProgressBar,
}

impl ProgressHandle for TerminalHandle {
    fn inc(&self, n: u64) {
        self.bar.inc(n);
    }

    fn wrap_read<'r>(&self, reader: Box<dyn Read + Send + 'r>) -> Box<dyn Read + Send + 'r> {
        Box::new(self.bar.wrap_read(reader))
    }

    fn abort(&self) {
        self.bar.finish_and_clear();
    }
}
