//! One spinner line per item in flight.
//!
//! Lines are claimed by item index when an item starts and handed back when
//! it finishes, so the number of lines stays at the batch concurrency.

use std::collections::HashMap;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

const TICK: Duration = Duration::from_millis(100);

pub(crate) struct SpinnerPool {
    _progress: MultiProgress,
    lines: Vec<ProgressBar>,
    in_use: HashMap<usize, usize>,
    idle: Vec<usize>,
}

impl SpinnerPool {
    /// `lines` spinners, all hidden when `hidden` is set.
    pub(crate) fn new(lines: usize, hidden: bool) -> Self {
        let progress = if hidden {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };
        let style = ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .map(|s| s.tick_chars("/-\\|"))
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let lines: Vec<ProgressBar> = (0..lines)
            .map(|_| {
                let bar = progress.add(ProgressBar::new_spinner());
                bar.set_style(style.clone());
                bar
            })
            .collect();
        let idle = (0..lines.len()).rev().collect();

        Self {
            _progress: progress,
            lines,
            in_use: HashMap::new(),
            idle,
        }
    }

    /// Give item `key` a line. Does nothing when every line is taken.
    pub(crate) fn claim(&mut self, key: usize, msg: String) {
        let Some(line) = self.idle.pop() else { return };
        let bar = &self.lines[line];
        bar.reset();
        bar.enable_steady_tick(TICK);
        bar.set_message(msg);
        self.in_use.insert(key, line);
    }

    pub(crate) fn update(&self, key: usize, msg: String) {
        if let Some(&line) = self.in_use.get(&key) {
            self.lines[line].set_message(msg);
        }
    }

    pub(crate) fn release(&mut self, key: usize) {
        if let Some(line) = self.in_use.remove(&key) {
            clear(&self.lines[line]);
            self.idle.push(line);
        }
    }

    pub(crate) fn clear_all(&mut self) {
        self.lines.iter().for_each(clear);
        self.in_use.clear();
        self.idle = (0..self.lines.len()).rev().collect();
    }
}

fn clear(bar: &ProgressBar) {
    bar.disable_steady_tick();
    bar.set_message("");
    bar.finish_and_clear();
}
