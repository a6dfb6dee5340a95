// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress events and the terminal renderer (§4.7).

use std::collections::HashMap;
use std::io::Write;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

/// Per-task progress update. Any producer may emit; the renderer is the
/// sole consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub service_id: String,
    pub percent: u8,
    pub state_label: String,
}

impl ProgressEvent {
    pub fn new(service_id: impl Into<String>, percent: u8, state_label: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            percent: percent.min(100),
            state_label: state_label.into(),
        }
    }

    pub fn pending(service_id: impl Into<String>) -> Self {
        Self::new(service_id, 0, "Pending")
    }

    pub fn failed(service_id: impl Into<String>) -> Self {
        Self::new(service_id, 100, "Failed")
    }

    pub fn done(service_id: impl Into<String>) -> Self {
        Self::new(service_id, 100, "Done")
    }

    fn is_terminal(&self) -> bool {
        self.state_label == "Done" || self.state_label == "Failed"
    }
}

/// Channel slot count; producers may block briefly on a full channel but
/// never deadlock because the renderer always drains it.
const CHANNEL_CAPACITY: usize = 8;

pub const DEFAULT_MAX_ROWS: usize = 20;
pub const DEFAULT_MAX_COLS: usize = 60;
const BAR_WIDTH: u8 = 20;
const STATE_WIDTH: usize = 8;

pub fn progress_channel() -> (SyncSender<ProgressEvent>, Receiver<ProgressEvent>) {
    sync_channel(CHANNEL_CAPACITY)
}

/// Draws a bounded, scrolling multi-line view of in-flight tasks. Owns the
/// ordered watchlist and the latest event per service.
pub struct Renderer<W: Write> {
    out: W,
    watchlist: Vec<String>,
    latest: HashMap<String, ProgressEvent>,
    drawn_lines: usize,
    terminal_rows: usize,
    terminal_cols: usize,
    max_rows: usize,
    max_cols: usize,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, terminal_rows: usize, terminal_cols: usize, watchlist: Vec<String>) -> Self {
        let latest = watchlist
            .iter()
            .map(|id| (id.clone(), ProgressEvent::pending(id.clone())))
            .collect();
        Self {
            out,
            watchlist,
            latest,
            drawn_lines: 0,
            terminal_rows,
            terminal_cols,
            max_rows: DEFAULT_MAX_ROWS,
            max_cols: DEFAULT_MAX_COLS,
        }
    }

    fn viewport_rows(&self) -> usize {
        self.terminal_rows.saturating_sub(2).min(self.max_rows).max(1)
    }

    fn column_width(&self) -> usize {
        self.terminal_cols.saturating_sub(40).min(self.max_cols).max(1)
    }

    /// Index of the first row to show: the first `Pending` service, unless
    /// that would leave fewer rows than the viewport height, in which case
    /// scroll back just enough (dropping `Done` rows from the top first).
    fn window_start(&self, rows: usize) -> usize {
        let n = self.watchlist.len();
        if n <= rows {
            return 0;
        }
        let first_pending = self
            .watchlist
            .iter()
            .position(|id| {
                self.latest
                    .get(id)
                    .map(|e| !e.is_terminal())
                    .unwrap_or(true)
            })
            .unwrap_or(n.saturating_sub(1));
        let max_start = n - rows;
        first_pending.min(max_start)
    }

    fn format_line(&self, id: &str) -> String {
        let event = self
            .latest
            .get(id)
            .cloned()
            .unwrap_or_else(|| ProgressEvent::pending(id));
        let width = self.column_width();
        let name = format_name(id, width);
        let filled = (event.percent / 5) as usize;
        let bar: String = "=".repeat(filled.min(BAR_WIDTH as usize));
        let bar = format!("{bar:<width$}", width = BAR_WIDTH as usize);
        let mut state = event.state_label.clone();
        state.truncate(STATE_WIDTH);
        format!(" {name} [{bar}][{:>3}%] {state:<STATE_WIDTH$}", event.percent)
    }

    /// Record an event and redraw the viewport.
    pub fn on_event(&mut self, event: ProgressEvent) -> std::io::Result<()> {
        self.latest.insert(event.service_id.clone(), event);
        self.redraw()
    }

    fn redraw(&mut self) -> std::io::Result<()> {
        if self.drawn_lines > 0 {
            write!(self.out, "\x1b[{}A", self.drawn_lines)?;
            write!(self.out, "\x1b[J")?;
        }

        let rows = self.viewport_rows();
        let start = self.window_start(rows);
        let visible: Vec<&String> = self.watchlist.iter().skip(start).take(rows).collect();

        for id in &visible {
            writeln!(self.out, "{}", self.format_line(id))?;
        }
        self.drawn_lines = visible.len();
        self.out.flush()
    }
}

fn format_name(id: &str, width: usize) -> String {
    if id.len() >= width {
        id[..width].to_string()
    } else {
        format!("{id:<width$}")
    }
}

/// Consume `rx` until the channel is closed, feeding every event into
/// `renderer`. When `enabled` is false, the channel is still drained so
/// producers never block, but nothing is drawn.
pub fn run_renderer<W: Write>(
    rx: Receiver<ProgressEvent>,
    mut renderer: Option<Renderer<W>>,
) -> HashMap<String, ProgressEvent> {
    let mut final_events = HashMap::new();
    for event in rx {
        final_events.insert(event.service_id.clone(), event.clone());
        if let Some(renderer) = renderer.as_mut() {
            let _ = renderer.on_event(event);
        }
    }
    final_events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_is_floor_percent_over_five_equals_signs() {
        let mut r = Renderer::new(Vec::new(), 24, 80, vec!["FOO".into()]);
        r.on_event(ProgressEvent::new("FOO", 47, "Installing")).unwrap();
        let line = r.format_line("FOO");
        assert!(line.contains("[=========           ]"));
    }

    #[test]
    fn viewport_height_matches_min_rows_minus_two_and_max() {
        let ids: Vec<String> = (0..30).map(|i| format!("SVC{i}")).collect();
        let r = Renderer::new(Vec::new(), 24, 80, ids);
        assert_eq!(r.viewport_rows(), 20);
    }

    #[test]
    fn window_scrolls_to_keep_first_pending_visible() {
        let ids: Vec<String> = (0..5).map(|i| format!("SVC{i}")).collect();
        let mut r = Renderer::new(Vec::new(), 24, 80, ids.clone());
        r.max_rows = 3;
        for id in &ids[..3] {
            r.on_event(ProgressEvent::done(id)).unwrap();
        }
        let start = r.window_start(r.viewport_rows());
        assert_eq!(start, 2);
    }

    #[test]
    fn state_label_cropped_to_eight_chars() {
        let mut r = Renderer::new(Vec::new(), 24, 80, vec!["FOO".into()]);
        r.on_event(ProgressEvent::new("FOO", 10, "Downloading")).unwrap();
        let line = r.format_line("FOO");
        assert!(line.contains("Download"));
        assert!(!line.contains("Downloading"));
    }
}
