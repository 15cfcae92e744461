//! Step history shown beside the yard.
//!
//! The history is rebuilt from the whole snapshot on every render. Steps
//! alternate between repositioning the empty crane (even index) and carrying
//! a container (odd index).

use crate::snapshot::{Coord, Move, Snapshot};
use log::debug;

pub const EMPTY_HISTORY_MESSAGE: &str = "No steps taken yet";
pub const PARK_LABEL: &str = "park";

/// `[YY,XX]`, or `park` for the park slot
pub fn format_coord(coord: Coord) -> String {
    if coord.is_park() {
        PARK_LABEL.to_string()
    } else {
        format!("[{:02},{:02}]", coord.y, coord.x)
    }
}

/// Whether step `index` moves a container (as opposed to the empty crane)
pub fn moves_container(index: usize) -> bool {
    index % 2 == 1
}

/// Log line for the step at `index`
pub fn describe_step(index: usize, total: u32, step: &Move) -> String {
    let verb = if moves_container(index) {
        "Move"
    } else {
        "Move crane"
    };
    format!(
        "{} of {}: {} from {} to {}",
        index + 1,
        total,
        verb,
        format_coord(step.from),
        format_coord(step.to)
    )
}

/// How many steps of the snapshot are visible in the history
pub fn visible_steps(snapshot: &Snapshot) -> usize {
    let available = snapshot.steps.len();
    if snapshot.all_done {
        return available;
    }
    let reached = snapshot.current_step_num as usize + 1;
    reached.min(snapshot.num_steps as usize).min(available)
}

/// Rendered step history, owned by the view controller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepHistory {
    entries: Vec<String>,
}

impl StepHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the history with the steps visible in `snapshot`
    pub fn rebuild(&mut self, snapshot: &Snapshot) {
        self.entries.clear();

        for (index, step) in snapshot.steps.iter().take(visible_steps(snapshot)).enumerate() {
            self.push_collapsing(describe_step(index, snapshot.num_steps, step));
        }
    }

    fn push_collapsing(&mut self, message: String) {
        if self.entries.last() == Some(&message) {
            debug!("Collapsing repeated step message {:?}", message);
            return;
        }
        self.entries.push(message);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lines to display, the placeholder when nothing has happened yet
    pub fn display_lines(&self) -> Vec<&str> {
        if self.entries.is_empty() {
            vec![EMPTY_HISTORY_MESSAGE]
        } else {
            self.entries.iter().map(String::as_str).collect()
        }
    }

    /// First line to show so that the newest entry is in a viewport of `height` lines
    pub fn bottom_offset(&self, height: usize) -> usize {
        self.display_lines().len().saturating_sub(height)
    }
}
