//! Snapshot → view transform for the yard and the park slot.

use crate::config::GridConfig;
use crate::snapshot::{Coord, GridRow, Highlight, Snapshot, PARK_CELL};
use log::debug;
use std::collections::HashMap;

/// Name the backend uses for cells that are not part of the hull
pub const NAN_NAME: &str = "NAN";
/// Name the backend uses for empty, usable cells
pub const UNUSED_NAME: &str = "UNUSED";
/// Characters of a container name shown on a tile
pub const LABEL_CHARS: usize = 5;

pub const COMPLETE_MESSAGE: &str = "OPERATION COMPLETE";

/// Content classification of a tile; exactly one applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileKind {
    /// No row at this coordinate
    Void,
    Nan,
    Unused,
    Container { label: String, weight: String },
}

impl TileKind {
    /// CSS class hook for the content rule
    pub fn class(&self) -> &'static str {
        match self {
            // Void shares the styling of an unused cell
            TileKind::Void | TileKind::Unused => "unused",
            TileKind::Nan => "nan",
            TileKind::Container { .. } => "container",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub coord: Coord,
    pub kind: TileKind,
    /// Highlight from the row's own colour field
    pub highlight: Option<Highlight>,
    /// Extra tint applied to the park slot from `park_cell`
    pub park_tint: Option<Highlight>,
}

impl Tile {
    /// Classify the row found at `coord` (if any)
    pub fn from_row(coord: Coord, row: Option<&GridRow>) -> Self {
        let Some(row) = row else {
            return Self {
                coord,
                kind: TileKind::Void,
                highlight: None,
                park_tint: None,
            };
        };

        let kind = match row.name.as_str() {
            NAN_NAME => TileKind::Nan,
            UNUSED_NAME => TileKind::Unused,
            name => TileKind::Container {
                label: name.chars().take(LABEL_CHARS).collect(),
                weight: row.weight.display(),
            },
        };

        Self {
            coord,
            kind,
            highlight: row.color,
            park_tint: None,
        }
    }

    /// Class list in the order the hooks are applied
    pub fn classes(&self) -> Vec<&'static str> {
        let mut classes = vec!["cell", self.kind.class()];
        for tint in [self.highlight, self.park_tint].into_iter().flatten() {
            if !classes.contains(&tint.class()) {
                classes.push(tint.class());
            }
        }
        classes
    }

    /// Highlight to paint, the park tint taking precedence
    pub fn effective_highlight(&self) -> Option<Highlight> {
        self.park_tint.or(self.highlight)
    }

    pub fn is_highlighted(&self) -> bool {
        self.effective_highlight().is_some()
    }
}

/// Status line above the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLine {
    Running { current: u32, total: u32 },
    Complete,
}

impl StatusLine {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        if snapshot.all_done {
            StatusLine::Complete
        } else {
            StatusLine::Running {
                current: snapshot.current_step_num,
                total: snapshot.num_steps,
            }
        }
    }

    pub fn text(&self) -> String {
        match self {
            StatusLine::Running { current, total } => format!("Step {}/{}", current, total),
            StatusLine::Complete => COMPLETE_MESSAGE.to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, StatusLine::Complete)
    }
}

/// Everything the yard part of the screen shows for one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
    pub config: GridConfig,
    /// Row-major, top row (highest y) first
    pub yard: Vec<Tile>,
    pub buffer: Tile,
    pub status: StatusLine,
    pub total_time: String,
    pub num_steps: u32,
}

impl GridView {
    /// Yard tiles grouped into display rows, top row first
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.yard.chunks(self.config.cols.max(1))
    }

    pub fn tile_at(&self, coord: Coord) -> Option<&Tile> {
        if coord.is_park() {
            return Some(&self.buffer);
        }
        self.yard.iter().find(|tile| tile.coord == coord)
    }
}

/// Index grid rows by coordinate; a later row replaces an earlier one
pub fn build_grid_map(rows: &[GridRow]) -> HashMap<Coord, &GridRow> {
    let mut map = HashMap::with_capacity(rows.len());
    for row in rows {
        map.insert(row.coord, row);
    }
    map
}

/// Build the whole yard view from a snapshot
pub fn render_grid(snapshot: &Snapshot, config: &GridConfig) -> GridView {
    let grid_map = build_grid_map(&snapshot.grid);
    for row in &snapshot.grid {
        if !config.contains(row.coord) && !row.coord.is_park() {
            debug!("Ignoring row outside the yard at ({}, {})", row.coord.y, row.coord.x);
        }
    }

    let mut yard = Vec::with_capacity(config.cell_count());
    yard.extend(
        config
            .traversal()
            .map(|coord| Tile::from_row(coord, grid_map.get(&coord).copied())),
    );

    let mut buffer = Tile::from_row(PARK_CELL, grid_map.get(&PARK_CELL).copied());
    buffer.park_tint = snapshot.park_cell;

    GridView {
        config: config.clone(),
        yard,
        buffer,
        status: StatusLine::from_snapshot(snapshot),
        total_time: snapshot.total_time_display(),
        num_steps: snapshot.num_steps,
    }
}
