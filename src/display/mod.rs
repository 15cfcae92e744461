// Display module for yard formatting and visualization
pub mod formatters;

// Re-export main functions
pub use formatters::{
    format_column_headers, format_row_prefix, format_section_header, pad_cell, CELL_WIDTH,
};

use crate::snapshot::Highlight;
use crate::view::{Tile, TileKind};

/// Trait for displaying grid cells in a fixed-width terminal cell
pub trait CellDisplay {
    /// Short text for the cell (fits CELL_WIDTH)
    fn display_cell(&self) -> String;

    /// Highlight to paint the cell with, if any
    fn highlight(&self) -> Option<Highlight> {
        None
    }

    /// Whether the cell holds a container
    fn is_occupied(&self) -> bool {
        false
    }
}

impl CellDisplay for Tile {
    fn display_cell(&self) -> String {
        match &self.kind {
            TileKind::Void => "VOID".to_string(),
            TileKind::Nan => "NAN".to_string(),
            TileKind::Unused => String::new(),
            TileKind::Container { label, .. } => label.clone(),
        }
    }

    fn highlight(&self) -> Option<Highlight> {
        self.effective_highlight()
    }

    fn is_occupied(&self) -> bool {
        matches!(self.kind, TileKind::Container { .. })
    }
}
