// Grid Display Module - plain-text rendering of a yard view
// Used by the one-shot `snapshot` command and the `watch` loop

use crate::display::{
    format_column_headers, format_row_prefix, format_section_header, CellDisplay, CELL_WIDTH,
};
use crate::snapshot::Highlight;
use crate::step_log::StepHistory;
use crate::view::{GridView, Tile, TileKind};
use std::fmt::Write;

/// Text display configuration
pub struct GridDisplayConfig {
    pub show_headers: bool,
    pub show_weights: bool,
    pub show_step_log: bool,
    pub compact_format: bool,
}

impl Default for GridDisplayConfig {
    fn default() -> Self {
        Self {
            show_headers: true,
            show_weights: true,
            show_step_log: true,
            compact_format: false,
        }
    }
}

/// Marker in front of a cell: `!` red target, `+` green source
fn highlight_marker(highlight: Option<Highlight>) -> char {
    match highlight {
        Some(Highlight::Red) => '!',
        Some(Highlight::Green) => '+',
        None => ' ',
    }
}

fn format_tile(tile: &Tile) -> String {
    let text: String = tile.display_cell().chars().take(CELL_WIDTH - 1).collect();
    format!(
        "{}{:^width$}",
        highlight_marker(tile.highlight()),
        text,
        width = CELL_WIDTH - 1
    )
}

fn format_weight(tile: &Tile) -> String {
    let weight = match &tile.kind {
        TileKind::Container { weight, .. } => weight.as_str(),
        _ => "",
    };
    let clipped: String = weight.chars().take(CELL_WIDTH - 1).collect();
    format!(" {:^width$}", clipped, width = CELL_WIDTH - 1)
}

/// Render the complete view (status, yard, park slot, step log) as text
pub fn render_text(
    view: &GridView,
    history: &StepHistory,
    update_status: Option<&str>,
    display_config: &GridDisplayConfig,
) -> String {
    let mut out = String::new();

    if display_config.show_headers {
        if !display_config.compact_format {
            let _ = writeln!(out, "{}", format_section_header("Yard"));
        }
        let _ = writeln!(out, "{}", view.status.text());
        let _ = writeln!(
            out,
            "Estimated time: {} | Total steps: {}",
            view.total_time, view.num_steps
        );
        if !display_config.compact_format {
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "{}", format_column_headers(view.config.cols));
    }

    for row in view.rows() {
        let y = row.first().map(|tile| tile.coord.y).unwrap_or_default();
        let cells: String = row.iter().map(format_tile).collect();
        let _ = writeln!(out, "{}{}", format_row_prefix(y), cells.trim_end());

        if display_config.show_weights && row.iter().any(|tile| tile.is_occupied()) {
            let weights: String = row.iter().map(format_weight).collect();
            let _ = writeln!(out, "    {}", weights.trim_end());
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Park: {}", format_tile(&view.buffer).trim_end());

    if display_config.show_step_log {
        let _ = writeln!(out);
        if !display_config.compact_format {
            let _ = writeln!(out, "{}", format_section_header("Step log"));
        }
        for line in history.display_lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }

    if let Some(status) = update_status {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", status);
    }

    out
}

/// Print the view to stdout
pub fn display_view(
    view: &GridView,
    history: &StepHistory,
    update_status: Option<&str>,
    display_config: &GridDisplayConfig,
) {
    print!("{}", render_text(view, history, update_status, display_config));
}
