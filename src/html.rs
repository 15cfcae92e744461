//! HTML fragments for the viewer page, keyed by element ID.
//!
//! Each fragment is the inner markup of one element of the grid page, using
//! the same IDs and class hooks as the page's stylesheet.

use crate::step_log::StepHistory;
use crate::view::{GridView, Tile, TileKind};
use std::fmt::Write;

pub const STATUS_TEXT: &str = "status-text";
pub const SHIP_GRID: &str = "ship-grid";
pub const BUFFER_GRID: &str = "buffer-grid";
pub const STEP_LOG: &str = "step-log";
pub const TIME_DISPLAY: &str = "time-display";
pub const STEPS_DISPLAY: &str = "steps-display";
pub const UPDATE_STATUS: &str = "update-status";

/// Colour of the status line once every step is done
pub const COMPLETE_COLOR: &str = "#2ecc71";

/// Minimal escaping for text and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Markup for one cell `div`
pub fn render_tile(tile: &Tile) -> String {
    let class = tile.classes().join(" ");
    match &tile.kind {
        TileKind::Void => format!(r#"<div class="{}">VOID</div>"#, class),
        TileKind::Nan => format!(r#"<div class="{}">NAN</div>"#, class),
        TileKind::Unused => format!(r#"<div class="{}"></div>"#, class),
        TileKind::Container { label, weight } => format!(
            r#"<div class="{}"><span>{}</span><small>{}</small></div>"#,
            class,
            escape(label),
            escape(weight)
        ),
    }
}

fn render_step_log(history: &StepHistory) -> String {
    history
        .display_lines()
        .into_iter()
        .map(|line| format!(r#"<div class="step-log-item">{}</div>"#, escape(line)))
        .collect()
}

fn render_status(view: &GridView) -> String {
    if view.status.is_complete() {
        format!(
            r#"<span style="color: {}">{}</span>"#,
            COMPLETE_COLOR,
            escape(&view.status.text())
        )
    } else {
        escape(&view.status.text())
    }
}

/// Inner markup of every element the view controls, as (element id, html)
pub fn render_fragments(
    view: &GridView,
    history: &StepHistory,
    update_status: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut fragments = vec![
        (STATUS_TEXT, render_status(view)),
        (SHIP_GRID, view.yard.iter().map(render_tile).collect()),
        (BUFFER_GRID, render_tile(&view.buffer)),
        (STEP_LOG, render_step_log(history)),
        (TIME_DISPLAY, escape(&view.total_time)),
        (STEPS_DISPLAY, view.num_steps.to_string()),
    ];
    if let Some(status) = update_status {
        fragments.push((UPDATE_STATUS, escape(status)));
    }
    fragments
}

/// Fragments wrapped in their elements, one per line
pub fn render_document(view: &GridView, history: &StepHistory, update_status: Option<&str>) -> String {
    let mut out = String::new();
    for (id, inner) in render_fragments(view, history, update_status) {
        let _ = writeln!(out, r#"<div id="{}">{}</div>"#, id, inner);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::snapshot::{Coord, GridRow, Highlight, Snapshot, Weight};
    use crate::view::render_grid;

    #[test]
    fn test_container_markup() {
        let row = GridRow::new(
            Coord::new(3, 5),
            Weight::Text("01200".into()),
            "A<B>&CDE",
            Some(Highlight::Red),
        );
        let tile = Tile::from_row(Coord::new(3, 5), Some(&row));
        assert_eq!(
            render_tile(&tile),
            r#"<div class="cell container highlight-red"><span>A&lt;B&gt;&amp;</span><small>1200</small></div>"#
        );
    }

    #[test]
    fn test_fragments_cover_element_ids() {
        let snapshot = Snapshot {
            all_done: true,
            num_steps: 3,
            total_time: serde_json::json!(42),
            ..Snapshot::default()
        };
        let view = render_grid(&snapshot, &GridConfig::default());
        let fragments = render_fragments(&view, &StepHistory::new(), None);

        let ids: Vec<&str> = fragments.iter().map(|(id, _)| *id).collect();
        assert_eq!(
            ids,
            vec![STATUS_TEXT, SHIP_GRID, BUFFER_GRID, STEP_LOG, TIME_DISPLAY, STEPS_DISPLAY]
        );
        assert!(fragments[0].1.contains(COMPLETE_COLOR));
        assert_eq!(fragments[1].1.matches("<div class=\"cell").count(), 96);
        assert_eq!(
            fragments[3].1,
            r#"<div class="step-log-item">No steps taken yet</div>"#
        );
        assert_eq!(fragments[4].1, "42");
    }

    #[test]
    fn test_document_includes_update_status() {
        let view = render_grid(&Snapshot::default(), &GridConfig::default());
        let doc = render_document(&view, &StepHistory::new(), Some("Manifest downloaded: m.txt"));
        assert!(doc.contains(r#"<div id="update-status">Manifest downloaded: m.txt</div>"#));
        assert_eq!(doc.lines().count(), 7);
    }
}
