//! JSON snapshots as the backend sends them, rendered into view and step log
use yard_grid::controller::render_snapshot;
use yard_grid::html::render_fragments;
use yard_grid::step_log::EMPTY_HISTORY_MESSAGE;
use yard_grid::{Coord, GridConfig, Highlight, Snapshot, StepHistory, TileKind, PARK_CELL};

fn render(json: &str) -> (yard_grid::GridView, StepHistory) {
    let snapshot = Snapshot::from_json(json).unwrap();
    let mut history = StepHistory::new();
    let view = render_snapshot(&snapshot, &GridConfig::default(), &mut history);
    (view, history)
}

#[test]
fn test_two_step_plan() {
    let (view, history) = render(
        r#"{
            "current_step_num": 1,
            "num_steps": 4,
            "steps": [[9,1,3,5],[3,5,9,1]],
            "grid": [[3,5,1200,"ABCDEFG","red"]]
        }"#,
    );

    let tile = view.tile_at(Coord::new(3, 5)).unwrap();
    assert_eq!(
        tile.kind,
        TileKind::Container {
            label: "ABCDE".to_string(),
            weight: "1200".to_string()
        }
    );
    assert_eq!(tile.highlight, Some(Highlight::Red));
    assert!(tile.classes().contains(&"highlight-red"));

    assert_eq!(
        history.entries(),
        &[
            "1 of 4: Move crane from park to [03,05]".to_string(),
            "2 of 4: Move from [03,05] to park".to_string(),
        ]
    );
    assert_eq!(view.status.text(), "Step 1/4");
}

#[test]
fn test_string_fields_from_backend() {
    let (view, _) = render(
        r#"{
            "current_step_num": "0",
            "num_steps": "2",
            "steps": [],
            "grid": [["03","05","01200","ABCDEFG","green"], ["01","01","00000","NAN","blank"]]
        }"#,
    );

    let tile = view.tile_at(Coord::new(3, 5)).unwrap();
    assert_eq!(
        tile.kind,
        TileKind::Container {
            label: "ABCDE".to_string(),
            weight: "1200".to_string()
        }
    );
    assert_eq!(tile.highlight, Some(Highlight::Green));

    let nan = view.tile_at(Coord::new(1, 1)).unwrap();
    assert_eq!(nan.kind, TileKind::Nan);
    assert_eq!(nan.highlight, None);
    assert_eq!(nan.classes(), vec!["cell", "nan"]);
}

#[test]
fn test_unused_park_slot_without_tint() {
    let (view, _) = render(r#"{"grid": [[9,1,0,"UNUSED",null]]}"#);

    assert_eq!(view.buffer.coord, PARK_CELL);
    assert_eq!(view.buffer.kind, TileKind::Unused);
    assert_eq!(view.buffer.classes(), vec!["cell", "unused"]);
}

#[test]
fn test_park_tint_applies_to_buffer_only() {
    let (view, _) = render(r#"{"park_cell": "green", "grid": [[9,1,0,"UNUSED",null]]}"#);

    assert_eq!(view.buffer.classes(), vec!["cell", "unused", "highlight-green"]);
    assert!(view.yard.iter().all(|tile| !tile.is_highlighted()));
}

#[test]
fn test_missing_rows_render_void() {
    let (view, _) = render(r#"{"grid": []}"#);

    assert_eq!(view.yard.len(), 96);
    assert!(view.yard.iter().all(|tile| tile.kind == TileKind::Void));
    assert_eq!(view.buffer.kind, TileKind::Void);
}

#[test]
fn test_empty_steps_show_placeholder() {
    let (_, history) = render(r#"{"current_step_num": 0, "num_steps": 0, "steps": []}"#);

    assert!(history.is_empty());
    assert_eq!(history.display_lines(), vec![EMPTY_HISTORY_MESSAGE]);
}

#[test]
fn test_all_done_shows_every_step() {
    let (view, history) = render(
        r#"{
            "current_step_num": 0,
            "num_steps": 3,
            "all_done": true,
            "steps": [[9,1,8,1],[8,1,1,4],[1,4,9,1]],
            "total_time": "12 minutes"
        }"#,
    );

    assert!(view.status.is_complete());
    assert_eq!(view.status.text(), "OPERATION COMPLETE");
    assert_eq!(view.total_time, "12 minutes");
    assert_eq!(history.len(), 3);
    assert_eq!(history.entries()[2], "3 of 3: Move crane from [01,04] to park");
}

#[test]
fn test_rendering_is_idempotent() {
    let json = r#"{
        "current_step_num": 2,
        "num_steps": 5,
        "park_cell": "red",
        "steps": [[9,1,2,2],[2,2,4,4],[9,1,5,5]],
        "grid": [[2,2,500,"Bananas","red"],[4,4,0,"UNUSED","green"]]
    }"#;
    let snapshot = Snapshot::from_json(json).unwrap();
    let mut history = StepHistory::new();

    let first = render_snapshot(&snapshot, &GridConfig::default(), &mut history);
    let first_log = history.clone();
    let second = render_snapshot(&snapshot, &GridConfig::default(), &mut history);

    assert_eq!(first, second);
    assert_eq!(first_log, history);
    assert_eq!(history.len(), 3);
}

#[test]
fn test_html_fragments_cover_every_element() {
    let (view, history) = render(
        r#"{"current_step_num": 1, "num_steps": 4, "total_time": 42,
            "steps": [[9,1,3,5],[3,5,9,1]], "grid": [[3,5,1200,"A&B","red"]]}"#,
    );

    let fragments = render_fragments(&view, &history, Some("Note added to log"));
    let ids: Vec<&str> = fragments.iter().map(|(id, _)| *id).collect();
    assert_eq!(
        ids,
        vec![
            "status-text",
            "ship-grid",
            "buffer-grid",
            "step-log",
            "time-display",
            "steps-display",
            "update-status"
        ]
    );

    let grid_html = &fragments[1].1;
    assert!(grid_html.contains("A&amp;B"));
    assert!(grid_html.contains("highlight-red"));
    assert_eq!(fragments[4].1, "42");
    assert_eq!(fragments[5].1, "4");
}
