//! Terminal viewer for a container-yard crane simulation backend.
//!
//! The backend plans the crane moves; this crate fetches its snapshots,
//! turns them into a yard view plus a step history, and presents them in a
//! terminal UI, as plain text, or as HTML fragments.

pub mod backend;
pub mod config;
pub mod controller;
pub mod display;
pub mod errors;
pub mod grid_display;
pub mod html;
pub mod snapshot;
pub mod step_log;
pub mod tui;
pub mod view;

pub use backend::{Attachment, HttpBackend, YardBackend};
pub use config::{GridConfig, ViewerConfig};
pub use controller::{Action, GridViewController, RequestKind, ResponseOutcome};
pub use errors::{YardError, YardResult};
pub use snapshot::{Coord, GridRow, Highlight, Move, Snapshot, Weight, PARK_CELL};
pub use step_log::StepHistory;
pub use view::{render_grid, GridView, StatusLine, Tile, TileKind};

// Default yard size
pub const GRID_ROWS: usize = 8;
pub const GRID_COLS: usize = 12;
