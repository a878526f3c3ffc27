mod core;
mod engine;
mod sync;

pub use core::{LayoutEntry, ParsedLayout, layout_view, parse_layout_payload};
pub use engine::GridPacker;
pub use sync::{ReconcileReport, reconcile};
