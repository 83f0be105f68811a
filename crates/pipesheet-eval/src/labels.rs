//! Per-row label visibility.
//!
//! A label anchors its own (row, column); every row from the defining row
//! down sees it until a later row redefines the same name.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use pipesheet_parse::{Cell, CellGrid};

/// Grid position a label was defined at.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LabelDef {
    pub row: usize,
    pub col: usize,
}

/// Labels visible from one row: name → defining position.
pub type LabelSnapshot = Arc<FxHashMap<String, LabelDef>>;

/// Single forward pass over the grid, one snapshot per row.
///
/// Rows that introduce no label share the previous row's map;
/// `Arc::make_mut` clones at most once per row, so snapshots already
/// handed out are never mutated.
pub fn index_labels(grid: &CellGrid) -> Vec<LabelSnapshot> {
    let mut snapshots = Vec::with_capacity(grid.len());
    let mut current: LabelSnapshot = Arc::new(FxHashMap::default());
    for (row_idx, row) in grid.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if let Cell::Label(name) = cell {
                Arc::make_mut(&mut current).insert(
                    name.clone(),
                    LabelDef {
                        row: row_idx,
                        col: col_idx,
                    },
                );
            }
        }
        snapshots.push(Arc::clone(&current));
    }
    snapshots
}
