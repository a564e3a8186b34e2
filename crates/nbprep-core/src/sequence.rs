//! Sequential-execution check.
//!
//! A notebook committed to the course repo should have been run top to
//! bottom in a fresh kernel, which leaves its code cells numbered 1..N in
//! document order. This gate catches notebooks saved after out-of-order
//! editing before any execution time is spent on them.

use crate::notebook::Notebook;

/// Whether the notebook's execution counts form a contiguous ascending run
/// starting at 1.
///
/// Only code cells with non-empty source and a recorded count participate;
/// a notebook with no such cells passes vacuously.
pub fn is_sequentially_executed(notebook: &Notebook) -> bool {
    let counts: Vec<u32> = notebook
        .cells
        .iter()
        .filter(|cell| cell.is_code() && !cell.source.text().is_empty())
        .filter_map(|cell| cell.execution_count)
        .collect();

    counts.iter().copied().eq(1..=counts.len() as u32)
}
