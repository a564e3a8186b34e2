//! Core library for nbprep, the course notebook processing pipeline.
//!
//! # Architecture
//!
//! ```text
//! tutorial.ipynb ──► Notebook ──► sequence check ──► (execution, in the CLI)
//!                                                           │
//!                                                           ▼
//!                       student notebook ◄── strip_solutions ──► image artifacts
//! ```
//!
//! This crate holds everything that does not require a live kernel: the
//! `.ipynb` document model, the sequential-execution gate, and the solution
//! stripping pass. Kernel execution and orchestration live in `nbprep-cli`.

mod error;
mod notebook;
mod outputs;
mod sequence;
mod solutions;

pub use error::{Error, Result};
pub use notebook::{Cell, Notebook, SourceText};
pub use outputs::{CellOutput, ImageArtifact, OutputData};
pub use sequence::is_sequentially_executed;
pub use solutions::{
    STATIC_DIR_TOKEN, is_solution_source, resolve_static_dir, strip_solutions,
};
