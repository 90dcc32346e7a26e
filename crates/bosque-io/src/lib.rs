//! File I/O, rendering, and reporting for the bosque pipeline.

mod error;
mod reader;
mod render;
mod report;
mod writer;

pub use error::IoError;
pub use reader::DelimitedReader;
pub use render::{render_tree, write_tree};
pub use report::{ClassReport, SweepReport, ValidationReport};
pub use writer::{EvaluationSettings, ResultWriter};
