#![warn(missing_docs)]
//! cbench Core - Benchmarks and Results
//!
//! This crate provides the data model shared by every other cbench crate:
//! - `BenchResult` / `BenchmarkRun` result records (serde-serializable)
//! - `Benchmark` / `Suite` traits describing external benchmark binaries
//! - The compute-benchmarks suite definitions
//! - CSV output parsing for `--csv --noHeaders` binaries

mod benchmark;
mod compute;
mod parse;
mod result;

pub use benchmark::{Benchmark, Suite};
pub use compute::{
    Api, ComputeBench, ExecImmediateCopyQueue, MemcpyExecute, Placement, QueueInOrderMemcpy,
    QueueMemcpy, StreamMemory, SubmitKernel, VectorSum,
};
pub use parse::{ParseError, ParsedRow, parse_compute_output};
pub use result::{BenchEnv, BenchResult, BenchmarkRun, CURRENT_RUN_NAME};
