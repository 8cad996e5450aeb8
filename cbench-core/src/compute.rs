//! Compute Benchmarks Suite
//!
//! Cases backed by the `compute-benchmarks` binaries: API overhead
//! (`api_overhead_benchmark_*`), memory (`memory_benchmark_sycl`),
//! miscellaneous (`miscellaneous_benchmark_sycl`) and multithreaded
//! (`multithread_benchmark_ur`) tests.

use crate::benchmark::{Benchmark, Suite};
use std::fmt;

const API_OVERHEAD_SYCL: &str = "api_overhead_benchmark_sycl";
const API_OVERHEAD_UR: &str = "api_overhead_benchmark_ur";
const MEMORY_SYCL: &str = "memory_benchmark_sycl";
const MISC_SYCL: &str = "miscellaneous_benchmark_sycl";
const MULTITHREAD_UR: &str = "multithread_benchmark_ur";

/// Memory placement understood by the memory benchmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Device-local allocation
    Device,
    /// Host allocation
    Host,
    /// Shared (USM) allocation
    Shared,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Placement::Device => "Device",
            Placement::Host => "Host",
            Placement::Shared => "Shared",
        };
        f.write_str(s)
    }
}

fn queue_order(ioq: bool) -> &'static str {
    if ioq { "in order" } else { "out of order" }
}

/// API the SubmitKernel case exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    /// SYCL runtime
    Sycl,
    /// Unified Runtime directly
    Ur,
}

/// Kernel submission overhead
#[derive(Debug, Clone)]
pub struct SubmitKernel {
    /// API under test
    pub api: Api,
    /// In-order queue
    pub ioq: bool,
}

impl Benchmark for SubmitKernel {
    fn name(&self) -> &str {
        match self.api {
            Api::Sycl => API_OVERHEAD_SYCL,
            Api::Ur => API_OVERHEAD_UR,
        }
    }

    fn label(&self) -> String {
        format!("{} SubmitKernel {}", self.name(), queue_order(self.ioq))
    }

    fn test(&self) -> &str {
        "SubmitKernel"
    }

    fn explicit_group(&self) -> Option<&str> {
        Some("SubmitKernel")
    }

    fn bin_args(&self) -> Vec<String> {
        vec![
            format!("--Ioq={}", u8::from(self.ioq)),
            "--DiscardEvents=0".to_string(),
            "--MeasureCompletion=0".to_string(),
            "--iterations=100000".to_string(),
            "--Profiling=0".to_string(),
            "--NumKernels=10".to_string(),
            "--KernelExecTime=1".to_string(),
        ]
    }
}

/// Copy on an immediate command list
#[derive(Debug, Clone)]
pub struct ExecImmediateCopyQueue {
    /// In-order queue
    pub ioq: bool,
    /// Use a copy-only engine
    pub is_copy_only: bool,
    /// Source placement
    pub source: Placement,
    /// Destination placement
    pub destination: Placement,
    /// Copy size in bytes
    pub size: usize,
}

impl Benchmark for ExecImmediateCopyQueue {
    fn name(&self) -> &str {
        API_OVERHEAD_SYCL
    }

    fn label(&self) -> String {
        format!(
            "{} ExecImmediateCopyQueue {} from {} to {}, size {}",
            self.name(),
            queue_order(self.ioq),
            self.source,
            self.destination,
            self.size
        )
    }

    fn test(&self) -> &str {
        "ExecImmediateCopyQueue"
    }

    fn bin_args(&self) -> Vec<String> {
        vec![
            "--iterations=100000".to_string(),
            format!("--ioq={}", u8::from(self.ioq)),
            format!("--IsCopyOnly={}", u8::from(self.is_copy_only)),
            "--MeasureCompletionTime=0".to_string(),
            format!("--src={}", self.source),
            format!("--dst={}", self.destination),
            format!("--size={}", self.size),
        ]
    }
}

/// Memcpy on an in-order queue
#[derive(Debug, Clone)]
pub struct QueueInOrderMemcpy {
    /// Use a copy-only engine
    pub is_copy_only: bool,
    /// Source placement
    pub source: Placement,
    /// Destination placement
    pub destination: Placement,
    /// Copy size in bytes
    pub size: usize,
}

impl Benchmark for QueueInOrderMemcpy {
    fn name(&self) -> &str {
        MEMORY_SYCL
    }

    fn label(&self) -> String {
        format!(
            "{} QueueInOrderMemcpy from {} to {}, size {}",
            self.name(),
            self.source,
            self.destination,
            self.size
        )
    }

    fn test(&self) -> &str {
        "QueueInOrderMemcpy"
    }

    fn bin_args(&self) -> Vec<String> {
        vec![
            "--iterations=10000".to_string(),
            format!("--IsCopyOnly={}", u8::from(self.is_copy_only)),
            format!("--sourcePlacement={}", self.source),
            format!("--destinationPlacement={}", self.destination),
            format!("--size={}", self.size),
            "--count=100".to_string(),
        ]
    }
}

/// Plain queue memcpy
#[derive(Debug, Clone)]
pub struct QueueMemcpy {
    /// Source placement
    pub source: Placement,
    /// Destination placement
    pub destination: Placement,
    /// Copy size in bytes
    pub size: usize,
}

impl Benchmark for QueueMemcpy {
    fn name(&self) -> &str {
        MEMORY_SYCL
    }

    fn label(&self) -> String {
        format!(
            "{} QueueMemcpy from {} to {}, size {}",
            self.name(),
            self.source,
            self.destination,
            self.size
        )
    }

    fn test(&self) -> &str {
        "QueueMemcpy"
    }

    fn bin_args(&self) -> Vec<String> {
        vec![
            "--iterations=10000".to_string(),
            format!("--sourcePlacement={}", self.source),
            format!("--destinationPlacement={}", self.destination),
            format!("--size={}", self.size),
        ]
    }
}

/// STREAM-style memory bandwidth kernel
#[derive(Debug, Clone)]
pub struct StreamMemory {
    /// Kernel type (e.g. "Triad")
    pub kind: &'static str,
    /// Buffer size in bytes
    pub size: usize,
    /// Memory placement
    pub placement: Placement,
}

impl Benchmark for StreamMemory {
    fn name(&self) -> &str {
        MEMORY_SYCL
    }

    fn label(&self) -> String {
        format!(
            "{} StreamMemory, placement {}, type {}, size {}",
            self.name(),
            self.placement,
            self.kind,
            self.size
        )
    }

    fn test(&self) -> &str {
        "StreamMemory"
    }

    fn bin_args(&self) -> Vec<String> {
        vec![
            "--iterations=10000".to_string(),
            format!("--type={}", self.kind),
            format!("--size={}", self.size),
            format!("--memoryPlacement={}", self.placement),
            "--useEvents=0".to_string(),
            "--contents=Zeros".to_string(),
        ]
    }
}

/// 3D vector reduction
#[derive(Debug, Clone)]
pub struct VectorSum;

impl Benchmark for VectorSum {
    fn name(&self) -> &str {
        MISC_SYCL
    }

    fn label(&self) -> String {
        format!("{} VectorSum", self.name())
    }

    fn test(&self) -> &str {
        "VectorSum"
    }

    fn bin_args(&self) -> Vec<String> {
        vec![
            "--iterations=1000".to_string(),
            "--numberOfElementsX=512".to_string(),
            "--numberOfElementsY=256".to_string(),
            "--numberOfElementsZ=256".to_string(),
        ]
    }
}

/// Multithreaded memcpy + execute
#[derive(Debug, Clone)]
pub struct MemcpyExecute {
    /// Operations issued by each thread
    pub ops_per_thread: usize,
    /// Number of submitting threads
    pub threads: usize,
    /// Allocation size in bytes
    pub alloc_size: usize,
    /// Iterations
    pub iterations: usize,
}

impl Benchmark for MemcpyExecute {
    fn name(&self) -> &str {
        MULTITHREAD_UR
    }

    fn label(&self) -> String {
        format!(
            "{} MemcpyExecute opsPerThread:{}, numThreads:{}, allocSize:{}",
            self.name(),
            self.ops_per_thread,
            self.threads,
            self.alloc_size
        )
    }

    fn test(&self) -> &str {
        "MemcpyExecute"
    }

    fn explicit_group(&self) -> Option<&str> {
        Some("MemcpyExecute")
    }

    fn bin_args(&self) -> Vec<String> {
        vec![
            "--Ioq=1".to_string(),
            "--UseEvents=1".to_string(),
            "--MeasureCompletion=1".to_string(),
            "--UseQueuePerThread=1".to_string(),
            format!("--AllocSize={}", self.alloc_size),
            format!("--NumThreads={}", self.threads),
            format!("--NumOpsPerThread={}", self.ops_per_thread),
            format!("--iterations={}", self.iterations),
        ]
    }
}

/// The compute-benchmarks suite
#[derive(Debug, Clone, Default)]
pub struct ComputeBench {
    /// Also run the Unified Runtime variants
    pub include_ur: bool,
}

impl ComputeBench {
    /// Create the suite
    pub fn new(include_ur: bool) -> Self {
        Self { include_ur }
    }
}

impl Suite for ComputeBench {
    fn name(&self) -> &str {
        "compute-benchmarks"
    }

    fn benchmarks(&self) -> Vec<Box<dyn Benchmark>> {
        use Placement::{Device, Host};

        let memcpy_execute = |ops_per_thread, threads, alloc_size, iterations| {
            Box::new(MemcpyExecute {
                ops_per_thread,
                threads,
                alloc_size,
                iterations,
            }) as Box<dyn Benchmark>
        };

        let mut benches: Vec<Box<dyn Benchmark>> = vec![
            Box::new(SubmitKernel { api: Api::Sycl, ioq: false }),
            Box::new(SubmitKernel { api: Api::Sycl, ioq: true }),
            Box::new(QueueInOrderMemcpy {
                is_copy_only: false,
                source: Device,
                destination: Device,
                size: 1024,
            }),
            Box::new(QueueInOrderMemcpy {
                is_copy_only: false,
                source: Host,
                destination: Device,
                size: 1024,
            }),
            Box::new(QueueMemcpy {
                source: Device,
                destination: Device,
                size: 1024,
            }),
            Box::new(StreamMemory {
                kind: "Triad",
                size: 10 * 1024,
                placement: Device,
            }),
            Box::new(ExecImmediateCopyQueue {
                ioq: false,
                is_copy_only: true,
                source: Device,
                destination: Device,
                size: 1024,
            }),
            Box::new(ExecImmediateCopyQueue {
                ioq: true,
                is_copy_only: true,
                source: Device,
                destination: Host,
                size: 1024,
            }),
            Box::new(VectorSum),
            memcpy_execute(400, 8, 1024, 100),
            memcpy_execute(400, 8, 102400, 10),
            memcpy_execute(500, 8, 102400, 10),
            memcpy_execute(400, 1, 1024, 1000),
            memcpy_execute(10, 16, 1024, 1000),
            memcpy_execute(10, 16, 102400, 100),
        ];

        if self.include_ur {
            benches.push(Box::new(SubmitKernel { api: Api::Ur, ioq: false }));
            benches.push(Box::new(SubmitKernel { api: Api::Ur, ioq: true }));
        }

        benches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn suite_size_depends_on_ur() {
        assert_eq!(ComputeBench::new(false).benchmarks().len(), 15);
        assert_eq!(ComputeBench::new(true).benchmarks().len(), 17);
    }

    #[test]
    fn labels_are_unique() {
        let labels: Vec<String> = ComputeBench::new(true)
            .benchmarks()
            .iter()
            .map(|b| b.label())
            .collect();
        let unique: std::collections::BTreeSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), labels.len());
    }

    #[test]
    fn submit_kernel_label_and_args() {
        let b = SubmitKernel { api: Api::Sycl, ioq: true };
        assert_eq!(b.label(), "api_overhead_benchmark_sycl SubmitKernel in order");
        let cmd = b.command(Path::new("bin"));
        assert_eq!(cmd[1], "--test=SubmitKernel");
        assert!(cmd.contains(&"--Ioq=1".to_string()));
        assert_eq!(b.explicit_group(), Some("SubmitKernel"));

        let ur = SubmitKernel { api: Api::Ur, ioq: false };
        assert_eq!(ur.label(), "api_overhead_benchmark_ur SubmitKernel out of order");
    }

    #[test]
    fn memcpy_execute_label() {
        let b = MemcpyExecute {
            ops_per_thread: 400,
            threads: 8,
            alloc_size: 1024,
            iterations: 100,
        };
        assert_eq!(
            b.label(),
            "multithread_benchmark_ur MemcpyExecute opsPerThread:400, numThreads:8, allocSize:1024"
        );
        assert!(b.bin_args().contains(&"--iterations=100".to_string()));
    }

    #[test]
    fn copy_queue_uses_source_and_destination() {
        let b = ExecImmediateCopyQueue {
            ioq: true,
            is_copy_only: true,
            source: Placement::Device,
            destination: Placement::Host,
            size: 1024,
        };
        let args = b.bin_args();
        assert!(args.contains(&"--src=Device".to_string()));
        assert!(args.contains(&"--dst=Host".to_string()));
        assert_eq!(
            b.label(),
            "api_overhead_benchmark_sycl ExecImmediateCopyQueue in order from Device to Host, size 1024"
        );
    }

    #[test]
    fn stream_memory_label() {
        let b = StreamMemory {
            kind: "Triad",
            size: 10 * 1024,
            placement: Placement::Device,
        };
        assert_eq!(
            b.label(),
            "memory_benchmark_sycl StreamMemory, placement Device, type Triad, size 10240"
        );
    }
}
