//! Benchmark support for depthmesh
//!
//! Custom criterion measurements for allocation behaviour. Benchmarks using
//! them must install [`mem::INSTRUMENTED_SYSTEM`] as the global allocator.

use criterion::measurement::Measurement;

pub mod mem;

/// A criterion measurement with a name used in benchmark group titles
pub trait DepthmeshMeasurement: Measurement {
    const NAME: &'static str;
}

impl DepthmeshMeasurement for criterion::measurement::WallTime {
    const NAME: &'static str = "time";
}
