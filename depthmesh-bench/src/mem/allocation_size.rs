use criterion::measurement::{Measurement, ValueFormatter};
use criterion::Throughput;
use stats_alloc::INSTRUMENTED_SYSTEM;

use crate::DepthmeshMeasurement;

/// Total bytes requested from the allocator by the measured routine
pub struct AllocationSize;

impl DepthmeshMeasurement for AllocationSize {
    const NAME: &'static str = "allocation size";
}

impl Measurement for AllocationSize {
    type Intermediate = usize;
    type Value = usize;

    fn start(&self) -> Self::Intermediate {
        INSTRUMENTED_SYSTEM.stats().bytes_allocated
    }

    fn end(&self, start: Self::Intermediate) -> Self::Value {
        INSTRUMENTED_SYSTEM.stats().bytes_allocated - start
    }

    fn add(&self, &v1: &Self::Value, &v2: &Self::Value) -> Self::Value {
        v1 + v2
    }

    fn zero(&self) -> Self::Value {
        0
    }

    fn to_f64(&self, &value: &Self::Value) -> f64 {
        value as f64
    }

    fn formatter(&self) -> &dyn ValueFormatter {
        &ByteFormatter
    }
}

struct ByteFormatter;

impl ByteFormatter {
    fn unit(magnitude: i32) -> &'static str {
        match magnitude {
            ..=0 => "B",
            1 => "KiB",
            2 => "MiB",
            3 => "GiB",
            _ => "TiB",
        }
    }
}

impl ValueFormatter for ByteFormatter {
    fn scale_values(&self, typical_value: f64, values: &mut [f64]) -> &'static str {
        let magnitude = if typical_value >= 1.0 {
            ((typical_value.log2().floor() as i32) / 10).min(4)
        } else {
            0
        };
        let factor = 1024.0_f64.powi(-magnitude);
        for value in values {
            *value *= factor;
        }
        Self::unit(magnitude)
    }

    fn scale_throughputs(&self, _: f64, _: &Throughput, _: &mut [f64]) -> &'static str {
        "B"
    }

    fn scale_for_machines(&self, _: &mut [f64]) -> &'static str {
        "B"
    }
}
