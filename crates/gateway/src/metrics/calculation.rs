//! Derived latency and throughput figures
//!
//! All inputs are milliseconds. Empty inputs yield zero rather than NaN so
//! a policy that saw no requests still prints a sensible summary line.

/// Percentile `p` (0..=100) by linear interpolation between order statistics.
///
/// With `k = (n - 1) * p / 100`, the result interpolates between the values
/// at `floor(k)` and `ceil(k)` of the sorted input.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let k = (sorted.len() - 1) as f64 * p.clamp(0.0, 100.0) / 100.0;
    let lower = k.floor() as usize;
    let upper = k.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    sorted[lower] * (upper as f64 - k) + sorted[upper] * (k - lower as f64)
}

/// Requests per second if the requests had run back to back
pub fn virtual_throughput(e2e_ms: &[f64]) -> f64 {
    let total_ms: f64 = e2e_ms.iter().sum();
    if e2e_ms.is_empty() || total_ms <= 0.0 {
        0.0
    } else {
        e2e_ms.len() as f64 / (total_ms / 1000.0)
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn hit_rate(hits: u64, requests: u64) -> f64 {
    if requests == 0 {
        0.0
    } else {
        hits as f64 / requests as f64
    }
}
