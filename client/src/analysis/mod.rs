//! Latency statistics and grading

/// Latencies below this are graded good (ms)
pub const GOOD_LATENCY_MS: f64 = 70.0;

/// Latencies above this are graded poor (ms)
pub const POOR_LATENCY_MS: f64 = 110.0;

/// Arithmetic mean of the numeric samples, rounded to three decimals.
///
/// Lost samples (`None` or NaN) count toward neither the sum nor the
/// divisor. Returns `None` when there is no valid sample, so an empty run
/// is never reported as 0ms.
pub fn average_latency<I>(samples: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = samples
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        return None;
    }

    let mean = sum / count as f64;
    Some((mean * 1000.0).round() / 1000.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyGrade {
    Good,
    Fair,
    Poor,
    Lost,
}

impl LatencyGrade {
    pub fn of(latency: Option<f64>) -> Self {
        match latency {
            None => LatencyGrade::Lost,
            Some(v) if v.is_nan() => LatencyGrade::Lost,
            Some(v) if v < GOOD_LATENCY_MS => LatencyGrade::Good,
            Some(v) if v > POOR_LATENCY_MS => LatencyGrade::Poor,
            Some(_) => LatencyGrade::Fair,
        }
    }
}
