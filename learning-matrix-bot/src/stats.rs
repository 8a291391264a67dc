use hdrhistogram::Histogram;

#[derive(Clone, Debug, Default)]
pub struct RequestCounters {
    pub completed: u64,
    pub rejected: u64,
    pub fallback_explanations: u64,
}

impl RequestCounters {
    pub fn total(&self) -> u64 {
        self.completed + self.rejected
    }

    pub fn rejection_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.rejected as f64) / (total as f64)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SignalCounters {
    pub with_signal: u64,
    pub optimal: u64,
}

impl SignalCounters {
    pub fn optimal_rate(&self) -> f64 {
        if self.with_signal == 0 {
            return 0.0;
        }
        (self.optimal as f64) / (self.with_signal as f64)
    }
}

#[derive(Clone, Debug)]
pub struct Histo {
    /// Values are stored as integers; callers pick a unit scale
    /// (e.g. pct*100, score*1000, plain ms).
    inner: Histogram<u64>,
}

impl Default for Histo {
    fn default() -> Self {
        Self {
            inner: Histogram::new(3).expect("histo"),
        }
    }
}

impl Histo {
    pub fn record(&mut self, v: u64) {
        let _ = self.inner.record(v.max(1));
    }

    /// Record a non-negative float at the given unit scale.
    pub fn record_scaled(&mut self, v: f64, scale: f64) {
        self.record((v.max(0.0) * scale) as u64);
    }

    pub fn p50(&self) -> u64 {
        self.inner.value_at_quantile(0.50)
    }

    pub fn p90(&self) -> u64 {
        self.inner.value_at_quantile(0.90)
    }

    pub fn p99(&self) -> u64 {
        self.inner.value_at_quantile(0.99)
    }

    pub fn max(&self) -> u64 {
        self.inner.max()
    }

    pub fn count(&self) -> u64 {
        self.inner.len()
    }

    pub fn mean(&self) -> f64 {
        self.inner.mean()
    }
}

/// Everything a session tracks about its own behavior.
#[derive(Clone, Debug, Default)]
pub struct SessionStats {
    pub requests: RequestCounters,
    pub signal: SignalCounters,

    /// Mastery percentage, stored as pct*100.
    pub mastery_pct: Histo,
    /// Attention score, stored as score*1000.
    pub attention: Histo,

    /// Pipeline wall time (embed through score), milliseconds.
    pub pipeline_latency_ms: Histo,
    /// Explanation provider wall time, milliseconds.
    pub explain_latency_ms: Histo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_rate_guards_zero_denominator() {
        let counters = RequestCounters::default();
        assert_eq!(counters.rejection_rate(), 0.0);
    }

    #[test]
    fn rejection_rate_counts_both_outcomes() {
        let counters = RequestCounters {
            completed: 3,
            rejected: 1,
            fallback_explanations: 0,
        };
        assert_eq!(counters.rejection_rate(), 0.25);
    }

    #[test]
    fn histo_percentiles_track_recorded_values() {
        let mut histo = Histo::default();
        for v in 1..=100 {
            histo.record(v);
        }
        assert_eq!(histo.count(), 100);
        assert!(histo.p50() >= 50 && histo.p50() <= 51);
        assert_eq!(histo.max(), 100);
    }

    #[test]
    fn scaled_records_clamp_negatives() {
        let mut histo = Histo::default();
        histo.record_scaled(-5.0, 100.0);
        // Negative input floors at the histogram's minimum trackable value.
        assert_eq!(histo.count(), 1);
        assert_eq!(histo.max(), 1);
    }
}
