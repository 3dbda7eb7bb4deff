use super::HoldSample;
use serde::Serialize;
use std::collections::BTreeMap;

/// Occurrence count per hold duration (ms). Counts are always positive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Histogram {
    counts: BTreeMap<u32, u32>,
}

impl Histogram {
    #[must_use]
    pub fn new() -> Self {
        Histogram::default()
    }

    /// Adds one occurrence of `duration`.
    pub fn record(&mut self, duration: HoldSample) {
        let count = self.counts.entry(duration).or_insert(0);
        *count = count.saturating_add(1);
    }

    pub fn get(&self, duration: u32) -> u32 {
        self.counts.get(&duration).copied().unwrap_or(0)
    }

    /// Number of distinct durations.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `(duration, count)` pairs in ascending duration order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.counts.iter().map(|(d, c)| (*d, *c))
    }

    /// Entries whose duration is at most `max_duration`. Longer holds are dropped.
    #[must_use]
    pub fn filter(&self, max_duration: u32) -> Histogram {
        Histogram {
            counts: self.counts.range(..=max_duration).map(|(d, c)| (*d, *c)).collect(),
        }
    }

    /// Mean duration weighted by the squared count of each bucket,
    /// `Σ(d·c²) / Σ(c²)`. Frequent durations dominate, so a long thin tail of
    /// rare holds barely moves it. `None` when the histogram is empty.
    pub fn weighted_mean(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let (weighted, weights) = self.iter().fold((0.0f64, 0.0f64), |(sum, w), (d, c)| {
            let weight = f64::from(c) * f64::from(c);
            (sum + f64::from(d) * weight, w + weight)
        });
        Some(weighted / weights)
    }

    /// Number of samples folded in.
    pub fn total_samples(&self) -> u64 {
        self.counts.values().map(|c| u64::from(*c)).sum()
    }

    pub fn min_duration(&self) -> Option<u32> {
        self.counts.keys().next().copied()
    }

    pub fn max_duration(&self) -> Option<u32> {
        self.counts.keys().next_back().copied()
    }

    pub fn max_count(&self) -> Option<u32> {
        self.counts.values().max().copied()
    }
}

impl Extend<HoldSample> for Histogram {
    fn extend<T: IntoIterator<Item = HoldSample>>(&mut self, iter: T) {
        for duration in iter {
            self.record(duration);
        }
    }
}

impl FromIterator<HoldSample> for Histogram {
    fn from_iter<T: IntoIterator<Item = HoldSample>>(iter: T) -> Self {
        let mut histogram = Histogram::new();
        histogram.extend(iter);
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist(entries: &[(u32, u32)]) -> Histogram {
        entries
            .iter()
            .flat_map(|&(d, c)| std::iter::repeat(d).take(c as usize))
            .collect()
    }

    #[test]
    fn accumulation_ignores_order() {
        let a: Histogram = [40, 40, 15].into_iter().collect();
        let b: Histogram = [15, 40, 40].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.get(40), 2);
        assert_eq!(a.get(15), 1);
        assert_eq!(a.get(16), 0);
        assert_eq!(a.len(), 2);
        assert_eq!(a.total_samples(), 3);
    }

    #[test]
    fn filter_is_inclusive_and_idempotent() {
        let h = hist(&[(10, 2), (100, 1), (101, 4), (250, 1)]);
        let f = h.filter(100);
        assert_eq!(f.iter().collect::<Vec<_>>(), vec![(10, 2), (100, 1)]);
        assert_eq!(f.filter(100), f);
        assert_eq!(h.filter(250), h);
        assert!(h.filter(9).is_empty());
    }

    #[test]
    fn weighted_mean_squares_counts() {
        assert_eq!(hist(&[(10, 1), (20, 3)]).weighted_mean(), Some(19.0));
        assert_eq!(hist(&[(5, 1)]).weighted_mean(), Some(5.0));
        assert_eq!(Histogram::new().weighted_mean(), None);
    }

    #[test]
    fn bounds() {
        let h = hist(&[(12, 3), (4, 1), (30, 7)]);
        assert_eq!(h.min_duration(), Some(4));
        assert_eq!(h.max_duration(), Some(30));
        assert_eq!(h.max_count(), Some(7));
        assert_eq!(Histogram::new().max_count(), None);
    }

    #[test]
    fn serializes_as_map() {
        let h = hist(&[(30, 1), (5, 2)]);
        assert_eq!(serde_json::to_string(&h).unwrap(), r#"{"5":2,"30":1}"#);
    }
}
