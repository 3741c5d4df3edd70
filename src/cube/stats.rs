/// Display-normalization bounds of the post warm-up current samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanStats {
    pub min: f64,
    pub max: f64,
}
impl ScanStats {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}
/// Running min/max reduction. Partial accumulators can be merged in any order.
#[derive(Clone, Copy, Debug)]
pub struct StatsAccumulator {
    min: f64,
    max: f64,
    count: usize,
}
impl Default for StatsAccumulator {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            count: 0,
        }
    }
}
impl StatsAccumulator {
    pub fn push(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count += 1;
    }
    pub fn merge(self, other: StatsAccumulator) -> StatsAccumulator {
        StatsAccumulator {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            count: self.count + other.count,
        }
    }
    pub fn count(&self) -> usize {
        self.count
    }
    /// `None` when nothing was pushed.
    pub fn finish(&self) -> Option<ScanStats> {
        (self.count > 0).then_some(ScanStats {
            min: self.min,
            max: self.max,
        })
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn empty_accumulator_has_no_stats() {
        assert_eq!(StatsAccumulator::default().finish(), None);
    }
    #[test]
    fn merge_matches_single_pass() {
        let values = [3.0, -1.5, 8.25, 0.0, 2.0, -4.0];
        let mut whole = StatsAccumulator::default();
        values.iter().for_each(|&v| whole.push(v));
        let (left, right) = values.split_at(2);
        let mut a = StatsAccumulator::default();
        let mut b = StatsAccumulator::default();
        left.iter().for_each(|&v| a.push(v));
        right.iter().for_each(|&v| b.push(v));
        let merged = a.merge(b);
        assert_eq!(merged.count(), 6);
        assert_eq!(merged.finish(), whole.finish());
        assert_eq!(
            merged.finish(),
            Some(ScanStats {
                min: -4.0,
                max: 8.25
            })
        );
    }
}
