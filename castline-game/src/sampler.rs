//! Cumulative-weight selection shared by depth rolls, pool materialization
//! and personal draws.
use rand::Rng;

/// Entry chosen by a weighted draw together with the roll that chose it.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<K> {
    pub key: K,
    pub weight: f64,
    pub roll: f64,
}

/// Cumulative weight table that can be drawn from repeatedly.
///
/// Entries with a NaN or non-positive weight are dropped on construction, so
/// they can never be selected. Infinite weights saturate to `f64::MAX`. When
/// the weights sum past the range of `f64`, the thresholds are rescaled by
/// the largest weight so relative shares survive.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTable<K> {
    entries: Vec<(K, f64, f64)>,
    total: f64,
}

impl<K> WeightedTable<K> {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
    {
        let drawable: Vec<(K, f64)> = entries
            .into_iter()
            .filter(|(_, weight)| !weight.is_nan() && *weight > 0.0)
            .map(|(key, weight)| (key, weight.min(f64::MAX)))
            .collect();
        let raw_total: f64 = drawable.iter().map(|(_, weight)| weight).sum();
        let scale = if raw_total.is_finite() {
            1.0
        } else {
            drawable
                .iter()
                .map(|(_, weight)| *weight)
                .fold(1.0, f64::max)
        };

        let mut total = 0.0_f64;
        let mut cumulative = Vec::with_capacity(drawable.len());
        for (key, weight) in drawable {
            total += weight / scale;
            cumulative.push((key, weight, total));
        }
        Self {
            entries: cumulative,
            total,
        }
    }

    /// Sum of every drawable weight, in rescaled units when the raw sum
    /// overflows.
    #[must_use]
    pub const fn total(&self) -> f64 {
        self.total
    }

    /// Number of drawable entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when a draw can never select anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() || !self.total.is_finite() || self.total <= 0.0
    }

    fn pick_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(usize, f64)> {
        if self.is_empty() {
            return None;
        }
        let roll = rng.gen_range(0.0..self.total);
        let chosen = self
            .entries
            .iter()
            .position(|(_, _, threshold)| roll < *threshold)
            .unwrap_or(self.entries.len() - 1);
        Some((chosen, roll))
    }

    /// Draw one entry. The roll is uniform in `[0, total)` and the first
    /// entry (in input order) whose cumulative weight exceeds it wins.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Selection<&K>> {
        let (chosen, roll) = self.pick_index(rng)?;
        let (key, weight, _) = &self.entries[chosen];
        Some(Selection {
            key,
            weight: *weight,
            roll,
        })
    }
}

/// Draw one entry with probability proportional to its weight.
///
/// Returns `None` when no entry has a positive weight.
pub fn pick_weighted<K, I, R>(entries: I, rng: &mut R) -> Option<Selection<K>>
where
    I: IntoIterator<Item = (K, f64)>,
    R: Rng + ?Sized,
{
    let mut table = WeightedTable::new(entries);
    let (chosen, roll) = table.pick_index(rng)?;
    let (key, weight, _) = table.entries.swap_remove(chosen);
    Some(Selection { key, weight, roll })
}
