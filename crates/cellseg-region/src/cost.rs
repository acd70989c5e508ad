//! Region cost functions for seeded growing
//!
//! A [`RegionCost`] is attached to every growing region. It sees each pixel
//! the region absorbs and prices candidate pixels against what it has seen.
//! The growing engine only calls these three methods.

/// Running statistic of a region and the cost of adding a pixel to it
pub trait RegionCost {
    /// Absorb a pixel value into the region's statistic.
    fn accumulate(&mut self, sample: u32);

    /// Current value of the statistic.
    fn current_statistic(&self) -> f64;

    /// Cost of adding a pixel of value `candidate`; lower grows first.
    fn cost(&self, candidate: u32) -> f64;
}

impl<C: RegionCost + ?Sized> RegionCost for Box<C> {
    fn accumulate(&mut self, sample: u32) {
        (**self).accumulate(sample)
    }

    fn current_statistic(&self) -> f64 {
        (**self).current_statistic()
    }

    fn cost(&self, candidate: u32) -> f64 {
        (**self).cost(candidate)
    }
}

/// Distance of a candidate from the region's running mean
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanDifference {
    sum: f64,
    count: u64,
}

impl MeanDifference {
    /// Create an empty statistic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of absorbed samples.
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl RegionCost for MeanDifference {
    fn accumulate(&mut self, sample: u32) {
        self.sum += sample as f64;
        self.count += 1;
    }

    fn current_statistic(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    fn cost(&self, candidate: u32) -> f64 {
        (candidate as f64 - self.current_statistic()).abs()
    }
}

/// Every candidate costs the same; growth becomes breadth-first
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformCost {
    count: u64,
}

impl UniformCost {
    /// Create a statistic with no samples.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegionCost for UniformCost {
    fn accumulate(&mut self, _sample: u32) {
        self.count += 1;
    }

    /// Number of absorbed samples.
    fn current_statistic(&self) -> f64 {
        self.count as f64
    }

    fn cost(&self, _candidate: u32) -> f64 {
        0.0
    }
}

/// The candidate's own value is its cost; dark pixels are claimed first
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCost {
    max: Option<u32>,
}

impl ValueCost {
    /// Create a statistic with no samples; its statistic reads 0 until one arrives.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegionCost for ValueCost {
    fn accumulate(&mut self, sample: u32) {
        self.max = Some(self.max.map_or(sample, |m| m.max(sample)));
    }

    /// Brightest absorbed value.
    fn current_statistic(&self) -> f64 {
        self.max.map_or(0.0, |m| m as f64)
    }

    fn cost(&self, candidate: u32) -> f64 {
        candidate as f64
    }
}
