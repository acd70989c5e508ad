//! Label equivalence (union-find)
//!
//! Flooding hands out provisional labels and merges them when two fronts
//! meet. [`Equivalence`] resolves a provisional label to its current
//! representative with path compression, and merges by area so the larger
//! region keeps its label. Label 0 is reserved for background and never
//! handed out.

/// Union-find over region labels with per-label area
#[derive(Debug, Clone)]
pub struct Equivalence {
    parent: Vec<u32>,
    area: Vec<u64>,
}

impl Default for Equivalence {
    fn default() -> Self {
        Self::new()
    }
}

impl Equivalence {
    /// Create an empty equivalence holding only the background label.
    pub fn new() -> Self {
        Self {
            parent: vec![0],
            area: vec![0],
        }
    }

    /// Create an equivalence with labels `1..=count` already allocated.
    pub fn with_labels(count: u32) -> Self {
        let mut eq = Self::new();
        for _ in 0..count {
            eq.make_label();
        }
        eq
    }

    /// Allocate a fresh label with zero area.
    pub fn make_label(&mut self) -> u32 {
        let label = self.parent.len() as u32;
        self.parent.push(label);
        self.area.push(0);
        label
    }

    /// Number of labels ever allocated (excluding background).
    pub fn label_count(&self) -> u32 {
        (self.parent.len() - 1) as u32
    }

    /// Resolve `label` to its representative, compressing the path.
    pub fn find(&mut self, label: u32) -> u32 {
        let mut root = label;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        let mut cur = label;
        while self.parent[cur as usize] != root {
            let next = self.parent[cur as usize];
            self.parent[cur as usize] = root;
            cur = next;
        }
        root
    }

    /// Resolve `label` without mutating.
    pub fn resolve(&self, label: u32) -> u32 {
        let mut root = label;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        root
    }

    /// Merge the sets of `a` and `b`, returning the surviving label.
    ///
    /// The set with the larger area survives; on equal area the smaller
    /// (earlier) label survives.
    pub fn union(&mut self, a: u32, b: u32) -> u32 {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return ra;
        }
        let (survivor, absorbed) = if self.prefer(ra, rb) {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.absorb(survivor, absorbed);
        survivor
    }

    /// Merge `absorbed`'s set into `survivor`'s set unconditionally.
    pub fn union_into(&mut self, survivor: u32, absorbed: u32) -> u32 {
        let rs = self.find(survivor);
        let ra = self.find(absorbed);
        if rs != ra {
            self.absorb(rs, ra);
        }
        rs
    }

    fn prefer(&self, ra: u32, rb: u32) -> bool {
        let (aa, ab) = (self.area[ra as usize], self.area[rb as usize]);
        aa > ab || (aa == ab && ra < rb)
    }

    fn absorb(&mut self, survivor: u32, absorbed: u32) {
        self.parent[absorbed as usize] = survivor;
        self.area[survivor as usize] += self.area[absorbed as usize];
        self.area[absorbed as usize] = 0;
    }

    /// Add `pixels` to the area of `label`'s set.
    pub fn add_area(&mut self, label: u32, pixels: u64) {
        let root = self.find(label);
        self.area[root as usize] += pixels;
    }

    /// Area of `label`'s set.
    pub fn area(&mut self, label: u32) -> u64 {
        let root = self.find(label);
        self.area[root as usize]
    }

    /// Whether `a` and `b` belong to the same set.
    pub fn same(&mut self, a: u32, b: u32) -> bool {
        self.find(a) == self.find(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_labels_are_roots() {
        let mut eq = Equivalence::with_labels(3);
        assert_eq!(eq.label_count(), 3);
        for l in 1..=3 {
            assert_eq!(eq.find(l), l);
        }
        assert_eq!(eq.find(0), 0);
    }

    #[test]
    fn test_union_by_area() {
        let mut eq = Equivalence::with_labels(3);
        eq.add_area(1, 2);
        eq.add_area(2, 10);
        assert_eq!(eq.union(1, 2), 2);
        assert_eq!(eq.area(1), 12);
        assert_eq!(eq.find(1), 2);
        // equal area: earlier label survives
        eq.add_area(3, 12);
        assert_eq!(eq.union(3, 1), 2);
    }

    #[test]
    fn test_union_into_ignores_area() {
        let mut eq = Equivalence::with_labels(2);
        eq.add_area(2, 100);
        assert_eq!(eq.union_into(1, 2), 1);
        assert_eq!(eq.area(2), 100);
        assert!(eq.same(1, 2));
    }

    #[test]
    fn test_find_is_idempotent_and_compresses() {
        let mut eq = Equivalence::with_labels(5);
        eq.union_into(4, 5);
        eq.union_into(3, 4);
        eq.union_into(2, 3);
        eq.union_into(1, 2);
        assert_eq!(eq.resolve(5), 1);
        let root = eq.find(5);
        assert_eq!(root, 1);
        assert_eq!(eq.find(root), 1);
        assert_eq!(eq.parent[5], 1);
    }
}
