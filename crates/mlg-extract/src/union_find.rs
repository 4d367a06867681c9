//! A small disjoint-set structure over `usize` indices, used to compute
//! connected components of the dynamic graph's undirected view.

pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }

    /// Relabels roots to a dense `0..count` range, returning the label for
    /// each original index.
    pub fn labels(&mut self) -> Vec<usize> {
        let n = self.parent.len();
        let mut next_label = 0usize;
        let mut seen = std::collections::BTreeMap::new();
        let mut out = vec![0usize; n];
        for i in 0..n {
            let root = self.find(i);
            let label = *seen.entry(root).or_insert_with(|| {
                let l = next_label;
                next_label += 1;
                l
            });
            out[i] = label;
        }
        out
    }
}
