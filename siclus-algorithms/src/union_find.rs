//! Array-backed disjoint-set forest over cell indices.
//!
//! Unions always link the larger root under the smaller one, so the root of
//! every set is its smallest member and every parent pointer points
//! backwards (`parent[i] <= i`). The representative therefore does not depend
//! on the order in which unions were performed, which keeps labels identical
//! between the sequential and partitioned labelers.

/// Disjoint-set forest with path halving.
///
/// The parent storage is either owned (`Vec<usize>`) or a borrowed window of
/// a larger forest (`&mut [usize]`), in which case `base` is the global index
/// of the window's first element. Indices passed to and returned from the
/// forest are always global.
#[derive(Debug, Clone)]
pub struct DisjointSet<P = Vec<usize>> {
    parent: P,
    base: usize,
}

impl DisjointSet<Vec<usize>> {
    /// Creates `n` singleton sets.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            base: 0,
        }
    }

    /// Adopts an existing parent array.
    ///
    /// Every entry must point at or before its own index.
    #[must_use]
    pub fn from_parents(parent: Vec<usize>) -> Self {
        debug_assert!(parent.iter().enumerate().all(|(i, &p)| p <= i));
        Self { parent, base: 0 }
    }

    /// Returns the parent array.
    #[must_use]
    pub fn into_parents(self) -> Vec<usize> {
        self.parent
    }
}

impl<'a> DisjointSet<&'a mut [usize]> {
    /// Wraps a window of a larger forest starting at global index `base`.
    pub fn over(parent: &'a mut [usize], base: usize) -> Self {
        Self { parent, base }
    }
}

impl<P> DisjointSet<P>
where
    P: AsRef<[usize]> + AsMut<[usize]>,
{
    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.as_ref().len()
    }

    /// Returns true if the forest holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.as_ref().is_empty()
    }

    /// Parent pointers (global indices).
    #[must_use]
    pub fn parents(&self) -> &[usize] {
        self.parent.as_ref()
    }

    /// Finds the root of `x`, halving the path on the way.
    pub fn find(&mut self, mut x: usize) -> usize {
        let base = self.base;
        let parent = self.parent.as_mut();
        loop {
            let p = parent[x - base];
            if p == x {
                return x;
            }
            let grandparent = parent[p - base];
            parent[x - base] = grandparent;
            x = grandparent;
        }
    }

    /// Merges the sets of `a` and `b`. Returns false if they were already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
        let base = self.base;
        self.parent.as_mut()[child - base] = root;
        true
    }

    /// Points every element directly at its root in one forward pass.
    pub fn flatten(&mut self) {
        let base = self.base;
        let parent = self.parent.as_mut();
        for i in 0..parent.len() {
            let p = parent[i];
            parent[i] = parent[p - base];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_find() {
        let mut uf = DisjointSet::new(5);
        assert!(uf.union(0, 1));
        assert!(uf.union(2, 3));
        assert!(uf.union(1, 2));
        assert!(!uf.union(3, 0));

        assert_eq!(uf.find(0), uf.find(3));
        assert_ne!(uf.find(0), uf.find(4));
    }

    #[test]
    fn test_root_is_smallest_member() {
        let mut uf = DisjointSet::new(6);
        uf.union(5, 4);
        uf.union(4, 3);
        uf.union(5, 1);
        assert_eq!(uf.find(3), 1);
        assert_eq!(uf.find(5), 1);
        assert_eq!(uf.find(2), 2);
        assert!(uf.parents().iter().enumerate().all(|(i, &p)| p <= i));
    }

    #[test]
    fn test_flatten() {
        let mut uf = DisjointSet::new(6);
        uf.union(1, 2);
        uf.union(2, 4);
        uf.union(0, 4);
        uf.flatten();
        assert_eq!(uf.into_parents(), vec![0, 0, 0, 3, 0, 5]);
    }

    #[test]
    fn test_window_uses_global_indices() {
        let mut parent: Vec<usize> = (0..8).collect();
        {
            let (_, right) = parent.split_at_mut(4);
            let mut window = DisjointSet::over(right, 4);
            assert_eq!(window.len(), 4);
            window.union(7, 5);
            window.union(6, 7);
            assert_eq!(window.find(7), 5);
        }
        assert_eq!(&parent[4..], &[4, 5, 5, 5]);

        let mut merged = DisjointSet::from_parents(parent);
        merged.union(6, 2);
        merged.flatten();
        assert_eq!(merged.parents()[7], 2);
    }
}
