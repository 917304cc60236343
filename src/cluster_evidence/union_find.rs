/// Disjoint set forest with path compression and union by size
///
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    pub fn new(count: usize) -> Self {
        Self {
            parent: (0..count).collect(),
            size: vec![1; count],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Path compression
        let mut x = x;
        while self.parent[x] != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let mut ra = self.find(a);
        let mut rb = self.find(b);
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }

    /// Return all sets as lists of element indexes
    ///
    /// Each set is sorted, and sets are ordered by their smallest element
    ///
    pub fn components(&mut self) -> Vec<Vec<usize>> {
        let count = self.parent.len();
        let mut root_to_component: Vec<Option<usize>> = vec![None; count];
        let mut components: Vec<Vec<usize>> = Vec::new();
        for x in 0..count {
            let root = self.find(x);
            match root_to_component[root] {
                Some(component_index) => components[component_index].push(x),
                None => {
                    root_to_component[root] = Some(components.len());
                    components.push(vec![x]);
                }
            }
        }
        components
    }
}
