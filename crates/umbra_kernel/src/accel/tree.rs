use super::split::{BuildItem, SplitStrategy};
use super::{ObjectQuery, ObjectTraits};
use std::fmt;
use std::marker::PhantomData;
use umbra_math::{Aabb, BoundedRay, Vec3};

/// Deeper than this, sets become leaves whatever the strategy says.
const MAX_DEPTH: usize = 64;
const MAX_CHILDREN: usize = 8;

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    /// Objects `indices[first..first + count]`.
    Leaf { first: u32, count: u32 },
    /// Children `nodes[first_child..first_child + count]`.
    Branch { first_child: u32, count: u32 },
}

#[derive(Debug, Clone, Copy)]
struct Node {
    aabb: Aabb,
    kind: NodeKind,
}

impl Node {
    const PLACEHOLDER: Node = Node {
        aabb: Aabb::EMPTY,
        kind: NodeKind::Leaf { first: 0, count: 0 },
    };
}

/// Bounding volume hierarchy over a slice of objects.
///
/// The tree stores indices only, so every query takes the same slice that
/// was passed to [`Tree::build`]. Objects with an empty bounding box are
/// left out. Children are flattened into one array, siblings contiguous.
pub struct Tree<T, S> {
    nodes: Vec<Node>,
    indices: Vec<u32>,
    object_count: usize,
    _marker: PhantomData<fn() -> (T, S)>,
}

impl<T: ObjectTraits, S: SplitStrategy> Default for Tree<T, S> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            indices: Vec::new(),
            object_count: 0,
            _marker: PhantomData,
        }
    }
}

impl<T, S> fmt::Debug for Tree<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("nodes", &self.nodes.len())
            .field("objects", &self.object_count)
            .finish()
    }
}

impl<T: ObjectTraits, S: SplitStrategy> Tree<T, S> {
    pub fn build(objects: &[T::Object]) -> Self {
        let mut items: Vec<BuildItem> = objects
            .iter()
            .enumerate()
            .filter_map(|(index, object)| {
                let aabb = T::object_aabb(object);
                (!aabb.is_empty()).then(|| BuildItem {
                    index: index as u32,
                    aabb,
                    centroid: aabb.centroid(),
                })
            })
            .collect();

        let mut nodes = Vec::new();
        if !items.is_empty() {
            nodes.push(Node::PLACEHOLDER);
            build_node::<S>(&mut nodes, &mut items, 0, 0, 0);
        }

        log::debug!(
            "Built {} over {} objects ({} bounded): {} nodes",
            S::NAME,
            objects.len(),
            items.len(),
            nodes.len()
        );

        Self {
            nodes,
            indices: items.iter().map(|item| item.index).collect(),
            object_count: objects.len(),
            _marker: PhantomData,
        }
    }

    /// Bounds of everything indexed.
    pub fn aabb(&self) -> Aabb {
        self.nodes.first().map_or(Aabb::EMPTY, |root| root.aabb)
    }

    /// Length of the object slice the tree was built for.
    pub fn len(&self) -> usize {
        self.object_count
    }

    pub fn is_empty(&self) -> bool {
        self.object_count == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn leaf_objects(&self, first: u32, count: u32) -> impl Iterator<Item = usize> + '_ {
        let first = first as usize;
        self.indices[first..first + count as usize]
            .iter()
            .map(|&index| index as usize)
    }

    /// Nearest object hit by `ray`, with its parameter.
    ///
    /// Children are visited front to back and the far limit shrinks with
    /// every hit, so boxes behind the best hit so far are skipped.
    pub fn intersect<'t, Q>(
        &self,
        objects: &'t [T::Object],
        ray: &BoundedRay,
        query: &mut Q,
    ) -> Option<(usize, f32)>
    where
        Q: ObjectQuery<'t, T::Object>,
    {
        debug_assert_eq!(objects.len(), self.object_count, "tree queried with another slice");
        let root = self.nodes.first()?;
        let entry = T::aabb_ray(&root.aabb, ray)?;

        let mut ray = *ray;
        let mut best = None;
        let mut stack: Vec<(u32, f32)> = Vec::with_capacity(MAX_DEPTH);
        stack.push((0, entry.min));

        while let Some((node_index, t_enter)) = stack.pop() {
            if t_enter > ray.far_limit() {
                continue;
            }
            match self.nodes[node_index as usize].kind {
                NodeKind::Leaf { first, count } => {
                    for index in self.leaf_objects(first, count) {
                        if let Some(t) = query.object_intersect(&objects[index], &ray) {
                            if t < ray.far_limit() {
                                ray.set_far_limit(t);
                                best = Some((index, t));
                            }
                        }
                    }
                }
                NodeKind::Branch { first_child, count } => {
                    let mut hits = [(0u32, 0.0f32); MAX_CHILDREN];
                    let mut n = 0;
                    for child in first_child..first_child + count {
                        if let Some(range) = T::aabb_ray(&self.nodes[child as usize].aabb, &ray) {
                            hits[n] = (child, range.min);
                            n += 1;
                        }
                    }
                    let hits = &mut hits[..n];
                    // far first, so the nearest child is popped next
                    hits.sort_unstable_by(|a, b| b.1.total_cmp(&a.1));
                    stack.extend_from_slice(hits);
                }
            }
        }
        best
    }

    /// True as soon as any object is hit by `ray`.
    pub fn intersects<'t, Q>(&self, objects: &'t [T::Object], ray: &BoundedRay, query: &mut Q) -> bool
    where
        Q: ObjectQuery<'t, T::Object>,
    {
        if self.nodes.is_empty() {
            return false;
        }
        let mut stack: Vec<u32> = Vec::with_capacity(MAX_DEPTH);
        stack.push(0);
        while let Some(node_index) = stack.pop() {
            let node = &self.nodes[node_index as usize];
            if T::aabb_ray(&node.aabb, ray).is_none() {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { first, count } => {
                    for index in self.leaf_objects(first, count) {
                        if query.object_intersects(&objects[index], ray) {
                            return true;
                        }
                    }
                }
                NodeKind::Branch { first_child, count } => {
                    stack.extend(first_child..first_child + count);
                }
            }
        }
        false
    }

    /// True if any object contains `point`.
    pub fn contains<'t, Q>(&self, objects: &'t [T::Object], point: Vec3, query: &mut Q) -> bool
    where
        Q: ObjectQuery<'t, T::Object>,
    {
        if self.nodes.is_empty() {
            return false;
        }
        let mut stack: Vec<u32> = Vec::with_capacity(MAX_DEPTH);
        stack.push(0);
        while let Some(node_index) = stack.pop() {
            let node = &self.nodes[node_index as usize];
            if !node.aabb.contains(point) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { first, count } => {
                    for index in self.leaf_objects(first, count) {
                        if query.object_contains(&objects[index], point) {
                            return true;
                        }
                    }
                }
                NodeKind::Branch { first_child, count } => {
                    stack.extend(first_child..first_child + count);
                }
            }
        }
        false
    }
}

/// Fill `nodes[node]` from `items`, which start at `offset` in the final order.
fn build_node<S: SplitStrategy>(
    nodes: &mut Vec<Node>,
    items: &mut [BuildItem],
    offset: usize,
    node: usize,
    depth: usize,
) {
    let aabb = items
        .iter()
        .fold(Aabb::EMPTY, |acc, item| Aabb::surrounding(&acc, &item.aabb));

    let groups = if items.len() <= S::MAX_LEAF_SIZE || depth >= MAX_DEPTH {
        None
    } else {
        S::split(items, &aabb)
            .map(|groups| groups.into_iter().filter(|&size| size > 0).collect::<Vec<_>>())
            .filter(|groups| groups.len() >= 2)
    };

    let Some(groups) = groups else {
        nodes[node] = Node {
            aabb,
            kind: NodeKind::Leaf {
                first: offset as u32,
                count: items.len() as u32,
            },
        };
        return;
    };

    assert!(
        groups.len() <= MAX_CHILDREN,
        "{} produced {} children",
        S::NAME,
        groups.len()
    );
    debug_assert_eq!(groups.iter().sum::<usize>(), items.len());

    let first_child = nodes.len();
    nodes.resize(first_child + groups.len(), Node::PLACEHOLDER);
    nodes[node] = Node {
        aabb,
        kind: NodeKind::Branch {
            first_child: first_child as u32,
            count: groups.len() as u32,
        },
    };

    let mut start = 0;
    for (i, size) in groups.into_iter().enumerate() {
        build_node::<S>(
            nodes,
            &mut items[start..start + size],
            offset + start,
            first_child + i,
            depth + 1,
        );
        start += size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::{MedianSplit, OctreeSplit, QuadSplit, SahSplit};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    struct BoxTraits;

    impl ObjectTraits for BoxTraits {
        type Object = Aabb;

        fn object_aabb(object: &Aabb) -> Aabb {
            *object
        }
    }

    /// Solid boxes; counts how many objects were tested.
    #[derive(Default)]
    struct BoxQuery {
        tests: usize,
    }

    impl BoxQuery {
        fn hit(ray: &BoundedRay, aabb: &Aabb) -> Option<f32> {
            let full = aabb.intersect_ray(&ray.bounded(f32::NEG_INFINITY, f32::INFINITY))?;
            [full.min, full.max].into_iter().find(|&t| ray.in_range(t))
        }
    }

    impl<'t> ObjectQuery<'t, Aabb> for BoxQuery {
        fn object_intersect(&mut self, object: &'t Aabb, ray: &BoundedRay) -> Option<f32> {
            self.tests += 1;
            Self::hit(ray, object)
        }

        fn object_intersects(&mut self, object: &'t Aabb, ray: &BoundedRay) -> bool {
            self.tests += 1;
            Self::hit(ray, object).is_some()
        }

        fn object_contains(&mut self, object: &'t Aabb, point: Vec3) -> bool {
            object.contains(point)
        }
    }

    /// Disjoint boxes, at most one per cell of a 8x8x8 grid.
    fn random_boxes(rng: &mut StdRng) -> Vec<Aabb> {
        let mut boxes = Vec::new();
        for x in 0..8 {
            for y in 0..8 {
                for z in 0..8 {
                    if rng.gen::<f32>() < 0.4 {
                        continue;
                    }
                    let cell = Vec3::new(x as f32, y as f32, z as f32) * 2.0;
                    let min = cell + Vec3::new(rng.gen(), rng.gen(), rng.gen()) * 0.8;
                    let size = Vec3::new(rng.gen(), rng.gen(), rng.gen()) * 0.9 + 0.1;
                    boxes.push(Aabb::new(min, min + size));
                }
            }
        }
        boxes
    }

    fn random_ray(rng: &mut StdRng) -> BoundedRay {
        let origin = Vec3::new(rng.gen(), rng.gen(), rng.gen()) * 24.0 - 4.0;
        let target = Vec3::new(rng.gen(), rng.gen(), rng.gen()) * 16.0;
        let far = if rng.gen_bool(0.3) { rng.gen_range(1.0..10.0) } else { f32::INFINITY };
        BoundedRay::with_limits(origin, target - origin, 0.0, far)
    }

    fn brute_force(boxes: &[Aabb], ray: &BoundedRay) -> Option<(usize, f32)> {
        boxes
            .iter()
            .enumerate()
            .filter_map(|(i, aabb)| BoxQuery::hit(ray, aabb).map(|t| (i, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    fn check_against_brute_force<S: SplitStrategy>(seed: u64) {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut rng = StdRng::seed_from_u64(seed);
        let boxes = random_boxes(&mut rng);
        let tree: Tree<BoxTraits, S> = Tree::build(&boxes);
        assert_eq!(tree.len(), boxes.len());

        for _ in 0..500 {
            let ray = random_ray(&mut rng);
            let expected = brute_force(&boxes, &ray);
            let found = tree.intersect(&boxes, &ray, &mut BoxQuery::default());
            match (expected, found) {
                (None, None) => {}
                (Some((_, te)), Some((_, tf))) => {
                    assert!((te - tf).abs() < 1e-4, "{}: {te} vs {tf}", S::NAME)
                }
                other => panic!("{}: mismatch {other:?}", S::NAME),
            }
            assert_eq!(
                tree.intersects(&boxes, &ray, &mut BoxQuery::default()),
                expected.is_some(),
                "{}",
                S::NAME
            );
        }

        for _ in 0..500 {
            let point = Vec3::new(rng.gen(), rng.gen(), rng.gen()) * 16.0;
            let expected = boxes.iter().any(|aabb| aabb.contains(point));
            assert_eq!(tree.contains(&boxes, point, &mut BoxQuery::default()), expected);
        }
    }

    #[test]
    fn test_median_tree_matches_brute_force() {
        check_against_brute_force::<MedianSplit>(11);
    }

    #[test]
    fn test_sah_tree_matches_brute_force() {
        check_against_brute_force::<SahSplit>(12);
    }

    #[test]
    fn test_octree_matches_brute_force() {
        check_against_brute_force::<OctreeSplit>(13);
    }

    #[test]
    fn test_qbvh_matches_brute_force() {
        check_against_brute_force::<QuadSplit>(14);
    }

    #[test]
    fn test_empty_tree() {
        let boxes: Vec<Aabb> = Vec::new();
        let tree: Tree<BoxTraits, MedianSplit> = Tree::build(&boxes);
        let ray = BoundedRay::new(Vec3::ZERO, Vec3::X);
        assert!(tree.is_empty());
        assert!(tree.aabb().is_empty());
        assert!(tree.intersect(&boxes, &ray, &mut BoxQuery::default()).is_none());
        assert!(!tree.intersects(&boxes, &ray, &mut BoxQuery::default()));
        assert!(!tree.contains(&boxes, Vec3::ZERO, &mut BoxQuery::default()));
    }

    #[test]
    fn test_unbounded_objects_are_skipped() {
        let boxes = vec![Aabb::EMPTY, Aabb::new(Vec3::splat(2.0), Vec3::splat(3.0))];
        let tree: Tree<BoxTraits, SahSplit> = Tree::build(&boxes);
        let ray = BoundedRay::new(Vec3::ZERO, Vec3::ONE);
        let (index, t) = tree.intersect(&boxes, &ray, &mut BoxQuery::default()).unwrap();
        assert_eq!(index, 1);
        assert!((t - 2.0 * 3f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_traversal_culls_far_objects() {
        // a row of boxes along x, the ray hits the first one
        let boxes: Vec<Aabb> = (0..256)
            .map(|i| {
                let min = Vec3::new(i as f32 * 2.0, 0.0, 0.0);
                Aabb::new(min, min + Vec3::ONE)
            })
            .collect();
        let tree: Tree<BoxTraits, MedianSplit> = Tree::build(&boxes);
        let ray = BoundedRay::new(Vec3::new(-1.0, 0.5, 0.5), Vec3::X);
        let mut query = BoxQuery::default();
        let (index, _) = tree.intersect(&boxes, &ray, &mut query).unwrap();
        assert_eq!(index, 0);
        assert!(query.tests < 16, "tested {} objects", query.tests);
    }
}
