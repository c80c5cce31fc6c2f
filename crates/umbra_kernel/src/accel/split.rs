//! Build strategies deciding how a set of objects is divided into children.

use umbra_math::{Aabb, Vec3};

/// One object during construction.
#[derive(Debug, Clone, Copy)]
pub struct BuildItem {
    /// Position in the object slice the tree indexes.
    pub index: u32,
    pub aabb: Aabb,
    pub centroid: Vec3,
}

/// Partitioning rule of a tree.
pub trait SplitStrategy {
    /// Name used in build statistics.
    const NAME: &'static str;

    /// Sets at most this large always become a leaf.
    const MAX_LEAF_SIZE: usize;

    /// Reorder `items` into consecutive groups and return the group sizes,
    /// or `None` to keep them together in a leaf. `bounds` surrounds all
    /// items. At most eight groups.
    fn split(items: &mut [BuildItem], bounds: &Aabb) -> Option<Vec<usize>>;
}

fn centroid_bounds(items: &[BuildItem]) -> Aabb {
    Aabb::from_iter_points(items.iter().map(|item| item.centroid))
}

/// Move items matching `predicate` to the front, return how many there are.
fn partition_by(items: &mut [BuildItem], predicate: impl Fn(&BuildItem) -> bool) -> usize {
    let mut first = 0;
    for i in 0..items.len() {
        if predicate(&items[i]) {
            items.swap(first, i);
            first += 1;
        }
    }
    first
}

/// Binary split at the object median along the widest centroid axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianSplit;

impl SplitStrategy for MedianSplit {
    const NAME: &'static str = "AABB tree";
    const MAX_LEAF_SIZE: usize = 2;

    fn split(items: &mut [BuildItem], _bounds: &Aabb) -> Option<Vec<usize>> {
        let centroids = centroid_bounds(items);
        let axis = centroids.longest_axis();
        if centroids.size()[axis] <= 0.0 {
            return None;
        }
        let mid = items.len() / 2;
        items.select_nth_unstable_by(mid, |a, b| a.centroid[axis].total_cmp(&b.centroid[axis]));
        Some(vec![mid, items.len() - mid])
    }
}

const SAH_BINS: usize = 12;
/// Cost of visiting a node, relative to testing one object.
const SAH_TRAVERSAL_COST: f32 = 0.5;
/// SAH may decide to stop splitting below this size.
const SAH_MAX_LEAF_SIZE: usize = 8;

struct SahPlan {
    axis: usize,
    low: f32,
    scale: f32,
    last_left_bin: usize,
    /// Sum over both sides of surface area times object count.
    cost: f32,
}

impl SahPlan {
    fn bin(&self, item: &BuildItem) -> usize {
        let offset = (item.centroid[self.axis] - self.low) * self.scale;
        (offset as usize).min(SAH_BINS - 1)
    }

    /// Best binned split along the widest centroid axis.
    fn find(items: &[BuildItem]) -> Option<Self> {
        let centroids = centroid_bounds(items);
        let axis = centroids.longest_axis();
        let extent = centroids.size()[axis];
        if extent <= 0.0 {
            return None;
        }
        let mut plan = SahPlan {
            axis,
            low: centroids.min[axis],
            scale: SAH_BINS as f32 / extent,
            last_left_bin: 0,
            cost: f32::INFINITY,
        };

        let mut counts = [0usize; SAH_BINS];
        let mut boxes = [Aabb::EMPTY; SAH_BINS];
        for item in items {
            let bin = plan.bin(item);
            counts[bin] += 1;
            boxes[bin] = Aabb::surrounding(&boxes[bin], &item.aabb);
        }

        // right_cost[i]: cost of everything in bins i+1.. as one child
        let mut right_cost = [0.0f32; SAH_BINS];
        let mut right_box = Aabb::EMPTY;
        let mut right_count = 0;
        for i in (1..SAH_BINS).rev() {
            right_box = Aabb::surrounding(&right_box, &boxes[i]);
            right_count += counts[i];
            right_cost[i - 1] = if right_count > 0 {
                right_count as f32 * right_box.surface_area()
            } else {
                f32::INFINITY
            };
        }

        let mut left_box = Aabb::EMPTY;
        let mut left_count = 0;
        for i in 0..SAH_BINS - 1 {
            left_box = Aabb::surrounding(&left_box, &boxes[i]);
            left_count += counts[i];
            if left_count == 0 {
                continue;
            }
            let cost = left_count as f32 * left_box.surface_area() + right_cost[i];
            if cost < plan.cost {
                plan.cost = cost;
                plan.last_left_bin = i;
            }
        }
        plan.cost.is_finite().then_some(plan)
    }

    fn apply(&self, items: &mut [BuildItem]) -> usize {
        partition_by(items, |item| self.bin(item) <= self.last_left_bin)
    }
}

/// Binary split minimizing the surface area heuristic over binned centroids.
#[derive(Debug, Clone, Copy, Default)]
pub struct SahSplit;

impl SplitStrategy for SahSplit {
    const NAME: &'static str = "AABP tree";
    const MAX_LEAF_SIZE: usize = 1;

    fn split(items: &mut [BuildItem], bounds: &Aabb) -> Option<Vec<usize>> {
        let plan = SahPlan::find(items)?;
        let area = bounds.surface_area();
        let split_cost = SAH_TRAVERSAL_COST * area + plan.cost;
        let leaf_cost = items.len() as f32 * area;
        if split_cost >= leaf_cost && items.len() <= SAH_MAX_LEAF_SIZE {
            return None;
        }
        let left = plan.apply(items);
        Some(vec![left, items.len() - left])
    }
}

/// Up to eight children, one per octant around the centre of the centroids.
#[derive(Debug, Clone, Copy, Default)]
pub struct OctreeSplit;

impl SplitStrategy for OctreeSplit {
    const NAME: &'static str = "octree";
    const MAX_LEAF_SIZE: usize = 4;

    fn split(items: &mut [BuildItem], _bounds: &Aabb) -> Option<Vec<usize>> {
        let centroids = centroid_bounds(items);
        if centroids.size().max_element() <= 0.0 {
            return None;
        }
        let center = centroids.centroid();
        let octant = |item: &BuildItem| {
            let c = item.centroid;
            (c.x > center.x) as usize | ((c.y > center.y) as usize) << 1 | ((c.z > center.z) as usize) << 2
        };

        items.sort_unstable_by_key(|item| octant(item));
        let mut counts = [0usize; 8];
        for item in items.iter() {
            counts[octant(item)] += 1;
        }
        Some(counts.into_iter().filter(|&count| count > 0).collect())
    }
}

/// Four-wide nodes: a SAH split of the set, then of each half.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadSplit;

impl SplitStrategy for QuadSplit {
    const NAME: &'static str = "QBVH";
    const MAX_LEAF_SIZE: usize = 4;

    fn split(items: &mut [BuildItem], _bounds: &Aabb) -> Option<Vec<usize>> {
        let plan = SahPlan::find(items)?;
        let mid = plan.apply(items);
        let (left, right) = items.split_at_mut(mid);

        let mut groups = Vec::with_capacity(4);
        for half in [left, right] {
            match SahPlan::find(half) {
                Some(plan) if half.len() > 1 => {
                    let first = plan.apply(half);
                    groups.push(first);
                    groups.push(half.len() - first);
                }
                _ => groups.push(half.len()),
            }
        }
        Some(groups)
    }
}
