//! Rips Complex Construction (1-skeleton)
//!
//! The Rips graph R_ε(X) has one vertex per point of X and an edge between
//! every pair at distance ≤ ε. Only connectivity matters here, so nothing
//! above dimension one is built.
//!
//! Construction runs in two phases:
//!
//! ```text
//!   PointCloud + Metric + ε ──build──> RipsGraph ──of──> Connectivity
//!                                      (vertices, edges)  (labels, representatives)
//! ```
//!
//! ## Edge search
//!
//! All vertices are sorted once by their distance to a reference vertex r.
//! By the triangle inequality |d(r,x) − d(r,y)| ≤ d(x,y), so a pair can only
//! be an edge if its reference distances differ by at most ε. Scanning a
//! sliding window over the sorted order therefore finds exactly the same
//! edges as the full pairwise check.

use super::Projection;
use crate::geometry::{FrameId, PointCloud};
use crate::metrics::{assert_bound_to, Metric};
use std::collections::{BTreeMap, VecDeque};

/// Relative slack on the window bound; absorbs rounding in the reference distances.
const WINDOW_SLACK: f64 = 1e-9;

/// Vertices and edges of a Rips complex at one scale
#[derive(Debug, Clone)]
pub struct RipsGraph {
    frame: FrameId,
    epsilon: f64,
    /// Cloud position of each vertex, ascending
    vertices: Vec<usize>,
    /// Vertex slot of each cloud position; `None` when glued away
    slot_of: Vec<Option<usize>>,
    /// Edges as slot pairs `(a, b)` with `a < b`
    edges: Vec<(usize, usize)>,
}

impl RipsGraph {
    /// Build the graph of `cloud` at scale `epsilon`.
    ///
    /// With `glue_points`, a point at distance 0 from an earlier kept point
    /// is dropped. Gluing changes which positions are vertices, so it is
    /// refused for metrics holding position-keyed state.
    pub fn build(cloud: &PointCloud, metric: &dyn Metric, epsilon: f64, glue_points: bool) -> Self {
        assert_bound_to(metric, cloud);
        assert!(
            !glue_points || metric.index_frame().is_none(),
            "points cannot be glued under an index metric"
        );

        let mut vertices: Vec<usize> = Vec::with_capacity(cloud.len());
        for p in 0..cloud.len() {
            let glued = glue_points
                && vertices.iter().any(|&q| {
                    metric.distance(cloud.point(q), cloud.point(p), Some(q), Some(p)) == 0.0
                });
            if !glued {
                vertices.push(p);
            }
        }

        let mut slot_of = vec![None; cloud.len()];
        for (slot, &p) in vertices.iter().enumerate() {
            slot_of[p] = Some(slot);
        }

        let edges = Self::find_edges(cloud, metric, epsilon, &vertices);

        Self {
            frame: cloud.frame(),
            epsilon,
            vertices,
            slot_of,
            edges,
        }
    }

    fn find_edges(cloud: &PointCloud, metric: &dyn Metric, epsilon: f64, vertices: &[usize]) -> Vec<(usize, usize)> {
        let mut edges = Vec::new();
        let Some(&reference) = vertices.first() else {
            return edges;
        };

        let ref_point = cloud.point(reference);
        let mut order: Vec<(usize, f64)> = vertices
            .iter()
            .enumerate()
            .map(|(slot, &p)| {
                let d = metric.distance(ref_point, cloud.point(p), Some(reference), Some(p));
                (slot, d)
            })
            .collect();
        order.sort_by(|a, b| a.1.total_cmp(&b.1));

        let window = epsilon + WINDOW_SLACK * epsilon.abs().max(1.0);
        for (k, &(a, da)) in order.iter().enumerate() {
            for &(b, db) in &order[k + 1..] {
                if db - da > window {
                    break;
                }
                let (pa, pb) = (vertices[a], vertices[b]);
                if metric.distance(cloud.point(pa), cloud.point(pb), Some(pa), Some(pb)) <= epsilon {
                    edges.push((a.min(b), a.max(b)));
                }
            }
        }
        edges.sort_unstable();
        edges
    }

    pub fn frame(&self) -> FrameId {
        self.frame
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Cloud positions of the vertices
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Edges as pairs of cloud positions
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges.iter().map(|&(a, b)| (self.vertices[a], self.vertices[b]))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Vertex slot of a cloud position, `None` if it was glued away
    pub fn slot_of(&self, position: usize) -> Option<usize> {
        assert!(
            position < self.slot_of.len(),
            "position {} out of range for complex over {} points",
            position,
            self.slot_of.len()
        );
        self.slot_of[position]
    }
}

/// Connected-component labelling of a [`RipsGraph`]
#[derive(Debug, Clone)]
pub struct Connectivity {
    /// Component of each vertex slot
    component: Vec<usize>,
    /// First-visited cloud position of each component
    representatives: Vec<usize>,
}

impl Connectivity {
    /// Breadth-first labelling in vertex order over forward and reverse adjacency
    pub fn of(graph: &RipsGraph) -> Self {
        let n = graph.vertex_count();
        let mut forward: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut reverse: Vec<Vec<usize>> = vec![Vec::new(); n];
        for &(a, b) in &graph.edges {
            forward[a].push(b);
            reverse[b].push(a);
        }

        let mut component: Vec<Option<usize>> = vec![None; n];
        let mut representatives = Vec::new();
        let mut queue = VecDeque::new();

        for start in 0..n {
            if component[start].is_some() {
                continue;
            }
            let label = representatives.len();
            representatives.push(graph.vertices[start]);
            component[start] = Some(label);
            queue.push_back(start);

            while let Some(v) = queue.pop_front() {
                for &w in forward[v].iter().chain(reverse[v].iter()) {
                    if component[w].is_none() {
                        component[w] = Some(label);
                        queue.push_back(w);
                    }
                }
            }
        }

        Self {
            component: component.into_iter().flatten().collect(),
            representatives,
        }
    }

    pub fn component_count(&self) -> usize {
        self.representatives.len()
    }

    pub fn representatives(&self) -> &[usize] {
        &self.representatives
    }
}

/// A Rips graph together with its connected components
#[derive(Debug, Clone)]
pub struct RipsComplex {
    graph: RipsGraph,
    connectivity: Connectivity,
}

impl RipsComplex {
    pub fn new(cloud: &PointCloud, metric: &dyn Metric, epsilon: f64, glue_points: bool) -> Self {
        let graph = RipsGraph::build(cloud, metric, epsilon, glue_points);
        let connectivity = Connectivity::of(&graph);
        Self { graph, connectivity }
    }

    pub fn graph(&self) -> &RipsGraph {
        &self.graph
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    pub fn component_count(&self) -> usize {
        self.connectivity.component_count()
    }

    /// Component containing the vertex at cloud `position`
    pub fn component_of(&self, position: usize) -> usize {
        let slot = self
            .graph
            .slot_of(position)
            .unwrap_or_else(|| panic!("position {} was glued away", position));
        self.connectivity.component[slot]
    }

    /// Cloud position representing `component`
    pub fn representative_of(&self, component: usize) -> usize {
        self.connectivity.representatives[component]
    }

    /// The map induced on components by the identity of positions: each
    /// component representative `v` of `self` goes to the representative of
    /// the component holding `v` in `target`.
    pub fn projection_map(&self, target: &RipsComplex) -> Projection {
        assert_eq!(
            self.graph.frame, target.graph.frame,
            "projection between complexes over unrelated point clouds"
        );
        self.connectivity
            .representatives
            .iter()
            .map(|&v| (v, target.representative_of(target.component_of(v))))
            .collect::<BTreeMap<_, _>>()
    }
}
