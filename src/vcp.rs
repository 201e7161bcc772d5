//! Graph vertex coloring.
//!
//! Every node receives one of `k` colors; the objective is the number of
//! edges whose endpoints share a color. Recoloring a node is evaluated by
//! inspecting its incident edges only, and the model keeps a per-node
//! conflict count so that conflict-aware neighborhoods can be refreshed
//! without scanning the edge list.
//!
//! # Reference
//!
//! Hertz, A. & de Werra, D. (1987). "Using tabu search techniques for
//! graph coloring", *Computing* 39, 345-351.

use std::fmt;
use std::sync::Arc;

use rand::Rng;

use crate::error::{ModelError, SearchError};
use crate::ils::{IlsConfig, IlsResult, IteratedSearch};
use crate::local::{LocalSearch, LocalSearchConfig};
use crate::model::{Cost, Model, Move};
use crate::neighborhood::{MoveArena, Neighborhood};
use crate::observer::SearchObserver;
use crate::random::create_rng;
use crate::recorder::BestOf;

#[derive(Debug)]
struct Graph {
    adjacency: Vec<Vec<usize>>,
    edges: Vec<(usize, usize)>,
}

/// Assignment of color `to` to `node`, which currently has color `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Recolor {
    /// Node to recolor.
    pub node: usize,
    /// Color of the node when the move was generated.
    pub from: usize,
    /// New color.
    pub to: usize,
}

impl Recolor {
    /// Creates a recoloring move.
    pub fn new(node: usize, from: usize, to: usize) -> Self {
        Self { node, from, to }
    }
}

impl Move for Recolor {
    /// `(node, color)`: the assignment the move makes.
    type Key = (usize, usize);

    fn key(&self) -> (usize, usize) {
        (self.node, self.to)
    }

    fn inverse(&self) -> Self {
        Recolor {
            node: self.node,
            from: self.to,
            to: self.from,
        }
    }
}

/// A coloring of a graph with an incrementally maintained conflict count.
#[derive(Debug, Clone)]
pub struct VcpModel {
    graph: Arc<Graph>,
    colors: usize,
    coloring: Vec<usize>,
    conflicts: Vec<usize>,
    cost: Cost,
}

impl VcpModel {
    /// Creates a model with every node colored `0`.
    ///
    /// Parallel edges are kept and counted once each.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_mets::model::Model;
    /// use u_mets::vcp::VcpModel;
    ///
    /// let triangle = VcpModel::new(3, &[(0, 1), (1, 2), (0, 2)], 2).unwrap();
    /// assert_eq!(triangle.objective(), 3);
    /// ```
    pub fn new(nodes: usize, edges: &[(usize, usize)], colors: usize) -> Result<Self, ModelError> {
        if colors == 0 {
            return Err(ModelError::NoColors);
        }
        let mut adjacency = vec![Vec::new(); nodes];
        for &(u, v) in edges {
            if u >= nodes || v >= nodes {
                return Err(ModelError::EdgeOutOfRange {
                    edge: (u, v),
                    nodes,
                });
            }
            if u == v {
                return Err(ModelError::SelfLoop(u));
            }
            adjacency[u].push(v);
            adjacency[v].push(u);
        }
        let mut model = Self {
            graph: Arc::new(Graph {
                adjacency,
                edges: edges.to_vec(),
            }),
            colors,
            coloring: vec![0; nodes],
            conflicts: vec![0; nodes],
            cost: 0,
        };
        model.rebuild();
        Ok(model)
    }

    /// Replaces the coloring, recomputing conflicts.
    pub fn with_coloring(mut self, coloring: Vec<usize>) -> Result<Self, ModelError> {
        if coloring.len() != self.coloring.len() {
            return Err(ModelError::InvalidState(format!(
                "coloring has {} entries for {} nodes",
                coloring.len(),
                self.coloring.len()
            )));
        }
        if let Some(&c) = coloring.iter().find(|&&c| c >= self.colors) {
            return Err(ModelError::InvalidState(format!(
                "color {c} exceeds the budget of {}",
                self.colors
            )));
        }
        self.coloring = coloring;
        self.rebuild();
        Ok(self)
    }

    /// Number of colors available.
    pub fn colors(&self) -> usize {
        self.colors
    }

    /// Number of nodes.
    pub fn nodes(&self) -> usize {
        self.coloring.len()
    }

    /// Color of every node.
    pub fn coloring(&self) -> &[usize] {
        &self.coloring
    }

    /// Color of `node`.
    pub fn color(&self, node: usize) -> usize {
        self.coloring[node]
    }

    /// Number of conflicting edges incident to `node`.
    pub fn node_conflicts(&self, node: usize) -> usize {
        self.conflicts[node]
    }

    /// The conflicting edges, in input order.
    pub fn conflicts(&self) -> Vec<(usize, usize)> {
        self.graph
            .edges
            .iter()
            .copied()
            .filter(|&(u, v)| self.coloring[u] == self.coloring[v])
            .collect()
    }

    /// Builds the move recoloring `node` to `color` from its current color.
    pub fn recolor(&self, node: usize, color: usize) -> Recolor {
        Recolor::new(node, self.coloring[node], color)
    }

    fn rebuild(&mut self) {
        self.conflicts.iter_mut().for_each(|c| *c = 0);
        let mut cost = 0;
        for &(u, v) in &self.graph.edges {
            if self.coloring[u] == self.coloring[v] {
                self.conflicts[u] += 1;
                self.conflicts[v] += 1;
                cost += 1;
            }
        }
        self.cost = cost;
    }

    fn delta(&self, mv: &Recolor) -> Cost {
        debug_assert_eq!(self.coloring[mv.node], mv.from, "stale recolor {mv:?}");
        if mv.from == mv.to {
            return 0;
        }
        let mut delta = 0;
        for &u in &self.graph.adjacency[mv.node] {
            let c = self.coloring[u];
            if c == mv.from {
                delta -= 1;
            } else if c == mv.to {
                delta += 1;
            }
        }
        delta
    }
}

impl Model for VcpModel {
    type Move = Recolor;

    fn size(&self) -> usize {
        self.coloring.len()
    }

    fn objective(&self) -> Cost {
        self.cost
    }

    fn evaluate(&self, mv: &Recolor) -> Cost {
        self.cost + self.delta(mv)
    }

    fn apply(&mut self, mv: &Recolor) {
        debug_assert_eq!(self.coloring[mv.node], mv.from, "stale recolor {mv:?}");
        if mv.from == mv.to {
            return;
        }
        let v = mv.node;
        for &u in &self.graph.adjacency[v] {
            let c = self.coloring[u];
            if c == mv.from {
                self.conflicts[u] -= 1;
                self.conflicts[v] -= 1;
                self.cost -= 1;
            } else if c == mv.to {
                self.conflicts[u] += 1;
                self.conflicts[v] += 1;
                self.cost += 1;
            }
        }
        self.coloring[v] = mv.to;
    }

    fn recompute(&self) -> Cost {
        self.graph
            .edges
            .iter()
            .filter(|&&(u, v)| self.coloring[u] == self.coloring[v])
            .count() as Cost
    }

    fn randomize<R: Rng>(&mut self, rng: &mut R) {
        let k = self.colors;
        self.coloring
            .iter_mut()
            .for_each(|c| *c = rng.random_range(0..k));
        self.rebuild();
    }

    fn random_move<R: Rng>(&self, rng: &mut R) -> Option<Recolor> {
        if self.colors < 2 || self.coloring.is_empty() {
            return None;
        }
        let node = rng.random_range(0..self.coloring.len());
        Some(self.recolor(node, other_color(self.coloring[node], self.colors, rng)))
    }
}

/// Uniform color in `0..colors` different from `current`.
fn other_color<R: Rng>(current: usize, colors: usize, rng: &mut R) -> usize {
    let c = rng.random_range(0..colors - 1);
    if c >= current {
        c + 1
    } else {
        c
    }
}

/// Renders the per-node color list.
impl fmt::Display for VcpModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, c) in self.coloring.iter().enumerate() {
            if k > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Candidate policy of a [`RecolorNeighborhood`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecolorPolicy {
    /// Every node with every other color.
    Full,
    /// Only nodes with at least one conflict, with every other color.
    Conflicting,
    /// Random recolorings plus random pairs of recolorings on distinct nodes.
    Sampled {
        /// Number of single recolorings.
        simple: usize,
        /// Number of compound double recolorings.
        double: usize,
    },
}

/// Recoloring neighborhood.
#[derive(Debug, Clone)]
pub struct RecolorNeighborhood {
    policy: RecolorPolicy,
    arena: MoveArena<Recolor>,
}

impl RecolorNeighborhood {
    /// Creates a neighborhood with the given policy.
    pub fn new(policy: RecolorPolicy) -> Self {
        Self {
            policy,
            arena: MoveArena::new(),
        }
    }

    /// Every (node, color) reassignment.
    pub fn full() -> Self {
        Self::new(RecolorPolicy::Full)
    }

    /// Reassignments of conflicting nodes only.
    pub fn conflicting() -> Self {
        Self::new(RecolorPolicy::Conflicting)
    }

    /// Random single and double reassignments.
    pub fn sampled(simple: usize, double: usize) -> Self {
        Self::new(RecolorPolicy::Sampled { simple, double })
    }

    /// The candidate policy.
    pub fn policy(&self) -> RecolorPolicy {
        self.policy
    }

    fn push_all_colors(&mut self, model: &VcpModel, node: usize) {
        let current = model.coloring[node];
        for c in (0..model.colors).filter(|&c| c != current) {
            self.arena.push(Recolor::new(node, current, c));
        }
    }
}

impl Neighborhood<VcpModel> for RecolorNeighborhood {
    fn refresh<R: Rng>(&mut self, model: &VcpModel, rng: &mut R) {
        self.arena.clear();
        let (n, k) = (model.nodes(), model.colors);
        if n == 0 || k < 2 {
            return;
        }
        match self.policy {
            RecolorPolicy::Full => {
                for v in 0..n {
                    self.push_all_colors(model, v);
                }
            }
            RecolorPolicy::Conflicting => {
                for v in 0..n {
                    if model.conflicts[v] > 0 {
                        self.push_all_colors(model, v);
                    }
                }
            }
            RecolorPolicy::Sampled { simple, double } => {
                for _ in 0..simple {
                    if let Some(mv) = model.random_move(rng) {
                        self.arena.push(mv);
                    }
                }
                if n < 2 {
                    return;
                }
                for _ in 0..double {
                    let first = model.random_move(rng);
                    let second = loop {
                        let mv = model.random_move(rng);
                        if mv.map(|m| m.node) != first.map(|m| m.node) {
                            break mv;
                        }
                    };
                    if let (Some(a), Some(b)) = (first, second) {
                        self.arena.push_compound(&[a, b]);
                    }
                }
            }
        }
    }

    fn arena(&self) -> &MoveArena<Recolor> {
        &self.arena
    }
}

/// Two-stage coloring driver: iterated tabu search over a sampled
/// recoloring neighborhood, then a conflict-aware descent on the
/// incumbent.
///
/// The sampled neighborhood draws `n * k / 4` single and `n * k / 8`
/// double recolorings per refresh.
pub fn solve<O: SearchObserver>(
    model: VcpModel,
    config: &IlsConfig,
    observer: &mut O,
) -> Result<IlsResult<VcpModel>, SearchError> {
    let (n, k) = (model.nodes(), model.colors());
    let mut sampled = RecolorNeighborhood::sampled((n * k / 4).max(1), n * k / 8);
    let mut result = IteratedSearch::run(model, &mut sampled, config, observer)?;
    if result.best_cost == 0 {
        return Ok(result);
    }

    let mut polished = result.best.clone();
    let mut recorder = BestOf::new(&polished);
    let mut conflicting = RecolorNeighborhood::conflicting();
    let mut rng = create_rng(config.seed.unwrap_or(42).wrapping_add(1));
    let ls_config = LocalSearchConfig::default().with_verify_every(config.phase.verify_every());
    LocalSearch::new(&ls_config, &mut conflicting, observer).search(
        &mut polished,
        &mut recorder,
        &mut rng,
    )?;
    if recorder.cost() < result.best_cost {
        log::debug!(
            "descent polish improved coloring {} -> {}",
            result.best_cost,
            recorder.cost()
        );
        result.best_cost = recorder.cost();
        result.best = recorder.into_best();
        result.cost_history.push(result.best_cost);
    }
    Ok(result)
}
