//! Shortest-path search over index-addressed adjacency lists.
//!
//! Both the campus router and the indoor planner map their string ids to
//! dense indices and run one of these searches. Results are deterministic:
//! neighbours are relaxed in adjacency order and the open set breaks cost
//! ties by push order, so the first path discovered at a given cost wins.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};

/// Adjacency list: `adjacency[node]` holds `(neighbor, weight)` pairs.
pub type Adjacency = [Vec<(usize, f64)>];

#[derive(Debug, Clone, PartialEq)]
pub struct PathSearch {
    pub nodes: Vec<usize>,
    pub cost: f64,
    pub settled: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFailure {
    Unreachable,
    LimitExceeded { limit: usize },
}

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    cost: FloatOrd,
    seq: u64,
    node: usize,
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .cmp(&other.cost)
            .then_with(|| self.seq.cmp(&other.seq))
            .then_with(|| self.node.cmp(&other.node))
    }
}

/// Dijkstra from `start` to `goal`. Weights must be non-negative.
///
/// Fails with `LimitExceeded` once more than `max_settled` nodes have been
/// settled without reaching the goal.
pub fn dijkstra(
    adjacency: &Adjacency,
    start: usize,
    goal: usize,
    max_settled: usize,
) -> Result<PathSearch, SearchFailure> {
    let n = adjacency.len();
    if start >= n || goal >= n {
        return Err(SearchFailure::Unreachable);
    }

    let mut dist = vec![f64::INFINITY; n];
    let mut came_from: Vec<Option<usize>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut open_set: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();
    let mut seq = 0u64;
    let mut settled_count = 0usize;

    dist[start] = 0.0;
    open_set.push(Reverse(OpenNode {
        cost: FloatOrd(0.0),
        seq,
        node: start,
    }));

    while let Some(Reverse(current)) = open_set.pop() {
        let node = current.node;
        if settled[node] || current.cost.0 > dist[node] {
            continue;
        }

        settled[node] = true;
        settled_count += 1;
        if node == goal {
            return Ok(PathSearch {
                nodes: reconstruct(&came_from, goal),
                cost: dist[goal],
                settled: settled_count,
            });
        }
        if settled_count >= max_settled {
            return Err(SearchFailure::LimitExceeded { limit: max_settled });
        }

        for &(next, weight) in &adjacency[node] {
            if settled[next] {
                continue;
            }
            let tentative = dist[node] + weight;
            if tentative < dist[next] {
                dist[next] = tentative;
                came_from[next] = Some(node);
                seq += 1;
                open_set.push(Reverse(OpenNode {
                    cost: FloatOrd(tentative),
                    seq,
                    node: next,
                }));
            }
        }
    }

    Err(SearchFailure::Unreachable)
}

/// Breadth-first search for graphs where every edge has unit weight.
///
/// The returned cost is the number of edges on the path.
pub fn bfs(
    adjacency: &Adjacency,
    start: usize,
    goal: usize,
    max_settled: usize,
) -> Result<PathSearch, SearchFailure> {
    let n = adjacency.len();
    if start >= n || goal >= n {
        return Err(SearchFailure::Unreachable);
    }

    let mut came_from: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut queue = VecDeque::new();
    let mut settled_count = 0usize;

    visited[start] = true;
    queue.push_back(start);

    while let Some(node) = queue.pop_front() {
        settled_count += 1;
        if node == goal {
            let nodes = reconstruct(&came_from, goal);
            let cost = nodes.len().saturating_sub(1) as f64;
            return Ok(PathSearch {
                nodes,
                cost,
                settled: settled_count,
            });
        }
        if settled_count >= max_settled {
            return Err(SearchFailure::LimitExceeded { limit: max_settled });
        }

        for &(next, _) in &adjacency[node] {
            if !visited[next] {
                visited[next] = true;
                came_from[next] = Some(node);
                queue.push_back(next);
            }
        }
    }

    Err(SearchFailure::Unreachable)
}

fn reconstruct(came_from: &[Option<usize>], goal: usize) -> Vec<usize> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(prev) = came_from[current] {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Connected components, each listed in ascending index order.
pub fn connected_components(adjacency: &Adjacency) -> Vec<Vec<usize>> {
    let n = adjacency.len();
    let mut component_of = vec![usize::MAX; n];
    let mut components = Vec::new();

    for root in 0..n {
        if component_of[root] != usize::MAX {
            continue;
        }
        let id = components.len();
        let mut members = vec![root];
        let mut stack = vec![root];
        component_of[root] = id;
        while let Some(node) = stack.pop() {
            for &(next, _) in &adjacency[node] {
                if component_of[next] == usize::MAX {
                    component_of[next] = id;
                    members.push(next);
                    stack.push(next);
                }
            }
        }
        members.sort_unstable();
        components.push(members);
    }

    components
}
