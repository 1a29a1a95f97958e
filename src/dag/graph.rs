// src/dag/graph.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use super::LinkError;
use super::paths::display_name;

/// Topological order of `edges` over nodes `0..count` (sources first).
///
/// Edge direction: `from -> to`. For includes that is parent -> child, so the
/// order visits every parent before its children.
pub fn ordered(
    count: usize,
    edges: impl IntoIterator<Item = (usize, usize)>,
    name_of: impl Fn(usize) -> String,
) -> Result<Vec<usize>, LinkError> {
    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();

    for node in 0..count {
        graph.add_node(node);
    }
    for (from, to) in edges {
        graph.add_edge(from, to, ());
    }

    // A topological sort will fail if there is a cycle.
    toposort(&graph, None).map_err(|cycle| {
        let name = name_of(cycle.node_id());
        LinkError::Cycle(display_name(&name).to_string())
    })
}
