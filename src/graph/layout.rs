//! Top-down tree layout.
//!
//! [`compute_layout`] is a pure function of `(nodes, edges)`: it builds one
//! layout tree per root, sizes every subtree bottom-up, then places children
//! left-to-right under their parent and centres the parent over them.
//! Separate root trees are laid out side by side.
//!
//! Each node is placed at most once, under its canonical parent (the first
//! edge that targets it, in insertion order). That keeps multi-parent and
//! cyclic input deterministic instead of duplicating or recursing forever.

use std::collections::{HashMap, HashSet};

use super::types::{GraphEdge, GraphNode, Position};

pub const NODE_WIDTH: f64 = 220.0;
pub const NODE_HEIGHT: f64 = 120.0;
pub const H_GAP: f64 = 60.0;
pub const V_GAP: f64 = 80.0;

/// Node id → computed top-left position.
pub type PositionMap = HashMap<String, Position>;

struct LayoutTree<'a> {
    id: &'a str,
    children: Vec<LayoutTree<'a>>,
    width: f64,
    x: f64,
    y: f64,
}

/// Compute a position for every node reachable from a root.
///
/// Nodes that no root reaches (only possible with cycles) are left out of the
/// map; callers keep their existing position.
pub fn compute_layout(nodes: &[GraphNode], edges: &[GraphEdge]) -> PositionMap {
    let mut positions = PositionMap::new();
    match nodes {
        [] => return positions,
        [only] => {
            positions.insert(only.id.clone(), Position::ORIGIN);
            return positions;
        }
        _ => {}
    }

    let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    // parent → children, keeping only each child's first incoming edge.
    let mut child_map: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut has_parent: HashSet<&str> = HashSet::new();
    for edge in edges {
        if has_parent.insert(edge.target.as_str()) {
            child_map
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        }
    }

    let mut root_ids: Vec<&str> = nodes
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| !has_parent.contains(id))
        .collect();
    if root_ids.is_empty() {
        root_ids.push(nodes[0].id.as_str());
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut offset_x = 0.0;
    for root_id in root_ids {
        let Some(mut tree) = build_tree(root_id, 0, &child_map, &known, &mut visited) else {
            continue;
        };
        calc_width(&mut tree);
        position_tree(&mut tree, offset_x);
        flatten(&tree, &mut positions);
        offset_x += tree.width + H_GAP * 2.0;
    }

    positions
}

/// Return `nodes` with layout positions applied. Unplaced nodes keep theirs.
pub fn apply_layout(nodes: &[GraphNode], edges: &[GraphEdge]) -> Vec<GraphNode> {
    let positions = compute_layout(nodes, edges);
    nodes
        .iter()
        .map(|n| {
            let mut n = n.clone();
            if let Some(p) = positions.get(&n.id) {
                n.position = *p;
            }
            n
        })
        .collect()
}

fn build_tree<'a>(
    id: &'a str,
    depth: usize,
    child_map: &HashMap<&'a str, Vec<&'a str>>,
    known: &HashSet<&'a str>,
    visited: &mut HashSet<&'a str>,
) -> Option<LayoutTree<'a>> {
    if !visited.insert(id) {
        return None;
    }
    let children = child_map
        .get(id)
        .map(|ids| {
            ids.iter()
                .filter(|cid| known.contains(*cid))
                .filter_map(|cid| build_tree(*cid, depth + 1, child_map, known, visited))
                .collect()
        })
        .unwrap_or_default();

    Some(LayoutTree {
        id,
        children,
        width: 0.0,
        x: 0.0,
        y: depth as f64 * (NODE_HEIGHT + V_GAP),
    })
}

fn calc_width(tree: &mut LayoutTree<'_>) -> f64 {
    if tree.children.is_empty() {
        tree.width = NODE_WIDTH;
        return tree.width;
    }
    let gaps = (tree.children.len() - 1) as f64 * H_GAP;
    let total: f64 = tree.children.iter_mut().map(calc_width).sum::<f64>() + gaps;
    tree.width = total.max(NODE_WIDTH);
    tree.width
}

fn position_tree(tree: &mut LayoutTree<'_>, left_x: f64) {
    if tree.children.is_empty() {
        tree.x = left_x + tree.width / 2.0 - NODE_WIDTH / 2.0;
        return;
    }

    let mut current_x = left_x;
    for child in &mut tree.children {
        position_tree(child, current_x);
        current_x += child.width + H_GAP;
    }

    // Non-empty checked above.
    let first = tree.children.first().map_or(left_x, |c| c.x);
    let last = tree.children.last().map_or(left_x, |c| c.x);
    tree.x = (first + last) / 2.0;
}

fn flatten(tree: &LayoutTree<'_>, positions: &mut PositionMap) {
    positions.insert(tree.id.to_string(), Position::new(tree.x, tree.y));
    for child in &tree.children {
        flatten(child, positions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{NodeStatus, RelationType};

    const ROW: f64 = NODE_HEIGHT + V_GAP;

    fn node(id: &str) -> GraphNode {
        GraphNode {
            id: id.into(),
            label: id.into(),
            description: String::new(),
            status: NodeStatus::Accepted,
            reason_type: None,
            reason_text: None,
            parent_id: None,
            position: Position::new(-1.0, -1.0),
            created_at: String::new(),
            resources: None,
        }
    }

    fn edge(source: &str, target: &str) -> GraphEdge {
        GraphEdge {
            id: format!("{source}->{target}"),
            source: source.into(),
            target: target.into(),
            label: "related to".into(),
            relation_type: RelationType::RelatedTo,
        }
    }

    #[test]
    fn empty_input_gives_empty_map() {
        assert!(compute_layout(&[], &[]).is_empty());
    }

    #[test]
    fn single_node_sits_at_origin() {
        let pos = compute_layout(&[node("a")], &[]);
        assert_eq!(pos["a"], Position::ORIGIN);
    }

    #[test]
    fn two_children_are_spread_and_parent_centred() {
        let nodes = [node("p"), node("a"), node("b")];
        let edges = [edge("p", "a"), edge("p", "b")];
        let pos = compute_layout(&nodes, &edges);

        assert_eq!(pos["a"], Position::new(0.0, ROW));
        assert_eq!(pos["b"], Position::new(NODE_WIDTH + H_GAP, ROW));
        assert_eq!(pos["p"], Position::new((NODE_WIDTH + H_GAP) / 2.0, 0.0));
    }

    #[test]
    fn single_child_chain_keeps_unit_width() {
        let nodes = [node("a"), node("b"), node("c"), node("d")];
        let edges = [edge("a", "b"), edge("b", "c"), edge("c", "d")];

        let child_map: HashMap<&str, Vec<&str>> =
            HashMap::from([("a", vec!["b"]), ("b", vec!["c"]), ("c", vec!["d"])]);
        let known: HashSet<&str> = ["a", "b", "c", "d"].into_iter().collect();
        let mut visited = HashSet::new();
        let mut tree = build_tree("a", 0, &child_map, &known, &mut visited).unwrap();
        assert_eq!(calc_width(&mut tree), NODE_WIDTH);
        assert_eq!(tree.children[0].width, NODE_WIDTH);
        assert_eq!(tree.children[0].children[0].children[0].width, NODE_WIDTH);

        let pos = compute_layout(&nodes, &edges);
        for (depth, id) in ["a", "b", "c", "d"].iter().enumerate() {
            assert_eq!(pos[*id], Position::new(0.0, depth as f64 * ROW));
        }
    }

    #[test]
    fn second_root_starts_after_first_tree_plus_double_gap() {
        // A is the root, B has no incoming edge, C hangs off A.
        let nodes = [node("A"), node("B"), node("C")];
        let edges = [edge("A", "C")];
        let pos = compute_layout(&nodes, &edges);

        assert_eq!(pos["A"], Position::ORIGIN);
        assert_eq!(pos["C"], Position::new(0.0, ROW));
        assert_eq!(pos["B"], Position::new(NODE_WIDTH + 2.0 * H_GAP, 0.0));
    }

    #[test]
    fn dangling_edge_target_is_skipped() {
        let nodes = [node("a"), node("b")];
        let edges = [edge("a", "b"), edge("a", "ghost")];
        let pos = compute_layout(&nodes, &edges);
        assert_eq!(pos.len(), 2);
        assert!(!pos.contains_key("ghost"));
        assert_eq!(pos["b"], Position::new(0.0, ROW));
    }

    #[test]
    fn fully_cyclic_input_falls_back_to_first_node() {
        let nodes = [node("a"), node("b")];
        let edges = [edge("a", "b"), edge("b", "a")];
        let pos = compute_layout(&nodes, &edges);
        assert_eq!(pos["a"], Position::ORIGIN);
        assert_eq!(pos["b"], Position::new(0.0, ROW));
    }

    #[test]
    fn multi_parent_node_is_placed_under_first_parent_only() {
        let nodes = [node("r"), node("a"), node("b"), node("shared")];
        let edges = [edge("r", "a"), edge("r", "b"), edge("a", "shared"), edge("b", "shared")];
        let pos = compute_layout(&nodes, &edges);
        assert_eq!(pos["shared"], Position::new(pos["a"].x, 2.0 * ROW));
    }

    #[test]
    fn layout_is_deterministic() {
        let nodes = [node("r"), node("a"), node("b"), node("c"), node("x")];
        let edges = [edge("r", "a"), edge("r", "b"), edge("b", "c")];
        assert_eq!(compute_layout(&nodes, &edges), compute_layout(&nodes, &edges));
    }

    #[test]
    fn apply_layout_keeps_position_of_unreached_nodes() {
        // r is a root; a <-> b form a detached cycle that no root reaches.
        let nodes = [node("r"), node("a"), node("b")];
        let edges = [edge("a", "b"), edge("b", "a")];
        let laid = apply_layout(&nodes, &edges);
        assert_eq!(laid[0].position, Position::ORIGIN);
        assert_eq!(laid[1].position, Position::new(-1.0, -1.0));
    }
}
