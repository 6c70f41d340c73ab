//! Fan-out placement for children revealed under an expanded node.

use std::collections::HashSet;

use super::config::FlowConfig;
use super::types::{Edge, Node, Position};

/// Position of child slot `slot` under `parent`.
///
/// Slots alternate right and left of the parent, moving one step further out
/// every two slots: `+1, -1, +2, -2, ...` times the horizontal spacing. No
/// child sits directly under the parent.
pub fn child_slot(parent: Position, slot: usize, config: &FlowConfig) -> Position {
	let offset = (slot / 2 + 1) as f64 * config.horizontal_spacing;
	let dx = if slot % 2 == 0 { offset } else { -offset };
	Position::new(parent.x + dx, parent.y + config.vertical_spacing)
}

pub fn expand_edge_id(parent: &str, child: &str) -> String {
	format!("e{parent}-{child}")
}

/// Result of laying out one expand.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChildLayout {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
}

/// Lay out `existing ++ new` children of `parent` and connect the new ones.
///
/// `nodes` is the current node list. Every node that is not one of the
/// children keeps its place in the list; the repositioned children are
/// appended in slot order. Existing children are repositioned too, so an
/// expand always yields the same fan shape. Nothing is removed.
pub fn layout_children(
	parent: &Node,
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	existing_children: Vec<Node>,
	new_children: Vec<Node>,
	config: &FlowConfig,
) -> ChildLayout {
	let new_ids: HashSet<String> = new_children.iter().map(|n| n.id.clone()).collect();
	let placed: Vec<Node> = existing_children
		.into_iter()
		.chain(new_children)
		.enumerate()
		.map(|(slot, child)| Node {
			position: child_slot(parent.position, slot, config),
			..child
		})
		.collect();

	let placed_ids: HashSet<&str> = placed.iter().map(|n| n.id.as_str()).collect();
	let mut out_nodes: Vec<Node> = nodes
		.into_iter()
		.filter(|n| !placed_ids.contains(n.id.as_str()))
		.collect();

	let mut out_edges = edges;
	out_edges.extend(
		placed
			.iter()
			.filter(|child| new_ids.contains(&child.id))
			.map(|child| {
				Edge::labeled(
					expand_edge_id(&parent.id, &child.id),
					parent.id.as_str(),
					child.id.as_str(),
					child.percent_change,
				)
			}),
	);
	out_nodes.extend(placed);

	ChildLayout {
		nodes: out_nodes,
		edges: out_edges,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str, x: f64, y: f64) -> Node {
		Node {
			id: id.to_string(),
			label: id.to_string(),
			position: Position::new(x, y),
			percent_change: 40.0,
		}
	}

	#[test]
	fn slots_alternate_right_then_left() {
		let config = FlowConfig::default();
		let parent = Position::new(100.0, 50.0);
		let xs: Vec<f64> = (0..5).map(|i| child_slot(parent, i, &config).x - 100.0).collect();
		assert_eq!(xs, vec![250.0, -250.0, 500.0, -500.0, 750.0]);
		assert_eq!(child_slot(parent, 3, &config).y, 200.0);
	}

	#[test]
	fn three_new_children_under_a_leaf() {
		let parent = node("p", 0.0, 0.0);
		let layout = layout_children(
			&parent,
			vec![parent.clone()],
			Vec::new(),
			Vec::new(),
			vec![node("a", 9.0, 9.0), node("b", 9.0, 9.0), node("c", 9.0, 9.0)],
			&FlowConfig::default(),
		);
		let placed: Vec<_> = layout.nodes[1..].iter().map(|n| (n.position.x, n.position.y)).collect();
		assert_eq!(placed, vec![(250.0, 150.0), (-250.0, 150.0), (500.0, 150.0)]);
		assert_eq!(layout.edges.len(), 3);
		assert_eq!(layout.edges[0].id, "ep-a");
		assert_eq!(layout.edges[0].label.as_deref(), Some("40%"));
	}

	#[test]
	fn existing_children_take_the_first_slots() {
		let parent = node("p", 0.0, 0.0);
		let old = node("old", 700.0, 700.0);
		let other = node("other", 3.0, 3.0);
		let edges = vec![Edge::labeled("p-old", "p", "old", 10.0)];
		let layout = layout_children(
			&parent,
			vec![parent.clone(), old.clone(), other.clone()],
			edges,
			vec![old],
			vec![node("new", 0.0, 0.0)],
			&FlowConfig::default(),
		);
		let ids: Vec<_> = layout.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["p", "other", "old", "new"]);
		assert_eq!(layout.nodes[1].position, Position::new(3.0, 3.0));
		assert_eq!(layout.nodes[2].position, Position::new(250.0, 150.0));
		assert_eq!(layout.nodes[3].position, Position::new(-250.0, 150.0));
		// only the new child gets a fresh edge
		let edge_ids: Vec<_> = layout.edges.iter().map(|e| e.id.as_str()).collect();
		assert_eq!(edge_ids, vec!["p-old", "ep-new"]);
	}
}
