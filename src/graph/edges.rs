//! Incoming-edge inference and referential clean-up.

use std::collections::{HashMap, HashSet};

use log::warn;

use super::types::{Column, Edge, Node};

/// Id of an edge synthesized from column order.
pub fn chained_edge_id(prev: &str, id: &str) -> String {
	format!("{prev}-{id}")
}

/// The incoming edge for `columns[index]`.
///
/// A persisted edge targeting the column wins verbatim. Otherwise every column
/// after the first is chained to its predecessor; the first column is the
/// implicit root and gets nothing.
pub fn infer_incoming(persisted: &[Edge], columns: &[Column], index: usize) -> Option<Edge> {
	let column = columns.get(index)?;
	if let Some(edge) = persisted.iter().find(|e| e.target == column.id) {
		return Some(edge.clone());
	}
	let prev = index.checked_sub(1).and_then(|i| columns.get(i))?;
	Some(Edge {
		id: chained_edge_id(&prev.id, &column.id),
		source: prev.id.clone(),
		target: column.id.clone(),
		percent_change: 100.0,
		label: None,
	})
}

/// Every node chained to its predecessor, labeled with the target's change.
pub fn chain_edges(nodes: &[Node]) -> Vec<Edge> {
	nodes
		.windows(2)
		.map(|pair| {
			let (prev, node) = (&pair[0], &pair[1]);
			Edge::labeled(
				chained_edge_id(&prev.id, &node.id),
				prev.id.as_str(),
				node.id.as_str(),
				node.percent_change,
			)
		})
		.collect()
}

/// Drop edges that would break the forest: dangling endpoints, self-loops,
/// any second parent for a target (the first edge wins) and edges that close
/// a loop through the edges already kept.
pub fn sanitize_edges(nodes: &[Node], edges: Vec<Edge>) -> Vec<Edge> {
	let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	let mut parented: HashSet<String> = HashSet::new();
	let mut kept = Vec::with_capacity(edges.len());
	for edge in edges {
		if !ids.contains(edge.source.as_str()) || !ids.contains(edge.target.as_str()) {
			warn!(
				"Dropping edge {} ({} -> {}): endpoint not in graph",
				edge.id, edge.source, edge.target
			);
			continue;
		}
		if edge.source == edge.target {
			warn!("Dropping self-loop edge {}", edge.id);
			continue;
		}
		if parented.contains(edge.target.as_str()) {
			warn!("Dropping edge {}: {} already has a parent", edge.id, edge.target);
			continue;
		}
		if would_create_cycle(&kept, &edge.source, &edge.target) {
			warn!("Dropping edge {}: it closes a cycle", edge.id);
			continue;
		}
		parented.insert(edge.target.clone());
		kept.push(edge);
	}
	kept
}

/// Whether adding `source -> target` would close a loop, i.e. `source` already
/// descends from `target`.
pub fn would_create_cycle(edges: &[Edge], source: &str, target: &str) -> bool {
	if source == target {
		return true;
	}
	let parent_of: HashMap<&str, &str> = edges
		.iter()
		.map(|e| (e.target.as_str(), e.source.as_str()))
		.collect();
	let mut seen = HashSet::new();
	let mut current = source;
	while let Some(&parent) = parent_of.get(current) {
		if parent == target {
			return true;
		}
		if !seen.insert(parent) {
			break;
		}
		current = parent;
	}
	false
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::Position;

	fn columns(ids: &[&str]) -> Vec<Column> {
		ids.iter().map(|id| Column::grouping(*id, id.to_uppercase())).collect()
	}

	fn node(id: &str) -> Node {
		Node {
			id: id.to_string(),
			label: id.to_string(),
			position: Position::default(),
			percent_change: 50.0,
		}
	}

	fn edge(source: &str, target: &str) -> Edge {
		Edge::labeled(format!("{source}-{target}"), source, target, 100.0)
	}

	#[test]
	fn first_column_is_never_chained() {
		let cols = columns(&["a", "b", "c"]);
		assert!(infer_incoming(&[], &cols, 0).is_none());
		let b = infer_incoming(&[], &cols, 1).unwrap();
		assert_eq!((b.id.as_str(), b.source.as_str()), ("a-b", "a"));
		let c = infer_incoming(&[], &cols, 2).unwrap();
		assert_eq!((c.id.as_str(), c.source.as_str()), ("b-c", "b"));
	}

	#[test]
	fn persisted_edge_is_used_verbatim() {
		let cols = columns(&["a", "b", "c"]);
		let saved = vec![Edge {
			id: "custom".into(),
			source: "a".into(),
			target: "c".into(),
			percent_change: 12.0,
			label: None,
		}];
		assert_eq!(infer_incoming(&saved, &cols, 2), Some(saved[0].clone()));
		// Other columns still fall back to the chain.
		assert_eq!(infer_incoming(&saved, &cols, 1).unwrap().source, "a");
	}

	#[test]
	fn persisted_edge_can_target_the_first_column() {
		let cols = columns(&["a", "b"]);
		let saved = vec![edge("b", "a")];
		assert_eq!(infer_incoming(&saved, &cols, 0).unwrap().source, "b");
	}

	#[test]
	fn chain_labels_follow_target_change() {
		let nodes = vec![node("a"), node("b"), node("c")];
		let edges = chain_edges(&nodes);
		assert_eq!(edges.len(), 2);
		assert_eq!(edges[1].source, "b");
		assert_eq!(edges[1].label.as_deref(), Some("50%"));
	}

	#[test]
	fn sanitize_drops_dangling_loops_and_second_parents() {
		let nodes = vec![node("a"), node("b"), node("c")];
		let edges = vec![
			edge("a", "b"),
			edge("ghost", "c"),
			edge("c", "c"),
			edge("c", "b"),
			edge("b", "c"),
		];
		let kept: Vec<_> = sanitize_edges(&nodes, edges)
			.into_iter()
			.map(|e| e.id)
			.collect();
		assert_eq!(kept, vec!["a-b", "b-c"]);
	}

	#[test]
	fn sanitize_breaks_loops_longer_than_one_edge() {
		let nodes = vec![node("a"), node("b"), node("c")];
		let two = sanitize_edges(&nodes, vec![edge("a", "b"), edge("b", "a")]);
		assert_eq!(two.len(), 1);
		assert_eq!(two[0].id, "a-b");

		let three = sanitize_edges(&nodes, vec![edge("a", "b"), edge("b", "c"), edge("c", "a")]);
		let kept: Vec<_> = three.iter().map(|e| e.id.as_str()).collect();
		assert_eq!(kept, vec!["a-b", "b-c"]);
	}

	#[test]
	fn detects_cycles_through_ancestors() {
		let edges = vec![edge("a", "b"), edge("b", "c")];
		assert!(would_create_cycle(&edges, "c", "a"));
		assert!(would_create_cycle(&edges, "b", "b"));
		assert!(!would_create_cycle(&edges, "a", "c"));
		assert!(!would_create_cycle(&edges, "c", "d"));
	}
}
