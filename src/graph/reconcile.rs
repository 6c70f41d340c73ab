//! Session state and the trigger reducer.
//!
//! Every change to the graph goes through [`reduce`]: the previous
//! [`SessionState`] plus one [`Trigger`] yields the next state and, when the
//! graph changed, an [`Emission`] for the renderer (and for storage when the
//! change is a save).

use std::collections::HashSet;

use log::{debug, warn};

use super::config::FlowConfig;
use super::edges::{chain_edges, sanitize_edges, would_create_cycle};
use super::layout::{expand_edge_id, layout_children};
use super::mapper::{column_percent_change, map_columns};
use super::persist::PersistedLayout;
use super::types::{Edge, Node, NodeId, Position, Snapshot, Table};

#[derive(Clone, Debug, PartialEq)]
pub enum Trigger {
	/// New table data arrived.
	RefreshTable(Table),
	/// The user released a dragged node.
	CommitDrag { id: NodeId, position: Position },
	/// The user drew a connection between two nodes.
	ConnectNodes { source: NodeId, target: NodeId },
	/// The user double-clicked a node; it becomes the expand target.
	ExpandNode { id: NodeId },
	ClearSelection,
}

/// Everything the engine remembers between triggers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
	pub table: Option<Table>,
	pub persisted: PersistedLayout,
	pub live: Snapshot,
	pub selection: Option<NodeId>,
}

impl SessionState {
	pub fn new(persisted: PersistedLayout) -> Self {
		Self {
			persisted,
			..Self::default()
		}
	}
}

/// A graph to hand to the renderer; `persist` marks explicit saves.
#[derive(Clone, Debug, PartialEq)]
pub struct Emission {
	pub snapshot: Snapshot,
	pub persist: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
	pub state: SessionState,
	pub emission: Option<Emission>,
}

impl Transition {
	fn quiet(state: SessionState) -> Self {
		Self {
			state,
			emission: None,
		}
	}

	fn emit(state: SessionState, persist: bool) -> Self {
		let snapshot = state.live.clone();
		Self {
			state,
			emission: Some(Emission { snapshot, persist }),
		}
	}
}

/// Receives emitted graphs. Nodes always arrive before the edges that
/// reference them.
pub trait GraphSink {
	fn nodes_changed(&mut self, nodes: &[Node]);
	fn edges_changed(&mut self, edges: &[Edge]);
}

pub fn emit(snapshot: &Snapshot, sink: &mut impl GraphSink) {
	sink.nodes_changed(&snapshot.nodes);
	sink.edges_changed(&snapshot.edges);
}

/// Outcome of merging a fresh mapping into the live graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Reconciled {
	pub snapshot: Snapshot,
	/// Whether new children were laid out under the selection.
	pub expanded: bool,
}

/// Merge freshly mapped nodes with the live graph.
///
/// With a selection and at least one unseen node id, the unseen nodes become
/// children of the selected node and every other node keeps its live
/// position. Otherwise the fresh mapping replaces the live graph, with saved
/// edges (or the inferred column chain when nothing is saved).
pub fn reconcile(
	fresh: Vec<Node>,
	persisted: &PersistedLayout,
	live: &Snapshot,
	selection: Option<&str>,
	config: &FlowConfig,
) -> Reconciled {
	let live_ids = live.node_ids();
	let has_new = fresh.iter().any(|n| !live_ids.contains(n.id.as_str()));
	let parent = selection.and_then(|id| live.node(id));

	if let (Some(parent), true) = (parent, has_new) {
		match expand(&fresh, live, &parent.id, config) {
			Some(expanded) => return expanded,
			None => warn!(
				"Selected node {} lost its column; replacing the graph instead",
				parent.id
			),
		}
	}
	if let (Some(id), None) = (selection, parent) {
		warn!("Selected node {id} is no longer in the graph");
	}

	let edges = if persisted.edges.is_empty() {
		chain_edges(&fresh)
	} else {
		refresh_edge_changes(&fresh, persisted.edges.clone())
	};
	let edges = sanitize_edges(&fresh, edges);
	Reconciled {
		snapshot: Snapshot {
			nodes: fresh,
			edges,
		},
		expanded: false,
	}
}

/// Lay the unseen nodes out under `parent_id`. `None` when the parent has no
/// column in the fresh mapping.
fn expand(
	fresh: &[Node],
	live: &Snapshot,
	parent_id: &str,
	config: &FlowConfig,
) -> Option<Reconciled> {
	let live_ids = live.node_ids();
	let (kept, new_children): (Vec<Node>, Vec<Node>) = fresh
		.iter()
		.cloned()
		.partition(|n| live_ids.contains(n.id.as_str()));

	// Known nodes take fresh labels but stay where the user left them.
	let kept: Vec<Node> = kept
		.into_iter()
		.map(|node| match live.node(&node.id) {
			Some(old) => Node {
				position: old.position,
				..node
			},
			None => node,
		})
		.collect();
	let parent = kept.iter().find(|n| n.id == parent_id).cloned()?;

	let child_ids: Vec<&str> = live
		.children_of(parent_id)
		.into_iter()
		.map(|n| n.id.as_str())
		.collect();
	let existing_children: Vec<Node> = child_ids
		.iter()
		.filter_map(|id| kept.iter().find(|n| n.id == *id).cloned())
		.collect();

	debug!(
		"Expanding {} with {} existing and {} new children",
		parent.id,
		existing_children.len(),
		new_children.len()
	);

	let edges = refresh_edge_changes(&kept, live.edges.clone());
	let laid_out = layout_children(&parent, kept, edges, existing_children, new_children, config);
	let edges = sanitize_edges(&laid_out.nodes, laid_out.edges);
	Some(Reconciled {
		snapshot: Snapshot {
			nodes: laid_out.nodes,
			edges,
		},
		expanded: true,
	})
}

/// Re-label edges with their target's current change.
fn refresh_edge_changes(nodes: &[Node], mut edges: Vec<Edge>) -> Vec<Edge> {
	for edge in &mut edges {
		if let Some(target) = nodes.iter().find(|n| n.id == edge.target) {
			edge.set_percent_change(target.percent_change);
		}
	}
	edges
}

/// Recompute every node's change against the parents `persisted` names and
/// re-label the edges to match.
fn recompute_changes(table: &Table, persisted: &PersistedLayout, snapshot: &mut Snapshot) {
	for node in &mut snapshot.nodes {
		if let Some(index) = table.column_index(&node.id) {
			node.percent_change = column_percent_change(table, persisted, index);
		}
	}
	let edges = std::mem::take(&mut snapshot.edges);
	snapshot.edges = refresh_edge_changes(&snapshot.nodes, edges);
}

pub fn reduce(config: &FlowConfig, state: SessionState, trigger: Trigger) -> Transition {
	match trigger {
		Trigger::RefreshTable(table) => refresh_table(config, state, table),
		Trigger::CommitDrag { id, position } => commit_drag(state, &id, position),
		Trigger::ConnectNodes { source, target } => connect_nodes(state, source, target),
		Trigger::ExpandNode { id } => select_node(state, id),
		Trigger::ClearSelection => Transition::quiet(SessionState {
			selection: None,
			..state
		}),
	}
}

fn refresh_table(config: &FlowConfig, state: SessionState, table: Table) -> Transition {
	if table.is_empty() {
		debug!("Skipping refresh: table has no rows");
		return Transition::quiet(state);
	}
	let fresh = map_columns(&table, &state.persisted, config);
	let reconciled = reconcile(
		fresh,
		&state.persisted,
		&state.live,
		state.selection.as_deref(),
		config,
	);
	debug!(
		"Refreshed graph: {} nodes, {} edges (expanded: {})",
		reconciled.snapshot.nodes.len(),
		reconciled.snapshot.edges.len(),
		reconciled.expanded
	);

	let mut live = reconciled.snapshot;
	let persisted = if reconciled.expanded {
		// New children now hang off the selection; measure them against it.
		let persisted = PersistedLayout::from_snapshot(&live);
		recompute_changes(&table, &persisted, &mut live);
		PersistedLayout::from_snapshot(&live)
	} else {
		state.persisted
	};
	let next = SessionState {
		table: Some(table),
		persisted,
		live,
		selection: state.selection,
	};
	Transition::emit(next, reconciled.expanded)
}

fn commit_drag(mut state: SessionState, id: &str, position: Position) -> Transition {
	let Some(index) = state.live.nodes.iter().position(|n| n.id == id) else {
		warn!("Ignoring drag of unknown node {id}");
		return Transition::quiet(state);
	};
	state.live.nodes[index].position = position;
	// Drags save positions only; saved edges stay as they were.
	state.persisted.nodes = PersistedLayout::from_snapshot(&state.live).nodes;
	Transition::emit(state, true)
}

fn connect_nodes(mut state: SessionState, source: NodeId, target: NodeId) -> Transition {
	let ids: HashSet<&str> = state.live.node_ids();
	if !ids.contains(source.as_str()) || !ids.contains(target.as_str()) {
		warn!("Ignoring connection {source} -> {target}: unknown node");
		return Transition::quiet(state);
	}
	// The new edge replaces the target's current parent.
	let remaining: Vec<Edge> = state
		.live
		.edges
		.iter()
		.filter(|e| e.target != target)
		.cloned()
		.collect();
	if would_create_cycle(&remaining, &source, &target) {
		warn!("Ignoring connection {source} -> {target}: it would close a cycle");
		return Transition::quiet(state);
	}

	let mut edges = remaining;
	edges.push(Edge::labeled(
		expand_edge_id(&source, &target),
		source.as_str(),
		target.as_str(),
		100.0,
	));
	state.live.edges = edges;
	state.persisted.edges = state.live.edges.clone();
	if let Some(table) = &state.table {
		recompute_changes(table, &state.persisted, &mut state.live);
		state.persisted.edges = state.live.edges.clone();
	}
	debug!("Connected {source} -> {target}");
	Transition::emit(state, true)
}

fn select_node(mut state: SessionState, id: NodeId) -> Transition {
	if state.live.node(&id).is_none() {
		warn!("Ignoring selection of unknown node {id}");
		return Transition::quiet(state);
	}
	state.selection = Some(id);
	debug!("Selection is now {:?}", state.selection);
	Transition::quiet(state)
}
