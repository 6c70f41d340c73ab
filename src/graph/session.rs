//! Owns one session's state and wires the reducer to its collaborators.

use log::warn;

use super::config::FlowConfig;
use super::persist::{LayoutStore, load_layout, save_layout};
use super::reconcile::{GraphSink, SessionState, Trigger, emit, reduce};

pub struct FlowSession<S> {
	config: FlowConfig,
	state: SessionState,
	store: S,
}

impl<S: LayoutStore> FlowSession<S> {
	/// Start a session from whatever layout the store holds.
	pub fn open(config: FlowConfig, store: S) -> Self {
		let persisted = load_layout(&store);
		Self {
			config,
			state: SessionState::new(persisted),
			store,
		}
	}

	/// Apply one trigger. Emitted graphs go to `sink` first, then saves go to
	/// the store. Returns whether anything was emitted.
	pub fn dispatch(&mut self, trigger: Trigger, sink: &mut impl GraphSink) -> bool {
		let transition = reduce(&self.config, std::mem::take(&mut self.state), trigger);
		self.state = transition.state;
		let Some(emission) = transition.emission else {
			return false;
		};
		emit(&emission.snapshot, sink);
		if emission.persist {
			if let Err(err) = save_layout(&mut self.store, &self.state.persisted) {
				warn!("Could not save layout: {err}");
			}
		}
		true
	}

	pub fn state(&self) -> &SessionState {
		&self.state
	}

	pub fn config(&self) -> &FlowConfig {
		&self.config
	}

	pub fn store(&self) -> &S {
		&self.store
	}

	pub fn store_mut(&mut self) -> &mut S {
		&mut self.store
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::persist::MemoryStore;
	use crate::graph::types::{CellValue, Column, Edge, Node, Position, Table};

	#[derive(Default)]
	struct LastGraph {
		nodes: Vec<Node>,
		edges: Vec<Edge>,
		calls: usize,
	}

	impl GraphSink for LastGraph {
		fn nodes_changed(&mut self, nodes: &[Node]) {
			self.nodes = nodes.to_vec();
			self.calls += 1;
		}

		fn edges_changed(&mut self, edges: &[Edge]) {
			// every edge must point at a node that was already delivered
			assert!(edges.iter().all(|e| {
				self.nodes.iter().any(|n| n.id == e.source)
					&& self.nodes.iter().any(|n| n.id == e.target)
			}));
			self.edges = edges.to_vec();
		}
	}

	fn table() -> Table {
		Table::new(
			vec![Column::grouping("city", "City"), Column::aggregate("visits", "Visits")],
			vec![
				vec![CellValue::from("Oslo"), CellValue::from(3.0)],
				vec![CellValue::from("Rome"), CellValue::from(4.0)],
			],
		)
	}

	#[test]
	fn refresh_renders_without_saving() {
		let mut session = FlowSession::open(FlowConfig::default(), MemoryStore::default());
		let mut sink = LastGraph::default();
		assert!(session.dispatch(Trigger::RefreshTable(table()), &mut sink));
		assert_eq!(sink.nodes.len(), 2);
		assert_eq!(sink.edges.len(), 1);
		assert!(session.store().raw.is_none());
	}

	#[test]
	fn drags_are_saved_and_restored_by_a_new_session() {
		let mut session = FlowSession::open(FlowConfig::default(), MemoryStore::default());
		let mut sink = LastGraph::default();
		session.dispatch(Trigger::RefreshTable(table()), &mut sink);
		session.dispatch(
			Trigger::CommitDrag {
				id: "visits".into(),
				position: Position::new(60.0, 210.0),
			},
			&mut sink,
		);
		assert!(session.store().raw.is_some());

		let store = session.store().clone();
		let mut reopened = FlowSession::open(FlowConfig::default(), store);
		let mut sink = LastGraph::default();
		reopened.dispatch(Trigger::RefreshTable(table()), &mut sink);
		assert_eq!(sink.nodes[1].position, Position::new(60.0, 210.0));
		assert_eq!(sink.nodes[1].label, "Visits (7)");
	}

	#[test]
	fn corrupt_storage_starts_empty() {
		let store = MemoryStore {
			raw: Some("][".to_string()),
		};
		let mut session = FlowSession::open(FlowConfig::default(), store);
		let mut sink = LastGraph::default();
		session.dispatch(Trigger::RefreshTable(table()), &mut sink);
		assert_eq!(sink.nodes[1].position, Position::new(0.0, 150.0));
	}

	#[test]
	fn quiet_triggers_emit_nothing() {
		let mut session = FlowSession::open(FlowConfig::default(), MemoryStore::default());
		let mut sink = LastGraph::default();
		session.dispatch(Trigger::RefreshTable(table()), &mut sink);
		assert!(!session.dispatch(Trigger::ExpandNode { id: "city".into() }, &mut sink));
		assert_eq!(session.state().selection.as_deref(), Some("city"));
		assert_eq!(sink.calls, 1);
	}
}
