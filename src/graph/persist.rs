//! Versioned layout blob and the storage seam.
//!
//! The blob carries two independently encoded JSON strings, `nodePositions`
//! and `edgeList`, wrapped in an envelope with a schema version. Any violation
//! degrades the affected part to empty; nothing here is fatal to a refresh.

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::LayoutError;
use super::types::{Edge, NodeId, Position, Snapshot};

pub const LAYOUT_SCHEMA_VERSION: u32 = 1;

fn current_version() -> u32 {
	LAYOUT_SCHEMA_VERSION
}

/// The stored envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutBlob {
	#[serde(default = "current_version")]
	pub version: u32,
	#[serde(default)]
	pub node_positions: Option<String>,
	#[serde(default)]
	pub edge_list: Option<String>,
}

impl LayoutBlob {
	pub fn parse(raw: &str) -> Result<Self, LayoutError> {
		let blob: LayoutBlob = serde_json::from_str(raw)?;
		if blob.version != LAYOUT_SCHEMA_VERSION {
			return Err(LayoutError::UnsupportedVersion {
				found: blob.version,
				expected: LAYOUT_SCHEMA_VERSION,
			});
		}
		Ok(blob)
	}

	pub fn to_json(&self) -> Result<String, LayoutError> {
		Ok(serde_json::to_string(self)?)
	}
}

/// A saved node: only the id and position matter; anything else the writer
/// stored alongside is ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedNode {
	pub id: NodeId,
	pub position: Position,
}

/// The last explicitly saved layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersistedLayout {
	pub nodes: Vec<PersistedNode>,
	pub edges: Vec<Edge>,
}

fn decode_array<T: DeserializeOwned>(raw: &str, what: &'static str) -> Result<Vec<T>, LayoutError> {
	let value: serde_json::Value = serde_json::from_str(raw)?;
	if !value.is_array() {
		return Err(LayoutError::NotAnArray(what));
	}
	Ok(serde_json::from_value(value)?)
}

pub fn decode_nodes(raw: &str) -> Result<Vec<PersistedNode>, LayoutError> {
	decode_array(raw, "nodePositions")
}

pub fn decode_edges(raw: &str) -> Result<Vec<Edge>, LayoutError> {
	decode_array(raw, "edgeList")
}

fn decode_or_default<T>(
	raw: Option<&str>,
	what: &str,
	decode: impl Fn(&str) -> Result<Vec<T>, LayoutError>,
) -> Vec<T> {
	let Some(raw) = raw else {
		return Vec::new();
	};
	decode(raw).unwrap_or_else(|err| {
		warn!("Could not parse saved {what}: {err}");
		Vec::new()
	})
}

impl PersistedLayout {
	pub fn from_blob(blob: &LayoutBlob) -> Self {
		if blob.version != LAYOUT_SCHEMA_VERSION {
			warn!(
				"Ignoring layout with schema version {} (expected {LAYOUT_SCHEMA_VERSION})",
				blob.version
			);
			return Self::default();
		}
		Self {
			nodes: decode_or_default(blob.node_positions.as_deref(), "node positions", decode_nodes),
			edges: decode_or_default(blob.edge_list.as_deref(), "edge list", decode_edges),
		}
	}

	pub fn from_snapshot(snapshot: &Snapshot) -> Self {
		Self {
			nodes: snapshot
				.nodes
				.iter()
				.map(|n| PersistedNode {
					id: n.id.clone(),
					position: n.position,
				})
				.collect(),
			edges: snapshot.edges.clone(),
		}
	}

	pub fn position_of(&self, id: &str) -> Option<Position> {
		self.nodes.iter().find(|n| n.id == id).map(|n| n.position)
	}
}

pub fn encode_layout(layout: &PersistedLayout) -> Result<LayoutBlob, LayoutError> {
	Ok(LayoutBlob {
		version: LAYOUT_SCHEMA_VERSION,
		node_positions: Some(serde_json::to_string(&layout.nodes)?),
		edge_list: Some(serde_json::to_string(&layout.edges)?),
	})
}

/// Read/write access to the blob under a fixed key.
pub trait LayoutStore {
	fn load(&self) -> Result<Option<LayoutBlob>, LayoutError>;
	fn save(&mut self, blob: &LayoutBlob) -> Result<(), LayoutError>;
}

/// Load the saved layout, treating every failure as "nothing saved".
pub fn load_layout(store: &impl LayoutStore) -> PersistedLayout {
	match store.load() {
		Ok(Some(blob)) => PersistedLayout::from_blob(&blob),
		Ok(None) => PersistedLayout::default(),
		Err(err) => {
			warn!("Could not load saved layout: {err}");
			PersistedLayout::default()
		}
	}
}

pub fn save_layout(store: &mut impl LayoutStore, layout: &PersistedLayout) -> Result<(), LayoutError> {
	store.save(&encode_layout(layout)?)?;
	info!(
		"Saved layout ({} nodes, {} edges)",
		layout.nodes.len(),
		layout.edges.len()
	);
	Ok(())
}

/// Keeps the encoded blob in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
	pub raw: Option<String>,
}

impl LayoutStore for MemoryStore {
	fn load(&self) -> Result<Option<LayoutBlob>, LayoutError> {
		self.raw.as_deref().map(LayoutBlob::parse).transpose()
	}

	fn save(&mut self, blob: &LayoutBlob) -> Result<(), LayoutError> {
		self.raw = Some(blob.to_json()?);
		Ok(())
	}
}
