//! Table input and graph snapshot types shared by the engine.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Node ids are column ids.
pub type NodeId = String;

/// A single column of the input table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
	pub id: String,
	pub display_name: String,
	#[serde(default)]
	pub is_aggregate: bool,
}

impl Column {
	/// A grouping (distinct-counted) column.
	pub fn grouping(id: impl Into<String>, display_name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			display_name: display_name.into(),
			is_aggregate: false,
		}
	}

	/// An aggregate (summed) column.
	pub fn aggregate(id: impl Into<String>, display_name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			display_name: display_name.into(),
			is_aggregate: true,
		}
	}
}

/// A raw cell value as handed over by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
	Null,
	Bool(bool),
	Number(f64),
	Text(String),
}

/// Hashable stand-in for a [`CellValue`] used when counting distinct values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CellKey {
	Null,
	Bool(bool),
	Number(u64),
	Text(String),
}

impl CellValue {
	/// Numeric coercion used for sums. Anything that is not a finite number
	/// counts as zero.
	pub fn as_number(&self) -> f64 {
		let n = match self {
			CellValue::Null => 0.0,
			CellValue::Bool(b) => {
				if *b {
					1.0
				} else {
					0.0
				}
			}
			CellValue::Number(n) => *n,
			CellValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
		};
		if n.is_finite() { n } else { 0.0 }
	}

	pub fn key(&self) -> CellKey {
		match self {
			CellValue::Null => CellKey::Null,
			CellValue::Bool(b) => CellKey::Bool(*b),
			// -0.0 and 0.0 are the same value
			CellValue::Number(n) if *n == 0.0 => CellKey::Number(0.0f64.to_bits()),
			CellValue::Number(n) => CellKey::Number(n.to_bits()),
			CellValue::Text(s) => CellKey::Text(s.clone()),
		}
	}
}

impl From<f64> for CellValue {
	fn from(value: f64) -> Self {
		CellValue::Number(value)
	}
}

impl From<&str> for CellValue {
	fn from(value: &str) -> Self {
		CellValue::Text(value.to_string())
	}
}

/// Columns plus rows. Every row follows the column order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
	pub columns: Vec<Column>,
	#[serde(default)]
	pub rows: Vec<Vec<CellValue>>,
}

impl Table {
	pub fn new(columns: Vec<Column>, rows: Vec<Vec<CellValue>>) -> Self {
		Self { columns, rows }
	}

	/// A table without rows (or columns) carries nothing to draw.
	pub fn is_empty(&self) -> bool {
		self.rows.is_empty() || self.columns.is_empty()
	}

	pub fn column_index(&self, id: &str) -> Option<usize> {
		self.columns.iter().position(|c| c.id == id)
	}

	/// All values of one column. Short rows read as null.
	pub fn column_values(&self, index: usize) -> Vec<CellValue> {
		self.rows
			.iter()
			.map(|row| row.get(index).cloned().unwrap_or(CellValue::Null))
			.collect()
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	pub id: NodeId,
	#[serde(default)]
	pub label: String,
	pub position: Position,
	#[serde(default = "default_percent")]
	pub percent_change: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
	pub id: String,
	pub source: NodeId,
	pub target: NodeId,
	#[serde(default = "default_percent")]
	pub percent_change: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
}

fn default_percent() -> f64 {
	100.0
}

impl Edge {
	/// An edge whose display label follows its percent change.
	pub fn labeled(
		id: impl Into<String>,
		source: impl Into<NodeId>,
		target: impl Into<NodeId>,
		percent_change: f64,
	) -> Self {
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			percent_change,
			label: Some(percent_label(percent_change)),
		}
	}

	pub fn set_percent_change(&mut self, percent_change: f64) {
		self.percent_change = percent_change;
		self.label = Some(percent_label(percent_change));
	}
}

/// `25.0` renders as `25%`, `33.33` as `33.33%`.
pub fn percent_label(percent_change: f64) -> String {
	format!("{}%", percent_change)
}

/// Node and edge lists as drawn and as persisted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
}

impl Snapshot {
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn node_ids(&self) -> HashSet<&str> {
		self.nodes.iter().map(|n| n.id.as_str()).collect()
	}

	/// Targets of edges leaving `parent`, in node-list order.
	pub fn children_of(&self, parent: &str) -> Vec<&Node> {
		self.nodes
			.iter()
			.filter(|n| {
				self.edges
					.iter()
					.any(|e| e.source == parent && e.target == n.id)
			})
			.collect()
	}
}
