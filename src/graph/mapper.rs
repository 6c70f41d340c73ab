//! Table columns to graph nodes.

use super::config::FlowConfig;
use super::edges::infer_incoming;
use super::percent::{NEUTRAL_PERCENT, column_scalar, percent_change};
use super::persist::PersistedLayout;
use super::types::{Column, Node, Position, Table};

pub fn default_position(ordinal: usize, config: &FlowConfig) -> Position {
	Position::new(0.0, ordinal as f64 * config.vertical_spacing)
}

pub fn node_label(column: &Column, scalar: f64) -> String {
	format!("{} ({})", column.display_name, scalar)
}

/// Change of `table.columns[index]` against its inferred parent, or the
/// neutral value for roots and parents that are not current columns.
pub fn column_percent_change(table: &Table, persisted: &PersistedLayout, index: usize) -> f64 {
	let Some(edge) = infer_incoming(&persisted.edges, &table.columns, index) else {
		return NEUTRAL_PERCENT;
	};
	let Some(parent_index) = table.column_index(&edge.source) else {
		return NEUTRAL_PERCENT;
	};
	percent_change(
		&table.column_values(parent_index),
		&table.column_values(index),
		table.columns[parent_index].is_aggregate,
		table.columns[index].is_aggregate,
	)
}

/// One node per column, in column order. Saved positions are reused by id;
/// new columns are stacked vertically by ordinal.
pub fn map_columns(table: &Table, persisted: &PersistedLayout, config: &FlowConfig) -> Vec<Node> {
	table
		.columns
		.iter()
		.enumerate()
		.map(|(index, column)| {
			let values = table.column_values(index);
			let scalar = column_scalar(&values, column.is_aggregate);
			Node {
				id: column.id.clone(),
				label: node_label(column, scalar),
				position: persisted
					.position_of(&column.id)
					.unwrap_or_else(|| default_position(index, config)),
				percent_change: column_percent_change(table, persisted, index),
			}
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::persist::PersistedNode;
	use crate::graph::types::{CellValue, Edge};

	fn sales_table() -> Table {
		let rows = [
			("EU", "FR", 100.0, 40.0),
			("EU", "DE", 60.0, 10.0),
			("US", "NY", 40.0, 0.0),
			("US", "CA", 0.0, 0.0),
		];
		Table::new(
			vec![
				Column::grouping("region", "Region"),
				Column::grouping("state", "State"),
				Column::aggregate("sales", "Sales"),
				Column::aggregate("returns", "Returns"),
			],
			rows.iter()
				.map(|(r, s, sales, ret)| {
					vec![
						CellValue::from(*r),
						CellValue::from(*s),
						CellValue::from(*sales),
						CellValue::from(*ret),
					]
				})
				.collect(),
		)
	}

	#[test]
	fn one_node_per_column_in_order() {
		let table = sales_table();
		let nodes = map_columns(&table, &PersistedLayout::default(), &FlowConfig::default());
		let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["region", "state", "sales", "returns"]);
	}

	#[test]
	fn labels_and_changes_follow_the_column_chain() {
		let table = sales_table();
		let nodes = map_columns(&table, &PersistedLayout::default(), &FlowConfig::default());
		assert_eq!(nodes[0].label, "Region (2)");
		assert_eq!(nodes[0].percent_change, 100.0);
		assert_eq!(nodes[1].label, "State (4)");
		assert_eq!(nodes[1].percent_change, 200.0);
		// grouping -> aggregate is a mixed pair
		assert_eq!(nodes[2].label, "Sales (200)");
		assert_eq!(nodes[2].percent_change, 100.0);
		assert_eq!(nodes[3].label, "Returns (50)");
		assert_eq!(nodes[3].percent_change, 25.0);
	}

	#[test]
	fn positions_come_from_saved_layout_or_ordinal() {
		let table = sales_table();
		let persisted = PersistedLayout {
			nodes: vec![PersistedNode {
				id: "sales".into(),
				position: Position::new(-40.0, 12.0),
			}],
			edges: Vec::new(),
		};
		let nodes = map_columns(&table, &persisted, &FlowConfig::default());
		assert_eq!(nodes[1].position, Position::new(0.0, 150.0));
		assert_eq!(nodes[2].position, Position::new(-40.0, 12.0));
		assert_eq!(nodes[3].position, Position::new(0.0, 450.0));
	}

	#[test]
	fn saved_edges_pick_the_parent_column() {
		let table = sales_table();
		let persisted = PersistedLayout {
			nodes: Vec::new(),
			edges: vec![Edge::labeled("custom", "region", "returns", 0.0)],
		};
		let nodes = map_columns(&table, &persisted, &FlowConfig::default());
		assert_eq!(nodes[3].percent_change, 100.0);

		let persisted = PersistedLayout {
			nodes: Vec::new(),
			edges: vec![Edge::labeled("gone", "deleted_column", "state", 0.0)],
		};
		let nodes = map_columns(&table, &persisted, &FlowConfig::default());
		assert_eq!(nodes[1].percent_change, 100.0);
	}
}
