//! Parent to child relative change.

use std::collections::HashSet;

use super::types::CellValue;

/// Change reported for roots and for mixed aggregate/grouping pairs.
pub const NEUTRAL_PERCENT: f64 = 100.0;

/// Sum of a column's values after numeric coercion.
pub fn scalar_sum(values: &[CellValue]) -> f64 {
	values.iter().map(CellValue::as_number).sum()
}

pub fn distinct_count(values: &[CellValue]) -> usize {
	values.iter().map(CellValue::key).collect::<HashSet<_>>().len()
}

/// The value a node displays: sum for aggregates, distinct count otherwise.
pub fn column_scalar(values: &[CellValue], is_aggregate: bool) -> f64 {
	if is_aggregate {
		scalar_sum(values)
	} else {
		distinct_count(values) as f64
	}
}

pub fn round2(value: f64) -> f64 {
	(value * 100.0).round() / 100.0
}

fn ratio(child: f64, parent: f64) -> f64 {
	if parent == 0.0 {
		return 0.0;
	}
	let pct = round2(child / parent * 100.0);
	if pct.is_finite() { pct } else { 0.0 }
}

/// Child magnitude relative to the parent, as a percentage with two decimals.
///
/// Two aggregates compare their sums, two groupings compare distinct counts.
/// A mixed pair has no meaningful ratio and reports [`NEUTRAL_PERCENT`].
/// Zero denominators yield `0`.
pub fn percent_change(
	parent_values: &[CellValue],
	child_values: &[CellValue],
	parent_is_aggregate: bool,
	child_is_aggregate: bool,
) -> f64 {
	match (parent_is_aggregate, child_is_aggregate) {
		(true, true) => ratio(scalar_sum(child_values), scalar_sum(parent_values)),
		(false, false) => ratio(
			distinct_count(child_values) as f64,
			distinct_count(parent_values) as f64,
		),
		_ => NEUTRAL_PERCENT,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn nums(values: &[f64]) -> Vec<CellValue> {
		values.iter().copied().map(CellValue::from).collect()
	}

	fn texts(values: &[&str]) -> Vec<CellValue> {
		values.iter().copied().map(CellValue::from).collect()
	}

	#[test]
	fn aggregates_with_zero_parent_report_zero() {
		assert_eq!(percent_change(&nums(&[0.0, 0.0]), &nums(&[7.0]), true, true), 0.0);
		assert_eq!(percent_change(&[], &nums(&[7.0]), true, true), 0.0);
	}

	#[test]
	fn empty_groupings_report_zero() {
		assert_eq!(percent_change(&[], &[], false, false), 0.0);
	}

	#[test]
	fn aggregates_compare_sums() {
		let parent = nums(&[120.0, 80.0]);
		let child = nums(&[20.0, 30.0]);
		assert_eq!(percent_change(&parent, &child, true, true), 25.0);
	}

	#[test]
	fn groupings_compare_distinct_counts() {
		let parent = texts(&["A", "B", "C", "D", "A"]);
		let child = texts(&["A", "B", "B"]);
		assert_eq!(percent_change(&parent, &child, false, false), 50.0);
	}

	#[test]
	fn mixed_kinds_are_neutral() {
		let values = nums(&[1.0, 2.0]);
		assert_eq!(percent_change(&values, &values, true, false), 100.0);
		assert_eq!(percent_change(&values, &[], false, true), 100.0);
		assert_eq!(percent_change(&[], &[], true, false), 100.0);
	}

	#[test]
	fn rounds_to_two_decimals() {
		let parent = texts(&["a", "b", "c"]);
		let child = texts(&["a"]);
		assert_eq!(percent_change(&parent, &child, false, false), 33.33);
	}

	#[test]
	fn scalars_follow_column_kind() {
		let values = texts(&["3", "3", "4"]);
		assert_eq!(column_scalar(&values, true), 10.0);
		assert_eq!(column_scalar(&values, false), 2.0);
	}
}
