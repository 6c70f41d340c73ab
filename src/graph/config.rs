//! Engine tuning knobs.

use log::warn;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HORIZONTAL_SPACING: f64 = 250.0;
pub const DEFAULT_VERTICAL_SPACING: f64 = 150.0;
pub const DEFAULT_STORAGE_KEY: &str = "layout";
pub const DEFAULT_PERSIST_DEBOUNCE_MS: u32 = 500;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowConfig {
	/// Distance between sibling slots when fanning out children.
	#[serde(default = "default_horizontal_spacing")]
	pub horizontal_spacing: f64,
	/// Distance between a parent and its children, and between default rows.
	#[serde(default = "default_vertical_spacing")]
	pub vertical_spacing: f64,
	/// Key the layout blob is stored under.
	#[serde(default = "default_storage_key")]
	pub storage_key: String,
	/// Quiet period before a burst of saves is written.
	#[serde(default = "default_persist_debounce_ms")]
	pub persist_debounce_ms: u32,
}

impl Default for FlowConfig {
	fn default() -> Self {
		Self {
			horizontal_spacing: DEFAULT_HORIZONTAL_SPACING,
			vertical_spacing: DEFAULT_VERTICAL_SPACING,
			storage_key: DEFAULT_STORAGE_KEY.to_string(),
			persist_debounce_ms: DEFAULT_PERSIST_DEBOUNCE_MS,
		}
	}
}

impl FlowConfig {
	/// Parse a host-supplied config, keeping the defaults on malformed input.
	pub fn from_json(raw: &str) -> Self {
		match serde_json::from_str(raw) {
			Ok(config) => config,
			Err(err) => {
				warn!("Ignoring malformed flow config: {err}");
				Self::default()
			}
		}
	}
}

fn default_horizontal_spacing() -> f64 {
	DEFAULT_HORIZONTAL_SPACING
}

fn default_vertical_spacing() -> f64 {
	DEFAULT_VERTICAL_SPACING
}

fn default_storage_key() -> String {
	DEFAULT_STORAGE_KEY.to_string()
}

fn default_persist_debounce_ms() -> u32 {
	DEFAULT_PERSIST_DEBOUNCE_MS
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_config_keeps_other_defaults() {
		let config = FlowConfig::from_json(r#"{"horizontalSpacing": 300}"#);
		assert_eq!(config.horizontal_spacing, 300.0);
		assert_eq!(config.vertical_spacing, DEFAULT_VERTICAL_SPACING);
		assert_eq!(config.storage_key, "layout");
	}

	#[test]
	fn malformed_config_falls_back_to_defaults() {
		assert_eq!(FlowConfig::from_json("{nope"), FlowConfig::default());
	}
}
