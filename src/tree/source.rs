//! Loading tree payloads embedded in the host page.

use log::info;
use serde::Deserialize;
use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

use super::SkillNodeRow;

/// Id of the `<script type="application/json">` element holding the rows.
pub const TREE_DATA_ELEMENT: &str = "skill-tree-data";

#[derive(Debug, Error)]
pub enum TreeError {
	#[error("no document available")]
	NoDocument,
	#[error("tree data element `#{0}` not found")]
	MissingElement(String),
	#[error("tree data element `#{0}` has no readable text")]
	Unreadable(String),
	#[error("malformed tree data: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Optional tuning carried next to the rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutOverrides {
	pub link_distance: Option<f64>,
	pub charge: Option<f64>,
	pub faded_opacity: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreePayload {
	pub rows: Vec<SkillNodeRow>,
	pub layout: LayoutOverrides,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPayload {
	Rows(Vec<SkillNodeRow>),
	Document {
		rows: Vec<SkillNodeRow>,
		#[serde(default)]
		layout: LayoutOverrides,
	},
}

/// Accepts either a bare array of rows or `{ "rows": [...], "layout": {...} }`.
pub fn parse_payload(json: &str) -> Result<TreePayload, TreeError> {
	let payload = match serde_json::from_str::<RawPayload>(json)? {
		RawPayload::Rows(rows) => TreePayload {
			rows,
			layout: LayoutOverrides::default(),
		},
		RawPayload::Document { rows, layout } => TreePayload { rows, layout },
	};
	info!("skill tree: loaded {} rows", payload.rows.len());
	Ok(payload)
}

/// Reads and parses the payload from the script element `element_id`.
pub fn load_from_document(element_id: &str) -> Result<TreePayload, TreeError> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or(TreeError::NoDocument)?;
	let script: HtmlScriptElement = document
		.get_element_by_id(element_id)
		.and_then(|el| el.dyn_into().ok())
		.ok_or_else(|| TreeError::MissingElement(element_id.into()))?;
	let text = script
		.text()
		.map_err(|_| TreeError::Unreadable(element_id.into()))?;
	parse_payload(&text)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bare_rows() {
		let payload = parse_payload(
			r#"[
				{"id": "1", "slug": "", "parent_slug": null, "name": "Me", "size": 24},
				{"id": "2", "slug": "art", "parent_slug": "", "name": "Art", "fixed": true,
				 "pin": {"x": 0.2, "y": 0.4, "relative": true}}
			]"#,
		)
		.unwrap();
		assert_eq!(payload.rows.len(), 2);
		assert_eq!(payload.layout, LayoutOverrides::default());
		let art = &payload.rows[1];
		assert!(art.fixed);
		assert_eq!(art.size, 0.0);
		assert_eq!(art.pin.map(|p| p.x), Some(0.2));
	}

	#[test]
	fn document_with_layout() {
		let payload = parse_payload(
			r#"{"rows": [{"slug": "", "name": "Me"}], "layout": {"charge": -120}}"#,
		)
		.unwrap();
		assert_eq!(payload.rows[0].name, "Me");
		assert_eq!(payload.layout.charge, Some(-120.0));
		assert_eq!(payload.layout.link_distance, None);
	}

	#[test]
	fn malformed_is_parse_error() {
		let err = parse_payload("{\"rows\": 3}").unwrap_err();
		assert!(matches!(err, TreeError::Parse(_)));
	}
}
