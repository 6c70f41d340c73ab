use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{FlowCanvasState, NODE_HEIGHT, NODE_WIDTH};
use crate::graph::{Node, Position};

const EDGE_COLOR: &str = "#183B4E";
const NODE_FILL: &str = "#f2f2f5";
const NODE_BORDER: &str = "#222";
const SELECTED_BORDER: &str = "#ff0072";

pub fn render(state: &FlowCanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#ffffff");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_connection_preview(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn bottom_anchor(p: Position) -> (f64, f64) {
	(p.x + NODE_WIDTH / 2.0, p.y + NODE_HEIGHT)
}

fn top_anchor(p: Position) -> (f64, f64) {
	(p.x + NODE_WIDTH / 2.0, p.y)
}

/// Edges are drawn as steps: down from the parent, across, down into the child.
fn draw_edges(state: &FlowCanvasState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let arrow = 8.0;
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_fill_style_str(EDGE_COLOR);
	ctx.set_line_width(2.5);

	for edge in &state.graph.edges {
		let (Some(src), Some(tgt)) = (
			state.node_position(&edge.source),
			state.node_position(&edge.target),
		) else {
			continue;
		};
		let (x1, y1) = bottom_anchor(src);
		let (x2, y2) = top_anchor(tgt);
		let mid_y = (y1 + y2) / 2.0;

		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x1, mid_y);
		ctx.line_to(x2, mid_y);
		ctx.line_to(x2, y2 - arrow);
		ctx.stroke();

		// Arrow head points along the last segment.
		let dir = if y2 >= mid_y { 1.0 } else { -1.0 };
		ctx.begin_path();
		ctx.move_to(x2, y2);
		ctx.line_to(x2 - arrow * 0.6, y2 - arrow * dir);
		ctx.line_to(x2 + arrow * 0.6, y2 - arrow * dir);
		ctx.close_path();
		ctx.fill();

		if let Some(label) = &edge.label {
			let (lx, ly) = ((x1 + x2) / 2.0, mid_y);
			ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.5)));
			ctx.set_text_align("center");
			ctx.set_text_baseline("middle");
			ctx.set_fill_style_str("#ffffff");
			ctx.fill_rect(lx - 22.0, ly - 8.0, 44.0, 16.0);
			ctx.set_fill_style_str(EDGE_COLOR);
			let _ = ctx.fill_text(label, lx, ly);
		}
	}
}

fn draw_connection_preview(state: &FlowCanvasState, ctx: &CanvasRenderingContext2d) {
	let Some(source) = state.connect.source.as_deref() else {
		return;
	};
	let Some(pos) = state.node_position(source) else {
		return;
	};
	let (x1, y1) = bottom_anchor(pos);
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_line_width(1.5);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(6.0),
		&JsValue::from_f64(4.0),
	));
	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(state.connect.x, state.connect.y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &FlowCanvasState, ctx: &CanvasRenderingContext2d) {
	for node in &state.graph.nodes {
		draw_node(state, node, ctx);
	}
}

fn draw_node(state: &FlowCanvasState, node: &Node, ctx: &CanvasRenderingContext2d) {
	let Position { x, y } = node.position;
	let hovered = state.hover.as_deref() == Some(node.id.as_str());

	ctx.set_fill_style_str(if hovered { "#e6e6ee" } else { NODE_FILL });
	ctx.fill_rect(x, y, NODE_WIDTH, NODE_HEIGHT);
	ctx.set_line_width(if state.is_selected(&node.id) { 2.0 } else { 1.0 });
	ctx.set_stroke_style_str(if state.is_selected(&node.id) {
		SELECTED_BORDER
	} else {
		NODE_BORDER
	});
	ctx.stroke_rect(x, y, NODE_WIDTH, NODE_HEIGHT);

	// Handles: target on top, source at the bottom.
	ctx.set_fill_style_str(EDGE_COLOR);
	let (tx, ty) = top_anchor(node.position);
	ctx.fill_rect(tx - 4.0, ty - 5.0, 8.0, 10.0);
	let (bx, by) = bottom_anchor(node.position);
	ctx.fill_rect(bx - 4.0, by - 5.0, 8.0, 10.0);

	ctx.set_fill_style_str("#222");
	ctx.set_font("bold 14px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text_with_max_width(
		&node.label,
		x + NODE_WIDTH / 2.0,
		y + NODE_HEIGHT / 2.0,
		NODE_WIDTH - 16.0,
	);
}
