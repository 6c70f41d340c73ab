use crate::graph::{Edge, GraphSink, Node, NodeId, Position, Snapshot};

pub const NODE_WIDTH: f64 = 150.0;
pub const NODE_HEIGHT: f64 = 40.0;
const FIT_PADDING: f64 = 60.0;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub node_id: Option<NodeId>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// A connection being drawn from `source` towards the cursor (graph space).
#[derive(Clone, Debug, Default)]
pub struct ConnectState {
	pub source: Option<NodeId>,
	pub x: f64,
	pub y: f64,
}

/// Two linked nodes shown until the first table arrives.
pub fn placeholder_graph() -> Snapshot {
	let node = |id: &str, label: &str, y: f64| Node {
		id: id.to_string(),
		label: label.to_string(),
		position: Position::new(0.0, y),
		percent_change: 100.0,
	};
	Snapshot {
		nodes: vec![node("node1", "Node 1", 0.0), node("node2", "Node 2", 150.0)],
		edges: vec![Edge::labeled("node1-node2", "node1", "node2", 100.0)],
	}
}

/// What the canvas shows and how the user is currently interacting with it.
pub struct FlowCanvasState {
	pub graph: Snapshot,
	pub selection: Option<NodeId>,
	pub hover: Option<NodeId>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub connect: ConnectState,
	pub width: f64,
	pub height: f64,
	fitted: bool,
	placeholder: bool,
}

impl FlowCanvasState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			graph: placeholder_graph(),
			selection: None,
			hover: None,
			transform: ViewTransform {
				x: width / 2.0,
				y: 40.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			connect: ConnectState::default(),
			width,
			height,
			fitted: false,
			placeholder: true,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen point. Later nodes are drawn on top.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.graph
			.nodes
			.iter()
			.rev()
			.find(|node| {
				let Position { x, y } = node.position;
				gx >= x && gx <= x + NODE_WIDTH && gy >= y && gy <= y + NODE_HEIGHT
			})
			.map(|node| node.id.clone())
	}

	pub fn set_hover(&mut self, node: Option<NodeId>) {
		self.hover = node;
	}

	pub fn is_selected(&self, id: &str) -> bool {
		self.selection.as_deref() == Some(id)
	}

	/// Move a node while it is being dragged. The engine only hears about the
	/// final position.
	pub fn move_node(&mut self, id: &str, position: Position) {
		if let Some(node) = self.graph.nodes.iter_mut().find(|n| n.id == id) {
			node.position = position;
		}
	}

	pub fn node_position(&self, id: &str) -> Option<Position> {
		self.graph.node(id).map(|n| n.position)
	}

	/// Frame every node on the first non-empty graph.
	fn fit_view(&mut self) {
		if self.fitted || self.graph.nodes.is_empty() {
			return;
		}
		let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
		let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
		for node in &self.graph.nodes {
			min_x = min_x.min(node.position.x);
			min_y = min_y.min(node.position.y);
			max_x = max_x.max(node.position.x + NODE_WIDTH);
			max_y = max_y.max(node.position.y + NODE_HEIGHT);
		}
		let (w, h) = (max_x - min_x + 2.0 * FIT_PADDING, max_y - min_y + 2.0 * FIT_PADDING);
		let k = (self.width / w).min(self.height / h).clamp(0.1, 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - (min_x + max_x) / 2.0 * k,
			y: self.height / 2.0 - (min_y + max_y) / 2.0 * k,
			k,
		};
		self.fitted = true;
	}

	/// Frame the graph again, e.g. once the canvas has its real size.
	pub fn refit(&mut self) {
		self.fitted = false;
		self.fit_view();
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

impl GraphSink for FlowCanvasState {
	fn nodes_changed(&mut self, nodes: &[Node]) {
		self.graph.nodes = nodes.to_vec();
		// Real data gets framed on its own, not where the placeholder was.
		if std::mem::take(&mut self.placeholder) {
			self.fitted = false;
		}
		if let Some(id) = &self.hover {
			if self.graph.node(id).is_none() {
				self.hover = None;
			}
		}
		self.fit_view();
	}

	fn edges_changed(&mut self, edges: &[Edge]) {
		self.graph.edges = edges.to_vec();
	}
}
