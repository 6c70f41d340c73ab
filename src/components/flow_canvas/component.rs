use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::FlowCanvasState;
use crate::components::storage::{DebouncedStore, WebStorageStore};
use crate::graph::{FlowConfig, FlowSession, LayoutStore, Position, Table, Trigger};

type BrowserSession = FlowSession<DebouncedStore<WebStorageStore>>;

/// Run a trigger through the session and mirror the result on the canvas.
fn dispatch<S: LayoutStore>(
	session: &RefCell<FlowSession<S>>,
	canvas: &RefCell<FlowCanvasState>,
	trigger: Trigger,
) {
	let mut session = session.borrow_mut();
	let mut canvas = canvas.borrow_mut();
	session.dispatch(trigger, &mut *canvas);
	canvas.selection = session.state().selection.clone();
}

fn event_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

#[component]
pub fn FlowCanvas(
	#[prop(into)] table: Signal<Table>,
	#[prop(optional)] config: Option<FlowConfig>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let config = config.unwrap_or_default();
	let store = DebouncedStore::new(
		WebStorageStore::new(config.storage_key.clone()),
		config.persist_debounce_ms,
	);
	let session: Rc<RefCell<BrowserSession>> = Rc::new(RefCell::new(FlowSession::open(config, store)));
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state = Rc::new(RefCell::new(FlowCanvasState::new(
		width.unwrap_or(800.0),
		height.unwrap_or(600.0),
	)));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("Canvas 2d context is unavailable");
			return;
		};
		{
			let mut s = state_init.borrow_mut();
			s.resize(w, h);
			s.refit();
		}

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				state_resize.borrow_mut().resize(nw, nh);
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			render::render(&state_anim.borrow(), &ctx);
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Every new table goes through the engine.
	let (session_refresh, state_refresh) = (session.clone(), state.clone());
	Effect::new(move |_| {
		let table = table.get();
		dispatch(&session_refresh, &state_refresh, Trigger::RefreshTable(table));
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = event_point(canvas_ref, &ev) else {
			return;
		};
		let mut guard = state_md.borrow_mut();
		let s = &mut *guard;
		match s.node_at_position(x, y) {
			Some(id) if ev.shift_key() => {
				let (gx, gy) = s.screen_to_graph(x, y);
				s.connect.source = Some(id);
				s.connect.x = gx;
				s.connect.y = gy;
			}
			Some(id) => {
				let start = s.node_position(&id).unwrap_or_default();
				s.drag.node_start = start;
				s.drag.active = true;
				s.drag.moved = false;
				s.drag.node_id = Some(id);
				s.drag.start_x = x;
				s.drag.start_y = y;
			}
			None => {
				s.pan.active = true;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.transform.x;
				s.pan.transform_start_y = s.transform.y;
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = event_point(canvas_ref, &ev) else {
			return;
		};
		let mut guard = state_mm.borrow_mut();
		let s = &mut *guard;
		if !s.drag.active {
			let hovered = s.node_at_position(x, y);
			s.set_hover(hovered);
		}

		if s.drag.active {
			if let Some(id) = s.drag.node_id.clone() {
				let (dx, dy) = (
					(x - s.drag.start_x) / s.transform.k,
					(y - s.drag.start_y) / s.transform.k,
				);
				let start = s.drag.node_start;
				s.move_node(&id, Position::new(start.x + dx, start.y + dy));
				s.drag.moved = true;
			}
		} else if s.connect.source.is_some() {
			let (gx, gy) = s.screen_to_graph(x, y);
			s.connect.x = gx;
			s.connect.y = gy;
		} else if s.pan.active {
			s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
			s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
		}
	};

	// Ends whatever gesture is in progress and reports it to the engine.
	let finish_gesture = {
		let (state, session) = (state.clone(), session.clone());
		move |point: Option<(f64, f64)>| {
			let trigger = {
				let mut guard = state.borrow_mut();
				let s = &mut *guard;
				let drag = std::mem::take(&mut s.drag);
				let source = s.connect.source.take();
				s.pan.active = false;
				if let (true, Some(id)) = (drag.moved, drag.node_id) {
					s.node_position(&id)
						.map(|position| Trigger::CommitDrag { id, position })
				} else if let (Some(source), Some((x, y))) = (source, point) {
					s.node_at_position(x, y)
						.filter(|target| *target != source)
						.map(|target| Trigger::ConnectNodes { source, target })
				} else {
					None
				}
			};
			if let Some(trigger) = trigger {
				dispatch(&session, &state, trigger);
			}
		}
	};

	let finish_up = finish_gesture.clone();
	let on_mouseup = move |ev: MouseEvent| {
		finish_up(event_point(canvas_ref, &ev));
	};

	let (finish_leave, state_ml) = (finish_gesture, state.clone());
	let on_mouseleave = move |_: MouseEvent| {
		finish_leave(None);
		state_ml.borrow_mut().set_hover(None);
	};

	let (state_dc, session_dc) = (state.clone(), session.clone());
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = event_point(canvas_ref, &ev) else {
			return;
		};
		let hit = state_dc.borrow().node_at_position(x, y);
		let trigger = match hit {
			Some(id) => Trigger::ExpandNode { id },
			None => Trigger::ClearSelection,
		};
		dispatch(&session_dc, &state_dc, trigger);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = event_point(canvas_ref, &ev) else {
			return;
		};
		let mut guard = state_wh.borrow_mut();
		let s = &mut *guard;
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		let new_k = (s.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / s.transform.k;
		s.transform.x = x - (x - s.transform.x) * ratio;
		s.transform.y = y - (y - s.transform.y) * ratio;
		s.transform.k = new_k;
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="flow-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
