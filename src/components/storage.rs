//! Browser-backed layout storage.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::Storage;

use crate::graph::{LayoutBlob, LayoutError, LayoutStore};

fn js_error(err: JsValue) -> LayoutError {
	LayoutError::Storage(format!("{err:?}"))
}

fn local_storage() -> Result<Storage, LayoutError> {
	let window = web_sys::window().ok_or_else(|| LayoutError::Storage("no window".into()))?;
	window
		.local_storage()
		.map_err(js_error)?
		.ok_or_else(|| LayoutError::Storage("localStorage is unavailable".into()))
}

/// Keeps the layout blob in `localStorage` under a fixed key.
#[derive(Clone, Debug)]
pub struct WebStorageStore {
	key: String,
}

impl WebStorageStore {
	pub fn new(key: impl Into<String>) -> Self {
		Self { key: key.into() }
	}
}

impl LayoutStore for WebStorageStore {
	fn load(&self) -> Result<Option<LayoutBlob>, LayoutError> {
		let raw = local_storage()?.get_item(&self.key).map_err(js_error)?;
		raw.as_deref().map(LayoutBlob::parse).transpose()
	}

	fn save(&mut self, blob: &LayoutBlob) -> Result<(), LayoutError> {
		local_storage()?
			.set_item(&self.key, &blob.to_json()?)
			.map_err(js_error)
	}
}

/// Coalesces bursts of saves: each save restarts a quiet-period timer and
/// only the latest blob is written when it fires.
pub struct DebouncedStore<S> {
	inner: Rc<RefCell<S>>,
	pending: Rc<RefCell<Option<LayoutBlob>>>,
	delay_ms: i32,
	timer: Option<i32>,
	flush: Closure<dyn FnMut()>,
}

impl<S: LayoutStore + 'static> DebouncedStore<S> {
	pub fn new(inner: S, delay_ms: u32) -> Self {
		let inner = Rc::new(RefCell::new(inner));
		let pending: Rc<RefCell<Option<LayoutBlob>>> = Rc::new(RefCell::new(None));
		let (inner_flush, pending_flush) = (inner.clone(), pending.clone());
		let flush = Closure::new(move || {
			let Some(blob) = pending_flush.borrow_mut().take() else {
				return;
			};
			match inner_flush.borrow_mut().save(&blob) {
				Ok(()) => debug!("Flushed debounced layout write"),
				Err(err) => warn!("Could not write layout: {err}"),
			}
		});
		Self {
			inner,
			pending,
			delay_ms: i32::try_from(delay_ms).unwrap_or(i32::MAX),
			timer: None,
			flush,
		}
	}
}

impl<S: LayoutStore + 'static> LayoutStore for DebouncedStore<S> {
	fn load(&self) -> Result<Option<LayoutBlob>, LayoutError> {
		if let Some(blob) = self.pending.borrow().clone() {
			return Ok(Some(blob));
		}
		self.inner.borrow().load()
	}

	fn save(&mut self, blob: &LayoutBlob) -> Result<(), LayoutError> {
		*self.pending.borrow_mut() = Some(blob.clone());
		let window = web_sys::window().ok_or_else(|| LayoutError::Storage("no window".into()))?;
		if let Some(handle) = self.timer.take() {
			window.clear_timeout_with_handle(handle);
		}
		let handle = window
			.set_timeout_with_callback_and_timeout_and_arguments_0(
				self.flush.as_ref().unchecked_ref(),
				self.delay_ms,
			)
			.map_err(js_error)?;
		self.timer = Some(handle);
		Ok(())
	}
}
