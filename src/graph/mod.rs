//! Table-to-graph synchronization and incremental child layout.

pub mod config;
pub mod edges;
pub mod error;
pub mod layout;
pub mod mapper;
pub mod percent;
pub mod persist;
pub mod reconcile;
pub mod session;
pub mod types;

pub use config::FlowConfig;
pub use error::LayoutError;
pub use persist::{LayoutBlob, LayoutStore, MemoryStore, PersistedLayout};
pub use reconcile::{Emission, GraphSink, SessionState, Transition, Trigger, reduce};
pub use session::FlowSession;
pub use types::{CellValue, Column, Edge, Node, NodeId, Position, Snapshot, Table};
