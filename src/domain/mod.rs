//! Domain layer: the mind map tree and its persisted record
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod mindmap;
pub mod node;
pub mod record;
pub mod tree;

pub use error::{require_title, DomainError, DomainResult};
pub use mindmap::{MapStats, MindMap};
pub use node::{Node, NodeId, NodeRef};
pub use record::{MapRecord, NodeRecord};
pub use tree::{NodeTree, PreOrderIter};
