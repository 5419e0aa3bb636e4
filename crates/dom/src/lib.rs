//! Host document-tree layer
//!
//! Arena-backed tree storage plus the accessor capabilities a navigation
//! engine consumes: structural relationships, content extraction, leaf
//! tests, attachment (liveness) checks, and the breakout structural query.
//!
//! ## Core Design
//!
//! ```text
//! JSON fixture → DomArena (owned) → Document (capabilities) → TreeAccess
//!                     ↓
//!                NodeId (u32)
//! ```
//!
//! Handles stay valid after subtree detachment; attachment is a property,
//! not a lifetime.

pub mod access;
pub mod arena;
pub mod builder;
pub mod error;
pub mod types;
pub mod utils;

pub use access::{Document, DocumentConfig, ElementKind, TreeAccess};
pub use arena::DomArena;
pub use error::{DomError, Result};
pub use types::{DomNode, NodeId, NodeType};
