//! Error types for the navigation engine
//!
//! Navigation commands are speculative by nature and report failure through
//! `Option`/`bool` results; `NavError` only covers genuine construction
//! faults.

use dom::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NavError>;

#[derive(Debug, Error)]
pub enum NavError {
    #[error("Node {0} is not a table")]
    NotATable(NodeId),
}
