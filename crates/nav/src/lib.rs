//! Reading-cursor navigation engine over an accessible tree
//!
//! The engine layers three pieces over a host implementing
//! `dom::TreeAccess`: a base document-order walker, a smart walker that
//! decides unit boundaries and handles table mode and stale-cursor
//! recovery, and a session surface exposing the command set plus
//! description records for speech output.

pub mod describe;
pub mod error;
pub mod session;
pub mod smart;
pub mod table;
pub mod walker;

pub use describe::Description;
pub use error::{NavError, Result};
pub use session::NavigationSession;
pub use smart::{NavConfig, SmartWalker};
pub use table::{TableCell, TableCursor, TableModel};
pub use walker::LinearWalker;
