//! Document services consumed by the scale tool
//!
//! The tool never edits geometry itself. It reads the selection bounds and
//! grid from a `MapDocument`, proposes new bounds through
//! `scale_objects`, and brackets every drag in a transaction so the
//! document can keep its own undo history.
//!
//! - `grid` - Grid size and snapping
//! - `notifier` - Subscribe/unsubscribe change notification
//! - `selection` - In-memory document with transactions and undo

pub mod grid;
pub mod notifier;
pub mod selection;

pub use grid::Grid;
pub use notifier::{Notifier, Subscription};
pub use selection::{Node, SelectionDocument};

use crate::geometry::BBox3;

/// Identifier of a node in a document
pub type NodeId = usize;

/// Change notifications a document broadcasts
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    NodesWereAdded(Vec<NodeId>),
    NodesWillChange(Vec<NodeId>),
    NodesWillBeRemoved(Vec<NodeId>),
    SelectionDidChange,
}

/// The document contract the scale tool works against
pub trait MapDocument {
    /// Bounds of the current selection, None when nothing is selected
    fn selection_bounds(&self) -> Option<BBox3>;

    fn has_selection(&self) -> bool {
        self.selection_bounds().is_some()
    }

    /// Active editing grid
    fn grid(&self) -> Grid;

    /// Rescale every selected object so that `old_bounds` maps onto
    /// `new_bounds`. Atomic: returns false without changing anything if the
    /// scale cannot be applied.
    fn scale_objects(&mut self, old_bounds: &BBox3, new_bounds: &BBox3) -> bool;

    fn begin_transaction(&mut self, name: &str);
    fn commit_transaction(&mut self);
    fn cancel_transaction(&mut self);

    /// Change notifications for nodes and selection
    fn notifier(&self) -> &Notifier<DocumentEvent>;
}
