//! In-memory selection document
//!
//! A flat list of boxed nodes with a selection, a grid, nested
//! transactions and a bounded undo/redo history. Used by the replay tool
//! and by tests as the document the scale tool edits.

use tracing::{debug, warn};

use crate::geometry::{BBox3, Vec3};
use super::{DocumentEvent, Grid, MapDocument, NodeId, Notifier};

/// Maximum number of undo entries kept
const MAX_UNDO: usize = 100;

/// A named object represented by its bounds
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub bounds: BBox3,
}

/// Everything a transaction or undo entry needs to restore
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    nodes: Vec<Node>,
    selection: Vec<NodeId>,
}

#[derive(Debug)]
struct OpenTransaction {
    name: String,
    before: Snapshot,
}

#[derive(Debug, Clone)]
struct UndoEntry {
    name: String,
    state: Snapshot,
}

/// Document holding boxed nodes
#[derive(Debug)]
pub struct SelectionDocument {
    nodes: Vec<Node>,
    selection: Vec<NodeId>,
    next_id: NodeId,
    grid: Grid,
    notifier: Notifier<DocumentEvent>,
    transactions: Vec<OpenTransaction>,
    undo_stack: Vec<UndoEntry>,
    redo_stack: Vec<UndoEntry>,
}

impl SelectionDocument {
    pub fn new(grid: Grid) -> Self {
        Self {
            nodes: Vec::new(),
            selection: Vec::new(),
            next_id: 0,
            grid,
            notifier: Notifier::new(),
            transactions: Vec::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Add a node and return its id
    pub fn add_node(&mut self, name: impl Into<String>, bounds: BBox3) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.push(Node { id, name: name.into(), bounds });
        self.notifier.notify(&DocumentEvent::NodesWereAdded(vec![id]));
        id
    }

    /// Remove a node (and drop it from the selection). Returns false if unknown.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(index) = self.nodes.iter().position(|n| n.id == id) else {
            return false;
        };
        self.notifier.notify(&DocumentEvent::NodesWillBeRemoved(vec![id]));
        self.nodes.remove(index);
        if self.selection.contains(&id) {
            self.selection.retain(|&s| s != id);
            self.notifier.notify(&DocumentEvent::SelectionDidChange);
        }
        true
    }

    /// Replace a node's bounds directly (an edit made outside the scale tool)
    pub fn set_node_bounds(&mut self, id: NodeId, bounds: BBox3) -> bool {
        if !bounds.is_valid() || !self.nodes.iter().any(|n| n.id == id) {
            return false;
        }
        self.notifier.notify(&DocumentEvent::NodesWillChange(vec![id]));
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.bounds = bounds;
        }
        true
    }

    /// Replace the selection. Unknown ids are ignored.
    pub fn select(&mut self, ids: &[NodeId]) {
        self.selection = ids
            .iter()
            .copied()
            .filter(|id| self.nodes.iter().any(|n| n.id == *id))
            .collect();
        self.notifier.notify(&DocumentEvent::SelectionDidChange);
    }

    pub fn select_all(&mut self) {
        let ids: Vec<NodeId> = self.nodes.iter().map(|n| n.id).collect();
        self.select(&ids);
    }

    pub fn deselect_all(&mut self) {
        self.select(&[]);
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look a node up by name
    pub fn find_node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn selected_ids(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Number of transactions currently open
    pub fn transaction_depth(&self) -> usize {
        self.transactions.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Names of undoable transactions, oldest first
    pub fn undo_names(&self) -> Vec<&str> {
        self.undo_stack.iter().map(|e| e.name.as_str()).collect()
    }

    /// Undo the last committed transaction. Returns its name.
    pub fn undo(&mut self) -> Option<String> {
        if !self.transactions.is_empty() {
            warn!("undo requested with an open transaction");
            return None;
        }
        let entry = self.undo_stack.pop()?;
        let current = self.snapshot();
        self.restore(entry.state);
        self.redo_stack.push(UndoEntry { name: entry.name.clone(), state: current });
        Some(entry.name)
    }

    /// Redo the last undone transaction. Returns its name.
    pub fn redo(&mut self) -> Option<String> {
        if !self.transactions.is_empty() {
            warn!("redo requested with an open transaction");
            return None;
        }
        let entry = self.redo_stack.pop()?;
        let current = self.snapshot();
        self.restore(entry.state);
        self.undo_stack.push(UndoEntry { name: entry.name.clone(), state: current });
        Some(entry.name)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            selection: self.selection.clone(),
        }
    }

    fn restore(&mut self, state: Snapshot) {
        if state == self.snapshot() {
            return;
        }
        let ids: Vec<NodeId> = self.nodes.iter().map(|n| n.id).collect();
        self.notifier.notify(&DocumentEvent::NodesWillChange(ids));
        let selection_changed = state.selection != self.selection;
        self.nodes = state.nodes;
        self.selection = state.selection;
        if selection_changed {
            self.notifier.notify(&DocumentEvent::SelectionDidChange);
        }
    }
}

impl Default for SelectionDocument {
    fn default() -> Self {
        Self::new(Grid::default())
    }
}

/// Map a coordinate from one interval onto another along one axis.
/// None when a zero-length interval would have to grow.
fn remap_axis(value: f32, old_min: f32, old_size: f32, new_min: f32, new_size: f32) -> Option<f32> {
    if old_size == 0.0 {
        if new_size != 0.0 {
            return None;
        }
        return Some(new_min + (value - old_min));
    }
    Some(new_min + (value - old_min) * (new_size / old_size))
}

fn remap_point(p: Vec3, old: &BBox3, new: &BBox3) -> Option<Vec3> {
    let old_size = old.size();
    let new_size = new.size();
    Some(Vec3::new(
        remap_axis(p.x, old.min.x, old_size.x, new.min.x, new_size.x)?,
        remap_axis(p.y, old.min.y, old_size.y, new.min.y, new_size.y)?,
        remap_axis(p.z, old.min.z, old_size.z, new.min.z, new_size.z)?,
    ))
}

impl MapDocument for SelectionDocument {
    fn selection_bounds(&self) -> Option<BBox3> {
        self.nodes
            .iter()
            .filter(|n| self.selection.contains(&n.id))
            .map(|n| n.bounds)
            .reduce(|a, b| a.merge(&b))
    }

    fn grid(&self) -> Grid {
        self.grid
    }

    fn scale_objects(&mut self, old_bounds: &BBox3, new_bounds: &BBox3) -> bool {
        if !new_bounds.is_valid() {
            return false;
        }
        if self.selection_bounds().as_ref() != Some(old_bounds) {
            debug!("scale rejected: {} is not the selection bounds", old_bounds);
            return false;
        }

        // Compute everything first so a failure leaves the document untouched
        let mut scaled = Vec::with_capacity(self.selection.len());
        for node in self.nodes.iter().filter(|n| self.selection.contains(&n.id)) {
            let min = remap_point(node.bounds.min, old_bounds, new_bounds);
            let max = remap_point(node.bounds.max, old_bounds, new_bounds);
            match (min, max) {
                (Some(min), Some(max)) => scaled.push((node.id, BBox3::from_points(min, max))),
                _ => return false,
            }
        }

        self.notifier.notify(&DocumentEvent::NodesWillChange(self.selection.clone()));
        for (id, bounds) in scaled {
            if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
                node.bounds = bounds;
            }
        }
        true
    }

    fn begin_transaction(&mut self, name: &str) {
        debug!("begin transaction \"{}\"", name);
        self.transactions.push(OpenTransaction {
            name: name.to_string(),
            before: self.snapshot(),
        });
    }

    fn commit_transaction(&mut self) {
        let Some(transaction) = self.transactions.pop() else {
            warn!("commit without an open transaction");
            return;
        };
        debug!("commit transaction \"{}\"", transaction.name);

        // Nested transactions fold into the outermost one
        if !self.transactions.is_empty() {
            return;
        }
        self.undo_stack.push(UndoEntry {
            name: transaction.name,
            state: transaction.before,
        });
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_UNDO {
            self.undo_stack.remove(0);
        }
    }

    fn cancel_transaction(&mut self) {
        let Some(transaction) = self.transactions.pop() else {
            warn!("cancel without an open transaction");
            return;
        };
        debug!("cancel transaction \"{}\"", transaction.name);
        self.restore(transaction.before);
    }

    fn notifier(&self) -> &Notifier<DocumentEvent> {
        &self.notifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn cube(min: f32, max: f32) -> BBox3 {
        BBox3::new(Vec3::new(min, min, min), Vec3::new(max, max, max))
    }

    fn doc_with_two_nodes() -> (SelectionDocument, NodeId, NodeId) {
        let mut doc = SelectionDocument::default();
        let a = doc.add_node("a", cube(0.0, 1.0));
        let b = doc.add_node("b", cube(1.0, 2.0));
        doc.select_all();
        (doc, a, b)
    }

    #[test]
    fn test_selection_bounds() {
        let (mut doc, a, _) = doc_with_two_nodes();
        assert_eq!(doc.selection_bounds(), Some(cube(0.0, 2.0)));

        doc.select(&[a]);
        assert_eq!(doc.selection_bounds(), Some(cube(0.0, 1.0)));

        doc.deselect_all();
        assert!(!doc.has_selection());
    }

    #[test]
    fn test_scale_objects_maps_every_node() {
        let (mut doc, a, b) = doc_with_two_nodes();
        let new = BBox3::new(Vec3::ZERO, Vec3::new(4.0, 2.0, 2.0));
        assert!(doc.scale_objects(&cube(0.0, 2.0), &new));

        assert_eq!(doc.node(a).unwrap().bounds, BBox3::new(Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0)));
        assert_eq!(
            doc.node(b).unwrap().bounds,
            BBox3::new(Vec3::new(2.0, 1.0, 1.0), Vec3::new(4.0, 2.0, 2.0)),
        );
        assert_eq!(doc.selection_bounds(), Some(new));
    }

    #[test]
    fn test_scale_objects_rejects_stale_or_invalid() {
        let (mut doc, _, _) = doc_with_two_nodes();
        let before = doc.nodes().to_vec();

        assert!(!doc.scale_objects(&cube(0.0, 3.0), &cube(0.0, 4.0)));
        assert!(!doc.scale_objects(&cube(0.0, 2.0), &BBox3::new(Vec3::ONE, Vec3::ZERO)));
        assert_eq!(doc.nodes(), &before[..]);
    }

    #[test]
    fn test_flat_axis_cannot_grow() {
        let mut doc = SelectionDocument::default();
        let flat = BBox3::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 2.0));
        doc.add_node("plane", flat);
        doc.select_all();

        let taller = BBox3::new(Vec3::ZERO, Vec3::new(2.0, 1.0, 2.0));
        assert!(!doc.scale_objects(&flat, &taller));

        let wider = BBox3::new(Vec3::ZERO, Vec3::new(3.0, 0.0, 2.0));
        assert!(doc.scale_objects(&flat, &wider));
    }

    #[test]
    fn test_cancel_restores_and_commit_is_undoable() {
        let (mut doc, _, _) = doc_with_two_nodes();
        let start = doc.selection_bounds().unwrap();
        let bigger = cube(0.0, 4.0);

        doc.begin_transaction("Resize Brushes");
        assert!(doc.scale_objects(&start, &bigger));
        doc.cancel_transaction();
        assert_eq!(doc.selection_bounds(), Some(start));
        assert!(!doc.can_undo());

        doc.begin_transaction("Resize Brushes");
        assert!(doc.scale_objects(&start, &bigger));
        doc.commit_transaction();
        assert_eq!(doc.undo_names(), vec!["Resize Brushes"]);

        assert_eq!(doc.undo().as_deref(), Some("Resize Brushes"));
        assert_eq!(doc.selection_bounds(), Some(start));
        assert_eq!(doc.redo().as_deref(), Some("Resize Brushes"));
        assert_eq!(doc.selection_bounds(), Some(bigger));
    }

    #[test]
    fn test_nested_transactions_fold() {
        let (mut doc, _, _) = doc_with_two_nodes();
        doc.begin_transaction("outer");
        doc.begin_transaction("inner");
        assert_eq!(doc.transaction_depth(), 2);
        doc.commit_transaction();
        doc.commit_transaction();
        assert_eq!(doc.undo_names(), vec!["outer"]);
    }

    #[test]
    fn test_undo_history_is_bounded() {
        let (mut doc, _, _) = doc_with_two_nodes();
        for _ in 0..(MAX_UNDO + 5) {
            doc.begin_transaction("step");
            doc.commit_transaction();
        }
        assert_eq!(doc.undo_names().len(), MAX_UNDO);
    }

    #[test]
    fn test_notifications() {
        let mut doc = SelectionDocument::default();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let _sub = doc.notifier().subscribe(move |e: &DocumentEvent| sink.borrow_mut().push(e.clone()));

        let id = doc.add_node("a", cube(0.0, 1.0));
        doc.select(&[id]);
        doc.set_node_bounds(id, cube(0.0, 2.0));
        doc.remove_node(id);

        assert_eq!(
            *events.borrow(),
            vec![
                DocumentEvent::NodesWereAdded(vec![id]),
                DocumentEvent::SelectionDidChange,
                DocumentEvent::NodesWillChange(vec![id]),
                DocumentEvent::NodesWillBeRemoved(vec![id]),
                DocumentEvent::SelectionDidChange,
            ],
        );
    }
}
