//! Scale objects tool
//!
//! Lets the user grab a face, edge or corner handle of the selection's
//! bounding box and drag it to rescale everything selected. Each drag runs
//! inside one document transaction that is committed when the handle is
//! released, or cancelled if nothing moved or the drag was abandoned.
//!
//! ```text
//! [Idle] --begin_resize(hit)--> [Dragging] --commit_resize()--> [Idle]
//!                                  |  ^                          ^
//!                         resize() +--+    cancel_resize() ------+
//! ```
//!
//! The tool holds only a weak handle to the document. It listens for node
//! and selection changes; a change it did not make itself while a drag is
//! running cancels the drag.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::document::{DocumentEvent, MapDocument, Subscription};
use crate::error::{ToolError, ToolResult};
use crate::geometry::{BBox3, Ray, Vec3};
use super::drag::{DragSession, DragStatus, TransactionOutcome};
use super::feature::{polygon_for_side, BoxFeature};
use super::hit::{Hit, HitKind, PickResult};
use super::picker::{pick_handles, HandlePicker};
use super::tool::Tool;

/// Name of the transaction opened for every resize drag
pub const RESIZE_TRANSACTION: &str = "Resize Brushes";

/// Remembers the first document change seen while a drag is watched.
/// Nothing is kept while the tool is idle.
#[derive(Debug, Default)]
struct ChangeWatch {
    watching: Cell<bool>,
    first: RefCell<Option<DocumentEvent>>,
}

impl ChangeWatch {
    fn record(&self, event: &DocumentEvent) {
        if self.watching.get() && self.first.borrow().is_none() {
            *self.first.borrow_mut() = Some(event.clone());
        }
    }

    fn start(&self) {
        self.first.take();
        self.watching.set(true);
    }

    fn stop(&self) -> Option<DocumentEvent> {
        self.watching.set(false);
        self.first.take()
    }

    fn is_pending(&self) -> bool {
        self.first.borrow().is_some()
    }

    /// Stop watching for the duration of one edit, returning the previous state
    fn pause(&self) -> bool {
        self.watching.replace(false)
    }

    fn resume(&self, watching: bool) {
        self.watching.set(watching);
    }
}

pub struct ScaleObjectsTool<D: MapDocument> {
    document: Weak<RefCell<D>>,
    handle_radius: f32,
    active: bool,
    hovered: Option<Hit>,
    session: Option<DragSession>,
    /// External changes seen during the current drag
    changes: Rc<ChangeWatch>,
    /// Set when a drag was cancelled by a document change, until reported
    invalidated: bool,
    _subscription: Subscription,
}

impl<D: MapDocument> ScaleObjectsTool<D> {
    /// Create a tool for `document`. `handle_radius` is handed to the
    /// handle picker for corner and edge tolerance.
    pub fn new(document: Weak<RefCell<D>>, handle_radius: f32) -> ToolResult<Self> {
        let strong = document.upgrade().ok_or(ToolError::DocumentExpired)?;
        let changes = Rc::new(ChangeWatch::default());
        let sink = Rc::clone(&changes);
        let subscription = strong
            .borrow()
            .notifier()
            .subscribe(move |event: &DocumentEvent| sink.record(event));

        Ok(Self {
            document,
            handle_radius,
            active: false,
            hovered: None,
            session: None,
            changes,
            invalidated: false,
            _subscription: subscription,
        })
    }

    pub fn handle_radius(&self) -> f32 {
        self.handle_radius
    }

    pub fn set_handle_radius(&mut self, radius: f32) {
        self.handle_radius = radius;
    }

    /// True if there is something selected to scale
    pub fn applies(&self) -> bool {
        self.document
            .upgrade()
            .map(|doc| doc.borrow().has_selection())
            .unwrap_or(false)
    }

    /// Current bounds of the selection
    pub fn bounds(&self) -> ToolResult<BBox3> {
        let document = self.document()?;
        let bounds = document.borrow().selection_bounds();
        bounds.ok_or(ToolError::NoSelection)
    }

    /// The tool has no 2D handles
    pub fn pick_2d(&self, _ray: &Ray) -> Option<Hit> {
        None
    }

    /// Pick the selection box handles. Empty if nothing is selected.
    pub fn pick_3d<P: HandlePicker + ?Sized>(&self, ray: &Ray, picker: &P) -> PickResult {
        match self.bounds() {
            Ok(bounds) => pick_handles(ray, &bounds, picker, self.handle_radius),
            Err(_) => PickResult::new(),
        }
    }

    /// Remember the nearest handle under the cursor. Ignored while dragging.
    pub fn update_hover(&mut self, result: &PickResult) {
        if self.session.is_none() {
            self.hovered = result.first_of(&HitKind::ALL).copied();
        }
    }

    pub fn hovered_hit(&self) -> Option<&Hit> {
        self.hovered.as_ref()
    }

    /// Outline of the face being dragged (or hovered) on the current
    /// bounds. Empty for edge and corner handles.
    pub fn drag_polygon(&self) -> Vec<Vec3> {
        let hit = self.session.map(|s| s.start_hit).or(self.hovered);
        match (hit.map(|h| h.target), self.bounds()) {
            (Some(BoxFeature::Side(side)), Ok(bounds)) => polygon_for_side(&bounds, side).to_vec(),
            _ => Vec::new(),
        }
    }

    pub fn has_drag_polygon(&self) -> bool {
        !self.drag_polygon().is_empty()
    }

    /// True while a drag is running and no document change has cancelled it
    pub fn is_resizing(&self) -> bool {
        self.session.is_some() && !self.changes.is_pending()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Start dragging the nearest handle in `result`.
    ///
    /// Returns `Ok(false)` without opening a transaction if nothing was hit.
    pub fn begin_resize(&mut self, result: &PickResult) -> ToolResult<bool> {
        self.process_notifications();
        // A stale invalidation belongs to the previous drag
        self.invalidated = false;

        if self.session.is_some() {
            return Err(ToolError::AlreadyDragging);
        }
        let Some(hit) = result.first_of(&HitKind::ALL).copied() else {
            return Ok(false);
        };

        let document = self.document()?;
        let bounds = document.borrow().selection_bounds();
        let bounds = bounds.ok_or(ToolError::NoSelection)?;

        self.quiet_edit(&document, |doc| doc.begin_transaction(RESIZE_TRANSACTION));
        self.changes.start();
        let session = DragSession::new(hit, bounds);
        debug!(
            "begin resize: {} axis {} from {} at {}",
            hit.target, session.axis(), bounds, session.drag_origin,
        );
        self.session = Some(session);
        self.hovered = Some(hit);
        Ok(true)
    }

    /// Drag the grabbed handle towards `ray`.
    ///
    /// A ray parallel to the drag axis changes nothing and continues.
    /// A snapped delta the document refuses (or that would turn the box
    /// inside out) is denied; the drag stays alive.
    pub fn resize(&mut self, ray: &Ray) -> ToolResult<DragStatus> {
        self.take_invalidation()?;
        let mut session = self.session.ok_or(ToolError::NotDragging)?;
        let document = self.document_for_session()?;
        let grid = document.borrow().grid();

        let (new_bounds, delta) = match session.propose(ray, &grid) {
            Ok(Some(proposal)) => proposal,
            Ok(None) => return Ok(DragStatus::Continue),
            Err(delta) => {
                debug!("resize denied: delta {} collapses {}", delta, session.box_at_start);
                return Ok(DragStatus::Deny);
            }
        };
        if delta == session.total_delta {
            return Ok(DragStatus::Continue);
        }

        let current = document.borrow().selection_bounds();
        let Some(current) = current else {
            warn!("resize denied: selection is empty");
            return Ok(DragStatus::Deny);
        };
        if !self.quiet_edit(&document, |doc| doc.scale_objects(&current, &new_bounds)) {
            warn!("resize denied: document rejected {} -> {}", current, new_bounds);
            return Ok(DragStatus::Deny);
        }

        session.total_delta = delta;
        self.session = Some(session);
        debug!("resize: delta {} bounds {}", delta, new_bounds);
        Ok(DragStatus::Continue)
    }

    /// Finish the drag. A drag that moved nothing is cancelled instead of
    /// committed so it leaves no undo entry.
    pub fn commit_resize(&mut self) -> ToolResult<TransactionOutcome> {
        self.take_invalidation()?;
        let session = self.session.take().ok_or(ToolError::NotDragging)?;
        self.changes.stop();
        let document = self.document()?;

        if session.total_delta.is_zero() {
            self.quiet_edit(&document, |doc| doc.cancel_transaction());
            debug!("resize finished without change");
            Ok(TransactionOutcome::Cancelled)
        } else {
            self.quiet_edit(&document, |doc| doc.commit_transaction());
            debug!("resize committed: delta {}", session.total_delta);
            Ok(TransactionOutcome::Committed)
        }
    }

    /// Abandon the drag and roll back everything it changed
    pub fn cancel_resize(&mut self) -> ToolResult<()> {
        self.take_invalidation()?;
        self.session.take().ok_or(ToolError::NotDragging)?;
        self.changes.stop();
        let document = self.document()?;
        self.quiet_edit(&document, |doc| doc.cancel_transaction());
        debug!("resize cancelled");
        Ok(())
    }

    /// Handle a document change seen since the drag started. Returns true
    /// if it cancelled the running drag.
    pub fn process_notifications(&mut self) -> bool {
        if self.session.is_none() || !self.changes.is_pending() {
            return false;
        }
        self.session = None;
        if let Some(event) = self.changes.stop() {
            warn!("resize cancelled by document change: {:?}", event);
        }
        self.invalidated = true;
        if let Some(document) = self.document.upgrade() {
            self.quiet_edit(&document, |doc| doc.cancel_transaction());
        }
        true
    }

    fn take_invalidation(&mut self) -> ToolResult<()> {
        self.process_notifications();
        if std::mem::take(&mut self.invalidated) {
            return Err(ToolError::DragInvalidated);
        }
        Ok(())
    }

    fn document(&self) -> ToolResult<Rc<RefCell<D>>> {
        self.document.upgrade().ok_or(ToolError::DocumentExpired)
    }

    /// Like `document`, but a vanished document also ends the drag
    fn document_for_session(&mut self) -> ToolResult<Rc<RefCell<D>>> {
        let document = self.document.upgrade();
        document.ok_or_else(|| {
            warn!("document dropped during resize");
            self.session = None;
            self.changes.stop();
            ToolError::DocumentExpired
        })
    }

    /// Run an edit on the document, ignoring the notifications it raises
    fn quiet_edit<R>(&self, document: &RefCell<D>, edit: impl FnOnce(&mut D) -> R) -> R {
        let watching = self.changes.pause();
        let result = edit(&mut document.borrow_mut());
        self.changes.resume(watching);
        result
    }
}

impl<D: MapDocument> Tool for ScaleObjectsTool<D> {
    fn id(&self) -> &'static str {
        "scale_objects"
    }

    fn label(&self) -> &'static str {
        "Scale Objects"
    }

    fn active(&self) -> bool {
        self.active
    }

    fn do_activate(&mut self) -> bool {
        self.active = true;
        true
    }

    fn do_deactivate(&mut self) -> bool {
        if self.session.is_some() {
            if let Err(err) = self.cancel_resize() {
                debug!("resize ended on deactivate: {}", err);
            }
        }
        self.hovered = None;
        self.active = false;
        true
    }
}

impl<D: MapDocument> Drop for ScaleObjectsTool<D> {
    fn drop(&mut self) {
        if self.session.take().is_none() {
            return;
        }
        let Some(document) = self.document.upgrade() else {
            return;
        };
        match document.try_borrow_mut() {
            Ok(mut doc) => doc.cancel_transaction(),
            Err(_) => warn!("document busy while dropping tool, resize transaction left open"),
        };
    }
}
