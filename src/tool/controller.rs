//! Input handling for the scale tool
//!
//! `ResizeController` turns per-frame input (a pick ray plus button edges)
//! into hover updates and begin/resize/commit/cancel calls on the tool.

use tracing::warn;

use crate::document::MapDocument;
use crate::geometry::Ray;
use super::drag::{DragStatus, TransactionOutcome};
use super::picker::HandlePicker;
use super::scale_tool::ScaleObjectsTool;
use super::tool::Tool;

/// Input passed to tool controllers each frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Ray under the mouse cursor, if the cursor is over the viewport
    pub pick_ray: Option<Ray>,
    /// Whether left mouse is held
    pub left_down: bool,
    /// Whether left mouse was just pressed this frame
    pub left_pressed: bool,
    /// Whether left mouse was just released this frame
    pub left_released: bool,
    /// Whether escape (or right mouse) asked to abort
    pub cancel_pressed: bool,
}

impl InputState {
    /// Input with only a cursor ray
    pub fn hover(ray: Ray) -> Self {
        Self { pick_ray: Some(ray), ..Default::default() }
    }

    pub fn press(ray: Ray) -> Self {
        Self { pick_ray: Some(ray), left_down: true, left_pressed: true, ..Default::default() }
    }

    pub fn drag(ray: Ray) -> Self {
        Self { pick_ray: Some(ray), left_down: true, ..Default::default() }
    }

    pub fn release() -> Self {
        Self { left_released: true, ..Default::default() }
    }
}

/// Result of accepting a drag operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragAcceptResult {
    /// No drag started
    None,
    /// This controller owns the drag until it ends
    Started,
}

/// Input handling trait for tools
///
/// `mouse_move` is broadcast to every active controller; the first
/// controller to return `Started` from `accept_mouse_drag` receives the
/// following `mouse_drag` calls and the final `end_mouse_drag`.
pub trait ToolController: Tool {
    /// Cursor moved without a drag (hover feedback)
    fn mouse_move(&mut self, _input: &InputState) {}

    /// Claim a drag starting at this input
    fn accept_mouse_drag(&mut self, _input: &InputState) -> DragAcceptResult {
        DragAcceptResult::None
    }

    /// Cursor moved while this controller owns the drag
    fn mouse_drag(&mut self, _input: &InputState) -> DragStatus {
        DragStatus::End
    }

    /// Button released
    fn end_mouse_drag(&mut self, _input: &InputState) {}

    /// Escape pressed. Return `true` if there was something to cancel.
    fn cancel(&mut self) -> bool {
        false
    }
}

/// Drives a `ScaleObjectsTool` from viewport input
pub struct ResizeController<D: MapDocument> {
    tool: ScaleObjectsTool<D>,
    picker: Box<dyn HandlePicker>,
    last_outcome: Option<TransactionOutcome>,
}

impl<D: MapDocument> ResizeController<D> {
    pub fn new(tool: ScaleObjectsTool<D>, picker: Box<dyn HandlePicker>) -> Self {
        Self { tool, picker, last_outcome: None }
    }

    pub fn tool(&self) -> &ScaleObjectsTool<D> {
        &self.tool
    }

    pub fn tool_mut(&mut self) -> &mut ScaleObjectsTool<D> {
        &mut self.tool
    }

    pub fn set_picker(&mut self, picker: Box<dyn HandlePicker>) {
        self.picker = picker;
    }

    /// How the most recent drag ended
    pub fn last_outcome(&self) -> Option<TransactionOutcome> {
        self.last_outcome
    }

    /// Route one frame of input. Returns the drag status if a drag was
    /// updated this frame.
    pub fn handle_input(&mut self, input: &InputState) -> Option<DragStatus> {
        if input.cancel_pressed {
            self.cancel();
            return None;
        }
        if input.left_released {
            self.end_mouse_drag(input);
            return None;
        }
        if input.left_pressed {
            self.accept_mouse_drag(input);
            return None;
        }
        if input.left_down && self.tool.is_resizing() {
            return Some(self.mouse_drag(input));
        }
        self.mouse_move(input);
        None
    }
}

impl<D: MapDocument> Tool for ResizeController<D> {
    fn id(&self) -> &'static str {
        self.tool.id()
    }

    fn label(&self) -> &'static str {
        self.tool.label()
    }

    fn active(&self) -> bool {
        self.tool.active()
    }

    fn do_activate(&mut self) -> bool {
        self.tool.do_activate()
    }

    fn do_deactivate(&mut self) -> bool {
        self.tool.do_deactivate()
    }
}

impl<D: MapDocument> ToolController for ResizeController<D> {
    fn mouse_move(&mut self, input: &InputState) {
        if self.tool.is_resizing() {
            return;
        }
        let result = match &input.pick_ray {
            Some(ray) => self.tool.pick_3d(ray, self.picker.as_ref()),
            None => Default::default(),
        };
        self.tool.update_hover(&result);
    }

    fn accept_mouse_drag(&mut self, input: &InputState) -> DragAcceptResult {
        let Some(ray) = &input.pick_ray else {
            return DragAcceptResult::None;
        };
        let result = self.tool.pick_3d(ray, self.picker.as_ref());
        match self.tool.begin_resize(&result) {
            Ok(true) => DragAcceptResult::Started,
            Ok(false) => DragAcceptResult::None,
            Err(err) => {
                warn!("could not start resize: {}", err);
                DragAcceptResult::None
            }
        }
    }

    fn mouse_drag(&mut self, input: &InputState) -> DragStatus {
        let Some(ray) = &input.pick_ray else {
            return DragStatus::Continue;
        };
        match self.tool.resize(ray) {
            Ok(status) => status,
            Err(err) => {
                warn!("resize ended: {}", err);
                DragStatus::End
            }
        }
    }

    fn end_mouse_drag(&mut self, _input: &InputState) {
        if self.tool.session().is_none() && !self.tool.process_notifications() {
            return;
        }
        match self.tool.commit_resize() {
            Ok(outcome) => self.last_outcome = Some(outcome),
            Err(err) => warn!("resize not committed: {}", err),
        }
    }

    fn cancel(&mut self) -> bool {
        if self.tool.session().is_none() {
            return false;
        }
        match self.tool.cancel_resize() {
            Ok(()) => {
                self.last_outcome = Some(TransactionOutcome::Cancelled);
                true
            }
            Err(err) => {
                warn!("resize not cancelled: {}", err);
                false
            }
        }
    }
}
