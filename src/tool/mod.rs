//! Scale objects tool
//!
//! - `feature` - Box sides, edges and corners on the unit cube
//! - `hit` - Pick hits and ranked results
//! - `picker` - Ray against box handles
//! - `drag` - Drag session and delta projection
//! - `scale_tool` - The resize state machine
//! - `tool` / `controller` - Tool lifecycle and input routing

pub mod controller;
pub mod drag;
pub mod feature;
pub mod hit;
pub mod picker;
pub mod scale_tool;
pub mod tool;

pub use controller::{DragAcceptResult, InputState, ResizeController, ToolController};
pub use drag::{DragSession, DragStatus, TransactionOutcome};
pub use feature::{BBoxCorner, BBoxEdge, BBoxSide, BoxFeature};
pub use hit::{Hit, HitKind, PickResult};
pub use picker::{pick_box, pick_handles, HandlePicker, WorldHandlePicker};
pub use scale_tool::{ScaleObjectsTool, RESIZE_TRANSACTION};
pub use tool::Tool;
