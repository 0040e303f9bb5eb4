//! Scripted interaction replay
//!
//! A scenario is a RON file describing a set of named boxes, which of them
//! are selected, and a sequence of input steps to feed through a
//! `ResizeController`. Used by the `replay` command and by tests to run
//! whole press/drag/release sessions against an in-memory document.
//!
//! ```ron
//! (
//!     boxes: [(name: "crate", min: (x: 0, y: 0, z: 0), max: (x: 2, y: 2, z: 2))],
//!     steps: [
//!         Press(World(origin: (x: 5, y: 1, z: 1), direction: (x: -1, y: 0, z: 0))),
//!         Drag(World(origin: (x: 3, y: 1, z: 5), direction: (x: 0, y: 0, z: -1))),
//!         Release,
//!         Expect(Bounds(min: (x: 0, y: 0, z: 0), max: (x: 3, y: 2, z: 2))),
//!     ],
//! )
//! ```

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Preferences, PrefsError};
use crate::document::{MapDocument, NodeId, SelectionDocument};
use crate::error::ToolError;
use crate::geometry::{BBox3, Camera, Ray, Vec3};
use crate::tool::{
    HandlePicker, HitKind, InputState, ResizeController, ScaleObjectsTool, WorldHandlePicker,
};

/// Tolerance for bounds expectations
const EPSILON: f32 = 1e-4;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error(transparent)]
    Preferences(#[from] PrefsError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("unknown box \"{0}\"")]
    UnknownBox(String),
    #[error("box \"{name}\" is invalid: {bounds}")]
    InvalidBox { name: String, bounds: BBox3 },
    #[error("step {step}: screen ray given but the scenario has no camera")]
    NoCamera { step: usize },
    #[error("step {step}: expected {expected}, got {actual}")]
    ExpectationFailed { step: usize, expected: String, actual: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec {
    pub name: String,
    pub min: Vec3,
    pub max: Vec3,
}

impl BoxSpec {
    fn bounds(&self) -> BBox3 {
        BBox3::new(self.min, self.max)
    }
}

/// Perspective camera placed in the scene. With a camera, handle radius is
/// measured in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSpec {
    pub position: Vec3,
    pub target: Vec3,
    pub viewport: (usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RaySpec {
    World { origin: Vec3, direction: Vec3 },
    /// Framebuffer pixel, cast through the scenario camera
    Screen { x: f32, y: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expectation {
    /// Selection bounds
    Bounds { min: Vec3, max: Vec3 },
    /// Bounds of one named box
    BoxBounds { name: String, min: Vec3, max: Vec3 },
    /// Kind of the hovered handle, None for no hover
    Hovered(Option<HitKind>),
    Resizing(bool),
    /// Number of undoable transactions
    UndoDepth(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Move the cursor without pressing
    Pick(RaySpec),
    Press(RaySpec),
    Drag(RaySpec),
    Release,
    /// Escape
    Cancel,
    /// Change one box behind the tool's back
    ExternalEdit { name: String, min: Vec3, max: Vec3 },
    Undo,
    Redo,
    Expect(Expectation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub boxes: Vec<BoxSpec>,
    /// Names of the selected boxes. Empty selects everything.
    #[serde(default)]
    pub selection: Vec<String>,
    #[serde(default)]
    pub preferences: Option<Preferences>,
    #[serde(default)]
    pub camera: Option<CameraSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// What a replay did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    /// One line per step
    pub log: Vec<String>,
    pub final_bounds: Option<BBox3>,
    pub undo_depth: usize,
}

impl Scenario {
    pub fn from_ron(s: &str) -> Result<Self, ScenarioError> {
        Ok(ron::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_ron(&contents)
    }

    /// Build the document and tool, then play every step in order.
    /// Stops at the first failed expectation.
    pub fn run(&self) -> Result<ReplayReport, ScenarioError> {
        let prefs = self.preferences.unwrap_or_default();
        prefs.validate()?;

        let document = Rc::new(RefCell::new(SelectionDocument::new(prefs.grid())));
        self.populate(&mut document.borrow_mut())?;

        let camera = self
            .camera
            .map(|spec| Camera::looking_at(spec.position, spec.target, spec.viewport));
        let picker: Box<dyn HandlePicker> = match &camera {
            Some(camera) => Box::new(camera.clone()),
            None => Box::new(WorldHandlePicker),
        };
        let tool = ScaleObjectsTool::new(Rc::downgrade(&document), prefs.handle_radius)?;
        let mut controller = ResizeController::new(tool, picker);

        let mut report = ReplayReport::default();
        for (index, step) in self.steps.iter().enumerate() {
            let step_no = index + 1;
            let line = self.play(step_no, step, &document, &mut controller, camera.as_ref())?;
            debug!("step {}: {}", step_no, line);
            report.log.push(format!("{:>3}  {}", step_no, line));
        }

        let document = document.borrow();
        report.final_bounds = document.selection_bounds();
        report.undo_depth = document.undo_names().len();
        info!("replayed {} steps", self.steps.len());
        Ok(report)
    }

    fn populate(&self, document: &mut SelectionDocument) -> Result<(), ScenarioError> {
        for spec in &self.boxes {
            let bounds = spec.bounds();
            if !bounds.is_valid() {
                return Err(ScenarioError::InvalidBox { name: spec.name.clone(), bounds });
            }
            document.add_node(spec.name.clone(), bounds);
        }

        if self.selection.is_empty() {
            document.select_all();
        } else {
            let ids = self
                .selection
                .iter()
                .map(|name| node_id(document, name))
                .collect::<Result<Vec<_>, _>>()?;
            document.select(&ids);
        }
        Ok(())
    }

    fn play(
        &self,
        step_no: usize,
        step: &Step,
        document: &Rc<RefCell<SelectionDocument>>,
        controller: &mut ResizeController<SelectionDocument>,
        camera: Option<&Camera>,
    ) -> Result<String, ScenarioError> {
        let line = match step {
            Step::Pick(spec) => {
                controller.handle_input(&InputState::hover(resolve_ray(step_no, spec, camera)?));
                match controller.tool().hovered_hit() {
                    Some(hit) => format!("hover {} at {:.3}", hit.target, hit.distance),
                    None => "hover nothing".to_string(),
                }
            }
            Step::Press(spec) => {
                controller.handle_input(&InputState::press(resolve_ray(step_no, spec, camera)?));
                match controller.tool().session() {
                    Some(session) => format!("grab {} at {}", session.feature(), session.drag_origin),
                    None => "press on nothing".to_string(),
                }
            }
            Step::Drag(spec) => {
                let status = controller.handle_input(&InputState::drag(resolve_ray(step_no, spec, camera)?));
                let bounds = document.borrow().selection_bounds();
                match (status, bounds) {
                    (Some(status), Some(bounds)) => format!("drag {:?} -> {}", status, bounds),
                    (Some(status), None) => format!("drag {:?}", status),
                    (None, _) => "drag ignored".to_string(),
                }
            }
            Step::Release => {
                controller.handle_input(&InputState::release());
                match controller.last_outcome() {
                    Some(outcome) => format!("release ({:?})", outcome),
                    None => "release".to_string(),
                }
            }
            Step::Cancel => {
                let escape = InputState { cancel_pressed: true, ..Default::default() };
                controller.handle_input(&escape);
                "cancel".to_string()
            }
            Step::ExternalEdit { name, min, max } => {
                let bounds = BBox3::new(*min, *max);
                let mut document = document.borrow_mut();
                let id = node_id(&document, name)?;
                if !document.set_node_bounds(id, bounds) {
                    return Err(ScenarioError::InvalidBox { name: name.clone(), bounds });
                }
                format!("edit {} -> {}", name, bounds)
            }
            Step::Undo => match document.borrow_mut().undo() {
                Some(name) => format!("undo \"{}\"", name),
                None => "undo (nothing)".to_string(),
            },
            Step::Redo => match document.borrow_mut().redo() {
                Some(name) => format!("redo \"{}\"", name),
                None => "redo (nothing)".to_string(),
            },
            Step::Expect(expectation) => {
                check(step_no, expectation, &document.borrow(), controller)?;
                format!("ok {:?}", expectation)
            }
        };
        Ok(line)
    }
}

fn node_id(document: &SelectionDocument, name: &str) -> Result<NodeId, ScenarioError> {
    document
        .find_node(name)
        .map(|node| node.id)
        .ok_or_else(|| ScenarioError::UnknownBox(name.to_string()))
}

fn resolve_ray(step: usize, spec: &RaySpec, camera: Option<&Camera>) -> Result<Ray, ScenarioError> {
    match spec {
        RaySpec::World { origin, direction } => Ok(Ray::new(*origin, *direction)),
        RaySpec::Screen { x, y } => camera
            .map(|camera| camera.screen_to_ray(*x, *y))
            .ok_or(ScenarioError::NoCamera { step }),
    }
}

fn boxes_match(a: &BBox3, b: &BBox3) -> bool {
    let close = |p: Vec3, q: Vec3| (p - q).len() <= EPSILON;
    close(a.min, b.min) && close(a.max, b.max)
}

fn check(
    step: usize,
    expectation: &Expectation,
    document: &SelectionDocument,
    controller: &ResizeController<SelectionDocument>,
) -> Result<(), ScenarioError> {
    let fail = |expected: String, actual: String| ScenarioError::ExpectationFailed { step, expected, actual };

    match expectation {
        Expectation::Bounds { min, max } => {
            let expected = BBox3::new(*min, *max);
            match document.selection_bounds() {
                Some(actual) if boxes_match(&actual, &expected) => Ok(()),
                Some(actual) => Err(fail(expected.to_string(), actual.to_string())),
                None => Err(fail(expected.to_string(), "no selection".to_string())),
            }
        }
        Expectation::BoxBounds { name, min, max } => {
            let expected = BBox3::new(*min, *max);
            let id = node_id(document, name)?;
            let actual = document.node(id).map(|node| node.bounds);
            match actual {
                Some(actual) if boxes_match(&actual, &expected) => Ok(()),
                Some(actual) => Err(fail(format!("{} = {}", name, expected), actual.to_string())),
                None => Err(ScenarioError::UnknownBox(name.clone())),
            }
        }
        Expectation::Hovered(kind) => {
            let actual = controller.tool().hovered_hit().map(|hit| hit.kind());
            if actual == *kind {
                Ok(())
            } else {
                Err(fail(format!("hover {:?}", kind), format!("hover {:?}", actual)))
            }
        }
        Expectation::Resizing(expected) => {
            let actual = controller.tool().is_resizing();
            if actual == *expected {
                Ok(())
            } else {
                Err(fail(format!("resizing = {}", expected), format!("resizing = {}", actual)))
            }
        }
        Expectation::UndoDepth(expected) => {
            let actual = document.undo_names().len();
            if actual == *expected {
                Ok(())
            } else {
                Err(fail(format!("{} undo entries", expected), format!("{} undo entries", actual)))
            }
        }
    }
}
