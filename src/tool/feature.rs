//! Bounding Box Feature Catalog
//!
//! The sides, edges and corners of a box, described once on the unit cube
//! spanning [-1,-1,-1] to [1,1,1] and mapped onto a concrete box on demand.
//! Every vector here has components in {-1, 0, +1}: a `+1` selects the
//! box's max on that axis, a `-1` its min.

use crate::geometry::{BBox3, Vec3};
use super::hit::HitKind;

/// One of the six box faces, identified by its outward normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBoxSide {
    pub normal: Vec3,
}

/// One of the twelve box edges, identified by its two end corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBoxEdge {
    pub point0: Vec3,
    pub point1: Vec3,
}

/// One of the eight box corners, identified by its sign vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBoxCorner {
    pub corner: Vec3,
}

/// A handle on the box: the payload carried by a pick hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxFeature {
    Side(BBoxSide),
    Edge(BBoxEdge),
    Corner(BBoxCorner),
}

const SIGNS: [f32; 2] = [-1.0, 1.0];

fn unit(axis: usize, sign: f32) -> Vec3 {
    Vec3::ZERO.with(axis, sign)
}

impl BBoxSide {
    pub fn new(normal: Vec3) -> Self {
        Self { normal }
    }

    /// Axis index (0 = x, 1 = y, 2 = z) the side is perpendicular to
    pub fn axis(&self) -> usize {
        if self.normal.x != 0.0 {
            0
        } else if self.normal.y != 0.0 {
            1
        } else {
            2
        }
    }

    /// True for the max side of its axis
    pub fn is_positive(&self) -> bool {
        self.normal[self.axis()] > 0.0
    }
}

impl BBoxEdge {
    pub fn new(point0: Vec3, point1: Vec3) -> Self {
        Self { point0, point1 }
    }
}

impl BBoxCorner {
    pub fn new(corner: Vec3) -> Self {
        Self { corner }
    }
}

impl BoxFeature {
    pub fn kind(&self) -> HitKind {
        match self {
            BoxFeature::Side(_) => HitKind::Face,
            BoxFeature::Edge(_) => HitKind::Edge,
            BoxFeature::Corner(_) => HitKind::Corner,
        }
    }

    /// Direction a drag of this handle is constrained to (unit length)
    pub fn drag_axis(&self) -> Vec3 {
        match self {
            BoxFeature::Side(side) => normal_for_side(*side),
            BoxFeature::Edge(edge) => normal_for_edge(*edge),
            BoxFeature::Corner(corner) => normal_for_corner(*corner),
        }
    }

    /// The sides this feature lies on: one for a side, two for an edge,
    /// three for a corner
    pub fn adjacent_sides(&self) -> Vec<BBoxSide> {
        let direction = match self {
            BoxFeature::Side(side) => return vec![*side],
            BoxFeature::Edge(edge) => edge.point0 + edge.point1,
            BoxFeature::Corner(corner) => corner.corner,
        };
        (0..3)
            .filter(|&axis| direction[axis] != 0.0)
            .map(|axis| BBoxSide::new(unit(axis, direction[axis].signum())))
            .collect()
    }
}

impl std::fmt::Display for BoxFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoxFeature::Side(side) => write!(f, "side {}", side.normal),
            BoxFeature::Edge(edge) => write!(f, "edge {}-{}", edge.point0, edge.point1),
            BoxFeature::Corner(corner) => write!(f, "corner {}", corner.corner),
        }
    }
}

/// The six sides: +X, -X, +Y, -Y, +Z, -Z
pub fn all_sides() -> [BBoxSide; 6] {
    [
        BBoxSide::new(Vec3::POS_X),
        BBoxSide::new(Vec3::NEG_X),
        BBoxSide::new(Vec3::POS_Y),
        BBoxSide::new(Vec3::NEG_Y),
        BBoxSide::new(Vec3::POS_Z),
        BBoxSide::new(Vec3::NEG_Z),
    ]
}

/// The twelve edges, grouped by the axis they run along (X, then Y, then Z).
/// `point0` is always the min end of the edge.
pub fn all_edges() -> [BBoxEdge; 12] {
    let mut edges = [BBoxEdge::new(Vec3::ZERO, Vec3::ZERO); 12];
    let mut i = 0;
    for axis in 0..3 {
        let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
        for &sv in &SIGNS {
            for &su in &SIGNS {
                let base = unit(u, su) + unit(v, sv);
                edges[i] = BBoxEdge::new(base + unit(axis, -1.0), base + unit(axis, 1.0));
                i += 1;
            }
        }
    }
    edges
}

/// The eight corners, x varying fastest
pub fn all_corners() -> [BBoxCorner; 8] {
    let mut corners = [BBoxCorner::new(Vec3::ZERO); 8];
    let mut i = 0;
    for &z in &SIGNS {
        for &y in &SIGNS {
            for &x in &SIGNS {
                corners[i] = BBoxCorner::new(Vec3::new(x, y, z));
                i += 1;
            }
        }
    }
    corners
}

/// The box vertex selected by a corner's signs
pub fn point_for_corner(bbox: &BBox3, corner: BBoxCorner) -> Vec3 {
    let pick = |axis: usize| {
        if corner.corner[axis] > 0.0 { bbox.max[axis] } else { bbox.min[axis] }
    };
    Vec3::new(pick(0), pick(1), pick(2))
}

/// End points of an edge on the box
pub fn segment_for_edge(bbox: &BBox3, edge: BBoxEdge) -> (Vec3, Vec3) {
    (
        point_for_corner(bbox, BBoxCorner::new(edge.point0)),
        point_for_corner(bbox, BBoxCorner::new(edge.point1)),
    )
}

/// The four vertices of a side, in winding order around the side
pub fn polygon_for_side(bbox: &BBox3, side: BBoxSide) -> [Vec3; 4] {
    let axis = side.axis();
    let sign = side.normal[axis].signum();
    let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
    let corner = |su: f32, sv: f32| {
        point_for_corner(bbox, BBoxCorner::new(unit(axis, sign) + unit(u, su) + unit(v, sv)))
    };
    [
        corner(-1.0, -1.0),
        corner(1.0, -1.0),
        corner(1.0, 1.0),
        corner(-1.0, 1.0),
    ]
}

pub fn normal_for_side(side: BBoxSide) -> Vec3 {
    side.normal
}

/// Bisector of the two sides meeting at the edge
pub fn normal_for_edge(edge: BBoxEdge) -> Vec3 {
    (edge.point0 + edge.point1).normalize()
}

/// The corner's sign vector is already the diagonal direction
pub fn normal_for_corner(corner: BBoxCorner) -> Vec3 {
    corner.corner.normalize()
}

/// Move one side of a box by the matching component of `delta`,
/// leaving the opposite side fixed
pub fn move_bbox_face(bbox: &BBox3, side: BBoxSide, delta: Vec3) -> BBox3 {
    let axis = side.axis();
    let mut out = *bbox;
    if side.is_positive() {
        out.max = out.max.with(axis, bbox.max[axis] + delta[axis]);
    } else {
        out.min = out.min.with(axis, bbox.min[axis] + delta[axis]);
    }
    out
}
