use thiserror::Error;

use crate::element::{EH, FH, HH, Kind, VH};

/// Reason a face could not be inserted without breaking manifoldness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonManifold {
    /// The vertex is already surrounded by faces, there is no gap to insert a
    /// new face into.
    ComplexVertex(VH),
    /// The halfedge on the side the new face would occupy already has a face.
    ComplexHalfedge(HH),
    /// The boundary fans around the vertex could not be re-linked into a
    /// single cycle.
    PatchRelinkingFailed(VH),
}

#[derive(Debug, Error)]
pub enum Error {
    // Properties.
    #[error("the property is already borrowed")]
    BorrowedPropertyAccess,
    #[error("the property was removed from the mesh")]
    PropertyRemoved,
    #[error("a {0} property named {1:?} already exists")]
    DuplicateName(Kind, String),
    #[error("the {0} property {1:?} is reserved by the mesh")]
    ReservedProperty(Kind, String),
    #[error("property index {0} is out of bounds")]
    OutOfBoundsAccess(usize),
    #[error("mismatched array lengths: {0} and {1}")]
    MismatchedArrayLengths(usize, usize),
    // Construction.
    #[error("too many {0} elements for 32 bit indices")]
    CapacityExceeded(Kind),
    #[error("a face needs at least 3 distinct vertices, got {0}")]
    DegenerateFace(usize),
    #[error("vertex {0} appears more than once in the face")]
    RepeatedVertex(VH),
    #[error("cannot insert face: {0:?}")]
    NonManifoldInsertion(NonManifold),
    // Euler operators.
    #[error("edge {0} cannot be flipped")]
    InvalidFlip(EH),
    #[error("halfedge {0} cannot be collapsed")]
    InvalidCollapse(HH),
    #[error("cannot insert an edge between the heads of {0} and {1}")]
    InvalidEdgeInsertion(HH, HH),
    // Handles.
    #[error("invalid vertex {0}")]
    InvalidVertex(VH),
    #[error("invalid halfedge {0}")]
    InvalidHalfedge(HH),
    #[error("invalid edge {0}")]
    InvalidEdge(EH),
    #[error("invalid face {0}")]
    InvalidFace(FH),
    #[error("vertex {0} is deleted")]
    DeletedVertex(VH),
    #[error("halfedge {0} is deleted")]
    DeletedHalfedge(HH),
    #[error("edge {0} is deleted")]
    DeletedEdge(EH),
    #[error("face {0} is deleted")]
    DeletedFace(FH),
    // Topology checks.
    #[error("outgoing halfedge of {0} is not on the boundary")]
    OutgoingHalfedgeNotBoundary(VH),
    #[error("outgoing halfedges of {0} are inconsistent")]
    InvalidOutgoingHalfedges(VH),
    #[error("halfedge {0} starts and ends at the same vertex")]
    DegenerateHalfedge(HH),
    #[error("next/previous links of {0} are inconsistent")]
    InvalidHalfedgeLink(HH),
    #[error("halfedge {0} is missing from the fans of its vertices")]
    InvalidHalfedgeVertexLink(HH),
    #[error("the loop through {0} does not close")]
    InvalidLoopTopology(HH),
    #[error("the loop through {0} has fewer than 3 halfedges")]
    DegenerateLoop(HH),
    #[error("halfedge {0} disagrees with its loop about the incident face")]
    InconsistentFaceInLoop(HH),
    #[error("face {0} points to halfedge {1}, which does not point back")]
    InvalidFaceHalfedgeLink(FH, HH),
}
