use crate::{
    property::PropertyContainer,
    status::Status,
    topol::{HasTopology, Topology},
};
use std::fmt::{Debug, Display};

/// The four kinds of mesh elements.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Vertex,
    Halfedge,
    Edge,
    Face,
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Kind::Vertex => "vertex",
            Kind::Halfedge => "halfedge",
            Kind::Edge => "edge",
            Kind::Face => "face",
        })
    }
}

/**
 * All elements of the mesh implement this trait. They are identified by their
 * index.
 *
 * The hidden methods give generic code access to the storage of the matching
 * element kind, and are not meant to be called from outside this crate.
 */
pub trait Handle: Copy + Eq + Ord + Debug + Display + From<u32> + 'static {
    /// The kind of element this handle refers to.
    const KIND: Kind;

    /// Sentinel handle that never refers to an element. Handle valued
    /// properties that point at a deleted element are set to this during
    /// garbage collection.
    const INVALID: Self;

    /**
     * The index of the element.
     */
    fn index(&self) -> u32;

    /// Check if this is the [`Self::INVALID`] sentinel.
    fn is_invalid(&self) -> bool {
        *self == Self::INVALID
    }

    #[doc(hidden)]
    fn properties(topol: &Topology) -> &PropertyContainer<Self>;

    #[doc(hidden)]
    fn properties_mut(topol: &mut Topology) -> &mut PropertyContainer<Self>;

    #[doc(hidden)]
    fn statuses(topol: &Topology) -> &[Status];

    #[doc(hidden)]
    fn statuses_mut(topol: &mut Topology) -> &mut [Status];
}

macro_rules! impl_handle {
    ($name:ident, $kind:expr, $label:literal, $props:ident, $status:ident) => {
        impl Handle for $name {
            const KIND: Kind = $kind;
            const INVALID: Self = $name { idx: u32::MAX };

            fn index(&self) -> u32 {
                self.idx
            }

            fn properties(topol: &Topology) -> &PropertyContainer<Self> {
                &topol.$props
            }

            fn properties_mut(topol: &mut Topology) -> &mut PropertyContainer<Self> {
                &mut topol.$props
            }

            fn statuses(topol: &Topology) -> &[Status] {
                &topol.$status
            }

            fn statuses_mut(topol: &mut Topology) -> &mut [Status] {
                &mut topol.$status
            }
        }

        impl From<u32> for $name {
            fn from(idx: u32) -> Self {
                $name { idx }
            }
        }

        impl From<&u32> for $name {
            fn from(idx: &u32) -> Self {
                $name { idx: *idx }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                if self.is_invalid() {
                    write!(f, concat!($label, "(invalid)"))
                } else {
                    write!(f, concat!($label, "({})"), self.idx)
                }
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                Display::fmt(self, f)
            }
        }
    };
}

/**
 * Vertex handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VH {
    idx: u32,
}

/**
 * Halfedge handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HH {
    idx: u32,
}

/**
 * Edge handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EH {
    idx: u32,
}

/**
 * Face handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FH {
    idx: u32,
}

impl_handle!(VH, Kind::Vertex, "VH", vprops, vstatus);
impl_handle!(HH, Kind::Halfedge, "HH", hprops, hstatus);
impl_handle!(EH, Kind::Edge, "EH", eprops, estatus);
impl_handle!(FH, Kind::Face, "FH", fprops, fstatus);

impl VH {
    /// An outgoing halfedge, `None` for isolated vertices.
    pub fn halfedge(self, mesh: &impl HasTopology) -> Option<HH> {
        mesh.vertex_halfedge(self)
    }

    /// Check if this vertex is valid for the `mesh`.
    ///
    /// The index has to be less than the number of vertices in the mesh.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.is_valid_vertex(self)
    }

    /// Check if this vertex is manifold.
    ///
    /// A vertex is manifold if it has at most 1 outgoing boundary halfedge.
    /// ```text
    ///    .......|     .......|.......     ....\     /...
    ///    .......|     .......|.......     .....\   /....
    ///    .......|     .......|.......     ......\ /.....
    ///    -------v     -------v-------     -------v------
    ///    .......|     .......|.......     ....../ \.....
    ///    .......|     .......|.......     ...../   \....
    ///    .......|     .......|.......     ..../     \...
    ///    Manifold     Manifold            Not manifold
    /// ```
    pub fn is_manifold(self, mesh: &impl HasTopology) -> bool {
        mesh.is_manifold_vertex(self)
    }

    /// Check if this vertex is on the boundary of the `mesh`.
    pub fn is_boundary(self, mesh: &impl HasTopology) -> bool {
        mesh.is_boundary_vertex(self)
    }

    pub fn is_isolated(self, mesh: &impl HasTopology) -> bool {
        mesh.is_isolated_vertex(self)
    }

    pub fn is_deleted(self, mesh: &impl HasTopology) -> bool {
        mesh.is_deleted(self)
    }

    /// The number of edges incident on this vertex.
    pub fn valence(self, mesh: &impl HasTopology) -> usize {
        mesh.vertex_valence(self)
    }
}

impl HH {
    /// The vertex this halfedge points to.
    pub fn head(self, mesh: &impl HasTopology) -> VH {
        mesh.to_vertex(self)
    }

    /// The vertex this halfedge starts from.
    pub fn tail(self, mesh: &impl HasTopology) -> VH {
        mesh.from_vertex(self)
    }

    /// The other halfedge of the same edge. This only depends on the index.
    pub fn opposite(self) -> HH {
        (self.idx ^ 1).into()
    }

    /// The edge this halfedge belongs to.
    pub fn edge(self) -> EH {
        (self.idx >> 1).into()
    }

    pub fn prev(self, mesh: &impl HasTopology) -> HH {
        mesh.prev_halfedge(self)
    }

    pub fn next(self, mesh: &impl HasTopology) -> HH {
        mesh.next_halfedge(self)
    }

    pub fn face(self, mesh: &impl HasTopology) -> Option<FH> {
        mesh.halfedge_face(self)
    }

    /// Check if this halfedge is valid for the `mesh`.
    ///
    /// The index has to be less than the number of halfedges in the mesh.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.is_valid_halfedge(self)
    }

    /// Check if this halfedge is on the boundary of `mesh`.
    ///
    /// A halfedge is considered interior if it has a face incident on it.
    pub fn is_boundary(self, mesh: &impl HasTopology) -> bool {
        mesh.is_boundary_halfedge(self)
    }

    pub fn is_deleted(self, mesh: &impl HasTopology) -> bool {
        mesh.is_deleted(self)
    }
}

impl EH {
    pub fn halfedges(self) -> (HH, HH) {
        let hi = self.idx << 1;
        (hi.into(), (hi | 1).into())
    }

    /// Halfedge `0` or `1` of this edge, chosen by `flag`.
    pub fn halfedge(self, flag: bool) -> HH {
        ((self.idx << 1) | flag as u32).into()
    }

    /// The two vertices at the ends of this edge.
    pub fn vertices(self, mesh: &impl HasTopology) -> (VH, VH) {
        let (h, oh) = self.halfedges();
        (mesh.to_vertex(oh), mesh.to_vertex(h))
    }

    /// Check if this edge is valid for the `mesh`.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.is_valid_edge(self)
    }

    /// Check if the edge is a boundary edge.
    ///
    /// An edge is considered interior if it has two faces incident on both of it's halfedges.
    pub fn is_boundary(self, mesh: &impl HasTopology) -> bool {
        mesh.is_boundary_edge(self)
    }

    pub fn is_deleted(self, mesh: &impl HasTopology) -> bool {
        mesh.is_deleted(self)
    }
}

impl FH {
    pub fn halfedge(self, mesh: &impl HasTopology) -> HH {
        mesh.face_halfedge(self)
    }

    /// Check if this face is valid for the `mesh`.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.is_valid_face(self)
    }

    /// Check if any edge of this face is on the boundary.
    pub fn is_boundary(self, mesh: &impl HasTopology) -> bool {
        mesh.is_boundary_face(self)
    }

    pub fn is_deleted(self, mesh: &impl HasTopology) -> bool {
        mesh.is_deleted(self)
    }

    /// The number of vertices of this face.
    pub fn valence(self, mesh: &impl HasTopology) -> usize {
        mesh.face_valence(self)
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Vertex {
    pub(crate) halfedge: Option<HH>,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Halfedge {
    pub(crate) face: Option<FH>,
    pub(crate) vertex: VH,
    pub(crate) next: HH,
    pub(crate) prev: HH,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Edge {
    pub(crate) halfedges: [Halfedge; 2],
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Face {
    pub(crate) halfedge: HH,
}
