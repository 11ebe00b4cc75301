use crate::{
    element::{EH, FH, HH, VH},
    topol::{HasTopology, Topology},
};

struct OutgoingHalfedgeIter<'a, const CCW: bool> {
    topol: &'a Topology,
    hstart: Option<HH>,
    hcurrent: Option<HH>,
}

impl Iterator for OutgoingHalfedgeIter<'_, true> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.hcurrent?;
        let next = self.topol.ccw_rotated_halfedge(current);
        self.hcurrent = match self.hstart {
            Some(start) if start != next => Some(next),
            _ => None,
        };
        Some(current)
    }
}

impl Iterator for OutgoingHalfedgeIter<'_, false> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.hcurrent?;
        let next = self.topol.cw_rotated_halfedge(current);
        self.hcurrent = match self.hstart {
            Some(start) if start != next => Some(next),
            _ => None,
        };
        Some(current)
    }
}

/// Walks a loop of halfedges by following next (ccw) or previous (cw) links.
struct LoopHalfedgeIter<'a, const CCW: bool> {
    topol: &'a Topology,
    hstart: HH,
    hcurrent: Option<HH>,
}

impl Iterator for LoopHalfedgeIter<'_, true> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.hcurrent?;
        let next = self.topol.next_halfedge(current);
        self.hcurrent = if next == self.hstart {
            None
        } else {
            Some(next)
        };
        Some(current)
    }
}

impl Iterator for LoopHalfedgeIter<'_, false> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.hcurrent?;
        let next = self.topol.prev_halfedge(current);
        self.hcurrent = if next == self.hstart {
            None
        } else {
            Some(next)
        };
        Some(current)
    }
}

fn outgoing<const CCW: bool>(topol: &Topology, v: VH) -> OutgoingHalfedgeIter<'_, CCW> {
    let h = if topol.is_deleted(v) {
        None
    } else {
        topol.vertex_halfedge(v)
    };
    OutgoingHalfedgeIter {
        topol,
        hstart: h,
        hcurrent: h,
    }
}

fn halfedge_loop<const CCW: bool>(topol: &Topology, h: HH) -> LoopHalfedgeIter<'_, CCW> {
    LoopHalfedgeIter {
        topol,
        hstart: h,
        hcurrent: if topol.is_deleted(h) { None } else { Some(h) },
    }
}

fn face_loop<const CCW: bool>(topol: &Topology, f: FH) -> LoopHalfedgeIter<'_, CCW> {
    let h = topol.face_halfedge(f);
    LoopHalfedgeIter {
        topol,
        hstart: h,
        hcurrent: if topol.is_deleted(f) { None } else { Some(h) },
    }
}

pub(crate) fn voh_ccw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = HH> + use<'_> {
    outgoing::<true>(topol, v)
}

pub(crate) fn voh_cw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = HH> + use<'_> {
    outgoing::<false>(topol, v)
}

pub(crate) fn vih_ccw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = HH> + use<'_> {
    voh_ccw_iter(topol, v).map(|h| h.opposite())
}

pub(crate) fn vih_cw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = HH> + use<'_> {
    voh_cw_iter(topol, v).map(|h| h.opposite())
}

pub(crate) fn vv_ccw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = VH> + use<'_> {
    voh_ccw_iter(topol, v).map(|h| topol.to_vertex(h))
}

pub(crate) fn vv_cw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = VH> + use<'_> {
    voh_cw_iter(topol, v).map(|h| topol.to_vertex(h))
}

pub(crate) fn ve_ccw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = EH> + use<'_> {
    voh_ccw_iter(topol, v).map(|h| h.edge())
}

pub(crate) fn ve_cw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = EH> + use<'_> {
    voh_cw_iter(topol, v).map(|h| h.edge())
}

pub(crate) fn vf_ccw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = FH> + use<'_> {
    voh_ccw_iter(topol, v).filter_map(|h| topol.halfedge_face(h))
}

pub(crate) fn vf_cw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = FH> + use<'_> {
    voh_cw_iter(topol, v).filter_map(|h| topol.halfedge_face(h))
}

pub(crate) fn eh_iter(e: EH) -> impl Iterator<Item = HH> {
    let (h, oh) = e.halfedges();
    [h, oh].into_iter()
}

pub(crate) fn ev_iter(topol: &Topology, e: EH) -> impl Iterator<Item = VH> + use<'_> {
    eh_iter(e).map(|h| topol.to_vertex(h))
}

pub(crate) fn ef_iter(topol: &Topology, e: EH) -> impl Iterator<Item = FH> + use<'_> {
    eh_iter(e).filter_map(|h| topol.halfedge_face(h))
}

pub(crate) fn fh_ccw_iter(topol: &Topology, f: FH) -> impl Iterator<Item = HH> + use<'_> {
    face_loop::<true>(topol, f)
}

pub(crate) fn fh_cw_iter(topol: &Topology, f: FH) -> impl Iterator<Item = HH> + use<'_> {
    face_loop::<false>(topol, f)
}

pub(crate) fn fv_ccw_iter(topol: &Topology, f: FH) -> impl Iterator<Item = VH> + use<'_> {
    fh_ccw_iter(topol, f).map(|h| topol.to_vertex(h))
}

pub(crate) fn fv_cw_iter(topol: &Topology, f: FH) -> impl Iterator<Item = VH> + use<'_> {
    fh_cw_iter(topol, f).map(|h| topol.to_vertex(h))
}

pub(crate) fn fe_ccw_iter(topol: &Topology, f: FH) -> impl Iterator<Item = EH> + use<'_> {
    fh_ccw_iter(topol, f).map(|h| h.edge())
}

pub(crate) fn fe_cw_iter(topol: &Topology, f: FH) -> impl Iterator<Item = EH> + use<'_> {
    fh_cw_iter(topol, f).map(|h| h.edge())
}

pub(crate) fn ff_ccw_iter(topol: &Topology, f: FH) -> impl Iterator<Item = FH> + use<'_> {
    fh_ccw_iter(topol, f).filter_map(|h| topol.halfedge_face(h.opposite()))
}

pub(crate) fn ff_cw_iter(topol: &Topology, f: FH) -> impl Iterator<Item = FH> + use<'_> {
    fh_cw_iter(topol, f).filter_map(|h| topol.halfedge_face(h.opposite()))
}

pub(crate) fn loop_ccw_iter(topol: &Topology, h: HH) -> impl Iterator<Item = HH> + use<'_> {
    halfedge_loop::<true>(topol, h)
}

pub(crate) fn loop_cw_iter(topol: &Topology, h: HH) -> impl Iterator<Item = HH> + use<'_> {
    halfedge_loop::<false>(topol, h)
}

/// Circulators around the elements of a mesh.
///
/// Every circulator borrows the mesh, stops when it gets back to where it
/// started, and yields nothing when started from a deleted or isolated
/// element. "ccw" and "cw" refer to the orientation implied by the order of
/// the vertices of the faces.
pub trait HasIterators: HasTopology {
    /// Outgoing halfedges of a vertex, counter-clockwise.
    fn voh_ccw_iter(&self, v: VH) -> impl Iterator<Item = HH> {
        voh_ccw_iter(self.topology(), v)
    }

    /// Outgoing halfedges of a vertex, clockwise.
    fn voh_cw_iter(&self, v: VH) -> impl Iterator<Item = HH> {
        voh_cw_iter(self.topology(), v)
    }

    /// Incoming halfedges of a vertex, counter-clockwise.
    fn vih_ccw_iter(&self, v: VH) -> impl Iterator<Item = HH> {
        vih_ccw_iter(self.topology(), v)
    }

    /// Incoming halfedges of a vertex, clockwise.
    fn vih_cw_iter(&self, v: VH) -> impl Iterator<Item = HH> {
        vih_cw_iter(self.topology(), v)
    }

    /// Neighboring vertices, counter-clockwise.
    fn vv_ccw_iter(&self, v: VH) -> impl Iterator<Item = VH> {
        vv_ccw_iter(self.topology(), v)
    }

    /// Neighboring vertices, clockwise.
    fn vv_cw_iter(&self, v: VH) -> impl Iterator<Item = VH> {
        vv_cw_iter(self.topology(), v)
    }

    fn ve_ccw_iter(&self, v: VH) -> impl Iterator<Item = EH> {
        ve_ccw_iter(self.topology(), v)
    }

    fn ve_cw_iter(&self, v: VH) -> impl Iterator<Item = EH> {
        ve_cw_iter(self.topology(), v)
    }

    /// Faces incident on a vertex, counter-clockwise. Boundary gaps are
    /// skipped.
    fn vf_ccw_iter(&self, v: VH) -> impl Iterator<Item = FH> {
        vf_ccw_iter(self.topology(), v)
    }

    fn vf_cw_iter(&self, v: VH) -> impl Iterator<Item = FH> {
        vf_cw_iter(self.topology(), v)
    }

    /// The two halfedges of an edge.
    fn eh_iter(&self, e: EH) -> impl Iterator<Item = HH> {
        eh_iter(e)
    }

    /// The two vertices of an edge.
    fn ev_iter(&self, e: EH) -> impl Iterator<Item = VH> {
        ev_iter(self.topology(), e)
    }

    /// The faces on either side of an edge, at most two.
    fn ef_iter(&self, e: EH) -> impl Iterator<Item = FH> {
        ef_iter(self.topology(), e)
    }

    /// Halfedges of a face, counter-clockwise, starting from the halfedge of
    /// the face.
    fn fh_ccw_iter(&self, f: FH) -> impl Iterator<Item = HH> {
        fh_ccw_iter(self.topology(), f)
    }

    fn fh_cw_iter(&self, f: FH) -> impl Iterator<Item = HH> {
        fh_cw_iter(self.topology(), f)
    }

    /// Vertices of a face, counter-clockwise.
    fn fv_ccw_iter(&self, f: FH) -> impl Iterator<Item = VH> {
        fv_ccw_iter(self.topology(), f)
    }

    fn fv_cw_iter(&self, f: FH) -> impl Iterator<Item = VH> {
        fv_cw_iter(self.topology(), f)
    }

    fn fe_ccw_iter(&self, f: FH) -> impl Iterator<Item = EH> {
        fe_ccw_iter(self.topology(), f)
    }

    fn fe_cw_iter(&self, f: FH) -> impl Iterator<Item = EH> {
        fe_cw_iter(self.topology(), f)
    }

    /// Faces sharing an edge with a face, counter-clockwise.
    fn ff_ccw_iter(&self, f: FH) -> impl Iterator<Item = FH> {
        ff_ccw_iter(self.topology(), f)
    }

    fn ff_cw_iter(&self, f: FH) -> impl Iterator<Item = FH> {
        ff_cw_iter(self.topology(), f)
    }

    /// The loop of halfedges containing `h`, following next links. This is a
    /// face loop for interior halfedges and a boundary loop otherwise.
    fn loop_ccw_iter(&self, h: HH) -> impl Iterator<Item = HH> {
        loop_ccw_iter(self.topology(), h)
    }

    fn loop_cw_iter(&self, h: HH) -> impl Iterator<Item = HH> {
        loop_cw_iter(self.topology(), h)
    }
}

impl<T> HasIterators for T where T: HasTopology {}
