use crate::{
    element::{HH, Handle},
    error::Error,
    iterator::HasIterators,
    topol::{HasTopology, Topology},
};

fn check_halfedge_handle(mesh: &Topology, h: HH) -> Result<(), Error> {
    if !h.is_valid(mesh) {
        return Err(Error::InvalidHalfedge(h));
    }
    if h.is_deleted(mesh) {
        return Err(Error::DeletedHalfedge(h));
    }
    Ok(())
}

fn check_vertices(mesh: &Topology, hvisited: &mut [bool]) -> Result<(), Error> {
    hvisited.fill(false);
    for v in mesh.vertices() {
        let Some(h) = v.halfedge(mesh) else {
            continue;
        };
        check_halfedge_handle(mesh, h)?;
        // Outgoing halfedge must point back to this vertex.
        if h.tail(mesh) != v {
            return Err(Error::InvalidOutgoingHalfedges(v));
        }
        // Check ccw iterator. Every outgoing halfedge is visited once.
        for h in mesh.voh_ccw_iter(v) {
            check_halfedge_handle(mesh, h)?;
            if h.tail(mesh) != v || std::mem::replace(&mut hvisited[h.index() as usize], true) {
                return Err(Error::InvalidOutgoingHalfedges(v));
            }
        }
        // Check cw iterator. It must visit the same halfedges.
        for h in mesh.voh_cw_iter(v) {
            check_halfedge_handle(mesh, h)?;
            if !std::mem::replace(&mut hvisited[h.index() as usize], false) {
                return Err(Error::InvalidOutgoingHalfedges(v));
            }
        }
        // The outgoing halfedge must be a boundary halfedge, or none of the
        // halfedges are boundary.
        if !h.is_boundary(mesh) && mesh.voh_ccw_iter(v).any(|h| h.is_boundary(mesh)) {
            return Err(Error::OutgoingHalfedgeNotBoundary(v));
        }
    }
    Ok(())
}

fn check_edges(mesh: &Topology, hflags: &mut [bool]) -> Result<(), Error> {
    for h in mesh.halfedges() {
        let hedge = mesh.halfedge(h);
        // Check for deleted, or out of range.
        check_halfedge_handle(mesh, hedge.prev)?;
        check_halfedge_handle(mesh, hedge.next)?;
        if !hedge.vertex.is_valid(mesh) {
            return Err(Error::InvalidVertex(hedge.vertex));
        }
        if hedge.vertex.is_deleted(mesh) {
            return Err(Error::DeletedVertex(hedge.vertex));
        }
        if let Some(f) = hedge.face {
            if !f.is_valid(mesh) {
                return Err(Error::InvalidFace(f));
            }
            if f.is_deleted(mesh) {
                return Err(Error::DeletedFace(f));
            }
        }
        // Check if degenerate.
        if h.tail(mesh) == h.head(mesh) {
            return Err(Error::DegenerateHalfedge(h));
        }
        // Check connctivity.
        let head = h.head(mesh);
        let tail = h.tail(mesh);
        if hedge.prev.next(mesh) != h
            || hedge.next.prev(mesh) != h
            || head != hedge.next.tail(mesh)
            || tail != hedge.prev.head(mesh)
        {
            return Err(Error::InvalidHalfedgeLink(h));
        }
        // Halfedge must be found in the circulators around head and tail.
        if !mesh.voh_ccw_iter(tail).any(|hh| hh == h) || !mesh.vih_ccw_iter(head).any(|hh| hh == h)
        {
            return Err(Error::InvalidHalfedgeVertexLink(h));
        }
    }
    // Check all loops.
    hflags.fill(false);
    for h in mesh.halfedges() {
        if hflags[h.index() as usize] {
            continue;
        }
        let f = h.face(mesh);
        let mut count = 0usize;
        for h in mesh.loop_ccw_iter(h) {
            if std::mem::replace(&mut hflags[h.index() as usize], true) {
                return Err(Error::InvalidLoopTopology(h));
            }
            if h.face(mesh) != f {
                return Err(Error::InconsistentFaceInLoop(h));
            }
            count += 1;
        }
        if count < 3 {
            return Err(Error::DegenerateLoop(h));
        }
    }
    Ok(())
}

fn check_faces(mesh: &Topology) -> Result<(), Error> {
    for f in mesh.faces() {
        let h = f.halfedge(mesh);
        check_halfedge_handle(mesh, h)?;
        if h.face(mesh) != Some(f) {
            return Err(Error::InvalidFaceHalfedgeLink(f, h));
        }
    }
    Ok(())
}

impl Topology {
    /// Check the topology of the mesh.
    ///
    /// Only live elements are checked, and none of them may refer to a
    /// deleted element. The first violation found is returned as an error.
    pub fn check_topology(&self) -> Result<(), Error> {
        // To keep track of visited halfedges.
        let mut hvisited = vec![false; self.halfedges_size()].into_boxed_slice();
        check_vertices(self, &mut hvisited)?;
        check_edges(self, &mut hvisited)?;
        check_faces(self)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        element::HH,
        error::Error,
        topol::test::{loop_mesh, quad_box},
    };

    #[test]
    fn t_valid_meshes() {
        quad_box().check_topology().expect("Topology errors found");
        loop_mesh().check_topology().expect("Topology errors found");
    }

    #[test]
    fn t_broken_link_is_reported() {
        let mut qbox = quad_box();
        let h: HH = 0.into();
        let next = qbox.halfedge(h).next;
        let other = qbox.halfedge(next).next;
        // Skip one halfedge in the loop without fixing the back link.
        qbox.halfedge_mut(h).next = other;
        assert!(matches!(
            qbox.check_topology(),
            Err(Error::InvalidHalfedgeLink(_) | Error::InvalidOutgoingHalfedges(_))
        ));
    }

    #[test]
    fn t_stale_face_is_reported() {
        let mut qbox = quad_box();
        qbox.mark_face_deleted(2.into());
        assert!(matches!(qbox.check_topology(), Err(Error::DeletedFace(_))));
    }
}
