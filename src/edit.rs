use crate::{
    element::{EH, FH, HH, VH},
    error::Error,
    iterator,
    macros::debug_check_topology,
    topol::{HasTopology, TopolCache, Topology},
};

impl Topology {
    /// Delete a face.
    ///
    /// Edges left without any incident face are deleted along with it, and so
    /// are vertices left without any incident edge. The remaining halfedges of
    /// the face become boundary halfedges. Deleting a face that is already
    /// deleted does nothing.
    pub(crate) fn delete_face(&mut self, f: FH, cache: &mut TopolCache) -> Result<(), Error> {
        if !self.is_valid_face(f) {
            return Err(Error::InvalidFace(f));
        }
        if self.is_deleted(f) {
            return Ok(());
        }
        let TopolCache {
            halfedges,
            edges,
            vertices,
            ..
        } = cache;
        halfedges.clear();
        edges.clear();
        vertices.clear();
        halfedges.extend(iterator::fh_ccw_iter(self, f));
        self.mark_face_deleted(f);
        for &h in halfedges.iter() {
            self.set_halfedge_face(h, None);
            if self.is_boundary_halfedge(h.opposite()) {
                edges.push(h.edge());
            }
            vertices.push(self.to_vertex(h));
        }
        // Unlink the edges that no longer have a face on either side.
        for &e in edges.iter() {
            let (h0, h1) = e.halfedges();
            let v0 = self.to_vertex(h0);
            let next0 = self.next_halfedge(h0);
            let prev0 = self.prev_halfedge(h0);
            let v1 = self.to_vertex(h1);
            let next1 = self.next_halfedge(h1);
            let prev1 = self.prev_halfedge(h1);
            self.link_halfedges(prev0, next1);
            self.link_halfedges(prev1, next0);
            self.mark_edge_deleted(e);
            if self.vertex_halfedge(v0) == Some(h1) {
                if next0 == h1 {
                    self.mark_vertex_deleted(v0);
                } else {
                    self.set_vertex_halfedge(v0, Some(next0));
                }
            }
            if self.vertex_halfedge(v1) == Some(h0) {
                if next1 == h0 {
                    self.mark_vertex_deleted(v1);
                } else {
                    self.set_vertex_halfedge(v1, Some(next1));
                }
            }
        }
        for &v in vertices.iter() {
            self.adjust_outgoing_halfedge(v);
        }
        debug_check_topology!(self, "delete_face");
        Ok(())
    }

    /// Delete an edge, and the faces incident on it.
    pub(crate) fn delete_edge(&mut self, e: EH, cache: &mut TopolCache) -> Result<(), Error> {
        if !self.is_valid_edge(e) {
            return Err(Error::InvalidEdge(e));
        }
        if self.is_deleted(e) {
            return Ok(());
        }
        let (h0, h1) = e.halfedges();
        let (f0, f1) = (self.halfedge_face(h0), self.halfedge_face(h1));
        if let Some(f) = f0 {
            self.delete_face(f, cache)?;
        }
        if let Some(f) = f1 {
            self.delete_face(f, cache)?;
        }
        debug_check_topology!(self, "delete_edge");
        Ok(())
    }

    /// Delete a vertex, and all the faces incident on it.
    pub(crate) fn delete_vertex(&mut self, v: VH, cache: &mut TopolCache) -> Result<(), Error> {
        if !self.is_valid_vertex(v) {
            return Err(Error::InvalidVertex(v));
        }
        if self.is_deleted(v) {
            return Ok(());
        }
        let mut faces = std::mem::take(&mut cache.faces);
        faces.clear();
        faces.extend(iterator::vf_ccw_iter(self, v));
        let result = faces
            .iter()
            .try_for_each(|&f| self.delete_face(f, cache));
        cache.faces = faces;
        result?;
        // Deleting the last face around the vertex already takes it.
        if !self.is_deleted(v) {
            self.mark_vertex_deleted(v);
        }
        debug_check_topology!(self, "delete_vertex");
        Ok(())
    }

    /// Split an edge with an isolated vertex `v`.
    ///
    /// The edge keeps its handle and ends at `v`, and a new edge is created
    /// from the tail of the edge to `v`. The incident faces keep their
    /// handles, each gaining one vertex.
    pub fn split_edge(&mut self, e: EH, v: VH, copy_props: bool) -> Result<EH, Error> {
        if !self.is_valid_edge(e) {
            return Err(Error::InvalidEdge(e));
        }
        if self.is_deleted(e) {
            return Err(Error::DeletedEdge(e));
        }
        if !self.is_valid_vertex(v) || !self.is_isolated_vertex(v) {
            return Err(Error::InvalidVertex(v));
        }
        if self.is_deleted(v) {
            return Err(Error::DeletedVertex(v));
        }
        let (h0, h1) = e.halfedges();
        let vfrom = self.from_vertex(h0);
        let (ph0, nh1) = (self.prev_halfedge(h0), self.next_halfedge(h1));
        let (f0, f1) = (self.halfedge_face(h0), self.halfedge_face(h1));
        let hnew = self.new_edge(vfrom, v)?;
        let ohnew = hnew.opposite();
        let enew = hnew.edge();
        self.set_halfedge_vertex(h1, v);
        self.link_halfedges(hnew, h0);
        self.link_halfedges(h1, ohnew);
        self.link_halfedges(ph0, hnew);
        self.link_halfedges(ohnew, nh1);
        self.set_halfedge_face(hnew, f0);
        self.set_halfedge_face(ohnew, f1);
        self.set_vertex_halfedge(v, Some(h0));
        self.adjust_outgoing_halfedge(v);
        if self.vertex_halfedge(vfrom) == Some(h0) {
            self.set_vertex_halfedge(vfrom, Some(hnew));
            self.adjust_outgoing_halfedge(vfrom);
        }
        if copy_props {
            self.eprops.copy(e, enew)?;
            self.hprops.copy_many(&[h0, h1], &[hnew, ohnew])?;
        }
        debug_check_topology!(self, "split_edge");
        Ok(enew)
    }

    /// Check if an edge can be flipped.
    ///
    /// Only interior edges shared by two triangles can be flipped, and only if
    /// the vertices opposite the edge are distinct and not already connected.
    pub fn check_edge_flip(&self, e: EH) -> bool {
        if !self.is_valid_edge(e) || self.is_deleted(e) || self.is_boundary_edge(e) {
            return false;
        }
        let (h0, h1) = e.halfedges();
        let is_triangle =
            |h: HH| self.next_halfedge(self.next_halfedge(self.next_halfedge(h))) == h;
        if !is_triangle(h0) || !is_triangle(h1) {
            return false;
        }
        let v0 = self.to_vertex(self.next_halfedge(h0));
        let v1 = self.to_vertex(self.next_halfedge(h1));
        v0 != v1 && self.find_halfedge(v0, v1).is_none()
    }

    /// Rotate an edge shared by two triangles, so that it connects the two
    /// vertices opposite to it. Handles of the edge and both faces are kept.
    pub fn flip_edge(&mut self, e: EH) -> Result<(), Error> {
        if !self.check_edge_flip(e) {
            return Err(Error::InvalidFlip(e));
        }
        let (a0, b0) = e.halfedges();
        let a1 = self.next_halfedge(a0);
        let a2 = self.next_halfedge(a1);
        let b1 = self.next_halfedge(b0);
        let b2 = self.next_halfedge(b1);
        let va0 = self.to_vertex(a0);
        let va1 = self.to_vertex(a1);
        let vb0 = self.to_vertex(b0);
        let vb1 = self.to_vertex(b1);
        let fa = self.halfedge_face(a0);
        let fb = self.halfedge_face(b0);
        self.set_halfedge_vertex(a0, va1);
        self.set_halfedge_vertex(b0, vb1);
        self.link_halfedges(a0, a2);
        self.link_halfedges(a2, b1);
        self.link_halfedges(b1, a0);
        self.link_halfedges(b0, b2);
        self.link_halfedges(b2, a1);
        self.link_halfedges(a1, b0);
        self.set_halfedge_face(a1, fb);
        self.set_halfedge_face(b1, fa);
        if let Some(fa) = fa {
            self.set_face_halfedge(fa, a0);
        }
        if let Some(fb) = fb {
            self.set_face_halfedge(fb, b0);
        }
        if self.vertex_halfedge(va0) == Some(b0) {
            self.set_vertex_halfedge(va0, Some(a1));
        }
        if self.vertex_halfedge(vb0) == Some(a0) {
            self.set_vertex_halfedge(vb0, Some(b1));
        }
        debug_check_topology!(self, "flip_edge");
        Ok(())
    }

    /// Split a face into a fan of triangles around an isolated vertex `v`.
    ///
    /// Every side of the face becomes a triangle with `v`. The triangle on
    /// the halfedge of the face keeps the face's handle, and the new faces
    /// copy the properties of the face.
    pub fn split_face(&mut self, f: FH, v: VH) -> Result<(), Error> {
        if !self.is_valid_face(f) {
            return Err(Error::InvalidFace(f));
        }
        if self.is_deleted(f) {
            return Err(Error::DeletedFace(f));
        }
        if !self.is_valid_vertex(v) || !self.is_isolated_vertex(v) {
            return Err(Error::InvalidVertex(v));
        }
        if self.is_deleted(v) {
            return Err(Error::DeletedVertex(v));
        }
        self.hprops.check_writable()?;
        self.eprops.check_writable()?;
        self.fprops.check_writable()?;
        let hend = self.face_halfedge(f);
        let mut h = self.next_halfedge(hend);
        let hfirst = self.new_edge(self.to_vertex(hend), v)?;
        self.link_halfedges(hend, hfirst);
        self.set_halfedge_face(hfirst, Some(f));
        let mut hold = hfirst.opposite();
        while h != hend {
            let hnext = self.next_halfedge(h);
            let fnew = self.new_face(h)?;
            let hnew = self.new_edge(self.to_vertex(h), v)?;
            self.link_halfedges(hold, h);
            self.link_halfedges(h, hnew);
            self.link_halfedges(hnew, hold);
            self.set_halfedge_face(hold, Some(fnew));
            self.set_halfedge_face(h, Some(fnew));
            self.set_halfedge_face(hnew, Some(fnew));
            self.fprops.copy(f, fnew)?;
            hold = hnew.opposite();
            h = hnext;
        }
        // Close the triangle that keeps the face handle.
        self.link_halfedges(hold, hend);
        self.link_halfedges(hfirst, hold);
        self.set_halfedge_face(hold, Some(f));
        self.set_face_halfedge(f, hend);
        self.set_vertex_halfedge(v, Some(hold));
        debug_check_topology!(self, "split_face");
        Ok(())
    }

    /// Check if a new edge can be inserted from the head of `h0` to the head
    /// of `h1`.
    ///
    /// Both halfedges must be interior halfedges of the same face, and their
    /// heads must not be neighbours in the face or already connected by an
    /// edge.
    pub fn check_edge_insertion(&self, h0: HH, h1: HH) -> bool {
        if !self.is_valid_halfedge(h0)
            || !self.is_valid_halfedge(h1)
            || self.is_deleted(h0)
            || self.is_deleted(h1)
            || h0 == h1
        {
            return false;
        }
        match (self.halfedge_face(h0), self.halfedge_face(h1)) {
            (Some(f0), Some(f1)) if f0 == f1 => {}
            _ => return false,
        }
        if self.next_halfedge(h0) == h1 || self.next_halfedge(h1) == h0 {
            return false;
        }
        let (v0, v1) = (self.to_vertex(h0), self.to_vertex(h1));
        v0 != v1 && self.find_halfedge(v0, v1).is_none()
    }

    /// Split the face of `h0` and `h1` with a new edge from the head of `h0`
    /// to the head of `h1`, and return the new halfedge going that way.
    ///
    /// The face keeps its handle on the side of `h0`. The new face on the
    /// side of `h1` copies the properties of the face.
    pub fn insert_edge(&mut self, h0: HH, h1: HH) -> Result<HH, Error> {
        for h in [h0, h1] {
            if !self.is_valid_halfedge(h) {
                return Err(Error::InvalidHalfedge(h));
            }
            if self.is_deleted(h) {
                return Err(Error::DeletedHalfedge(h));
            }
        }
        if !self.check_edge_insertion(h0, h1) {
            return Err(Error::InvalidEdgeInsertion(h0, h1));
        }
        let Some(f0) = self.halfedge_face(h0) else {
            return Err(Error::InvalidEdgeInsertion(h0, h1));
        };
        self.hprops.check_writable()?;
        self.eprops.check_writable()?;
        self.fprops.check_writable()?;
        let (v0, v1) = (self.to_vertex(h0), self.to_vertex(h1));
        let (h2, h3) = (self.next_halfedge(h0), self.next_halfedge(h1));
        let h4 = self.new_edge(v0, v1)?;
        let h5 = h4.opposite();
        let f1 = self.new_face(h1)?;
        self.link_halfedges(h0, h4);
        self.link_halfedges(h4, h3);
        self.set_halfedge_face(h4, Some(f0));
        self.set_face_halfedge(f0, h0);
        self.link_halfedges(h1, h5);
        self.link_halfedges(h5, h2);
        let mut h = h2;
        loop {
            self.set_halfedge_face(h, Some(f1));
            h = self.next_halfedge(h);
            if h == h2 {
                break;
            }
        }
        self.fprops.copy(f0, f1)?;
        debug_check_topology!(self, "insert_edge");
        Ok(h4)
    }

    /// Check if the halfedge can be collapsed, moving its tail vertex onto its
    /// head vertex without breaking the topology of the mesh.
    pub fn check_edge_collapse(&self, h: HH) -> bool {
        if !self.is_valid_halfedge(h) || self.is_deleted(h) {
            return false;
        }
        let oh = h.opposite();
        let v0 = self.to_vertex(oh);
        let v1 = self.to_vertex(h);
        if self.is_deleted(v0) || self.is_deleted(v1) {
            return false;
        }
        let is_triangle = |h: HH| {
            self.halfedge_face(h)
                .is_some_and(|f| self.face_valence(f) == 3)
        };
        let htriangle = is_triangle(h);
        let ohtriangle = is_triangle(oh);
        // A triangle hanging off the boundary by two of its edges would vanish
        // into a dangling edge.
        let side_vertex = |h: HH, triangle: bool| -> Result<Option<VH>, ()> {
            if !triangle {
                return Ok(None);
            }
            let h1 = self.next_halfedge(h);
            let h2 = self.next_halfedge(h1);
            if self.is_boundary_halfedge(h1.opposite()) && self.is_boundary_halfedge(h2.opposite())
            {
                return Err(());
            }
            Ok(Some(self.to_vertex(h1)))
        };
        let (Ok(vl), Ok(vr)) = (side_vertex(h, htriangle), side_vertex(oh, ohtriangle)) else {
            return false;
        };
        if let (Some(vl), Some(vr)) = (vl, vr) {
            if vl == vr {
                return false;
            }
        }
        // Collapsing an interior edge between two boundary vertices would pinch
        // the mesh.
        if self.is_boundary_vertex(v0)
            && self.is_boundary_vertex(v1)
            && !self.is_boundary_halfedge(h)
            && !self.is_boundary_halfedge(oh)
        {
            return false;
        }
        // Link condition: the only vertices adjacent to both ends may be the
        // tips of the triangles on either side.
        let vl = self.to_vertex(self.next_halfedge(h));
        let vr = self.to_vertex(self.next_halfedge(oh));
        for v in iterator::vv_ccw_iter(self, v0) {
            if v == v1 || (v == vl && htriangle) || (v == vr && ohtriangle) {
                continue;
            }
            if self.find_halfedge(v, v1).is_some() {
                return false;
            }
        }
        // Folded faces that would degenerate.
        for (h, triangle) in [(h, htriangle), (oh, ohtriangle)] {
            if !triangle {
                continue;
            }
            let h1 = self.next_halfedge(h).opposite();
            let h2 = self.prev_halfedge(h).opposite();
            match (self.halfedge_face(h1), self.halfedge_face(h2)) {
                (None, None) => return false,
                (Some(fa), Some(fb)) if fa == fb && self.face_valence(fa) != 3 => return false,
                _ => {}
            }
        }
        true
    }

    /// Remove a loop of two halfedges left behind by a collapse. The face of
    /// the loop, if any, and the edge of `h` are deleted.
    fn collapse_degenerate_loop(&mut self, h: HH) {
        let h1 = self.next_halfedge(h);
        let o = h.opposite();
        let o1 = h1.opposite();
        let v0 = self.to_vertex(h);
        let v1 = self.to_vertex(h1);
        let fh = self.halfedge_face(h);
        let fo = self.halfedge_face(o);
        debug_assert_eq!(self.next_halfedge(h1), h);
        debug_assert_ne!(h1, o);
        self.link_halfedges(h1, self.next_halfedge(o));
        self.link_halfedges(self.prev_halfedge(o), h1);
        self.set_halfedge_face(h1, fo);
        self.set_vertex_halfedge(v0, Some(h1));
        self.adjust_outgoing_halfedge(v0);
        self.set_vertex_halfedge(v1, Some(o1));
        self.adjust_outgoing_halfedge(v1);
        if let Some(fo) = fo {
            if self.face_halfedge(fo) == o {
                self.set_face_halfedge(fo, h1);
            }
        }
        if let Some(fh) = fh {
            self.mark_face_deleted(fh);
        }
        self.mark_edge_deleted(h.edge());
    }

    /// Collapse a halfedge.
    ///
    /// The tail vertex of the halfedge is deleted, and its edges are moved to
    /// the head vertex. Triangles incident on the halfedge vanish with it.
    pub(crate) fn collapse_edge(&mut self, h: HH, cache: &mut TopolCache) -> Result<(), Error> {
        if !self.check_edge_collapse(h) {
            return Err(Error::InvalidCollapse(h));
        }
        let hn = self.next_halfedge(h);
        let hp = self.prev_halfedge(h);
        let o = h.opposite();
        let on = self.next_halfedge(o);
        let op = self.prev_halfedge(o);
        let fh = self.halfedge_face(h);
        let fo = self.halfedge_face(o);
        let vh = self.to_vertex(h);
        let vo = self.to_vertex(o);
        cache.halfedges.clear();
        cache.halfedges.extend(iterator::vih_ccw_iter(self, vo));
        for &ih in cache.halfedges.iter() {
            self.set_halfedge_vertex(ih, vh);
        }
        self.link_halfedges(hp, hn);
        self.link_halfedges(op, on);
        if let Some(fh) = fh {
            self.set_face_halfedge(fh, hn);
        }
        if let Some(fo) = fo {
            self.set_face_halfedge(fo, on);
        }
        if self.vertex_halfedge(vh) == Some(o) {
            self.set_vertex_halfedge(vh, Some(hn));
        }
        self.adjust_outgoing_halfedge(vh);
        self.mark_vertex_deleted(vo);
        self.mark_edge_deleted(h.edge());
        if self.next_halfedge(hn) == hp {
            self.collapse_degenerate_loop(hn);
        }
        if self.next_halfedge(on) == op {
            self.collapse_degenerate_loop(on);
        }
        debug_check_topology!(self, "collapse_edge");
        Ok(())
    }
}
