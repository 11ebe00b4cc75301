use crate::{
    element::{FH, VH},
    error::Error,
    iterator,
    macros::debug_check_topology,
    topol::{HasTopology, Topology},
};

impl Topology {
    /// Get an iterator over triplets of vertices, that represent a fan
    /// triangulation of a face starting at the tail of its halfedge.
    pub fn triangulated_face_vertices(&self, f: FH) -> impl Iterator<Item = [VH; 3]> + use<'_> {
        let hstart = self.face_halfedge(f);
        let vstart = self.from_vertex(hstart);
        iterator::loop_ccw_iter(self, self.next_halfedge(hstart))
            .take_while(move |h| self.to_vertex(*h) != vstart)
            .map(move |h| [vstart, self.from_vertex(h), self.to_vertex(h)])
    }

    /// Fan triangles of every live face, in face order.
    pub fn triangulated_vertices(&self) -> impl Iterator<Item = [VH; 3]> + use<'_> {
        self.faces()
            .flat_map(move |f| self.triangulated_face_vertices(f))
    }

    /// Split a face into a fan of triangles.
    ///
    /// The last triangle of the fan keeps the handle of the face. The new
    /// faces copy the properties of the face, and the new halfedges copy the
    /// properties of the halfedge before the face's halfedge.
    pub fn triangulate_face(&mut self, f: FH) -> Result<(), Error> {
        if !self.is_valid_face(f) {
            return Err(Error::InvalidFace(f));
        }
        if self.is_deleted(f) {
            return Err(Error::DeletedFace(f));
        }
        self.hprops.check_writable()?;
        self.eprops.check_writable()?;
        self.fprops.check_writable()?;
        let mut base = self.face_halfedge(f);
        let vstart = self.from_vertex(base);
        let prev = self.prev_halfedge(base);
        let mut next = self.next_halfedge(base);
        while self.to_vertex(self.next_halfedge(next)) != vstart {
            let next2 = self.next_halfedge(next);
            let fnew = self.new_face(base)?;
            let hnew = self.new_edge(vstart, self.to_vertex(next))?;
            let ohnew = hnew.opposite();
            // Close the triangle.
            self.link_halfedges(base, next);
            self.link_halfedges(next, ohnew);
            self.link_halfedges(ohnew, base);
            self.set_halfedge_face(base, Some(fnew));
            self.set_halfedge_face(next, Some(fnew));
            self.set_halfedge_face(ohnew, Some(fnew));
            self.hprops.copy(prev, ohnew)?;
            self.hprops.copy(prev, hnew)?;
            self.fprops.copy(f, fnew)?;
            base = hnew;
            next = next2;
        }
        // Last triangle takes the original face handle.
        self.set_face_halfedge(f, base);
        self.link_halfedges(base, next);
        self.link_halfedges(self.next_halfedge(next), base);
        self.set_halfedge_face(base, Some(f));
        debug_check_topology!(self, "triangulate_face");
        Ok(())
    }

    /// Triangulate every live face.
    pub fn triangulate(&mut self) -> Result<(), Error> {
        // New faces are appended, and come out as triangles already.
        let nfaces = self.faces_size() as u32;
        for f in (0..nfaces).map(FH::from) {
            if !self.is_deleted(f) {
                self.triangulate_face(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        element::Handle,
        iterator,
        topol::{
            HasTopology, TopolCache,
            test::{loop_mesh, quad_box},
        },
    };

    #[test]
    fn t_box_triangulated_indices() {
        let qbox = quad_box();
        assert_eq!(
            qbox.triangulated_vertices()
                .flatten()
                .map(|v| v.index())
                .collect::<Vec<_>>(),
            &[
                1, 0, 3, 1, 3, 2, 4, 0, 1, 4, 1, 5, 5, 1, 2, 5, 2, 6, 6, 2, 3, 6, 3, 7, 7, 3, 0, 7,
                0, 4, 7, 4, 5, 7, 5, 6
            ]
        );
    }

    #[test]
    fn t_box_triangulate_face() {
        let mut qbox = quad_box();
        qbox.triangulate_face(5.into())
            .expect("Failed to triangulate face");
        assert_eq!(7, qbox.num_faces());
        assert_eq!(
            (2, 5),
            qbox.faces().fold((0usize, 0usize), |(t, q), f| {
                match qbox.face_valence(f) {
                    3 => (t + 1, q),
                    4 => (t, 1 + q),
                    _ => (t, q),
                }
            })
        );
        assert_eq!(13, qbox.num_edges());
        assert_eq!(26, qbox.num_halfedges());
        assert_eq!(
            iterator::fv_ccw_iter(&qbox, 5.into())
                .map(|v| v.index())
                .collect::<Vec<_>>(),
            &[5, 6, 7]
        );
        assert_eq!(
            iterator::fv_ccw_iter(&qbox, 6.into())
                .map(|v| v.index())
                .collect::<Vec<_>>(),
            &[4, 5, 7]
        );
        qbox.check_topology().expect("Topology errors found");
    }

    #[test]
    fn t_box_triangulate() {
        let mut qbox = quad_box();
        qbox.triangulate().expect("Cannot triangulate mesh");
        assert_eq!(12, qbox.num_faces());
        assert_eq!(18, qbox.num_edges());
        assert_eq!(36, qbox.num_halfedges());
        assert_eq!(8, qbox.num_vertices());
        assert!(qbox.is_triangle_mesh());
        assert!(qbox.is_closed());
        assert_eq!(
            qbox.faces()
                .flat_map(|f| iterator::fv_ccw_iter(&qbox, f))
                .map(|v| v.index())
                .collect::<Vec<_>>(),
            &[
                3, 2, 1, 1, 5, 4, 2, 6, 5, 3, 7, 6, 0, 4, 7, 5, 6, 7, 0, 3, 1, 0, 1, 4, 1, 2, 5, 2,
                3, 6, 3, 0, 7, 4, 5, 7
            ]
        );
        qbox.check_topology().expect("Topology errors found");
    }

    #[test]
    fn t_triangulate_copies_face_properties() {
        let mut mesh = loop_mesh();
        let mut cache = TopolCache::default();
        let mut tags = mesh.fprops.add("f:tag", 0u32).expect("Cannot add property");
        for f in mesh.faces().collect::<Vec<_>>() {
            tags.set(f, f.index() + 1).expect("Cannot set property");
        }
        mesh.delete_face(4.into(), &mut cache)
            .expect("Cannot delete face");
        mesh.triangulate().expect("Cannot triangulate mesh");
        // Seven live quads, each split in two.
        assert_eq!(mesh.num_faces(), 14);
        assert!(mesh.is_triangle_mesh());
        let tags = tags.try_borrow().expect("Cannot borrow property");
        for tag in [1u32, 2, 3, 4, 6, 7, 8] {
            assert_eq!(mesh.faces().filter(|f| tags[*f] == tag).count(), 2);
        }
        assert!(mesh.faces().all(|f| tags[f] != 5));
        mesh.check_topology().expect("Topology errors found");
    }
}
