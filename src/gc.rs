use std::any::Any;

use crate::{
    element::{EH, FH, HH, Handle, VH},
    error::Error,
    macros::debug_check_topology,
    status::Status,
    topol::Topology,
};

/// Translates handles issued before a garbage collection into handles that are
/// valid after it.
///
/// Handles of deleted elements map to `None`. Surviving elements keep their
/// relative order, so the translation is monotonic.
pub struct Remap {
    vertices: Vec<Option<VH>>,
    halfedges: Vec<Option<HH>>,
    edges: Vec<Option<EH>>,
    faces: Vec<Option<FH>>,
}

fn lookup<H: Handle>(map: &[Option<H>], h: H) -> Option<H> {
    map.get(h.index() as usize).copied().flatten()
}

/// Rewrite the values if they are handles of kind `H`. Returns false if the
/// values are of some other type.
fn translate_handles<H: Handle>(values: &mut dyn Any, map: &[Option<H>]) -> bool {
    if let Some(handles) = values.downcast_mut::<Vec<H>>() {
        for h in handles.iter_mut() {
            *h = lookup(map, *h).unwrap_or(H::INVALID);
        }
        return true;
    }
    if let Some(handles) = values.downcast_mut::<Vec<Option<H>>>() {
        for h in handles.iter_mut() {
            *h = h.and_then(|h| lookup(map, h));
        }
        return true;
    }
    false
}

/// Assign consecutive indices to the live slots.
fn index_map<H: Handle>(keep: &[bool]) -> Vec<Option<H>> {
    let mut next = 0u32;
    keep.iter()
        .map(|&k| {
            k.then(|| {
                let h = H::from(next);
                next += 1;
                h
            })
        })
        .collect()
}

fn retain_with<T>(items: &mut Vec<T>, keep: &[bool]) {
    let mut flags = keep.iter();
    items.retain(|_| flags.next().copied().unwrap_or(false));
    items.shrink_to_fit();
}

impl Remap {
    pub fn vertex(&self, v: VH) -> Option<VH> {
        lookup(&self.vertices, v)
    }

    pub fn halfedge(&self, h: HH) -> Option<HH> {
        lookup(&self.halfedges, h)
    }

    pub fn edge(&self, e: EH) -> Option<EH> {
        lookup(&self.edges, e)
    }

    pub fn face(&self, f: FH) -> Option<FH> {
        lookup(&self.faces, f)
    }

    /// Rewrite a column of property values in place, if it stores handles or
    /// optional handles. Columns of any other type are left alone.
    pub(crate) fn translate(&self, values: &mut dyn Any) {
        let _ = translate_handles(values, &self.vertices)
            || translate_handles(values, &self.halfedges)
            || translate_handles(values, &self.edges)
            || translate_handles(values, &self.faces);
    }
}

fn live_flags(statuses: &[Status]) -> Vec<bool> {
    statuses.iter().map(|s| !s.deleted()).collect()
}

impl Topology {
    /// Remove the deleted elements from storage.
    ///
    /// The surviving elements are renumbered densely, keeping their relative
    /// order. Adjacency, property values, and property columns that store
    /// handles are all rewritten to the new numbering. The returned [`Remap`]
    /// translates handles held outside the mesh.
    ///
    /// Fails without modifying the mesh if any property is borrowed.
    pub fn garbage_collection(&mut self) -> Result<Remap, Error> {
        self.vprops.check_writable()?;
        self.hprops.check_writable()?;
        self.eprops.check_writable()?;
        self.fprops.check_writable()?;
        let vkeep = live_flags(&self.vstatus);
        let hkeep = live_flags(&self.hstatus);
        let ekeep = live_flags(&self.estatus);
        let fkeep = live_flags(&self.fstatus);
        let remap = Remap {
            vertices: index_map(&vkeep),
            halfedges: index_map(&hkeep),
            edges: index_map(&ekeep),
            faces: index_map(&fkeep),
        };
        let removed = (
            self.deleted_vertices,
            self.deleted_edges,
            self.deleted_faces,
        );
        // Records and statuses.
        retain_with(&mut self.vertices, &vkeep);
        retain_with(&mut self.edges, &ekeep);
        retain_with(&mut self.faces, &fkeep);
        retain_with(&mut self.vstatus, &vkeep);
        retain_with(&mut self.hstatus, &hkeep);
        retain_with(&mut self.estatus, &ekeep);
        retain_with(&mut self.fstatus, &fkeep);
        // Adjacency.
        for v in self.vertices.iter_mut() {
            v.halfedge = v.halfedge.and_then(|h| remap.halfedge(h));
        }
        for hedge in self.edges.iter_mut().flat_map(|e| e.halfedges.iter_mut()) {
            hedge.vertex = remap.vertex(hedge.vertex).unwrap_or(VH::INVALID);
            hedge.next = remap.halfedge(hedge.next).unwrap_or(HH::INVALID);
            hedge.prev = remap.halfedge(hedge.prev).unwrap_or(HH::INVALID);
            hedge.face = hedge.face.and_then(|f| remap.face(f));
        }
        for f in self.faces.iter_mut() {
            f.halfedge = remap.halfedge(f.halfedge).unwrap_or(HH::INVALID);
        }
        // Properties.
        self.vprops.retain(&vkeep)?;
        self.hprops.retain(&hkeep)?;
        self.eprops.retain(&ekeep)?;
        self.fprops.retain(&fkeep)?;
        self.vprops.remap_handles(&remap)?;
        self.hprops.remap_handles(&remap)?;
        self.eprops.remap_handles(&remap)?;
        self.fprops.remap_handles(&remap)?;
        self.deleted_vertices = 0;
        self.deleted_edges = 0;
        self.deleted_faces = 0;
        log::debug!(
            "Garbage collection removed {} vertices, {} edges and {} faces",
            removed.0,
            removed.1,
            removed.2
        );
        debug_check_topology!(self, "garbage_collection");
        Ok(remap)
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use crate::{
        element::{EH, FH, HH, Handle, VH},
        error::Error,
        iterator,
        topol::{
            HasTopology, TopolCache, Topology,
            test::{quad_box, two_triangles},
        },
    };

    /// Grid of `nx` by `ny` quads.
    fn quad_grid(nx: u32, ny: u32) -> Topology {
        let mut topol = Topology::default();
        let mut cache = TopolCache::default();
        topol
            .add_vertices(((nx + 1) * (ny + 1)) as usize)
            .expect("Cannot add vertices");
        for y in 0..ny {
            for x in 0..nx {
                let v = y * (nx + 1) + x;
                topol
                    .add_face(
                        &[v, v + 1, v + nx + 2, v + nx + 1].map(VH::from),
                        &mut cache,
                    )
                    .expect("Cannot add face");
            }
        }
        topol
    }

    #[test]
    fn t_two_triangles_delete_and_collect() {
        let mut mesh = two_triangles();
        let mut cache = TopolCache::default();
        let mut ids = mesh.vprops.add("v:id", 0u32).expect("Cannot add property");
        for v in 0u32..4 {
            ids.set(v.into(), v * 10).expect("Cannot set property");
        }
        let mut tags = mesh.fprops.add("f:tag", 0u8).expect("Cannot add property");
        tags.set(1.into(), 7).expect("Cannot set property");
        mesh.delete_face(0.into(), &mut cache)
            .expect("Cannot delete face");
        let remap = mesh
            .garbage_collection()
            .expect("Garbage collection failed");
        assert!(!mesh.has_garbage());
        assert_eq!(mesh.faces_size(), 1);
        assert_eq!(mesh.vertices_size(), 3);
        assert_eq!(mesh.edges_size(), 3);
        assert_eq!(mesh.halfedges_size(), 6);
        assert_eq!(mesh.faces().collect::<Vec<_>>(), [FH::from(0)]);
        assert_eq!(remap.face(1.into()), Some(0.into()));
        assert_eq!(remap.face(0.into()), None);
        assert_eq!(remap.vertex(1.into()), None);
        assert_eq!(remap.vertex(3.into()), Some(2.into()));
        assert_eq!(tags.get_cloned(0.into()).expect("Cannot read property"), 7);
        assert_eq!(
            ids.try_borrow().expect("Cannot borrow property").to_vec(),
            vec![0, 20, 30]
        );
        assert_eq!(iterator::fv_ccw_iter(&mesh, 0.into()).count(), 3);
        assert!(iterator::fv_ccw_iter(&mesh, 0.into()).all(|v| v.index() < 3));
        mesh.check_topology().expect("Topology errors found");
    }

    #[test]
    fn t_handle_columns_are_remapped() {
        let mut qbox = quad_box();
        let mut cache = TopolCache::default();
        let mut partner = qbox
            .vprops
            .add("v:partner", VH::INVALID)
            .expect("Cannot add property");
        let mut last = qbox
            .vprops
            .add::<Option<FH>>("v:last_face", None)
            .expect("Cannot add property");
        let mut across = qbox
            .hprops
            .add("h:across", EH::INVALID)
            .expect("Cannot add property");
        for v in 0u32..8 {
            partner
                .set(v.into(), ((v + 1) % 8).into())
                .expect("Cannot set property");
            let f = iterator::vf_ccw_iter(&qbox, v.into()).max();
            last.set(v.into(), f).expect("Cannot set property");
        }
        for h in qbox.halfedges().collect::<Vec<_>>() {
            across.set(h, h.edge()).expect("Cannot set property");
        }
        qbox.delete_vertex(0.into(), &mut cache)
            .expect("Cannot delete vertex");
        let remap = qbox
            .garbage_collection()
            .expect("Garbage collection failed");
        assert_eq!(qbox.num_vertices(), 7);
        assert_eq!(qbox.num_faces(), 3);
        let partner = partner.try_borrow().expect("Cannot borrow property");
        // Vertex 7 pointed at the deleted vertex 0.
        assert_eq!(partner[VH::from(6)], VH::INVALID);
        for v in 0u32..6 {
            assert_eq!(partner[VH::from(v)], VH::from(v + 1));
        }
        let last = last.try_borrow().expect("Cannot borrow property");
        for v in qbox.vertices() {
            if let Some(f) = last[v] {
                assert!(!qbox.is_deleted(f));
            }
        }
        // Old face 2 survives as face 0, and was the last face of old vertex 1.
        assert_eq!(remap.face(2.into()), Some(0.into()));
        assert_eq!(last[VH::from(0)], Some(0.into()));
        let across = across.try_borrow().expect("Cannot borrow property");
        for h in qbox.halfedges() {
            assert_eq!(across[h], h.edge());
        }
        qbox.check_topology().expect("Topology errors found");
    }

    #[test]
    fn t_collection_preserves_order() {
        let mut grid = quad_grid(4, 4);
        let mut cache = TopolCache::default();
        let mut ids = grid.fprops.add("f:id", 0u32).expect("Cannot add property");
        for f in grid.faces().collect::<Vec<_>>() {
            ids.set(f, f.index()).expect("Cannot set property");
        }
        for f in [1u32, 6, 7, 12] {
            grid.delete_face(f.into(), &mut cache)
                .expect("Cannot delete face");
        }
        let remap = grid.garbage_collection().expect("Garbage collection failed");
        assert_eq!(grid.num_faces(), 12);
        assert_eq!(
            ids.try_borrow().expect("Cannot borrow property").to_vec(),
            vec![0, 2, 3, 4, 5, 8, 9, 10, 11, 13, 14, 15]
        );
        let mapped: Vec<_> = (0u32..16)
            .filter_map(|f| remap.face(f.into()))
            .map(|f| f.index())
            .collect();
        assert_eq!(mapped, (0u32..12).collect::<Vec<_>>());
        grid.check_topology().expect("Topology errors found");
    }

    #[test]
    fn t_borrowed_property_blocks_collection() {
        let mut mesh = two_triangles();
        let mut cache = TopolCache::default();
        let ids = mesh.vprops.add("v:id", 0u32).expect("Cannot add property");
        mesh.delete_face(0.into(), &mut cache)
            .expect("Cannot delete face");
        {
            let _values = ids.try_borrow().expect("Cannot borrow property");
            assert!(matches!(
                mesh.garbage_collection(),
                Err(Error::BorrowedPropertyAccess)
            ));
            assert!(mesh.has_garbage());
            assert_eq!(mesh.vertices_size(), 4);
        }
        mesh.garbage_collection()
            .expect("Garbage collection failed");
        assert_eq!(mesh.vertices_size(), 3);
    }

    #[test]
    fn t_collect_without_garbage() {
        let mut qbox = quad_box();
        let remap = qbox.garbage_collection().expect("Garbage collection failed");
        assert_eq!(qbox.num_edges(), 12);
        for h in 0u32..24 {
            assert_eq!(remap.halfedge(h.into()), Some(HH::from(h)));
        }
        assert_eq!(remap.vertex(VH::INVALID), None);
        qbox.check_topology().expect("Topology errors found");
    }

    #[derive(Debug, Clone)]
    enum Deletion {
        Vertex(u32),
        Edge(u32),
        Face(u32),
    }

    fn deletion() -> impl Strategy<Value = Deletion> {
        prop_oneof![
            (0u32..64).prop_map(Deletion::Vertex),
            (0u32..128).prop_map(Deletion::Edge),
            (0u32..64).prop_map(Deletion::Face),
        ]
    }

    proptest! {
        #[test]
        fn prop_delete_and_collect(
            nx in 1u32..6,
            ny in 1u32..6,
            deletions in prop::collection::vec(deletion(), 0..12),
        ) {
            let mut grid = quad_grid(nx, ny);
            let mut cache = TopolCache::default();
            let mut vids = grid.vprops.add("v:id", 0u32).expect("Cannot add property");
            let mut fids = grid.fprops.add("f:id", 0u32).expect("Cannot add property");
            for v in grid.vertices().collect::<Vec<_>>() {
                vids.set(v, v.index()).expect("Cannot set property");
            }
            for f in grid.faces().collect::<Vec<_>>() {
                fids.set(f, f.index()).expect("Cannot set property");
            }
            for d in deletions {
                let result = match d {
                    Deletion::Vertex(i) if (i as usize) < grid.vertices_size() => {
                        grid.delete_vertex(i.into(), &mut cache)
                    }
                    Deletion::Edge(i) if (i as usize) < grid.edges_size() => {
                        grid.delete_edge(i.into(), &mut cache)
                    }
                    Deletion::Face(i) if (i as usize) < grid.faces_size() => {
                        grid.delete_face(i.into(), &mut cache)
                    }
                    _ => Ok(()),
                };
                prop_assert!(result.is_ok());
                prop_assert!(grid.check_topology().is_ok());
            }
            let nverts = grid.num_vertices();
            let nedges = grid.num_edges();
            let nfaces = grid.num_faces();
            let remap = grid.garbage_collection().expect("Garbage collection failed");
            prop_assert!(!grid.has_garbage());
            prop_assert_eq!(grid.vertices_size(), nverts);
            prop_assert_eq!(grid.edges_size(), nedges);
            prop_assert_eq!(grid.faces_size(), nfaces);
            prop_assert!(grid.check_topology().is_ok());
            let vids = vids.try_borrow().expect("Cannot borrow property");
            for v in grid.vertices() {
                prop_assert_eq!(remap.vertex(vids[v].into()), Some(v));
            }
            prop_assert!(vids.windows(2).all(|w| w[0] < w[1]));
            let fids = fids.try_borrow().expect("Cannot borrow property");
            for f in grid.faces() {
                prop_assert_eq!(remap.face(fids[f].into()), Some(f));
            }
        }
    }
}
