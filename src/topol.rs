use std::ops::Range;

use crate::{
    element::{EH, Edge, FH, Face, HH, Halfedge, Handle, Kind, VH, Vertex},
    error::{Error, NonManifold},
    iterator,
    macros::debug_check_topology,
    property::PropertyContainer,
    status::Status,
};

/// Scratch space reused across topological edits to avoid allocating on every
/// call.
#[derive(Default)]
pub(crate) struct TopolCache {
    pub(crate) loop_halfedges: Vec<Option<HH>>,
    pub(crate) needs_adjust: Vec<bool>,
    pub(crate) next_cache: Vec<(HH, HH)>,
    pub(crate) halfedges: Vec<HH>,
    pub(crate) edges: Vec<EH>,
    pub(crate) vertices: Vec<VH>,
    pub(crate) faces: Vec<FH>,
}

/// Index of the first of `n` new elements appended after `len` existing ones.
/// Every index must stay below the invalid sentinel.
fn next_index(len: usize, n: usize, kind: Kind) -> Result<u32, Error> {
    match len.checked_add(n).map(u32::try_from) {
        Some(Ok(_)) => Ok(len as u32),
        _ => Err(Error::CapacityExceeded(kind)),
    }
}

impl TopolCache {
    fn clear(&mut self) {
        self.loop_halfedges.clear();
        self.needs_adjust.clear();
        self.next_cache.clear();
        self.halfedges.clear();
        self.edges.clear();
        self.vertices.clear();
        self.faces.clear();
    }
}

/// Connectivity of a polygon mesh, and the properties defined on its elements.
///
/// Edges are stored as pairs of halfedges, so the opposite of a halfedge, and
/// the edge it belongs to, follow from its index. Deleted elements stay in
/// storage, flagged in their status, until the mesh is garbage collected.
pub struct Topology {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) faces: Vec<Face>,
    pub(crate) vstatus: Vec<Status>,
    pub(crate) hstatus: Vec<Status>,
    pub(crate) estatus: Vec<Status>,
    pub(crate) fstatus: Vec<Status>,
    pub(crate) vprops: PropertyContainer<VH>,
    pub(crate) hprops: PropertyContainer<HH>,
    pub(crate) eprops: PropertyContainer<EH>,
    pub(crate) fprops: PropertyContainer<FH>,
    pub(crate) deleted_vertices: usize,
    pub(crate) deleted_edges: usize,
    pub(crate) deleted_faces: usize,
}

/// Read-only topological queries, shared by the bare topology and the meshes
/// built on top of it.
pub trait HasTopology: Sized {
    fn topology(&self) -> &Topology;

    /// Number of live vertices.
    fn num_vertices(&self) -> usize {
        let t = self.topology();
        t.vertices.len() - t.deleted_vertices
    }

    /// Number of live halfedges.
    fn num_halfedges(&self) -> usize {
        self.num_edges() * 2
    }

    /// Number of live edges.
    fn num_edges(&self) -> usize {
        let t = self.topology();
        t.edges.len() - t.deleted_edges
    }

    /// Number of live faces.
    fn num_faces(&self) -> usize {
        let t = self.topology();
        t.faces.len() - t.deleted_faces
    }

    /// Number of vertex slots in storage, including deleted vertices.
    fn vertices_size(&self) -> usize {
        self.topology().vertices.len()
    }

    fn halfedges_size(&self) -> usize {
        self.topology().edges.len() * 2
    }

    fn edges_size(&self) -> usize {
        self.topology().edges.len()
    }

    fn faces_size(&self) -> usize {
        self.topology().faces.len()
    }

    /// Check if any element is marked deleted and waiting for garbage
    /// collection.
    fn has_garbage(&self) -> bool {
        let t = self.topology();
        t.deleted_vertices + t.deleted_edges + t.deleted_faces > 0
    }

    /// Iterate over live vertices in index order.
    fn vertices(&self) -> impl Iterator<Item = VH> {
        let t = self.topology();
        (0..(t.vertices.len() as u32))
            .map(VH::from)
            .filter(move |v| !t.vstatus[v.index() as usize].deleted())
    }

    /// Iterate over live halfedges in index order.
    fn halfedges(&self) -> impl Iterator<Item = HH> {
        let t = self.topology();
        (0..(t.edges.len() as u32 * 2))
            .map(HH::from)
            .filter(move |h| !t.hstatus[h.index() as usize].deleted())
    }

    /// Iterate over live edges in index order.
    fn edges(&self) -> impl Iterator<Item = EH> {
        let t = self.topology();
        (0..(t.edges.len() as u32))
            .map(EH::from)
            .filter(move |e| !t.estatus[e.index() as usize].deleted())
    }

    /// Iterate over live faces in index order.
    fn faces(&self) -> impl Iterator<Item = FH> {
        let t = self.topology();
        (0..(t.faces.len() as u32))
            .map(FH::from)
            .filter(move |f| !t.fstatus[f.index() as usize].deleted())
    }

    fn is_valid_vertex(&self, v: VH) -> bool {
        (v.index() as usize) < self.vertices_size()
    }

    fn is_valid_halfedge(&self, h: HH) -> bool {
        (h.index() as usize) < self.halfedges_size()
    }

    fn is_valid_edge(&self, e: EH) -> bool {
        (e.index() as usize) < self.edges_size()
    }

    fn is_valid_face(&self, f: FH) -> bool {
        (f.index() as usize) < self.faces_size()
    }

    /// Status flags of an element.
    fn status<H: Handle>(&self, h: H) -> Status {
        H::statuses(self.topology())[h.index() as usize]
    }

    /// Check if the element is marked deleted. Out of range handles are not
    /// considered deleted.
    fn is_deleted<H: Handle>(&self, h: H) -> bool {
        H::statuses(self.topology())
            .get(h.index() as usize)
            .is_some_and(|s| s.deleted())
    }

    fn vertex_halfedge(&self, v: VH) -> Option<HH> {
        self.topology().vertex(v).halfedge
    }

    fn to_vertex(&self, h: HH) -> VH {
        self.topology().halfedge(h).vertex
    }

    fn from_vertex(&self, h: HH) -> VH {
        self.topology().halfedge(h.opposite()).vertex
    }

    fn prev_halfedge(&self, h: HH) -> HH {
        self.topology().halfedge(h).prev
    }

    fn next_halfedge(&self, h: HH) -> HH {
        self.topology().halfedge(h).next
    }

    fn opposite_halfedge(&self, h: HH) -> HH {
        h.opposite()
    }

    fn halfedge_face(&self, h: HH) -> Option<FH> {
        self.topology().halfedge(h).face
    }

    fn halfedge_edge(&self, h: HH) -> EH {
        h.edge()
    }

    fn edge_halfedge(&self, e: EH, flag: bool) -> HH {
        e.halfedge(flag)
    }

    fn face_halfedge(&self, f: FH) -> HH {
        self.topology().face(f).halfedge
    }

    /// The next outgoing halfedge clockwise around the tail vertex.
    fn cw_rotated_halfedge(&self, h: HH) -> HH {
        self.next_halfedge(h.opposite())
    }

    /// The next outgoing halfedge counter-clockwise around the tail vertex.
    fn ccw_rotated_halfedge(&self, h: HH) -> HH {
        self.prev_halfedge(h).opposite()
    }

    fn is_boundary_halfedge(&self, h: HH) -> bool {
        self.halfedge_face(h).is_none()
    }

    fn is_boundary_edge(&self, e: EH) -> bool {
        let (h, oh) = e.halfedges();
        self.is_boundary_halfedge(h) || self.is_boundary_halfedge(oh)
    }

    /// Isolated vertices count as boundary vertices.
    fn is_boundary_vertex(&self, v: VH) -> bool {
        match self.vertex_halfedge(v) {
            Some(h) => self.is_boundary_halfedge(h),
            None => true,
        }
    }

    /// A face is on the boundary if any of its edges is.
    fn is_boundary_face(&self, f: FH) -> bool {
        let t = self.topology();
        iterator::fh_ccw_iter(t, f).any(|h| t.is_boundary_halfedge(h.opposite()))
    }

    fn is_isolated_vertex(&self, v: VH) -> bool {
        self.vertex_halfedge(v).is_none()
    }

    fn is_manifold_vertex(&self, v: VH) -> bool {
        /* If just the first outgoing halfedge is on the boundary, it just means
         * the vertex is on the boundary. If the first outgoing halfedge is not
         * on the boundary, it implies the vertex is in the interior. In both
         * cases the vertex is manifold. If any outgoing halfedge apart from the
         * first is on the boundary, it implies there are more than one gaps
         * when circulating around the vertex, making it non-manifold. For this
         * reason, we skip the first halfedge and check the rest.
         */
        let t = self.topology();
        iterator::voh_ccw_iter(t, v)
            .skip(1)
            .all(|h| !t.is_boundary_halfedge(h))
    }

    /// The halfedge going from `from` to `to`, if they are connected.
    fn find_halfedge(&self, from: VH, to: VH) -> Option<HH> {
        let t = self.topology();
        if !t.is_valid_vertex(from) {
            return None;
        }
        iterator::voh_ccw_iter(t, from).find(|h| t.to_vertex(*h) == to)
    }

    fn find_edge(&self, a: VH, b: VH) -> Option<EH> {
        self.find_halfedge(a, b).map(|h| h.edge())
    }

    /// Number of edges incident on the vertex.
    fn vertex_valence(&self, v: VH) -> usize {
        iterator::voh_ccw_iter(self.topology(), v).count()
    }

    /// Number of vertices of the face.
    fn face_valence(&self, f: FH) -> usize {
        iterator::fh_ccw_iter(self.topology(), f).count()
    }

    /// A mesh is closed if none of its live halfedges is on the boundary.
    fn is_closed(&self) -> bool {
        self.halfedges().all(|h| !self.is_boundary_halfedge(h))
    }

    fn is_triangle_mesh(&self) -> bool {
        self.faces().all(|f| self.face_valence(f) == 3)
    }

    fn is_quad_mesh(&self) -> bool {
        self.faces().all(|f| self.face_valence(f) == 4)
    }

    /// Number of boundary loops.
    fn number_of_borders(&self) -> usize {
        let t = self.topology();
        let mut visited = vec![false; t.halfedges_size()];
        let mut count = 0usize;
        for h in t.halfedges() {
            if visited[h.index() as usize] || !t.is_boundary_halfedge(h) {
                continue;
            }
            count += 1;
            for hl in iterator::loop_ccw_iter(t, h) {
                visited[hl.index() as usize] = true;
            }
        }
        count
    }
}

impl HasTopology for Topology {
    fn topology(&self) -> &Topology {
        self
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

impl Topology {
    pub fn new() -> Self {
        Self::with_capacity(0, 0, 0)
    }

    pub fn with_capacity(nverts: usize, nedges: usize, nfaces: usize) -> Self {
        Topology {
            vertices: Vec::with_capacity(nverts),
            edges: Vec::with_capacity(nedges),
            faces: Vec::with_capacity(nfaces),
            vstatus: Vec::with_capacity(nverts),
            hstatus: Vec::with_capacity(nedges * 2),
            estatus: Vec::with_capacity(nedges),
            fstatus: Vec::with_capacity(nfaces),
            vprops: PropertyContainer::new(),
            hprops: PropertyContainer::new(),
            eprops: PropertyContainer::new(),
            fprops: PropertyContainer::new(),
            deleted_vertices: 0,
            deleted_edges: 0,
            deleted_faces: 0,
        }
    }

    /// Reserve memory for an additional number of elements of each kind.
    pub fn reserve(&mut self, nverts: usize, nedges: usize, nfaces: usize) -> Result<(), Error> {
        self.vertices.reserve(nverts);
        self.vstatus.reserve(nverts);
        self.vprops.reserve(nverts)?;
        self.edges.reserve(nedges);
        self.estatus.reserve(nedges);
        self.hstatus.reserve(nedges * 2);
        self.eprops.reserve(nedges)?;
        self.hprops.reserve(nedges * 2)?;
        self.faces.reserve(nfaces);
        self.fstatus.reserve(nfaces);
        self.fprops.reserve(nfaces)?;
        Ok(())
    }

    /// Remove all elements. Properties stay defined, with no values.
    pub fn clear(&mut self) -> Result<(), Error> {
        self.vprops.check_writable()?;
        self.hprops.check_writable()?;
        self.eprops.check_writable()?;
        self.fprops.check_writable()?;
        self.vprops.clear()?;
        self.hprops.clear()?;
        self.eprops.clear()?;
        self.fprops.clear()?;
        self.vertices.clear();
        self.edges.clear();
        self.faces.clear();
        self.vstatus.clear();
        self.hstatus.clear();
        self.estatus.clear();
        self.fstatus.clear();
        self.deleted_vertices = 0;
        self.deleted_edges = 0;
        self.deleted_faces = 0;
        Ok(())
    }

    pub(crate) fn vertex(&self, v: VH) -> &Vertex {
        &self.vertices[v.index() as usize]
    }

    pub(crate) fn halfedge(&self, h: HH) -> &Halfedge {
        &self.edges[(h.index() >> 1) as usize].halfedges[(h.index() & 1) as usize]
    }

    pub(crate) fn halfedge_mut(&mut self, h: HH) -> &mut Halfedge {
        &mut self.edges[(h.index() >> 1) as usize].halfedges[(h.index() & 1) as usize]
    }

    pub(crate) fn face(&self, f: FH) -> &Face {
        &self.faces[f.index() as usize]
    }

    pub(crate) fn set_vertex_halfedge(&mut self, v: VH, h: Option<HH>) {
        self.vertices[v.index() as usize].halfedge = h;
    }

    pub(crate) fn set_face_halfedge(&mut self, f: FH, h: HH) {
        self.faces[f.index() as usize].halfedge = h;
    }

    pub(crate) fn set_halfedge_face(&mut self, h: HH, f: Option<FH>) {
        self.halfedge_mut(h).face = f;
    }

    pub(crate) fn set_halfedge_vertex(&mut self, h: HH, v: VH) {
        self.halfedge_mut(h).vertex = v;
    }

    /// Make `next` follow `prev` in their loop.
    pub(crate) fn link_halfedges(&mut self, prev: HH, next: HH) {
        self.halfedge_mut(prev).next = next;
        self.halfedge_mut(next).prev = prev;
    }

    /// Point the vertex at one of its outgoing boundary halfedges, if it has
    /// any. Boundary vertices must always be stored this way so that
    /// circulating from the stored halfedge walks the whole fan.
    pub(crate) fn adjust_outgoing_halfedge(&mut self, v: VH) {
        let h = iterator::voh_ccw_iter(self, v).find(|h| self.is_boundary_halfedge(*h));
        if let Some(h) = h {
            self.set_vertex_halfedge(v, Some(h))
        }
    }

    pub(crate) fn mark_vertex_deleted(&mut self, v: VH) {
        let status = &mut self.vstatus[v.index() as usize];
        if !status.deleted() {
            status.set_deleted(true);
            self.deleted_vertices += 1;
        }
        self.set_vertex_halfedge(v, None);
    }

    pub(crate) fn mark_edge_deleted(&mut self, e: EH) {
        let status = &mut self.estatus[e.index() as usize];
        if !status.deleted() {
            status.set_deleted(true);
            self.deleted_edges += 1;
        }
        let (h, oh) = e.halfedges();
        self.hstatus[h.index() as usize].set_deleted(true);
        self.hstatus[oh.index() as usize].set_deleted(true);
    }

    pub(crate) fn mark_face_deleted(&mut self, f: FH) {
        let status = &mut self.fstatus[f.index() as usize];
        if !status.deleted() {
            status.set_deleted(true);
            self.deleted_faces += 1;
        }
    }

    pub fn add_vertex(&mut self) -> Result<VH, Error> {
        let vi = next_index(self.vertices.len(), 1, Kind::Vertex)?;
        self.vprops.push_value()?;
        self.vertices.push(Vertex { halfedge: None });
        self.vstatus.push(Status::default());
        Ok(vi.into())
    }

    /// Add `n` isolated vertices, returning the range of their indices.
    pub fn add_vertices(&mut self, n: usize) -> Result<Range<u32>, Error> {
        let start = next_index(self.vertices.len(), n, Kind::Vertex)?;
        self.vprops.push_values(n)?;
        self.vertices
            .resize(self.vertices.len() + n, Vertex { halfedge: None });
        self.vstatus
            .resize(self.vstatus.len() + n, Status::default());
        Ok(start..(start + n as u32))
    }

    /// Create a pair of unlinked halfedges and return the one going from
    /// `from` to `to`. The caller is responsible for linking them.
    pub(crate) fn new_edge(&mut self, from: VH, to: VH) -> Result<HH, Error> {
        // Halfedge indices run to twice the edge count.
        let ei = next_index(2 * self.edges.len(), 2, Kind::Halfedge)? / 2;
        let (h, oh): (HH, HH) = EH::from(ei).halfedges();
        self.hprops.check_writable()?;
        self.eprops.push_value()?;
        self.hprops.push_values(2)?;
        self.edges.push(Edge {
            halfedges: [
                Halfedge {
                    face: None,
                    vertex: to,
                    next: h,
                    prev: h,
                },
                Halfedge {
                    face: None,
                    vertex: from,
                    next: oh,
                    prev: oh,
                },
            ],
        });
        self.estatus.push(Status::default());
        self.hstatus.extend([Status::default(); 2]);
        Ok(h)
    }

    pub(crate) fn new_face(&mut self, halfedge: HH) -> Result<FH, Error> {
        let fi = next_index(self.faces.len(), 1, Kind::Face)?;
        self.fprops.push_value()?;
        self.faces.push(Face { halfedge });
        self.fstatus.push(Status::default());
        Ok(fi.into())
    }

    fn reject_face(&self, verts: &[VH], reason: NonManifold) -> Error {
        log::debug!("Cannot add face {:?}: {:?}", verts, reason);
        Error::NonManifoldInsertion(reason)
    }

    /// Add a face with the given vertices in counter-clockwise order.
    ///
    /// Missing edges are created. Nothing is modified if the face cannot be
    /// inserted without making the mesh non-manifold.
    pub(crate) fn add_face(&mut self, verts: &[VH], cache: &mut TopolCache) -> Result<FH, Error> {
        let nverts = verts.len();
        if nverts < 3 {
            log::debug!("Cannot add face {:?}: too few vertices", verts);
            return Err(Error::DegenerateFace(nverts));
        }
        for (i, v) in verts.iter().enumerate() {
            if !self.is_valid_vertex(*v) {
                return Err(Error::InvalidVertex(*v));
            }
            if self.is_deleted(*v) {
                return Err(Error::DeletedVertex(*v));
            }
            if verts[..i].contains(v) {
                log::debug!("Cannot add face {:?}: repeated vertex {}", verts, v);
                return Err(Error::RepeatedVertex(*v));
            }
        }
        cache.clear();
        cache.loop_halfedges.reserve(nverts);
        cache.needs_adjust.reserve(nverts);
        cache.next_cache.reserve(nverts * 6);
        // Check for topological errors.
        for i in 0..nverts {
            if !self.is_boundary_vertex(verts[i]) {
                // Ensure vertex is manifold.
                return Err(self.reject_face(verts, NonManifold::ComplexVertex(verts[i])));
            }
            // Ensure edge is manifold.
            let h = self.find_halfedge(verts[i], verts[(i + 1) % nverts]);
            if let Some(h) = h {
                if !self.is_boundary_halfedge(h) {
                    return Err(self.reject_face(verts, NonManifold::ComplexHalfedge(h)));
                }
            }
            cache.loop_halfedges.push(h);
            cache.needs_adjust.push(false);
        }
        // If any vertex has more than two incident boundary edges, relinking
        // might be necessary.
        for i in 0..nverts {
            let ii = (i + 1) % nverts;
            let (Some(inner_prev), Some(inner_next)) =
                (cache.loop_halfedges[i], cache.loop_halfedges[ii])
            else {
                continue;
            };
            if self.next_halfedge(inner_prev) == inner_next {
                continue;
            }
            // Find a boundary halfedge entering the vertex, other than
            // `inner_prev`, to park the patch between the two.
            let mut boundary_prev = inner_next.opposite();
            let mut found = false;
            for _ in 0..self.halfedges_size() {
                boundary_prev = self.next_halfedge(boundary_prev).opposite();
                if self.is_boundary_halfedge(boundary_prev) && boundary_prev != inner_prev {
                    found = true;
                    break;
                }
            }
            let boundary_next = self.next_halfedge(boundary_prev);
            if !found || boundary_next == inner_next {
                return Err(self.reject_face(verts, NonManifold::PatchRelinkingFailed(verts[ii])));
            }
            // Relink the patch.
            let patch_start = self.next_halfedge(inner_prev);
            let patch_end = self.prev_halfedge(inner_next);
            cache.next_cache.extend_from_slice(&[
                (boundary_prev, patch_start),
                (patch_end, boundary_next),
                (inner_prev, inner_next),
            ]);
        }
        // Every property column must be resizable before we start writing.
        self.hprops.check_writable()?;
        self.eprops.check_writable()?;
        self.fprops.check_writable()?;
        // No more errors from this point.
        cache.halfedges.reserve(nverts);
        for i in 0..nverts {
            let h = match cache.loop_halfedges[i] {
                Some(h) => h,
                None => self.new_edge(verts[i], verts[(i + 1) % nverts])?,
            };
            cache.halfedges.push(h);
        }
        let fnew = self.new_face(cache.halfedges[nverts - 1])?;
        for i in 0..nverts {
            let ii = (i + 1) % nverts;
            let v = verts[ii];
            let inner_prev = cache.halfedges[i];
            let inner_next = cache.halfedges[ii];
            match (
                cache.loop_halfedges[i].is_none(),
                cache.loop_halfedges[ii].is_none(),
            ) {
                (false, false) => {
                    cache.needs_adjust[ii] = self.vertex_halfedge(v) == Some(inner_next);
                }
                (true, false) => {
                    let outer_next = inner_prev.opposite();
                    let boundary_prev = self.prev_halfedge(inner_next);
                    cache.next_cache.push((boundary_prev, outer_next));
                    cache.next_cache.push((inner_prev, inner_next));
                    self.set_vertex_halfedge(v, Some(outer_next));
                }
                (false, true) => {
                    let outer_prev = inner_next.opposite();
                    let boundary_next = self.next_halfedge(inner_prev);
                    cache.next_cache.push((outer_prev, boundary_next));
                    cache.next_cache.push((inner_prev, inner_next));
                    self.set_vertex_halfedge(v, Some(boundary_next));
                }
                (true, true) => {
                    let outer_next = inner_prev.opposite();
                    let outer_prev = inner_next.opposite();
                    match self.vertex_halfedge(v) {
                        Some(boundary_next) => {
                            let boundary_prev = self.prev_halfedge(boundary_next);
                            cache.next_cache.push((boundary_prev, outer_next));
                            cache.next_cache.push((outer_prev, boundary_next));
                        }
                        None => {
                            self.set_vertex_halfedge(v, Some(outer_next));
                            cache.next_cache.push((outer_prev, outer_next));
                        }
                    }
                    cache.next_cache.push((inner_prev, inner_next));
                }
            }
            self.set_halfedge_face(inner_prev, Some(fnew));
        }
        // Process next halfedge cache.
        for (prev, next) in cache.next_cache.drain(..) {
            self.link_halfedges(prev, next);
        }
        // Adjust vertices' halfedge handles.
        for i in 0..nverts {
            if cache.needs_adjust[i] {
                self.adjust_outgoing_halfedge(verts[i]);
            }
        }
        debug_check_topology!(self, "add_face");
        Ok(fnew)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use arrayvec::ArrayVec;

    use crate::{
        element::{Handle, Kind, VH},
        error::{Error, NonManifold},
        iterator,
    };

    use super::{HasTopology, TopolCache, Topology};

    #[test]
    fn t_next_index_limit() {
        assert_eq!(super::next_index(5, 3, Kind::Vertex).expect("Index overflow"), 5);
        let last = u32::MAX as usize - 1;
        assert_eq!(
            super::next_index(last, 1, Kind::Face).expect("Index overflow"),
            u32::MAX - 1
        );
        assert!(matches!(
            super::next_index(last, 2, Kind::Face),
            Err(Error::CapacityExceeded(Kind::Face))
        ));
        assert!(matches!(
            super::next_index(usize::MAX, 1, Kind::Vertex),
            Err(Error::CapacityExceeded(Kind::Vertex))
        ));
    }

    fn sorted<T: Ord>(mut v: Vec<T>) -> Vec<T> {
        v.sort();
        v
    }

    /**
     * Makes a box with the following topology.
     * ```text
     *
     *      7-----------6
     *     /|          /|
     *    / |         / |
     *   4-----------5  |
     *   |  |        |  |
     *   |  3--------|--2
     *   | /         | /
     *   |/          |/
     *   0-----------1
     * ```
     */
    pub(crate) fn quad_box() -> Topology {
        let mut topol = Topology::with_capacity(8, 12, 6);
        let verts = topol.add_vertices(8).expect("Unable to add vertices");
        assert_eq!(verts, 0..8);
        let mut cache = TopolCache::default();
        let faces: Vec<_> = [
            [0u32, 3, 2, 1],
            [0, 1, 5, 4],
            [1, 2, 6, 5],
            [2, 3, 7, 6],
            [3, 0, 4, 7],
            [4, 5, 6, 7],
        ]
        .iter()
        .map(|indices| {
            topol
                .add_face(&indices.map(|i| i.into()), &mut cache)
                .expect("Unable to add a face")
        })
        .collect();
        assert_eq!(faces, (0u32..6).map(|i| i.into()).collect::<Vec<_>>());
        assert_eq!(topol.num_vertices(), 8);
        assert_eq!(topol.num_halfedges(), 24);
        assert_eq!(topol.num_edges(), 12);
        assert_eq!(topol.num_faces(), 6);
        topol
    }

    /// A 4x4 grid of vertices with the two middle quads missing.
    pub(crate) fn loop_mesh() -> Topology {
        /*

                            12---------13---------14---------15
                           /          /          /          /
                          /   f5     /   f6     /    f7    /
                         /          /          /          /
                        /          /          /          /
                       8----------9----------10---------11
                      /          /          /          /
                     /    f3    /          /    f4    /
                    /          /          /          /
                   /          /          /          /
                  4----------5----------6----------7
                 /          /          /          /
                /   f0     /    f1    /    f2    /
               /          /          /          /
              /          /          /          /
             0----------1----------2----------3
        */
        let mut topol = Topology::with_capacity(16, 24, 8);
        let mut cache = TopolCache::default();
        topol.add_vertices(16).expect("Unable to add vertices");
        for fvi in [
            [0u32, 1, 5, 4],
            [1, 2, 6, 5],
            [2, 3, 7, 6],
            [4, 5, 9, 8],
            [6, 7, 11, 10],
            [8, 9, 13, 12],
            [9, 10, 14, 13],
            [10, 11, 15, 14],
        ] {
            let vs = fvi.iter().map(|i| i.into()).collect::<ArrayVec<VH, 4>>();
            topol.add_face(&vs, &mut cache).expect("Unable to add face");
        }
        topol
    }

    /// Closed tetrahedron with consistently oriented faces.
    pub(crate) fn tetrahedron() -> Topology {
        let mut topol = Topology::with_capacity(4, 6, 4);
        let mut cache = TopolCache::default();
        topol.add_vertices(4).expect("Unable to add vertices");
        for fvi in [[0u32, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]] {
            topol
                .add_face(&fvi.map(|i| i.into()), &mut cache)
                .expect("Unable to add face");
        }
        topol
    }

    /// Two triangles sharing the diagonal of the square 0-1-2-3.
    pub(crate) fn two_triangles() -> Topology {
        let mut topol = Topology::default();
        let mut cache = TopolCache::default();
        topol.add_vertices(4).expect("Unable to add vertices");
        topol
            .add_face(&[0.into(), 1.into(), 2.into()], &mut cache)
            .expect("Cannot add face");
        topol
            .add_face(&[0.into(), 2.into(), 3.into()], &mut cache)
            .expect("Cannot add face");
        topol
    }

    #[test]
    fn t_triangle() {
        let mut topol = Topology::default();
        let mut cache = TopolCache::default();
        let verts: Vec<_> = (0..3).flat_map(|_| topol.add_vertex()).collect();
        assert_eq!(verts, (0..3u32).map(|idx| idx.into()).collect::<Vec<_>>());
        let face = topol
            .add_face(&verts, &mut cache)
            .expect("Cannot add face");
        assert_eq!(topol.num_faces(), 1);
        assert_eq!(topol.num_edges(), 3);
        assert_eq!(topol.num_halfedges(), 6);
        assert_eq!(topol.num_vertices(), 3);
        assert_eq!(face.index(), 0);
        for v in topol.vertices() {
            let h = topol
                .vertex_halfedge(v)
                .expect("Vertex must have an incident halfedge");
            assert!(topol.is_boundary_halfedge(h));
            let oh = topol.opposite_halfedge(h);
            assert!(!topol.is_boundary_halfedge(oh));
            assert_eq!(
                topol
                    .halfedge_face(oh)
                    .expect("Halfedge must have an incident face"),
                face
            );
        }
        assert_eq!(
            topol
                .halfedges()
                .filter(|h| topol.is_boundary_halfedge(*h))
                .count(),
            3
        );
        for (i, j) in (0u32..3).map(|i| (i, (i + 1) % 3)) {
            let h = topol
                .find_halfedge(i.into(), j.into())
                .expect("Cannot find halfedge");
            assert!(!topol.is_boundary_halfedge(h));
            assert_eq!(topol.from_vertex(h), i.into());
            assert_eq!(topol.to_vertex(h), j.into());
        }
        assert_eq!(topol.number_of_borders(), 1);
        assert!(!topol.is_closed());
        assert!(topol.is_triangle_mesh());
        topol.check_topology().expect("Topology errors found");
    }

    #[test]
    fn t_two_triangles() {
        let topol = two_triangles();
        assert_eq!(topol.num_vertices(), 4);
        assert_eq!(topol.num_halfedges(), 10);
        assert_eq!(topol.num_edges(), 5);
        assert_eq!(topol.num_faces(), 2);
        assert_eq!(
            topol.edges().filter(|e| topol.is_boundary_edge(*e)).count(),
            4
        );
        assert_eq!(topol.number_of_borders(), 1);
        let diagonal = topol
            .find_edge(2.into(), 0.into())
            .expect("Cannot find diagonal");
        assert!(!topol.is_boundary_edge(diagonal));
        topol.check_topology().expect("Topology errors found");
    }

    #[test]
    fn t_quad() {
        let mut topol = Topology::default();
        let mut cache = TopolCache::default();
        let verts: Vec<_> = (0..4).flat_map(|_| topol.add_vertex()).collect();
        assert_eq!(verts, vec![0.into(), 1.into(), 2.into(), 3.into()]);
        let face = topol
            .add_face(&verts, &mut cache)
            .expect("Cannot add face");
        assert_eq!(topol.num_faces(), 1);
        assert_eq!(topol.num_edges(), 4);
        assert_eq!(topol.num_vertices(), 4);
        assert_eq!(face, 0.into());
        assert_eq!(topol.face_valence(face), 4);
        assert!(topol.is_quad_mesh());
        assert!(topol.is_boundary_face(face));
    }

    #[test]
    fn t_tetrahedron() {
        let topol = tetrahedron();
        assert_eq!(topol.num_vertices(), 4);
        assert_eq!(topol.num_edges(), 6);
        assert_eq!(topol.num_faces(), 4);
        assert!(topol.edges().all(|e| !topol.is_boundary_edge(e)));
        assert_eq!(topol.number_of_borders(), 0);
        assert!(topol.is_closed());
        let euler =
            topol.num_vertices() as i64 - topol.num_edges() as i64 + topol.num_faces() as i64;
        assert_eq!(euler, 2);
        assert!(topol.vertices().all(|v| topol.vertex_valence(v) == 3));
        topol.check_topology().expect("Topology errors found");
    }

    #[test]
    fn t_face_on_doubly_covered_edge() {
        let mut topol = tetrahedron();
        let mut cache = TopolCache::default();
        let v = topol.add_vertex().expect("Cannot add vertex");
        // Every vertex of the closed tetrahedron is interior.
        let err = topol
            .add_face(&[0.into(), 1.into(), v], &mut cache)
            .expect_err("Face on a closed surface must be rejected");
        assert!(matches!(
            err,
            Error::NonManifoldInsertion(NonManifold::ComplexVertex(_))
        ));
        assert_eq!(topol.num_faces(), 4);
        assert_eq!(topol.num_edges(), 6);
        topol.check_topology().expect("Topology errors found");
    }

    #[test]
    fn t_face_on_interior_halfedge() {
        let mut topol = two_triangles();
        let mut cache = TopolCache::default();
        let v = topol.add_vertex().expect("Cannot add vertex");
        // 0 -> 1 already carries the first triangle.
        let err = topol
            .add_face(&[0.into(), 1.into(), v], &mut cache)
            .expect_err("Face on an interior halfedge must be rejected");
        assert!(matches!(
            err,
            Error::NonManifoldInsertion(NonManifold::ComplexHalfedge(_))
        ));
        assert_eq!(topol.num_faces(), 2);
        assert_eq!(topol.num_edges(), 5);
        topol.check_topology().expect("Topology errors found");
    }

    #[test]
    fn t_degenerate_faces() {
        let mut topol = Topology::default();
        let mut cache = TopolCache::default();
        topol.add_vertices(3).expect("Cannot add vertices");
        assert!(matches!(
            topol.add_face(&[0.into(), 1.into()], &mut cache),
            Err(Error::DegenerateFace(2))
        ));
        assert!(matches!(
            topol.add_face(&[0.into(), 1.into(), 0.into()], &mut cache),
            Err(Error::RepeatedVertex(_))
        ));
        assert!(matches!(
            topol.add_face(&[0.into(), 1.into(), 7.into()], &mut cache),
            Err(Error::InvalidVertex(_))
        ));
        assert_eq!(topol.num_faces(), 0);
        assert_eq!(topol.num_edges(), 0);
    }

    #[test]
    fn t_box_manifold() {
        let qbox = quad_box();
        assert!(
            qbox.halfedges().all(|h| !qbox.is_boundary_halfedge(h)),
            "Not expecting any boundary edges"
        );
        assert!(qbox.vertices().all(|v| qbox.is_manifold_vertex(v)));
        qbox.check_topology().expect("Topology errors found");
    }

    #[test]
    fn t_box_vertex_valences() {
        let qbox = quad_box();
        for v in qbox.vertices() {
            assert_eq!(qbox.vertex_valence(v), 3);
        }
    }

    #[test]
    fn t_box_face_valence() {
        let qbox = quad_box();
        for f in qbox.faces() {
            assert_eq!(qbox.face_valence(f), 4);
        }
        assert!(qbox.is_quad_mesh());
        assert!(!qbox.is_triangle_mesh());
    }

    #[test]
    fn t_loop_mesh_add_face() {
        /*

                            12---------13---------14---------15
                           /          /          /          /
                          /   f5     /   f6     /    f7    /
                         /          /          /          /
                        /          /          /          /
                       8----------9----------10---------11
                      /          / v1--v0   /          /
                     /    f3    /    \  |  /    f4    /
                    /          /      \ | /          /
                   /          /        \|/          /
                  4----------5----------6----------7
                 /          /          /          /
                /   f0     /    f1    /    f2    /
               /          /          /          /
              /          /          /          /
             0----------1----------2----------3
        */
        let mut mesh = loop_mesh();
        mesh.check_topology().expect("Topology errors found");
        assert_eq!(
            mesh.edges().filter(|e| mesh.is_boundary_edge(*e)).count(),
            16
        );
        assert_eq!(mesh.number_of_borders(), 2);
        // Add a floating triangle at v6.
        let v0 = mesh.add_vertex().expect("Unable to add vertex");
        let v1 = mesh.add_vertex().expect("Unable to add vertex");
        let mut cache = TopolCache::default();
        let f0 = mesh
            .add_face(&[6.into(), v0, v1], &mut cache)
            .expect("Unable to add a face");
        assert_eq!(f0.index(), 8);
        mesh.check_topology().expect("Topology errors found");
        assert_eq!(
            sorted(
                iterator::vf_ccw_iter(&mesh, 6.into())
                    .map(|i| i.index())
                    .collect()
            ),
            [1, 2, 4, 8]
        );
        assert_eq!(
            sorted(
                iterator::vv_ccw_iter(&mesh, 6.into())
                    .map(|v| v.index())
                    .collect()
            ),
            sorted(vec![10, v0.index(), v1.index(), 5, 2, 7])
        );
        assert_eq!(iterator::ve_ccw_iter(&mesh, 6.into()).count(), 6);
        assert_eq!(
            mesh.vertices()
                .filter(|v| mesh.is_manifold_vertex(*v))
                .count(),
            17
        );
        assert!(!mesh.is_manifold_vertex(6.into()));
        // Check halfedge connectivity at v6.
        {
            let h = mesh
                .find_halfedge(5.into(), 6.into())
                .expect("Cannot find halfedge");
            assert!(mesh.is_boundary_halfedge(h));
            let h1 = mesh.next_halfedge(h);
            assert_eq!(
                h1,
                mesh.find_halfedge(6.into(), v1)
                    .expect("Cannot find halfedge")
            );
            let h = mesh
                .find_halfedge(6.into(), 10.into())
                .expect("Cannot find halfedge");
            assert!(mesh.is_boundary_halfedge(h));
            let h = mesh.prev_halfedge(h);
            assert_eq!(
                h,
                mesh.find_halfedge(v0, 6.into())
                    .expect("Cannot find halfedge")
            );
        }
        assert_eq!(
            mesh.edges().filter(|e| mesh.is_boundary_edge(*e)).count(),
            19
        );
        // Add another face.
        let f1 = mesh
            .add_face(&[5.into(), 6.into(), v1], &mut cache)
            .expect("Unable to add face");
        assert_eq!(f1.index(), 9);
        assert_eq!(mesh.num_edges(), 28);
        assert_eq!(
            mesh.edges().filter(|e| mesh.is_boundary_edge(*e)).count(),
            18
        );
        assert_eq!(
            sorted(
                iterator::vf_ccw_iter(&mesh, 5.into())
                    .map(|f| f.index())
                    .collect()
            ),
            [0, 1, 3, 9]
        );
        assert!(mesh.is_manifold_vertex(6.into()));
        assert!(mesh.is_manifold_vertex(5.into()));
        mesh.check_topology().expect("Topology errors found");
    }

    #[test]
    fn t_fill_hole_in_loop_mesh() {
        let mut mesh = loop_mesh();
        let mut cache = TopolCache::default();
        mesh.add_face(&[5.into(), 6.into(), 10.into(), 9.into()], &mut cache)
            .expect("Cannot fill the hole");
        assert_eq!(mesh.num_faces(), 9);
        assert_eq!(mesh.number_of_borders(), 1);
        assert_eq!(mesh.num_edges(), 24);
        for v in [5u32, 6, 9, 10] {
            assert!(!mesh.is_boundary_vertex(v.into()));
            assert_eq!(mesh.vertex_valence(v.into()), 4);
        }
        mesh.check_topology().expect("Topology errors found");
    }
}
