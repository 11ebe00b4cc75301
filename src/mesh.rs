use std::ops::Range;

use crate::{
    element::{EH, FH, HH, Handle, Kind, VH},
    error::Error,
    gc::Remap,
    property::{EProperty, FProperty, HProperty, Property, VProperty},
    status::Status,
    topol::{HasTopology, TopolCache, Topology},
};

/// Name of the vertex property holding the positions of the vertices.
pub const POINTS: &str = "v:point";

/// Tells the mesh how to work with the vector and scalar types used to
/// represent its geometry.
///
/// `DIM` is the number of spatial dimensions the mesh lives in.
pub trait Adaptor<const DIM: usize> {
    type Vector: Copy + 'static;
    type Scalar: Copy + 'static;

    /// Create a vector from its coordinates.
    fn vector(coords: [Self::Scalar; DIM]) -> Self::Vector;

    fn zero_vector() -> Self::Vector;

    /// Get the `i`-th coordinate of a vector.
    fn vector_coord(v: &Self::Vector, i: usize) -> Self::Scalar;
}

/// Adaptor for floating point scalar types.
pub trait FloatScalarAdaptor<const DIM: usize>: Adaptor<DIM> {
    fn scalarf32(val: f32) -> Self::Scalar;

    fn scalarf64(val: f64) -> Self::Scalar;
}

/// A polygon mesh whose vertex positions are described by the adaptor `A`.
///
/// The positions live in the reserved vertex property `"v:point"`, which is
/// created with the mesh and cannot be removed or renamed.
pub struct PolyMeshT<const DIM: usize, A>
where
    A: Adaptor<DIM>,
{
    pub(crate) topol: Topology,
    pub(crate) cache: TopolCache,
    points: VProperty<A::Vector>,
}

impl<const DIM: usize, A> HasTopology for PolyMeshT<DIM, A>
where
    A: Adaptor<DIM>,
{
    fn topology(&self) -> &Topology {
        &self.topol
    }
}

impl<const DIM: usize, A> Default for PolyMeshT<DIM, A>
where
    A: Adaptor<DIM>,
{
    fn default() -> Self {
        Self::new()
    }
}

fn check_reserved<H: Handle>(name: &str) -> Result<(), Error> {
    if H::KIND == Kind::Vertex && name == POINTS {
        Err(Error::ReservedProperty(H::KIND, name.to_string()))
    } else {
        Ok(())
    }
}

impl<const DIM: usize, A> PolyMeshT<DIM, A>
where
    A: Adaptor<DIM>,
{
    pub fn new() -> Self {
        Self::with_capacity(0, 0, 0)
    }

    /// Create an empty mesh with space reserved for the given number of
    /// vertices, edges and faces.
    pub fn with_capacity(nverts: usize, nedges: usize, nfaces: usize) -> Self {
        let mut topol = Topology::with_capacity(nverts, nedges, nfaces);
        let points = match topol.vprops.add(POINTS, A::zero_vector()) {
            Ok(points) => points,
            // The container is empty, so the name is free.
            Err(_) => unreachable!(),
        };
        PolyMeshT {
            topol,
            cache: TopolCache::default(),
            points,
        }
    }

    pub fn reserve(&mut self, nverts: usize, nedges: usize, nfaces: usize) -> Result<(), Error> {
        self.topol.reserve(nverts, nedges, nfaces)
    }

    /// Remove all elements. Properties stay defined, with no values.
    pub fn clear(&mut self) -> Result<(), Error> {
        self.topol.clear()
    }

    /// The positions of the vertices.
    pub fn points(&self) -> VProperty<A::Vector> {
        self.points.clone()
    }

    pub fn point(&self, v: VH) -> Result<A::Vector, Error> {
        self.points.get_cloned(v)
    }

    pub fn set_point(&mut self, v: VH, pos: A::Vector) -> Result<(), Error> {
        self.points.set(v, pos)
    }

    pub fn add_vertex(&mut self, pos: A::Vector) -> Result<VH, Error> {
        let v = self.topol.add_vertex()?;
        self.points.set(v, pos)?;
        Ok(v)
    }

    /// Add vertices at the given positions, returning the range of their
    /// indices.
    pub fn add_vertices(&mut self, pos: &[A::Vector]) -> Result<Range<u32>, Error> {
        let range = self.topol.add_vertices(pos.len())?;
        let mut points = self.points.try_borrow_mut()?;
        points.buf[(range.start as usize)..(range.end as usize)].copy_from_slice(pos);
        Ok(range)
    }

    /// Add a face with the given vertices in counter-clockwise order.
    pub fn add_face(&mut self, verts: &[VH]) -> Result<FH, Error> {
        self.topol.add_face(verts, &mut self.cache)
    }

    pub fn add_tri_face(&mut self, v0: VH, v1: VH, v2: VH) -> Result<FH, Error> {
        self.add_face(&[v0, v1, v2])
    }

    pub fn add_quad_face(&mut self, v0: VH, v1: VH, v2: VH, v3: VH) -> Result<FH, Error> {
        self.add_face(&[v0, v1, v2, v3])
    }

    /// Delete a vertex and its incident faces. Edges and vertices left without
    /// any faces are deleted with them.
    pub fn delete_vertex(&mut self, v: VH) -> Result<(), Error> {
        self.topol.delete_vertex(v, &mut self.cache)
    }

    pub fn delete_edge(&mut self, e: EH) -> Result<(), Error> {
        self.topol.delete_edge(e, &mut self.cache)
    }

    pub fn delete_face(&mut self, f: FH) -> Result<(), Error> {
        self.topol.delete_face(f, &mut self.cache)
    }

    /// Remove deleted elements from storage, and return the map from the old
    /// handles to the new ones. Handles stored in properties are rewritten.
    pub fn garbage_collection(&mut self) -> Result<Remap, Error> {
        self.topol.garbage_collection()
    }

    pub fn check_topology(&self) -> Result<(), Error> {
        self.topol.check_topology()
    }

    /// Mutable access to the status flags of an element. The deleted flag can
    /// only be changed by deleting the element.
    pub fn status_mut<H: Handle>(&mut self, h: H) -> Result<&mut Status, Error> {
        let i = h.index() as usize;
        H::statuses_mut(&mut self.topol)
            .get_mut(i)
            .ok_or(Error::OutOfBoundsAccess(i))
    }

    /// Add a property called `name` to the elements of kind `H`, with every
    /// element set to `default`.
    pub fn add_property<H, T>(&mut self, name: &str, default: T) -> Result<Property<H, T>, Error>
    where
        H: Handle,
        T: Clone + 'static,
    {
        H::properties_mut(&mut self.topol).add(name, default)
    }

    /// Look up a property by name. A property with another value type counts
    /// as missing.
    pub fn get_property<H, T>(&self, name: &str) -> Option<Property<H, T>>
    where
        H: Handle,
        T: Clone + 'static,
    {
        H::properties(&self.topol).get(name)
    }

    pub fn get_or_add_property<H, T>(
        &mut self,
        name: &str,
        default: T,
    ) -> Result<Property<H, T>, Error>
    where
        H: Handle,
        T: Clone + 'static,
    {
        H::properties_mut(&mut self.topol).get_or_add(name, default)
    }

    /// Remove a property. Accessors obtained earlier are detached. Returns
    /// false if there was no such property.
    pub fn remove_property<H: Handle>(&mut self, name: &str) -> Result<bool, Error> {
        check_reserved::<H>(name)?;
        H::properties_mut(&mut self.topol).remove(name)
    }

    /// Rename a property. Returns false if there was no property called
    /// `old`.
    pub fn rename_property<H: Handle>(&mut self, old: &str, new: &str) -> Result<bool, Error> {
        check_reserved::<H>(old)?;
        H::properties_mut(&mut self.topol).rename(old, new)
    }

    pub fn has_property<H: Handle>(&self, name: &str) -> bool {
        H::properties(&self.topol).contains(name)
    }

    /// Names of the properties defined on elements of kind `H`.
    pub fn property_names<H: Handle>(&self) -> Vec<String> {
        H::properties(&self.topol).names()
    }

    pub fn add_vertex_property<T>(&mut self, name: &str, default: T) -> Result<VProperty<T>, Error>
    where
        T: Clone + 'static,
    {
        self.add_property::<VH, T>(name, default)
    }

    pub fn add_halfedge_property<T>(
        &mut self,
        name: &str,
        default: T,
    ) -> Result<HProperty<T>, Error>
    where
        T: Clone + 'static,
    {
        self.add_property::<HH, T>(name, default)
    }

    pub fn add_edge_property<T>(&mut self, name: &str, default: T) -> Result<EProperty<T>, Error>
    where
        T: Clone + 'static,
    {
        self.add_property::<EH, T>(name, default)
    }

    pub fn add_face_property<T>(&mut self, name: &str, default: T) -> Result<FProperty<T>, Error>
    where
        T: Clone + 'static,
    {
        self.add_property::<FH, T>(name, default)
    }

    pub fn get_vertex_property<T>(&self, name: &str) -> Option<VProperty<T>>
    where
        T: Clone + 'static,
    {
        self.get_property::<VH, T>(name)
    }

    pub fn get_halfedge_property<T>(&self, name: &str) -> Option<HProperty<T>>
    where
        T: Clone + 'static,
    {
        self.get_property::<HH, T>(name)
    }

    pub fn get_edge_property<T>(&self, name: &str) -> Option<EProperty<T>>
    where
        T: Clone + 'static,
    {
        self.get_property::<EH, T>(name)
    }

    pub fn get_face_property<T>(&self, name: &str) -> Option<FProperty<T>>
    where
        T: Clone + 'static,
    {
        self.get_property::<FH, T>(name)
    }

    /// Fan triangles of every live face.
    pub fn triangulated_vertices(&self) -> impl Iterator<Item = [VH; 3]> {
        self.topol.triangulated_vertices()
    }

    /// Triangulate a face.
    ///
    /// This does not take the geometry / shape of the face into account. This
    /// only accounts for the topology of the face.
    pub fn triangulate_face(&mut self, f: FH) -> Result<(), Error> {
        self.topol.triangulate_face(f)
    }

    /// Triangulate all faces in this mesh.
    pub fn triangulate(&mut self) -> Result<(), Error> {
        self.topol.triangulate()
    }

    /// Split an edge with a new vertex at the given position.
    ///
    /// A new vertex is inserted at the given position and is used to split the
    /// given edge. A new edge is created during this split. If successful, a
    /// tuple containing the new vertex and the new edge is returned.
    pub fn split_edge(
        &mut self,
        e: EH,
        pos: A::Vector,
        copy_props: bool,
    ) -> Result<(VH, EH), Error> {
        if !self.topol.is_valid_edge(e) {
            return Err(Error::InvalidEdge(e));
        }
        if self.topol.is_deleted(e) {
            return Err(Error::DeletedEdge(e));
        }
        self.topol.hprops.check_writable()?;
        self.topol.eprops.check_writable()?;
        let v = self.add_vertex(pos)?;
        let enew = self.topol.split_edge(e, v, copy_props)?;
        Ok((v, enew))
    }

    pub fn check_edge_flip(&self, e: EH) -> bool {
        self.topol.check_edge_flip(e)
    }

    pub fn flip_edge(&mut self, e: EH) -> Result<(), Error> {
        self.topol.flip_edge(e)
    }

    /// Split a face by inserting a new vertex at the given position, and
    /// connecting it to every vertex of the face. For a triangle this is the
    /// usual one to three split. Returns the new vertex.
    pub fn split_face(&mut self, f: FH, pos: A::Vector) -> Result<VH, Error> {
        if !self.topol.is_valid_face(f) {
            return Err(Error::InvalidFace(f));
        }
        if self.topol.is_deleted(f) {
            return Err(Error::DeletedFace(f));
        }
        self.topol.hprops.check_writable()?;
        self.topol.eprops.check_writable()?;
        self.topol.fprops.check_writable()?;
        let v = self.add_vertex(pos)?;
        self.topol.split_face(f, v)?;
        Ok(v)
    }

    pub fn check_edge_insertion(&self, h0: HH, h1: HH) -> bool {
        self.topol.check_edge_insertion(h0, h1)
    }

    /// Split the face shared by `h0` and `h1` with a new edge between their
    /// head vertices. Returns the new halfedge from the head of `h0` to the
    /// head of `h1`.
    pub fn insert_edge(&mut self, h0: HH, h1: HH) -> Result<HH, Error> {
        self.topol.insert_edge(h0, h1)
    }

    pub fn check_edge_collapse(&self, h: HH) -> bool {
        self.topol.check_edge_collapse(h)
    }

    /// Collapse the halfedge onto its head vertex. The position of the head
    /// vertex is kept.
    pub fn collapse_edge(&mut self, h: HH) -> Result<(), Error> {
        self.topol.collapse_edge(h, &mut self.cache)
    }
}
