/*!
A halfedge based surface mesh kernel, with named and typed properties on the
elements of the mesh, and garbage collection of deleted elements.

# Overview

+ A halfedge datastructure represents the topology of a mesh, i.e. the
  connectivity of vertices, edges and faces. Elements are referred to by
  handles ([`VH`], [`HH`], [`EH`], [`FH`]) that are plain indices into the
  storage of the mesh.

+ Any number of named properties can be attached to each kind of element. A
  property is a column of values of one type, and is created, looked up,
  renamed and removed by name. All columns of an element kind grow, shrink and
  compact together with the elements.

+ Deleting elements only flags them. The storage and all properties keep their
  slots until [`PolyMeshT::garbage_collection`] compacts the mesh, and returns
  a [`Remap`] from the old handles to the new ones. Properties that store
  handles are rewritten in the same pass.

+ The generic polygon mesh type [`PolyMeshT<DIM, A>`] stores the positions of
  the vertices in the reserved [`POINTS`] property. The type of the positions
  is chosen by an implementation of [`Adaptor`], so the mesh can be used with
  any vector type.

+ With the `use_glam` feature, the [`use_glam`] module provides adaptors and
  concrete mesh types that use [`glam`](https://crates.io/crates/glam):

  + [`PolyMeshF32`](use_glam::PolyMeshF32) using 32 bit floating point
    positions.

  + [`PolyMeshF64`](use_glam::PolyMeshF64) using 64 bit floating point
    positions.

+ The `check-invariants` feature runs the topology checker after every
  structural edit, and panics on the first violation.
*/

mod macros;

mod check;
mod edit;
mod element;
mod error;
mod gc;
mod iterator;
mod mesh;
mod primitive;
mod property;
mod status;
mod topol;
mod triangulate;

#[cfg(feature = "use_glam")]
pub mod use_glam;

pub use element::{EH, FH, HH, Handle, Kind, VH};
pub use error::{Error, NonManifold};
pub use gc::Remap;
pub use iterator::HasIterators;
pub use mesh::{Adaptor, FloatScalarAdaptor, POINTS, PolyMeshT};
pub use property::{
    EPropBuf, EProperty, FPropBuf, FProperty, HPropBuf, HProperty, PropBuf, Property, VPropBuf,
    VProperty,
};
pub use status::Status;
pub use topol::HasTopology;
