/*!
This is an optional module that is enabled by the `use_glam` feature. It
provides mesh types that can be used out of the box, that use
[`glam`](https://docs.rs/glam/latest/glam/) to represent the positions of the
vertices.
*/

use crate::mesh::{self, Adaptor, FloatScalarAdaptor};

/// Built-in adaptor for meshes that use 32-bit floating point numbers to
/// represent the geometry of the mesh.
pub struct BuiltInAdaptorF32 {}

impl Adaptor<3> for BuiltInAdaptorF32 {
    type Vector = glam::Vec3;
    type Scalar = f32;

    fn vector(coords: [Self::Scalar; 3]) -> Self::Vector {
        glam::Vec3::from_array(coords)
    }

    fn zero_vector() -> Self::Vector {
        glam::Vec3::ZERO
    }

    fn vector_coord(v: &Self::Vector, i: usize) -> Self::Scalar {
        v[i]
    }
}

impl FloatScalarAdaptor<3> for BuiltInAdaptorF32 {
    fn scalarf32(val: f32) -> Self::Scalar {
        val
    }

    fn scalarf64(val: f64) -> Self::Scalar {
        val as f32
    }
}

/// Built-in adaptor for meshes that use 64-bit floating point numbers to
/// represent the geometry of the mesh.
pub struct BuiltInAdaptorF64 {}

impl Adaptor<3> for BuiltInAdaptorF64 {
    type Vector = glam::DVec3;
    type Scalar = f64;

    fn vector(coords: [Self::Scalar; 3]) -> Self::Vector {
        glam::DVec3::from_array(coords)
    }

    fn zero_vector() -> Self::Vector {
        glam::DVec3::ZERO
    }

    fn vector_coord(v: &Self::Vector, i: usize) -> Self::Scalar {
        v[i]
    }
}

impl FloatScalarAdaptor<3> for BuiltInAdaptorF64 {
    fn scalarf32(val: f32) -> Self::Scalar {
        val as f64
    }

    fn scalarf64(val: f64) -> Self::Scalar {
        val
    }
}

/// Mesh type that uses 32 bit floating point numbers to represent the
/// geometry.
pub type PolyMeshF32 = mesh::PolyMeshT<3, BuiltInAdaptorF32>;

/// Mesh type that uses 64 bit floating point numbers to represent the
/// geometry.
pub type PolyMeshF64 = mesh::PolyMeshT<3, BuiltInAdaptorF64>;

#[cfg(test)]
mod test {
    use super::{PolyMeshF32, PolyMeshF64};
    use crate::{macros::assert_f32_eq, topol::HasTopology};

    #[test]
    fn t_f64_mesh() {
        let mut mesh = PolyMeshF64::new();
        mesh.add_vertices(&[
            glam::dvec3(0.0, 0.0, 0.0),
            glam::dvec3(1.0, 0.0, 0.0),
            glam::dvec3(0.0, 1.0, 0.0),
        ])
        .expect("Cannot add vertices");
        mesh.add_tri_face(0.into(), 1.into(), 2.into())
            .expect("Cannot add face");
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(
            mesh.point(1.into()).expect("Cannot read point"),
            glam::dvec3(1.0, 0.0, 0.0)
        );
    }

    #[test]
    fn t_unit_box_corners() {
        let mesh = PolyMeshF32::unit_box().expect("Cannot create box");
        let points = mesh.points();
        let points = points.try_borrow().expect("Cannot borrow points");
        let sum = points.iter().fold(glam::Vec3::ZERO, |acc, p| acc + *p);
        assert_f32_eq!(sum.x, 4.0);
        assert_f32_eq!(sum.y, 4.0);
        assert_f32_eq!(sum.z, 4.0);
    }
}
