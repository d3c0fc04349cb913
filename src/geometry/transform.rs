use nalgebra::{Matrix4, Rotation3, Unit};
use thiserror::Error;

use crate::geometry::{
    FloatType, ObjectBox, ObjectPoint, ObjectVector, Ray, WorldBox, WorldPoint, WorldVector,
};

pub type Matrix = Matrix4<FloatType>;

/// Multiplies the matrix with `(v, w)` and drops the fourth coordinate.
/// Use `w = 1` for points (translation applies) and `w = 0` for directions.
pub fn apply(matrix: &Matrix, v: &WorldVector, w: FloatType) -> WorldVector {
    (matrix * v.push(w)).xyz()
}

#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    #[error("Transform matrix is not invertible: {0}")]
    Singular(Matrix),
}

/// Affine transform from an object's local space to world space,
/// together with the inverses needed to go back and to transform normals.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    forward: Matrix,
    inverse: Matrix,
    inverse_transpose: Matrix,
}

impl Transform {
    pub fn new(forward: Matrix) -> Result<Transform, TransformError> {
        let inverse = forward
            .try_inverse()
            .filter(|inverse| inverse.iter().all(|x| x.is_finite()))
            .ok_or(TransformError::Singular(forward))?;
        Ok(Transform {
            forward,
            inverse,
            inverse_transpose: inverse.transpose(),
        })
    }

    pub fn identity() -> Transform {
        Transform {
            forward: Matrix::identity(),
            inverse: Matrix::identity(),
            inverse_transpose: Matrix::identity(),
        }
    }

    /// Builds `translate * rotate_x * rotate_y * rotate_z * scale`.
    /// Rotation angles are in degrees.
    pub fn from_translation_rotation_scale(
        translation: &WorldVector,
        rotation_degrees: &WorldVector,
        scale: &WorldVector,
    ) -> Result<Transform, TransformError> {
        let rotation = Rotation3::from_axis_angle(&WorldVector::x_axis(), rotation_degrees.x.to_radians())
            * Rotation3::from_axis_angle(&WorldVector::y_axis(), rotation_degrees.y.to_radians())
            * Rotation3::from_axis_angle(&WorldVector::z_axis(), rotation_degrees.z.to_radians());
        Transform::new(
            Matrix::new_translation(translation)
                * rotation.to_homogeneous()
                * Matrix::new_nonuniform_scaling(scale),
        )
    }

    /// Transform that maps the centered unit cube onto the given box.
    pub fn from_box(b: &ObjectBox) -> Result<Transform, TransformError> {
        Transform::new(
            Matrix::new_translation(&b.center().coords) * Matrix::new_nonuniform_scaling(&b.size()),
        )
    }

    /// Transform that first applies `inner` and then `self`.
    pub fn compose(&self, inner: &Transform) -> Transform {
        let inverse = inner.inverse * self.inverse;
        Transform {
            forward: self.forward * inner.forward,
            inverse,
            inverse_transpose: inverse.transpose(),
        }
    }

    pub fn forward(&self) -> &Matrix {
        &self.forward
    }

    pub fn inverse(&self) -> &Matrix {
        &self.inverse
    }

    /// Moves the ray into object space, direction is normalized again.
    pub fn ray_to_object(&self, ray: &Ray) -> Ray {
        Ray::new(
            apply(&self.inverse, &ray.origin.coords, 1.0).into(),
            apply(&self.inverse, &ray.direction, 0.0),
        )
    }

    pub fn point_to_world(&self, p: &ObjectPoint) -> WorldPoint {
        apply(&self.forward, &p.coords, 1.0).into()
    }

    pub fn normal_to_world(&self, normal: &ObjectVector) -> Unit<WorldVector> {
        Unit::new_normalize(apply(&self.inverse_transpose, normal, 0.0))
    }

    /// World space bounding box of a transformed object space box.
    pub fn box_to_world(&self, b: &ObjectBox) -> WorldBox {
        let corners = b.corners().map(|corner| self.point_to_world(&corner));
        WorldBox::from_points(&corners).unwrap_or_else(|| unreachable!("There are always 8 corners"))
    }
}
