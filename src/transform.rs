use assert2::assert;
use nalgebra::{Rotation3, Unit, Vector3};

use crate::geometry::{FloatType, Ray, WorldPoint, WorldVector};

/// A single affine placement step.
#[derive(Copy, Clone, Debug)]
pub enum Transform {
    Translate(WorldVector),
    Rotate(Rotation3<FloatType>),
    /// Per-axis scale factors. Must be nonzero so the inverse exists.
    Scale(WorldVector),
}

impl Transform {
    pub fn translate(x: FloatType, y: FloatType, z: FloatType) -> Transform {
        Transform::Translate(WorldVector::new(x, y, z))
    }

    pub fn rotate_x(degrees: FloatType) -> Transform {
        Transform::Rotate(Rotation3::from_axis_angle(&Vector3::x_axis(), degrees.to_radians()))
    }

    pub fn rotate_y(degrees: FloatType) -> Transform {
        Transform::Rotate(Rotation3::from_axis_angle(&Vector3::y_axis(), degrees.to_radians()))
    }

    pub fn rotate_z(degrees: FloatType) -> Transform {
        Transform::Rotate(Rotation3::from_axis_angle(&Vector3::z_axis(), degrees.to_radians()))
    }

    pub fn scale(x: FloatType, y: FloatType, z: FloatType) -> Transform {
        assert!(x != 0.0 && y != 0.0 && z != 0.0);
        Transform::Scale(WorldVector::new(x, y, z))
    }

    pub fn scale_uniform(factor: FloatType) -> Transform {
        Transform::scale(factor, factor, factor)
    }

    fn point_forward(&self, point: WorldPoint) -> WorldPoint {
        match self {
            Transform::Translate(offset) => point + offset,
            Transform::Rotate(rotation) => rotation * point,
            Transform::Scale(factors) => WorldPoint::from(point.coords.component_mul(factors)),
        }
    }

    fn point_backward(&self, point: WorldPoint) -> WorldPoint {
        match self {
            Transform::Translate(offset) => point - offset,
            Transform::Rotate(rotation) => rotation.inverse() * point,
            Transform::Scale(factors) => WorldPoint::from(point.coords.component_div(factors)),
        }
    }

    fn vector_forward(&self, vector: WorldVector) -> WorldVector {
        match self {
            Transform::Translate(_) => vector,
            Transform::Rotate(rotation) => rotation * vector,
            Transform::Scale(factors) => vector.component_mul(factors),
        }
    }

    fn vector_backward(&self, vector: WorldVector) -> WorldVector {
        match self {
            Transform::Translate(_) => vector,
            Transform::Rotate(rotation) => rotation.inverse() * vector,
            Transform::Scale(factors) => vector.component_div(factors),
        }
    }

    /// Covariant direction transform, the inverse transpose of `vector_forward`.
    fn normal_forward(&self, normal: WorldVector) -> WorldVector {
        match self {
            Transform::Translate(_) => normal,
            Transform::Rotate(rotation) => rotation * normal,
            Transform::Scale(factors) => normal.component_div(factors),
        }
    }
}

/// Ordered list of transforms mapping a local frame to its parent frame.
/// `point_to_world` applies the transforms in the order they were pushed.
#[derive(Clone, Debug, Default)]
pub struct TransformStack {
    transforms: Vec<Transform>,
}

impl TransformStack {
    pub fn new() -> TransformStack {
        TransformStack::default()
    }

    pub fn push(&mut self, transform: Transform) {
        self.transforms.push(transform);
    }

    pub fn with(mut self, transform: Transform) -> TransformStack {
        self.push(transform);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn point_to_world(&self, point: WorldPoint) -> WorldPoint {
        self.transforms.iter().fold(point, |p, t| t.point_forward(p))
    }

    pub fn point_to_local(&self, point: WorldPoint) -> WorldPoint {
        self.transforms.iter().rev().fold(point, |p, t| t.point_backward(p))
    }

    pub fn vector_to_world(&self, vector: WorldVector) -> WorldVector {
        self.transforms.iter().fold(vector, |v, t| t.vector_forward(v))
    }

    pub fn vector_to_local(&self, vector: WorldVector) -> WorldVector {
        self.transforms.iter().rev().fold(vector, |v, t| t.vector_backward(v))
    }

    pub fn normal_to_world(&self, normal: Unit<WorldVector>) -> Unit<WorldVector> {
        let transformed = self
            .transforms
            .iter()
            .fold(normal.into_inner(), |n, t| t.normal_forward(n));
        Unit::new_normalize(transformed)
    }

    /// Direction is renormalized, so local distances along the ray do not
    /// correspond to world distances under scaling.
    pub fn ray_to_local(&self, ray: &Ray) -> Ray {
        Ray {
            origin: self.point_to_local(ray.origin),
            direction: Unit::new_normalize(self.vector_to_local(ray.direction.into_inner())),
            depth: ray.depth,
        }
    }

    pub fn ray_to_world(&self, ray: &Ray) -> Ray {
        Ray {
            origin: self.point_to_world(ray.origin),
            direction: Unit::new_normalize(self.vector_to_world(ray.direction.into_inner())),
            depth: ray.depth,
        }
    }
}
