use nalgebra::Unit;

use crate::color::Color;
use crate::geometry::{FloatType, Ray, WorldPoint, WorldVector};
use crate::material::Material;
use crate::shape::Shape;
use crate::transform::TransformStack;

/// A single surface crossing, expressed in the frame of whoever asked.
#[derive(Clone)]
pub struct Intersection<'a> {
    pub shape: &'a Shape,
    pub point: WorldPoint,
    /// Hit point in the innermost shape-local frame. Color schemes are
    /// indexed by this point, so patterns stick to transformed shapes.
    pub local_point: WorldPoint,
    /// Oriented against the ray.
    pub normal: Unit<WorldVector>,
    /// The ray that produced this hit.
    pub ray: Ray,
    /// Signed distance from the ray origin along its direction.
    pub distance: FloatType,
    /// Medium on the side the ray arrives from.
    pub leaving: Material,
    /// Medium behind the surface.
    pub entering: Material,
}

impl<'a> Intersection<'a> {
    pub fn diffuse_color(&self) -> Color {
        self.shape.diffuse().color_at(self.local_point)
    }

    pub fn specular_color(&self) -> Color {
        self.shape.specular().color_at(self.local_point)
    }

    pub fn emissive_color(&self) -> Option<Color> {
        self.shape.emissive().map(|scheme| scheme.color_at(self.local_point))
    }

    pub fn shininess(&self) -> FloatType {
        self.shape.specular().shininess()
    }

    /// Flip which side of the surface counts as the front.
    pub fn inverted(mut self) -> Intersection<'a> {
        self.normal = Unit::new_unchecked(-self.normal.into_inner());
        std::mem::swap(&mut self.leaving, &mut self.entering);
        self
    }

    /// Re-express the hit one frame up. The local point is left alone.
    pub(crate) fn into_frame(mut self, stack: &TransformStack, ray: &Ray) -> Intersection<'a> {
        self.point = stack.point_to_world(self.point);
        self.normal = stack.normal_to_world(self.normal);
        self.ray = *ray;
        self.distance = (self.point - ray.origin).dot(&ray.direction);
        self
    }
}
