use assert2::assert;
use bon::bon;

use crate::geometry::{FloatType, Ray, ScreenSize, WorldPoint};
use crate::transform::TransformStack;

/// Pinhole camera. In its local frame the image plane is the XY rectangle
/// at z = 0 (x right, y up) and the eye sits behind it on the -Z axis;
/// the transform stack places that frame in the world.
#[derive(Clone, Debug)]
pub struct Camera {
    resolution: ScreenSize,

    /// Width of the image plane in world units.
    field_width: FloatType,
    /// How far behind the plane the eye sits; derived from the field of view.
    eye_distance: FloatType,

    transforms: TransformStack,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(
        resolution: ScreenSize,
        #[builder(default = 4.0)] field_width: FloatType,
        #[builder(default = 60.0)] field_of_view_degrees: FloatType,
        #[builder(default)] transforms: TransformStack,
    ) -> Self {
        assert!(resolution.x > 0);
        assert!(resolution.y > 0);
        assert!(field_width > 0.0);
        assert!(field_of_view_degrees > 0.0 && field_of_view_degrees < 180.0);

        let eye_distance = (field_width / 2.0) / (field_of_view_degrees / 2.0).to_radians().tan();

        Camera {
            resolution,
            field_width,
            eye_distance,
            transforms,
        }
    }
}

impl Camera {
    pub fn get_resolution(&self) -> ScreenSize {
        self.resolution
    }

    /// World ray through continuous pixel coordinates. (0, 0) is the top
    /// left pixel center and y grows downward, like image rows do.
    pub fn ray_through(&self, x: FloatType, y: FloatType) -> Ray {
        // pixel pitch; a one pixel wide axis collapses onto the center
        let steps_x = (self.resolution.x - 1).max(1) as FloatType;
        let steps_y = (self.resolution.y - 1).max(1) as FloatType;
        let center_x = (self.resolution.x - 1) as FloatType / 2.0;
        let center_y = (self.resolution.y - 1) as FloatType / 2.0;

        let field_height =
            self.field_width * self.resolution.y as FloatType / self.resolution.x as FloatType;

        let u = (x - center_x) / steps_x * self.field_width;
        let v = (center_y - y) / steps_y * field_height;

        let eye = WorldPoint::new(0.0, 0.0, -self.eye_distance);
        let plane_point = WorldPoint::new(u, v, 0.0);
        let local = Ray::new(eye, plane_point - eye);
        self.transforms.ray_to_world(&local)
    }
}
