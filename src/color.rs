use crate::geometry::FloatType;

/// Linear RGB radiance. Values are not clamped; sinks clamp on output.
pub type Color = rgb::RGB<FloatType>;

pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

pub trait ColorExt {
    fn gray(value: FloatType) -> Color;

    /// Componentwise product, e.g. light intensity filtered by a surface color.
    fn modulate(self, other: Color) -> Color;

    /// Linear blend, `self` at `t == 0`, `other` at `t == 1`.
    fn lerp(self, other: Color, t: FloatType) -> Color;
}

impl ColorExt for Color {
    fn gray(value: FloatType) -> Color {
        Color::new(value, value, value)
    }

    fn modulate(self, other: Color) -> Color {
        Color::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }

    fn lerp(self, other: Color, t: FloatType) -> Color {
        self * (1.0 - t) + other * t
    }
}
