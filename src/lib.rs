mod camera;
pub mod color;
mod color_scheme;
pub mod geometry;
mod intersection;
mod light;
mod material;
mod photon_map;
mod renderer;
mod shading;
mod shape;
mod transform;
mod world;

pub use crate::renderer::{
    Antialiasing, RenderError, RenderHandle, RenderSettings, SplitStrategy, WorkerCount, render,
};
pub use camera::Camera;
pub use color_scheme::ColorScheme;
pub use intersection::Intersection;
pub use light::Light;
pub use material::Material;
pub use photon_map::PhotonMap;
pub use shading::{EnvironmentMap, LightingModel, LightingResult};
pub use shape::Shape;
pub use transform::{Transform, TransformStack};
pub use world::World;
