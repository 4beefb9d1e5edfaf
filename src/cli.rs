use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use image::RgbaImage;
use indicatif::ProgressBar;

use whitted::{
    Camera, ColorScheme, EnvironmentMap, Light, LightingModel, Material, RenderSettings, Shape,
    Transform, TransformStack, World,
    color::{BLACK, Color, ColorExt, WHITE},
    geometry::{ScreenSize, WorldVector},
    render,
};

fn main() -> anyhow::Result<()> {
    let world = build_world()?;
    let resolution = world.camera.get_resolution();

    let image = Arc::new(Mutex::new(RgbaImage::new(resolution.x, resolution.y)));
    let sink = Arc::clone(&image);
    let mut handle = render(world, RenderSettings::detailed(), move |pixel, color| {
        sink.lock()
            .expect("Poisoned lock!")
            .put_pixel(pixel.x, pixel.y, color_to_image(color));
    })?;

    let bar = ProgressBar::new(handle.progress().1 as u64);
    while !handle.is_finished() {
        bar.set_position(handle.progress().0 as u64);
        thread::sleep(Duration::from_millis(100));
    }
    handle.wait();
    bar.finish();

    image.lock().expect("Poisoned lock!").save("render.png")?;

    Ok(())
}

/// Red glass sphere over a checkered half-space, lit by one directional
/// light, with an environment map filling the sky.
fn build_world() -> anyhow::Result<World> {
    let camera = Camera::builder()
        .resolution(ScreenSize::new(800, 600))
        .transforms(
            TransformStack::new()
                .with(Transform::translate(0.0, 1.0, -10.0))
                .with(Transform::rotate_x(-5.0))
                .with(Transform::rotate_y(30.0)),
        )
        .build();
    let mut world = World::new(camera);

    world.shapes.push(
        Shape::sphere()
            .with_material(Material::constant(Color::new(1.0, 0.0, 0.0), 0.1, 1.8))
            .with_transform(Transform::scale_uniform(4.0)),
    );

    let checker = ColorScheme::checkerboard(BLACK, WHITE, 1.0);
    world.shapes.push(
        Shape::plane(
            Material::air(),
            Material::new(move |point| checker.color_at(point), |_| 1.0, |_| 1.1),
        )
        .with_transform(Transform::translate(0.0, -4.0, 0.0)),
    );

    world.lights.push(Light::directional(
        WorldVector::new(-4.0, -1.0, 1.0),
        Color::gray(0.05),
        WHITE,
        WHITE,
    ));

    world.lighting_model = LightingModel::standard().with_environment(environment()?);

    Ok(world)
}

/// Spherical environment map from the image given on the command line,
/// or a plain sky gradient when none is.
fn environment() -> anyhow::Result<EnvironmentMap> {
    let map = match std::env::args().nth(1) {
        Some(path) => EnvironmentMap::spherical(image::open(path)?.into_rgba8()),
        None => EnvironmentMap::from_fn(|direction| {
            let height = (direction.y + 1.0) / 2.0;
            Color::new(0.9, 0.9, 1.0).lerp(Color::new(0.2, 0.4, 0.8), height)
        }),
    };
    Ok(map)
}

/// Maps 0-1 linear radiance to an 8 bit image pixel, clamping out-of-range
/// values.
fn color_to_image(color: Color) -> image::Rgba<u8> {
    image::Rgba([
        (color.r * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.g * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.b * 255.0).round().clamp(0.0, 255.0) as u8,
        255,
    ])
}
