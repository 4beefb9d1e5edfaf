mod csg;
mod cube;
mod cylinder;
mod plane;
mod sphere;

use std::sync::Arc;

use nalgebra::Unit;
use ordered_float::OrderedFloat;
use rand::Rng;
use rand_distr::{Distribution, UnitSphere};

use crate::color::WHITE;
use crate::color_scheme::ColorScheme;
use crate::geometry::{FAR_AWAY, FloatType, NEARLY_ZERO, Ray, WorldPoint, WorldVector};
use crate::intersection::Intersection;
use crate::material::Material;
use crate::transform::{Transform, TransformStack};

type PerturbFn = Arc<dyn Fn(Unit<WorldVector>, &Intersection) -> WorldVector + Send + Sync>;

/// Geometry of a shape, always expressed in its own local frame.
#[derive(Clone)]
pub enum ShapeKind {
    /// The local XZ plane. The +Y side is the "plus" side.
    Plane { plus: Material, minus: Material },
    /// Unit sphere around the local origin.
    Sphere,
    /// The [-1, 1]³ box.
    Cube,
    /// Unit-radius cylinder around the local Y axis, capped at y = ±1.
    Cylinder,
    Group(Vec<Shape>),
    Union(Box<Shape>, Box<Shape>),
    Intersect(Box<Shape>, Box<Shape>),
    Difference(Box<Shape>, Box<Shape>),
    NormalPerturber { child: Box<Shape>, perturb: PerturbFn },
}

impl ShapeKind {
    /// Convex primitives report at most an entry and an exit hit and get
    /// their outermost media replaced by air.
    fn is_convex_primitive(&self) -> bool {
        matches!(self, ShapeKind::Sphere | ShapeKind::Cube | ShapeKind::Cylinder)
    }
}

#[derive(Clone)]
pub struct Shape {
    kind: ShapeKind,
    transforms: TransformStack,
    diffuse: ColorScheme,
    specular: ColorScheme,
    emissive: Option<ColorScheme>,
    material: Material,
}

impl Shape {
    fn from_kind(kind: ShapeKind) -> Shape {
        Shape {
            kind,
            transforms: TransformStack::new(),
            diffuse: ColorScheme::constant(WHITE),
            specular: ColorScheme::constant(WHITE),
            emissive: None,
            material: Material::opaque(WHITE),
        }
    }

    pub fn sphere() -> Shape {
        Shape::from_kind(ShapeKind::Sphere)
    }

    pub fn cube() -> Shape {
        Shape::from_kind(ShapeKind::Cube)
    }

    pub fn cylinder() -> Shape {
        Shape::from_kind(ShapeKind::Cylinder)
    }

    pub fn plane(plus: Material, minus: Material) -> Shape {
        Shape::from_kind(ShapeKind::Plane { plus, minus })
    }

    pub fn group(children: Vec<Shape>) -> Shape {
        Shape::from_kind(ShapeKind::Group(children))
    }

    pub fn union(a: Shape, b: Shape) -> Shape {
        Shape::from_kind(ShapeKind::Union(Box::new(a), Box::new(b)))
    }

    pub fn intersection(a: Shape, b: Shape) -> Shape {
        Shape::from_kind(ShapeKind::Intersect(Box::new(a), Box::new(b)))
    }

    pub fn difference(a: Shape, b: Shape) -> Shape {
        Shape::from_kind(ShapeKind::Difference(Box::new(a), Box::new(b)))
    }

    pub fn perturbed(
        child: Shape,
        perturb: impl Fn(Unit<WorldVector>, &Intersection) -> WorldVector + Send + Sync + 'static,
    ) -> Shape {
        Shape::from_kind(ShapeKind::NormalPerturber {
            child: Box::new(child),
            perturb: Arc::new(perturb),
        })
    }

    /// Appends a placement step; transforms apply in the order added.
    pub fn with_transform(mut self, transform: Transform) -> Shape {
        self.transforms.push(transform);
        self
    }

    pub fn with_diffuse(mut self, scheme: ColorScheme) -> Shape {
        self.diffuse = scheme;
        self
    }

    pub fn with_specular(mut self, scheme: ColorScheme) -> Shape {
        self.specular = scheme;
        self
    }

    pub fn with_emissive(mut self, scheme: ColorScheme) -> Shape {
        self.emissive = Some(scheme);
        self
    }

    pub fn with_material(mut self, material: Material) -> Shape {
        self.material = material;
        self
    }

    pub fn diffuse(&self) -> &ColorScheme {
        &self.diffuse
    }

    pub fn specular(&self) -> &ColorScheme {
        &self.specular
    }

    pub fn emissive(&self) -> Option<&ColorScheme> {
        self.emissive.as_ref()
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// All crossings of `ray` with this shape's surface, in the caller's
    /// frame, sorted by distance. Hits closer than NEARLY_ZERO to the ray
    /// origin are dropped; hits behind it only survive `include_behind`.
    /// `only_closest` keeps at most the first hit.
    pub fn intersect(&self, ray: &Ray, include_behind: bool, only_closest: bool) -> Vec<Intersection<'_>> {
        let local_ray = self.transforms.ray_to_local(ray);

        let local_hits = match &self.kind {
            ShapeKind::Plane { plus, minus } => {
                plane::intersect(self, plus, minus, &local_ray, include_behind)
            }
            ShapeKind::Sphere => sphere::intersect(self, &local_ray, include_behind),
            ShapeKind::Cube => cube::intersect(self, &local_ray, include_behind),
            ShapeKind::Cylinder => cylinder::intersect(self, &local_ray, include_behind),
            ShapeKind::Group(children) => children
                .iter()
                .flat_map(|child| child.intersect(&local_ray, include_behind, only_closest))
                .collect(),
            ShapeKind::Union(a, b) => {
                csg::intersect(csg::Operation::Union, a, b, &local_ray, include_behind)
            }
            ShapeKind::Intersect(a, b) => {
                csg::intersect(csg::Operation::Intersect, a, b, &local_ray, include_behind)
            }
            ShapeKind::Difference(a, b) => {
                csg::intersect(csg::Operation::Difference, a, b, &local_ray, include_behind)
            }
            ShapeKind::NormalPerturber { child, perturb } => {
                let mut hits = child.intersect(&local_ray, include_behind, only_closest);
                for hit in hits.iter_mut() {
                    let perturbed = perturb(hit.normal, hit);
                    if let Some(normal) = Unit::try_new(perturbed, NEARLY_ZERO) {
                        hit.normal = normal;
                    }
                }
                hits
            }
        };

        let mut hits: Vec<Intersection<'_>> = local_hits
            .into_iter()
            .map(|hit| hit.into_frame(&self.transforms, ray))
            .filter(|hit| hit.distance.abs() >= NEARLY_ZERO)
            .collect();
        hits.sort_by_key(|hit| OrderedFloat(hit.distance));

        if only_closest {
            hits.truncate(1);
        } else if self.kind.is_convex_primitive() {
            hits.truncate(2);
        }
        if self.kind.is_convex_primitive() {
            match hits.as_mut_slice() {
                [] => {}
                [only] => only.leaving = Material::air(),
                [first, .., last] => {
                    first.leaving = Material::air();
                    last.entering = Material::air();
                }
            }
        }
        hits
    }

    pub fn is_inside(&self, point: WorldPoint) -> bool {
        self.is_inside_with_margin(point, NEARLY_ZERO)
    }

    /// Insideness with a signed tolerance around the surface. A positive
    /// margin counts the boundary (and a thin shell) as inside, a negative
    /// one excludes it. CSG filtering relies on both directions.
    fn is_inside_with_margin(&self, point: WorldPoint, margin: FloatType) -> bool {
        let local = self.transforms.point_to_local(point);
        match &self.kind {
            ShapeKind::Plane { .. } => local.y.abs() <= NEARLY_ZERO + margin,
            ShapeKind::Sphere => local.coords.norm() <= 1.0 + margin,
            ShapeKind::Cube => local.coords.amax() <= 1.0 + margin,
            ShapeKind::Cylinder => {
                local.x.hypot(local.z) <= 1.0 + margin && local.y.abs() <= 1.0 + margin
            }
            ShapeKind::Group(children) => {
                children.iter().any(|child| child.is_inside_with_margin(local, margin))
            }
            ShapeKind::Union(a, b) => {
                a.is_inside_with_margin(local, margin) || b.is_inside_with_margin(local, margin)
            }
            ShapeKind::Intersect(a, b) => {
                a.is_inside_with_margin(local, margin) && b.is_inside_with_margin(local, margin)
            }
            ShapeKind::Difference(a, b) => {
                a.is_inside_with_margin(local, margin) && !b.is_inside_with_margin(local, margin)
            }
            ShapeKind::NormalPerturber { child, .. } => child.is_inside_with_margin(local, margin),
        }
    }

    /// Outward surface normal for a point in the local frame.
    pub fn normal_at(&self, local_point: WorldPoint) -> Unit<WorldVector> {
        match &self.kind {
            ShapeKind::Plane { .. } => WorldVector::y_axis(),
            ShapeKind::Sphere => {
                Unit::try_new(local_point.coords, NEARLY_ZERO).unwrap_or_else(WorldVector::y_axis)
            }
            ShapeKind::Cube => cube::normal_at(local_point),
            ShapeKind::Cylinder => cylinder::normal_at(local_point),
            ShapeKind::Group(children) => children
                .first()
                .map(|child| child.normal_at(local_point))
                .unwrap_or_else(WorldVector::y_axis),
            ShapeKind::Union(a, _) | ShapeKind::Intersect(a, _) | ShapeKind::Difference(a, _) => {
                a.normal_at(local_point)
            }
            ShapeKind::NormalPerturber { child, .. } => child.normal_at(local_point),
        }
    }

    /// A random point inside the shape, or on its surface with
    /// `surface_only`. Used to aim photons.
    pub fn sample_point<R: Rng + ?Sized>(&self, rng: &mut R, surface_only: bool) -> WorldPoint {
        let local = match &self.kind {
            ShapeKind::Plane { .. } => WorldPoint::new(
                rng.random_range(-FAR_AWAY..=FAR_AWAY),
                0.0,
                rng.random_range(-FAR_AWAY..=FAR_AWAY),
            ),
            ShapeKind::Sphere => {
                let direction: [FloatType; 3] = UnitSphere.sample(rng);
                let radius = if surface_only { 1.0 } else { rng.random() };
                WorldPoint::new(direction[0], direction[1], direction[2]) * radius
            }
            ShapeKind::Cube => {
                let mut point = WorldPoint::new(
                    rng.random_range(-1.0..=1.0),
                    rng.random_range(-1.0..=1.0),
                    rng.random_range(-1.0..=1.0),
                );
                if surface_only {
                    let axis = rng.random_range(0..3);
                    point[axis] = if rng.random() { 1.0 } else { -1.0 };
                }
                point
            }
            ShapeKind::Cylinder => {
                let angle = rng.random_range(0.0..std::f64::consts::TAU);
                let radius = if surface_only { 1.0 } else { rng.random() };
                WorldPoint::new(
                    angle.cos() * radius,
                    rng.random_range(-1.0..=1.0),
                    angle.sin() * radius,
                )
            }
            ShapeKind::Group(children) => {
                if children.is_empty() {
                    WorldPoint::origin()
                } else {
                    let picked = rng.random_range(0..children.len());
                    children[picked].sample_point(rng, surface_only)
                }
            }
            ShapeKind::Union(a, b) => {
                let child = if rng.random() { a } else { b };
                child.sample_point(rng, surface_only)
            }
            ShapeKind::Intersect(a, _) | ShapeKind::Difference(a, _) => {
                a.sample_point(rng, surface_only)
            }
            ShapeKind::NormalPerturber { child, .. } => child.sample_point(rng, surface_only),
        };
        self.transforms.point_to_world(local)
    }
}

/// Entry-and-exit style pruning shared by the closed primitives.
/// A negative result is exact; rays that pass the test may still miss.
fn misses_bounding_sphere(local_ray: &Ray, radius_squared: FloatType, include_behind: bool) -> bool {
    let oc = local_ray.origin.coords;
    let b = oc.dot(&local_ray.direction);
    let c = oc.dot(&oc) - radius_squared;
    if b * b < c {
        return true;
    }
    !include_behind && c > 0.0 && b > 0.0
}

/// Builds a hit in the local frame; the caller's wrapper converts it up.
/// The normal is flipped to face against the ray.
fn local_hit<'a>(
    shape: &'a Shape,
    local_ray: &Ray,
    distance: FloatType,
    normal: WorldVector,
    leaving: Material,
    entering: Material,
) -> Intersection<'a> {
    let point = local_ray.point_at(distance);
    let normal = Unit::new_normalize(normal);
    let normal = if normal.dot(&local_ray.direction) > 0.0 {
        Unit::new_unchecked(-normal.into_inner())
    } else {
        normal
    };
    Intersection {
        shape,
        point,
        local_point: point,
        normal,
        ray: *local_ray,
        distance,
        leaving,
        entering,
    }
}
