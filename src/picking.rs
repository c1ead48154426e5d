//! Clicking on the ride.
//!
//! Clicking a passenger is an alternative to the seat keys. The renderer
//! turns the cursor into a [`Ray`] with [`Ray::from_screen`], then
//! [`pick_seat`] resolves it to the closest occupied seat. [`pick`] also
//! reports hits on the cart body, for hover highlights and the like.
//!
//! Only entities spawned by [`RideScene`](crate::RideScene) take part: the
//! cart (an oriented box following the track) and the seats (spheres scaled
//! with the passenger). Empty seats are transparent.

use glam::{Mat4, Vec2, Vec3, Vec4};
use hecs::{Entity, World};

use crate::ecs::{CartMarker, PassengerView, SeatMarker};
use crate::transform::Transform;

/// A half-line used for picking. `direction` is unit length, or zero for a
/// ray that hits nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from the camera through the cursor.
    ///
    /// `cursor` is in window pixels with the origin at the top left, as
    /// reported by [`Input::mouse_position`](crate::Input::mouse_position).
    /// Returns `None` for an empty viewport or a singular camera.
    ///
    /// ```
    /// use rollercoaster::{Mat4, Ray, Vec2, Vec3};
    ///
    /// let view = Mat4::look_at_rh(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO, Vec3::Y);
    /// let projection = Mat4::perspective_rh(1.0, 4.0 / 3.0, 0.1, 100.0);
    /// let viewport = Vec2::new(800.0, 600.0);
    ///
    /// let ray = Ray::from_screen(viewport / 2.0, viewport, view, projection).unwrap();
    /// let to_target = (Vec3::ZERO - ray.origin).normalize();
    /// assert!(ray.direction.dot(to_target) > 0.999);
    /// ```
    pub fn from_screen(cursor: Vec2, viewport: Vec2, view: Mat4, projection: Mat4) -> Option<Self> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }
        let clip_to_world = projection * view;
        if clip_to_world.determinant().abs() <= f32::EPSILON {
            return None;
        }
        let clip_to_world = clip_to_world.inverse();

        let ndc = Vec2::new(
            2.0 * cursor.x / viewport.x - 1.0,
            1.0 - 2.0 * cursor.y / viewport.y,
        );
        let unproject = |depth: f32| {
            let p = clip_to_world * Vec4::new(ndc.x, ndc.y, depth, 1.0);
            p.truncate() / p.w
        };
        let near = unproject(0.0);
        let far = unproject(1.0);

        Some(Self::new(near, far - near))
    }

    #[inline]
    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Distance to the first hit on the box `min..max`, if it lies ahead.
    ///
    /// A ray starting inside the box hits its far side.
    pub fn intersect_aabb(&self, min: Vec3, max: Vec3) -> Option<f32> {
        let parallel = self.direction.abs().cmplt(Vec3::splat(f32::EPSILON));
        let inside = self.origin.cmpge(min) & self.origin.cmple(max);
        if (parallel & !inside).any() {
            return None;
        }

        let inv = Vec3::select(parallel, Vec3::ZERO, self.direction.recip());
        let to_min = (min - self.origin) * inv;
        let to_max = (max - self.origin) * inv;
        let near = Vec3::select(parallel, Vec3::NEG_INFINITY, to_min.min(to_max)).max_element();
        let far = Vec3::select(parallel, Vec3::INFINITY, to_min.max(to_max)).min_element();

        first_ahead(near, far)
    }

    /// Distance to the first hit on a sphere, if it lies ahead.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        if self.direction == Vec3::ZERO {
            return None;
        }
        let to_center = center - self.origin;
        let along = to_center.dot(self.direction);
        let miss_sq = to_center.length_squared() - along * along;
        let radius_sq = radius * radius;
        if miss_sq > radius_sq {
            return None;
        }

        let half_chord = (radius_sq - miss_sq).sqrt();
        first_ahead(along - half_chord, along + half_chord)
    }
}

fn first_ahead(near: f32, far: f32) -> Option<f32> {
    if near > far || far <= 0.0 {
        None
    } else if near > 0.0 {
        Some(near)
    } else {
        Some(far)
    }
}

/// Pickable shape of an entity, in its local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Collider {
    /// Box centered on the entity, rotated and scaled with its transform.
    Box { half_extents: Vec3 },
    /// Sphere centered on the entity, scaled by the mean of its scale.
    Sphere { radius: f32 },
}

impl Collider {
    /// Box collider from full dimensions.
    pub fn box_collider(size: Vec3) -> Self {
        Self::Box {
            half_extents: size * 0.5,
        }
    }

    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Distance along `ray` to this collider placed by `transform`.
    pub fn intersect(&self, ray: &Ray, transform: &Transform) -> Option<f32> {
        match *self {
            Collider::Box { half_extents } => {
                // Boxes follow the cart's tilt, so test in the entity's frame.
                let to_local = transform.rotation.inverse();
                let local = Ray {
                    origin: to_local * (ray.origin - transform.position),
                    direction: to_local * ray.direction,
                };
                let half = half_extents * transform.scale;
                local.intersect_aabb(-half, half)
            }
            Collider::Sphere { radius } => {
                let scale = transform.scale.element_sum() / 3.0;
                ray.intersect_sphere(transform.position, radius * scale)
            }
        }
    }
}

/// What a ray hit on the ride.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PickTarget {
    Cart,
    Seat(usize),
}

/// One intersection of a ray with the ride.
#[derive(Clone, Copy, Debug)]
pub struct RideHit {
    pub entity: Entity,
    pub target: PickTarget,
    pub distance: f32,
    pub point: Vec3,
}

/// Every hit on the cart and occupied seats, closest first.
pub fn ride_hits(world: &World, ray: &Ray) -> Vec<RideHit> {
    let mut query = world.query::<(
        &Transform,
        &Collider,
        Option<&CartMarker>,
        Option<&SeatMarker>,
        Option<&PassengerView>,
    )>();

    let mut hits: Vec<RideHit> = query
        .iter()
        .filter_map(|(entity, (transform, collider, cart, seat, view))| {
            let target = match (cart, seat) {
                (_, Some(&SeatMarker(seat))) => {
                    if view.is_some_and(|v| !v.active) {
                        return None;
                    }
                    PickTarget::Seat(seat)
                }
                (Some(_), None) => PickTarget::Cart,
                (None, None) => return None,
            };
            let distance = collider.intersect(ray, transform)?;
            Some(RideHit {
                entity,
                target,
                distance,
                point: ray.point_at(distance),
            })
        })
        .collect();

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// The closest hit on the ride, cart body included.
pub fn pick(world: &World, ray: &Ray) -> Option<RideHit> {
    ride_hits(world, ray).into_iter().next()
}

/// The closest occupied seat under the ray.
///
/// The cart body does not block seats, so a passenger sitting inside the
/// cart's box can still be clicked.
pub fn pick_seat(world: &World, ray: &Ray) -> Option<usize> {
    ride_hits(world, ray)
        .into_iter()
        .find_map(|hit| match hit.target {
            PickTarget::Seat(seat) => Some(seat),
            PickTarget::Cart => None,
        })
}
