//! Mirror of the ride in a `hecs` world.
//!
//! Renderers that draw from an ECS world spawn the ride once with
//! [`RideScene::spawn`] and call [`RideScene::sync`] after every
//! [`Ride::tick`](crate::Ride::tick). The cart entity and the eight seat
//! entities then carry up-to-date [`Transform`]s and flags; attach meshes or
//! materials to them as needed.
//!
//! ```
//! use rollercoaster::{PassengerView, Ride, RideCommand, RideScene, World};
//!
//! let mut ride = Ride::default();
//! let mut world = World::new();
//! let scene = RideScene::spawn(&mut world, &ride);
//!
//! ride.apply(RideCommand::AddPassenger).unwrap();
//! ride.tick(1.0 / 60.0);
//! scene.sync(&mut world, &ride);
//!
//! let view = world.get::<&PassengerView>(scene.seat(0).unwrap()).unwrap();
//! assert!(view.active);
//! ```

use glam::Vec3;
use hecs::{Entity, World};

use crate::passenger::SEAT_COUNT;
use crate::picking::Collider;
use crate::ride::Ride;
use crate::transform::Transform;

/// Marks the cart entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CartMarker;

/// Marks a seat entity with its seat index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SeatMarker(pub usize);

/// Passenger flags a renderer needs to decide what to draw.
///
/// Belts are drawn only when `belt_on`; inactive seats draw no passenger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassengerView {
    pub active: bool,
    pub belt_on: bool,
    pub sick: bool,
}

/// Size of the cart's picking box.
const CART_EXTENTS: Vec3 = Vec3::new(1.2, 0.6, 2.6);
/// Radius of a seated passenger's picking sphere before seat scaling.
const PASSENGER_RADIUS: f32 = 0.6;

/// Entity handles for one ride spawned into a world.
#[derive(Clone, Debug)]
pub struct RideScene {
    cart: Entity,
    seats: [Entity; SEAT_COUNT],
}

impl RideScene {
    /// Spawns the cart and one entity per seat, already in sync with `ride`.
    pub fn spawn(world: &mut World, ride: &Ride) -> Self {
        let cart = world.spawn((
            ride.cart_transform(),
            CartMarker,
            Collider::box_collider(CART_EXTENTS),
        ));
        let seats = std::array::from_fn(|seat| {
            world.spawn((
                Transform::new(),
                SeatMarker(seat),
                PassengerView::default(),
                Collider::sphere(PASSENGER_RADIUS),
            ))
        });

        let scene = Self { cart, seats };
        scene.sync(world, ride);
        scene
    }

    pub fn cart(&self) -> Entity {
        self.cart
    }

    pub fn seat(&self, seat: usize) -> Option<Entity> {
        self.seats.get(seat).copied()
    }

    /// Copies the ride's current transforms and passenger flags into the world.
    ///
    /// Entities despawned by the caller are skipped.
    pub fn sync(&self, world: &mut World, ride: &Ride) {
        if let Ok(mut transform) = world.get::<&mut Transform>(self.cart) {
            *transform = ride.cart_transform();
        }

        for (seat, &entity) in self.seats.iter().enumerate() {
            let Some(passenger) = ride.passenger(seat) else {
                continue;
            };
            let Ok((transform, view)) =
                world.query_one_mut::<(&mut Transform, &mut PassengerView)>(entity)
            else {
                continue;
            };

            *view = PassengerView {
                active: passenger.is_active(),
                belt_on: passenger.is_belt_on(),
                sick: passenger.is_sick(),
            };
            if let Some(placed) = ride.passenger_transform(seat) {
                *transform = placed;
            }
        }
    }
}
