//! # Rollercoaster
//!
//! **Track, cart motion and ride-state core for an interactive roller-coaster scene.**
//!
//! The crate simulates everything about the ride that is not drawing:
//!
//! - [`TrackCurve`] — a closed parametric loop: flat launch, sine hills, two U-turns
//! - [`RideController`] — the ride phases (`Ready`, `Active`, `SomeoneSick`,
//!   `Departure`) and the rules for boarding, belting, starting and leaving
//! - [`Cart`] — slope-dependent speed along the track and the resulting world
//!   transforms for the cart and every seated passenger
//! - [`Ride`] — all of the above in one explicit simulation context
//!
//! A renderer reads [`Transform`]s and passenger flags back out, either straight
//! from [`Ride`] or from a `hecs` world kept in sync by [`RideScene`].
//!
//! ## Quick Start
//!
//! ```
//! use rollercoaster::*;
//!
//! let mut ride = Ride::from_config(&RideConfig::default()).unwrap();
//! let bindings = Bindings::default();
//! let mut input = Input::new();
//!
//! // One frame: the player boards someone and belts them in.
//! input.press_key(KeyCode::Space);
//! for command in bindings.commands(&input) {
//!     let _ = ride.apply(command);
//! }
//! ride.apply(RideCommand::Seat(0)).unwrap();
//! ride.tick(1.0 / 60.0);
//!
//! let model = ride.passenger_transform(0).unwrap().matrix();
//! assert!(model.is_finite());
//! ```

mod cart;
mod config;
mod controller;
mod ecs;
mod frame;
mod input;
mod passenger;
mod picking;
mod ride;
mod track;
mod transform;

pub use cart::{Cart, MotionParams, Slope, StepOutcome};
pub use config::{ConfigError, RideConfig};
pub use controller::{Rejection, RideController, RideState, SeatAction};
pub use ecs::{CartMarker, PassengerView, RideScene, SeatMarker};
pub use frame::Frame;
pub use input::{Bindings, Input};
pub use passenger::{Passenger, Roster, SEAT_COUNT, SEAT_SCALES, SeatLayout};
pub use picking::{Collider, PickTarget, Ray, RideHit, pick, pick_seat, ride_hits};
pub use ride::{Pacing, Ride, RideCommand, TickReport};
pub use track::{TANGENT_EPSILON, TrackCurve, TrackParams, TrackSample, TrackSegment};
pub use transform::Transform;

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3};

// Re-export the winit types input is expressed in
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

// ECS world the scene mirror lives in
pub use hecs::{Entity, World};
