//! Cart motion along the track.
//!
//! Each [`Cart::step`] advances the progress parameter `t` by the current
//! speed, where speed responds to the slope just ahead of the cart: climbs
//! bleed speed geometrically (with a floor so the cart never stalls), descents
//! and flats add a constant acceleration up to the top speed.
//!
//! After moving, the cart rebuilds its world transform from the track frame
//! and places every seated passenger relative to it. The cart is the only
//! writer of passenger transforms.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::ConfigError;
use crate::controller::RideState;
use crate::frame::Frame;
use crate::passenger::{Roster, SEAT_COUNT, SeatLayout};
use crate::track::TrackCurve;
use crate::transform::Transform;

/// Speed dynamics and placement of the cart.
///
/// Speeds are in units of `t` per step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionParams {
    /// Speed cap.
    pub top_speed: f32,
    /// Speed added per step on flats and descents.
    pub acceleration: f32,
    /// Divisor applied per step while climbing. Must be greater than one.
    pub deceleration: f32,
    /// How far ahead (in `t`) the slope is sampled.
    pub slope_lookahead: f32,
    /// Height of the cart origin above the rail centerline.
    pub ride_height: f32,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            top_speed: 0.0008,
            acceleration: 0.000025,
            deceleration: 1.04,
            slope_lookahead: 0.001,
            ride_height: 0.63,
        }
    }
}

impl MotionParams {
    /// Lowest speed the cart keeps while climbing.
    pub fn climb_floor(&self) -> f32 {
        2.0 * self.acceleration
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            self.top_speed,
            self.acceleration,
            self.deceleration,
            self.slope_lookahead,
            self.ride_height,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid(
                "motion parameters must be finite".to_string(),
            ));
        }
        if self.top_speed <= 0.0 || self.acceleration <= 0.0 {
            return Err(ConfigError::Invalid(
                "top speed and acceleration must be positive".to_string(),
            ));
        }
        if self.deceleration <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "deceleration must be greater than 1, got {}",
                self.deceleration
            )));
        }
        if self.climb_floor() > self.top_speed {
            return Err(ConfigError::Invalid(format!(
                "climb floor {} exceeds top speed {}",
                self.climb_floor(),
                self.top_speed
            )));
        }
        if self.slope_lookahead <= 0.0 {
            return Err(ConfigError::Invalid(
                "slope lookahead must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sign of the track slope just ahead of the cart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slope {
    Ascending,
    Descending,
    Flat,
}

/// What happened during one integration step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The cart is parked at the start.
    Parked,
    /// The cart moved and is still on its run.
    Moving,
    /// The cart reached the end of the track on this step.
    Arrived,
}

/// The moving cart: progress, speed, and the transforms derived from them.
#[derive(Clone, Debug)]
pub struct Cart {
    params: MotionParams,
    layout: SeatLayout,
    t: f32,
    speed: f32,
    frame: Frame,
    transform: Transform,
    seat_transforms: [Transform; SEAT_COUNT],
}

impl Cart {
    /// A cart parked at the start of the track.
    ///
    /// Transforms stay at identity until the first [`Cart::step`].
    pub fn new(params: MotionParams, layout: SeatLayout) -> Self {
        Self {
            params,
            layout,
            t: 0.0,
            speed: 0.0,
            frame: Frame::IDENTITY,
            transform: Transform::new(),
            seat_transforms: [Transform::new(); SEAT_COUNT],
        }
    }

    /// Progress along the track, `0..=1`.
    pub fn progress(&self) -> f32 {
        self.t
    }

    /// Progress gained per step. Zero while parked and after arrival.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    /// Where the seats sit on the cart.
    pub fn layout(&self) -> &SeatLayout {
        &self.layout
    }

    /// Orientation used for the last transform.
    ///
    /// Kept from the previous step when the track tangent gives no usable frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Current world transform of the cart.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Last computed world transform for a seat.
    ///
    /// Only meaningful while the seat is occupied; the ride hides it otherwise.
    pub fn seat_transform(&self, seat: usize) -> Option<Transform> {
        self.seat_transforms.get(seat).copied()
    }

    /// Slope of the track just ahead of `t`.
    pub fn slope_at(&self, track: &TrackCurve, t: f32) -> Slope {
        let ahead = (t + self.params.slope_lookahead).min(1.0);
        let dy = track.point(ahead).y - track.point(t).y;
        if dy > 0.0 {
            Slope::Ascending
        } else if dy < 0.0 {
            Slope::Descending
        } else {
            Slope::Flat
        }
    }

    /// One integration step.
    ///
    /// When the ride is not running the cart is reset to the start of the
    /// track. When it is, speed follows the slope and `t` advances; reaching
    /// the end clamps `t` to 1, zeroes the speed and returns
    /// [`StepOutcome::Arrived`]. Transforms are refreshed in every case.
    pub fn step(&mut self, track: &TrackCurve, state: RideState, roster: &Roster) -> StepOutcome {
        let outcome = if state.is_running() {
            self.advance(track)
        } else {
            self.t = 0.0;
            StepOutcome::Parked
        };

        self.update_transform(track);
        self.update_passengers(roster);
        outcome
    }

    fn advance(&mut self, track: &TrackCurve) -> StepOutcome {
        let p = self.params;
        match self.slope_at(track, self.t) {
            Slope::Ascending => {
                self.speed /= p.deceleration;
                self.speed = self.speed.max(p.climb_floor());
            }
            Slope::Descending | Slope::Flat => {
                self.speed = (self.speed + p.acceleration).min(p.top_speed);
            }
        }

        self.t += self.speed;
        trace!(t = self.t, speed = self.speed, "cart advanced");

        if self.t > 1.0 {
            self.t = 1.0;
            self.speed = 0.0;
            StepOutcome::Arrived
        } else {
            StepOutcome::Moving
        }
    }

    fn update_transform(&mut self, track: &TrackCurve) {
        let tangent = track.tangent(self.t);
        self.frame = Frame::from_tangent_or(tangent, Vec3::Y, self.frame);

        let position = track.point(self.t) + Vec3::Y * self.params.ride_height;
        self.transform = Transform::from_frame(position, &self.frame);
    }

    fn update_passengers(&mut self, roster: &Roster) {
        for passenger in roster.active() {
            let seat = passenger.seat();
            let local = self.layout.local_transform(seat);
            if let Some(slot) = self.seat_transforms.get_mut(seat) {
                *slot = self.transform.mul_transform(&local);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passenger::SEAT_SCALES;
    use crate::track::TrackParams;

    fn setup() -> (TrackCurve, Cart) {
        (
            TrackCurve::new(TrackParams::default()),
            Cart::new(MotionParams::default(), SeatLayout::default()),
        )
    }

    #[test]
    fn parked_cart_stays_at_start() {
        let (track, mut cart) = setup();
        let roster = Roster::new();
        for state in [RideState::Ready, RideState::Departure] {
            assert_eq!(cart.step(&track, state, &roster), StepOutcome::Parked);
            assert_eq!(cart.progress(), 0.0);
        }
    }

    #[test]
    fn running_cart_moves_monotonically_to_the_end() {
        let (track, mut cart) = setup();
        let roster = Roster::new();
        let params = *cart.params();

        let mut last_t = cart.progress();
        let mut steps = 0;
        loop {
            let slope = cart.slope_at(&track, cart.progress());
            let outcome = cart.step(&track, RideState::Active, &roster);
            steps += 1;
            assert!(cart.progress() >= last_t);
            last_t = cart.progress();

            if outcome == StepOutcome::Arrived {
                break;
            }
            assert!(cart.speed() <= params.top_speed + f32::EPSILON);
            if slope == Slope::Ascending {
                assert!(cart.speed() >= params.climb_floor());
            }
            assert!(steps < 100_000, "cart never arrived");
        }

        assert_eq!(cart.progress(), 1.0);
        assert_eq!(cart.speed(), 0.0);
        assert!(cart.transform().position.is_finite());
    }

    #[test]
    fn flats_accelerate_to_the_cap() {
        let (track, mut cart) = setup();
        let roster = Roster::new();
        // The launch section is flat.
        assert_eq!(cart.slope_at(&track, 0.0), Slope::Flat);
        cart.step(&track, RideState::Active, &roster);
        assert!((cart.speed() - cart.params().acceleration).abs() < 1e-9);
    }

    #[test]
    fn slope_detection_on_hills() {
        let (track, cart) = setup();
        // First hill begins right after the launch (t = 0.08) and rises.
        assert_eq!(cart.slope_at(&track, 0.09), Slope::Ascending);
        // Crest of the first hill is halfway through it; past it, the track falls.
        let hill_len = 0.32 / 3.0;
        assert_eq!(cart.slope_at(&track, 0.08 + hill_len * 0.75), Slope::Descending);
        assert_eq!(cart.slope_at(&track, 0.7), Slope::Flat);
    }

    #[test]
    fn cart_rides_above_the_rail() {
        let (track, mut cart) = setup();
        cart.step(&track, RideState::Ready, &Roster::new());
        let expected = track.point(0.0) + Vec3::Y * cart.params().ride_height;
        assert!((cart.transform().position - expected).length() < 1e-5);
        // Launch heads along +X, so the cart's forward axis does too.
        let forward = cart.transform().rotation * Vec3::Z;
        assert!(forward.dot(Vec3::X) > 0.99);
    }

    #[test]
    fn passengers_follow_the_cart() {
        let (track, mut cart) = setup();
        let mut roster = Roster::new();
        let mut controller = crate::controller::RideController::new();
        controller.add_passenger(&mut roster).unwrap();
        controller.add_passenger(&mut roster).unwrap();

        for _ in 0..500 {
            cart.step(&track, RideState::Active, &roster);
        }

        let cart_transform = cart.transform();
        for seat in 0..2 {
            let placed = cart.seat_transform(seat).unwrap();
            let expected = cart_transform.transform_point(cart.layout().offset(seat));
            assert!((placed.position - expected).length() < 1e-4);
            assert_eq!(placed.scale, Vec3::splat(SEAT_SCALES[seat]));
        }
        // Unoccupied seats were never placed.
        assert_eq!(cart.seat_transform(5), Some(Transform::new()));
        assert_eq!(cart.seat_transform(SEAT_COUNT), None);
    }

    #[test]
    fn motion_validation() {
        assert!(MotionParams::default().validate().is_ok());
        let slow_brake = MotionParams {
            deceleration: 0.9,
            ..Default::default()
        };
        assert!(slow_brake.validate().is_err());
        let floor_too_high = MotionParams {
            acceleration: 0.001,
            ..Default::default()
        };
        assert!(floor_too_high.validate().is_err());
    }
}
