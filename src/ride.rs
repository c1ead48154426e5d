//! The ride as a whole: track, roster, controller and cart in one context.
//!
//! [`Ride`] is the single piece of mutable simulation state. Input handling
//! calls [`Ride::apply`] with [`RideCommand`]s, the frame loop calls
//! [`Ride::tick`] once per rendered frame, and the renderer reads transforms
//! and flags back out through the accessors.
//!
//! # Example
//!
//! ```
//! use rollercoaster::{Ride, RideCommand, RideConfig, RideState};
//!
//! let mut ride = Ride::new(RideConfig::default());
//!
//! ride.apply(RideCommand::AddPassenger).unwrap();
//! ride.apply(RideCommand::Seat(0)).unwrap(); // fasten the belt
//! ride.apply(RideCommand::StartRide).unwrap();
//! assert_eq!(ride.state(), RideState::Active);
//!
//! while ride.state() == RideState::Active {
//!     ride.tick(1.0 / 60.0);
//! }
//! assert_eq!(ride.state(), RideState::Departure);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cart::{Cart, StepOutcome};
use crate::config::{ConfigError, RideConfig};
use crate::controller::{Rejection, RideController, RideState, SeatAction};
use crate::passenger::{Passenger, Roster};
use crate::track::TrackCurve;
use crate::transform::Transform;

/// How frame time maps onto integration steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Pacing {
    /// One step per `tick`, whatever the frame time. Ride duration depends on
    /// the frame rate.
    #[default]
    PerTick,
    /// Fixed-rate steps driven by accumulated frame time.
    FixedStep {
        /// Steps per second.
        hz: f32,
        /// Upper bound on steps run in a single `tick`.
        max_steps: u32,
    },
}

impl Pacing {
    /// Fixed steps at the given rate, at most eight per frame.
    pub fn fixed(hz: f32) -> Self {
        Pacing::FixedStep { hz, max_steps: 8 }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Pacing::PerTick => Ok(()),
            Pacing::FixedStep { hz, max_steps } => {
                if !(hz.is_finite() && hz > 0.0) {
                    return Err(ConfigError::Invalid(format!(
                        "fixed step rate must be positive, got {hz}"
                    )));
                }
                if max_steps == 0 {
                    return Err(ConfigError::Invalid(
                        "max_steps must be at least 1".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// A discrete user action on the ride.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RideCommand {
    AddPassenger,
    StartRide,
    /// Interaction with the passenger in the given seat.
    Seat(usize),
}

/// Result of one [`Ride::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Integration steps run during this tick.
    pub steps: u32,
    /// Whether the cart reached the end of the track during this tick.
    pub ride_ended: bool,
}

/// Explicit simulation context for one roller coaster.
#[derive(Clone, Debug)]
pub struct Ride {
    track: TrackCurve,
    roster: Roster,
    controller: RideController,
    cart: Cart,
    pacing: Pacing,
    accumulator: f32,
}

impl Ride {
    /// Builds a ride without validating the configuration.
    pub fn new(config: RideConfig) -> Self {
        let mut ride = Self {
            track: TrackCurve::new(config.track),
            roster: Roster::new(),
            controller: RideController::new(),
            cart: Cart::new(config.motion, config.seats),
            pacing: config.pacing,
            accumulator: 0.0,
        };
        // Place the parked cart so transforms are valid before the first tick.
        ride.cart.step(&ride.track, RideState::Ready, &ride.roster);
        ride
    }

    /// Validates the configuration, then builds the ride.
    pub fn from_config(config: &RideConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.clone()))
    }

    /// Applies a user command. Rejected commands leave the ride unchanged.
    pub fn apply(&mut self, command: RideCommand) -> Result<(), Rejection> {
        match command {
            RideCommand::AddPassenger => self.add_passenger().map(|_| ()),
            RideCommand::StartRide => self.start_ride(),
            RideCommand::Seat(seat) => self.seat_interaction(seat).map(|_| ()),
        }
    }

    /// Boards the next passenger and returns the seat they took.
    pub fn add_passenger(&mut self) -> Result<usize, Rejection> {
        self.controller.add_passenger(&mut self.roster)
    }

    /// Sends the cart off if every occupied seat is belted.
    pub fn start_ride(&mut self) -> Result<(), Rejection> {
        self.controller.start_ride(&self.roster)
    }

    /// Belts, sickens or unloads the passenger in `seat`, depending on the phase.
    pub fn seat_interaction(&mut self, seat: usize) -> Result<SeatAction, Rejection> {
        self.controller.seat_interaction(&mut self.roster, seat)
    }

    /// Forces the sick state, e.g. from a scripted event.
    pub fn someone_became_sick(&mut self, seat: usize) {
        self.controller.someone_became_sick(&mut self.roster, seat);
    }

    /// Advances the simulation by one frame of `dt` seconds.
    ///
    /// `dt` only matters for [`Pacing::FixedStep`]. A tick stops early when the
    /// cart reaches the station; steps still due after that are dropped.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let steps = match self.pacing {
            Pacing::PerTick => 1,
            Pacing::FixedStep { hz, max_steps } => {
                let step = 1.0 / hz;
                self.accumulator += dt.max(0.0);
                let due = (self.accumulator / step).floor() as u32;
                let steps = due.min(max_steps);
                self.accumulator -= steps as f32 * step;
                if due > max_steps {
                    debug!(due, max_steps, "dropping simulation backlog");
                    self.accumulator = 0.0;
                }
                steps
            }
        };

        // Stop at the station so the frame ends on the arrival pose.
        let mut report = TickReport::default();
        while report.steps < steps {
            report.steps += 1;
            if self.step() {
                report.ride_ended = true;
                break;
            }
        }
        report
    }

    /// One integration step. Returns true if the ride ended on it.
    fn step(&mut self) -> bool {
        let state = self.controller.state();
        match self.cart.step(&self.track, state, &self.roster) {
            StepOutcome::Arrived => {
                info!(passengers = self.controller.passenger_count(), "cart reached the station");
                self.controller.ride_ended(&mut self.roster);
                true
            }
            StepOutcome::Parked | StepOutcome::Moving => false,
        }
    }

    /// Current ride phase.
    pub fn state(&self) -> RideState {
        self.controller.state()
    }

    /// Number of passengers aboard.
    pub fn passenger_count(&self) -> usize {
        self.controller.passenger_count()
    }

    /// Flags of the passenger in `seat`, or `None` past the last seat.
    pub fn passenger(&self, seat: usize) -> Option<&Passenger> {
        self.roster.get(seat)
    }

    /// All eight seats, occupied or not.
    pub fn passengers(&self) -> &Roster {
        &self.roster
    }

    /// The track the cart runs on. Renderers sample it to build the rail.
    pub fn track(&self) -> &TrackCurve {
        &self.track
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// How frame time maps onto integration steps.
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Progress of the cart along the track.
    pub fn progress(&self) -> f32 {
        self.cart.progress()
    }

    /// Progress gained per integration step.
    pub fn speed(&self) -> f32 {
        self.cart.speed()
    }

    /// World transform of the cart body.
    pub fn cart_transform(&self) -> Transform {
        self.cart.transform()
    }

    /// World transform of the passenger in `seat`, if the seat is occupied.
    pub fn passenger_transform(&self, seat: usize) -> Option<Transform> {
        self.roster
            .get(seat)
            .filter(|p| p.is_active())
            .and_then(|_| self.cart.seat_transform(seat))
    }
}

impl Default for Ride {
    fn default() -> Self {
        Self::new(RideConfig::default())
    }
}
