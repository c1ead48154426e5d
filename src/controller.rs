//! The ride-state machine.
//!
//! [`RideController`] enforces the boarding → belting → riding → disembarking
//! cycle:
//!
//! ```text
//!            start_ride (everyone belted)
//!   Ready ──────────────────────────────► Active
//!     ▲                                     │ seat interaction
//!     │ last passenger leaves               ▼
//!  Departure ◄──────── ride_ended ───── SomeoneSick
//! ```
//!
//! `ride_ended` also leads from `Active` to `Departure`, or straight back to
//! `Ready` when the cart ran empty.
//!
//! Guard failures never disturb the frame loop. Every operation still reports
//! a [`Rejection`] so callers and tests can see why nothing happened.
//!
//! The controller owns no passengers; it operates on a [`Roster`] handed in by
//! the caller and is the only code that changes passenger flags.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::passenger::{Roster, SEAT_COUNT};

/// Phase of the ride.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RideState {
    /// Boarding and belting allowed; the cart is parked at the start.
    #[default]
    Ready,
    /// The cart is running.
    Active,
    /// The cart is still running, but a passenger got sick.
    SomeoneSick,
    /// The run is over; passengers may leave.
    Departure,
}

impl RideState {
    /// Whether the cart advances along the track in this state.
    pub fn is_running(&self) -> bool {
        matches!(self, RideState::Active | RideState::SomeoneSick)
    }
}

impl fmt::Display for RideState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RideState::Ready => "ready",
            RideState::Active => "active",
            RideState::SomeoneSick => "someone sick",
            RideState::Departure => "departure",
        };
        f.write_str(name)
    }
}

/// Why a ride operation was ignored.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("ride is not ready (currently {state})")]
    NotReady { state: RideState },

    #[error("cart is full")]
    CartFull,

    #[error("passenger in seat {seat} is not belted")]
    Unbelted { seat: usize },

    #[error("seat {seat} is empty")]
    SeatEmpty { seat: usize },

    #[error("seat {seat} does not exist")]
    InvalidSeat { seat: usize },
}

/// What a seat interaction did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatAction {
    /// The passenger fastened their belt.
    Belted,
    /// The passenger got sick mid-ride.
    BecameSick,
    /// The passenger left the cart.
    Left,
}

/// Ride phase plus passenger counter.
#[derive(Clone, Debug, Default)]
pub struct RideController {
    state: RideState,
    passenger_count: usize,
}

impl RideController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RideState {
        self.state
    }

    pub fn passenger_count(&self) -> usize {
        self.passenger_count
    }

    fn transition(&mut self, next: RideState) {
        if self.state != next {
            info!(from = %self.state, to = %next, passengers = self.passenger_count, "ride state changed");
            self.state = next;
        }
    }

    /// Seats the next passenger. Only while `Ready` and not full.
    ///
    /// Returns the seat that was filled.
    pub fn add_passenger(&mut self, roster: &mut Roster) -> Result<usize, Rejection> {
        if self.state != RideState::Ready {
            return reject(Rejection::NotReady { state: self.state });
        }
        if self.passenger_count >= SEAT_COUNT {
            return reject(Rejection::CartFull);
        }

        let seat = self.passenger_count;
        if let Some(passenger) = roster.iter_mut().find(|p| p.seat() == seat) {
            passenger.sit_down();
        }
        self.passenger_count += 1;
        debug!(seat, passengers = self.passenger_count, "passenger boarded");

        Ok(seat)
    }

    /// Starts the ride if every seated passenger is belted.
    pub fn start_ride(&mut self, roster: &Roster) -> Result<(), Rejection> {
        if self.state != RideState::Ready {
            return reject(Rejection::NotReady { state: self.state });
        }
        if let Some(p) = roster.active().find(|p| !p.is_belt_on()) {
            return reject(Rejection::Unbelted { seat: p.seat() });
        }

        self.transition(RideState::Active);
        Ok(())
    }

    /// Interaction with one seat; what it means depends on the ride phase.
    ///
    /// - `Departure`: the passenger leaves. The last one out makes the ride `Ready`.
    /// - `Active`/`SomeoneSick`: the passenger gets sick.
    /// - `Ready`: the passenger fastens the belt.
    pub fn seat_interaction(
        &mut self,
        roster: &mut Roster,
        seat: usize,
    ) -> Result<SeatAction, Rejection> {
        if seat >= SEAT_COUNT {
            return reject(Rejection::InvalidSeat { seat });
        }
        let passenger = match roster.get_mut(seat) {
            Some(p) if p.is_active() => p,
            _ => return reject(Rejection::SeatEmpty { seat }),
        };

        match self.state {
            RideState::Departure => {
                passenger.leave();
                self.passenger_count = self.passenger_count.saturating_sub(1);
                debug!(seat, passengers = self.passenger_count, "passenger left");
                if self.passenger_count == 0 {
                    self.transition(RideState::Ready);
                }
                Ok(SeatAction::Left)
            }
            RideState::Active | RideState::SomeoneSick => {
                passenger.become_sick();
                info!(seat, "passenger became sick");
                self.transition(RideState::SomeoneSick);
                Ok(SeatAction::BecameSick)
            }
            RideState::Ready => {
                passenger.put_belt_on();
                debug!(seat, "belt fastened");
                Ok(SeatAction::Belted)
            }
        }
    }

    /// Called when the cart reaches the end of the track.
    ///
    /// Belts are released for every seat, occupied or not.
    pub fn ride_ended(&mut self, roster: &mut Roster) {
        for passenger in roster.iter_mut() {
            passenger.put_belt_off();
        }

        let next = if self.passenger_count != 0 {
            RideState::Departure
        } else {
            RideState::Ready
        };
        info!(passengers = self.passenger_count, "ride ended");
        self.transition(next);
    }

    /// Forces the `SomeoneSick` state from outside the seat-interaction path.
    ///
    /// The state changes regardless of the seat; the passenger's sick flag is
    /// set only when the seat is occupied.
    pub fn someone_became_sick(&mut self, roster: &mut Roster, seat: usize) {
        if let Some(passenger) = roster.get_mut(seat).filter(|p| p.is_active()) {
            passenger.become_sick();
        }
        self.transition(RideState::SomeoneSick);
    }
}

fn reject<T>(rejection: Rejection) -> Result<T, Rejection> {
    debug!(%rejection, "ride command ignored");
    Err(rejection)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boarded(count: usize) -> (RideController, Roster) {
        let mut controller = RideController::new();
        let mut roster = Roster::new();
        for _ in 0..count {
            controller.add_passenger(&mut roster).unwrap();
        }
        (controller, roster)
    }

    fn belt_all(controller: &mut RideController, roster: &mut Roster) {
        let seats: Vec<usize> = roster.active().map(|p| p.seat()).collect();
        for seat in seats {
            assert_eq!(
                controller.seat_interaction(roster, seat),
                Ok(SeatAction::Belted)
            );
        }
    }

    #[test]
    fn starts_ready_and_empty() {
        let controller = RideController::new();
        assert_eq!(controller.state(), RideState::Ready);
        assert_eq!(controller.passenger_count(), 0);
    }

    #[test]
    fn ninth_passenger_is_turned_away() {
        let (mut controller, mut roster) = boarded(8);
        assert_eq!(
            controller.add_passenger(&mut roster),
            Err(Rejection::CartFull)
        );
        assert_eq!(controller.passenger_count(), 8);
        assert_eq!(roster.active_count(), 8);
    }

    #[test]
    fn passengers_fill_seats_in_order() {
        let (_, roster) = boarded(3);
        let seats: Vec<usize> = roster.active().map(|p| p.seat()).collect();
        assert_eq!(seats, vec![0, 1, 2]);
    }

    #[test]
    fn unbelted_passenger_blocks_start() {
        let (mut controller, mut roster) = boarded(2);
        controller.seat_interaction(&mut roster, 0).unwrap();

        assert_eq!(
            controller.start_ride(&roster),
            Err(Rejection::Unbelted { seat: 1 })
        );
        assert_eq!(controller.state(), RideState::Ready);
    }

    #[test]
    fn belted_passengers_can_start() {
        let (mut controller, mut roster) = boarded(2);
        belt_all(&mut controller, &mut roster);
        assert_eq!(controller.start_ride(&roster), Ok(()));
        assert_eq!(controller.state(), RideState::Active);
    }

    #[test]
    fn empty_cart_can_start() {
        let (mut controller, roster) = boarded(0);
        assert!(controller.start_ride(&roster).is_ok());
        assert_eq!(controller.state(), RideState::Active);
    }

    #[test]
    fn no_boarding_or_restart_while_running() {
        let (mut controller, mut roster) = boarded(1);
        belt_all(&mut controller, &mut roster);
        controller.start_ride(&roster).unwrap();

        assert_eq!(
            controller.add_passenger(&mut roster),
            Err(Rejection::NotReady {
                state: RideState::Active
            })
        );
        assert!(controller.start_ride(&roster).is_err());
        assert_eq!(controller.passenger_count(), 1);
    }

    #[test]
    fn interaction_while_running_makes_passenger_sick() {
        let (mut controller, mut roster) = boarded(2);
        belt_all(&mut controller, &mut roster);
        controller.start_ride(&roster).unwrap();

        assert_eq!(
            controller.seat_interaction(&mut roster, 1),
            Ok(SeatAction::BecameSick)
        );
        assert_eq!(controller.state(), RideState::SomeoneSick);
        assert!(roster.get(1).unwrap().is_sick());

        // Idempotent once someone is already sick.
        controller.seat_interaction(&mut roster, 0).unwrap();
        assert_eq!(controller.state(), RideState::SomeoneSick);
    }

    #[test]
    fn empty_or_invalid_seats_are_ignored() {
        let (mut controller, mut roster) = boarded(1);
        assert_eq!(
            controller.seat_interaction(&mut roster, 5),
            Err(Rejection::SeatEmpty { seat: 5 })
        );
        assert_eq!(
            controller.seat_interaction(&mut roster, 42),
            Err(Rejection::InvalidSeat { seat: 42 })
        );
        assert!(!roster.get(5).unwrap().is_belt_on());
    }

    #[test]
    fn ride_end_releases_every_belt() {
        let (mut controller, mut roster) = boarded(3);
        belt_all(&mut controller, &mut roster);
        controller.start_ride(&roster).unwrap();

        controller.ride_ended(&mut roster);
        assert!(roster.iter().all(|p| !p.is_belt_on()));
        assert_eq!(controller.state(), RideState::Departure);
    }

    #[test]
    fn empty_ride_end_returns_to_ready() {
        let (mut controller, mut roster) = boarded(0);
        controller.start_ride(&roster).unwrap();
        controller.ride_ended(&mut roster);
        assert_eq!(controller.state(), RideState::Ready);
    }

    #[test]
    fn last_passenger_out_resets_to_ready() {
        let (mut controller, mut roster) = boarded(2);
        belt_all(&mut controller, &mut roster);
        controller.start_ride(&roster).unwrap();
        controller.seat_interaction(&mut roster, 0).unwrap();
        controller.ride_ended(&mut roster);

        assert_eq!(
            controller.seat_interaction(&mut roster, 0),
            Ok(SeatAction::Left)
        );
        assert_eq!(controller.passenger_count(), 1);
        assert_eq!(controller.state(), RideState::Departure);
        assert!(!roster.get(0).unwrap().is_sick());

        assert_eq!(
            controller.seat_interaction(&mut roster, 1),
            Ok(SeatAction::Left)
        );
        assert_eq!(controller.passenger_count(), 0);
        assert_eq!(controller.state(), RideState::Ready);
        // Leaving does not also fasten a belt in the new Ready state.
        assert!(!roster.get(1).unwrap().is_belt_on());
    }

    #[test]
    fn belt_interaction_is_one_directional() {
        let (mut controller, mut roster) = boarded(1);
        for _ in 0..2 {
            assert_eq!(
                controller.seat_interaction(&mut roster, 0),
                Ok(SeatAction::Belted)
            );
            assert!(roster.get(0).unwrap().is_belt_on());
        }
        assert_eq!(controller.start_ride(&roster), Ok(()));
        assert_eq!(controller.state(), RideState::Active);
    }

    #[test]
    fn administrative_sickness() {
        let (mut controller, mut roster) = boarded(1);
        controller.someone_became_sick(&mut roster, 0);
        assert_eq!(controller.state(), RideState::SomeoneSick);
        assert!(roster.get(0).unwrap().is_sick());

        controller.someone_became_sick(&mut roster, 6);
        assert!(!roster.get(6).unwrap().is_sick());
    }

    #[test]
    fn counter_tracks_active_seats() {
        let (mut controller, mut roster) = boarded(5);
        belt_all(&mut controller, &mut roster);
        controller.start_ride(&roster).unwrap();
        controller.ride_ended(&mut roster);
        controller.seat_interaction(&mut roster, 2).unwrap();
        controller.seat_interaction(&mut roster, 4).unwrap();
        assert_eq!(controller.passenger_count(), roster.active_count());
    }
}
