//! Passengers, the seat roster, and where each seat sits inside the cart.
//!
//! The cart has [`SEAT_COUNT`] fixed seats. A [`Roster`] keeps one
//! [`Passenger`] per seat for the whole lifetime of the ride; boarding and
//! leaving only flip the `active` flag. The flags are written by the ride
//! controller alone. World transforms for passengers live in the cart.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::transform::Transform;

/// Number of seats in the cart.
pub const SEAT_COUNT: usize = 8;

/// Visual scale per seat index.
///
/// Calibrated by hand against the passenger models each seat is assigned;
/// the values are not derived from the seat geometry.
pub const SEAT_SCALES: [f32; SEAT_COUNT] = [0.34, 0.38, 0.31, 0.36, 0.40, 0.33, 0.37, 0.35];

/// State of the rider assigned to one seat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Passenger {
    seat: usize,
    active: bool,
    belt_on: bool,
    sick: bool,
}

impl Passenger {
    fn empty(seat: usize) -> Self {
        Self {
            seat,
            ..Default::default()
        }
    }

    pub fn seat(&self) -> usize {
        self.seat
    }

    /// Whether someone is sitting in this seat.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_belt_on(&self) -> bool {
        self.belt_on
    }

    pub fn is_sick(&self) -> bool {
        self.sick
    }

    pub(crate) fn sit_down(&mut self) {
        self.active = true;
    }

    pub(crate) fn leave(&mut self) {
        self.active = false;
        self.sick = false;
    }

    pub(crate) fn put_belt_on(&mut self) {
        self.belt_on = true;
    }

    pub(crate) fn put_belt_off(&mut self) {
        self.belt_on = false;
    }

    pub(crate) fn become_sick(&mut self) {
        self.sick = true;
    }
}

/// The eight seats of the cart, addressed by seat index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Roster {
    seats: [Passenger; SEAT_COUNT],
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            seats: std::array::from_fn(Passenger::empty),
        }
    }
}

impl Roster {
    /// All seats empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, seat: usize) -> Option<&Passenger> {
        self.seats.get(seat)
    }

    pub(crate) fn get_mut(&mut self, seat: usize) -> Option<&mut Passenger> {
        self.seats.get_mut(seat)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Passenger> {
        self.seats.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Passenger> {
        self.seats.iter_mut()
    }

    pub fn active(&self) -> impl Iterator<Item = &Passenger> {
        self.seats.iter().filter(|p| p.active)
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }
}

/// Grid placement of the seats inside the cart.
///
/// Seats fill rows front to back, `columns` seats per row. Every other row
/// runs in the opposite column order, so consecutive seat indices stay
/// neighbours instead of zig-zagging across the cart.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeatLayout {
    /// Seats per row.
    pub columns: usize,
    /// Lateral distance between seat centers.
    pub column_spacing: f32,
    /// Distance between rows along the direction of travel.
    pub row_spacing: f32,
    /// Height of the seat cushion above the cart origin.
    pub seat_height: f32,
}

impl Default for SeatLayout {
    fn default() -> Self {
        Self {
            columns: 2,
            column_spacing: 0.5,
            row_spacing: 0.6,
            seat_height: 0.1,
        }
    }
}

impl SeatLayout {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.columns > SEAT_COUNT {
            return Err(ConfigError::Invalid(format!(
                "seat columns must be between 1 and {SEAT_COUNT}, got {}",
                self.columns
            )));
        }
        if !(self.column_spacing.is_finite()
            && self.row_spacing.is_finite()
            && self.seat_height.is_finite())
        {
            return Err(ConfigError::Invalid(
                "seat spacing must be finite".to_string(),
            ));
        }
        Ok(())
    }

    fn rows(&self) -> usize {
        SEAT_COUNT.div_ceil(self.columns)
    }

    /// `(row, column)` of a seat, with alternate rows flipped.
    pub fn grid_position(&self, seat: usize) -> (usize, usize) {
        let row = seat / self.columns;
        let column = seat % self.columns;
        if row % 2 == 1 {
            (row, self.columns - 1 - column)
        } else {
            (row, column)
        }
    }

    /// Seat center in cart-local space (X lateral, Y up, Z forward).
    ///
    /// The grid is centered on the cart origin; row 0 is at the front.
    pub fn offset(&self, seat: usize) -> Vec3 {
        let (row, column) = self.grid_position(seat);
        let half_width = (self.columns as f32 - 1.0) * 0.5;
        let half_depth = (self.rows() as f32 - 1.0) * 0.5;

        Vec3::new(
            (column as f32 - half_width) * self.column_spacing,
            self.seat_height,
            (half_depth - row as f32) * self.row_spacing,
        )
    }

    /// Seat placement relative to the cart: translation plus calibrated scale.
    pub fn local_transform(&self, seat: usize) -> Transform {
        let scale = SEAT_SCALES.get(seat).copied().unwrap_or(1.0);
        Transform::from_position(self.offset(seat)).uniform_scale(scale)
    }
}
