//! The parametric roller-coaster track.
//!
//! A [`TrackCurve`] maps a normalized progress parameter `t ∈ [0, 1]` onto a
//! closed loop made of four analytic segments:
//!
//! | range          | segment                         |
//! |----------------|---------------------------------|
//! | `[0.00, 0.40)` | [`TrackSegment::ForwardRun`]    |
//! | `[0.40, 0.50)` | [`TrackSegment::OutboundTurn`]  |
//! | `[0.50, 0.90)` | [`TrackSegment::ReturnRun`]     |
//! | `[0.90, 1.00]` | [`TrackSegment::HomeTurn`]      |
//!
//! The forward run starts with a flat launch and then rides `hill_count` sine
//! hills; the return run is flat and offset laterally by `return_offset_z`.
//! Two semicircular U-turns of radius `return_offset_z / 2` close the loop.
//!
//! # Example
//!
//! ```
//! use rollercoaster::{TrackCurve, TrackParams};
//!
//! let track = TrackCurve::new(TrackParams::default());
//!
//! // The loop closes on itself.
//! let gap = track.point(0.0) - track.point(1.0);
//! assert!(gap.length() < 1e-3);
//!
//! // Tangents are unit vectors.
//! assert!((track.tangent(0.25).length() - 1.0).abs() < 1e-4);
//! ```

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::frame::Frame;

/// Step used for the finite-difference tangent.
pub const TANGENT_EPSILON: f32 = 0.001;

/// Share of the forward run that stays flat before the hills start.
const LAUNCH_SHARE: f32 = 0.2;

/// Construction parameters for a [`TrackCurve`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackParams {
    /// Length of the outbound (forward) run along +X.
    pub length: f32,
    /// Lateral distance between the forward and return runs. Also the U-turn diameter.
    pub return_offset_z: f32,
    /// Height of the flat parts of the track.
    pub base_height: f32,
    /// Hill amplitude; crests reach `base_height + 2 * amplitude`.
    pub amplitude: f32,
    /// Number of full sine hills on the forward run.
    pub hill_count: u32,
    /// World-space translation applied to every point.
    pub origin: Vec3,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            length: 20.0,
            return_offset_z: 6.0,
            base_height: 1.0,
            amplitude: 1.5,
            hill_count: 3,
            origin: Vec3::new(-10.0, 0.0, -3.0),
        }
    }
}

impl TrackParams {
    /// Creates the default three-hill track parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the length of the forward run.
    ///
    /// ```
    /// use rollercoaster::{TrackCurve, TrackParams};
    ///
    /// let track = TrackCurve::new(TrackParams::new().length(40.0));
    /// let span = track.point(0.4).x - track.point(0.0).x;
    /// assert!((span - 40.0).abs() < 1e-3);
    /// ```
    pub fn length(mut self, length: f32) -> Self {
        self.length = length;
        self
    }

    /// Set the lateral offset of the return run. The U-turns get half of it as radius.
    pub fn return_offset_z(mut self, offset: f32) -> Self {
        self.return_offset_z = offset;
        self
    }

    /// Set the height of the flat launch and return run.
    pub fn base_height(mut self, height: f32) -> Self {
        self.base_height = height;
        self
    }

    /// Set the hill amplitude.
    pub fn amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Set the number of sine hills. Zero gives a flat forward run.
    pub fn hill_count(mut self, hills: u32) -> Self {
        self.hill_count = hills;
        self
    }

    /// Set the world-space translation of the whole track.
    ///
    /// Accepts anything convertible to a `Vec3`, such as `[f32; 3]`.
    pub fn origin(mut self, origin: impl Into<Vec3>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Checks that the parameters describe a drawable loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            self.length,
            self.return_offset_z,
            self.base_height,
            self.amplitude,
        ]
        .iter()
        .all(|v| v.is_finite())
            && self.origin.is_finite();

        if !finite {
            return Err(ConfigError::Invalid(
                "track parameters must be finite".to_string(),
            ));
        }
        if self.length <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "track length must be positive, got {}",
                self.length
            )));
        }
        if self.return_offset_z < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "return offset must not be negative, got {}",
                self.return_offset_z
            )));
        }
        if self.hill_count == 0 {
            return Err(ConfigError::Invalid(
                "track needs at least one hill".to_string(),
            ));
        }
        Ok(())
    }
}

/// The four pieces of the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackSegment {
    /// Outbound run along +X: flat launch, then the hills.
    ForwardRun,
    /// Semicircle from the end of the forward run to the return run.
    OutboundTurn,
    /// Flat straight back toward the start, offset by `return_offset_z`.
    ReturnRun,
    /// Semicircle back onto the start of the forward run.
    HomeTurn,
}

impl TrackSegment {
    /// The `[start, end)` range of `t` covered by this segment.
    pub fn range(&self) -> (f32, f32) {
        match self {
            TrackSegment::ForwardRun => (0.0, 0.4),
            TrackSegment::OutboundTurn => (0.4, 0.5),
            TrackSegment::ReturnRun => (0.5, 0.9),
            TrackSegment::HomeTurn => (0.9, 1.0),
        }
    }
}

/// One evenly spaced sample of the track, as consumed by rail/sleeper builders.
#[derive(Clone, Copy, Debug)]
pub struct TrackSample {
    pub t: f32,
    pub point: Vec3,
    pub frame: Frame,
}

/// Immutable closed-loop track curve.
#[derive(Clone, Debug)]
pub struct TrackCurve {
    params: TrackParams,
    turn_radius: f32,
}

impl TrackCurve {
    pub fn new(params: TrackParams) -> Self {
        Self {
            turn_radius: params.return_offset_z * 0.5,
            params,
        }
    }

    pub fn params(&self) -> &TrackParams {
        &self.params
    }

    pub fn turn_radius(&self) -> f32 {
        self.turn_radius
    }

    /// Which segment `t` lies on, and the local parameter within it.
    pub fn segment_at(&self, t: f32) -> (TrackSegment, f32) {
        let t = t.clamp(0.0, 1.0);
        if t < 0.40 {
            (TrackSegment::ForwardRun, t / 0.40)
        } else if t < 0.50 {
            (TrackSegment::OutboundTurn, (t - 0.40) / 0.10)
        } else if t < 0.90 {
            (TrackSegment::ReturnRun, (t - 0.50) / 0.40)
        } else {
            (TrackSegment::HomeTurn, (t - 0.90) / 0.10)
        }
    }

    /// World-space point at progress `t`. Out-of-range `t` is clamped.
    pub fn point(&self, t: f32) -> Vec3 {
        let (segment, s) = self.segment_at(t);
        let local = match segment {
            TrackSegment::ForwardRun => self.forward_run(s),
            TrackSegment::OutboundTurn => self.outbound_turn(s),
            TrackSegment::ReturnRun => self.return_run(s),
            TrackSegment::HomeTurn => self.home_turn(s),
        };
        local + self.params.origin
    }

    /// Unit direction of travel at `t`, by forward difference.
    ///
    /// At the very end of the loop the forward sample collapses onto `t`
    /// itself, so the backward difference is used there instead.
    pub fn tangent(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let here = self.point(t);
        let ahead = self.point((t + TANGENT_EPSILON).min(1.0));

        match (ahead - here).try_normalize() {
            Some(tangent) => tangent,
            None => {
                let behind = self.point((t - TANGENT_EPSILON).max(0.0));
                (here - behind).normalize_or_zero()
            }
        }
    }

    /// Orthonormal frame at `t` with world +Y as the reference up.
    ///
    /// Falls back to [`Frame::IDENTITY`] if the tangent is vertical.
    pub fn frame(&self, t: f32) -> Frame {
        Frame::from_tangent_or(self.tangent(t), Vec3::Y, Frame::IDENTITY)
    }

    /// `count + 1` evenly spaced samples covering the whole loop.
    pub fn samples(&self, count: usize) -> Vec<TrackSample> {
        if count == 0 {
            return vec![self.sample(0.0)];
        }
        (0..=count)
            .map(|i| self.sample(i as f32 / count as f32))
            .collect()
    }

    fn sample(&self, t: f32) -> TrackSample {
        TrackSample {
            t,
            point: self.point(t),
            frame: self.frame(t),
        }
    }

    fn forward_run(&self, s: f32) -> Vec3 {
        let p = &self.params;
        let x = s * p.length;
        let y = if s < LAUNCH_SHARE {
            p.base_height
        } else {
            let hill_s = (s - LAUNCH_SHARE) / (1.0 - LAUNCH_SHARE);
            let phase = 2.0 * p.hill_count as f32 * PI * hill_s - FRAC_PI_2;
            p.base_height + p.amplitude * (1.0 + phase.sin())
        };
        Vec3::new(x, y, 0.0)
    }

    fn outbound_turn(&self, s: f32) -> Vec3 {
        let angle = s * PI;
        Vec3::new(
            self.params.length + self.turn_radius * angle.sin(),
            self.params.base_height,
            self.turn_radius * (1.0 - angle.cos()),
        )
    }

    fn return_run(&self, s: f32) -> Vec3 {
        Vec3::new(
            self.params.length * (1.0 - s),
            self.params.base_height,
            self.params.return_offset_z,
        )
    }

    fn home_turn(&self, s: f32) -> Vec3 {
        let angle = s * PI;
        Vec3::new(
            -self.turn_radius * angle.sin(),
            self.params.base_height,
            self.params.return_offset_z - self.turn_radius * (1.0 - angle.cos()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-3;

    fn track() -> TrackCurve {
        TrackCurve::new(TrackParams::default())
    }

    #[test]
    fn continuous_at_segment_boundaries() {
        let track = track();
        for boundary in [0.40_f32, 0.50, 0.90] {
            let before = track.point(boundary - 1e-6);
            let at = track.point(boundary);
            assert!(
                (before - at).length() < TOLERANCE,
                "discontinuity at t={boundary}: {before:?} vs {at:?}"
            );
        }
    }

    #[test]
    fn loop_is_closed() {
        let track = track();
        assert!((track.point(0.0) - track.point(1.0)).length() < TOLERANCE);
    }

    #[test]
    fn origin_offsets_every_point() {
        let params = TrackParams::default().origin(Vec3::ZERO);
        let moved = params.origin(Vec3::new(3.0, -1.0, 2.0));
        let a = TrackCurve::new(params);
        let b = TrackCurve::new(moved);

        for t in [0.0, 0.1, 0.33, 0.45, 0.7, 0.95, 1.0] {
            let delta = b.point(t) - a.point(t);
            assert!((delta - Vec3::new(3.0, -1.0, 2.0)).length() < 1e-4);
        }
    }

    #[test]
    fn segment_endpoints_match_layout() {
        let params = TrackParams::default().origin(Vec3::ZERO);
        let track = TrackCurve::new(params);
        let base = params.base_height;

        assert!((track.point(0.0) - Vec3::new(0.0, base, 0.0)).length() < 1e-4);
        assert!((track.point(0.40) - Vec3::new(params.length, base, 0.0)).length() < 1e-4);
        assert!(
            (track.point(0.50) - Vec3::new(params.length, base, params.return_offset_z))
                .length()
                < 1e-4
        );
        assert!(
            (track.point(0.90) - Vec3::new(0.0, base, params.return_offset_z)).length() < 1e-4
        );
    }

    #[test]
    fn launch_is_flat_and_hills_stay_above_base() {
        let params = TrackParams::default();
        let track = TrackCurve::new(params);
        let base = params.base_height + params.origin.y;

        // Flat launch covers the first fifth of the forward run.
        for i in 0..10 {
            let t = 0.4 * 0.2 * i as f32 / 10.0;
            assert_eq!(track.point(t).y, base);
        }

        let crest = base + 2.0 * params.amplitude;
        for i in 0..200 {
            let t = 0.08 + 0.32 * i as f32 / 200.0;
            let y = track.point(t).y;
            assert!(y >= base - 1e-4 && y <= crest + 1e-4);
        }
    }

    #[test]
    fn segment_lookup() {
        let track = track();
        assert_eq!(track.segment_at(0.0).0, TrackSegment::ForwardRun);
        assert_eq!(track.segment_at(0.45).0, TrackSegment::OutboundTurn);
        assert_eq!(track.segment_at(0.5).0, TrackSegment::ReturnRun);
        let (segment, s) = track.segment_at(1.0);
        assert_eq!(segment, TrackSegment::HomeTurn);
        assert!((s - 1.0).abs() < 1e-4);
        assert_eq!(track.segment_at(-2.0).0, TrackSegment::ForwardRun);
        assert_eq!(TrackSegment::ReturnRun.range(), (0.5, 0.9));
    }

    #[test]
    fn tangent_is_unit_everywhere_including_the_end() {
        let track = track();
        for i in 0..=1000 {
            let t = i as f32 / 1000.0;
            let tangent = track.tangent(t);
            assert!(tangent.is_finite(), "non-finite tangent at t={t}");
            assert!((tangent.length() - 1.0).abs() < 1e-3, "t={t}");
        }
    }

    #[test]
    fn tangent_follows_direction_of_travel() {
        let track = track();
        // Flat launch heads along +X, the return run along -X.
        assert!(track.tangent(0.01).dot(Vec3::X) > 0.99);
        assert!(track.tangent(0.7).dot(Vec3::NEG_X) > 0.99);
    }

    #[test]
    fn samples_cover_the_loop() {
        let track = track();
        let samples = track.samples(100);
        assert_eq!(samples.len(), 101);
        assert_eq!(samples[0].t, 0.0);
        assert_eq!(samples[100].t, 1.0);
        for sample in &samples {
            assert!((sample.frame.tangent.length() - 1.0).abs() < 1e-3);
        }
        assert_eq!(track.samples(0).len(), 1);
    }

    #[test]
    fn validation_rejects_bad_params() {
        assert!(TrackParams::default().validate().is_ok());
        assert!(TrackParams::default().hill_count(0).validate().is_err());
        assert!(TrackParams::default().length(0.0).validate().is_err());
        assert!(TrackParams::default().return_offset_z(-1.0).validate().is_err());
        assert!(TrackParams::default().amplitude(f32::NAN).validate().is_err());
    }
}
