//! Turns a local-frame path segment into a flyable mission.
//!
//! The assembler is the only place where pattern geometry meets the planet:
//! it binds every local waypoint to a geodetic position through a
//! [`ReferenceFrame`], injects optional takeoff and landing waypoints at the
//! frame origin, applies a default cruise speed, and totals the path length.

use crate::error::PlanningError;
use crate::frame::ReferenceFrame;
use crate::geodetic::Geodetic;
use crate::local::Enu;
use crate::patterns::{PathSegment, PatternKind};
use uom::si::angle::degree;
use uom::si::f64::{Angle, Length, Velocity};
use uom::si::length::meter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What a waypoint is for. Generators tag their own output; the assembler
/// adds `Takeoff` and `ReturnToLaunch`, and hand-built waypoints default to
/// `Custom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WaypointKind {
    Takeoff,
    /// A coverage-grid scan line endpoint.
    Scan,
    Orbit,
    Spiral,
    Facade,
    ReturnToLaunch,
    Custom,
}

/// Where the camera points at a waypoint.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CameraDirective {
    /// Explicit gimbal attitude: compass heading, pitch (negative is down),
    /// roll.
    Attitude {
        heading: Angle,
        pitch: Angle,
        roll: Angle,
    },
    /// Track a point in the local frame, whatever the drone's own attitude.
    LookAt(Enu),
}

impl CameraDirective {
    /// An attitude directive with the gimbal level: only the heading set.
    #[must_use]
    pub fn level_heading(heading: Angle) -> Self {
        CameraDirective::Attitude {
            heading,
            pitch: Angle::new::<degree>(0.),
            roll: Angle::new::<degree>(0.),
        }
    }
}

/// A single stop on a flight path, in the takeoff-centric local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Waypoint {
    pub position: Enu,
    pub kind: WaypointKind,
    /// Speed to fly towards this waypoint; `None` means the mission default.
    pub speed: Option<Velocity>,
    pub camera: Option<CameraDirective>,
}

impl Waypoint {
    /// A custom waypoint with no speed or camera overrides.
    #[must_use]
    pub fn new(position: Enu) -> Self {
        Self {
            position,
            kind: WaypointKind::Custom,
            speed: None,
            camera: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: WaypointKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_speed(mut self, speed: Velocity) -> Self {
        self.speed = Some(speed);
        self
    }

    #[must_use]
    pub fn with_camera(mut self, camera: CameraDirective) -> Self {
        self.camera = Some(camera);
        self
    }
}

/// Knobs for [`assemble`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssemblyOptions {
    /// Local position of the launch point. Defaults to the frame origin.
    pub launch: Enu,
    /// Default speed for waypoints that do not specify their own.
    pub cruise_speed: Option<Velocity>,
    /// Prepend a takeoff waypoint above the launch point.
    pub include_takeoff: bool,
    /// Altitude of the takeoff waypoint; defaults to the altitude of the
    /// segment's first waypoint.
    pub takeoff_altitude: Option<Length>,
    /// Reduced speed for the takeoff climb and the return-to-launch leg;
    /// defaults to the cruise speed.
    pub transit_speed: Option<Velocity>,
    /// Append a return-to-launch waypoint after the pattern.
    pub include_landing: bool,
}

impl AssemblyOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_launch(mut self, launch: Enu) -> Self {
        self.launch = launch;
        self
    }

    #[must_use]
    pub fn with_cruise_speed(mut self, speed: Velocity) -> Self {
        self.cruise_speed = Some(speed);
        self
    }

    #[must_use]
    pub fn with_takeoff(mut self) -> Self {
        self.include_takeoff = true;
        self
    }

    #[must_use]
    pub fn with_takeoff_altitude(mut self, altitude: Length) -> Self {
        self.takeoff_altitude = Some(altitude);
        self
    }

    #[must_use]
    pub fn with_transit_speed(mut self, speed: Velocity) -> Self {
        self.transit_speed = Some(speed);
        self
    }

    #[must_use]
    pub fn with_landing(mut self) -> Self {
        self.include_landing = true;
        self
    }
}

/// A waypoint bound to the planet: the local-frame original plus the
/// geodetic position a flight controller actually needs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MissionWaypoint {
    pub waypoint: Waypoint,
    pub global: Geodetic,
}

/// A fully assembled, flyable mission.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mission {
    pub kind: PatternKind,
    /// The takeoff point the local frame is anchored to.
    pub origin: Geodetic,
    pub waypoints: Vec<MissionWaypoint>,
    /// Straight-line path length over all waypoints, takeoff and landing
    /// included.
    pub total_distance: Length,
}

impl Mission {
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// Binds a path segment to the planet through a reference frame.
///
/// # Errors
///
/// [`PlanningError::NoReferenceFrame`] if the frame has no origin,
/// [`PlanningError::EmptyPattern`] if the segment has no waypoints.
pub fn assemble(
    segment: &PathSegment,
    options: &AssemblyOptions,
    frame: &ReferenceFrame,
) -> Result<Mission, PlanningError> {
    let origin = frame
        .origin()
        .copied()
        .ok_or(PlanningError::NoReferenceFrame)?;
    if segment.is_empty() {
        return Err(PlanningError::EmptyPattern);
    }

    let mut local = Vec::with_capacity(segment.len() + 2);
    if options.include_takeoff {
        // climb straight up over the launch point before heading out
        let climb_to = options
            .takeoff_altitude
            .unwrap_or_else(|| segment.waypoints[0].position.up());
        let mut takeoff =
            Waypoint::new(options.launch.with_up(climb_to)).with_kind(WaypointKind::Takeoff);
        if let Some(speed) = options.transit_speed {
            takeoff = takeoff.with_speed(speed);
        }
        local.push(takeoff);
    }
    local.extend(segment.waypoints.iter().copied());
    if options.include_landing {
        let mut landing = Waypoint::new(options.launch).with_kind(WaypointKind::ReturnToLaunch);
        if let Some(speed) = options.transit_speed {
            landing = landing.with_speed(speed);
        }
        local.push(landing);
    }

    let mut total_distance = Length::new::<meter>(0.);
    for pair in local.windows(2) {
        total_distance += pair[0].position.distance_from(&pair[1].position);
    }

    let mut waypoints = Vec::with_capacity(local.len());
    for mut waypoint in local {
        if waypoint.speed.is_none() {
            waypoint.speed = options.cruise_speed;
        }
        let global = frame.local_to_global(&waypoint.position)?;
        waypoints.push(MissionWaypoint { waypoint, global });
    }

    Ok(Mission {
        kind: segment.kind,
        origin,
        waypoints,
        total_distance,
    })
}
