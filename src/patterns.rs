//! Parametric flight-path generators.
//!
//! Each generator takes a tagged config struct and produces a
//! [`PathSegment`]: an ordered list of waypoints in the takeoff-centric
//! local frame, ready for [`crate::mission::assemble`]. Generators never
//! touch geodetic coordinates; binding a segment to the planet is the
//! assembler's job.
//!
//! Failure modes are split deliberately: parameters that can never describe
//! a flyable shape (negative radius, two-point polygon) are
//! [`PlanningError::InvalidGeometry`], while well-formed parameters that
//! happen to produce zero waypoints (a survey polygon the line sweep never
//! crosses) are [`PlanningError::EmptyPattern`]. Callers can retry the
//! latter with different parameters; the former is a caller bug.

use crate::error::PlanningError;
use crate::local::{Components, Enu};
use crate::mission::{CameraDirective, Waypoint, WaypointKind};
use crate::optics::{image_spacing, OpticsInput};
use crate::util::BoundedAngle;
use uom::si::f64::{Angle, Length, Ratio};
use uom::si::{angle::radian, length::meter, ratio::ratio};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which generator produced a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PatternKind {
    Grid,
    Orbit,
    Spiral,
    Facade,
}

/// An ordered run of waypoints from a single generator invocation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathSegment {
    pub kind: PatternKind,
    pub waypoints: Vec<Waypoint>,
}

impl PathSegment {
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// The waypoint positions, in flight order.
    pub fn positions(&self) -> impl Iterator<Item = &Enu> {
        self.waypoints.iter().map(|waypoint| &waypoint.position)
    }
}

/// The ground region a grid survey must cover.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SurveyArea {
    /// Axis-aligned rectangle with one corner at the local origin, extending
    /// `width` east and `height` north.
    Rectangle { width: Length, height: Length },
    /// Arbitrary polygon; only its convex hull is surveyed.
    Polygon(Vec<Enu>),
}

/// How far apart a grid's flight lines are.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GridSpacing {
    /// An explicit line distance.
    Fixed(Length),
    /// Derived at generation time from the image footprint at the flight
    /// altitude and the requested sidelap between adjacent lines.
    FromOptics { optics: OpticsInput, sidelap: Ratio },
}

/// Parameters for a boustrophedon coverage grid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridConfig {
    pub area: SurveyArea,
    pub altitude: Length,
    pub spacing: GridSpacing,
}

impl GridConfig {
    /// A grid with an explicit line spacing.
    #[must_use]
    pub fn new(area: SurveyArea, altitude: Length, spacing: Length) -> Self {
        Self {
            area,
            altitude,
            spacing: GridSpacing::Fixed(spacing),
        }
    }

    /// A grid whose line spacing follows from the camera: the image
    /// footprint width at `altitude`, reduced by the sidelap.
    #[must_use]
    pub fn from_optics(
        area: SurveyArea,
        altitude: Length,
        optics: OpticsInput,
        sidelap: Ratio,
    ) -> Self {
        Self {
            area,
            altitude,
            spacing: GridSpacing::FromOptics { optics, sidelap },
        }
    }

    #[must_use]
    pub fn with_altitude(mut self, altitude: Length) -> Self {
        self.altitude = altitude;
        self
    }

    #[must_use]
    pub fn with_spacing(mut self, spacing: Length) -> Self {
        self.spacing = GridSpacing::Fixed(spacing);
        self
    }
}

/// How the camera points while orbiting.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrbitCamera {
    /// Track the orbit center at every waypoint.
    FacingCenter,
    /// Point along the direction of travel.
    Forward,
    /// Hold a fixed compass heading.
    Fixed(Angle),
}

/// Parameters for an orbit (or arc) around a point of interest.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrbitConfig {
    pub center: Enu,
    pub radius: Length,
    pub altitude: Length,
    /// Number of arc segments the sweep is divided into; each orbit has
    /// `segments + 1` waypoints, so a full-turn sweep closes on its start
    /// point.
    pub segments: u32,
    pub camera: OrbitCamera,
    /// Angle of the first waypoint, measured counterclockwise from local
    /// east.
    pub start_angle: Angle,
    /// Angle of the last waypoint. The sweep is `end_angle - start_angle`;
    /// a negative sweep is flown clockwise. Defaults to one full
    /// counterclockwise turn.
    pub end_angle: Angle,
    /// How many times the arc is flown.
    pub orbits: u32,
    /// Altitude gained between consecutive orbits.
    pub vertical_shift: Length,
}

impl OrbitConfig {
    #[must_use]
    pub fn new(center: Enu, radius: Length, altitude: Length) -> Self {
        Self {
            center,
            radius,
            altitude,
            segments: 16,
            camera: OrbitCamera::FacingCenter,
            start_angle: Angle::new::<radian>(0.),
            end_angle: Angle::FULL_TURN,
            orbits: 1,
            vertical_shift: Length::new::<meter>(0.),
        }
    }

    #[must_use]
    pub fn with_segments(mut self, segments: u32) -> Self {
        self.segments = segments;
        self
    }

    #[must_use]
    pub fn with_camera(mut self, camera: OrbitCamera) -> Self {
        self.camera = camera;
        self
    }

    /// Rotates the arc to begin at `start_angle`, preserving its sweep.
    #[must_use]
    pub fn with_start_angle(mut self, start_angle: Angle) -> Self {
        let sweep = self.end_angle - self.start_angle;
        self.start_angle = start_angle;
        self.end_angle = start_angle + sweep;
        self
    }

    /// Restricts the orbit to the arc from `start_angle` to `end_angle`.
    #[must_use]
    pub fn with_arc(mut self, start_angle: Angle, end_angle: Angle) -> Self {
        self.start_angle = start_angle;
        self.end_angle = end_angle;
        self
    }

    #[must_use]
    pub fn with_orbits(mut self, orbits: u32) -> Self {
        self.orbits = orbits;
        self
    }

    #[must_use]
    pub fn with_vertical_shift(mut self, vertical_shift: Length) -> Self {
        self.vertical_shift = vertical_shift;
        self
    }
}

/// Parameters for an expanding (or contracting) climb spiral.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpiralConfig {
    pub center: Enu,
    pub start_radius: Length,
    pub end_radius: Length,
    pub start_altitude: Length,
    pub end_altitude: Length,
    pub revolutions: f64,
    pub points_per_revolution: u32,
}

impl SpiralConfig {
    #[must_use]
    pub fn new(center: Enu, start_radius: Length, end_radius: Length, revolutions: f64) -> Self {
        Self {
            center,
            start_radius,
            end_radius,
            start_altitude: Length::new::<meter>(0.),
            end_altitude: Length::new::<meter>(0.),
            revolutions,
            points_per_revolution: 36,
        }
    }

    #[must_use]
    pub fn with_altitudes(mut self, start: Length, end: Length) -> Self {
        self.start_altitude = start;
        self.end_altitude = end;
        self
    }

    #[must_use]
    pub fn with_points_per_revolution(mut self, points: u32) -> Self {
        self.points_per_revolution = points;
        self
    }
}

/// Parameters for a vertical facade scan of a building.
///
/// The building footprint is the ordered corner list; each consecutive pair
/// of corners is a wall, and with three or more corners the footprint
/// closes from the last corner back to the first. The drone flies parallel
/// to each wall at `standoff` distance on its outward side, in horizontal
/// passes that climb by an optics-derived step, with the camera pointed
/// back at the wall. Two corners describe a single free-standing wall,
/// scanned from the right-hand side of the corner order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FacadeConfig {
    /// Footprint corners, in wall order. Either winding works; the offset
    /// side is chosen so it always faces away from the footprint interior.
    pub corners: Vec<Enu>,
    pub standoff: Length,
    /// Vertical extent of the walls above `base_altitude`.
    pub height: Length,
    /// Altitude of the lowest pass.
    pub base_altitude: Length,
    /// Vertical overlap between consecutive passes.
    pub overlap: Ratio,
}

impl FacadeConfig {
    #[must_use]
    pub fn new(corners: Vec<Enu>, standoff: Length, height: Length) -> Self {
        Self {
            corners,
            standoff,
            height,
            base_altitude: Length::new::<meter>(0.),
            overlap: Ratio::new::<ratio>(0.),
        }
    }

    #[must_use]
    pub fn with_base_altitude(mut self, base_altitude: Length) -> Self {
        self.base_altitude = base_altitude;
        self
    }

    #[must_use]
    pub fn with_overlap(mut self, overlap: Ratio) -> Self {
        self.overlap = overlap;
        self
    }
}

/// Generates a serpentine coverage grid over a survey area.
///
/// Flight lines run north-south across a rectangle (or across the short
/// axis of a polygon's minimum-area bounding rectangle), `spacing` apart,
/// with the final line clamped onto the far edge so coverage never falls
/// short. Consecutive lines alternate direction so the drone never
/// backtracks.
///
/// # Errors
///
/// [`PlanningError::InvalidGeometry`] for non-positive spacing or an area
/// without extent, [`PlanningError::InvalidOpticsInput`] when optics-derived
/// spacing is requested with degenerate optics,
/// [`PlanningError::EmptyPattern`] if no flight line intersects the polygon.
pub fn generate_grid(config: &GridConfig) -> Result<PathSegment, PlanningError> {
    let spacing = match &config.spacing {
        GridSpacing::Fixed(spacing) => spacing.get::<meter>(),
        GridSpacing::FromOptics { optics, sidelap } => {
            let footprint = optics.footprint(config.altitude)?;
            image_spacing(footprint.width, *sidelap)?.get::<meter>()
        }
    };
    if spacing <= 0. {
        return Err(PlanningError::InvalidGeometry(
            "line spacing must be positive",
        ));
    }

    let lines = match &config.area {
        SurveyArea::Rectangle { width, height } => {
            let width = width.get::<meter>();
            let height = height.get::<meter>();
            if width <= 0. || height <= 0. {
                return Err(PlanningError::InvalidGeometry(
                    "rectangle sides must be positive",
                ));
            }
            line_stations(width, spacing)
                .map(|east| ((east, 0.), (east, height)))
                .collect()
        }
        SurveyArea::Polygon(vertices) => polygon_lines(vertices, spacing)?,
    };

    if lines.is_empty() {
        return Err(PlanningError::EmptyPattern);
    }

    let mut waypoints = Vec::with_capacity(lines.len() * 2);
    for (index, (start, end)) in lines.into_iter().enumerate() {
        // serpentine: odd lines are flown in reverse
        let (first, second) = if index % 2 == 0 {
            (start, end)
        } else {
            (end, start)
        };
        for (east, north) in [first, second] {
            waypoints.push(
                Waypoint::new(Enu::build(Components {
                    east: Length::new::<meter>(east),
                    north: Length::new::<meter>(north),
                    up: config.altitude,
                }))
                .with_kind(WaypointKind::Scan),
            );
        }
    }

    Ok(PathSegment {
        kind: PatternKind::Grid,
        waypoints,
    })
}

/// Generates an orbit, or a stack of them.
///
/// Each orbit produces `segments + 1` waypoints along the arc from
/// `start_angle` to `end_angle` (counterclockwise from local east), so a
/// full-turn sweep closes on its start point. With `orbits > 1` the arc is
/// flown repeatedly, climbing `vertical_shift` between repetitions. Camera
/// directives follow [`OrbitConfig::camera`].
///
/// # Errors
///
/// [`PlanningError::InvalidGeometry`] if the radius is not positive or
/// `segments` is zero; [`PlanningError::EmptyPattern`] for a zero-degree
/// sweep or a zero orbit count.
pub fn generate_orbit(config: &OrbitConfig) -> Result<PathSegment, PlanningError> {
    let radius = config.radius.get::<meter>();
    if radius <= 0. {
        return Err(PlanningError::InvalidGeometry(
            "orbit radius must be positive",
        ));
    }
    if config.segments == 0 {
        return Err(PlanningError::InvalidGeometry(
            "an orbit needs at least one segment",
        ));
    }
    let sweep = (config.end_angle - config.start_angle).get::<radian>();
    if sweep == 0. || config.orbits == 0 {
        return Err(PlanningError::EmptyPattern);
    }

    let step = sweep / f64::from(config.segments);
    let start = config.start_angle.get::<radian>();
    let altitude = config.altitude.get::<meter>();
    let shift = config.vertical_shift.get::<meter>();
    let per_orbit = config.segments as usize + 1;
    let mut waypoints = Vec::with_capacity(per_orbit * config.orbits as usize);
    for orbit in 0..config.orbits {
        let orbit_altitude = Length::new::<meter>(altitude + f64::from(orbit) * shift);
        for index in 0..=config.segments {
            let theta = start + f64::from(index) * step;
            let position = config
                .center
                .translated(
                    Length::new::<meter>(radius * theta.cos()),
                    Length::new::<meter>(radius * theta.sin()),
                    Length::new::<meter>(0.),
                )
                .with_up(orbit_altitude);

            let camera = match config.camera {
                OrbitCamera::FacingCenter => CameraDirective::LookAt(config.center),
                // the tangent leads (or, clockwise, trails) the radial
                // angle by a quarter turn
                OrbitCamera::Forward => {
                    CameraDirective::level_heading(tangent_heading(theta, sweep.signum()))
                }
                OrbitCamera::Fixed(heading) => CameraDirective::level_heading(heading),
            };
            waypoints.push(
                Waypoint::new(position)
                    .with_kind(WaypointKind::Orbit)
                    .with_camera(camera),
            );
        }
    }

    Ok(PathSegment {
        kind: PatternKind::Orbit,
        waypoints,
    })
}

/// Generates a helical path that interpolates radius and altitude over a
/// number of revolutions around a center point. The camera tracks the
/// spiral axis at the waypoint's own altitude.
///
/// # Errors
///
/// [`PlanningError::InvalidGeometry`] for negative radii, a spiral with no
/// radial extent, non-positive revolutions, or zero points per revolution.
pub fn generate_spiral(config: &SpiralConfig) -> Result<PathSegment, PlanningError> {
    let start_radius = config.start_radius.get::<meter>();
    let end_radius = config.end_radius.get::<meter>();
    if start_radius < 0. || end_radius < 0. {
        return Err(PlanningError::InvalidGeometry(
            "spiral radii must not be negative",
        ));
    }
    if start_radius == 0. && end_radius == 0. {
        return Err(PlanningError::InvalidGeometry(
            "spiral must have radial extent",
        ));
    }
    if config.revolutions <= 0. || !config.revolutions.is_finite() {
        return Err(PlanningError::InvalidGeometry(
            "revolutions must be positive",
        ));
    }
    if config.points_per_revolution == 0 {
        return Err(PlanningError::InvalidGeometry(
            "points per revolution must be positive",
        ));
    }

    let steps = (config.revolutions * f64::from(config.points_per_revolution)).floor() as u32;
    if steps == 0 {
        return Err(PlanningError::EmptyPattern);
    }

    let angle_step = std::f64::consts::TAU / f64::from(config.points_per_revolution);
    let start_altitude = config.start_altitude.get::<meter>();
    let end_altitude = config.end_altitude.get::<meter>();
    let mut waypoints = Vec::with_capacity(steps as usize + 1);
    for index in 0..=steps {
        let t = f64::from(index) / f64::from(steps);
        let radius = start_radius + (end_radius - start_radius) * t;
        let altitude = start_altitude + (end_altitude - start_altitude) * t;
        let theta = f64::from(index) * angle_step;
        let position = config
            .center
            .translated(
                Length::new::<meter>(radius * theta.cos()),
                Length::new::<meter>(radius * theta.sin()),
                Length::new::<meter>(0.),
            )
            .with_up(Length::new::<meter>(altitude));
        // keep the gimbal level: track the axis at the waypoint's altitude
        let axis = config.center.with_up(Length::new::<meter>(altitude));
        waypoints.push(
            Waypoint::new(position)
                .with_kind(WaypointKind::Spiral)
                .with_camera(CameraDirective::LookAt(axis)),
        );
    }

    Ok(PathSegment {
        kind: PatternKind::Spiral,
        waypoints,
    })
}

/// Generates horizontal serpentine passes across each wall of a building
/// footprint, wall by wall in corner order.
///
/// The drone stands off each wall on its outward side with the camera
/// pointed back at the wall. The pass-to-pass climb is derived from the
/// camera's vertical field of view at the standoff distance, reduced by the
/// configured overlap: `2 · standoff · tan(vfov / 2) · (1 − overlap)`.
/// Passes continue while their altitude does not exceed
/// `base_altitude + height`.
///
/// # Errors
///
/// [`PlanningError::InvalidGeometry`] for fewer than two corners, a
/// zero-length wall, non-positive standoff, negative height, or an overlap
/// so large the climb step vanishes; [`PlanningError::InvalidOpticsInput`]
/// if the optics are degenerate.
pub fn generate_facade(
    config: &FacadeConfig,
    optics: &OpticsInput,
) -> Result<PathSegment, PlanningError> {
    let standoff = config.standoff.get::<meter>();
    if standoff <= 0. {
        return Err(PlanningError::InvalidGeometry("standoff must be positive"));
    }
    let height = config.height.get::<meter>();
    if height < 0. {
        return Err(PlanningError::InvalidGeometry(
            "wall height must not be negative",
        ));
    }
    if config.corners.len() < 2 {
        return Err(PlanningError::InvalidGeometry(
            "a facade scan needs at least two corners",
        ));
    }

    let overlap = config.overlap.get::<ratio>();
    if !(0. ..1.).contains(&overlap) {
        return Err(PlanningError::InvalidOpticsInput(
            "overlap must be in [0%, 100%)",
        ));
    }

    let vfov = optics.vertical_fov()?.get::<radian>();
    let step = 2. * standoff * (vfov / 2.).tan() * (1. - overlap);
    if step <= 0. {
        return Err(PlanningError::InvalidGeometry(
            "climb step vanished; reduce overlap or increase standoff",
        ));
    }

    // three or more corners close the footprint back to the first corner
    let closed = config.corners.len() >= 3;
    let wall_count = if closed {
        config.corners.len()
    } else {
        config.corners.len() - 1
    };
    // counterclockwise corners (positive shoelace area) put the outward side
    // on the right-hand normal of each wall; an open wall defaults to it
    let winding = if closed && signed_area(&config.corners) < 0. {
        -1.
    } else {
        1.
    };

    let base = config.base_altitude.get::<meter>();
    let top = base + height;
    let mut waypoints = Vec::new();
    for wall in 0..wall_count {
        let wall_start = &config.corners[wall];
        let wall_end = &config.corners[(wall + 1) % config.corners.len()];
        let wall_east = (wall_end.east() - wall_start.east()).get::<meter>();
        let wall_north = (wall_end.north() - wall_start.north()).get::<meter>();
        let wall_length = wall_east.hypot(wall_north);
        if wall_length == 0. {
            return Err(PlanningError::InvalidGeometry("wall has zero length"));
        }

        let outward = (
            winding * wall_north / wall_length,
            winding * -wall_east / wall_length,
        );
        let inward = CameraDirective::level_heading(compass_heading(-outward.0, -outward.1));
        let offset = |wall_point: &Enu, altitude: f64| {
            Enu::build(Components {
                east: wall_point.east() + Length::new::<meter>(outward.0 * standoff),
                north: wall_point.north() + Length::new::<meter>(outward.1 * standoff),
                up: Length::new::<meter>(altitude),
            })
        };

        let mut pass = 0u32;
        loop {
            let altitude = base + f64::from(pass) * step;
            // tolerate float error at the top edge
            if altitude > top + 1e-9 {
                break;
            }
            let (near, far) = if pass % 2 == 0 {
                (wall_start, wall_end)
            } else {
                (wall_end, wall_start)
            };
            for wall_point in [near, far] {
                waypoints.push(
                    Waypoint::new(offset(wall_point, altitude))
                        .with_kind(WaypointKind::Facade)
                        .with_camera(inward),
                );
            }
            pass += 1;
        }
    }

    Ok(PathSegment {
        kind: PatternKind::Facade,
        waypoints,
    })
}

/// Compass heading of a horizontal direction vector.
fn compass_heading(east: f64, north: f64) -> Angle {
    let heading = east.atan2(north);
    Angle::new::<radian>(BoundedAngle::new(Angle::new::<radian>(heading)).get_bounded())
}

/// Compass heading of travel at radial angle `theta`; `direction` is +1 for
/// counterclockwise orbits and -1 for clockwise ones.
fn tangent_heading(theta: f64, direction: f64) -> Angle {
    // counterclockwise velocity is (-sin θ, cos θ) in (east, north)
    compass_heading(direction * -theta.sin(), direction * theta.cos())
}

/// Twice the signed shoelace area of a polygon; positive for
/// counterclockwise corner order.
fn signed_area(corners: &[Enu]) -> f64 {
    let mut doubled = 0.;
    for (index, a) in corners.iter().enumerate() {
        let b = &corners[(index + 1) % corners.len()];
        doubled += a.east().get::<meter>() * b.north().get::<meter>()
            - b.east().get::<meter>() * a.north().get::<meter>();
    }
    doubled
}

/// East stations of the flight lines across a span: every `spacing` meters,
/// with one final line clamped onto the far edge.
fn line_stations(span: f64, spacing: f64) -> impl Iterator<Item = f64> {
    let count = (span / spacing).ceil() as usize + 1;
    (0..count).map(move |index| (index as f64 * spacing).min(span))
}

/// Clipped flight lines across a polygon's convex hull, swept along the
/// first axis of its minimum-area bounding rectangle.
#[allow(clippy::type_complexity)]
fn polygon_lines(
    vertices: &[Enu],
    spacing: f64,
) -> Result<Vec<((f64, f64), (f64, f64))>, PlanningError> {
    if vertices.len() < 3 {
        return Err(PlanningError::InvalidGeometry(
            "a survey polygon needs at least three vertices",
        ));
    }
    let points: Vec<(f64, f64)> = vertices
        .iter()
        .map(|v| (v.east().get::<meter>(), v.north().get::<meter>()))
        .collect();
    let hull = convex_hull(&points);
    if hull.len() < 3 {
        return Err(PlanningError::InvalidGeometry(
            "survey polygon has no area",
        ));
    }

    let (u_axis, v_axis, u_min, u_max) = min_area_rect_axes(&hull);
    let mut lines = Vec::new();
    for station in line_stations(u_max - u_min, spacing) {
        let u = u_min + station;
        if let Some((v_lo, v_hi)) = clip_sweep_line(&hull, u_axis, u) {
            // a line that only grazes a vertex covers nothing
            if v_hi - v_lo > 1e-9 {
                let to_world = |v: f64| {
                    (
                        u_axis.0 * u + v_axis.0 * v,
                        u_axis.1 * u + v_axis.1 * v,
                    )
                };
                lines.push((to_world(v_lo), to_world(v_hi)));
            }
        }
    }
    Ok(lines)
}

/// Andrew's monotone chain; returns the hull counterclockwise without the
/// closing point. Collinear inputs collapse to fewer than three vertices.
fn convex_hull(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut sorted: Vec<(f64, f64)> = points.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }

    let cross = |o: (f64, f64), a: (f64, f64), b: (f64, f64)| {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    };

    let mut lower: Vec<(f64, f64)> = Vec::with_capacity(sorted.len());
    for &point in &sorted {
        while lower.len() >= 2
            && cross(lower[lower.len() - 2], lower[lower.len() - 1], point) <= 0.
        {
            lower.pop();
        }
        lower.push(point);
    }

    let mut upper: Vec<(f64, f64)> = Vec::with_capacity(sorted.len());
    for &point in sorted.iter().rev() {
        while upper.len() >= 2
            && cross(upper[upper.len() - 2], upper[upper.len() - 1], point) <= 0.
        {
            upper.pop();
        }
        upper.push(point);
    }

    // each half ends where the other begins
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// The axes and sweep extent of the minimum-area rectangle enclosing a
/// convex hull. One rectangle side is always flush with a hull edge.
fn min_area_rect_axes(hull: &[(f64, f64)]) -> ((f64, f64), (f64, f64), f64, f64) {
    let mut best: Option<((f64, f64), (f64, f64), f64, f64, f64)> = None;
    for (index, &a) in hull.iter().enumerate() {
        let b = hull[(index + 1) % hull.len()];
        let length = (b.0 - a.0).hypot(b.1 - a.1);
        if length == 0. {
            continue;
        }
        let u = ((b.0 - a.0) / length, (b.1 - a.1) / length);
        let v = (-u.1, u.0);

        let mut u_min = f64::INFINITY;
        let mut u_max = f64::NEG_INFINITY;
        let mut v_min = f64::INFINITY;
        let mut v_max = f64::NEG_INFINITY;
        for &p in hull {
            let pu = p.0 * u.0 + p.1 * u.1;
            let pv = p.0 * v.0 + p.1 * v.1;
            u_min = u_min.min(pu);
            u_max = u_max.max(pu);
            v_min = v_min.min(pv);
            v_max = v_max.max(pv);
        }
        let area = (u_max - u_min) * (v_max - v_min);
        if best.map_or(true, |(_, _, _, _, best_area)| area < best_area) {
            best = Some((u, v, u_min, u_max, area));
        }
    }
    // hull has at least three distinct vertices, so an edge always exists
    let (u, v, u_min, u_max, _) = best.unwrap_or(((1., 0.), (0., 1.), 0., 0., 0.));
    (u, v, u_min, u_max)
}

/// Intersects the infinite sweep line `{p : p·u = station}` with a convex
/// hull, returning the covered range along the perpendicular axis.
fn clip_sweep_line(hull: &[(f64, f64)], u: (f64, f64), station: f64) -> Option<(f64, f64)> {
    let v = (-u.1, u.0);
    let mut v_lo = f64::INFINITY;
    let mut v_hi = f64::NEG_INFINITY;
    let mut hit = false;
    for (index, &a) in hull.iter().enumerate() {
        let b = hull[(index + 1) % hull.len()];
        let au = a.0 * u.0 + a.1 * u.1 - station;
        let bu = b.0 * u.0 + b.1 * u.1 - station;
        let av = a.0 * v.0 + a.1 * v.1;
        let bv = b.0 * v.0 + b.1 * v.1;
        if au == 0. && bu == 0. {
            // edge lies on the sweep line
            v_lo = v_lo.min(av.min(bv));
            v_hi = v_hi.max(av.max(bv));
            hit = true;
        } else if (au <= 0. && bu >= 0.) || (au >= 0. && bu <= 0.) {
            let t = au / (au - bu);
            let crossing = av + (bv - av) * t;
            v_lo = v_lo.min(crossing);
            v_hi = v_hi.max(crossing);
            hit = true;
        }
    }
    hit.then_some((v_lo, v_hi))
}

#[cfg(test)]
mod tests {
    use super::{
        generate_facade, generate_grid, generate_orbit, generate_spiral, FacadeConfig, GridConfig,
        OrbitCamera, OrbitConfig, PatternKind, SpiralConfig, SurveyArea,
    };
    use crate::error::PlanningError;
    use crate::local::{Components, Enu};
    use crate::mission::{CameraDirective, WaypointKind};
    use crate::optics::{CameraProfile, LensProfile, OpticsInput, SensorFormat};
    use approx::assert_abs_diff_eq;
    use rstest::rstest;
    use uom::si::f64::{Angle, Length, Ratio};
    use uom::si::{angle::degree, length::meter, length::millimeter, ratio::percent};

    fn m(meters: f64) -> Length {
        Length::new::<meter>(meters)
    }

    fn enu(east: f64, north: f64, up: f64) -> Enu {
        Enu::build(Components {
            east: m(east),
            north: m(north),
            up: m(up),
        })
    }

    fn square_sensor_optics() -> OpticsInput {
        // 24mm lens on a square 24mm sensor: 53.13° in both axes
        OpticsInput {
            camera: CameraProfile {
                name: "survey-cam".into(),
                sensor_width: Length::new::<millimeter>(24.),
                sensor_height: Length::new::<millimeter>(24.),
                image_width_px: 6000,
                image_height_px: 6000,
                format: SensorFormat::ApsC,
            },
            lens: LensProfile {
                name: "prime-24".into(),
                focal_length: Length::new::<millimeter>(24.),
                max_aperture: 2.8,
                min_aperture: 22.,
            },
        }
    }

    fn positions(segment: &super::PathSegment) -> Vec<(f64, f64, f64)> {
        segment
            .positions()
            .map(|p| {
                (
                    p.east().get::<meter>(),
                    p.north().get::<meter>(),
                    p.up().get::<meter>(),
                )
            })
            .collect()
    }

    #[test]
    fn rectangle_grid_is_serpentine_with_clamped_last_line() {
        let config = GridConfig::new(
            SurveyArea::Rectangle {
                width: m(100.),
                height: m(60.),
            },
            m(40.),
            m(30.),
        );
        let segment = generate_grid(&config).expect("geometry is valid");
        assert_eq!(segment.kind, PatternKind::Grid);
        assert!(segment
            .waypoints
            .iter()
            .all(|w| w.kind == WaypointKind::Scan));

        // ceil(100/30)+1 = 5 lines, the last clamped from 120 to 100
        let expected = [
            (0., 0., 40.),
            (0., 60., 40.),
            (30., 60., 40.),
            (30., 0., 40.),
            (60., 0., 40.),
            (60., 60., 40.),
            (90., 60., 40.),
            (90., 0., 40.),
            (100., 0., 40.),
            (100., 60., 40.),
        ];
        let actual = positions(&segment);
        assert_eq!(actual.len(), expected.len());
        for (actual, expected) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(actual.0, expected.0, epsilon = 1e-9);
            assert_abs_diff_eq!(actual.1, expected.1, epsilon = 1e-9);
            assert_abs_diff_eq!(actual.2, expected.2, epsilon = 1e-9);
        }
    }

    #[test]
    fn exact_multiple_width_does_not_duplicate_the_last_line() {
        let config = GridConfig::new(
            SurveyArea::Rectangle {
                width: m(90.),
                height: m(60.),
            },
            m(40.),
            m(30.),
        );
        let segment = generate_grid(&config).expect("geometry is valid");
        // ceil(90/30)+1 = 4 lines at 0, 30, 60, 90
        assert_eq!(segment.len(), 8);
        let last = positions(&segment)[7];
        assert_abs_diff_eq!(last.0, 90., epsilon = 1e-9);
    }

    #[test]
    fn optics_derived_spacing_matches_footprint_and_sidelap() {
        let area = SurveyArea::Rectangle {
            width: m(100.),
            height: m(60.),
        };
        // 24mm on a 24mm sensor covers 40 m across track at 40 m altitude;
        // 70% sidelap leaves 12 m between lines
        let from_optics = GridConfig::from_optics(
            area.clone(),
            m(40.),
            square_sensor_optics(),
            Ratio::new::<percent>(70.),
        );
        let explicit = GridConfig::new(area, m(40.), m(12.));
        let derived = positions(&generate_grid(&from_optics).expect("geometry is valid"));
        let reference = positions(&generate_grid(&explicit).expect("geometry is valid"));
        assert_eq!(derived.len(), reference.len());
        for (derived, reference) in derived.iter().zip(reference) {
            assert_abs_diff_eq!(derived.0, reference.0, epsilon = 1e-9);
            assert_abs_diff_eq!(derived.1, reference.1, epsilon = 1e-9);
        }
    }

    #[test]
    fn polygon_grid_clips_lines_to_the_hull() {
        let trapezoid = vec![
            enu(0., 0., 0.),
            enu(60., 0., 0.),
            enu(60., 20., 0.),
            enu(0., 60., 0.),
        ];
        let config = GridConfig::new(SurveyArea::Polygon(trapezoid), m(35.), m(25.));
        let segment = generate_grid(&config).expect("geometry is valid");

        // stations at 0, 25, 50, and 60 (clamped from 75); each line is cut
        // where it leaves the slanted edge
        let expected = [
            (0., 0., 35.),
            (0., 60., 35.),
            (25., 43.333_333_333_333_336, 35.),
            (25., 0., 35.),
            (50., 0., 35.),
            (50., 26.666_666_666_666_664, 35.),
            (60., 20., 35.),
            (60., 0., 35.),
        ];
        let actual = positions(&segment);
        assert_eq!(actual.len(), expected.len());
        for (actual, expected) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(actual.0, expected.0, epsilon = 1e-9);
            assert_abs_diff_eq!(actual.1, expected.1, epsilon = 1e-9);
        }
    }

    #[test]
    fn polygon_grid_ignores_interior_points() {
        let with_interior = vec![
            enu(0., 0., 0.),
            enu(100., 0., 0.),
            enu(50., 30., 0.), // inside the hull of the others
            enu(100., 60., 0.),
            enu(0., 60., 0.),
        ];
        let hull_only = vec![
            enu(0., 0., 0.),
            enu(100., 0., 0.),
            enu(100., 60., 0.),
            enu(0., 60., 0.),
        ];
        let a = generate_grid(&GridConfig::new(SurveyArea::Polygon(with_interior), m(40.), m(30.)))
            .expect("geometry is valid");
        let b = generate_grid(&GridConfig::new(SurveyArea::Polygon(hull_only), m(40.), m(30.)))
            .expect("geometry is valid");
        assert_eq!(positions(&a), positions(&b));
    }

    #[rstest]
    #[case(GridConfig::new(
        SurveyArea::Rectangle { width: m(0.), height: m(60.) }, m(40.), m(30.)))]
    #[case(GridConfig::new(
        SurveyArea::Rectangle { width: m(100.), height: m(60.) }, m(40.), m(0.)))]
    #[case(GridConfig::new(
        SurveyArea::Polygon(vec![enu(0., 0., 0.), enu(10., 0., 0.)]), m(40.), m(5.)))]
    #[case(GridConfig::new(
        // collinear points enclose no area
        SurveyArea::Polygon(vec![enu(0., 0., 0.), enu(10., 10., 0.), enu(20., 20., 0.)]),
        m(40.), m(5.)))]
    fn degenerate_grid_geometry_is_rejected(#[case] config: GridConfig) {
        assert!(matches!(
            generate_grid(&config),
            Err(PlanningError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn orbit_closes_on_its_start_point() {
        let config = OrbitConfig::new(Enu::origin(), m(20.), m(50.)).with_segments(4);
        let segment = generate_orbit(&config).expect("geometry is valid");
        assert_eq!(segment.kind, PatternKind::Orbit);

        let expected = [
            (20., 0.),
            (0., 20.),
            (-20., 0.),
            (0., -20.),
            (20., 0.),
        ];
        let actual = positions(&segment);
        assert_eq!(actual.len(), expected.len());
        for (actual, expected) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(actual.0, expected.0, epsilon = 1e-9);
            assert_abs_diff_eq!(actual.1, expected.1, epsilon = 1e-9);
            assert_abs_diff_eq!(actual.2, 50., epsilon = 1e-9);
        }
    }

    #[test]
    fn orbit_facing_center_looks_at_the_center() {
        let center = enu(5., -3., 0.);
        let config = OrbitConfig::new(center, m(20.), m(50.)).with_segments(6);
        let segment = generate_orbit(&config).expect("geometry is valid");
        for waypoint in &segment.waypoints {
            assert_eq!(waypoint.camera, Some(CameraDirective::LookAt(center)));
        }
    }

    #[test]
    fn orbit_forward_heading_is_tangent_to_travel() {
        let config = OrbitConfig::new(Enu::origin(), m(20.), m(50.))
            .with_segments(4)
            .with_camera(OrbitCamera::Forward);
        let segment = generate_orbit(&config).expect("geometry is valid");

        // counterclockwise travel: due north at the east point, due west at
        // the north point
        let headings: Vec<f64> = segment
            .waypoints
            .iter()
            .map(|w| match w.camera {
                Some(CameraDirective::Attitude { heading, .. }) => heading.get::<degree>(),
                _ => panic!("forward orbit must emit attitude directives"),
            })
            .collect();
        assert_abs_diff_eq!(headings[0], 0., epsilon = 1e-9);
        assert_abs_diff_eq!(headings[1], 270., epsilon = 1e-9);
        assert_abs_diff_eq!(headings[2], 180., epsilon = 1e-9);
        assert_abs_diff_eq!(headings[3], 90., epsilon = 1e-9);
    }

    #[test]
    fn orbit_arc_spans_start_to_end_angle_without_closing() {
        let config = OrbitConfig::new(Enu::origin(), m(20.), m(50.))
            .with_segments(2)
            .with_arc(Angle::new::<degree>(0.), Angle::new::<degree>(180.));
        let segment = generate_orbit(&config).expect("geometry is valid");

        // a half circle in two 90° increments: east, north, west
        let expected = [(20., 0.), (0., 20.), (-20., 0.)];
        let actual = positions(&segment);
        assert_eq!(actual.len(), expected.len());
        for (actual, expected) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(actual.0, expected.0, epsilon = 1e-9);
            assert_abs_diff_eq!(actual.1, expected.1, epsilon = 1e-9);
        }
        assert_ne!(segment.waypoints[0].position, segment.waypoints[2].position);
    }

    #[test]
    fn stacked_orbits_climb_by_the_vertical_shift() {
        let config = OrbitConfig::new(Enu::origin(), m(20.), m(50.))
            .with_segments(4)
            .with_orbits(3)
            .with_vertical_shift(m(5.));
        let segment = generate_orbit(&config).expect("geometry is valid");

        // three full rings of five waypoints, at 50, 55, and 60 m
        assert_eq!(segment.len(), 15);
        let actual = positions(&segment);
        for (index, position) in actual.iter().enumerate() {
            let ring = index / 5;
            assert_abs_diff_eq!(position.2, 50. + 5. * ring as f64, epsilon = 1e-9);
            // every ring repeats the same horizontal track
            assert_abs_diff_eq!(position.0, actual[index % 5].0, epsilon = 1e-9);
            assert_abs_diff_eq!(position.1, actual[index % 5].1, epsilon = 1e-9);
        }
    }

    #[rstest]
    #[case(OrbitConfig::new(Enu::origin(), m(20.), m(50.))
        .with_arc(Angle::new::<degree>(90.), Angle::new::<degree>(90.)))]
    #[case(OrbitConfig::new(Enu::origin(), m(20.), m(50.)).with_orbits(0))]
    fn zero_sweep_or_zero_orbits_is_an_empty_pattern(#[case] config: OrbitConfig) {
        assert_eq!(generate_orbit(&config), Err(PlanningError::EmptyPattern));
    }

    #[rstest]
    #[case(OrbitConfig::new(Enu::origin(), m(0.), m(50.)))]
    #[case(OrbitConfig::new(Enu::origin(), m(-5.), m(50.)))]
    #[case(OrbitConfig::new(Enu::origin(), m(20.), m(50.)).with_segments(0))]
    fn degenerate_orbit_geometry_is_rejected(#[case] config: OrbitConfig) {
        assert!(matches!(
            generate_orbit(&config),
            Err(PlanningError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn spiral_interpolates_radius_and_altitude() {
        let config = SpiralConfig::new(Enu::origin(), m(10.), m(30.), 2.)
            .with_altitudes(m(20.), m(40.))
            .with_points_per_revolution(4);
        let segment = generate_spiral(&config).expect("geometry is valid");
        assert_eq!(segment.kind, PatternKind::Spiral);
        assert_eq!(segment.len(), 9);

        let actual = positions(&segment);
        // start, halfway (one full turn), and end all lie on the +east axis
        assert_abs_diff_eq!(actual[0].0, 10., epsilon = 1e-9);
        assert_abs_diff_eq!(actual[0].2, 20., epsilon = 1e-9);
        assert_abs_diff_eq!(actual[4].0, 20., epsilon = 1e-9);
        assert_abs_diff_eq!(actual[4].1, 0., epsilon = 1e-9);
        assert_abs_diff_eq!(actual[4].2, 30., epsilon = 1e-9);
        assert_abs_diff_eq!(actual[8].0, 30., epsilon = 1e-9);
        assert_abs_diff_eq!(actual[8].2, 40., epsilon = 1e-9);
    }

    #[test]
    fn spiral_camera_tracks_the_axis_at_flight_altitude() {
        let config = SpiralConfig::new(Enu::origin(), m(10.), m(30.), 2.)
            .with_altitudes(m(20.), m(40.))
            .with_points_per_revolution(4);
        let segment = generate_spiral(&config).expect("geometry is valid");

        for waypoint in &segment.waypoints {
            assert_eq!(waypoint.kind, WaypointKind::Spiral);
            let target = match waypoint.camera {
                Some(CameraDirective::LookAt(target)) => target,
                _ => panic!("spiral must track its axis"),
            };
            // level with the waypoint, on the axis
            assert_abs_diff_eq!(target.east().get::<meter>(), 0., epsilon = 1e-9);
            assert_abs_diff_eq!(target.north().get::<meter>(), 0., epsilon = 1e-9);
            assert_abs_diff_eq!(
                target.up().get::<meter>(),
                waypoint.position.up().get::<meter>(),
                epsilon = 1e-9
            );
        }
    }

    #[rstest]
    #[case(SpiralConfig::new(Enu::origin(), m(-1.), m(30.), 2.))]
    #[case(SpiralConfig::new(Enu::origin(), m(0.), m(0.), 2.))]
    #[case(SpiralConfig::new(Enu::origin(), m(10.), m(30.), 0.))]
    #[case(SpiralConfig::new(Enu::origin(), m(10.), m(30.), 2.).with_points_per_revolution(0))]
    fn degenerate_spiral_geometry_is_rejected(#[case] config: SpiralConfig) {
        assert!(matches!(
            generate_spiral(&config),
            Err(PlanningError::InvalidGeometry(_))
        ));
    }

    fn facade_heading_degrees(waypoint: &crate::mission::Waypoint) -> f64 {
        match waypoint.camera {
            Some(CameraDirective::Attitude { heading, .. }) => heading.get::<degree>(),
            _ => panic!("facade waypoints must aim at the wall"),
        }
    }

    #[test]
    fn facade_climbs_by_the_optics_derived_step() {
        // 53.13° vertical fov at 10 m standoff: full stripe is 10 m; with
        // 20% overlap each pass climbs 8 m
        let config = FacadeConfig::new(vec![enu(0., 0., 0.), enu(40., 0., 0.)], m(10.), m(30.))
            .with_overlap(Ratio::new::<percent>(20.));
        let segment =
            generate_facade(&config, &square_sensor_optics()).expect("geometry is valid");
        assert_eq!(segment.kind, PatternKind::Facade);

        let actual = positions(&segment);
        // passes at 0, 8, 16, 24 m; 32 m would overshoot the 30 m top
        assert_eq!(actual.len(), 8);
        for (pass, pair) in actual.chunks(2).enumerate() {
            let altitude = 8. * pass as f64;
            assert_abs_diff_eq!(pair[0].2, altitude, epsilon = 1e-9);
            assert_abs_diff_eq!(pair[1].2, altitude, epsilon = 1e-9);
        }

        // wall runs east; the drone stands off 10 m on the right-hand
        // (south) side, aiming back north at the wall
        assert_abs_diff_eq!(actual[0].1, -10., epsilon = 1e-9);
        for waypoint in &segment.waypoints {
            assert_eq!(waypoint.kind, WaypointKind::Facade);
            assert_abs_diff_eq!(facade_heading_degrees(waypoint), 0., epsilon = 1e-9);
        }
        // serpentine along the wall
        assert_abs_diff_eq!(actual[0].0, 0., epsilon = 1e-9);
        assert_abs_diff_eq!(actual[1].0, 40., epsilon = 1e-9);
        assert_abs_diff_eq!(actual[2].0, 40., epsilon = 1e-9);
        assert_abs_diff_eq!(actual[3].0, 0., epsilon = 1e-9);
    }

    #[test]
    fn facade_walks_every_wall_of_a_footprint() {
        // a 40 m square, counterclockwise, scanned in a single pass per wall
        let corners = vec![
            enu(0., 0., 0.),
            enu(40., 0., 0.),
            enu(40., 40., 0.),
            enu(0., 40., 0.),
        ];
        let config = FacadeConfig::new(corners, m(10.), m(0.));
        let segment =
            generate_facade(&config, &square_sensor_optics()).expect("geometry is valid");

        // four walls, two waypoints each
        assert_eq!(segment.len(), 8);
        let actual = positions(&segment);
        // south wall: offset south, camera north
        assert_abs_diff_eq!(actual[0].1, -10., epsilon = 1e-9);
        assert_abs_diff_eq!(facade_heading_degrees(&segment.waypoints[0]), 0., epsilon = 1e-9);
        // east wall: offset east, camera west
        assert_abs_diff_eq!(actual[2].0, 50., epsilon = 1e-9);
        assert_abs_diff_eq!(
            facade_heading_degrees(&segment.waypoints[2]),
            270.,
            epsilon = 1e-9
        );
        // north wall: offset north, camera south
        assert_abs_diff_eq!(actual[4].1, 50., epsilon = 1e-9);
        assert_abs_diff_eq!(
            facade_heading_degrees(&segment.waypoints[4]),
            180.,
            epsilon = 1e-9
        );
        // west wall: offset west, camera east
        assert_abs_diff_eq!(actual[6].0, -10., epsilon = 1e-9);
        assert_abs_diff_eq!(
            facade_heading_degrees(&segment.waypoints[6]),
            90.,
            epsilon = 1e-9
        );
    }

    #[test]
    fn facade_offset_stays_outward_for_clockwise_corners() {
        let clockwise = vec![
            enu(0., 0., 0.),
            enu(0., 40., 0.),
            enu(40., 40., 0.),
            enu(40., 0., 0.),
        ];
        let config = FacadeConfig::new(clockwise, m(10.), m(0.));
        let segment =
            generate_facade(&config, &square_sensor_optics()).expect("geometry is valid");

        // first wall is the west one; the drone must still stand off west
        let actual = positions(&segment);
        assert_abs_diff_eq!(actual[0].0, -10., epsilon = 1e-9);
        assert_abs_diff_eq!(
            facade_heading_degrees(&segment.waypoints[0]),
            90.,
            epsilon = 1e-9
        );
    }

    #[test]
    fn facade_with_zero_height_is_a_single_pass() {
        let config = FacadeConfig::new(vec![enu(0., 0., 0.), enu(40., 0., 0.)], m(10.), m(0.))
            .with_base_altitude(m(12.));
        let segment =
            generate_facade(&config, &square_sensor_optics()).expect("geometry is valid");
        assert_eq!(segment.len(), 2);
        assert_abs_diff_eq!(positions(&segment)[0].2, 12., epsilon = 1e-9);
    }

    #[rstest]
    #[case(FacadeConfig::new(vec![enu(0., 0., 0.), enu(0., 0., 0.)], m(10.), m(30.)))]
    #[case(FacadeConfig::new(vec![enu(0., 0., 0.)], m(10.), m(30.)))]
    #[case(FacadeConfig::new(vec![enu(0., 0., 0.), enu(40., 0., 0.)], m(0.), m(30.)))]
    #[case(FacadeConfig::new(vec![enu(0., 0., 0.), enu(40., 0., 0.)], m(10.), m(-1.)))]
    fn degenerate_facade_geometry_is_rejected(#[case] config: FacadeConfig) {
        assert!(matches!(
            generate_facade(&config, &square_sensor_optics()),
            Err(PlanningError::InvalidGeometry(_))
        ));
    }
}
