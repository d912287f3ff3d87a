//! Mission-planning math for camera drones, for pilots with other things to
//! worry about than map projections.
//!
//! Everything a survey mission needs happens in two coordinate worlds. The
//! planet-fixed one is [`Geodetic`] latitude/longitude/altitude (with
//! [`Ecef`] as the cartesian stepping stone between them), and the mission
//! one is [`Enu`]: meters east, north, and up from wherever the drone takes
//! off. A [`ReferenceFrame`] anchored at the takeoff point converts between
//! the two, exactly, in both directions.
//!
//! On top of that sit the planning components:
//!
//! - [`optics`] answers the photographic questions: field of view, ground
//!   sample distance, depth of field, and how far apart images must be for
//!   a given overlap;
//! - [`patterns`] turns a config struct into a flight path in the local
//!   frame: coverage grids, orbits, spirals, and facade scans;
//! - [`mission`] binds a path to the planet through the reference frame and
//!   brackets it with takeoff and return-to-launch waypoints;
//! - [`exchange`] converts the geodetic coordinates of imported scene
//!   features into the local frame and back.
//!
//! # Example
//!
//! Planning a photogrammetry grid over a field near Zürich:
//!
//! ```
//! use overflight::optics::{CameraProfile, LensProfile, OpticsInput, SensorFormat};
//! use overflight::patterns::{generate_grid, GridConfig, SurveyArea};
//! use overflight::mission::{assemble, AssemblyOptions};
//! use overflight::{Geodetic, ReferenceFrame};
//! use uom::si::f64::{Angle, Length, Ratio};
//! use uom::si::{angle::degree, length::meter, length::millimeter, ratio::percent};
//!
//! # fn main() -> Result<(), overflight::PlanningError> {
//! // anchor the local frame at the takeoff point
//! let takeoff = Geodetic::builder()
//!     .latitude(Angle::new::<degree>(47.3769))
//!     .expect("latitude is in [-90, 90]")
//!     .longitude(Angle::new::<degree>(8.5417))
//!     .altitude(Length::new::<meter>(408.))
//!     .build();
//! let frame = ReferenceFrame::anchored_at(takeoff);
//!
//! // the airframe carries a full-frame body with a 24mm lens
//! let optics = OpticsInput {
//!     camera: CameraProfile {
//!         name: "a7r-iv".into(),
//!         sensor_width: Length::new::<millimeter>(36.),
//!         sensor_height: Length::new::<millimeter>(24.),
//!         image_width_px: 8000,
//!         image_height_px: 6000,
//!         format: SensorFormat::FullFrame,
//!     },
//!     lens: LensProfile {
//!         name: "prime-24".into(),
//!         focal_length: Length::new::<millimeter>(24.),
//!         max_aperture: 1.4,
//!         min_aperture: 16.,
//!     },
//! };
//!
//! // 80% sidelap at 40m altitude dictates the flight-line spacing
//! let survey = SurveyArea::Rectangle {
//!     width: Length::new::<meter>(100.),
//!     height: Length::new::<meter>(60.),
//! };
//! let config = GridConfig::from_optics(
//!     survey,
//!     Length::new::<meter>(40.),
//!     optics,
//!     Ratio::new::<percent>(80.),
//! );
//! let segment = generate_grid(&config)?;
//!
//! let options = AssemblyOptions::new().with_takeoff().with_landing();
//! let mission = assemble(&segment, &options, &frame)?;
//!
//! // ceil(100 / 12) + 1 = 10 flight lines, plus takeoff and landing
//! assert_eq!(mission.len(), 22);
//! // every waypoint also knows its absolute position for export
//! println!("first stop: {}", mission.waypoints[0].global);
//! # Ok(())
//! # }
//! ```

mod error;
mod util;

pub mod exchange;
pub mod frame;
pub mod geodetic;
pub mod local;
pub mod mission;
pub mod optics;
pub mod patterns;

pub use error::PlanningError;
pub use frame::ReferenceFrame;
pub use geodetic::{Ecef, Geodetic, LatLonFormat};
pub use local::Enu;
pub use mission::{assemble, Mission};
pub use optics::OpticsInput;
pub use patterns::{PathSegment, PatternKind};

pub(crate) type Point3 = nalgebra::Point3<f64>;
