//! Boundary shapes for importing and exporting scene areas.
//!
//! Scene layers hand areas of interest back and forth as a
//! feature-collection style document: each feature is a point or polygon in
//! geodetic coordinates plus a small property bag describing the scene
//! object. This crate does not own the container format; its only
//! obligation is converting the coordinates correctly between geodetic and
//! the local frame, which is what [`Geometry::local_positions`] and
//! [`Geometry::from_local`] do.
//!
//! Positions are `[longitude°, latitude°, altitude m]` triples, matching
//! the usual longitude-first convention of geographic interchange formats.

use crate::error::PlanningError;
use crate::frame::ReferenceFrame;
use crate::geodetic::{Components, Geodetic};
use crate::local::Enu;
use uom::si::f64::{Angle, Length};
use uom::si::{angle::degree, length::meter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A geodetic position triple: `[longitude°, latitude°, altitude m]`.
pub type Position = [f64; 3];

/// A collection of scene features.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

/// One scene object: where it is, and what it is.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: ObjectProperties,
}

/// The placement of a feature, in geodetic coordinates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum Geometry {
    Point { coordinates: Position },
    /// A single unclosed ring of corner positions.
    Polygon { coordinates: Vec<Position> },
}

/// The property bag attached to a feature by the scene-building layer.
///
/// Only `objectType` is required; everything else is carried through
/// untouched for the consumer's benefit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ObjectProperties {
    pub object_type: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub model_key: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub name: Option<String>,
    /// Heading of the placed model, in degrees.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub rotation: Option<f64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub scale: Option<f64>,
}

impl Geometry {
    /// Converts every coordinate of this geometry into the local frame.
    ///
    /// # Errors
    ///
    /// [`PlanningError::NoReferenceFrame`] if the frame has no origin,
    /// [`PlanningError::InvalidGeometry`] if a latitude is out of range.
    pub fn local_positions(&self, frame: &ReferenceFrame) -> Result<Vec<Enu>, PlanningError> {
        let positions: &[Position] = match self {
            Geometry::Point { coordinates } => std::slice::from_ref(coordinates),
            Geometry::Polygon { coordinates } => coordinates,
        };
        positions
            .iter()
            .map(|position| frame.global_to_local(&geodetic_from(position)?))
            .collect()
    }

    /// Builds a point geometry from a local position.
    ///
    /// # Errors
    ///
    /// [`PlanningError::NoReferenceFrame`] if the frame has no origin.
    pub fn point_from_local(local: &Enu, frame: &ReferenceFrame) -> Result<Self, PlanningError> {
        Ok(Geometry::Point {
            coordinates: position_from(&frame.local_to_global(local)?),
        })
    }

    /// Builds a polygon geometry from a ring of local corner positions.
    ///
    /// # Errors
    ///
    /// [`PlanningError::NoReferenceFrame`] if the frame has no origin.
    pub fn from_local(ring: &[Enu], frame: &ReferenceFrame) -> Result<Self, PlanningError> {
        let coordinates = ring
            .iter()
            .map(|local| Ok(position_from(&frame.local_to_global(local)?)))
            .collect::<Result<Vec<_>, PlanningError>>()?;
        Ok(Geometry::Polygon { coordinates })
    }
}

fn geodetic_from(position: &Position) -> Result<Geodetic, PlanningError> {
    let [longitude, latitude, altitude] = *position;
    Geodetic::build(Components {
        latitude: Angle::new::<degree>(latitude),
        longitude: Angle::new::<degree>(longitude),
        altitude: Length::new::<meter>(altitude),
    })
    .ok_or(PlanningError::InvalidGeometry(
        "latitude must be within [-90°, 90°]",
    ))
}

fn position_from(geodetic: &Geodetic) -> Position {
    [
        geodetic.longitude().get::<degree>(),
        geodetic.latitude().get::<degree>(),
        geodetic.altitude().get::<meter>(),
    ]
}
