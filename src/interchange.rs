//! Text documents for saving and loading a palette or a wall layout.
//!
//! Both are JSON with camelCase keys:
//!
//! ```text
//! { "colors": [ { "color": { "r": 230, "g": 57, "b": 70, "a": 255 }, "name": "red", "maxUsage": 2 } ] }
//!
//! { "walls": [ { "index": 0, "routes": [
//!     { "id": 0, "wallIndex": 0, "routeIndex": 0, "displayName": "W0R0",
//!       "assignedColor": { "r": 230, "g": 57, "b": 70, "a": 255 }, "isFixed": true } ] } ] }
//! ```
//!
//! Documents come from outside the program, so loading validates them instead of trusting them.

use std::collections::HashSet;
use std::num::NonZero;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{Color, ColorConstraint, Palette};
use crate::walls::{Route, RouteId, Wall, WallSystem};

/// Errors raised while reading or writing an interchange document
#[derive(Debug, Error)]
pub enum InterchangeError {
    /// The text is not valid JSON of the expected shape
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// A palette entry allows zero uses
    #[error("color '{name}' has a usage limit of 0")]
    ZeroUsage { name: String },

    /// Two routes claim the same id
    #[error("route id {id} appears more than once")]
    DuplicateRoute { id: RouteId },

    /// A route is fixed but has no color to be fixed to
    #[error("route {id} is fixed but has no assigned color")]
    FixedWithoutColor { id: RouteId },

    /// A route id leaves no room for ids of routes added later
    #[error("route id {id} is too large")]
    RouteIdOverflow { id: RouteId },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ColorData {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    u8::MAX
}

impl From<Color> for ColorData {
    fn from(Color { r, g, b, a }: Color) -> Self {
        Self { r, g, b, a }
    }
}

impl From<ColorData> for Color {
    fn from(ColorData { r, g, b, a }: ColorData) -> Self {
        Color::rgba(r, g, b, a)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorConstraintData {
    pub color: ColorData,
    #[serde(default)]
    pub name: String,
    pub max_usage: u32,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ColorSetupData {
    #[serde(default)]
    pub colors: Vec<ColorConstraintData>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteData {
    pub id: RouteId,
    pub wall_index: usize,
    pub route_index: usize,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_color: Option<ColorData>,
    #[serde(default)]
    pub is_fixed: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WallData {
    pub index: usize,
    #[serde(default)]
    pub routes: Vec<RouteData>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct WallSetupData {
    #[serde(default)]
    pub walls: Vec<WallData>,
}

impl From<&Palette> for ColorSetupData {
    fn from(palette: &Palette) -> Self {
        Self {
            colors: palette.iter()
                .map(|constraint| ColorConstraintData {
                    color: constraint.color.into(),
                    name: constraint.name.clone(),
                    max_usage: constraint.max_usage.get(),
                })
                .collect(),
        }
    }
}

impl TryFrom<ColorSetupData> for Palette {
    type Error = InterchangeError;

    fn try_from(data: ColorSetupData) -> Result<Self, Self::Error> {
        data.colors.into_iter()
            .map(|entry| match NonZero::new(entry.max_usage) {
                None => Err(InterchangeError::ZeroUsage { name: entry.name }),
                Some(max_usage) => Ok(ColorConstraint::new(entry.color.into(), max_usage, entry.name)),
            })
            .collect()
    }
}

impl From<&Route> for RouteData {
    fn from(route: &Route) -> Self {
        Self {
            id: route.id(),
            wall_index: route.wall_index(),
            route_index: route.route_index(),
            display_name: route.display_name(),
            assigned_color: route.assigned_color().map(ColorData::from),
            is_fixed: route.is_fixed(),
        }
    }
}

impl From<&WallSystem> for WallSetupData {
    fn from(system: &WallSystem) -> Self {
        Self {
            walls: system.walls().iter()
                .map(|wall| WallData {
                    index: wall.index(),
                    routes: wall.routes().iter().map(RouteData::from).collect(),
                })
                .collect(),
        }
    }
}

impl TryFrom<WallSetupData> for WallSystem {
    type Error = InterchangeError;

    /// Wall and route positions are taken from document order; the stored indices are only informative.
    fn try_from(data: WallSetupData) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();
        let mut walls = Vec::with_capacity(data.walls.len());

        for wall_data in data.walls {
            let mut routes = Vec::with_capacity(wall_data.routes.len());
            for route_data in wall_data.routes {
                if !seen.insert(route_data.id) {
                    return Err(InterchangeError::DuplicateRoute { id: route_data.id });
                }
                if route_data.is_fixed && route_data.assigned_color.is_none() {
                    return Err(InterchangeError::FixedWithoutColor { id: route_data.id });
                }

                let mut route = Route::new(route_data.id, route_data.wall_index, route_data.route_index);
                route.set_state(route_data.assigned_color.map(Color::from), route_data.is_fixed);
                routes.push(route);
            }
            walls.push(Wall { index: wall_data.index, routes });
        }

        let next_route_id = match seen.iter().max() {
            None => 0,
            Some(&max) => max.checked_add(1).ok_or(InterchangeError::RouteIdOverflow { id: max })?,
        };

        let mut system = WallSystem { walls, next_route_id };
        system.restamp();
        Ok(system)
    }
}

pub fn palette_to_json(palette: &Palette) -> Result<String, InterchangeError> {
    Ok(serde_json::to_string_pretty(&ColorSetupData::from(palette))?)
}

pub fn palette_from_json(json: &str) -> Result<Palette, InterchangeError> {
    Palette::try_from(serde_json::from_str::<ColorSetupData>(json)?)
}

pub fn walls_to_json(system: &WallSystem) -> Result<String, InterchangeError> {
    Ok(serde_json::to_string_pretty(&WallSetupData::from(system))?)
}

/// Load a wall layout. Routes come back without node keys; derive a graph to get them.
pub fn walls_from_json(json: &str) -> Result<WallSystem, InterchangeError> {
    WallSystem::try_from(serde_json::from_str::<WallSetupData>(json)?)
}
