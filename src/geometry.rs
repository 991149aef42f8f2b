// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Equatorial radius of Earth used by the spherical Mercator projection, in meters.
/// Source: https://en.wikipedia.org/wiki/Web_Mercator_projection
pub const EARTH_RADIUS_M: f64 = 6378137.0;

/// Number of meters in an international mile.
pub const METERS_PER_MILE: f64 = 1609.344;

/// A position on the projected plane, in miles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Projects a lon-lat position (in degrees) onto a
/// [spherical Mercator](https://en.wikipedia.org/wiki/Mercator_projection) plane
/// measured in miles.
///
/// The projection is undefined at the poles; `lat` must be strictly between -90° and 90°.
pub fn project(lon: f64, lat: f64) -> Point {
    let lon = lon.to_radians();
    let lat = lat.to_radians();
    Point {
        x: EARTH_RADIUS_M * lon / METERS_PER_MILE,
        y: EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat * 0.5).tan().ln() / METERS_PER_MILE,
    }
}

/// Inverse of [project], returning a `(lon, lat)` pair in degrees.
pub fn unproject(p: Point) -> (f64, f64) {
    let lon = p.x * METERS_PER_MILE / EARTH_RADIUS_M;
    let lat = 2.0 * (p.y * METERS_PER_MILE / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2;
    (lon.to_degrees(), lat.to_degrees())
}

/// Euclidean distance between two projected points, in miles.
#[inline]
pub fn planar_distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
