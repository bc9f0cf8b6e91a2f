//! Lattice geometry for scan grids.
//!
//! A scan samples `rows × cols` points spread evenly over a square of side
//! `2 × radius` miles centred on the search location. Row 0 is the northern
//! edge and column 0 the western edge. The longitude step widens with
//! latitude so physical spacing stays ~equal in both directions.

use std::f64::consts::PI;

use gridrank_core::{SearchRecord, DEFAULT_GRID_DIMENSION};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::EngineError;

const MILES_PER_LAT_DEGREE: f64 = 69.0;

/// Radius used when the stored radius is missing or non-positive.
pub const DEFAULT_RADIUS_MILES: f64 = 5.0;

/// Scans never cover more than this many miles from the center.
pub const MAX_RADIUS_MILES: f64 = 30.0;

/// Upper bound on rows and columns of a stored lattice.
pub const MAX_GRID_DIMENSION: u32 = 41;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Shape of a scan lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub rows: u32,
    pub cols: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            rows: DEFAULT_GRID_DIMENSION,
            cols: DEFAULT_GRID_DIMENSION,
        }
    }
}

impl GridSpec {
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedUpstream`] when either dimension is
    /// outside `1..=MAX_GRID_DIMENSION`.
    pub fn new(rows: u32, cols: u32) -> Result<Self, EngineError> {
        check_dimension("grid_rows", rows)?;
        check_dimension("grid_cols", cols)?;
        Ok(Self { rows, cols })
    }

    /// Dimensions as stored on a search row; missing values mean 13.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedUpstream`] for non-positive or
    /// oversized dimensions.
    pub fn from_stored(rows: Option<i32>, cols: Option<i32>) -> Result<Self, EngineError> {
        let rows = stored_dimension("grid_rows", rows)?;
        let cols = stored_dimension("grid_cols", cols)?;
        Self::new(rows, cols)
    }

    #[must_use]
    pub fn total_points(self) -> usize {
        self.rows as usize * self.cols as usize
    }

    #[must_use]
    pub fn center_row(self) -> u32 {
        self.rows / 2
    }

    #[must_use]
    pub fn center_col(self) -> u32 {
        self.cols / 2
    }

    /// `(row, col)` of a row-major grid index.
    #[must_use]
    pub fn position(self, index: usize) -> Option<(u32, u32)> {
        if index >= self.total_points() {
            return None;
        }
        let cols = self.cols as usize;
        let row = u32::try_from(index / cols).ok()?;
        let col = u32::try_from(index % cols).ok()?;
        Some((row, col))
    }

    /// Row-major grid index of `(row, col)`.
    #[must_use]
    pub fn index(self, row: u32, col: u32) -> Option<usize> {
        (row < self.rows && col < self.cols)
            .then(|| row as usize * self.cols as usize + col as usize)
    }
}

fn check_dimension(field: &'static str, value: u32) -> Result<(), EngineError> {
    if value == 0 || value > MAX_GRID_DIMENSION {
        return Err(EngineError::malformed(
            field,
            format!("{value} is outside 1..={MAX_GRID_DIMENSION}"),
        ));
    }
    Ok(())
}

fn stored_dimension(field: &'static str, value: Option<i32>) -> Result<u32, EngineError> {
    match value {
        None => Ok(DEFAULT_GRID_DIMENSION),
        Some(v) => u32::try_from(v)
            .map_err(|_| EngineError::malformed(field, format!("{v} is negative"))),
    }
}

/// A lattice anchored at a concrete center.
#[derive(Debug, Clone, Copy)]
pub struct SearchGrid {
    pub spec: GridSpec,
    pub center: GridPoint,
    pub radius_miles: f64,
    lat_step: f64,
    lng_step: f64,
}

impl SearchGrid {
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedUpstream`] if the center is not a
    /// finite coordinate with `|lat| < 90` and `|lng| <= 180`.
    pub fn new(spec: GridSpec, center: GridPoint, radius_miles: f64) -> Result<Self, EngineError> {
        if !center.lat.is_finite() || center.lat.abs() >= 90.0 {
            return Err(EngineError::malformed(
                "center_lat",
                format!("{} is not a usable latitude", center.lat),
            ));
        }
        if !center.lng.is_finite() || center.lng.abs() > 180.0 {
            return Err(EngineError::malformed(
                "center_lng",
                format!("{} is not a usable longitude", center.lng),
            ));
        }

        let radius_miles = effective_radius(Some(radius_miles));
        let span = radius_miles * 2.0;
        let step_miles_row = span / f64::from(spec.rows.saturating_sub(1).max(1));
        let step_miles_col = span / f64::from(spec.cols.saturating_sub(1).max(1));
        let lat_step = step_miles_row / MILES_PER_LAT_DEGREE;
        let lng_step =
            step_miles_col / (MILES_PER_LAT_DEGREE * (center.lat * PI / 180.0).cos().abs());

        Ok(Self {
            spec,
            center,
            radius_miles,
            lat_step,
            lng_step,
        })
    }

    /// Build the lattice a stored search was scanned on.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedUpstream`] for an unusable center or
    /// invalid stored dimensions.
    pub fn from_search(search: &SearchRecord) -> Result<Self, EngineError> {
        let spec = GridSpec::from_stored(search.grid_rows, search.grid_cols)?;
        let center = GridPoint {
            lat: decimal_to_f64("center_lat", search.center_lat)?,
            lng: decimal_to_f64("center_lng", search.center_lng)?,
        };
        let radius = search
            .search_radius_miles
            .and_then(|r| r.to_f64())
            .unwrap_or(DEFAULT_RADIUS_MILES);
        Self::new(spec, center, radius)
    }

    /// Degrees of latitude between adjacent rows.
    #[must_use]
    pub fn lat_step(&self) -> f64 {
        self.lat_step
    }

    /// Degrees of longitude between adjacent columns at the center latitude.
    #[must_use]
    pub fn lng_step(&self) -> f64 {
        self.lng_step
    }

    /// Approximate coordinate of a lattice position.
    #[must_use]
    pub fn position(&self, row: u32, col: u32) -> GridPoint {
        let row_offset = f64::from(self.spec.center_row()) - f64::from(row);
        let col_offset = f64::from(col) - f64::from(self.spec.center_col());
        GridPoint {
            lat: self.center.lat + row_offset * self.lat_step,
            lng: self.center.lng + col_offset * self.lng_step,
        }
    }

    /// Every lattice position in row-major order.
    #[must_use]
    pub fn lattice(&self) -> Vec<LatticePoint> {
        (0..self.spec.rows)
            .flat_map(|row| (0..self.spec.cols).map(move |col| (row, col)))
            .enumerate()
            .map(|(index, (row, col))| LatticePoint {
                row,
                col,
                index,
                point: self.position(row, col),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticePoint {
    pub row: u32,
    pub col: u32,
    pub index: usize,
    pub point: GridPoint,
}

/// Stored radius clamped to what a scan can actually cover.
#[must_use]
pub fn effective_radius(stored: Option<f64>) -> f64 {
    match stored {
        Some(r) if r.is_finite() && r > 0.0 => r.min(MAX_RADIUS_MILES),
        _ => DEFAULT_RADIUS_MILES,
    }
}

/// Miles between adjacent points, to two decimals.
#[must_use]
pub fn spacing_miles(radius_miles: f64, grid_size: u32) -> f64 {
    let raw = (effective_radius(Some(radius_miles)) * 2.0) / f64::from(grid_size.saturating_sub(1).max(1));
    (raw * 100.0).round() / 100.0
}

/// Area of the scanned square in square miles, rounded.
#[must_use]
pub fn coverage_area_sq_miles(radius_miles: f64) -> f64 {
    (effective_radius(Some(radius_miles)) * 2.0).powi(2).round()
}

/// Map zoom level that frames a scan of the given radius.
#[must_use]
pub fn zoom_level(radius_miles: f64) -> u8 {
    match radius_miles {
        r if r <= 2.0 => 14,
        r if r <= 3.0 => 13,
        r if r <= 5.0 => 12,
        r if r <= 7.0 => 11,
        r if r <= 10.0 => 10,
        _ => 9,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridSummary {
    pub total_points: usize,
    pub radius_miles: f64,
    pub spacing_miles: f64,
    pub coverage_area_sq_miles: f64,
    pub zoom_level: u8,
}

/// Headline numbers for a square lattice of `grid_size × grid_size` points.
///
/// # Errors
///
/// Returns [`EngineError::MalformedUpstream`] if `grid_size` is outside
/// `1..=MAX_GRID_DIMENSION`.
pub fn grid_summary(radius_miles: f64, grid_size: u32) -> Result<GridSummary, EngineError> {
    let spec = GridSpec::new(grid_size, grid_size)?;
    let radius = effective_radius(Some(radius_miles));
    Ok(GridSummary {
        total_points: spec.total_points(),
        radius_miles: radius,
        spacing_miles: spacing_miles(radius, grid_size),
        coverage_area_sq_miles: coverage_area_sq_miles(radius),
        zoom_level: zoom_level(radius),
    })
}

pub(crate) fn decimal_to_f64(field: &'static str, value: Decimal) -> Result<f64, EngineError> {
    value
        .to_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EngineError::malformed(field, format!("{value} is not representable")))
}
