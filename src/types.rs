use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Axis-aligned cuboid extent in meters.
///
/// Every component is positive and finite. The only way to build one is
/// [`Dimensions::new`] (or deserializing a `[l, w, h]` array, which goes
/// through the same check), so the layout functions never see a zero divisor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct Dimensions {
    length: f64,
    width: f64,
    height: f64,
}

impl Dimensions {
    pub fn new(length: f64, width: f64, height: f64) -> Result<Self> {
        Ok(Self {
            length: positive("length", length)?,
            width: positive("width", width)?,
            height: positive("height", height)?,
        })
    }

    /// Caller guarantees every component is positive and finite.
    pub(crate) fn from_positive(length: f64, width: f64, height: f64) -> Self {
        debug_assert!(length > 0.0 && width > 0.0 && height > 0.0);
        Self {
            length,
            width,
            height,
        }
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    pub fn footprint(&self) -> f64 {
        self.length * self.width
    }
}

fn positive(axis: &'static str, value: f64) -> Result<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(LayoutError::InvalidDimension { axis, value })
    }
}

impl TryFrom<[f64; 3]> for Dimensions {
    type Error = LayoutError;

    fn try_from([length, width, height]: [f64; 3]) -> Result<Self> {
        Self::new(length, width, height)
    }
}

impl From<Dimensions> for [f64; 3] {
    fn from(d: Dimensions) -> Self {
        [d.length, d.width, d.height]
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.length, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Grid index of a placement: column, row, layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Slot {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub origin: Point3,
    pub size: Dimensions,
    pub slot: Slot,
    /// Marks the unit sitting on the capacity edge of the location.
    pub boundary: bool,
}

impl Placement {
    pub fn top(&self) -> f64 {
        self.origin.z + self.size.height()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Counts {
    /// Cells in the full grid, or `None` if the product overflows `usize`.
    pub fn checked_capacity(&self) -> Option<usize> {
        self.x.checked_mul(self.y)?.checked_mul(self.z)
    }
}

impl std::fmt::Display for Counts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// Units stacked on a single container (items on a pallet).
    Unit,
    /// Containers stacked inside a location (pallets in a bay).
    Stack,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub kind: LayoutKind,
    pub container: Dimensions,
    pub placements: Vec<Placement>,
    pub counts: Counts,
    pub bounding_box: Dimensions,
    pub base_offset: f64,
    pub layers_used: usize,
}

impl Layout {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn boundary_marker(&self) -> Option<&Placement> {
        self.placements.iter().find(|p| p.boundary)
    }

    pub fn columns_in_layer(&self, layer: usize) -> usize {
        self.placements
            .iter()
            .filter(|p| p.slot.z == layer)
            .map(|p| p.slot.x + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn fill_ratio(&self) -> f64 {
        let placed: f64 = self.placements.iter().map(|p| p.size.volume()).sum();
        placed / self.container.volume()
    }
}

/// Stacking rules for pallets inside a location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackPolicy {
    max_stack: u32,
    aisle_gap: f64,
}

impl StackPolicy {
    /// `max_stack` of zero is accepted; the layout never goes below one layer.
    pub fn new(max_stack: u32, aisle_gap: f64) -> Result<Self> {
        if !(aisle_gap >= 0.0 && aisle_gap.is_finite()) {
            return Err(LayoutError::InvalidGap(aisle_gap));
        }
        Ok(Self {
            max_stack,
            aisle_gap,
        })
    }

    pub fn max_stack(&self) -> u32 {
        self.max_stack
    }

    pub fn aisle_gap(&self) -> f64 {
        self.aisle_gap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_degenerate_dimensions() {
        assert!(Dimensions::new(1.0, 1.0, 1.0).is_ok());
        assert!(Dimensions::new(0.0, 1.0, 1.0).is_err());
        assert!(Dimensions::new(1.0, -0.5, 1.0).is_err());
        assert!(Dimensions::new(1.0, 1.0, f64::NAN).is_err());
        assert!(Dimensions::new(f64::INFINITY, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_error_names_axis() {
        let err = Dimensions::new(1.0, 0.0, 1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "width must be a positive finite number, got 0"
        );
    }

    #[test]
    fn test_serde_array_form() {
        let d: Dimensions = serde_json::from_str("[2.0, 1.0, 0.8]").unwrap();
        assert_eq!(d, Dimensions::new(2.0, 1.0, 0.8).unwrap());
        assert_eq!(serde_json::to_string(&d).unwrap(), "[2.0,1.0,0.8]");
        assert!(serde_json::from_str::<Dimensions>("[2.0, 0.0, 0.8]").is_err());
    }

    #[test]
    fn test_volume_and_footprint() {
        let d = Dimensions::new(2.0, 1.5, 0.5).unwrap();
        assert!((d.volume() - 1.5).abs() < 1e-12);
        assert!((d.footprint() - 3.0).abs() < 1e-12);
        assert_eq!(d.to_string(), "2x1.5x0.5");
    }

    #[test]
    fn test_checked_capacity() {
        let small = Counts { x: 8, y: 1, z: 3 };
        assert_eq!(small.checked_capacity(), Some(24));
        assert_eq!(small.to_string(), "8x1x3");

        let huge = Counts {
            x: usize::MAX / 2,
            y: 3,
            z: 1,
        };
        assert_eq!(huge.checked_capacity(), None);
    }

    #[test]
    fn test_stack_policy_gap() {
        assert!(StackPolicy::new(2, 0.0).is_ok());
        assert!(StackPolicy::new(0, 0.2).is_ok());
        assert!(StackPolicy::new(2, -0.1).is_err());
        assert!(StackPolicy::new(2, f64::NAN).is_err());
    }
}
