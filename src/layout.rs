use crate::error::{LayoutError, Result};
use crate::types::{Counts, Dimensions, Layout, LayoutKind, Placement, Point3, Slot, StackPolicy};

const BASE_RATIO: f64 = 0.2;
const MIN_BASE_THICKNESS: f64 = 0.03;

/// Largest full grid (before tapering) a request may ask for.
pub const MAX_PLACEMENTS: usize = 250_000;

/// Number of columns filled at `index` when `total` columns taper linearly
/// over `levels` layers, from the full base down to a single column on top.
pub fn tapered_columns(total: usize, index: usize, levels: usize) -> usize {
    if levels <= 1 {
        return total;
    }
    let shrink = total.saturating_sub(1) as u128 * index as u128 / (levels - 1) as u128;
    total.saturating_sub(shrink as usize).max(1)
}

/// Height of the pallet footing reserved below the first layer of units.
pub fn base_thickness(unit: Dimensions) -> f64 {
    (unit.height() * BASE_RATIO).max(MIN_BASE_THICKNESS)
}

// Plain floor of the quotient: 1.0 / 0.1 yields 10 columns, not the 9 that
// a remainder-based floor division gives.
fn fit_count(extent: f64, step: f64) -> usize {
    ((extent / step).floor() as usize).max(1)
}

struct UnitGrid {
    base: f64,
    counts: Counts,
}

fn unit_grid(container: Dimensions, unit: Dimensions) -> UnitGrid {
    let base = base_thickness(unit);
    let usable_height = unit.height().max(container.height() - base);
    UnitGrid {
        base,
        counts: Counts {
            x: fit_count(container.length(), unit.length()),
            y: fit_count(container.width(), unit.width()),
            z: fit_count(usable_height, unit.height()),
        },
    }
}

struct StackGrid {
    slot_x: f64,
    slot_y: f64,
    stack_capacity: usize,
    counts: Counts,
}

fn stack_grid(pallet: Dimensions, policy: StackPolicy, location: Dimensions) -> StackGrid {
    let slot_x = pallet.width() + policy.aisle_gap();
    let slot_y = pallet.length() + policy.aisle_gap();
    let stack_capacity = fit_count(location.height(), pallet.height());
    let layers = stack_capacity
        .min(usize::try_from(policy.max_stack()).unwrap_or(usize::MAX))
        .max(1);
    StackGrid {
        slot_x,
        slot_y,
        stack_capacity,
        counts: Counts {
            x: fit_count(location.width(), slot_x),
            y: fit_count(location.length(), slot_y),
            z: layers,
        },
    }
}

/// Per-axis counts a unit layout would use, without placing anything.
pub fn unit_counts(container: Dimensions, unit: Dimensions) -> Counts {
    unit_grid(container, unit).counts
}

/// Per-axis counts a stack layout would use, without placing anything.
pub fn stack_counts(pallet: Dimensions, policy: StackPolicy, location: Dimensions) -> Counts {
    stack_grid(pallet, policy, location).counts
}

/// Rejects grids whose cell count overflows or exceeds [`MAX_PLACEMENTS`].
pub fn check_capacity(counts: Counts) -> Result<usize> {
    match counts.checked_capacity() {
        Some(cells) if cells <= MAX_PLACEMENTS => Ok(cells),
        _ => Err(LayoutError::TooManyPlacements {
            grid: counts,
            limit: MAX_PLACEMENTS,
        }),
    }
}

/// [`compute_unit_layout`] behind the capacity check.
pub fn plan_unit_layout(container: Dimensions, unit: Dimensions) -> Result<Layout> {
    check_capacity(unit_counts(container, unit))?;
    Ok(compute_unit_layout(container, unit))
}

/// [`compute_stack_layout`] behind the capacity check.
pub fn plan_stack_layout(
    pallet: Dimensions,
    policy: StackPolicy,
    location: Dimensions,
) -> Result<Layout> {
    check_capacity(stack_counts(pallet, policy, location))?;
    Ok(compute_stack_layout(pallet, policy, location))
}

fn reserve(counts: Counts) -> Vec<Placement> {
    let cells = counts.checked_capacity().unwrap_or(MAX_PLACEMENTS);
    Vec::with_capacity(cells.min(MAX_PLACEMENTS))
}

/// Stacks `unit` cuboids on a single `container` (items on a pallet).
///
/// Grid size is not bounded here; untrusted input goes through
/// [`plan_unit_layout`].
pub fn compute_unit_layout(container: Dimensions, unit: Dimensions) -> Layout {
    let UnitGrid { base, counts } = unit_grid(container, unit);

    let mut placements = reserve(counts);
    for iz in 0..counts.z {
        for ix in 0..tapered_columns(counts.x, iz, counts.z) {
            for iy in 0..counts.y {
                placements.push(Placement {
                    origin: Point3::new(
                        ix as f64 * unit.length(),
                        iy as f64 * unit.width(),
                        base + iz as f64 * unit.height(),
                    ),
                    size: unit,
                    slot: Slot { x: ix, y: iy, z: iz },
                    boundary: false,
                });
            }
        }
    }

    let bounding_box = Dimensions::from_positive(
        counts.x as f64 * unit.length(),
        counts.y as f64 * unit.width(),
        base + counts.z as f64 * unit.height(),
    );

    tracing::debug!(
        container = %container,
        unit = %unit,
        grid = %counts,
        placed = placements.len(),
        "computed unit layout"
    );

    Layout {
        kind: LayoutKind::Unit,
        container,
        layers_used: layers_used(&placements),
        placements,
        counts,
        bounding_box,
        base_offset: base,
    }
}

/// Stacks `pallet`s inside a `location`, each turned 90° so the pallet width
/// runs along X, with `policy.aisle_gap` reserved after every footprint.
///
/// The top layer's last column in the first row is flagged as the boundary
/// marker and emitted after every other placement. Untrusted input goes
/// through [`plan_stack_layout`].
pub fn compute_stack_layout(
    pallet: Dimensions,
    policy: StackPolicy,
    location: Dimensions,
) -> Layout {
    let StackGrid {
        slot_x,
        slot_y,
        stack_capacity,
        counts,
    } = stack_grid(pallet, policy, location);
    let layers = counts.z;
    let size = Dimensions::from_positive(pallet.width(), pallet.length(), pallet.height());

    let mut placements = reserve(counts);
    let mut marker = None;
    for level in 0..layers {
        let cols = tapered_columns(counts.x, level, layers);
        for ix in 0..cols {
            for iy in 0..counts.y {
                let boundary = level == layers - 1 && ix == cols - 1 && iy == 0;
                let placement = Placement {
                    origin: Point3::new(
                        ix as f64 * slot_x,
                        iy as f64 * slot_y,
                        level as f64 * pallet.height(),
                    ),
                    size,
                    slot: Slot {
                        x: ix,
                        y: iy,
                        z: level,
                    },
                    boundary,
                };
                if boundary {
                    marker = Some(placement);
                } else {
                    placements.push(placement);
                }
            }
        }
    }
    placements.extend(marker);

    let bounding_box = Dimensions::from_positive(
        counts.x as f64 * slot_x,
        counts.y as f64 * slot_y,
        layers as f64 * pallet.height(),
    );

    tracing::debug!(
        pallet = %pallet,
        location = %location,
        grid = %counts,
        stack_capacity,
        placed = placements.len(),
        "computed stack layout"
    );

    Layout {
        kind: LayoutKind::Stack,
        container: location,
        layers_used: layers_used(&placements),
        placements,
        counts,
        bounding_box,
        base_offset: 0.0,
    }
}

fn layers_used(placements: &[Placement]) -> usize {
    placements.iter().map(|p| p.slot.z + 1).max().unwrap_or(0)
}
