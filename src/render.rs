use serde::Serialize;

use crate::types::{Layout, LayoutKind, Placement, Slot};

const MAX_WIDTH: f64 = 80.0;
const MAX_HEIGHT: f64 = 40.0;

pub const DEFAULT_HEIGHT_MARGIN: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

pub const FOOTING: Rgba = Rgba::new(0.7, 0.5, 0.3, 0.9);
pub const BOUNDARY: Rgba = Rgba::new(0.8, 0.2, 0.2, 0.3);

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StyledPlacement {
    #[serde(flatten)]
    pub placement: Placement,
    pub color: Rgba,
    pub draw_priority: i64,
}

/// Painter's order for overlapping cuboids: later columns, nearer rows and
/// higher layers draw on top.
pub fn draw_priority(slot: Slot) -> i64 {
    100 + slot.x as i64 - slot.y as i64 + slot.z as i64
}

pub fn layer_fraction(layer: usize, layers: usize) -> f64 {
    layer as f64 / layers.saturating_sub(1).max(1) as f64
}

pub fn color(kind: LayoutKind, placement: &Placement, layers: usize) -> Rgba {
    if placement.boundary {
        return BOUNDARY;
    }
    let t = layer_fraction(placement.slot.z, layers);
    match kind {
        LayoutKind::Unit => {
            let shade = 0.35 + 0.12 * t;
            Rgba::new(0.25, 0.6 + shade * 0.3, 0.25, 0.9)
        }
        LayoutKind::Stack => Rgba::new(0.3, 0.6 + 0.1 * t, 0.3, 0.9),
    }
}

pub fn style(layout: &Layout) -> Vec<StyledPlacement> {
    layout
        .placements
        .iter()
        .map(|p| StyledPlacement {
            placement: *p,
            color: color(layout.kind, p, layout.counts.z),
            draw_priority: draw_priority(p.slot),
        })
        .collect()
}

/// Axis limits for drawing a layout. Unit layouts are framed by their
/// occupied box with headroom on top; stack layouts by the whole location.
pub fn view_bounds(layout: &Layout, height_margin: f64) -> (f64, f64, f64) {
    match layout.kind {
        LayoutKind::Unit => {
            let bb = layout.bounding_box;
            (bb.length(), bb.width(), bb.height() * height_margin)
        }
        LayoutKind::Stack => {
            let loc = layout.container;
            (loc.width(), loc.length(), loc.height())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
    pub z: String,
}

pub fn axis_labels(layout: &Layout) -> AxisLabels {
    let c = layout.counts;
    match layout.kind {
        LayoutKind::Unit => AxisLabels {
            x: format!("Length (m): {} items", c.x),
            y: format!("Width (m): {} items", c.y),
            z: format!("Height (m): {} items", c.z),
        },
        LayoutKind::Stack => AxisLabels {
            x: format!("Width (m): {} pallets across", c.x),
            y: format!("Length (m): {} pallets across", c.y),
            z: format!("Height (m): up to {} pallets", c.z),
        },
    }
}

/// Side elevation of a layout (X across, Z up) as ASCII art.
///
/// Only the front row is drawn since every row holds the same columns.
pub fn render_elevation(layout: &Layout) -> String {
    let bb = layout.bounding_box;
    let scale = f64::min(MAX_WIDTH / bb.length(), MAX_HEIGHT / bb.height());
    let grid_w = (bb.length() * scale).round() as usize;
    let grid_h = (bb.height() * scale).round() as usize;

    if grid_w == 0 || grid_h == 0 {
        return String::new();
    }

    let mut canvas = Canvas::new(grid_w + 1, grid_h + 1);

    let footing = (layout.base_offset * scale).round() as usize;
    canvas.fill_rows_from((grid_h + 1).saturating_sub(footing), '=');

    for p in layout.placements.iter().filter(|p| p.slot.y == 0) {
        let col = (p.origin.x * scale).round() as usize;
        let w = (p.size.length() * scale).round() as usize;
        let h = (p.size.height() * scale).round() as usize;
        let row = grid_h.saturating_sub((p.top() * scale).round() as usize);

        if w == 0 || h == 0 {
            continue;
        }

        canvas.outline(col, row, w, h);
        if p.boundary {
            canvas.fill_inside(col, row, w, h, '#');
        }
    }

    canvas.into_string()
}

/// Character grid addressed by column and row from the top-left corner.
/// Writes outside the grid are dropped.
struct Canvas {
    cols: usize,
    cells: Vec<char>,
}

impl Canvas {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            cells: vec![' '; cols * rows],
        }
    }

    fn cell_mut(&mut self, col: usize, row: usize) -> Option<&mut char> {
        if col >= self.cols {
            return None;
        }
        self.cells.get_mut(row * self.cols + col)
    }

    fn fill_rows_from(&mut self, first_row: usize, ch: char) {
        let start = (first_row * self.cols).min(self.cells.len());
        self.cells[start..].fill(ch);
    }

    /// Lays an edge character down. Where a different edge already runs
    /// through the cell the two join as `+`.
    fn stroke(&mut self, col: usize, row: usize, edge: char) {
        if let Some(cell) = self.cell_mut(col, row) {
            *cell = match *cell {
                c if c == edge => edge,
                '-' | '|' | '+' => '+',
                _ => edge,
            };
        }
    }

    fn outline(&mut self, col: usize, row: usize, w: usize, h: usize) {
        for c in col..=col + w {
            self.stroke(c, row, '-');
            self.stroke(c, row + h, '-');
        }
        for r in row + 1..row + h {
            self.stroke(col, r, '|');
            self.stroke(col + w, r, '|');
        }
        for (c, r) in [(col, row), (col + w, row), (col, row + h), (col + w, row + h)] {
            if let Some(cell) = self.cell_mut(c, r) {
                *cell = '+';
            }
        }
    }

    fn fill_inside(&mut self, col: usize, row: usize, w: usize, h: usize, ch: char) {
        for r in row + 1..row + h {
            for c in col + 1..col + w {
                if let Some(cell) = self.cell_mut(c, r) {
                    *cell = ch;
                }
            }
        }
    }

    fn into_string(self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.cells.len() / self.cols.max(1));
        for row in self.cells.chunks(self.cols.max(1)) {
            let line: String = row.iter().collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{compute_stack_layout, compute_unit_layout};
    use crate::types::{Dimensions, StackPolicy};

    fn dims(l: f64, w: f64, h: f64) -> Dimensions {
        Dimensions::new(l, w, h).unwrap()
    }

    fn pallet() -> Layout {
        compute_unit_layout(dims(2.0, 1.0, 0.8), dims(0.25, 1.0, 0.25))
    }

    fn location() -> Layout {
        let policy = StackPolicy::new(2, 0.2).unwrap();
        compute_stack_layout(dims(1.0, 0.8, 0.8), policy, dims(8.0, 1.2, 2.0))
    }

    #[test]
    fn test_draw_priority() {
        assert_eq!(draw_priority(Slot { x: 0, y: 0, z: 0 }), 100);
        assert_eq!(draw_priority(Slot { x: 2, y: 5, z: 1 }), 98);
    }

    #[test]
    fn test_layer_fraction_single_layer() {
        assert_eq!(layer_fraction(0, 1), 0.0);
        assert_eq!(layer_fraction(2, 3), 1.0);
        assert_eq!(layer_fraction(1, 3), 0.5);
    }

    #[test]
    fn test_unit_colors_brighten_with_height() {
        let styled = style(&pallet());
        let bottom = styled.first().unwrap().color;
        let top = styled.last().unwrap().color;
        assert!((bottom.g - (0.6 + 0.35 * 0.3)).abs() < 1e-9);
        assert!(top.g > bottom.g);
    }

    #[test]
    fn test_boundary_marker_color() {
        let styled = style(&location());
        let marker = styled.last().unwrap();
        assert!(marker.placement.boundary);
        assert_eq!(marker.color, BOUNDARY);
        assert!(styled[..styled.len() - 1].iter().all(|s| s.color != BOUNDARY));
    }

    #[test]
    fn test_view_bounds() {
        let (x, y, z) = view_bounds(&pallet(), DEFAULT_HEIGHT_MARGIN);
        assert!((x - 2.0).abs() < 1e-9);
        assert!((y - 1.0).abs() < 1e-9);
        assert!((z - 0.96).abs() < 1e-9);

        let (x, y, z) = view_bounds(&location(), DEFAULT_HEIGHT_MARGIN);
        assert_eq!((x, y, z), (1.2, 8.0, 2.0));
    }

    #[test]
    fn test_axis_labels() {
        let labels = axis_labels(&pallet());
        assert_eq!(labels.x, "Length (m): 8 items");
        assert_eq!(labels.z, "Height (m): 3 items");

        let labels = axis_labels(&location());
        assert_eq!(labels.x, "Width (m): 1 pallets across");
        assert_eq!(labels.y, "Length (m): 6 pallets across");
        assert_eq!(labels.z, "Height (m): up to 2 pallets");
    }

    #[test]
    fn test_canvas_joins_crossing_edges() {
        let mut canvas = Canvas::new(7, 5);
        canvas.outline(0, 0, 4, 4);
        canvas.outline(2, 2, 4, 2);
        let output = canvas.into_string();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "+---+");
        assert_eq!(lines[2], "| +-+-+");
        assert_eq!(lines[4], "+-+-+-+");
    }

    #[test]
    fn test_canvas_clips_out_of_bounds() {
        let mut canvas = Canvas::new(3, 2);
        canvas.outline(1, 1, 5, 5);
        canvas.fill_inside(1, 0, 5, 5, '#');
        assert_eq!(canvas.into_string(), "\n +#\n");
    }

    #[test]
    fn test_render_pallet_elevation() {
        let output = render_elevation(&pallet());
        assert!(output.contains('+'));
        assert!(output.contains('|'));
        assert!(output.lines().last().unwrap().starts_with('='));
        assert!(!output.contains('#'));
    }

    #[test]
    fn test_render_location_marks_boundary() {
        let output = render_elevation(&location());
        assert!(output.contains('#'));
        assert!(!output.contains('='));
    }
}
