//! Grid layout of bit cells, duplicate-value pairings and logical colors.
//!
//! Rows stack top to bottom in input order with the result row appended as
//! row `N`. The grid shrinks to fit the canvas: cell spacing and row height
//! are upper-bounded by the canvas configuration and reduced when the
//! available space is smaller.

use serde::Serialize;

use super::binary::{to_binary, truncate_low_bits};
use super::validation::{InvariantViolation, Singleton, count_values, validate};
use super::xor::XorSteps;
use crate::schema::{CanvasConfig, FULL_BIT_WIDTH, InputArray};

/// Number of distinct value colors before the palette wraps.
pub const PALETTE_SIZE: usize = 10;

/// Logical color assignment. The concrete theme is chosen by the renderer surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "role", content = "slot", rename_all = "snake_case")]
pub enum ColorRole {
    /// Palette slot of an input value; equal values share a slot.
    Value(u8),
    /// The result row and meteors landing on it.
    Result,
    /// Changed-bit boxes and the singleton marker.
    Highlight,
}

/// Which row of the grid a cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "index", rename_all = "snake_case")]
pub enum RowKind {
    Input(usize),
    Result,
}

/// A single binary digit placed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BitCell {
    /// Grid row: `0..N` for input rows, `N` for the result row.
    pub row: usize,
    /// Column counted from the most significant displayed bit.
    pub bit: usize,
    pub digit: u8,
    /// Cell centre.
    pub x: f32,
    pub y: f32,
}

/// Shrink-to-fit grid geometry for a given bit width and row count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridGeometry {
    pub bit_width: usize,
    pub row_count: usize,
    pub cell_spacing: f32,
    pub row_height: f32,
    pub row_gap: f32,
    /// Centre x of bit column 0.
    pub start_x: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
}

impl GridGeometry {
    pub fn fit(canvas: &CanvasConfig, bit_width: usize, row_count: usize) -> Self {
        let bit_width = bit_width.max(1);
        let row_count = row_count.max(1);

        let content_width = canvas.content_width();
        let cell_spacing = canvas
            .max_digit_width
            .min(content_width / bit_width as f32);
        let start_x = canvas.label_width
            + (content_width - cell_spacing * bit_width as f32) / 2.0
            + cell_spacing / 2.0;

        let slot = canvas.height / row_count as f32;
        let row_gap = canvas.row_gap.min(slot / 2.0);
        let row_height = canvas.max_row_height.min(slot - row_gap);

        Self {
            bit_width,
            row_count,
            cell_spacing,
            row_height,
            row_gap,
            start_x,
            canvas_width: canvas.width,
            canvas_height: canvas.height,
        }
    }

    #[inline]
    pub fn cell_x(&self, bit: usize) -> f32 {
        self.start_x + bit as f32 * self.cell_spacing
    }

    #[inline]
    pub fn row_center_y(&self, row: usize) -> f32 {
        row as f32 * (self.row_height + self.row_gap) + self.row_height / 2.0
    }

    /// Total height used by all rows.
    #[inline]
    pub fn grid_height(&self) -> f32 {
        self.row_count as f32 * (self.row_height + self.row_gap)
    }

    /// Left edge of bit column 0.
    #[inline]
    pub fn grid_left(&self) -> f32 {
        self.start_x - self.cell_spacing / 2.0
    }

    /// Right edge of the last bit column.
    #[inline]
    pub fn grid_right(&self) -> f32 {
        self.cell_x(self.bit_width - 1) + self.cell_spacing / 2.0
    }

    /// Place the digits of `binary` on grid row `row`.
    pub fn cells(&self, row: usize, binary: &str) -> Vec<BitCell> {
        let y = self.row_center_y(row);
        binary
            .bytes()
            .enumerate()
            .map(|(bit, b)| BitCell {
                row,
                bit,
                digit: b - b'0',
                x: self.cell_x(bit),
                y,
            })
            .collect()
    }
}

/// One laid-out row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowLayout {
    pub kind: RowKind,
    pub value: u32,
    pub binary: String,
    pub color: ColorRole,
    pub center_y: f32,
    pub cells: Vec<BitCell>,
}

/// Grid for every input row plus the result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub geometry: GridGeometry,
    pub rows: Vec<RowLayout>,
    pub result_row: RowLayout,
}

impl Layout {
    pub fn compute(input: &[u32], steps: &XorSteps, canvas: &CanvasConfig) -> Self {
        let result = steps.final_result();
        let min_width = if canvas.full_width { FULL_BIT_WIDTH } else { 1 };
        let result_binary = to_binary(result, min_width);
        let bit_width = compute_max_bit_width(input, &result_binary, min_width);
        let geometry = GridGeometry::fit(canvas, bit_width, input.len() + 1);

        let rows = layout_rows(input, bit_width, &geometry);
        let result_binary = row_binary(result, bit_width);
        let result_row = RowLayout {
            kind: RowKind::Result,
            value: result,
            center_y: geometry.row_center_y(input.len()),
            cells: geometry.cells(input.len(), &result_binary),
            binary: result_binary,
            color: ColorRole::Result,
        };

        Self {
            geometry,
            rows,
            result_row,
        }
    }

    /// Cell at `bit` of input row `row`.
    pub fn cell(&self, row: usize, bit: usize) -> Option<&BitCell> {
        self.rows.get(row)?.cells.get(bit)
    }
}

/// Widest row after capping at 32 columns, never less than 1.
pub fn compute_max_bit_width(input: &[u32], result_binary: &str, min_width: usize) -> usize {
    input
        .iter()
        .map(|&v| to_binary(v, min_width).len())
        .chain(std::iter::once(result_binary.len()))
        .map(|len| len.min(FULL_BIT_WIDTH))
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Binary digits of `value` padded to `bit_width`, keeping the low-order
/// bits when the natural width exceeds the display cap.
pub fn row_binary(value: u32, bit_width: usize) -> String {
    let binary = to_binary(value, bit_width);
    truncate_low_bits(&binary, bit_width.min(FULL_BIT_WIDTH)).to_string()
}

/// Palette slot for every row: equal values share a slot, assigned in
/// order of first appearance.
pub fn row_colors(input: &[u32]) -> Vec<ColorRole> {
    let mut colors = vec![ColorRole::Value(0); input.len()];
    for (slot, group) in count_values(input).iter().enumerate() {
        for &row in &group.rows {
            colors[row] = ColorRole::Value((slot % PALETTE_SIZE) as u8);
        }
    }
    colors
}

/// Lay out every input row with the given width and geometry.
pub fn layout_rows(input: &[u32], bit_width: usize, geometry: &GridGeometry) -> Vec<RowLayout> {
    let colors = row_colors(input);
    input
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(row, (&value, color))| {
            let binary = row_binary(value, bit_width);
            RowLayout {
                kind: RowKind::Input(row),
                value,
                center_y: geometry.row_center_y(row),
                cells: geometry.cells(row, &binary),
                binary,
                color,
            }
        })
        .collect()
}

/// Link between the two rows holding an equal, cancelling value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairingEdge {
    /// Earlier row.
    pub row_a: usize,
    /// Later row.
    pub row_b: usize,
    pub value: u32,
}

/// Pairing of duplicate rows for a valid input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pairings {
    /// One edge per paired value, ordered by the value's first row.
    pub edges: Vec<PairingEdge>,
    pub singleton: Singleton,
}

impl Pairings {
    #[inline]
    pub fn is_singleton_row(&self, row: usize) -> bool {
        self.singleton.index == row
    }

    /// Edge touching `row`, if any.
    pub fn edge_for_row(&self, row: usize) -> Option<&PairingEdge> {
        self.edges.iter().find(|e| e.row_a == row || e.row_b == row)
    }
}

/// Pair up duplicate rows. Re-validates the input so that pairings are
/// never produced for an array violating the singleton invariant.
pub fn compute_pairings(input: &[u32]) -> Result<Pairings, InvariantViolation> {
    let singleton = validate(input)?;
    let edges = count_values(input)
        .into_iter()
        .filter(|c| c.count == 2)
        .map(|c| PairingEdge {
            row_a: c.rows[0],
            row_b: c.rows[1],
            value: c.value,
        })
        .collect();

    Ok(Pairings { edges, singleton })
}

/// Everything derived from an input array for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Analysis {
    Valid { layout: Layout, pairings: Pairings },
    Invalid { violation: InvariantViolation },
}

impl Analysis {
    /// Validate and, only when valid, lay out the grid.
    pub fn derive(input: &InputArray, steps: &XorSteps, canvas: &CanvasConfig) -> Self {
        match compute_pairings(input) {
            Ok(pairings) => Analysis::Valid {
                layout: Layout::compute(input, steps, canvas),
                pairings,
            },
            Err(violation) => {
                log::debug!("Input {:?} is not a single-number array: {violation}", input.values());
                Analysis::Invalid { violation }
            }
        }
    }

    /// Recompute only the grid after a canvas change.
    pub fn relayout(&mut self, input: &InputArray, steps: &XorSteps, canvas: &CanvasConfig) {
        if let Analysis::Valid { layout, .. } = self {
            *layout = Layout::compute(input, steps, canvas);
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Analysis::Valid { .. })
    }

    pub fn layout(&self) -> Option<&Layout> {
        match self {
            Analysis::Valid { layout, .. } => Some(layout),
            Analysis::Invalid { .. } => None,
        }
    }
}
