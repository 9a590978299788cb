use crate::energy_matrix::EnergyMatrix;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Fill for cells with no record. A flat neutral gray, deliberately outside
/// the blue-white-red scale so "missing" never reads as "zero energy".
pub const MISSING_FILL: [u8; 3] = [148, 148, 148];

const CELL: u32 = 24;
const GUTTER_LEFT: u32 = 60;
const GUTTER_TOP: u32 = 40;
const GRID_LINE: [u8; 3] = [210, 210, 210];
const GUTTER_FILL: [u8; 3] = [240, 240, 240];
const TICK: [u8; 3] = [90, 90, 90];

/// Software heatmap renderer over one energy matrix.
///
/// Rows are residues, columns are mutants. Besides producing the raster it
/// answers pixel-to-cell hit tests, which is the click-event seam the
/// orchestration layer uses: a click yields (row label, column label) and
/// from there the resolver takes over.
#[derive(Clone, Debug, Default)]
pub struct HeatmapRenderer;

/// Diverging blue-white-red color for one energy, symmetric around zero.
fn energy_color(energy: f64, magnitude: f64) -> [u8; 3] {
    let t = (energy / magnitude).clamp(-1.0, 1.0);
    let ramp = |x: f64| (255.0 - x.abs() * 200.0).round() as u8;
    if t < 0.0 {
        // Favourable energies toward blue.
        [ramp(t), ramp(t), 255]
    } else {
        [255, ramp(t), ramp(t)]
    }
}

impl HeatmapRenderer {
    pub fn image_size(matrix: &EnergyMatrix) -> (u32, u32) {
        (
            GUTTER_LEFT + CELL * matrix.column_labels.len() as u32,
            GUTTER_TOP + CELL * matrix.row_labels.len() as u32,
        )
    }

    /// Render the matrix. An empty matrix renders to its bare gutters, so
    /// selecting a zero-entry table still produces a drawable image.
    pub fn render(matrix: &EnergyMatrix) -> RgbaImage {
        let (width, height) = Self::image_size(matrix);
        let mut img = RgbaImage::from_pixel(width.max(1), height.max(1), Rgba([255, 255, 255, 255]));

        for x in 0..width.max(1) {
            for y in 0..GUTTER_TOP.min(height) {
                img.put_pixel(x, y, Rgba([GUTTER_FILL[0], GUTTER_FILL[1], GUTTER_FILL[2], 255]));
            }
        }
        for y in 0..height.max(1) {
            for x in 0..GUTTER_LEFT.min(width) {
                img.put_pixel(x, y, Rgba([GUTTER_FILL[0], GUTTER_FILL[1], GUTTER_FILL[2], 255]));
            }
        }

        let magnitude = matrix
            .energy_range()
            .map(|(lo, hi)| lo.abs().max(hi.abs()))
            .filter(|m| *m > 0.0)
            .unwrap_or(1.0);

        for (row, row_values) in matrix.grid.iter().enumerate() {
            for (col, value) in row_values.iter().enumerate() {
                let [r, g, b] = match value {
                    Some(energy) => energy_color(*energy, magnitude),
                    None => MISSING_FILL,
                };
                let x0 = GUTTER_LEFT + col as u32 * CELL;
                let y0 = GUTTER_TOP + row as u32 * CELL;
                for x in x0..x0 + CELL {
                    for y in y0..y0 + CELL {
                        let on_border = x == x0 || y == y0;
                        let [gr, gg, gb] = if on_border { GRID_LINE } else { [r, g, b] };
                        img.put_pixel(x, y, Rgba([gr, gg, gb, 255]));
                    }
                }
            }
        }

        // Tick marks aligned with each row and column in the gutters.
        for col in 0..matrix.column_labels.len() as u32 {
            let x = GUTTER_LEFT + col * CELL + CELL / 2;
            for y in GUTTER_TOP.saturating_sub(8)..GUTTER_TOP {
                img.put_pixel(x, y, Rgba([TICK[0], TICK[1], TICK[2], 255]));
            }
        }
        for row in 0..matrix.row_labels.len() as u32 {
            let y = GUTTER_TOP + row * CELL + CELL / 2;
            for x in GUTTER_LEFT.saturating_sub(8)..GUTTER_LEFT {
                img.put_pixel(x, y, Rgba([TICK[0], TICK[1], TICK[2], 255]));
            }
        }

        img
    }

    /// Invert the layout: which cell does a pixel fall in, if any.
    pub fn cell_at(matrix: &EnergyMatrix, x: u32, y: u32) -> Option<(usize, usize)> {
        if x < GUTTER_LEFT || y < GUTTER_TOP {
            return None;
        }
        let col = ((x - GUTTER_LEFT) / CELL) as usize;
        let row = ((y - GUTTER_TOP) / CELL) as usize;
        if row < matrix.row_labels.len() && col < matrix.column_labels.len() {
            Some((row, col))
        } else {
            None
        }
    }

    pub fn png_bytes(matrix: &EnergyMatrix) -> Result<Vec<u8>, String> {
        let mut bytes = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(Self::render(matrix))
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(|e| format!("Could not encode heatmap: {e}"))?;
        Ok(bytes.into_inner())
    }
}
