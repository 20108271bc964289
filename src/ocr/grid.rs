use serde::{Serialize, Deserialize};

use crate::error::{NetError, Result};

/// Square grid of on/off cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    size: usize,
    cells: Vec<bool>,
}

/// Unchecked on-disk form of a `Grid`.
#[derive(Deserialize)]
struct RawGrid {
    size: usize,
    cells: Vec<bool>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = NetError;

    fn try_from(raw: RawGrid) -> Result<Grid> {
        if raw.cells.len() != raw.size * raw.size {
            return Err(NetError::MalformedGrid(format!(
                "{} cells stored for a {}x{} grid", raw.cells.len(), raw.size, raw.size
            )));
        }
        Ok(Grid { size: raw.size, cells: raw.cells })
    }
}

impl Grid {
    /// An empty `size × size` grid.
    pub fn new(size: usize) -> Grid {
        Grid {
            size,
            cells: vec![false; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Result<bool> {
        Ok(self.cells[self.index(row, col)?])
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) -> Result<()> {
        let index = self.index(row, col)?;
        self.cells[index] = value;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = false);
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Parses rows of `#` (set) and `.` (clear). Blank lines are ignored;
    /// the result must be square.
    pub fn from_text(text: &str) -> Result<Grid> {
        let rows: Vec<&str> = text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let size = rows.len();
        let mut grid = Grid::new(size);

        for (row, line) in rows.iter().enumerate() {
            let width = line.chars().count();
            if width != size {
                return Err(NetError::MalformedGrid(format!(
                    "row {} has {} cells, expected {}", row, width, size
                )));
            }
            for (col, ch) in line.chars().enumerate() {
                let value = match ch {
                    '#' => true,
                    '.' => false,
                    other => {
                        return Err(NetError::MalformedGrid(format!(
                            "unexpected character {:?} at row {}, column {}", other, row, col
                        )))
                    }
                };
                grid.set(row, col, value)?;
            }
        }
        Ok(grid)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.size * (self.size + 1));
        for row in self.cells.chunks(self.size.max(1)) {
            out.extend(row.iter().map(|&c| if c { '#' } else { '.' }));
            out.push('\n');
        }
        out
    }

    /// Decodes image bytes (PNG/JPEG/BMP/GIF), resizes to `size × size`,
    /// converts to grayscale and sets every cell darker than `threshold`
    /// (in [0, 1]).
    pub fn from_image_bytes(bytes: &[u8], size: usize, threshold: f64) -> Result<Grid> {
        let img = image::load_from_memory(bytes)?;
        let side = size as u32;
        let gray = img
            .resize_exact(side, side, image::imageops::FilterType::Triangle)
            .to_luma8();

        let cells = gray.pixels()
            .map(|p| (p.0[0] as f64 / 255.0) < threshold)
            .collect();
        Ok(Grid { size, cells })
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.size {
            return Err(NetError::IndexOutOfRange { context: "Grid row", index: row, limit: self.size });
        }
        if col >= self.size {
            return Err(NetError::IndexOutOfRange { context: "Grid column", index: col, limit: self.size });
        }
        Ok(row * self.size + col)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new(super::GRID_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_and_clear() {
        let mut grid = Grid::new(3);
        grid.set(1, 2, true).unwrap();
        assert!(grid.get(1, 2).unwrap());
        assert!(!grid.get(2, 1).unwrap());
        grid.clear();
        assert!(grid.cells().iter().all(|&c| !c));
    }

    #[test]
    fn out_of_range_coordinates_fail() {
        let mut grid = Grid::new(4);
        assert!(matches!(grid.get(4, 0), Err(NetError::IndexOutOfRange { index: 4, limit: 4, .. })));
        assert!(matches!(grid.set(0, 9, true), Err(NetError::IndexOutOfRange { index: 9, .. })));
    }

    #[test]
    fn text_round_trip() {
        let text = "#..\n.#.\n..#\n";
        let grid = Grid::from_text(text).unwrap();
        assert_eq!(grid.size(), 3);
        assert!(grid.get(2, 2).unwrap());
        assert_eq!(grid.to_text(), text);
    }

    #[test]
    fn text_must_be_square_and_well_formed() {
        assert!(matches!(Grid::from_text("##\n#\n"), Err(NetError::MalformedGrid(_))));
        assert!(matches!(Grid::from_text("#x\n..\n"), Err(NetError::MalformedGrid(_))));
    }

    #[test]
    fn dark_pixels_become_set_cells() {
        let mut img = image::GrayImage::from_pixel(8, 8, image::Luma([255u8]));
        for i in 0..8 {
            img.put_pixel(i, i, image::Luma([0u8]));
        }
        let mut bytes = Vec::new();
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .unwrap();

        let grid = Grid::from_image_bytes(&bytes, 8, 0.5).unwrap();
        for r in 0..8 {
            for c in 0..8 {
                assert_eq!(grid.get(r, c).unwrap(), r == c);
            }
        }
    }

    #[test]
    fn json_cell_count_must_match_size() {
        let grid: Grid = serde_json::from_str(r#"{ "size": 2, "cells": [true, false, false, true] }"#).unwrap();
        assert!(grid.get(1, 1).unwrap());

        let err = serde_json::from_str::<Grid>(r#"{ "size": 8, "cells": [true, false] }"#).unwrap_err();
        assert!(err.to_string().contains("2 cells stored for a 8x8 grid"));
    }

    #[test]
    fn undecodable_image_is_an_error() {
        assert!(matches!(Grid::from_image_bytes(b"nope", 8, 0.5), Err(NetError::Image(_))));
    }
}
