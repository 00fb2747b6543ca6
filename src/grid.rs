use crate::statics;
use thiserror::Error;

/// A single board cell: a base tile code plus stacked objective layers.
///
/// `base` is a tile catalog code, a special catalog code, or one of the
/// sentinels `"null"` (empty) / `"random"` (collectable placeholder).
/// `layers` is an ordered set of objective codes; their Under/Cover/
/// Collectable category lives in the catalog, never here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub base: String,
    pub layers: Vec<String>,
}

impl Cell {
    pub fn with_base(code: impl Into<String>) -> Self {
        Self {
            base: code.into(),
            layers: Vec::new(),
        }
    }

    pub fn has_layer(&self, code: &str) -> bool {
        self.layers.iter().any(|l| l == code)
    }

    /// Adds `code` unless already present (layers are a set).
    pub fn add_layer(&mut self, code: impl Into<String>) {
        let code = code.into();
        if !self.has_layer(&code) {
            self.layers.push(code);
        }
    }

    pub fn remove_layer(&mut self, code: &str) {
        self.layers.retain(|l| l != code);
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error(
        "grid dimensions must be within {min}x{min} and {max}x{max}, got {width}x{height}",
        min = statics::GRID_MIN,
        max = statics::GRID_MAX
    )]
    OutOfRange { width: u32, height: u32 },
    #[error("grid is already {width}x{height}")]
    Unchanged { width: u32, height: u32 },
}

/// Rectangular matrix of cells, indexed by (row, column); row 0 is the
/// bottom of the board. Every row holds exactly `width` cells.
///
/// `Clone` is the deep copy the history manager snapshots: all cell and
/// layer containers are owned, so clones share nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Creates a grid with every cell set to `default_code`, no layers.
    pub fn new(width: u32, height: u32, default_code: &str) -> Result<Self, GridError> {
        check_bounds(width, height)?;
        let rows = (0..height)
            .map(|_| (0..width).map(|_| Cell::with_base(default_code)).collect())
            .collect();
        Ok(Self { width, height, rows })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(col)
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row)?.get_mut(col)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.rows.iter_mut().flatten()
    }

    /// Reallocates to `width` x `height`, copying the overlapping
    /// sub-rectangle from the old grid and filling the rest with
    /// `default_code`. Rejects out-of-range and same-size calls.
    pub fn resize(&mut self, width: u32, height: u32, default_code: &str) -> Result<(), GridError> {
        check_bounds(width, height)?;
        if width == self.width && height == self.height {
            return Err(GridError::Unchanged { width, height });
        }

        let mut next = Self::new(width, height, default_code)?;
        let copy_w = self.width.min(width) as usize;
        let copy_h = self.height.min(height) as usize;
        for row in 0..copy_h {
            for col in 0..copy_w {
                next.rows[row][col] = self.rows[row][col].clone();
            }
        }
        *self = next;
        Ok(())
    }
}

fn check_bounds(width: u32, height: u32) -> Result<(), GridError> {
    let in_range = |v: u32| (statics::GRID_MIN..=statics::GRID_MAX).contains(&v);
    if in_range(width) && in_range(height) {
        Ok(())
    } else {
        Err(GridError::OutOfRange { width, height })
    }
}
