use crate::catalog::Catalog;
use crate::format::LevelFormat;
use crate::grid::{Grid, GridError};
use crate::history::History;
use crate::level::{Level, LoadedLevel};
use crate::objective::ColorObjective;
use crate::placement::{self, PlaceError};
use crate::tool::{ToolSelection, ToolState};
use anyhow::bail;
use std::path::Path;

/// One editing session: the loaded level, the active tool, and the
/// undo/redo history. All operations run to completion on the calling
/// thread; the UI drives this object one event at a time.
#[derive(Debug)]
pub struct EditorSession {
    pub doc: LoadedLevel,
    pub tools: ToolSelection,
    history: History,
    /// First corner of an in-progress rectangle fill.
    pending_corner: Option<(usize, usize)>,
}

impl EditorSession {
    pub fn new(level: Level) -> Self {
        Self {
            doc: LoadedLevel::unsaved(level),
            tools: ToolSelection::default(),
            history: History::default(),
            pending_corner: None,
        }
    }

    /// Starts a fresh level, discarding history (snapshots never
    /// survive a grid-identity change).
    pub fn new_level(&mut self, level: Level) {
        self.doc = LoadedLevel::unsaved(level);
        self.history.reset();
        self.pending_corner = None;
    }

    /// Loads from disk with auto-detection. The decode completes
    /// before any live state is replaced, so a malformed file leaves
    /// the current level untouched.
    pub fn load(&mut self, path: &Path, catalog: &Catalog) -> anyhow::Result<()> {
        let loaded = LoadedLevel::load_path(path, catalog)?;
        self.doc = loaded;
        self.history.reset();
        self.pending_corner = None;
        Ok(())
    }

    /// Saves to the path the level was loaded from, in its own format.
    pub fn save(&mut self, catalog: &Catalog) -> anyhow::Result<()> {
        let Some(path) = self.doc.source_path.clone() else {
            bail!("level has no source path; use save_as");
        };
        let format = self.doc.format;
        self.doc.save_to_path(&path, format, catalog)
    }

    pub fn save_as(
        &mut self,
        path: &Path,
        format: LevelFormat,
        catalog: &Catalog,
    ) -> anyhow::Result<()> {
        self.doc.save_to_path(path, format, catalog)
    }

    /// Applies the active tool at one cell. Single-cell tools surface
    /// rejections to the caller; the fill tools route to the silent
    /// fill drivers (a rectangle fill arms on the first click and
    /// fires on the second). Returns whether the grid changed.
    pub fn click_cell(
        &mut self,
        row: usize,
        col: usize,
        catalog: &Catalog,
    ) -> Result<bool, PlaceError> {
        match self.tools.active().clone() {
            ToolState::RowFill => Ok(self.fill_row(row, catalog) > 0),
            ToolState::ColumnFill => Ok(self.fill_column(col, catalog) > 0),
            ToolState::RectangleFill => match self.pending_corner.take() {
                Some(corner) => Ok(self.fill_rect(corner, (row, col), catalog) > 0),
                None => {
                    self.pending_corner = Some((row, col));
                    Ok(false)
                }
            },
            ToolState::ColorObjectiveEditor => Ok(false),
            _ => {
                let snapshot = self.doc.level.grid.clone();
                let Some(cell) = self.doc.level.grid.cell_mut(row, col) else {
                    return Ok(false);
                };
                let changed = placement::apply_tool(cell, &self.tools, catalog)?;
                if changed {
                    self.history.record(&snapshot);
                    self.doc.mark_dirty();
                }
                Ok(changed)
            }
        }
    }

    pub fn fill_row(&mut self, row: usize, catalog: &Catalog) -> usize {
        let snapshot = self.doc.level.grid.clone();
        let changed = placement::fill_row(&mut self.doc.level.grid, row, &self.tools, catalog);
        self.commit_fill(snapshot, changed);
        changed
    }

    pub fn fill_column(&mut self, col: usize, catalog: &Catalog) -> usize {
        let snapshot = self.doc.level.grid.clone();
        let changed = placement::fill_column(&mut self.doc.level.grid, col, &self.tools, catalog);
        self.commit_fill(snapshot, changed);
        changed
    }

    pub fn fill_rect(
        &mut self,
        a: (usize, usize),
        b: (usize, usize),
        catalog: &Catalog,
    ) -> usize {
        let snapshot = self.doc.level.grid.clone();
        let changed = placement::fill_rect(&mut self.doc.level.grid, a, b, &self.tools, catalog);
        self.commit_fill(snapshot, changed);
        changed
    }

    fn commit_fill(&mut self, snapshot: Grid, changed: usize) {
        if changed > 0 {
            self.history.record(&snapshot);
            self.doc.mark_dirty();
        }
    }

    /// Bounds-checked resize, snapshot-guarded. New territory fills
    /// with the remembered color (or the fixed fallback).
    pub fn resize_grid(&mut self, width: u32, height: u32) -> Result<(), GridError> {
        let snapshot = self.doc.level.grid.clone();
        let default = self.tools.paint_color().to_string();
        self.doc.level.grid.resize(width, height, &default)?;
        self.history.record(&snapshot);
        self.doc.mark_dirty();
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.doc.level.grid) {
            Some(grid) => {
                self.doc.level.grid = grid;
                self.doc.mark_dirty();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.doc.level.grid) {
            Some(grid) => {
                self.doc.level.grid = grid;
                self.doc.mark_dirty();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // Color-objective editing (the ColorObjectiveEditor tool's model).

    pub fn add_color_objective(&mut self, objective: ColorObjective) {
        self.doc.level.color_objectives.push(objective);
        self.doc.mark_dirty();
    }

    pub fn update_color_objective(&mut self, index: usize, objective: ColorObjective) -> bool {
        match self.doc.level.color_objectives.get_mut(index) {
            Some(slot) => {
                *slot = objective;
                self.doc.mark_dirty();
                true
            }
            None => false,
        }
    }

    pub fn remove_color_objective(&mut self, index: usize) -> Option<ColorObjective> {
        if index >= self.doc.level.color_objectives.len() {
            return None;
        }
        self.doc.mark_dirty();
        Some(self.doc.level.color_objectives.remove(index))
    }
}
