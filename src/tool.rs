use crate::statics;

/// The mutually-exclusive editing tool. Exactly one is active at a
/// time; selecting a tool replaces the whole state rather than
/// combining flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolState {
    /// Paint a base tile color.
    Color(String),
    /// Reset a cell to the remembered color (or the fixed fallback).
    Eraser,
    /// Clear a cell down to the `"null"` sentinel.
    EmptyTile,
    /// Place a special (non-color) tile.
    Special(String),
    /// Toggle an Under/Cover objective layer.
    Objective(String),
    /// Place a collectable on a `"random"` placeholder base.
    Collectable(String),
    RowFill,
    ColumnFill,
    RectangleFill,
    /// Edit the explicit color-objective list; no cell effect.
    ColorObjectiveEditor,
}

/// Active tool plus the last color selection, which the eraser and the
/// fill tools keep painting with after the user switches tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSelection {
    active: ToolState,
    remembered_color: Option<String>,
}

impl Default for ToolSelection {
    fn default() -> Self {
        Self {
            active: ToolState::Eraser,
            remembered_color: None,
        }
    }
}

impl ToolSelection {
    /// Replaces the active tool. A color selection also updates the
    /// remembered color; nothing else ever clears it.
    pub fn select(&mut self, tool: ToolState) {
        if let ToolState::Color(code) = &tool {
            self.remembered_color = Some(code.clone());
        }
        self.active = tool;
    }

    pub fn active(&self) -> &ToolState {
        &self.active
    }

    pub fn remembered_color(&self) -> Option<&str> {
        self.remembered_color.as_deref()
    }

    /// The color the eraser and fill tools paint with.
    pub fn paint_color(&self) -> &str {
        self.remembered_color.as_deref().unwrap_or(statics::FALLBACK_TILE)
    }
}
