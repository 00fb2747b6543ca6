use crate::grid::Grid;
use crate::statics;
use indexmap::IndexMap;

/// An explicitly authored "match N tiles of color X" goal, as opposed
/// to the objectives derived by counting layers on the grid.
///
/// `kind` is the type string the objective was authored or loaded
/// with; the codec rewrites it to the active format's label on save.
/// `target_color` is a tile code, or `"all"` for any color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorObjective {
    pub kind: String,
    pub target_color: String,
    pub count: u32,
}

impl ColorObjective {
    pub fn any_color(count: u32) -> Self {
        Self {
            kind: statics::STD_COLOR_TYPE.to_string(),
            target_color: statics::COLOR_ALL.to_string(),
            count,
        }
    }

    pub fn of_color(target_color: impl Into<String>, count: u32) -> Self {
        Self {
            kind: statics::STD_COLOR_TYPE.to_string(),
            target_color: target_color.into(),
            count,
        }
    }
}

/// One entry of the exported objectives list, before the codec applies
/// the active format's field names and type labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportObjective {
    /// Derived by tallying a layer code across the grid.
    Counted { code: String, count: u32 },
    /// Authored in the color-objective editor.
    Color(ColorObjective),
}

/// Tallies every layer code across the grid. The map iterates in first-
/// encounter order (bottom row first), which keeps exported objective
/// order deterministic.
pub fn count_layers(grid: &Grid) -> IndexMap<String, u32> {
    let mut counts: IndexMap<String, u32> = IndexMap::new();
    for row in grid.rows() {
        for cell in row {
            for layer in &cell.layers {
                *counts.entry(layer.clone()).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Count-derived entries first, then the explicit color objectives.
pub fn build_export_objectives(
    counts: &IndexMap<String, u32>,
    colors: &[ColorObjective],
) -> Vec<ExportObjective> {
    let mut entries: Vec<ExportObjective> = counts
        .iter()
        .map(|(code, count)| ExportObjective::Counted {
            code: code.clone(),
            count: *count,
        })
        .collect();
    entries.extend(colors.iter().cloned().map(ExportObjective::Color));
    entries
}

pub fn is_color_objective_type(kind: &str) -> bool {
    statics::COLOR_OBJECTIVE_TYPES.contains(&kind)
}

/// Keeps only decoded entries whose type string is one of the
/// recognized color-objective labels. Everything else in a decoded
/// objectives list is count-derived and recomputed from the grid at
/// the next save.
pub fn reconstruct_color_objectives(
    entries: impl IntoIterator<Item = (String, String, u32)>,
) -> Vec<ColorObjective> {
    entries
        .into_iter()
        .filter(|(kind, _, _)| is_color_objective_type(kind))
        .map(|(kind, target_color, count)| ColorObjective {
            kind,
            target_color,
            count,
        })
        .collect()
}
