use crate::catalog::{Catalog, ObjectiveKind};
use crate::grid::{Cell, Grid};
use crate::statics;
use crate::tool::{ToolSelection, ToolState};
use thiserror::Error;

/// A rejected placement attempt. The target cell is left unmodified;
/// nothing propagates past the single attempt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaceError {
    #[error("cell holds a collectable; recolor is not allowed")]
    CollectableOccupied,
    #[error("tile code {0:?} is not in the catalog")]
    UnknownTile(String),
    #[error("special code {0:?} is not in the catalog")]
    UnknownSpecial(String),
    #[error("objective code {0:?} is not in the catalog")]
    UnknownObjective(String),
}

/// Applies the active tool to one cell. Returns whether the cell
/// changed; a `PlaceError` means the cell was left untouched and the
/// rejection should be surfaced to the user.
///
/// The fill and color-objective tools have no per-cell effect here;
/// fills go through [`fill_row`], [`fill_column`], and [`fill_rect`].
pub fn apply_tool(
    cell: &mut Cell,
    tools: &ToolSelection,
    catalog: &Catalog,
) -> Result<bool, PlaceError> {
    let before = cell.clone();
    match tools.active() {
        ToolState::Color(code) => paint_color(cell, code, catalog)?,
        ToolState::Eraser => {
            cell.base = tools.paint_color().to_string();
            cell.layers.clear();
        }
        ToolState::EmptyTile => {
            cell.base = statics::CODE_NULL.to_string();
            cell.layers.clear();
        }
        ToolState::Special(code) => {
            if catalog.special(code).is_none() {
                return Err(PlaceError::UnknownSpecial(code.clone()));
            }
            cell.base = code.clone();
            retain_under(cell, catalog);
        }
        ToolState::Objective(code) => {
            let Some(kind) = catalog.objective_kind(code) else {
                return Err(PlaceError::UnknownObjective(code.clone()));
            };
            // Unreachable through normal tool selection (collectables
            // route through the Collectable tool), but guarded anyway.
            if !matches!(kind, ObjectiveKind::Under | ObjectiveKind::Cover)
                && has_collectable(cell, catalog)
            {
                return Err(PlaceError::CollectableOccupied);
            }
            if cell.has_layer(code) {
                cell.remove_layer(code);
            } else {
                cell.add_layer(code.clone());
            }
        }
        ToolState::Collectable(code) => {
            if catalog.objective(code).is_none() {
                return Err(PlaceError::UnknownObjective(code.clone()));
            }
            cell.base = statics::CODE_RANDOM.to_string();
            if cell.has_layer(code) {
                cell.remove_layer(code);
            } else {
                let keep: Vec<String> = cell
                    .layers
                    .iter()
                    .filter(|l| catalog.objective_kind(l) != Some(ObjectiveKind::Collectable))
                    .cloned()
                    .collect();
                cell.layers = keep;
                cell.add_layer(code.clone());
            }
        }
        ToolState::RowFill
        | ToolState::ColumnFill
        | ToolState::RectangleFill
        | ToolState::ColorObjectiveEditor => {}
    }
    Ok(*cell != before)
}

/// The Color-tool rule: reject if a collectable layer is present, else
/// set the base and drop every non-Under layer.
fn paint_color(cell: &mut Cell, code: &str, catalog: &Catalog) -> Result<(), PlaceError> {
    if catalog.tile(code).is_none() {
        return Err(PlaceError::UnknownTile(code.to_string()));
    }
    if has_collectable(cell, catalog) {
        return Err(PlaceError::CollectableOccupied);
    }
    cell.base = code.to_string();
    retain_under(cell, catalog);
    Ok(())
}

fn has_collectable(cell: &Cell, catalog: &Catalog) -> bool {
    cell.layers
        .iter()
        .any(|l| catalog.objective_kind(l) == Some(ObjectiveKind::Collectable))
}

fn retain_under(cell: &mut Cell, catalog: &Catalog) {
    cell.layers
        .retain(|l| catalog.objective_kind(l) == Some(ObjectiveKind::Under));
}

/// Paints every cell of `row` with the remembered color. Cells holding
/// a collectable are skipped silently; the rest still update. Returns
/// the number of cells that changed.
pub fn fill_row(grid: &mut Grid, row: usize, tools: &ToolSelection, catalog: &Catalog) -> usize {
    let cols = grid.width() as usize;
    fill_cells(grid, (0..cols).map(|col| (row, col)), tools, catalog)
}

/// Column counterpart of [`fill_row`].
pub fn fill_column(grid: &mut Grid, col: usize, tools: &ToolSelection, catalog: &Catalog) -> usize {
    let rows = grid.height() as usize;
    fill_cells(grid, (0..rows).map(|row| (row, col)), tools, catalog)
}

/// Rectangle fill between two corners in either order. Bounds are
/// normalized, then clamped to the grid extents.
pub fn fill_rect(
    grid: &mut Grid,
    a: (usize, usize),
    b: (usize, usize),
    tools: &ToolSelection,
    catalog: &Catalog,
) -> usize {
    let max_row = grid.height() as usize - 1;
    let max_col = grid.width() as usize - 1;
    let row_lo = a.0.min(b.0).min(max_row);
    let row_hi = a.0.max(b.0).min(max_row);
    let col_lo = a.1.min(b.1).min(max_col);
    let col_hi = a.1.max(b.1).min(max_col);

    let targets: Vec<(usize, usize)> = (row_lo..=row_hi)
        .flat_map(|row| (col_lo..=col_hi).map(move |col| (row, col)))
        .collect();
    fill_cells(grid, targets, tools, catalog)
}

fn fill_cells(
    grid: &mut Grid,
    targets: impl IntoIterator<Item = (usize, usize)>,
    tools: &ToolSelection,
    catalog: &Catalog,
) -> usize {
    let paint = tools.paint_color().to_string();
    let mut changed = 0;
    for (row, col) in targets {
        let Some(cell) = grid.cell_mut(row, col) else {
            continue;
        };
        let before = cell.clone();
        // Per-cell rejections (collectable guard) are swallowed here;
        // a direct click surfaces them instead.
        if paint_color(cell, &paint, catalog).is_ok() && *cell != before {
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::{PlaceError, apply_tool, fill_column, fill_rect, fill_row};
    use crate::catalog::{Catalog, ObjectiveDef, ObjectiveKind, SpecialDef, TileDef};
    use crate::grid::{Cell, Grid};
    use crate::tool::{ToolSelection, ToolState};

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                TileDef { code: "r".into() },
                TileDef { code: "g".into() },
                TileDef { code: "b".into() },
            ],
            vec![
                ObjectiveDef { code: "ice".into(), kind: ObjectiveKind::Under },
                ObjectiveDef { code: "box".into(), kind: ObjectiveKind::Cover },
                ObjectiveDef { code: "cherry".into(), kind: ObjectiveKind::Collectable },
                ObjectiveDef { code: "acorn".into(), kind: ObjectiveKind::Collectable },
            ],
            vec![SpecialDef { code: "stone".into() }],
        )
    }

    fn tools(active: ToolState) -> ToolSelection {
        let mut t = ToolSelection::default();
        t.select(active);
        t
    }

    #[test]
    fn color_keeps_under_layers_and_drops_the_rest() {
        let cat = catalog();
        let mut cell = Cell::with_base("r");
        cell.add_layer("ice");
        cell.add_layer("box");

        let changed = apply_tool(&mut cell, &tools(ToolState::Color("g".into())), &cat).unwrap();
        assert!(changed);
        assert_eq!(cell.base, "g");
        assert_eq!(cell.layers, vec!["ice".to_string()]);
    }

    #[test]
    fn color_is_rejected_on_collectable_cells() {
        let cat = catalog();
        let mut cell = Cell::with_base("random");
        cell.add_layer("cherry");
        let before = cell.clone();

        let err = apply_tool(&mut cell, &tools(ToolState::Color("g".into())), &cat).unwrap_err();
        assert_eq!(err, PlaceError::CollectableOccupied);
        assert_eq!(cell, before);
    }

    #[test]
    fn unknown_codes_reject_without_mutation() {
        let cat = catalog();
        let mut cell = Cell::with_base("r");
        let before = cell.clone();

        assert_eq!(
            apply_tool(&mut cell, &tools(ToolState::Color("magenta".into())), &cat),
            Err(PlaceError::UnknownTile("magenta".into()))
        );
        assert_eq!(
            apply_tool(&mut cell, &tools(ToolState::Special("lava".into())), &cat),
            Err(PlaceError::UnknownSpecial("lava".into()))
        );
        assert_eq!(
            apply_tool(&mut cell, &tools(ToolState::Objective("web".into())), &cat),
            Err(PlaceError::UnknownObjective("web".into()))
        );
        assert_eq!(cell, before);
    }

    #[test]
    fn eraser_uses_remembered_color_then_fallback() {
        let cat = catalog();
        let mut cell = Cell::with_base("b");
        cell.add_layer("ice");

        // No remembered color: fixed fallback.
        apply_tool(&mut cell, &tools(ToolState::Eraser), &cat).unwrap();
        assert_eq!(cell.base, "r");
        assert!(cell.layers.is_empty());

        let mut t = ToolSelection::default();
        t.select(ToolState::Color("g".into()));
        t.select(ToolState::Eraser);
        apply_tool(&mut cell, &t, &cat).unwrap();
        assert_eq!(cell.base, "g");
    }

    #[test]
    fn empty_tile_clears_everything() {
        let cat = catalog();
        let mut cell = Cell::with_base("r");
        cell.add_layer("box");
        apply_tool(&mut cell, &tools(ToolState::EmptyTile), &cat).unwrap();
        assert_eq!(cell.base, "null");
        assert!(cell.layers.is_empty());
    }

    #[test]
    fn special_keeps_only_under_layers() {
        let cat = catalog();
        let mut cell = Cell::with_base("random");
        cell.add_layer("ice");
        cell.add_layer("cherry");

        apply_tool(&mut cell, &tools(ToolState::Special("stone".into())), &cat).unwrap();
        assert_eq!(cell.base, "stone");
        assert_eq!(cell.layers, vec!["ice".to_string()]);
    }

    #[test]
    fn objective_toggle_is_its_own_inverse() {
        let cat = catalog();
        let mut cell = Cell::with_base("r");
        let t = tools(ToolState::Objective("box".into()));

        apply_tool(&mut cell, &t, &cat).unwrap();
        assert!(cell.has_layer("box"));
        apply_tool(&mut cell, &t, &cat).unwrap();
        assert!(!cell.has_layer("box"));
    }

    #[test]
    fn collectable_replaces_other_collectables_and_keeps_under() {
        let cat = catalog();
        let mut cell = Cell::with_base("r");
        cell.add_layer("ice");

        apply_tool(&mut cell, &tools(ToolState::Collectable("cherry".into())), &cat).unwrap();
        assert_eq!(cell.base, "random");
        assert_eq!(cell.layers, vec!["ice".to_string(), "cherry".to_string()]);

        // A different collectable displaces the first.
        apply_tool(&mut cell, &tools(ToolState::Collectable("acorn".into())), &cat).unwrap();
        assert_eq!(cell.layers, vec!["ice".to_string(), "acorn".to_string()]);

        // Re-applying the same one removes it.
        apply_tool(&mut cell, &tools(ToolState::Collectable("acorn".into())), &cat).unwrap();
        assert_eq!(cell.layers, vec!["ice".to_string()]);
        assert_eq!(cell.base, "random");
    }

    #[test]
    fn fill_row_skips_collectable_cells_silently() {
        let cat = catalog();
        let mut grid = Grid::new(3, 2, "b").unwrap();
        grid.cell_mut(1, 1).unwrap().base = "random".into();
        grid.cell_mut(1, 1).unwrap().add_layer("cherry");

        let mut t = ToolSelection::default();
        t.select(ToolState::Color("g".into()));
        t.select(ToolState::RowFill);

        let changed = fill_row(&mut grid, 1, &t, &cat);
        assert_eq!(changed, 2);
        assert_eq!(grid.cell(1, 0).unwrap().base, "g");
        // Guarded cell untouched, no error surfaced.
        assert_eq!(grid.cell(1, 2).unwrap().base, "g");
        assert_eq!(grid.cell(1, 1).unwrap().base, "random");
        assert!(grid.cell(1, 1).unwrap().has_layer("cherry"));
        // Other rows untouched.
        assert_eq!(grid.cell(0, 0).unwrap().base, "b");
    }

    #[test]
    fn fill_column_paints_whole_column() {
        let cat = catalog();
        let mut grid = Grid::new(2, 3, "b").unwrap();
        let mut t = ToolSelection::default();
        t.select(ToolState::Color("r".into()));
        t.select(ToolState::ColumnFill);

        assert_eq!(fill_column(&mut grid, 0, &t, &cat), 3);
        for row in 0..3 {
            assert_eq!(grid.cell(row, 0).unwrap().base, "r");
            assert_eq!(grid.cell(row, 1).unwrap().base, "b");
        }
    }

    #[test]
    fn fill_rect_normalizes_corners_and_clamps() {
        let cat = catalog();
        let mut grid = Grid::new(4, 4, "b").unwrap();
        let mut t = ToolSelection::default();
        t.select(ToolState::Color("g".into()));
        t.select(ToolState::RectangleFill);

        // Corners given in reverse order, second one out of range.
        let changed = fill_rect(&mut grid, (3, 9), (1, 2), &t, &cat);
        assert_eq!(changed, 3 * 2);
        assert_eq!(grid.cell(1, 2).unwrap().base, "g");
        assert_eq!(grid.cell(3, 3).unwrap().base, "g");
        assert_eq!(grid.cell(0, 0).unwrap().base, "b");
        assert_eq!(grid.cell(1, 1).unwrap().base, "b");
    }
}
