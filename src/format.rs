use crate::catalog::{Catalog, ObjectiveKind};
use crate::grid::{Cell, Grid};
use crate::level::{Difficulty, Level, LevelMeta, LimitKind};
use crate::objective::{self, ExportObjective};
use crate::statics;
use anyhow::{Context, bail, ensure};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The three interchangeable level schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelFormat {
    /// `{code, objTypes[]}` cells; lossless for layers.
    Standard,
    /// Bare-string cells; keeps only the first layer (lossy).
    SimpleCode,
    /// `{tile}` cells with underscore-joined layer (lossy).
    CodeOnly,
}

/// Structural shape detection for an unlabeled document, in priority
/// order: bare-string grid cells mean SimpleCode, a `tile` field means
/// CodeOnly, a `code` field means Standard, a top-level `tiles` array
/// without `grid` means CodeOnly, anything else defaults to Standard.
pub fn detect(doc: &Value) -> LevelFormat {
    if let Some(first) = first_grid_cell(doc) {
        if first.is_string() {
            return LevelFormat::SimpleCode;
        }
        if first.get(statics::KEY_CELL_TILE).is_some() {
            return LevelFormat::CodeOnly;
        }
        if first.get(statics::KEY_CELL_CODE).is_some() {
            return LevelFormat::Standard;
        }
        return LevelFormat::Standard;
    }
    if doc.get(statics::KEY_GRID).is_none()
        && doc.get(statics::KEY_TILES).is_some_and(Value::is_array)
    {
        return LevelFormat::CodeOnly;
    }
    LevelFormat::Standard
}

fn first_grid_cell(doc: &Value) -> Option<&Value> {
    doc.get(statics::KEY_GRID)?.as_array()?.first()?.as_array()?.first()
}

pub fn encode(level: &Level, format: LevelFormat, catalog: &Catalog) -> anyhow::Result<Value> {
    let counts = objective::count_layers(&level.grid);
    let entries = objective::build_export_objectives(&counts, &level.color_objectives);
    let value = match format {
        LevelFormat::Standard => serde_json::to_value(standard_wire(level, &entries, catalog)),
        LevelFormat::SimpleCode => serde_json::to_value(simple_wire(level, &entries, catalog)),
        LevelFormat::CodeOnly => serde_json::to_value(codeonly_wire(level, &entries)),
    };
    value.context("serializing level")
}

pub fn decode(doc: &Value, format: LevelFormat, catalog: &Catalog) -> anyhow::Result<Level> {
    match format {
        LevelFormat::Standard => decode_standard(doc, catalog),
        LevelFormat::SimpleCode => decode_simple(doc, catalog),
        LevelFormat::CodeOnly => decode_codeonly(doc, catalog),
    }
}

/// Layers in the canonical export order Cover, Collectable, Under;
/// storage order is kept within each category. Codes missing from the
/// catalog sort last.
pub fn ordered_layers(cell: &Cell, catalog: &Catalog) -> Vec<String> {
    let rank = |code: &str| match catalog.objective_kind(code) {
        Some(ObjectiveKind::Cover) => 0,
        Some(ObjectiveKind::Collectable) => 1,
        Some(ObjectiveKind::Under) => 2,
        None => 3,
    };
    let mut layers = cell.layers.clone();
    layers.sort_by_key(|code| rank(code));
    layers
}

// ---------------------------------------------------------------------------
// Shared metadata fields (Standard and SimpleCode spell them the same).

#[derive(Debug, Serialize, Deserialize)]
struct MetaWire {
    #[serde(rename = "levelId", default)]
    level_id: u32,
    #[serde(rename = "gridX")]
    grid_x: u32,
    #[serde(rename = "gridY")]
    grid_y: u32,
    #[serde(rename = "moveCount", default)]
    move_count: u32,
    #[serde(rename = "limitType", default)]
    limit_type: u8,
    #[serde(rename = "timerSeconds", default)]
    timer_seconds: u32,
    #[serde(default)]
    difficulty: u8,
    #[serde(rename = "availableColors", default)]
    available_colors: Vec<String>,
}

fn meta_wire(level: &Level) -> MetaWire {
    MetaWire {
        level_id: level.meta.level_id,
        grid_x: level.grid.width(),
        grid_y: level.grid.height(),
        move_count: level.meta.move_count,
        limit_type: level.meta.limit_kind.index(),
        timer_seconds: level.meta.timer_seconds,
        difficulty: level.meta.difficulty.index(),
        available_colors: level.meta.available_colors.clone(),
    }
}

fn meta_from_wire(wire: &MetaWire) -> anyhow::Result<LevelMeta> {
    Ok(LevelMeta {
        level_id: wire.level_id,
        move_count: wire.move_count,
        limit_kind: LimitKind::from_index(wire.limit_type)
            .with_context(|| format!("unknown limitType {}", wire.limit_type))?,
        timer_seconds: wire.timer_seconds,
        difficulty: Difficulty::from_index(wire.difficulty)
            .with_context(|| format!("unknown difficulty {}", wire.difficulty))?,
        available_colors: wire.available_colors.clone(),
    })
}

// ---------------------------------------------------------------------------
// Standard

#[derive(Debug, Serialize, Deserialize)]
struct StandardCellWire {
    code: String,
    #[serde(rename = "objTypes", default)]
    obj_types: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StandardObjectiveWire {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "targetObject")]
    target_object: String,
    #[serde(rename = "targetCount")]
    target_count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct StandardWire {
    #[serde(flatten)]
    meta: MetaWire,
    #[serde(default)]
    objectives: Vec<StandardObjectiveWire>,
    grid: Vec<Vec<StandardCellWire>>,
}

fn standard_wire(level: &Level, entries: &[ExportObjective], catalog: &Catalog) -> StandardWire {
    let objectives = entries
        .iter()
        .map(|entry| match entry {
            ExportObjective::Counted { code, count } => StandardObjectiveWire {
                kind: statics::STD_COUNTED_TYPE.to_string(),
                target_object: code.clone(),
                target_count: *count,
            },
            ExportObjective::Color(c) => StandardObjectiveWire {
                kind: statics::STD_COLOR_TYPE.to_string(),
                target_object: c.target_color.clone(),
                target_count: c.count,
            },
        })
        .collect();
    let grid = level
        .grid
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| StandardCellWire {
                    code: standard_code(&cell.base, catalog),
                    obj_types: ordered_layers(cell, catalog),
                })
                .collect()
        })
        .collect();
    StandardWire {
        meta: meta_wire(level),
        objectives,
        grid,
    }
}

fn standard_code(base: &str, catalog: &Catalog) -> String {
    if base == statics::CODE_NULL || base == statics::CODE_RANDOM {
        return base.to_string();
    }
    if catalog.special(base).is_some() {
        return format!("{}{}", statics::PREFIX_SPECIAL, base);
    }
    base.to_string()
}

fn decode_standard(doc: &Value, catalog: &Catalog) -> anyhow::Result<Level> {
    let wire = StandardWire::deserialize(doc).context("decoding Standard document")?;
    let meta = meta_from_wire(&wire.meta)?;
    let grid = build_grid(&wire.grid, wire.meta.grid_x, wire.meta.grid_y, |cell| {
        let mut out = Cell::with_base(decode_base_code(&cell.code, catalog));
        for layer in &cell.obj_types {
            out.add_layer(layer.clone());
        }
        out
    })?;
    let color_objectives = objective::reconstruct_color_objectives(
        wire.objectives
            .into_iter()
            .map(|o| (o.kind, o.target_object, o.target_count)),
    );
    Ok(Level { meta, grid, color_objectives })
}

/// Shared by Standard and SimpleCode base tokens: resolves the
/// `special_` prefix through the catalog (case-insensitive fallback),
/// passes sentinels and tile codes through untouched.
fn decode_base_code(code: &str, catalog: &Catalog) -> String {
    if let Some(stripped) = code.strip_prefix(statics::PREFIX_SPECIAL) {
        return catalog
            .special_ci(stripped)
            .map(|s| s.code.clone())
            .unwrap_or_else(|| stripped.to_string());
    }
    code.to_string()
}

// ---------------------------------------------------------------------------
// SimpleCode

#[derive(Debug, Serialize, Deserialize)]
struct SimpleObjectiveWire {
    #[serde(rename = "type")]
    kind: String,
    target: String,
    count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct SimpleWire {
    #[serde(flatten)]
    meta: MetaWire,
    #[serde(default)]
    objectives: Vec<SimpleObjectiveWire>,
    grid: Vec<Vec<String>>,
}

fn simple_wire(level: &Level, entries: &[ExportObjective], catalog: &Catalog) -> SimpleWire {
    let objectives = entries
        .iter()
        .map(|entry| match entry {
            ExportObjective::Counted { code, count } => SimpleObjectiveWire {
                kind: statics::SIMPLE_COUNTED_TYPE.to_string(),
                target: code.clone(),
                count: *count,
            },
            ExportObjective::Color(c) => SimpleObjectiveWire {
                kind: statics::SIMPLE_COLOR_TYPE.to_string(),
                target: c.target_color.clone(),
                count: c.count,
            },
        })
        .collect();
    let grid = level
        .grid
        .rows()
        .iter()
        .map(|row| row.iter().map(|cell| simple_token(cell, catalog)).collect())
        .collect();
    SimpleWire {
        meta: meta_wire(level),
        objectives,
        grid,
    }
}

fn simple_token(cell: &Cell, catalog: &Catalog) -> String {
    // First layer in storage order; any other layers on the cell are
    // dropped. The canonical Cover/Collectable/Under order does not
    // apply here.
    if let Some(first) = cell.layers.first() {
        return format!("{}{}", statics::PREFIX_OBJECTIVE, first);
    }
    if cell.base == statics::CODE_NULL {
        return statics::TOKEN_EMPTY.to_string();
    }
    if cell.base == statics::CODE_RANDOM {
        return statics::TOKEN_ANY.to_string();
    }
    if catalog.special(&cell.base).is_some() {
        return format!("{}{}", statics::PREFIX_SPECIAL, cell.base);
    }
    cell.base.clone()
}

fn decode_simple_token(token: &str, catalog: &Catalog) -> Cell {
    if let Some(code) = token.strip_prefix(statics::PREFIX_OBJECTIVE) {
        // The original base color is unrecoverable in this format: a
        // collectable rides a "random" placeholder, everything else
        // defaults to the catalog's first tile.
        let base = match catalog.objective_kind(code) {
            Some(ObjectiveKind::Collectable) => statics::CODE_RANDOM,
            _ => catalog.first_tile_code().unwrap_or(statics::FALLBACK_TILE),
        };
        let mut cell = Cell::with_base(base);
        cell.add_layer(code);
        return cell;
    }
    if token == statics::TOKEN_EMPTY {
        return Cell::with_base(statics::CODE_NULL);
    }
    if token == statics::TOKEN_ANY {
        return Cell::with_base(statics::CODE_RANDOM);
    }
    Cell::with_base(decode_base_code(token, catalog))
}

fn decode_simple(doc: &Value, catalog: &Catalog) -> anyhow::Result<Level> {
    let wire = SimpleWire::deserialize(doc).context("decoding SimpleCode document")?;
    let meta = meta_from_wire(&wire.meta)?;
    let grid = build_grid(&wire.grid, wire.meta.grid_x, wire.meta.grid_y, |token| {
        decode_simple_token(token, catalog)
    })?;
    let color_objectives = objective::reconstruct_color_objectives(
        wire.objectives
            .into_iter()
            .map(|o| (o.kind, o.target, o.count)),
    );
    Ok(Level { meta, grid, color_objectives })
}

// ---------------------------------------------------------------------------
// CodeOnly

#[derive(Debug, Serialize, Deserialize)]
struct SizeWire {
    x: u32,
    y: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct LimitsWire {
    moves: u32,
    #[serde(rename = "type")]
    kind: u8,
    timer: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct CodeOnlyCellWire {
    tile: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CodeOnlyTargetWire {
    object_type: String,
    amount: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct CodeOnlyWire {
    #[serde(rename = "levelId", alias = "id")]
    level_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<SizeWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limits: Option<LimitsWire>,
    difficulty: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    targets: Option<Vec<CodeOnlyTargetWire>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tiles: Option<Vec<Vec<CodeOnlyCellWire>>>,
    // Legacy flat spellings, accepted on load but never written.
    #[serde(rename = "gridX", skip_serializing)]
    grid_x: Option<u32>,
    #[serde(rename = "gridY", skip_serializing)]
    grid_y: Option<u32>,
    #[serde(rename = "moveCount", skip_serializing)]
    move_count: Option<u32>,
    #[serde(rename = "limitType", skip_serializing)]
    limit_type: Option<u8>,
    #[serde(rename = "timerSeconds", skip_serializing)]
    timer_seconds: Option<u32>,
    #[serde(rename = "availableColors", skip_serializing)]
    available_colors: Option<Vec<String>>,
    #[serde(skip_serializing)]
    objectives: Option<Vec<CodeOnlyTargetWire>>,
    #[serde(skip_serializing)]
    grid: Option<Vec<Vec<CodeOnlyCellWire>>>,
}

fn codeonly_wire(level: &Level, entries: &[ExportObjective]) -> CodeOnlyWire {
    let targets = entries
        .iter()
        .map(|entry| match entry {
            ExportObjective::Counted { code, count } => CodeOnlyTargetWire {
                object_type: code.clone(),
                amount: *count,
                color: None,
            },
            ExportObjective::Color(c) => CodeOnlyTargetWire {
                object_type: statics::CODEONLY_COLOR_TYPE.to_string(),
                amount: c.count,
                color: Some(c.target_color.clone()),
            },
        })
        .collect();
    let tiles = level
        .grid
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| CodeOnlyCellWire { tile: codeonly_token(cell) })
                .collect()
        })
        .collect();
    CodeOnlyWire {
        level_id: level.meta.level_id,
        size: Some(SizeWire {
            x: level.grid.width(),
            y: level.grid.height(),
        }),
        limits: Some(LimitsWire {
            moves: level.meta.move_count,
            kind: level.meta.limit_kind.index(),
            timer: level.meta.timer_seconds,
        }),
        difficulty: level.meta.difficulty.index(),
        colors: Some(level.meta.available_colors.clone()),
        targets: Some(targets),
        tiles: Some(tiles),
        ..Default::default()
    }
}

fn codeonly_token(cell: &Cell) -> String {
    // Underscore-joined base and first layer; remaining layers drop.
    if let Some(first) = cell.layers.first() {
        return format!("{}_{}", cell.base, first);
    }
    if cell.base == statics::CODE_NULL {
        return statics::TOKEN_EMPTY.to_string();
    }
    if cell.base == statics::CODE_RANDOM {
        return statics::TOKEN_ANY.to_string();
    }
    cell.base.clone()
}

fn decode_codeonly_token(token: &str, catalog: &Catalog) -> Cell {
    if token == statics::TOKEN_EMPTY {
        return Cell::with_base(statics::CODE_NULL);
    }
    if token == statics::TOKEN_ANY {
        return Cell::with_base(statics::CODE_RANDOM);
    }
    if let Some((base, layer)) = token.split_once('_') {
        let mut cell = Cell::with_base(base);
        cell.add_layer(layer);
        return cell;
    }
    if let Some(special) = catalog.special_ci(token) {
        return Cell::with_base(special.code.clone());
    }
    Cell::with_base(token)
}

fn decode_codeonly(doc: &Value, catalog: &Catalog) -> anyhow::Result<Level> {
    let wire = CodeOnlyWire::deserialize(doc).context("decoding CodeOnly document")?;

    let (width, height) = match (&wire.size, wire.grid_x, wire.grid_y) {
        (Some(size), _, _) => (size.x, size.y),
        (None, Some(x), Some(y)) => (x, y),
        _ => bail!("CodeOnly document has no size (or gridX/gridY)"),
    };
    let (moves, limit_index, timer) = match &wire.limits {
        Some(limits) => (limits.moves, limits.kind, limits.timer),
        None => (
            wire.move_count.unwrap_or(0),
            wire.limit_type.unwrap_or(0),
            wire.timer_seconds.unwrap_or(0),
        ),
    };

    let meta = LevelMeta {
        level_id: wire.level_id,
        move_count: moves,
        limit_kind: LimitKind::from_index(limit_index)
            .with_context(|| format!("unknown limit type {limit_index}"))?,
        timer_seconds: timer,
        difficulty: Difficulty::from_index(wire.difficulty)
            .with_context(|| format!("unknown difficulty {}", wire.difficulty))?,
        available_colors: wire.colors.or(wire.available_colors).unwrap_or_default(),
    };

    let rows = wire
        .tiles
        .or(wire.grid)
        .context("CodeOnly document has no tiles (or grid)")?;
    let grid = build_grid(&rows, width, height, |cell| {
        decode_codeonly_token(&cell.tile, catalog)
    })?;

    let entries = wire.targets.or(wire.objectives).unwrap_or_default();
    let color_objectives = objective::reconstruct_color_objectives(entries.into_iter().map(|t| {
        let target = t.color.unwrap_or_else(|| statics::COLOR_ALL.to_string());
        (t.object_type, target, t.amount)
    }));

    Ok(Level { meta, grid, color_objectives })
}

// ---------------------------------------------------------------------------

fn build_grid<T>(
    rows: &[Vec<T>],
    width: u32,
    height: u32,
    to_cell: impl Fn(&T) -> Cell,
) -> anyhow::Result<Grid> {
    ensure!(
        rows.len() == height as usize,
        "expected {height} grid rows, got {}",
        rows.len()
    );
    let mut grid = Grid::new(width, height, statics::CODE_NULL)?;
    for (r, row) in rows.iter().enumerate() {
        ensure!(
            row.len() == width as usize,
            "row {r}: expected {width} cells, got {}",
            row.len()
        );
        for (c, token) in row.iter().enumerate() {
            if let Some(slot) = grid.cell_mut(r, c) {
                *slot = to_cell(token);
            }
        }
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::{LevelFormat, detect, ordered_layers};
    use crate::catalog::{Catalog, ObjectiveDef, ObjectiveKind, SpecialDef, TileDef};
    use crate::grid::Cell;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::new(
            vec![TileDef { code: "r".into() }],
            vec![
                ObjectiveDef { code: "ice".into(), kind: ObjectiveKind::Under },
                ObjectiveDef { code: "box".into(), kind: ObjectiveKind::Cover },
                ObjectiveDef { code: "cherry".into(), kind: ObjectiveKind::Collectable },
            ],
            vec![SpecialDef { code: "stone".into() }],
        )
    }

    #[test]
    fn detect_follows_the_priority_order() {
        assert_eq!(
            detect(&json!({"grid": [[{"code": "r", "objTypes": []}]]})),
            LevelFormat::Standard
        );
        assert_eq!(detect(&json!({"grid": [["r"]]})), LevelFormat::SimpleCode);
        assert_eq!(
            detect(&json!({"tiles": [[{"tile": "red"}]]})),
            LevelFormat::CodeOnly
        );
        // A grid of {tile} cells beats the top-level key name.
        assert_eq!(
            detect(&json!({"grid": [[{"tile": "red"}]]})),
            LevelFormat::CodeOnly
        );
        // Unrecognized shapes default to Standard.
        assert_eq!(detect(&json!({"grid": [[{"x": 1}]]})), LevelFormat::Standard);
        assert_eq!(detect(&json!({"name": "level"})), LevelFormat::Standard);
        // tiles only counts when there is no grid at all.
        assert_eq!(
            detect(&json!({"grid": [], "tiles": [[{"tile": "red"}]]})),
            LevelFormat::Standard
        );
    }

    #[test]
    fn export_layer_order_is_cover_collectable_under() {
        let cat = catalog();
        let mut cell = Cell::with_base("random");
        cell.add_layer("ice");
        cell.add_layer("cherry");
        cell.add_layer("box");
        assert_eq!(ordered_layers(&cell, &cat), vec!["box", "cherry", "ice"]);
    }

    #[test]
    fn simple_token_keeps_first_layer_in_storage_order() {
        let cat = catalog();
        let mut cell = Cell::with_base("r");
        cell.add_layer("ice");
        cell.add_layer("box");
        // Storage order, not the canonical export order.
        assert_eq!(super::simple_token(&cell, &cat), "objective_ice");
    }

    #[test]
    fn simple_tokens_for_plain_cells() {
        let cat = catalog();
        assert_eq!(super::simple_token(&Cell::with_base("null"), &cat), "empty");
        assert_eq!(super::simple_token(&Cell::with_base("random"), &cat), "any");
        assert_eq!(
            super::simple_token(&Cell::with_base("stone"), &cat),
            "special_stone"
        );
        assert_eq!(super::simple_token(&Cell::with_base("r"), &cat), "r");
    }

    #[test]
    fn simple_decode_rebuilds_default_bases() {
        let cat = catalog();
        let under = super::decode_simple_token("objective_ice", &cat);
        assert_eq!(under.base, "r");
        assert_eq!(under.layers, vec!["ice".to_string()]);

        let collectable = super::decode_simple_token("objective_cherry", &cat);
        assert_eq!(collectable.base, "random");
        assert_eq!(collectable.layers, vec!["cherry".to_string()]);
    }

    #[test]
    fn codeonly_token_joins_base_and_first_layer() {
        let mut cell = Cell::with_base("r");
        cell.add_layer("ice");
        cell.add_layer("box");
        assert_eq!(super::codeonly_token(&cell), "r_ice");
        assert_eq!(super::codeonly_token(&Cell::with_base("null")), "empty");
        assert_eq!(super::codeonly_token(&Cell::with_base("random")), "any");
        assert_eq!(super::codeonly_token(&Cell::with_base("stone")), "stone");
    }

    #[test]
    fn codeonly_decode_splits_on_the_first_underscore() {
        let cat = catalog();
        let cell = super::decode_codeonly_token("random_cherry", &cat);
        assert_eq!(cell.base, "random");
        assert_eq!(cell.layers, vec!["cherry".to_string()]);

        // Bare specials resolve through the case-insensitive fallback.
        let special = super::decode_codeonly_token("STONE", &cat);
        assert_eq!(special.base, "stone");
        assert!(special.layers.is_empty());
    }
}
