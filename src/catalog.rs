use serde::Deserialize;
use std::collections::HashMap;

/// Semantic category of an objective layer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ObjectiveKind {
    /// Sits beneath the base tile (e.g. ice); survives recoloring.
    Under,
    /// Covers the base tile (e.g. a box).
    Cover,
    /// A collectable riding on a `"random"` placeholder base.
    Collectable,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TileDef {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectiveDef {
    pub code: String,
    pub kind: ObjectiveKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpecialDef {
    pub code: String,
}

/// Read-only lookup tables for tile, objective, and special codes.
///
/// The catalog is external data: the host builds one from its asset
/// tables and the core only ever reads it. Lookups are case-sensitive
/// except [`Catalog::special_ci`], the documented case-insensitive
/// fallback used when decoding special codes from level files.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tiles: Vec<TileDef>,
    objectives: Vec<ObjectiveDef>,
    specials: Vec<SpecialDef>,
    tile_by_code: HashMap<String, usize>,
    objective_by_code: HashMap<String, usize>,
    special_by_code: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(tiles: Vec<TileDef>, objectives: Vec<ObjectiveDef>, specials: Vec<SpecialDef>) -> Self {
        let tile_by_code = tiles
            .iter()
            .enumerate()
            .map(|(i, t)| (t.code.clone(), i))
            .collect();
        let objective_by_code = objectives
            .iter()
            .enumerate()
            .map(|(i, o)| (o.code.clone(), i))
            .collect();
        let special_by_code = specials
            .iter()
            .enumerate()
            .map(|(i, s)| (s.code.clone(), i))
            .collect();
        Self {
            tiles,
            objectives,
            specials,
            tile_by_code,
            objective_by_code,
            special_by_code,
        }
    }

    pub fn tile(&self, code: &str) -> Option<&TileDef> {
        self.tile_by_code.get(code).map(|&i| &self.tiles[i])
    }

    pub fn objective(&self, code: &str) -> Option<&ObjectiveDef> {
        self.objective_by_code.get(code).map(|&i| &self.objectives[i])
    }

    pub fn objective_kind(&self, code: &str) -> Option<ObjectiveKind> {
        self.objective(code).map(|o| o.kind)
    }

    pub fn special(&self, code: &str) -> Option<&SpecialDef> {
        self.special_by_code.get(code).map(|&i| &self.specials[i])
    }

    /// Case-insensitive special lookup, used as a fallback when
    /// decoding level files authored with inconsistent casing.
    pub fn special_ci(&self, code: &str) -> Option<&SpecialDef> {
        self.special(code)
            .or_else(|| self.specials.iter().find(|s| s.code.eq_ignore_ascii_case(code)))
    }

    /// Tile codes in catalog order.
    pub fn tile_codes(&self) -> impl Iterator<Item = &str> {
        self.tiles.iter().map(|t| t.code.as_str())
    }

    /// The default base tile used when a compact format cannot recover
    /// the original base color of an objective cell.
    pub fn first_tile_code(&self) -> Option<&str> {
        self.tiles.first().map(|t| t.code.as_str())
    }

    pub fn objectives_of_kind(&self, kind: ObjectiveKind) -> Vec<&ObjectiveDef> {
        self.objectives.iter().filter(|o| o.kind == kind).collect()
    }

    pub fn special_codes(&self) -> impl Iterator<Item = &str> {
        self.specials.iter().map(|s| s.code.as_str())
    }
}
