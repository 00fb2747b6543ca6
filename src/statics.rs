// Central place for sentinel codes, wire tokens, and editor limits.
// Keep these out of the model/codec files to reduce duplication.

// Sentinel base codes in the in-memory model.
pub const CODE_NULL: &str = "null";
pub const CODE_RANDOM: &str = "random";

// Wire tokens the compact formats use for the sentinel bases.
pub const TOKEN_EMPTY: &str = "empty";
pub const TOKEN_ANY: &str = "any";

// Wire token prefixes.
pub const PREFIX_SPECIAL: &str = "special_";
pub const PREFIX_OBJECTIVE: &str = "objective_";

// Grid dimension bounds (inclusive) and the undo snapshot cap.
pub const GRID_MIN: u32 = 1;
pub const GRID_MAX: u32 = 20;
pub const HISTORY_CAP: usize = 10;

// Tile code the eraser and fill tools paint with when no color
// selection has been remembered yet.
pub const FALLBACK_TILE: &str = "r";

// Wildcard target for "match N tiles of any color" objectives.
pub const COLOR_ALL: &str = "all";

// Type labels written for count-derived objective entries. These are
// fixed per format and intentionally not derived from the layer's
// category (CodeOnly writes the layer code itself, no label).
pub const STD_COUNTED_TYPE: &str = "collect";
pub const SIMPLE_COUNTED_TYPE: &str = "objective";

// Type labels written for explicit color objectives, per format.
pub const STD_COLOR_TYPE: &str = "colorMatch";
pub const SIMPLE_COLOR_TYPE: &str = "matchColor";
pub const CODEONLY_COLOR_TYPE: &str = "colorTile";

// Every color-objective type string recognized on load, any format.
pub const COLOR_OBJECTIVE_TYPES: [&str; 4] = ["colorMatch", "matchColor", "color", "colorTile"];

// Document keys probed by format detection (the full field maps live
// on the per-format wire types in format.rs).
pub const KEY_GRID: &str = "grid";
pub const KEY_TILES: &str = "tiles";
pub const KEY_CELL_CODE: &str = "code";
pub const KEY_CELL_TILE: &str = "tile";
