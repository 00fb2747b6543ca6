use crate::catalog::Catalog;
use crate::format::{self, LevelFormat};
use crate::grid::{Grid, GridError};
use crate::objective::ColorObjective;
use anyhow::{Context, bail};
use std::fs;
use std::path::{Path, PathBuf};

/// Wire representation: Easy=0, Normal=1, Hard=2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Easy),
            1 => Some(Self::Normal),
            2 => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::Easy => 0,
            Self::Normal => 1,
            Self::Hard => 2,
        }
    }
}

/// Whether the level limit is a move budget or a countdown timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitKind {
    #[default]
    Moves,
    Timer,
}

impl LimitKind {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Moves),
            1 => Some(Self::Timer),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::Moves => 0,
            Self::Timer => 1,
        }
    }
}

/// Level metadata outside the grid body. Grid dimensions live on the
/// grid itself and are written to the wire from there.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LevelMeta {
    pub level_id: u32,
    pub move_count: u32,
    pub limit_kind: LimitKind,
    pub timer_seconds: u32,
    pub difficulty: Difficulty,
    /// Constrained subset of the catalog's tile codes, driving
    /// random-fill resolution and host color pickers.
    pub available_colors: Vec<String>,
}

/// The semantic unit the codec encodes and decodes: metadata, the cell
/// grid, and the explicitly authored color objectives. Count-derived
/// objectives are not stored; they are recomputed from the grid at
/// save time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub meta: LevelMeta,
    pub grid: Grid,
    pub color_objectives: Vec<ColorObjective>,
}

impl Level {
    /// A fresh level with every cell set to `default_code`.
    pub fn blank(
        level_id: u32,
        width: u32,
        height: u32,
        default_code: &str,
    ) -> Result<Self, GridError> {
        Ok(Self {
            meta: LevelMeta {
                level_id,
                ..LevelMeta::default()
            },
            grid: Grid::new(width, height, default_code)?,
            color_objectives: Vec::new(),
        })
    }
}

/// Level files are keyed by their numeric id.
pub fn level_file_name(level_id: u32) -> String {
    format!("level_{level_id}.json")
}

/// A level bound to a file on disk, tracking which schema it came from
/// and whether the in-memory copy has diverged from the file.
#[derive(Debug, Clone)]
pub struct LoadedLevel {
    pub source_path: Option<PathBuf>,
    pub format: LevelFormat,
    pub level: Level,
    pub dirty: bool,
}

impl LoadedLevel {
    /// An unsaved level, defaulting to the Standard schema.
    pub fn unsaved(level: Level) -> Self {
        Self {
            source_path: None,
            format: LevelFormat::Standard,
            level,
            dirty: false,
        }
    }

    /// Loads a level file, auto-detecting which of the three schemas
    /// it uses. Decoding builds the complete level before anything is
    /// returned, so a malformed file never yields partial state.
    pub fn load_path(path: &Path, catalog: &Catalog) -> anyhow::Result<Self> {
        if !path.exists() {
            bail!("no level file at {path:?}");
        }
        let text = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
        // JSON5 parse: plain JSON is a subset, and hand-edited files
        // with comments or trailing commas still load.
        let doc: serde_json::Value =
            json5::from_str(&text).with_context(|| format!("parsing {path:?}"))?;
        let detected = format::detect(&doc);
        let level = format::decode(&doc, detected, catalog)
            .with_context(|| format!("decoding {detected:?} level from {path:?}"))?;
        Ok(Self {
            source_path: Some(path.to_path_buf()),
            format: detected,
            level,
            dirty: false,
        })
    }

    /// Whole-file overwrite with pretty-formatted JSON in the given
    /// schema; on success the loaded level re-binds to `path`.
    pub fn save_to_path(
        &mut self,
        path: &Path,
        format: LevelFormat,
        catalog: &Catalog,
    ) -> anyhow::Result<()> {
        let doc = format::encode(&self.level, format, catalog)?;
        let mut text = serde_json::to_string_pretty(&doc).context("serializing level")?;
        text.push('\n');
        fs::write(path, text).with_context(|| format!("writing {path:?}"))?;

        self.source_path = Some(path.to_path_buf());
        self.format = format;
        self.dirty = false;
        Ok(())
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
