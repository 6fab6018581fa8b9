//! Tile grid (world map) and its text loader.
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, Result};

/// Wall material identifier; also the texture key for the wall.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub char);

impl MaterialId {
    /// Reported when a ray leaves the grid without hitting anything.
    pub const BOUNDARY: MaterialId = MaterialId('1');
    pub const ALL: [MaterialId; 4] = [MaterialId('1'), MaterialId('2'), MaterialId('3'), MaterialId('4')];
}

/// Immutable mapping (col, row) -> material. Only populated cells block.
#[derive(Clone, Debug, PartialEq)]
pub struct Maze {
    cells: Vec<Option<MaterialId>>,
    cols: usize,
    rows: usize,
    tile: f32,
}

impl Maze {
    pub fn empty(tile: f32) -> Self {
        Self { cells: Vec::new(), cols: 0, rows: 0, tile }
    }

    /// Builds a grid from ragged rows; short rows are padded with void.
    pub fn from_rows(rows: Vec<Vec<Option<MaterialId>>>, tile: f32) -> Self {
        let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let n_rows = if cols == 0 { 0 } else { rows.len() };
        let mut cells = Vec::with_capacity(cols * n_rows);
        for mut row in rows.into_iter().take(n_rows) {
            row.resize(cols, None);
            cells.extend(row);
        }
        Self { cells, cols, rows: n_rows, tile }
    }

    /// Parses the text format: whitespace separated cells, `_` or `.` void,
    /// `1`..`4` wall materials. Blank lines are skipped.
    pub fn parse(text: &str, tile: f32) -> Result<Self> {
        let mut rows = Vec::new();
        for (n, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut row = Vec::new();
            for token in line.split_whitespace() {
                let mut chars = token.chars();
                let (Some(ch), None) = (chars.next(), chars.next()) else {
                    return Err(EngineError::map(n + 1, format!("cell '{token}' is not a single character")));
                };
                let cell = match ch {
                    '_' | '.' => None,
                    '1'..='4' => Some(MaterialId(ch)),
                    other => return Err(EngineError::map(n + 1, format!("unknown cell '{other}'"))),
                };
                row.push(cell);
            }
            rows.push(row);
        }
        Ok(Self::from_rows(rows, tile))
    }

    pub fn cols(&self) -> usize { self.cols }
    pub fn rows(&self) -> usize { self.rows }
    pub fn tile(&self) -> f32 { self.tile }
    pub fn is_empty(&self) -> bool { self.cells.iter().all(Option::is_none) }

    pub fn world_width(&self) -> f32 { self.cols as f32 * self.tile }
    pub fn world_height(&self) -> f32 { self.rows as f32 * self.tile }

    /// Length of the grid diagonal in world units.
    pub fn diagonal(&self) -> f32 {
        self.world_width().hypot(self.world_height())
    }

    #[inline]
    pub fn get(&self, col: i32, row: i32) -> Option<MaterialId> {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return None;
        }
        self.cells[row as usize * self.cols + col as usize]
    }

    #[inline]
    pub fn cell_of(&self, wx: f32, wy: f32) -> (i32, i32) {
        ((wx / self.tile).floor() as i32, (wy / self.tile).floor() as i32)
    }

    #[inline]
    pub fn material_at_world(&self, wx: f32, wy: f32) -> Option<MaterialId> {
        let (c, r) = self.cell_of(wx, wy);
        self.get(c, r)
    }

    #[inline]
    pub fn is_wall_at(&self, wx: f32, wy: f32) -> bool {
        self.material_at_world(wx, wy).is_some()
    }
}

pub fn load_maze(path: &Path, tile: f32) -> Result<Maze> {
    if !path.exists() {
        return Err(EngineError::MissingPath { path: path.to_path_buf() });
    }
    let maze = Maze::parse(&fs::read_to_string(path)?, tile)?;
    info!(cols = maze.cols(), rows = maze.rows(), path = %path.display(), "map loaded");
    Ok(maze)
}
