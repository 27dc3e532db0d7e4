use std::time::Duration;

use anyhow::{bail, ensure, Result};

/// Smallest board that still keeps both starting snakes apart.
pub const MIN_BOARD_SIDE: i32 = 8;

/// Cells taken by the starting roster.
const STARTING_SNAKES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Board columns. Column 0 and column `width` are walls.
    pub width: i32,
    /// Board rows. Row 0 and row `height` are walls.
    pub height: i32,
    /// Terminal characters per cell horizontally. Rendering only.
    pub scale: u16,
    /// Pellets kept on the board.
    pub target_food_count: usize,
    pub tick_interval_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: 30,
            height: 30,
            scale: 2,
            target_food_count: 7,
            tick_interval_ms: 400,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width >= MIN_BOARD_SIDE && self.height >= MIN_BOARD_SIDE,
            "board must be at least {}x{}, got {}x{}",
            MIN_BOARD_SIDE, MIN_BOARD_SIDE, self.width, self.height
        );
        ensure!(self.scale > 0, "scale must be positive");
        ensure!(self.tick_interval_ms > 0, "tick interval must be positive");
        self.screen_size()?;
        ensure!(
            self.target_food_count + STARTING_SNAKES <= self.interior_cells(),
            "{} pellets do not fit on a {}x{} board",
            self.target_food_count, self.width, self.height
        );
        Ok(())
    }

    /// Terminal columns and rows the board covers, walls included.
    pub fn screen_size(&self) -> Result<(u16, u16)> {
        let cols = self.width.checked_add(1)
            .and_then(|w| u16::try_from(w).ok())
            .and_then(|w| w.checked_mul(self.scale));
        let rows = self.height.checked_add(1).and_then(|h| u16::try_from(h).ok());

        match (cols, rows) {
            (Some(cols), Some(rows)) => Ok((cols, rows)),
            _ => bail!(
                "a {}x{} board at scale {} is too large for any terminal",
                self.width, self.height, self.scale
            ),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Number of interior cells, i.e. cells a pellet or a live snake can occupy.
    pub fn interior_cells(&self) -> usize {
        (self.width - 1).max(0) as usize * (self.height - 1).max(0) as usize
    }
}
