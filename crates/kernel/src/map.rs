use chunkview_common::{BlockId, blocks_light, block};
use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::env::{Colour, EnvVariable, MapEnv};

/// Errors from block map operations.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("map dimensions must be positive, got {width}x{height}x{length}")]
    InvalidDimensions { width: u32, height: u32, length: u32 },
    #[error("block ({x}, {y}, {z}) is outside the map")]
    OutOfBounds { x: i32, y: i32, z: i32 },
}

/// A single block edit together with the light-top change it caused in its
/// column. A top of `None` means no block in the column stops sunlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockChange {
    pub position: IVec3,
    pub old_block: BlockId,
    pub new_block: BlockId,
    pub old_top: Option<i32>,
    pub new_top: Option<i32>,
}

/// An event record produced by every mutation of a loaded map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapEvent {
    BlockChanged(BlockChange),
    EnvChanged { variable: EnvVariable, colour: Colour },
}

/// The authoritative block contents of a map.
///
/// Blocks are stored flat with x varying fastest, then z, then y. A per-column
/// heightmap tracks the highest block that stops sunlight, which the renderer
/// uses to decide how far down an edit's lighting change reaches.
#[derive(Debug, Clone)]
pub struct BlockMap {
    width: u32,
    height: u32,
    length: u32,
    blocks: Vec<BlockId>,
    heightmap: Vec<Option<i32>>,
    env: MapEnv,
    event_log: Vec<MapEvent>,
}

impl BlockMap {
    /// Create an empty (all air) map.
    pub fn new(width: u32, height: u32, length: u32) -> Result<Self, MapError> {
        if width == 0 || height == 0 || length == 0 {
            return Err(MapError::InvalidDimensions {
                width,
                height,
                length,
            });
        }
        let volume = width as usize * height as usize * length as usize;
        Ok(Self {
            width,
            height,
            length,
            blocks: vec![block::AIR; volume],
            heightmap: vec![None; width as usize * length as usize],
            env: MapEnv::default(),
            event_log: Vec::new(),
        })
    }

    /// Flat grass map: stone and dirt below `ground`, grass on top.
    pub fn flatgrass(width: u32, height: u32, length: u32, ground: u32) -> Result<Self, MapError> {
        let mut map = Self::new(width, height, length)?;
        let ground = ground.min(height - 1) as i32;
        let w = width as i32 - 1;
        let l = length as i32 - 1;
        map.fill(IVec3::new(0, 0, 0), IVec3::new(w, ground - 4, l), block::STONE);
        map.fill(IVec3::new(0, ground - 3, 0), IVec3::new(w, ground - 1, l), block::DIRT);
        map.fill(IVec3::new(0, ground, 0), IVec3::new(w, ground, l), block::GRASS);
        Ok(map)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn dimensions(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.length)
    }

    pub fn env(&self) -> &MapEnv {
        &self.env
    }

    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as u32) < self.width
            && (y as u32) < self.height
            && (z as u32) < self.length
    }

    fn index(&self, x: i32, y: i32, z: i32) -> usize {
        (y as usize * self.length as usize + z as usize) * self.width as usize + x as usize
    }

    /// Block at the given position; positions outside the map read as air.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockId {
        if self.contains(x, y, z) {
            self.blocks[self.index(x, y, z)]
        } else {
            block::AIR
        }
    }

    /// Highest sunlight-blocking y in the column, `None` if the column is open.
    pub fn light_top(&self, x: i32, z: i32) -> Option<i32> {
        if !self.contains(x, 0, z) {
            return None;
        }
        self.heightmap[z as usize * self.width as usize + x as usize]
    }

    /// Whether the block at this position receives direct sunlight.
    pub fn is_lit(&self, x: i32, y: i32, z: i32) -> bool {
        self.light_top(x, z).is_none_or(|top| y > top)
    }

    /// Replace a block, update the heightmap and record the change.
    pub fn set_block(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        new_block: BlockId,
    ) -> Result<BlockChange, MapError> {
        if !self.contains(x, y, z) {
            return Err(MapError::OutOfBounds { x, y, z });
        }
        let index = self.index(x, y, z);
        let old_block = self.blocks[index];
        let old_top = self.light_top(x, z);
        self.blocks[index] = new_block;
        self.update_light_top(x, y, z, new_block);

        let change = BlockChange {
            position: IVec3::new(x, y, z),
            old_block,
            new_block,
            old_top,
            new_top: self.light_top(x, z),
        };
        tracing::debug!(x, y, z, old_block, new_block, "block changed");
        self.event_log.push(MapEvent::BlockChanged(change));
        Ok(change)
    }

    /// Change an environment colour and record the change.
    pub fn set_env(&mut self, variable: EnvVariable, colour: Colour) {
        if self.env.get(variable) == colour {
            return;
        }
        self.env.set(variable, colour);
        self.event_log.push(MapEvent::EnvChanged { variable, colour });
    }

    /// Fill an inclusive box with one block. Used while generating a map
    /// before it is handed to the renderer, so no events are recorded.
    pub fn fill(&mut self, min: IVec3, max: IVec3, fill: BlockId) {
        let lo = min.max(IVec3::ZERO);
        let hi = max.min(IVec3::new(
            self.width as i32 - 1,
            self.height as i32 - 1,
            self.length as i32 - 1,
        ));
        for y in lo.y..=hi.y {
            for z in lo.z..=hi.z {
                for x in lo.x..=hi.x {
                    let index = self.index(x, y, z);
                    self.blocks[index] = fill;
                    self.update_light_top(x, y, z, fill);
                }
            }
        }
    }

    fn update_light_top(&mut self, x: i32, y: i32, z: i32, placed: BlockId) {
        let column = z as usize * self.width as usize + x as usize;
        let top = self.heightmap[column];
        if blocks_light(placed) {
            if top.is_none_or(|t| y > t) {
                self.heightmap[column] = Some(y);
            }
        } else if top == Some(y) {
            self.heightmap[column] = (0..y).rev().find(|&below| {
                blocks_light(self.blocks[self.index(x, below, z)])
            });
        }
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[MapEvent] {
        &self.event_log
    }
}
