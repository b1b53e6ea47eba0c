use serde::{Deserialize, Serialize};

/// Raw block identifier as stored in the map.
pub type BlockId = u8;

pub const AIR: BlockId = 0;
pub const STONE: BlockId = 1;
pub const GRASS: BlockId = 2;
pub const DIRT: BlockId = 3;
pub const COBBLESTONE: BlockId = 4;
pub const PLANKS: BlockId = 5;
pub const SAPLING: BlockId = 6;
pub const WATER: BlockId = 8;
pub const SAND: BlockId = 12;
pub const WOOD: BlockId = 17;
pub const LEAVES: BlockId = 18;
pub const GLASS: BlockId = 20;
pub const DANDELION: BlockId = 37;
pub const ROSE: BlockId = 38;
pub const ICE: BlockId = 60;

/// How a block's faces are drawn, which decides the geometry bucket it lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Not drawn at all.
    Air,
    /// Opaque or alpha-tested cube, back faces culled.
    Solid,
    /// Crossed quads drawn double sided.
    Sprite,
    /// Alpha blended cube, drawn back to front.
    Translucent,
}

pub fn block_kind(block: BlockId) -> BlockKind {
    match block {
        AIR => BlockKind::Air,
        SAPLING | DANDELION | ROSE => BlockKind::Sprite,
        WATER | ICE => BlockKind::Translucent,
        _ => BlockKind::Solid,
    }
}

/// Whether the block stops sunlight from reaching the blocks below it.
pub fn blocks_light(block: BlockId) -> bool {
    !matches!(block, AIR | SAPLING | DANDELION | ROSE | GLASS | LEAVES)
}

/// Texture slot of the block in the terrain atlas, counted across all pages.
pub fn texture_index(block: BlockId) -> usize {
    block as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(block_kind(AIR), BlockKind::Air);
        assert_eq!(block_kind(STONE), BlockKind::Solid);
        assert_eq!(block_kind(GLASS), BlockKind::Solid);
        assert_eq!(block_kind(ROSE), BlockKind::Sprite);
        assert_eq!(block_kind(WATER), BlockKind::Translucent);
    }

    #[test]
    fn light_blocking() {
        assert!(blocks_light(STONE));
        assert!(blocks_light(WATER));
        assert!(!blocks_light(GLASS));
        assert!(!blocks_light(AIR));
    }
}
