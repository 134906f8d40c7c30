use std::fmt;
use std::sync::Arc;

/// Numeric block id as embedded in packed chunk data. Ids are assigned
/// per save session by the registry; 0 is reserved for the absent-cell
/// sentinel and never assigned to a block.
pub type BlockId = u16;

/// Well-known block names.
pub mod names {
    pub const VOID: &str = "block.void";
    pub const FLOOR: &str = "block.floor";
    pub const WALL: &str = "block.wall";
}

/// Behavior of one block kind. The set of implementors is closed (void,
/// floor, wall); rendering hooks live outside this core and key off the
/// name together with per-tile metadata.
pub trait BlockType: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;
}

/// Shared handle to a block kind. Cheap to clone; equality is by name,
/// which is the stable identity across sessions.
#[derive(Clone, Debug)]
pub struct Block(Arc<dyn BlockType>);

impl Block {
    pub fn new(ty: impl BlockType + 'static) -> Self {
        Self(Arc::new(ty))
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Block {}

#[derive(Debug)]
pub struct VoidBlock;

impl BlockType for VoidBlock {
    fn name(&self) -> &'static str {
        names::VOID
    }
}

#[derive(Debug)]
pub struct FloorBlock;

impl BlockType for FloorBlock {
    fn name(&self) -> &'static str {
        names::FLOOR
    }
}

#[derive(Debug)]
pub struct WallBlock;

impl BlockType for WallBlock {
    fn name(&self) -> &'static str {
        names::WALL
    }
}
