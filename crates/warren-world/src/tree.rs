use warren_blocks::BlockRegistry;
use warren_chunk::Chunk;
use warren_geom::Vec2i;

use crate::MapError;
use crate::loader::ChunkLoader;

/// Cell extent, in chunk units, at or below which a node stops
/// subdividing.
const LEAF_SIZE: i32 = 2;

enum Node {
    /// Resolves chunk positions through the loader pool directly.
    Leaf,
    /// Four lazily built quadrant cells, indexed by the sign of the
    /// offset from the node origin along each axis.
    Internal([Option<Box<ChunkTree>>; 4]),
}

/// Recursive spatial index over chunk space. Routing is a pure sign
/// test against each node's origin, so coordinates on a cell boundary
/// land deterministically (negative side strictly below the origin) and
/// every integer address has a route; cells are built on first use and
/// never pruned.
pub struct ChunkTree {
    origin: Vec2i,
    size: Vec2i,
    node: Node,
}

impl ChunkTree {
    pub fn new(origin: Vec2i, size: Vec2i) -> Self {
        let node = if size.x <= LEAF_SIZE && size.y <= LEAF_SIZE {
            Node::Leaf
        } else {
            Node::Internal([None, None, None, None])
        };
        Self { origin, size, node }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.node, Node::Leaf)
    }

    /// Number of materialized tree nodes, this one included.
    pub fn node_count(&self) -> usize {
        match &self.node {
            Node::Leaf => 1,
            Node::Internal(cells) => {
                1 + cells
                    .iter()
                    .flatten()
                    .map(|c| c.node_count())
                    .sum::<usize>()
            }
        }
    }

    /// Routes a chunk-space position down to its owning chunk,
    /// delegating materialization to the loader at the leaf.
    pub fn chunk_mut<'l>(
        &mut self,
        chunk_pos: Vec2i,
        loader: &'l mut ChunkLoader,
        level_id: Option<i64>,
        reg: &BlockRegistry,
    ) -> Result<&'l mut Chunk, MapError> {
        let (origin, size) = (self.origin, self.size);
        match &mut self.node {
            Node::Leaf => loader.get(chunk_pos, level_id, reg),
            Node::Internal(cells) => {
                let ix = usize::from(chunk_pos.x >= origin.x);
                let iy = usize::from(chunk_pos.y >= origin.y);
                let cell = cells[iy * 2 + ix]
                    .get_or_insert_with(|| Box::new(Self::build_cell(origin, size, ix, iy)));
                cell.chunk_mut(chunk_pos, loader, level_id, reg)
            }
        }
    }

    /// Child cell for one quadrant: half the extent, origin shifted a
    /// quarter extent toward that quadrant.
    fn build_cell(origin: Vec2i, size: Vec2i, ix: usize, iy: usize) -> ChunkTree {
        let half = Vec2i::new((size.x / 2).max(LEAF_SIZE), (size.y / 2).max(LEAF_SIZE));
        let quarter = Vec2i::new((half.x / 2).max(1), (half.y / 2).max(1));
        let dx = if ix == 0 { -quarter.x } else { quarter.x };
        let dy = if iy == 0 { -quarter.y } else { quarter.y };
        ChunkTree::new(origin.offset(dx, dy), half)
    }
}
