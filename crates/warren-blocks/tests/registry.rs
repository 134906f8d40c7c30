use warren_blocks::{BlockError, BlockRegistry, BlockType, WallBlock, names};

#[derive(Debug)]
struct LavaBlock;

impl BlockType for LavaBlock {
    fn name(&self) -> &'static str {
        "block.lava"
    }
}

#[test]
fn defaults_are_registered() {
    let reg = BlockRegistry::with_defaults();
    assert_eq!(reg.void().unwrap().name(), names::VOID);
    assert_eq!(reg.get_by_name(names::FLOOR).unwrap().name(), names::FLOOR);
    assert_eq!(reg.get_by_name(names::WALL).unwrap().name(), names::WALL);
}

#[test]
fn duplicate_registration_fails() {
    let mut reg = BlockRegistry::with_defaults();
    assert!(matches!(
        reg.register(WallBlock),
        Err(BlockError::DuplicateBlock(_))
    ));
}

#[test]
fn unknown_name_is_an_error() {
    let reg = BlockRegistry::with_defaults();
    assert!(matches!(
        reg.get_by_name("block.chasm"),
        Err(BlockError::UnknownBlock(_))
    ));
}

#[test]
fn id_lookup_requires_a_built_map() {
    let reg = BlockRegistry::with_defaults();
    assert!(matches!(reg.get_by_id(1), Err(BlockError::IdMapNotBuilt)));
    assert!(matches!(
        reg.id_of(names::VOID),
        Err(BlockError::IdMapNotBuilt)
    ));
}

#[test]
fn ids_follow_registration_order_starting_at_one() {
    let mut reg = BlockRegistry::with_defaults();
    reg.register(LavaBlock).unwrap();
    reg.build_id_map();
    assert_eq!(reg.id_of(names::VOID).unwrap(), 1);
    assert_eq!(reg.id_of(names::FLOOR).unwrap(), 2);
    assert_eq!(reg.id_of(names::WALL).unwrap(), 3);
    assert_eq!(reg.id_of("block.lava").unwrap(), 4);
    assert_eq!(reg.get_by_id(4).unwrap().name(), "block.lava");
    assert!(matches!(
        reg.get_by_id(99),
        Err(BlockError::UnknownBlockId(99))
    ));
}

#[test]
fn build_is_idempotent() {
    let mut reg = BlockRegistry::with_defaults();
    reg.build_id_map();
    let first = reg.serialize_id_map().unwrap();
    reg.build_id_map();
    assert_eq!(first, reg.serialize_id_map().unwrap());
}

#[test]
fn id_map_round_trips_through_serialization() {
    let mut reg = BlockRegistry::with_defaults();
    reg.build_id_map();
    let data = reg.serialize_id_map().unwrap();

    // A second session loads the persisted map instead of rebuilding
    let mut other = BlockRegistry::with_defaults();
    other.load_id_map(&data).unwrap();
    for name in [names::VOID, names::FLOOR, names::WALL] {
        assert_eq!(other.id_of(name).unwrap(), reg.id_of(name).unwrap());
    }
}

#[test]
fn loading_a_corrupt_map_fails() {
    let mut reg = BlockRegistry::with_defaults();
    assert!(matches!(
        reg.load_id_map("not toml at all ["),
        Err(BlockError::BadIdMap(_))
    ));
    assert!(matches!(
        reg.load_id_map("\"block.void\" = 0\n"),
        Err(BlockError::BadIdMap(_))
    ));
    assert!(matches!(
        reg.load_id_map("\"block.void\" = 1\n\"block.wall\" = 1\n"),
        Err(BlockError::BadIdMap(_))
    ));
}
