use std::rc::Rc;

use warren::{BlockRegistry, DEFAULT_WORLD_SIZE, SaveFile, Vec2i, World, names};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn world_survives_a_save_and_reload() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world.save");

    let world_id = {
        let save = Rc::new(SaveFile::open(&path).unwrap());
        let mut reg = BlockRegistry::with_defaults();
        let mut world = World::create("W", DEFAULT_WORLD_SIZE, save);
        let wall = reg.get_by_name(names::WALL).unwrap().clone();
        world
            .region("Hub")
            .level("Ground")
            .set_block(Vec2i::new(0, 0), &wall, None, &reg)
            .unwrap();
        world.save(&mut reg).unwrap();
        world.id.expect("save assigns the world id")
    };

    // A second session: fresh registry, same file
    let save = Rc::new(SaveFile::open(&path).unwrap());
    let mut reg = BlockRegistry::with_defaults();
    let mut world = World::load(save, world_id, &mut reg).unwrap();
    assert_eq!(world.name, "W");
    assert_eq!(world.region_names().collect::<Vec<_>>(), ["Hub"]);

    let level = world.region("Hub").level("Ground");
    assert!(level.id.is_some());
    let tile = level.get_tile(Vec2i::new(0, 0), &reg).unwrap();
    assert_eq!(tile.block.name(), names::WALL);

    // Untouched tiles of the same chunk stayed default
    let tile = level.get_tile(Vec2i::new(1, 1), &reg).unwrap();
    assert_eq!(tile.block.name(), names::VOID);
}

#[test]
fn saving_twice_preserves_every_identity() {
    init_logging();
    let save = Rc::new(SaveFile::open_in_memory().unwrap());
    let mut reg = BlockRegistry::with_defaults();
    let mut world = World::create("W", DEFAULT_WORLD_SIZE, save);
    let floor = reg.get_by_name(names::FLOOR).unwrap().clone();
    world
        .region("Hub")
        .level("Ground")
        .set_block(Vec2i::new(5, 5), &floor, None, &reg)
        .unwrap();

    world.save(&mut reg).unwrap();
    let world_id = world.id;
    let region_id = world.region("Hub").id;
    let level_id = world.region("Hub").level("Ground").id;
    assert!(world_id.is_some() && region_id.is_some() && level_id.is_some());

    world.save(&mut reg).unwrap();
    assert_eq!(world.id, world_id);
    assert_eq!(world.region("Hub").id, region_id);
    assert_eq!(world.region("Hub").level("Ground").id, level_id);
}

#[test]
fn negative_addresses_work_before_and_after_persistence() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world.save");
    let pos = Vec2i::new(-1, -1);

    let world_id = {
        let save = Rc::new(SaveFile::open(&path).unwrap());
        let mut reg = BlockRegistry::with_defaults();
        let mut world = World::create("W", DEFAULT_WORLD_SIZE, save);

        // A fresh level answers immediately with a default tile
        let tile = world
            .region("Caves")
            .level("Deep")
            .get_tile(pos, &reg)
            .unwrap();
        assert_eq!(tile.block.name(), names::VOID);

        let wall = reg.get_by_name(names::WALL).unwrap().clone();
        world
            .region("Caves")
            .level("Deep")
            .set_block(pos, &wall, None, &reg)
            .unwrap();
        world.save(&mut reg).unwrap();
        world.id.unwrap()
    };

    let save = Rc::new(SaveFile::open(&path).unwrap());
    let mut reg = BlockRegistry::with_defaults();
    let mut world = World::load(save, world_id, &mut reg).unwrap();
    let tile = world
        .region("Caves")
        .level("Deep")
        .get_tile(pos, &reg)
        .unwrap();
    assert_eq!(tile.block.name(), names::WALL);
}

#[test]
fn block_id_map_is_stored_once_per_file() {
    init_logging();
    let save = Rc::new(SaveFile::open_in_memory().unwrap());
    let mut reg = BlockRegistry::with_defaults();
    let mut world = World::create("W", DEFAULT_WORLD_SIZE, save.clone());
    world.save(&mut reg).unwrap();

    let stored = save
        .metadata_get(warren::BLOCK_MAPPINGS_KEY)
        .unwrap()
        .expect("first save persists the id map");
    assert_eq!(stored, reg.serialize_id_map().unwrap());

    // A later save must not attempt to rewrite the write-once row
    world.save(&mut reg).unwrap();
    assert_eq!(
        save.metadata_get(warren::BLOCK_MAPPINGS_KEY).unwrap(),
        Some(stored)
    );
}

#[test]
fn loading_a_missing_world_is_an_error() {
    init_logging();
    let save = Rc::new(SaveFile::open_in_memory().unwrap());
    let mut reg = BlockRegistry::with_defaults();
    assert!(matches!(
        World::load(save, 42, &mut reg),
        Err(warren::MapError::UnknownWorld(42))
    ));
}
