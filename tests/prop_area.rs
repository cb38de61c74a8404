use cgmath::Point3;
use proptest::prelude::*;
use voxel_area::engine_state::{
    rendering::meshing::{ambient_occlusion::get_occlusion, face::FACE_CORNERS, BlockLookup},
    voxels::{
        area::{AreaUpdate, ChunkArea},
        block::{block_side::BlockSide, block_type::BlockType},
        chunk::{BlockGrid, CHUNK_SIZE},
    },
};

// Rolling terrain that crosses chunk borders in y.
fn hills(x: f32, z: f32) -> f32 {
    ((x * 40.0).sin() + (z * 30.0).cos()) * 0.5
}

fn settle(area: &mut ChunkArea, viewer: Point3<f32>) {
    for _ in 0..1_000 {
        if area.update_chunk_area(&hills, viewer) == AreaUpdate::Unchanged {
            return;
        }
    }
    panic!("area never settled around {viewer:?}");
}

fn chunk_center(chunk: (i32, i32, i32)) -> Point3<f32> {
    let size = CHUNK_SIZE as f32;
    Point3::new(
        chunk.0 as f32 * size + size / 2.0,
        chunk.1 as f32 * size + size / 2.0,
        chunk.2 as f32 * size + size / 2.0,
    )
}

struct Grid(BlockGrid);

impl BlockLookup for Grid {
    fn get_block_at(&self, _chunk: Point3<i32>, block: Point3<i32>) -> BlockType {
        let inside = |c: i32| (0..CHUNK_SIZE).contains(&c);
        if inside(block.x) && inside(block.y) && inside(block.z) {
            self.0.at(block.x as usize, block.y as usize, block.z as usize)
        } else {
            BlockType::NONE
        }
    }
}

fn arb_block() -> impl Strategy<Value = BlockType> {
    prop_oneof![
        3 => Just(BlockType::NONE),
        1 => Just(BlockType::WATER),
        1 => Just(BlockType::GLASS),
        2 => Just(BlockType::STONE),
        1 => Just(BlockType::DIRT),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    // Slot indices stay a permutation and air flags match the data after any walk.
    #[test]
    fn slot_map_stays_bijective(
        moves in prop::collection::vec((-2i32..=2, -1i32..=1, -2i32..=2), 1..5)
    ) {
        let mut area = ChunkArea::create(64.0).unwrap();
        let mut chunk = (0, 0, 0);
        area.initialize_chunk_area(&hills, chunk_center(chunk));

        for (dx, dy, dz) in moves {
            chunk = (chunk.0 + dx, chunk.1 + dy, chunk.2 + dz);
            settle(&mut area, chunk_center(chunk));

            prop_assert!(area.chunk_indices().is_bijection());
            prop_assert_eq!(area.center_chunk(), Point3::new(chunk.0, chunk.1, chunk.2));
            prop_assert!(area.scheduler_state().is_idle());
            for slot in 0..area.slot_count() {
                prop_assert_eq!(area.is_only_air(slot), area.chunk(slot).is_only_air());
            }
        }
    }

    // Occlusion is a fraction of light, and two solid sides always mean darkness.
    #[test]
    fn occlusion_stays_in_range(cells in prop::collection::vec(arb_block(), 27)) {
        let mut grid = BlockGrid::new();
        let center = 10usize;
        for (i, &block_type) in cells.iter().enumerate() {
            let (x, y, z) = (i % 3, (i / 3) % 3, i / 9);
            grid.set(center + x - 1, center + y - 1, center + z - 1, block_type);
        }
        grid.set(center, center, center, BlockType::STONE);
        let lookup = Grid(grid);
        let block = Point3::new(center as i32, center as i32, center as i32);

        for side in BlockSide::all() {
            for &corner in &FACE_CORNERS[side as usize] {
                let ao = get_occlusion(&lookup, Point3::new(0, 0, 0), block, side, corner);
                prop_assert!((0.0..=1.0).contains(&ao));
            }
        }
    }
}

#[test]
fn both_sides_solid_is_fully_dark() {
    use voxel_area::engine_state::rendering::meshing::ambient_occlusion::{ao_key, AO_OFFSETS};

    for side in BlockSide::all() {
        for &corner in &FACE_CORNERS[side as usize] {
            let [side1, _, side2] = AO_OFFSETS[ao_key(side, corner)];
            let mut grid = BlockGrid::new();
            let at = |o: [i32; 3]| ((10 + o[0]) as usize, (10 + o[1]) as usize, (10 + o[2]) as usize);
            for offset in [side1, side2] {
                let (x, y, z) = at(offset);
                grid.set(x, y, z, BlockType::COBBLE_STONE);
            }
            let ao = get_occlusion(&Grid(grid), Point3::new(0, 0, 0), Point3::new(10, 10, 10), side, corner);
            assert_eq!(ao, 0.0, "{side:?} corner {corner}");
        }
    }
}
