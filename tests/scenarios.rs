use cgmath::{Point3, Vector3};
use voxel_area::engine_state::voxels::{
    area::{
        scheduler::{UpdateList, CHUNK_UPDATES_PER_FRAME},
        AreaUpdate, ChunkArea,
    },
    block::block_type::BlockType,
    picking::ray_intersection_with_block,
};

fn hills(x: f32, z: f32) -> f32 {
    ((x * 40.0).sin() + (z * 30.0).cos()) * 0.5
}

fn empty_world(_x: f32, _z: f32) -> f32 {
    -10.0
}

fn area_at(viewer: Point3<f32>) -> ChunkArea {
    let mut area = ChunkArea::create(64.0).unwrap();
    area.initialize_chunk_area(&hills, viewer);
    area
}

#[test]
fn staying_inside_the_center_chunk_changes_nothing() {
    let mut area = area_at(Point3::new(0.0, 0.0, 0.0));
    let indices = area.chunk_indices().clone();
    let faces: Vec<usize> = (0..area.slot_count())
        .map(|slot| area.opaque_mesh(slot).face_count())
        .collect();

    for viewer in [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(31.9, 31.9, 31.9),
        Point3::new(12.0, 3.0, 30.0),
    ] {
        assert_eq!(area.update_chunk_area(&hills, viewer), AreaUpdate::Unchanged);
    }

    assert_eq!(area.area_position(), Point3::new(0.0, 0.0, 0.0));
    assert_eq!(area.chunk_indices(), &indices);
    for slot in 0..area.slot_count() {
        assert_eq!(area.opaque_mesh(slot).face_count(), faces[slot]);
    }
}

#[test]
fn crossing_a_boundary_slides_the_area_by_one_chunk() {
    let mut area = area_at(Point3::new(0.0, 0.0, 0.0));
    let dimension = area.dimension();
    let plane = dimension * dimension;

    // Slots and data that end up one plane behind the leading edge.
    let before: Vec<(usize, Vec<BlockType>)> = (0..dimension)
        .flat_map(|y| (0..dimension).map(move |z| (y, z)))
        .map(|(y, z)| {
            let slot = area.chunk_indices().at(dimension - 1, y, z);
            (slot, area.chunk(slot).as_slice().to_vec())
        })
        .collect();

    let viewer = Point3::new(33.0, 0.0, 0.0);
    let update = area.update_chunk_area(&hills, viewer);
    assert_eq!(
        update,
        AreaUpdate::Recentered {
            displacement: Vector3::new(1, 0, 0),
            new_chunks: plane,
            surrounding_chunks: plane,
        }
    );
    assert_eq!(area.area_position(), Point3::new(32.0, 0.0, 0.0));
    assert!(area.chunk_indices().is_bijection());

    assert!(area
        .new_chunk_updates()
        .iter()
        .all(|data| data.coordinate.x == dimension - 1));
    assert!(area
        .surrounding_chunk_updates()
        .iter()
        .all(|data| data.coordinate.x == dimension - 2));

    // The old leading plane moved back one step with its blocks untouched.
    for (i, (slot, blocks)) in before.iter().enumerate() {
        let (y, z) = (i / dimension, i % dimension);
        assert_eq!(area.chunk_indices().at(dimension - 2, y, z), *slot);
        assert_eq!(area.chunk(*slot).as_slice(), blocks.as_slice());
    }

    let mut remesh_frames = 0;
    loop {
        match area.update_chunk_area(&hills, viewer) {
            AreaUpdate::Remeshed { .. } => remesh_frames += 1,
            AreaUpdate::Unchanged => break,
            other => panic!("unexpected {other:?}"),
        }
    }
    let batches = plane.div_ceil(CHUNK_UPDATES_PER_FRAME);
    assert_eq!(remesh_frames, 2 * batches);

    // Everything but the trailing plane matches a freshly built area.
    let fresh = area_at(viewer);
    for (x, y, z) in area.chunk_indices().coordinates() {
        let slot = area.chunk_indices().at(x, y, z);
        let fresh_slot = fresh.chunk_indices().at(x, y, z);
        assert_eq!(area.chunk(slot).as_slice(), fresh.chunk(fresh_slot).as_slice());
        assert_eq!(area.is_only_air(slot), fresh.is_only_air(fresh_slot));
        if x > 0 {
            assert_eq!(
                area.opaque_mesh(slot).face_count(),
                fresh.opaque_mesh(fresh_slot).face_count(),
                "chunk ({x}, {y}, {z})"
            );
        }
    }
}

#[test]
fn long_jumps_are_clamped_and_caught_up() {
    let mut area = area_at(Point3::new(0.0, 0.0, 0.0));
    let viewer = Point3::new(-70.0, 0.0, 100.0);

    let update = area.update_chunk_area(&hills, viewer);
    assert!(matches!(
        update,
        AreaUpdate::Recentered { displacement, .. } if displacement == Vector3::new(-1, 0, 1)
    ));

    for _ in 0..200 {
        if area.update_chunk_area(&hills, viewer) == AreaUpdate::Unchanged {
            break;
        }
    }
    assert_eq!(area.center_chunk(), Point3::new(-3, 0, 3));
    assert!(area.chunk_indices().is_bijection());
}

#[test]
fn placed_blocks_are_found_by_the_picker() {
    let mut area = ChunkArea::create(64.0).unwrap();
    area.initialize_chunk_area(&empty_world, Point3::new(0.0, 0.0, 0.0));

    let chunk = Point3::new(2, 2, 2);
    let block = Point3::new(5, 5, 5);
    assert!(area.place_block_at_position(chunk, block, BlockType::STONE));

    let origin = Point3::new(5.5, 5.5, -3.0);
    let direction = Vector3::new(0.0, 0.0, 1.0);
    let hit = ray_intersection_with_block(&area, origin, direction, 20.0).expect("stone is hit");
    assert_eq!(hit.chunk_index, chunk);
    assert_eq!(hit.block_index, block);
    assert!((hit.t - 8.0).abs() < 1e-4);
    assert_eq!(hit.normal, Vector3::new(0, 0, -1));

    let (target_chunk, target_block) = hit.placement_target();
    assert_eq!((target_chunk, target_block), (chunk, Point3::new(5, 5, 4)));
    assert!(area.place_block_at_position(target_chunk, target_block, BlockType::GLASS));

    let hit = ray_intersection_with_block(&area, origin, direction, 20.0).expect("glass is hit");
    assert_eq!(hit.block_index, Point3::new(5, 5, 4));
    assert!((hit.t - 7.0).abs() < 1e-4);

    assert!(ray_intersection_with_block(&area, origin, -direction, 20.0).is_none());
    assert!(ray_intersection_with_block(&area, origin, direction, 5.0).is_none());
}

#[test]
fn regenerated_chunks_are_pickable_before_they_are_meshed() {
    // Ground surface at y = 8.
    let flat = |_x: f32, _z: f32| 0.5;
    let mut area = ChunkArea::create(64.0).unwrap();
    area.initialize_chunk_area(&flat, Point3::new(16.0, 20.0, 16.0));

    let viewer = Point3::new(33.0, 20.0, 16.0);
    assert!(matches!(
        area.update_chunk_area(&flat, viewer),
        AreaUpdate::Recentered { .. }
    ));

    // The leading plane holds fresh blocks but no meshes yet.
    let leading = Point3::new(3, 2, 2);
    let slot = area.slot_of(leading).unwrap();
    assert!(!area.is_only_air(slot));
    assert!(!area.has_faces(slot));

    let origin = Point3::new(70.5, 20.0, 16.5);
    let down = Vector3::new(0.0, -1.0, 0.0);
    let hit = ray_intersection_with_block(&area, origin, down, 20.0).expect("ground is hit");
    assert_eq!(hit.chunk_index, leading);
    assert_eq!(hit.block_index, Point3::new(6, 8, 16));
    assert!((hit.t - 11.0).abs() < 1e-4);
    assert_eq!(hit.normal, Vector3::new(0, 1, 0));
}

#[test]
fn remeshing_water_is_reported() {
    let mut area = ChunkArea::create(64.0).unwrap();
    area.initialize_chunk_area(&empty_world, Point3::new(0.0, 0.0, 0.0));
    // After a +X crossing this chunk becomes part of the surrounding plane.
    assert!(area.place_block_at_position(
        Point3::new(3, 2, 2),
        Point3::new(5, 5, 5),
        BlockType::WATER
    ));

    let viewer = Point3::new(33.0, 0.0, 0.0);
    assert!(matches!(
        area.update_chunk_area(&empty_world, viewer),
        AreaUpdate::Recentered { .. }
    ));

    let mut transparent_batches = 0;
    loop {
        match area.update_chunk_area(&empty_world, viewer) {
            AreaUpdate::Remeshed {
                list, transparent, ..
            } => {
                if transparent {
                    assert_eq!(list, UpdateList::Surrounding);
                    transparent_batches += 1;
                }
            }
            AreaUpdate::Unchanged => break,
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(transparent_batches, 1);
}

#[test]
fn faces_between_neighbors_follow_transparency() {
    let left = Point3::new(2, 2, 2);
    let right = Point3::new(3, 2, 2);
    let left_block = Point3::new(31, 5, 5);
    let right_block = Point3::new(0, 5, 5);

    let pair = |a: BlockType, b: BlockType| {
        let mut area = ChunkArea::create(64.0).unwrap();
        area.initialize_chunk_area(&empty_world, Point3::new(0.0, 0.0, 0.0));
        area.place_block_at_position(left, left_block, a);
        area.place_block_at_position(right, right_block, b);
        let count = |chunk| {
            let slot = area.slot_of(chunk).unwrap();
            (
                area.opaque_mesh(slot).face_count(),
                area.transparent_mesh(slot).face_count(),
            )
        };
        (count(left), count(right))
    };

    // Opaque against opaque: the shared face disappears on both sides.
    assert_eq!(pair(BlockType::STONE, BlockType::DIRT), ((5, 0), (5, 0)));
    // Opaque against air: all six faces, on the opaque side only.
    assert_eq!(pair(BlockType::STONE, BlockType::NONE), ((6, 0), (0, 0)));
    // Equal transparent types merge.
    assert_eq!(pair(BlockType::WATER, BlockType::WATER), ((0, 5), (0, 5)));
    // Different transparent types keep the face on both sides.
    assert_eq!(pair(BlockType::WATER, BlockType::GLASS), ((0, 6), (0, 6)));
    // Opaque against transparent: both faces are visible.
    assert_eq!(pair(BlockType::STONE, BlockType::GLASS), ((6, 0), (0, 6)));
}
