use cgmath::Point3;
use voxel_area::engine_state::{
    camera_state::CameraState,
    rendering::{
        backend::Topology, renderer::BATCH_TINTS, ChunkRenderer, DebugRendererSettings,
        DebugRendererStats, RecordingBackend, MAX_BATCH_FACES,
    },
    settings::CameraSettings,
    voxels::{area::ChunkArea, block::block_type::BlockType},
};

fn empty_world(_x: f32, _z: f32) -> f32 {
    -10.0
}

/// Columns alternate between +16 and -16 in a checkerboard.
fn spikes(x: f32, z: f32) -> f32 {
    let (xi, zi) = ((x * 128.0).round() as i64, (z * 128.0).round() as i64);
    if (xi + zi).rem_euclid(2) == 0 {
        1.0
    } else {
        -1.0
    }
}

fn camera(position: Point3<f32>, pitch_degrees: f32) -> CameraState {
    let settings = CameraSettings {
        pitch_degrees,
        ..CameraSettings::default()
    };
    CameraState::new(&settings, 800, 600, position)
}

fn empty_area() -> ChunkArea {
    let mut area = ChunkArea::create(64.0).unwrap();
    area.initialize_chunk_area(&empty_world, Point3::new(0.0, 0.0, 0.0));
    area
}

fn render(
    renderer: &mut ChunkRenderer<RecordingBackend>,
    camera: &CameraState,
    area: &ChunkArea,
    settings: &DebugRendererSettings,
    update_transparent: bool,
) -> DebugRendererStats {
    let mut stats = DebugRendererStats::default();
    let mut pass = renderer.begin(camera, &());
    pass.render_chunk_area(area, &mut stats, settings, update_transparent);
    pass.end();
    stats
}

#[test]
fn index_buffers_cover_a_full_batch() {
    let renderer = ChunkRenderer::new(RecordingBackend::new());
    assert_eq!(
        renderer.backend().index_buffer_lengths(),
        (6 * MAX_BATCH_FACES, 12 * MAX_BATCH_FACES)
    );
}

#[test]
fn transparent_faces_are_drawn_back_to_front_without_depth_writes() {
    // Chunk (2, 2, 2) spans world [0, 32) on every axis.
    let mut area = empty_area();
    for x in [3, 7, 5] {
        assert!(area.place_block_at_position(
            Point3::new(2, 2, 2),
            Point3::new(x, 5, 5),
            BlockType::WATER
        ));
    }
    let camera = camera(Point3::new(0.5, 5.5, 5.5), 0.0);
    let mut renderer = ChunkRenderer::with_rng(RecordingBackend::new(), fastrand::Rng::with_seed(7));

    let stats = render(&mut renderer, &camera, &area, &DebugRendererSettings::default(), true);

    // Only the face pointing back at the camera survives for each block.
    assert_eq!(stats.transparent_faces, 3);
    assert_eq!(stats.triangles, 6);
    assert_eq!(stats.batches, 1);

    let draws = renderer.backend().draws();
    assert_eq!(draws.len(), 1);
    let draw = &draws[0];
    assert!(!draw.depth_write);
    assert_eq!(draw.topology, Topology::Triangles);
    assert_eq!(draw.index_count, 18);

    let order: Vec<f32> = draw
        .vertices
        .chunks(4)
        .map(|face| {
            assert!(face.iter().all(|v| v.normal == [-1.0, 0.0, 0.0]));
            face[0].position[0]
        })
        .collect();
    assert_eq!(order, vec![7.0, 5.0, 3.0]);

    assert!(renderer.backend().depth_write());
    assert_eq!(renderer.backend().frames(), 1);
}

#[test]
fn transparent_order_is_reused_until_the_view_changes() {
    let mut area = empty_area();
    for x in [3, 5, 7] {
        area.place_block_at_position(Point3::new(2, 2, 2), Point3::new(x, 5, 5), BlockType::WATER);
    }
    let camera = camera(Point3::new(0.5, 5.5, 5.5), 0.0);
    let settings = DebugRendererSettings::default();
    let mut renderer = ChunkRenderer::new(RecordingBackend::new());

    render(&mut renderer, &camera, &area, &settings, true);
    area.place_block_at_position(Point3::new(2, 2, 2), Point3::new(9, 5, 5), BlockType::WATER);

    let stats = render(&mut renderer, &camera, &area, &settings, false);
    assert_eq!(stats.transparent_faces, 3);
    assert_eq!(renderer.transparent_faces().len(), 3);

    let stats = render(&mut renderer, &camera, &area, &settings, true);
    assert_eq!(stats.transparent_faces, 4);
    let draws = renderer.backend().draws();
    assert_eq!(draws[draws.len() - 1].index_count, 24);
    assert_eq!(draws[draws.len() - 1].vertices[0].position[0], 9.0);
}

#[test]
fn chunks_behind_the_camera_are_culled() {
    let mut area = empty_area();
    area.place_block_at_position(Point3::new(2, 2, 2), Point3::new(8, 5, 5), BlockType::STONE);
    // Chunk (0, 2, 2) spans world x in [-64, -32).
    area.place_block_at_position(Point3::new(0, 2, 2), Point3::new(8, 5, 5), BlockType::STONE);
    area.place_block_at_position(Point3::new(0, 2, 2), Point3::new(10, 5, 5), BlockType::WATER);

    let camera = camera(Point3::new(0.5, 5.5, 5.5), 0.0);
    let mut renderer = ChunkRenderer::new(RecordingBackend::new());
    let stats = render(&mut renderer, &camera, &area, &DebugRendererSettings::default(), true);

    assert_eq!(stats.chunks_drawn, 1);
    assert_eq!(stats.chunks_culled, 1);
    assert_eq!(stats.transparent_faces, 0);
    assert_eq!(stats.triangles, 12);

    let draws = renderer.backend().draws();
    assert_eq!(draws.len(), 1);
    assert!(draws[0].depth_write);
    assert_eq!(draws[0].index_count, 36);
}

#[test]
fn opaque_faces_are_split_into_bounded_batches() {
    let mut area = ChunkArea::create(64.0).unwrap();
    let eye = Point3::new(0.0, 60.0, 0.0);
    area.initialize_chunk_area(&spikes, eye);
    let camera = camera(eye, -80.0);

    let expected: usize = (0..area.slot_count())
        .filter(|&slot| !area.is_only_air(slot) && area.has_faces(slot))
        .filter(|&slot| camera.frustum().intersects_aabb(&area.chunk_bounds(slot)))
        .map(|slot| area.opaque_mesh(slot).face_count())
        .sum();
    assert!(expected > MAX_BATCH_FACES, "only {expected} faces in view");

    let settings = DebugRendererSettings {
        show_batches: true,
        ..DebugRendererSettings::default()
    };
    let mut renderer = ChunkRenderer::new(RecordingBackend::stats_only());
    let stats = render(&mut renderer, &camera, &area, &settings, true);

    let draws = renderer.backend().draws();
    assert_eq!(stats.batches, draws.len());
    assert_eq!(stats.triangles, 2 * expected);
    assert!(stats.batches >= expected.div_ceil(MAX_BATCH_FACES));

    let mut drawn = 0;
    for (i, draw) in draws.iter().enumerate() {
        let faces = draw.index_count as usize / 6;
        assert!(faces < MAX_BATCH_FACES);
        assert_eq!(draw.vertex_count, 4 * faces);
        assert_eq!(draw.tint, BATCH_TINTS[i % BATCH_TINTS.len()]);
        drawn += faces;
    }
    assert_eq!(drawn, expected);
}

#[test]
fn wireframe_draws_four_lines_per_face() {
    let mut area = empty_area();
    area.place_block_at_position(Point3::new(2, 2, 2), Point3::new(8, 5, 5), BlockType::STONE);
    area.place_block_at_position(Point3::new(2, 2, 2), Point3::new(4, 5, 5), BlockType::GLASS);

    let settings = DebugRendererSettings {
        show_wireframe: true,
        ..DebugRendererSettings::default()
    };
    let camera = camera(Point3::new(0.5, 5.5, 5.5), 0.0);
    let mut renderer = ChunkRenderer::new(RecordingBackend::new());
    render(&mut renderer, &camera, &area, &settings, true);

    let draws = renderer.backend().draws();
    assert_eq!(draws.len(), 2);
    assert!(draws.iter().all(|draw| draw.topology == Topology::Lines));
    assert_eq!(draws[0].index_count, 12 * 6);
    assert_eq!(draws[1].index_count, 12);
    assert!(draws.iter().all(|draw| draw.tint == [1.0; 4]));
}
