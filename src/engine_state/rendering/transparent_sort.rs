//! Back-to-front ordering of transparent faces.
//!
//! Faces are sorted as whole quads: the four vertices of a face move
//! together so the shared index buffer still reads them as one quad.

use cgmath::{MetricSpace, Point3};

use super::vertex::VoxelVertex;

/// Center of a face.
#[inline]
pub fn face_centroid(face: &[VoxelVertex; 4]) -> Point3<f32> {
    let mut sum = [0.0f32; 3];
    for vertex in face {
        for (axis, value) in sum.iter_mut().enumerate() {
            *value += vertex.position[axis];
        }
    }
    Point3::new(sum[0] * 0.25, sum[1] * 0.25, sum[2] * 0.25)
}

/// Whether a face can be seen from `camera`.
///
/// Rejects faces whose normal points along the ray from the camera to the
/// face centroid.
#[inline]
pub fn faces_camera(face: &[VoxelVertex; 4], camera: Point3<f32>) -> bool {
    let centroid = face_centroid(face);
    let normal = face[0].normal;
    let to_face = [
        centroid.x - camera.x,
        centroid.y - camera.y,
        centroid.z - camera.z,
    ];
    normal[0] * to_face[0] + normal[1] * to_face[1] + normal[2] * to_face[2] <= 0.0
}

/// Sorts `faces` by descending squared distance from `camera` to each face
/// centroid.
///
/// Randomized three-way quicksort: the pivot is picked with `rng`, equal
/// keys are grouped so coplanar runs do not degrade the sort, and the
/// smaller side is recursed into while the larger side is looped on.
pub fn sort_back_to_front(
    faces: &mut [[VoxelVertex; 4]],
    camera: Point3<f32>,
    rng: &mut fastrand::Rng,
) {
    let mut keys: Vec<f32> = faces
        .iter()
        .map(|face| face_centroid(face).distance2(camera))
        .collect();
    quicksort(&mut keys, faces, rng);
}

fn quicksort(keys: &mut [f32], faces: &mut [[VoxelVertex; 4]], rng: &mut fastrand::Rng) {
    let mut keys = keys;
    let mut faces = faces;

    while keys.len() > 1 {
        let pivot = keys[rng.usize(..keys.len())];

        // [0, lt) farther than pivot, [lt, i) equal, [gt, len) nearer
        let mut lt = 0;
        let mut i = 0;
        let mut gt = keys.len();
        while i < gt {
            if keys[i] > pivot {
                keys.swap(lt, i);
                faces.swap(lt, i);
                lt += 1;
                i += 1;
            } else if keys[i] < pivot {
                gt -= 1;
                keys.swap(i, gt);
                faces.swap(i, gt);
            } else {
                i += 1;
            }
        }

        let (head_keys, rest_keys) = std::mem::take(&mut keys).split_at_mut(lt);
        let (head_faces, rest_faces) = std::mem::take(&mut faces).split_at_mut(lt);
        let (_, tail_keys) = rest_keys.split_at_mut(gt - lt);
        let (_, tail_faces) = rest_faces.split_at_mut(gt - lt);

        if head_keys.len() < tail_keys.len() {
            quicksort(head_keys, head_faces, rng);
            keys = tail_keys;
            faces = tail_faces;
        } else {
            quicksort(tail_keys, tail_faces, rng);
            keys = head_keys;
            faces = head_faces;
        }
    }
}
