/// Differential fuzzing of the DDA raycaster against an analytic ray-box oracle.
/// Each case places one solid voxel at a random spot, aims a ray at a random
/// interior point of it and checks cell and entry distance.
use glam::{IVec3, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use voxel_raycaster::*;

const CASES: usize = 2_000;
const SLACK: f32 = 1e-4;

/// Slab test: entry distance of the ray into the unit cube at `cell`.
/// Grazing an edge within `SLACK` still counts as entering.
fn oracle_entry(origin: Vec3, dir: Vec3, cell: IVec3) -> Option<f32> {
    let min = cell.as_vec3();
    let max = min + Vec3::ONE;
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    for axis in 0..3 {
        if dir[axis] == 0.0 {
            if origin[axis] < min[axis] || origin[axis] > max[axis] {
                return None;
            }
            continue;
        }
        let t1 = (min[axis] - origin[axis]) / dir[axis];
        let t2 = (max[axis] - origin[axis]) / dir[axis];
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
    }
    (t_enter <= t_exit + SLACK && t_enter >= -SLACK).then_some(t_enter)
}

fn random_case(rng: &mut ChaCha8Rng, chunk_height: i32) -> (Vec3, IVec3, Vec3) {
    let origin = Vec3::new(
        rng.gen_range(-40.0..40.0),
        rng.gen_range(0.0..chunk_height as f32),
        rng.gen_range(-40.0..40.0),
    );
    loop {
        let target = IVec3::new(
            rng.gen_range(-40..40),
            rng.gen_range(0..chunk_height),
            rng.gen_range(-40..40),
        );
        // Keep the origin out of the target cell and its immediate neighbours.
        let gap = (target - origin.floor().as_ivec3()).abs().max_element();
        if gap < 2 {
            continue;
        }
        let aim = target.as_vec3()
            + Vec3::new(
                rng.gen_range(0.1..0.9),
                rng.gen_range(0.1..0.9),
                rng.gen_range(0.1..0.9),
            );
        return (origin, target, (aim - origin).normalize());
    }
}

#[test]
fn fuzz_single_voxel_against_slab_oracle() {
    let config = EngineConfig {
        terrain: TerrainConfig::Empty,
        max_ray_steps: 1024,
        ..Default::default()
    };
    let raycaster = Raycaster::new(&config);
    let chunk_height = config.chunk_height as i32;
    let mut rng = ChaCha8Rng::seed_from_u64(0xDDA);
    let mut hit = HitResult::default();

    for case in 0..CASES {
        let (origin, target, dir) = random_case(&mut rng, chunk_height);

        let mut chunks = ChunkManager::new(&config);
        chunks.set_block(target.x, target.y, target.z, BlockType::Stone.id());

        let found = raycaster.cast(origin, dir, 1_000.0, &chunks, &mut hit);
        let expected = oracle_entry(origin, dir, target)
            .unwrap_or_else(|| panic!("case {case}: oracle missed {target} from {origin}"));

        assert!(found, "case {case}: missed {target} from {origin} along {dir}");
        assert_eq!(hit.map_pos, target, "case {case}");
        let tolerance = 1e-3 * expected.max(1.0);
        assert!(
            (hit.distance - expected).abs() < tolerance,
            "case {case}: distance {} vs oracle {}",
            hit.distance,
            expected
        );

        // The entry point lies on the reported face plane.
        let axis = hit.side.axis();
        let plane = if hit.face.neighbor_offset()[axis] > 0 {
            target[axis] as f32 + 1.0
        } else {
            target[axis] as f32
        };
        assert!((hit.hit_pos[axis] - plane).abs() < 1e-2, "case {case}");
    }
}

#[test]
fn fuzz_walk_matches_oracle_for_every_visited_cell() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for _ in 0..200 {
        let origin = Vec3::new(
            rng.gen_range(-20.0..20.0),
            rng.gen_range(-20.0..20.0),
            rng.gen_range(-20.0..20.0),
        );
        let dir = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        )
        .normalize_or_zero();
        if dir == Vec3::ZERO {
            continue;
        }

        for step in VoxelWalk::new(origin, dir).take(64) {
            // Every visited cell is one the ray actually enters, at the reported distance.
            let entry = oracle_entry(origin, dir, step.voxel);
            let Some(entry) = entry else {
                panic!("walk visited {} which the ray never enters", step.voxel);
            };
            assert!((entry - step.distance).abs() < 1e-3 * step.distance.max(1.0));
        }
    }
}
