use proptest::prelude::*;
use settlement_foreman::{GridMap, InfluenceFalloff, MapGeometry, ObstructionGrid};

const SIDE: u32 = 16;

fn geometry() -> MapGeometry {
    MapGeometry {
        width: SIDE,
        height: SIDE,
        cell_size: 1.0,
    }
}

proptest! {
    #[test]
    fn linear_influence_matches_the_falloff_formula(
        cx in 0i32..SIDE as i32,
        cz in 0i32..SIDE as i32,
        radius in 1.0f32..8.0,
        magnitude in -50.0f32..50.0,
    ) {
        let mut grid = GridMap::new(SIDE, SIDE, 1.0);
        grid.add_influence(cx, cz, radius, magnitude, InfluenceFalloff::Linear);

        for z in 0..SIDE {
            for x in 0..SIDE {
                let dx = x as f32 - cx as f32;
                let dz = z as f32 - cz as f32;
                let dist = (dx * dx + dz * dz).sqrt();
                let expected = if dist <= radius {
                    magnitude * (1.0 - dist / radius)
                } else {
                    0.0
                };
                prop_assert!(
                    (grid.get(x, z) - expected).abs() < 1e-3,
                    "cell ({}, {}) at distance {}: got {}, expected {}",
                    x, z, dist, grid.get(x, z), expected
                );
            }
        }
    }

    #[test]
    fn influence_accumulation_commutes(
        ax in 0i32..SIDE as i32, az in 0i32..SIDE as i32,
        bx in 0i32..SIDE as i32, bz in 0i32..SIDE as i32,
        ra in 1.0f32..8.0, rb in 1.0f32..8.0,
        ma in -20.0f32..20.0, mb in -20.0f32..20.0,
    ) {
        let mut forward = GridMap::new(SIDE, SIDE, 1.0);
        forward.add_influence(ax, az, ra, ma, InfluenceFalloff::Linear);
        forward.add_influence(bx, bz, rb, mb, InfluenceFalloff::Constant);

        let mut reverse = GridMap::new(SIDE, SIDE, 1.0);
        reverse.add_influence(bx, bz, rb, mb, InfluenceFalloff::Constant);
        reverse.add_influence(ax, az, ra, ma, InfluenceFalloff::Linear);

        prop_assert_eq!(forward, reverse);
    }

    #[test]
    fn expansion_is_monotone_and_grows_one_cell(
        blocked in prop::collection::vec((0u32..SIDE, 0u32..SIDE), 0..40),
    ) {
        let mut grid = ObstructionGrid::new(geometry());
        for &(x, z) in &blocked {
            grid.block_cell(x, z);
        }
        grid.expand();

        for &(x, z) in &blocked {
            prop_assert!(grid.is_blocked(x as i32, z as i32));
            for dz in -1i32..=1 {
                for dx in -1i32..=1 {
                    let nx = x as i32 + dx;
                    let nz = z as i32 + dz;
                    if nx >= 0 && nz >= 0 && nx < SIDE as i32 && nz < SIDE as i32 {
                        prop_assert!(grid.is_blocked(nx, nz));
                    }
                }
            }
        }

        // Cells with no blocked cell in their 8-neighborhood stay free.
        for z in 0..SIDE as i32 {
            for x in 0..SIDE as i32 {
                let near_seed = blocked.iter().any(|&(bx, bz)| {
                    (bx as i32 - x).abs() <= 1 && (bz as i32 - z).abs() <= 1
                });
                if !near_seed {
                    prop_assert!(!grid.is_blocked(x, z));
                }
            }
        }
    }

    #[test]
    fn best_tile_is_always_admissible(
        blocked in prop::collection::vec((0u32..SIDE, 0u32..SIDE), 0..60),
        peaks in prop::collection::vec((0u32..SIDE, 0u32..SIDE, 0.0f32..10.0), 1..20),
        radius in 0.0f32..4.0,
    ) {
        let mut obstructions = ObstructionGrid::new(geometry());
        for &(x, z) in &blocked {
            obstructions.block_cell(x, z);
        }

        let mut grid = GridMap::new(SIDE, SIDE, 1.0);
        for &(x, z, magnitude) in &peaks {
            grid.add_influence(x as i32, z as i32, 2.0, magnitude, InfluenceFalloff::Linear);
        }

        let admissible = |x: u32, z: u32| obstructions.is_clear(x, z, radius);

        match grid.find_best_tile(radius, &obstructions) {
            Some(tile) => {
                prop_assert!(admissible(tile.x, tile.z));
                // No admissible cell scores strictly higher.
                for z in 0..SIDE {
                    for x in 0..SIDE {
                        if admissible(x, z) {
                            prop_assert!(grid.get(x, z) <= tile.score);
                        }
                    }
                }
            }
            None => {
                for z in 0..SIDE {
                    for x in 0..SIDE {
                        prop_assert!(!admissible(x, z));
                    }
                }
            }
        }
    }

    #[test]
    fn world_grid_conversion_is_idempotent(
        wx in 0.0f32..512.0,
        wz in 0.0f32..512.0,
        cell_size in 0.5f32..8.0,
    ) {
        let grid = GridMap::new(1024, 1024, cell_size);
        let (gx, gz) = grid.world_to_grid(wx, wz);

        if gx >= 0 && gz >= 0 && (gx as u32) < 1024 && (gz as u32) < 1024 {
            let (cx, cz) = grid.grid_to_world(gx as u32, gz as u32);
            prop_assert_eq!(grid.world_to_grid(cx, cz), (gx, gz));
        }
    }
}
