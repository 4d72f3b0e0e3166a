//! Cross-module scenarios: whole-engine runs, division and persistence.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::automaton::hamiltonian;
use crate::automaton::split::is_connected;
use crate::automaton::{
    CellParams, Geometry, Location, LocationContainer, Potts, Region, RegionParams, Voxel, MEDIUM,
};
use crate::config::PottsConfig;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn block(x0: i32, y0: i32, w: i32, h: i32) -> Vec<Voxel> {
    let mut out = Vec::new();
    for x in x0..x0 + w {
        for y in y0..y0 + h {
            out.push(Voxel::new(x, y, 0));
        }
    }
    out
}

fn tissue(seed: u64) -> Potts {
    let config = PottsConfig {
        seed,
        audit_each_tick: true,
        ..PottsConfig::new(24, 24, 1)
    };
    let mut potts = Potts::new(config).unwrap();
    let params = CellParams::new(1, 25.0, 20.0)
        .with_lambdas(1.0, 0.1)
        .with_adhesion(vec![8.0, 4.0]);
    potts.add_cell(params.clone(), block(3, 3, 5, 5)).unwrap();
    potts.add_cell(params.clone(), block(8, 3, 5, 5)).unwrap();
    potts.add_cell(params, block(3, 8, 5, 5)).unwrap();
    potts
}

fn assert_conserved(potts: &Potts) {
    let occupied: i64 = potts.cells().values().map(|c| c.location.volume()).sum();
    let medium = potts.lattice().count(MEDIUM) as i64;
    assert_eq!(occupied + medium, potts.lattice().len() as i64);
}

#[test]
fn test_conservation_across_ticks_and_division() {
    init_logging();
    let mut potts = tissue(17);
    let mut rng = potts.config().rng();

    for tick in 0..12 {
        potts.step(&mut rng).unwrap();
        assert_conserved(&potts);
        if tick == 5 {
            potts.divide(1, &mut rng).unwrap();
            assert_conserved(&potts);
        }
    }

    assert_eq!(potts.tick(), 12);
    assert_eq!(potts.cells().len(), 4);
    potts.audit().unwrap();
}

#[test]
fn test_cells_stay_connected() {
    let mut potts = tissue(5);
    let mut rng = potts.config().rng();
    for _ in 0..10 {
        potts.step(&mut rng).unwrap();
    }
    for cell in potts.cells().values() {
        assert!(
            is_connected(cell.location.voxels(), Geometry::Grid2D),
            "cell {} broke apart",
            cell.id
        );
    }
}

#[test]
fn test_same_seed_same_trajectory() {
    let run = |seed| {
        let mut potts = tissue(seed);
        let mut rng = potts.config().rng();
        for tick in 0..6 {
            potts.step(&mut rng).unwrap();
            if tick == 2 {
                potts.divide(2, &mut rng).unwrap();
            }
        }
        potts.lattice().ids().to_vec()
    };

    assert_eq!(run(23), run(23));
}

#[test]
fn test_zero_temperature_never_raises_energy() {
    let config = PottsConfig {
        temperature: 0.0,
        ..PottsConfig::new(12, 12, 1)
    };
    let mut potts = Potts::new(config).unwrap();
    let params = CellParams::new(1, 16.0, 16.0).with_lambdas(2.0, 0.0);
    let id = potts.add_cell(params, block(4, 4, 4, 4)).unwrap();

    // At the target volume every flip costs energy, so nothing moves
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    for _ in 0..5 {
        let stats = potts.step(&mut rng).unwrap();
        assert_eq!(stats.accepted, 0);
    }
    assert_eq!(potts.cell(id).unwrap().location.volume(), 16);
}

#[test]
fn test_adhesion_fixture_on_engine() {
    let mut potts = Potts::new(PottsConfig::new(5, 6, 1)).unwrap();
    let first = CellParams::new(1, 0.0, 0.0).with_adhesion(vec![1.0, 2.0, 3.0]);
    let second = CellParams::new(2, 0.0, 0.0).with_adhesion(vec![4.0, 5.0, 6.0]);
    let cell = |coords: &[(i32, i32)]| {
        Location::from_voxels(
            Geometry::Grid2D,
            coords.iter().map(|&(x, y)| Voxel::new(x, y, 0)),
        )
    };

    potts.place_cell(1, first.clone(), cell(&[(1, 1), (2, 1), (3, 1)])).unwrap();
    potts.place_cell(2, first, cell(&[(1, 2), (2, 2), (1, 3)])).unwrap();
    potts.place_cell(3, second, cell(&[(3, 2), (2, 3)])).unwrap();

    let v = Voxel::new(2, 2, 0);
    let to_medium = hamiltonian::adhesion_energy(potts.lattice(), potts.cells(), MEDIUM, v);
    assert_eq!(to_medium, 1.0 * 5.0 + 4.0 * 2.0);
    potts.audit().unwrap();
}

#[test]
fn test_region_cells_keep_their_nucleus() {
    init_logging();
    let config = PottsConfig {
        audit_each_tick: true,
        ..PottsConfig::new(16, 16, 1)
    };
    let mut potts = Potts::new(config).unwrap();
    let nucleus = RegionParams {
        target_volume: 6.0,
        lambda_volume: 1.0,
        adhesion: [(Region::Default, 2.0)].into_iter().collect(),
        ..RegionParams::default()
    };
    let params = CellParams::new(1, 30.0, 24.0)
        .with_lambdas(1.0, 0.0)
        .with_adhesion(vec![4.0, 2.0])
        .with_region(Region::Default, RegionParams::default())
        .with_region(Region::Nucleus, nucleus);
    let id = potts.add_cell(params, block(5, 5, 6, 5)).unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(31);
    for _ in 0..8 {
        potts.step(&mut rng).unwrap();
    }

    let location = &potts.cell(id).unwrap().location;
    assert!(location.region_volume(Region::Nucleus) >= 1);
    assert_eq!(
        location.region_volume(Region::Default) + location.region_volume(Region::Nucleus),
        location.volume()
    );
    potts.audit().unwrap();
}

#[test]
fn test_divided_cell_round_trips_through_container() {
    let mut potts = tissue(3);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let daughter = potts.divide(3, &mut rng).unwrap();

    for id in [3, daughter] {
        let location = &potts.cell(id).unwrap().location;
        let json = serde_json::to_string(&location.convert(id)).unwrap();
        let container: LocationContainer = serde_json::from_str(&json).unwrap();
        assert_eq!(container.id, id);
        assert_eq!(&container.into_location(Geometry::Grid2D).unwrap(), location);
    }
}

#[test]
fn test_3d_run_keeps_invariants() {
    let config = PottsConfig {
        audit_each_tick: true,
        audit_threads: 2,
        ..PottsConfig::new(10, 10, 10)
    };
    let mut potts = Potts::new(config).unwrap();
    let mut cube = Vec::new();
    for x in 3..7 {
        for y in 3..7 {
            for z in 3..7 {
                cube.push(Voxel::new(x, y, z));
            }
        }
    }
    let params = CellParams::new(1, 64.0, 96.0).with_lambdas(1.0, 0.05);
    let id = potts.add_cell(params, cube).unwrap();

    let mut rng = potts.config().rng();
    potts.step(&mut rng).unwrap();
    let daughter = potts.divide(id, &mut rng).unwrap();
    potts.step(&mut rng).unwrap();

    assert_conserved(&potts);
    for cid in [id, daughter] {
        let location = &potts.cell(cid).unwrap().location;
        assert!(is_connected(location.voxels(), Geometry::Grid3D));
    }
    potts.audit().unwrap();
}

#[test]
fn test_divided_region_cells_reload_exactly() {
    let mut potts = Potts::new(PottsConfig::new(16, 16, 1)).unwrap();
    let nucleus = RegionParams {
        target_volume: 1.0,
        ..RegionParams::default()
    };
    let params = CellParams::new(1, 16.0, 16.0)
        .with_region(Region::Default, RegionParams::default())
        .with_region(Region::Nucleus, nucleus);
    let id = potts.add_cell(params, block(4, 4, 4, 4)).unwrap();

    // A one-voxel nucleus ends up empty in one of the halves
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let daughter = potts.divide(id, &mut rng).unwrap();
    let nuclei: i64 = [id, daughter]
        .iter()
        .map(|&cid| potts.cell(cid).unwrap().location.region_volume(Region::Nucleus))
        .sum();
    assert_eq!(nuclei, 1);

    for cid in [id, daughter] {
        let location = &potts.cell(cid).unwrap().location;
        let container = location.convert(cid);
        let rebuilt = container.into_location(Geometry::Grid2D).unwrap();
        assert_eq!(&rebuilt, location);
        assert_eq!(rebuilt.convert(cid), container);
    }
    potts.audit().unwrap();
}
