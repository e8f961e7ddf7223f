// Integration tests for building materials and sampling collisions through them

use mixtures_for_mc::constants::{AVOGADRO, BARNS_PER_CM2};
use mixtures_for_mc::{
    CollisionMode, Config, Material, MaterialError, Materials, Particle, ParticleBank,
    ParticleType, TabulatedAtom,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;

fn atom(name: &str, atomic_weight: f64, scattering: f64, absorption: f64) -> Arc<TabulatedAtom> {
    let json = format!(
        r#"{{
            "name": "{name}",
            "atomic_weight": {atomic_weight},
            "reactions": [
                {{ "mt": 2, "class": "scattering", "energy": [1e-5, 20.0], "cross_section": [{scattering}, {scattering}] }},
                {{ "mt": 102, "class": "absorption", "energy": [1e-5, 20.0], "cross_section": [{absorption}, {absorption}] }}
            ]
        }}"#
    );
    Arc::new(TabulatedAtom::from_json_str(&json).unwrap())
}

fn centers() -> HashMap<String, Arc<TabulatedAtom>> {
    HashMap::from([
        ("light".to_string(), atom("light", 10.0, 3.0, 1.0)),
        ("heavy".to_string(), atom("heavy", 20.0, 6.0, 0.0)),
        ("flat".to_string(), atom("flat", 7.0, 2.5, 0.0)),
    ])
}

#[test]
fn test_weight_fractions_with_mass_density() {
    let centers = centers();
    let material = Material::new(1, -1.0, &centers, &[-0.25, -0.75], &["light", "heavy"]).unwrap();

    let expected = 1.0 / 16.0 * AVOGADRO * BARNS_PER_CM2;
    assert!((material.number_density() - expected).abs() < 1e-12 * expected);

    let light = material.constituent_number_density("light").unwrap();
    let heavy = material.constituent_number_density("heavy").unwrap();
    assert!((light / expected - 0.4).abs() < 1e-12);
    assert!((heavy / expected - 0.6).abs() < 1e-12);
}

#[test]
fn test_equivalent_constructions_agree() {
    let centers = centers();
    let names = ["light", "heavy"];
    let by_mass = Material::new(1, -1.0, &centers, &[-0.25, -0.75], &names).unwrap();
    let number_density = 1.0 / 16.0 * AVOGADRO * BARNS_PER_CM2;
    let by_number = Material::new(2, number_density, &centers, &[0.4, 0.6], &names).unwrap();

    for name in names {
        let a = by_mass.constituent_number_density(name).unwrap();
        let b = by_number.constituent_number_density(name).unwrap();
        assert!((a - b).abs() < 1e-12 * b, "{name}: {a} vs {b}");
    }

    for energy in [1e-3, 0.5, 14.1] {
        let a = by_mass.macroscopic_total_cross_section(energy);
        let b = by_number.macroscopic_total_cross_section(energy);
        assert!((a - b).abs() < 1e-12 * b);
    }
}

#[test]
fn test_single_constituent_constant_cross_section() {
    let centers = centers();
    let material = Material::new(5, 0.03, &centers, &[1.0], &["flat"]).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);

    for energy in [1e-4, 0.1, 1.0, 10.0] {
        assert!((material.macroscopic_total_cross_section(energy) - 0.03 * 2.5).abs() < 1e-15);
        for _ in 0..100 {
            assert_eq!(material.sample_collision_constituent(energy, &mut rng), 0);
        }
    }
}

#[test]
fn test_duplicate_constituent_is_rejected() {
    let centers = centers();
    let result = Material::new(1, 0.1, &centers, &[0.5, 0.5], &["light", "light"]);
    assert!(matches!(result, Err(MaterialError::DuplicateConstituent(name)) if name == "light"));
}

#[test]
fn test_mixed_signs_and_unknown_names() {
    let centers = centers();
    assert!(matches!(
        Material::new(1, 0.1, &centers, &[0.5, -0.5], &["light", "heavy"]),
        Err(MaterialError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        Material::new(1, 0.1, &centers, &[1.0], &["unobtainium"]),
        Err(MaterialError::UnknownConstituent(_))
    ));
    assert!(matches!(
        Material::new(1, 0.0, &centers, &[1.0], &["light"]),
        Err(MaterialError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_sampling_frequency_converges() {
    let centers = centers();
    let material = Material::new(1, 0.1, &centers, &[0.5, 0.5], &["light", "heavy"]).unwrap();
    let mut rng = StdRng::seed_from_u64(99);

    // light: 0.05 * 4 = 0.2, heavy: 0.05 * 6 = 0.3
    let n = 50_000;
    let light = (0..n)
        .filter(|_| material.sample_collision_constituent(1.0, &mut rng) == 0)
        .count();
    let frequency = light as f64 / n as f64;
    assert!((frequency - 0.4).abs() < 0.01, "light frequency {frequency}");
}

#[test]
fn test_collisions_follow_configured_mode() {
    let config = Config::from_json_str(
        r#"{
            "collision_mode": "survival_bias",
            "seed": 7,
            "materials": [
                { "id": 1, "density": 0.1, "constituents": [ { "name": "light", "fraction": 1.0 } ] }
            ]
        }"#,
    )
    .unwrap();
    let materials = Materials::from_definitions(&config.materials, centers()).unwrap();
    let material = materials.get(1).unwrap();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut bank = ParticleBank::new();

    let mut particle = Particle::new(ParticleType::Neutron, [0.0; 3], [0.0, 0.0, 1.0], 1.0);
    material.collide(config.collision_mode, &mut particle, &mut bank, &mut rng);
    assert!(particle.alive);
    assert!((particle.weight - 0.75).abs() < 1e-12);

    let mut absorbed = 0;
    for _ in 0..4000 {
        let mut particle = Particle::new(ParticleType::Neutron, [0.0; 3], [0.0, 0.0, 1.0], 1.0);
        material.collide(CollisionMode::Analogue, &mut particle, &mut bank, &mut rng);
        if !particle.alive {
            absorbed += 1;
        }
    }
    let fraction = absorbed as f64 / 4000.0;
    assert!((fraction - 0.25).abs() < 0.03, "absorbed fraction {fraction}");
}
