// Direction and energy updates shared by the collision routines

use crate::particle::Particle;
use nalgebra::Vector3;
use rand::Rng;

/// Rotate a direction vector by angle theta (cos(theta)=mu) around arbitrary axis
/// This rotates u_old to a new direction with cosine mu relative to the incoming direction
pub fn rotate_direction_3d(u_old: &Vector3<f64>, mu: f64, phi: f64) -> Vector3<f64> {
    let sin_theta = (1.0 - mu * mu).max(0.0).sqrt();

    // Find a perpendicular vector to u_old
    let perp = if u_old.x.abs() < 0.99 {
        Vector3::new(1.0, 0.0, 0.0).cross(u_old).normalize()
    } else {
        Vector3::new(0.0, 1.0, 0.0).cross(u_old).normalize()
    };
    let ortho = u_old.cross(&perp);

    mu * u_old + sin_theta * phi.cos() * perp + sin_theta * phi.sin() * ortho
}

/// Sample a unit vector uniformly on the sphere.
pub fn sample_isotropic_direction<R: Rng + ?Sized>(rng: &mut R) -> [f64; 3] {
    let mu = 2.0 * rng.gen::<f64>() - 1.0;
    let phi = 2.0 * std::f64::consts::PI * rng.gen::<f64>();
    let sin_theta = (1.0 - mu * mu).max(0.0).sqrt();

    [sin_theta * phi.cos(), sin_theta * phi.sin(), mu]
}

/// Turn the particle through a scattering cosine `mu` with a random azimuth.
pub fn scatter_direction<R: Rng + ?Sized>(particle: &mut Particle, mu: f64, rng: &mut R) {
    let phi = 2.0 * std::f64::consts::PI * rng.gen::<f64>();
    let u = Vector3::from(particle.direction);
    let u_new = rotate_direction_3d(&u, mu, phi).normalize();

    particle.direction = [u_new.x, u_new.y, u_new.z];
}

/// Isotropic scatter that keeps `1 - energy_loss_fraction` of the energy.
pub fn isotropic_scatter<R: Rng + ?Sized>(
    particle: &mut Particle,
    energy_loss_fraction: f64,
    rng: &mut R,
) {
    debug_assert!((0.0..=1.0).contains(&energy_loss_fraction));

    let mu = 2.0 * rng.gen::<f64>() - 1.0;
    scatter_direction(particle, mu, rng);
    particle.energy *= 1.0 - energy_loss_fraction;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn norm(v: [f64; 3]) -> f64 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn test_rotate_direction_preserves_norm_and_cosine() {
        let u = Vector3::new(0.0, 0.6, 0.8);
        for &(mu, phi) in &[(0.3, 0.1), (-0.9, 2.0), (1.0, 4.0), (0.0, 5.5)] {
            let v = rotate_direction_3d(&u, mu, phi);
            assert!((v.norm() - 1.0).abs() < 1e-12);
            assert!((v.dot(&u) - mu).abs() < 1e-12);
        }
    }

    #[test]
    fn test_isotropic_direction_is_unit_and_centred() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 20000;
        let mut mean = [0.0; 3];

        for _ in 0..n {
            let d = sample_isotropic_direction(&mut rng);
            assert!((norm(d) - 1.0).abs() < 1e-12);
            for k in 0..3 {
                mean[k] += d[k] / n as f64;
            }
        }

        for m in mean {
            assert!(m.abs() < 0.02, "mean component {}", m);
        }
    }

    #[test]
    fn test_isotropic_scatter_energy_and_direction() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut particle = Particle::new(ParticleType::Photon, [0.0; 3], [1.0, 0.0, 0.0], 2.0);

        isotropic_scatter(&mut particle, 0.25, &mut rng);

        assert!((particle.energy - 1.5).abs() < 1e-12);
        assert!((norm(particle.direction) - 1.0).abs() < 1e-12);
    }
}
