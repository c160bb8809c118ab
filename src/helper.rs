use nalgebra::{Matrix3, Vector3};

use crate::radar::SPEED_OF_LIGHT;

/**
Builds the roll-pitch-yaw rotation used by every joint of the walking model.

ψ rotates about x (roll), θ about y (pitch) and φ about z (yaw). The result is
`Rz(φ) Ry(θ) Rx(ψ)` where each elementary matrix is written in the frame-rotation
(passive) form
```text
Rx = [1, 0, 0; 0, cos ψ, sin ψ; 0, -sin ψ, cos ψ]
Ry = [cos θ, 0, -sin θ; 0, 1, 0; sin θ, 0, cos θ]
Rz = [cos φ, sin φ, 0; -sin φ, cos φ, 0; 0, 0, 1]
```
Applied to a column vector. A positive pitch lifts a forward pointing vector (+x) towards +z.
*/
pub fn compose_rotation(ψ: f32, θ: f32, φ: f32) -> Matrix3<f32> {
    let (sψ, cψ) = ψ.sin_cos();
    let (sθ, cθ) = θ.sin_cos();
    let (sφ, cφ) = φ.sin_cos();

    Matrix3::new(
        cθ * cφ,
        sψ * sθ * cφ + cψ * sφ,
        -cψ * sθ * cφ + sψ * sφ,
        //
        -cθ * sφ,
        -sψ * sθ * sφ + cψ * cφ,
        cψ * sθ * sφ + sψ * cφ,
        //
        sθ,
        -sψ * cθ,
        cψ * cθ,
    )
}

// Rotation about y only. The limb joints are all hinges about the lateral axis.
pub fn pitch(θ: f32) -> Matrix3<f32> {
    compose_rotation(0., θ, 0.)
}

pub fn midpoint(a: &Vector3<f32>, b: &Vector3<f32>) -> Vector3<f32> {
    (a + b) / 2.
}

pub fn wavelength(f: f32) -> f32 {
    SPEED_OF_LIGHT / f
}

pub fn decibels_or_else(x: f32, or: f32) -> f32 {
    if x <= 0. {
        or
    } else {
        10. * x.log10()
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Vector3};

    use super::{compose_rotation, decibels_or_else, midpoint, pitch, wavelength};

    #[test]
    fn rotation_is_orthonormal() {
        let r = compose_rotation(0.3, -1.1, 2.4);

        assert_relative_eq!(r * r.transpose(), Matrix3::identity(), epsilon = 1e-6);
        assert_relative_eq!(r.determinant(), 1., epsilon = 1e-6);
    }

    #[test]
    fn rotation_composes_yaw_pitch_roll() {
        let (ψ, θ, φ) = (0.4, 0.7, -0.2);
        let composed = compose_rotation(0., 0., φ) * compose_rotation(0., θ, 0.) * compose_rotation(ψ, 0., 0.);

        assert_relative_eq!(compose_rotation(ψ, θ, φ), composed, epsilon = 1e-6);
    }

    #[test]
    fn positive_pitch_lifts_forward_vector() {
        let v = pitch(30f32.to_radians()) * Vector3::new(1., 0., 0.);

        assert_relative_eq!(v, Vector3::new(0.8660254, 0., 0.5), epsilon = 1e-6);
    }

    #[test]
    fn helpers() {
        assert_relative_eq!(wavelength(24e9), 0.012491352, epsilon = 1e-9);
        assert_relative_eq!(decibels_or_else(100., -200.), 20.);
        assert_relative_eq!(decibels_or_else(0., -200.), -200.);
        assert_relative_eq!(
            midpoint(&Vector3::new(0., 2., 4.), &Vector3::new(2., 0., 0.)),
            Vector3::new(1., 1., 2.)
        );
    }
}
