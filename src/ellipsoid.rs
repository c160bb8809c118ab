use std::f32::consts::PI;

use crate::{
    error::{require_positive, Result},
    helper_traits::SphericalFunction,
};

/**
Monostatic radar cross section of a triaxial ellipsoid with semi-axes `a`, `b`, `c`,
where `c` is the axis of symmetry of the body part it stands in for.

φ is the azimuth and θ the angle between the line of sight and the `c` axis.
Equation 4.40 in [1]:
```text
σ = π a² b² c² / (a² sin²θ cos²φ + b² sin²θ sin²φ + c² cos²θ)²
```

A degenerate ellipsoid with a zero semi-axis has no cross section and yields 0.

[1] V.C. Chen, "The Micro-Doppler Effect in Radar", 2011.
*/
pub fn ellipsoid_rcs(a: f32, b: f32, c: f32, φ: f32, θ: f32) -> f32 {
    if a * b * c == 0. {
        return 0.;
    }

    let (sθ, cθ) = θ.sin_cos();
    let (sφ, cφ) = φ.sin_cos();
    let denom = a * a * sθ * sθ * cφ * cφ + b * b * sθ * sθ * sφ * sφ + c * c * cθ * cθ;

    PI * (a * b * c).powi(2) / (denom * denom)
}

// The scattering shape approximating a body part.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl Ellipsoid {
    pub fn new(a: f32, b: f32, c: f32) -> Result<Ellipsoid> {
        Ok(Ellipsoid {
            a: require_positive("ellipsoid.a", a)?,
            b: require_positive("ellipsoid.b", b)?,
            c: require_positive("ellipsoid.c", c)?,
        })
    }
}

impl SphericalFunction for Ellipsoid {
    fn lookup(&self, az: f32, el: f32) -> f32 {
        ellipsoid_rcs(self.a, self.b, self.c, az, el)
    }
}
