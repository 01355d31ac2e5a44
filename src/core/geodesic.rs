//! Vincenty inverse geodesic on an oblate spheroid.

use crate::domain::model::Coordinate;
use std::f64::consts::PI;
use thiserror::Error;

pub const DEFAULT_TOLERANCE: f64 = 1e-12;
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// 長半軸 (m)
    pub a: f64,
    /// 短半軸 (m)
    pub b: f64,
    /// 扁率
    pub f: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        b: 6_378_137.0 * (1.0 - 1.0 / 298.257_223_563),
        f: 1.0 / 298.257_223_563,
    };
    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        b: 6_378_137.0 * (1.0 - 1.0 / 298.257_222_101),
        f: 1.0 / 298.257_222_101,
    };

    pub fn from_flattening(a: f64, f: f64) -> Self {
        Self { a, b: a * (1.0 - f), f }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeodesicError {
    #[error("lambda failed to converge after {iterations} iterations")]
    NonConvergence { iterations: usize },
}

#[derive(Debug, Clone)]
pub struct Vincenty {
    ellipsoid: Ellipsoid,
    tolerance: f64,
    max_iterations: usize,
}

impl Default for Vincenty {
    fn default() -> Self {
        Self::new(Ellipsoid::WGS84)
    }
}

impl Vincenty {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self {
            ellipsoid,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Geodesic distance in meters.
    ///
    /// Fails with [`GeodesicError::NonConvergence`] for antipodal and
    /// near-antipodal pairs instead of returning an inaccurate value.
    pub fn distance(&self, from: &Coordinate, to: &Coordinate) -> Result<f64, GeodesicError> {
        if from == to {
            return Ok(0.0);
        }

        let Ellipsoid { a, b, f } = self.ellipsoid;

        let delta_lon = wrap_degrees(to.longitude() - from.longitude());
        let l = delta_lon.to_radians();

        let u1 = ((1.0 - f) * from.latitude().to_radians().tan()).atan();
        let u2 = ((1.0 - f) * to.latitude().to_radians().tan()).atan();
        let (sin_u1, cos_u1) = u1.sin_cos();
        let (sin_u2, cos_u2) = u2.sin_cos();

        let mut lambda = l;
        let mut converged = false;

        let mut sin_sigma = 0.0;
        let mut cos_sigma = 0.0;
        let mut sigma = 0.0;
        let mut cos_sq_alpha = 0.0;
        let mut cos_2sigma_m = 0.0;

        for iteration in 1..=self.max_iterations {
            let (sin_lambda, cos_lambda) = lambda.sin_cos();

            sin_sigma = (cos_u2 * sin_lambda).hypot(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
            if sin_sigma == 0.0 {
                // 重合點
                return Ok(0.0);
            }
            cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
            sigma = sin_sigma.atan2(cos_sigma);

            let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
            cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
            // 赤道線上 cos²α = 0
            cos_2sigma_m = if cos_sq_alpha != 0.0 {
                cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
            } else {
                0.0
            };

            let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
            let previous = lambda;
            lambda = l
                + (1.0 - c)
                    * f
                    * sin_alpha
                    * (sigma
                        + c * sin_sigma
                            * (cos_2sigma_m
                                + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

            if lambda.abs() > PI {
                return Err(GeodesicError::NonConvergence {
                    iterations: iteration,
                });
            }
            if (lambda - previous).abs() <= self.tolerance {
                converged = true;
                break;
            }
        }

        if !converged {
            return Err(GeodesicError::NonConvergence {
                iterations: self.max_iterations,
            });
        }

        let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
        let big_a =
            1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
        let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
        let delta_sigma = big_b
            * sin_sigma
            * (cos_2sigma_m
                + big_b / 4.0
                    * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                        - big_b / 6.0
                            * cos_2sigma_m
                            * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                            * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));

        Ok(b * big_a * (sigma - delta_sigma))
    }
}

/// 將經度差收斂到 [-180, 180)
fn wrap_degrees(degrees: f64) -> f64 {
    if (-180.0..180.0).contains(&degrees) {
        degrees
    } else {
        (degrees + 180.0).rem_euclid(360.0) - 180.0
    }
}
