//! Constant-velocity 2-D Kalman filter, one instance per live track.
//!
//! State is `[x, y, vx, vy]` in a local flat-earth tangent plane (meters,
//! meters-per-second); measurements are `[x, y]`. The covariance is kept as
//! a flat row-major 4x4 array rather than pulled in through a linear-algebra
//! crate, the same way the reference ARPA tracker keeps its filter state as
//! a flat array of `f64`s instead of wrapping a matrix type.

use cuas_core::types::{GeoPosition, NedVelocity};

type Mat4 = [f64; 16];
type Vec4 = [f64; 4];

fn mat4_mul(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [0.0; 16];
    for r in 0..4 {
        for c in 0..4 {
            let mut sum = 0.0;
            for k in 0..4 {
                sum += a[r * 4 + k] * b[k * 4 + c];
            }
            out[r * 4 + c] = sum;
        }
    }
    out
}

fn mat4_transpose(a: &Mat4) -> Mat4 {
    let mut out = [0.0; 16];
    for r in 0..4 {
        for c in 0..4 {
            out[c * 4 + r] = a[r * 4 + c];
        }
    }
    out
}

fn mat4_add(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [0.0; 16];
    for i in 0..16 {
        out[i] = a[i] + b[i];
    }
    out
}

fn mat4_vec4_mul(a: &Mat4, v: &Vec4) -> Vec4 {
    let mut out = [0.0; 4];
    for r in 0..4 {
        out[r] = (0..4).map(|c| a[r * 4 + c] * v[c]).sum();
    }
    out
}

fn identity4(diag: f64) -> Mat4 {
    let mut m = [0.0; 16];
    for i in 0..4 {
        m[i * 4 + i] = diag;
    }
    m
}

/// Tuning for a filter's process and measurement noise.
#[derive(Debug, Clone, Copy)]
pub struct KalmanNoise {
    /// Process noise variance, applied per second of `predict`.
    pub process_variance: f64,
    /// Measurement noise variance applied to each position update.
    pub measurement_variance: f64,
}

impl Default for KalmanNoise {
    fn default() -> Self {
        Self { process_variance: 1.0, measurement_variance: 25.0 }
    }
}

/// A single track's constant-velocity Kalman filter over a local tangent
/// plane centered on the filter's first measurement.
#[derive(Debug, Clone)]
pub struct KalmanFilter2D {
    origin: GeoPosition,
    state: Vec4,
    covariance: Mat4,
    noise: KalmanNoise,
}

impl KalmanFilter2D {
    /// Seeds the filter from a first measurement: position exact, velocity
    /// zero with high variance (we have no evidence about motion yet).
    pub fn seed(origin: GeoPosition, noise: KalmanNoise) -> Self {
        let mut covariance = identity4(0.0);
        covariance[0 * 4 + 0] = noise.measurement_variance;
        covariance[1 * 4 + 1] = noise.measurement_variance;
        covariance[2 * 4 + 2] = 1_000.0;
        covariance[3 * 4 + 3] = 1_000.0;
        Self { origin, state: [0.0, 0.0, 0.0, 0.0], covariance, noise }
    }

    fn tangent_xy(&self, pos: &GeoPosition) -> (f64, f64) {
        let d = crate::geodesy::horizontal_distance(&self.origin, pos);
        if d < 1e-9 {
            return (0.0, 0.0);
        }
        let bearing_rad = crate::geodesy::bearing(&self.origin, pos).to_radians();
        (d * bearing_rad.cos(), d * bearing_rad.sin())
    }

    fn xy_to_geo(&self, x: f64, y: f64) -> GeoPosition {
        use cuas_core::constants::METERS_PER_DEGREE;
        let lat_rad = self.origin.lat_deg.to_radians();
        let lat_deg = self.origin.lat_deg + x / METERS_PER_DEGREE;
        let lon_deg = self.origin.lon_deg + y / (METERS_PER_DEGREE * lat_rad.cos());
        GeoPosition::new(lat_deg, lon_deg, self.origin.alt_m)
    }

    /// Advances the state estimate by `dt` seconds with no new measurement.
    pub fn predict(&mut self, dt: f64) {
        let f: Mat4 = [
            1.0, 0.0, dt, 0.0, //
            0.0, 1.0, 0.0, dt, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        self.state = mat4_vec4_mul(&f, &self.state);

        let ft = mat4_transpose(&f);
        let fp = mat4_mul(&f, &self.covariance);
        let fpft = mat4_mul(&fp, &ft);

        let q_scalar = self.noise.process_variance * dt;
        let mut q = identity4(0.0);
        q[0 * 4 + 0] = q_scalar;
        q[1 * 4 + 1] = q_scalar;
        q[2 * 4 + 2] = q_scalar;
        q[3 * 4 + 3] = q_scalar;

        self.covariance = mat4_add(&fpft, &q);
    }

    /// Incorporates a new position measurement (2-D: x, y only).
    pub fn update(&mut self, measurement: &GeoPosition) {
        let (mx, my) = self.tangent_xy(measurement);
        let r = self.noise.measurement_variance;

        // H = [[1,0,0,0],[0,1,0,0]]; everything below is that projection
        // specialized by hand rather than carried as a general 2x4 matrix.
        let innovation = [mx - self.state[0], my - self.state[1]];

        let s00 = self.covariance[0 * 4 + 0] + r;
        let s01 = self.covariance[0 * 4 + 1];
        let s10 = self.covariance[1 * 4 + 0];
        let s11 = self.covariance[1 * 4 + 1] + r;

        let det = s00 * s11 - s01 * s10;
        if det.abs() < 1e-12 {
            return;
        }
        let inv_det = 1.0 / det;
        let s_inv = [s11 * inv_det, -s01 * inv_det, -s10 * inv_det, s00 * inv_det];

        // K = P H^T S^-1, a 4x2 matrix; compute column-by-column.
        let mut k = [0.0; 8];
        for row in 0..4 {
            let ph0 = self.covariance[row * 4 + 0];
            let ph1 = self.covariance[row * 4 + 1];
            k[row * 2 + 0] = ph0 * s_inv[0] + ph1 * s_inv[2];
            k[row * 2 + 1] = ph0 * s_inv[1] + ph1 * s_inv[3];
        }

        for row in 0..4 {
            self.state[row] += k[row * 2 + 0] * innovation[0] + k[row * 2 + 1] * innovation[1];
        }

        // P' = (I - K H) P
        let mut kh = [0.0; 16];
        for row in 0..4 {
            kh[row * 4 + 0] = k[row * 2 + 0];
            kh[row * 4 + 1] = k[row * 2 + 1];
        }
        let i_minus_kh: Mat4 = {
            let mut m = identity4(1.0);
            for i in 0..16 {
                m[i] -= kh[i];
            }
            m
        };
        self.covariance = mat4_mul(&i_minus_kh, &self.covariance);
    }

    /// Current filtered position estimate.
    pub fn position(&self) -> GeoPosition {
        self.xy_to_geo(self.state[0], self.state[1])
    }

    /// Current filtered velocity estimate (down component always zero; this
    /// filter only tracks the horizontal plane).
    pub fn velocity(&self) -> NedVelocity {
        NedVelocity::new(self.state[2], self.state[3], 0.0)
    }
}
