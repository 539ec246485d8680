use nalgebra::{Matrix3, SMatrix, SymmetricEigen, Vector3};

use crate::error::{GeometryError, GeometryResult};

/// Below this |w| a projected point is at infinity
const W_EPSILON: f64 = 1e-12;

/// Planar projective transform `dst ~ H * [x, y, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography(Matrix3<f64>);

impl Homography {
    pub fn identity() -> Self {
        Self(Matrix3::identity())
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self(Matrix3::new(1.0, 0.0, tx, 0.0, 1.0, ty, 0.0, 0.0, 1.0))
    }

    /// Wrap a matrix, scaling it so the bottom-right entry is 1 when possible
    pub fn from_matrix(m: Matrix3<f64>) -> Self {
        let scale = m[(2, 2)];
        if scale.abs() > W_EPSILON {
            Self(m / scale)
        } else {
            Self(m)
        }
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }

    pub fn determinant(&self) -> f64 {
        self.0.determinant()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    pub fn inverse(&self) -> Option<Homography> {
        self.0.try_inverse().map(Homography::from_matrix)
    }

    /// Map a point, `None` when it lands at infinity
    pub fn project(&self, p: [f64; 2]) -> Option<[f64; 2]> {
        let v = self.0 * Vector3::new(p[0], p[1], 1.0);
        if v[2].abs() < W_EPSILON {
            return None;
        }
        Some([v[0] / v[2], v[1] / v[2]])
    }

    /// Euclidean distance between `H(src)` and `dst`
    pub fn reprojection_error(&self, src: [f64; 2], dst: [f64; 2]) -> f64 {
        match self.project(src) {
            Some(p) => ((p[0] - dst[0]).powi(2) + (p[1] - dst[1]).powi(2)).sqrt(),
            None => f64::INFINITY,
        }
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

/// Similarity moving the centroid to the origin with mean distance sqrt(2)
fn normalizing_transform(pts: &[[f64; 2]]) -> Matrix3<f64> {
    let n = pts.len() as f64;
    let cx = pts.iter().map(|p| p[0]).sum::<f64>() / n;
    let cy = pts.iter().map(|p| p[1]).sum::<f64>() / n;
    let mean_dist = pts.iter().map(|p| (p[0] - cx).hypot(p[1] - cy)).sum::<f64>() / n;

    let s = if mean_dist > 1e-12 { std::f64::consts::SQRT_2 / mean_dist } else { 1.0 };
    Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

fn apply(t: &Matrix3<f64>, p: [f64; 2]) -> [f64; 2] {
    [t[(0, 0)] * p[0] + t[(0, 2)], t[(1, 1)] * p[1] + t[(1, 2)]]
}

/// Direct linear transform over all given pairs with Hartley normalization.
///
/// With exactly four pairs this is the minimal solver used by RANSAC; with
/// more it is the algebraic least-squares fit.
pub fn estimate_dlt(src: &[[f64; 2]], dst: &[[f64; 2]]) -> GeometryResult<Homography> {
    if src.len() < 4 || src.len() != dst.len() {
        return Err(GeometryError::InsufficientCorrespondences {
            needed: 4,
            src_len: src.len(),
            dst_len: dst.len(),
        });
    }

    let t_src = normalizing_transform(src);
    let t_dst = normalizing_transform(dst);

    // Accumulate A^T A row pair by row pair instead of building the 2n x 9 matrix
    let mut ata = SMatrix::<f64, 9, 9>::zeros();
    for (&s, &d) in src.iter().zip(dst) {
        let [sx, sy] = apply(&t_src, s);
        let [dx, dy] = apply(&t_dst, d);
        let rows = [
            [0.0, 0.0, 0.0, -sx, -sy, -1.0, dy * sx, dy * sy, dy],
            [sx, sy, 1.0, 0.0, 0.0, 0.0, -dx * sx, -dx * sy, -dx],
        ];
        for r in &rows {
            let r = SMatrix::<f64, 9, 1>::from_row_slice(r);
            ata += r * r.transpose();
        }
    }

    let eig = SymmetricEigen::new(ata);
    let min_idx = eig.eigenvalues.iamin();
    let h = eig.eigenvectors.column(min_idx);
    let h_norm = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]);

    let t_dst_inv = t_dst.try_inverse().ok_or(GeometryError::DegenerateConfiguration)?;
    let result = Homography::from_matrix(t_dst_inv * h_norm * t_src);
    if !result.is_finite() || result.determinant().abs() < W_EPSILON {
        return Err(GeometryError::DegenerateConfiguration);
    }
    Ok(result)
}
