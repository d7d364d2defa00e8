use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Semi-implicit (symplectic) Euler
// ---------------------------------------------------------------------------

/// Single semi-implicit Euler step on a per-axis angle/rate pair.
///
/// The rate is updated first and the *new* rate moves the angle:
///   omega' = omega + alpha * dt
///   angle' = angle + omega' * dt
/// This ordering is fixed; there is no explicit-Euler or RK4 variant.
pub fn semi_implicit_euler_step(
    angle: &Vector3<f64>,
    rate: &Vector3<f64>,
    accel: &Vector3<f64>,
    dt: f64,
) -> (Vector3<f64>, Vector3<f64>) {
    let new_rate = rate + accel * dt;
    let new_angle = angle + new_rate * dt;
    (new_angle, new_rate)
}
