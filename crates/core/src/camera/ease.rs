/// Cubic ease-in-out on `[0, 1]`.
///
/// `4t³` for the first half, `1 − (−2t + 2)³ / 2` for the second. The curve
/// passes exactly through `(0, 0)`, `(0.5, 0.5)` and `(1, 1)`.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
