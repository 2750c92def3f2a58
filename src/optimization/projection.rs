/// Three-way sign: `-1` for negative values, `1` for positive values and `0` for zero.
#[inline]
pub fn sign(v: f64) -> f64 {
    if v < 0. {
        -1.
    } else if v > 0. {
        1.
    } else {
        0.
    }
}

/// Projects the raw gradient of a feature onto the orthant chosen for its weight.
///
/// The orthant is the sign of the weight, or when the weight is zero, the
/// side towards which the penalized gradient points. When the penalty's
/// subgradient can cancel the raw gradient the pseudo-gradient is zero.
///
/// # Arguments
/// * `x` - The current weight.
/// * `g` - The raw gradient of the smooth part of the objective.
/// * `rho1` - The l1 penalty weight, `0` returns `g` untouched.
#[inline]
pub fn pseudo_gradient(x: f64, g: f64, rho1: f64) -> f64 {
    if rho1 == 0. {
        g
    } else if x < 0. {
        g - rho1
    } else if x > 0. {
        g + rho1
    } else if g < -rho1 {
        g + rho1
    } else if g > rho1 {
        g - rho1
    } else {
        0.
    }
}
