use super::projection::{pseudo_gradient, sign};
use crate::{config::RpropConfig, storage::Slab};

/// Resilient propagation with an orthant-wise l1 adaptation.
///
/// Each feature keeps its own step size, grown while consecutive gradients
/// agree in sign and shrunk when they disagree. With an l1 penalty the
/// decisions use a pseudo-gradient projected on the weight's orthant, and a
/// step is dropped whenever it wouldn't decrease the penalized objective
/// inside that orthant.
///
/// The agreement test compares the previous *raw* gradient with the current
/// *pseudo*-gradient.
#[derive(Debug, Clone, Copy)]
pub struct Rprop {
    step_min: f64,
    step_max: f64,
    step_inc: f64,
    step_dec: f64,
    rho1: f64,
    backtracking: bool,
}

impl Rprop {
    /// Creates a new `Rprop` from an already validated configuration.
    pub fn new(config: &RpropConfig) -> Self {
        Self {
            step_min: config.step_min,
            step_max: config.step_max,
            step_inc: config.step_inc,
            step_dec: config.step_dec,
            rho1: config.rho1,
            backtracking: config.backtracking,
        }
    }

    /// Updates every feature of the slab, weights and state in place.
    ///
    /// Touches nothing outside the slab, so disjoint slabs can be updated concurrently.
    pub fn update(&self, slab: &mut Slab<'_>) {
        slab.weights
            .iter_mut()
            .zip(slab.grad.iter_mut())
            .zip(slab.prev_grad.iter_mut())
            .zip(slab.step.iter_mut())
            .zip(slab.delta.iter_mut())
            .for_each(|((((x, g), gp), stp), dlt)| self.update_feature(x, g, gp, stp, dlt));
    }

    #[inline]
    fn update_feature(&self, x: &mut f64, g: &mut f64, gp: &mut f64, stp: &mut f64, dlt: &mut f64) {
        let l1 = self.rho1 != 0.;
        let pg = pseudo_gradient(*x, *g, self.rho1);
        let agreement = *gp * pg;

        if agreement > 0. {
            *stp = (*stp * self.step_inc).min(self.step_max);
            *dlt = *stp * -sign(*g);
            if l1 && *dlt * pg >= 0. {
                *dlt = 0.;
            }
            *x += *dlt;
        } else if agreement < 0. {
            *stp = (*stp * self.step_dec).max(self.step_min);
            if self.backtracking {
                *x -= *dlt;
            }
            *g = 0.;
        } else {
            *dlt = *stp * -sign(pg);
            if l1 && *dlt * pg >= 0. {
                *dlt = 0.;
            }
            *x += *dlt;
        }

        *gp = *g;
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;
    use crate::storage::OptimizerState;

    const EPS: f64 = 1e-12;

    fn trace_config() -> RpropConfig {
        RpropConfig {
            step_min: 1e-6,
            step_max: 50.,
            step_inc: 1.2,
            step_dec: 0.5,
            rho1: 0.,
            backtracking: true,
        }
    }

    /// A single feature with hand-picked state.
    struct Feature {
        x: f64,
        g: f64,
        gp: f64,
        stp: f64,
        dlt: f64,
    }

    impl Feature {
        fn new(x: f64, stp: f64) -> Self {
            Self {
                x,
                g: 0.,
                gp: 0.,
                stp,
                dlt: 0.,
            }
        }

        fn step(&mut self, rprop: &Rprop, g: f64) {
            self.g = g;
            let mut slab = Slab::new(
                0,
                std::slice::from_mut(&mut self.x),
                std::slice::from_mut(&mut self.g),
                std::slice::from_mut(&mut self.gp),
                std::slice::from_mut(&mut self.stp),
                std::slice::from_mut(&mut self.dlt),
            );
            rprop.update(&mut slab);
        }
    }

    #[test]
    fn concrete_trace_without_l1() {
        let rprop = Rprop::new(&trace_config());
        let mut feature = Feature::new(0., 0.1);

        feature.step(&rprop, 1.);
        assert!((feature.x - -0.10).abs() < EPS);
        assert!((feature.stp - 0.10).abs() < EPS);
        assert_eq!(feature.gp, 1.);

        feature.step(&rprop, 1.);
        assert!((feature.x - -0.22).abs() < EPS);
        assert!((feature.stp - 0.12).abs() < EPS);
        assert_eq!(feature.gp, 1.);

        feature.step(&rprop, -1.);
        assert!((feature.x - -0.10).abs() < EPS);
        assert!((feature.stp - 0.06).abs() < EPS);
        assert_eq!(feature.gp, 0.);
        assert_eq!(feature.g, 0.);
    }

    #[test]
    fn disagreement_reverts_exactly() {
        let rprop = Rprop::new(&trace_config());
        let mut feature = Feature::new(0.75, 0.25);

        feature.step(&rprop, 0.5);
        assert_eq!(feature.x, 0.5);

        feature.step(&rprop, -0.5);
        assert_eq!(feature.x, 0.75);
        assert_eq!(feature.stp, 0.125);
    }

    #[test]
    fn disagreement_after_acceleration_reverts_last_step_only() {
        let config = RpropConfig {
            step_inc: 1.5,
            ..trace_config()
        };
        let rprop = Rprop::new(&config);
        let mut feature = Feature::new(4., 0.5);

        feature.step(&rprop, 1.);
        feature.step(&rprop, 1.);
        assert_eq!(feature.x, 2.75);

        feature.step(&rprop, -1.);
        assert_eq!(feature.x, 3.5);
        assert_eq!(feature.stp, 0.375);
    }

    #[test]
    fn disagreement_without_backtracking_keeps_weight() {
        let config = RpropConfig {
            backtracking: false,
            ..trace_config()
        };
        let rprop = Rprop::new(&config);
        let mut feature = Feature::new(0.75, 0.25);

        feature.step(&rprop, 0.5);
        feature.step(&rprop, -0.5);

        assert_eq!(feature.x, 0.5);
        assert_eq!(feature.stp, 0.125);
        assert_eq!(feature.gp, 0.);
    }

    #[test]
    fn neutral_after_disagreement() {
        let rprop = Rprop::new(&trace_config());
        let mut feature = Feature::new(0., 0.25);

        feature.step(&rprop, 1.);
        feature.step(&rprop, -1.);
        assert_eq!(feature.gp, 0.);

        // the zeroed history makes the next comparison neutral
        feature.step(&rprop, -1.);
        assert_eq!(feature.stp, 0.125);
        assert_eq!(feature.dlt, 0.125);
        assert_eq!(feature.x, 0.125);
    }

    #[test]
    fn l1_guard_blocks_step_leaving_orthant() {
        let config = RpropConfig {
            rho1: 1.,
            ..trace_config()
        };
        let rprop = Rprop::new(&config);

        // x > 0 and the raw gradient is small and negative, so the raw step
        // goes up while the pseudo-gradient (g + rho1 > 0) asks to go down.
        let mut feature = Feature::new(0.5, 0.25);
        feature.gp = 0.2;
        feature.step(&rprop, -0.3);

        assert_eq!(feature.dlt, 0.);
        assert_eq!(feature.x, 0.5);
        assert!((feature.stp - 0.3).abs() < EPS);
        assert_eq!(feature.gp, -0.3);
    }

    #[test]
    fn l1_guard_blocks_step_on_negative_weights() {
        let config = RpropConfig {
            rho1: 1.,
            ..trace_config()
        };
        let rprop = Rprop::new(&config);

        let mut feature = Feature::new(-0.5, 0.25);
        feature.gp = -0.2;
        feature.step(&rprop, 0.3);

        assert_eq!(feature.dlt, 0.);
        assert_eq!(feature.x, -0.5);
    }

    #[test]
    fn l1_keeps_zero_weight_in_flat_region() {
        let config = RpropConfig {
            rho1: 0.5,
            ..trace_config()
        };
        let rprop = Rprop::new(&config);
        let mut feature = Feature::new(0., 0.25);

        feature.step(&rprop, 0.4);
        assert_eq!(feature.x, 0.);
        assert_eq!(feature.dlt, 0.);
        assert_eq!(feature.gp, 0.4);
    }

    #[test]
    fn l1_neutral_step_follows_pseudo_gradient() {
        let config = RpropConfig {
            rho1: 0.5,
            ..trace_config()
        };
        let rprop = Rprop::new(&config);

        let mut feature = Feature::new(0., 0.25);
        feature.step(&rprop, 2.);
        assert_eq!(feature.x, -0.25);

        let mut feature = Feature::new(0.5, 0.25);
        feature.step(&rprop, -0.3);
        assert_eq!(feature.x, 0.25);
    }

    #[test]
    fn step_sizes_stay_within_bounds() {
        const FEATURES: usize = 32;
        const ITERATIONS: usize = 400;

        let mut rng = StdRng::seed_from_u64(7);

        for rho1 in [0., 0.3] {
            let config = RpropConfig {
                step_min: 1e-3,
                step_max: 2.,
                rho1,
                ..trace_config()
            };
            let rprop = Rprop::new(&config);

            let mut state = OptimizerState::new(FEATURES).unwrap();
            let mut weights = vec![0.; FEATURES];

            for _ in 0..ITERATIONS {
                let mut grad: Vec<f64> = (0..FEATURES)
                    .map(|_| match rng.random_range(0..4) {
                        0 => 0.,
                        _ => rng.random_range(-1.0..1.0),
                    })
                    .collect();

                let mut slab = state.slab(&mut weights, &mut grad).unwrap();
                rprop.update(&mut slab);

                for &stp in state.step() {
                    assert!((config.step_min..=config.step_max).contains(&stp));
                }
            }
        }
    }

    /// Textbook Rprop with weight-backtracking.
    fn classic_rprop(config: &RpropConfig, grads: &[f64], x: &mut f64) -> f64 {
        let (mut gp, mut stp, mut dlt) = (0., 0.1, 0.);

        for &g in grads {
            let mut g = g;
            if gp * g > 0. {
                stp = (stp * config.step_inc).min(config.step_max);
                dlt = -g.signum() * stp;
                *x += dlt;
            } else if gp * g < 0. {
                stp = (stp * config.step_dec).max(config.step_min);
                *x -= dlt;
                g = 0.;
            } else if g != 0. {
                dlt = -g.signum() * stp;
                *x += dlt;
            } else {
                dlt = 0.;
            }
            gp = g;
        }

        stp
    }

    #[test]
    fn without_l1_matches_classic_rprop() {
        const ITERATIONS: usize = 200;

        let config = trace_config();
        let rprop = Rprop::new(&config);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..20 {
            let grads: Vec<f64> = (0..ITERATIONS)
                .map(|_| match rng.random_range(0..5) {
                    0 => 0.,
                    _ => rng.random_range(-2.0..2.0),
                })
                .collect();

            let x0 = rng.random_range(-1.0..1.0);
            let mut feature = Feature::new(x0, 0.1);
            grads.iter().for_each(|&g| feature.step(&rprop, g));

            let mut expected_x = x0;
            let expected_stp = classic_rprop(&config, &grads, &mut expected_x);

            assert_eq!(feature.x, expected_x);
            assert_eq!(feature.stp, expected_stp);
        }
    }
}
