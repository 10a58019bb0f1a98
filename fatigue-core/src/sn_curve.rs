//! Stress-life (S-N, Wöhler) curve models.
//!
//! Every model converts in both directions between stress amplitude and
//! cycles to failure:
//!
//! - [`WohlerPowerLaw`]: N = C/σ^w, closed form both ways
//! - [`KohoutVechet`]: closed-form σ(N), N(σ) by Newton iteration
//! - [`Basquin`]: 2N = (σ/σf)^(1/b), used by the mean-stress corrections
//!
//! Parameters are validated once at construction; the models are immutable
//! afterwards and can be shared across threads.

use crate::error::{Error, Result, Warning};
use log::{debug, trace, warn};
use ndarray::{ArrayD, ArrayViewD, Zip};

/// S-N curve interface.
///
/// Both directions accept arrays of any shape and return arrays of the same
/// shape. Arguments must be strictly positive.
pub trait SnCurve: Send + Sync {
    /// Stress amplitude for the given lives.
    fn stress_amp(&self, life: ArrayViewD<'_, f64>) -> Result<ArrayD<f64>>;

    /// Cycles to failure for the given stress amplitudes.
    fn life(&self, stress_amp: ArrayViewD<'_, f64>) -> Result<ArrayD<f64>>;

    /// Model name for diagnostics.
    fn name(&self) -> &str;

    /// Scalar form of [`SnCurve::stress_amp`].
    fn stress_amp_at(&self, life: f64) -> Result<f64> {
        let input = ndarray::arr0(life).into_dyn();
        scalar(self.stress_amp(input.view())?)
    }

    /// Scalar form of [`SnCurve::life`].
    fn life_at(&self, stress_amp: f64) -> Result<f64> {
        let input = ndarray::arr0(stress_amp).into_dyn();
        scalar(self.life(input.view())?)
    }
}

fn scalar(values: ArrayD<f64>) -> Result<f64> {
    values
        .iter()
        .next()
        .copied()
        .ok_or_else(|| Error::Shape("expected a single value".into()))
}

/// Fail with [`Error::Domain`] if any value is not strictly positive.
///
/// NaN is not rejected here; it propagates through the formulas.
pub fn check_positive(values: &ArrayViewD<'_, f64>, name: &str) -> Result<()> {
    match values.iter().find(|&&v| v <= 0.0) {
        Some(v) => Err(Error::Domain(format!("{} must be positive, got {}", name, v))),
        None => Ok(()),
    }
}

/// Wöhler power law, N = C / σ^w.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WohlerPowerLaw {
    /// Curve constant C.
    sn_c: f64,
    /// Slope exponent w.
    sn_w: f64,
}

impl WohlerPowerLaw {
    /// Create a power law curve.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parameter`] if `sn_c` or `sn_w` is not positive.
    pub fn new(sn_c: f64, sn_w: f64) -> Result<Self> {
        if !(sn_c > 0.0) {
            return Err(Error::Parameter(format!("SN_C must be positive, got {}", sn_c)));
        }
        if !(sn_w > 0.0) {
            return Err(Error::Parameter(format!("SN_w must be positive, got {}", sn_w)));
        }
        Ok(Self { sn_c, sn_w })
    }

    pub fn sn_c(&self) -> f64 {
        self.sn_c
    }

    pub fn sn_w(&self) -> f64 {
        self.sn_w
    }
}

impl SnCurve for WohlerPowerLaw {
    fn stress_amp(&self, life: ArrayViewD<'_, f64>) -> Result<ArrayD<f64>> {
        check_positive(&life, "life")?;
        Ok(life.mapv(|n| (self.sn_c / n).powf(1.0 / self.sn_w)))
    }

    fn life(&self, stress_amp: ArrayViewD<'_, f64>) -> Result<ArrayD<f64>> {
        check_positive(&stress_amp, "stress amplitude")?;
        Ok(stress_amp.mapv(|s| self.sn_c / s.powf(self.sn_w)))
    }

    fn name(&self) -> &str {
        "Wöhler power law"
    }
}

/// Newton iteration settings for inverting curves without a closed form.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct NewtonConfig {
    /// Starting life for every element.
    pub initial_life: f64,
    /// Convergence tolerance on the largest relative step.
    pub tolerance: f64,
    /// Iteration cap.
    pub max_iterations: usize,
    /// Derivative magnitudes below this are clamped to it (keeping sign).
    pub min_derivative: f64,
    /// Lower bound applied to every iterate.
    pub min_life: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            initial_life: 1e5,
            tolerance: 1e-6,
            max_iterations: 100,
            min_derivative: 1e-15,
            min_life: 1.0,
        }
    }
}

/// Iteration statistics of a Newton solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonStats {
    /// Iterations performed.
    pub iterations: usize,
    /// Whether every element met the tolerance.
    pub converged: bool,
    /// Largest relative step of the last iteration.
    pub max_relative_step: f64,
}

/// Result of a Newton life solve.
#[derive(Debug, Clone)]
pub struct NewtonSolution {
    /// Best available life estimate, same shape as the input.
    pub life: ArrayD<f64>,
    pub stats: NewtonStats,
}

impl NewtonSolution {
    /// The convergence warning, if the iteration cap was reached.
    pub fn warning(&self) -> Option<Warning> {
        (!self.stats.converged).then_some(Warning::Convergence {
            iterations: self.stats.iterations,
            max_relative_step: self.stats.max_relative_step,
        })
    }
}

/// Kohout-Věchet S-N curve.
///
/// σ(N) = A·(C·(N + B)/(N + C))^β with A, B, C > 0 and β < 0. The curve
/// flattens towards A·B^β for N → 0 and A·C^β for N → ∞, so the inverse is
/// solved numerically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KohoutVechet {
    a: f64,
    b: f64,
    c: f64,
    beta: f64,
    newton: NewtonConfig,
}

impl KohoutVechet {
    /// Create a Kohout-Věchet curve with default Newton settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parameter`] unless A, B, C are positive and β is negative.
    pub fn new(a: f64, b: f64, c: f64, beta: f64) -> Result<Self> {
        for (name, value) in [("A", a), ("B", b), ("C", c)] {
            if !(value > 0.0) {
                return Err(Error::Parameter(format!("{} must be positive, got {}", name, value)));
            }
        }
        if !(beta < 0.0) {
            return Err(Error::Parameter(format!("beta must be negative, got {}", beta)));
        }
        Ok(Self {
            a,
            b,
            c,
            beta,
            newton: NewtonConfig::default(),
        })
    }

    /// Replace the Newton settings used by [`SnCurve::life`].
    pub fn with_newton(mut self, newton: NewtonConfig) -> Result<Self> {
        if !(newton.tolerance > 0.0) || newton.max_iterations == 0 {
            return Err(Error::Parameter(
                "Newton tolerance must be positive and max_iterations non-zero".into(),
            ));
        }
        if !(newton.initial_life > 0.0) || !(newton.min_life > 0.0) || !(newton.min_derivative > 0.0) {
            return Err(Error::Parameter(
                "Newton initial_life, min_life and min_derivative must be positive".into(),
            ));
        }
        self.newton = newton;
        Ok(self)
    }

    pub fn newton(&self) -> &NewtonConfig {
        &self.newton
    }

    #[inline]
    fn ratio(&self, n: f64) -> f64 {
        self.c * (n + self.b) / (n + self.c)
    }

    /// σ(N) for a single life.
    #[inline]
    pub fn amplitude(&self, n: f64) -> f64 {
        self.a * self.ratio(n).powf(self.beta)
    }

    /// dσ/dN = A·β·g^(β−1)·C(C − B)/(N + C)², g = C(N + B)/(N + C).
    #[inline]
    pub fn amplitude_derivative(&self, n: f64) -> f64 {
        let g = self.ratio(n);
        let dg = self.c * (self.c - self.b) / (n + self.c).powi(2);
        self.a * self.beta * g.powf(self.beta - 1.0) * dg
    }

    /// Solve σ(N) = σ_target for every element by Newton's method.
    ///
    /// The whole batch advances together; iteration stops once the largest
    /// relative step is below the tolerance or the cap is reached. Hitting the
    /// cap is not an error: the last iterate is returned and
    /// [`NewtonSolution::warning`] reports it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Domain`] if any stress amplitude is not positive.
    pub fn solve_life(&self, stress_amp: ArrayViewD<'_, f64>) -> Result<NewtonSolution> {
        check_positive(&stress_amp, "stress amplitude")?;
        let cfg = self.newton;

        let mut life = ArrayD::from_elem(stress_amp.raw_dim(), cfg.initial_life);
        let mut stats = NewtonStats {
            iterations: 0,
            converged: life.is_empty(),
            max_relative_step: 0.0,
        };

        while !stats.converged && stats.iterations < cfg.max_iterations {
            let mut max_step = 0.0_f64;
            Zip::from(&mut life).and(&stress_amp).for_each(|n, &target| {
                let f = self.amplitude(*n) - target;
                let mut df = self.amplitude_derivative(*n);
                if df.abs() < cfg.min_derivative {
                    df = cfg.min_derivative.copysign(df);
                }
                let mut next = *n - f / df;
                if next < cfg.min_life {
                    next = cfg.min_life;
                }
                max_step = max_step.max((next - *n).abs() / next.max(1e-15));
                *n = next;
            });

            stats.iterations += 1;
            stats.max_relative_step = max_step;
            stats.converged = max_step < cfg.tolerance;
            trace!(
                "Kohout-Vechet Newton iteration {}: max relative step {:.3e}",
                stats.iterations,
                max_step
            );
        }

        debug!(
            "Kohout-Vechet life solve: {} element(s), {} iteration(s), converged = {}",
            life.len(),
            stats.iterations,
            stats.converged
        );
        Ok(NewtonSolution { life, stats })
    }
}

impl SnCurve for KohoutVechet {
    fn stress_amp(&self, life: ArrayViewD<'_, f64>) -> Result<ArrayD<f64>> {
        check_positive(&life, "life")?;
        Ok(life.mapv(|n| self.amplitude(n)))
    }

    fn life(&self, stress_amp: ArrayViewD<'_, f64>) -> Result<ArrayD<f64>> {
        let solution = self.solve_life(stress_amp)?;
        if let Some(warning) = solution.warning() {
            warn!("{}", warning);
        }
        Ok(solution.life)
    }

    fn name(&self) -> &str {
        "Kohout-Věchet"
    }
}

/// Basquin curve in reversals, σ = σf·(2N)^b.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Basquin {
    fat_strength_coef: f64,
    fat_strength_exp: f64,
}

impl Basquin {
    /// Create a Basquin curve.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parameter`] unless σf > 0 and b < 0.
    pub fn new(fat_strength_coef: f64, fat_strength_exp: f64) -> Result<Self> {
        if !(fat_strength_coef > 0.0) {
            return Err(Error::Parameter(format!(
                "fatigue strength coefficient must be positive, got {}",
                fat_strength_coef
            )));
        }
        if !(fat_strength_exp < 0.0) {
            return Err(Error::Parameter(format!(
                "fatigue strength exponent must be negative, got {}",
                fat_strength_exp
            )));
        }
        Ok(Self {
            fat_strength_coef,
            fat_strength_exp,
        })
    }

    /// Fatigue strength coefficient σf.
    pub fn fat_strength_coef(&self) -> f64 {
        self.fat_strength_coef
    }

    /// Fatigue strength exponent b.
    pub fn fat_strength_exp(&self) -> f64 {
        self.fat_strength_exp
    }

    /// N = ½·(σ/σf)^(1/b) for a single amplitude.
    #[inline]
    pub fn cycles(&self, stress_amp: f64) -> f64 {
        0.5 * (stress_amp / self.fat_strength_coef).powf(1.0 / self.fat_strength_exp)
    }
}

impl SnCurve for Basquin {
    fn stress_amp(&self, life: ArrayViewD<'_, f64>) -> Result<ArrayD<f64>> {
        check_positive(&life, "life")?;
        Ok(life.mapv(|n| self.fat_strength_coef * (2.0 * n).powf(self.fat_strength_exp)))
    }

    fn life(&self, stress_amp: ArrayViewD<'_, f64>) -> Result<ArrayD<f64>> {
        check_positive(&stress_amp, "stress amplitude")?;
        Ok(stress_amp.mapv(|s| self.cycles(s)))
    }

    fn name(&self) -> &str {
        "Basquin"
    }
}
