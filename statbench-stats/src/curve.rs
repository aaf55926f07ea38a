//! Curve estimation: linearizing transforms fitted with the OLS fitter

use crate::regression::{fit_ols, fit_simple, FitResult};
use serde::Serialize;
use statbench_core::StatError;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// R² difference under which two models count as tied
const BEST_TIE_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CurveModel {
    Linear,
    Logarithmic,
    Inverse,
    Quadratic,
    Cubic,
    Compound,
    Power,
    S,
    Growth,
    Exponential,
}

impl CurveModel {
    pub const ALL: [CurveModel; 10] = [
        CurveModel::Linear,
        CurveModel::Logarithmic,
        CurveModel::Inverse,
        CurveModel::Quadratic,
        CurveModel::Cubic,
        CurveModel::Compound,
        CurveModel::Power,
        CurveModel::S,
        CurveModel::Growth,
        CurveModel::Exponential,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CurveModel::Linear => "Linear",
            CurveModel::Logarithmic => "Logarithmic",
            CurveModel::Inverse => "Inverse",
            CurveModel::Quadratic => "Quadratic",
            CurveModel::Cubic => "Cubic",
            CurveModel::Compound => "Compound",
            CurveModel::Power => "Power",
            CurveModel::S => "S",
            CurveModel::Growth => "Growth",
            CurveModel::Exponential => "Exponential",
        }
    }

    /// Case-insensitive lookup; "s-curve" and "scurve" name the S model
    pub fn from_name(name: &str) -> Option<CurveModel> {
        let lower = name.trim().to_lowercase();
        match lower.as_str() {
            "s-curve" | "scurve" | "s_curve" => Some(CurveModel::S),
            _ => Self::ALL.iter().copied().find(|m| m.name().to_lowercase() == lower),
        }
    }

    /// Number of non-constant parameters
    pub fn degree(&self) -> usize {
        match self {
            CurveModel::Quadratic => 2,
            CurveModel::Cubic => 3,
            _ => 1,
        }
    }

    fn transforms_y(&self) -> bool {
        matches!(
            self,
            CurveModel::Compound | CurveModel::Power | CurveModel::S | CurveModel::Growth | CurveModel::Exponential
        )
    }

    /// Whether the transforms are defined for every observation
    pub fn is_applicable(&self, x: &[f64], y: &[f64]) -> bool {
        let x_positive = x.iter().all(|&v| v > 0.0);
        let x_nonzero = x.iter().all(|&v| v != 0.0);
        let y_positive = y.iter().all(|&v| v > 0.0);
        match self {
            CurveModel::Linear | CurveModel::Quadratic | CurveModel::Cubic => true,
            CurveModel::Logarithmic => x_positive,
            CurveModel::Inverse => x_nonzero,
            CurveModel::Power => x_positive && y_positive,
            CurveModel::Compound | CurveModel::Growth | CurveModel::Exponential => y_positive,
            CurveModel::S => y_positive && x_nonzero,
        }
    }

    fn transform_x(&self, x: f64) -> f64 {
        match self {
            CurveModel::Logarithmic | CurveModel::Power => x.ln(),
            CurveModel::Inverse | CurveModel::S => 1.0 / x,
            _ => x,
        }
    }

    /// Fit on the transformed scale and back-transform the parameters.
    /// `name` labels the predictor terms and appears in fit errors.
    pub fn fit(&self, x: &[f64], y: &[f64], name: &str) -> Result<CurveFit, StatError> {
        if !self.is_applicable(x, y) {
            return Err(StatError::invalid_input(format!(
                "{} model is not applicable to this data",
                self.name()
            )));
        }

        let y_t: Vec<f64> = if self.transforms_y() {
            y.iter().map(|v| v.ln()).collect()
        } else {
            y.to_vec()
        };

        let fit = match self.degree() {
            1 => {
                let x_t: Vec<f64> = x.iter().map(|&v| self.transform_x(v)).collect();
                fit_simple(&x_t, &y_t, name)?
            }
            degree => {
                let powers: Vec<Vec<f64>> = (1..=degree)
                    .map(|p| x.iter().map(|v| v.powi(p as i32)).collect())
                    .collect();
                let columns: Vec<&[f64]> = powers.iter().map(|c| c.as_slice()).collect();
                let terms: Vec<String> = (1..=degree)
                    .map(|p| if p == 1 { name.to_string() } else { format!("{}**{}", name, p) })
                    .collect();
                let names: Vec<&str> = terms.iter().map(String::as_str).collect();
                fit_ols(&y_t, &columns, &names)?
            }
        };

        let raw = fit.estimates();
        let mut constant = raw[0];
        let mut b1 = raw[1];
        match self {
            CurveModel::Compound => {
                constant = constant.exp();
                b1 = b1.exp();
            }
            CurveModel::Power | CurveModel::Exponential => constant = constant.exp(),
            _ => {}
        }

        Ok(CurveFit {
            model: *self,
            constant,
            b1,
            b2: raw.get(2).copied(),
            b3: raw.get(3).copied(),
            fit,
        })
    }
}

impl fmt::Display for CurveModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CurveModel {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurveModel::from_name(s).ok_or_else(|| {
            let known: Vec<&str> = CurveModel::ALL.iter().map(|m| m.name()).collect();
            StatError::unknown_model(s).with_suggestion(format!("Known models: {}", known.join(", ")))
        })
    }
}

/// A fitted curve with parameters on the original scale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveFit {
    pub model: CurveModel,
    pub constant: f64,
    pub b1: f64,
    pub b2: Option<f64>,
    pub b3: Option<f64>,
    /// Fit on the transformed scale
    pub fit: FitResult,
}

impl CurveFit {
    pub fn r_squared(&self) -> f64 {
        self.fit.r_squared
    }

    pub fn predict(&self, x: f64) -> f64 {
        let (b0, b1) = (self.constant, self.b1);
        match self.model {
            CurveModel::Linear => b0 + b1 * x,
            CurveModel::Logarithmic => b0 + b1 * x.ln(),
            CurveModel::Inverse => b0 + b1 / x,
            CurveModel::Quadratic | CurveModel::Cubic => {
                b0 + b1 * x + self.b2.unwrap_or(0.0) * x * x + self.b3.unwrap_or(0.0) * x * x * x
            }
            CurveModel::Compound => b0 * b1.powf(x),
            CurveModel::Power => b0 * x.powf(b1),
            CurveModel::S => (b0 + b1 / x).exp(),
            CurveModel::Growth => (b0 + b1 * x).exp(),
            CurveModel::Exponential => b0 * (b1 * x).exp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedModel {
    pub model: CurveModel,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveEstimation {
    /// Successful fits in request order
    pub fits: Vec<CurveFit>,
    pub skipped: Vec<SkippedModel>,
}

impl CurveEstimation {
    /// Highest finite R²; the earlier model wins a tie
    pub fn best(&self) -> Option<&CurveFit> {
        let mut best: Option<&CurveFit> = None;
        for fit in self.fits.iter().filter(|f| f.r_squared().is_finite()) {
            match best {
                Some(current) if fit.r_squared() <= current.r_squared() + BEST_TIE_TOLERANCE => {}
                _ => best = Some(fit),
            }
        }
        best
    }

    pub fn get(&self, model: CurveModel) -> Option<&CurveFit> {
        self.fits.iter().find(|f| f.model == model)
    }
}

/// Fit each requested model of y on the predictor `name`; inapplicable or
/// failing models are skipped
pub fn estimate_curves(
    x: &[f64],
    y: &[f64],
    name: &str,
    models: &[CurveModel],
) -> Result<CurveEstimation, StatError> {
    if y.is_empty() {
        return Err(StatError::empty_sample("dependent"));
    }
    if x.len() != y.len() {
        return Err(StatError::length_mismatch(name, y.len(), x.len()));
    }

    let mut estimation = CurveEstimation { fits: Vec::new(), skipped: Vec::new() };
    let mut seen = Vec::with_capacity(models.len());

    for &model in models {
        if seen.contains(&model) {
            continue;
        }
        seen.push(model);

        if !model.is_applicable(x, y) {
            debug!(model = model.name(), "curve model not applicable");
            estimation.skipped.push(SkippedModel { model, reason: "model not applicable".to_string() });
            continue;
        }

        match model.fit(x, y, name) {
            Ok(fit) => estimation.fits.push(fit),
            Err(e) => {
                debug!(model = model.name(), error = %e, "curve model fit failed");
                estimation.skipped.push(SkippedModel { model, reason: e.message });
            }
        }
    }

    Ok(estimation)
}
