//! JSON job schema for the `run` subcommand.
//!
//! A job file is a camelCase document tagged by `mode` ("scalar" or
//! "vector"); optional fields default to the kernel defaults. Signed step
//! counts are accepted at this layer and rejected when negative, so callers
//! marshalling from loosely typed sources get a clear invalid-argument
//! failure instead of a deserialization panic.

use num_complex::Complex64;
use pulseprop_core::{
    propagate_scalar, propagate_vector, ParsePolarizationBasisError, PropagationDiagnostics,
    PropagationError, ScalarPropagationInput, VectorPropagationInput, DEFAULT_MAX_ITERATIONS,
    DEFAULT_TOLERANCE,
};
use serde::{Deserialize, Serialize};

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_basis() -> String {
    "elliptical".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ComplexSample {
    pub re: f64,
    pub im: f64,
}

impl ComplexSample {
    fn as_complex(self) -> Complex64 {
        Complex64::new(self.re, self.im)
    }

    fn from_complex(value: Complex64) -> Self {
        Self {
            re: value.re,
            im: value.im,
        }
    }
}

fn to_complex_field(samples: &[ComplexSample]) -> Vec<Complex64> {
    samples.iter().map(|sample| sample.as_complex()).collect()
}

fn from_complex_field(field: &[Complex64]) -> Vec<ComplexSample> {
    field
        .iter()
        .map(|&sample| ComplexSample::from_complex(sample))
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PropagationJob {
    Scalar(ScalarJob),
    Vector(VectorJob),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarJob {
    pub field: Vec<ComplexSample>,
    pub time_step: f64,
    pub step_size: f64,
    pub step_count: i64,
    pub attenuation: Vec<f64>,
    pub dispersion: Vec<f64>,
    pub nonlinear_coefficient: f64,
    #[serde(default)]
    pub raman_time: f64,
    #[serde(default)]
    pub optical_cycle: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorJob {
    pub field_x: Vec<ComplexSample>,
    pub field_y: Vec<ComplexSample>,
    pub time_step: f64,
    pub step_size: f64,
    pub step_count: i64,
    pub attenuation_a: Vec<f64>,
    pub attenuation_b: Vec<f64>,
    pub dispersion_a: Vec<f64>,
    pub dispersion_b: Vec<f64>,
    pub nonlinear_coefficient: f64,
    #[serde(default)]
    pub orientation: f64,
    #[serde(default)]
    pub ellipticity: f64,
    #[serde(default = "default_basis")]
    pub basis: String,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("step count must be non-negative, got {0}")]
    NegativeStepCount(i64),
    #[error(transparent)]
    Basis(#[from] ParsePolarizationBasisError),
}

#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    #[error(transparent)]
    Invalid(#[from] JobError),
    #[error(transparent)]
    Compute(#[from] PropagationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvergenceWarningReport {
    pub step: usize,
    pub iterations: usize,
    pub residual: f64,
}

fn warning_reports(diagnostics: &PropagationDiagnostics) -> Vec<ConvergenceWarningReport> {
    diagnostics
        .unconverged_steps
        .iter()
        .map(|entry| ConvergenceWarningReport {
            step: entry.step,
            iterations: entry.iterations,
            residual: entry.residual,
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RunReport {
    Scalar(ScalarRunReport),
    Vector(VectorRunReport),
}

impl RunReport {
    pub fn warnings(&self) -> &[ConvergenceWarningReport] {
        match self {
            Self::Scalar(report) => &report.warnings,
            Self::Vector(report) => &report.warnings,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarRunReport {
    pub field: Vec<ComplexSample>,
    pub warnings: Vec<ConvergenceWarningReport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorRunReport {
    pub field_x: Vec<ComplexSample>,
    pub field_y: Vec<ComplexSample>,
    pub warnings: Vec<ConvergenceWarningReport>,
}

fn checked_step_count(step_count: i64) -> Result<usize, JobError> {
    usize::try_from(step_count).map_err(|_| JobError::NegativeStepCount(step_count))
}

impl PropagationJob {
    pub fn execute(&self) -> Result<RunReport, JobExecutionError> {
        match self {
            Self::Scalar(job) => job.execute().map(RunReport::Scalar),
            Self::Vector(job) => job.execute().map(RunReport::Vector),
        }
    }
}

impl ScalarJob {
    fn execute(&self) -> Result<ScalarRunReport, JobExecutionError> {
        let step_count = checked_step_count(self.step_count)?;
        let field = to_complex_field(&self.field);

        let mut input = ScalarPropagationInput::new(
            &field,
            self.time_step,
            self.step_size,
            step_count,
            &self.attenuation,
            &self.dispersion,
            self.nonlinear_coefficient,
        );
        input.raman_time = self.raman_time;
        input.optical_cycle = self.optical_cycle;
        input.max_iterations = self.max_iterations;
        input.tolerance = self.tolerance;

        let result = propagate_scalar(input)?;
        Ok(ScalarRunReport {
            field: from_complex_field(&result.field),
            warnings: warning_reports(&result.diagnostics),
        })
    }
}

impl VectorJob {
    fn execute(&self) -> Result<VectorRunReport, JobExecutionError> {
        let step_count = checked_step_count(self.step_count)?;
        let basis = self.basis.parse().map_err(JobError::Basis)?;
        let field_x = to_complex_field(&self.field_x);
        let field_y = to_complex_field(&self.field_y);

        let mut input = VectorPropagationInput::new(
            &field_x,
            &field_y,
            self.time_step,
            self.step_size,
            step_count,
            &self.attenuation_a,
            &self.attenuation_b,
            &self.dispersion_a,
            &self.dispersion_b,
            self.nonlinear_coefficient,
        );
        input.orientation = self.orientation;
        input.ellipticity = self.ellipticity;
        input.basis = basis;
        input.max_iterations = self.max_iterations;
        input.tolerance = self.tolerance;

        let result = propagate_vector(input)?;
        Ok(VectorRunReport {
            field_x: from_complex_field(&result.field_x),
            field_y: from_complex_field(&result.field_y),
            warnings: warning_reports(&result.diagnostics),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{JobError, JobExecutionError, PropagationJob, RunReport};

    #[test]
    fn scalar_job_parses_with_defaults() {
        let source = r#"{
            "mode": "scalar",
            "field": [{"re": 1.0, "im": 0.0}, {"re": 0.0, "im": 0.0}],
            "timeStep": 1.0,
            "stepSize": 0.5,
            "stepCount": 2,
            "attenuation": [0.0],
            "dispersion": [0.0],
            "nonlinearCoefficient": 1.0
        }"#;

        let job: PropagationJob = serde_json::from_str(source).expect("parse");
        match &job {
            PropagationJob::Scalar(scalar) => {
                assert_eq!(scalar.max_iterations, 4);
                assert_eq!(scalar.tolerance, 1.0e-5);
                assert_eq!(scalar.raman_time, 0.0);
            }
            PropagationJob::Vector(_) => panic!("expected a scalar job"),
        }
    }

    #[test]
    fn negative_step_count_is_an_invalid_argument() {
        let source = r#"{
            "mode": "scalar",
            "field": [{"re": 1.0, "im": 0.0}],
            "timeStep": 1.0,
            "stepSize": 0.5,
            "stepCount": -3,
            "attenuation": [0.0],
            "dispersion": [0.0],
            "nonlinearCoefficient": 0.0
        }"#;

        let job: PropagationJob = serde_json::from_str(source).expect("parse");
        let error = job.execute().expect_err("negative count");
        assert!(matches!(
            error,
            JobExecutionError::Invalid(JobError::NegativeStepCount(-3))
        ));
    }

    #[test]
    fn unknown_basis_name_is_an_invalid_argument() {
        let source = r#"{
            "mode": "vector",
            "fieldX": [{"re": 1.0, "im": 0.0}],
            "fieldY": [{"re": 0.0, "im": 0.0}],
            "timeStep": 1.0,
            "stepSize": 0.5,
            "stepCount": 1,
            "attenuationA": [0.0],
            "attenuationB": [0.0],
            "dispersionA": [0.0],
            "dispersionB": [0.0],
            "nonlinearCoefficient": 0.0,
            "basis": "diagonal"
        }"#;

        let job: PropagationJob = serde_json::from_str(source).expect("parse");
        let error = job.execute().expect_err("unknown basis");
        assert!(matches!(
            error,
            JobExecutionError::Invalid(JobError::Basis(_))
        ));
    }

    #[test]
    fn trivial_scalar_job_round_trips_the_field() {
        let source = r#"{
            "mode": "scalar",
            "field": [
                {"re": 1.0, "im": 0.0},
                {"re": 0.0, "im": 0.0},
                {"re": 0.0, "im": 0.0},
                {"re": 0.0, "im": 0.0}
            ],
            "timeStep": 1.0,
            "stepSize": 1.0,
            "stepCount": 1,
            "attenuation": [0.0],
            "dispersion": [0.0],
            "nonlinearCoefficient": 0.0
        }"#;

        let job: PropagationJob = serde_json::from_str(source).expect("parse");
        let report = job.execute().expect("execution");
        match report {
            RunReport::Scalar(scalar) => {
                assert!(scalar.warnings.is_empty());
                assert!((scalar.field[0].re - 1.0).abs() < 1.0e-10);
                for sample in &scalar.field[1..] {
                    assert!(sample.re.abs() < 1.0e-10);
                    assert!(sample.im.abs() < 1.0e-10);
                }
            }
            RunReport::Vector(_) => panic!("expected a scalar report"),
        }
    }
}
