//! Fourier-transform provider backed by `rustfft`.
//!
//! Plans are held in a process-wide cache keyed by transform length so that
//! repeated propagation calls with the same grid reuse them. The cache can be
//! persisted to a plan-hint file and re-planned from it; the first kernel
//! construction in a process probes the default hint file once, and later
//! constructions skip the probe. Both transform directions are un-normalized:
//! a forward/inverse round trip scales the field by its length.

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Hint file probed on first use and written by [`save_plan_hints`].
pub const DEFAULT_PLAN_HINTS_FILE: &str = "pulseprop-plans.json";

#[derive(Debug, thiserror::Error)]
pub enum SpectralError {
    #[error("transform buffer length {actual} does not match plan length {expected}")]
    BufferLength { expected: usize, actual: usize },
    #[error("failed to read plan hints '{}': {source}", path.display())]
    HintsRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse plan hints '{}': {source}", path.display())]
    HintsParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write plan hints '{}': {source}", path.display())]
    HintsWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode plan hints for '{}': {source}", path.display())]
    HintsEncode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Planning effort requested for the process-wide cache.
///
/// `Estimate` records hinted lengths without planning them eagerly; the
/// other levels plan every hinted length at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlannerEffort {
    Estimate,
    Measure,
    #[default]
    Patient,
    Exhaustive,
}

impl PlannerEffort {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Estimate => "estimate",
            Self::Measure => "measure",
            Self::Patient => "patient",
            Self::Exhaustive => "exhaustive",
        }
    }
}

impl Display for PlannerEffort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized planner effort '{0}'; expected estimate, measure, patient or exhaustive")]
pub struct ParsePlannerEffortError(String);

impl FromStr for PlannerEffort {
    type Err = ParsePlannerEffortError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "estimate" => Ok(Self::Estimate),
            "measure" => Ok(Self::Measure),
            "patient" => Ok(Self::Patient),
            "exhaustive" => Ok(Self::Exhaustive),
            other => Err(ParsePlannerEffortError(other.to_string())),
        }
    }
}

/// In-place Fourier transform pair of a fixed length.
///
/// Implementations must keep both directions un-normalized so the integrator
/// can account for the ×N scale explicitly.
pub trait FourierTransform {
    fn length(&self) -> usize;
    fn forward(&mut self, buffer: &mut [Complex64]) -> Result<(), SpectralError>;
    fn inverse(&mut self, buffer: &mut [Complex64]) -> Result<(), SpectralError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct PlanHints {
    lengths: Vec<usize>,
}

struct PlanCacheState {
    planner: FftPlanner<f64>,
    lengths: BTreeSet<usize>,
    effort: PlannerEffort,
    hints_probed: bool,
}

static PLAN_CACHE: OnceLock<Mutex<PlanCacheState>> = OnceLock::new();

fn plan_cache() -> &'static Mutex<PlanCacheState> {
    PLAN_CACHE.get_or_init(|| {
        Mutex::new(PlanCacheState {
            planner: FftPlanner::new(),
            lengths: BTreeSet::new(),
            effort: PlannerEffort::default(),
            hints_probed: false,
        })
    })
}

fn lock_plan_cache() -> std::sync::MutexGuard<'static, PlanCacheState> {
    plan_cache().lock().unwrap_or_else(PoisonError::into_inner)
}

fn plan_pair(length: usize) -> (Arc<dyn Fft<f64>>, Arc<dyn Fft<f64>>) {
    let mut state = lock_plan_cache();
    if !state.hints_probed {
        state.hints_probed = true;
        let default_path = Path::new(DEFAULT_PLAN_HINTS_FILE);
        if default_path.exists() {
            let _ = load_hints_into(&mut state, default_path);
        }
    }

    state.lengths.insert(length);
    let forward = state.planner.plan_fft_forward(length);
    let inverse = state.planner.plan_fft_inverse(length);
    (forward, inverse)
}

fn load_hints_into(state: &mut PlanCacheState, path: &Path) -> Result<usize, SpectralError> {
    let source = fs::read_to_string(path).map_err(|source| SpectralError::HintsRead {
        path: path.to_path_buf(),
        source,
    })?;
    let hints: PlanHints =
        serde_json::from_str(&source).map_err(|source| SpectralError::HintsParse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut loaded = 0;
    for length in hints.lengths {
        if length == 0 {
            continue;
        }
        state.lengths.insert(length);
        if state.effort != PlannerEffort::Estimate {
            state.planner.plan_fft_forward(length);
            state.planner.plan_fft_inverse(length);
        }
        loaded += 1;
    }

    Ok(loaded)
}

/// Selects the planning effort for subsequent cache operations.
pub fn set_planner_effort(effort: PlannerEffort) {
    lock_plan_cache().effort = effort;
}

/// Currently selected planning effort.
pub fn planner_effort() -> PlannerEffort {
    lock_plan_cache().effort
}

/// Drops every cached plan and forgets the recorded lengths. Kernels built
/// before the call keep their plan handles; the next construction re-plans.
pub fn forget_plans() {
    let mut state = lock_plan_cache();
    state.planner = FftPlanner::new();
    state.lengths.clear();
}

/// Writes the recorded transform lengths to a hint file. Returns the number
/// of lengths written.
pub fn save_plan_hints(path: impl AsRef<Path>) -> Result<usize, SpectralError> {
    let path = path.as_ref();
    let state = lock_plan_cache();
    let hints = PlanHints {
        lengths: state.lengths.iter().copied().collect(),
    };
    drop(state);

    let rendered = serde_json::to_string_pretty(&hints).map_err(|source| {
        SpectralError::HintsEncode {
            path: path.to_path_buf(),
            source,
        }
    })?;
    fs::write(path, rendered).map_err(|source| SpectralError::HintsWrite {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(hints.lengths.len())
}

/// Loads a hint file into the process-wide cache, planning each hinted
/// length unless the effort is `Estimate`. Returns the number of lengths
/// taken from the file.
pub fn load_plan_hints(path: impl AsRef<Path>) -> Result<usize, SpectralError> {
    let mut state = lock_plan_cache();
    state.hints_probed = true;
    load_hints_into(&mut state, path.as_ref())
}

/// `rustfft`-backed [`FourierTransform`] of one fixed length.
pub struct SpectralKernel {
    length: usize,
    forward_plan: Arc<dyn Fft<f64>>,
    inverse_plan: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
}

impl SpectralKernel {
    pub fn new(length: usize) -> Self {
        let (forward_plan, inverse_plan) = plan_pair(length);
        let scratch_len = forward_plan
            .get_inplace_scratch_len()
            .max(inverse_plan.get_inplace_scratch_len());

        Self {
            length,
            forward_plan,
            inverse_plan,
            scratch: vec![Complex64::default(); scratch_len],
        }
    }

    fn check_length(&self, buffer: &[Complex64]) -> Result<(), SpectralError> {
        if buffer.len() != self.length {
            return Err(SpectralError::BufferLength {
                expected: self.length,
                actual: buffer.len(),
            });
        }
        Ok(())
    }
}

impl FourierTransform for SpectralKernel {
    fn length(&self) -> usize {
        self.length
    }

    fn forward(&mut self, buffer: &mut [Complex64]) -> Result<(), SpectralError> {
        self.check_length(buffer)?;
        self.forward_plan
            .process_with_scratch(buffer, &mut self.scratch);
        Ok(())
    }

    fn inverse(&mut self, buffer: &mut [Complex64]) -> Result<(), SpectralError> {
        self.check_length(buffer)?;
        self.inverse_plan
            .process_with_scratch(buffer, &mut self.scratch);
        Ok(())
    }
}
