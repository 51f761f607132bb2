//! Split-step Fourier propagation kernels for optical-fiber pulse
//! simulation, covering the scalar nonlinear Schrödinger equation
//! (Kerr, Raman response, self-steepening) and the coupled two-polarization
//! equations in the elliptical and circular eigenbases.

pub mod numerics;
pub mod propagation;
pub mod spectral;

pub use propagation::{
    propagate_scalar, propagate_scalar_with_transform, propagate_vector,
    propagate_vector_with_transform, ParsePolarizationBasisError, PolarizationBasis,
    PropagationDiagnostics, PropagationError, ScalarPropagationInput, ScalarPropagationResult,
    UnconvergedStep, VectorPropagationInput, VectorPropagationResult, DEFAULT_MAX_ITERATIONS,
    DEFAULT_TOLERANCE,
};
pub use spectral::{
    forget_plans, load_plan_hints, planner_effort, save_plan_hints, set_planner_effort,
    FourierTransform, ParsePlannerEffortError, PlannerEffort, SpectralError, SpectralKernel,
    DEFAULT_PLAN_HINTS_FILE,
};
