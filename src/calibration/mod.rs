// Calibration module - externally supplied scoring parameters
//
// The matcher reads weights, the phase threshold, strictness ceilings and
// override cut-offs from here. Nothing in the engine recomputes them.

pub mod params;

pub use params::{
    CalibrationParameters, OverrideRules, Strictness, StrictnessThresholds, Weights,
    WEIGHT_SUM_TOLERANCE,
};
