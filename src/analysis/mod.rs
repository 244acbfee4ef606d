// Analysis module - DSP feature extraction
//
// Pipeline: normalized Waveform -> FeatureExtractor -> FeatureVector.
// Everything here is pure; enrollment and matching live in the signature
// and matching modules.

pub mod features;

pub use features::{
    FeatureExtractor, FeatureVector, PhaseSummary, SpectralSummary, SPECTRAL_LEN,
};
