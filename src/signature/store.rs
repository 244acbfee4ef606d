// SignatureStore: process-wide holder of at most one baseline
//
// set_baseline swaps in a complete, freshly built Signature under the write
// lock; readers only ever see the previous or the new record, never a mix.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use crate::analysis::FeatureVector;
use crate::error::{log_signature_error, SignatureError};

/// The enrolled baseline plus summaries precomputed for comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub features: FeatureVector,
    /// L2-normalized cepstral sub-vector (all zeros for a zero-norm input)
    pub cepstral_unit: Vec<f32>,
    pub enrolled_at: SystemTime,
}

impl Signature {
    pub fn new(features: FeatureVector) -> Self {
        let cepstral_unit = l2_normalized(&features.cepstral);
        Self {
            features,
            cepstral_unit,
            enrolled_at: SystemTime::now(),
        }
    }
}

/// Unit-length copy of `v` (f64 accumulation); zero vector stays zero
pub fn l2_normalized(v: &[f32]) -> Vec<f32> {
    let norm = v
        .iter()
        .map(|&x| (x as f64) * (x as f64))
        .sum::<f64>()
        .sqrt();
    if norm > 0.0 {
        v.iter().map(|&x| (x as f64 / norm) as f32).collect()
    } else {
        vec![0.0; v.len()]
    }
}

/// Thread-safe owner of the active signature
///
/// # Example
/// ```ignore
/// let store = SignatureStore::new();
/// store.set_baseline(features)?;
/// let signature = store.require_baseline()?;
/// ```
#[derive(Debug, Default)]
pub struct SignatureStore {
    current: RwLock<Option<Arc<Signature>>>,
}

impl SignatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any existing signature with one built from `features`
    ///
    /// The Signature is fully built before the write lock is taken.
    pub fn set_baseline(&self, features: FeatureVector) -> Result<Arc<Signature>, SignatureError> {
        let signature = Arc::new(Signature::new(features));
        let mut guard = self.write_current().inspect_err(|err| {
            log_signature_error(err, "set_baseline");
        })?;
        let replaced = guard.replace(Arc::clone(&signature)).is_some();
        drop(guard);

        tracing::info!(replaced, "Baseline signature enrolled");
        Ok(signature)
    }

    /// Snapshot of the active signature, if any
    pub fn get_baseline(&self) -> Result<Option<Arc<Signature>>, SignatureError> {
        let guard = self.read_current().inspect_err(|err| {
            log_signature_error(err, "get_baseline");
        })?;
        Ok(guard.as_ref().map(Arc::clone))
    }

    /// Snapshot of the active signature, or `NoBaseline`
    pub fn require_baseline(&self) -> Result<Arc<Signature>, SignatureError> {
        self.get_baseline()?.ok_or_else(|| {
            let err = SignatureError::NoBaseline;
            log_signature_error(&err, "require_baseline");
            err
        })
    }

    /// Clear the active signature (no-op when none is enrolled)
    pub fn reset(&self) -> Result<(), SignatureError> {
        let mut guard = self.write_current().inspect_err(|err| {
            log_signature_error(err, "reset");
        })?;
        let cleared = guard.take().is_some();
        drop(guard);

        tracing::info!(cleared, "Baseline signature reset");
        Ok(())
    }

    pub fn has_baseline(&self) -> Result<bool, SignatureError> {
        Ok(self.read_current()?.is_some())
    }

    // ========================================================================
    // HELPER METHODS - Lock management
    // ========================================================================

    fn read_current(&self) -> Result<RwLockReadGuard<'_, Option<Arc<Signature>>>, SignatureError> {
        self.current
            .read()
            .map_err(|_| SignatureError::StorePoisoned)
    }

    fn write_current(
        &self,
    ) -> Result<RwLockWriteGuard<'_, Option<Arc<Signature>>>, SignatureError> {
        self.current
            .write()
            .map_err(|_| SignatureError::StorePoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{PhaseSummary, SpectralSummary};
    use std::thread;

    fn features(seed: f32) -> FeatureVector {
        FeatureVector {
            cepstral: vec![seed, 2.0 * seed, 3.0, 4.0],
            spectral: SpectralSummary {
                centroid: 1000.0 + seed,
                rolloff: 3000.0,
                bandwidth: 800.0,
                flatness: 0.1,
            },
            phase: PhaseSummary {
                discontinuity: 1.5,
                discontinuity_std: 0.7,
                unwrapped_derivative_mean: 1.2,
            },
            jitter: 0.01,
        }
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = SignatureStore::new();
        assert!(!store.has_baseline().unwrap());
        assert!(store.get_baseline().unwrap().is_none());
        assert_eq!(
            store.require_baseline().unwrap_err(),
            SignatureError::NoBaseline
        );
    }

    #[test]
    fn test_set_overwrites_previous() {
        let store = SignatureStore::new();
        store.set_baseline(features(1.0)).unwrap();
        store.set_baseline(features(5.0)).unwrap();
        let sig = store.require_baseline().unwrap();
        assert_eq!(sig.features, features(5.0));
    }

    #[test]
    fn test_reset_clears() {
        let store = SignatureStore::new();
        store.set_baseline(features(1.0)).unwrap();
        store.reset().unwrap();
        assert!(!store.has_baseline().unwrap());
        // resetting an empty store is fine
        store.reset().unwrap();
    }

    #[test]
    fn test_snapshot_survives_reset() {
        let store = SignatureStore::new();
        store.set_baseline(features(1.0)).unwrap();
        let snapshot = store.require_baseline().unwrap();
        store.reset().unwrap();
        assert_eq!(snapshot.features, features(1.0));
    }

    #[test]
    fn test_cepstral_unit_is_normalized() {
        let sig = Signature::new(features(1.0));
        let norm: f32 = sig.cepstral_unit.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
        assert_eq!(l2_normalized(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_concurrent_writers_leave_a_whole_signature() {
        let store = Arc::new(SignatureStore::new());
        let handles: Vec<_> = (1..=8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..50 {
                        store.set_baseline(features(i as f32)).unwrap();
                        let sig = store.require_baseline().unwrap();
                        // every snapshot is internally consistent
                        assert_eq!(sig.features.cepstral[1], 2.0 * sig.features.cepstral[0]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(store.has_baseline().unwrap());
    }

    #[test]
    fn test_poisoned_store_is_not_reported_as_missing_baseline() {
        let store = Arc::new(SignatureStore::new());
        store.set_baseline(features(1.0)).unwrap();

        let writer = Arc::clone(&store);
        let result = thread::spawn(move || {
            let _guard = writer.current.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(result.is_err());

        assert_eq!(store.require_baseline().unwrap_err(), SignatureError::StorePoisoned);
        assert_eq!(store.reset().unwrap_err(), SignatureError::StorePoisoned);
    }
}
