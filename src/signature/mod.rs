// Signature module - the single enrolled baseline
//
// SignatureStore owns the active Signature. Readers get an Arc snapshot and
// compare against it without holding the lock, so a concurrent enroll or
// reset never changes a comparison that is already running.

pub mod store;

pub use store::{Signature, SignatureStore};
