// Scan results: the canonical model and the normalizer that produces it.

pub mod models;
pub mod normalize;

pub use models::{ContentType, Detection, ScanOutcome, ScanResult, ServiceSummary};
pub use normalize::{normalize, normalize_all};
