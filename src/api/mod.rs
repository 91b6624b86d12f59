//! Client for the TrueLens analysis backend.
//!
//! - [`client`] - `ApiClient`, one method per backend endpoint
//! - [`types`] - wire types and the `ApiError` taxonomy
//!
//! The backend owns claim extraction, verification, trend clustering and
//! scanning; this module only moves JSON across the boundary.

mod client;
mod types;

pub use client::{ApiClient, DEFAULT_API_BASE_URL};
pub use types::{
    AnalysisResult, AnalysisSource, ApiError, Claim, Evidence, HealthStatus, RawArticle,
    ScanStatus, TrendCluster,
};
