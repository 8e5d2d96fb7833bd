//! # CDI Normalizer
//!
//! Turns evaluation-engine output into the display client's response contract.
//!
//! ## Pipeline
//!
//! ```text
//! Upload bytes
//!     │
//!     ├──> ChartUpload (scoped temp file)
//!     │      └─> EvaluationEngine::process_chart
//!     │
//!     ├──> narrow (untyped payer map ─> typed PayerResults)
//!     │
//!     └──> normalize
//!            ├─> display structure (redundant keys)
//!            └─> serialize_deep mirror of the raw result
//! ```
//!
//! ## Example
//!
//! ```
//! use cdi_normalizer::normalize;
//! use cdi_protocol::ProcessingResult;
//! use serde_json::json;
//!
//! let result = ProcessingResult::from(json!({"extraction_data": {"cpt": "29827"}}));
//! let response = normalize(&result, "chart_01");
//! assert_eq!(response.cpt_codes, vec![json!("29827")]);
//! ```

mod engine;
mod error;
mod introspect;
mod narrow;
mod normalize;

pub use engine::{evaluate_upload, evaluate_uploads, ChartUpload, EvaluationEngine};
pub use error::{ClientError, EngineError};
pub use introspect::{serialize_deep, Fields, Introspect, Opaque, Primitive, Rendered, Shape};
pub use normalize::{normalize, DisplayResults, NormalizedResponse};
