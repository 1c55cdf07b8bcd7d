/// Data layer: core types, parsing, matching, and aggregation.
///
/// Architecture:
/// ```text
///  uploaded .xlsx / .xls / .csv bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  bytes → Table (headers, rows)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ matcher   │  first row whose job_id == target → MatchResult
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  per-file results in upload order → BatchOutcome / JSON
///   └───────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod model;
