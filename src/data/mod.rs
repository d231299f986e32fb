/// Data layer: crash rows, loading, completeness filtering, aggregation.
///
/// Architecture:
/// ```text
///     .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → CrashTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  keep years with all 12 months → filtered CrashTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  day×time, monthly average, severity, involvement
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
