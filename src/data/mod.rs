/// Data layer: core types, loading, filtering and bucketing.
///
/// Architecture:
/// ```text
///  data.csv / data.json        chart config JSON × N
///        │                            │
///        └────────────┬───────────────┘
///                     ▼
///               ┌──────────┐
///               │  loader   │  parallel fetch, all-or-nothing
///               └──────────┘
///                     │
///                     ▼
///               ┌──────────┐
///               │  Dataset  │  Vec<Row>, header order
///               └──────────┘
///                     │
///                     ▼
///               ┌──────────┐
///               │  filter   │  AND of per-column predicates → rows
///               └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod quantile;
