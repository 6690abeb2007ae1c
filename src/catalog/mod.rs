mod engine;
mod query;

pub use engine::{CatalogEngine, PageResult};
pub use query::{CatalogColumn, FacetColumn, QuerySpec, SortOrder};
