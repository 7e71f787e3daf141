pub mod client;
pub mod types;

pub use client::{MarketplaceClient, AGENTS_PATH, FILES_PATH};
pub use types::{
    format_file_size, query_pairs, validate_file_type, AdminAppQuery, AppQuery, HistoryQuery, PageQuery,
    PopularQuery, RecommendQuery, SearchFilters, SubmissionQuery, TemplateQuery,
};
