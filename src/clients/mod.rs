pub mod admin;
pub mod api;
pub mod auth;
pub mod files;
pub mod graphs;
pub mod history;
pub mod mappings;
pub mod preview;
pub mod rows;

pub use api::ApiClient;
pub use rows::RowsQuery;
