//! Request/response data transfer objects

pub mod nav;

pub use nav::NavQuery;
