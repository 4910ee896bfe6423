pub mod cache;
pub mod matcher;
pub mod query;
pub mod resolver;
pub mod search;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::ClientCache;
pub use resolver::ClientResolver;
pub use service::SearchService;
