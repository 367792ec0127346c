// Application layer - Use cases over the external data API
pub mod change_feed;
pub mod collection_fetcher;
pub mod collection_repository;
pub mod dashboard_service;
pub mod mutation_service;
pub mod streaming_service;

#[cfg(test)]
pub mod testing;
