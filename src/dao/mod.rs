/// Entity definitions persisted in the tables.
pub mod models;
/// Backend-neutral query description.
pub mod query;
/// Typed repository over the table store.
pub mod repository;
/// Storage error type shared by every backend.
pub mod storage;
/// Table store trait and its backends.
pub mod table_store;
