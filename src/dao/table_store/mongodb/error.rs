use mongodb::error::Error as MongoError;
use thiserror::Error;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to query collection `{collection}`")]
    Find {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to insert into collection `{collection}`")]
    Insert {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to update collection `{collection}`")]
    Update {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete from collection `{collection}`")]
    Delete {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
}
