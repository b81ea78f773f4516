use crate::pipeline::Pipeline;
use bson::{Bson, Document};
use futures::{future::BoxFuture, TryStreamExt};
use mongodb::{options::ClientOptions, Database};
use serde::de::DeserializeOwned;
use std::ops::Deref;
use thiserror::Error;
use tracing::{debug, error};


pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("aggregation failed due to: {0}")]
    Aggregation(String),
    #[error("failed to decode result record: {0}")]
    Decode(String),
}

/// The transport boundary: one aggregation round-trip against one
/// collection. Implemented for [`mongodb::Database`]; tests substitute
/// in-memory stand-ins.
pub trait AggregateTransport: Send + Sync {
    fn run_aggregation(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> BoxFuture<'_, anyhow::Result<Vec<Document>>>;
}

impl AggregateTransport for Database {
    fn run_aggregation(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> BoxFuture<'_, anyhow::Result<Vec<Document>>> {
        let collection = self.collection::<Document>(collection);
        Box::pin(async move {
            let cursor = collection.aggregate(pipeline).await?;
            Ok(cursor.try_collect().await?)
        })
    }
}

/// Parses a connection string and applies the pool sizing used for
/// aggregation workloads.
pub async fn client_options(uri: &str) -> anyhow::Result<ClientOptions> {
    let mut options = ClientOptions::parse(uri).await?;
    options.max_pool_size = Some(optimal_pool_size());
    options.max_connecting = Some(5);
    Ok(options)
}

pub fn optimal_pool_size() -> u32 {
    std::thread::available_parallelism().map_or(1, |n| n.get() as u32) * 2 + 1
}

/// One materialized aggregation result. When the document carries a
/// composite group `_id`, each of its entries is flattened into a sibling
/// field at construction; the original `_id` entry is kept as well, and a
/// flattened entry overwrites any input field with the same name.
#[derive(PartialEq, Debug, Clone)]
pub struct ResultRecord {
    document: Document,
}

impl ResultRecord {
    pub fn new(mut document: Document) -> Self {
        if let Some(Bson::Document(id)) = document.get("_id").cloned() {
            for (name, value) in id {
                document.insert(name, value);
            }
        }
        ResultRecord { document }
    }

    /// Deserializes the record, post-flattening, into a typed value.
    pub fn to_object<T: DeserializeOwned>(&self) -> Result<T> {
        bson::from_document(self.document.clone()).map_err(|e| Error::Decode(e.to_string()))
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

impl Deref for ResultRecord {
    type Target = Document;

    fn deref(&self) -> &Document {
        &self.document
    }
}

impl Pipeline {
    /// Runs the compiled pipeline (or its raw stage list) against the
    /// transport and materializes the full result set. A transport failure
    /// aborts the call; no partial result list is produced.
    pub async fn execute(
        &self,
        transport: &dyn AggregateTransport,
    ) -> crate::result::Result<Vec<ResultRecord>> {
        let stages = self.to_documents()?;
        debug!(
            collection = self.collection(),
            stages = stages.len(),
            "submitting aggregation pipeline"
        );
        let documents = transport
            .run_aggregation(self.collection(), stages)
            .await
            .map_err(|e| {
                error!(collection = self.collection(), error = %e, "aggregation failed");
                Error::Aggregation(e.to_string())
            })?;

        Ok(documents.into_iter().map(ResultRecord::new).collect())
    }
}
