//! LanceDB storage for the passage vector index.
//!
//! One table, `policy_passages`, holding each passage's position in the
//! passage file alongside its text and embedding. Nearest-neighbour search
//! returns those positions, which the retriever maps back to the passage
//! file loaded at query time.

use std::path::Path;

use arrow::array::{Array, RecordBatchIterator, UInt32Array, UInt64Array};
use arrow::record_batch::RecordBatch;
use complyrag_core::passage_index;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use tracing::{debug, info};

use crate::StoreError;

/// LanceDB store holding the passage index.
pub struct LanceStore {
    db: lancedb::Connection,
}

impl LanceStore {
    /// Connect to a LanceDB database at the given path.
    ///
    /// Creates the database directory if it doesn't exist.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let uri = path
            .to_str()
            .ok_or_else(|| StoreError::Other("non-UTF8 database path".into()))?;
        let db = lancedb::connect(uri).execute().await?;
        Ok(Self { db })
    }

    /// Open the passage index table.
    pub async fn passages(&self) -> Result<lancedb::Table, StoreError> {
        let table = self.db.open_table(passage_index::TABLE).execute().await?;
        Ok(table)
    }

    /// Number of indexed passages.
    pub async fn passage_count(&self) -> Result<usize, StoreError> {
        let table = self.passages().await?;
        let count = table.count_rows(None).await?;
        Ok(count)
    }

    /// List table names in the database.
    pub async fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let names = self.db.table_names().execute().await?;
        Ok(names)
    }

    /// Create (or replace) the passage index from pre-built batches.
    ///
    /// Batches must follow [`passage_index::schema`].
    pub async fn write_passage_index(&self, batches: Vec<RecordBatch>) -> Result<(), StoreError> {
        if batches.is_empty() {
            return Err(StoreError::Other("no record batches provided".into()));
        }

        let total_rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        let schema = batches[0].schema();
        let reader = RecordBatchIterator::new(batches.into_iter().map(Ok), schema);

        let existing = self.table_names().await?;
        if existing.iter().any(|name| name == passage_index::TABLE) {
            self.db.drop_table(passage_index::TABLE, &[]).await?;
        }

        self.db
            .create_table(passage_index::TABLE, Box::new(reader))
            .execute()
            .await?;

        info!(
            table = passage_index::TABLE,
            rows = total_rows,
            "created passage index"
        );
        Ok(())
    }

    /// Nearest `limit` passages to `query_vector`, as passage-file positions
    /// ranked by ascending distance.
    pub async fn nearest_passages(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<usize>, StoreError> {
        let table = self.passages().await?;
        let batches: Vec<RecordBatch> = table
            .vector_search(query_vector)?
            .limit(limit)
            .execute()
            .await?
            .try_collect()
            .await?;

        let mut positions = Vec::with_capacity(limit);
        for batch in &batches {
            positions.extend(passage_positions(batch)?);
        }
        debug!(hits = positions.len(), limit, "vector search complete");
        Ok(positions)
    }
}

/// Extract the `passage_idx` column, accepting UInt32 or UInt64.
fn passage_positions(batch: &RecordBatch) -> Result<Vec<usize>, StoreError> {
    let col = batch
        .column_by_name(passage_index::PASSAGE_IDX)
        .ok_or_else(|| StoreError::Other("missing 'passage_idx' column".into()))?;

    if let Some(arr) = col.as_any().downcast_ref::<UInt32Array>() {
        Ok((0..arr.len())
            .filter(|&i| !arr.is_null(i))
            .map(|i| arr.value(i) as usize)
            .collect())
    } else if let Some(arr) = col.as_any().downcast_ref::<UInt64Array>() {
        Ok((0..arr.len())
            .filter(|&i| !arr.is_null(i))
            .map(|i| arr.value(i) as usize)
            .collect())
    } else {
        Err(StoreError::Other(format!(
            "unexpected passage_idx column type: {:?}",
            col.data_type()
        )))
    }
}
