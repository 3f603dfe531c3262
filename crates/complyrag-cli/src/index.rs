//! Index pipeline: embeds every passage and writes the LanceDB passage index.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use arrow::array::{Array, FixedSizeListBuilder, Float32Builder, StringArray, UInt32Array};
use arrow::record_batch::RecordBatch;
use complyrag_ai::SentenceEncoder;
use complyrag_core::{Passage, passage_index};
use complyrag_store::{LanceStore, PassageStore};

const EMBED_BATCH_SIZE: usize = 256;

pub struct IndexStats {
    pub total_passages: usize,
    pub elapsed_secs: f64,
}

/// Embed each passage body and replace the passage index table.
///
/// `passage_idx` records each passage's position in `passages`; the same
/// file must be loaded at query time.
pub async fn run_index_pipeline(
    lance: &LanceStore,
    encoder: &mut SentenceEncoder,
    passages: &PassageStore,
) -> anyhow::Result<IndexStats> {
    let start = Instant::now();
    let total = passages.len();
    anyhow::ensure!(total > 0, "passage file is empty, nothing to index");

    let dim = i32::try_from(encoder.dim()).context("embedding dimension out of range")?;
    let schema = Arc::new(passage_index::schema(dim));

    let mut batches = Vec::with_capacity(total.div_ceil(EMBED_BATCH_SIZE));
    for (n, chunk) in passages.passages().chunks(EMBED_BATCH_SIZE).enumerate() {
        let offset = n * EMBED_BATCH_SIZE;
        let texts: Vec<&str> = chunk.iter().map(|p| p.body_text.as_str()).collect();
        let embeddings = encoder
            .encode_batch(&texts)
            .context("generating passage embeddings")?;
        batches.push(build_batch(&schema, offset, chunk, &embeddings, dim)?);

        let done = offset + chunk.len();
        eprint!(
            "\r  Embedded {done}/{total} ({:.1}%)",
            done as f64 / total as f64 * 100.0
        );
    }
    eprintln!();

    eprintln!("  Writing to LanceDB...");
    lance
        .write_passage_index(batches)
        .await
        .context("writing passage index to LanceDB")?;

    Ok(IndexStats {
        total_passages: total,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

/// One record batch of passages starting at file position `offset`.
fn build_batch(
    schema: &Arc<arrow::datatypes::Schema>,
    offset: usize,
    passages: &[Passage],
    embeddings: &[Vec<f32>],
    dim: i32,
) -> anyhow::Result<RecordBatch> {
    anyhow::ensure!(
        embeddings.len() == passages.len(),
        "encoder returned {} embeddings for {} passages",
        embeddings.len(),
        passages.len()
    );

    let positions: Vec<u32> = (offset..offset + passages.len())
        .map(u32::try_from)
        .collect::<Result<_, _>>()
        .context("passage position exceeds u32")?;

    let mut emb_builder = FixedSizeListBuilder::new(Float32Builder::new(), dim);
    for emb in embeddings {
        anyhow::ensure!(
            emb.len() == dim as usize,
            "embedding has {} values, expected {dim}",
            emb.len()
        );
        emb_builder.values().append_slice(emb);
        emb_builder.append(true);
    }

    let columns: Vec<Arc<dyn Array>> = vec![
        Arc::new(UInt32Array::from(positions)),
        Arc::new(StringArray::from_iter_values(
            passages.iter().map(|p| p.section_id.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            passages.iter().map(|p| p.title.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            passages.iter().map(|p| p.body_text.as_str()),
        )),
        Arc::new(emb_builder.finish()),
    ];
    Ok(RecordBatch::try_new(schema.clone(), columns)?)
}
