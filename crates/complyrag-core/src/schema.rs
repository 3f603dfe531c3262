/// Arrow schema of the persisted passage vector index.
pub mod passage_index {
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    /// LanceDB table holding one row per passage.
    pub const TABLE: &str = "policy_passages";
    /// Embedding dimensionality of the sentence encoder (MiniLM family).
    pub const EMBED_DIM: i32 = 384;

    pub const PASSAGE_IDX: &str = "passage_idx";
    pub const SECTION: &str = "section";
    pub const TITLE: &str = "title";
    pub const TEXT: &str = "text";
    pub const EMBEDDING: &str = "embedding";

    /// `passage_idx` is the passage's position in the passage file at build
    /// time; retrieval maps it back and drops indices beyond the file.
    pub fn schema(dim: i32) -> Schema {
        Schema::new(vec![
            Field::new(PASSAGE_IDX, DataType::UInt32, false),
            Field::new(SECTION, DataType::Utf8, false),
            Field::new(TITLE, DataType::Utf8, false),
            Field::new(TEXT, DataType::Utf8, false),
            Field::new(
                EMBEDDING,
                DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
                true,
            ),
        ])
    }
}
