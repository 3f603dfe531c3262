/// Answer span predicted by an extractive QA model over an encoded
/// (question, context) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanPrediction {
    /// Token position of the argmax start logit.
    pub start: usize,
    /// Token position of the argmax end logit.
    pub end: usize,
    /// Token ids of the full encoded sequence.
    pub input_ids: Vec<u32>,
}

impl SpanPrediction {
    /// `start <= end < sequence length`.
    pub fn is_valid(&self) -> bool {
        self.start <= self.end && self.end < self.input_ids.len()
    }

    /// Token ids of the span, inclusive of `end`, when the span is valid.
    pub fn span_ids(&self) -> Option<&[u32]> {
        self.is_valid().then(|| &self.input_ids[self.start..=self.end])
    }
}
