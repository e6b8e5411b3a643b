#[derive(Debug, Clone, PartialEq)]
pub enum LLMChunk {
    /// A non-empty content delta.
    Token(String),
    /// The end-of-stream sentinel was received. Always the last item.
    Done,
}
