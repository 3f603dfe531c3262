//! Instruction template for generative answers.

/// System message sent with every answer request.
pub const SYSTEM_PROMPT: &str = "You are a compliance assistant reviewing an organisation's \
Information Security Policy against PCI-DSS and ISO 27001. Answer in clear, professional English.";

const ANSWER_INSTRUCTIONS: &str = "\
Answer the query in 100-150 words using the policy context below. Focus on the \
controls the policy states and how they relate to PCI-DSS and ISO 27001. If the \
context is missing or does not cover the query, say explicitly that the answer is \
inferred and keep it brief.";

/// Fill the answer template with a query and its (already truncated) context.
///
/// Both values are inserted verbatim; braces in either are never re-read as
/// placeholders.
pub fn build_answer_prompt(query: &str, context: &str) -> String {
    format!("{ANSWER_INSTRUCTIONS}\n\nQuery: {query}\nContext: {context}\n")
}
