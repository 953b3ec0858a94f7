//! Prompt templates for grounded question answering
//!
//! Assembly is pure string formatting: identical inputs produce
//! byte-identical prompts.

/// Delimiter between retrieved chunks in the prompt context
pub const CHUNK_DELIMITER: &str = "\n---\n";

/// Fallback sentence the model is instructed to reply with when the answer
/// is not present in the supplied context
pub const NOT_FOUND_REPLY: &str =
    "Sorry, this information is not found in the uploaded document. Please upload a relevant text document.";

/// Prompt builder for Q&A requests
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the document-grounded prompt: system instruction, retrieved
    /// chunks joined by a visible delimiter, chat history oldest-first as
    /// alternating Q/A lines, then the current question.
    ///
    /// `history` must already be ordered oldest-first.
    pub fn document_prompt(
        chunks: &[String],
        history: &[(String, String)],
        question: &str,
    ) -> String {
        let context = chunks.join(CHUNK_DELIMITER);

        let mut history_text = String::new();
        for (q, a) in history {
            history_text.push_str(&format!("Q: {}\nA: {}\n", q, a));
        }

        format!(
            "You are an expert Q&A assistant. Only answer questions using the provided Document Context below. \
             If the answer is not present in the context, reply: '{not_found}' \
             Do not use any outside knowledge.\n\
             Document Context:\n{context}\n\n\
             Chat History:\n{history}\n\n\
             Current Question: {question}\n\n\
             Answer:",
            not_found = NOT_FOUND_REPLY,
            context = context,
            history = history_text,
            question = question,
        )
    }

    /// Build the document-less prompt: no retrieval, no history; the model
    /// is asked to prompt the user to upload a document, while still seeing
    /// the raw question.
    pub fn general_prompt(question: &str) -> String {
        format!(
            "You are the assistant of a document Q&A service. The user has not attached a document, \
             so there is no document context to answer from. Briefly respond to the question below and \
             ask the user to upload a document (PDF, DOCX, or TXT) so you can give grounded answers.\n\n\
             Current Question: {question}\n\n\
             Answer:",
            question = question,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_inputs() -> (Vec<String>, Vec<(String, String)>) {
        let chunks = vec![
            "The capital of France is Paris.".to_string(),
            "France is in Europe.".to_string(),
        ];
        let history = vec![
            ("Where is France?".to_string(), "In Europe.".to_string()),
            ("Is it big?".to_string(), "Fairly large.".to_string()),
        ];
        (chunks, history)
    }

    #[test]
    fn test_document_prompt_is_deterministic() {
        let (chunks, history) = sample_inputs();
        let a = PromptBuilder::document_prompt(&chunks, &history, "What is the capital?");
        let b = PromptBuilder::document_prompt(&chunks, &history, "What is the capital?");
        assert_eq!(a, b);
    }

    #[test]
    fn test_document_prompt_structure() {
        let (chunks, history) = sample_inputs();
        let prompt = PromptBuilder::document_prompt(&chunks, &history, "What is the capital?");

        // Chunks joined with the visible delimiter
        assert!(prompt.contains("The capital of France is Paris.\n---\nFrance is in Europe."));
        // History rendered oldest-first as Q/A lines
        let first = prompt.find("Q: Where is France?").unwrap();
        let second = prompt.find("Q: Is it big?").unwrap();
        assert!(first < second);
        // Question and fallback instruction present
        assert!(prompt.contains("Current Question: What is the capital?"));
        assert!(prompt.contains(NOT_FOUND_REPLY));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn test_document_prompt_with_empty_history() {
        let (chunks, _) = sample_inputs();
        let prompt = PromptBuilder::document_prompt(&chunks, &[], "Anything?");
        assert!(prompt.contains("Chat History:\n\n"));
    }

    #[test]
    fn test_general_prompt_carries_question() {
        let prompt = PromptBuilder::general_prompt("What is the capital of France?");
        assert!(prompt.contains("Current Question: What is the capital of France?"));
        assert!(prompt.contains("upload a document"));
        // Shorter than the document variant with any context
        let (chunks, history) = sample_inputs();
        let doc_prompt = PromptBuilder::document_prompt(&chunks, &history, "x");
        assert!(prompt.len() < doc_prompt.len());
    }
}
