//! Answer generation from retrieved context.
//!
//! The language model itself is external and sits behind [`CompletionModel`].
//! [`AnswerGenerator`] owns the part this crate is responsible for: stuffing
//! retrieved segments into a prompt that fits the model's input limit.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::document::Segment;
use crate::error::{RagError, Result};

const PREAMBLE: &str = "Use the following pieces of context about electric vehicles to answer \
                        the question at the end. If you don't know the answer, just say that \
                        you don't know, don't try to make up an answer.";

const NO_CONTEXT: &str = "(No matching vehicles were found in the dataset.)";

const SEGMENT_SEPARATOR: &str = "\n\n";

/// An external text-completion capability.
///
/// # Example
///
/// ```rust,ignore
/// use evqa_rag::CompletionModel;
///
/// let reply = model.complete("Question: ...\nHelpful Answer:").await?;
/// ```
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Produce a completion for `prompt`.
    ///
    /// Failures are reported as [`RagError::GenerationUnavailable`].
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Maximum prompt length accepted, in characters.
    fn input_limit(&self) -> usize;

    /// A short name used in logs and error messages.
    fn name(&self) -> &str {
        "completion-model"
    }
}

/// A generated answer and how much context reached the model.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAnswer {
    /// The model's answer.
    pub answer: String,
    /// Number of leading context segments included in the prompt.
    pub context_used: usize,
}

/// Builds grounded prompts and asks a [`CompletionModel`] to answer them.
#[derive(Clone)]
pub struct AnswerGenerator {
    model: Arc<dyn CompletionModel>,
    timeout: Duration,
}

impl AnswerGenerator {
    /// Create a generator. `timeout` bounds each completion call.
    pub fn new(model: Arc<dyn CompletionModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Answer `question` using `context`, given in retrieval order.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidQuestion`] if the question alone exceeds the
    ///   model's input limit.
    /// - [`RagError::GenerationUnavailable`] on upstream failure, timeout, or
    ///   an empty completion.
    pub async fn generate(&self, question: &str, context: &[Segment]) -> Result<GeneratedAnswer> {
        let (prompt, context_used) = fit_prompt(question, context, self.model.input_limit())?;
        if context_used < context.len() {
            warn!(
                dropped = context.len() - context_used,
                input_limit = self.model.input_limit(),
                "dropped lowest-ranked context to fit the prompt"
            );
        }

        debug!(model = self.model.name(), prompt_chars = prompt.chars().count(), "generating");
        let answer = match tokio::time::timeout(self.timeout, self.model.complete(&prompt)).await {
            Ok(result) => result.inspect_err(|e| {
                error!(model = self.model.name(), error = %e, "generation failed");
            })?,
            Err(_) => {
                error!(model = self.model.name(), timeout = ?self.timeout, "generation timed out");
                return Err(RagError::GenerationUnavailable {
                    provider: self.model.name().to_string(),
                    message: format!("timed out after {:?}", self.timeout),
                });
            }
        };

        let answer = answer.trim().to_string();
        if answer.is_empty() {
            return Err(RagError::GenerationUnavailable {
                provider: self.model.name().to_string(),
                message: "model returned an empty answer".to_string(),
            });
        }

        Ok(GeneratedAnswer { answer, context_used })
    }
}

/// Render the prompt for `question` with the given context segments.
pub fn render_prompt(question: &str, context: &[Segment]) -> String {
    let context_block = if context.is_empty() {
        NO_CONTEXT.to_string()
    } else {
        context.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(SEGMENT_SEPARATOR)
    };
    format!("{PREAMBLE}\n\n{context_block}\n\nQuestion: {question}\nHelpful Answer:")
}

/// Render the longest prompt within `limit` characters.
///
/// Segments are dropped whole from the end of `context` (the least similar)
/// until the prompt fits. Returns the prompt and the number of segments kept.
pub fn fit_prompt(question: &str, context: &[Segment], limit: usize) -> Result<(String, usize)> {
    for kept in (0..=context.len()).rev() {
        let prompt = render_prompt(question, &context[..kept]);
        if prompt.chars().count() <= limit {
            return Ok((prompt, kept));
        }
    }
    Err(RagError::InvalidQuestion(format!(
        "question does not fit the model input limit of {limit} characters"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str) -> Segment {
        Segment {
            id: format!("{text}_0"),
            text: text.into(),
            document_id: text.into(),
            record_index: 0,
            offset: 0,
        }
    }

    #[test]
    fn context_keeps_retrieval_order() {
        let prompt = render_prompt("Which is cheapest?", &[segment("first"), segment("second")]);
        let first = prompt.find("first").unwrap();
        let second = prompt.find("second").unwrap();
        assert!(first < second);
        assert!(prompt.ends_with("Question: Which is cheapest?\nHelpful Answer:"));
    }

    #[test]
    fn empty_context_is_labelled() {
        assert!(render_prompt("anything?", &[]).contains(NO_CONTEXT));
    }

    #[test]
    fn truncation_drops_lowest_ranked_whole_segments() {
        let context =
            [segment(&"a".repeat(50)), segment(&"b".repeat(50)), segment(&"c".repeat(50))];
        let two = render_prompt("q", &context[..2]).chars().count();

        let (prompt, kept) = fit_prompt("q", &context, two).unwrap();
        assert_eq!(kept, 2);
        assert!(prompt.contains(&"b".repeat(50)));
        assert!(!prompt.contains(&"c".repeat(50)));
    }

    #[test]
    fn everything_fits_under_a_generous_limit() {
        let context = [segment("x"), segment("y")];
        let (_, kept) = fit_prompt("q", &context, 100_000).unwrap();
        assert_eq!(kept, 2);
    }

    #[test]
    fn oversized_question_is_rejected() {
        let err = fit_prompt(&"?".repeat(500), &[], 100).unwrap_err();
        assert!(matches!(err, RagError::InvalidQuestion(_)));
    }
}
