//! Moral arbiter: scores choices and writes the closing reflection.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use storyteller_domain::{tail_chars, MoralScores};

use super::json::{parse_json_reply, strip_special_tokens};
use crate::infrastructure::ports::{
    AlignmentScore, AlignmentScorer, ChatMessage, CollaboratorError, LlmPort, LlmRequest,
};

const COLLABORATOR: &str = "alignment";

/// How much of the prior narration the arbiter sees.
pub const CONTEXT_TAIL_CHARS: usize = 500;

const ARBITER_PROMPT: &str = "You are a Moral Arbiter in a story game. Analyze the player's \
choice against the story so far and assign score changes between -5 and +5 for compassion, \
courage and greed. Reply with a JSON object only: \
{\"compassion\": 0, \"courage\": 0, \"greed\": 0, \"reasoning\": \"...\"}";

/// Scores as the model sends them: integers, floats or numeric strings.
#[derive(Debug, Deserialize)]
struct ScoreReply {
    #[serde(default)]
    compassion: Value,
    #[serde(default)]
    courage: Value,
    #[serde(default)]
    greed: Value,
    #[serde(default)]
    reasoning: String,
}

fn delta(value: &Value) -> i32 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('+').parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
        .unwrap_or(0)
}

pub struct LlmAlignmentScorer {
    llm: Arc<dyn LlmPort>,
}

impl LlmAlignmentScorer {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl AlignmentScorer for LlmAlignmentScorer {
    async fn score(
        &self,
        choice: &str,
        prior_story_text: &str,
    ) -> Result<AlignmentScore, CollaboratorError> {
        let context = tail_chars(prior_story_text, CONTEXT_TAIL_CHARS);
        let request = LlmRequest::new(vec![ChatMessage::user(format!(
            "Story Context: {context}\nPlayer Choice: {choice}"
        ))])
        .with_system_prompt(ARBITER_PROMPT)
        .with_temperature(0.5)
        .with_json_output();

        let response = self.llm.generate(request).await?;
        let reply: ScoreReply = parse_json_reply(COLLABORATOR, &response.content)?;

        let score = AlignmentScore {
            compassion: delta(&reply.compassion),
            courage: delta(&reply.courage),
            greed: delta(&reply.greed),
            reasoning: reply.reasoning,
        };
        tracing::debug!(
            compassion = score.compassion,
            courage = score.courage,
            greed = score.greed,
            reasoning = %score.reasoning,
            "Scored player choice"
        );
        Ok(score)
    }

    async fn reflect(&self, scores: MoralScores) -> Result<String, CollaboratorError> {
        let prompt = format!(
            "Based on these final scores: {scores},\n\
             write a 2-sentence spiritual reflection for the player, referencing concepts \
             like Karma or Dharma if appropriate."
        );
        let request = LlmRequest::new(vec![ChatMessage::user(prompt)]).with_temperature(0.7);

        let response = self.llm.generate(request).await?;
        let reflection = strip_special_tokens(&response.content);
        if reflection.is_empty() {
            return Err(CollaboratorError::malformed(COLLABORATOR, "empty reflection"));
        }
        Ok(reflection)
    }
}
