//! Gemini adapter for match scoring
//!
//! Calls the Generative Language API with a prompt assembled from both
//! items (including their vision summaries) and expects the model to
//! answer with a single JSON object. Models like to wrap JSON in markdown
//! fences or chatter around it, so parsing strips fences and falls back
//! to the outermost brace pair before giving up.

use async_trait::async_trait;
use refound_common::models::Item;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;
use tracing::{debug, info};

use super::{clamp_confidence, MatchEvaluation, MatchScorer, ScorerError};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Scorer backed by the Gemini generateContent endpoint.
pub struct GeminiScorer {
    http_client: reqwest::Client,
    api_key: String,
}

impl GeminiScorer {
    pub fn new(api_key: String, timeout_secs: u64) -> Result<Self, ScorerError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ScorerError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
        })
    }
}

#[async_trait]
impl MatchScorer for GeminiScorer {
    async fn evaluate(&self, lost: &Item, found: &Item) -> Result<MatchEvaluation, ScorerError> {
        let prompt = build_prompt(lost, found);
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_BASE_URL, GEMINI_MODEL, self.api_key
        );

        debug!(lost_id = %lost.id, found_id = %found.id, "Requesting match evaluation");

        let response = self
            .http_client
            .post(&url)
            .json(&GenerateContentRequest::from_prompt(&prompt))
            .send()
            .await
            .map_err(|e| ScorerError::Network(e.to_string()))?;

        let status = response.status();

        if status == 429 {
            return Err(ScorerError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ScorerError::Api(status.as_u16(), error_text));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ScorerError::Parse(e.to_string()))?;

        let text = payload
            .first_text()
            .ok_or_else(|| ScorerError::Parse("no candidate text in response".to_string()))?;

        let evaluation = parse_evaluation(&text)?;

        info!(
            lost_id = %lost.id,
            found_id = %found.id,
            confidence = evaluation.confidence,
            "Match evaluation complete"
        );

        Ok(evaluation)
    }
}

/// Assemble the comparison prompt from both items' descriptive fields.
fn build_prompt(lost: &Item, found: &Item) -> String {
    let mut prompt = String::from(
        "You are comparing two reports from a lost-and-found marketplace. \
         Decide how likely it is that the FOUND item is the same physical \
         object as the LOST item.\n\n",
    );
    prompt.push_str(&describe_item("LOST item", lost));
    prompt.push('\n');
    prompt.push_str(&describe_item("FOUND item", found));
    prompt.push_str(
        "\nRespond with only a JSON object, no markdown fences:\n\
         {\"confidenceScore\": <integer 0-100>, \"reasoning\": \"<one or two sentences>\"}\n",
    );
    prompt
}

fn describe_item(heading: &str, item: &Item) -> String {
    let mut s = format!("{heading}:\n");
    let _ = writeln!(s, "- Description: {}", item.description);
    if let Some(category) = &item.category {
        let _ = writeln!(s, "- Category: {category}");
    }
    if !item.colors.is_empty() {
        let _ = writeln!(s, "- Colors: {}", item.colors.join(", "));
    }
    if let Some(brand) = &item.brand {
        let _ = writeln!(s, "- Brand: {brand}");
    }
    if let Some(condition) = &item.condition {
        let _ = writeln!(s, "- Condition: {condition}");
    }
    if let Some(material) = &item.material {
        let _ = writeln!(s, "- Material: {material}");
    }
    if let Some(flaws) = &item.flaws {
        let _ = writeln!(s, "- Notable flaws: {flaws}");
    }
    if let Some(vision) = &item.vision {
        if !vision.labels.is_empty() {
            let _ = writeln!(s, "- Image labels: {}", vision.labels.join(", "));
        }
        if !vision.objects.is_empty() {
            let names: Vec<&str> = vision.objects.iter().map(|o| o.name.as_str()).collect();
            let _ = writeln!(s, "- Objects in image: {}", names.join(", "));
        }
    }
    s
}

/// Parse the model's answer into an evaluation.
///
/// Accepts bare JSON, fenced JSON, and JSON embedded in surrounding prose.
fn parse_evaluation(text: &str) -> Result<MatchEvaluation, ScorerError> {
    let cleaned = strip_code_fences(text);

    let payload: EvaluationPayload = match serde_json::from_str(cleaned) {
        Ok(payload) => payload,
        Err(first_err) => {
            // Fall back to the outermost brace pair
            let start = cleaned.find('{');
            let end = cleaned.rfind('}');
            match (start, end) {
                (Some(start), Some(end)) if start < end => {
                    serde_json::from_str(&cleaned[start..=end])
                        .map_err(|e| ScorerError::Parse(e.to_string()))?
                }
                _ => return Err(ScorerError::Parse(first_err.to_string())),
            }
        }
    };

    Ok(MatchEvaluation {
        confidence: clamp_confidence(payload.confidence_score.round() as i64),
        reasoning: payload.reasoning,
    })
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EvaluationPayload {
    #[serde(rename = "confidenceScore")]
    confidence_score: f64,
    #[serde(default)]
    reasoning: String,
}
