use crate::domain::entities::trade_signal::TradeSignal;
use crate::domain::error::ClassifierError;
use crate::domain::ports::classifier::Classifier;
use crate::domain::values::clock::ReferenceClock;
use crate::domain::values::trade_direction::TradeDirection;
use crate::domain::values::trade_magnitude::TradeMagnitude;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const TEMPERATURE: f32 = 0.3;

const SYSTEM_PROMPT: &str = r#"You are a financial analyst specialising in stock trades disclosed or discussed by members of Congress. Classify the post you are given.

Bullish activity: buy, bought, purchase, acquire, accumulate, long, call options, increased position.
Bearish activity: sell, sold, dump, short, put options, decreased position, divested, liquidated.

Other cues: cashtags ($ followed by a symbol), position-size language ("large stake", "small position"), freshness words ("just", "today", "recently"), option strikes and expiries.

Magnitude scale:
10: major position change (over $1M or a large share of the portfolio)
8-9: large trade
6-7: moderate adjustment
4-5: small to medium trade
1-3: minor tweak

Reply with JSON only, using exactly these fields:
{
  "member_name": string,
  "company_traded": string (the cashtag, e.g. "$AAPL"),
  "trade_direction": "good" for bullish or "bad" for bearish,
  "trade_magnitude": integer from 1 to 10,
  "tweet_text": string
}

Reply with null when the post shows no clear trading activity. Only answer when confident."#;

/// Trade-signal classifier backed by the OpenAI chat completions API.
pub struct OpenAiClassifier {
    client: Client,
    api_key: String,
    model: String,
    clock: ReferenceClock,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Fields the model must supply. `tweet_text` is replaced with the original
/// post and `timestamp` is stamped locally, so both are ignored if present.
#[derive(Deserialize)]
struct RawSignal {
    member_name: String,
    company_traded: String,
    trade_direction: TradeDirection,
    trade_magnitude: TradeMagnitude,
}

impl OpenAiClassifier {
    pub fn new(api_key: String, model: Option<String>, clock: ReferenceClock) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            clock,
        }
    }
}

#[async_trait::async_trait]
impl Classifier for OpenAiClassifier {
    async fn classify(&self, author: &str, text: &str) -> Result<Option<TradeSignal>, ClassifierError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let prompt = format!("Analyze this post from {author}: {text}");
        let resp = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages: [
                    ChatMessage {
                        role: "system",
                        content: SYSTEM_PROMPT,
                    },
                    ChatMessage {
                        role: "user",
                        content: &prompt,
                    },
                ],
                temperature: TEMPERATURE,
            })
            .send()
            .await
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClassifierError::Service { status, body });
        }

        let result: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ClassifierError::Parse(e.to_string()))?;
        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClassifierError::Parse("empty completion".into()))?;

        parse_signal(&content, text, self.clock.timestamp())
    }
}

/// Validate a model reply into a [`TradeSignal`].
///
/// `null` (or an empty object) means no signal. Anything that does not match
/// the signal shape exactly, including an out-of-range magnitude or a
/// direction other than `good`/`bad`, is a [`ClassifierError::Parse`].
pub fn parse_signal(content: &str, post_text: &str, timestamp: String) -> Result<Option<TradeSignal>, ClassifierError> {
    let body = strip_code_fence(content);
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ClassifierError::Parse(format!("not JSON: {e}")))?;

    match &value {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Object(map) if map.is_empty() => return Ok(None),
        serde_json::Value::Object(_) => {}
        other => {
            return Err(ClassifierError::Parse(format!(
                "expected object or null, got {other}"
            )))
        }
    }

    let raw: RawSignal =
        serde_json::from_value(value).map_err(|e| ClassifierError::Parse(e.to_string()))?;

    Ok(Some(TradeSignal {
        member_name: raw.member_name,
        company_traded: raw.company_traded,
        trade_direction: raw.trade_direction,
        trade_magnitude: raw.trade_magnitude,
        tweet_text: post_text.to_string(),
        timestamp,
    }))
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // Drop an optional language tag on the opening fence line.
    match inner.split_once('\n') {
        Some((tag, rest)) if !tag.trim_start().starts_with('{') => rest.trim(),
        _ => inner.trim(),
    }
}
