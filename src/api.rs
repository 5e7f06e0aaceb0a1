//! Gemini REST interaction for curation and cover generation.
//!
//! Two seams keep the pipeline testable without a network:
//! - [`AskAsync`]: send text, receive text (used for curation)
//! - [`ImageGenerator`]: send a prompt, receive image bytes (used by the
//!   resolver's AI tier)
//!
//! [`GeminiText`] and [`GeminiImage`] implement them against the public
//! `generateContent` endpoint. There is no retry: a failed call falls back to
//! locally built text or to the next cover tier.

use crate::error::{FetchError, FetchResult};
use crate::http::FetchedImage;
use crate::models::Curation;
use crate::utils::{html_to_text, normalize_space, take_chars};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

const GEMINI_API: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const TEXT_TIMEOUT: Duration = Duration::from_secs(25);
const IMAGE_TIMEOUT: Duration = Duration::from_secs(90);
const FALLBACK_SUMMARY_CHARS: usize = 240;

pub const DEFAULT_CURATION_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```(?:json)?\s*(\{[\s\S]*?\})\s*```").unwrap());

/// Trait for async LLM interaction.
///
/// Implementors send text to a model and return its response.
#[allow(async_fn_in_trait)]
pub trait AskAsync {
    /// The type of response returned by the model.
    type Response;

    /// Send text to the model and receive a response.
    ///
    /// # Arguments
    ///
    /// * `text` - The prompt to send
    ///
    /// # Returns
    ///
    /// The model's response, or an error if the request failed.
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>>;
}

/// Source of generated cover images.
#[allow(async_fn_in_trait)]
pub trait ImageGenerator {
    /// Whether a call could succeed at all (a credential is configured).
    fn is_enabled(&self) -> bool;

    async fn generate_image(&self, prompt: &str) -> FetchResult<FetchedImage>;
}

fn endpoint(model: &str) -> String {
    format!("{GEMINI_API}/{model}:generateContent")
}

async fn post_generate(
    client: &reqwest::Client,
    api_key: &str,
    model: &str,
    body: &Value,
    timeout: Duration,
) -> FetchResult<Value> {
    let url = endpoint(model);
    let res = client
        .post(&url)
        .query(&[("key", api_key)])
        .json(body)
        .timeout(timeout)
        .send()
        .await?;
    let status = res.status();
    if !status.is_success() {
        return Err(FetchError::Status { status: status.as_u16(), url });
    }
    Ok(res.json().await?)
}

/// Text model behind [`AskAsync`].
#[derive(Debug, Clone)]
pub struct GeminiText {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiText {
    pub fn new(client: reqwest::Client, api_key: &str, model: &str) -> Self {
        Self { client, api_key: api_key.to_string(), model: model.to_string() }
    }
}

impl AskAsync for GeminiText {
    type Response = String;

    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let t0 = Instant::now();
        let body = json!({ "contents": [{ "parts": [{ "text": text }] }] });
        let res = post_generate(&self.client, &self.api_key, &self.model, &body, TEXT_TIMEOUT).await;
        let dt = t0.elapsed();

        match res {
            Ok(data) => {
                debug!(elapsed_ms = dt.as_millis() as u64, "Text generation finished");
                Ok(extract_text(&data))
            }
            Err(e) => {
                warn!(elapsed_ms = dt.as_millis() as u64, error = %e, "API call failed");
                Err(e.into())
            }
        }
    }
}

/// Image model behind [`ImageGenerator`].
#[derive(Debug, Clone)]
pub struct GeminiImage {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiImage {
    pub fn new(client: reqwest::Client, api_key: &str, model: &str) -> Self {
        Self { client, api_key: api_key.trim().to_string(), model: model.to_string() }
    }
}

impl ImageGenerator for GeminiImage {
    fn is_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn generate_image(&self, prompt: &str) -> FetchResult<FetchedImage> {
        if !self.is_enabled() {
            return Err(FetchError::Unavailable("image generation is not configured"));
        }
        let t0 = Instant::now();
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseModalities": ["Image", "Text"] },
        });
        let data = post_generate(&self.client, &self.api_key, &self.model, &body, IMAGE_TIMEOUT).await?;
        let image = extract_inline_image(&data)?;
        info!(
            bytes = image.bytes.len(),
            content_type = %image.content_type,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Generated cover image"
        );
        Ok(image)
    }
}

/// First non-empty `candidates[].content.parts[].text`, trimmed.
pub fn extract_text(data: &Value) -> String {
    parts(data)
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .map(str::trim)
        .find(|t| !t.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// First `inlineData` part with an `image/*` MIME type, base64-decoded.
pub fn extract_inline_image(data: &Value) -> FetchResult<FetchedImage> {
    let inline = parts(data)
        .filter_map(|part| part.get("inlineData"))
        .find(|inline| {
            let mime = inline.get("mimeType").and_then(Value::as_str).unwrap_or_default();
            let has_data = inline.get("data").and_then(Value::as_str).is_some_and(|d| !d.is_empty());
            mime.starts_with("image/") && has_data
        })
        .ok_or_else(|| FetchError::Decode("response has no inline image".to_string()))?;

    let content_type = inline["mimeType"].as_str().unwrap_or_default().to_string();
    let encoded = inline["data"].as_str().unwrap_or_default();
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| FetchError::Decode(format!("inline image is not base64: {e}")))?;
    Ok(FetchedImage { bytes, content_type })
}

fn parts(data: &Value) -> impl Iterator<Item = &Value> {
    data.get("candidates")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|c| c.pointer("/content/parts").and_then(Value::as_array))
        .flatten()
}

/// Pull a JSON object out of a model reply.
///
/// A fenced ```json block wins; otherwise the span from the first `{` to the
/// last `}` is tried. Anything that is not an object yields an empty map.
pub fn parse_json_from_response_text(text: &str) -> serde_json::Map<String, Value> {
    let raw = text.trim();
    if raw.is_empty() {
        return serde_json::Map::new();
    }
    let candidate = match FENCED_JSON.captures(raw).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().trim(),
        None => match (raw.find('{'), raw.rfind('}')) {
            (Some(start), Some(end)) if end > start => &raw[start..=end],
            _ => raw,
        },
    };
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    }
}

/// Cleaned context (or the title when empty), capped at 240 characters.
pub fn fallback_summary(title: &str, content: &str) -> String {
    let mut text = html_to_text(content);
    if text.is_empty() {
        text = normalize_space(title);
    }
    if text.chars().count() > FALLBACK_SUMMARY_CHARS {
        format!("{}...", take_chars(&text, FALLBACK_SUMMARY_CHARS).trim_end())
    } else {
        text
    }
}

pub fn fallback_prompt(style: &str, title: &str, source: &str) -> String {
    format!("{style}. Topic: {title}. Source context: {source}. Editorial cover style.")
}

fn curation_prompt(title: &str, content: &str, source: &str) -> String {
    format!(
        r#"당신은 IT/AI/로봇 전문 콘텐츠 에디터입니다.
제공된 뉴스 정보를 바탕으로 아래 두 항목을 생성하세요.

1) curated_summary
- 원문 문장을 그대로 복사하지 말고, 완전히 재창작한 한국어 요약 2~3문장
- 비전공자도 이해 가능한 쉬운 표현

2) image_prompt
- 기사 원문 사진을 대체할 수 있는 미래지향적 3D 렌더링 스타일의 영어 프롬프트 1개
- 로고/워터마크/텍스트 오버레이 금지

반드시 JSON만 반환:
{{
  "curated_summary": "...",
  "image_prompt": "..."
}}

[뉴스 정보]
출처: {source}
제목: {title}
원문 내용: {content}
"#
    )
}

/// Rewrites item summaries and drafts cover prompts, within a per-run budget.
#[derive(Debug)]
pub struct Curator<A> {
    asker: Option<A>,
    model: String,
    enabled: bool,
    /// `0` means unlimited.
    limit: usize,
    image_style: String,
    used: AtomicUsize,
}

impl<A: AskAsync<Response = String>> Curator<A> {
    /// `asker` is `None` when no credential is configured.
    pub fn new(asker: Option<A>, model: &str, enabled: bool, limit: usize, image_style: &str) -> Self {
        Self {
            asker,
            model: model.to_string(),
            enabled,
            limit,
            image_style: image_style.to_string(),
            used: AtomicUsize::new(0),
        }
    }

    /// Successful curations so far.
    pub fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    /// Curate one item. Never fails; the mode records which path was taken.
    #[instrument(level = "info", skip_all, fields(%source))]
    pub async fn curate(&self, title: &str, content: &str, source: &str) -> Curation {
        let fallback = |model: &str, mode: &str| Curation {
            summary: fallback_summary(title, content),
            image_prompt: fallback_prompt(&self.image_style, title, source),
            model: model.to_string(),
            mode: mode.to_string(),
        };

        if !self.enabled {
            return fallback("", "curation-disabled");
        }
        if self.limit > 0 && self.used() >= self.limit {
            return fallback("", "curation-limit-reached");
        }
        let Some(asker) = self.asker.as_ref() else {
            return fallback("", "curation-fallback");
        };

        let reply = match asker.ask(&curation_prompt(title, content, source)).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Curation failed");
                return fallback(&self.model, "curation-error");
            }
        };
        let payload = parse_json_from_response_text(&reply);
        let field = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .map(normalize_space)
                .unwrap_or_default()
        };

        let mut curation = fallback(&self.model, "curation-success");
        let summary = field("curated_summary");
        if !summary.is_empty() {
            curation.summary = summary;
        }
        let image_prompt = field("image_prompt");
        if !image_prompt.is_empty() {
            curation.image_prompt = image_prompt;
        }
        self.used.fetch_add(1, Ordering::Relaxed);
        curation
    }
}
