//! Request configuration: sampling parameters edited by the UI and the
//! upstream endpoint loaded at startup.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretBox};

pub const MAX_TOKENS_RANGE: (u32, u32) = (1, 16_384);
pub const TEMPERATURE_RANGE: (f32, f32) = (0.0, 2.0);
pub const TOP_P_RANGE: (f32, f32) = (0.01, 1.0);
pub const TOP_K_RANGE: (u32, u32) = (1, 100);

pub const DEFAULT_MAX_TOKENS: u32 = 16_384;
pub const DEFAULT_TEMPERATURE: f32 = 0.60;
pub const DEFAULT_TOP_P: f32 = 0.95;
pub const DEFAULT_TOP_K: u32 = 40;

/// Slider step for the float parameters
const FLOAT_STEP: f32 = 0.01;

/// One adjustable sampling slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingParam {
    MaxTokens,
    Temperature,
    TopP,
    TopK,
}

impl SamplingParam {
    pub const ALL: [SamplingParam; 4] =
        [SamplingParam::MaxTokens, SamplingParam::Temperature, SamplingParam::TopP, SamplingParam::TopK];

    pub fn label(&self) -> &'static str {
        match self {
            SamplingParam::MaxTokens => "Max Tokens",
            SamplingParam::Temperature => "Temperature",
            SamplingParam::TopP => "Top P",
            SamplingParam::TopK => "Top K",
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|p| p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|p| p == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Snapshot of the sidebar settings taken for each request.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    instruction: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            instruction: String::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl SamplingConfig {
    /// Build from raw values, clamping each into its range.
    pub fn new(instruction: impl Into<String>, max_tokens: u32, temperature: f32, top_p: f32, top_k: u32) -> Self {
        let mut config = Self { instruction: instruction.into(), ..Self::default() };
        config.set_max_tokens(max_tokens);
        config.set_temperature(temperature);
        config.set_top_p(top_p);
        config.set_top_k(top_k);
        config
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// The instruction, if there is one to send.
    pub fn instruction(&self) -> Option<&str> {
        if self.instruction.is_empty() { None } else { Some(&self.instruction) }
    }

    /// Raw instruction text, possibly empty (for editing).
    pub fn instruction_text(&self) -> &str {
        &self.instruction
    }

    pub fn instruction_mut(&mut self) -> &mut String {
        &mut self.instruction
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    pub fn set_max_tokens(&mut self, value: u32) {
        self.max_tokens = value.clamp(MAX_TOKENS_RANGE.0, MAX_TOKENS_RANGE.1);
    }

    pub fn set_temperature(&mut self, value: f32) {
        self.temperature = snap(value).clamp(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1);
    }

    pub fn set_top_p(&mut self, value: f32) {
        self.top_p = snap(value).clamp(TOP_P_RANGE.0, TOP_P_RANGE.1);
    }

    pub fn set_top_k(&mut self, value: u32) {
        self.top_k = value.clamp(TOP_K_RANGE.0, TOP_K_RANGE.1);
    }

    /// Move a slider by `steps` increments (negative moves down).
    pub fn adjust(&mut self, param: SamplingParam, steps: i32) {
        match param {
            SamplingParam::MaxTokens => self.set_max_tokens(step_int(self.max_tokens, steps)),
            SamplingParam::Temperature => self.set_temperature(self.temperature + steps as f32 * FLOAT_STEP),
            SamplingParam::TopP => self.set_top_p(self.top_p + steps as f32 * FLOAT_STEP),
            SamplingParam::TopK => self.set_top_k(step_int(self.top_k, steps)),
        }
    }

    /// Position of a slider within its range, 0.0..=1.0.
    pub fn fraction(&self, param: SamplingParam) -> f64 {
        let (value, lo, hi) = match param {
            SamplingParam::MaxTokens => (self.max_tokens as f64, MAX_TOKENS_RANGE.0 as f64, MAX_TOKENS_RANGE.1 as f64),
            SamplingParam::Temperature => {
                (self.temperature as f64, TEMPERATURE_RANGE.0 as f64, TEMPERATURE_RANGE.1 as f64)
            }
            SamplingParam::TopP => (self.top_p as f64, TOP_P_RANGE.0 as f64, TOP_P_RANGE.1 as f64),
            SamplingParam::TopK => (self.top_k as f64, TOP_K_RANGE.0 as f64, TOP_K_RANGE.1 as f64),
        };
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    }

    pub fn display_value(&self, param: SamplingParam) -> String {
        match param {
            SamplingParam::MaxTokens => self.max_tokens.to_string(),
            SamplingParam::Temperature => format!("{:.2}", self.temperature),
            SamplingParam::TopP => format!("{:.2}", self.top_p),
            SamplingParam::TopK => self.top_k.to_string(),
        }
    }
}

fn step_int(value: u32, steps: i32) -> u32 {
    if steps >= 0 { value.saturating_add(steps as u32) } else { value.saturating_sub(steps.unsigned_abs()) }
}

/// Round to the slider grid so repeated steps do not drift.
fn snap(value: f32) -> f32 {
    (value / FLOAT_STEP).round() * FLOAT_STEP
}

/// Upstream chat-completions endpoint.
pub struct Endpoint {
    pub url: String,
    pub api_key: SecretBox<String>,
    pub model: String,
    /// Upper bound on one whole request, streaming included
    pub timeout: Duration,
}

impl Endpoint {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key.expose_secret())
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_sidebar_initial_values() {
        let config = SamplingConfig::default();
        assert_eq!(config.max_tokens(), 16_384);
        assert!((config.temperature() - 0.60).abs() < 1e-6);
        assert!((config.top_p() - 0.95).abs() < 1e-6);
        assert_eq!(config.top_k(), 40);
        assert_eq!(config.instruction(), None);
    }

    #[test]
    fn new_clamps_into_ranges() {
        let config = SamplingConfig::new("", 0, 5.0, 0.0, 1000);
        assert_eq!(config.max_tokens(), 1);
        assert!((config.temperature() - 2.0).abs() < 1e-6);
        assert!((config.top_p() - 0.01).abs() < 1e-6);
        assert_eq!(config.top_k(), 100);
    }

    #[test]
    fn adjust_steps_and_saturates() {
        let mut config = SamplingConfig::default();
        config.adjust(SamplingParam::MaxTokens, 10);
        assert_eq!(config.max_tokens(), 16_384);
        config.adjust(SamplingParam::MaxTokens, -100_000);
        assert_eq!(config.max_tokens(), 1);

        config.adjust(SamplingParam::TopK, -1);
        assert_eq!(config.top_k(), 39);

        for _ in 0..7 {
            config.adjust(SamplingParam::Temperature, 1);
        }
        assert_eq!(config.display_value(SamplingParam::Temperature), "0.67");

        config.adjust(SamplingParam::TopP, 10);
        assert_eq!(config.display_value(SamplingParam::TopP), "1.00");
    }

    #[test]
    fn fraction_spans_the_range() {
        let config = SamplingConfig::new("", 16_384, 0.0, 1.0, 1);
        assert_eq!(config.fraction(SamplingParam::MaxTokens), 1.0);
        assert_eq!(config.fraction(SamplingParam::Temperature), 0.0);
        assert!((config.fraction(SamplingParam::TopP) - 1.0).abs() < 1e-6);
        assert_eq!(config.fraction(SamplingParam::TopK), 0.0);
    }

    #[test]
    fn params_cycle_both_ways() {
        assert_eq!(SamplingParam::TopK.next(), SamplingParam::MaxTokens);
        assert_eq!(SamplingParam::MaxTokens.prev(), SamplingParam::TopK);
    }

    #[test]
    fn endpoint_debug_hides_key() {
        let endpoint = Endpoint {
            url: "http://localhost/v1/chat/completions".into(),
            api_key: SecretBox::new(Box::new("sk-secret".to_string())),
            model: "m".into(),
            timeout: Duration::from_secs(5),
        };
        let shown = format!("{:?}", endpoint);
        assert!(!shown.contains("sk-secret"));
        assert_eq!(endpoint.bearer(), "Bearer sk-secret");
    }
}
