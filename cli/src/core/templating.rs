//! # Footbot Prompt Templating
//!
//! File: cli/src/core/templating.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module renders the prompt sent to the language model when one is
//! configured. The prompt is a Tera template filled with the user's question,
//! the classified intent, the extracted entities, a flat list of facts pulled
//! from the API payload and a style instruction.
//!
//! ## Architecture
//!
//! The template is compiled into the binary (`PROMPT_TEMPLATE`) and rendered
//! with `Tera::one_off` and autoescaping disabled, since the output is plain
//! text rather than HTML. Only structured facts are embedded, never the raw
//! JSON payload, which keeps prompts short and predictable.
//!
//! ## Examples
//!
//! ```rust,ignore
//! let context = PromptContext::new(ResponseStyle::Casual, "Tell me about Messi", Intent::PlayerInfo)
//!     .with_entity("player", "Lionel Messi")
//!     .with_fact("Club", "Inter Miami");
//! let prompt = templating::render_prompt(&context)?;
//! ```
//!
use crate::chatbot::types::{Intent, ResponseStyle};
use crate::core::error::{FootbotError, Result};
use anyhow::anyhow;
use serde::Serialize;
use tera::Tera;
use tracing::debug;

const PROMPT_TEMPLATE: &str = "\
{{ instruction }}

User question: {{ question }}
Intent: {{ intent }}
{% if entities | length > 0 %}Entities:
{% for e in entities %}- {{ e.label }}: {{ e.value }}
{% endfor %}{% endif %}
{% if has_facts %}Available data:
{% for f in facts %}- {{ f.label }}: {{ f.value }}
{% endfor %}{% else %}Available data: none. Say so and offer what general knowledge you can.
{% endif %}
Answer the question about football using the data above. \
If something is missing, acknowledge it instead of guessing. \
Keep it to {{ length_hint }}.";

/// One `label: value` line of the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptLine {
    pub label: String,
    pub value: String,
}

/// Everything the prompt template needs.
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    instruction: &'static str,
    length_hint: &'static str,
    question: String,
    intent: String,
    entities: Vec<PromptLine>,
    facts: Vec<PromptLine>,
    has_facts: bool,
}

impl PromptContext {
    pub fn new(style: ResponseStyle, question: &str, intent: Intent) -> Self {
        Self {
            instruction: style_instruction(style),
            length_hint: match style {
                ResponseStyle::Detailed => "a few thorough paragraphs",
                _ => "two or three short paragraphs at most",
            },
            question: question.trim().to_string(),
            intent: intent.as_str().to_string(),
            entities: Vec::new(),
            facts: Vec::new(),
            has_facts: false,
        }
    }

    pub fn with_entity(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.entities.push(PromptLine {
            label: label.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_fact(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.facts.push(PromptLine {
            label: label.into(),
            value: value.into(),
        });
        self.has_facts = true;
        self
    }
}

/// The persona line that opens the prompt.
pub fn style_instruction(style: ResponseStyle) -> &'static str {
    match style {
        ResponseStyle::Casual => {
            "You are a friendly football expert who talks casually and uses a few emojis. \
             Be warm, enthusiastic and conversational."
        }
        ResponseStyle::Professional => {
            "You are a professional football analyst. Use a formal tone, structure the \
             answer clearly and do not use emojis."
        }
        ResponseStyle::Detailed => {
            "You are a comprehensive football encyclopedia. Give extensive detail, \
             include every number available and add context and analysis."
        }
    }
}

/// Renders the language-model prompt.
pub fn render_prompt(context: &PromptContext) -> Result<String> {
    let tera_context = tera::Context::from_serialize(context).map_err(|e| {
        anyhow!(FootbotError::Template { source: e }).context("Failed to build prompt context")
    })?;
    let prompt = Tera::one_off(PROMPT_TEMPLATE, &tera_context, false).map_err(|e| {
        anyhow!(FootbotError::Template { source: e }).context("Prompt rendering failed")
    })?;
    debug!("Rendered prompt ({} chars)", prompt.len());
    Ok(prompt)
}
