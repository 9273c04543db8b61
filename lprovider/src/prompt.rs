//! Per-model prompt templates and the registry that selects them.
//!
//! A template is a small record: how to render one turn, the separator placed
//! between rendered turns, and the assistant opener appended after the join so
//! the model knows where to continue. Unknown model identifiers resolve to the
//! [`DEFAULT_TEMPLATE`].
//!
//! ```rust
//! use lprovider::{Turn, format_prompt};
//!
//! let turns = vec![
//!     Turn::system("S"),
//!     Turn::user("hi"),
//!     Turn::user("how are you"),
//! ];
//!
//! assert_eq!(
//!     format_prompt(&turns, "Default"),
//!     "system\nS\nuser\nhi\nuser\nhow are you\n"
//! );
//! assert_eq!(format_prompt(&turns, "no-such-model"), format_prompt(&turns, "Default"));
//! ```

use std::sync::LazyLock;

use lcommon::{Registry, normalize_id};

use crate::Turn;

pub const DEFAULT_TEMPLATE: &str = "Default";

pub type RenderTurn = fn(&Turn) -> String;

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub render_turn: RenderTurn,
    pub separator: String,
    pub assistant_opener: String,
    pub stop_sequences: Vec<String>,
}

impl PromptTemplate {
    pub fn new(
        render_turn: RenderTurn,
        separator: impl Into<String>,
        assistant_opener: impl Into<String>,
    ) -> Self {
        Self {
            render_turn,
            separator: separator.into(),
            assistant_opener: assistant_opener.into(),
            stop_sequences: Vec::new(),
        }
    }

    pub fn with_stop_sequence(mut self, stop: impl Into<String>) -> Self {
        self.stop_sequences.push(stop.into());
        self
    }

    /// `"<role>\n<content>"` per turn, newline separated, trailing newline.
    pub fn plain() -> Self {
        Self::new(render_plain, "\n", "\n")
    }

    pub fn openchat() -> Self {
        Self::new(render_openchat, "<|end_of_turn|>", "GPT4 Correct Assistant:")
            .with_stop_sequence("<|end_of_turn|>")
    }

    pub fn chatml() -> Self {
        Self::new(render_chatml, "\n", "\n<|im_start|>assistant\n").with_stop_sequence("<|im_end|>")
    }

    pub fn llama3() -> Self {
        Self::new(
            render_llama3,
            "",
            "<|start_header_id|>assistant<|end_header_id|>\n\n",
        )
        .with_stop_sequence("<|eot_id|>")
    }

    pub fn format(&self, turns: &[Turn]) -> String {
        let mut prompt = turns
            .iter()
            .map(self.render_turn)
            .collect::<Vec<_>>()
            .join(&self.separator);
        prompt.push_str(&self.assistant_opener);
        prompt
    }
}

fn render_plain(turn: &Turn) -> String {
    format!("{}\n{}", turn.role, turn.content)
}

fn render_openchat(turn: &Turn) -> String {
    format!("GPT4 Correct {}: {}", turn.role.title(), turn.content)
}

fn render_chatml(turn: &Turn) -> String {
    format!("<|im_start|>{}\n{}<|im_end|>", turn.role, turn.content)
}

fn render_llama3(turn: &Turn) -> String {
    format!(
        "<|start_header_id|>{}<|end_header_id|>\n\n{}<|eot_id|>",
        turn.role, turn.content
    )
}

/// Model identifier to template mapping with a guaranteed fallback.
///
/// Identifiers are matched after trimming and ASCII lowercasing.
#[derive(Debug, Clone)]
pub struct FormatterRegistry {
    fallback: PromptTemplate,
    templates: Registry<PromptTemplate>,
}

impl FormatterRegistry {
    /// Registry holding only the plain fallback template.
    pub fn new() -> Self {
        Self {
            fallback: PromptTemplate::plain(),
            templates: Registry::new(),
        }
    }

    pub fn with_builtin_templates() -> Self {
        let mut registry = Self::new();
        registry.register("openchat", PromptTemplate::openchat());
        registry.register("chatml", PromptTemplate::chatml());
        registry.register("llama3", PromptTemplate::llama3());
        registry
    }

    /// Registers a template, returning the one it replaced.
    ///
    /// Registering under [`DEFAULT_TEMPLATE`] replaces the fallback.
    pub fn register(
        &mut self,
        model_id: impl AsRef<str>,
        template: PromptTemplate,
    ) -> Option<PromptTemplate> {
        let model_id = model_id.as_ref();
        if normalize_id(model_id) == normalize_id(DEFAULT_TEMPLATE) {
            return Some(std::mem::replace(&mut self.fallback, template));
        }

        self.templates.insert(model_id, template)
    }

    pub fn contains(&self, model_id: &str) -> bool {
        normalize_id(model_id) == normalize_id(DEFAULT_TEMPLATE) || self.templates.contains(model_id)
    }

    pub fn resolve(&self, model_id: &str) -> &PromptTemplate {
        self.templates.get(model_id).unwrap_or(&self.fallback)
    }

    pub fn format(&self, turns: &[Turn], model_id: &str) -> String {
        self.resolve(model_id).format(turns)
    }

    pub fn model_ids(&self) -> Vec<String> {
        self.templates.ids()
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::with_builtin_templates()
    }
}

static BUILTIN_REGISTRY: LazyLock<FormatterRegistry> =
    LazyLock::new(FormatterRegistry::with_builtin_templates);

pub fn builtin_registry() -> &'static FormatterRegistry {
    &BUILTIN_REGISTRY
}

/// Formats `turns` with the built-in template registered for `model_id`.
pub fn format_prompt(turns: &[Turn], model_id: &str) -> String {
    builtin_registry().format(turns, model_id)
}
