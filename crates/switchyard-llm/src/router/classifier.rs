//! Task classifier
//!
//! Ordered pattern rules over the lower-cased prompt. Keywords match as whole
//! words with their common inflections listed explicitly, so "classify" is not
//! "class" and "listen" is not "list". The first matching rule
//! wins, so the order of [`RULES`] is part of the contract: code beats
//! reasoning beats structure, and both image-generation rules run before the
//! generic vision rule.

use super::types::TaskType;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

const IMAGE_NOUNS: &str = "image|picture|photo|drawing|painting|illustration|portrait|sketch|artwork|logo|icon|wallpaper";

struct Rule {
    name: &'static str,
    pattern: Regex,
    task: TaskType,
}

fn rule(name: &'static str, pattern: &str, task: TaskType) -> Rule {
    Rule {
        name,
        pattern: Regex::new(pattern).expect("classifier patterns are compile-time constants"),
        task,
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(
            "code",
            r"\b(debug(s|ged|ging)?|fix(es|ed|ing)?|code[sd]?|codebase|coding|functions?|class(es)?|implement(s|ed|ing|ation)?)\b",
            TaskType::CodeGeneration,
        ),
        rule(
            "analysis",
            r"\b(analy[sz](e|es|ed|ing|is)|research(es|ed|ing)?|explain(s|ed|ing)?|explanations?|compar(e|es|ed|ing|ison)|evaluat(e|es|ed|ing|ion))\b",
            TaskType::DeepReasoning,
        ),
        rule(
            "structure",
            r"\b(json|tables?|lists?|format(s|ted|ting)?|structured?)\b",
            TaskType::StructuredOutput,
        ),
        rule(
            "image_of",
            &format!(r"^\s*(an?\s+)?({IMAGE_NOUNS})s?\s+of\b"),
            TaskType::ImageGeneration,
        ),
        rule(
            "image_action",
            &format!(
                r"\b(generate|create|make|draw|paint|render)\b.*?\b({IMAGE_NOUNS}|art)s?\b"
            ),
            TaskType::ImageGeneration,
        ),
        rule(
            "visual",
            r"\b(images?|screenshots?|diagrams?|visual(s|ly|i[sz]e)?)\b",
            TaskType::VisionAnalysis,
        ),
    ]
});

/// Infer the task type of a prompt
///
/// Pure and deterministic; falls back to [`TaskType::General`].
#[must_use]
pub fn classify(prompt: &str) -> TaskType {
    let lower = prompt.to_lowercase();

    for rule in RULES.iter() {
        if rule.pattern.is_match(&lower) {
            debug!(rule = rule.name, task = %rule.task, "Classified prompt");
            return rule.task;
        }
    }

    debug!(
        prompt_chars = lower.chars().count(),
        "No task rule matched; defaulting to general"
    );
    TaskType::General
}
