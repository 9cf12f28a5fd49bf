// src/assembler/prompts.rs
// Prompt templates and their interpolation

use crate::classifier::PromptTemplate;

const COMPANION_PERSONA: &str = "You are a warm, patient companion for an older adult \
living with dementia. Use short, simple sentences and a calm, encouraging tone. Never \
correct or contradict them, never mention illness, and keep your reply under 80 words.";

/// User-supplied fields that may be interpolated into a template.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptInput<'a> {
    pub text: &'a str,
    pub context: Option<&'a str>,
    pub topic: Option<&'a str>,
    pub mood: Option<&'a str>,
    pub action: Option<&'a str>,
}

/// Generic opening line used when the user text is empty.
pub fn opening_line(template: PromptTemplate) -> &'static str {
    match template {
        PromptTemplate::Companion => "Greet them warmly and ask how they are feeling today.",
        PromptTemplate::GuidedRecall | PromptTemplate::OpenReminiscence => {
            "Gently invite them to share a favourite memory."
        }
        PromptTemplate::MusicGuide => "Suggest some gentle, familiar music they might enjoy.",
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Build the single instruction string sent to the generation service.
pub fn compose(template: PromptTemplate, input: &PromptInput<'_>) -> String {
    let text = input.text.trim();
    let mut prompt = String::from(COMPANION_PERSONA);
    prompt.push_str("\n\n");

    match template {
        PromptTemplate::Companion => {
            if let Some(context) = non_empty(input.context) {
                prompt.push_str(&format!("Conversation context: {context}\n"));
            }
            if text.is_empty() {
                prompt.push_str(opening_line(template));
            } else {
                prompt.push_str(&format!(
                    "They said: \"{text}\"\nReply kindly and keep the conversation going."
                ));
            }
        }
        PromptTemplate::GuidedRecall => {
            if let Some(topic) = non_empty(input.topic) {
                prompt.push_str(&format!("They are thinking about {topic} memories.\n"));
            }
            prompt.push_str(&format!(
                "They are recalling a memory: \"{text}\"\nHelp them explore it with one \
                 gentle, open question about the people, places, sounds or feelings involved. \
                 Do not invent details they have not mentioned."
            ));
        }
        PromptTemplate::OpenReminiscence => {
            let topic = non_empty(input.topic).unwrap_or("happy");
            if text.is_empty() {
                prompt.push_str(&format!(
                    "Gently invite them to share one of their {topic} memories."
                ));
            } else {
                prompt.push_str(&format!(
                    "They said: \"{text}\"\nWarmly encourage them to reminisce about {topic} \
                     memories and offer one simple question to get started."
                ));
            }
        }
        PromptTemplate::MusicGuide => {
            if let Some(mood) = non_empty(input.mood) {
                prompt.push_str(&format!("They are in a {mood} mood.\n"));
            }
            if let Some(action) = non_empty(input.action) {
                prompt.push_str(&format!("They would like to {action} music.\n"));
            }
            if text.is_empty() {
                prompt.push_str(opening_line(template));
            } else {
                prompt.push_str(&format!(
                    "They asked about music: \"{text}\"\nSuggest familiar songs or artists \
                     from their youth and say why they might bring comfort."
                ));
            }
        }
    }

    prompt
}
