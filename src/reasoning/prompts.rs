//! Prompt builders for the three reasoning actions.
//!
//! Every prompt asks for the same two-line reply (`REASONING:` then `ANSWER:`) so
//! that [`crate::reasoning::response_parser::parse_reply`] can read any of them.

use crate::data::example::Example;

pub const SYSTEM_PROMPT: &str = "You are a helpful educational assistant.";

const REPLY_FORMAT: &str = "Return your response in the format:\n\
REASONING: <your reasoning>\n\
ANSWER: <an index from 0-3 if you are confident, otherwise null>\n\n";

fn previous_reasoning(example: &Example) -> &str {
    example.reasoning.trim()
}

/// Question and choices
pub fn qa_prompt(example: &Example) -> String {
    format!(
        "You are an expert educational reasoning assistant. Given a question, its choices, and \
optionally some prior reasoning steps, provide an explanation of the question and options but do \
not indicate anything about your answers in the reasoning part. You must include the information \
of the options in the reasonings, such as 'the options given are 0:...,1:...,2:...,' at the start \
of the reasoning.\n\
{}Question: {}\nChoices: {:?}\nPrevious Reasoning: {}\n\nYour response:",
        REPLY_FORMAT,
        example.question,
        example.choices,
        previous_reasoning(example)
    )
}

/// Metadata, hint and lecture
pub fn meta_prompt(example: &Example) -> String {
    let metadata = example
        .metadata
        .labelled_fields()
        .iter()
        .map(|(label, value)| format!("{}: {}\n", label, value))
        .collect::<String>();

    let mut context = String::new();
    if !example.hint.trim().is_empty() {
        context.push_str(&format!("Hint: {}\n", example.hint.trim()));
    }
    if !example.lecture.trim().is_empty() {
        context.push_str(&format!("Lecture: {}\n", example.lecture.trim()));
    }

    format!(
        "You are an expert educational reasoning assistant. Given a question, its metadata \
context, and optionally some prior reasoning steps, provide a detailed explanation based on the \
metadata (e.g., subject knowledge), but do not indicate anything about your answers in the \
reasoning part. You must include the metadata you received in the reasoning, such as 'the subject \
of this question is ... and the topic of the question is ...', and make sure to contain all \
metadata given.\n\
{}{}{}Question: {}\nPrevious Reasoning: {}\n\nYour response:",
        REPLY_FORMAT,
        metadata,
        context,
        example.question,
        previous_reasoning(example)
    )
}

/// Image description; the image itself travels alongside as a data URL
pub fn pic_prompt(example: &Example) -> String {
    format!(
        "You are an expert educational reasoning assistant. Given a question, a related picture, \
and optionally some prior reasoning steps, first provide a description of the picture, then tell \
in detail how this picture can help solve the problem, then give the answer only when you are \
very sure about it, otherwise say null. Do not indicate anything about your answers in the \
reasoning part. You must start with 'There is a picture given that '.\n\
You must not provide the final answer in the reasoning section.\n\
{}Question: {}\nPrevious Reasoning: {}\n\nYour response:",
        REPLY_FORMAT,
        example.question,
        previous_reasoning(example)
    )
}
