// Prompt constants for note analysis.
//
// The instruction text must never contain a W label directly followed by `:` or `-`.
// Some backends echo the prompt back, and such a line would shadow the model's answer.

/// Placeholder substituted with the caller's note.
const NOTE_PLACEHOLDER: &str = "{note_text}";

/// Note analysis prompt template. Replace `{note_text}` before sending.
pub const NOTE_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following client contact note. Based only on the text provided, evaluate whether each of the 5 Ws (Who, What, Why, When, Where) is present.

Answer with exactly five lines, one per W, in the order Who, What, Why, When, Where.
Start each line with the W itself followed by a colon, then give a status (Yes, No or Partial) and a brief justification quoting the note where possible.
Do not add any other text.

Client Note: "{note_text}"

Analysis:
"#;

/// Renders the analysis prompt around `note_text`.
///
/// The note is embedded verbatim, exactly once. Substitution is a single pass
/// over the template, so a note that itself contains `{note_text}` is left alone.
pub fn build_prompt(note_text: &str) -> String {
    NOTE_ANALYSIS_PROMPT_TEMPLATE.replacen(NOTE_PLACEHOLDER, note_text, 1)
}
