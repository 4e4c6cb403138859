use super::request::TranslationRequest;

/// Output shape shown to the model, verbatim.
pub const EXAMPLE_OUTPUT: &str = r#"["<translation of the first message>", "<translation of the second message>"]"#;

/// Instruction prompt for the first attempt.
pub fn build_prompt(req: &TranslationRequest, domain_context: &str) -> serde_json::Result<String> {
    let input_json = req.to_wire_json()?;
    let count = req.expected_count();

    Ok(format!(
        r#"You are a translation engine.
Context: {domain_context} The messages are short texts written by auditors and operators.

Input JSON:
{input_json}

Task:
- Translate each message from the source language **{source}** into **exactly** the target language **{target}**. Do not use any other language.
- Keep sentence boundaries as they are: do not split, merge or reorder sentences or messages.
- Use a formal, technical register.
- Return exactly {count} strings, one per input message, in the same order as the input.
- Respond ONLY with a JSON array of strings. No extra text, no explanations, no code fences.

Example of the exact output format:
{EXAMPLE_OUTPUT}
"#,
        source = req.source_language,
        target = req.language,
    ))
}

/// First-attempt prompt with feedback about a count mismatch appended.
pub fn build_corrective_prompt(
    base_prompt: &str,
    previous_output: &[String],
    expected: usize,
) -> String {
    let previous = serde_json::to_string(previous_output).unwrap_or_else(|_| format!("{:?}", previous_output));
    format!(
        r#"{base_prompt}
Your previous answer contained {observed} strings, but {expected} were expected.
Previous answer:
{previous}

Return exactly {expected} strings as a JSON array, one translation per input message, in order. No commentary, no code fences.
"#,
        observed = previous_output.len(),
    )
}
