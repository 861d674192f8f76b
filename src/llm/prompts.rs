//! Default prompt for report summarization.

/// Summary prompt. `{content}` is replaced with the extracted text.
pub const DEFAULT_SUMMARY_PROMPT: &str = r#"You are a highly skilled medical expert.

Below is the OCR-extracted medical report. Analyze this report and create a summary.

You decide the structure, tone, and format - do NOT follow templates.
Focus on: abnormal findings, clinical reasoning, simple patient explanations, immediate next steps, and daily lifestyle dos/don'ts.

OCR TEXT:
{content}"#;
