//! Prompt construction for the content analysis request.
//!
//! The template pins down the shape of the reply: a bare JSON object with six
//! known fields. Models still wrap it in markdown fences often enough that
//! parsing strips them anyway (see `parse`).

const ANALYSIS_TEMPLATE: &str = r#"You are a content quality expert. Analyze the following content, and return ONLY a valid JSON object with:

- readability: an integer from 0 to 100
- seo: an integer 0 to 100
- grammar: an integer 0 to 100
- tone: one word (e.g. Formal, Casual, Persuasive, Neutral, Humorous)
- overall: one of Excellent / Good / Average / Poor
- suggestion: one or two sentences of advice to improve the content

Here is the content:"#;

/// Build the instruction prompt for a piece of content.
///
/// The content is embedded verbatim between triple-quote delimiters so the
/// model can tell instructions from user text. Same content, same prompt.
pub fn build_analysis_prompt(content: &str) -> String {
    format!("{ANALYSIS_TEMPLATE}\n\"\"\"{content}\"\"\"")
}
