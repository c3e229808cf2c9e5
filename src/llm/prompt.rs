//! Prompt construction for SQL generation.
//!
//! Builds the system prompt with the records schema injected.

use crate::db::Schema;
use crate::llm::types::Message;

/// System prompt template for the SQL generator.
const SYSTEM_PROMPT_TEMPLATE: &str = r#"You translate questions about stored records into SQLite queries.

DATABASE SCHEMA:
{schema}

INSTRUCTIONS:
- Generate exactly one read-only SQLite SELECT statement
- Read JSON fields with json_extract exactly as shown in the schema
- Compare categorical fields only against the allowed values listed
- Compute age with the derived expression given, never with date subtraction
- Give every selected expression a short, human-readable alias
- Put the label (category, year, name) first and numeric measures after it
- Never modify data or schema

OUTPUT FORMAT:
Return ONLY the SQL query, optionally wrapped in a ```sql code block, with no explanation."#;

/// Builds the system prompt with the schema injected.
pub fn build_system_prompt(schema: &Schema) -> String {
    SYSTEM_PROMPT_TEMPLATE.replace("{schema}", &schema.format_for_llm())
}

/// Builds the message list for one generation request.
pub fn build_messages(system_prompt: &str, question: &str) -> Vec<Message> {
    vec![Message::system(system_prompt), Message::user(question)]
}
