//! Schema descriptor for the records table.
//!
//! Describes the one queryable table, the JSON sub-fields stored in its
//! `value` column, the closed sets of categorical values, and the derived
//! age expression. Rendered into the system prompt for the LLM.

use serde::Serialize;

/// Name of the queryable table.
pub const RECORDS_TABLE: &str = "records";

/// Column holding the JSON document.
pub const JSON_COLUMN: &str = "value";

/// Sub-field of the JSON document holding the date of birth.
pub const BIRTH_DATE_FIELD: &str = "birth_date";

/// Describes the queryable table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    /// Table name.
    pub table: String,

    /// Physical columns in declaration order.
    pub columns: Vec<Column>,

    /// Sub-fields of the JSON column.
    pub json_fields: Vec<JsonField>,
}

/// A physical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub description: String,
}

impl Column {
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            description: description.into(),
        }
    }
}

/// A dotted-path sub-field of the JSON column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonField {
    /// Field name under the document root (`$.<name>`).
    pub name: String,

    /// What the field means.
    pub description: String,

    /// Closed set of valid values; empty for free-form fields.
    pub categories: Vec<String>,
}

impl JsonField {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            categories: Vec::new(),
        }
    }

    /// Restricts the field to a closed set of values.
    pub fn categorical(mut self, values: &[&str]) -> Self {
        self.categories = values.iter().map(|v| v.to_string()).collect();
        self
    }

    /// Returns true if the field only takes enumerated values.
    pub fn is_categorical(&self) -> bool {
        !self.categories.is_empty()
    }

    /// Returns the SQLite expression that extracts this field.
    pub fn extract_expression(&self) -> String {
        format!("json_extract({JSON_COLUMN}, '$.{}')", self.name)
    }
}

impl Schema {
    /// Returns the descriptor of the records table.
    pub fn records() -> Self {
        Self {
            table: RECORDS_TABLE.to_string(),
            columns: vec![
                Column::new("id", "INTEGER", "primary key"),
                Column::new("name", "TEXT", "display name of the person the record describes"),
                Column::new(JSON_COLUMN, "TEXT", "JSON document with the fields listed below"),
                Column::new("created_at", "TEXT", "ISO-8601 timestamp the record was stored"),
            ],
            json_fields: vec![
                JsonField::new(BIRTH_DATE_FIELD, "date of birth, formatted YYYY-MM-DD"),
                JsonField::new("gender", "gender").categorical(&["Male", "Female", "Other"]),
                JsonField::new("race", "race").categorical(&[
                    "White",
                    "Black or African American",
                    "Asian",
                    "American Indian or Alaska Native",
                    "Native Hawaiian or Other Pacific Islander",
                    "Other",
                ]),
                JsonField::new("ethnicity", "ethnicity")
                    .categorical(&["Hispanic or Latino", "Not Hispanic or Latino"]),
                JsonField::new("city", "city of residence, free text"),
            ],
        }
    }

    /// Looks up a JSON sub-field by name.
    pub fn json_field(&self, name: &str) -> Option<&JsonField> {
        self.json_fields.iter().find(|f| f.name == name)
    }

    /// Renders the age-in-years expression relative to `reference`.
    ///
    /// `reference` is a SQLite date literal such as `'now'` or `'2024-06-15'`.
    /// The result is the difference in calendar years, minus one while the
    /// reference month-day sorts before the birth month-day.
    pub fn age_expression(reference: &str) -> String {
        let birth = format!("json_extract({JSON_COLUMN}, '$.{BIRTH_DATE_FIELD}')");
        format!(
            "(CAST(strftime('%Y', {reference}) AS INTEGER) - CAST(strftime('%Y', {birth}) AS INTEGER) \
             - (strftime('%m-%d', {reference}) < strftime('%m-%d', {birth})))"
        )
    }

    /// Formats the schema for inclusion in an LLM system prompt.
    pub fn format_for_llm(&self) -> String {
        let column_lines = self
            .columns
            .iter()
            .map(|c| format!("  - {}: {} ({})\n", c.name, c.data_type, c.description))
            .collect::<String>();

        let field_lines = self
            .json_fields
            .iter()
            .map(|f| {
                let mut line = format!(
                    "  - {} -> {}: {}\n",
                    f.name,
                    f.extract_expression(),
                    f.description
                );
                if f.is_categorical() {
                    let values = f
                        .categories
                        .iter()
                        .map(|v| format!("'{v}'"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    line.push_str(&format!("    allowed values: {values}\n"));
                }
                line
            })
            .collect::<String>();

        format!(
            "Table: {table}\n{column_lines}\n\
             JSON fields stored in {table}.{json}:\n{field_lines}\n\
             Derived values:\n  - age in years: {age}\n    \
             (whole years; compare year first, then month-day; do not subtract dates)\n",
            table = self.table,
            json = JSON_COLUMN,
            age = Self::age_expression("'now'"),
        )
    }
}
