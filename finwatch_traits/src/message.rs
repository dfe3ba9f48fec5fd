//! Transport-neutral rendered message (title, body, coloured side bar, fields).

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub title: String,
    pub description: String,
    /// 0xRRGGBB accent colour.
    pub color: u32,
    pub fields: Vec<Field>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        color: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            color,
            fields: Vec::new(),
            timestamp,
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// Plain-text rendering for logs and transports without rich formatting.
    pub fn to_plain_text(&self) -> String {
        let mut out = format!("{}\n{}", self.title, self.description);
        for f in &self.fields {
            out.push_str(&format!("\n{}: {}", f.name, f.value));
        }
        out
    }
}
