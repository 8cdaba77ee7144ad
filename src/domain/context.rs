/// One recorded failure: a message and the document fields it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailMessage {
    pub message: String,
    pub fields: Vec<String>,
}

impl FailMessage {
    fn render(&self) -> String {
        if self.fields.is_empty() {
            self.message.clone()
        } else {
            format!("{} - {}", self.message, self.fields.join(","))
        }
    }
}

/// Failures collected during one document's validation pass.
///
/// An empty context means the document is accepted.
#[derive(Debug, Default, Clone)]
pub struct ValidationContext {
    failures: Vec<FailMessage>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, message: impl Into<String>, fields: &[&str]) {
        self.failures.push(FailMessage {
            message: message.into(),
            fields: fields.iter().map(|field| field.to_string()).collect(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[FailMessage] {
        &self.failures
    }

    /// Rendered failure strings, deduplicated, in first-occurrence order.
    pub fn messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = Vec::with_capacity(self.failures.len());
        for rendered in self.failures.iter().map(FailMessage::render) {
            if !messages.contains(&rendered) {
                messages.push(rendered);
            }
        }
        messages
    }

    pub fn fail_fields(&self) -> Vec<String> {
        self.failures
            .iter()
            .flat_map(|failure| failure.fields.iter().cloned())
            .collect()
    }

    pub fn joined(&self) -> String {
        self.messages().join("; ")
    }
}
