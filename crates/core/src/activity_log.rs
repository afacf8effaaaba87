use serde::Serialize;

/// Append-only audit trail of what happened to one descriptor file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActivityLog {
    messages: Vec<String>,
}

impl ActivityLog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn contains(&self, fragment: &str) -> bool {
        self.messages.iter().any(|message| message.contains(fragment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_keeps_order() {
        let mut log = ActivityLog::new();
        log.add("first");
        log.add(format!("second {}", 2));
        assert_eq!(log.messages(), &["first", "second 2"]);
        assert_eq!(log.len(), 2);
        assert!(log.contains("cond"));
        assert!(!log.is_empty());
    }

    #[test]
    fn test_serializes_as_list() {
        let mut log = ActivityLog::new();
        log.add("one");
        assert_eq!(serde_json::to_string(&log).unwrap(), r#"["one"]"#);
    }
}
