use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-text annotation attached to exactly one node.
///
/// `text` and `date` never change after creation; `completed` is the only
/// mutable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub completed: bool,
    pub date: DateTime<Utc>,
}

impl Comment {
    pub fn new(text: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            completed: false,
            date,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.completed
    }
}

/// Number of comments still open, shown as a badge on the node.
pub fn active_count(comments: &[Comment]) -> usize {
    comments.iter().filter(|c| c.is_open()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_serializes_iso_date() {
        let date = DateTime::parse_from_rfc3339("2023-10-05T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let comment = Comment::new("Prepare quarterly report", date);
        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(json["text"], "Prepare quarterly report");
        assert_eq!(json["completed"], false);
        assert_eq!(json["date"], "2023-10-05T10:00:00Z");
    }

    #[test]
    fn test_active_count_ignores_completed() {
        let now = Utc::now();
        let mut done = Comment::new("done", now);
        done.completed = true;
        let comments = vec![Comment::new("open", now), done];
        assert_eq!(active_count(&comments), 1);
    }
}
