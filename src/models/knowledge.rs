//! Knowledge-base documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl KnowledgeFile {
    /// Human-readable size, e.g. `1.5 MB`.
    pub fn size_display(&self) -> String {
        let Some(bytes) = self.size_bytes else {
            return "-".to_string();
        };
        const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
        let mut size = bytes as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }
        if unit == 0 {
            format!("{} {}", bytes, UNITS[0])
        } else {
            format!("{:.1} {}", size, UNITS[unit])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(size: Option<u64>) -> KnowledgeFile {
        KnowledgeFile {
            id: "k".to_string(),
            name: "faq.pdf".to_string(),
            size_bytes: size,
            status: None,
            created_at: None,
        }
    }

    #[test]
    fn test_size_display() {
        assert_eq!(file(None).size_display(), "-");
        assert_eq!(file(Some(512)).size_display(), "512 B");
        assert_eq!(file(Some(1536)).size_display(), "1.5 KB");
        assert_eq!(file(Some(3 * 1024 * 1024)).size_display(), "3.0 MB");
    }
}
