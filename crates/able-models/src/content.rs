//! Admin-authored publishable content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a content item is surfaced on the public site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ContentCategory {
    Homepage,
    #[serde(rename = "FAQ")]
    Faq,
    Guidelines,
    Announcements,
    Guides,
    #[default]
    Other,
}

impl ContentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::Homepage => "Homepage",
            ContentCategory::Faq => "FAQ",
            ContentCategory::Guidelines => "Guidelines",
            ContentCategory::Announcements => "Announcements",
            ContentCategory::Guides => "Guides",
            ContentCategory::Other => "Other",
        }
    }

    /// Parse from the stored string form, falling back to Other.
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "Homepage" => ContentCategory::Homepage,
            "FAQ" => ContentCategory::Faq,
            "Guidelines" => ContentCategory::Guidelines,
            "Announcements" => ContentCategory::Announcements,
            "Guides" => ContentCategory::Guides,
            _ => ContentCategory::Other,
        }
    }
}

impl std::fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An admin-authored article. Only published items are visible publicly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub id: String,
    pub title: String,
    pub body: String,
    pub category: ContentCategory,
    pub author_id: String,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    /// Refreshed automatically on every save.
    pub updated_at: DateTime<Utc>,
}

impl Content {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        category: ContentCategory,
        author_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            category,
            author_id: author_id.into(),
            published: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump updated_at; call on every mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parsing_falls_back_to_other() {
        assert_eq!(ContentCategory::from_str_or_default("FAQ"), ContentCategory::Faq);
        assert_eq!(
            ContentCategory::from_str_or_default("Announcements"),
            ContentCategory::Announcements
        );
        assert_eq!(
            ContentCategory::from_str_or_default("nonsense"),
            ContentCategory::Other
        );
    }

    #[test]
    fn touch_refreshes_updated_at() {
        let mut c = Content::new("c1", "Welcome", "body", ContentCategory::Homepage, "admin-1");
        let before = c.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(5));
        c.touch();
        assert!(c.updated_at > before);
        assert_eq!(c.created_at, before);
    }
}
