//! News article model matching the catalog backend `GET /news` payload.

use serde::{Deserialize, Serialize};

use super::LocalizedText;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsAuthor {
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub position: LocalizedText,
    #[serde(default)]
    pub bio: LocalizedText,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsFeature {
    pub id: i64,
    #[serde(default)]
    pub news_id: Option<i64>,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
}

/// A published news article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsArticle {
    pub id: i64,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub author: Option<NewsAuthor>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub features: Vec<NewsFeature>,
}
