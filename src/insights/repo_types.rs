use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Where an insight was captured.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    CommunityForum,
    Conference,
    SocialMedia,
    Meetup,
    Other,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::CommunityForum => "community_forum",
            Source::Conference => "conference",
            Source::SocialMedia => "social_media",
            Source::Meetup => "meetup",
            Source::Other => "other",
        }
    }
}

impl std::str::FromStr for Source {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "community_forum" => Ok(Source::CommunityForum),
            "conference" => Ok(Source::Conference),
            "social_media" => Ok(Source::SocialMedia),
            "meetup" => Ok(Source::Meetup),
            "other" => Ok(Source::Other),
            other => anyhow::bail!("unknown source: {other}"),
        }
    }
}

/// Product insight captured by a user. `author_id` is fixed at creation and
/// is the basis for all mutation authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    pub source: Option<Source>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Insight {
    pub fn new(
        author_id: Uuid,
        title: String,
        description: String,
        source: Option<Source>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            description,
            source,
            created_at: now,
            updated_at: now,
        }
    }
}
