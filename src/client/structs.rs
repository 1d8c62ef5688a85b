use chrono::{offset::Utc, DateTime};
use serde::{Deserialize, Serialize};

/// A post as the service returns it. Posts are created during ingestion; this side only reads
/// them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Post {
    pub id: i64,
    pub post_id: String,
    pub channel_id: i64,
    #[serde(with = "lenient_timestamp")]
    pub date: DateTime<Utc>,
    pub text: Option<String>,
    pub author: Option<String>,
    pub content_type: String,
    pub views: i64,
    pub likes: i64,
    pub engagement_rate: Option<f64>,
    pub hashtags: Option<Vec<String>>,
    pub mentions: Option<Vec<String>>,
    pub links: Option<Vec<String>>,
    pub media_urls: Option<Vec<String>>,
}

/// One page of the listing, plus the cursor the server actually executed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PostListResponse {
    pub posts: Vec<Post>,
    pub total: u64,
    pub page: i64,
    pub page_size: u32,
}

/// A source channel. Only what the channel filter needs is required.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    pub id: i64,
    pub channel_name: String,
    #[serde(default)]
    pub channel_username: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChannelListResponse {
    pub channels: Vec<Channel>,
    pub total: u64,
}

/// An entry in the channel filter's dropdown.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ChannelOption {
    pub id: i64,
    pub name: String,
}

impl From<Channel> for ChannelOption {
    fn from(c: Channel) -> Self {
        Self {
            id: c.id,
            name: c.channel_name,
        }
    }
}

/// The service sometimes sends timestamps without an offset. Those are UTC.
mod lenient_timestamp {
    use chrono::{offset::Utc, DateTime, NaiveDateTime, SecondsFormat, TimeZone};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(|e| D::Error::custom(format!("bad timestamp {:?}: {}", raw, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_decode_listing() {
        let body = r#"{
            "posts": [{
                "id": 1,
                "post_id": "1001",
                "channel_id": 5,
                "date": "2024-01-15T10:30:00",
                "text": "Breaking news",
                "views": 1200,
                "likes": 40,
                "engagement_rate": 3.3,
                "content_type": "photo",
                "hashtags": ["news"],
                "parsed_at": "2024-01-15T11:00:00",
                "created_at": "2024-01-15T11:00:00",
                "updated_at": "2024-01-15T11:00:00"
            }],
            "total": 1,
            "page": 1,
            "page_size": 50
        }"#;
        let listing: PostListResponse = serde_json::from_str(body).unwrap();
        let post = &listing.posts[0];
        assert_eq!(post.date, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
        assert_eq!(post.author, None);
        assert_eq!(post.hashtags, Some(vec!["news".to_owned()]));
        assert_eq!(post.mentions, None);
        assert_eq!(listing.total, 1);
    }

    #[test]
    fn test_offset_timestamps_become_utc() {
        let body = r#"{"id": 2, "post_id": "7", "channel_id": 1, "date": "2024-01-15T12:30:00+02:00",
            "views": 0, "likes": 0, "content_type": "text"}"#;
        let post: Post = serde_json::from_str(body).unwrap();
        assert_eq!(post.date, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_channel_options() {
        let body = r#"{"channels": [{"id": 3, "channel_name": "Tech", "channel_username": "tech",
            "subscribers_count": 100}], "total": 1}"#;
        let listing: ChannelListResponse = serde_json::from_str(body).unwrap();
        let options: Vec<ChannelOption> = listing.channels.into_iter().map(Into::into).collect();
        assert_eq!(
            options,
            vec![ChannelOption {
                id: 3,
                name: "Tech".to_owned()
            }]
        );
    }
}
