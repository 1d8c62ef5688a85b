use crate::client::structs::{Channel, ChannelListResponse, Post, PostListResponse};
use crate::query::params::{CHANNEL_ID, CONTENT_TYPE, EXPORT_FORMAT, PAGE, PAGE_SIZE, SEARCH};
use crate::query::ParamSet;
use crate::twoface::{ExternalError, Fallible, TfError};
use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::{Arc, Mutex};

type Store<T> = Arc<Mutex<Vec<T>>>;

/// A mock implementation of client::Client. It applies the simple filters itself, so tests can
/// check that the parameters it receives select the right posts.
#[derive(Clone, Default, Debug)]
pub struct Client {
    posts: Store<Post>,
    channels: Store<Channel>,
    requests: Store<ParamSet>,
    failure: Arc<Mutex<Option<ExternalError>>>,
}

impl Client {
    pub fn set_posts(&mut self, posts: Vec<Post>) {
        self.posts = Arc::new(Mutex::new(posts));
    }

    pub fn set_channels(&mut self, channels: Vec<Channel>) {
        self.channels = Arc::new(Mutex::new(channels));
    }

    /// Every following call fails with `external` until this is called again with None.
    pub fn fail_with(&self, external: Option<ExternalError>) {
        *self.failure.lock().unwrap() = external;
    }

    /// Parameters of every listing and export call so far.
    pub fn requests(&self) -> Vec<ParamSet> {
        self.requests.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Fallible<()> {
        guard!(let Some(external) = *self.failure.lock().unwrap() else {
            return Ok(())
        });
        Err(TfError {
            internal: anyhow!("mock told to fail"),
            external,
        })
    }

    fn matching(&self, params: &ParamSet) -> Vec<Post> {
        let text = |key| params.get(key).and_then(|v| v.as_text()).map(str::to_owned);
        let channel_id = params.get(CHANNEL_ID).and_then(|v| v.as_int());
        let content_type = text(CONTENT_TYPE);
        let search = text(SEARCH).map(|s| s.to_lowercase());
        self.posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| channel_id.map_or(true, |id| p.channel_id == id))
            .filter(|p| content_type.as_ref().map_or(true, |c| &p.content_type == c))
            .filter(|p| {
                search.as_ref().map_or(true, |s| {
                    p.text
                        .as_ref()
                        .map_or(false, |t| t.to_lowercase().contains(s))
                })
            })
            .cloned()
            .collect()
    }
}

#[async_trait(?Send)]
impl super::Client for Client {
    async fn list_posts(&self, params: &ParamSet) -> Fallible<PostListResponse> {
        self.requests.lock().unwrap().push(params.clone());
        self.check_failure()?;
        let posts = self.matching(params);
        let page = params.get(PAGE).and_then(|v| v.as_int()).unwrap_or(1);
        let page_size = params.get(PAGE_SIZE).and_then(|v| v.as_int()).unwrap_or(50);
        let skip = ((page.max(1) - 1) * page_size) as usize;
        Ok(PostListResponse {
            total: posts.len() as u64,
            posts: posts
                .into_iter()
                .skip(skip)
                .take(page_size as usize)
                .collect(),
            page,
            page_size: page_size as u32,
        })
    }

    async fn export_posts(&self, params: &ParamSet) -> Fallible<Bytes> {
        self.requests.lock().unwrap().push(params.clone());
        self.check_failure()?;
        let format = params
            .get(EXPORT_FORMAT)
            .and_then(|v| v.as_text())
            .unwrap_or("csv");
        let mut out = format!("# {}\nid,post_id,channel_id\n", format);
        for post in self.matching(params) {
            out.push_str(&format!("{},{},{}\n", post.id, post.post_id, post.channel_id));
        }
        Ok(Bytes::from(out))
    }

    async fn list_channels(&self) -> Fallible<ChannelListResponse> {
        self.check_failure()?;
        let channels = self.channels.lock().unwrap().clone();
        Ok(ChannelListResponse {
            total: channels.len() as u64,
            channels,
        })
    }

    async fn get_post(&self, id: i64) -> Fallible<Option<Post>> {
        self.check_failure()?;
        let post = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned();
        Ok(post)
    }
}

/// A post with just enough set for filtering.
pub fn post(id: i64, channel_id: i64, content_type: &str, text: &str) -> Post {
    use chrono::TimeZone;
    Post {
        id,
        post_id: format!("{}", 1000 + id),
        channel_id,
        date: chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::hours(id),
        text: Some(text.to_owned()),
        author: None,
        content_type: content_type.to_owned(),
        views: id * 10,
        likes: id,
        engagement_rate: None,
        hashtags: None,
        mentions: None,
        links: None,
        media_urls: None,
    }
}
