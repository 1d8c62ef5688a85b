//! An implementation of `client::Client` that talks HTTP to the posts service.
use crate::client::structs::{ChannelListResponse, Post, PostListResponse};
use crate::client::{observe, Client};
use crate::config::Config;
use crate::query::ParamSet;
use crate::twoface::externalerror::{CHANNELS_UNAVAILABLE, EXPORT_FAILED, LISTING_FAILED};
use crate::twoface::{check_status, Cause, DescribeDisplay, DescribeErr, ExternalError, Fallible};
use anyhow::Context;
use async_trait::async_trait;
use awc::ClientRequest;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

const POSTS: &str = "posts/";
const EXPORT_POSTS: &str = "export/posts";
const CHANNELS: &str = "channels/";

pub struct HttpClient {
    base: Url,
    http: awc::Client,
    max_body_size: usize,
}

impl HttpClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut base = Url::parse(&config.api_base_url)
            .with_context(|| format!("invalid api_base_url {:?}", config.api_base_url))?;
        // Without the trailing slash, `join` would replace the last path segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let mut builder =
            awc::Client::builder().timeout(Duration::from_secs(config.request_timeout_secs));
        if let Some(token) = &config.api_token {
            builder = builder.bearer_auth(token);
        }
        Ok(Self {
            base,
            http: builder.finish(),
            max_body_size: config.max_response_bytes,
        })
    }

    /// The absolute URL for `path`, with `params` as its query string.
    pub fn endpoint(&self, path: &str, params: Option<&ParamSet>) -> anyhow::Result<Url> {
        let mut url = self.base.join(path)?;
        if let Some(params) = params {
            let query = params.to_query_string()?;
            if !query.is_empty() {
                url.set_query(Some(&query));
            }
        }
        Ok(url)
    }

    /// Send the request and read the whole body, mapping any failure onto `failure`.
    async fn fetch(&self, request: ClientRequest, failure: ExternalError) -> Fallible<Bytes> {
        let mut response = request
            .send()
            .await
            .describe_display("request failed", failure)?;
        let status = response.status();
        let body = response
            .body()
            .limit(self.max_body_size)
            .await
            .describe_display("couldn't read response body", failure)?;
        check_status(status, &body, failure)?;
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&ParamSet>,
        failure: ExternalError,
    ) -> Fallible<T> {
        let url = self.endpoint(path, params).describe_err(failure)?;
        debug!(%url, "GET");
        let body = self.fetch(self.http.get(url.as_str()), failure).await?;
        serde_json::from_slice(&body).describe_err(failure)
    }
}

#[async_trait(?Send)]
impl Client for HttpClient {
    async fn list_posts(&self, params: &ParamSet) -> Fallible<PostListResponse> {
        observe("list_posts", || async {
            self.get_json(POSTS, Some(params), LISTING_FAILED).await
        })
        .await
    }

    async fn export_posts(&self, params: &ParamSet) -> Fallible<Bytes> {
        observe("export_posts", || async {
            let url = self
                .endpoint(EXPORT_POSTS, Some(params))
                .describe_err(EXPORT_FAILED)?;
            debug!(%url, "POST");
            self.fetch(self.http.post(url.as_str()), EXPORT_FAILED).await
        })
        .await
    }

    async fn list_channels(&self) -> Fallible<ChannelListResponse> {
        observe("list_channels", || async {
            self.get_json(CHANNELS, None, CHANNELS_UNAVAILABLE).await
        })
        .await
    }

    async fn get_post(&self, id: i64) -> Fallible<Option<Post>> {
        observe("get_post", || async {
            let path = format!("{}{}", POSTS, id);
            match self.get_json(&path, None, LISTING_FAILED).await {
                Ok(post) => Ok(Some(post)),
                Err(e) if e.cause() == Cause::NotFound => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
    }
}
