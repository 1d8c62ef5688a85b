#[cfg(test)]
pub mod mock;
pub mod http;
pub mod structs;

use crate::metrics;
use crate::query::ParamSet;
use crate::twoface::Fallible;
use async_trait::async_trait;
use bytes::Bytes;
use std::future::Future;
use std::time::Instant;
use structs::{ChannelListResponse, Post, PostListResponse};

#[async_trait(?Send)]
/// The interface to the posts service. Filtering, search and sorting happen on the other side.
pub trait Client {
    async fn list_posts(&self, params: &ParamSet) -> Fallible<PostListResponse>;
    /// The raw bytes of an encoded export (CSV or XLSX).
    async fn export_posts(&self, params: &ParamSet) -> Fallible<Bytes>;
    async fn list_channels(&self) -> Fallible<ChannelListResponse>;
    async fn get_post(&self, id: i64) -> Fallible<Option<Post>>;
}

/// Execute the closure, then log its operational metrics, e.g. time taken, whether it returned Ok/Err, etc.
pub async fn observe<F, Fut, R>(name: &'static str, f: F) -> Fallible<R>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Fallible<R>>,
{
    let start = Instant::now();
    let return_val = f().await;
    let duration = start.elapsed();
    metrics::REQUEST_SECS
        .with_label_values(&[name])
        .observe(duration.as_secs_f64());
    metrics::RESPONSES
        .with_label_values(&[name, variant_name(&return_val)])
        .inc();
    return_val
}

fn variant_name<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "err"
    }
}
