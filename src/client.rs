use std::future::Future;

use crate::{filter::MirrorFilter, object::MirrorObject};

mod api;
pub use api::KubeMirrorClient;

/// Query capability of the object mirror.
///
/// One call is one request and one response. Timeouts and retries, if any,
/// belong to the implementation, never to the caller.
pub trait MirrorClient {
    fn get(&self, filter: &MirrorFilter) -> impl Future<Output = anyhow::Result<Vec<MirrorObject>>>;
}
