use std::future::Future;

use tokio::sync::oneshot;

use crate::AccessorUnavailable;

pub type AccessorResult<T> = Result<T, AccessorUnavailable>;

/// Capability for reaching OS-level device, identifier and advertising
/// services.
///
/// Implementations are owned by the caller and handed to a
/// [`Collector`](crate::Collector). Reads that a platform treats as
/// infallible still return a result so that remote accessors can report
/// transport failures.
pub trait PlatformAccessor: Send + Sync + 'static {
    fn package_name(&self) -> impl Future<Output = AccessorResult<String>> + Send;

    fn app_version(&self) -> impl Future<Output = AccessorResult<String>> + Send;

    fn os_version(&self) -> impl Future<Output = AccessorResult<String>> + Send;

    /// Current user locale in `language_COUNTRY` form.
    fn locale(&self) -> impl Future<Output = AccessorResult<String>> + Send;

    fn device_model(&self) -> impl Future<Output = AccessorResult<String>> + Send;

    fn device_make(&self) -> impl Future<Output = AccessorResult<String>> + Send;

    /// Raw platform build identifier, without the `Build/` prefix.
    fn build_id(&self) -> impl Future<Output = AccessorResult<String>> + Send;

    fn android_id(&self) -> impl Future<Output = AccessorResult<String>> + Send;

    /// Whether the user enabled limited ad tracking.
    fn limit_ad_tracking(&self) -> impl Future<Output = AccessorResult<bool>> + Send;

    fn app_set_id(&self) -> impl Future<Output = AccessorResult<String>> + Send;

    /// Blocking advertising-ID lookup. May perform disk or network I/O, so the
    /// collector only ever calls it from the blocking pool.
    fn advertising_id(&self) -> AccessorResult<String>;
}

/// One-shot completion handle for callback-style platform APIs.
///
/// Dropping it without calling [`succeed`](Self::succeed) or
/// [`fail`](Self::fail) resolves the paired future as unavailable.
pub struct Completion<T> {
    tx: oneshot::Sender<AccessorResult<T>>,
}

impl<T> Completion<T> {
    pub fn succeed(self, value: T) {
        let _ = self.tx.send(Ok(value));
    }

    pub fn fail(self, reason: impl Into<String>) {
        let _ = self.tx.send(Err(AccessorUnavailable::new(reason)));
    }
}

/// Bridges a success/failure listener API into a future.
///
/// `register` receives the [`Completion`] and is expected to hand it to the
/// platform, which signals it from whatever thread it likes.
pub fn from_callback<T, F>(register: F) -> impl Future<Output = AccessorResult<T>> + Send
where
    T: Send + 'static,
    F: FnOnce(Completion<T>),
{
    let (tx, rx) = oneshot::channel();
    register(Completion { tx });
    async move {
        rx.await.unwrap_or_else(|_| {
            Err(AccessorUnavailable::new(
                "callback was dropped before completing",
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn callback_success_from_another_thread() {
        let value = from_callback(|completion| {
            std::thread::spawn(move || completion.succeed("set-1".to_string()));
        })
        .await;
        assert_eq!(value, Ok("set-1".to_string()));
    }

    #[tokio::test]
    async fn callback_failure_listener() {
        let value: AccessorResult<String> =
            from_callback(|completion| completion.fail("play services missing")).await;
        assert_eq!(value.unwrap_err().reason(), "play services missing");
    }

    #[tokio::test]
    async fn dropped_callback_is_unavailable() {
        let value: AccessorResult<String> = from_callback(drop).await;
        assert!(value.is_err());
    }
}
