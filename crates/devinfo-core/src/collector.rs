use std::{
    any::Any,
    collections::BTreeMap,
    future::Future,
    panic::AssertUnwindSafe,
    sync::Arc,
    time::{Duration, Instant},
};

use futures_util::FutureExt;
use tracing::{debug, info, warn};

use crate::{
    resolve, AccessorResult, AccessorUnavailable, AdTrackingStatus, AttributeKey,
    AttributeSnapshot, PlatformAccessor, Resolution,
};

pub const DEFAULT_ASYNC_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct CollectorOptions {
    /// Upper bound for each asynchronous sub-operation (App Set ID and
    /// advertising ID). `None` waits indefinitely.
    pub async_timeout: Option<Duration>,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            async_timeout: Some(DEFAULT_ASYNC_TIMEOUT),
        }
    }
}

/// Resolves every [`AttributeKey`] through a [`PlatformAccessor`].
///
/// Each collection is independent: nothing is cached between calls and the
/// accessor is the only shared state.
pub struct Collector<A> {
    accessor: Arc<A>,
    options: CollectorOptions,
}

impl<A: PlatformAccessor> Collector<A> {
    pub fn new(accessor: A) -> Self {
        Self::from_shared(Arc::new(accessor))
    }

    pub fn from_shared(accessor: Arc<A>) -> Self {
        Self {
            accessor,
            options: CollectorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CollectorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn accessor(&self) -> &A {
        &self.accessor
    }

    /// Runs one collection pass. Never fails; unavailable attributes carry
    /// their fallback value.
    pub async fn collect(&self) -> AttributeSnapshot {
        self.collect_report().await.into_snapshot()
    }

    /// Same pass as [`collect`](Self::collect), keeping each attribute's
    /// [`Resolution`] for diagnostics.
    pub async fn collect_report(&self) -> CollectionReport {
        let started = Instant::now();

        let (mut resolutions, app_set_id, gaid) = tokio::join!(
            self.read_inline(),
            bounded(self.options.async_timeout, guarded(self.accessor.app_set_id())),
            self.read_advertising_id(),
        );
        resolutions.insert(
            AttributeKey::AppSetId,
            resolve(AttributeKey::AppSetId, app_set_id),
        );
        resolutions.insert(AttributeKey::Gaid, resolve(AttributeKey::Gaid, gaid));

        let report = CollectionReport::new(resolutions, started.elapsed());
        report.log();
        report
    }

    async fn read_inline(&self) -> BTreeMap<AttributeKey, Resolution> {
        let accessor = &*self.accessor;
        let reads = [
            (AttributeKey::PackageName, guarded(accessor.package_name()).await),
            (AttributeKey::AppVersion, guarded(accessor.app_version()).await),
            (AttributeKey::OsVersion, guarded(accessor.os_version()).await),
            (AttributeKey::Locale, guarded(accessor.locale()).await),
            (AttributeKey::DeviceModel, guarded(accessor.device_model()).await),
            (AttributeKey::DeviceMake, guarded(accessor.device_make()).await),
            (
                AttributeKey::BuildVersion,
                guarded(accessor.build_id()).await.map(|id| format!("Build/{id}")),
            ),
            (AttributeKey::AndroidId, guarded(accessor.android_id()).await),
            (
                AttributeKey::AdTrackingStatus,
                guarded(accessor.limit_ad_tracking()).await.map(|limited| {
                    AdTrackingStatus::from_limit_flag(limited).as_str().to_string()
                }),
            ),
        ];
        reads
            .into_iter()
            .map(|(key, result)| (key, resolve(key, result)))
            .collect()
    }

    async fn read_advertising_id(&self) -> AccessorResult<String> {
        let accessor = Arc::clone(&self.accessor);
        let task = tokio::task::spawn_blocking(move || accessor.advertising_id());
        bounded(self.options.async_timeout, async move {
            task.await.unwrap_or_else(|err| match err.try_into_panic() {
                Ok(payload) => Err(panicked(payload)),
                Err(err) => Err(AccessorUnavailable::new(format!(
                    "advertising id lookup aborted: {err}"
                ))),
            })
        })
        .await
    }
}

/// Turns a panicking accessor future into an unavailable result.
async fn guarded<T, F>(fut: F) -> AccessorResult<T>
where
    F: Future<Output = AccessorResult<T>>,
{
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(panicked(payload)))
}

fn panicked(payload: Box<dyn Any + Send>) -> AccessorUnavailable {
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    AccessorUnavailable::new(format!("accessor panicked: {message}"))
}

async fn bounded<T, F>(limit: Option<Duration>, fut: F) -> AccessorResult<T>
where
    F: Future<Output = AccessorResult<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .unwrap_or_else(|_| Err(AccessorUnavailable::timed_out(limit))),
        None => fut.await,
    }
}

/// A snapshot together with how each attribute was obtained.
#[derive(Clone, Debug)]
pub struct CollectionReport {
    snapshot: AttributeSnapshot,
    resolutions: BTreeMap<AttributeKey, Resolution>,
    elapsed: Duration,
}

impl CollectionReport {
    fn new(resolutions: BTreeMap<AttributeKey, Resolution>, elapsed: Duration) -> Self {
        let values = AttributeKey::ALL
            .into_iter()
            .map(|key| {
                let value = resolutions
                    .get(&key)
                    .map(|resolution| resolution.value().to_string())
                    .unwrap_or_else(|| key.fallback().to_string());
                (key, value)
            })
            .collect();
        Self {
            snapshot: AttributeSnapshot::from_values(values),
            resolutions,
            elapsed,
        }
    }

    pub fn snapshot(&self) -> &AttributeSnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> AttributeSnapshot {
        self.snapshot
    }

    pub fn resolution(&self, key: AttributeKey) -> Option<&Resolution> {
        self.resolutions.get(&key)
    }

    /// Attributes that fell back, with the reason their accessor gave.
    pub fn fallbacks(&self) -> impl Iterator<Item = (AttributeKey, &AccessorUnavailable)> + '_ {
        self.resolutions
            .iter()
            .filter_map(|(key, resolution)| resolution.cause().map(|cause| (*key, cause)))
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn log(&self) {
        for (key, resolution) in &self.resolutions {
            match resolution {
                Resolution::Resolved(value) => debug!("{key}: {value}"),
                Resolution::Fallback { value, cause } => {
                    warn!("{key}: using fallback {value:?} ({cause})")
                }
            }
        }
        info!(
            "collected {} attributes in {}ms ({} fallbacks)",
            self.snapshot.len(),
            self.elapsed.as_millis(),
            self.fallbacks().count()
        );
    }
}
