use std::{collections::HashMap, sync::Arc};

use aws_config::{BehaviorVersion, Region, SdkConfig, meta::region::RegionProviderChain, timeout};
use tokio::sync::Mutex;

use crate::config::TimeoutConfig;

/// Loads an SDK config pinned to `region`. When `endpoint_url` is set every
/// client built from the config talks to that endpoint instead of the
/// resolved regional one.
pub async fn sdk_config(region: &str, endpoint_url: Option<&str>, timeout_config: Option<&TimeoutConfig>) -> SdkConfig {
    let timeouts = timeout_config.cloned().unwrap_or_default();
    let region = RegionProviderChain::first_try(Region::new(region.to_owned()));

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region).timeout_config(
        timeout::TimeoutConfig::builder()
            .connect_timeout(timeouts.connect())
            .operation_timeout(timeouts.operation())
            .operation_attempt_timeout(timeouts.operation_attempt())
            .read_timeout(timeouts.read())
            .build(),
    );

    if let Some(endpoint_url) = endpoint_url {
        tracing::info!("Using custom endpoint {}", endpoint_url);
        loader = loader.endpoint_url(endpoint_url);
    }

    loader.load().await
}

/// Lazily built SDK clients, one per region.
pub struct ClientCache<C> {
    clients: Mutex<HashMap<String, Arc<C>>>,
}

impl<C> Default for ClientCache<C> {
    fn default() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
        }
    }
}

impl<C> ClientCache<C> {
    pub async fn get_or_init(
        &self,
        region: &str,
        endpoint_url: Option<&str>,
        timeout_config: Option<&TimeoutConfig>,
        new_client: impl FnOnce(&SdkConfig) -> C,
    ) -> anyhow::Result<Arc<C>> {
        let mut cache = self.clients.lock().await;

        if let Some(client) = cache.get(region) {
            return Ok(client.clone());
        }

        let config = sdk_config(region, endpoint_url, timeout_config).await;
        let client = Arc::new(new_client(&config));
        cache.insert(region.to_string(), client.clone());

        Ok(client)
    }

    pub async fn clear(&self) {
        self.clients.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FakeClient(String);

    #[tokio::test]
    async fn builds_one_client_per_region() {
        let cache = ClientCache::<FakeClient>::default();
        let built = AtomicUsize::new(0);

        let new_client = |config: &SdkConfig| {
            built.fetch_add(1, Ordering::SeqCst);
            FakeClient(config.region().map(|r| r.to_string()).unwrap_or_default())
        };

        let a = cache.get_or_init("eu-west-1", None, None, new_client).await.unwrap();
        let b = cache.get_or_init("eu-west-1", None, None, new_client).await.unwrap();
        let c = cache.get_or_init("us-east-2", None, None, new_client).await.unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.0, "eu-west-1");
        assert_eq!(c.0, "us-east-2");
        assert_eq!(built.load(Ordering::SeqCst), 2);

        cache.clear().await;
        let d = cache.get_or_init("eu-west-1", None, None, new_client).await.unwrap();
        assert!(!Arc::ptr_eq(&a, &d));
        assert_eq!(built.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn custom_endpoint_is_applied() {
        let config = sdk_config("us-west-2", Some("http://localhost:4566"), None).await;
        assert_eq!(config.endpoint_url(), Some("http://localhost:4566"));
    }
}
