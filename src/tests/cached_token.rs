// A token left in the token file by an earlier run is used as is.

#[cfg(test)]
mod test {
    use crate::account::lifecycle::{LifecycleEvent, LifecycleListener};
    use crate::account::resolver::Resolution;
    use crate::cache::token_file::LocalTokenCache;
    use crate::tests::common::{environment, listener, printed, token_file, StubProvisioner};
    use crate::utils::constants::{API_TOKEN_PROPERTY, DEFAULT_CLUSTER_URI, URI_PROPERTY, WAVEFRONT_SOURCE};

    #[tokio::test]
    async fn cached_token_is_injected_without_provisioning() {
        let (_dir, path) = token_file();
        std::fs::write(&path, "xyz789").unwrap();
        let mut provisioning = listener(LocalTokenCache::at(&path));
        let provisioner = StubProvisioner::succeeding("abc123", "acct-1");
        let mut env = environment(&[]);

        let resolution = provisioning.post_process_environment(&mut env, &provisioner).await.unwrap();
        provisioning.on_event(LifecycleEvent::Started);

        assert_eq!(resolution, Resolution::Cached { token: "xyz789".to_owned() });
        assert!(provisioner.calls().is_empty());
        assert_eq!(env.get_property(API_TOKEN_PROPERTY), Some("xyz789"));
        assert_eq!(env.get_property(URI_PROPERTY), Some(DEFAULT_CLUSTER_URI));
        assert!(printed(&provisioning).is_empty());
        assert!(provisioning
            .deferred_log()
            .records()
            .iter()
            .any(|record| record.message.contains("Existing Wavefront api token found")));
    }

    #[tokio::test]
    async fn cached_token_keeps_bytes_and_configured_uri() {
        let (_dir, path) = token_file();
        std::fs::write(&path, "xyz789\n").unwrap();
        let mut provisioning = listener(LocalTokenCache::at(&path));
        let provisioner = StubProvisioner::failing();
        let mut env = environment(&[(URI_PROPERTY, "https://example.wavefront.com")]);

        provisioning.post_process_environment(&mut env, &provisioner).await.unwrap();

        let layer = env.source(WAVEFRONT_SOURCE).unwrap();
        assert_eq!(layer.get(API_TOKEN_PROPERTY), Some("xyz789\n"));
        assert_eq!(layer.get(URI_PROPERTY), None);
        assert_eq!(env.get_property(URI_PROPERTY), Some("https://example.wavefront.com"));
    }

    #[tokio::test]
    async fn empty_token_file_triggers_provisioning() {
        let (_dir, path) = token_file();
        std::fs::write(&path, "").unwrap();
        let mut provisioning = listener(LocalTokenCache::at(&path));
        let provisioner = StubProvisioner::succeeding("abc123", "acct-1");
        let mut env = environment(&[]);

        let resolution = provisioning.post_process_environment(&mut env, &provisioner).await.unwrap();

        assert!(matches!(resolution, Resolution::Provisioned { .. }));
        assert_eq!(provisioner.calls().len(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abc123");
    }
}
