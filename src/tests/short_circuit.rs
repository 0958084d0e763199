// Explicit api token or proxy transport: the token file and the provisioning
// service are never touched and nothing is reported.

#[cfg(test)]
mod test {
    use tempfile::TempDir;

    use crate::account::lifecycle::{LifecycleEvent, LifecycleListener};
    use crate::account::resolver::Resolution;
    use crate::cache::token_file::LocalTokenCache;
    use crate::tests::common::{environment, listener, printed, token_file, StubProvisioner};
    use crate::utils::constants::{API_TOKEN_PROPERTY, URI_PROPERTY, WAVEFRONT_SOURCE};

    #[tokio::test]
    async fn explicit_token_needs_no_work() {
        // a directory as token file: any read attempt would record an error
        let dir = TempDir::new().unwrap();
        let mut provisioning = listener(LocalTokenCache::at(dir.path()));
        let provisioner = StubProvisioner::succeeding("abc123", "acct-1");
        let mut env = environment(&[(API_TOKEN_PROPERTY, "explicit-token")]);
        let layers_before = env.source_names().len();

        let resolution = provisioning.post_process_environment(&mut env, &provisioner).await.unwrap();
        assert!(provisioning
            .deferred_log()
            .records()
            .iter()
            .all(|record| !record.message.contains("Failed to read")));
        provisioning.on_event(LifecycleEvent::ApplicationPrepared);
        provisioning.on_event(LifecycleEvent::Started);

        assert_eq!(resolution, Resolution::AlreadyConfigured);
        assert!(provisioner.calls().is_empty());
        assert_eq!(env.source_names().len(), layers_before);
        assert_eq!(env.get_property(API_TOKEN_PROPERTY), Some("explicit-token"));
        assert!(printed(&provisioning).is_empty());
    }

    #[tokio::test]
    async fn blank_token_is_not_explicit() {
        let (_dir, path) = token_file();
        std::fs::write(&path, "xyz789").unwrap();
        let mut provisioning = listener(LocalTokenCache::at(&path));
        let provisioner = StubProvisioner::failing();
        let mut env = environment(&[(API_TOKEN_PROPERTY, "   ")]);

        let resolution = provisioning.post_process_environment(&mut env, &provisioner).await.unwrap();

        assert_eq!(resolution, Resolution::Cached { token: "xyz789".to_owned() });
        // the blank value still sits in a higher layer
        assert_eq!(env.source(WAVEFRONT_SOURCE).unwrap().get(API_TOKEN_PROPERTY), Some("xyz789"));
    }

    #[tokio::test]
    async fn proxy_transport_needs_no_token() {
        let (_dir, path) = token_file();
        std::fs::write(&path, "xyz789").unwrap();
        let mut provisioning = listener(LocalTokenCache::at(&path));
        let provisioner = StubProvisioner::succeeding("abc123", "acct-1");
        let mut env = environment(&[(URI_PROPERTY, "proxy://localhost:2878")]);

        let resolution = provisioning.post_process_environment(&mut env, &provisioner).await.unwrap();
        provisioning.on_event(LifecycleEvent::Started);

        assert_eq!(resolution, Resolution::ProxyTransport);
        assert!(provisioner.calls().is_empty());
        assert!(env.source(WAVEFRONT_SOURCE).is_none());
        assert_eq!(env.get_property(API_TOKEN_PROPERTY), None);
        assert!(provisioning.pending_report().is_none());
        assert!(printed(&provisioning).is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "xyz789");
    }

    #[tokio::test]
    async fn proxy_transport_skips_token_file() {
        let dir = TempDir::new().unwrap();
        let mut provisioning = listener(LocalTokenCache::at(dir.path()));
        let provisioner = StubProvisioner::failing();
        let mut env = environment(&[(URI_PROPERTY, "proxy://localhost:2878")]);

        provisioning.post_process_environment(&mut env, &provisioner).await.unwrap();

        assert!(provisioning
            .deferred_log()
            .records()
            .iter()
            .all(|record| !record.message.contains("Failed to read")));
    }
}
