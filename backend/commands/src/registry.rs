/// Provider registry and the aggregator that presents all registered
/// providers as a single one.
use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, trace, warn};
use warden_core::MessageContext;

use crate::path::CommandPath;
use crate::provider::Provider;
use crate::session::{InvocationSession, PathEntry, ProviderId};

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

type ProviderBox = Arc<dyn Provider>;

/// Thread-safe list of registered providers.
///
/// Registration takes the write lock and happens at startup (rarely later).
/// Dispatch takes the read lock only long enough to clone the list, so no
/// lock is held while a provider runs.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: Arc<RwLock<Vec<ProviderBox>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Registering the same instance twice is a no-op.
    pub async fn register(&self, provider: Arc<dyn Provider>) {
        let mut list = self.providers.write().await;
        if list.iter().any(|p| Arc::ptr_eq(p, &provider)) {
            warn!("[Registry] {} is already registered", provider.name());
            return;
        }
        debug!("[Registry] Registered {}", provider.name());
        list.push(provider);
    }

    /// Remove a provider by identity. Returns whether it was registered.
    pub async fn unregister(&self, provider: &Arc<dyn Provider>) -> bool {
        let mut list = self.providers.write().await;
        let before = list.len();
        list.retain(|p| !Arc::ptr_eq(p, provider));
        let removed = list.len() != before;
        if removed {
            debug!("[Registry] Unregistered {}", provider.name());
        }
        removed
    }

    /// Copy of the current list, in registration order.
    pub async fn snapshot(&self) -> Vec<ProviderBox> {
        self.providers.read().await.clone()
    }

    pub async fn names(&self) -> Vec<String> {
        self.providers.read().await.iter().map(|p| p.name().to_string()).collect()
    }

    pub async fn len(&self) -> usize {
        self.providers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.providers.read().await.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// The union of a fixed set of providers, queried path by path.
///
/// Every provider in the snapshot is alive at the root. A provider is alive at
/// `p.child(t)` iff it was alive at `p` and offered `t` there. The session
/// records the alive set and each alive provider's answer for every visited
/// path, so the final owner can be read back once the walk stops.
pub struct Aggregator {
    providers: Vec<ProviderBox>,
}

impl Aggregator {
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self { providers }
    }

    pub fn provider(&self, id: ProviderId) -> Option<&Arc<dyn Provider>> {
        self.providers.get(id)
    }

    pub fn names(&self, ids: &[ProviderId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.providers.get(*id))
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Union of the options offered at `path` by the providers alive there.
    pub async fn legal_next_tokens(
        &self,
        session: &mut InvocationSession,
        ctx: &MessageContext,
        path: &CommandPath,
    ) -> BTreeSet<String> {
        self.populate(session, ctx, path).await;
        session.union_offered(path)
    }

    /// Visit every prefix of `path` not yet in the session, root first. Stops
    /// at the first prefix whose last token no alive provider offered; neither
    /// it nor anything below it enters the session.
    async fn populate(&self, session: &mut InvocationSession, ctx: &MessageContext, path: &CommandPath) {
        for prefix in path.prefixes() {
            if session.contains(&prefix) {
                continue;
            }
            let alive = match (prefix.parent(), prefix.last()) {
                (Some(parent), Some(token)) => session.owners_after(&parent, token),
                _ => (0..self.providers.len()).collect(),
            };
            if alive.is_empty() && !prefix.is_empty() {
                trace!("[Aggregator] `{}` was not offered; stopping", prefix);
                return;
            }

            let mut offered = Vec::with_capacity(alive.len());
            for &id in &alive {
                let provider = &self.providers[id];
                let options = provider.legal_next_tokens(ctx, &prefix).await;
                trace!("[Aggregator] {} offers {:?} at `{}`", provider.name(), options, prefix);
                offered.push((id, options));
            }
            session.insert(prefix, PathEntry { alive, offered });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::Result;
    use async_trait::async_trait;

    use crate::types::CommandResponse;

    /// Offers fixed children per path and counts how often it is asked.
    /// Table rows are `(path, space-separated options)`.
    struct Fixed {
        name: &'static str,
        table: Vec<(&'static str, &'static str)>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(name: &'static str, table: &[(&'static str, &'static str)]) -> Arc<Self> {
            Arc::new(Self { name, table: table.to_vec(), calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl Provider for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn legal_next_tokens(&self, _ctx: &MessageContext, path: &CommandPath) -> BTreeSet<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let key = path.tokens().join(" ");
            self.table
                .iter()
                .find(|(p, _)| *p == key)
                .map(|(_, opts)| opts.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default()
        }

        async fn execute(&self, _ctx: &MessageContext, _path: &CommandPath, _remainder: &str) -> Result<Option<CommandResponse>> {
            Ok(None)
        }
    }

    fn path(tokens: &[&str]) -> CommandPath {
        tokens.iter().copied().collect()
    }

    #[tokio::test]
    async fn register_is_idempotent_and_unregister_by_identity() {
        let registry = ProviderRegistry::new();
        let a: Arc<dyn Provider> = Fixed::new("a", &[]);
        let b: Arc<dyn Provider> = Fixed::new("b", &[]);
        registry.register(a.clone()).await;
        registry.register(a.clone()).await;
        registry.register(b.clone()).await;
        assert_eq!(registry.names().await, vec!["a", "b"]);

        assert!(registry.unregister(&a).await);
        assert!(!registry.unregister(&a).await);
        assert_eq!(registry.names().await, vec!["b"]);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn union_at_root_and_survivors_below() {
        let filter = Fixed::new("filter", &[("", "filter help"), ("filter", "add list")]);
        let roles = Fixed::new("roles", &[("", "role help"), ("role", "give")]);
        let agg = Aggregator::new(vec![filter.clone() as Arc<dyn Provider>, roles.clone()]);
        let ctx = MessageContext::console("tester", "");
        let mut session = InvocationSession::new();

        let root = agg.legal_next_tokens(&mut session, &ctx, &CommandPath::root()).await;
        assert_eq!(root.into_iter().collect::<Vec<_>>(), vec!["filter", "help", "role"]);

        let below = agg.legal_next_tokens(&mut session, &ctx, &path(&["filter"])).await;
        assert_eq!(below.into_iter().collect::<Vec<_>>(), vec!["add", "list"]);
        assert_eq!(session.survivors(&path(&["filter"])), Some(&[0][..]));

        agg.legal_next_tokens(&mut session, &ctx, &path(&["help"])).await;
        assert_eq!(session.survivors(&path(&["help"])), Some(&[0, 1][..]));
        // roles was never alive at "filter", so it was never asked about it
        assert_eq!(roles.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn each_provider_is_asked_once_per_path() {
        let filter = Fixed::new("filter", &[("", "filter"), ("filter", "add")]);
        let agg = Aggregator::new(vec![filter.clone() as Arc<dyn Provider>]);
        let ctx = MessageContext::console("tester", "");
        let mut session = InvocationSession::new();

        for _ in 0..3 {
            agg.legal_next_tokens(&mut session, &ctx, &path(&["filter", "add"])).await;
        }
        assert_eq!(filter.calls.load(Ordering::SeqCst), 3);
        assert_eq!(session.len(), 3);
    }

    #[tokio::test]
    async fn unoffered_paths_never_enter_the_session() {
        let filter = Fixed::new("filter", &[("", "filter"), ("filter", "add")]);
        let agg = Aggregator::new(vec![filter.clone() as Arc<dyn Provider>]);
        let ctx = MessageContext::console("tester", "");
        let mut session = InvocationSession::new();

        let opts = agg.legal_next_tokens(&mut session, &ctx, &path(&["quit", "now"])).await;
        assert!(opts.is_empty());
        assert!(session.survivors(&path(&["quit"])).is_none());
        assert!(session.entry(&path(&["quit", "now"])).is_none());
        assert_eq!(session.paths().collect::<Vec<_>>(), vec![&CommandPath::root()]);

        // an offered token below the root still stops at the first unoffered one
        let opts = agg.legal_next_tokens(&mut session, &ctx, &path(&["filter", "drop", "x"])).await;
        assert!(opts.is_empty());
        assert!(session.contains(&path(&["filter"])));
        assert!(!session.contains(&path(&["filter", "drop"])));
        assert_eq!(session.len(), 2);
        // root and "filter" only
        assert_eq!(filter.calls.load(Ordering::SeqCst), 2);
    }
}
