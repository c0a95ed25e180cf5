use super::*;

#[tokio::test]
async fn session_scope_returns_live_id_without_walking() {
    let directory = StaticSessionDirectory::new().with_parent("child", "parent");
    let resolver = ScopeResolver::new(directory, RoutingScope::Session);
    let scope = resolver.resolve("child").await;
    assert_eq!(scope.as_str(), "child");
}

#[tokio::test]
async fn root_scope_walks_to_the_root() {
    let directory = StaticSessionDirectory::new()
        .with_parent("grandchild", "child")
        .with_parent("child", "root");
    let resolver = ScopeResolver::new(directory, RoutingScope::Root);
    let scope = resolver.resolve("grandchild").await;
    assert_eq!(scope.as_str(), "root");
}

#[tokio::test]
async fn root_scope_is_its_own_root_when_no_parent() {
    let directory = StaticSessionDirectory::new();
    let resolver = ScopeResolver::new(directory, RoutingScope::Root);
    let scope = resolver.resolve("sess-ROOT-xyz").await;
    assert_eq!(scope.as_str(), "sess-ROOT-xyz");
}

#[tokio::test]
async fn all_chain_members_resolve_to_the_same_root() {
    let directory = StaticSessionDirectory::new()
        .with_parent("grandchild", "child")
        .with_parent("child", "root");
    let resolver = ScopeResolver::new(directory, RoutingScope::Root);
    let via_grandchild = resolver.resolve("grandchild").await;
    let via_child = resolver.resolve("child").await;
    let via_root = resolver.resolve("root").await;
    assert_eq!(via_grandchild, via_child);
    assert_eq!(via_child, via_root);
}

#[tokio::test]
async fn walk_is_bounded_at_max_depth() {
    let mut directory = StaticSessionDirectory::new();
    // A chain deeper than MAX_WALK_DEPTH: sess-0 -> sess-1 -> ... -> sess-20.
    for i in 0..20 {
        directory = directory.with_parent(format!("sess-{i}"), format!("sess-{}", i + 1));
    }
    let resolver = ScopeResolver::new(directory, RoutingScope::Root);
    let scope = resolver.resolve("sess-0").await;
    // Walk stops after MAX_WALK_DEPTH hops rather than reaching sess-20.
    assert_ne!(scope.as_str(), "sess-20");
}

struct FailingDirectory;

#[async_trait::async_trait]
impl SessionDirectory for FailingDirectory {
    async fn parent_of(&self, _session_id: &str) -> Result<Option<String>, ScopeResolutionError> {
        Err(ScopeResolutionError::Lookup {
            session_id: "x".to_string(),
            message: "framework unavailable".to_string(),
        })
    }
}

#[tokio::test]
async fn directory_error_treats_session_as_its_own_root() {
    let resolver = ScopeResolver::new(FailingDirectory, RoutingScope::Root);
    let scope = resolver.resolve("sess-1").await;
    assert_eq!(scope.as_str(), "sess-1");
}
