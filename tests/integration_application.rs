//! End-to-end wiring of a small application graph: configuration,
//! trait-backed logging, repositories, per-request scopes, and observers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wirebox::{Container, DiObserver, Lifetime, Resolver, ServiceKey};

trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

struct CollectingLogger {
    lines: Mutex<Vec<String>>,
}

impl Logger for CollectingLogger {
    fn log(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}

struct AppConfig {
    app_name: String,
}

struct Database {
    host: String,
}

struct UserRepo {
    db: Arc<Database>,
    logger: Arc<dyn Logger>,
}

impl UserRepo {
    fn find_user(&self, id: u64) -> String {
        self.logger.log(&format!("lookup {} on {}", id, self.db.host));
        format!("user-{}", id)
    }
}

struct RequestContext {
    request_id: usize,
}

struct UserHandler {
    repo: Arc<UserRepo>,
    context: Arc<RequestContext>,
    replicas: Vec<Arc<Database>>,
}

impl UserHandler {
    fn handle(&self, id: u64) -> String {
        format!(
            "req-{} {} ({} replicas)",
            self.context.request_id,
            self.repo.find_user(id),
            self.replicas.len()
        )
    }
}

fn build_container() -> Container {
    static REQUESTS: AtomicUsize = AtomicUsize::new(1);

    let container = Container::new();

    container.must_register_instance(
        AppConfig {
            app_name: "wirebox-demo".to_string(),
        },
        Lifetime::Singleton,
    );
    container.must_register(
        |config: Arc<AppConfig>| Database {
            host: format!("{}.primary.db", config.app_name),
        },
        Lifetime::Singleton,
    );
    container.must_register_instance_named(
        "replica-1",
        Database {
            host: "replica-1.db".to_string(),
        },
        Lifetime::Singleton,
    );
    container.must_register_instance_named(
        "replica-2",
        Database {
            host: "replica-2.db".to_string(),
        },
        Lifetime::Singleton,
    );
    container.must_register_instance_trait::<dyn Logger>(
        Arc::new(CollectingLogger {
            lines: Mutex::new(Vec::new()),
        }),
        Lifetime::Singleton,
    );
    container.must_register(
        |db: Arc<Database>, logger: Arc<dyn Logger>| UserRepo { db, logger },
        Lifetime::Singleton,
    );
    container.must_register(
        || RequestContext {
            request_id: REQUESTS.fetch_add(1, Ordering::SeqCst),
        },
        Lifetime::Scoped,
    );
    container.must_register(
        |repo: Arc<UserRepo>, context: Arc<RequestContext>, replicas: Vec<Arc<Database>>| {
            UserHandler {
                repo,
                context,
                replicas,
            }
        },
        Lifetime::Transient,
    );

    container
}

#[test]
fn full_application_graph_resolves_and_shares_correctly() {
    let container = build_container();
    assert!(container.validate().is_valid());

    let scope_a = container.create_scope();
    let scope_b = container.create_scope();

    let h1 = scope_a.get_required::<UserHandler>();
    let h2 = scope_a.get_required::<UserHandler>();
    let h3 = scope_b.get_required::<UserHandler>();

    // Handlers are transient, their repo is the process-wide singleton.
    assert!(!Arc::ptr_eq(&h1, &h2));
    assert!(Arc::ptr_eq(&h1.repo, &h2.repo));
    assert!(Arc::ptr_eq(&h1.repo, &h3.repo));

    // Request context sticks per scope.
    assert!(Arc::ptr_eq(&h1.context, &h2.context));
    assert!(!Arc::ptr_eq(&h1.context, &h3.context));

    // The replica sequence assembled the default plus both named databases.
    assert_eq!(h1.replicas.len(), 3);

    let out = h1.handle(1001);
    assert!(out.contains("user-1001"));
    assert!(out.contains("(3 replicas)"));

    // The logger the repo uses is the registered trait instance.
    let logger = container.get_required::<dyn Logger>();
    assert!(Arc::ptr_eq(&h1.repo.logger, &logger));
}

#[test]
fn observers_see_every_resolution() {
    #[derive(Default)]
    struct Counting {
        resolved: AtomicUsize,
        failed: AtomicUsize,
    }

    impl DiObserver for Counting {
        fn resolving(&self, _key: &ServiceKey) {}
        fn resolved(&self, _key: &ServiceKey, _elapsed: std::time::Duration) {
            self.resolved.fetch_add(1, Ordering::SeqCst);
        }
        fn failed(&self, _key: &ServiceKey, _error: &wirebox::DiError) {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    let container = build_container();
    let counting = Arc::new(Counting::default());
    container.add_observer(counting.clone());

    let scope = container.create_scope();
    let _ = scope.get_required::<UserHandler>();

    // The handler resolve fans out into nested resolves; each one reports.
    assert!(counting.resolved.load(Ordering::SeqCst) >= 4);
    assert_eq!(counting.failed.load(Ordering::SeqCst), 0);

    struct NeverRegistered;
    let _ = container.get::<NeverRegistered>();
    assert_eq!(counting.failed.load(Ordering::SeqCst), 1);
}

#[test]
fn routing_by_name_through_an_auto_map() {
    struct Router {
        backends: HashMap<String, Arc<Database>>,
    }

    let container = build_container();
    container.must_register(
        |backends: HashMap<String, Arc<Database>>| Router { backends },
        Lifetime::Singleton,
    );

    let router = container.get_required::<Router>();
    assert_eq!(router.backends.len(), 2);
    assert_eq!(router.backends["replica-1"].host, "replica-1.db");
    assert_eq!(router.backends["replica-2"].host, "replica-2.db");
}
