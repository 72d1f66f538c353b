use std::sync::{Arc, Mutex};
use wirebox::{Container, DiError, Lifetime, Resolver};

#[test]
fn concrete_singleton_instances() {
    let container = Container::new();
    container.must_register_instance(42usize, Lifetime::Singleton);
    container.must_register_instance("hello".to_string(), Lifetime::Singleton);

    let num1 = container.get_required::<usize>();
    let num2 = container.get_required::<usize>();
    let str1 = container.get_required::<String>();
    let str2 = container.get_required::<String>();

    assert_eq!(*num1, 42);
    assert_eq!(*str1, "hello");
    assert!(Arc::ptr_eq(&num1, &num2));
    assert!(Arc::ptr_eq(&str1, &str2));
}

#[test]
fn factory_with_dependencies() {
    #[derive(Debug)]
    struct Config {
        port: u16,
    }

    #[derive(Debug)]
    struct Server {
        config: Arc<Config>,
        name: String,
    }

    let container = Container::new();
    container.must_register_instance(Config { port: 8080 }, Lifetime::Singleton);
    container.must_register(
        |config: Arc<Config>| Server {
            config,
            name: "MyServer".to_string(),
        },
        Lifetime::Singleton,
    );

    let server = container.get_required::<Server>();
    assert_eq!(server.config.port, 8080);
    assert_eq!(server.name, "MyServer");
}

#[test]
fn singleton_factory_runs_lazily_and_once() {
    let counter = Arc::new(Mutex::new(0));
    let counter_clone = counter.clone();

    let container = Container::new();
    container.must_register(
        move |port: Arc<u16>| {
            *counter_clone.lock().unwrap() += 1;
            format!("listening on {}", port)
        },
        Lifetime::Singleton,
    );
    container.must_register_instance(8080u16, Lifetime::Singleton);

    assert_eq!(*counter.lock().unwrap(), 0);

    let a = container.get_required::<String>();
    let b = container.get_required::<String>();

    assert_eq!(a.as_str(), "listening on 8080");
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(*counter.lock().unwrap(), 1);
}

#[test]
fn transient_creates_new_instances() {
    let counter = Arc::new(Mutex::new(0));
    let counter_clone = counter.clone();

    let container = Container::new();
    container.must_register(
        move || {
            let mut c = counter_clone.lock().unwrap();
            *c += 1;
            format!("instance-{}", *c)
        },
        Lifetime::Transient,
    );

    let a = container.get_required::<String>();
    let b = container.get_required::<String>();
    let c = container.get_required::<String>();

    assert_eq!(*a, "instance-1");
    assert_eq!(*b, "instance-2");
    assert_eq!(*c, "instance-3");

    assert!(!Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&b, &c));
}

#[test]
fn not_found_error() {
    struct Unregistered;

    let container = Container::new();
    match container.get::<Unregistered>() {
        Err(DiError::NotFound(name)) => assert!(name.contains("Unregistered")),
        other => panic!("expected NotFound, got {:?}", other.err()),
    }
}

#[test]
fn duplicate_default_registration_fails() {
    struct Service;

    let container = Container::new();
    container.must_register(|| Service, Lifetime::Singleton);

    match container.register(|| Service, Lifetime::Singleton) {
        Err(DiError::Duplicate(name)) => assert!(name.contains("Service")),
        other => panic!("expected Duplicate, got {:?}", other.err()),
    }

    // A pre-built value collides with the factory binding too.
    assert!(matches!(
        container.register_instance(Service, Lifetime::Singleton),
        Err(DiError::Duplicate(_))
    ));
}

#[test]
fn instance_registration_rejects_transient() {
    struct Ready;

    let container = Container::new();
    match container.register_instance(Ready, Lifetime::Transient) {
        Err(DiError::TransientInstance(name)) => assert!(name.contains("Ready")),
        other => panic!("expected TransientInstance, got {:?}", other.err()),
    }
}

#[test]
fn complex_dependency_graph_shares_singletons() {
    struct A {
        value: i32,
    }

    struct B {
        a: Arc<A>,
    }

    struct C {
        a: Arc<A>,
        b: Arc<B>,
    }

    let container = Container::new();
    container.must_register_instance(A { value: 100 }, Lifetime::Singleton);
    container.must_register(|a: Arc<A>| B { a }, Lifetime::Singleton);
    container.must_register(|a: Arc<A>, b: Arc<B>| C { a, b }, Lifetime::Singleton);

    let c = container.get_required::<C>();

    assert_eq!(c.a.value, 100);
    assert_eq!(c.b.a.value, 100);
    assert!(Arc::ptr_eq(&c.a, &c.b.a));
}

#[test]
fn register_as_converts_through_into() {
    let container = Container::new();
    container.must_register_as::<u64, _, _>(|| 8080u16, Lifetime::Singleton);

    let port = container.get_required::<u64>();
    assert_eq!(*port, 8080);

    // The factory's own return type was never registered.
    assert!(container.get::<u16>().is_err());
}

#[test]
fn dependency_failures_carry_the_offending_type() {
    struct Missing;
    struct Needs {
        _missing: Arc<Missing>,
    }

    let container = Container::new();
    container.must_register(
        |missing: Arc<Missing>| Needs { _missing: missing },
        Lifetime::Transient,
    );

    match container.get::<Needs>() {
        Err(DiError::Dependency { type_name, source }) => {
            assert!(type_name.contains("Missing"));
            assert!(matches!(*source, DiError::NotFound(_)));
        }
        other => panic!("expected Dependency, got {:?}", other.err()),
    }
}

#[test]
fn reset_drops_all_registrations() {
    let container = Container::new();
    container.must_register_instance(7i64, Lifetime::Singleton);
    container.must_register_instance_named("seven", 7i64, Lifetime::Singleton);

    assert_eq!(*container.get_required::<i64>(), 7);

    container.reset();

    assert!(matches!(container.get::<i64>(), Err(DiError::NotFound(_))));
    assert!(matches!(
        container.get_named::<i64>("seven"),
        Err(DiError::NotFoundNamed(_, _))
    ));
}
