//! Property-map injection integration tests

mod common;

use serde_json::json;

use fbc_domain::{BlockMetadata, Error, Value};
use fbc_engine::{
    inject_by_map, injector_provider, ApplyOptions, Block, Engine, PropsMap, ProviderRegistry,
    ResolveContext,
};

fn ab_engine() -> Engine {
    let registry = ProviderRegistry::builder()
        .provider("providerFoo", &[], |_| Ok(Value::from("A")))
        .provider("providerBar", &[], |_| Ok(Value::from("B")))
        .build()
        .expect("acyclic registry");
    Engine::new(registry)
}

#[test]
fn test_transform_merges_resolved_shape_onto_inputs() {
    common::init_logging();
    let engine = ab_engine();
    let map = PropsMap::from_json(&json!({
        "x": "providerFoo",
        "nested": { "y": "providerBar" }
    }))
    .expect("well-formed declaration");

    let transform = inject_by_map(map);
    let ctx = ResolveContext::root(engine.registry().clone(), Value::from(json!({ "z": 1 })), None);

    let merged = transform(&Value::from(json!({ "z": 1 })), &ctx).expect("resolvable");
    assert_eq!(
        merged,
        Value::from(json!({ "z": 1, "x": "A", "nested": { "y": "B" } }))
    );
}

#[test]
fn test_injector_declared_as_registry_provider() {
    common::init_logging();
    let map = PropsMap::from_json(&json!({ "x": "providerFoo" })).expect("well-formed");
    let source = injector_provider(map);
    let registry = ProviderRegistry::builder()
        .provider("providerFoo", &[], |_| Ok(Value::from("A")))
        .provider(
            "sectionInputs",
            &["currentInputs", "currentEnvironment"],
            move |deps| source(deps),
        )
        .build()
        .expect("acyclic registry");
    let engine = Engine::new(registry);

    let applied = engine
        .apply_named("sectionInputs", ApplyOptions::default())
        .expect("declared provider");
    let merged = applied.invoke(Value::from(json!({ "z": 1 }))).expect("resolvable");
    assert_eq!(merged, Value::from(json!({ "z": 1, "x": "A" })));
}

#[test]
fn test_injected_names_hit_the_shared_memo_table() {
    common::init_logging();
    let (foo_count, foo) = common::counted("A");
    let map = PropsMap::from_json(&json!({ "x": "providerFoo" })).expect("well-formed");
    let source = injector_provider(map);
    let registry = ProviderRegistry::builder()
        .provider("providerFoo", &[], foo)
        .provider(
            "sectionInputs",
            &["currentInputs", "currentEnvironment"],
            move |deps| source(deps),
        )
        .build()
        .expect("acyclic registry");
    let engine = Engine::new(registry);

    // The section resolves providerFoo both directly and through injection
    let applied = engine
        .apply(
            &BlockMetadata::named("Section"),
            |deps| Ok(deps[1].clone()),
            &["providerFoo", "sectionInputs"],
            ApplyOptions::default(),
        )
        .expect("valid deps");

    let merged = applied.invoke(Value::from(json!({}))).expect("resolvable");
    assert_eq!(merged, Value::from(json!({ "x": "A" })));
    assert_eq!(common::count_of(&foo_count), 1, "injection reuses the memo table");
}

#[test]
fn test_injection_sees_boundary_constants() {
    common::init_logging();
    let (foo_count, foo) = common::counted("A");
    let registry = ProviderRegistry::builder()
        .provider("providerFoo", &[], foo)
        .build()
        .expect("acyclic registry");
    let engine = Engine::new(registry);

    let map = PropsMap::from_json(&json!({ "x": "providerFoo" })).expect("well-formed");
    let transform = inject_by_map(map);
    let block = Block::new(BlockMetadata::named("Section"), move |inputs, _, ambient| {
        let ctx = ambient.expect("invoked under a boundary");
        transform(&inputs, ctx)
    });

    let shared = engine.share(block, &["providerFoo"]).expect("known names");
    let merged = shared.invoke(Value::from(json!({ "z": 1 }))).expect("resolvable");

    assert_eq!(merged, Value::from(json!({ "z": 1, "x": "A" })));
    assert_eq!(common::count_of(&foo_count), 1);
}

#[test]
fn test_malformed_json_declaration_is_rejected() {
    assert!(matches!(
        PropsMap::from_json(&json!({ "x": 42 })),
        Err(Error::InvalidArgument { .. })
    ));
    assert!(matches!(
        PropsMap::from_json(&json!({ "x": { "y": null } })),
        Err(Error::InvalidArgument { .. })
    ));
}
