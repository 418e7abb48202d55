//! Integration tests for the interception wrapper
//!
//! These tests verify:
//! - Hits are served verbatim without calling the real provider
//! - Misses, expiry and a disabled gate fall through to the real provider
//! - Real provider errors propagate unchanged
//! - The wrapper is substitutable wherever a provider is accepted

mod common;

use common::{init_tracing, RecordingProvider};
use provider_faker::{
    ApplyResourceChangeRequest, ConfigureProviderRequest, FakeKey, FakeSession, FakeStore,
    FakerConfig, FakingProvider, ImportResourceStateRequest, KeyDeriver, Operation,
    PlanResourceChangeRequest, Provider, ProviderError, ReadDataSourceRequest, ReadResourceRequest,
    RequestDescriptor,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

type Harness = (
    FakingProvider<Arc<RecordingProvider>>,
    Arc<RecordingProvider>,
    Arc<FakeSession>,
);

fn faking(provider: RecordingProvider) -> Harness {
    init_tracing();
    let real = Arc::new(provider);
    let session = Arc::new(FakeSession::new(FakerConfig::for_tests()).unwrap());
    let wrapper = FakingProvider::new(Arc::clone(&real), Arc::clone(&session));
    (wrapper, real, session)
}

fn read_instance(id: &str) -> ReadResourceRequest {
    ReadResourceRequest::new("aws_instance", json!({"id": id, "instance_type": "t3.micro"}))
}

#[tokio::test(start_paused = true)]
async fn test_scenario_expiring_instance_fake() {
    let (provider, real, session) = faking(RecordingProvider::new());
    let fake_state = json!({"id": "i-fake123", "state": "running"});

    session
        .set_fake_data(
            &RequestDescriptor::read("aws_instance").with_param("id", "i-fake123"),
            fake_state.clone(),
            Duration::from_secs(30 * 60),
        )
        .await
        .unwrap();

    tokio::time::advance(Duration::from_secs(1)).await;
    let state = provider.read_resource(read_instance("i-fake123")).await.unwrap();
    assert_eq!(state, fake_state);
    assert_eq!(real.calls(), 0);

    tokio::time::advance(Duration::from_secs(31 * 60)).await;
    let state = provider.read_resource(read_instance("i-fake123")).await.unwrap();
    assert_eq!(state["source"], "real");
    assert_eq!(real.calls(), 1);
}

#[tokio::test]
async fn test_scenario_disabled_gate_always_delegates() {
    let (provider, real, session) = faking(RecordingProvider::new());
    session
        .set_fake_data(
            &RequestDescriptor::read("aws_instance").with_param("id", "i-1"),
            json!({"id": "i-1", "fake": true}),
            Duration::from_secs(600),
        )
        .await
        .unwrap();

    session.disable();
    for _ in 0..3 {
        let state = provider.read_resource(read_instance("i-1")).await.unwrap();
        assert_eq!(state["source"], "real");
    }
    assert_eq!(real.calls(), 3);

    // Entries survive while the gate is off
    session.enable();
    let state = provider.read_resource(read_instance("i-1")).await.unwrap();
    assert_eq!(state["fake"], true);
    assert_eq!(real.calls(), 3);
}

#[tokio::test]
async fn test_miss_delegates_to_real_provider() {
    let (provider, real, _session) = faking(RecordingProvider::new());

    let state = provider.read_resource(read_instance("i-unknown")).await.unwrap();
    assert_eq!(state, json!({"source": "real", "operation": "read", "type": "aws_instance"}));
    assert_eq!(real.operations(), vec!["read:aws_instance".to_string()]);
}

#[tokio::test]
async fn test_errors_propagate_unchanged() {
    let error = ProviderError::NotFound {
        type_name: "aws_instance".to_string(),
        id: "i-gone".to_string(),
    };
    let (provider, _real, _session) = faking(RecordingProvider::failing(error.clone()));

    let result = provider.read_resource(read_instance("i-gone")).await;
    assert_eq!(assert_err!(result), error);
}

#[tokio::test]
async fn test_hit_bypasses_failing_provider() {
    let (provider, real, session) = faking(RecordingProvider::failing(ProviderError::Upstream(
        "throttled".to_string(),
    )));
    session
        .set_fake_data(
            &RequestDescriptor::read("aws_instance").with_param("id", "i-1"),
            json!({"id": "i-1"}),
            Duration::from_secs(60),
        )
        .await
        .unwrap();

    let state = assert_ok!(provider.read_resource(read_instance("i-1")).await);
    assert_eq!(state, json!({"id": "i-1"}));
    assert_eq!(real.calls(), 0);
}

#[tokio::test]
async fn test_payload_returned_verbatim() {
    let (provider, _real, session) = faking(RecordingProvider::new());
    // Not a state object at all: the wrapper does not validate shape
    let odd_payload = json!([1, "two", {"three": null}]);
    session
        .set_fake_data(
            &RequestDescriptor::read("aws_instance").with_param("id", "i-1"),
            odd_payload.clone(),
            Duration::from_secs(60),
        )
        .await
        .unwrap();

    assert_eq!(provider.read_resource(read_instance("i-1")).await.unwrap(), odd_payload);
}

#[tokio::test]
async fn test_every_resource_operation_is_interceptable() {
    let (provider, real, session) = faking(RecordingProvider::new());
    let lifetime = Duration::from_secs(60);

    let plan = PlanResourceChangeRequest {
        type_name: "aws_instance".to_string(),
        prior_state: json!({"id": "i-1"}),
        proposed_new_state: json!({"id": "i-1", "instance_type": "t3.large"}),
        config: json!({"instance_type": "t3.large"}),
    };
    let apply = ApplyResourceChangeRequest {
        type_name: "aws_instance".to_string(),
        prior_state: json!({"id": "i-1"}),
        planned_state: json!({"id": "i-1", "instance_type": "t3.large"}),
        config: json!({"instance_type": "t3.large"}),
    };
    let import = ImportResourceStateRequest::new("aws_instance", "i-1");
    let data = ReadDataSourceRequest {
        type_name: "aws_ami".to_string(),
        config: json!({"most_recent": true, "owners": ["self"]}),
    };

    let descriptors = [
        RequestDescriptor::plan("aws_instance").with_param("id", "i-1"),
        RequestDescriptor::apply("aws_instance").with_param("id", "i-1"),
        RequestDescriptor::new(Operation::Import, "aws_instance").with_param("id", "i-1"),
        RequestDescriptor::new(Operation::ReadDataSource, "aws_ami")
            .with_param("owners", json!(["self"]))
            .with_param("most_recent", true),
    ];
    for (i, descriptor) in descriptors.iter().enumerate() {
        session
            .set_fake_data(descriptor, json!({ "fake": i }), lifetime)
            .await
            .unwrap();
    }

    assert_eq!(provider.plan_resource_change(plan).await.unwrap(), json!({"fake": 0}));
    assert_eq!(provider.apply_resource_change(apply).await.unwrap(), json!({"fake": 1}));
    assert_eq!(provider.import_resource_state(import).await.unwrap(), json!({"fake": 2}));
    assert_eq!(provider.read_data_source(data).await.unwrap(), json!({"fake": 3}));
    assert_eq!(real.calls(), 0);
}

#[tokio::test]
async fn test_operation_kinds_do_not_collide() {
    let (provider, real, session) = faking(RecordingProvider::new());
    session
        .set_fake_data(
            &RequestDescriptor::read("aws_instance").with_param("id", "i-1"),
            json!("read fake"),
            Duration::from_secs(60),
        )
        .await
        .unwrap();

    let plan = PlanResourceChangeRequest {
        type_name: "aws_instance".to_string(),
        prior_state: json!({"id": "i-1"}),
        proposed_new_state: json!({"id": "i-1"}),
        config: Value::Null,
    };
    let planned = provider.plan_resource_change(plan).await.unwrap();
    assert_eq!(planned["source"], "real");
    assert_eq!(real.calls(), 1);
}

#[tokio::test]
async fn test_configure_and_stop_always_delegate() {
    let (provider, real, _session) = faking(RecordingProvider::new());

    assert_ok!(provider.configure(ConfigureProviderRequest::default()).await);
    assert_ok!(provider.stop().await);
    assert_eq!(
        real.operations(),
        vec!["configure:provider".to_string(), "stop:provider".to_string()]
    );
}

#[tokio::test]
async fn test_removed_fake_falls_through() {
    let (provider, real, session) = faking(RecordingProvider::new());
    let descriptor = RequestDescriptor::read("aws_instance").with_param("id", "i-1");
    let key = session
        .set_fake_data(&descriptor, json!({"fake": true}), Duration::from_secs(60))
        .await
        .unwrap();

    assert!(session.clear_fake_data(key).await);
    let state = provider.read_resource(read_instance("i-1")).await.unwrap();
    assert_eq!(state["source"], "real");
    assert_eq!(real.calls(), 1);
}

#[tokio::test]
async fn test_wraps_trait_objects() {
    init_tracing();
    let real: Arc<dyn Provider> = Arc::new(RecordingProvider::new());
    let session = Arc::new(FakeSession::new(FakerConfig::for_tests()).unwrap());
    let provider: Box<dyn Provider> = Box::new(FakingProvider::new(real, Arc::clone(&session)));

    session
        .set_fake_data(
            &RequestDescriptor::read("aws_instance").with_param("id", "i-1"),
            json!({"layered": true}),
            Duration::from_secs(60),
        )
        .await
        .unwrap();

    let state = provider.read_resource(read_instance("i-1")).await.unwrap();
    assert_eq!(state, json!({"layered": true}));
}

#[tokio::test]
async fn test_teardown_restores_passthrough() {
    let (provider, real, session) = faking(RecordingProvider::new());
    session
        .set_fake_data(
            &RequestDescriptor::read("aws_instance").with_param("id", "i-1"),
            json!({"fake": true}),
            Duration::from_secs(60),
        )
        .await
        .unwrap();

    session.teardown().await;

    let state = provider.read_resource(read_instance("i-1")).await.unwrap();
    assert_eq!(state["source"], "real");
    assert_eq!(real.calls(), 1);
}

/// Keys fakes by resource type only, so one fake answers for every id
struct AnyInstanceDeriver;

impl KeyDeriver for AnyInstanceDeriver {
    fn derive(&self, descriptor: &RequestDescriptor) -> FakeKey {
        FakeKey::new(format!("{}:{}", descriptor.operation, descriptor.resource_type))
    }
}

#[tokio::test]
async fn test_custom_key_deriver_drives_interception() {
    init_tracing();
    let real = Arc::new(RecordingProvider::new());
    let store = FakeStore::with_key_deriver(Arc::new(AnyInstanceDeriver));
    let session = Arc::new(FakeSession::with_store(FakerConfig::for_tests(), store).unwrap());
    let provider = FakingProvider::new(Arc::clone(&real), Arc::clone(&session));

    let descriptor = RequestDescriptor::read("aws_instance").with_param("id", "i-1");
    let key = session
        .set_fake_data(&descriptor, json!({"any": true}), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(key, session.key_for(&descriptor));

    for id in ["i-1", "i-2", "i-3"] {
        let state = provider.read_resource(read_instance(id)).await.unwrap();
        assert_eq!(state, json!({"any": true}));
    }
    assert_eq!(real.calls(), 0);

    assert!(session.clear_fake_data(&descriptor).await);
    let state = provider.read_resource(read_instance("i-1")).await.unwrap();
    assert_eq!(state["source"], "real");
    assert_eq!(real.calls(), 1);
}
