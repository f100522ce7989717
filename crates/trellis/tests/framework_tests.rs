//! Integration tests for the application context

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use trellis::dataview::TransportResult;
use trellis::prelude::*;
use trellis::{modules, RegionsConfig};

struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&self, _region: &str, _view_model: &dyn ViewModel) -> Result<(), String> {
        Ok(())
    }
}

struct Page {
    name: &'static str,
    shown: Arc<Mutex<Vec<Value>>>,
}

impl ViewModel for Page {
    fn name(&self) -> &str {
        self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE.with_show()
    }

    fn show(&self, params: &Params) {
        self.shown.lock().push(params.clone());
    }
}

fn quiet_config() -> FrameworkConfig {
    let mut config = FrameworkConfig::default();
    config.logging.enabled = false;
    config
}

fn framework() -> Framework {
    Framework::new(quiet_config(), Arc::new(NullRenderer)).unwrap()
}

async fn wait_until<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[test]
fn test_modules_are_provided() {
    let app = framework();
    let injector = app.injector();

    let bus = injector.get_as::<Emitter>(modules::BUS).unwrap();
    assert!(bus.ptr_eq(app.bus()));

    let nested = injector.get_as::<Injector>("injector").unwrap();
    assert!(nested.ptr_eq(injector));

    for name in [modules::LOGGER, modules::REGIONS, modules::LISTEN, modules::CONFIG] {
        assert!(injector.contains(name), "{} missing", name);
    }
    assert_eq!(app.regions().default_region(), Some("main".to_string()));
}

#[test]
fn test_no_default_region() {
    let mut config = quiet_config();
    config.regions = RegionsConfig {
        default_region: None,
    };

    let app = Framework::new(config, Arc::new(NullRenderer)).unwrap();
    assert!(app.regions().is_empty());
    app.register_region("side", false).unwrap();
    assert!(matches!(
        app.register_region("side", false),
        Err(FrameworkError::Region(RegionError::AlreadyRegistered(_)))
    ));
}

#[tokio::test]
async fn test_navigate_shows_routed_view_models() {
    let app = framework();
    let side = app.register_region("side", false).unwrap();
    let shown = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&shown);
    app.provide_view_model("homeViewModel", move || Page {
        name: "home",
        shown: Arc::clone(&sink),
    });
    let sink = Arc::clone(&shown);
    app.provide_view_model("menuViewModel", move || Page {
        name: "menu",
        shown: Arc::clone(&sink),
    });

    app.navigate(
        json!({ "main": "homeViewModel", "side": "menuViewModel" }),
        json!({ "id": 3 }),
    );

    let main = app.regions().part("main").unwrap();
    wait_until(|| main.state() == PartState::Showing && side.state() == PartState::Showing).await;
    assert_eq!(*shown.lock(), vec![json!({ "id": 3 }), json!({ "id": 3 })]);
}

#[tokio::test]
async fn test_reset_keeps_router_and_drops_singletons() {
    let app = framework();
    let built = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built);
    app.injector().singleton(
        "counter",
        Creator::factory(move || counter.fetch_add(1, Ordering::SeqCst)),
    );
    app.injector().get("counter").unwrap();

    let listener_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&listener_calls);
    let _subscription = app.bus().subscribe("custom", move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
    });

    app.reset();

    app.bus().publish_empty("custom");
    assert_eq!(listener_calls.load(Ordering::SeqCst), 0);

    app.injector().get("counter").unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 2);

    assert_eq!(app.bus().subscriber_count(ROUTE_NAVIGATED), 1);
    let shown = Arc::new(Mutex::new(Vec::new()));
    app.provide_view_model_instance(
        "homeViewModel",
        Arc::new(Page {
            name: "home",
            shown: Arc::clone(&shown),
        }),
    );
    app.navigate(json!({ "main": "homeViewModel" }), json!({}));

    let main = app.regions().part("main").unwrap();
    wait_until(|| main.state() == PartState::Showing).await;
    assert_eq!(shown.lock().len(), 1);
}

#[test]
fn test_drop_detaches_router() {
    let app = framework();
    let bus = app.bus().clone();
    assert_eq!(bus.subscriber_count(ROUTE_NAVIGATED), 1);

    drop(app);
    assert_eq!(bus.subscriber_count(ROUTE_NAVIGATED), 0);
}

struct Canned {
    urls: Mutex<Vec<String>>,
}

#[async_trait]
impl Transport for Canned {
    async fn get(&self, url: &str) -> TransportResult<Value> {
        self.urls.lock().push(url.to_string());
        Ok(json!({ "d": { "results": [{ "id": 1 }, { "id": 2 }], "__count": "12" } }))
    }

    async fn post(&self, _url: &str, body: &Value) -> TransportResult<Value> {
        Ok(body.clone())
    }
}

#[test]
fn test_remote_view_requires_transport() {
    let app = framework();
    assert!(matches!(
        app.remote_view::<Value>(Some("Items")),
        Err(FrameworkError::Inject(InjectError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_remote_view_uses_configured_root() {
    let mut config = quiet_config();
    config.remote.root_url = "/odata".to_string();
    config.remote.default_operation = Some("Items".to_string());

    let app = Framework::new(config, Arc::new(NullRenderer)).unwrap();
    let transport = Arc::new(Canned {
        urls: Mutex::new(Vec::new()),
    });
    app.set_transport(transport.clone());

    let mut view = app.remote_view::<Value>(None).unwrap();
    view.page(2).page_size(5).load().await.unwrap();

    assert_eq!(
        *transport.urls.lock(),
        vec!["/odata/Items?$skip=5&$take=5&$inlinecount=allpages".to_string()]
    );
    assert_eq!(view.total_count(), 12);
    assert_eq!(view.page_count(), 3);
    assert_eq!(app.listen().in_flight(), 0);
}
