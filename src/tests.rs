//! Integration tests for the storefront backend.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::fetch::CatalogFetcher;
use crate::{create_router, AppState};

/// In-process stand-in for the catalog REST backend.
struct FakeBackend {
    categories: Mutex<Value>,
    products: Mutex<Value>,
    news: Mutex<Value>,
    failing: AtomicBool,
    category_hits: AtomicUsize,
}

impl FakeBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            categories: Mutex::new(sample_categories()),
            products: Mutex::new(sample_products()),
            news: Mutex::new(json!([])),
            failing: AtomicBool::new(false),
            category_hits: AtomicUsize::new(0),
        })
    }

    fn empty() -> Arc<Self> {
        let backend = Self::new();
        *backend.categories.lock().unwrap() = json!([]);
        *backend.products.lock().unwrap() = json!([]);
        backend
    }

    fn respond(&self, body: &Mutex<Value>) -> axum::response::Response {
        if self.failing.load(Ordering::SeqCst) {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
        Json(body.lock().unwrap().clone()).into_response()
    }

    async fn serve(self: Arc<Self>) -> String {
        let app = Router::new()
            .route(
                "/categories",
                get(|State(backend): State<Arc<FakeBackend>>| async move {
                    backend.category_hits.fetch_add(1, Ordering::SeqCst);
                    backend.respond(&backend.categories)
                }),
            )
            .route(
                "/products",
                get(|State(backend): State<Arc<FakeBackend>>| async move {
                    backend.respond(&backend.products)
                }),
            )
            .route(
                "/news",
                get(|State(backend): State<Arc<FakeBackend>>| async move {
                    backend.respond(&backend.news)
                }),
            )
            .with_state(self);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }
}

fn sample_categories() -> Value {
    json!([
        {
            "id": 10,
            "name": { "en": "Drugs", "hy": "Դեղեր", "ru": "Препараты" },
            "subcategories": [
                { "id": 100, "name": { "en": "Antibiotics", "hy": "Հակաբիոտիկներ", "ru": "Антибиотики" } },
                { "id": 101, "name": { "en": "Vaccines", "hy": "Պատվաստանյութեր", "ru": "Вакцины" } }
            ]
        },
        {
            "id": 20,
            "name": { "en": "Feed", "hy": "Կերեր", "ru": "Корма" },
            "subcategories": []
        }
    ])
}

fn sample_product(id: i64, category_id: i64, subcategory_id: Option<i64>, maker: &str) -> Value {
    json!({
        "id": id,
        "name": { "en": format!("Product {}", id), "hy": format!("Ապրանք {}", id), "ru": "" },
        "description": { "en": "", "hy": "", "ru": "" },
        "price": 1000 * id,
        "stock": 5,
        "manufacturer": maker,
        "image_url": "",
        "is_new": false,
        "created_at": "2025-01-01T00:00:00Z",
        "types_id": 1,
        "category_id": category_id,
        "subcategory_id": subcategory_id,
        "features": []
    })
}

fn sample_products() -> Value {
    json!([
        sample_product(1, 10, Some(100), "A"),
        sample_product(2, 10, Some(101), "B"),
        sample_product(3, 20, None, "A"),
        sample_product(4, 10, None, "A")
    ])
}

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    backend: Arc<FakeBackend>,
    temp_dir: Arc<TempDir>,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_backend(FakeBackend::new()).await
    }

    async fn with_backend(backend: Arc<FakeBackend>) -> Self {
        let temp_dir = Arc::new(TempDir::new().expect("Failed to create temp dir"));
        Self::start(backend, temp_dir, None, Duration::ZERO).await
    }

    async fn start(
        backend: Arc<FakeBackend>,
        temp_dir: Arc<TempDir>,
        admin_token: Option<String>,
        stale_time: Duration,
    ) -> Self {
        let api_url = backend.clone().serve().await;
        let db_path = temp_dir.path().join("test.sqlite");

        let config = Config {
            api_url,
            admin_token,
            db_path: db_path.clone(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            categories_stale_time: stale_time,
            products_stale_time: stale_time,
            fetch_retries: 0,
            fetch_timeout: Duration::from_secs(5),
        };

        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));
        let storefront = repo.load_storefront().await.expect("Failed to rehydrate");
        let catalog = Arc::new(CatalogFetcher::new(&config).expect("Failed to build client"));

        let state = AppState {
            storefront: Arc::new(RwLock::new(storefront)),
            catalog,
            repo,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for servers to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url: format!("http://{}", addr),
            backend,
            temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Value {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), 200, "GET {}", path);
        resp.json().await.unwrap()
    }

    async fn post(&self, path: &str) -> Value {
        let resp = self.client.post(self.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), 200, "POST {}", path);
        resp.json().await.unwrap()
    }

    async fn product_ids(&self) -> Vec<i64> {
        let body = self.get("/api/products").await;
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_i64().unwrap())
            .collect()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_cors_headers_applied() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/filters"))
        .header("Origin", "http://shop.example")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_sections_follow_language() {
    let fixture = TestFixture::new().await;

    let before = fixture.get("/api/sections").await;
    assert_eq!(before["success"], true);
    assert_eq!(before["data"][0]["section"], "Դեղեր");
    assert_eq!(before["data"][0]["subsections"][1]["name"], "Պատվաստանյութեր");
    assert_eq!(before["data"][1]["subsections"], json!([]));

    let ru = fixture
        .client
        .put(fixture.url("/api/language"))
        .json(&json!({ "language": "ru" }))
        .send()
        .await
        .unwrap();
    let ru_body: Value = ru.json().await.unwrap();
    assert_eq!(ru_body["data"]["language"], "ru");
    assert_eq!(ru_body["data"]["sections"][0]["section"], "Препараты");

    fixture
        .client
        .put(fixture.url("/api/language"))
        .json(&json!({ "language": "hy" }))
        .send()
        .await
        .unwrap();

    let after = fixture.get("/api/sections").await;
    assert_eq!(after["data"], before["data"]);
}

#[tokio::test]
async fn test_unsupported_language_rejected() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .put(fixture.url("/api/language"))
        .json(&json!({ "language": "de" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_category_highlight_toggle() {
    let fixture = TestFixture::new().await;

    let toggled = fixture.post("/api/categories/20/toggle").await;
    assert_eq!(toggled["data"]["activeCategory"], 20);
    assert_eq!(toggled["data"]["sections"][1]["active"], true);
    assert_eq!(toggled["data"]["sections"][0]["active"], false);

    let cleared = fixture.post("/api/categories/20/toggle").await;
    assert!(cleared["data"]["activeCategory"].is_null());

    let resp = fixture
        .client
        .put(fixture.url("/api/categories/active"))
        .json(&json!({ "categoryId": 10 }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["sections"][0]["active"], true);
}

#[tokio::test]
async fn test_mutations_on_fresh_session_return_sections() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .put(fixture.url("/api/language"))
        .json(&json!({ "language": "en" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["sections"][0]["section"], "Drugs");
    assert_eq!(body["data"]["sections"][1]["section"], "Feed");

    let second = TestFixture::new().await;
    let resp = second
        .client
        .put(second.url("/api/categories/active"))
        .json(&json!({ "categoryId": 20 }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["sections"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["sections"][1]["active"], true);
}

#[tokio::test]
async fn test_category_mutation_succeeds_while_backend_down() {
    let backend = FakeBackend::new();
    backend.failing.store(true, Ordering::SeqCst);
    let fixture = TestFixture::with_backend(backend).await;

    let body = fixture.post("/api/categories/10/toggle").await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["activeCategory"], 10);
    assert_eq!(body["data"]["sections"], json!([]));

    // Once the backend recovers the highlight shows up in the projection.
    fixture.backend.failing.store(false, Ordering::SeqCst);
    let catalog = fixture.get("/api/catalog").await;
    assert_eq!(catalog["data"]["sections"][0]["active"], true);
}

#[tokio::test]
async fn test_toggle_section_twice_clears_selection() {
    let fixture = TestFixture::new().await;

    fixture.post("/api/filters/sections/5/toggle").await;
    fixture.post("/api/filters/subsections/50/toggle").await;
    let body = fixture.post("/api/filters/sections/5/toggle").await;

    assert!(body["data"]["selectedSectionId"].is_null());
    assert_eq!(body["data"]["selectedSubsectionIds"], json!([]));
    assert_eq!(body["data"]["activeCount"], 0);
}

#[tokio::test]
async fn test_filters_compose_with_and() {
    let fixture = TestFixture::new().await;

    assert_eq!(fixture.product_ids().await, vec![1, 2, 3, 4]);

    fixture.post("/api/filters/sections/10/toggle").await;
    fixture
        .client
        .post(fixture.url("/api/filters/creators/toggle"))
        .json(&json!({ "name": "A" }))
        .send()
        .await
        .unwrap();
    assert_eq!(fixture.product_ids().await, vec![1, 4]);

    // Product 4 has no subcategory and drops out once a subsection is chosen.
    fixture.post("/api/filters/subsections/100/toggle").await;
    assert_eq!(fixture.product_ids().await, vec![1]);

    let filters = fixture.get("/api/filters").await;
    assert_eq!(filters["data"]["activeCount"], 3);
}

#[tokio::test]
async fn test_clear_filters_restores_full_list() {
    let fixture = TestFixture::new().await;

    fixture.post("/api/filters/sections/3/toggle").await;
    fixture.post("/api/filters/subsections/30/toggle").await;
    fixture
        .client
        .post(fixture.url("/api/filters/creators/toggle"))
        .json(&json!({ "name": "X" }))
        .send()
        .await
        .unwrap();
    assert!(fixture.product_ids().await.is_empty());

    let resp = fixture
        .client
        .delete(fixture.url("/api/filters"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["selectedSectionId"].is_null());
    assert_eq!(body["data"]["selectedSubsectionIds"], json!([]));
    assert_eq!(body["data"]["creators"], json!([]));

    assert_eq!(fixture.product_ids().await, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_products_are_localized() {
    let fixture = TestFixture::new().await;

    let body = fixture.get("/api/products").await;
    let first = &body["data"][0];
    assert_eq!(first["name"], "Ապրանք 1");
    assert_eq!(first["section"], "Դեղեր");
    assert_eq!(first["subsection"], "Հակաբիոտիկներ");
    assert_eq!(first["image"], "/placeholder-product.jpg");
    assert_eq!(first["categoryId"], 10);
    assert_eq!(first["rawProduct"]["manufacturer"], "A");

    // Russian product names are blank and fall back to Armenian.
    fixture
        .client
        .put(fixture.url("/api/language"))
        .json(&json!({ "language": "ru" }))
        .send()
        .await
        .unwrap();
    let product = fixture.get("/api/products/2").await;
    assert_eq!(product["data"]["name"], "Ապրանք 2");
    assert_eq!(product["data"]["subsection"], "Вакцины");
}

#[tokio::test]
async fn test_unknown_product_not_found() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/products/999"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_manufacturers_listed_once() {
    let fixture = TestFixture::new().await;

    let body = fixture.get("/api/manufacturers").await;

    assert_eq!(body["data"], json!(["A", "B"]));
}

#[tokio::test]
async fn test_empty_catalog_is_not_an_error() {
    let fixture = TestFixture::with_backend(FakeBackend::empty()).await;

    fixture.post("/api/filters/sections/1/toggle").await;
    fixture.post("/api/filters/subsections/2/toggle").await;

    let sections = fixture.get("/api/sections").await;
    assert_eq!(sections["data"], json!([]));
    assert!(fixture.product_ids().await.is_empty());
}

#[tokio::test]
async fn test_select_section_highlights_category() {
    let fixture = TestFixture::new().await;

    let body = fixture.post("/api/filters/sections/10/select").await;
    assert_eq!(body["data"]["selectedSectionId"], 10);

    let catalog = fixture.get("/api/catalog").await;
    assert_eq!(catalog["data"]["activeCategory"], 10);
    assert_eq!(catalog["data"]["sections"][0]["active"], true);

    fixture.post("/api/filters/sections/10/select").await;
    let catalog = fixture.get("/api/catalog").await;
    assert!(catalog["data"]["activeCategory"].is_null());
}

#[tokio::test]
async fn test_refetch_replaces_tree_and_keeps_stale_selection() {
    let fixture = TestFixture::new().await;

    fixture.post("/api/filters/sections/20/toggle").await;
    assert_eq!(fixture.product_ids().await, vec![3]);

    *fixture.backend.categories.lock().unwrap() = json!([
        { "id": 10, "name": { "en": "Drugs", "hy": "Դեղեր", "ru": "Препараты" }, "subcategories": [] }
    ]);
    *fixture.backend.products.lock().unwrap() =
        json!([sample_product(1, 10, None, "A")]);

    let sections = fixture.get("/api/sections").await;
    assert_eq!(sections["data"].as_array().unwrap().len(), 1);

    // The removed category stays selected and simply matches nothing.
    let filters = fixture.get("/api/filters").await;
    assert_eq!(filters["data"]["selectedSectionId"], 20);
    assert!(fixture.product_ids().await.is_empty());
}

#[tokio::test]
async fn test_categories_cached_until_invalidated() {
    let backend = FakeBackend::new();
    let temp_dir = Arc::new(TempDir::new().unwrap());
    let fixture =
        TestFixture::start(backend, temp_dir, None, Duration::from_secs(300)).await;

    fixture.get("/api/sections").await;
    fixture.get("/api/sections").await;
    fixture.get("/api/catalog").await;
    assert_eq!(fixture.backend.category_hits.load(Ordering::SeqCst), 1);

    // Language switches re-project without fetching.
    fixture
        .client
        .put(fixture.url("/api/language"))
        .json(&json!({ "language": "en" }))
        .send()
        .await
        .unwrap();
    assert_eq!(fixture.backend.category_hits.load(Ordering::SeqCst), 1);

    fixture.post("/api/admin/catalog/invalidate").await;
    let sections = fixture.get("/api/sections").await;
    assert_eq!(sections["data"][0]["section"], "Drugs");
    assert_eq!(fixture.backend.category_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_upstream_failure_serves_previous_data() {
    let fixture = TestFixture::new().await;

    assert_eq!(fixture.product_ids().await, vec![1, 2, 3, 4]);
    fixture.backend.failing.store(true, Ordering::SeqCst);

    assert_eq!(fixture.product_ids().await, vec![1, 2, 3, 4]);
    let sections = fixture.get("/api/sections").await;
    assert_eq!(sections["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_upstream_failure_without_data_is_bad_gateway() {
    let backend = FakeBackend::new();
    backend.failing.store(true, Ordering::SeqCst);
    let fixture = TestFixture::with_backend(backend).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/products"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");

    // Local state is still served.
    let filters = fixture.get("/api/filters").await;
    assert_eq!(filters["success"], true);
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let temp_dir = Arc::new(TempDir::new().unwrap());
    let fixture = TestFixture::start(
        FakeBackend::new(),
        temp_dir,
        Some("admin-secret".to_string()),
        Duration::ZERO,
    )
    .await;

    let missing = fixture
        .client
        .post(fixture.url("/api/admin/catalog/invalidate"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 401);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let wrong = fixture
        .client
        .post(fixture.url("/api/admin/catalog/invalidate"))
        .bearer_auth("nope")
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), 401);

    let ok = fixture
        .client
        .post(fixture.url("/api/admin/catalog/invalidate"))
        .bearer_auth("admin-secret")
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), 200);

    // Storefront routes stay public.
    fixture.get("/api/filters").await;
}

#[tokio::test]
async fn test_cart_flow() {
    let fixture = TestFixture::new().await;
    let product = json!({ "id": 7, "name": "Vaccine Plus", "price": 8500.0 });

    fixture
        .client
        .post(fixture.url("/api/cart/items"))
        .json(&json!({ "product": product }))
        .send()
        .await
        .unwrap();
    let resp = fixture
        .client
        .post(fixture.url("/api/cart/items"))
        .json(&json!({ "product": product, "quantity": 2 }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["itemCount"], 3);
    assert_eq!(body["data"]["subtotal"], 25500.0);
    assert_eq!(body["data"]["total"], 25515.0);

    let body = fixture.post("/api/cart/items/7/decrease").await;
    assert_eq!(body["data"]["items"][0]["quantity"], 2);

    let resp = fixture
        .client
        .put(fixture.url("/api/cart/items/7"))
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"], json!([]));
    assert_eq!(body["data"]["total"], 15.0);

    let resp = fixture
        .client
        .post(fixture.url("/api/cart/items"))
        .json(&json!({ "product": product, "quantity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .delete(fixture.url("/api/cart"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 0.0);
}

#[tokio::test]
async fn test_revision_increments_on_mutations() {
    let fixture = TestFixture::new().await;

    let initial = fixture.get("/api/revision").await;
    let initial_revision = initial["data"]["revisionId"].as_i64().unwrap();

    let toggled = fixture.post("/api/filters/sections/10/toggle").await;
    assert_eq!(toggled["revisionId"].as_i64().unwrap(), initial_revision + 1);

    fixture.post("/api/categories/10/toggle").await;
    let after = fixture.get("/api/revision").await;
    assert_eq!(after["data"]["revisionId"].as_i64().unwrap(), initial_revision + 2);

    // Reads do not count.
    fixture.get("/api/products").await;
    let filters = fixture.get("/api/filters").await;
    assert_eq!(filters["revisionId"].as_i64().unwrap(), initial_revision + 2);
}

#[tokio::test]
async fn test_state_survives_restart() {
    let first = TestFixture::new().await;

    first
        .client
        .put(first.url("/api/language"))
        .json(&json!({ "language": "en" }))
        .send()
        .await
        .unwrap();
    first.post("/api/categories/20/toggle").await;
    first.post("/api/filters/sections/10/toggle").await;
    first.post("/api/filters/subsections/100/toggle").await;
    first
        .client
        .post(first.url("/api/cart/items"))
        .json(&json!({ "product": { "id": 1, "name": "Syringes", "price": 100.0 }, "quantity": 3 }))
        .send()
        .await
        .unwrap();

    let second = TestFixture::start(
        FakeBackend::new(),
        first.temp_dir.clone(),
        None,
        Duration::ZERO,
    )
    .await;

    let filters = second.get("/api/filters").await;
    assert_eq!(filters["data"]["selectedSectionId"], 10);
    assert_eq!(filters["data"]["selectedSubsectionIds"], json!([100]));

    let catalog = second.get("/api/catalog").await;
    assert_eq!(catalog["data"]["language"], "en");
    assert_eq!(catalog["data"]["activeCategory"], 20);
    assert_eq!(catalog["data"]["sections"][0]["section"], "Drugs");
    assert_eq!(catalog["data"]["sections"][1]["active"], true);

    let cart = second.get("/api/cart").await;
    assert_eq!(cart["data"]["itemCount"], 3);
    assert_eq!(cart["data"]["subtotal"], 300.0);
    assert_eq!(cart["data"]["total"], 315.0);

    assert_eq!(second.product_ids().await, vec![1]);
}
