//! HTTP surface tests over the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use marketplace_service::infrastructure::MemoryStore;
use marketplace_service::{routes, Marketplace};
use serde_json::{json, Value};

const VENDOR: &str = "vendor-1";

fn shop_body(name: &str) -> Value {
    json!({
        "name": name,
        "ownerName": "Nasreen Bibi",
        "email": "nasreen@example.pk",
        "phone": "+923001112223",
        "address": "Anarkali Bazaar",
        "city": "Lahore",
        "category": "Clothing",
        "description": "Hand embroidery",
        "story": "Started with one sewing machine."
    })
}

fn product_body(shop_id: &str, stock: i64) -> Value {
    json!({
        "shopId": shop_id,
        "name": "Embroidered kurta",
        "description": "Hand-stitched cotton",
        "price": 1000,
        "stock": stock,
        "category": "Kurtas",
        "isAvailable": true
    })
}

fn order_body(product_id: &str, quantity: i64) -> Value {
    json!({
        "productId": product_id,
        "customer": {
            "name": "Ayesha Khan",
            "phone": "+923001234567",
            "address": "House 12, Street 4",
            "city": "Lahore"
        },
        "quantity": quantity,
        "status": "delivered"
    })
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(Marketplace::new(Arc::new(MemoryStore::new()))))
                .configure(routes),
        )
        .await
    };
}

macro_rules! call {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let bytes = test::read_body(resp).await;
        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, body)
    }};
}

fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("id").to_string()
}

#[actix_web::test]
async fn vendor_flow_from_shop_to_delivered_order() {
    let app = app!();

    let (status, shop) = call!(
        app,
        test::TestRequest::post()
            .uri("/shops")
            .insert_header(("X-User-Id", VENDOR))
            .set_json(shop_body("Nasreen Crafts"))
    );
    assert_eq!(status, StatusCode::CREATED);
    let shop_id = id_of(&shop);
    assert_eq!(shop["productsCount"], 0);

    let (status, product) = call!(
        app,
        test::TestRequest::post()
            .uri("/products")
            .insert_header(("X-User-Id", VENDOR))
            .set_json(product_body(&shop_id, 5))
    );
    assert_eq!(status, StatusCode::CREATED);
    let product_id = id_of(&product);

    let (status, order) = call!(
        app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(&product_id, 2))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["amount"], 2000);
    let order_id = id_of(&order);

    for step in ["confirmed", "shipped", "delivered", "delivered"] {
        let (status, moved) = call!(
            app,
            test::TestRequest::post()
                .uri(&format!("/orders/{order_id}/status"))
                .insert_header(("X-User-Id", VENDOR))
                .set_json(json!({ "status": step }))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(moved["status"], step);
    }

    let (_, shop) = call!(app, test::TestRequest::get().uri(&format!("/shops/{shop_id}")));
    assert_eq!(shop["ordersCompleted"], 1);
    assert_eq!(shop["productsCount"], 1);

    let (status, stats) = call!(
        app,
        test::TestRequest::get()
            .uri(&format!("/shops/{shop_id}/order-stats"))
            .insert_header(("X-User-Id", VENDOR))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["delivered"], 1);
    assert_eq!(stats["revenue"], 2000);
}

#[actix_web::test]
async fn skipping_a_status_is_a_conflict() {
    let app = app!();
    let (_, shop) = call!(
        app,
        test::TestRequest::post()
            .uri("/shops")
            .insert_header(("X-User-Id", VENDOR))
            .set_json(shop_body("Nasreen Crafts"))
    );
    let (_, product) = call!(
        app,
        test::TestRequest::post()
            .uri("/products")
            .insert_header(("X-User-Id", VENDOR))
            .set_json(product_body(&id_of(&shop), 5))
    );
    let (_, order) = call!(
        app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(&id_of(&product), 1))
    );

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/orders/{}/status", id_of(&order)))
            .insert_header(("X-User-Id", VENDOR))
            .set_json(json!({ "status": "delivered" }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Cannot move order from pending to delivered");
}

#[actix_web::test]
async fn product_reads_count_views_and_stock_sets_availability() {
    let app = app!();
    let (_, shop) = call!(
        app,
        test::TestRequest::post()
            .uri("/shops")
            .insert_header(("X-User-Id", VENDOR))
            .set_json(shop_body("Nasreen Crafts"))
    );
    let (_, product) = call!(
        app,
        test::TestRequest::post()
            .uri("/products")
            .insert_header(("X-User-Id", VENDOR))
            .set_json(product_body(&id_of(&shop), 0))
    );
    assert_eq!(product["isAvailable"], false);
    let uri = format!("/products/{}", id_of(&product));

    let (status, seen) = call!(app, test::TestRequest::get().uri(&uri));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(seen["views"], 0);
    call!(app, test::TestRequest::get().uri(&uri));

    // Views land off the read path; listing does not count one.
    let listing = format!("/products?shopId={}", id_of(&shop));
    let mut views = Value::Null;
    for _ in 0..100 {
        let (_, listed) = call!(app, test::TestRequest::get().uri(&listing));
        views = listed[0]["views"].clone();
        if views == 2 {
            break;
        }
        actix_web::rt::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(views, 2);

    let (status, updated) = call!(
        app,
        test::TestRequest::patch()
            .uri(&uri)
            .insert_header(("X-User-Id", VENDOR))
            .set_json(json!({ "stock": 3 }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["isAvailable"], true);
    assert_eq!(updated["views"], 2);
}

#[actix_web::test]
async fn writes_need_an_identity_that_manages_the_shop() {
    let app = app!();
    let (_, shop) = call!(
        app,
        test::TestRequest::post()
            .uri("/shops")
            .insert_header(("X-User-Id", VENDOR))
            .set_json(shop_body("Nasreen Crafts"))
    );
    let shop_id = id_of(&shop);

    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri("/products")
            .set_json(product_body(&shop_id, 1))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri("/products")
            .insert_header(("X-User-Id", "shopper-1"))
            .set_json(product_body(&shop_id, 1))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Not permitted to add products");

    let (status, _) = call!(
        app,
        test::TestRequest::patch()
            .uri(&format!("/shops/{shop_id}"))
            .insert_header(("X-User-Id", VENDOR))
            .set_json(json!({ "isFeatured": true }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn invalid_and_missing_resources_map_to_status_codes() {
    let app = app!();
    let (_, shop) = call!(
        app,
        test::TestRequest::post()
            .uri("/shops")
            .insert_header(("X-User-Id", VENDOR))
            .set_json(shop_body("Nasreen Crafts"))
    );

    let mut bad = product_body(&id_of(&shop), 1);
    bad["price"] = json!(0);
    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri("/products")
            .insert_header(("X-User-Id", VENDOR))
            .set_json(bad)
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap_or_default().contains("price"));

    let (status, _) = call!(
        app,
        test::TestRequest::get()
            .uri(&format!("/orders/{}", uuid::Uuid::new_v4()))
            .insert_header(("X-User-Id", VENDOR))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn listing_filters_by_query_parameters() {
    let app = app!();
    let (_, shop) = call!(
        app,
        test::TestRequest::post()
            .uri("/shops")
            .insert_header(("X-User-Id", VENDOR))
            .set_json(shop_body("Nasreen Crafts"))
    );
    let shop_id = id_of(&shop);
    for stock in [0, 2, 4] {
        call!(
            app,
            test::TestRequest::post()
                .uri("/products")
                .insert_header(("X-User-Id", VENDOR))
                .set_json(product_body(&shop_id, stock))
        );
    }

    let (status, listed) = call!(
        app,
        test::TestRequest::get().uri(&format!("/products?shopId={shop_id}&available=true"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(2));

    let (_, shops) = call!(app, test::TestRequest::get().uri("/shops?city=Karachi"));
    assert_eq!(shops.as_array().map(Vec::len), Some(0));

    let (_, me) = call!(
        app,
        test::TestRequest::get()
            .uri("/me")
            .insert_header(("X-User-Id", VENDOR))
    );
    assert_eq!(me["role"], "vendor");
    assert_eq!(me["shopId"], shop_id.as_str());
}

#[actix_web::test]
async fn order_data_needs_the_managing_vendor() {
    let app = app!();
    let (_, shop) = call!(
        app,
        test::TestRequest::post()
            .uri("/shops")
            .insert_header(("X-User-Id", VENDOR))
            .set_json(shop_body("Nasreen Crafts"))
    );
    let shop_id = id_of(&shop);
    let (_, product) = call!(
        app,
        test::TestRequest::post()
            .uri("/products")
            .insert_header(("X-User-Id", VENDOR))
            .set_json(product_body(&shop_id, 5))
    );
    let (_, order) = call!(
        app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(&id_of(&product), 1))
    );

    let reads = [
        format!("/orders?shopId={shop_id}"),
        format!("/orders/{}", id_of(&order)),
        format!("/shops/{shop_id}/order-stats"),
        format!("/shops/{shop_id}/product-stats"),
    ];
    for uri in &reads {
        let (status, body) = call!(app, test::TestRequest::get().uri(uri));
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert!(body.get("customer").is_none());

        let (status, _) = call!(
            app,
            test::TestRequest::get()
                .uri(uri)
                .insert_header(("X-User-Id", "shopper-1"))
        );
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");

        let (status, _) = call!(
            app,
            test::TestRequest::get()
                .uri(uri)
                .insert_header(("X-User-Id", VENDOR))
        );
        assert_eq!(status, StatusCode::OK, "{uri}");
    }

    let (status, _) = call!(
        app,
        test::TestRequest::get()
            .uri("/orders")
            .insert_header(("X-User-Id", VENDOR))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn order_status_filter_accepts_all_and_any_case() {
    let app = app!();
    let (_, shop) = call!(
        app,
        test::TestRequest::post()
            .uri("/shops")
            .insert_header(("X-User-Id", VENDOR))
            .set_json(shop_body("Nasreen Crafts"))
    );
    let shop_id = id_of(&shop);
    let (_, product) = call!(
        app,
        test::TestRequest::post()
            .uri("/products")
            .insert_header(("X-User-Id", VENDOR))
            .set_json(product_body(&shop_id, 5))
    );
    let (_, order) = call!(
        app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(&id_of(&product), 1))
    );
    call!(
        app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(&id_of(&product), 1))
    );
    call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/orders/{}/status", id_of(&order)))
            .insert_header(("X-User-Id", VENDOR))
            .set_json(json!({ "status": "confirmed" }))
    );

    for (status_param, expected) in [("All", 2), ("Pending", 1), ("CONFIRMED", 1), ("", 2)] {
        let (status, listed) = call!(
            app,
            test::TestRequest::get()
                .uri(&format!("/orders?shopId={shop_id}&status={status_param}"))
                .insert_header(("X-User-Id", VENDOR))
        );
        assert_eq!(status, StatusCode::OK, "status={status_param}");
        assert_eq!(listed.as_array().map(Vec::len), Some(expected), "status={status_param}");
    }
}
