pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::Marketplace;
pub use config::{Config, ConfigError};
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::shops::register_vendor,
        handlers::shops::list_shops,
        handlers::shops::get_shop,
        handlers::shops::update_shop,
        handlers::shops::order_stats,
        handlers::shops::product_stats,
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::related_products,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::transition_order,
        handlers::stories::list_stories,
        handlers::stories::featured_story,
        handlers::profiles::me,
    ),
    tags(
        (name = "shops", description = "Vendor storefronts"),
        (name = "products", description = "Catalog"),
        (name = "orders", description = "Checkout and fulfilment"),
        (name = "stories", description = "Editorial vendor stories"),
        (name = "profiles", description = "Signed-in users"),
    )
)]
pub struct ApiDoc;

/// Registers every marketplace route. Expects `web::Data<Marketplace>` in
/// the app data.
pub fn routes(cfg: &mut web::ServiceConfig) {
    use handlers::{orders, products, profiles, shops, stories};

    cfg.service(
        web::scope("/shops")
            .route("", web::post().to(shops::register_vendor))
            .route("", web::get().to(shops::list_shops))
            .route("/{id}", web::get().to(shops::get_shop))
            .route("/{id}", web::patch().to(shops::update_shop))
            .route("/{id}/order-stats", web::get().to(shops::order_stats))
            .route("/{id}/product-stats", web::get().to(shops::product_stats)),
    )
    .service(
        web::scope("/products")
            .route("", web::post().to(products::create_product))
            .route("", web::get().to(products::list_products))
            .route("/{id}", web::get().to(products::get_product))
            .route("/{id}", web::patch().to(products::update_product))
            .route("/{id}", web::delete().to(products::delete_product))
            .route("/{id}/related", web::get().to(products::related_products)),
    )
    .service(
        web::scope("/orders")
            .route("", web::post().to(orders::create_order))
            .route("", web::get().to(orders::list_orders))
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}", web::patch().to(orders::update_order))
            .route("/{id}/status", web::post().to(orders::transition_order)),
    )
    .service(
        web::scope("/stories")
            .route("", web::get().to(stories::list_stories))
            .route("/featured", web::get().to(stories::featured_story)),
    )
    .route("/me", web::get().to(profiles::me));
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    market: Marketplace,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let market = web::Data::new(market);
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(market.clone())
            .wrap(Logger::default())
            .configure(routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
