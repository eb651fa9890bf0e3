#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;

use std::env;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;

pub mod schema;
mod api;
mod database;
mod error;
mod models;

pub type DbConnection = PgConnection;
pub type DbPool = Pool<ConnectionManager<DbConnection>>;

pub struct AppState {
    pub db_pool: DbPool,
}

embed_migrations!();

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let manager = ConnectionManager::<DbConnection>::new(database_url);
    let db_pool = Pool::new(manager).expect("Failed to create pool.");
    {
        let connection = db_pool.get().expect("Failed to check out a connection.");
        embedded_migrations::run(&*connection).expect("Failed to run migrations.");
    }
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_owned());
    tracing::info!("listening on {}", bind_addr);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_header("Content-Type")
            .max_age(3600);
        App::new()
            .app_data(web::Data::new(AppState {
                db_pool: db_pool.clone(),
            }))
            .app_data(web::JsonConfig::default().error_handler(api::common::json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(api::common::query_error_handler))
            .app_data(web::PathConfig::default().error_handler(api::common::path_error_handler))
            .wrap(Logger::default())
            .wrap(cors)
            .service(api::get_service())
    })
    .bind(&bind_addr)?
    .run()
    .await
}
