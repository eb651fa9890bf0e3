use actix_web::dev::HttpServiceFactory;
use actix_web::web;

pub mod common;

mod chapter;
mod novel;
mod tag;
mod translator;

pub fn get_service() -> impl HttpServiceFactory {
    web::scope("/api")
        .configure(translator::configure)
        .configure(novel::configure)
        .configure(chapter::configure)
        .configure(tag::configure)
}
