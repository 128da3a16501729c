use actix_web::{middleware, web, App, HttpServer};
use vibememory_api::config::{Config, Opts};
use vibememory_api::handlers;

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    let (_handle, _opt) = Opts::parse_from_args()?;
    let state = Config::parse_from_env()?.into_state()?;
    let port = state.config.port;

    log::info!("serving model {} on port {}", state.config.model, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::PathConfig::default())
            .app_data(web::JsonConfig::default())
            .app_data(web::QueryConfig::default())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .default_service(web::route().to(handlers::not_found))
            .configure(handlers::init)
    })
    .keep_alive(std::time::Duration::from_secs(300))
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
