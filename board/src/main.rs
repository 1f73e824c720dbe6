mod api;
mod app;
mod config;
mod constants;
mod errors;
mod events;
mod models;
mod resources;
mod services;
mod tasks;
#[cfg(test)]
mod testing;

use actix_web::middleware::Logger;
use actix_web::{web, App as ActixWebApp, HttpServer};
use api::*;
use app::App;

#[tokio::main]
async fn main() {
    App::init_logger();

    let app = App::new().await;
    let port = app.port();

    app.init().await;
    let app_web_data = web::Data::new(app);
    let server_web_data = app_web_data.clone();

    let server = HttpServer::new(move || {
        ActixWebApp::new()
            .wrap(Logger::new("%a %r %s %b %{Referer}i %{User-Agent}i %T"))
            .app_data(server_web_data.clone())
            .service(
                web::scope("/likes")
                    .service(create_like)
                    .service(get_like_count)
                    .service(reconcile_like_count),
            )
    })
    .bind(("0.0.0.0", port))
    .unwrap_or_else(|e| panic!("Could not bind to port {}.\n{}", port, e))
    .run()
    .await;

    if let Err(e) = server {
        log::error!("Server stopped with error: {}", e);
    }

    // let queued likes finish before exit
    if let Err(e) = app_web_data.like_pipeline.shutdown().await {
        log::error!("Like pipeline did not shut down cleanly: {}", e);
    }
}
