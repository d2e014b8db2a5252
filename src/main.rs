use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::{
    sync::{Arc, LazyLock},
    time::Duration,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::{
    configs::{AuthConfig, EditorConfig, StorageConfig, connect_database},
    middlewares::{authentication, authorization},
    modules::{
        access::service::AccessResolver,
        editor::{fetcher::HttpContentFetcher, service::EditorService},
        file::{repository_pg::FilePgRepository, service::StorageService},
        friend::repository_pg::FriendRepositoryPg,
        share::{repository_pg::SharePgRepository, service::ShareService},
        user::schema::UserRole,
    },
    utils::SystemClock,
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

fn init_tracing() -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter).with(fmt::layer());

    // `log` records already go through env_logger.
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| std::io::Error::other(format!("Tracing init error: {e}")))
}

#[actix_web::get("/health")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let env = &*ENV;
    init_tracing()?;

    let db_pool = connect_database(&env.database_url)
        .await
        .map_err(|_| std::io::Error::other("Database connection error"))?;

    let file_repo = FilePgRepository::new(db_pool.clone());
    let share_repo = SharePgRepository::new(db_pool.clone());
    let friend_repo = FriendRepositoryPg::new(db_pool.clone());

    let fetcher = HttpContentFetcher::new(Duration::from_secs(60))
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let storage = StorageService::with_dependencies(Arc::new(file_repo), StorageConfig::from_env(env));
    let share_service = ShareService::with_dependencies(
        Arc::new(share_repo),
        Arc::new(friend_repo),
        storage.clone(),
        Arc::new(SystemClock),
    );
    let access = AccessResolver::with_dependencies(storage.clone(), share_service.clone());
    let editor = EditorService::with_dependencies(
        access.clone(),
        storage.clone(),
        Arc::new(fetcher),
        EditorConfig::from_env(env),
    );
    let auth = AuthConfig::from_env(env);

    log::info!("Starting server at http://{}:{}", env.ip, env.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&ENV.frontend_url)
            .allow_any_method()
            .allow_any_header()
            .expose_headers(["Content-Disposition", "X-Filename"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(auth.clone()))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(share_service.clone()))
            .app_data(web::Data::new(access.clone()))
            .app_data(web::Data::new(editor.clone()))
            .service(
                web::scope("/api")
                    .service(health_check)
                    .configure(modules::share::route::public_api_configure)
                    .configure(modules::file::route::public_api_configure)
                    .configure(modules::editor::route::public_api_configure)
                    .service(
                        web::scope("")
                            .wrap(from_fn(authentication))
                            .configure(modules::file::route::configure)
                            .configure(modules::share::route::configure)
                            .service(
                                web::scope("/admin")
                                    .wrap(from_fn(authorization(vec![UserRole::Admin])))
                                    .configure(modules::file::route::admin_configure),
                            ),
                    ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
