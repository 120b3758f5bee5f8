use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use chatdesk::app_config::AppConfig;
use chatdesk::storage::{LocalStorage, StorageBackend};
use env_logger::Env;
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_lib_mods();

    let config = AppConfig::load_or_default();

    let db = chatdesk::db::connect(
        &std::env::var("DATABASE_URL").expect("DATABASE_URL must be set."),
    )
    .await
    .expect("Failed to connect to the database.");
    chatdesk::db::create_chat_tables(&db)
        .await
        .expect("Failed to create chat tables.");

    let secret_key = match std::env::var("SECRET_KEY") {
        Ok(key) => Key::try_from(key.as_bytes()).unwrap_or_else(|err| {
            log::warn!("SECRET_KEY was rejected: {}. Generating a temporary key.", err);
            Key::generate()
        }),
        Err(err) => {
            let random_string: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(128)
                .map(char::from)
                .collect();
            log::warn!("SECRET_KEY was invalid. Reason: {:?}\r\nSession cookies will be invalidated every time the application restarts. A secret key must be at least 64 bytes to be accepted.\r\n\r\nNeed a key? How about:\r\n{}", err, random_string);
            Key::from(random_string.as_bytes())
        }
    };

    let storage: Data<dyn StorageBackend> =
        Data::from(Arc::new(LocalStorage::new(&config.upload.folder)) as Arc<dyn StorageBackend>);

    let bind = config.server.bind.clone();
    let workers = config.server.workers;
    let db = Data::new(db);
    let config = Data::new(config);

    log::info!("Listening on {}", bind);

    let mut server = HttpServer::new(move || {
        // Middleware runs in reverse order of registration.
        App::new()
            .app_data(db.clone())
            .app_data(config.clone())
            .app_data(storage.clone())
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_name(config.session.cookie_name.clone())
                    .cookie_same_site(SameSite::Lax)
                    .cookie_secure(config.session.cookie_secure)
                    .build(),
            )
            .wrap(Logger::new("%a %r %s %T"))
            .configure(chatdesk::web::configure)
    });

    if workers > 0 {
        server = server.workers(workers);
    }

    server.bind(bind)?.run().await
}

/// Initialize third party crates we rely on but don't have control over.
fn init_lib_mods() {
    if let Err(err) = dotenv::dotenv() {
        eprintln!("No .env file loaded: {}", err);
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
