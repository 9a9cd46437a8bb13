use std::env;
use std::sync::Arc;

use lostfound_matcher::db::establish_connection_pool;
use lostfound_matcher::models::config::ServerConfig;
use lostfound_matcher::processing::ZMQMessage;
use lostfound_matcher::processing::archive::Archiver;
use lostfound_matcher::processing::caption::HttpCaptioner;
use lostfound_matcher::processing::embedding::FastTextEmbedder;
use lostfound_matcher::processing::found_item::process_found_item_message;
use lostfound_matcher::processing::intake::ImageStore;
use lostfound_matcher::processing::lost_item::process_lost_item_message;
use lostfound_matcher::processing::matching::MatchingEngine;
use lostfound_matcher::processing::notifier::SmtpNotifier;
use lostfound_matcher::repository::DieselRepository;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config_path = env::var("APP_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    let config = match ServerConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration from {config_path}: {e}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let embedder = match FastTextEmbedder::try_new(&config.embedding) {
        Ok(embedder) => embedder,
        Err(e) => {
            log::error!("Failed to load embedding model {}: {e}", config.embedding.model);
            std::process::exit(1);
        }
    };

    let notifier = match SmtpNotifier::new(&config.smtp) {
        Ok(notifier) => notifier,
        Err(e) => {
            log::error!("Failed to configure mail relay {}: {e}", config.smtp.host);
            std::process::exit(1);
        }
    };

    let captioner = match HttpCaptioner::new(&config.captioner) {
        Ok(captioner) => Arc::new(captioner),
        Err(e) => {
            log::error!("Failed to configure captioner: {e}");
            std::process::exit(1);
        }
    };

    let images = Arc::new(ImageStore::new(config.storage.unmatched_dir.clone()));
    let engine = Arc::new(MatchingEngine::new(
        DieselRepository::new(pool),
        embedder,
        notifier,
        Archiver::new(config.storage.matched_dir.clone()),
    ));

    let context = zmq::Context::new();
    let responder = match context.socket(zmq::PULL) {
        Ok(socket) => socket,
        Err(e) => {
            log::error!("Cannot create zmq socket: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = responder.bind(&config.zmq_address) {
        log::error!("Cannot bind to {}: {e}", config.zmq_address);
        std::process::exit(1);
    }
    log::info!("Listening for submissions on {}", config.zmq_address);

    loop {
        let msg = match responder.recv_bytes(0) {
            Ok(msg) => msg,
            Err(e) => {
                log::error!("Failed to receive message: {e}");
                continue;
            }
        };
        match serde_json::from_slice::<ZMQMessage>(&msg) {
            Ok(parsed) => {
                let engine = Arc::clone(&engine);
                let captioner = Arc::clone(&captioner);
                let images = Arc::clone(&images);
                tokio::spawn(async move {
                    match parsed {
                        ZMQMessage::FoundItem(found) => {
                            process_found_item_message(
                                found,
                                engine.as_ref(),
                                captioner.as_ref(),
                                images.as_ref(),
                            )
                            .await
                        }
                        ZMQMessage::LostItem(lost) => {
                            process_lost_item_message(lost, engine.as_ref()).await
                        }
                    }
                });
            }
            Err(e) => log::error!("Failed to parse JSON: {e}"),
        }
    }
}
