use std::error::Error;
use std::path::PathBuf;
use std::sync::Mutex;

use actix_web::{middleware, web, App, HttpServer};
use chrono::Local;
use clap::Parser;
use tera::Tera;

mod api;
mod client;
mod config;
mod error;
mod message;
mod message_database;
mod render;

use api::AppState;
use client::cache::{FileStorage, MessageCache};
use client::composer::{Composer, PendingFile};
use config::{Cli, Command, LocalArgs, ServeArgs};
use message_database::MessageStore;
use render::MessageView;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Send {
            local,
            text,
            attach,
        } => send(local, text, attach),
        Command::Show { local } => show(local),
    }
}

async fn serve(args: ServeArgs) -> Result<(), Box<dyn Error>> {
    let store = MessageStore::load(args.messages_file);
    log::info!("Messages are stored in {}", store.path().display());

    let tera = match Tera::new(&format!("{}/*.html", args.templates.display())) {
        Ok(t) => t,
        Err(e) => {
            log::error!("Template parsing error: {}", e);
            return Err(e.into());
        }
    };

    let app_data = web::Data::new(AppState {
        tera,
        store: Mutex::new(store),
        static_dir: args.static_dir,
    });

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .wrap(api::cors())
            .wrap(middleware::Logger::default())
            .configure(api::configure)
    })
    .bind((args.host.as_str(), args.port))?
    .run();

    log::info!("🚀 CooliChat server running on port {}", args.port);
    log::info!(
        "🌐 Open http://{}:{} in your browser to start chatting!",
        args.host,
        args.port
    );
    server.await?;
    Ok(())
}

fn send(local: LocalArgs, text: Option<String>, attach: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let mut cache = MessageCache::new(FileStorage::new(local.storage_dir));
    let mut composer = Composer::new();

    composer.set_text(text.unwrap_or_default());
    if composer.is_over_limit() {
        log::warn!(
            "Message is over the length limit ({}): {:.40}",
            composer.char_count(),
            composer.text()
        );
    }
    if let Some(path) = attach {
        composer.attach(PendingFile::open(path)?)?;
    }
    if let Some(pending) = composer.pending_file() {
        log::info!("Attaching {}", pending.preview());
    }

    match composer.submit(&mut cache)? {
        Some(msg) => println!("{}", MessageView::from_message(&msg, &Local::now())),
        None => log::info!("Nothing to send"),
    }
    Ok(())
}

fn show(local: LocalArgs) -> Result<(), Box<dyn Error>> {
    let cache = MessageCache::new(FileStorage::new(local.storage_dir));
    let messages = cache.load()?;
    if messages.is_empty() {
        println!("💬 {}", render::WELCOME_TITLE);
        println!("{}", render::WELCOME_TEXT);
        return Ok(());
    }
    for view in render::render_all(&messages, &Local::now()) {
        println!("{}", view);
    }
    Ok(())
}
