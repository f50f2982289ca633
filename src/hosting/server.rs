use super::*;
use crate::game::Arithmetic;
use crate::*;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;

pub struct Server;

impl Server {
    pub async fn run(args: Args) -> anyhow::Result<()> {
        args.game.validate()?;
        let state = web::Data::new(Registry::new(args.game, Arc::new(Arithmetic), args.seed));
        let registry = state.clone();
        log::info!("starting session server on {}", args.bind);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(state.clone())
                .route("/health", web::get().to(health))
                .route("/join", web::post().to(join))
                .route("/leave", web::post().to(leave))
                .route("/start", web::post().to(start))
                .route("/credit", web::post().to(credit))
                .route("/deposit", web::post().to(deposit))
                .route("/lottery", web::post().to(lottery))
                .route("/question", web::post().to(question))
                .route("/answer", web::post().to(answer))
                .route("/stream/{match_id}/{player_id}", web::get().to(stream))
        })
        .workers(args.workers)
        .bind(&args.bind)?
        .run()
        .await?;
        let finished = registry.shutdown().await;
        log::info!("session server stopped, {} matches cut short", finished);
        Ok(())
    }
}
