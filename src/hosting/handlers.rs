use super::*;
use crate::game::Arithmetic;
use crate::game::Match;
use crate::*;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use serde::Serialize;

/// Structural errors become 400s carrying the error text.
/// Soft refusals are ordinary 200s with `success: false`.
fn reply<T>(result: Result<T, Invalid>) -> HttpResponse
where
    T: Serialize,
{
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => {
            log::debug!("rejected request: {}", e);
            HttpResponse::BadRequest().body(e.to_string())
        }
    }
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub async fn join(registry: web::Data<Registry>, req: web::Json<JoinRequest>) -> impl Responder {
    let req = req.into_inner();
    reply(registry.join(req.username).await.map(JoinResponse::from))
}

pub async fn leave(registry: web::Data<Registry>, req: web::Json<LeaveRequest>) -> impl Responder {
    reply(
        registry
            .leave(req.match_id, req.player_id)
            .await
            .map(|()| serde_json::json!({})),
    )
}

/// Always 200: a start racing another start is not the client's fault.
pub async fn start(registry: web::Data<Registry>, req: web::Json<StartRequest>) -> impl Responder {
    registry.into_inner().start(req.match_id).await;
    HttpResponse::Ok().json(serde_json::json!({}))
}

pub async fn credit(
    registry: web::Data<Registry>,
    req: web::Json<TransferRequest>,
) -> impl Responder {
    reply(registry.credit(req.match_id, req.player_id, req.value).await)
}

pub async fn deposit(
    registry: web::Data<Registry>,
    req: web::Json<TransferRequest>,
) -> impl Responder {
    reply(registry.deposit(req.match_id, req.player_id, req.value).await)
}

pub async fn lottery(
    registry: web::Data<Registry>,
    req: web::Json<LotteryRequest>,
) -> impl Responder {
    reply(
        registry
            .lottery(req.match_id, req.player_id, req.cell_index)
            .await
            .map(LotteryResponse::from),
    )
}

pub async fn question(
    registry: web::Data<Registry>,
    req: web::Json<QuestionRequest>,
) -> impl Responder {
    reply(
        registry
            .generate_question(req.match_id, req.player_id, req.bid_points)
            .await
            .map(QuestionResponse::from),
    )
}

pub async fn answer(registry: web::Data<Registry>, req: web::Json<AnswerRequest>) -> impl Responder {
    reply(
        registry
            .answer_question(req.match_id, req.player_id, req.question_id, req.answer)
            .await
            .map(AnswerResponse::from),
    )
}

/// Upgrades to a WebSocket carrying every event of the match as JSON text.
/// The handshake is checked before the feed is attached, so a botched
/// upgrade never replaces a player's working stream.
pub async fn stream(
    registry: web::Data<Registry>,
    path: web::Path<(ID<Match>, ID<Player>)>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    let (game, player) = path.into_inner();
    match actix_ws::handle(&req, body) {
        Ok((response, session, messages)) => match registry.stream(game, player).await {
            Ok(feed) => {
                log::info!("[match {}] {} connected", game, player);
                bridge(feed, session, messages);
                response.map_into_left_body()
            }
            Err(e) => HttpResponse::BadRequest()
                .body(e.to_string())
                .map_into_right_body(),
        },
        Err(e) => {
            log::debug!("[match {}] {} failed the upgrade: {}", game, player, e);
            HttpResponse::from_error(e).map_into_right_body()
        }
    }
}
