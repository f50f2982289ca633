use crate::game::Event;
use futures::StreamExt;
use tokio::sync::mpsc::UnboundedReceiver;

/// Forwards match events to a WebSocket until either side goes away.
/// The feed ends when the match finishes or the player attaches a newer
/// stream, and the socket is closed along with it.
pub fn bridge(
    mut feed: UnboundedReceiver<Event>,
    mut session: actix_ws::Session,
    mut messages: actix_ws::MessageStream,
) {
    actix_web::rt::spawn(async move {
        'sesh: loop {
            tokio::select! {
                biased;
                event = feed.recv() => match event {
                    Some(event) => if let Some(json) = frame(&event) {
                        if session.text(json).await.is_err() { break 'sesh }
                    },
                    None => break 'sesh,
                },
                msg = messages.next() => match msg {
                    Some(Ok(actix_ws::Message::Ping(bytes))) => if session.pong(&bytes).await.is_err() { break 'sesh },
                    Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                    Some(Err(_)) => break 'sesh,
                    None => break 'sesh,
                    _ => continue 'sesh,
                },
            }
        }
        let _ = session.close(None).await;
    });
}

/// JSON text frame for one event. Encoding failures are logged and skipped.
fn frame(event: &Event) -> Option<String> {
    serde_json::to_string(event)
        .inspect_err(|e| log::error!("failed to encode {}: {}", event, e))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Roster;
    use crate::game::Transaction;
    use crate::*;

    fn roster() -> Roster {
        Roster {
            bank: 510,
            players: vec![Player::new("alice".into(), 90).standing()],
        }
    }

    #[test]
    fn finish_frame_carries_final_standings() {
        let json = frame(&Event::Finish { roster: roster() }).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "finish");
        assert_eq!(value["roster"]["bank"], 510);
        assert_eq!(value["roster"]["players"][0]["username"], "alice");
        assert_eq!(value["roster"]["players"][0]["points"], 90);
    }

    #[test]
    fn transaction_frames_are_tagged_by_kind() {
        let player = ID::default();
        let event = Event::Transaction {
            transaction: Transaction::Repayment {
                player,
                owed: 60,
                paid: 60,
            },
            roster: roster(),
        };
        let value: serde_json::Value = serde_json::from_str(&frame(&event).unwrap()).unwrap();
        assert_eq!(value["type"], "transaction");
        assert_eq!(value["transaction"]["kind"], "repayment");
        assert_eq!(value["transaction"]["player"], player.to_string());
    }
}
