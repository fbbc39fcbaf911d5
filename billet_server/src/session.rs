use std::net::SocketAddr;
use std::sync::Arc;

use billet_core::{ClientMessage, GameError, PlayerId, ServerMessage};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::server::Server;

type FrameReader = Lines<BufReader<OwnedReadHalf>>;

/// Runs one client connection to completion: a writer task drains the
/// outbound channel to the socket while this task reads frames,
/// joins the player and dispatches their actions. Whatever ends the
/// read loop, the player is forfeited on the way out.
pub async fn handle_connection(server: Arc<Server>, stream: TcpStream, peer: SocketAddr) {
    let (read_half, mut write_half) = stream.into_split();
    let (sender, mut outbound) = mpsc::unbounded_channel::<ServerMessage>();
    let writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let Ok(mut line) = serde_json::to_string(&message) else {
                continue;
            };
            line.push('\n');
            if write_half.write_all(line.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    let mut frames = BufReader::new(read_half).lines();
    match join(&server, &mut frames, &sender).await {
        Ok(id) => {
            if let Err(err) = drive(&server, id, &mut frames, &sender).await {
                warn!("closing session of player {id} ({peer}): {err}");
                let _ = sender.send(ServerMessage::info(err.to_string()));
            }
            server.disconnect(id);
        }
        Err(err) => {
            warn!("{peer} never joined: {err}");
            let _ = sender.send(ServerMessage::info(err.to_string()));
        }
    }

    // closing the channel lets the writer flush the queue and exit
    drop(sender);
    let _ = writer.await;
    info!("connection from {peer} closed");
}

/// The first frame must carry the player's name; anything else is a
/// protocol violation and the session never comes up.
async fn join(
    server: &Server,
    frames: &mut FrameReader,
    sender: &UnboundedSender<ServerMessage>,
) -> Result<PlayerId, GameError> {
    let Some(line) = next_frame(frames).await else {
        return Err(GameError::Protocol(
            "connection closed before a name was sent".to_string(),
        ));
    };
    match parse_frame(&line) {
        Ok(ClientMessage::Name { name }) => server.join(&name, sender.clone()),
        Ok(_) => Err(GameError::Protocol(
            "the first frame must carry the player name".to_string(),
        )),
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => Err(GameError::Protocol(err.to_string())),
    }
}

async fn drive(
    server: &Server,
    id: PlayerId,
    frames: &mut FrameReader,
    sender: &UnboundedSender<ServerMessage>,
) -> Result<(), GameError> {
    while let Some(line) = next_frame(frames).await {
        match parse_frame(&line) {
            Ok(ClientMessage::Name { .. }) => {
                let _ = sender.send(ServerMessage::info("you have already joined"));
            }
            Ok(ClientMessage::Ready) => server.ready(id),
            Ok(ClientMessage::Play {
                card,
                target,
                guess,
            }) => server.play(id, card, target, guess),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                // unknown or malformed frames answer the offender only
                let _ = sender.send(ServerMessage::info(err.to_string()));
            }
        }
    }
    Ok(())
}

/// Next non-empty line, or `None` once the peer is gone. Read errors
/// end the session the same way a clean disconnect does.
async fn next_frame(frames: &mut FrameReader) -> Option<String> {
    loop {
        match frames.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => return Some(line),
            Ok(None) | Err(_) => return None,
        }
    }
}

/// Two-stage parse so the error classes of the taxonomy stay apart:
/// non-JSON is fatal, an unknown `type` or a known `type` with broken
/// fields is merely reported.
fn parse_frame(line: &str) -> Result<ClientMessage, GameError> {
    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|err| GameError::Protocol(format!("unparsable frame: {err}")))?;
    let kind = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| GameError::Protocol("frame carries no type".to_string()))?
        .to_string();
    match kind.as_str() {
        "name" | "ready" | "play" => serde_json::from_value(value)
            .map_err(|err| GameError::InvalidMove(format!("malformed {kind} frame: {err}"))),
        _ => Err(GameError::UnknownMessage(kind)),
    }
}
