mod messenger;
mod server;
mod session;

use std::sync::Arc;

use log::info;
use tokio::net::TcpListener;

use crate::server::Server;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    println!("Usage: [SERVER_PORT]");
    let port = std::env::args().nth(1).unwrap_or_else(|| "12345".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr}");

    let server = Arc::new(Server::new());
    loop {
        let (stream, peer) = listener.accept().await?;
        info!("connection from {peer}");
        tokio::spawn(session::handle_connection(server.clone(), stream, peer));
    }
}
