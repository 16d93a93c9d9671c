use log::info;
use tokio::{signal, sync::broadcast, task::JoinHandle};

use super::Message;

pub fn spawn(message_tx: &broadcast::Sender<Message>) -> JoinHandle<()> {
    let message_tx = message_tx.clone();

    tokio::spawn(async move {
        while (signal::ctrl_c().await).is_ok() {
            info!("Received Ctrl+C, shutting down.");
            if message_tx.send(Message::Shutdown).is_err() {
                break;
            }
        }
    })
}
