use std::collections::HashMap;

use log::info;
use tokio::sync::broadcast;
use warp::{hyper::Uri, Filter};

use crate::netbox::NetboxApi;
use crate::proxmox::ProxmoxApi;

use super::{config::WebhookConfig, handlers, Message};

pub async fn server(
    config: &WebhookConfig,
    netbox: &NetboxApi,
    proxmox: &ProxmoxApi,
    message_tx: &broadcast::Sender<Message>,
) {
    let mut shutdown_rx = message_tx.subscribe();

    let (addr, server) = warp::serve(routes(config, netbox, proxmox)).bind_with_graceful_shutdown(
        config.listen,
        async move {
            while let Ok(msg) = shutdown_rx.recv().await {
                if msg == Message::Shutdown {
                    break;
                }
            }
        },
    );

    info!("Listening on {}", addr);
    server.await
}

pub fn routes(
    config: &WebhookConfig,
    netbox: &NetboxApi,
    proxmox: &ProxmoxApi,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let index_route = warp::get()
        .and(warp::path::end())
        .map(|| warp::redirect::found(Uri::from_static("/health")));

    let health_route = warp::get()
        .and(warp::path("health"))
        .and(warp::path::end())
        .map(|| warp::reply::json(&serde_json::json!({"message": "ok"})));

    let proxmox_clone = proxmox.clone();
    let proxmox_filter = warp::any().map(move || proxmox_clone.clone());
    let update_route = warp::post()
        .and(warp::path("webhook"))
        .and(warp::path("update-vmachine"))
        .and(warp::path::end())
        .and(warp::body::content_length_limit(1024 * 32))
        .and(warp::body::bytes())
        .and(warp::header::optional::<String>("x-hook-signature"))
        .and(proxmox_filter)
        .and_then(
            |body: bytes::Bytes, signature: Option<String>, proxmox: ProxmoxApi| async move {
                Ok::<_, warp::Rejection>(handlers::update_vm(body, signature, proxmox).await)
            },
        );

    let secret = config.secret.clone();
    let secret_filter = warp::any().map(move || secret.clone());
    let proxmox_clone = proxmox.clone();
    let proxmox_filter = warp::any().map(move || proxmox_clone.clone());
    let delete_route = warp::post()
        .and(warp::path("webhook"))
        .and(warp::path("delete-vmachine"))
        .and(warp::path::end())
        .and(warp::body::content_length_limit(1024 * 32))
        .and(warp::body::bytes())
        .and(warp::header::optional::<String>("x-hook-signature"))
        .and(secret_filter)
        .and(proxmox_filter)
        .and_then(
            |body: bytes::Bytes,
             signature: Option<String>,
             secret: String,
             proxmox: ProxmoxApi| async move {
                Ok::<_, warp::Rejection>(
                    handlers::delete_vm(body, signature, secret, proxmox).await,
                )
            },
        );

    let netbox_clone = netbox.clone();
    let netbox_filter = warp::any().map(move || netbox_clone.clone());
    let proxmox_clone = proxmox.clone();
    let proxmox_filter = warp::any().map(move || proxmox_clone.clone());
    let create_route = warp::get()
        .and(warp::path("webhook"))
        .and(warp::path("create-vm-button"))
        .and(warp::path::end())
        .and(warp::query::<HashMap<String, String>>())
        .and(netbox_filter)
        .and(proxmox_filter)
        .and_then(
            |query: HashMap<String, String>, netbox: NetboxApi, proxmox: ProxmoxApi| async move {
                Ok::<_, warp::Rejection>(handlers::create_vm(query, netbox, proxmox).await)
            },
        );

    warp::any()
        .and(
            index_route
                .or(health_route)
                .or(update_route)
                .or(delete_route)
                .or(create_route),
        )
        .map(|reply| {
            warp::reply::with_header(
                reply,
                "server",
                format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            )
        })
        .with(warp::log(module_path!()))
}

#[cfg(test)]
mod tests {
    use hmac::{Hmac, Mac};
    use sha2::Sha512;

    use crate::netbox::config::NetboxConfig;
    use crate::proxmox::config::ProxmoxConfig;

    use super::*;

    const SECRET: &str = "hooksecret";

    // Upstream endpoints point at a closed local port so any call the
    // handler makes fails fast instead of hanging the test.
    fn test_routes() -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone
    {
        let config = WebhookConfig {
            listen: "127.0.0.1:0".parse().unwrap(),
            secret: String::from(SECRET),
        };
        let netbox = NetboxApi::new(&NetboxConfig::new(
            "https://127.0.0.1:1".into(),
            "token".into(),
            false,
        ));
        let proxmox = ProxmoxApi::new(&ProxmoxConfig::new(
            "https://127.0.0.1:1".into(),
            "svc@pam".into(),
            "netbox".into(),
            "token".into(),
            "proxmox".into(),
            false,
        ));

        routes(&config, &netbox, &proxmox)
    }

    fn sign(body: &str) -> String {
        let mut mac = Hmac::<Sha512>::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(body.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[tokio::test]
    async fn it_reports_health() {
        let res = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&test_routes())
            .await;

        assert_eq!(res.status(), 200);
        assert_eq!(res.body().as_ref(), br#"{"message":"ok"}"#);
    }

    #[tokio::test]
    async fn it_sets_the_server_header() {
        let res = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&test_routes())
            .await;

        let server = res.headers().get("server").unwrap().to_str().unwrap();
        assert!(server.starts_with("netbox-proxmox/"));
    }

    #[tokio::test]
    async fn it_redirects_the_index_to_health() {
        let res = warp::test::request()
            .method("GET")
            .path("/")
            .reply(&test_routes())
            .await;

        assert_eq!(res.status(), 302);
        assert_eq!(res.headers().get("location").unwrap(), "/health");
    }

    #[tokio::test]
    async fn it_rejects_an_update_without_event() {
        let res = warp::test::request()
            .method("POST")
            .path("/webhook/update-vmachine")
            .header("x-hook-signature", "anything")
            .body(r#"{"event": "", "data": {}}"#)
            .reply(&test_routes())
            .await;

        assert_eq!(res.status(), 401);
        assert_eq!(res.body().as_ref(), b"not a delete event");
    }

    #[tokio::test]
    async fn it_rejects_an_update_without_signature_header() {
        let res = warp::test::request()
            .method("POST")
            .path("/webhook/update-vmachine")
            .body(r#"{"event": "updated", "data": {}}"#)
            .reply(&test_routes())
            .await;

        assert_eq!(res.status(), 401);
        assert_eq!(res.body().as_ref(), b"signature missing");
    }

    #[tokio::test]
    async fn it_echoes_unhandled_status_values() {
        let res = warp::test::request()
            .method("POST")
            .path("/webhook/update-vmachine")
            .header("x-hook-signature", "anything")
            .body(
                r#"{"event": "updated", "data": {
                    "status": {"value": "paused", "label": "Paused"},
                    "custom_fields": {"vmid": 101}
                }}"#,
            )
            .reply(&test_routes())
            .await;

        assert_eq!(res.status(), 200);
        assert_eq!(res.body().as_ref(), b"paused");
    }

    #[tokio::test]
    async fn it_rejects_a_delete_without_event() {
        let body = r#"{"data": {"custom_fields": {"vmid": 101}}}"#;
        let res = warp::test::request()
            .method("POST")
            .path("/webhook/delete-vmachine")
            .header("x-hook-signature", sign(body))
            .body(body)
            .reply(&test_routes())
            .await;

        assert_eq!(res.status(), 401);
        assert_eq!(res.body().as_ref(), b"not a delete event");
    }

    #[tokio::test]
    async fn it_rejects_a_delete_with_a_bad_signature() {
        let res = warp::test::request()
            .method("POST")
            .path("/webhook/delete-vmachine")
            .header("x-hook-signature", "deadbeef")
            .body(r#"{"event": "deleted", "data": {"custom_fields": {"vmid": 101}}}"#)
            .reply(&test_routes())
            .await;

        assert_eq!(res.status(), 401);
        assert_eq!(res.body().as_ref(), b"signature not valid");
    }

    #[tokio::test]
    async fn it_acknowledges_a_delete_regardless_of_outcome() {
        let body = r#"{"event": "deleted", "data": {"custom_fields": {"vmid": 101}}}"#;
        let res = warp::test::request()
            .method("POST")
            .path("/webhook/delete-vmachine")
            .header("x-hook-signature", sign(body))
            .body(body)
            .reply(&test_routes())
            .await;

        assert_eq!(res.status(), 200);
        assert_eq!(res.body().as_ref(), br#"{"message":"ok"}"#);
    }

    #[tokio::test]
    async fn it_renders_an_error_view_without_an_id() {
        let res = warp::test::request()
            .method("GET")
            .path("/webhook/create-vm-button")
            .reply(&test_routes())
            .await;

        assert_eq!(res.status(), 200);
        let body = String::from_utf8_lossy(res.body());
        assert!(body.contains("Not all data to create the VM are provided."));
    }
}
