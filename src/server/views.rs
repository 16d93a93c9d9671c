use warp::Reply;

/// Browser-facing result pages for the Netbox custom link button. Inline
/// documents, no template engine.
pub fn success_page(proxmox_host: &str, result: &str) -> warp::reply::Response {
    let link = if proxmox_host.contains("://") {
        proxmox_host.to_string()
    } else {
        format!("https://{}:8006", proxmox_host)
    };
    let body = format!(
        "<!DOCTYPE html>\n<html>\n<head><title>netbox-proxmox</title></head>\n<body>\n\
         <h1>Success</h1>\n<p>{}</p>\n<p><a href=\"{}\">Open Proxmox</a></p>\n\
         </body>\n</html>\n",
        escape(result),
        escape(&link),
    );

    warp::reply::html(body).into_response()
}

pub fn error_page(message: &str) -> warp::reply::Response {
    let body = format!(
        "<!DOCTYPE html>\n<html>\n<head><title>netbox-proxmox</title></head>\n<body>\n\
         <h1>Error</h1>\n<p>{}</p>\n\
         </body>\n</html>\n",
        escape(message),
    );

    warp::reply::html(body).into_response()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
