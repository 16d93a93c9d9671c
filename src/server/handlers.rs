use std::collections::HashMap;

use bytes::Bytes;
use log::{debug, error, info, warn};
use warp::http::StatusCode;
use warp::{reply, Reply};

use crate::netbox::NetboxApi;
use crate::proxmox::model::VmListItem;
use crate::proxmox::ProxmoxApi;

use super::error::WebhookError;
use super::views;
use super::webhook::{VirtualMachineRecord, WebhookPayload};

const TAG_COLOR: &str = "8bc34a";

pub async fn update_vm(
    body: Bytes,
    signature: Option<String>,
    proxmox: ProxmoxApi,
) -> warp::reply::Response {
    match handle_update(body, signature, proxmox).await {
        Ok(reply) => reply,
        Err(e) => e.into_reply(),
    }
}

// The update path only checks that the signature header is present; the
// digest itself is never verified here.
async fn handle_update(
    body: Bytes,
    signature: Option<String>,
    proxmox: ProxmoxApi,
) -> Result<warp::reply::Response, WebhookError> {
    let payload = parse_payload(&body)?;

    if payload.event.is_empty() {
        return Err(WebhookError::MissingEvent);
    }
    if signature.is_none() {
        warn!("signature missing");
        return Err(WebhookError::MissingSignature);
    }

    let record = VirtualMachineRecord::from(&payload.data);

    match update_action(&record.status) {
        UpdateAction::Stop => {
            let vmid = record.vmid.ok_or(WebhookError::MissingRequiredField)?;
            proxmox.stop_vm(vmid).await?;
            Ok(text_reply("VM marked as Offline, Proxmox stopped the VM"))
        }
        UpdateAction::Start => {
            let vmid = record.vmid.ok_or(WebhookError::MissingRequiredField)?;
            proxmox.start_vm(vmid).await?;
            Ok(text_reply("VM marked as Active, Proxmox is starting the VM"))
        }
        UpdateAction::Echo => {
            debug!("Unhandled status value: {}", record.status);
            Ok(text_reply(&record.status))
        }
    }
}

pub async fn delete_vm(
    body: Bytes,
    signature: Option<String>,
    secret: String,
    proxmox: ProxmoxApi,
) -> warp::reply::Response {
    match handle_delete(body, signature, secret, proxmox).await {
        Ok(reply) => reply,
        Err(e) => e.into_reply(),
    }
}

async fn handle_delete(
    body: Bytes,
    signature: Option<String>,
    secret: String,
    proxmox: ProxmoxApi,
) -> Result<warp::reply::Response, WebhookError> {
    debug!("Received delete webhook ({} bytes)", body.len());
    let payload = parse_payload(&body)?;

    if payload.event.is_empty() {
        return Err(WebhookError::MissingEvent);
    }
    let signature = match signature {
        Some(signature) => signature,
        None => {
            warn!("signature missing");
            return Err(WebhookError::MissingSignature);
        }
    };
    if !super::signature::verify(secret.as_bytes(), &body, &signature) {
        warn!("signature not valid");
        return Err(WebhookError::InvalidSignature);
    }

    let record = VirtualMachineRecord::from(&payload.data);
    let vmid = record.vmid.ok_or(WebhookError::MissingRequiredField)?;

    // Delete outcome is only logged, never surfaced to the sender.
    match proxmox.delete_vm(vmid).await {
        Ok(deleted) => info!("VM {} delete result: {}", vmid, deleted),
        Err(e) => error!("VM {} delete failed: {}", vmid, e),
    }

    Ok(reply::json(&serde_json::json!({"message": "ok"})).into_response())
}

pub async fn create_vm(
    query: HashMap<String, String>,
    netbox: NetboxApi,
    proxmox: ProxmoxApi,
) -> warp::reply::Response {
    match handle_create(query, netbox, proxmox).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("create-vm failed: {}", e);
            views::error_page(&e.to_string())
        }
    }
}

async fn handle_create(
    query: HashMap<String, String>,
    netbox: NetboxApi,
    proxmox: ProxmoxApi,
) -> Result<warp::reply::Response, WebhookError> {
    let id = query
        .get("id")
        .and_then(|v| v.parse::<u64>().ok())
        .ok_or(WebhookError::MissingRequiredField)?;

    let vm = netbox.get_vm(id).await?;
    let record = VirtualMachineRecord::from(&vm);

    let existing = proxmox.list_vms().await?;
    if let Some(conflict) = find_conflict(&existing, record.vmid, &record.name) {
        return Err(conflict);
    }

    if !record.has_all_create_fields() {
        return Err(WebhookError::MissingRequiredField);
    }

    match create_plan(&record.status) {
        CreatePlan::Skip => Ok(views::success_page(
            proxmox.host(),
            "Status of the VM is Planned. VM will not be created in Proxmox",
        )),
        CreatePlan::Provision { start, tag } => {
            let spec = record
                .provisioning_spec(start)
                .ok_or(WebhookError::MissingRequiredField)?;
            let created = proxmox.create_vm(&spec).await?;

            let tag = netbox.ensure_tag(tag, TAG_COLOR).await?;
            netbox.update_vm_tags(id, &[tag.id]).await?;

            let result = if start {
                format!("VM created with result: {}", created)
            } else {
                format!("VM created with result: {} but not started", created)
            };
            Ok(views::success_page(proxmox.host(), &result))
        }
    }
}

fn parse_payload(body: &Bytes) -> Result<WebhookPayload, WebhookError> {
    serde_json::from_slice(body).map_err(WebhookError::InvalidPayload)
}

fn text_reply(message: &str) -> warp::reply::Response {
    reply::with_status(message.to_string(), StatusCode::OK).into_response()
}

#[derive(Debug, PartialEq, Eq)]
enum UpdateAction {
    Stop,
    Start,
    Echo,
}

fn update_action(status: &str) -> UpdateAction {
    match status {
        "offline" => UpdateAction::Stop,
        "active" => UpdateAction::Start,
        _ => UpdateAction::Echo,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum CreatePlan {
    Provision { start: bool, tag: &'static str },
    Skip,
}

fn create_plan(status: &str) -> CreatePlan {
    match status {
        "Staged" => CreatePlan::Provision { start: false, tag: "staged" },
        "Planned" => CreatePlan::Skip,
        _ => CreatePlan::Provision { start: true, tag: "created" },
    }
}

// First match wins, in the order the hypervisor returned the machines.
fn find_conflict(existing: &[VmListItem], vmid: Option<u32>, name: &str) -> Option<WebhookError> {
    let vmid = vmid?;

    for vm in existing {
        if vm.vmid == vmid && vm.name.as_deref() == Some(name) {
            return Some(WebhookError::DuplicateVm);
        }
        if vm.vmid == vmid {
            return Some(WebhookError::VmidCollision {
                vmid,
                netbox_name: name.to_string(),
                proxmox_name: vm.name.clone().unwrap_or_default(),
            });
        }
    }

    None
}
