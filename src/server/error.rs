use std::error::Error;
use std::fmt::{self, Display};

use warp::http::StatusCode;
use warp::Reply;

#[derive(Debug)]
pub enum WebhookError {
    InvalidPayload(serde_json::Error),
    MissingEvent,
    MissingSignature,
    InvalidSignature,
    MissingRequiredField,
    DuplicateVm,
    VmidCollision { vmid: u32, netbox_name: String, proxmox_name: String },
    Upstream(reqwest::Error),
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::MissingEvent
            | WebhookError::MissingSignature
            | WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::MissingRequiredField => StatusCode::BAD_REQUEST,
            WebhookError::DuplicateVm | WebhookError::VmidCollision { .. } => StatusCode::CONFLICT,
            WebhookError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn into_reply(self) -> warp::reply::Response {
        let status = self.status();
        warp::reply::with_status(self.to_string(), status).into_response()
    }
}

impl Display for WebhookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebhookError::InvalidPayload(e) => write!(f, "invalid json body: {}", e),
            WebhookError::MissingEvent => write!(f, "not a delete event"),
            WebhookError::MissingSignature => write!(f, "signature missing"),
            WebhookError::InvalidSignature => write!(f, "signature not valid"),
            WebhookError::MissingRequiredField => {
                write!(f, "Not all data to create the VM are provided.")
            }
            WebhookError::DuplicateVm => {
                write!(f, "VM with the same name and ID exists already!")
            }
            WebhookError::VmidCollision { vmid, netbox_name, proxmox_name } => write!(
                f,
                "VMID already in use! The VM {} coming from Netbox has the same VM-ID ({}) as the VM {} from Proxmox.",
                netbox_name, vmid, proxmox_name
            ),
            WebhookError::Upstream(e) => write!(f, "upstream api error: {}", e),
        }
    }
}

impl Error for WebhookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WebhookError::InvalidPayload(e) => Some(e),
            WebhookError::Upstream(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WebhookError {
    fn from(e: reqwest::Error) -> Self {
        WebhookError::Upstream(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_maps_auth_failures_to_unauthorized() {
        assert_eq!(WebhookError::MissingEvent.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(WebhookError::MissingSignature.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(WebhookError::InvalidSignature.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn it_renders_the_collision_message() {
        let err = WebhookError::VmidCollision {
            vmid: 101,
            netbox_name: String::from("web01"),
            proxmox_name: String::from("db01"),
        };
        assert_eq!(
            err.to_string(),
            "VMID already in use! The VM web01 coming from Netbox has the same VM-ID (101) as the VM db01 from Proxmox."
        );
    }
}
