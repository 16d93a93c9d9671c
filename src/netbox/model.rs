use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct Pageination<T> {
    pub count: usize,
    pub next: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct VirtualMachine {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub comments: String,
    pub status: Option<VmStatus>,
    pub memory: Option<u64>,
    pub disk: Option<u64>,
    pub vcpus: Option<Value>,
    #[serde(default)]
    pub custom_fields: CustomFields,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct VmStatus {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub label: String,
}

/// Site-specific extension attributes; `vmid` arrives as number or string
/// depending on how the custom field was filled in.
#[derive(Debug, Default, Deserialize)]
pub struct CustomFields {
    pub vmid: Option<Value>,
    pub os: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub color: String,
}
