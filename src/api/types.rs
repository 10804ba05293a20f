//! Wire types for the console API. Every response is wrapped in an envelope
//! where `code == 0` means success; list payloads arrive either paginated or
//! as a bare array and normalize to [`ListPage`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response envelope shared by all endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    /// Present on login/refresh responses.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Account role as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    #[serde(other)]
    User,
}

/// Current user profile. Opaque to the session core beyond `role`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub user_group_id: u64,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub protocols: Vec<String>,
    #[serde(default)]
    pub node_group_id: u64,
    #[serde(default)]
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardingRule {
    pub id: u64,
    #[serde(default)]
    pub node_id: u64,
    #[serde(default)]
    pub user_id: u64,
    pub name: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub listen_port: u16,
    #[serde(default)]
    pub traffic_used: i64,
    #[serde(default)]
    pub traffic_limit: i64,
    #[serde(default)]
    pub speed_limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficPackage {
    pub id: u64,
    pub name: String,
    /// Bytes of traffic included.
    #[serde(default)]
    pub traffic: i64,
    /// Price in cents.
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub user_group_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub user_id: u64,
    #[serde(default)]
    pub package_id: u64,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub trade_no: String,
    #[serde(default)]
    pub pay_type: String,
}

/// Normalized list payload.
#[derive(Debug, Clone, Serialize)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
}

impl<T: serde::de::DeserializeOwned> ListPage<T> {
    /// Accepts both server list shapes: `{ list, total, page }` and a bare
    /// array. Anything else yields an empty page.
    pub fn from_value(data: Value) -> Result<Self, serde_json::Error> {
        match data {
            Value::Object(mut fields) => {
                let total = fields
                    .get("total")
                    .and_then(Value::as_u64)
                    .unwrap_or_default();
                let page = fields.get("page").and_then(Value::as_u64).unwrap_or(1);
                let items = match fields.remove("list") {
                    Some(list @ Value::Array(_)) => serde_json::from_value(list)?,
                    _ => Vec::new(),
                };
                Ok(Self { items, total, page })
            }
            list @ Value::Array(_) => {
                let items: Vec<T> = serde_json::from_value(list)?;
                let total = items.len() as u64;
                Ok(Self {
                    items,
                    total,
                    page: 1,
                })
            }
            _ => Ok(Self {
                items: Vec::new(),
                total: 0,
                page: 1,
            }),
        }
    }
}
