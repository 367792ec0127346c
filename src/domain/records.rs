// Helpdesk record models as served by the external data API
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// The collections exposed by the data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Users,
    Assets,
    Incidents,
    Requests,
    AirtimeBundles,
}

impl Collection {
    /// Path segment used by the data API.
    pub fn path(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Assets => "assets",
            Collection::Incidents => "incidents",
            Collection::Requests => "requests",
            Collection::AirtimeBundles => "airtime_bundles",
        }
    }

    /// Human noun, used in notifications ("Updated 3 of 4 assets").
    pub fn noun(&self) -> &'static str {
        match self {
            Collection::AirtimeBundles => "airtime bundles",
            other => other.path(),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "users" => Ok(Collection::Users),
            "assets" | "devices" => Ok(Collection::Assets),
            "incidents" => Ok(Collection::Incidents),
            "requests" => Ok(Collection::Requests),
            "airtime" | "airtime_bundles" => Ok(Collection::AirtimeBundles),
            other => Err(format!("unknown collection: {}", other)),
        }
    }
}

/// A record type that lives in one collection of the data API.
pub trait Record: DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;
}

/// Named string fields, for text search and categorical filters.
pub trait Searchable {
    /// Fields the free-text query looks in.
    const TEXT_FIELDS: &'static [&'static str];
    /// Fields that can be constrained by exact value.
    const CATEGORIES: &'static [&'static str];

    fn field(&self, name: &str) -> Option<Cow<'_, str>>;
}

fn normalize_label(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .replace(['_', '-'], " ")
}

macro_rules! status_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(from = "Option<String>", into = "String")]
        pub enum $name {
            $($variant,)+
            Unknown,
        }

        impl $name {
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                    $name::Unknown => "Unknown",
                }
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                let normalized = normalize_label(&raw);
                $(
                    if normalized == normalize_label($label) {
                        return $name::$variant;
                    }
                )+
                $name::Unknown
            }
        }

        impl From<Option<String>> for $name {
            fn from(raw: Option<String>) -> Self {
                raw.map(Self::from).unwrap_or_default()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::Unknown
            }
        }

        impl From<$name> for String {
            fn from(status: $name) -> Self {
                status.label().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

status_enum!(AssetStatus {
    Available => "Available",
    Assigned => "Assigned",
    Maintenance => "Maintenance",
    Retired => "Retired",
});

status_enum!(IncidentStatus {
    New => "New",
    InProgress => "In Progress",
    Resolved => "Resolved",
    Escalated => "Escalated",
});

status_enum!(RequestStatus {
    Pending => "Pending",
    Approved => "Approved",
    Rejected => "Rejected",
    Fulfilled => "Fulfilled",
});

impl IncidentStatus {
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            IncidentStatus::New | IncidentStatus::InProgress | IncidentStatus::Escalated
        )
    }
}

// Ids arrive as strings or numbers depending on the backing table
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("invalid id: {}", other))),
    }
}

fn optional_id_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!("invalid reference: {}", other))),
    }
}

// Numeric strings are sometimes sent as bare JSON numbers
fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!("expected text, got {}", other))),
    }
}

// Nullable text columns collapse to an empty string
fn text_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    optional_text(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "text_or_default")]
    pub email: String,
    #[serde(default, deserialize_with = "text_or_default")]
    pub role: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "text_or_default")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "text_or_default")]
    pub kind: String,
    #[serde(default)]
    pub status: AssetStatus,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub warranty_expiry: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: IncidentStatus,
    #[serde(default, deserialize_with = "text_or_default")]
    pub priority: String,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    #[serde(rename = "type", default, deserialize_with = "text_or_default")]
    pub kind: String,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub requester: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub budget: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirtimeBundle {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "text_or_default")]
    pub provider: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub data_used: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub data_limit: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub assigned_to: Option<String>,
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;
}

impl Record for Asset {
    const COLLECTION: Collection = Collection::Assets;
}

impl Record for Incident {
    const COLLECTION: Collection = Collection::Incidents;
}

impl Record for Request {
    const COLLECTION: Collection = Collection::Requests;
}

impl Record for AirtimeBundle {
    const COLLECTION: Collection = Collection::AirtimeBundles;
}

fn borrowed(value: &str) -> Option<Cow<'_, str>> {
    Some(Cow::Borrowed(value))
}

fn borrowed_opt(value: &Option<String>) -> Option<Cow<'_, str>> {
    value.as_deref().map(Cow::Borrowed)
}

impl Searchable for User {
    const TEXT_FIELDS: &'static [&'static str] = &["name", "email", "department", "role"];
    const CATEGORIES: &'static [&'static str] = &["role", "department", "status"];

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => borrowed(&self.id),
            "name" => borrowed(&self.name),
            "email" => borrowed(&self.email),
            "role" => borrowed(&self.role),
            "department" => borrowed_opt(&self.department),
            "status" => borrowed(&self.status),
            _ => None,
        }
    }
}

impl Searchable for Asset {
    const TEXT_FIELDS: &'static [&'static str] = &["name", "type", "serial_number"];
    const CATEGORIES: &'static [&'static str] = &["type", "status"];

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => borrowed(&self.id),
            "name" => borrowed(&self.name),
            "type" => borrowed(&self.kind),
            "status" => borrowed(self.status.label()),
            "assigned_to" => borrowed_opt(&self.assigned_to),
            "serial_number" => borrowed_opt(&self.serial_number),
            _ => None,
        }
    }
}

impl Searchable for Incident {
    const TEXT_FIELDS: &'static [&'static str] = &["title", "priority"];
    const CATEGORIES: &'static [&'static str] = &["status", "priority"];

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => borrowed(&self.id),
            "title" => borrowed(&self.title),
            "status" => borrowed(self.status.label()),
            "priority" => borrowed(&self.priority),
            "assignee" => borrowed_opt(&self.assignee),
            _ => None,
        }
    }
}

impl Searchable for Request {
    const TEXT_FIELDS: &'static [&'static str] = &["title", "type"];
    const CATEGORIES: &'static [&'static str] = &["type", "status"];

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => borrowed(&self.id),
            "title" => borrowed(&self.title),
            "type" => borrowed(&self.kind),
            "status" => borrowed(self.status.label()),
            "requester" => borrowed_opt(&self.requester),
            _ => None,
        }
    }
}

impl Searchable for AirtimeBundle {
    const TEXT_FIELDS: &'static [&'static str] = &["name", "provider"];
    const CATEGORIES: &'static [&'static str] = &["provider"];

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => borrowed(&self.id),
            "name" => borrowed(&self.name),
            "provider" => borrowed(&self.provider),
            "assigned_to" => borrowed_opt(&self.assigned_to),
            _ => None,
        }
    }
}
