//! Request and response shapes for the Ghost admin API endpoints used by `ghost-admin`.
//!
//! Only the fields the client reasons about are typed; everything else the
//! server returns is carried through untouched in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields requested for post listings and single-post reads.
pub const POST_FIELDS: &str = "id,title,url,status,updated_at";

/// A site member as returned by `GET /members/`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Member {
    pub id: String,
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Member {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            extra: Map::new(),
        }
    }
}

/// A post as returned by the posts endpoints.
///
/// Only `id` is typed. Every other field stays as the server sent it, nulls
/// and timestamp formatting included, so a post serializes back unchanged.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Post {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Post {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    pub fn url(&self) -> Option<&str> {
        self.str_field("url")
    }

    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }

    /// Raw `updated_at` string; Ghost expects it echoed back verbatim on updates.
    pub fn updated_at(&self) -> Option<&str> {
        self.str_field("updated_at")
    }

    fn str_field(&self, name: &str) -> Option<&str> {
        self.extra.get(name).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MembersResponse {
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostsResponse {
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// Write envelope: the admin API expects a single-element collection keyed by
/// the plural resource name.
#[derive(Debug, Clone, Serialize)]
pub struct PostsEnvelope<'a, T: Serialize> {
    pub posts: [&'a T; 1],
}

impl<'a, T: Serialize> PostsEnvelope<'a, T> {
    pub fn single(item: &'a T) -> Self {
        Self { posts: [item] }
    }
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiErrorEntry {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl ApiErrorBody {
    /// Message of the first reported error, if any.
    pub fn first_message(&self) -> Option<&str> {
        self.errors.first().and_then(|entry| entry.message.as_deref())
    }
}
