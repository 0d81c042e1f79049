//! Ghost admin API client.
//!
//! The header set (signed token + content type) is fixed when the client is
//! built and reused for every request; it is never refreshed, so a client
//! outliving the token lifetime will start receiving 401s.

use ghost_admin_types::{
    ApiErrorBody, Member, MembersResponse, POST_FIELDS, Post, PostsEnvelope, PostsResponse,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cleanup::{
    CleanupReport, DeleteFailure, DeleteOutcome, MemberDeletion, select_for_deletion,
};
use crate::error::AdminError;
use crate::token::{AdminKey, AdminToken};

const ADMIN_API_PATH: &str = "ghost/api/admin";
const PAGE_LIMIT: u32 = 100;

#[derive(Clone, Debug)]
pub struct AdminClient {
    http: Client,
    base: String,
    headers: HeaderMap,
    token: AdminToken,
}

impl AdminClient {
    pub fn new(url: &str, api_key: &str) -> Result<Self, AdminError> {
        let http = Client::builder().user_agent(Self::user_agent()).build()?;
        Self::with_http_client(http, url, api_key)
    }

    pub fn with_http_client(http: Client, url: &str, api_key: &str) -> Result<Self, AdminError> {
        let key = AdminKey::parse(api_key)?;
        let token = AdminToken::issue_now(&key)?;
        Self::from_parts(http, url, token)
    }

    /// Build a client whose token claims a fixed issue time.
    pub fn with_issued_at(url: &str, api_key: &str, issued_at: i64) -> Result<Self, AdminError> {
        let http = Client::builder().user_agent(Self::user_agent()).build()?;
        let key = AdminKey::parse(api_key)?;
        let token = AdminToken::issue(&key, issued_at)?;
        Self::from_parts(http, url, token)
    }

    fn from_parts(http: Client, url: &str, token: AdminToken) -> Result<Self, AdminError> {
        let site = Url::parse(url)?;
        let base = format!("{}/{ADMIN_API_PATH}", site.as_str().trim_end_matches('/'));

        let mut headers = HeaderMap::new();
        let mut authorization = HeaderValue::from_str(&token.authorization())
            .map_err(|err| AdminError::invalid_key(err.to_string()))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            http,
            base,
            headers,
            token,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("ghost-admin/", env!("CARGO_PKG_VERSION"))
    }

    /// Admin API root, e.g. `https://example.com/ghost/api/admin`.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn token(&self) -> &AdminToken {
        &self.token
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn url(&self, path: &str) -> Result<Url, AdminError> {
        Url::parse(&format!("{}{path}", self.base)).map_err(AdminError::InvalidUrl)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, AdminError> {
        let url = self.url(path)?;
        debug!(%method, %url, "admin api request");
        Ok(self.http.request(method, url).headers(self.headers.clone()))
    }

    async fn send(&self, method: Method, path: &str) -> Result<Value, AdminError> {
        let resp = self.request(method, path)?.send().await?;
        handle_response(resp).await
    }

    async fn send_json<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Value, AdminError> {
        let body = serde_json::to_vec(body)?;
        let resp = self.request(method, path)?.body(body).send().await?;
        handle_response(resp).await
    }

    pub async fn get_members(&self) -> Result<Vec<Member>, AdminError> {
        let path = format!("/members/?limit={PAGE_LIMIT}&page=1");
        let body = self.send(Method::GET, &path).await?;
        let page: MembersResponse = serde_json::from_value(body)?;
        Ok(page.members)
    }

    /// Delete one member. Failures are reported in the returned outcome and
    /// never propagate.
    pub async fn delete_member(&self, id: &str, email: &str) -> MemberDeletion {
        let outcome = match self.try_delete_member(id).await {
            Ok(status) if status.is_success() => {
                debug!(email, "member deleted");
                DeleteOutcome::Deleted
            }
            Ok(status) => {
                debug!(email, status = status.as_u16(), "member deletion rejected");
                DeleteOutcome::Failed(DeleteFailure::Status(status.as_u16()))
            }
            Err(err) => {
                debug!(email, error = %err, "member deletion failed");
                DeleteOutcome::Failed(DeleteFailure::Transport(err.to_string()))
            }
        };

        MemberDeletion {
            id: id.to_string(),
            email: email.to_string(),
            outcome,
        }
    }

    async fn try_delete_member(&self, id: &str) -> Result<StatusCode, AdminError> {
        let path = format!("/members/{id}/");
        let resp = self.request(Method::DELETE, &path)?.send().await?;
        Ok(resp.status())
    }

    /// Delete every member except `preserved`, one request at a time.
    pub async fn cleanup_members(&self, preserved: &str) -> Result<CleanupReport, AdminError> {
        let members = self.get_members().await?;
        let targets = select_for_deletion(&members, preserved);
        debug!(count = targets.len(), preserved, "members selected for deletion");

        let mut deletions = Vec::with_capacity(targets.len());
        for member in targets {
            deletions.push(self.delete_member(&member.id, &member.email).await);
        }

        debug!(count = deletions.len(), "member cleanup finished");
        Ok(CleanupReport::new(deletions))
    }

    pub async fn get_posts(&self) -> Result<Vec<Post>, AdminError> {
        let path = format!("/posts/?limit={PAGE_LIMIT}&page=1&fields={POST_FIELDS}");
        let body = self.send(Method::GET, &path).await?;
        let page: PostsResponse = serde_json::from_value(body)?;
        Ok(page.posts)
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, AdminError> {
        let path = format!("/posts/{id}?fields={POST_FIELDS}");
        let body = self.send(Method::GET, &path).await?;
        first_post(body)
    }

    pub async fn copy_post(&self, id: &str) -> Result<Post, AdminError> {
        let path = format!("/posts/{id}/copy");
        let body = self.send(Method::POST, &path).await?;
        first_post(body)
    }

    /// Update a post; `data` is forwarded as the single element of `posts`.
    pub async fn update_post<T: Serialize>(&self, id: &str, data: &T) -> Result<Post, AdminError> {
        let path = format!("/posts/{id}/");
        let body = self
            .send_json(Method::PUT, &path, &PostsEnvelope::single(data))
            .await?;
        first_post(body)
    }
}

fn first_post(body: Value) -> Result<Post, AdminError> {
    let page: PostsResponse = serde_json::from_value(body)?;
    page.posts
        .into_iter()
        .next()
        .ok_or(AdminError::EmptyCollection { resource: "posts" })
}

/// Return the parsed body of a successful response, or an API error carrying
/// the status and the first reported error message.
pub async fn handle_response(resp: Response) -> Result<Value, AdminError> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    decode_body(status, &bytes)
}

pub(crate) fn decode_body(status: StatusCode, bytes: &[u8]) -> Result<Value, AdminError> {
    if !status.is_success() {
        let message = serde_json::from_slice::<ApiErrorBody>(bytes)
            .ok()
            .and_then(|body| body.first_message().map(str::to_string));
        return Err(AdminError::Api { status, message });
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(bytes)?)
}
