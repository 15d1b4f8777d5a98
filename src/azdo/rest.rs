//! azdo::rest
//!
//! `GitClient` implementation over the Azure DevOps REST API.
//!
//! # Design
//!
//! Every call targets
//! `{organization_url}/_apis/git/repositories/{repositoryId}/...` with
//! `api-version=6.0`. Repository ids are globally unique within an
//! organization, so no project segment is needed.
//!
//! # Authentication
//!
//! Personal access tokens are sent as HTTP basic auth with an empty user
//! name, which is what the service expects.
//!
//! # Example
//!
//! ```ignore
//! use adogit::azdo::rest::AzdoClient;
//!
//! let client = AzdoClient::new("https://dev.azure.com/contoso", pat);
//! let stats = client.get_branch(repo_id, "main").await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::models::{
    GitBranchStats, GitCommitRef, GitItem, GitPush, GitPushRef, GitRef, GitRefUpdate,
    GitRefUpdateResult, ListResponse,
};
use super::traits::{AzdoError, GetCommitsQuery, GetItemQuery, GetRefsQuery, GitClient};
use crate::core::types::Oid;

/// REST API version sent on every request.
pub const API_VERSION: &str = "6.0";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "adogit";

/// Azure DevOps REST client.
pub struct AzdoClient {
    /// HTTP client for making requests
    client: Client,
    /// Organization URL, no trailing slash
    organization_url: String,
    /// Personal access token
    token: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for AzdoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzdoClient")
            .field("organization_url", &self.organization_url)
            .field("has_token", &!self.token.is_empty())
            .finish()
    }
}

impl AzdoClient {
    /// Create a client for an organization.
    ///
    /// # Arguments
    ///
    /// * `organization_url` - e.g. `https://dev.azure.com/contoso`
    /// * `token` - Personal access token with Code (read & write) scope
    pub fn new(organization_url: impl Into<String>, token: impl Into<String>) -> Self {
        let organization_url = organization_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            organization_url,
            token: token.into(),
        }
    }

    /// Get the organization URL.
    pub fn organization_url(&self) -> &str {
        &self.organization_url
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, repository_id: &str, path: &str) -> String {
        format!(
            "{}/_apis/git/repositories/{}/{}",
            self.organization_url, repository_id, path
        )
    }

    fn request(&self, method: Method, url: &str) -> Result<RequestBuilder, AzdoError> {
        if self.token.is_empty() {
            return Err(AzdoError::AuthRequired);
        }
        Ok(self
            .client
            .request(method, url)
            .headers(Self::headers())
            .basic_auth("", Some(&self.token))
            .query(&[("api-version", API_VERSION)]))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AzdoError> {
        let response = request
            .send()
            .await
            .map_err(|e| AzdoError::NetworkError(e.to_string()))?;
        Self::handle_response(response).await
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, AzdoError> {
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "azure devops response");

        if status.is_success() {
            response.json().await.map_err(|e| AzdoError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
                type_key: None,
            })
        } else {
            Err(Self::error_from_response(response, status).await)
        }
    }

    async fn error_from_response(response: Response, status: StatusCode) -> AzdoError {
        let body = response.json::<AzdoErrorResponse>().await.ok();
        let message = body
            .as_ref()
            .map(|b| b.message.clone())
            .unwrap_or_else(|| "Unknown error".to_string());
        let type_key = body.and_then(|b| b.type_key);

        match status {
            StatusCode::UNAUTHORIZED => AzdoError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN => {
                AzdoError::AuthFailed(format!("Permission denied: {}", message))
            }
            StatusCode::NOT_FOUND => AzdoError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => AzdoError::RateLimited,
            _ if status.is_server_error() => AzdoError::ApiError {
                status: status.as_u16(),
                message: format!("Azure DevOps server error: {}", message),
                type_key,
            },
            _ => AzdoError::ApiError {
                status: status.as_u16(),
                message,
                type_key,
            },
        }
    }
}

#[async_trait]
impl GitClient for AzdoClient {
    fn name(&self) -> &'static str {
        "azure-devops"
    }

    async fn get_branch(
        &self,
        repository_id: &str,
        name: &str,
    ) -> Result<GitBranchStats, AzdoError> {
        let url = self.repo_url(repository_id, "stats/branches");
        let request = self.request(Method::GET, &url)?.query(&[("name", name)]);
        self.send(request).await
    }

    async fn get_refs(
        &self,
        repository_id: &str,
        query: GetRefsQuery,
    ) -> Result<Vec<GitRef>, AzdoError> {
        let url = self.repo_url(repository_id, "refs");
        let mut request = self.request(Method::GET, &url)?.query(&[
            ("filter", query.filter.as_str()),
            ("peelTags", if query.peel_tags { "true" } else { "false" }),
        ]);
        if let Some(top) = query.top {
            request = request.query(&[("$top", top)]);
        }
        let list: ListResponse<GitRef> = self.send(request).await?;
        Ok(list.value)
    }

    async fn update_refs(
        &self,
        repository_id: &str,
        updates: Vec<GitRefUpdate>,
    ) -> Result<Vec<GitRefUpdateResult>, AzdoError> {
        let url = self.repo_url(repository_id, "refs");
        let request = self.request(Method::POST, &url)?.json(&updates);
        let list: ListResponse<GitRefUpdateResult> = self.send(request).await?;
        Ok(list.value)
    }

    async fn get_item(
        &self,
        repository_id: &str,
        query: GetItemQuery,
    ) -> Result<GitItem, AzdoError> {
        let url = self.repo_url(repository_id, "items");
        let mut request = self.request(Method::GET, &url)?.query(&[
            ("path", query.path.as_str()),
            ("$format", "json"),
            (
                "includeContent",
                if query.include_content { "true" } else { "false" },
            ),
        ]);
        if let Some(branch) = &query.branch {
            request = request.query(&[
                ("versionDescriptor.version", branch.as_str()),
                ("versionDescriptor.versionType", "branch"),
            ]);
        }
        self.send(request).await
    }

    async fn get_commits(
        &self,
        repository_id: &str,
        query: GetCommitsQuery,
    ) -> Result<Vec<GitCommitRef>, AzdoError> {
        let url = self.repo_url(repository_id, "commits");
        let top = query.top.to_string();
        let request = self.request(Method::GET, &url)?.query(&[
            ("searchCriteria.itemVersion.version", query.branch.as_str()),
            ("searchCriteria.itemVersion.versionType", "branch"),
            ("searchCriteria.$top", top.as_str()),
        ]);
        let list: ListResponse<GitCommitRef> = self.send(request).await?;
        Ok(list.value)
    }

    async fn get_commit(
        &self,
        repository_id: &str,
        commit_id: &Oid,
    ) -> Result<GitCommitRef, AzdoError> {
        let url = self.repo_url(repository_id, &format!("commits/{}", commit_id));
        let request = self.request(Method::GET, &url)?;
        self.send(request).await
    }

    async fn create_push(
        &self,
        repository_id: &str,
        push: GitPush,
    ) -> Result<GitPushRef, AzdoError> {
        let url = self.repo_url(repository_id, "pushes");
        let request = self.request(Method::POST, &url)?.json(&push);
        self.send(request).await
    }
}

/// Azure DevOps error response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzdoErrorResponse {
    message: String,
    #[serde(default)]
    type_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_trimmed() {
        let client = AzdoClient::new("https://dev.azure.com/contoso/", "pat");
        assert_eq!(client.organization_url(), "https://dev.azure.com/contoso");
    }

    #[test]
    fn repo_url_format() {
        let client = AzdoClient::new("https://dev.azure.com/contoso", "pat");
        assert_eq!(
            client.repo_url("repo-id", "refs"),
            "https://dev.azure.com/contoso/_apis/git/repositories/repo-id/refs"
        );
    }

    #[test]
    fn debug_hides_token() {
        let client = AzdoClient::new("https://dev.azure.com/contoso", "super-secret");
        let debug = format!("{:?}", client);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("has_token: true"));
    }

    #[test]
    fn empty_token_requires_auth() {
        let client = AzdoClient::new("https://dev.azure.com/contoso", "");
        assert!(matches!(
            client.request(Method::GET, "https://example.invalid"),
            Err(AzdoError::AuthRequired)
        ));
    }
}
