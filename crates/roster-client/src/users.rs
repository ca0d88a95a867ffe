use std::time::Duration;

use serde_json::{Map, Value, json};
use tokio::sync::mpsc;
use tracing::debug;
use url::Url;

use roster_types::api::{ErrorCode, NewUser, Response, UserPatch};
use roster_types::models::{Role, User};

use crate::config::{ClientConfig, ConfigError};
use crate::debounce::Debouncer;
use crate::dispatch::{Dispatcher, Method};
use crate::validate;

/// Client for the remote `/users` collection. Cheap to clone; all clones
/// share one underlying connection pool.
///
/// Validation runs before every mutating dispatch and short-circuits into
/// the same envelope the dispatcher uses, so a caller sees exactly one
/// failure shape regardless of where the operation stopped.
#[derive(Debug, Clone)]
pub struct UserClient {
    dispatcher: Dispatcher,
    base_url: String,
}

impl UserClient {
    /// Build a client from `config`. The base URL is validated eagerly:
    /// a malformed URL is caller misuse, not a runtime condition.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Url::parse(&config.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source,
        })?;

        Ok(Self {
            dispatcher: Dispatcher::new(config.timeout),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a client from `ROSTER_API_URL` / `ROSTER_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env()?)
    }

    fn collection_url(&self) -> String {
        format!("{}/users", self.base_url)
    }

    fn resource_url(&self, id: u64) -> String {
        format!("{}/users/{}", self.base_url, id)
    }

    /// Create a user. Runs the email-shape, role-membership and
    /// email-uniqueness checks; any failure comes back without a mutating
    /// dispatch ever leaving the client.
    pub async fn create_user(&self, new_user: NewUser) -> Response<User> {
        if !validate::email_shape_ok(&new_user.email) {
            return Response::failure(
                ErrorCode::InvalidEmail,
                format!("{:?} is not a valid email address", new_user.email),
            );
        }
        let role = match validate::parse_role(&new_user.role) {
            Some(role) => role,
            None => {
                return Response::failure(
                    ErrorCode::InvalidRole,
                    format!("{:?} is not one of admin, user, guest", new_user.role),
                );
            }
        };

        // Uniqueness needs the live collection. If that fetch fails, the
        // failure propagates as-is instead of being laundered into a
        // validation code.
        let existing: Response<Vec<User>> = self
            .dispatcher
            .dispatch(&self.collection_url(), Method::Get, &[], None)
            .await;
        if !existing.success {
            return existing.recast();
        }
        let duplicate = existing
            .data
            .unwrap_or_default()
            .iter()
            .any(|u| validate::emails_match(&u.email, &new_user.email));
        if duplicate {
            return Response::failure(
                ErrorCode::DuplicateEmail,
                format!("a user with email {:?} already exists", new_user.email),
            );
        }

        // id and created_at are server-assigned; the payload never
        // carries them.
        let body = json!({
            "name": new_user.name,
            "email": new_user.email,
            "role": role,
        });
        self.dispatcher
            .dispatch(&self.collection_url(), Method::Post, &[], Some(body))
            .await
    }

    /// Fetch the collection, optionally filtered by role via the `?role=`
    /// query parameter. An empty match is success with empty data.
    pub async fn get_users(&self, role: Option<Role>) -> Response<Vec<User>> {
        let url = match role {
            Some(role) => format!("{}?role={}", self.collection_url(), role),
            None => self.collection_url(),
        };
        self.dispatcher.dispatch(&url, Method::Get, &[], None).await
    }

    /// Fetch a single user by id. A missing record is `NOT_FOUND`.
    pub async fn get_user(&self, id: u64) -> Response<User> {
        self.dispatcher
            .dispatch(&self.resource_url(id), Method::Get, &[], None)
            .await
    }

    /// Update the supplied fields of an existing user. Field validation
    /// and the existence check both run before the PUT; `id` and
    /// `created_at` are structurally absent from [`UserPatch`].
    pub async fn update_user(&self, id: u64, patch: UserPatch) -> Response<User> {
        // An empty patch changes nothing; answer with the current record.
        if patch.is_empty() {
            return self.get_user(id).await;
        }

        let mut fields = Map::new();
        if let Some(name) = &patch.name {
            fields.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(email) = &patch.email {
            if !validate::email_shape_ok(email) {
                return Response::failure(
                    ErrorCode::InvalidEmail,
                    format!("{:?} is not a valid email address", email),
                );
            }
            fields.insert("email".to_string(), Value::String(email.clone()));
        }
        if let Some(raw) = &patch.role {
            match validate::parse_role(raw) {
                Some(role) => fields.insert("role".to_string(), json!(role)),
                None => {
                    return Response::failure(
                        ErrorCode::InvalidRole,
                        format!("{:?} is not one of admin, user, guest", raw),
                    );
                }
            };
        }

        if let Err(failed) = self.check_exists(id).await {
            return failed;
        }

        self.dispatcher
            .dispatch(
                &self.resource_url(id),
                Method::Put,
                &[],
                Some(Value::Object(fields)),
            )
            .await
    }

    /// Delete a user. `data = Some(true)` on success; a second delete of
    /// the same id is `NOT_FOUND`.
    pub async fn delete_user(&self, id: u64) -> Response<bool> {
        if let Err(failed) = self.check_exists(id).await {
            return failed.recast();
        }

        let deleted: Response<Value> = self
            .dispatcher
            .dispatch(&self.resource_url(id), Method::Delete, &[], None)
            .await;
        if deleted.success {
            debug!(id, "user deleted");
            Response::ok(true)
        } else {
            deleted.recast()
        }
    }

    /// Fetch the collection and keep records whose name or email contains
    /// `query`, case-insensitive. Interactive callers should go through
    /// [`search_debouncer`](Self::search_debouncer) instead of calling
    /// this per keystroke.
    pub async fn search_users(&self, query: &str) -> Response<Vec<User>> {
        let all: Response<Vec<User>> = self
            .dispatcher
            .dispatch(&self.collection_url(), Method::Get, &[], None)
            .await;
        if !all.success {
            return all;
        }

        let needle = query.to_lowercase();
        let matched = all
            .data
            .unwrap_or_default()
            .into_iter()
            .filter(|u| {
                u.name.to_lowercase().contains(&needle)
                    || u.email.to_lowercase().contains(&needle)
            })
            .collect();
        Response::ok(matched)
    }

    /// Debounced search wiring for interactive callers: feed queries into
    /// the returned [`Debouncer`] as they are typed, and each envelope
    /// arrives on `results` once typing pauses for `delay`. At most one
    /// dispatch per quiet period, always for the latest query.
    pub fn search_debouncer(
        &self,
        delay: Duration,
        results: mpsc::UnboundedSender<Response<Vec<User>>>,
    ) -> Debouncer<String> {
        let client = self.clone();
        Debouncer::new(delay, move |query: String| {
            let client = client.clone();
            let results = results.clone();
            async move {
                let _ = results.send(client.search_users(&query).await);
            }
        })
    }

    /// Existence pre-check shared by update and delete. Any failure
    /// (missing record, timeout, transport) propagates untouched.
    async fn check_exists(&self, id: u64) -> Result<(), Response<User>> {
        let mut resp = self.get_user(id).await;
        if resp.success {
            return Ok(());
        }
        if resp.error_code == Some(ErrorCode::NotFound) {
            resp.message = format!("user {} does not exist", id);
        }
        Err(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_validated_eagerly() {
        let err = UserClient::new(ClientConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let client = UserClient::new(ClientConfig::new("http://localhost:3000/")).unwrap();
        assert_eq!(client.collection_url(), "http://localhost:3000/users");
        assert_eq!(client.resource_url(4), "http://localhost:3000/users/4");
    }
}
