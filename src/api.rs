// API client module: a small blocking HTTP client for the League client's
// local API. One `LcuClient` is built per discovered session and every
// operation goes through `request`, which adds Basic authentication and maps
// each failure to a typed `HttpError`.

use crate::credentials::ConnectionParameters;
use crate::error::{HttpError, OperationError, ResponseShapeError};
use crate::profile::ProfileUpdate;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{redirect, Method};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// The fixed set of calls this tool makes against the local API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetAccountId,
    GetBearerToken,
    GetAccountWallet,
    GetProfile,
    UpdateProfile,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::GetAccountId,
        Operation::GetBearerToken,
        Operation::GetAccountWallet,
        Operation::GetProfile,
        Operation::UpdateProfile,
    ];

    pub fn method(&self) -> Method {
        match self {
            Operation::UpdateProfile => Method::PUT,
            _ => Method::GET,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Operation::GetAccountId => "/lol-rso-auth/v1/authorization",
            Operation::GetBearerToken => "/lol-rso-auth/v1/authorization/access-token",
            Operation::GetAccountWallet => "/lol-store/v1/wallet",
            Operation::GetProfile | Operation::UpdateProfile => "/lol-chat/v1/me",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::GetAccountId => "get account id",
            Operation::GetBearerToken => "get bearer token",
            Operation::GetAccountWallet => "get account wallet",
            Operation::GetProfile => "get profile",
            Operation::UpdateProfile => "update profile",
        };
        f.write_str(name)
    }
}

/// `Basic base64(username:password)`.
pub fn basic_auth_value(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// Whether certificate-chain verification is skipped for this session. Only
/// the loopback endpoint with its self-signed certificate qualifies.
pub fn accepts_invalid_certs(params: &ConnectionParameters) -> bool {
    params.is_loopback()
}

/// Blocking client bound to one client session.
#[derive(Clone)]
pub struct LcuClient {
    http: Client,
    params: ConnectionParameters,
    auth: HeaderValue,
}

impl LcuClient {
    /// Build a client for the given session. The local API serves a
    /// self-signed certificate, so chain verification is skipped, but only
    /// for loopback hosts. Redirects are not followed and no proxy is used.
    pub fn new(params: ConnectionParameters) -> Result<Self, HttpError> {
        let mut auth = HeaderValue::from_str(&basic_auth_value(params.username(), params.password()))?;
        auth.set_sensitive(true);

        let http = Client::builder()
            .danger_accept_invalid_certs(accepts_invalid_certs(&params))
            .redirect(redirect::Policy::none())
            .no_proxy()
            .build()
            .map_err(HttpError::Transport)?;
        Ok(LcuClient { http, params, auth })
    }

    pub fn params(&self) -> &ConnectionParameters {
        &self.params
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.params.base_url(), path)
    }

    /// Send one request and return the parsed JSON body. An empty success
    /// body yields `Value::Null`. No retries.
    pub fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, HttpError> {
        let url = self.url(path);
        debug!(%method, %url, "sending request");
        let mut req = self
            .http
            .request(method, &url)
            .header(AUTHORIZATION, self.auth.clone())
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send().map_err(HttpError::Transport)?;
        let status = res.status();
        let text = res.text().map_err(HttpError::Transport)?;
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(HttpError::InvalidJson)
    }

    fn call<B: Serialize + ?Sized>(&self, op: Operation, body: Option<&B>) -> Result<Value, OperationError> {
        self.request(op.method(), op.path(), body)
            .map_err(|e| fail(op, e))
    }

    /// `currentAccountId` of the signed-in account.
    pub fn get_account_id(&self) -> Result<u64, OperationError> {
        let op = Operation::GetAccountId;
        let body = self.call::<()>(op, None)?;
        let field = "currentAccountId";
        match body.get(field) {
            None | Some(Value::Null) => Err(fail(op, ResponseShapeError::MissingField(field))),
            Some(v) => v.as_u64().ok_or_else(|| {
                fail(
                    op,
                    ResponseShapeError::WrongType {
                        field,
                        expected: "an unsigned integer",
                    },
                )
            }),
        }
    }

    /// Access token of the current session.
    pub fn get_bearer_token(&self) -> Result<String, OperationError> {
        let op = Operation::GetBearerToken;
        let body = self.call::<()>(op, None)?;
        let field = "token";
        match body.get(field) {
            None | Some(Value::Null) => Err(fail(op, ResponseShapeError::MissingField(field))),
            Some(Value::String(token)) => Ok(token.clone()),
            Some(_) => Err(fail(
                op,
                ResponseShapeError::WrongType {
                    field,
                    expected: "a string",
                },
            )),
        }
    }

    pub fn get_account_wallet(&self) -> Result<Value, OperationError> {
        self.call::<()>(Operation::GetAccountWallet, None)
    }

    pub fn get_profile(&self) -> Result<Value, OperationError> {
        self.call::<()>(Operation::GetProfile, None)
    }

    /// Apply a partial profile update. Values outside the option tables are
    /// rejected before anything is sent.
    pub fn update_profile(&self, update: &ProfileUpdate) -> Result<Value, OperationError> {
        let op = Operation::UpdateProfile;
        update.validate().map_err(|e| fail(op, e))?;
        self.call(op, Some(update))
    }
}

fn fail(op: Operation, kind: impl Into<crate::error::OperationErrorKind>) -> OperationError {
    let err = OperationError::new(op, kind);
    debug!(operation = %op, error = %err.kind, "operation failed");
    err
}
