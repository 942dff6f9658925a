//! A local listener for the OAuth redirect, so an application can complete user logins without running a web server
//! of its own.
//!
//! The [SessionRegistry] owns the listener and tracks every login that is waiting for its callback by the login's
//! random `state`. Several logins may be pending at once; each one completes on its own.
//!
//! ```no_run
//! # use spotirs::{client::{SpotifyClientBuilder, ScopedClient}, config::DEFAULT_REDIRECT_URI, login::SessionRegistry};
//! # async fn foo() -> spotirs::Result<()> {
//! let spotify_client = SpotifyClientBuilder::from_env()?.build().await?;
//! let registry = SessionRegistry::bind().await?;
//!
//! let login = registry.begin_login(spotify_client.authorization_code_client(DEFAULT_REDIRECT_URI).build())?;
//! println!("Log in at {}", login.authorize_url());
//!
//! let user_client = login.wait().await?;
//! println!("Hello, {:?}", user_client.current_user_profile().await?.display_name());
//! # Ok(())
//! # }
//! ```

use std::{
    collections::HashMap,
    net::{Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use log::{debug, error, info, warn};
use serde::Deserialize;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use crate::{
    client::{AuthorizationCodeUserClient, IncompleteAuthorizationCodeUserClient},
    config::{DEFAULT_CALLBACK_PATH, DEFAULT_CALLBACK_PORT},
    error::{Error, Result},
};

type PendingLogins = Arc<Mutex<HashMap<String, oneshot::Sender<CallbackOutcome>>>>;

/// Owns the local callback listener and the logins waiting on it. Dropping the registry stops the listener and
/// aborts every pending login.
#[derive(Debug)]
pub struct SessionRegistry {
    pending: PendingLogins,
    local_addr: SocketAddr,
    server: JoinHandle<()>,
}

/// A login that has been started but whose callback hasn't arrived yet.
#[derive(Debug)]
pub struct PendingLogin {
    authorize_url: String,
    client: IncompleteAuthorizationCodeUserClient,
    receiver: oneshot::Receiver<CallbackOutcome>,
    _registration: Registration,
}

/// Removes a login from the registry once it is no longer waited on.
#[derive(Debug)]
struct Registration {
    state: String,
    pending: PendingLogins,
}

#[derive(Debug)]
enum CallbackOutcome {
    Code { code: String, state: String },
    Denied(String),
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

impl SessionRegistry {
    /// Listen on the default callback address, `127.0.0.1:8080`.
    pub async fn bind() -> Result<Self> {
        Self::bind_to(SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_CALLBACK_PORT))).await
    }

    /// Listen on the given address. Port 0 picks a free port; see [local_addr](SessionRegistry::local_addr).
    pub async fn bind_to(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let pending = PendingLogins::default();

        let app = Router::new()
            .route(DEFAULT_CALLBACK_PATH, get(callback))
            .with_state(Arc::clone(&pending));

        info!("Listening for login callbacks on http://{}{}", local_addr, DEFAULT_CALLBACK_PATH);

        let server = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                error!("Login callback listener failed: {}", err);
            }
        });

        Ok(Self {
            pending,
            local_addr,
            server,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Register a login and return a handle to wait for its completion on. The user should be directed to the
    /// handle's [authorize URL](PendingLogin::authorize_url).
    pub fn begin_login(&self, client: IncompleteAuthorizationCodeUserClient) -> Result<PendingLogin> {
        let authorize_url = client.get_authorize_url()?;
        let state = client.state().to_owned();
        let (sender, receiver) = oneshot::channel();

        debug!("Registering login with state {}", state);
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(state.clone(), sender);

        Ok(PendingLogin {
            authorize_url,
            client,
            receiver,
            _registration: Registration {
                state,
                pending: Arc::clone(&self.pending),
            },
        })
    }

    /// How many logins are waiting for their callback.
    pub fn pending_logins(&self) -> usize {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        self.server.abort();

        // dropping the senders wakes up every waiter with LoginAborted
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl PendingLogin {
    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    /// Wait for the callback and exchange its code for tokens. Waits for as long as it takes.
    pub async fn wait(self) -> Result<AuthorizationCodeUserClient> {
        let outcome = self.receiver.await.map_err(|_| Error::LoginAborted)?;

        match outcome {
            CallbackOutcome::Code { code, state } => {
                info!("Login callback received, finalizing");
                self.client.finalize(&code, &state).await
            }

            CallbackOutcome::Denied(reason) => {
                warn!("User denied the login: {}", reason);
                Err(Error::AuthorizationDenied(reason))
            }
        }
    }

    /// Like [wait](PendingLogin::wait), but gives up with [LoginTimeout](Error::LoginTimeout) after `timeout`.
    pub async fn wait_timeout(self, timeout: Duration) -> Result<AuthorizationCodeUserClient> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| Error::LoginTimeout)?
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.state);
    }
}

async fn callback(State(pending): State<PendingLogins>, Query(params): Query<CallbackParams>) -> impl IntoResponse {
    let Some(state) = params.state else {
        warn!("Login callback without a state");
        return (StatusCode::BAD_REQUEST, "Missing state parameter");
    };

    let Some(sender) = pending.lock().unwrap_or_else(PoisonError::into_inner).remove(&state) else {
        warn!("Login callback for unknown state {}", state);
        return (StatusCode::BAD_REQUEST, "Unknown or expired login");
    };

    let outcome = match (params.code, params.error) {
        (_, Some(error)) => CallbackOutcome::Denied(error),
        (Some(code), None) => CallbackOutcome::Code { code, state },
        (None, None) => CallbackOutcome::Denied(String::from("callback had neither a code nor an error")),
    };

    let denied = matches!(outcome, CallbackOutcome::Denied(_));

    if sender.send(outcome).is_err() {
        debug!("Login was abandoned before its callback arrived");
    }

    if denied {
        (StatusCode::OK, "Login was not completed. You may close this window.")
    } else {
        (StatusCode::OK, "Login complete. You may close this window.")
    }
}
