//! An async wrapper for the Spotify Web API.
//!
//! - Clients for the client credentials and authorization code (with optional PKCE) flows, with automatic access
//!   token refreshing and rate limit handling. See [client].
//! - Catalog lookups and searches on any client, and the user's library, follows and devices on user clients.
//! - Paginated library fetches that collect every page into one [Collected](client::Collected) result.
//! - Items may be referred to by ID, URI, URL, a previously fetched record or just a search query. See
//!   [Lookup](client::Lookup).
//! - A local listener for the login redirect with the `login` feature. See [login].
//!
//! ```no_run
//! use spotirs::client::{FetchLimit, ScopedClient, SpotifyClientBuilder};
//! use spotirs::config::DEFAULT_REDIRECT_URI;
//! use spotirs::login::SessionRegistry;
//!
//! # async fn foo() -> spotirs::Result<()> {
//! let spotify_client = SpotifyClientBuilder::from_env()?.build().await?;
//!
//! let registry = SessionRegistry::bind().await?;
//! let login = registry.begin_login(spotify_client.authorization_code_client(DEFAULT_REDIRECT_URI).build())?;
//! println!("Log in at {}", login.authorize_url());
//!
//! let user_client = login.wait().await?;
//! let saved = user_client.saved_tracks(FetchLimit::Count(120)).await?;
//!
//! for track in saved.items() {
//!     println!("{} - {}", track.artist_names().collect::<Vec<_>>().join(", "), track.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
mod error;
#[cfg(feature = "login")]
pub mod login;
pub mod model;
pub mod scope;
mod util;

pub use crate::{
    error::{Error, IdError, Result},
    scope::Scope,
};

/// Contains all the client traits. Import everything from this module with `use spotirs::prelude::*;` to have the
/// endpoint functions available on the clients.
pub mod prelude {
    pub use crate::client::{AccessTokenRefresh, ScopedClient, UnscopedClient};
}

pub(crate) mod private {
    pub trait Sealed {}
}
