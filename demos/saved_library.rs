use dotenvy::dotenv;
use spotirs::{
    client::{FetchLimit, SpotifyClientBuilder},
    config::DEFAULT_REDIRECT_URI,
    login::SessionRegistry,
    prelude::*,
};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let spotify_client = SpotifyClientBuilder::from_env()
        .expect("Spotify credentials not in environment")
        .build()
        .await
        .expect("failed to build Spotify client");

    // listens on 127.0.0.1:8080 for the redirect
    let registry = SessionRegistry::bind().await.expect("failed to start callback listener");
    let login = registry
        .begin_login(spotify_client.authorization_code_client(DEFAULT_REDIRECT_URI).build())
        .expect("failed to begin login");

    println!("Log in at: {}", login.authorize_url());
    let user_client = login.wait().await.expect("login failed");

    let profile = user_client.current_user_profile().await.unwrap();
    println!("Logged in as {}", profile.display_name().unwrap_or(profile.id()));

    let saved = user_client.saved_tracks(FetchLimit::All).await.unwrap();
    println!("{} saved tracks", saved.items().len());

    if !saved.is_complete() {
        println!("{} pages could not be fetched", saved.failures().len());
    }

    let artists = user_client.followed_artists(FetchLimit::Count(20)).await.unwrap();
    for artist in artists.items() {
        println!("Following {}", artist.name);
    }

    for device in user_client.devices().await.unwrap() {
        println!("Device: {} ({:?})", device.name(), device.device_type());
    }
}
