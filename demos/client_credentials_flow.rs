use dotenvy::dotenv;
use spotirs::{client::SpotifyClientBuilder, prelude::*};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    // reads SPOTIFY_ID and SPOTIFY_SECRET
    let spotify_client = SpotifyClientBuilder::from_env()
        .expect("Spotify credentials not in environment")
        .build()
        .await
        .expect("failed to build Spotify client");

    // all unscoped endpoints are now available. IDs may be bare, URIs or URLs
    let one_track = spotify_client
        .track("https://open.spotify.com/track/2PoYyfBkedDBPGAh0ZUoHW?si=abc")
        .await
        .unwrap();

    println!(
        "{} - {} ({})",
        one_track.name,
        one_track.artist_names().next().unwrap_or_default(),
        one_track.album.as_ref().map(|album| album.name.as_str()).unwrap_or_default()
    );

    let tracks = spotify_client
        .tracks(&["spotify:track:2pDPOMX0kWA7kcPBcDCQBu", "not an ID"])
        .await;

    for track in tracks.items() {
        println!("Found: {}", track.name);
    }

    for failure in tracks.failures() {
        println!("Failed: {}", failure);
    }
}
