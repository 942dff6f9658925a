use dotenvy::dotenv;
use spotirs::{
    client::{FetchLimit, Lookup, SpotifyClientBuilder},
    model::track::Track,
    prelude::*,
    scope::Scope,
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

    let incomplete_auth_code_client = spotify_client
        .authorization_code_client("http://localhost:8080/callback")
        .scopes([Scope::UserLibraryRead, Scope::UserLibraryModify])
        .build();

    let authorize_url = incomplete_auth_code_client
        .get_authorize_url()
        .expect("failed to build authorize URL");
    println!("Authorize URL: {}", authorize_url);

    let mut code = String::new();
    let mut state = String::new();

    println!("Code:");
    std::io::stdin().read_line(&mut code).unwrap();

    println!("State:");
    std::io::stdin().read_line(&mut state).unwrap();

    let user_client = incomplete_auth_code_client
        .finalize(code.trim(), state.trim())
        .await
        .expect("failed to finalize authorization code client");

    println!("Refresh token for later: {}", user_client.get_refresh_token());

    // all scoped endpoints are now available
    println!("{} tracks saved", user_client.saved_tracks_total().await.unwrap());

    // as well as all unscoped endpoints
    let track: Track = user_client.track_by_name("Disco Man Remi Wolf").await.unwrap();
    user_client.save_tracks(&[Lookup::from(&track)]).await.unwrap();

    let newest = user_client.saved_tracks(FetchLimit::Count(5)).await.unwrap();
    for track in newest.items() {
        println!("{}", track.name);
    }
}
