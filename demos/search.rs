use dotenvy::dotenv;
use spotirs::{client::SpotifyClientBuilder, model::ItemType, prelude::*};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let spotify_client = SpotifyClientBuilder::from_env()
        .expect("Spotify credentials not in environment")
        .build()
        .await
        .expect("failed to build Spotify client");

    for offset in [0, 10, 20] {
        let search_results = spotify_client
            .search("hatsune miku")
            .types([ItemType::Track, ItemType::Artist])
            .limit(10)
            .offset(offset)
            .send()
            .await
            .unwrap();

        println!(
            "Tracks {}-{} of {}:",
            offset,
            offset + 10,
            search_results.total(ItemType::Track)
        );

        for track in search_results.tracks() {
            println!(
                "{} - {} [{}]",
                track.name,
                track.artist_names().collect::<Vec<_>>().join(", "),
                track.id.as_deref().unwrap_or("local"),
            );
        }
    }

    // or just take the first result
    let artist = spotify_client.artist_by_name("Hatsune Miku").await.unwrap();
    println!("\n{} has {} followers", artist.name, artist.followers.total);
}
