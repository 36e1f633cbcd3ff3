//! Catalog client against a live router on an ephemeral port.

use showreel::clients::{CatalogClient, CatalogClientError};
use showreel::config::Config;
use showreel::domain::Category;
use showreel::models::VideoDraft;

async fn serve() -> CatalogClient {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = showreel::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let app = showreel::api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    CatalogClient::new(&format!("http://{addr}")).unwrap()
}

fn draft(title: &str) -> VideoDraft {
    VideoDraft {
        title: Some(title.to_string()),
        description: Some("desc".to_string()),
        video_url: Some("https://x/y.mp4".to_string()),
        category: Some("editing".to_string()),
    }
}

#[tokio::test]
async fn client_crud_round_trip() {
    let client = serve().await;
    client.ping().await.unwrap();

    let created = client.create(&draft("Live")).await.unwrap();
    assert_eq!(created.title, "Live");
    assert_eq!(created.category, Category::Editing);

    let fetched = client.get(created.id.as_str()).await.unwrap();
    assert_eq!(fetched.as_ref(), Some(&created));

    let patch = VideoDraft {
        title: Some("Renamed".to_string()),
        ..VideoDraft::default()
    };
    let updated = client.update(created.id.as_str(), &patch).await.unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.description, "desc");
    assert_eq!(updated.created_at, created.created_at);

    let listed = client.list().await.unwrap();
    assert_eq!(listed, vec![updated]);

    assert!(client.delete(created.id.as_str()).await.unwrap());
    assert!(!client.delete(created.id.as_str()).await.unwrap());
    assert_eq!(client.get(created.id.as_str()).await.unwrap(), None);
}

#[tokio::test]
async fn client_surfaces_validation_and_not_found() {
    let client = serve().await;

    match client.create(&VideoDraft::default()).await {
        Err(CatalogClientError::Validation(messages)) => {
            assert!(messages.contains(&"Please add a title".to_string()));
            assert!(messages.contains(&"Please add a video URL".to_string()));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    assert!(matches!(
        client.update("missing", &draft("x")).await,
        Err(CatalogClientError::NotFound)
    ));
}
