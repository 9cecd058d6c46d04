//! Asset loading: the language dataset and the world outline.
//!
//! Both files are requested concurrently and joined before anything renders.
//! Any failure aborts the whole load; there is no partial dataset and no retry.

use crate::dataset::{parse_languages, parse_world, Dataset, DatasetError};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Which input file an operation concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Languages,
    World,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Languages => f.write_str("language dataset"),
            AssetKind::World => f.write_str("world outline"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to fetch {asset} from {url}: {source}")]
    Http {
        asset: AssetKind,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching {asset} from {url} returned status {status}")]
    Status {
        asset: AssetKind,
        url: String,
        status: u16,
    },

    #[error("failed to read {asset} from {path}: {source}")]
    Io {
        asset: AssetKind,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {asset}: {source}")]
    Parse {
        asset: AssetKind,
        #[source]
        source: DatasetError,
    },
}

/// Where to load the two assets from.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// URL or local path of the language dataset
    pub languages_source: String,
    /// URL or local path of the world outline
    pub world_source: String,
    /// Cache-busting version appended to remote sources as `v=<version>`
    pub asset_version: Option<String>,
    pub timeout: Duration,
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Append the cache-busting query parameter to a remote source.
pub fn versioned_url(source: &str, version: Option<&str>) -> String {
    match version {
        Some(version) if !version.is_empty() => {
            let separator = if source.contains('?') { '&' } else { '?' };
            format!("{}{}v={}", source, separator, version)
        }
        _ => source.to_string(),
    }
}

async fn fetch_bytes(
    client: &reqwest::Client,
    asset: AssetKind,
    source: &str,
    version: Option<&str>,
) -> Result<Vec<u8>, LoadError> {
    if !is_remote(source) {
        debug!("Reading {} from {}", asset, source);
        return tokio::fs::read(source).await.map_err(|e| LoadError::Io {
            asset,
            path: source.to_string(),
            source: e,
        });
    }

    let url = versioned_url(source, version);
    debug!("Fetching {} from {}", asset, url);

    let response = client.get(&url).send().await.map_err(|e| LoadError::Http {
        asset,
        url: url.clone(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            asset,
            url,
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|e| LoadError::Http {
        asset,
        url: url.clone(),
        source: e,
    })?;
    Ok(body.to_vec())
}

async fn load_languages(
    client: &reqwest::Client,
    config: &LoaderConfig,
) -> Result<Vec<crate::dataset::Language>, LoadError> {
    let asset = AssetKind::Languages;
    let bytes = fetch_bytes(
        client,
        asset,
        &config.languages_source,
        config.asset_version.as_deref(),
    )
    .await?;
    parse_languages(&bytes).map_err(|source| LoadError::Parse { asset, source })
}

async fn load_world(
    client: &reqwest::Client,
    config: &LoaderConfig,
) -> Result<Vec<crate::dataset::Country>, LoadError> {
    let asset = AssetKind::World;
    let bytes = fetch_bytes(
        client,
        asset,
        &config.world_source,
        config.asset_version.as_deref(),
    )
    .await?;
    parse_world(&bytes).map_err(|source| LoadError::Parse { asset, source })
}

/// Load both assets concurrently and build the dataset.
pub async fn load_dataset(config: &LoaderConfig) -> Result<Dataset, LoadError> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(LoadError::Client)?;

    let (languages, countries) =
        tokio::try_join!(load_languages(&client, config), load_world(&client, config))?;

    info!(
        "Loaded {} languages and {} country outlines",
        languages.len(),
        countries.len()
    );
    Ok(Dataset::new(languages, countries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    const LANGUAGES_JSON: &str = r#"[
        {"iso_code": "en", "name": "English", "total_speakers_millions": 1500,
         "countries_iso2": ["US", "GB"]},
        {"iso_code": "es", "name": "Spanish", "total_speakers_millions": 600,
         "countries_iso2": ["ES", "MX"]}
    ]"#;

    const WORLD_JSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"iso_a2": "US", "name": "United States"},
             "geometry": {"type": "Polygon", "coordinates": [[[-100, 40], [-90, 40], [-90, 30]]]}}
        ]
    }"#;

    fn config(languages: String, world: String, version: Option<&str>) -> LoaderConfig {
        LoaderConfig {
            languages_source: languages,
            world_source: world,
            asset_version: version.map(String::from),
            timeout: Duration::from_secs(5),
        }
    }

    fn temp_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write temp file");
        file
    }

    // ==================== versioned_url Tests ====================

    #[test]
    fn test_versioned_url_appends_query() {
        assert_eq!(
            versioned_url("https://cdn.example.com/languages.json", Some("42")),
            "https://cdn.example.com/languages.json?v=42"
        );
        assert_eq!(
            versioned_url("https://cdn.example.com/world.geojson?x=1", Some("42")),
            "https://cdn.example.com/world.geojson?x=1&v=42"
        );
        assert_eq!(
            versioned_url("https://cdn.example.com/a.json", None),
            "https://cdn.example.com/a.json"
        );
    }

    // ==================== load_dataset Tests ====================

    #[tokio::test]
    async fn test_load_dataset_over_http() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/languages.json"))
            .and(query_param("v", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LANGUAGES_JSON))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/data/world.geojson"))
            .and(query_param("v", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_string(WORLD_JSON))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = config(
            format!("{}/data/languages.json", mock_server.uri()),
            format!("{}/data/world.geojson", mock_server.uri()),
            Some("7"),
        );

        let dataset = load_dataset(&config).await.expect("Should load");
        assert_eq!(dataset.languages().len(), 2);
        assert_eq!(dataset.countries().len(), 1);
        assert_eq!(dataset.country("us").unwrap().name, "United States");
    }

    #[tokio::test]
    async fn test_load_dataset_from_files() {
        let languages = temp_file(LANGUAGES_JSON);
        let world = temp_file(WORLD_JSON);

        let config = config(
            languages.path().to_str().unwrap().to_string(),
            world.path().to_str().unwrap().to_string(),
            Some("ignored-for-files"),
        );

        let dataset = load_dataset(&config).await.expect("Should load");
        assert!(dataset.language("es").is_some());
    }

    #[tokio::test]
    async fn test_load_dataset_fails_when_one_fetch_fails() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/languages.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LANGUAGES_JSON))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/world.geojson"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let config = config(
            format!("{}/languages.json", mock_server.uri()),
            format!("{}/world.geojson", mock_server.uri()),
            None,
        );

        let err = load_dataset(&config).await.unwrap_err();
        assert!(matches!(
            err,
            LoadError::Status {
                asset: AssetKind::World,
                status: 404,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_load_dataset_does_not_retry() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/languages.json"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&mock_server)
            .await;

        let world = temp_file(WORLD_JSON);
        let config = config(
            format!("{}/languages.json", mock_server.uri()),
            world.path().to_str().unwrap().to_string(),
            None,
        );

        assert!(load_dataset(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_load_dataset_parse_error_names_asset() {
        let languages = temp_file("not json");
        let world = temp_file(WORLD_JSON);

        let config = config(
            languages.path().to_str().unwrap().to_string(),
            world.path().to_str().unwrap().to_string(),
            None,
        );

        let err = load_dataset(&config).await.unwrap_err();
        assert!(matches!(
            err,
            LoadError::Parse {
                asset: AssetKind::Languages,
                ..
            }
        ));
        assert!(err.to_string().contains("language dataset"));
    }

    #[tokio::test]
    async fn test_load_dataset_missing_file() {
        let world = temp_file(WORLD_JSON);
        let config = config(
            "/nonexistent/languages.json".to_string(),
            world.path().to_str().unwrap().to_string(),
            None,
        );

        let err = load_dataset(&config).await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
