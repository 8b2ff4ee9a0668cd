//! Media Resolution Integration Tests
//!
//! Tests for the second phase: resolving media URIs and letting the
//! masters read the resolved assets.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use lectern::{Asset, AssetCatalog, CatalogResolver, Presentation, Resolver};

const LESSON: &str = r#"
meta:
  ref: Beethoven
  uuid: 3c9a6f83-1d4e-4ea1-bd6b-f2f1a4a0b6e2
  title: Ludwig van Beethoven
  subject: Musik
  grade: 7
  curriculum: Musik 7.1
slides:
  - audio: ref:./Fuer-Elise
  - youtube: xtKavZG1KiM
  - sampleList:
      - ref:./Mondschein
"#;

const CATALOG: &str = r#"
version: 1
assets:
  - ref: Beethoven_Fuer-Elise
    title: Für Elise
    meta:
      composer: Ludwig van Beethoven
  - ref: Beethoven_Mondschein
    title: Mondscheinsonate
    samples:
      - ref: first
        title: Adagio sostenuto
      - ref: second
        title: Allegretto
"#;

fn catalog_resolver() -> CatalogResolver {
    CatalogResolver::new(AssetCatalog::from_yaml(CATALOG).unwrap())
}

/// Resolver that records every call and resolves nothing
#[derive(Default)]
struct RecordingResolver {
    calls: Mutex<Vec<(BTreeSet<String>, bool)>>,
}

#[async_trait]
impl Resolver for RecordingResolver {
    fn name(&self) -> &str {
        "recording"
    }

    async fn resolve(&self, uris: &BTreeSet<String>, required: bool) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push((uris.clone(), required));
        if required {
            Ok(())
        } else {
            anyhow::bail!("offline copies are not available")
        }
    }

    fn asset(&self, _uri: &str) -> Option<Asset> {
        None
    }
}

#[tokio::test]
async fn test_resolve_lesson() {
    let mut presentation = Presentation::parse(LESSON).unwrap();
    let resolver = catalog_resolver();

    // The offline copy of the video is missing, which is not an error.
    presentation.resolve_media_assets(&resolver).await.unwrap();
    assert!(presentation.is_resolved());

    let audio = presentation.slide_by_no(1).unwrap();
    assert_eq!(audio.field_str("title"), Some("Für Elise"));
    assert_eq!(audio.field_str("composer"), Some("Ludwig van Beethoven"));
    assert_eq!(audio.title, "Für Elise");

    let youtube = presentation.slide_by_no(2).unwrap();
    assert!(youtube.field_str("heading").is_none());

    let samples = presentation.slide_by_no(3).unwrap();
    let titles: Vec<_> = samples
        .steps
        .steps()
        .iter()
        .map(|step| step.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Adagio sostenuto", "Allegretto"]);
}

#[tokio::test]
async fn test_required_and_optional_sets() {
    let mut presentation = Presentation::parse(LESSON).unwrap();
    let resolver = RecordingResolver::default();

    presentation.resolve_media_assets(&resolver).await.unwrap();

    let calls = resolver.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);

    let (required, is_required) = &calls[0];
    assert!(*is_required);
    assert_eq!(
        required,
        &BTreeSet::from([
            "ref:Beethoven_Fuer-Elise".to_string(),
            "ref:Beethoven_Mondschein".to_string(),
        ])
    );

    let (optional, is_required) = &calls[1];
    assert!(!*is_required);
    assert_eq!(optional, &BTreeSet::from(["ref:YT_xtKavZG1KiM".to_string()]));
}

#[tokio::test]
async fn test_missing_required_asset_fails() {
    let mut presentation = Presentation::parse(LESSON).unwrap();
    let resolver = CatalogResolver::from_assets(vec![Asset::new("Beethoven_Fuer-Elise", None)]);

    let err = presentation
        .resolve_media_assets(&resolver)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("ref:Beethoven_Mondschein"));
}

#[tokio::test]
async fn test_optional_uri_becomes_required() {
    let yaml = LESSON.replace("youtube: xtKavZG1KiM", "audio: ref:YT_xtKavZG1KiM");
    let mut presentation = Presentation::parse(&yaml).unwrap();
    assert!(presentation.optional_media_uris().is_empty());

    let err = presentation
        .resolve_media_assets(&catalog_resolver())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("ref:YT_xtKavZG1KiM"));
}

#[tokio::test]
async fn test_offline_video_heading() {
    let mut presentation = Presentation::parse(LESSON).unwrap();
    let mut catalog = AssetCatalog::from_yaml(CATALOG).unwrap();
    catalog
        .assets
        .push(Asset::new("YT_xtKavZG1KiM", Some("Für Elise (Lang Lang)")));

    presentation
        .resolve_media_assets(&CatalogResolver::new(catalog))
        .await
        .unwrap();

    let youtube = presentation.slide_by_no(2).unwrap();
    assert_eq!(youtube.field_str("heading"), Some("Für Elise (Lang Lang)"));
    assert_eq!(youtube.title, "Für Elise (Lang Lang)");
}

#[tokio::test]
async fn test_resolve_twice_fails() {
    let mut presentation = Presentation::parse(LESSON).unwrap();
    let resolver = catalog_resolver();

    presentation.resolve_media_assets(&resolver).await.unwrap();
    let err = presentation
        .resolve_media_assets(&resolver)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already been resolved"));
}

#[tokio::test]
async fn test_catalog_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let (first, second) = CATALOG.split_at(
        CATALOG
            .find("  - ref: Beethoven_Mondschein")
            .unwrap(),
    );
    tokio::fs::write(dir.path().join("01.yml"), first).await.unwrap();
    tokio::fs::write(dir.path().join("02.yml"), format!("assets:\n{}", second))
        .await
        .unwrap();

    let pattern = format!("{}/*.yml", dir.path().display());
    let resolver = CatalogResolver::load(&pattern).await.unwrap();

    let mut presentation = Presentation::parse(LESSON).unwrap();
    presentation.resolve_media_assets(&resolver).await.unwrap();
    assert_eq!(resolver.resolved_count(), 2);
}
