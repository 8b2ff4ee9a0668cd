//! Presentation Parsing Integration Tests
//!
//! Tests for parsing whole documents into slide trees.

use lectern::{Error, FieldContractError, Presentation, StructuralError};

const META: &str = r#"
meta:
  ref: Beethoven_Fuer-Elise
  uuid: 3c9a6f83-1d4e-4ea1-bd6b-f2f1a4a0b6e2
  title: Ludwig van Beethoven „Für Elise“
  subtitle: Ein Klavierstück
  subject: Musik
  grade: 7
  curriculum: Musik 7.1 Musik und ihre Geschichte
"#;

fn document(slides: &str) -> String {
    format!("{}slides:\n{}", META, slides)
}

#[test]
fn test_parse_lesson() {
    let yaml = document(
        r#"
  - ref: intro
    title: Einstieg
    generic: |
      Wer kennt dieses Stück?

      ---

      Woher kennt ihr es?
  - audio:
      src: ref:./HB
      title: Für Elise
  - task: Hört das Stück und beschreibt die Stimmung.
  - quote:
      text: Beethoven war ein Revolutionär.
      author: Richard Wagner
  - camera
"#,
    );

    let presentation = Presentation::parse(&yaml).unwrap();
    assert_eq!(presentation.meta.reference, "Beethoven_Fuer-Elise");
    assert_eq!(presentation.meta.subtitle.as_deref(), Some("Ein Klavierstück"));
    assert_eq!(presentation.slides.len(), 5);

    let intro = presentation.slide_by_ref("intro").unwrap();
    assert_eq!(intro.no, 1);
    assert_eq!(intro.title, "Einstieg");
    assert_eq!(intro.steps.len(), 2);

    let audio = presentation.slide_by_no(2).unwrap();
    assert_eq!(audio.master_name(), "audio");
    assert_eq!(audio.field_str("src"), Some("ref:Beethoven_Fuer-Elise_HB"));
    assert_eq!(audio.title, "Für Elise");

    let quote = presentation.slide_by_no(4).unwrap();
    assert_eq!(quote.title, "Zitat von „Richard Wagner“");

    let camera = presentation.slide_by_no(5).unwrap();
    assert_eq!(camera.master_name(), "camera");
    assert!(camera.fields.is_empty());
    assert_eq!(camera.title, "Dokumentenkamera");

    // Only the audio slide needs media.
    let uris: Vec<_> = presentation.media_uris().into_iter().collect();
    assert_eq!(uris, vec!["ref:Beethoven_Fuer-Elise_HB".to_string()]);
}

#[test]
fn test_numbering_follows_document_order() {
    let yaml = document(
        r#"
  - generic: Eins
    slides:
      - generic: Zwei
      - generic: Drei
        slides:
          - generic: Vier
  - generic: Fünf
"#,
    );

    let presentation = Presentation::parse(&yaml).unwrap();
    let titles: Vec<_> = presentation
        .slides
        .iter()
        .map(|slide| (slide.no, slide.level, slide.title.as_str()))
        .collect();
    assert_eq!(
        titles,
        vec![
            (1, 1, "Eins"),
            (2, 2, "Zwei"),
            (3, 2, "Drei"),
            (4, 3, "Vier"),
            (5, 1, "Fünf"),
        ]
    );

    let tree = presentation.slides.tree();
    assert_eq!(tree.len(), 2);
    assert_eq!(presentation.slides.children(tree[0]).len(), 2);
    assert!(presentation.slides.children(tree[1]).is_empty());
}

#[test]
fn test_absent_slides_are_skipped() {
    let yaml = document(
        r#"
  - generic: Eins
  - generic: Versteckt
    state: absent
    slides:
      - generic: Auch versteckt
  - generic: Zwei
"#,
    );

    let presentation = Presentation::parse(&yaml).unwrap();
    assert_eq!(presentation.slides.len(), 2);
    assert_eq!(presentation.slide_by_no(2).unwrap().title, "Zwei");
}

#[test]
fn test_unknown_state_fails() {
    let yaml = document("  - { generic: Eins, state: hidden }\n");
    let err = Presentation::parse(&yaml).unwrap_err();
    assert!(matches!(
        err,
        Error::Structural(StructuralError::UnknownState { ref state, .. }) if state == "hidden"
    ));
}

#[test]
fn test_slide_without_master_fails() {
    let yaml = document("  - title: Nur ein Titel\n");
    let err = Presentation::parse(&yaml).unwrap_err();
    assert!(matches!(
        err,
        Error::Structural(StructuralError::NoMaster { .. })
    ));
}

#[test]
fn test_slide_with_two_masters_fails() {
    let yaml = document("  - { generic: Text, task: Aufgabe }\n");
    let err = Presentation::parse(&yaml).unwrap_err();
    match err {
        Error::Structural(StructuralError::AmbiguousMaster { masters, .. }) => {
            assert!(masters.contains("generic"));
            assert!(masters.contains("task"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_unknown_slide_property_fails() {
    let yaml = document("  - { generic: Text, titel: Tippfehler }\n");
    let err = Presentation::parse(&yaml).unwrap_err();
    assert!(err.to_string().contains("titel"));
}

#[test]
fn test_mandatory_field_fails() {
    let yaml = document("  - audio: { title: Ohne Quelle }\n");
    let err = Presentation::parse(&yaml).unwrap_err();
    assert!(matches!(
        err,
        Error::FieldContract(FieldContractError::MandatoryField { ref master, ref field, .. })
            if master == "audio" && field == "src"
    ));
}

#[test]
fn test_empty_slides_fail() {
    let yaml = format!("{}slides: []\n", META);
    let err = Presentation::parse(&yaml).unwrap_err();
    assert!(matches!(
        err,
        Error::Structural(StructuralError::SlidesMissing)
    ));
}

#[test]
fn test_invalid_yaml_fails() {
    let err = Presentation::parse("meta: [unclosed").unwrap_err();
    assert!(matches!(err, Error::Yaml(_)));
}

#[test]
fn test_json_output_is_a_tree() {
    let yaml = document(
        r#"
  - generic: Eins
    slides:
      - youtube: xtKavZG1KiM
"#,
    );

    let presentation = Presentation::parse(&yaml).unwrap();
    let json = serde_json::to_value(&presentation).unwrap();
    assert_eq!(json["meta"]["ref"], "Beethoven_Fuer-Elise");
    assert_eq!(json["slides"][0]["no"], 1);
    assert_eq!(json["slides"][0]["slides"][0]["master"], "youtube");
    assert_eq!(
        json["slides"][0]["slides"][0]["optionalMediaUris"][0],
        "ref:YT_xtKavZG1KiM"
    );
}

#[test]
fn test_tex_markup() {
    let yaml = document(
        r#"
  - task: Beschreibt die Stimmung.
  - camera
"#,
    );

    let presentation = Presentation::parse(&yaml).unwrap();
    let tex = presentation.generate_tex_markup();
    assert!(tex.contains("Beschreibt die Stimmung."));
}
