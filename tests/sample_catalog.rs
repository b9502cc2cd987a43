use std::io::Write;
use std::path::PathBuf;

use book_catalog::{
    read_document, Catalog, CatalogState, Command, LoadError, SortKey, ALL_LANGUAGES,
};
use pretty_assertions::assert_eq;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/books.json")
}

async fn sample_catalog() -> Catalog {
    let document = read_document(&sample_path())
        .await
        .expect("sample data reads");
    let mut catalog = Catalog::new();
    catalog.load_json(document).expect("sample data loads");
    catalog
}

fn titles(catalog: &Catalog) -> Vec<String> {
    catalog
        .current_view()
        .map(|record| record.to_string())
        .collect()
}

#[tokio::test(flavor = "current_thread")]
async fn sample_loads_in_file_order() {
    let catalog = sample_catalog().await;
    assert_eq!(catalog.state(), CatalogState::Loaded);
    assert_eq!(catalog.total_count(), 10);
    assert_eq!(titles(&catalog)[0], "Things Fall Apart");
}

#[tokio::test(flavor = "current_thread")]
async fn undated_record_is_outside_year_ranges_and_first_by_year() {
    let mut catalog = sample_catalog().await;

    catalog.sort_by(SortKey::Year);
    let view = titles(&catalog);
    assert_eq!(view[0], "One Thousand and One Nights");
    assert_eq!(view[1], "The Iliad");

    catalog.filter_by_year_range(Some(-1000), Some(3000));
    assert_eq!(catalog.display_count(), 9);
    assert!(!titles(&catalog).contains(&"One Thousand and One Nights".to_string()));
}

#[tokio::test(flavor = "current_thread")]
async fn multi_language_records_match_each_language() {
    let mut catalog = sample_catalog().await;

    catalog.filter_by_language("French");
    assert_eq!(
        titles(&catalog),
        vec![
            "Madame Bovary",
            "Molloy, Malone Dies, The Unnamable, the trilogy"
        ]
    );

    catalog.filter_by_language("English");
    assert_eq!(
        titles(&catalog),
        vec![
            "Molloy, Malone Dies, The Unnamable, the trilogy",
            "Pride and Prejudice",
            "Things Fall Apart"
        ]
    );

    catalog.filter_by_language(ALL_LANGUAGES);
    assert_eq!(catalog.display_count(), catalog.total_count());
}

#[tokio::test(flavor = "current_thread")]
async fn search_reaches_authors_and_accented_titles() {
    let mut catalog = sample_catalog().await;

    catalog.apply(Command::SubmitQuery("AUSTEN".to_string()));
    assert_eq!(titles(&catalog), vec!["Pride and Prejudice"]);

    catalog.apply(Command::SubmitQuery("páramo".to_string()));
    assert_eq!(titles(&catalog), vec!["Pedro Páramo"]);

    catalog.apply(Command::SubmitQuery("old norse".to_string()));
    assert_eq!(titles(&catalog), vec!["Njál's Saga"]);
}

#[tokio::test(flavor = "current_thread")]
async fn covers_resolve_without_touching_disk() {
    let catalog = sample_catalog().await;
    let first = catalog.view_record(0).expect("first record");
    assert_eq!(
        first.resolve_cover_url().as_deref(),
        Some("static/images/things-fall-apart.jpg")
    );
}

#[tokio::test(flavor = "current_thread")]
async fn wrongly_shaped_file_leaves_the_catalog_empty() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, r#"{{"books": []}}"#).expect("write data");

    let document = read_document(file.path()).await.expect("valid json");
    let mut catalog = Catalog::new();
    let err = catalog.load_json(document).unwrap_err();

    assert!(matches!(err, LoadError::NotAnArray { .. }));
    assert_eq!(catalog.state(), CatalogState::Empty);
    assert_eq!(catalog.total_count(), 0);
}
