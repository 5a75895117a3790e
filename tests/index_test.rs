//! Integration tests for listings, stars, and caching.

mod helpers;

use docvault_core::config::AppConfig;
use docvault_entity::file::{ContentCategory, File};
use docvault_entity::object::{FileSystemObject, ObjectMeta, Visibility, VisibilityScope};
use docvault_entity::record::ListingQuery;
use docvault_service::StarOutcome;

use helpers::path;

#[tokio::test]
async fn test_star_is_reverted_when_not_acknowledged() {
    let vault = helpers::TestVault::new();
    let file = vault.file("todo.txt", "", 1).await;
    let id = FileSystemObject::from(file).id();
    let mut session = vault.session(&vault.owner).await;
    vault.api.fail_star_acknowledgements(true).await;

    let outcome = session.toggle_star(id).await.expect("listed");

    let StarOutcome::Reverted { starred, .. } = outcome else {
        panic!("expected a revert, got {outcome:?}");
    };
    assert!(!starred);
    assert!(!session.listing().find(id).expect("listed").is_starred());
}

#[tokio::test]
async fn test_stars_are_per_viewer() {
    let vault = helpers::TestVault::new();
    let file = vault.file("faq.md", "", 1).await;
    let id = FileSystemObject::from(file).id();
    let mut olive = vault.session(&vault.owner).await;

    let outcome = olive.toggle_star(id).await.expect("listed");

    assert_eq!(outcome, StarOutcome::Applied { starred: true });
    assert!(olive.listing().find(id).expect("listed").is_starred());
    let casey = vault.session(&vault.colleague).await;
    assert!(!casey.listing().find(id).expect("listed").is_starred());

    let undone = olive.toggle_star(id).await.expect("listed");
    assert_eq!(undone, StarOutcome::Applied { starred: false });
}

#[tokio::test]
async fn test_content_category_is_derived() {
    let vault = helpers::TestVault::new();
    vault.file("Holiday.JPG", "", 1).await;
    vault.file("talk.mp4", "", 1).await;
    vault.file("README", "", 1).await;
    let song = File::new(
        ObjectMeta::new("track", vault.owner.id, "Olive"),
        path(""),
    )
    .with_content_type("audio/mpeg")
    .with_department(Some(vault.department));
    vault.api.insert_file(song).await;

    let list = vault
        .services
        .index
        .load(
            &vault.ctx(&vault.owner),
            &ListingQuery::new(path(""), vault.scope()),
        )
        .await
        .expect("listing");

    let category = |name: &str| {
        list.files
            .iter()
            .find(|f| f.meta.name == name)
            .map(|f| f.content_category)
    };
    assert_eq!(category("Holiday.JPG"), Some(ContentCategory::Image));
    assert_eq!(category("talk.mp4"), Some(ContentCategory::Video));
    assert_eq!(category("README"), Some(ContentCategory::Document));
    assert_eq!(category("track"), Some(ContentCategory::Audio));
}

#[tokio::test]
async fn test_private_objects_stay_with_their_owner() {
    let vault = helpers::TestVault::new();
    let diary = File::new(
        ObjectMeta::new("diary.txt", vault.owner.id, "Olive"),
        path(""),
    )
    .with_visibility(Visibility::Private);
    vault.api.insert_file(diary).await;
    vault.file("shared.txt", "", 1).await;
    let private = ListingQuery::new(path(""), VisibilityScope::private());

    let mine = vault
        .services
        .index
        .load(&vault.ctx(&vault.owner), &private)
        .await
        .expect("listing");
    let theirs = vault
        .services
        .index
        .load(&vault.ctx(&vault.colleague), &private)
        .await
        .expect("listing");
    let department = vault
        .services
        .index
        .load(
            &vault.ctx(&vault.colleague),
            &ListingQuery::new(path(""), vault.scope()),
        )
        .await
        .expect("listing");

    assert_eq!(mine.files.len(), 1);
    assert!(theirs.is_empty());
    assert_eq!(department.files.len(), 1);
    assert_eq!(department.files[0].meta.name, "shared.txt");
}

#[tokio::test]
async fn test_listing_is_cached_until_invalidated() {
    let vault = helpers::TestVault::with_config(AppConfig::default());
    vault.file("one.txt", "", 1).await;
    let ctx = vault.ctx(&vault.owner);
    let query = ListingQuery::new(path(""), vault.scope());
    let listings = |calls: Vec<String>| calls.iter().filter(|c| *c == "list_folder").count();

    let first = vault.services.index.load(&ctx, &query).await.expect("listing");
    vault.file("two.txt", "", 1).await;
    let second = vault.services.index.load(&ctx, &query).await.expect("listing");

    assert_eq!(first, second);
    assert_eq!(listings(vault.api.calls().await), 1);

    vault.services.index.invalidate().await;
    let third = vault.services.index.load(&ctx, &query).await.expect("listing");
    assert_eq!(third.files.len(), 2);
    assert_eq!(listings(vault.api.calls().await), 2);
}
