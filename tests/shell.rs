//! Shell Integration Tests
//!
//! Scripted sessions against the interactive menus.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::BufReader;

use streamcat::cli::Shell;
use streamcat::domain::NewUser;
use streamcat::{AgeRating, Catalog, ContentId, ContentKind, NewContent, UserId};

const TIMEOUT: Duration = Duration::from_secs(300);

fn seeded_catalog() -> Arc<Catalog> {
    let catalog = Catalog::default();
    catalog
        .add_content(NewContent::new("Sunny Farm", ContentKind::Series, 20, AgeRating::General))
        .unwrap();
    catalog
        .add_content(NewContent::new("Dark Water", ContentKind::Movie, 120, AgeRating::Adult))
        .unwrap();
    catalog
        .register(NewUser::new("Sam", "sam@example.com", "secret1", 15, AgeRating::Teen))
        .unwrap();
    catalog
        .add_admin(NewUser::new("Root", "root@example.com", "rootpass", 40, AgeRating::Adult))
        .unwrap();
    Arc::new(catalog)
}

async fn run_bytes(catalog: Arc<Catalog>, input: &[u8]) -> String {
    let mut output = Vec::new();
    Shell::new(catalog, input, &mut output, TIMEOUT)
        .run()
        .await
        .unwrap();
    String::from_utf8(output).unwrap()
}

async fn run_script(catalog: Arc<Catalog>, script: &str) -> String {
    run_bytes(catalog, script.as_bytes()).await
}

#[tokio::test]
async fn test_exit_and_eof() {
    let output = run_script(seeded_catalog(), "4\n").await;
    assert!(output.contains("Welcome to streamcat"));
    assert!(output.contains("Goodbye, guest!"));

    // Running out of input ends the shell cleanly too
    let output = run_script(seeded_catalog(), "").await;
    assert!(output.contains("Goodbye, guest!"));
}

#[tokio::test]
async fn test_undecodable_line_is_just_a_bad_answer() {
    let output = run_bytes(seeded_catalog(), b"\xff\xfe\n4\n").await;

    assert!(output.contains("Invalid option."));
    assert!(output.contains("Goodbye, guest!"));
}

#[tokio::test]
async fn test_last_line_without_newline() {
    let output = run_script(seeded_catalog(), "4").await;
    assert!(output.contains("Goodbye, guest!"));
}

#[tokio::test]
async fn test_guest_browses_everything() {
    let output = run_script(seeded_catalog(), "3\n1\n3\n4\n").await;

    assert!(output.contains("Sunny Farm"));
    assert!(output.contains("Dark Water"));
    assert!(output.contains("MINS"));
    assert!(output.contains("Total: 2 items"));
}

#[tokio::test]
async fn test_register_through_menu() {
    let catalog = seeded_catalog();
    let script = "2\nAda Lovelace\n36\nada@example.com\nsecret1\n3\n4\n";
    let output = run_script(Arc::clone(&catalog), script).await;

    assert!(output.contains("1. General - "));
    assert!(output.contains("Registration complete. Your user id is 3."));

    let ada = catalog.find_user_by_email("ada@example.com").unwrap();
    assert_eq!(ada.age_rating, AgeRating::Adult);
    assert_eq!(ada.age, 36);
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let catalog = seeded_catalog();
    let script = "2\nYoung One\n12\nyoung@example.com\nsecret1\n1\n4\n";
    let output = run_script(Arc::clone(&catalog), script).await;

    assert!(output.contains("Error: Validation failed: age must be between 13 and 120"));
    assert!(catalog.find_user_by_email("young@example.com").is_err());
}

#[tokio::test]
async fn test_member_listing_is_filtered() {
    let script = "1\nsam@example.com\nsecret1\n1\n8\n";
    let output = run_script(seeded_catalog(), script).await;

    assert!(output.contains("Welcome back, Sam!"));
    assert!(output.contains("Sunny Farm"));
    assert!(!output.contains("Dark Water"));
    assert!(output.contains("Goodbye, Sam!"));
}

#[tokio::test]
async fn test_rate_and_overwrite() {
    let catalog = seeded_catalog();
    let script = "1\nsam@example.com\nsecret1\n3\n1\n7,5\n3\n1\n9\n8\n";
    let output = run_script(Arc::clone(&catalog), script).await;

    assert!(output.contains("Rated: 'Sunny Farm' rated 7.50 by user 1"));
    assert!(output.contains("New average: 7.50 (1 ratings)"));
    assert!(output.contains("Replaced your earlier score of 7.50."));
    assert!(output.contains("New average: 9.00 (1 ratings)"));

    let item = catalog.get_by_id(ContentId(1)).unwrap();
    assert_eq!(item.ratings.score_of(UserId(1)), Some(9.0));
}

#[tokio::test]
async fn test_errors_return_to_menu() {
    let catalog = seeded_catalog();
    let script = "1\nsam@example.com\nsecret1\n2\n2\n3\n1\n11\n2\n42\n9\n5\n8\n";
    let output = run_script(Arc::clone(&catalog), script).await;

    assert!(output.contains("Error: Content 2 requires a minimum age of 18"));
    assert!(output.contains("Error: Validation failed: score out of range"));
    assert!(output.contains("Error: Content not found: 42"));
    assert!(output.contains("Invalid option."));
    assert!(output.contains("Administrator access required."));
    assert_eq!(catalog.get_by_id(ContentId(1)).unwrap().rating_count(), 0);
}

#[tokio::test]
async fn test_wrong_password() {
    let output = run_script(seeded_catalog(), "1\nsam@example.com\nnope-nope\n4\n").await;
    assert!(output.contains("Error: Incorrect password"));
    assert!(output.contains("Goodbye, guest!"));
}

#[tokio::test]
async fn test_admin_adds_content_and_changes_plan() {
    let catalog = seeded_catalog();
    let script = concat!(
        "1\nroot@example.com\nrootpass\n",
        // Manage content -> add a podcast
        "5\n1\nBuild Log\n5\n41\n1\nTechnology\n\n2021\n",
        // Manage users -> upgrade Sam
        "6\n2\n1\npremium\n",
        "8\n",
    );
    let output = run_script(Arc::clone(&catalog), script).await;

    assert!(output.contains("Content added with id 3."));
    assert!(output.contains("Sam is now on the premium plan."));

    let item = catalog.get_by_id(ContentId(3)).unwrap();
    assert_eq!(item.kind, ContentKind::Podcast);
    assert_eq!(item.genre.as_deref(), Some("Technology"));
    assert_eq!(item.description, None);
    assert_eq!(item.release_year, Some(2021));
}

#[tokio::test(start_paused = true)]
async fn test_idle_session_expires() {
    let catalog = seeded_catalog();
    let input = tokio_test::io::Builder::new()
        .read(b"1\nsam@example.com\nsecret1\n")
        .wait(Duration::from_secs(600))
        .read(b"4\n")
        .build();

    let mut output = Vec::new();
    Shell::new(catalog, BufReader::new(input), &mut output, TIMEOUT)
        .run()
        .await
        .unwrap();
    let output = String::from_utf8(output).unwrap();

    assert!(output.contains("Welcome back, Sam!"));
    assert!(output.contains("Session expired after inactivity. Please log in again."));
    // The exit choice lands on the start menu, not the member menu
    assert!(output.contains("Goodbye, guest!"));
}

#[tokio::test]
async fn test_admin_adds_users() {
    let catalog = seeded_catalog();
    let script = concat!(
        "1\nroot@example.com\nrootpass\n",
        // Manage users -> add a member, then an administrator
        "6\n3\nLin\n22\nlin@example.com\nsecret1\n2\nn\n",
        "6\n3\nOps\n45\nops@example.com\nsecret2\n3\ny\n",
        // A rejected form leaves the directory alone
        "6\n3\nDup\n30\nlin@example.com\nsecret3\n1\nn\n",
        "8\n",
    );
    let output = run_script(Arc::clone(&catalog), script).await;

    assert!(output.contains("Added member lin@example.com with id 3."));
    assert!(output.contains("Added administrator ops@example.com with id 4."));
    assert!(output.contains("Error: Validation failed: email already registered"));

    assert!(!catalog.find_user_by_email("lin@example.com").unwrap().is_admin);
    assert!(catalog.find_user_by_email("ops@example.com").unwrap().is_admin);
    assert_eq!(catalog.users().len(), 4);
}

#[tokio::test]
async fn test_members_cannot_add_users() {
    let catalog = seeded_catalog();
    let output = run_script(Arc::clone(&catalog), "1\nsam@example.com\nsecret1\n6\n8\n").await;

    assert!(output.contains("Administrator access required."));
    assert_eq!(catalog.users().len(), 2);
}
