//! Integration tests for the `vn` CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Write a complete one-story library into `dir`.
fn write_library(dir: &Path) {
    fs::write(
        dir.join("library.json"),
        r#"[{"id": "rainfall", "title": "Rainfall", "description": "A rainy-day romance."}]"#,
    )
    .unwrap();
    fs::write(
        dir.join("rainfall.json"),
        r#"{
  "id": "rainfall",
  "title": "Rainfall",
  "characters": [
    {
      "id": "mara",
      "name": "Mara",
      "avatar": "mara.png",
      "intimacy": {
        "currentStatus": "stranger",
        "value": 0,
        "upgradePath": [
          {
            "condition": {"type": "choice", "id": "ch1"},
            "status": "friend",
            "value": 20,
            "description": "Shared an umbrella",
            "type": "sweet"
          }
        ]
      },
      "relationships": {"current": "stranger", "history": []}
    }
  ],
  "chapters": [
    {
      "id": "c1",
      "paragraphs": [
        {
          "id": "p1",
          "parts": [
            {"type": "narration", "text": "Rain hammers the awning."},
            {"type": "dialogue", "text": "You're soaked.", "speaker": "Mara"}
          ],
          "choices": [
            {"id": "ch1", "text": "Offer your umbrella", "nextParagraphs": ["p2"]}
          ]
        }
      ],
      "extendedParagraphs": [
        {
          "id": "p2",
          "parts": [
            {"type": "dialogue", "text": "You came.", "speaker": "Mara"}
          ]
        }
      ]
    }
  ]
}"#,
    )
    .unwrap();
}

fn vn() -> Command {
    Command::cargo_bin("vn").unwrap()
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[test]
fn list_shows_the_library() {
    let dir = TempDir::new().unwrap();
    write_library(dir.path());

    vn().args(["list", "-d", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Rainfall")
                .and(predicate::str::contains("rainy-day"))
                .and(predicate::str::contains("1 stories")),
        );
}

#[test]
fn list_fails_without_library() {
    let dir = TempDir::new().unwrap();

    vn().args(["list", "-d", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_passes_valid_content() {
    let dir = TempDir::new().unwrap();
    write_library(dir.path());

    vn().args(["check", "-d", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("ok")
                .and(predicate::str::contains("All checks passed")),
        );
}

#[test]
fn check_flags_dangling_choice_target() {
    let dir = TempDir::new().unwrap();
    write_library(dir.path());
    // Point the choice at a paragraph that does not exist.
    let story = fs::read_to_string(dir.path().join("rainfall.json")).unwrap();
    fs::write(
        dir.path().join("rainfall.json"),
        story.replace(r#""nextParagraphs": ["p2"]"#, r#""nextParagraphs": ["p9"]"#),
    )
    .unwrap();

    vn().args(["check", "-d", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("unknown paragraph"))
        .stderr(predicate::str::contains("validation failed"));
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_runs_a_story_to_the_end() {
    let dir = TempDir::new().unwrap();
    let save = TempDir::new().unwrap();
    write_library(dir.path());

    vn().args([
        "play",
        "rainfall",
        "-d",
        dir.path().to_str().unwrap(),
        "--save-dir",
        save.path().to_str().unwrap(),
        "--fast",
    ])
    .write_stdin("1\n")
    .assert()
    .success()
    .stdout(
        predicate::str::contains("Rain hammers the awning.")
            .and(predicate::str::contains("You're soaked."))
            .and(predicate::str::contains("Offer your umbrella"))
            .and(predicate::str::contains("Mara: friend"))
            .and(predicate::str::contains("You came."))
            .and(predicate::str::contains("The End.")),
    );
}

#[test]
fn play_resumes_saved_progress() {
    let dir = TempDir::new().unwrap();
    let save = TempDir::new().unwrap();
    write_library(dir.path());

    vn().args([
        "play",
        "rainfall",
        "-d",
        dir.path().to_str().unwrap(),
        "--save-dir",
        save.path().to_str().unwrap(),
        "--fast",
    ])
    .write_stdin("1\n")
    .assert()
    .success();

    // Second run re-enters the saved paragraph instead of starting over.
    vn().args([
        "play",
        "rainfall",
        "-d",
        dir.path().to_str().unwrap(),
        "--save-dir",
        save.path().to_str().unwrap(),
        "--fast",
    ])
    .assert()
    .success()
    .stdout(
        predicate::str::contains("You came.")
            .and(predicate::str::contains("Rain hammers").not()),
    );
}

#[test]
fn play_unknown_story_fails() {
    let dir = TempDir::new().unwrap();
    let save = TempDir::new().unwrap();
    write_library(dir.path());

    vn().args([
        "play",
        "nonexistent",
        "-d",
        dir.path().to_str().unwrap(),
        "--save-dir",
        save.path().to_str().unwrap(),
        "--fast",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("not found"));
}
