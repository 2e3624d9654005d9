use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

const ENV_VARS: [&str; 5] = [
    "GEMINI_API_KEY",
    "GEMINI_MODEL",
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_ID",
    "FOLIO_SITE_URL",
];

fn sample_content() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("content")
        .join("site.yaml")
}

fn folio() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_folio"));
    for var in ENV_VARS {
        command.env_remove(var);
    }
    command
}

fn read(root: &Path, file: &str) -> String {
    fs::read_to_string(root.join(file)).unwrap_or_else(|e| panic!("{file}: {e}"))
}

#[test]
fn generates_site_from_sample_content() {
    let output = TempDir::new().unwrap();

    let status = folio()
        .args(["--input", sample_content().to_str().unwrap(), "--output"])
        .arg(output.path())
        .status()
        .expect("Failed to execute folio");
    assert!(status.success(), "folio exited with error");

    let html = read(output.path(), "index.html");
    assert!(html.contains("Alex Doe"), "Missing profile name");
    assert!(
        html.contains("Full-Stack Developer &amp; Tech Enthusiast")
            || html.contains("Full-Stack Developer &#38; Tech Enthusiast")
    );
    assert!(html.contains("Real-Time Collaboration App"), "Missing project");

    let post = read(output.path(), "blog/node/simple-nodejs-server/index.html");
    assert!(post.contains("<h1>Building a Simple Node.js Server</h1>"));
    assert!(post.contains("January 12, 2024"));
}

#[test]
fn generate_subcommand_defaults_to_bundled_content() {
    let output = TempDir::new().unwrap();

    let status = folio()
        .arg("generate")
        .arg("--output")
        .arg(output.path())
        .status()
        .expect("Failed to execute folio");
    assert!(status.success());

    for file in [
        "index.html",
        "blog/index.html",
        "blog/javascript/index.html",
        "blog/python/python-basics/index.html",
    ] {
        assert!(output.path().join(file).is_file(), "{file} was not generated");
    }
}

#[test]
fn environment_configures_widgets() {
    let output = TempDir::new().unwrap();

    let status = folio()
        .env("GEMINI_API_KEY", "test-key")
        .env("TELEGRAM_BOT_TOKEN", "123:abc")
        .env("TELEGRAM_CHAT_ID", "42")
        .arg("generate")
        .arg("--output")
        .arg(output.path())
        .status()
        .expect("Failed to execute folio");
    assert!(status.success());

    let html = read(output.path(), "index.html");
    assert!(html.contains("id=\"contact-form\""));
    assert!(html.contains("\"api_key\":\"test-key\""));
}

#[test]
fn custom_content_document() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("site.yaml");
    fs::write(
        &input,
        r##"
profile:
  name: Grace Hopper
  title: Rear Admiral
  bio: Compiler pioneer.
  email: grace@example.com
skills: [COBOL, FLOW-MATIC]
blog:
  categories:
    - id: history
      name: History
      slug: history
      description: Computing history
      color: "#123456"
      icon: "*"
  posts:
    - id: first-bug
      title: The First Bug
      slug: first-bug
      category: history
      author: Grace Hopper
      publish_date: "1947-09-09"
      description: A moth in the relay.
      content: |
        # The First Bug

        Found in **Relay #70**.
      read_time: 2
"##,
    )
    .unwrap();
    let output = dir.path().join("public");

    let status = folio()
        .args(["generate", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .status()
        .expect("Failed to execute folio");
    assert!(status.success());

    assert!(read(&output, "index.html").contains("Grace Hopper"));
    let post = read(&output, "blog/history/first-bug/index.html");
    assert!(post.contains("<strong>Relay #70</strong>"));
    assert!(post.contains("September 9, 1947"));
}

#[test]
fn invalid_content_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.yaml");
    fs::write(&input, "profile: [").unwrap();

    let status = folio()
        .args(["generate", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(dir.path().join("out"))
        .status()
        .expect("Failed to execute folio");
    assert!(!status.success());
}
