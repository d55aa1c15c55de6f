//! CLI integration tests for oas-schema binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("oas-schema"));
    cmd.env_remove("OAS_FILE");
    cmd
}

fn spec() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/oas.json")
        .display()
        .to_string()
}

// Helper to create a temp payload file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

mod schemas_command {
    use super::*;

    #[test]
    fn prints_derived_schemas() {
        cmd()
            .args([
                "--spec",
                spec().as_str(),
                "schemas",
                "/books/<isbn>",
                "--method",
                "PUT",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""key":"/books/{isbn}""#))
            .stdout(predicate::str::contains(r#""required":["isbn"]"#))
            .stdout(predicate::str::contains(r#""required":["title","author"]"#));
    }

    #[test]
    fn uuid_format_rewritten() {
        cmd()
            .args(["--spec", spec().as_str(), "schemas", "/books/id/<book_uuid>"])
            .assert()
            .success()
            .stdout(predicate::str::contains("pattern"))
            .stdout(predicate::str::contains(r#""format""#).not());
    }

    #[test]
    fn pretty_output() {
        cmd()
            .args(["--spec", spec().as_str(), "schemas", "/health", "--pretty"])
            .assert()
            .success()
            .stdout(predicate::str::contains("{\n"));
    }

    #[test]
    fn unknown_route() {
        cmd()
            .args(["--spec", spec().as_str(), "schemas", "/authors"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("no schema defined"));
    }
}

mod request_command {
    use super::*;

    #[test]
    fn valid_put() {
        let dir = TempDir::new().unwrap();
        let body = write_temp_file(
            &dir,
            "book.json",
            r#"{"title": "Infinite Jest", "author": "David Foster Wallace"}"#,
        );

        cmd()
            .args([
                "--spec",
                spec().as_str(),
                "request",
                "/books/<isbn>",
                "--method",
                "put",
                "--param",
                "isbn=0-316-92004-5",
                "--body",
                body.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Valid"));
    }

    #[test]
    fn missing_author() {
        let dir = TempDir::new().unwrap();
        let body = write_temp_file(&dir, "book.json", r#"{"title": "Infinite Jest"}"#);

        cmd()
            .args([
                "--spec",
                spec().as_str(),
                "request",
                "/books/<isbn>",
                "-m",
                "put",
                "-p",
                "isbn=0-316-92004-5",
                "--body",
                body.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Validation failed: invalid body"));
    }

    #[test]
    fn malformed_body_json_output() {
        let dir = TempDir::new().unwrap();
        let body = write_temp_file(&dir, "book.json", "{not json");

        cmd()
            .args([
                "--spec",
                spec().as_str(),
                "request",
                "/books/<isbn>",
                "-m",
                "put",
                "-p",
                "isbn=1",
                "--body",
                body.to_str().unwrap(),
                "--json",
            ])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""valid":false"#))
            .stdout(predicate::str::contains(r#""status":400"#));
    }

    #[test]
    fn query_string_checked() {
        cmd()
            .args([
                "--spec",
                spec().as_str(),
                "request",
                "/books/by-title",
                "--url",
                "/books/by-title?title=1234",
                "--json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"valid":true}"#));

        cmd()
            .args(["--spec", spec().as_str(), "request", "/books/by-title"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("invalid query"));
    }

    #[test]
    fn bad_uuid_path_param() {
        cmd()
            .args([
                "--spec",
                spec().as_str(),
                "request",
                "/books/id/<book_uuid>",
                "-p",
                "book_uuid=not-a-uuid",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("invalid path"));
    }

    #[test]
    fn spec_from_environment() {
        let mut cmd = cmd();
        cmd.env("OAS_FILE", spec())
            .args(["request", "/health"])
            .assert()
            .success();
    }
}

mod response_command {
    use super::*;

    #[test]
    fn valid_response() {
        let dir = TempDir::new().unwrap();
        let body = write_temp_file(&dir, "stored.json", r#"{"status": "success", "uuid": "x"}"#);

        cmd()
            .args([
                "--spec",
                spec().as_str(),
                "response",
                "/books/<isbn>",
                "-m",
                "put",
                "--status",
                "201",
                "--body",
                body.to_str().unwrap(),
                "--emit-error",
            ])
            .assert()
            .success();
    }

    #[test]
    fn invalid_response_raises() {
        let dir = TempDir::new().unwrap();
        let body = write_temp_file(&dir, "stored.json", r#"{"foo": "bar"}"#);

        cmd()
            .args([
                "--spec",
                spec().as_str(),
                "response",
                "/books/<isbn>",
                "-m",
                "put",
                "-s",
                "201",
                "--body",
                body.to_str().unwrap(),
                "--emit-error",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Validation failed"));
    }

    #[test]
    fn warning_only_passes() {
        cmd()
            .args([
                "--spec",
                spec().as_str(),
                "response",
                "/no-default-response-schema",
                "-s",
                "400",
                "--text",
                "OK",
                "--emit-warning",
            ])
            .assert()
            .success()
            .stderr(predicate::str::contains("Validation of response failed"));
    }

    #[test]
    fn no_response_schemas() {
        cmd()
            .args([
                "--spec",
                spec().as_str(),
                "response",
                "/no-response-schema",
                "-s",
                "200",
                "--emit-error",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("response schemas not found"));
    }
}

mod error_handling {
    use super::*;

    #[test]
    fn spec_not_found() {
        cmd()
            .args(["--spec", "/nonexistent/oas.json", "request", "/health"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("not found"));
    }

    #[test]
    fn spec_invalid_json() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "oas.json", "not json");

        cmd()
            .args(["--spec", spec.to_str().unwrap(), "request", "/health"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid JSON"));
    }

    #[test]
    fn unknown_method() {
        cmd()
            .args(["--spec", spec().as_str(), "request", "/health", "-m", "delete"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("no schema defined for delete /health"));
    }

    #[test]
    fn bad_param_syntax() {
        cmd()
            .args(["--spec", spec().as_str(), "request", "/health", "-p", "novalue"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("NAME=VALUE"));
    }

    #[test]
    fn status_required_for_response() {
        cmd()
            .args(["--spec", spec().as_str(), "response", "/health"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--status"));
    }
}

mod help_and_version {
    use super::*;

    #[test]
    fn help() {
        cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("schemas"))
            .stdout(predicate::str::contains("request"))
            .stdout(predicate::str::contains("response"));
    }

    #[test]
    fn version() {
        cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("oas-schema"));
    }
}
