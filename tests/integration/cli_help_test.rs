use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const ECHO_TEMPLATE: &str = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:output method="text"/>
  <xsl:param name="TedTimbre"/>
  <xsl:template match="/"><xsl:value-of select="//Folio"/>:<xsl:value-of select="substring($TedTimbre, 1, 22)"/></xsl:template>
</xsl:stylesheet>"#;

fn xslmapper() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("xslmapper"));
    for var in [
        "XSLMAPPER_CONTAINERS_MAPPERS",
        "XSLMAPPER_CONTAINERS_EXTENSION_OBJECTS",
        "XSLMAPPER_STORE_BACKEND",
        "XSLMAPPER_STORE_ROOT",
        "XSLMAPPER_STORE_BASE_URL",
        "XSLMAPPER_STORE_SAS_TOKEN",
        "XSLMAPPER_ENCODE_BASE64_OUTPUT",
        "XSLMAPPER_SERVER_BIND",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// A working directory with a filesystem store under ./blobs.
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("blobs/mappers/dte")).unwrap();
    fs::write(dir.path().join("blobs/mappers/dte/echo.xsl"), ECHO_TEMPLATE).unwrap();
    fs::write(
        dir.path().join("dte.xml"),
        "<DTE><Folio>42</Folio><TED><DD/></TED></DTE>",
    )
    .unwrap();
    dir
}

#[test]
fn test_top_level_help_lists_mapper_commands() {
    xslmapper()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("MAPPER COMMANDS"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("transform"))
        .stdout(predicate::str::contains("check-template"));
}

#[test]
fn test_transform_help_shows_module_syntax() {
    xslmapper()
        .args(["transform", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DIR/NAME=NAMESPACE#CLASS"))
        .stdout(predicate::str::contains("Example:"));
}

#[test]
fn test_version_flag() {
    xslmapper()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(xslmapper::VERSION));
}

#[test]
fn test_transform_writes_result_to_stdout() {
    let dir = workspace();
    xslmapper()
        .current_dir(dir.path())
        .args(["transform", "--template", "dte/echo.xsl", "--input", "dte.xml"])
        .assert()
        .success()
        .stdout("42:data:image/png;base64,");
}

#[test]
fn test_transform_writes_base64_to_file() {
    let dir = workspace();
    xslmapper()
        .current_dir(dir.path())
        .args([
            "transform",
            "--template",
            "dte/echo.xsl",
            "--input",
            "dte.xml",
            "--base64",
            "--output",
            "out.b64",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let written = fs::read_to_string(dir.path().join("out.b64")).unwrap();
    assert_eq!(written, "NDI6ZGF0YTppbWFnZS9wbmc7YmFzZTY0LA==");
}

#[test]
fn test_transform_failure_exits_with_caller_fault_code() {
    let dir = workspace();
    xslmapper()
        .current_dir(dir.path())
        .args(["transform", "--template", "dte/absent.xsl", "--input", "dte.xml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("TemplateNotFound"));
}

#[test]
fn test_check_template_reports_output_settings() {
    let dir = workspace();
    xslmapper()
        .current_dir(dir.path())
        .args(["check-template", "blobs/mappers/dte/echo.xsl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"))
        .stdout(predicate::str::contains("method:   text"))
        .stdout(predicate::str::contains("encoding: utf-8"))
        .stdout(predicate::str::contains("engine:   libxslt 1."));
}

#[test]
fn test_check_template_rejects_broken_stylesheet() {
    let dir = workspace();
    fs::write(dir.path().join("broken.xsl"), "<xsl:stylesheet").unwrap();
    xslmapper()
        .current_dir(dir.path())
        .args(["check-template", "broken.xsl"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("TemplateCompilationFailed"));
}
