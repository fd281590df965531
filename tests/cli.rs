use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn ans_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("ans");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    // Create test documents
    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(
        files_dir.join("photosynthesis.md"),
        "# Photosynthesis\n\nPlants convert sunlight into chemical energy using chlorophyll.\n\nThe light reactions happen in the thylakoid membranes of the chloroplast.",
    ).unwrap();
    fs::write(
        files_dir.join("rome.md"),
        "# Roman History\n\nThe Roman Empire reached its greatest territorial extent under Trajan.\n\nThe empire was later split into western and eastern halves.",
    ).unwrap();
    fs::write(
        files_dir.join("cells.txt"),
        "Mitochondria produce energy for the cell through respiration.\n\nThe cell membrane controls what enters and leaves the cell.",
    ).unwrap();

    let config_content = format!(
        r#"[chunking]
max_chars = 400
overlap_chars = 60

[retrieval]
top_k = 5

[corpus]
root = "{}/files"
include_globs = ["**/*.md", "**/*.txt"]
exclude_globs = []
follow_symlinks = false
"#,
        root.display()
    );

    let config_path = config_dir.join("ans.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_ans(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = ans_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ans binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_corpus_lists_documents() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_ans(&config_path, &["corpus"]);
    assert!(success, "corpus failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("3 documents"));
    assert!(stdout.contains("photosynthesis.md"));
    assert!(stdout.contains("cells.txt"));
}

#[test]
fn test_chunks_shows_every_document() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_ans(&config_path, &["chunks"]);
    assert!(success, "chunks failed: {}", stdout);
    assert!(stdout.contains("photosynthesis.md"));
    assert!(stdout.contains("rome.md"));
    assert!(stdout.contains("chunks)"));
}

#[test]
fn test_chunks_filter_by_doc() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_ans(&config_path, &["chunks", "--doc", "rome.md"]);
    assert!(success);
    assert!(stdout.contains("rome.md"));
    assert!(!stdout.contains("photosynthesis.md"));
}

#[test]
fn test_chunks_unknown_doc_errors() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_ans(&config_path, &["chunks", "--doc", "missing.md"]);
    assert!(!success, "Unknown doc id should fail");
    assert!(stderr.contains("missing.md"), "got: {}", stderr);
}

#[test]
fn test_rank_finds_relevant_document() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_ans(&config_path, &["rank", "chlorophyll sunlight"]);
    assert!(success, "rank failed: {}", stdout);
    assert!(
        stdout.contains("photosynthesis"),
        "Expected photosynthesis in results, got: {}",
        stdout
    );
}

#[test]
fn test_rank_deterministic() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout1, _, _) = run_ans(&config_path, &["rank", "energy"]);
    let (stdout2, _, _) = run_ans(&config_path, &["rank", "energy"]);
    assert_eq!(
        stdout1, stdout2,
        "Ranking should be deterministic across runs"
    );
}

#[test]
fn test_rank_no_matches() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_ans(&config_path, &["rank", "xyznonexistent"]);
    assert!(success);
    assert!(stdout.contains("no matches"));
}

#[test]
fn test_rank_empty_query() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_ans(&config_path, &["rank", ""]);
    assert!(success, "Empty query should not panic");
    assert!(stdout.contains("no matches"));
}

#[test]
fn test_ask_with_disabled_provider_reports_in_band_error() {
    let (_tmp, config_path) = setup_test_env();

    // Default provider is disabled; the failure is answer data, exit 0.
    let (stdout, stderr, success) = run_ans(&config_path, &["ask", "what is chlorophyll"]);
    assert!(success, "ask should exit 0: stderr={}", stderr);
    assert!(
        stdout.contains("error: disabled:"),
        "Expected in-band disabled error, got: {}",
        stdout
    );
}

#[test]
fn test_ask_json_output_has_error_field() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_ans(&config_path, &["ask", "what is chlorophyll", "--json"]);
    assert!(success);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["error"]["kind"], "disabled");
    assert_eq!(value["answer_text"], "");
    assert!(value["confidence"].is_number());
}

#[test]
fn test_summarize_missing_doc_errors() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_ans(&config_path, &["summarize", "nope.md"]);
    assert!(!success, "summarize with missing id should fail");
    assert!(stderr.contains("nope.md"), "got: {}", stderr);
}

#[test]
fn test_missing_config_errors() {
    let (_tmp, config_path) = setup_test_env();
    let missing = config_path.with_file_name("absent.toml");

    let (_, stderr, success) = run_ans(&missing, &["corpus"]);
    assert!(!success, "Missing config should fail");
    assert!(stderr.contains("config"), "got: {}", stderr);
}

#[test]
fn test_invalid_config_errors() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("config").join("bad.toml");
    fs::write(&bad, "[chunking]\nmax_chars = 100\noverlap_chars = 100\n").unwrap();

    let (_, stderr, success) = run_ans(&bad, &["corpus"]);
    assert!(!success, "Invalid config should fail");
    assert!(
        stderr.contains("overlap_chars"),
        "Should mention the invalid field, got: {}",
        stderr
    );
}

#[test]
fn test_enabled_provider_without_model_errors() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("config").join("gemini.toml");
    fs::write(&bad, "[generation]\nprovider = \"gemini\"\n").unwrap();

    let (_, stderr, success) = run_ans(&bad, &["ask", "anything"]);
    assert!(!success, "Enabled provider without a model should fail");
    assert!(stderr.contains("model"), "got: {}", stderr);
}
