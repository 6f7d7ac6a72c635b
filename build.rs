use std::path::{Path, PathBuf};
use std::process::Command;

const EXCLUDED_DIRS: &[&str] = &["target", ".git"];

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/main");
    println!("cargo:rerun-if-changed=src");

    let sha = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
            } else {
                None
            }
        })
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=CRM_MOBILE_GIT_SHA={}", sha);

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set");
    let root = PathBuf::from(&manifest_dir);
    let mut rust_files = Vec::new();
    walk_directory(&root.join("src"), &mut rust_files);

    enforce_no_dead_code_allows(&root, &rust_files);
    enforce_serial_for_env_mutations(&root, &rust_files);
}

fn walk_directory(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if path.is_dir() {
            if !EXCLUDED_DIRS.contains(&name.as_ref()) {
                walk_directory(&path, files);
            }
        } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
            files.push(path);
        }
    }
}

fn report(root: &Path, title: &str, violations: &[(PathBuf, usize, String)], hint: &[&str]) {
    eprintln!("\n========================================");
    eprintln!("{}", title);
    eprintln!("========================================");
    eprintln!();
    for (path, line_num, message) in violations {
        let rel_path = path.strip_prefix(root).unwrap_or(path);
        eprintln!("  {}:{}", rel_path.display(), line_num);
        eprintln!("    {}", message);
        eprintln!();
    }
    eprintln!("========================================");
    for line in hint {
        eprintln!("{}", line);
    }
    eprintln!("========================================\n");
}

fn enforce_no_dead_code_allows(root: &Path, rust_files: &[PathBuf]) {
    let mut violations = Vec::new();

    for file in rust_files {
        let Ok(content) = std::fs::read_to_string(file) else {
            continue;
        };
        for (line_num, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if (trimmed.starts_with("#[allow(") || trimmed.starts_with("#![allow("))
                && trimmed.contains("dead_code")
            {
                violations.push((file.clone(), line_num + 1, trimmed.to_string()));
            }
        }
    }

    if !violations.is_empty() {
        report(
            root,
            "#[allow(dead_code)] IS NOT ALLOWED",
            &violations,
            &[
                "Delete unused code, or gate test-only helpers with #[cfg(test)].",
            ],
        );
        panic!(
            "Build failed: {} #[allow(dead_code)] occurrence(s) found. Remove the dead code.",
            violations.len()
        );
    }
}

fn enforce_serial_for_env_mutations(root: &Path, rust_files: &[PathBuf]) {
    let mut violations = Vec::new();

    for file in rust_files {
        let Ok(content) = std::fs::read_to_string(file) else {
            continue;
        };

        let mut has_serial = false;
        let mut in_test_fn = false;
        let mut test_fn_start = 0;
        let mut brace_depth = 0i32;

        for (i, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed == "#[serial]" || trimmed == "#[serial_test::serial]" {
                has_serial = true;
            }
            if trimmed == "#[test]" || trimmed.starts_with("#[tokio::test") {
                in_test_fn = true;
                test_fn_start = i + 1;
                brace_depth = 0;
                continue;
            }
            if !in_test_fn {
                continue;
            }

            if !has_serial
                && !trimmed.starts_with("//")
                && (trimmed.contains("env::set_var") || trimmed.contains("env::remove_var"))
            {
                violations.push((
                    file.clone(),
                    test_fn_start,
                    "test mutates the environment without #[serial]".to_string(),
                ));
                in_test_fn = false;
                continue;
            }

            for c in line.chars() {
                match c {
                    '{' => brace_depth += 1,
                    '}' => {
                        brace_depth -= 1;
                        if brace_depth == 0 {
                            in_test_fn = false;
                            has_serial = false;
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    if !violations.is_empty() {
        report(
            root,
            "ENV MUTATIONS REQUIRE #[serial]",
            &violations,
            &[
                "Tests that change CRM_MOBILE_HOME or other process env vars",
                "must be marked #[serial] (serial_test) to avoid flaky runs.",
            ],
        );
        panic!(
            "Build failed: {} test(s) mutate env vars without #[serial].",
            violations.len()
        );
    }
}
