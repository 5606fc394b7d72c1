//! Tests for diff primitives.

use super::api::parse_name_status_line;
use super::*;
use crate::error::VdiffError;
use crate::test_support::{commit_files, create_test_repo};

#[test]
fn test_parse_hunk_header_with_lengths() {
    let header = parse_hunk_header("@@ -10,0 +11,2 @@ fn existing_function() {").unwrap();
    assert_eq!(
        header,
        HunkHeader {
            old_start: 10,
            old_len: 0,
            new_start: 11,
            new_len: 2,
        }
    );
    assert_eq!(header.old_lines_before(), 10);
}

#[test]
fn test_parse_hunk_header_omitted_lengths_default_to_one() {
    let header = parse_hunk_header("@@ -3 +4 @@").unwrap();
    assert_eq!(header.old_len, 1);
    assert_eq!(header.new_len, 1);
    assert_eq!(header.old_lines_before(), 2);
}

#[test]
fn test_parse_hunk_header_rejects_other_lines() {
    assert!(parse_hunk_header("+@@ -1 +1 @@").is_none());
    assert!(parse_hunk_header("@@ garbage @@").is_none());
    assert!(parse_hunk_header(" context").is_none());
}

#[test]
fn test_split_git_diff_keeps_header_lookalikes_in_hunks() {
    let diff = "diff --git a/src/a.c b/src/a.c
index abc1234..def5678 100644
--- a/src/a.c
+++ b/src/a.c
@@ -2,1 +2,1 @@
--- removed line that looks like a header
+++ added line that looks like a header
diff --git a/src/b.h b/src/b.h
new file mode 100644
--- /dev/null
+++ b/src/b.h
@@ -0,0 +1,2 @@
+#ifndef B_H
+#endif
";

    let files = split_file_diffs(diff);

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].path.as_deref(), Some("src/a.c"));
    assert_eq!(
        files[0].hunks,
        "@@ -2,1 +2,1 @@\n--- removed line that looks like a header\n+++ added line that looks like a header\n"
    );
    assert_eq!(files[1].path.as_deref(), Some("src/b.h"));
    assert_eq!(files[1].hunks, "@@ -0,0 +1,2 @@\n+#ifndef B_H\n+#endif\n");
}

#[test]
fn test_split_plain_unified_diff() {
    let diff = "--- old/x.c\t2024-01-01 10:00:00\n+++ new/x.c\t2024-01-02 10:00:00\n@@ -1 +1 @@\n-a\n+b\n";

    let files = split_file_diffs(diff);

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path.as_deref(), Some("new/x.c"));
    assert_eq!(files[0].hunks, "@@ -1 +1 @@\n-a\n+b\n");
}

#[test]
fn test_split_bare_hunks_have_no_path() {
    let files = split_file_diffs("@@ -1 +1 @@\n-a\n+b\n");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, None);
}

#[test]
fn test_full_diff_interleaves_unchanged_lines() {
    let before = "l1\nl2\nl3\nl4\n";
    let hunks = "@@ -2,1 +2,2 @@\n-l2\n+L2\n+L2b\n";

    let full = full_diff(before, hunks).unwrap();

    assert_eq!(full, " l1\n-l2\n+L2\n+L2b\n l3\n l4");
}

#[test]
fn test_full_diff_insertion_at_start() {
    let full = full_diff("a\nb\n", "@@ -0,0 +1 @@\n+new\n").unwrap();
    assert_eq!(full, "+new\n a\n b");
}

#[test]
fn test_full_diff_translates_no_newline_marker() {
    let hunks = "@@ -2 +2 @@\n-b\n\\ No newline at end of file\n+c\n\\ No newline at end of file\n";

    let full = full_diff("a\nb", hunks).unwrap();

    assert_eq!(full, " a\n-b\n\n+c\n");
}

#[test]
fn test_full_diff_strips_byte_order_marks() {
    let full = full_diff("\u{feff}#if A\n#endif\n", "@@ -2,0 +3 @@\n+int x;\n").unwrap();
    assert_eq!(full, " #if A\n #endif\n+int x;");
}

#[test]
fn test_full_diff_without_hunks_is_all_context() {
    assert_eq!(full_diff("a\nb\n", "").unwrap(), " a\n b");
}

#[test]
fn test_full_diff_rejects_hunk_past_end_of_file() {
    let err = full_diff("a\n", "@@ -5,1 +5,1 @@\n-x\n+y\n").unwrap_err();
    assert!(matches!(err, VdiffError::InvalidPatch(_)));
}

#[test]
fn test_full_diff_rejects_overlapping_hunks() {
    let hunks = "@@ -3,1 +3,1 @@\n-c\n+C\n@@ -1,1 +1,1 @@\n-a\n+A\n";
    let err = full_diff("a\nb\nc\n", hunks).unwrap_err();
    assert!(matches!(err, VdiffError::InvalidPatch(_)));
}

#[test]
fn test_parse_name_status_lines() {
    let modified = parse_name_status_line("M\tsrc/a.c").unwrap();
    assert_eq!(modified.change, ChangeKind::Modified);
    assert_eq!(modified.path(), "src/a.c");
    assert_eq!(modified.old_path, modified.new_path);

    let added = parse_name_status_line("A\tnew.h").unwrap();
    assert_eq!(added.change, ChangeKind::Added);
    assert_eq!(added.old_path, None);

    let deleted = parse_name_status_line("D\told.c").unwrap();
    assert_eq!(deleted.change, ChangeKind::Deleted);
    assert_eq!(deleted.path(), "old.c");

    let renamed = parse_name_status_line("R087\told.c\tnew.c").unwrap();
    assert_eq!(renamed.change, ChangeKind::Renamed);
    assert_eq!(renamed.old_path.as_deref(), Some("old.c"));
    assert_eq!(renamed.path(), "new.c");

    assert!(parse_name_status_line("").is_err());
}

#[test]
fn test_commit_retrieval_reconstructs_full_diffs() {
    let repo = create_test_repo();
    let path = repo.path();
    let first = commit_files(path, &[("src/a.c", Some("#if A\nint a;\n#endif\n"))], "add a");
    let second = commit_files(
        path,
        &[
            ("src/a.c", Some("#if A\nint a;\n#else\nint b;\n#endif\n")),
            ("src/b.h", Some("int b;\n")),
            ("README.md", None),
        ],
        "edit a",
    );

    assert_eq!(resolve_commit(path, "HEAD").unwrap(), second);
    let parent = first_parent(path, &second).unwrap();
    assert_eq!(parent.as_deref(), Some(first.as_str()));

    let files = changed_files(path, parent.as_deref(), &second).unwrap();
    let kinds: Vec<(ChangeKind, &str)> = files.iter().map(|f| (f.change, f.path())).collect();
    assert_eq!(
        kinds,
        vec![
            (ChangeKind::Deleted, "README.md"),
            (ChangeKind::Modified, "src/a.c"),
            (ChangeKind::Added, "src/b.h"),
        ]
    );

    let full: Vec<String> = files
        .iter()
        .map(|file| full_diff_for(path, parent.as_deref(), &second, file).unwrap())
        .collect();
    assert_eq!(full[0], "-# Test Repo");
    assert_eq!(full[1], " #if A\n int a;\n+#else\n+int b;\n #endif");
    assert_eq!(full[2], "+int b;");
}

#[test]
fn test_root_commit_is_compared_against_empty_tree() {
    let repo = create_test_repo();
    let path = repo.path();
    let root = resolve_commit(path, "HEAD").unwrap();

    assert_eq!(first_parent(path, &root).unwrap(), None);

    let files = changed_files(path, None, &root).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].change, ChangeKind::Added);
    assert_eq!(
        full_diff_for(path, None, &root, &files[0]).unwrap(),
        "+# Test Repo"
    );
}
