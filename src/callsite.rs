//! Attribute a log line to the application code that ran the query.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

/// Frames skipped before looking for a caller: the resolver itself and the
/// logger method that invoked it.
const SKIP_FRAMES: usize = 2;

/// Frames inspected after the skipped ones.
const MAX_DEPTH: usize = 15;

// Compiled once, the patterns are constant.
static CALLSITE_FILE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"callsite\.rs$").unwrap());

static TOOLKIT_FRAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        [/\\](?:sea-orm|sea-query|sqlx[\w-]*|async-trait|tokio|futures[\w-]*)-\d[^/\\]*[/\\]
        | ^/rustc/
        | [/\\]library[/\\](?:std|core|alloc)[/\\]src[/\\]",
    )
    .unwrap()
});

// Frames of the unwinder itself, not counted towards the depth
static UNWINDER_FRAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[/\\]backtrace-\d[^/\\]*[/\\]").unwrap());

static TEST_FILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[/\\])tests[/\\](?:[^/\\]+[/\\])*[^/\\]+\.rs$").unwrap()
});

/// Source directory of this crate, in the form rustc recorded it and anchored
/// at the manifest directory.
static SOURCE_DIRS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    let recorded = PathBuf::from(CALLSITE_FILE_REGEX.replace(file!(), "").into_owned());
    let anchored = Path::new(env!("CARGO_MANIFEST_DIR")).join(&recorded);

    if recorded == anchored {
        vec![recorded]
    } else {
        vec![recorded, anchored]
    }
});

/// Whether a frame from `file` belongs to this crate or the database toolkit.
pub fn is_internal(file: &str) -> bool {
    let path = Path::new(file);
    SOURCE_DIRS.iter().any(|dir| path.starts_with(dir)) || TOOLKIT_FRAME_REGEX.is_match(file)
}

/// Whether a frame from `file` should be reported as the caller.
///
/// Test files are always reported, even when they sit next to internal code.
pub fn is_caller(file: &str) -> bool {
    !is_internal(file) || TEST_FILE_REGEX.is_match(file)
}

/// Return `file:line` of the first frame outside this crate and the database
/// toolkit, or an empty string when none is found within the depth limit.
pub fn file_with_line_num() -> String {
    let mut depth = 0;
    let mut found: Option<String> = None;

    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            if found.is_some() || depth >= SKIP_FRAMES + MAX_DEPTH {
                return;
            }
            let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) else {
                return;
            };
            let file = file.to_string_lossy();
            if UNWINDER_FRAME_REGEX.is_match(&file) {
                return;
            }

            depth += 1;
            if depth > SKIP_FRAMES && is_caller(&file) {
                found = Some(format!("{}:{}", file, line));
            }
        });

        found.is_none() && depth < SKIP_FRAMES + MAX_DEPTH
    });

    found.unwrap_or_default()
}
