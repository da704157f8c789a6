//! Lexical path helpers. Generated documents always use Windows separators,
//! no matter which OS runs the generator, so nothing here touches the file system.

const WINDOWS_SEPARATOR: &str = "\\";

/// Converts all separators into Windows ones
#[must_use]
pub fn to_windows(path: &str) -> String {
    path.replace('/', WINDOWS_SEPARATOR)
}

/// Windows style normalization: unified separators, collapsed
/// repeated separators and resolved `.` and `..` segments.
#[must_use]
pub fn normalize(path: &str) -> String {
    let unified = to_windows(path);
    let (root, rest) = split_root(&unified);
    let segments = resolve_segments(rest, !root.is_empty());
    let result = format!("{root}{}", segments.join(WINDOWS_SEPARATOR));
    if result.is_empty() {
        ".".to_owned()
    } else {
        result
    }
}

/// Splits path into folder and file name parts. Folder is empty for bare file names.
#[must_use]
pub fn split(path: &str) -> (String, String) {
    let unified = path.replace('\\', "/");
    match unified.rsplit_once('/') {
        Some((folder, leaf)) => (folder.to_owned(), leaf.to_owned()),
        None => (String::new(), unified),
    }
}

/// Joins relative path to the root specified. Absolute paths are kept as is.
#[must_use]
pub fn join(root: &str, path: &str) -> String {
    if root.is_empty() || is_absolute(path) {
        return path.to_owned();
    }
    let root = root.trim_end_matches(['/', '\\']);
    format!("{root}/{path}")
}

/// Directory part of the path
#[must_use]
pub fn parent(path: &str) -> String {
    split(path).0
}

/// Path relative to the base directory using Windows separators.
/// Both paths are treated lexically as relative to the same location.
#[must_use]
pub fn relative_to(path: &str, base: &str) -> String {
    let target = normalize(path);
    let base = normalize(base);
    let (target_root, target_rest) = split_root(&target);
    let (base_root, base_rest) = split_root(&base);

    if !target_root.eq_ignore_ascii_case(base_root) {
        return target;
    }

    let target_segments = resolve_segments(target_rest, !target_root.is_empty());
    let base_segments = resolve_segments(base_rest, !base_root.is_empty());

    let common = target_segments
        .iter()
        .zip(base_segments.iter())
        .take_while(|(t, b)| t.eq_ignore_ascii_case(b))
        .count();

    // Base that climbs above our common ancestor cannot be expressed lexically
    if base_segments[common..].contains(&"..") {
        return target;
    }

    let ups = std::iter::repeat_n("..", base_segments.len() - common);
    let relative: Vec<&str> = ups.chain(target_segments[common..].iter().copied()).collect();
    if relative.is_empty() {
        ".".to_owned()
    } else {
        relative.join(WINDOWS_SEPARATOR)
    }
}

fn is_absolute(path: &str) -> bool {
    !split_root(path).0.is_empty()
}

/// Splits drive and root separator prefix (`C:\`, `\`, `C:`) from the rest
fn split_root(path: &str) -> (&str, &str) {
    let bytes = path.as_bytes();
    let drive = if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        2
    } else {
        0
    };
    let root = path[drive..]
        .chars()
        .take_while(|c| *c == '\\' || *c == '/')
        .count();
    let end = drive + usize::from(root > 0);
    let rest = path[drive..].trim_start_matches(['\\', '/']);
    (&path[..end], rest)
}

fn resolve_segments(path: &str, rooted: bool) -> Vec<&str> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['\\', '/']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push(segment);
                }
            }
            _ => segments.push(segment),
        }
    }
    segments
}
