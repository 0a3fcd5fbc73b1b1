//! Output filename for a resource.

/// Used when neither an explicit name nor the URL path yields anything usable.
const DEFAULT_FILENAME: &str = "download.bin";
/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Picks the on-disk name: the explicit `filename` if given, else the last
/// non-empty path segment of `primary_url`. The result is always a single
/// path component.
pub fn output_filename(filename: Option<&str>, primary_url: &str) -> String {
    let raw = match filename {
        Some(name) => Some(name.to_string()),
        None => last_path_segment(primary_url),
    };
    let cleaned = raw.map(|r| sanitize(&r)).unwrap_or_default();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        cleaned
    }
}

fn last_path_segment(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?;
    let decoded = percent_encoding::percent_decode_str(segment).decode_utf8_lossy();
    Some(decoded.into_owned())
}

/// Replaces separators and control characters with `_`, trims whitespace and
/// trailing dots, and clamps to NAME_MAX bytes. Leading dots stay, so
/// dot-files keep their names.
fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = replaced
        .trim()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace());

    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_from_last_segment() {
        assert_eq!(output_filename(None, "http://h/a.txt"), "a.txt");
        assert_eq!(
            output_filename(None, "https://cdn.example.com/x/y/tool-1.2.tar.gz?sig=abc"),
            "tool-1.2.tar.gz"
        );
        assert_eq!(output_filename(None, "https://example.com/dir/"), "dir");
    }

    #[test]
    fn explicit_name_wins() {
        assert_eq!(
            output_filename(Some("renamed.bin"), "http://h/a.txt"),
            "renamed.bin"
        );
    }

    #[test]
    fn names_cannot_escape_the_destination() {
        assert_eq!(output_filename(Some("../../etc/passwd"), "http://h/a"), ".._.._etc_passwd");
        assert_eq!(output_filename(Some(".."), "http://h/a"), DEFAULT_FILENAME);
        assert_eq!(output_filename(Some("."), "http://h/a"), DEFAULT_FILENAME);
        assert_eq!(output_filename(Some("..."), "http://h/a"), DEFAULT_FILENAME);
        assert_eq!(output_filename(None, "http://h/%2E%2E"), DEFAULT_FILENAME);
        assert_eq!(output_filename(None, "http://h/a%2Fb"), "a_b");
    }

    #[test]
    fn dot_files_keep_their_leading_dot() {
        assert_eq!(output_filename(Some(".env"), "http://h/x"), ".env");
        assert_eq!(output_filename(None, "http://h/.bashrc"), ".bashrc");
        assert_eq!(output_filename(Some(" name.txt. "), "http://h/x"), "name.txt");
    }

    #[test]
    fn url_segments_are_percent_decoded() {
        assert_eq!(output_filename(None, "http://h/my%20tool.tgz"), "my tool.tgz");
        assert_eq!(output_filename(None, "http://h/caf%C3%A9.txt"), "café.txt");
    }

    #[test]
    fn falls_back_when_url_has_no_path() {
        assert_eq!(output_filename(None, "https://example.com/"), DEFAULT_FILENAME);
        assert_eq!(output_filename(None, "https://example.com"), DEFAULT_FILENAME);
        assert_eq!(output_filename(None, "not a url"), DEFAULT_FILENAME);
    }
}
