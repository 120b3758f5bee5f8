//! Filename policy for chat uploads.

use unicode_normalization::UnicodeNormalization;

/// Names Windows refuses as file names regardless of extension.
const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3",
];

/// Lowercased extension after the last dot, if there is one.
pub fn extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    Some(ext.to_lowercase())
}

/// True when `filename` has an extension contained in `allowed` (case-insensitive).
pub fn allowed_file(filename: &str, allowed: &[String]) -> bool {
    match extension(filename) {
        Some(ext) => allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)),
        None => false,
    }
}

/// Reduce a client-supplied filename to something safe to store.
///
/// The name is NFKD-decomposed and reduced to ASCII, so accented letters keep
/// their base letter. Path separators become spaces, whitespace runs become
/// `_`, and every character outside `[A-Za-z0-9_.-]` is dropped. Leading and
/// trailing dots and underscores are stripped so the result can never be
/// hidden or a relative path. Device names reserved on Windows get a `_` prefix. May
/// return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let folded: String = filename.nfkd().filter(char::is_ascii).collect();
    let separated = folded.replace(['/', '\\'], " ");
    let joined = separated.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');

    let stem = trimmed.split('.').next().unwrap_or_default();
    if WINDOWS_DEVICE_NAMES
        .iter()
        .any(|name| name.eq_ignore_ascii_case(stem))
    {
        return format!("_{}", trimmed);
    }

    trimmed.to_owned()
}

/// Sanitized name for an upload, or None when the upload must be refused.
///
/// The extension is checked both on the name the client sent and on the
/// sanitized result, so sanitizing can never turn an accepted upload into a
/// file without an allowed extension.
pub fn accept_upload_name(filename: &str, allowed: &[String]) -> Option<String> {
    if !allowed_file(filename, allowed) {
        return None;
    }
    let safe = secure_filename(filename);
    if safe.is_empty() || !allowed_file(&safe, allowed) {
        return None;
    }
    Some(safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        crate::app_config::UploadConfig::default().allowed_extensions
    }

    #[test]
    fn test_allowed_file() {
        let allowed = allowed();
        assert!(allowed_file("report.pdf", &allowed));
        assert!(allowed_file("photo.JPEG", &allowed));
        assert!(allowed_file("archive.tar.png", &allowed));
        assert!(!allowed_file("evil.exe", &allowed));
        assert!(!allowed_file("pdf", &allowed));
        assert!(!allowed_file("", &allowed));
        assert!(!allowed_file("trailing.", &allowed));
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("..\\windows\\win.ini"), "windows_win.ini");
        assert_eq!(secure_filename("i contain cool ümläuts.txt"), "i_contain_cool_umlauts.txt");
        assert_eq!(secure_filename("résumé.pdf"), "resume.pdf");
        assert_eq!(secure_filename("ﬁle №1.png"), "file_No1.png");
        assert_eq!(secure_filename("日本語.pdf"), "pdf");
        assert_eq!(secure_filename(".hidden.png"), "hidden.png");
        assert_eq!(secure_filename("___"), "");
    }

    #[test]
    fn test_secure_filename_windows_devices() {
        assert_eq!(secure_filename("con.png"), "_con.png");
        assert_eq!(secure_filename("LPT1"), "_LPT1");
        assert_eq!(secure_filename("console.png"), "console.png");
    }

    #[test]
    fn test_accept_upload_name() {
        let allowed = allowed();
        assert_eq!(
            accept_upload_name("report.pdf", &allowed),
            Some("report.pdf".to_string())
        );
        assert_eq!(
            accept_upload_name("../../report.PDF", &allowed),
            Some("report.PDF".to_string())
        );
        assert_eq!(accept_upload_name("evil.exe", &allowed), None);
        // Sanitizing strips everything but the extension, leaving no usable name
        assert_eq!(accept_upload_name("../.png", &allowed), None);
        assert_eq!(accept_upload_name("日本.png", &allowed), None);
    }
}
