use crate::{Error, Result};
use std::path::Path;

/// Parse an octal permission string such as `"0755"`, `"755"` or `"0o644"`.
pub fn parse_mode(mode: &str) -> Result<u32> {
    let trimmed = mode.trim();
    let digits = trimmed
        .strip_prefix("0o")
        .or_else(|| trimmed.strip_prefix("0O"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(Error::InvalidMode {
            mode: mode.to_string(),
        });
    }

    match u32::from_str_radix(digits, 8) {
        Ok(bits) if bits <= 0o7777 => Ok(bits),
        _ => Err(Error::InvalidMode {
            mode: mode.to_string(),
        }),
    }
}

/// Set the permission bits of `path`.
///
/// Windows has no mode bits; there the call only checks that `path` exists.
pub fn set_mode(path: impl AsRef<Path>, mode: u32) -> Result<()> {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
            Error::Write {
                path: path.to_path_buf(),
                source: e,
            }
        })
    }

    #[cfg(not(unix))]
    {
        let _ = mode;
        std::fs::metadata(path).map(|_| ()).map_err(|e| Error::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_spellings() {
        assert_eq!(parse_mode("0755").unwrap(), 0o755);
        assert_eq!(parse_mode("755").unwrap(), 0o755);
        assert_eq!(parse_mode(" 0o644 ").unwrap(), 0o644);
        assert_eq!(parse_mode("4755").unwrap(), 0o4755);
    }

    #[test]
    fn rejects_non_octal() {
        assert!(parse_mode("0789").is_err());
        assert!(parse_mode("rwx").is_err());
        assert!(parse_mode("").is_err());
        assert!(parse_mode("77777").is_err());
    }
}
