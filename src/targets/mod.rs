use std::path::Path;
use crate::errors::ScanError;
use tracing::info;

/// Resolve the `-u` argument into target base URLs.
///
/// A `.txt` argument naming an existing file yields one URL per non-empty
/// trimmed line; anything else is taken as a single literal URL.
pub async fn load_targets(arg: &str) -> Result<Vec<String>, ScanError> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(ScanError::InvalidTarget("no target given".into()));
    }

    let path = Path::new(arg);
    if arg.ends_with(".txt") && tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false) {
        let content = tokio::fs::read_to_string(path).await?;
        let urls = parse_target_list(&content);
        if urls.is_empty() {
            return Err(ScanError::InvalidTarget(format!("{} contains no URLs", arg)));
        }
        info!(file = %arg, count = urls.len(), "Loaded targets");
        return Ok(urls);
    }

    Ok(vec![arg.to_string()])
}

pub fn parse_target_list(content: &str) -> Vec<String> {
    content.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_list_skips_blank_lines() {
        let urls = parse_target_list("http://a\n\n  http://b  \r\n\t\nhttps://c:8443/app\n");
        assert_eq!(urls, vec!["http://a", "http://b", "https://c:8443/app"]);
    }

    #[tokio::test]
    async fn test_literal_url() {
        assert_eq!(load_targets("http://10.0.0.1:8080").await.unwrap(), vec!["http://10.0.0.1:8080"]);
    }

    #[tokio::test]
    async fn test_missing_txt_is_literal() {
        assert_eq!(load_targets("nope.txt").await.unwrap(), vec!["nope.txt"]);
    }

    #[tokio::test]
    async fn test_txt_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("urls.txt");
        std::fs::write(&file, "http://a\nhttp://b\n").unwrap();
        let urls = load_targets(file.to_str().unwrap()).await.unwrap();
        assert_eq!(urls, vec!["http://a", "http://b"]);
    }

    #[tokio::test]
    async fn test_empty_txt_file_is_invalid_target() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("urls.txt");
        std::fs::write(&file, "\n   \n").unwrap();
        let err = load_targets(file.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, ScanError::InvalidTarget(_)));
        assert_eq!(err.classify().exit_code, 3);
    }

    #[tokio::test]
    async fn test_blank_argument() {
        assert!(matches!(load_targets("  ").await, Err(ScanError::InvalidTarget(_))));
    }
}
