use console::style;
use crate::cli::commands::TemplateArgs;
use crate::errors::ScanError;
use crate::template::{Template, TemplateLibrary};

/// Load every template and report the ones that fail. Fails with the first
/// load error when any template is malformed.
pub async fn handle_validate(args: TemplateArgs) -> Result<(), ScanError> {
    let library = TemplateLibrary::load(&args.paths)?;

    for template in &library.templates {
        println!(
            "{} {} ({} steps, {} matchers)",
            style("[ OK ]").green(),
            template.id,
            template.steps.len(),
            template.matcher_count()
        );
    }
    for skipped in &library.skipped {
        println!("{} {}: {}", style("[FAIL]").red(), skipped.path.display(), skipped.error);
    }
    println!(
        "\n{} valid, {} invalid",
        library.templates.len(),
        library.skipped.len()
    );

    match library.skipped.into_iter().next() {
        Some(first) => Err(first.error),
        None => Ok(()),
    }
}

pub async fn handle_list(args: TemplateArgs) -> Result<(), ScanError> {
    let library = TemplateLibrary::load(&args.paths)?;
    let mut templates: Vec<_> = library.templates.iter().map(|t| t.as_ref()).collect();
    templates.sort_by(|a, b| {
        a.info.severity.rank()
            .cmp(&b.info.severity.rank())
            .then_with(|| a.id.cmp(&b.id))
    });

    for template in &templates {
        println!("{}", format_listing(template));
    }
    println!("\n{} templates", templates.len());
    if !library.skipped.is_empty() {
        println!("{} files skipped, run `rwscan validate` for details", library.skipped.len());
    }
    Ok(())
}

fn format_listing(template: &Template) -> String {
    format!(
        "{:<40} {:<9} {:<16} {}",
        template.id,
        template.info.severity.as_str(),
        template.info.category,
        template.info.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const GOOD: &str = "id: good\ninfo:\n  name: Good one\n  severity: low\nhttp:\n  - path: '{{BaseURL}}/'\n    matchers:\n      - type: status\n        status: [200]\n";

    #[tokio::test]
    async fn test_validate_ok() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.yaml"), GOOD).unwrap();
        let args = TemplateArgs { paths: vec![dir.path().to_path_buf()] };
        assert!(handle_validate(args).await.is_ok());
    }

    #[tokio::test]
    async fn test_validate_reports_malformed() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.yaml"), GOOD).unwrap();
        fs::write(dir.path().join("bad.yaml"), "id: bad\nhttp:\n  - method: GET\n").unwrap();
        let args = TemplateArgs { paths: vec![dir.path().to_path_buf()] };
        let err = handle_validate(args).await.unwrap_err();
        assert_eq!(err.classify().exit_code, 4);
    }

    #[tokio::test]
    async fn test_list_missing_path() {
        let args = TemplateArgs { paths: vec!["/definitely/not/here".into()] };
        assert!(matches!(handle_list(args).await, Err(ScanError::Config(_))));
    }

    #[test]
    fn test_listing_columns() {
        let template = crate::template::parse_template_str(GOOD, "good", Some("cms")).unwrap();
        let line = format_listing(&template);
        assert!(line.starts_with("good "));
        assert!(line.contains(" low "));
        assert!(line.contains(" cms "));
        assert!(line.ends_with("Good one"));
    }
}
