//! Subcommand implementations

use anyhow::{bail, Context, Result};
use keypath::Value;
use renderer::{
    DocumentSink, HtmlDocument, PdfContext, PdfRenderer, Renderer, RendererFactory,
    RendererSettings, SettingsManager, WordRenderer,
};
use std::path::{Path, PathBuf};
use word_template::{TemplateDocument, UnresolvedPolicy};

pub struct RenderArgs {
    pub template: PathBuf,
    pub data: PathBuf,
    pub output: Option<PathBuf>,
    pub strict: bool,
    pub case_sensitive: bool,
    pub settings: Option<PathBuf>,
}

pub fn render(args: RenderArgs) -> Result<()> {
    let mut settings = load_settings(args.settings.as_deref())?;
    if args.strict {
        settings.template.unresolved = UnresolvedPolicy::Fail;
    }
    if args.case_sensitive {
        settings.template.case_insensitive = false;
    }

    let data = read_data(&args.data)?;
    tracing::debug!("Binding {} variables from {}", data.len(), args.data.display());

    let Some(destination) = args.output.or_else(|| settings.output.save_path.clone()) else {
        bail!("No output path given and none configured in the settings");
    };

    let factory = RendererFactory::new(settings);
    let mut renderer = factory
        .create_for(&destination, Some(args.template.as_path()))
        .with_context(|| format!("Failed to load template {}", args.template.display()))?;

    for (key, value) in data {
        renderer.assign(&key, value)?;
    }

    let written = renderer
        .save(Some(destination.as_path()))
        .context("Failed to save rendered document")?;

    println!("{}", written.display());
    Ok(())
}

pub fn placeholders(template: &Path) -> Result<()> {
    let document = TemplateDocument::open(template)
        .with_context(|| format!("Failed to load template {}", template.display()))?;

    for key_path in document.placeholders() {
        println!("{key_path}");
    }
    Ok(())
}

pub fn text(output: &Path, lines: &[String]) -> Result<()> {
    let is_pdf = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    let saved = if is_pdf {
        let mut renderer =
            PdfRenderer::with_context(PdfContext::Html(HtmlDocument::new()), Default::default());
        add_lines(renderer.sink(), lines);
        renderer.save(Some(output))
    } else {
        let mut renderer = WordRenderer::new();
        add_lines(renderer.sink(), lines);
        renderer.save(Some(output))
    };
    saved.with_context(|| format!("Failed to write {}", output.display()))?;

    println!("{}", output.display());
    Ok(())
}

fn add_lines(sink: Option<&mut dyn DocumentSink>, lines: &[String]) {
    if let Some(sink) = sink {
        for line in lines {
            sink.add_text(line);
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<RendererSettings> {
    let Some(path) = path else {
        return Ok(RendererSettings::default());
    };

    let mut manager = SettingsManager::new(path);
    manager
        .load_sync()
        .with_context(|| format!("Failed to read settings {}", path.display()))?;
    Ok(manager.into_settings())
}

fn read_data(path: &Path) -> Result<serde_json::Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;

    match value {
        Value::Object(map) => Ok(map),
        other => bail!(
            "Data file {} must contain a JSON object, found {}",
            path.display(),
            keypath::type_name(&other)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use store::{DocxReader, DocxWriter};
    use tempfile::tempdir;

    #[test]
    fn test_read_data_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"{"name": "Ada", "author": {"firstName": "Jon"}}"#).unwrap();

        let data = read_data(&path).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data["name"], Value::from("Ada"));
    }

    #[test]
    fn test_read_data_rejects_non_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let err = read_data(&path).unwrap_err();
        assert!(err.to_string().contains("found array"));
    }

    #[test]
    fn test_render_command() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("template.docx");
        DocxWriter::new(File::create(&template).unwrap())
            .write("<w:p><w:r><w:t>{NAME} by {author.firstName}</w:t></w:r></w:p>")
            .unwrap();
        let data = dir.path().join("data.json");
        std::fs::write(&data, r#"{"name": "Report", "author": {"firstName": "Jon"}}"#).unwrap();
        let output = dir.path().join("out.docx");

        render(RenderArgs {
            template,
            data,
            output: Some(output.clone()),
            strict: true,
            case_sensitive: false,
            settings: None,
        })
        .unwrap();

        let mut reader = DocxReader::new(File::open(&output).unwrap()).unwrap();
        let body = reader.read_file_as_string("word/document.xml").unwrap();
        assert!(body.contains("Report by Jon"));
    }

    #[test]
    fn test_render_strict_and_case_sensitive() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("template.docx");
        DocxWriter::new(File::create(&template).unwrap())
            .write("<w:p><w:r><w:t>{NAME}</w:t></w:r></w:p>")
            .unwrap();
        let data = dir.path().join("data.json");
        std::fs::write(&data, r#"{"name": "Report"}"#).unwrap();
        let output = dir.path().join("out.docx");

        let result = render(RenderArgs {
            template,
            data,
            output: Some(output.clone()),
            strict: true,
            case_sensitive: true,
            settings: None,
        });

        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_text_command() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("notes.docx");

        text(&output, &["first".to_string(), "second".to_string()]).unwrap();

        let mut reader = DocxReader::new(File::open(&output).unwrap()).unwrap();
        let body = reader.read_file_as_string("word/document.xml").unwrap();
        assert!(body.contains("first"));
        assert!(body.contains("second"));
    }

    #[test]
    fn test_text_command_pdf() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("notes.pdf");

        text(&output, &["first".to_string(), "second".to_string()]).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_render_html_template_to_pdf() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("letter.html");
        std::fs::write(&template, "<h1>Hello {name}</h1>").unwrap();
        let data = dir.path().join("data.json");
        std::fs::write(&data, r#"{"name": "Ada"}"#).unwrap();
        let output = dir.path().join("letter.pdf");

        render(RenderArgs {
            template,
            data,
            output: Some(output.clone()),
            strict: true,
            case_sensitive: false,
            settings: None,
        })
        .unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(String::from_utf8_lossy(&bytes).contains("(Hello Ada) Tj"));
    }

    #[test]
    fn test_render_without_output_path() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("template.docx");
        DocxWriter::new(File::create(&template).unwrap())
            .write("<w:p><w:r><w:t>{name}</w:t></w:r></w:p>")
            .unwrap();
        let data = dir.path().join("data.json");
        std::fs::write(&data, r#"{"name": "Report"}"#).unwrap();

        let err = render(RenderArgs {
            template,
            data,
            output: None,
            strict: false,
            case_sensitive: false,
            settings: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("No output path"));
    }
}
