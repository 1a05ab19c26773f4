//! Renderer workflow tests

use crate::*;
use serde_json::json;
use std::cell::Cell;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use store::{DocxReader, DocxWriter};
use tempfile::tempdir;
use word_template::UnresolvedPolicy;

fn write_template(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("template.docx");
    DocxWriter::new(File::create(&path).unwrap()).write(body).unwrap();
    path
}

fn read_body(path: &Path) -> String {
    let mut reader = DocxReader::new(File::open(path).unwrap()).unwrap();
    reader.read_file_as_string("word/document.xml").unwrap()
}

#[test]
fn test_blank_document_is_readable_docx() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("blank.docx");

    let mut renderer = WordRenderer::new();
    {
        let sink = renderer.sink().unwrap();
        sink.add_heading("Report", 1);
        sink.add_text("Fish & Chips");
        sink.add_page_break();
        sink.add_text("Second page");
    }
    let written = renderer.save(Some(output.as_path())).unwrap();
    assert_eq!(written, output);

    let reader = DocxReader::new(File::open(&output).unwrap()).unwrap();
    assert!(reader.is_valid_docx());

    let body = read_body(&output);
    assert!(body.contains("Report"));
    assert!(body.contains("Fish &amp; Chips"));
    assert!(body.contains(r#"<w:br w:type="page"/>"#));
}

#[test]
fn test_save_falls_back_to_save_path() {
    let dir = tempdir().unwrap();
    let configured = dir.path().join("configured.docx");

    let mut renderer = WordRenderer::new();
    renderer.set_save_path(configured.clone());
    assert_eq!(renderer.save_path(), Some(configured.as_path()));

    let written = renderer.save(None).unwrap();
    assert_eq!(written, configured);
    assert!(configured.exists());
}

#[test]
fn test_explicit_path_wins_over_save_path() {
    let dir = tempdir().unwrap();
    let configured = dir.path().join("configured.docx");
    let explicit = dir.path().join("explicit.docx");

    let mut renderer = WordRenderer::new();
    renderer.set_save_path(configured.clone());
    renderer.save(Some(explicit.as_path())).unwrap();

    assert!(explicit.exists());
    assert!(!configured.exists());
}

#[test]
fn test_save_without_any_path() {
    let mut renderer = WordRenderer::new();
    let err = renderer.save(None).unwrap_err();
    assert!(matches!(err, RenderError::NoSavePath));
}

#[test]
fn test_template_renderer_assign_and_save() {
    let dir = tempdir().unwrap();
    let template = write_template(dir.path(), "<w:p><w:r><w:t>Dear {name}</w:t></w:r></w:p>");
    let output = dir.path().join("letter.docx");

    let mut renderer = WordRenderer::with_template(&template).unwrap();
    assert!(renderer.context().is_template());
    assert!(renderer.sink().is_none());

    renderer.assign("name", json!("Ægir")).unwrap();
    renderer.save(Some(output.as_path())).unwrap();

    assert!(read_body(&output).contains("Dear Ægir"));
}

#[test]
fn test_assign_on_blank_renderer() {
    let mut renderer = WordRenderer::new();
    let err = renderer.assign("name", json!("x")).unwrap_err();
    assert!(matches!(err, RenderError::NoTemplate));
}

#[test]
fn test_unreadable_template() {
    let dir = tempdir().unwrap();
    let err = WordRenderer::with_template(dir.path().join("missing.docx")).unwrap_err();
    assert!(matches!(err, RenderError::TemplateNotReadable(_)));
}

#[test]
fn test_delegate_called_before_each_save() {
    let dir = tempdir().unwrap();
    let calls = Rc::new(Cell::new(0));

    let mut renderer = WordRenderer::new();
    let seen = Rc::clone(&calls);
    renderer.set_delegate(move |context: &mut WordContext| -> Result<()> {
        seen.set(seen.get() + 1);
        if let Some(section) = context.as_section_mut() {
            section.add_text("Generated footer");
        }
        Ok(())
    });

    let output = dir.path().join("one.docx");
    renderer.save(Some(output.as_path())).unwrap();
    let mut buffer = Vec::new();
    renderer.output(&mut buffer).unwrap();

    assert_eq!(calls.get(), 2);
    assert!(read_body(&output).contains("Generated footer"));
}

#[test]
fn test_delegate_fills_template() {
    let dir = tempdir().unwrap();
    let template = write_template(dir.path(), "<w:p><w:r><w:t>{stamp}</w:t></w:r></w:p>");
    let output = dir.path().join("out.docx");

    let mut renderer = WordRenderer::with_template(&template).unwrap();
    renderer.set_delegate(|context: &mut WordContext| -> Result<()> {
        if let Some(document) = context.as_template_mut() {
            document.assign("stamp", "approved");
        }
        Ok(())
    });
    renderer.save(Some(output.as_path())).unwrap();

    assert!(read_body(&output).contains("approved"));
}

#[test]
fn test_delegate_error_aborts_save() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.docx");

    let mut renderer = WordRenderer::new();
    renderer.set_delegate(|_: &mut WordContext| -> Result<()> { Err(RenderError::NoTemplate) });

    assert!(renderer.save(Some(output.as_path())).is_err());
    assert!(!output.exists());

    renderer.clear_delegate();
    renderer.save(Some(output.as_path())).unwrap();
    assert!(output.exists());
}

#[test]
fn test_output_blank_to_writer() {
    let mut renderer = WordRenderer::new();
    renderer.sink().unwrap().add_text("streamed");

    let mut buffer = Vec::new();
    let written = renderer.output(&mut buffer).unwrap();
    assert_eq!(written as usize, buffer.len());

    let mut reader = DocxReader::new(Cursor::new(buffer)).unwrap();
    assert!(reader
        .read_file_as_string("word/document.xml")
        .unwrap()
        .contains("streamed"));
}

#[test]
fn test_output_template_to_writer() {
    let dir = tempdir().unwrap();
    let template = write_template(dir.path(), "<w:p><w:r><w:t>{x}</w:t></w:r></w:p>");

    let mut renderer = WordRenderer::with_template(&template).unwrap();
    renderer.assign("x", json!(42)).unwrap();

    let mut buffer = Vec::new();
    renderer.output(&mut buffer).unwrap();

    let mut reader = DocxReader::new(Cursor::new(buffer)).unwrap();
    assert!(reader
        .read_file_as_string("word/document.xml")
        .unwrap()
        .contains("<w:t>42</w:t>"));
}

#[test]
fn test_set_context_swaps_and_returns_previous() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.docx");

    let mut renderer = WordRenderer::new();
    let mut section = Section::new();
    section.add_text("replacement");

    let previous = renderer.set_context(WordContext::Blank(section));
    assert!(matches!(previous, WordContext::Blank(ref s) if s.is_empty()));

    renderer.save(Some(output.as_path())).unwrap();
    assert!(read_body(&output).contains("replacement"));
}

#[test]
fn test_factory_applies_settings() {
    let dir = tempdir().unwrap();
    let template = write_template(dir.path(), "<w:p><w:r><w:t>{a}{b}</w:t></w:r></w:p>");
    let configured = dir.path().join("configured.docx");

    let mut settings = RendererSettings::default();
    settings.template.unresolved = UnresolvedPolicy::Fail;
    settings.output.save_path = Some(configured.clone());
    let factory = RendererFactory::new(settings);

    let mut renderer = factory.create(Some(template.as_path())).unwrap();
    assert_eq!(renderer.save_path(), Some(configured.as_path()));

    renderer.assign("a", json!(1)).unwrap();
    let err = renderer.save(None).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Template(word_template::TemplateError::UnresolvedPlaceholder(_))
    ));
    assert!(!configured.exists());

    renderer.assign("b", json!(2)).unwrap();
    renderer.save(None).unwrap();
    assert!(read_body(&configured).contains("12"));
}

#[test]
fn test_factory_without_template_gives_blank() {
    let factory = RendererFactory::default();
    let renderer = factory.create(None).unwrap();

    assert!(!renderer.context().is_template());
    assert!(renderer.save_path().is_none());
}

#[cfg(unix)]
#[test]
fn test_blank_save_keeps_existing_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let output = dir.path().join("notes.docx");
    std::fs::write(&output, b"old").unwrap();
    std::fs::set_permissions(&output, std::fs::Permissions::from_mode(0o644)).unwrap();

    let mut renderer = WordRenderer::new();
    renderer.sink().unwrap().add_text("fresh");
    renderer.save(Some(output.as_path())).unwrap();

    let mode = std::fs::metadata(&output).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
    assert!(read_body(&output).contains("fresh"));
}

fn load_pdf(path: &Path) -> lopdf::Document {
    lopdf::Document::load(path).unwrap()
}

fn page_text(doc: &lopdf::Document, page: u32) -> String {
    let pages = doc.get_pages();
    String::from_utf8_lossy(&doc.get_page_content(pages[&page]).unwrap()).into_owned()
}

#[test]
fn test_canvas_pdf_save_and_read_back() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("drawing.pdf");

    let mut renderer = PdfRenderer::default();
    {
        let canvas = renderer.canvas().unwrap();
        canvas.font("bold 14pt Helvetica").unwrap();
        canvas.fill_text("Invoice", 20.0, 25.0, Align::Left);
        canvas.stroke_style("#336699").unwrap();
        canvas.move_to(20.0, 30.0);
        canvas.line_to(190.0, 30.0);
        canvas.stroke();
        canvas.add_page();
        canvas.fill_text("Terms", 20.0, 25.0, Align::Left);
    }
    assert!(renderer.html().is_none());

    let written = renderer.save(Some(output.as_path())).unwrap();
    assert_eq!(written, output);

    let doc = load_pdf(&output);
    assert_eq!(doc.get_pages().len(), 2);
    assert!(page_text(&doc, 1).contains("(Invoice) Tj"));
    assert!(page_text(&doc, 2).contains("(Terms) Tj"));
}

#[test]
fn test_html_template_pdf() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("letter.html");
    std::fs::write(
        &template,
        "<html><head><title>Letter</title></head><body><h1>Dear {name}</h1><p>Total: {order.total}</p></body></html>",
    )
    .unwrap();
    let output = dir.path().join("letter.pdf");

    let mut renderer = PdfRenderer::with_template(&template).unwrap();
    assert!(renderer.context().is_html());
    assert!(renderer.canvas().is_none());

    renderer
        .assign("name", json!("Ada"))
        .unwrap()
        .assign("order", json!({"total": 99}))
        .unwrap();
    {
        let html = renderer.html().unwrap();
        html.set_header("ACME");
        html.write_html("<p>Appendix</p>");
        html.add_page();
        html.write_html("<p>Signature</p>");
    }
    renderer.save(Some(output.as_path())).unwrap();

    let doc = load_pdf(&output);
    assert_eq!(doc.get_pages().len(), 2);
    let first = page_text(&doc, 1);
    assert!(first.contains("(Dear Ada) Tj"));
    assert!(first.contains("(Total: 99) Tj"));
    assert!(first.contains("(ACME) Tj"));
    assert!(page_text(&doc, 2).contains("(Signature) Tj"));
}

#[test]
fn test_pdf_output_to_writer_and_delegate() {
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);

    let mut renderer = PdfRenderer::default();
    renderer.set_delegate(move |context: &mut PdfContext| -> Result<()> {
        seen.set(seen.get() + 1);
        if let Some(canvas) = context.as_canvas_mut() {
            canvas.fill_text("Stamped", 10.0, 10.0, Align::Left);
        }
        Ok(())
    });

    let mut buffer = Vec::new();
    let written = renderer.output(&mut buffer).unwrap();
    assert_eq!(written as usize, buffer.len());
    assert_eq!(calls.get(), 1);

    let doc = lopdf::Document::load_mem(&buffer).unwrap();
    assert!(page_text(&doc, 1).contains("(Stamped) Tj"));
}

#[test]
fn test_pdf_save_failure_leaves_nothing() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("strict.html");
    std::fs::write(&template, "<p>{missing}</p>").unwrap();
    let output = dir.path().join("out.pdf");

    let mut settings = RendererSettings::default();
    settings.template.unresolved = UnresolvedPolicy::Fail;
    let mut renderer = RendererFactory::new(settings)
        .create_pdf(Some(template.as_path()))
        .unwrap();

    assert!(renderer.save(Some(output.as_path())).is_err());
    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_pdf_assign_without_template() {
    let mut renderer = PdfRenderer::default();
    let err = renderer.assign("name", json!("x")).unwrap_err();
    assert!(matches!(err, RenderError::NoTemplate));
}

#[test]
fn test_pdf_template_must_be_readable() {
    let dir = tempdir().unwrap();
    let err = PdfRenderer::with_template(dir.path().join("missing.html")).unwrap_err();
    assert!(matches!(err, RenderError::TemplateNotReadable(_)));
}

#[test]
fn test_factory_pdf_applies_settings() {
    let dir = tempdir().unwrap();
    let configured = dir.path().join("configured.pdf");

    let mut settings = RendererSettings::default();
    settings.pdf.page = PageSetup::new(pdf::PageFormat::A5, pdf::Orientation::Landscape);
    settings.pdf.title = Some("Quarterly".to_string());
    settings.output.save_path = Some(configured.clone());

    let mut renderer = RendererFactory::new(settings).create_pdf(None).unwrap();
    assert_eq!(renderer.page_setup().size_mm(), (210.0, 148.0));
    renderer.save(None).unwrap();

    let doc = load_pdf(&configured);
    let pages = doc.get_pages();
    let page = doc.get_dictionary(pages[&1]).unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    let width = media_box[2].as_float().unwrap();
    assert!((width - 210.0 * pdf::PT_PER_MM).abs() < 0.01);

    let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = doc.get_dictionary(info_id).unwrap();
    assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"Quarterly");
}

#[test]
fn test_factory_picks_format_from_extension() {
    let dir = tempdir().unwrap();
    let template = write_template(dir.path(), "<w:p><w:r><w:t>{x}</w:t></w:r></w:p>");
    let factory = RendererFactory::default();

    let word = factory
        .create_for(&dir.path().join("out.docx"), Some(template.as_path()))
        .unwrap();
    assert!(matches!(word, AnyRenderer::Word(_)));

    let mut pdf = factory.create_for(&dir.path().join("out.PDF"), None).unwrap();
    assert!(matches!(pdf, AnyRenderer::Pdf(_)));
    let output = dir.path().join("blank.pdf");
    pdf.save(Some(output.as_path())).unwrap();
    assert_eq!(load_pdf(&output).get_pages().len(), 1);
}
