use blogdoc::document::{Block, DocumentModel, LoadOptions, load_document};
use blogdoc::DocumentError;
use docx_rs::*;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

fn write_docx(dir: &Path, name: &str, docx: Docx) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    docx.build().pack(file).unwrap();
    path
}

const WORD_NAMESPACES: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
);

/// Write a package whose `word/document.xml` body is the given markup,
/// keeping every other part from a builder-made document
fn write_raw_docx(dir: &Path, name: &str, body: &str) -> PathBuf {
    let mut template = Cursor::new(Vec::new());
    Docx::new()
        .add_paragraph(Paragraph::new())
        .build()
        .pack(&mut template)
        .unwrap();
    let mut archive = zip::ZipArchive::new(template).unwrap();

    let path = dir.join(name);
    let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
    let options = zip::write::SimpleFileOptions::default();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).unwrap();
        let entry_name = entry.name().to_string();
        writer.start_file(entry_name.as_str(), options).unwrap();
        if entry_name == "word/document.xml" {
            write!(
                writer,
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {WORD_NAMESPACES}><w:body>{body}</w:body></w:document>"#
            )
            .unwrap();
        } else {
            std::io::copy(&mut entry, &mut writer).unwrap();
        }
    }
    writer.finish().unwrap();
    path
}

fn paragraphs(model: &DocumentModel) -> Vec<&blogdoc::document::Paragraph> {
    model
        .content
        .iter()
        .flat_map(|section| &section.blocks)
        .filter_map(|block| match block {
            Block::Paragraph(paragraph) => Some(paragraph),
            _ => None,
        })
        .collect()
}

fn text(text: &str) -> Run {
    Run::new().add_text(text)
}

fn styled(style: &str, content: &str) -> Paragraph {
    Paragraph::new().add_run(text(content)).style(style)
}

fn png_bytes() -> Vec<u8> {
    let img = ::image::RgbaImage::from_pixel(4, 3, ::image::Rgba([200, 30, 30, 255]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ::image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}

fn decimal_level(level: usize) -> Level {
    Level::new(
        level,
        Start::new(1),
        NumberFormat::new("decimal"),
        LevelText::new("%1."),
        LevelJc::new("left"),
    )
}

fn sample_post() -> Docx {
    Docx::new()
        .add_abstract_numbering(
            AbstractNumbering::new(2)
                .add_level(decimal_level(0))
                .add_level(decimal_level(1)),
        )
        .add_numbering(Numbering::new(2, 2))
        .add_paragraph(styled("Title", "Grace Alone"))
        .add_paragraph(styled("Subtitle", "Saved by grace through faith"))
        .add_paragraph(Paragraph::new().add_run(text("Intro paragraph.")))
        .add_paragraph(Paragraph::new())
        .add_paragraph(styled("Heading1", "The Five Solas"))
        .add_paragraph(
            Paragraph::new()
                .add_run(text("Scripture "))
                .add_run(text("alone").bold())
                .add_run(text(" is "))
                .add_run(text("enough").italic()),
        )
        .add_paragraph(
            Paragraph::new()
                .add_run(text("First"))
                .numbering(NumberingId::new(2), IndentLevel::new(0)),
        )
        .add_paragraph(
            Paragraph::new()
                .add_run(text("Second"))
                .numbering(NumberingId::new(2), IndentLevel::new(0)),
        )
        .add_paragraph(
            Paragraph::new()
                .add_run(text("Nested step"))
                .numbering(NumberingId::new(2), IndentLevel::new(1)),
        )
        .add_paragraph(styled("Heading2", "Further Reading"))
        .add_paragraph(
            Paragraph::new().add_run(text("Read ")).add_hyperlink(
                Hyperlink::new("https://example.com/solas", HyperlinkType::External)
                    .add_run(text("the confession")),
            ),
        )
        .add_paragraph(Paragraph::new().add_run(text("• Bread")))
        .add_paragraph(Paragraph::new().add_run(text("• Wine")))
        .add_paragraph(Paragraph::new().add_run(Run::new().add_image(Pic::new(&png_bytes()))))
}

fn load_sample(dir: &Path) -> DocumentModel {
    let path = write_docx(dir, "Grace Alone.docx", sample_post());
    let options = LoadOptions {
        doc_type: Some("theology".to_string()),
        date: Some(1_665_014_400_000),
        ..Default::default()
    };
    load_document(&path, &options).unwrap()
}

#[cfg(test)]
mod extraction_tests {
    use super::*;

    #[test]
    fn test_identity_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let model = load_sample(dir.path());

        assert_eq!(model.id, "grace-alone");
        assert_eq!(model.title, "Grace Alone");
        assert_eq!(model.description, "Saved by grace through faith");
        assert_eq!(model.doc_type, "theology");
        assert_eq!(model.tags, vec!["Theology", "God", "Gospel", "Reformed"]);
        assert_eq!(model.image.name, "images/bible-icon.png");
        assert_eq!(model.date, 1_665_014_400_000);
        assert_eq!(model.metadata.file_name, "Grace Alone.docx");
        assert_eq!(model.metadata.link_count, 1);
        assert!(model.metadata.word_count > 15);
        // A short post reads in under a minute
        assert_eq!(model.time.label(), "< 1 min");
    }

    #[test]
    fn test_sections_follow_headings() {
        let dir = tempfile::tempdir().unwrap();
        let model = load_sample(dir.path());

        assert_eq!(
            model.outline(),
            vec![(1, "The Five Solas"), (2, "Further Reading")]
        );
        assert_eq!(model.content.len(), 3);

        let preamble = &model.content[0];
        assert!(preamble.title.is_none());
        assert_eq!(preamble.blocks.len(), 1);

        let solas = &model.content[1];
        assert_eq!(solas.title.as_ref().unwrap().tag, "h2");
        let reading = &model.content[2];
        assert_eq!(reading.title.as_ref().unwrap().tag, "h3");
    }

    #[test]
    fn test_phrases() {
        let dir = tempfile::tempdir().unwrap();
        let model = load_sample(dir.path());

        let Block::Paragraph(paragraph) = &model.content[1].blocks[0] else {
            panic!("expected a paragraph");
        };
        assert_eq!(paragraph.text, "Scripture alone is enough");
        assert_eq!(paragraph.bold_phrases, vec!["alone"]);
        assert_eq!(paragraph.italic_phrases, vec!["enough"]);
        assert!(paragraph.underline_phrases.is_empty());
    }

    #[test]
    fn test_numbered_list_nests_by_level() {
        let dir = tempfile::tempdir().unwrap();
        let model = load_sample(dir.path());

        let Block::List(list) = &model.content[1].blocks[1] else {
            panic!("expected a list");
        };
        assert!(list.ordered);
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].content.text, "First");
        assert_eq!(list.items[1].content.text, "Second");
        assert_eq!(list.items[1].sublist.len(), 1);
        assert_eq!(list.items[1].sublist[0].content.text, "Nested step");
    }

    #[test]
    fn test_links_typed_bullets_and_images() {
        let dir = tempfile::tempdir().unwrap();
        let model = load_sample(dir.path());
        let blocks = &model.content[2].blocks;

        let Block::Paragraph(paragraph) = &blocks[0] else {
            panic!("expected a paragraph");
        };
        assert_eq!(paragraph.text, "Read the confession");
        assert_eq!(paragraph.links.len(), 1);
        assert_eq!(paragraph.links[0].text, "the confession");
        assert_eq!(paragraph.links[0].url, "https://example.com/solas");

        let Block::List(list) = &blocks[1] else {
            panic!("expected a list");
        };
        assert!(!list.ordered);
        let items: Vec<&str> = list.items.iter().map(|i| i.content.text.as_str()).collect();
        assert_eq!(items, vec!["Bread", "Wine"]);

        let images = model.images();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].file_name, "image-001.png");
        assert_eq!((images[0].width, images[0].height), (Some(4), Some(3)));
        assert_eq!(model.metadata.image_count, 1);
    }

    #[test]
    fn test_extract_images_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_docx(dir.path(), "Grace Alone.docx", sample_post());
        let model = load_document(&path, &LoadOptions::default()).unwrap();

        let out = dir.path().join("images");
        let written = blogdoc::document::extract_images(&path, &model, &out).unwrap();
        assert_eq!(written, vec![out.join("grace-alone").join("image-001.png")]);

        let bytes = std::fs::read(&written[0]).unwrap();
        let (width, height) = ::image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .unwrap()
            .into_dimensions()
            .unwrap();
        assert_eq!((width, height), (4, 3));
    }

    #[test]
    fn test_title_falls_back_to_first_heading_then_file_name() {
        let dir = tempfile::tempdir().unwrap();

        let headed = Docx::new()
            .add_paragraph(styled("Heading1", "Covenant of Grace"))
            .add_paragraph(Paragraph::new().add_run(text("Body")));
        let path = write_docx(dir.path(), "covenant.docx", headed);
        let model = load_document(&path, &LoadOptions::default()).unwrap();
        assert_eq!(model.title, "Covenant of Grace");
        assert_eq!(model.description, "Covenant of Grace");

        let plain = Docx::new().add_paragraph(Paragraph::new().add_run(text("Just text")));
        let path = write_docx(dir.path(), "My_Notes.docx", plain);
        let model = load_document(&path, &LoadOptions::default()).unwrap();
        assert_eq!(model.id, "my-notes");
        assert_eq!(model.title, "My_Notes");
        assert_eq!(model.tags, vec!["Template", "Info", "Beginner"]);
        assert_eq!(model.image.name, "images/image.png");
    }

    #[test]
    fn test_invalid_files() {
        let dir = tempfile::tempdir().unwrap();

        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, "hello").unwrap();
        let err = load_document(&txt, &LoadOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DocumentError>(),
            Some(DocumentError::InvalidExtension { .. })
        ));

        let missing = dir.path().join("missing.docx");
        assert!(load_document(&missing, &LoadOptions::default()).is_err());
    }

    #[test]
    fn test_explicitly_disabled_formatting_is_plain() {
        let dir = tempfile::tempdir().unwrap();
        let body = concat!(
            "<w:p>",
            r#"<w:r><w:rPr><w:b w:val="0"/></w:rPr><w:t xml:space="preserve">not bold </w:t></w:r>"#,
            r#"<w:r><w:rPr><w:i w:val="false"/></w:rPr><w:t xml:space="preserve">not italic </w:t></w:r>"#,
            r#"<w:r><w:rPr><w:u w:val="none"/></w:rPr><w:t xml:space="preserve">not underlined </w:t></w:r>"#,
            r#"<w:r><w:rPr><w:b/></w:rPr><w:t>strong</w:t></w:r>"#,
            "</w:p>",
        );
        let path = write_raw_docx(dir.path(), "toggles.docx", body);
        let model = load_document(&path, &LoadOptions::default()).unwrap();

        let paragraph = paragraphs(&model)[0];
        assert_eq!(paragraph.text, "not bold not italic not underlined strong");
        assert_eq!(paragraph.bold_phrases, vec!["strong"]);
        assert!(paragraph.italic_phrases.is_empty());
        assert!(paragraph.underline_phrases.is_empty());
        assert!(!paragraph.runs[0].formatting.bold);
    }

    #[test]
    fn test_tracked_insertions_kept_and_deletions_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let body = concat!(
            "<w:p>",
            r#"<w:r><w:t xml:space="preserve">Kept </w:t></w:r>"#,
            r#"<w:ins w:id="1" w:author="Editor"><w:r><w:t>added</w:t></w:r></w:ins>"#,
            r#"<w:del w:id="2" w:author="Editor"><w:r><w:delText xml:space="preserve"> removed</w:delText></w:r></w:del>"#,
            "</w:p>",
        );
        let path = write_raw_docx(dir.path(), "tracked.docx", body);
        let model = load_document(&path, &LoadOptions::default()).unwrap();

        let paragraph = paragraphs(&model)[0];
        assert_eq!(paragraph.text, "Kept added");
        assert_eq!(model.metadata.word_count, 2);
    }

    #[test]
    fn test_anchor_hyperlink_points_into_the_page() {
        let dir = tempfile::tempdir().unwrap();
        let body = concat!(
            "<w:p>",
            r#"<w:r><w:t xml:space="preserve">Jump to </w:t></w:r>"#,
            r#"<w:hyperlink w:anchor="solas"><w:r><w:t>the solas</w:t></w:r></w:hyperlink>"#,
            "</w:p>",
        );
        let path = write_raw_docx(dir.path(), "anchor.docx", body);
        let model = load_document(&path, &LoadOptions::default()).unwrap();

        let paragraph = paragraphs(&model)[0];
        assert_eq!(paragraph.links.len(), 1);
        assert_eq!(paragraph.links[0].text, "the solas");
        assert_eq!(paragraph.links[0].url, "#solas");
        assert_eq!(model.metadata.link_count, 1);
    }

    #[test]
    fn test_underline_phrases() {
        let dir = tempfile::tempdir().unwrap();
        let docx = Docx::new().add_paragraph(
            Paragraph::new()
                .add_run(text("Mark "))
                .add_run(text("these words").underline("single"))
                .add_run(text(" well.")),
        );
        let path = write_docx(dir.path(), "underline.docx", docx);
        let model = load_document(&path, &LoadOptions::default()).unwrap();

        let paragraph = paragraphs(&model)[0];
        assert_eq!(paragraph.underline_phrases, vec!["these words"]);
        assert!(paragraph.bold_phrases.is_empty());
    }

    #[test]
    fn test_empty_heading_opens_no_section() {
        let dir = tempfile::tempdir().unwrap();
        let docx = Docx::new()
            .add_paragraph(styled("Heading1", "Doctrine"))
            .add_paragraph(Paragraph::new().style("Heading2"))
            .add_paragraph(Paragraph::new().add_run(text("Still under doctrine.")));
        let path = write_docx(dir.path(), "headings.docx", docx);
        let model = load_document(&path, &LoadOptions::default()).unwrap();

        assert_eq!(model.outline(), vec![(1, "Doctrine")]);
        assert_eq!(model.content.len(), 1);
        assert_eq!(model.content[0].blocks.len(), 1);
    }

    #[test]
    fn test_image_only_paragraph_has_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let model = load_sample(dir.path());

        let Block::Paragraph(paragraph) = &model.content[2].blocks[2] else {
            panic!("expected a paragraph");
        };
        assert_eq!(paragraph.text, "");
        assert!(paragraph.runs.is_empty());
        assert_eq!(paragraph.images.len(), 1);
    }

    #[test]
    fn test_word_count_skips_title_and_list_markers() {
        let dir = tempfile::tempdir().unwrap();
        let docx = Docx::new()
            .add_paragraph(styled("Title", "Words Not Counted Here"))
            .add_paragraph(styled("Subtitle", "Nor these"))
            .add_paragraph(styled("Heading1", "Counted"))
            .add_paragraph(Paragraph::new().add_run(text("1. Alpha beta")))
            .add_paragraph(Paragraph::new().add_run(text("2. Gamma")));
        let path = write_docx(dir.path(), "counting.docx", docx);
        let model = load_document(&path, &LoadOptions::default()).unwrap();

        assert_eq!(model.metadata.word_count, 4);
    }
}
