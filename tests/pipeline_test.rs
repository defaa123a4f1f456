//! Pipeline behavior: deferred attachment, section-break gating, TOC
//! resolution, and the failure modes.

use bindery::content::{ContentNode, ParagraphStyle};
use bindery::docx::{DocxDocument, Fragment, Run};
use bindery::{ConvertOptions, Error, PageSetup, Pipeline, Warning};

fn bookmark(id: &str) -> ContentNode {
    ContentNode::Bookmark { id: id.into() }
}

fn heading(level: u8, text: &str) -> ContentNode {
    ContentNode::Heading {
        level,
        text: text.into(),
    }
}

fn toc(label: &str, text: &str, target: &str) -> ContentNode {
    ContentNode::TocEntry {
        label: label.into(),
        text: text.into(),
        target: target.into(),
    }
}

fn para(text: &str) -> ContentNode {
    ContentNode::Paragraph {
        text: text.into(),
        style: ParagraphStyle::Normal,
    }
}

fn run(nodes: &[ContentNode]) -> (DocxDocument, bindery::Report) {
    let mut doc = DocxDocument::new(PageSetup::default());
    let report = Pipeline::new(ConvertOptions::default())
        .run(nodes, &mut doc)
        .expect("pipeline should succeed");
    (doc, report)
}

fn paragraph_anchors(doc: &DocxDocument, index: usize) -> Vec<String> {
    match &doc.fragments()[index] {
        Fragment::Paragraph { anchors, .. } => anchors.clone(),
        other => panic!("expected paragraph at {index}, got {other:?}"),
    }
}

#[test]
fn consecutive_bookmarks_all_attach_to_the_next_fragment() {
    let (doc, report) = run(&[bookmark("a"), bookmark("b"), para("content")]);

    assert_eq!(doc.fragments().len(), 1);
    assert_eq!(paragraph_anchors(&doc, 0), vec!["a", "b"]);
    // The queue drained; nothing is left to warn about.
    assert!(report.warnings.is_empty());
}

#[test]
fn bookmarks_alone_produce_no_fragments() {
    let (doc, _) = run(&[
        bookmark("a"),
        para("one"),
        bookmark("b"),
        bookmark("c"),
        para("two"),
    ]);

    // Two non-bookmark nodes, two fragments.
    assert_eq!(doc.fragments().len(), 2);
}

#[test]
fn heading_before_any_toc_entry_gets_no_section_break() {
    let (doc, report) = run(&[heading(2, "Dedication"), para("For Andy.")]);

    assert_eq!(report.section_breaks, 0);
    assert_eq!(doc.fragments().len(), 2);
}

#[test]
fn heading_after_a_toc_entry_gets_exactly_one_break_immediately_before() {
    let (doc, report) = run(&[
        toc("I.", "First", "ch1"),
        bookmark("ch1"),
        heading(2, "CHAPTER I"),
    ]);

    assert_eq!(report.section_breaks, 1);
    let fragments = doc.fragments();
    assert_eq!(fragments.len(), 3);
    assert!(matches!(fragments[0], Fragment::Paragraph { .. }));
    assert!(matches!(fragments[1], Fragment::SectionBreak { .. }));
    assert!(matches!(fragments[2], Fragment::Paragraph { .. }));
}

#[test]
fn level_one_headings_never_break_sections() {
    let (_, report) = run(&[
        toc("I.", "First", "ch1"),
        bookmark("ch1"),
        heading(1, "ANDY BURKE"),
        para("text"),
    ]);
    assert_eq!(report.section_breaks, 0);
}

#[test]
fn pending_bookmarks_attach_to_the_heading_not_the_break() {
    let (doc, _) = run(&[
        toc("I.", "First", "ch1"),
        bookmark("ch1"),
        heading(2, "CHAPTER I"),
    ]);

    // fragments: toc paragraph, section break, heading paragraph
    assert!(matches!(doc.fragments()[1], Fragment::SectionBreak { .. }));
    assert_eq!(paragraph_anchors(&doc, 2), vec!["ch1"]);
    assert!(doc.anchor("ch1").is_some());
}

#[test]
fn forward_toc_reference_resolves_to_the_later_heading() {
    let (doc, report) = run(&[
        toc("I.", "Andy Burke", "ch1"),
        bookmark("ch1"),
        heading(1, "Andy Burke"),
    ]);

    assert!(report.toc_seen);
    assert_eq!(report.toc_references, 1);

    // The TOC paragraph embeds a PAGEREF run targeting the sanitized name.
    match &doc.fragments()[0] {
        Fragment::Paragraph { runs, .. } => {
            assert!(runs.contains(&Run::PageRef {
                target: "ch1".into()
            }));
        }
        other => panic!("unexpected fragment: {other:?}"),
    }

    // And the anchor landed on the heading fragment (index 1: a level-1
    // heading opens no section).
    assert!(doc.anchor("ch1").is_some());
    assert_eq!(paragraph_anchors(&doc, 1), vec!["ch1"]);
}

#[test]
fn toc_entry_with_unknown_target_fails_naming_the_id() {
    let mut doc = DocxDocument::new(PageSetup::default());
    let err = Pipeline::new(ConvertOptions::default())
        .run(&[toc("", "Ghost Chapter", "chX")], &mut doc)
        .unwrap_err();

    match err {
        Error::UnresolvedBookmark { id, entry } => {
            assert_eq!(id, "chX");
            assert_eq!(entry, "Ghost Chapter");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn registered_but_never_attached_target_fails_after_the_pass() {
    // The bookmark exists in the stream but nothing follows it, so it never
    // anchors to content.
    let mut doc = DocxDocument::new(PageSetup::default());
    let err = Pipeline::new(ConvertOptions::default())
        .run(&[toc("I.", "First", "ch1"), bookmark("ch1")], &mut doc)
        .unwrap_err();

    assert!(matches!(err, Error::UnresolvedBookmark { id, .. } if id == "ch1"));
}

#[test]
fn duplicate_bookmark_ids_abort_the_run() {
    let mut doc = DocxDocument::new(PageSetup::default());
    let err = Pipeline::new(ConvertOptions::default())
        .run(
            &[bookmark("x"), para("one"), bookmark("x"), para("two")],
            &mut doc,
        )
        .unwrap_err();

    assert!(matches!(err, Error::DuplicateBookmark { id } if id == "x"));
}

#[test]
fn trailing_bookmarks_are_reported_not_dropped() {
    let (doc, report) = run(&[para("content"), bookmark("z")]);

    assert_eq!(
        report.warnings,
        vec![Warning::TrailingPendingBookmarks {
            ids: vec!["z".into()]
        }]
    );
    assert_eq!(doc.anchor("z"), None);
}

#[test]
fn ids_are_sanitized_for_word() {
    let (doc, _) = run(&[bookmark("part 1.intro"), para("content")]);
    assert!(doc.anchor("part_1_intro").is_some());
    assert_eq!(doc.anchor("part 1.intro"), None);
}

#[test]
fn two_runs_over_the_same_stream_are_identical() {
    let nodes = [
        heading(1, "ANDY BURKE"),
        toc("I.", "First", "ch1"),
        bookmark("ch1"),
        heading(2, "CHAPTER I"),
        para("Body."),
    ];

    let (doc1, report1) = run(&nodes);
    let (doc2, report2) = run(&nodes);

    assert_eq!(doc1.fragments(), doc2.fragments());
    assert_eq!(report1, report2);
    assert_eq!(doc1.anchor("ch1"), doc2.anchor("ch1"));
}

#[test]
fn blank_verso_inserts_even_then_odd_breaks() {
    let nodes = [
        toc("I.", "First", "ch1"),
        bookmark("ch1"),
        heading(2, "CHAPTER I"),
    ];

    let mut doc = DocxDocument::new(PageSetup::default());
    let report = Pipeline::new(ConvertOptions::new().with_forced_blank_verso())
        .run(&nodes, &mut doc)
        .unwrap();

    assert_eq!(report.section_breaks, 2);
    use bindery::SectionStart;
    let breaks: Vec<_> = doc
        .fragments()
        .iter()
        .filter_map(|fragment| match fragment {
            Fragment::SectionBreak { start, .. } => Some(*start),
            _ => None,
        })
        .collect();
    assert_eq!(breaks, vec![SectionStart::EvenPage, SectionStart::OddPage]);
}

#[test]
fn section_break_carries_the_chapter_title_for_headers() {
    let (doc, _) = run(&[
        toc("I.", "First", "ch1"),
        bookmark("ch1"),
        heading(2, "CHAPTER I"),
    ]);

    match &doc.fragments()[1] {
        Fragment::SectionBreak { header_title, .. } => {
            assert_eq!(header_title.as_deref(), Some("CHAPTER I"));
        }
        other => panic!("unexpected fragment: {other:?}"),
    }
}
