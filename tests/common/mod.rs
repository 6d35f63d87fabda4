//! Shared fixtures for integration tests.

#![allow(dead_code)]

use pdfinsight::{BoundingBox, MemorySource, RawLine, RawRun};

/// A single-run line at the left margin.
pub fn line(text: &str, size: f32, y: f32) -> RawLine {
    line_at(text, size, 72.0, y, "Helvetica")
}

/// A single-run line with explicit position and font.
pub fn line_at(text: &str, size: f32, x: f32, y: f32, font: &str) -> RawLine {
    let width = text.chars().count() as f32 * size * 0.5;
    RawLine::new(vec![RawRun::new(
        text,
        size,
        font,
        BoundingBox::new(x, y, x + width, y + size),
    )])
}

/// A page whose raw text is the concatenation of its lines.
pub fn page_text(lines: &[RawLine]) -> String {
    lines
        .iter()
        .map(|l| l.runs.iter().map(|r| r.text.as_str()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Body text is set at 9pt. Each fixture has as many body lines as larger
/// lines, so the median falls between the two and body lines never qualify
/// as headings by size.
fn body(text: &str, y: f32) -> RawLine {
    line(text, 9.0, y)
}

/// Three-page financial report: a title and three headings of decreasing size.
pub fn financial_report() -> MemorySource {
    let page1 = vec![
        line("Annual Financial Report", 24.0, 40.0),
        line("Revenue Overview", 16.0, 90.0),
        body(
            "revenue reached $12 million this year, a 15% increase driven by strong revenue from new customers",
            120.0,
        ),
    ];
    let page2 = vec![
        line("Market Analysis", 14.0, 40.0),
        body("the regional dataset in table 2 covers every market we entered", 70.0),
        body("growth was uneven across segments and regions", 85.0),
    ];
    let page3 = vec![
        line("Team Events", 12.5, 40.0),
        body("the holiday party was held downtown with music and dinner", 70.0),
    ];

    MemorySource::new("financial.pdf")
        .with_page_text(page1.clone(), page_text(&page1))
        .with_page_text(page2.clone(), page_text(&page2))
        .with_page_text(page3.clone(), page_text(&page3))
}

/// Two-page travel guide.
pub fn travel_guide() -> MemorySource {
    let page1 = vec![
        line("Coastal Travel Guide", 26.0, 40.0),
        line("Beaches", 16.0, 90.0),
        body("sandy beaches stretch along the coast with calm water", 120.0),
    ];
    let page2 = vec![
        line("Restaurants", 16.0, 40.0),
        body("seafood restaurants serve local fish every evening", 70.0),
        body("reservations are recommended on weekends", 85.0),
    ];

    MemorySource::new("travel.pdf")
        .with_page_text(page1.clone(), page_text(&page1))
        .with_page_text(page2.clone(), page_text(&page2))
}
