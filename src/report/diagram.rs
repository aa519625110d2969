/// Insertion support diagrams
///
/// The insertion is drawn as a horizontal bar. Upstream reads are stacked
/// above its left edge (genome part to the left, transposon part to the
/// right of the breakpoint); downstream reads are stacked above its right
/// edge (transposon part left, genome part right). Sorting upstream reads by
/// transposon start and downstream reads by transposon end (descending)
/// gives the stack its V shape.
use crate::error::Error;
use crate::split::SplitReadRange;
use image::{ImageFormat, Rgb, RgbImage};
use std::path::Path;

pub const MARGIN_X: u64 = 200;
pub const MARGIN_Y: u64 = 100;
pub const BAR_HEIGHT: u64 = 5;
pub const BAR_SPACING: u64 = 3;

/// Widest insertion drawn, in bp (one pixel per bp)
pub const MAX_SPAN: u64 = 100_000;

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// What a bar represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Insertion,
    Transposon,
    Genome,
}

impl Segment {
    pub fn color(&self) -> Rgb<u8> {
        match self {
            Segment::Insertion => Rgb([0, 0, 255]),
            Segment::Transposon => Rgb([0, 255, 0]),
            Segment::Genome => Rgb([255, 0, 0]),
        }
    }
}

/// Half-open pixel rectangle; `x` may fall left of the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bar {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub segment: Segment,
}

#[derive(Debug, Clone)]
pub struct DiagramLayout {
    pub width: u32,
    pub height: u32,
    pub bars: Vec<Bar>,
}

fn bar_width(len: u64) -> Result<i64, Error> {
    i64::try_from(len)
        .map_err(|_| Error::Diagram(format!("read segment of {len} bp is too long to draw")))
}

/// Lay out one insertion of `span` bp with its supporting reads.
pub fn layout(
    span: u64,
    upstream: &[SplitReadRange],
    downstream: &[SplitReadRange],
) -> Result<DiagramLayout, Error> {
    if span == 0 || span > MAX_SPAN {
        return Err(Error::Diagram(format!(
            "insertion span {span} bp is outside 1..={MAX_SPAN}"
        )));
    }

    let n_rows = upstream.len().max(downstream.len()) as u64;
    let width = (span + 2 * MARGIN_X) as u32;
    let height = n_rows
        .checked_mul(BAR_HEIGHT + BAR_SPACING)
        .and_then(|h| u32::try_from(h + BAR_HEIGHT + 2 * MARGIN_Y).ok())
        .ok_or_else(|| Error::Diagram(format!("{n_rows} read rows do not fit in an image")))?;

    // bottom edge (exclusive) of the insertion bar
    let bottom = i64::from(height) - MARGIN_Y as i64;
    let row_top = |row: u64| bottom - (BAR_HEIGHT + row * (BAR_HEIGHT + BAR_SPACING)) as i64;
    let bar = |x: i64, width: i64, row: u64, segment: Segment| Bar {
        x,
        y: row_top(row),
        width,
        height: BAR_HEIGHT as i64,
        segment,
    };

    let left = MARGIN_X as i64;
    let right = left + span as i64;

    let mut bars = vec![bar(left, span as i64, 0, Segment::Insertion)];

    let mut upstream = upstream.to_vec();
    upstream.sort_by_key(|r| r.te_range.0);
    for (i, read) in upstream.iter().enumerate() {
        let row = i as u64 + 1;
        let genome_len = bar_width(read.genome_len())?;
        let te_len = bar_width(read.te_len())?;
        bars.push(bar(left - genome_len, genome_len, row, Segment::Genome));
        bars.push(bar(left, te_len, row, Segment::Transposon));
    }

    let mut downstream = downstream.to_vec();
    downstream.sort_by_key(|r| std::cmp::Reverse(r.te_range.1));
    for (i, read) in downstream.iter().enumerate() {
        let row = i as u64 + 1;
        let te_len = bar_width(read.te_len())?;
        let genome_len = bar_width(read.genome_len())?;
        bars.push(bar(right - te_len, te_len, row, Segment::Transposon));
        bars.push(bar(right, genome_len, row, Segment::Genome));
    }

    Ok(DiagramLayout {
        width,
        height,
        bars,
    })
}

/// Fill a bar, clipped to the image
fn fill(image: &mut RgbImage, bar: &Bar) {
    let x0 = bar.x.max(0);
    let y0 = bar.y.max(0);
    let x1 = bar.x.saturating_add(bar.width).min(i64::from(image.width()));
    let y1 = bar.y.saturating_add(bar.height).min(i64::from(image.height()));
    let color = bar.segment.color();
    for y in y0..y1 {
        for x in x0..x1 {
            image.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Rasterize a layout
pub fn render(layout: &DiagramLayout) -> RgbImage {
    let mut image = RgbImage::from_pixel(layout.width, layout.height, BACKGROUND);
    for bar in &layout.bars {
        fill(&mut image, bar);
    }
    image
}

/// Lay out, render and save one insertion diagram as PNG
pub fn draw_insertion(
    path: &Path,
    span: u64,
    upstream: &[SplitReadRange],
    downstream: &[SplitReadRange],
) -> Result<(), Error> {
    let layout = layout(span, upstream, downstream)?;
    render(&layout)
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| Error::Image {
            source,
            path: path.to_path_buf(),
        })
}
