use super::font::TextStyle;
use image::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Solid(Rgb<u8>),
    Gradient { from: Rgb<u8>, to: Rgb<u8> },
    /// `color` laid over whatever is already painted, `alpha` out of 255.
    Tint { color: Rgb<u8>, alpha: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderSide {
    Left,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub color: Rgb<u8>,
    pub width: u32,
    pub side: BorderSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Header,
    PrincipalOffer,
    AnchorOffer,
    AnchorPrice,
    AnchorInstallments,
    ConcessionsPanel,
    ConcessionCard,
    Script,
}

/// What a piece of text is, independent of where it sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextRole {
    Title,
    Subtitle,
    SectionLabel,
    OfferName,
    OfferPrice,
    AnchorName,
    RangeLabel,
    RangeValue,
    PriorityBadge,
    ConcessionName,
    ConcessionDescription,
    ScriptHeading,
    ScriptStep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub role: TextRole,
    pub style: TextStyle,
    pub x: u32,
    pub y: u32,
    pub color: Rgb<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub rect: Rect,
    pub fill: Fill,
    pub border: Option<Border>,
    pub texts: Vec<TextRun>,
}

impl Block {
    pub fn texts_with(&self, role: TextRole) -> impl Iterator<Item = &TextRun> {
        self.texts.iter().filter(move |t| t.role == role)
    }
}

/// Fully positioned summary, ready to be painted. Blocks are listed in
/// paint order; nested blocks come after the block that contains them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLayout {
    pub width: u32,
    pub height: u32,
    pub background: Rgb<u8>,
    pub blocks: Vec<Block>,
}

impl SummaryLayout {
    pub fn blocks_of(&self, kind: BlockKind) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.kind == kind)
    }

    pub fn block(&self, kind: BlockKind) -> Option<&Block> {
        self.blocks_of(kind).next()
    }
}
