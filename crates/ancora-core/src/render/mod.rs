//! Summary image compositor.
//!
//! Composition runs in two pure passes: [`Compositor::layout`] positions every
//! panel and line of text, then [`Compositor::rasterize`] paints the layout
//! onto an RGB canvas. Identical input always yields identical pixels.

pub mod canvas;
pub mod font;
pub mod layout;
pub mod wrap;

pub use font::{FontSet, TextStyle};
pub use layout::{Block, BlockKind, Border, BorderSide, Fill, Rect, SummaryLayout, TextRole, TextRun};

use crate::concession::SelectedConcession;
use crate::config::{RenderConfig, MAX_WORKING_CANVAS_HEIGHT};
use crate::offer::{AnchorOffer, PrincipalOffer};
use crate::types::Profession;
use image::{imageops, Rgb, RgbImage};

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

const BACKGROUND: Rgb<u8> = Rgb([0xFF, 0xFF, 0xFF]);
const INK: Rgb<u8> = Rgb([0x1F, 0x29, 0x37]);
const MUTED: Rgb<u8> = Rgb([0x6B, 0x72, 0x80]);
const ON_COLOR: Rgb<u8> = Rgb([0xFF, 0xFF, 0xFF]);
const HEADER_FROM: Rgb<u8> = Rgb([0xEB, 0xF4, 0xFF]);
const HEADER_TO: Rgb<u8> = Rgb([0xE0, 0xE7, 0xFF]);
const PRINCIPAL_FROM: Rgb<u8> = Rgb([0x4F, 0x46, 0xE5]);
const PRINCIPAL_TO: Rgb<u8> = Rgb([0x7C, 0x3A, 0xED]);
const ANCHOR_FROM: Rgb<u8> = Rgb([0x3B, 0x82, 0xF6]);
const ANCHOR_TO: Rgb<u8> = Rgb([0x06, 0xB6, 0xD4]);
const CONCESSIONS_BG: Rgb<u8> = Rgb([0xF9, 0xFA, 0xFB]);
const CARD_BG: Rgb<u8> = Rgb([0xFF, 0xFF, 0xFF]);
const ACCENT: Rgb<u8> = Rgb([0x4F, 0x46, 0xE5]);
const SCRIPT_BG: Rgb<u8> = Rgb([0xFF, 0xFB, 0xEB]);
const SCRIPT_BORDER: Rgb<u8> = Rgb([0xFD, 0xE6, 0x8A]);
const SCRIPT_INK: Rgb<u8> = Rgb([0x37, 0x41, 0x51]);

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

const MARGIN: u32 = 60;
const SECTION_GAP: u32 = 30;
const PANEL_PAD: u32 = 36;
const LINE_GAP: u32 = 12;
const SUB_PANEL_GAP: u32 = 20;
const SUB_PANEL_PAD: u32 = 20;
const SUB_PANEL_ALPHA: u8 = 51;
const CARD_GAP: u32 = 20;
const CARD_PAD: u32 = 24;
const ACCENT_WIDTH: u32 = 6;
const BADGE_GAP: u32 = 12;
const SCRIPT_BORDER_WIDTH: u32 = 2;
const SCRIPT_STEP_GAP: u32 = 8;

const MAX_OFFER_NAME_LINES: usize = 2;
const MAX_DESCRIPTION_LINES: usize = 2;

// ---------------------------------------------------------------------------
// Copy
// ---------------------------------------------------------------------------

const TITLE: &str = "Plano de Negociação";
const PRINCIPAL_LABEL: &str = "OFERTA PRINCIPAL";
const ANCHOR_LABEL: &str = "OFERTA ÂNCORA";
const PRICE_LABEL: &str = "Preço";
const INSTALLMENTS_LABEL: &str = "Parcelamento";
const CONCESSIONS_HEADING: &str = "Concessões Disponíveis";
const SCRIPT_HEADING: &str = "Roteiro de Negociação";
const SCRIPT_STEPS: [&str; 4] = [
    "Apresente a Oferta Principal",
    "Se houver resistência, introduza a Âncora",
    "Use concessões, nunca desconto",
    "Mantenha o preço principal intacto",
];

// ---------------------------------------------------------------------------
// Compositor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Compositor {
    fonts: FontSet,
    width: u32,
    max_canvas_height: u32,
}

impl Compositor {
    /// Load fonts from the configured candidates, falling back to the bitmap face.
    pub fn new(config: &RenderConfig) -> Self {
        Self::with_fonts(FontSet::load(&config.font_paths), config)
    }

    pub fn with_fonts(fonts: FontSet, config: &RenderConfig) -> Self {
        Self {
            fonts,
            width: config.canvas_width,
            max_canvas_height: config.max_canvas_height.min(MAX_WORKING_CANVAS_HEIGHT),
        }
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Width available to a concession description line.
    pub fn description_width(&self) -> u32 {
        self.content_width()
            .saturating_sub(ACCENT_WIDTH + 2 * CARD_PAD)
    }

    /// Height one concession card adds to the concessions panel.
    pub fn concession_slot_height(&self) -> u32 {
        self.card_height() + CARD_GAP
    }

    pub fn compose(
        &self,
        principal: &PrincipalOffer,
        anchor: &AnchorOffer,
        concessions: &[&SelectedConcession],
    ) -> RgbImage {
        let layout = self.layout(principal, anchor, concessions);
        self.rasterize(&layout)
    }

    /// Position every block of the summary. `concessions` is drawn in the
    /// order given.
    pub fn layout(
        &self,
        principal: &PrincipalOffer,
        anchor: &AnchorOffer,
        concessions: &[&SelectedConcession],
    ) -> SummaryLayout {
        let mut blocks = Vec::new();
        let mut y = MARGIN;

        y = self.header(&mut blocks, y, principal.profession) + SECTION_GAP;
        y = self.principal_panel(&mut blocks, y, principal) + SECTION_GAP;
        y = self.anchor_panel(&mut blocks, y, anchor) + SECTION_GAP;
        y = self.concessions_panel(&mut blocks, y, concessions) + SECTION_GAP;
        y = self.script_panel(&mut blocks, y);

        let height = y + MARGIN;
        tracing::debug!(
            height,
            concessions = concessions.len(),
            "summary layout computed"
        );

        SummaryLayout {
            width: self.width,
            height,
            background: BACKGROUND,
            blocks,
        }
    }

    /// Paint `layout` on a working canvas of generous height, then crop it to
    /// the layout's height.
    pub fn rasterize(&self, layout: &SummaryLayout) -> RgbImage {
        let mut img = RgbImage::from_pixel(
            layout.width,
            self.working_height(layout.height),
            layout.background,
        );

        for block in &layout.blocks {
            canvas::fill(&mut img, block.rect, block.fill);
            if let Some(border) = block.border {
                canvas::stroke(&mut img, block.rect, border);
            }
            for run in &block.texts {
                self.fonts
                    .draw(&mut img, run.style, run.x, run.y, &run.text, run.color);
            }
        }

        imageops::crop_imm(&img, 0, 0, layout.width, layout.height).to_image()
    }

    fn working_height(&self, layout_height: u32) -> u32 {
        self.max_canvas_height.max(layout_height)
    }

    // -----------------------------------------------------------------------
    // Sections
    // -----------------------------------------------------------------------

    fn header(&self, blocks: &mut Vec<Block>, top: u32, profession: Profession) -> u32 {
        let (x, width) = self.panel_span();
        let title_h = self.line_height(TextStyle::Title);
        let subtitle_h = self.line_height(TextStyle::Subtitle);
        let height = PANEL_PAD + title_h + LINE_GAP + subtitle_h + PANEL_PAD;

        let texts = vec![
            self.centered(TITLE, TextRole::Title, TextStyle::Title, top + PANEL_PAD, INK),
            self.centered(
                profession.label(),
                TextRole::Subtitle,
                TextStyle::Subtitle,
                top + PANEL_PAD + title_h + LINE_GAP,
                MUTED,
            ),
        ];

        blocks.push(Block {
            kind: BlockKind::Header,
            rect: Rect::new(x, top, width, height),
            fill: Fill::Gradient {
                from: HEADER_FROM,
                to: HEADER_TO,
            },
            border: None,
            texts,
        });
        top + height
    }

    fn principal_panel(&self, blocks: &mut Vec<Block>, top: u32, offer: &PrincipalOffer) -> u32 {
        let (x, width) = self.panel_span();
        let label_h = self.line_height(TextStyle::Caption);
        let name_h = self.line_height(TextStyle::Heading);
        let price_h = self.line_height(TextStyle::Price);
        let height = PANEL_PAD
            + label_h
            + LINE_GAP
            + MAX_OFFER_NAME_LINES as u32 * name_h
            + LINE_GAP
            + price_h
            + PANEL_PAD;

        let text_x = x + PANEL_PAD;
        let mut texts = vec![run(
            PRINCIPAL_LABEL,
            TextRole::SectionLabel,
            TextStyle::Caption,
            text_x,
            top + PANEL_PAD,
            ON_COLOR,
        )];

        let name_top = top + PANEL_PAD + label_h + LINE_GAP;
        let lines = wrap::truncate_lines(
            self.wrap(&offer.name, TextStyle::Heading, self.content_width()),
            MAX_OFFER_NAME_LINES,
        );
        for (i, line) in lines.iter().enumerate() {
            texts.push(run(
                line,
                TextRole::OfferName,
                TextStyle::Heading,
                text_x,
                name_top + i as u32 * name_h,
                ON_COLOR,
            ));
        }

        texts.push(run(
            &offer.price,
            TextRole::OfferPrice,
            TextStyle::Price,
            text_x,
            top + height - PANEL_PAD - price_h,
            ON_COLOR,
        ));

        blocks.push(Block {
            kind: BlockKind::PrincipalOffer,
            rect: Rect::new(x, top, width, height),
            fill: Fill::Gradient {
                from: PRINCIPAL_FROM,
                to: PRINCIPAL_TO,
            },
            border: None,
            texts,
        });
        top + height
    }

    fn anchor_panel(&self, blocks: &mut Vec<Block>, top: u32, anchor: &AnchorOffer) -> u32 {
        let (x, width) = self.panel_span();
        let label_h = self.line_height(TextStyle::Caption);
        let name_h = self.line_height(TextStyle::Heading);
        let value_h = self.line_height(TextStyle::Body);
        let text_x = x + PANEL_PAD;

        let mut texts = vec![run(
            ANCHOR_LABEL,
            TextRole::SectionLabel,
            TextStyle::Caption,
            text_x,
            top + PANEL_PAD,
            ON_COLOR,
        )];

        let name_top = top + PANEL_PAD + label_h + LINE_GAP;
        let lines = self.wrap(&anchor.name, TextStyle::Heading, self.content_width());
        for (i, line) in lines.iter().enumerate() {
            texts.push(run(
                line,
                TextRole::AnchorName,
                TextStyle::Heading,
                text_x,
                name_top + i as u32 * name_h,
                ON_COLOR,
            ));
        }

        let sub_top = name_top + lines.len() as u32 * name_h + 2 * LINE_GAP;
        let sub_height = SUB_PANEL_PAD + label_h + LINE_GAP + value_h + SUB_PANEL_PAD;
        let sub_width = self.content_width().saturating_sub(SUB_PANEL_GAP) / 2;
        let height = (sub_top - top) + sub_height + PANEL_PAD;

        blocks.push(Block {
            kind: BlockKind::AnchorOffer,
            rect: Rect::new(x, top, width, height),
            fill: Fill::Gradient {
                from: ANCHOR_FROM,
                to: ANCHOR_TO,
            },
            border: None,
            texts,
        });

        let ranges = [
            (BlockKind::AnchorPrice, PRICE_LABEL, anchor.price_range()),
            (
                BlockKind::AnchorInstallments,
                INSTALLMENTS_LABEL,
                anchor.installment_range(),
            ),
        ];
        for (i, (kind, label, value)) in ranges.into_iter().enumerate() {
            let sub_x = text_x + i as u32 * (sub_width + SUB_PANEL_GAP);
            let inner_x = sub_x + SUB_PANEL_PAD;
            blocks.push(Block {
                kind,
                rect: Rect::new(sub_x, sub_top, sub_width, sub_height),
                fill: Fill::Tint {
                    color: ON_COLOR,
                    alpha: SUB_PANEL_ALPHA,
                },
                border: None,
                texts: vec![
                    run(
                        label,
                        TextRole::RangeLabel,
                        TextStyle::Caption,
                        inner_x,
                        sub_top + SUB_PANEL_PAD,
                        ON_COLOR,
                    ),
                    run(
                        &value,
                        TextRole::RangeValue,
                        TextStyle::Body,
                        inner_x,
                        sub_top + SUB_PANEL_PAD + label_h + LINE_GAP,
                        ON_COLOR,
                    ),
                ],
            });
        }

        top + height
    }

    fn concessions_panel(
        &self,
        blocks: &mut Vec<Block>,
        top: u32,
        concessions: &[&SelectedConcession],
    ) -> u32 {
        let (x, width) = self.panel_span();
        let heading_h = self.line_height(TextStyle::Heading);
        let base_height = PANEL_PAD + heading_h + LINE_GAP + PANEL_PAD;
        let slot = self.concession_slot_height();
        let height = base_height + concessions.len() as u32 * slot;

        blocks.push(Block {
            kind: BlockKind::ConcessionsPanel,
            rect: Rect::new(x, top, width, height),
            fill: Fill::Solid(CONCESSIONS_BG),
            border: None,
            texts: vec![run(
                CONCESSIONS_HEADING,
                TextRole::SectionLabel,
                TextStyle::Heading,
                x + PANEL_PAD,
                top + PANEL_PAD,
                INK,
            )],
        });

        let cards_top = top + PANEL_PAD + heading_h + LINE_GAP;
        for (i, selected) in concessions.iter().enumerate() {
            let card_top = cards_top + i as u32 * slot;
            blocks.push(self.concession_card(x + PANEL_PAD, card_top, selected));
        }

        top + height
    }

    fn concession_card(&self, x: u32, top: u32, selected: &SelectedConcession) -> Block {
        let name_h = self.line_height(TextStyle::Emphasis);
        let body_h = self.line_height(TextStyle::Body);
        let text_x = x + ACCENT_WIDTH + CARD_PAD;
        let text_top = top + CARD_PAD;

        let badge = selected.entry.priority.badge();
        let badge_w = self.fonts.measure(TextStyle::Emphasis, badge);
        let mut texts = vec![
            run(
                badge,
                TextRole::PriorityBadge,
                TextStyle::Emphasis,
                text_x,
                text_top,
                ACCENT,
            ),
            run(
                selected.concession.label(),
                TextRole::ConcessionName,
                TextStyle::Emphasis,
                text_x + badge_w + BADGE_GAP,
                text_top,
                INK,
            ),
        ];

        let description_top = text_top + name_h + LINE_GAP / 2;
        let lines = wrap::truncate_lines(
            self.wrap(
                &selected.entry.description,
                TextStyle::Body,
                self.description_width(),
            ),
            MAX_DESCRIPTION_LINES,
        );
        for (i, line) in lines.iter().enumerate() {
            texts.push(run(
                line,
                TextRole::ConcessionDescription,
                TextStyle::Body,
                text_x,
                description_top + i as u32 * body_h,
                MUTED,
            ));
        }

        Block {
            kind: BlockKind::ConcessionCard,
            rect: Rect::new(x, top, self.content_width(), self.card_height()),
            fill: Fill::Solid(CARD_BG),
            border: Some(Border {
                color: ACCENT,
                width: ACCENT_WIDTH,
                side: BorderSide::Left,
            }),
            texts,
        }
    }

    fn script_panel(&self, blocks: &mut Vec<Block>, top: u32) -> u32 {
        let (x, width) = self.panel_span();
        let heading_h = self.line_height(TextStyle::Heading);
        let body_h = self.line_height(TextStyle::Body);
        let text_x = x + PANEL_PAD;

        let mut texts = vec![run(
            SCRIPT_HEADING,
            TextRole::ScriptHeading,
            TextStyle::Heading,
            text_x,
            top + PANEL_PAD,
            INK,
        )];

        let mut cursor = top + PANEL_PAD + heading_h + LINE_GAP;
        for (i, step) in SCRIPT_STEPS.iter().enumerate() {
            if i > 0 {
                cursor += SCRIPT_STEP_GAP;
            }
            let numbered = format!("{}. {step}", i + 1);
            for line in self.wrap(&numbered, TextStyle::Body, self.content_width()) {
                texts.push(run(
                    &line,
                    TextRole::ScriptStep,
                    TextStyle::Body,
                    text_x,
                    cursor,
                    SCRIPT_INK,
                ));
                cursor += body_h;
            }
        }

        let height = (cursor - top) + PANEL_PAD;
        blocks.push(Block {
            kind: BlockKind::Script,
            rect: Rect::new(x, top, width, height),
            fill: Fill::Solid(SCRIPT_BG),
            border: Some(Border {
                color: SCRIPT_BORDER,
                width: SCRIPT_BORDER_WIDTH,
                side: BorderSide::All,
            }),
            texts,
        });
        top + height
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn panel_span(&self) -> (u32, u32) {
        (MARGIN, self.width.saturating_sub(2 * MARGIN))
    }

    fn content_width(&self) -> u32 {
        self.panel_span().1.saturating_sub(2 * PANEL_PAD)
    }

    fn card_height(&self) -> u32 {
        CARD_PAD
            + self.line_height(TextStyle::Emphasis)
            + LINE_GAP / 2
            + MAX_DESCRIPTION_LINES as u32 * self.line_height(TextStyle::Body)
            + CARD_PAD
    }

    fn line_height(&self, style: TextStyle) -> u32 {
        self.fonts.line_height(style)
    }

    fn wrap(&self, text: &str, style: TextStyle, max_width: u32) -> Vec<String> {
        wrap::wrap_text(text, max_width, |s| self.fonts.measure(style, s))
    }

    fn centered(&self, text: &str, role: TextRole, style: TextStyle, y: u32, color: Rgb<u8>) -> TextRun {
        let (x, width) = self.panel_span();
        let text_w = self.fonts.measure(style, text);
        run(text, role, style, x + width.saturating_sub(text_w) / 2, y, color)
    }
}

fn run(text: &str, role: TextRole, style: TextStyle, x: u32, y: u32, color: Rgb<u8>) -> TextRun {
    TextRun {
        text: text.to_string(),
        role,
        style,
        x,
        y,
        color,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
