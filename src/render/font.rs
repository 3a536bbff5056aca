//! Standard Type 1 fonts: WinAnsi encoding and Helvetica metrics.

use unicode_normalization::UnicodeNormalization;

/// The two faces every document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    /// Helvetica
    Regular,
    /// Helvetica-Bold
    Bold,
}

impl Font {
    /// Pick the face for a style.
    pub fn for_weight(bold: bool) -> Self {
        if bold {
            Font::Bold
        } else {
            Font::Regular
        }
    }

    /// Name in the page resource dictionary.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    /// PostScript name of the standard font.
    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }

    /// Advance width of a sanitized character, in points at `size`.
    pub fn char_width(&self, ch: char, size: f32) -> f32 {
        let code = encode_char(ch).unwrap_or(b'?');
        glyph_units(*self, code) as f32 * size / 1000.0
    }

    /// Advance width of a sanitized string, in points at `size`.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|ch| glyph_units(*self, encode_char(ch).unwrap_or(b'?')) as u32)
            .sum();
        units as f32 * size / 1000.0
    }
}

/// Glyph widths for codes 32..=126 (Adobe AFM, units of 1/1000 em).
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, //
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, //
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, //
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, //
];

/// WinAnsi 0x80..=0x9F: unicode scalar and width (0 = undefined code).
const WIN_ANSI_HIGH: [(char, u16); 32] = [
    ('€', 556),
    ('\0', 0),
    ('‚', 222),
    ('ƒ', 556),
    ('„', 333),
    ('…', 1000),
    ('†', 556),
    ('‡', 556),
    ('ˆ', 333),
    ('‰', 1000),
    ('Š', 667),
    ('‹', 333),
    ('Œ', 1000),
    ('\0', 0),
    ('Ž', 611),
    ('\0', 0),
    ('\0', 0),
    ('\u{2018}', 222),
    ('\u{2019}', 222),
    ('\u{201C}', 333),
    ('\u{201D}', 333),
    ('•', 350),
    ('–', 556),
    ('—', 1000),
    ('˜', 333),
    ('™', 1000),
    ('š', 500),
    ('›', 333),
    ('œ', 944),
    ('\0', 0),
    ('ž', 500),
    ('Ÿ', 667),
];

/// Latin-1 symbols without a decomposition (0xA0..=0xFF).
fn latin1_symbol_units(code: u8) -> Option<u16> {
    let units = match code {
        0xA0 => 278,
        0xA1 | 0xA8 | 0xAD | 0xAF | 0xB2 | 0xB3 | 0xB4 | 0xB8 | 0xB9 => 333,
        0xA2..=0xA5 | 0xA7 | 0xAB | 0xB5 | 0xBB => 556,
        0xA6 => 260,
        0xA9 | 0xAE => 737,
        0xAA => 370,
        0xAC | 0xB1 | 0xD7 | 0xF7 => 584,
        0xB0 => 400,
        0xB6 => 537,
        0xB7 => 278,
        0xBA => 365,
        0xBC..=0xBE => 834,
        0xBF | 0xDF | 0xF8 => 611,
        0xC6 => 1000,
        0xD0 => 722,
        0xD8 => 778,
        0xDE => 667,
        0xE6 => 889,
        0xF0 | 0xFE => 556,
        _ => return None,
    };
    Some(units)
}

fn glyph_units(font: Font, code: u8) -> u16 {
    let ascii = match font {
        Font::Regular => &HELVETICA_ASCII,
        Font::Bold => &HELVETICA_BOLD_ASCII,
    };
    match code {
        32..=126 => ascii[(code - 32) as usize],
        0x80..=0x9F => match WIN_ANSI_HIGH[(code - 0x80) as usize].1 {
            0 => ascii[(b'?' - 32) as usize],
            units => units,
        },
        0xA0..=0xFF => latin1_symbol_units(code).unwrap_or_else(|| {
            // accented letters take the width of their base letter
            std::iter::once(char::from(code))
                .nfd()
                .next()
                .filter(|base| base.is_ascii_graphic())
                .map(|base| ascii[(base as u8 - 32) as usize])
                .unwrap_or(556)
        }),
        _ => 0,
    }
}

/// WinAnsi code for a character, if the encoding has one.
pub fn encode_char(ch: char) -> Option<u8> {
    match ch as u32 {
        0x20..=0x7E | 0xA0..=0xFF => Some(ch as u32 as u8),
        _ => WIN_ANSI_HIGH
            .iter()
            .position(|(c, units)| *units != 0 && *c == ch)
            .map(|i| 0x80 + i as u8),
    }
}

/// Prepare text for layout.
///
/// The text is NFC-normalized, tabs become spaces, other control characters
/// except `\n` are dropped and characters outside WinAnsi become `?`.
pub fn sanitize(text: &str) -> String {
    text.nfc()
        .filter_map(|ch| match ch {
            '\n' => Some('\n'),
            '\t' => Some(' '),
            c if c.is_control() => None,
            c if encode_char(c).is_some() => Some(c),
            _ => Some('?'),
        })
        .collect()
}

/// Encode sanitized text as WinAnsi bytes.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .filter_map(|ch| match ch {
            '\n' => None,
            c => Some(encode_char(c).unwrap_or(b'?')),
        })
        .collect()
}
