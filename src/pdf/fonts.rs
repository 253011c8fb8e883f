//! Standard-14 font selection, WinAnsi text encoding and width metrics.
//!
//! No fonts are embedded: every family maps onto one of the three base
//! families every PDF viewer ships.

/// Helvetica advance widths for 0x20..=0x7E, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];
const HELVETICA_DEFAULT_WIDTH: u16 = 556;
const COURIER_WIDTH: u16 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StandardFont {
    Helvetica,
    TimesRoman,
    Courier,
}

impl StandardFont {
    /// Pick the closest base family for a CSS `font-family` list.
    pub fn from_family(family: &str) -> Self {
        let family = family.to_ascii_lowercase();
        if family.contains("courier") || family.contains("mono") {
            StandardFont::Courier
        } else if family.contains("times")
            || family.contains("georgia")
            || family.contains("garamond")
            || (family.contains("serif") && !family.contains("sans"))
        {
            StandardFont::TimesRoman
        } else {
            StandardFont::Helvetica
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::Courier => "Courier",
        }
    }

    /// Name of the font in the page's resource dictionary.
    pub fn resource_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "F1",
            StandardFont::TimesRoman => "F2",
            StandardFont::Courier => "F3",
        }
    }

    /// Advance width of `text` at `font_size`, in points.
    ///
    /// Times is measured with Helvetica metrics, close enough for centering.
    pub fn text_width(self, text: &str, font_size: f64) -> f64 {
        let units: u32 = text
            .chars()
            .map(|c| {
                let width = match self {
                    StandardFont::Courier => COURIER_WIDTH,
                    _ => helvetica_width(c),
                };
                width as u32
            })
            .sum();
        units as f64 * font_size / 1000.0
    }
}

fn helvetica_width(c: char) -> u16 {
    match c {
        ' '..='~' => HELVETICA_WIDTHS[c as usize - 0x20],
        _ => HELVETICA_DEFAULT_WIDTH,
    }
}

/// Encode `text` as WinAnsi bytes; characters outside the encoding become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_mapping() {
        assert_eq!(StandardFont::from_family("Arial"), StandardFont::Helvetica);
        assert_eq!(StandardFont::from_family("sans-serif"), StandardFont::Helvetica);
        assert_eq!(StandardFont::from_family("Times New Roman, serif"), StandardFont::TimesRoman);
        assert_eq!(StandardFont::from_family("Georgia"), StandardFont::TimesRoman);
        assert_eq!(StandardFont::from_family("Courier New"), StandardFont::Courier);
        assert_eq!(StandardFont::from_family("monospace"), StandardFont::Courier);
    }

    #[test]
    fn widths() {
        let hv = StandardFont::Helvetica;
        assert_eq!(hv.text_width("", 12.0), 0.0);
        assert!((hv.text_width("A", 10.0) - 6.67).abs() < 1e-9);
        assert!((hv.text_width("il", 1000.0) - 444.0).abs() < 1e-9);
        assert!((StandardFont::Courier.text_width("abc", 10.0) - 18.0).abs() < 1e-9);
        assert_eq!(helvetica_width('~'), 584);
    }

    #[test]
    fn win_ansi() {
        assert_eq!(encode_win_ansi("Asa branca"), b"Asa branca".to_vec());
        assert_eq!(
            encode_win_ansi("Café – é"),
            vec![b'C', b'a', b'f', 0xE9, b' ', 0x96, b' ', 0xE9]
        );
        assert_eq!(encode_win_ansi("童年"), b"??".to_vec());
    }
}
