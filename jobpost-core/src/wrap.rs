//! Line Wrapper - Greedy Word Wrap
//!
//! Words are split on single spaces and accumulated while the measured
//! candidate (`line + word + " "`) fits. Committed lines keep their trailing
//! space; drawing trims it. The final accumulated line is always committed.

use image::{Rgb, RgbImage};

use crate::font::{Font, TextMetrics};

/// Break `text` into visual lines no wider than `max_width`.
///
/// A word wider than `max_width` is never split and overflows on its own line.
pub fn wrap_text<M: TextMetrics + ?Sized>(text: &str, metrics: &M, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split(' ') {
        let candidate = format!("{line}{word} ");
        if metrics.text_width(&candidate) <= max_width {
            line = candidate;
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
            line.push(' ');
        }
    }
    lines.push(line);

    lines
}

/// Wrap and draw `text` left-aligned at `origin`, returning the `y` below the last line.
pub fn draw_wrapped(
    canvas: &mut RgbImage,
    text: &str,
    font: &Font,
    origin: (i64, i64),
    color: Rgb<u8>,
    max_width: f32,
) -> i64 {
    let (x, mut y) = origin;
    let line_height = font.line_height().round().max(1.0) as i64;

    for line in wrap_text(text, font, max_width) {
        font.draw(canvas, x, y, line.trim(), color);
        y += line_height;
    }

    y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{Typeface, Weight};

    /// Every word measures 40px; spaces are free.
    struct FortyPerWord;

    impl TextMetrics for FortyPerWord {
        fn text_width(&self, text: &str) -> f32 {
            text.split_whitespace().count() as f32 * 40.0
        }

        fn text_height(&self, _text: &str) -> f32 {
            10.0
        }
    }

    /// Monospaced: every character, space included, is 10px wide.
    struct TenPerChar;

    impl TextMetrics for TenPerChar {
        fn text_width(&self, text: &str) -> f32 {
            text.chars().count() as f32 * 10.0
        }

        fn text_height(&self, _text: &str) -> f32 {
            14.0
        }
    }

    fn regular(px: f32) -> Font {
        Typeface::embedded(Weight::Regular).at_size(px)
    }

    fn words(lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .flat_map(|l| l.split_whitespace())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_quick_brown_fox_two_lines() {
        let lines = wrap_text("the quick brown fox", &FortyPerWord, 100.0);
        assert_eq!(lines, vec!["the quick ", "brown fox "]);
    }

    #[test]
    fn test_empty_text_yields_one_blank_line() {
        let lines = wrap_text("", &FortyPerWord, 100.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].trim(), "");
    }

    #[test]
    fn test_whitespace_only_does_not_panic() {
        let lines = wrap_text("   ", &FortyPerWord, 100.0);
        assert!(lines.iter().all(|l| l.trim().is_empty()));
    }

    #[test]
    fn test_oversized_word_stays_whole() {
        let lines = wrap_text("a supercalifragilistic b", &TenPerChar, 60.0);
        assert_eq!(lines, vec!["a ", "supercalifragilistic ", "b "]);
        assert!(lines.iter().any(|l| l.trim() == "supercalifragilistic"));
        assert_eq!(words(&lines), vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_oversized_first_word_keeps_leading_blank_line() {
        let lines = wrap_text("extraordinarily short", &TenPerChar, 30.0);
        assert_eq!(lines[0], "");
        assert_eq!(lines[1].trim(), "extraordinarily");
    }

    #[test]
    fn test_lines_fit_width_and_preserve_words() {
        let font = regular(16.0);
        let text = "Management Industrial Trainees in Finance with ICWA or CA inter \
                    qualification may walk in for the interview on the nineteenth";
        let max_width = 240.0;
        let lines = wrap_text(text, &font, max_width);

        assert!(lines.len() > 1);
        for line in &lines {
            if line.split_whitespace().count() > 1 {
                assert!(font.text_width(line) <= max_width, "{line:?} overflows");
            }
        }
        let expected: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        assert_eq!(words(&lines), expected);
    }

    #[test]
    fn test_cursor_advances_per_line() {
        let font = regular(16.0);
        let mut canvas = RgbImage::new(200, 200);
        let line_height = font.line_height().round() as i64;

        let end = draw_wrapped(&mut canvas, "one", &font, (10, 20), Rgb([0, 0, 0]), 180.0);
        assert_eq!(end, 20 + line_height);

        let lines = wrap_text("one two three four five six", &font, 100.0).len() as i64;
        let end = draw_wrapped(
            &mut canvas,
            "one two three four five six",
            &font,
            (10, 20),
            Rgb([0, 0, 0]),
            100.0,
        );
        assert_eq!(end, 20 + lines * line_height);
    }

    #[test]
    fn test_cursor_moves_even_for_empty_text() {
        let font = regular(8.0);
        let mut canvas = RgbImage::new(50, 50);
        let end = draw_wrapped(&mut canvas, "", &font, (0, 5), Rgb([0, 0, 0]), 40.0);
        assert!(end > 5);
    }

    #[test]
    fn test_body_lines_fit_wrap_width_at_1080() {
        // body size and wrap width of a 1080px canvas
        let font = regular((1080.0f32 * 0.035).floor());
        let max_width = (1080.0f32 * 0.85).floor();
        let text = "Management Industrial Trainees (Finance) must hold ICWA (Inter) or CA (Inter) \
                    and attend the walk-in interview on 19-Aug-2025 with original certificates";
        let lines = wrap_text(text, &font, max_width);

        assert!(lines.len() > 1);
        for line in &lines {
            if line.split_whitespace().count() > 1 {
                assert!(font.text_width(line) <= max_width, "{line:?} overflows");
            }
        }
        // every committed line was full: the next word would not have fit
        for pair in lines.windows(2) {
            if let Some(next) = pair[1].split_whitespace().next() {
                if !pair[0].is_empty() {
                    assert!(font.text_width(&format!("{}{next} ", pair[0])) > max_width);
                }
            }
        }
    }

    #[test]
    fn test_huge_font_size_wraps_one_word_per_line() {
        let font = Typeface::embedded(Weight::Regular).at_size(1e12);
        let lines = wrap_text("abc def", &font, 10.0);
        assert_eq!(lines, vec!["", "abc ", "def "]);
        assert!(font.line_height().is_finite());
    }
}
