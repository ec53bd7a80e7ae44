//! Text sanitisation: deterministic cleanup of AI-authored free text.
//!
//! ## Why is sanitisation necessary?
//!
//! Even well-prompted models decorate their answers with artefacts the
//! documents must not show — `[bracketed]` stage directions left over from
//! the prompt's own placeholders, the literal keyword `INCLUYE:` copied from
//! instructions, and `**bold**` markers in fields that render as plain text.
//!
//! Three small, pure functions cover every renderer's needs:
//!
//! * [`sanitize`] — strips brackets and `INCLUYE:`; **keeps** `**` markers
//!   for the rich-text path.
//! * [`clean_for_display`] — [`sanitize`] plus unwrapping `**…**` to its
//!   inner text, for contexts that cannot render per-run bold (PDF body
//!   text, slides).
//! * [`parse_rich_text`] — tokenises a markdown subset (only `**bold**`)
//!   into per-line styled runs for the DOCX cell builder.
//!
//! All three are idempotent on already-clean input. The tokenizer is a
//! regex split on `(\*\*.*?\*\*)`, deliberately NOT a markdown parser: the
//! prompt contract only ever emits this one construct, and a stricter parser
//! would diverge from what round-trips through the external chat session.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\[\]]").unwrap());
static RE_INCLUYE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)INCLUYE:?").unwrap());
static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

/// Strip `[` and `]` (keeping their contents) and the `INCLUYE:` keyword
/// (case-insensitive, with or without the colon), then trim.
///
/// `**bold**` markers are preserved — [`parse_rich_text`] consumes them.
pub fn sanitize(text: &str) -> String {
    let s = RE_BRACKETS.replace_all(text, "");
    let s = RE_INCLUYE.replace_all(&s, "");
    s.trim().to_string()
}

/// [`sanitize`] plus unwrapping `**…**` pairs down to their inner text.
///
/// Used by the PDF renderer and any other context that draws body text in a
/// single font face. An unmatched `**` has no closing pair for the
/// non-greedy regex and is emitted literally.
pub fn clean_for_display(text: &str) -> String {
    let s = RE_BOLD.replace_all(text, "$1");
    let s = RE_BRACKETS.replace_all(&s, "");
    let s = RE_INCLUYE.replace_all(&s, "");
    s.trim().to_string()
}

/// One styled fragment of a line: a run of text that is either bold or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichRun {
    pub text: String,
    pub bold: bool,
}

/// One rendered line: the ordered runs produced from a single `\n`-separated
/// source line. May be empty (blank source line).
pub type RichLine = Vec<RichRun>;

/// Tokenise sanitised text into per-line bold/plain runs.
///
/// Fast path: input without any `**` marker is returned as a SINGLE line
/// holding the whole (sanitised) text, embedded newlines included — the
/// original renderer only splits lines when bold runs are present, and the
/// DOCX output depends on that asymmetry.
///
/// Otherwise the text is split on `\n` and each line is split on the
/// non-greedy `(\*\*.*?\*\*)` pattern; matched segments lose their markers
/// and become bold runs, everything between them stays plain. Empty
/// fragments between adjacent matches are dropped (they would render as
/// zero-width runs). An odd trailing `**` never matches and therefore
/// passes through literally.
pub fn parse_rich_text(text: &str) -> Vec<RichLine> {
    let clean = sanitize(text);

    if !clean.contains("**") {
        return vec![vec![RichRun {
            text: clean,
            bold: false,
        }]];
    }

    clean.split('\n').map(split_line).collect()
}

fn split_line(line: &str) -> RichLine {
    let mut runs = Vec::new();
    let mut last = 0usize;

    for m in RE_BOLD.find_iter(line) {
        let before = &line[last..m.start()];
        if !before.is_empty() {
            runs.push(RichRun {
                text: before.to_string(),
                bold: false,
            });
        }
        let inner = &line[m.start() + 2..m.end() - 2];
        runs.push(RichRun {
            text: inner.to_string(),
            bold: true,
        });
        last = m.end();
    }

    let tail = &line[last..];
    if !tail.is_empty() {
        runs.push(RichRun {
            text: tail.to_string(),
            bold: false,
        });
    }

    runs
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_brackets_keeps_contents() {
        assert_eq!(sanitize("texto [importante] final"), "texto importante final");
    }

    #[test]
    fn strips_incluye_with_and_without_colon() {
        assert_eq!(sanitize("INCLUYE: pizarra"), "pizarra");
        assert_eq!(sanitize("incluye pizarra"), "pizarra");
        assert_eq!(sanitize("Incluye: lápices y papel"), "lápices y papel");
    }

    #[test]
    fn sanitize_preserves_bold_markers() {
        assert_eq!(sanitize("**Inicio**: saludo"), "**Inicio**: saludo");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            "texto [con] marcas INCLUYE: cosas",
            "  ya limpio  ",
            "**negrita** intacta",
            "",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn clean_for_display_unwraps_bold() {
        assert_eq!(clean_for_display("**Inicio**: saludo"), "Inicio: saludo");
    }

    #[test]
    fn clean_for_display_leaves_unbalanced_marker_literal() {
        assert_eq!(clean_for_display("abierto ** sin cierre"), "abierto ** sin cierre");
    }

    #[test]
    fn rich_text_fast_path_is_one_line() {
        let lines = parse_rich_text("línea uno\nlínea dos");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0][0].text, "línea uno\nlínea dos");
        assert!(!lines[0][0].bold);
    }

    #[test]
    fn rich_text_splits_bold_runs() {
        let lines = parse_rich_text("**Inicio**: saludo");
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0],
            vec![
                RichRun { text: "Inicio".into(), bold: true },
                RichRun { text: ": saludo".into(), bold: false },
            ]
        );
    }

    #[test]
    fn rich_text_splits_lines_when_bold_present() {
        let lines = parse_rich_text("**Inicio**: saludo\n\n**Cierre**: ticket");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].is_empty());
        assert_eq!(lines[2][0], RichRun { text: "Cierre".into(), bold: true });
    }

    #[test]
    fn rich_text_odd_trailing_marker_stays_literal() {
        let lines = parse_rich_text("**a** y luego ** suelto");
        assert_eq!(
            lines[0],
            vec![
                RichRun { text: "a".into(), bold: true },
                RichRun { text: " y luego ** suelto".into(), bold: false },
            ]
        );
    }

    #[test]
    fn rich_text_strips_brackets_before_tokenising() {
        let lines = parse_rich_text("**Desarrollo**: [45 min] trabajo");
        assert_eq!(lines[0][1].text, ": 45 min trabajo");
    }
}
