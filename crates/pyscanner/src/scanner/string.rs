use super::Scanner;
use crate::{Delimiter, Lexer, TokenKind};

impl Scanner {
    /// Scans literal text inside the innermost open string.
    ///
    /// Text runs up to an interpolation, an escape sequence or the closing
    /// quotes. A run that has content is emitted as `STRING_CONTENT` with the
    /// boundary left for the next call; a boundary with nothing in front of it
    /// is either the closing quotes (`STRING_END`) or something the grammar
    /// lexes itself, in which case the scan declines.
    pub(super) fn scan_string_content<L: Lexer + ?Sized>(
        &mut self,
        lexer: &mut L,
        delimiter: Delimiter,
    ) -> Option<TokenKind> {
        let end_character = delimiter.end_character()?;
        let content = |has_content: bool| has_content.then_some(TokenKind::StringContent);

        let mut has_content = false;
        while let Some(ch) = lexer.lookahead() {
            if ch == '{' && delimiter.is_format() {
                lexer.mark_end();
                lexer.consume();
                if !lexer.at('{') {
                    return content(has_content);
                }
                lexer.consume();
            } else if ch == '\\' {
                if delimiter.is_raw() {
                    lexer.consume();
                } else if delimiter.is_bytes() {
                    lexer.mark_end();
                    lexer.consume();
                    // \N{...}, \uXXXX and \UXXXXXXXX are not escapes in bytes.
                    if !matches!(lexer.lookahead(), Some('N' | 'u' | 'U')) {
                        return content(has_content);
                    }
                    lexer.consume();
                } else {
                    lexer.mark_end();
                    return content(has_content);
                }
            } else if ch == end_character {
                if delimiter.is_triple() {
                    lexer.mark_end();
                    lexer.consume();
                    if lexer.at(end_character) {
                        lexer.consume();
                        if lexer.at(end_character) {
                            if has_content {
                                return Some(TokenKind::StringContent);
                            }
                            lexer.consume();
                            lexer.mark_end();
                            return Some(self.close_string());
                        }
                    }
                } else {
                    if has_content {
                        lexer.mark_end();
                        return Some(TokenKind::StringContent);
                    }
                    lexer.consume();
                    lexer.mark_end();
                    return Some(self.close_string());
                }
            } else if ch == '\n' && has_content && !delimiter.is_triple() {
                return None;
            } else {
                lexer.consume();
            }
            has_content = true;
        }

        // Unterminated; the grammar reports it.
        None
    }

    fn close_string(&mut self) -> TokenKind {
        self.state.delimiters.pop();
        TokenKind::StringEnd
    }
}
