//! Lexer — tokenizes Aster source with layout and error recovery.
//!
//! The lexer is a single-lookahead scanner over the source text. Beyond
//! ordinary tokenization it carries three responsibilities that shape its
//! design:
//!
//! - **Layout**: it keeps a stack of block indent columns. The parser
//!   pushes a level at the column of a block's first token; afterwards,
//!   whenever a line break is crossed, the next token's column is compared
//!   against the top of the stack — equal emits `EndOfStmt`, smaller pops
//!   the level and emits `EndOfBlock` (repeatedly, so one dedent can close
//!   several blocks), larger means a continuation line.
//!
//! - **Snapshots**: the parser backtracks with `try_parse`, so every piece
//!   of mutable lexer state (position, line/column, indent stack, format
//!   state, logged errors) can be captured in a [`LexerSnapshot`] and
//!   restored exactly. Snapshots nest.
//!
//! - **String interpolation**: a string with embedded expressions is
//!   emitted as alternating `Str` chunks and `StartOfFormat` .. tokens ..
//!   `EndOfFormat` runs. Brace nesting is tracked per open hole so tuple
//!   construction works inside a format expression.
//!
//! On an unexpected character the lexer reports an error and skips it,
//! continuing to tokenize the rest of the input.
//!
//! Comments are `--` to end of line and nested `{- ... -}` blocks; an
//! operator therefore cannot begin with two dashes.

use smallvec::SmallVec;
use unicode_ident::{is_xid_continue, is_xid_start};

use crate::errors::Diagnostic;
use crate::intern::Interner;
use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'src, 'ctx> {
    source: &'src str,
    interner: &'ctx mut Interner,
    pos: usize,
    line: u32,
    col: u32,
    /// A line break was crossed since the last real token.
    newline: bool,
    /// Block indent columns, innermost last.
    indents: SmallVec<[u32; 8]>,
    /// Brace depth per open format hole, innermost last.
    formats: SmallVec<[u32; 4]>,
    /// The next token is `StartOfFormat`.
    start_format: bool,
    /// The next token is the string chunk following an `EndOfFormat`.
    resume_string: bool,
    errors: Vec<Diagnostic>,
}

/// Captured lexer state for parser backtracking.
#[derive(Clone)]
pub struct LexerSnapshot {
    pos: usize,
    line: u32,
    col: u32,
    newline: bool,
    indents: SmallVec<[u32; 8]>,
    formats: SmallVec<[u32; 4]>,
    start_format: bool,
    resume_string: bool,
    errors_len: usize,
}

impl<'src, 'ctx> Lexer<'src, 'ctx> {
    pub fn new(source: &'src str, interner: &'ctx mut Interner) -> Self {
        Self {
            source,
            interner,
            pos: 0,
            line: 1,
            col: 1,
            newline: false,
            indents: SmallVec::new(),
            formats: SmallVec::new(),
            start_format: false,
            resume_string: false,
            errors: Vec::new(),
        }
    }

    pub fn interner(&self) -> &Interner {
        self.interner
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.errors)
    }

    // ── Layout levels ────────────────────────────────────────────────

    /// Open a layout block whose statements start at `col`. Returns the
    /// stack depth used to close the level again.
    pub fn push_level(&mut self, col: u32) -> usize {
        self.indents.push(col);
        self.indents.len()
    }

    /// Close the level opened at `depth`. A no-op if a dedent (or end of
    /// input) already closed it.
    pub fn close_level(&mut self, depth: usize) {
        if self.indents.len() >= depth {
            self.indents.truncate(depth - 1);
        }
    }

    // ── Snapshots ────────────────────────────────────────────────────

    pub fn save(&self) -> LexerSnapshot {
        LexerSnapshot {
            pos: self.pos,
            line: self.line,
            col: self.col,
            newline: self.newline,
            indents: self.indents.clone(),
            formats: self.formats.clone(),
            start_format: self.start_format,
            resume_string: self.resume_string,
            errors_len: self.errors.len(),
        }
    }

    pub fn restore(&mut self, snap: LexerSnapshot) {
        self.pos = snap.pos;
        self.line = snap.line;
        self.col = snap.col;
        self.newline = snap.newline;
        self.indents = snap.indents;
        self.formats = snap.formats;
        self.start_format = snap.start_format;
        self.resume_string = snap.resume_string;
        self.errors.truncate(snap.errors_len);
    }

    // ── Token production ─────────────────────────────────────────────

    pub fn next_token(&mut self) -> Token {
        if self.start_format {
            self.start_format = false;
            self.formats.push(0);
            return self.here(TokenKind::StartOfFormat);
        }
        if self.resume_string {
            self.resume_string = false;
            let start = self.pos;
            let col = self.col;
            return self.scan_string_chunk(start, col);
        }

        loop {
            self.skip_trivia();

            if self.peek().is_none() {
                // Close every remaining block, one token per call.
                if self.indents.pop().is_some() {
                    return self.here(TokenKind::EndOfBlock);
                }
                return self.here(TokenKind::Eof);
            }

            if self.newline {
                if let Some(&top) = self.indents.last() {
                    if self.col < top {
                        self.indents.pop();
                        return self.here(TokenKind::EndOfBlock);
                    }
                    if self.col == top {
                        self.newline = false;
                        return self.here(TokenKind::EndOfStmt);
                    }
                }
                self.newline = false;
            }

            if let Some(token) = self.scan_token() {
                return token;
            }
            // An error was reported; keep scanning.
        }
    }

    /// Scan one real token, or report an error and return None.
    fn scan_token(&mut self) -> Option<Token> {
        let start = self.pos;
        let col = self.col;
        let c = self.advance()?;

        let kind = match c {
            '(' => TokenKind::ParenL,
            ')' => TokenKind::ParenR,
            ',' => TokenKind::Comma,
            '`' => TokenKind::Grave,
            '{' => {
                if let Some(depth) = self.formats.last_mut() {
                    *depth += 1;
                }
                TokenKind::BraceL
            }
            '}' => match self.formats.last_mut() {
                Some(0) => {
                    self.formats.pop();
                    self.resume_string = true;
                    TokenKind::EndOfFormat
                }
                Some(depth) => {
                    *depth -= 1;
                    TokenKind::BraceR
                }
                None => TokenKind::BraceR,
            },
            '"' => return Some(self.scan_string_chunk(start, col)),
            '\'' => return self.scan_char(start, col),
            c if c.is_ascii_digit() => return Some(self.scan_number(c, start, col)),
            c if is_xid_start(c) || c == '_' => return Some(self.scan_word(c, start, col)),
            c if is_symbol_char(c) => return Some(self.scan_symbol(c, start, col)),
            c => {
                self.error(
                    format!("Unexpected character '{}'", c),
                    Span::new(start, self.pos),
                );
                return None;
            }
        };

        Some(Token::new(kind, Span::new(start, self.pos), col))
    }

    fn scan_word(&mut self, first: char, start: usize, col: u32) -> Token {
        while let Some(c) = self.peek() {
            if is_xid_continue(c) || c == '_' || c == '\'' {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];

        let kind = match text {
            "type" => TokenKind::Type,
            "data" => TokenKind::Data,
            "foreign" => TokenKind::Foreign,
            "import" => TokenKind::Import,
            "let" => TokenKind::Let,
            "var" => TokenKind::Var,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "case" => TokenKind::Case,
            "of" => TokenKind::Of,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "infix" => TokenKind::Infix,
            "infixl" => TokenKind::InfixL,
            "infixr" => TokenKind::InfixR,
            "prefix" => TokenKind::Prefix,
            _ => {
                let id = self.interner.intern(text);
                if first.is_uppercase() {
                    TokenKind::ConId(id)
                } else {
                    TokenKind::VarId(id)
                }
            }
        };
        Token::new(kind, Span::new(start, self.pos), col)
    }

    fn scan_symbol(&mut self, _first: char, start: usize, col: u32) -> Token {
        while let Some(c) = self.peek() {
            if is_symbol_char(c) {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];

        let kind = match text {
            "=" => TokenKind::Equals,
            "|" => TokenKind::Bar,
            "$" => TokenKind::Dollar,
            "->" => TokenKind::ArrowR,
            "." => TokenKind::Dot,
            ":" => TokenKind::Colon,
            "\\" => TokenKind::Backslash,
            _ => TokenKind::VarSym(self.interner.intern(text)),
        };
        Token::new(kind, Span::new(start, self.pos), col)
    }

    fn scan_number(&mut self, first: char, start: usize, col: u32) -> Token {
        let mut text = String::new();
        text.push(first);
        let mut is_float = false;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        // Fractional part. A dot not followed by a digit stays a field access.
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            text.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        // Exponent.
        if matches!(self.peek(), Some('e') | Some('E')) {
            is_float = true;
            text.push('e');
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                text.push(self.peek().unwrap());
                self.advance();
            }
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        let span = Span::new(start, self.pos);
        let kind = if is_float {
            match text.parse::<f64>() {
                Ok(n) => TokenKind::Float(n),
                Err(_) => {
                    self.error(format!("Invalid float literal '{}'", text), span);
                    TokenKind::Float(0.0)
                }
            }
        } else {
            match text.parse::<i64>() {
                Ok(n) => TokenKind::Int(n),
                Err(_) => {
                    self.error(format!("Invalid integer literal '{}'", text), span);
                    TokenKind::Int(0)
                }
            }
        };
        Token::new(kind, span, col)
    }

    fn scan_char(&mut self, start: usize, col: u32) -> Option<Token> {
        let value = match self.peek() {
            None | Some('\n') => {
                self.error("Unterminated character literal", Span::new(start, self.pos));
                return None;
            }
            Some('\\') => {
                self.advance();
                self.escape()?
            }
            Some(c) => {
                self.advance();
                c
            }
        };
        if self.peek() == Some('\'') {
            self.advance();
            Some(Token::new(
                TokenKind::Char(value),
                Span::new(start, self.pos),
                col,
            ))
        } else {
            self.error("Unterminated character literal", Span::new(start, self.pos));
            None
        }
    }

    /// Scan a string chunk after an opening quote or a closed format hole.
    /// The chunk ends at `"` (literal done) or `{` (a format hole opens;
    /// the next token will be `StartOfFormat`).
    fn scan_string_chunk(&mut self, start: usize, col: u32) -> Token {
        let mut text = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.error("Unterminated string literal", Span::new(start, self.pos));
                    break;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('{') => {
                    self.advance();
                    self.start_format = true;
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if let Some(c) = self.escape() {
                        text.push(c);
                    }
                }
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
            }
        }
        let id = self.interner.intern(&text);
        Token::new(TokenKind::Str(id), Span::new(start, self.pos), col)
    }

    /// Decode the character after a backslash.
    fn escape(&mut self) -> Option<char> {
        let start = self.pos;
        let c = self.advance()?;
        match c {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            '0' => Some('\0'),
            '\\' => Some('\\'),
            '"' => Some('"'),
            '\'' => Some('\''),
            '{' => Some('{'),
            '}' => Some('}'),
            other => {
                self.error(
                    format!("Unknown escape sequence '\\{}'", other),
                    Span::new(start, self.pos),
                );
                Some(other)
            }
        }
    }

    // ── Trivia ───────────────────────────────────────────────────────

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('-') if self.peek_at(1) == Some('-') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('{') if self.peek_at(1) == Some('-') => {
                    let start = self.pos;
                    self.advance();
                    self.advance();
                    let mut depth = 1u32;
                    while depth > 0 {
                        match (self.peek(), self.peek_at(1)) {
                            (Some('{'), Some('-')) => {
                                self.advance();
                                self.advance();
                                depth += 1;
                            }
                            (Some('-'), Some('}')) => {
                                self.advance();
                                self.advance();
                                depth -= 1;
                            }
                            (Some(_), _) => {
                                self.advance();
                            }
                            (None, _) => {
                                self.error(
                                    "Unterminated block comment",
                                    Span::new(start, self.pos),
                                );
                                break;
                            }
                        }
                    }
                }
                _ => break,
            }
        }
    }

    // ── Character-level helpers ──────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        match c {
            '\n' => {
                self.line += 1;
                self.col = 1;
                self.newline = true;
            }
            // Tabs advance to the next multiple-of-8 boundary plus one.
            '\t' => self.col = self.col + 8 - (self.col - 1) % 8,
            _ => self.col += 1,
        }
        Some(c)
    }

    /// A zero-width token at the current position (synthetic kinds).
    fn here(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.pos, self.pos), self.col)
    }

    fn error(&mut self, message: impl Into<String>, span: Span) {
        self.errors.push(Diagnostic::new(message, span));
    }
}

fn is_symbol_char(c: char) -> bool {
    matches!(
        c,
        '!' | '#'
            | '$'
            | '%'
            | '&'
            | '*'
            | '+'
            | '.'
            | '/'
            | '<'
            | '='
            | '>'
            | '?'
            | '@'
            | '\\'
            | '^'
            | '|'
            | '-'
            | '~'
            | ':'
    )
}
