// ABOUTME: Scanner module turning raw source bytes into a token stream

use crate::error::Diagnostics;
use crate::token::{keyword_kind, Token, TokenKind};

/// Walks a source string and produces an ordered token stream terminated by
/// END_OF_FILE. Grounded in `original_source/src/scanner.cpp`'s `cwt::scanner`,
/// adapted to report through a `Diagnostics` sink instead of a global flag and
/// to recover (skip and continue) instead of throwing on a bad character.
pub struct Scanner<'a> {
    source: &'a [u8],
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: u32,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Scanner {
            source: source.as_bytes(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    pub fn scan_tokens(mut self, diagnostics: &Diagnostics) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token(diagnostics);
        }
        self.tokens.push(Token::new(TokenKind::EndOfFile, "", self.line));
        self.tokens
    }

    fn scan_token(&mut self, diagnostics: &Diagnostics) {
        let c = self.advance();
        match c {
            b'(' => self.add_token(TokenKind::LeftParen),
            b')' => self.add_token(TokenKind::RightParen),
            b'{' => self.add_token(TokenKind::LeftBrace),
            b'}' => self.add_token(TokenKind::RightBrace),
            b',' => self.add_token(TokenKind::Comma),
            b'.' => self.add_token(TokenKind::Dot),
            b'-' => self.add_token(TokenKind::Minus),
            b'+' => self.add_token(TokenKind::Plus),
            b';' => self.add_token(TokenKind::Semicolon),
            b'*' => self.add_token(TokenKind::Star),
            b'/' => self.add_token(TokenKind::Slash),
            b'!' => {
                let kind = if self.matches(b'=') { TokenKind::BangEqual } else { TokenKind::Bang };
                self.add_token(kind);
            }
            b'=' => {
                let kind = if self.matches(b'=') { TokenKind::EqualEqual } else { TokenKind::Equal };
                self.add_token(kind);
            }
            b'<' => {
                let kind = if self.matches(b'=') { TokenKind::LessEqual } else { TokenKind::Less };
                self.add_token(kind);
            }
            b'>' => {
                let kind = if self.matches(b'=') { TokenKind::GreaterEqual } else { TokenKind::Greater };
                self.add_token(kind);
            }
            b'#' => {
                // line comment: run to end of line
                while self.peek() != b'\n' && !self.is_at_end() {
                    self.advance();
                }
            }
            b' ' | b'\r' | b'\t' => {}
            b'\n' => self.line += 1,
            b'"' => self.scan_string(diagnostics),
            c if c.is_ascii_digit() => self.scan_number(),
            c if is_alpha(c) => self.scan_identifier(),
            _ => diagnostics.error(self.line, "Unexpected character."),
        }
    }

    fn scan_string(&mut self, diagnostics: &Diagnostics) {
        while self.peek() != b'"' && !self.is_at_end() {
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            diagnostics.error(self.line, "Unterminated string.");
            return;
        }

        // consume closing quote
        self.advance();

        let value = String::from_utf8_lossy(&self.source[self.start + 1..self.current - 1]).into_owned();
        let lexeme = String::from_utf8_lossy(&self.source[self.start..self.current]).into_owned();
        self.tokens.push(Token::with_literal(TokenKind::String, lexeme, self.line, value));
    }

    fn scan_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume '.'
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text = String::from_utf8_lossy(&self.source[self.start..self.current]).into_owned();
        self.tokens.push(Token::with_literal(TokenKind::Number, text.clone(), self.line, text));
    }

    fn scan_identifier(&mut self) {
        while is_alphanumeric(self.peek()) {
            self.advance();
        }
        let text = String::from_utf8_lossy(&self.source[self.start..self.current]).into_owned();
        let kind = keyword_kind(&text).unwrap_or(TokenKind::Identifier);
        self.add_token(kind);
    }

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme = String::from_utf8_lossy(&self.source[self.start..self.current]).into_owned();
        self.tokens.push(Token::new(kind, lexeme, self.line));
    }

    fn advance(&mut self) -> u8 {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn matches(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() {
            b'\0'
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> u8 {
        if self.current + 1 >= self.source.len() {
            b'\0'
        } else {
            self.source[self.current + 1]
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

fn is_alpha(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_alphanumeric(c: u8) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}
