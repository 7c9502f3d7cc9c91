//! Hand-written lexer: turns source text into a flat token stream.
//!
//! There is no generator or parser-combinator crate involved on purpose —
//! the grammar is small and irregular enough (multi-char operators, string
//! escapes, `#`-comments) that a direct character walk reads more clearly
//! than a table-driven one.
use crate::error::LangError;
use crate::position::{Position, Span};
use crate::token::{Token, TokenKind, KEYWORDS};
use std::rc::Rc;

pub struct Lexer {
    filename: Rc<str>,
    chars: Vec<char>,
    pos: Position,
    current: Option<char>,
}

impl Lexer {
    pub fn new(filename: impl Into<Rc<str>>, source: impl Into<Rc<str>>) -> Self {
        let filename = filename.into();
        let source = source.into();
        let chars: Vec<char> = source.chars().collect();
        let mut pos = Position::new(-1, 0, -1, Rc::clone(&filename), source);
        pos.advance(None);
        let current = char_at(&chars, pos.index);
        Self {
            filename,
            chars,
            pos,
            current,
        }
    }

    fn advance(&mut self) {
        self.pos.advance(self.current);
        self.current = char_at(&self.chars, self.pos.index);
    }

    /// Tokenize the full source, ending with exactly one `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LangError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.current {
            match c {
                ' ' | '\t' => self.advance(),
                '#' => self.skip_comment(),
                ';' | '\n' => {
                    tokens.push(Token::new(TokenKind::Newline, self.single_span()));
                    self.advance();
                }
                c if c.is_ascii_digit() => tokens.push(self.lex_number()),
                c if is_letter(c) => tokens.push(self.lex_identifier()),
                '"' => tokens.push(self.lex_string()),
                '+' => self.push_single(&mut tokens, TokenKind::Plus),
                '-' => self.push_single(&mut tokens, TokenKind::Minus),
                '*' => self.push_single(&mut tokens, TokenKind::Mul),
                '/' => self.push_single(&mut tokens, TokenKind::Div),
                '%' => self.push_single(&mut tokens, TokenKind::Modulo),
                '^' => self.push_single(&mut tokens, TokenKind::Pow),
                '(' => self.push_single(&mut tokens, TokenKind::LParen),
                ')' => self.push_single(&mut tokens, TokenKind::RParen),
                '[' => self.push_single(&mut tokens, TokenKind::LSquare),
                ']' => self.push_single(&mut tokens, TokenKind::RSquare),
                ',' => self.push_single(&mut tokens, TokenKind::Comma),
                '!' => tokens.push(self.lex_not_equals()?),
                '=' => tokens.push(self.lex_equals()),
                '<' => tokens.push(self.lex_less_than()),
                '>' => tokens.push(self.lex_greater_than_or_arrow()),
                other => {
                    let start = self.pos.clone();
                    self.advance();
                    return Err(LangError::illegal_char(
                        Span::new(start, self.pos.clone()),
                        format!("'{other}'"),
                    ));
                }
            }
        }

        tokens.push(Token::new(TokenKind::Eof, self.single_span()));
        Ok(tokens)
    }

    fn single_span(&self) -> Span {
        let mut end = self.pos.clone();
        end.advance(self.current);
        Span::new(self.pos.clone(), end)
    }

    fn push_single(&mut self, tokens: &mut Vec<Token>, kind: TokenKind) {
        tokens.push(Token::new(kind, self.single_span()));
        self.advance();
    }

    fn lex_number(&mut self) -> Token {
        let mut text = String::new();
        let mut dot_count = 0;
        let start = self.pos.clone();

        while let Some(c) = self.current {
            if c == '.' {
                if dot_count == 1 {
                    break;
                }
                dot_count += 1;
            } else if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.advance();
        }

        let span = Span::new(start, self.pos.clone());
        if dot_count == 0 {
            Token::new(TokenKind::Int(text.parse().unwrap_or(0)), span)
        } else {
            Token::new(TokenKind::Float(text.parse().unwrap_or(0.0)), span)
        }
    }

    fn lex_string(&mut self) -> Token {
        let mut text = String::new();
        let start = self.pos.clone();
        let mut escaping = false;
        self.advance();

        while let Some(c) = self.current {
            if c == '"' && !escaping {
                break;
            }
            if escaping {
                text.push(match c {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
                escaping = false;
            } else if c == '\\' {
                escaping = true;
            } else {
                text.push(c);
            }
            self.advance();
        }

        self.advance();
        Token::new(TokenKind::Str(text), Span::new(start, self.pos.clone()))
    }

    fn lex_identifier(&mut self) -> Token {
        let mut text = String::new();
        let start = self.pos.clone();

        while let Some(c) = self.current {
            if is_letter(c) || c.is_ascii_digit() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let span = Span::new(start, self.pos.clone());
        if KEYWORDS.contains(&text.as_str()) {
            Token::new(TokenKind::Keyword(text), span)
        } else {
            Token::new(TokenKind::Ident(text), span)
        }
    }

    fn lex_not_equals(&mut self) -> Result<Token, LangError> {
        let start = self.pos.clone();
        self.advance();

        if self.current == Some('=') {
            self.advance();
            return Ok(Token::new(TokenKind::Ne, Span::new(start, self.pos.clone())));
        }

        self.advance();
        Err(LangError::expected_char(
            Span::new(start, self.pos.clone()),
            "'=' (after '!')",
        ))
    }

    fn lex_equals(&mut self) -> Token {
        let start = self.pos.clone();
        self.advance();
        let kind = if self.current == Some('=') {
            self.advance();
            TokenKind::Ee
        } else {
            TokenKind::Eq
        };
        Token::new(kind, Span::new(start, self.pos.clone()))
    }

    fn lex_less_than(&mut self) -> Token {
        let start = self.pos.clone();
        self.advance();
        let kind = if self.current == Some('=') {
            self.advance();
            TokenKind::Lte
        } else {
            TokenKind::Lt
        };
        Token::new(kind, Span::new(start, self.pos.clone()))
    }

    fn lex_greater_than_or_arrow(&mut self) -> Token {
        let start = self.pos.clone();
        self.advance();
        let kind = match self.current {
            Some('=') => {
                self.advance();
                TokenKind::Gte
            }
            Some('>') => {
                self.advance();
                TokenKind::Arrow
            }
            _ => TokenKind::Gt,
        };
        Token::new(kind, Span::new(start, self.pos.clone()))
    }

    /// Skip `#` through the next newline. EOF inside a comment simply ends
    /// the scan (the reference implementation loops forever here; see
    /// DESIGN.md).
    fn skip_comment(&mut self) {
        self.advance();
        while let Some(c) = self.current {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        if self.current.is_some() {
            self.advance();
        }
    }
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn char_at(chars: &[char], index: isize) -> Option<char> {
    if index < 0 {
        return None;
    }
    chars.get(index as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new("<test>", src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_arithmetic() {
        assert_eq!(
            kinds("1 + 2 * 3.5"),
            vec![
                TokenKind::Int(1),
                TokenKind::Plus,
                TokenKind::Int(2),
                TokenKind::Mul,
                TokenKind::Float(3.5),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_keyword_vs_identifier() {
        assert_eq!(
            kinds("let x"),
            vec![
                TokenKind::Keyword("let".into()),
                TokenKind::Ident("x".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_string_escapes() {
        assert_eq!(
            kinds(r#""a\nb""#),
            vec![TokenKind::Str("a\nb".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_multi_char_operators() {
        assert_eq!(
            kinds("== != <= >= >>"),
            vec![
                TokenKind::Ee,
                TokenKind::Ne,
                TokenKind::Lte,
                TokenKind::Gte,
                TokenKind::Arrow,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn bang_without_equals_is_an_error() {
        assert!(Lexer::new("<test>", "!x").tokenize().is_err());
    }

    #[test]
    fn skips_comments() {
        assert_eq!(kinds("1 # trailing\n2"), {
            let mut v = vec![TokenKind::Int(1)];
            v.push(TokenKind::Newline);
            v.push(TokenKind::Int(2));
            v.push(TokenKind::Eof);
            v
        });
    }

    #[test]
    fn illegal_character_reports_span() {
        let err = Lexer::new("<test>", "@").tokenize().unwrap_err();
        assert!(err.to_string().contains("Illegal Character"));
    }

    #[test]
    fn lexes_non_ascii_string_contents() {
        assert_eq!(
            kinds(r#"print("café")"#),
            vec![
                TokenKind::Ident("print".into()),
                TokenKind::LParen,
                TokenKind::Str("café".into()),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }
}
