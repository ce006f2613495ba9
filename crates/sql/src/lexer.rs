// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Statement tokenizer

use crate::error::CompileError;
use quill_core::BindKey;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Integer(i64),
    Float(f64),
    Str(String),
    Bind(BindKey),
    LParen,
    RParen,
    Comma,
    Eq,
    Star,
    Minus,
    Semicolon,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

impl Token {
    /// Case-insensitive keyword match
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(s) if s.eq_ignore_ascii_case(keyword))
    }
}

pub(crate) fn tokenize(sql: &str) -> Result<Vec<Token>, CompileError> {
    let bytes = sql.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        let kind = match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
                continue;
            }
            b'(' => {
                i += 1;
                TokenKind::LParen
            }
            b')' => {
                i += 1;
                TokenKind::RParen
            }
            b',' => {
                i += 1;
                TokenKind::Comma
            }
            b'=' => {
                i += 1;
                TokenKind::Eq
            }
            b'*' => {
                i += 1;
                TokenKind::Star
            }
            b'-' => {
                i += 1;
                TokenKind::Minus
            }
            b';' => {
                i += 1;
                TokenKind::Semicolon
            }
            b'\'' => {
                let (value, end) = read_string(sql, i)?;
                i = end;
                TokenKind::Str(value)
            }
            b'$' => {
                i += 1;
                let digits_start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let index: u32 = sql[digits_start..i]
                    .parse()
                    .map_err(|_| CompileError::new(start, "invalid bind variable index"))?;
                if index == 0 {
                    return Err(CompileError::new(start, "bind variable index starts at 1"));
                }
                TokenKind::Bind(BindKey::Index(index))
            }
            b':' => {
                i += 1;
                let name_start = i;
                while i < bytes.len() && is_ident_char(bytes[i]) {
                    i += 1;
                }
                if name_start == i {
                    return Err(CompileError::new(start, "bind variable name expected"));
                }
                TokenKind::Bind(BindKey::Name(sql[name_start..i].to_string()))
            }
            b'0'..=b'9' => {
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let is_float = i < bytes.len() && bytes[i] == b'.';
                if is_float {
                    i += 1;
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                    let text = &sql[start..i];
                    TokenKind::Float(
                        text.parse()
                            .map_err(|_| CompileError::new(start, "invalid number"))?,
                    )
                } else {
                    let text = &sql[start..i];
                    TokenKind::Integer(
                        text.parse()
                            .map_err(|_| CompileError::new(start, "number out of range"))?,
                    )
                }
            }
            c if is_ident_start(c) => {
                while i < bytes.len() && is_ident_char(bytes[i]) {
                    i += 1;
                }
                TokenKind::Ident(sql[start..i].to_string())
            }
            b'"' => {
                i += 1;
                let name_start = i;
                while i < bytes.len() && bytes[i] != b'"' {
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(CompileError::new(start, "unterminated quoted identifier"));
                }
                let name = sql[name_start..i].to_string();
                i += 1;
                TokenKind::Ident(name)
            }
            _ => {
                let ch = sql[start..].chars().next().unwrap_or('?');
                return Err(CompileError::new(start, format!("unexpected character '{ch}'")));
            }
        };
        tokens.push(Token {
            kind,
            position: start,
        });
    }

    Ok(tokens)
}

fn read_string(sql: &str, start: usize) -> Result<(String, usize), CompileError> {
    let bytes = sql.as_bytes();
    let mut value = String::new();
    let mut i = start + 1;
    let mut segment = i;
    loop {
        if i >= bytes.len() {
            return Err(CompileError::new(start, "unterminated string literal"));
        }
        if bytes[i] == b'\'' {
            value.push_str(&sql[segment..i]);
            // '' is an escaped quote
            if i + 1 < bytes.len() && bytes[i + 1] == b'\'' {
                value.push('\'');
                i += 2;
                segment = i;
                continue;
            }
            return Ok((value, i + 1));
        }
        i += 1;
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

#[cfg(test)]
#[path = "lexer_tests.rs"]
mod tests;
