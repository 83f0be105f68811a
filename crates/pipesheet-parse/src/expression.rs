//! Recursive-descent expression parser.
//!
//! There is no separate lexer. The parser walks a byte-offset cursor over the
//! source, skipping spaces and tabs between tokens, and collects a flat
//! `primary (op primary)*` sequence that [`crate::precedence`] folds into a
//! properly nested tree.

use smallvec::SmallVec;

use pipesheet_common::{CalcError, CalcErrorKind};

use crate::ast::{BinOp, Expr};
use crate::precedence::fold_precedence;

/// Parse a complete expression, e.g. the text after a formula cell's
/// leading `=`. The whole input must be consumed.
pub fn parse_expression(src: &str) -> Result<Expr, CalcError> {
    ExprParser::new(src).parse()
}

pub(crate) struct ExprParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> ExprParser<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    pub(crate) fn parse(mut self) -> Result<Expr, CalcError> {
        let expr = self.parse_expr()?;
        if !self.rest().is_empty() {
            return Err(self.error_at("unexpected trailing input"));
        }
        Ok(expr)
    }

    /* ─────────────────────────── cursor ─────────────────────────── */

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.bump();
        }
    }

    fn error_at(&self, msg: &str) -> CalcError {
        CalcError::new(CalcErrorKind::Parse).with_message(format!("{msg} at offset {}", self.pos))
    }

    /* ────────────────────────── grammar ─────────────────────────── */

    /// `expr := primary (binOp primary)*`, collected flat and folded by
    /// precedence afterwards.
    fn parse_expr(&mut self) -> Result<Expr, CalcError> {
        self.skip_ws();
        let first = self.parse_primary()?;
        let mut primaries: SmallVec<[Expr; 4]> = SmallVec::new();
        let mut ops: SmallVec<[BinOp; 4]> = SmallVec::new();
        loop {
            self.skip_ws();
            let op = match self.peek() {
                Some('+') => BinOp::Add,
                Some('-') => BinOp::Sub,
                Some('*') => BinOp::Mul,
                Some('/') => BinOp::Div,
                _ => break,
            };
            self.bump();
            self.skip_ws();
            primaries.push(self.parse_primary()?);
            ops.push(op);
        }
        Ok(fold_precedence(first, primaries, ops))
    }

    fn parse_primary(&mut self) -> Result<Expr, CalcError> {
        match self.peek() {
            Some('"') => self.parse_string_lit(),
            Some('(') => self.parse_paren(),
            Some('@') => self.parse_label_ref(),
            Some('^') => self.parse_copy_above(),
            Some(c) if c.is_ascii_digit() => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() => self.parse_name(),
            _ => Err(self.error_at("expected an expression")),
        }
    }

    /// Double-quoted, no escape processing: a quote always ends the literal.
    fn parse_string_lit(&mut self) -> Result<Expr, CalcError> {
        self.bump();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '"' {
                let content = self.src[start..self.pos].to_string();
                self.bump();
                return Ok(Expr::Str(content));
            }
            self.bump();
        }
        Err(self.error_at("unterminated string literal"))
    }

    fn parse_paren(&mut self) -> Result<Expr, CalcError> {
        self.bump();
        let expr = self.parse_expr()?;
        if !self.eat(')') {
            return Err(self.error_at("expected ')'"));
        }
        Ok(expr)
    }

    /// `@name<offset>`
    fn parse_label_ref(&mut self) -> Result<Expr, CalcError> {
        self.bump();
        let label = self.parse_label_name()?;
        if !self.eat('<') {
            return Err(self.error_at("expected '<' after label name"));
        }
        let offset = self.parse_signed_int()?;
        if !self.eat('>') {
            return Err(self.error_at("expected '>' after row offset"));
        }
        Ok(Expr::LabelRef { label, offset })
    }

    fn parse_label_name(&mut self) -> Result<String, CalcError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_lowercase() || c == '_') {
            self.bump();
        }
        if self.pos == start {
            return Err(self.error_at("expected a label name"));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn parse_copy_above(&mut self) -> Result<Expr, CalcError> {
        self.bump();
        if !self.eat('^') {
            return Err(self.error_at("expected '^^'"));
        }
        Ok(Expr::CopyAbove)
    }

    /// Int or float literal; a `.` makes it a float only when digits follow.
    fn parse_number(&mut self) -> Result<Expr, CalcError> {
        let start = self.pos;
        self.skip_digits();
        if self.peek() == Some('.') {
            let mut lookahead = self.rest().chars();
            lookahead.next();
            if matches!(lookahead.next(), Some(c) if c.is_ascii_digit()) {
                self.bump();
                self.skip_digits();
                let text = &self.src[start..self.pos];
                return text
                    .parse::<f64>()
                    .map(Expr::Float)
                    .map_err(|_| self.error_at("malformed float literal"));
            }
        }
        let text = &self.src[start..self.pos];
        text.parse::<i64>()
            .map(Expr::Int)
            .map_err(|_| self.error_at("integer literal out of range"))
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
    }

    fn parse_unsigned_int(&mut self) -> Result<usize, CalcError> {
        let start = self.pos;
        self.skip_digits();
        if self.pos == start {
            return Err(self.error_at("expected digits"));
        }
        self.src[start..self.pos]
            .parse::<usize>()
            .map_err(|_| self.error_at("integer literal out of range"))
    }

    fn parse_signed_int(&mut self) -> Result<i64, CalcError> {
        let start = self.pos;
        if matches!(self.peek(), Some('+' | '-')) {
            self.bump();
        }
        let digits = self.pos;
        self.skip_digits();
        if self.pos == digits {
            return Err(self.error_at("expected digits"));
        }
        self.src[start..self.pos]
            .parse::<i64>()
            .map_err(|_| self.error_at("integer literal out of range"))
    }

    /// Anything starting with a letter: a function call, or one of the
    /// single-uppercase-letter column forms (`D2`, `E^`, `E^v`). `E^v` must
    /// win over `E^`, so the `v` is checked right after the caret.
    fn parse_name(&mut self) -> Result<Expr, CalcError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.bump();
        }
        let name = &self.src[start..self.pos];
        if self.peek() == Some('(') {
            self.bump();
            let args = self.parse_function_args()?;
            return Ok(Expr::FunCall {
                name: name.to_string(),
                args,
            });
        }
        let mut chars = name.chars();
        if let (Some(letter), None) = (chars.next(), chars.next()) {
            if letter.is_ascii_uppercase() {
                if matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    let row = self.parse_unsigned_int()?;
                    return Ok(Expr::CellRef { col: letter, row });
                }
                if self.eat('^') {
                    if self.eat('v') {
                        return Ok(Expr::CopyLastInColumn { col: letter });
                    }
                    return Ok(Expr::CopyColumnAbove { col: letter });
                }
            }
        }
        Err(self.error_at("expected '(' after function name"))
    }

    fn parse_function_args(&mut self) -> Result<Vec<Expr>, CalcError> {
        let mut args = Vec::new();
        self.skip_ws();
        if self.eat(')') {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.eat(',') {
                continue;
            }
            if self.eat(')') {
                return Ok(args);
            }
            return Err(self.error_at("expected ',' or ')' in argument list"));
        }
    }
}
