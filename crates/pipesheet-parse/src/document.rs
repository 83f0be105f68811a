//! Splits the raw document into rows and cells and classifies each cell.
//!
//! Classification order (first full match wins): label, formula, float
//! literal, int literal, string. Only a malformed formula is fatal; every
//! other oddity just ends up a string cell.

use pipesheet_common::CalcError;

use crate::ast::{Cell, CellGrid};
use crate::expression::ExprParser;

pub fn parse_document(input: &str) -> Result<CellGrid, CalcError> {
    let mut rows = Vec::new();
    for (row_idx, line) in input.lines().enumerate() {
        let cells = split_cells(line);
        let mut row = Vec::with_capacity(cells.len());
        for (col_idx, raw) in cells.into_iter().enumerate() {
            row.push(classify_cell(raw, row_idx, col_idx)?);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// An empty line is a zero-cell row (it still occupies a row index, so label
/// visibility carries across). Otherwise at most one trailing `|` is dropped
/// before splitting: `a|b|` → two cells, `a||` → two cells with the last one
/// empty, `|` → one empty cell.
fn split_cells(line: &str) -> Vec<&str> {
    if line.is_empty() {
        return Vec::new();
    }
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').collect()
}

fn classify_cell(raw: &str, row: usize, col: usize) -> Result<Cell, CalcError> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(Cell::Empty);
    }
    if let Some(name) = text.strip_prefix('!') {
        if is_label_name(name) {
            return Ok(Cell::Label(name.to_string()));
        }
        // `!` followed by anything else is not a label; falls through to the
        // string arm below
    }
    if let Some(formula) = text.strip_prefix('=') {
        let expr = ExprParser::new(formula)
            .parse()
            .map_err(|e| e.with_location(row, col))?;
        return Ok(Cell::Formula(expr));
    }
    if let Some(f) = parse_float_literal(text) {
        return Ok(Cell::Float(f));
    }
    if let Some(i) = parse_int_literal(text) {
        return Ok(Cell::Int(i));
    }
    Ok(Cell::String(text.to_string()))
}

fn is_label_name(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_lowercase() || b == b'_')
}

/// `digits '.' digits`, matching the full cell text.
fn parse_float_literal(s: &str) -> Option<f64> {
    let (int_part, frac_part) = s.split_once('.')?;
    if !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }
    s.parse().ok()
}

/// Digits matching the full cell text. Out-of-range numbers fall back to a
/// string cell.
fn parse_int_literal(s: &str) -> Option<i64> {
    if !all_digits(s) {
        return None;
    }
    s.parse().ok()
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
