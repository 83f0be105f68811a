use pipesheet_common::CalcErrorKind;

use crate::ast::{BinOp, Cell, Expr};
use crate::document::parse_document;
use crate::expression::parse_expression;

/* ─────────────────────── document splitting ─────────────────────── */

#[test]
fn rows_split_on_newlines() {
    let grid = parse_document("a|b\nc|d").unwrap();
    assert_eq!(grid.len(), 2);
    assert_eq!(grid[0].len(), 2);
    assert_eq!(grid[1].len(), 2);
}

#[test]
fn blank_line_is_a_zero_cell_row() {
    let grid = parse_document("a\n\nb").unwrap();
    assert_eq!(grid.len(), 3);
    assert!(grid[1].is_empty());
    assert_eq!(grid[2], vec![Cell::String("b".into())]);
}

#[test]
fn one_trailing_pipe_is_swallowed() {
    let grid = parse_document("a|b|").unwrap();
    assert_eq!(
        grid[0],
        vec![Cell::String("a".into()), Cell::String("b".into())]
    );

    // a second trailing pipe delimits an empty cell
    let grid = parse_document("a||").unwrap();
    assert_eq!(grid[0], vec![Cell::String("a".into()), Cell::Empty]);

    let grid = parse_document("|").unwrap();
    assert_eq!(grid[0], vec![Cell::Empty]);
}

#[test]
fn rows_may_have_different_widths() {
    let grid = parse_document("a|b|c\nd\ne|f").unwrap();
    assert_eq!(grid[0].len(), 3);
    assert_eq!(grid[1].len(), 1);
    assert_eq!(grid[2].len(), 2);
}

#[test]
fn cells_are_trimmed_before_classification() {
    let grid = parse_document("  42  |  3.5\t|  !fee | =1+1 ").unwrap();
    assert_eq!(grid[0][0], Cell::Int(42));
    assert_eq!(grid[0][1], Cell::Float(3.5));
    assert_eq!(grid[0][2], Cell::Label("fee".into()));
    assert!(matches!(grid[0][3], Cell::Formula(_)));
}

#[test]
fn crlf_line_endings_are_tolerated() {
    let grid = parse_document("1|2\r\n3|4").unwrap();
    assert_eq!(grid[0], vec![Cell::Int(1), Cell::Int(2)]);
    assert_eq!(grid[1], vec![Cell::Int(3), Cell::Int(4)]);
}

/* ─────────────────────── cell classification ─────────────────────── */

#[test]
fn literal_cells_classify_by_shape() {
    let grid = parse_document("10000|0.09|btc,eth,dai|2022-02-20").unwrap();
    assert_eq!(grid[0][0], Cell::Int(10000));
    assert_eq!(grid[0][1], Cell::Float(0.09));
    assert_eq!(grid[0][2], Cell::String("btc,eth,dai".into()));
    // digits with a dash are not an int literal
    assert_eq!(grid[0][3], Cell::String("2022-02-20".into()));
}

#[test]
fn whitespace_only_cell_is_empty() {
    let grid = parse_document("a|   |b").unwrap();
    assert_eq!(grid[0][1], Cell::Empty);
}

#[test]
fn label_names_are_lowercase_and_underscores() {
    let grid = parse_document("!cost_threshold|!total").unwrap();
    assert_eq!(grid[0][0], Cell::Label("cost_threshold".into()));
    assert_eq!(grid[0][1], Cell::Label("total".into()));
}

#[test]
fn malformed_labels_fall_back_to_strings() {
    let grid = parse_document("!Fee|!fee9|!|plain").unwrap();
    assert_eq!(grid[0][0], Cell::String("!Fee".into()));
    assert_eq!(grid[0][1], Cell::String("!fee9".into()));
    assert_eq!(grid[0][2], Cell::String("!".into()));
    assert_eq!(grid[0][3], Cell::String("plain".into()));
}

#[test]
fn float_literal_requires_digits_on_both_sides() {
    let grid = parse_document(".5|5.|1.25").unwrap();
    assert_eq!(grid[0][0], Cell::String(".5".into()));
    assert_eq!(grid[0][1], Cell::String("5.".into()));
    assert_eq!(grid[0][2], Cell::Float(1.25));
}

#[test]
fn out_of_range_int_cell_falls_back_to_string() {
    let raw = "99999999999999999999999999";
    let grid = parse_document(raw).unwrap();
    assert_eq!(grid[0][0], Cell::String(raw.into()));
}

#[test]
fn formula_cell_carries_its_expression() {
    let grid = parse_document("=1+2*3").unwrap();
    let Cell::Formula(expr) = &grid[0][0] else {
        panic!("expected a formula cell, got {:?}", grid[0][0]);
    };
    assert_eq!(expr.to_string(), "1 + (2 * 3)");
}

#[test]
fn malformed_formula_fails_the_whole_document() {
    let err = parse_document("ok|fine\n1|=2+\n3|4").unwrap_err();
    assert_eq!(err.kind, CalcErrorKind::Parse);
    let loc = err.location.expect("parse error carries its cell");
    assert_eq!((loc.row, loc.col), (1, 1));
}

#[test]
fn unbalanced_paren_in_formula_is_fatal() {
    // closing parenthesis missing after the bte() call
    let err = parse_document("=text(bte(@adjusted_cost<1>, @cost_threshold<1>)").unwrap_err();
    assert_eq!(err.kind, CalcErrorKind::Parse);
}

/* ─────────────────────── expression grammar ─────────────────────── */

#[test]
fn primaries_parse_to_the_expected_nodes() {
    assert_eq!(parse_expression("15").unwrap(), Expr::Int(15));
    assert_eq!(parse_expression("1.25").unwrap(), Expr::Float(1.25));
    assert_eq!(
        parse_expression("\"t_\"").unwrap(),
        Expr::Str("t_".into())
    );
    assert_eq!(
        parse_expression("D2").unwrap(),
        Expr::CellRef { col: 'D', row: 2 }
    );
    assert_eq!(parse_expression("^^").unwrap(), Expr::CopyAbove);
    assert_eq!(
        parse_expression("E^").unwrap(),
        Expr::CopyColumnAbove { col: 'E' }
    );
    assert_eq!(
        parse_expression("E^v").unwrap(),
        Expr::CopyLastInColumn { col: 'E' }
    );
    assert_eq!(
        parse_expression("@cost_threshold<1>").unwrap(),
        Expr::LabelRef {
            label: "cost_threshold".into(),
            offset: 1,
        }
    );
}

#[test]
fn label_offsets_may_be_signed() {
    assert_eq!(
        parse_expression("@fee<-2>").unwrap(),
        Expr::LabelRef {
            label: "fee".into(),
            offset: -2,
        }
    );
    assert_eq!(
        parse_expression("@fee<+3>").unwrap(),
        Expr::LabelRef {
            label: "fee".into(),
            offset: 3,
        }
    );
}

#[test]
fn multi_digit_cell_refs_parse() {
    assert_eq!(
        parse_expression("A10").unwrap(),
        Expr::CellRef { col: 'A', row: 10 }
    );
}

#[test]
fn function_calls_nest() {
    let expr = parse_expression("sum(spread(split(D2, \",\")))").unwrap();
    assert_eq!(expr.to_string(), "sum(spread(split(D2, \",\")))");
    let Expr::FunCall { name, args } = expr else {
        panic!("expected a function call");
    };
    assert_eq!(name, "sum");
    assert_eq!(args.len(), 1);
}

#[test]
fn function_calls_may_have_no_arguments() {
    assert_eq!(
        parse_expression("concat()").unwrap(),
        Expr::FunCall {
            name: "concat".into(),
            args: vec![],
        }
    );
}

#[test]
fn whitespace_is_skipped_between_tokens() {
    let expr = parse_expression("  1 +\t2 *  3 ").unwrap();
    assert_eq!(expr.to_string(), "1 + (2 * 3)");
    let expr = parse_expression("concat( \"a\" , \"b\" )").unwrap();
    assert_eq!(expr.to_string(), "concat(\"a\", \"b\")");
}

#[test]
fn precedence_reference_case() {
    let expr = parse_expression("1 + 2 * 3 + 4 * 5 - 6").unwrap();
    assert_eq!(expr.to_string(), "((1 + (2 * 3)) + (4 * 5)) - 6");
}

#[test]
fn division_binds_like_multiplication() {
    let expr = parse_expression("8 / 2 / 2 + 1").unwrap();
    assert_eq!(expr.to_string(), "((8 / 2) / 2) + 1");
}

#[test]
fn parens_override_precedence() {
    let expr = parse_expression("(1 + 2) * 3").unwrap();
    let Expr::Infix { lhs, op, .. } = &expr else {
        panic!("expected an infix node");
    };
    assert_eq!(*op, BinOp::Mul);
    assert_eq!(lhs.to_string(), "1 + 2");
}

#[test]
fn copy_forms_compose_with_operators() {
    let expr = parse_expression("E^v+(E^v*A9)").unwrap();
    assert_eq!(expr.to_string(), "E^v + (E^v * A9)");
    let expr = parse_expression("E^+sum(spread(split(D3, \",\")))").unwrap();
    assert_eq!(expr.to_string(), "E^ + sum(spread(split(D3, \",\")))");
}

#[test]
fn string_literals_take_no_escapes() {
    // the backslash stays in the literal; the quote after it terminates
    let expr = parse_expression("\"a\\\"").unwrap();
    assert_eq!(expr, Expr::Str("a\\".into()));
}

/* ─────────────────────── expression failures ─────────────────────── */

fn parse_err(src: &str) -> String {
    let err = parse_expression(src).unwrap_err();
    assert_eq!(err.kind, CalcErrorKind::Parse);
    err.message.unwrap_or_default()
}

#[test]
fn trailing_input_is_rejected() {
    assert!(parse_err("1 2").contains("trailing"));
    assert!(parse_err("12.").contains("trailing"));
}

#[test]
fn unterminated_string_is_rejected() {
    assert!(parse_err("\"abc").contains("unterminated"));
}

#[test]
fn dangling_operator_is_rejected() {
    assert!(parse_err("2+").contains("expected an expression"));
}

#[test]
fn lone_caret_is_rejected() {
    assert!(parse_err("^").contains("expected '^^'"));
}

#[test]
fn malformed_label_refs_are_rejected() {
    assert!(parse_err("@<1>").contains("label name"));
    assert!(parse_err("@fee").contains("'<'"));
    assert!(parse_err("@fee<>").contains("digits"));
    assert!(parse_err("@fee<2").contains("'>'"));
}

#[test]
fn bare_name_without_call_is_rejected() {
    assert!(parse_err("sum").contains("expected '('"));
    // two letters make neither a column form nor a call
    assert!(parse_err("AB2").contains("expected '('"));
}

#[test]
fn unclosed_argument_list_is_rejected() {
    assert!(parse_err("sum(1, 2").contains("',' or ')'"));
}

#[test]
fn expression_int_overflow_is_a_parse_error() {
    assert!(parse_err("99999999999999999999999999").contains("out of range"));
}

/* ─────────────────────── precedence property ─────────────────────── */

mod precedence_property {
    use super::*;
    use proptest::prelude::*;

    /// Evaluate a parsed tree with i64 arithmetic (operands are kept small
    /// and non-zero, so division is total).
    fn eval_tree(expr: &Expr) -> i64 {
        match expr {
            Expr::Int(i) => *i,
            Expr::Infix { lhs, rhs, op } => {
                let (l, r) = (eval_tree(lhs), eval_tree(rhs));
                match op {
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                }
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    /// Independent reference: shunting-yard over the same token sequence.
    fn eval_shunting_yard(first: i64, rest: &[(BinOp, i64)]) -> i64 {
        fn prec(op: BinOp) -> u8 {
            match op {
                BinOp::Mul | BinOp::Div => 2,
                BinOp::Add | BinOp::Sub => 1,
            }
        }
        fn apply(op: BinOp, l: i64, r: i64) -> i64 {
            match op {
                BinOp::Mul => l * r,
                BinOp::Div => l / r,
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
            }
        }
        let mut operands = vec![first];
        let mut ops: Vec<BinOp> = Vec::new();
        for &(op, n) in rest {
            while let Some(&top) = ops.last() {
                if prec(top) < prec(op) {
                    break;
                }
                let r = operands.pop().unwrap();
                let l = operands.pop().unwrap();
                operands.push(apply(top, l, r));
                ops.pop();
            }
            ops.push(op);
            operands.push(n);
        }
        while let Some(op) = ops.pop() {
            let r = operands.pop().unwrap();
            let l = operands.pop().unwrap();
            operands.push(apply(op, l, r));
        }
        operands.pop().unwrap()
    }

    fn op_strategy() -> impl Strategy<Value = BinOp> {
        prop_oneof![
            Just(BinOp::Mul),
            Just(BinOp::Div),
            Just(BinOp::Add),
            Just(BinOp::Sub),
        ]
    }

    proptest! {
        #[test]
        fn folded_tree_matches_shunting_yard(
            first in 1i64..10,
            rest in proptest::collection::vec((op_strategy(), 1i64..10), 0..8),
        ) {
            let mut src = first.to_string();
            for (op, n) in &rest {
                src.push_str(&format!(" {op} {n}"));
            }
            let expr = parse_expression(&src).unwrap();
            prop_assert_eq!(eval_tree(&expr), eval_shunting_yard(first, &rest));
        }

        #[test]
        fn rendered_tree_reparses_to_itself(
            first in 1i64..10,
            rest in proptest::collection::vec((op_strategy(), 1i64..10), 0..8),
        ) {
            let mut src = first.to_string();
            for (op, n) in &rest {
                src.push_str(&format!(" {op} {n}"));
            }
            let expr = parse_expression(&src).unwrap();
            let reparsed = parse_expression(&expr.to_string()).unwrap();
            prop_assert_eq!(expr, reparsed);
        }
    }
}
