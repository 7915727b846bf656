//! 4GL expressions.
//!
//! Precedence is encoded in the rule shapes, loosest first:
//! `OR`, `AND`, `NOT`, comparisons, `||`, additive, multiplicative, unary
//! sign, then the postfix formatting operators (`CLIPPED`, `USING`, `UNITS`).
//! Every level except `expression` itself is transient, so a plain operand
//! does not leave a chain of single-child nodes behind.

use crate::grammar::{kw, nt, sym, GrammarBuilder};
use crate::{alt, seq};

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.rule("expression", nt("orExpression"));
    g.rule("expressionList", nt("expression").plus_sep(sym(",")));

    g.transient(
        "orExpression",
        alt![
            seq![nt("orExpression"), kw("or"), nt("andExpression")],
            nt("andExpression"),
        ],
    );
    g.transient(
        "andExpression",
        alt![
            seq![nt("andExpression"), kw("and"), nt("notExpression")],
            nt("notExpression"),
        ],
    );
    g.transient(
        "notExpression",
        alt![
            seq![kw("not"), nt("notExpression")],
            nt("comparisonExpression"),
        ],
    );
    g.transient(
        "comparisonExpression",
        alt![
            seq![
                nt("concatExpression"),
                nt("relationalOperator"),
                nt("concatExpression"),
            ],
            seq![
                nt("concatExpression"),
                kw("is"),
                kw("not").opt(),
                kw("null"),
            ],
            seq![
                nt("concatExpression"),
                kw("not").opt(),
                alt![kw("like"), kw("matches")],
                nt("concatExpression"),
                seq![kw("escape"), nt("concatExpression")].opt(),
            ],
            seq![
                nt("concatExpression"),
                kw("not").opt(),
                kw("between"),
                nt("concatExpression"),
                kw("and"),
                nt("concatExpression"),
            ],
            seq![
                nt("concatExpression"),
                kw("not").opt(),
                kw("in"),
                sym("("),
                nt("expressionList"),
                sym(")"),
            ],
            nt("concatExpression"),
        ],
    );
    g.transient(
        "relationalOperator",
        alt![
            sym("="),
            sym("=="),
            sym("!="),
            sym("<>"),
            sym("<"),
            sym("<="),
            sym(">"),
            sym(">="),
        ],
    );
    g.transient(
        "concatExpression",
        alt![
            seq![nt("concatExpression"), sym("||"), nt("additiveExpression")],
            nt("additiveExpression"),
        ],
    );
    g.transient(
        "additiveExpression",
        alt![
            seq![
                nt("additiveExpression"),
                alt![sym("+"), sym("-")],
                nt("multiplicativeExpression"),
            ],
            nt("multiplicativeExpression"),
        ],
    );
    g.transient(
        "multiplicativeExpression",
        alt![
            seq![
                nt("multiplicativeExpression"),
                alt![sym("*"), sym("/"), kw("mod")],
                nt("unaryExpression"),
            ],
            nt("unaryExpression"),
        ],
    );
    g.transient(
        "unaryExpression",
        alt![
            seq![alt![sym("+"), sym("-")], nt("unaryExpression")],
            nt("postfixExpression"),
        ],
    );
    g.transient(
        "postfixExpression",
        alt![
            seq![nt("postfixExpression"), kw("clipped")],
            seq![nt("postfixExpression"), kw("using"), nt("primaryExpression")],
            seq![nt("postfixExpression"), kw("units"), nt("unitType")],
            nt("primaryExpression"),
        ],
    );
    g.transient(
        "primaryExpression",
        alt![
            nt("literal"),
            nt("memberAccess"),
            nt("aggregateExpression"),
            nt("parenthesizedExpression"),
            nt("currentExpression"),
        ],
    );
    g.rule(
        "literal",
        alt![
            nt("Number"),
            nt("StringLiteral"),
            kw("true"),
            kw("false"),
            kw("null"),
        ],
    );
    g.rule(
        "parenthesizedExpression",
        seq![sym("("), nt("expression"), sym(")")],
    );
    g.rule(
        "currentExpression",
        seq![kw("current"), nt("datetimeQualifier").opt()],
    );
    g.rule(
        "aggregateExpression",
        seq![
            kw("group").opt(),
            nt("aggregateFunction"),
            sym("("),
            alt![sym("*"), nt("expression")],
            sym(")"),
        ],
    );
    g.transient(
        "aggregateFunction",
        alt![
            kw("count"),
            kw("sum"),
            kw("avg"),
            kw("min"),
            kw("max"),
            kw("percent"),
        ],
    );

    g.rule(
        "memberAccess",
        seq![
            nt("functionIdentifier"),
            nt("memberAccessSegment").star(),
        ],
    );
    g.rule(
        "memberAccessSegment",
        alt![
            seq![sym("."), alt![nt("functionIdentifier"), sym("*")]],
            nt("arrayIndexer"),
            nt("argumentList"),
        ],
    );
    g.rule(
        "argumentList",
        seq![sym("("), nt("expressionList").opt(), sym(")")],
    );
    g.rule(
        "arrayIndexer",
        seq![sym("["), nt("expressionList"), sym("]")],
    );

    // Built-in names that are reserved words for the scanner but still name
    // variables or functions in expressions.
    g.rule(
        "constantIdentifier",
        alt![
            nt("Identifier"),
            kw("status"),
            kw("int_flag"),
            kw("quit_flag"),
            kw("today"),
            kw("user"),
            kw("lineno"),
            kw("pageno"),
            kw("notfound"),
            kw("sqlca"),
        ],
    );
    g.transient(
        "functionIdentifier",
        alt![
            nt("constantIdentifier"),
            kw("day"),
            kw("year"),
            kw("month"),
            kw("date"),
            kw("extend"),
            kw("infield"),
            kw("length"),
            kw("mdy"),
            kw("weekday"),
            kw("ascii"),
        ],
    );
}
