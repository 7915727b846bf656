//! Report writer: the `OUTPUT`/`ORDER BY`/`FORMAT` sections of a report
//! definition and the statements that drive and print reports.

use crate::grammar::{kw, kws, nt, sym, GrammarBuilder};
use crate::{alt, seq};

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.rule(
        "outputReport",
        seq![
            kw("output"),
            seq![kws("report to"), nt("reportDestination")].opt(),
            nt("reportDimensionSpecifier").star(),
        ],
    );
    g.transient(
        "reportDestination",
        alt![
            nt("StringLiteral"),
            seq![kw("pipe"), nt("StringLiteral")],
            kw("printer"),
        ],
    );
    g.rule(
        "reportDimensionSpecifier",
        alt![
            seq![
                alt![kw("left"), kw("right"), kw("top"), kw("bottom")],
                kw("margin"),
                nt("numericConstant"),
            ],
            seq![kws("page length"), nt("numericConstant")],
            seq![kws("top of page"), nt("StringLiteral")],
        ],
    );
    g.rule(
        "reportOrderBy",
        seq![
            kw("order"),
            kw("external").opt(),
            kw("by"),
            nt("variableList"),
        ],
    );
    g.rule(
        "formatReport",
        seq![
            kw("format"),
            alt![kws("every row"), nt("reportCodeBlock").plus()],
        ],
    );
    g.rule(
        "reportCodeBlock",
        seq![nt("reportSection"), nt("codeBlock")],
    );
    g.rule(
        "reportSection",
        alt![
            kws("first page header"),
            kws("page header"),
            kws("page trailer"),
            kws("on every row"),
            kws("on last row"),
            seq![
                alt![kw("before"), kw("after")],
                kws("group of"),
                nt("variable"),
            ],
        ],
    );

    g.transient(
        "reportStatement",
        alt![
            nt("startReportStatement"),
            nt("terminateReportStatement"),
            nt("finishReportStatement"),
            nt("pauseStatement"),
            nt("needStatement"),
            nt("printStatement"),
            nt("skipStatement"),
            nt("outputToReportStatement"),
        ],
    );
    g.rule(
        "startReportStatement",
        seq![
            kws("start report"),
            nt("constantIdentifier"),
            seq![
                kw("to"),
                alt![
                    nt("expression"),
                    seq![kw("pipe"), nt("expression")],
                    kw("printer"),
                ],
            ]
            .opt(),
            seq![
                kw("with"),
                nt("reportDimensionSpecifier").plus_sep(sym(",")),
            ]
            .opt(),
        ],
    );
    g.rule(
        "terminateReportStatement",
        seq![kws("terminate report"), nt("constantIdentifier")],
    );
    g.rule(
        "finishReportStatement",
        seq![kws("finish report"), nt("constantIdentifier")],
    );
    g.rule(
        "pauseStatement",
        seq![kw("pause"), nt("StringLiteral").opt()],
    );
    g.rule(
        "needStatement",
        seq![kw("need"), nt("expression"), kw("lines")],
    );
    g.rule(
        "printStatement",
        seq![
            kw("print"),
            alt![
                seq![kw("file"), nt("StringLiteral")],
                seq![nt("printExpressionList"), sym(";").opt()],
                sym(";"),
            ]
            .opt(),
        ],
    );
    g.rule(
        "printExpressionList",
        nt("printExpressionItem").plus_sep(sym(",")),
    );
    g.rule(
        "printExpressionItem",
        alt![
            seq![kw("column"), nt("expression")],
            seq![nt("aggregateExpression"), kw("where"), nt("expression")],
            seq![alt![kw("byte"), kw("text")], nt("variable")],
            seq![
                nt("expression"),
                alt![kw("space"), kw("spaces")].opt(),
                seq![
                    kw("wordwrap"),
                    seq![kws("right margin"), nt("numericConstant")].opt(),
                ]
                .opt(),
            ],
        ],
    );
    g.rule(
        "skipStatement",
        seq![
            kw("skip"),
            alt![
                seq![nt("expression"), alt![kw("line"), kw("lines")]],
                kws("to top of page"),
            ],
        ],
    );
    g.rule(
        "outputToReportStatement",
        seq![
            kws("output to report"),
            nt("constantIdentifier"),
            sym("("),
            nt("expressionList").opt(),
            sym(")"),
        ],
    );
}
