//! Procedural statements: assignment, calls, control flow and storage.

use crate::grammar::{kw, kws, nt, sym, GrammarBuilder};
use crate::{alt, seq};

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.rule("codeBlock", nt("statementOrDbDeclaration").plus());
    g.transient(
        "statementOrDbDeclaration",
        alt![nt("statement"), nt("databaseDeclaration")],
    );
    g.rule(
        "statement",
        seq![nt("label").opt(), nt("unlabelledStatement")],
    );
    g.rule("label", seq![nt("Identifier"), sym(":")]);
    g.transient(
        "unlabelledStatement",
        alt![nt("simpleStatement"), nt("structuredStatement")],
    );

    g.transient(
        "simpleStatement",
        alt![
            nt("assignmentStatement"),
            nt("procedureStatement"),
            nt("sqlStatement"),
            nt("otherFGLStatement"),
            nt("menuInsideStatement"),
            nt("displayInsideStatement"),
            nt("inputOrConstructInsideStatement"),
        ],
    );
    g.rule(
        "assignmentStatement",
        seq![
            kw("let"),
            nt("variable"),
            sym("="),
            nt("expressionList"),
        ],
    );
    g.rule(
        "procedureStatement",
        seq![
            kw("call"),
            nt("memberAccess"),
            seq![kw("returning"), nt("variableList")].opt(),
        ],
    );

    g.rule(
        "variable",
        seq![
            nt("componentVariable"),
            seq![nt("thru"), nt("componentVariable")].opt(),
        ],
    );
    g.rule("thru", alt![kw("through"), kw("thru")]);
    g.rule(
        "componentVariable",
        seq![
            nt("constantIdentifier"),
            nt("indexingVariable").opt(),
            seq![sym("."), alt![sym("*"), nt("componentVariable")]].opt(),
        ],
    );
    g.rule(
        "indexingVariable",
        seq![sym("["), nt("expressionList"), sym("]")],
    );
    g.rule("variableList", nt("variable").plus_sep(sym(",")));

    g.transient(
        "structuredStatement",
        alt![nt("conditionalStatement"), nt("repetitiveStatement")],
    );
    g.transient(
        "conditionalStatement",
        alt![nt("ifStatement"), nt("caseStatement")],
    );
    g.rule(
        "ifStatement",
        seq![
            kw("if"),
            nt("expression"),
            kw("then"),
            nt("codeBlock").opt(),
            nt("elseClause").opt(),
            kws("end if"),
        ],
    );
    g.rule("elseClause", seq![kw("else"), nt("codeBlock").opt()]);
    g.rule(
        "caseStatement",
        seq![
            kw("case"),
            nt("expression").opt(),
            nt("whenClause").star(),
            nt("otherwiseClause").opt(),
            kws("end case"),
        ],
    );
    g.rule(
        "whenClause",
        seq![kw("when"), nt("expression"), nt("codeBlock").opt()],
    );
    g.rule(
        "otherwiseClause",
        seq![kw("otherwise"), nt("codeBlock").opt()],
    );

    g.transient(
        "repetitiveStatement",
        alt![
            nt("whileStatement"),
            nt("forEachStatement"),
            nt("forStatement"),
        ],
    );
    g.rule(
        "whileStatement",
        seq![
            kw("while"),
            nt("expression"),
            nt("codeBlock").opt(),
            kws("end while"),
        ],
    );
    g.rule(
        "forStatement",
        seq![
            kw("for"),
            nt("controlVariable"),
            sym("="),
            nt("expression"),
            kw("to"),
            nt("expression"),
            seq![kw("step"), nt("expression")].opt(),
            nt("codeBlock").opt(),
            kws("end for"),
        ],
    );
    g.rule("controlVariable", nt("constantIdentifier"));
    g.rule(
        "forEachStatement",
        seq![
            kw("foreach"),
            nt("cursorName"),
            seq![kw("using"), nt("variableList")].opt(),
            seq![kw("into"), nt("variableList")].opt(),
            kws("with reoptimization").opt(),
            nt("codeBlock").opt(),
            kws("end foreach"),
        ],
    );

    g.transient(
        "otherFGLStatement",
        alt![
            nt("otherProgramFlowStatement"),
            nt("otherStorageStatement"),
            nt("reportStatement"),
            nt("screenStatement"),
        ],
    );
    g.transient(
        "otherProgramFlowStatement",
        alt![
            nt("runStatement"),
            nt("gotoStatement"),
            nt("sleepStatement"),
            nt("exitStatement"),
            nt("continueStatement"),
            nt("returnStatement"),
        ],
    );
    // The command is parsed below the comparison level so that a following
    // `IN FORM MODE` is not read as an `IN (...)` test.
    g.rule(
        "runStatement",
        seq![
            kw("run"),
            nt("concatExpression"),
            alt![kws("in form mode"), kws("in line mode")].opt(),
            alt![
                kws("without waiting"),
                seq![kw("returning"), nt("variable")],
            ]
            .opt(),
        ],
    );
    g.rule(
        "gotoStatement",
        seq![kw("goto"), sym(":").opt(), nt("Identifier")],
    );
    g.rule("sleepStatement", seq![kw("sleep"), nt("expression")]);
    g.rule(
        "exitStatement",
        alt![
            seq![kw("exit"), nt("exitTypes")],
            seq![kws("exit program"), nt("expression").opt()],
        ],
    );
    g.rule("continueStatement", seq![kw("continue"), nt("exitTypes")]);
    g.rule(
        "exitTypes",
        alt![
            kw("foreach"),
            kw("for"),
            kw("case"),
            kw("report"),
            kw("while"),
        ],
    );
    g.rule(
        "returnStatement",
        seq![kw("return"), nt("expressionList").opt()],
    );

    g.rule(
        "otherStorageStatement",
        alt![
            seq![
                kws("allocate array"),
                nt("Identifier"),
                nt("arrayIndexer"),
            ],
            seq![
                kw("locate"),
                nt("variableList"),
                kw("in"),
                alt![
                    kw("memory"),
                    seq![kw("file"), nt("expression").opt()],
                ],
            ],
            seq![kws("deallocate array"), nt("Identifier")],
            seq![kws("resize array"), nt("Identifier"), nt("arrayIndexer")],
            seq![kw("free"), nt("variableList")],
            seq![
                kw("initialize"),
                nt("variableList"),
                alt![
                    kws("to null"),
                    seq![kw("like"), nt("expressionList")],
                ],
            ],
            seq![
                kw("validate"),
                nt("variableList"),
                kw("like"),
                nt("expressionList"),
            ],
        ],
    );
}
