//! Module structure: database, globals, `MAIN`, functions and reports.

use crate::grammar::{empty, kw, kws, nt, sym, GrammarBuilder};
use crate::{alt, seq};

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.rule(
        "compilation_unit",
        seq![
            nt("databaseDeclaration").opt(),
            nt("includeDefinitions"),
            nt("globalDeclaration").opt(),
            nt("typeDefinitions"),
            nt("typeDeclarations"),
            nt("mainBlock").opt(),
            nt("functionOrReportDefinitions"),
        ],
    );

    g.rule(
        "databaseDeclaration",
        seq![
            kw("database"),
            nt("constantIdentifier"),
            seq![sym("@"), nt("constantIdentifier")].opt(),
            kw("exclusive").opt(),
            sym(";").opt(),
        ],
    );

    g.rule("includeDefinitions", nt("includeDefinition").star());
    g.rule(
        "includeDefinition",
        seq![sym("&"), kw("include"), nt("StringLiteral")],
    );

    g.rule(
        "globalDeclaration",
        alt![
            seq![kw("globals"), nt("StringLiteral")],
            seq![kw("globals"), nt("typeDeclarations"), kws("end globals")],
        ],
    );

    g.rule(
        "mainBlock",
        seq![
            kw("main"),
            nt("typeDeclarations"),
            nt("mainStatements"),
            kws("end main"),
        ],
    );
    g.rule("mainStatements", nt("mainStatement").star());
    g.transient(
        "mainStatement",
        alt![nt("deferStatement"), nt("statementOrDbDeclaration")],
    );
    g.rule(
        "deferStatement",
        seq![kw("defer"), alt![kw("interrupt"), kw("quit")]],
    );

    g.rule(
        "functionOrReportDefinitions",
        nt("reportOrFunctionDefinition").star(),
    );
    g.transient(
        "reportOrFunctionDefinition",
        alt![nt("reportDefinition"), nt("functionDefinition")],
    );

    g.rule(
        "functionDefinition",
        seq![
            kw("function"),
            nt("functionIdentifier"),
            nt("parameterList"),
            nt("typeDeclarations"),
            nt("codeBlock").opt(),
            kws("end function"),
        ],
    );
    g.rule(
        "parameterList",
        alt![
            seq![sym("("), nt("parameterGroup").opt(), sym(")")],
            empty(),
        ],
    );
    g.rule("parameterGroup", nt("Identifier").plus_sep(sym(",")));

    g.rule(
        "reportDefinition",
        seq![
            kw("report"),
            nt("Identifier"),
            nt("parameterList"),
            nt("typeDeclarations"),
            nt("outputReport").opt(),
            nt("reportOrderBy").opt(),
            nt("formatReport").opt(),
            kws("end report"),
        ],
    );
}
