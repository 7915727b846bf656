//! Embedded SQL: cursors, DDL, DML, dynamic SQL and transaction control.
//!
//! SQL search conditions have their own expression grammar (`condition`,
//! `logicalTerm`, `logicalFactor`, `sqlExpression`); host variables appear in
//! it as plain column references.

use crate::grammar::{kw, kws, nt, sym, GrammarBuilder};
use crate::{alt, seq};

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.rule(
        "sqlStatement",
        seq![nt("sqlStatements"), sym(";").opt()],
    );
    g.transient(
        "sqlStatements",
        alt![
            nt("cursorManipulationStatement"),
            nt("dataDefinitionStatement"),
            nt("dataManipulationStatement"),
            nt("dynamicManagementStatement"),
            nt("queryOptimizationStatement"),
            nt("dataIntegrityStatement"),
            nt("clientServerStatement"),
        ],
    );

    cursors(g);
    definitions(g);
    manipulation(g);
    conditions(g);

    g.rule(
        "dynamicManagementStatement",
        alt![
            seq![
                kw("prepare"),
                nt("cursorName"),
                kw("from"),
                nt("expression"),
            ],
            seq![kws("execute immediate"), nt("expression")],
            seq![
                kw("execute"),
                nt("cursorName"),
                seq![kw("using"), nt("variableList")].opt(),
            ],
            seq![
                kws("lock table"),
                nt("tableIdentifier"),
                kw("in"),
                alt![kw("share"), kw("exclusive")],
                kw("mode"),
            ],
            seq![kws("unlock table"), nt("tableIdentifier")],
        ],
    );
    g.rule(
        "queryOptimizationStatement",
        alt![
            seq![
                kws("update statistics"),
                seq![kws("for table"), nt("tableIdentifier")].opt(),
            ],
            seq![
                kws("set lock mode to"),
                alt![seq![kw("wait"), nt("Number").opt()], kws("not wait")],
            ],
            seq![kws("set explain"), alt![kw("on"), kw("off")]],
            seq![
                kws("set isolation to"),
                alt![
                    kws("cursor stability"),
                    seq![
                        alt![kw("dirty"), kw("committed"), kw("repeatable")],
                        kw("read"),
                    ],
                ],
            ],
            seq![kw("set"), kw("buffered").opt(), kw("log")],
        ],
    );
    g.rule(
        "dataIntegrityStatement",
        alt![
            nt("wheneverStatement"),
            seq![
                alt![kw("begin"), kw("commit"), kw("rollback")],
                kw("work"),
            ],
        ],
    );
    g.rule(
        "wheneverStatement",
        seq![kw("whenever"), nt("wheneverType"), nt("wheneverFlow")],
    );
    g.rule(
        "wheneverType",
        alt![
            kws("not found"),
            seq![kw("any").opt(), alt![kw("sqlerror"), kw("error")]],
            kw("sqlwarning"),
            kw("warning"),
        ],
    );
    g.rule(
        "wheneverFlow",
        alt![
            kw("continue"),
            kw("stop"),
            seq![kw("call"), nt("Identifier")],
            seq![
                alt![kws("go to"), kw("goto")],
                sym(":").opt(),
                nt("Identifier"),
            ],
        ],
    );
    g.rule("clientServerStatement", kws("close database"));
}

fn cursors(g: &mut GrammarBuilder) {
    g.rule(
        "cursorManipulationStatement",
        alt![
            seq![kw("close"), nt("cursorName")],
            seq![
                kw("declare"),
                nt("cursorName"),
                alt![
                    seq![
                        kw("cursor"),
                        kws("with hold").opt(),
                        kw("for"),
                        alt![
                            seq![
                                nt("sqlSelectStatement"),
                                seq![
                                    kws("for update"),
                                    seq![kw("of"), nt("columnsList")].opt(),
                                ]
                                .opt(),
                            ],
                            nt("sqlInsertStatement"),
                            nt("statementId"),
                        ],
                    ],
                    seq![
                        kws("scroll cursor"),
                        kws("with hold").opt(),
                        kw("for"),
                        alt![nt("sqlSelectStatement"), nt("statementId")],
                    ],
                ],
            ],
            seq![
                kw("fetch"),
                nt("fetchDirection").opt(),
                nt("cursorName"),
                seq![kw("into"), nt("variableList")].opt(),
            ],
            seq![kw("flush"), nt("cursorName")],
            seq![
                kw("open"),
                nt("cursorName"),
                seq![kw("using"), nt("expressionList")].opt(),
            ],
            seq![
                kw("put"),
                nt("cursorName"),
                seq![kw("from"), nt("expressionList")].opt(),
            ],
        ],
    );
    g.rule(
        "fetchDirection",
        alt![
            kw("next"),
            kw("previous"),
            kw("prior"),
            kw("first"),
            kw("last"),
            kw("current"),
            seq![kw("relative"), nt("expression")],
            seq![kw("absolute"), nt("expression")],
        ],
    );
    g.rule("cursorName", nt("Identifier"));
    g.rule("statementId", nt("constantIdentifier"));
}

fn definitions(g: &mut GrammarBuilder) {
    g.rule(
        "dataDefinitionStatement",
        alt![
            seq![kws("drop table"), nt("constantIdentifier")],
            seq![
                kw("create"),
                kw("temp").opt(),
                kw("table"),
                nt("constantIdentifier"),
                sym("("),
                nt("columnItem").plus_sep(sym(",")),
                sym(")"),
                kws("with no log").opt(),
                seq![kw("in"), nt("constantIdentifier")].opt(),
                seq![kws("extent size"), nt("numericConstant")].opt(),
                seq![kws("next size"), nt("numericConstant")].opt(),
                seq![
                    kws("lock mode"),
                    sym("("),
                    alt![kw("page"), kw("row")],
                    sym(")"),
                ]
                .opt(),
            ],
            seq![
                kw("create"),
                kw("unique").opt(),
                kw("cluster").opt(),
                kw("index"),
                nt("constantIdentifier"),
                kw("on"),
                nt("constantIdentifier"),
                sym("("),
                nt("indexColumn").plus_sep(sym(",")),
                sym(")"),
            ],
            seq![kws("drop index"), nt("constantIdentifier")],
        ],
    );
    g.rule(
        "columnItem",
        alt![
            seq![
                nt("constantIdentifier"),
                nt("columnType"),
                seq![kw("in"), alt![kw("table"), nt("constantIdentifier")]].opt(),
                kws("not null").opt(),
            ],
            seq![
                kw("unique"),
                sym("("),
                nt("constantIdentifierList").opt(),
                sym(")"),
                seq![kw("constraint"), nt("constantIdentifier")].opt(),
            ],
        ],
    );
    g.transient(
        "columnType",
        alt![
            nt("type"),
            seq![
                kw("serial"),
                seq![sym("("), nt("numericConstant"), sym(")")].opt(),
            ],
        ],
    );
    g.rule(
        "indexColumn",
        seq![
            nt("constantIdentifier"),
            alt![kw("asc"), kw("desc")].opt(),
        ],
    );
}

fn manipulation(g: &mut GrammarBuilder) {
    g.transient(
        "dataManipulationStatement",
        alt![
            nt("sqlInsertStatement"),
            nt("sqlDeleteStatement"),
            nt("sqlSelectStatement"),
            nt("sqlUpdateStatement"),
            nt("sqlLoadStatement"),
            nt("sqlUnloadStatement"),
        ],
    );

    g.rule(
        "sqlSelectStatement",
        seq![
            nt("headSelectStatement"),
            seq![kw("into"), nt("variableList")].opt(),
            nt("fromSelectStatement"),
            nt("whereStatement").opt(),
            nt("groupByStatement").opt(),
            nt("havingStatement").opt(),
            nt("unionSelectStatement").opt(),
            nt("orderbyStatement").opt(),
            seq![kws("into temp"), nt("Identifier")].opt(),
            kws("with no log").opt(),
        ],
    );
    g.rule(
        "simpleSelectStatement",
        seq![
            nt("headSelectStatement"),
            nt("fromSelectStatement"),
            nt("whereStatement").opt(),
            nt("groupByStatement").opt(),
            nt("havingStatement").opt(),
            nt("unionSelectStatement").opt(),
        ],
    );
    g.rule(
        "headSelectStatement",
        seq![
            kw("select"),
            alt![kw("all"), kw("distinct"), kw("unique")].opt(),
            nt("selectList"),
        ],
    );
    g.rule("selectList", nt("selectItem").plus_sep(sym(",")));
    g.rule(
        "selectItem",
        alt![
            sym("*"),
            seq![nt("sqlExpression"), nt("sqlAlias").opt()],
        ],
    );
    g.rule(
        "sqlAlias",
        alt![seq![kw("as"), nt("Identifier")], nt("Identifier")],
    );
    g.rule(
        "fromSelectStatement",
        seq![kw("from"), nt("fromTableExpression").plus_sep(sym(","))],
    );
    g.rule(
        "fromTableExpression",
        alt![
            seq![
                kw("outer").opt(),
                nt("tableIdentifier"),
                nt("sqlAlias").opt(),
            ],
            seq![
                sym("("),
                nt("simpleSelectStatement"),
                sym(")"),
                nt("sqlAlias").opt(),
            ],
        ],
    );
    g.rule("whereStatement", seq![kw("where"), nt("condition")]);
    g.rule(
        "groupByStatement",
        seq![kws("group by"), nt("sqlExpressionList")],
    );
    g.rule("havingStatement", seq![kw("having"), nt("condition")]);
    g.rule(
        "unionSelectStatement",
        seq![kw("union"), kw("all").opt(), nt("simpleSelectStatement")],
    );
    g.rule(
        "orderbyStatement",
        seq![kws("order by"), nt("orderbyColumn").plus_sep(sym(","))],
    );
    g.rule(
        "orderbyColumn",
        seq![nt("sqlExpression"), alt![kw("asc"), kw("desc")].opt()],
    );

    g.rule(
        "tableIdentifier",
        alt![
            seq![
                nt("constantIdentifier"),
                sym("@"),
                nt("constantIdentifier"),
                sym(":"),
                nt("constantIdentifier"),
            ],
            seq![nt("constantIdentifier"), sym(":"), nt("constantIdentifier")],
            nt("constantIdentifier"),
        ],
    );
    g.rule(
        "columnsTableId",
        seq![
            nt("tableIdentifier"),
            nt("indexingVariable").opt(),
            seq![sym("."), alt![sym("*"), nt("columnsTableId")]].opt(),
        ],
    );
    g.rule("columnsList", nt("columnsTableId").plus_sep(sym(",")));

    g.rule(
        "sqlInsertStatement",
        seq![
            kws("insert into"),
            nt("tableIdentifier"),
            seq![sym("("), nt("columnsList"), sym(")")].opt(),
            alt![
                seq![
                    kw("values"),
                    sym("("),
                    nt("sqlExpressionList"),
                    sym(")"),
                ],
                nt("simpleSelectStatement"),
            ],
        ],
    );
    g.rule(
        "sqlUpdateStatement",
        seq![
            kw("update"),
            nt("tableIdentifier"),
            kw("set"),
            alt![
                nt("columnAssignment").plus_sep(sym(",")),
                seq![
                    alt![
                        seq![sym("("), nt("columnsList"), sym(")")],
                        sym("*"),
                    ],
                    sym("="),
                    sym("("),
                    nt("sqlExpressionList"),
                    sym(")"),
                ],
            ],
            nt("positionedWhere").opt(),
        ],
    );
    g.rule(
        "columnAssignment",
        seq![nt("columnsTableId"), sym("="), nt("sqlExpression")],
    );
    g.rule(
        "sqlDeleteStatement",
        seq![
            kws("delete from"),
            nt("tableIdentifier"),
            nt("positionedWhere").opt(),
        ],
    );
    g.rule(
        "positionedWhere",
        seq![
            kw("where"),
            alt![
                seq![kws("current of"), nt("cursorName")],
                nt("condition"),
            ],
        ],
    );
    g.rule(
        "sqlLoadStatement",
        seq![
            kws("load from"),
            nt("fileSpecification"),
            seq![kw("delimiter"), nt("fileSpecification")].opt(),
            alt![
                nt("sqlInsertStatement"),
                seq![
                    kws("insert into"),
                    nt("tableIdentifier"),
                    seq![sym("("), nt("columnsList"), sym(")")].opt(),
                ],
            ],
        ],
    );
    g.rule(
        "sqlUnloadStatement",
        seq![
            kws("unload to"),
            nt("fileSpecification"),
            seq![kw("delimiter"), nt("fileSpecification")].opt(),
            nt("sqlSelectStatement"),
        ],
    );
    g.transient(
        "fileSpecification",
        alt![nt("variable"), nt("StringLiteral")],
    );
}

fn conditions(g: &mut GrammarBuilder) {
    g.rule("condition", nt("logicalTerm").plus_sep(kw("or")));
    g.rule("logicalTerm", nt("logicalFactor").plus_sep(kw("and")));
    g.rule(
        "logicalFactor",
        alt![
            seq![
                nt("sqlExpression"),
                kw("not").opt(),
                kw("in"),
                nt("expressionSet"),
            ],
            seq![
                nt("sqlExpression"),
                kw("not").opt(),
                alt![kw("like"), kw("matches")],
                nt("sqlExpression"),
                seq![kw("escape"), nt("StringLiteral")].opt(),
            ],
            seq![
                nt("sqlExpression"),
                kw("not").opt(),
                kw("between"),
                nt("sqlExpression"),
                kw("and"),
                nt("sqlExpression"),
            ],
            seq![
                nt("sqlExpression"),
                kw("is"),
                kw("not").opt(),
                kw("null"),
            ],
            nt("quantifiedFactor"),
            seq![kw("not"), nt("logicalFactor")],
            seq![sym("("), nt("condition"), sym(")")],
            seq![
                nt("sqlExpression"),
                nt("relationalOperator"),
                nt("sqlExpression"),
            ],
            nt("sqlExpression"),
        ],
    );
    g.rule(
        "quantifiedFactor",
        alt![
            seq![
                nt("sqlExpression"),
                nt("relationalOperator"),
                alt![kw("all"), kw("any"), kw("some")],
                nt("subquery"),
            ],
            seq![kw("exists"), nt("subquery")],
        ],
    );
    g.transient(
        "expressionSet",
        alt![
            seq![sym("("), nt("sqlExpressionList"), sym(")")],
            nt("subquery"),
        ],
    );
    g.rule(
        "subquery",
        seq![sym("("), nt("simpleSelectStatement"), sym(")")],
    );

    g.rule(
        "sqlExpression",
        nt("sqlTerm").plus_sep(alt![sym("+"), sym("-")]),
    );
    g.rule(
        "sqlTerm",
        nt("sqlFactor").plus_sep(alt![sym("*"), sym("/")]),
    );
    g.rule("sqlFactor", nt("sqlFactor2").plus_sep(sym("||")));
    g.rule(
        "sqlFactor2",
        alt![
            seq![
                nt("sqlVariable"),
                seq![kw("units"), nt("unitType")].opt(),
            ],
            seq![
                nt("sqlLiteral"),
                seq![kw("units"), nt("unitType")].opt(),
            ],
            seq![
                nt("groupFunction"),
                sym("("),
                alt![sym("*"), kw("all"), kw("distinct")].opt(),
                nt("sqlExpressionList").opt(),
                sym(")"),
            ],
            seq![
                nt("sqlFunction"),
                sym("("),
                nt("sqlExpressionList"),
                sym(")"),
            ],
            seq![alt![sym("+"), sym("-")], nt("sqlFactor2")],
            seq![sym("("), nt("sqlExpression"), sym(")")],
            nt("subquery"),
        ],
    );
    g.rule(
        "sqlExpressionList",
        nt("sqlExpression").plus_sep(sym(",")),
    );
    g.rule(
        "sqlLiteral",
        alt![
            nt("Number"),
            nt("StringLiteral"),
            kw("null"),
            kw("true"),
            kw("false"),
            seq![kw("current"), nt("datetimeQualifier").opt()],
        ],
    );
    g.rule("sqlVariable", nt("columnsTableId"));
    g.transient(
        "groupFunction",
        alt![kw("avg"), kw("count"), kw("max"), kw("min"), kw("sum")],
    );
    g.transient(
        "sqlFunction",
        alt![
            kw("mod"),
            kw("length"),
            kw("year"),
            kw("month"),
            kw("day"),
            kw("date"),
            kw("decode"),
            kw("nvl"),
            nt("constantIdentifier"),
        ],
    );
}
