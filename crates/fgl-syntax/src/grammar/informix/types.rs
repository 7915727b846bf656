//! `DEFINE`/`TYPE` declarations and the data type grammar.

use crate::grammar::{kw, kws, nt, sym, GrammarBuilder};
use crate::{alt, seq};

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.rule("typeDefinitions", nt("typeDefinition").star());
    g.rule(
        "typeDefinition",
        seq![kw("type"), nt("Identifier"), nt("type")],
    );

    g.rule("typeDeclarations", nt("typeDeclaration").star());
    g.rule(
        "typeDeclaration",
        seq![kw("define"), nt("variableDeclarationList")],
    );
    g.rule(
        "variableDeclarationList",
        nt("variableDeclaration").plus_sep(sym(",")),
    );
    g.rule(
        "variableDeclaration",
        seq![nt("constantIdentifierList"), nt("type")],
    );
    g.rule(
        "constantIdentifierList",
        nt("constantIdentifier").plus_sep(sym(",")),
    );

    g.transient(
        "type",
        alt![
            nt("typeIdentifier"),
            nt("indirectType"),
            nt("largeType"),
            nt("structuredType"),
        ],
    );
    g.rule(
        "indirectType",
        seq![
            kw("like"),
            nt("tableIdentifier"),
            sym("."),
            nt("Identifier"),
        ],
    );
    g.transient(
        "typeIdentifier",
        alt![
            nt("charType"),
            nt("numberType"),
            nt("timeType"),
            nt("classChain"),
        ],
    );
    g.rule("largeType", alt![kw("text"), kw("byte")]);
    g.rule("classChain", nt("Identifier").plus_sep(sym(".")));

    g.rule("sign", alt![sym("+"), sym("-")]);
    g.rule(
        "numericConstant",
        alt![nt("Number"), seq![nt("sign"), nt("Number")]],
    );

    g.rule(
        "numberType",
        alt![
            kw("bigint"),
            kw("integer"),
            kw("int"),
            kw("smallint"),
            kw("real"),
            kw("smallfloat"),
            seq![
                alt![kw("decimal"), kw("dec"), kw("numeric"), kw("money")],
                nt("precision").opt(),
            ],
            seq![
                alt![kw("float"), kws("double precision"), kw("double")],
                seq![sym("("), nt("numericConstant"), sym(")")].opt(),
            ],
        ],
    );
    g.rule(
        "precision",
        seq![
            sym("("),
            nt("numericConstant"),
            seq![sym(","), nt("numericConstant")].opt(),
            sym(")"),
        ],
    );
    g.rule(
        "charType",
        alt![
            seq![alt![kw("varchar"), kw("nvarchar")], nt("precision")],
            seq![
                alt![kw("char"), kw("nchar"), kw("character")],
                seq![sym("("), nt("numericConstant"), sym(")")].opt(),
            ],
            kw("string"),
        ],
    );
    g.rule(
        "timeType",
        alt![
            kw("date"),
            seq![kw("datetime"), nt("datetimeQualifier")],
            seq![kw("interval"), nt("intervalQualifier")],
        ],
    );

    // A qualifier's end unit may not be coarser than its start unit; each
    // `xxxQualifier` accepts its own unit or any finer one.
    g.rule(
        "datetimeQualifier",
        alt![
            seq![kw("year"), kw("to"), nt("yearQualifier")],
            seq![kw("month"), kw("to"), nt("monthQualifier")],
            seq![kw("day"), kw("to"), nt("dayQualifier")],
            seq![kw("hour"), kw("to"), nt("hourQualifier")],
            seq![kw("minute"), kw("to"), nt("minuteQualifier")],
            seq![kw("second"), kw("to"), nt("secondQualifier")],
            seq![kw("fraction"), kw("to"), nt("fractionQualifier")],
        ],
    );
    g.rule(
        "intervalQualifier",
        alt![
            seq![kw("year"), nt("unitPrecision").opt(), kw("to"), nt("yearQualifier")],
            seq![kw("month"), nt("unitPrecision").opt(), kw("to"), nt("monthQualifier")],
            seq![kw("day"), nt("unitPrecision").opt(), kw("to"), nt("dayQualifier")],
            seq![kw("hour"), nt("unitPrecision").opt(), kw("to"), nt("hourQualifier")],
            seq![kw("minute"), nt("unitPrecision").opt(), kw("to"), nt("minuteQualifier")],
            seq![kw("second"), nt("unitPrecision").opt(), kw("to"), nt("secondQualifier")],
            seq![kw("fraction"), kw("to"), nt("fractionQualifier")],
        ],
    );
    g.rule(
        "unitPrecision",
        seq![sym("("), nt("numericConstant"), sym(")")],
    );
    g.transient("unitType", nt("yearQualifier"));
    g.transient("yearQualifier", alt![kw("year"), nt("monthQualifier")]);
    g.transient("monthQualifier", alt![kw("month"), nt("dayQualifier")]);
    g.transient("dayQualifier", alt![kw("day"), nt("hourQualifier")]);
    g.transient("hourQualifier", alt![kw("hour"), nt("minuteQualifier")]);
    g.transient("minuteQualifier", alt![kw("minute"), nt("secondQualifier")]);
    g.transient("secondQualifier", alt![kw("second"), nt("fractionQualifier")]);
    g.rule(
        "fractionQualifier",
        seq![kw("fraction"), nt("unitPrecision").opt()],
    );

    g.transient(
        "structuredType",
        alt![nt("recordType"), nt("arrayType"), nt("dynArrayType")],
    );
    g.rule(
        "recordType",
        seq![
            kw("record"),
            alt![
                seq![nt("variableDeclarationList"), kws("end record")],
                seq![kw("like"), nt("tableIdentifier"), sym("."), sym("*")],
            ],
        ],
    );
    g.rule(
        "arrayType",
        seq![
            kw("array"),
            nt("arrayIndexer"),
            kw("of"),
            alt![nt("recordType"), nt("typeIdentifier"), nt("largeType")],
        ],
    );
    g.rule(
        "dynArrayType",
        seq![
            kws("dynamic array"),
            seq![kw("with"), nt("numericConstant"), kw("dimensions")].opt(),
            kw("of"),
            alt![nt("recordType"), nt("typeIdentifier")],
        ],
    );
}
