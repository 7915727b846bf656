//! Screen interaction: forms, windows, menus, `DISPLAY`/`INPUT`/`CONSTRUCT`
//! and their event blocks.

use crate::grammar::{kw, kws, nt, sym, GrammarBuilder};
use crate::{alt, seq};

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.transient(
        "screenStatement",
        alt![
            nt("clearStatement"),
            nt("closeWindowStatement"),
            nt("closeFormStatement"),
            nt("constructStatement"),
            nt("currentWindowStatement"),
            nt("displayStatement"),
            nt("displayArrayStatement"),
            nt("displayFormStatement"),
            nt("errorStatement"),
            nt("messageStatement"),
            nt("promptStatement"),
            nt("inputStatement"),
            nt("inputArrayStatement"),
            nt("menuStatement"),
            nt("openFormStatement"),
            nt("openWindowStatement"),
            nt("optionsStatement"),
            nt("scrollStatement"),
        ],
    );

    g.rule(
        "clearStatement",
        seq![
            kw("clear"),
            alt![
                kw("form"),
                seq![kw("window"), nt("Identifier")],
                kws("window screen"),
                kw("screen"),
                nt("fieldList"),
            ],
        ],
    );
    g.rule(
        "closeWindowStatement",
        seq![kws("close window"), nt("Identifier")],
    );
    g.rule(
        "closeFormStatement",
        seq![kws("close form"), nt("Identifier")],
    );
    g.rule(
        "currentWindowStatement",
        seq![
            kws("current window is"),
            alt![kw("screen"), nt("Identifier")],
        ],
    );
    g.rule(
        "openFormStatement",
        seq![
            kws("open form"),
            nt("Identifier"),
            kw("from"),
            nt("expression"),
        ],
    );
    g.rule(
        "openWindowStatement",
        seq![
            kws("open window"),
            nt("Identifier"),
            kw("at"),
            nt("expression"),
            sym(","),
            nt("expression"),
            alt![
                seq![kws("with form"), nt("expression")],
                seq![
                    kw("with"),
                    nt("expression"),
                    kw("rows"),
                    sym(","),
                    nt("expression"),
                    kw("columns"),
                ],
            ],
            nt("windowAttributeList").opt(),
        ],
    );
    g.rule(
        "scrollStatement",
        seq![
            kw("scroll"),
            nt("fieldList"),
            alt![kw("up"), kw("down")],
            seq![kw("by"), nt("numericConstant")].opt(),
        ],
    );

    displays(g);
    inputs(g);
    menus(g);
    attributes(g);
    options(g);
}

fn displays(g: &mut GrammarBuilder) {
    g.rule(
        "displayStatement",
        seq![
            kw("display"),
            alt![
                seq![kws("by name"), nt("expressionList")],
                seq![
                    nt("expressionList"),
                    alt![
                        seq![kw("to"), nt("fieldList")],
                        seq![
                            kw("at"),
                            nt("expression"),
                            sym(","),
                            nt("expression"),
                        ],
                    ]
                    .opt(),
                ],
            ],
            nt("attributeList").opt(),
        ],
    );
    g.rule(
        "displayArrayStatement",
        seq![
            kws("display array"),
            nt("expression"),
            kw("to"),
            nt("expression"),
            nt("attributeList").opt(),
            seq![nt("displayEvents").plus(), kws("end display")].opt(),
        ],
    );
    g.rule(
        "displayEvents",
        seq![
            kws("on key"),
            sym("("),
            nt("keyList"),
            sym(")"),
            nt("codeBlock").opt(),
        ],
    );
    g.rule(
        "displayFormStatement",
        seq![kws("display form"), nt("Identifier"), nt("attributeList").opt()],
    );
    g.rule(
        "displayInsideStatement",
        seq![alt![kw("continue"), kw("exit")], kw("display")],
    );

    g.rule(
        "errorStatement",
        seq![kw("error"), nt("expressionList"), nt("attributeList").opt()],
    );
    g.rule(
        "messageStatement",
        seq![kw("message"), nt("expressionList"), nt("attributeList").opt()],
    );
    g.rule(
        "promptStatement",
        seq![
            kw("prompt"),
            nt("expressionList"),
            nt("attributeList").opt(),
            kw("for"),
            kw("char").opt(),
            nt("variable"),
            seq![kw("help"), nt("numericConstant")].opt(),
            nt("attributeList").opt(),
            seq![nt("keyListCodeBlock").plus(), kws("end prompt")].opt(),
        ],
    );
    g.rule(
        "keyListCodeBlock",
        seq![
            kws("on key"),
            sym("("),
            nt("keyList"),
            sym(")"),
            nt("codeBlock").opt(),
        ],
    );
    g.rule("keyList", nt("keyName").plus_sep(sym(",")));
    g.rule(
        "keyName",
        alt![
            nt("expression"),
            kw("accept"),
            kw("interrupt"),
            kw("help"),
            kw("delete"),
            kw("insert"),
            kw("escape"),
            kw("return"),
            kw("up"),
            kw("down"),
            kw("left"),
            kw("right"),
        ],
    );

    g.rule("fieldList", nt("fieldName").plus_sep(sym(",")));
    g.rule(
        "fieldName",
        seq![nt("fieldPath"), nt("thruNotation").opt()],
    );
    g.rule(
        "fieldPath",
        seq![
            nt("Identifier"),
            seq![sym("["), nt("expression"), sym("]")].opt(),
            seq![sym("."), alt![sym("*"), nt("Identifier")]].opt(),
        ],
    );
    g.rule(
        "thruNotation",
        seq![
            nt("thru"),
            seq![kw("same"), sym(".")].opt(),
            nt("Identifier"),
        ],
    );
}

fn inputs(g: &mut GrammarBuilder) {
    g.rule(
        "inputStatement",
        seq![
            kw("input"),
            alt![
                seq![
                    kws("by name"),
                    nt("expressionList"),
                    kws("without defaults").opt(),
                ],
                seq![
                    nt("expressionList"),
                    kws("without defaults").opt(),
                    kw("from"),
                    nt("fieldList"),
                ],
            ],
            nt("attributeList").opt(),
            seq![kw("help"), nt("numericConstant")].opt(),
            seq![nt("inputGroupStatement").plus(), kws("end input")].opt(),
        ],
    );
    g.rule(
        "inputArrayStatement",
        seq![
            kws("input array"),
            nt("expression"),
            kws("without defaults").opt(),
            kw("from"),
            nt("expressionList"),
            seq![kw("help"), nt("numericConstant")].opt(),
            nt("attributeList").opt(),
            seq![nt("inputGroupStatement").plus(), kws("end input")].opt(),
        ],
    );
    g.rule(
        "inputGroupStatement",
        seq![nt("inputEvents"), nt("codeBlock").opt()],
    );
    g.rule(
        "inputEvents",
        alt![
            seq![
                alt![kw("before"), kw("after")],
                alt![kw("input"), kw("row"), kw("insert"), kw("delete")],
            ],
            seq![alt![kw("before"), kw("after")], kw("field"), nt("fieldList")],
            seq![kws("on key"), sym("("), nt("keyList"), sym(")")],
            seq![kws("on change"), nt("fieldList")],
            seq![kws("on idle"), nt("expression")],
            seq![
                kws("on action"),
                alt![
                    kw("cancel"),
                    kw("accept"),
                    kw("close"),
                    kw("help"),
                    nt("Identifier"),
                ],
            ],
        ],
    );
    g.rule(
        "inputOrConstructInsideStatement",
        alt![
            seq![
                kws("next field"),
                alt![nt("fieldName"), kw("next"), kw("previous")],
            ],
            seq![
                alt![kw("continue"), kw("exit")],
                alt![kw("input"), kw("construct")],
            ],
        ],
    );

    g.rule(
        "constructStatement",
        seq![
            kw("construct"),
            alt![
                seq![
                    kws("by name"),
                    nt("variable"),
                    kw("on"),
                    nt("columnsList"),
                ],
                seq![
                    nt("variable"),
                    kw("on"),
                    nt("columnsList"),
                    kw("from"),
                    nt("fieldList"),
                ],
            ],
            nt("attributeList").opt(),
            seq![kw("help"), nt("numericConstant")].opt(),
            seq![nt("constructGroupStatement").plus(), kws("end construct")].opt(),
        ],
    );
    g.rule(
        "constructGroupStatement",
        seq![nt("constructEvents"), nt("codeBlock").opt()],
    );
    g.rule(
        "constructEvents",
        alt![
            seq![
                alt![kw("before"), kw("after")],
                alt![kw("construct"), seq![kw("field"), nt("fieldList")]],
            ],
            seq![kws("on key"), sym("("), nt("keyList"), sym(")")],
        ],
    );
}

fn menus(g: &mut GrammarBuilder) {
    g.rule(
        "menuStatement",
        seq![
            kw("menu"),
            nt("expression"),
            nt("menuGroupStatement").star(),
            kws("end menu"),
        ],
    );
    g.rule(
        "menuGroupStatement",
        seq![nt("menuEvents"), nt("codeBlock").opt()],
    );
    g.rule(
        "menuEvents",
        alt![
            kws("before menu"),
            seq![
                kw("command"),
                seq![kw("key"), sym("("), nt("keyList"), sym(")")].opt(),
                nt("expression"),
                nt("StringLiteral").opt(),
                seq![kw("help"), nt("numericConstant")].opt(),
            ],
            seq![kws("on idle"), nt("expression")],
            seq![
                kws("on action"),
                alt![
                    kw("close"),
                    kw("help"),
                    kw("output"),
                    kw("print"),
                    kw("update"),
                    nt("Identifier"),
                ],
            ],
        ],
    );
    g.rule(
        "menuInsideStatement",
        alt![
            seq![
                alt![kw("next"), kw("show"), kw("hide")],
                kw("option"),
                alt![kw("all"), nt("expressionList")],
            ],
            seq![alt![kw("continue"), kw("exit")], kw("menu")],
        ],
    );
}

fn attributes(g: &mut GrammarBuilder) {
    g.rule(
        "attributeList",
        seq![
            alt![kw("attribute"), kw("attributes")],
            sym("("),
            nt("specialAttribute").plus_sep(sym(",")),
            sym(")"),
        ],
    );
    g.transient(
        "specialAttribute",
        alt![nt("displayAttribute"), nt("controlAttribute")],
    );
    g.rule(
        "displayAttribute",
        alt![
            nt("color"),
            kw("bold"),
            kw("dim"),
            kw("normal"),
            kw("invisible"),
            kw("reverse"),
            kw("blink"),
            kw("underline"),
        ],
    );
    g.transient(
        "color",
        alt![
            kw("black"),
            kw("blue"),
            kw("cyan"),
            kw("green"),
            kw("magenta"),
            kw("red"),
            kw("white"),
            kw("yellow"),
        ],
    );
    g.rule(
        "controlAttribute",
        alt![
            seq![kw("name"), sym("="), nt("StringLiteral")],
            seq![kw("help"), sym("="), nt("numericConstant")],
            seq![
                kws("without defaults"),
                seq![sym("="), nt("numericConstant")].opt(),
            ],
            kws("field order form"),
            seq![
                alt![kw("unbuffered"), kw("cancel"), kw("accept")],
                seq![sym("="), nt("numericConstant")].opt(),
            ],
        ],
    );

    g.rule(
        "windowAttributeList",
        seq![
            alt![kw("attribute"), kw("attributes")],
            sym("("),
            nt("windowAttribute").plus_sep(sym(",")),
            sym(")"),
        ],
    );
    g.rule(
        "windowAttribute",
        alt![
            nt("color"),
            kw("bold"),
            kw("dim"),
            kw("normal"),
            kw("invisible"),
            kw("reverse"),
            kw("border"),
            seq![
                alt![kw("prompt"), kw("form"), kw("menu"), kw("message")],
                kw("line"),
                nt("linePosition"),
            ],
            seq![
                kws("comment line"),
                alt![nt("linePosition"), kw("off")],
            ],
        ],
    );
    g.rule(
        "linePosition",
        alt![
            seq![kw("first"), seq![sym("+"), nt("expression")].opt()],
            seq![kw("last"), seq![sym("-"), nt("expression")].opt()],
            nt("expression"),
        ],
    );
}

fn options(g: &mut GrammarBuilder) {
    g.rule(
        "optionsStatement",
        seq![
            alt![kw("option"), kw("options")],
            nt("optionStatement").plus_sep(sym(",")),
        ],
    );
    g.rule(
        "optionStatement",
        alt![
            seq![
                alt![
                    kw("message"),
                    kw("prompt"),
                    kw("menu"),
                    kw("comment"),
                    kw("error"),
                    kw("form"),
                ],
                kw("line"),
                nt("expression"),
            ],
            seq![
                alt![
                    kw("insert"),
                    kw("delete"),
                    kw("next"),
                    kw("previous"),
                    kw("accept"),
                    kw("help"),
                ],
                kw("key"),
                nt("expression"),
            ],
            seq![kw("input"), alt![kw("wrap"), kws("no wrap")]],
            seq![kws("help file"), nt("expression")],
            seq![alt![kw("input"), kw("display")], nt("attributeList")],
            seq![kws("sql interrupt"), alt![kw("on"), kw("off")]],
            seq![
                kws("field order"),
                alt![kw("constrained"), kw("unconstrained")],
            ],
        ],
    );
}
