//! Statement parsing, aggregation and canonical layout

use cfml_parser::cfml::testing::{assert_stmt, parse_script};
use cfml_parser::{AstNode, StatementKind};
use rstest::rstest;

#[rstest]
#[case::expression("x = 1;", "x = 1;")]
#[case::if_else("if (a) b(); else c();", "if (a) b(); else c();")]
#[case::else_binds_inner("if (a) if (b) c(); else d();", "if (a) if (b) c(); else d();")]
#[case::braced_then("if (a) { if (b) c(); } else d();", "if (a) {\n\tif (b) c();\n} else d();")]
#[case::while_loop("while (i < 10) i++;", "while (i<10) i++;")]
#[case::do_while("do { i++; } while (i < 3);", "do {\n\ti++;\n} while (i<3);")]
#[case::for_loop("for (i = 0; i < 10; i++) x();", "for (i = 0;i<10;i++) x();")]
#[case::empty_for("for (;;) break;", "for (;;) break;")]
#[case::for_in("for (var k in coll) total += k;", "for (var k in coll) total += k;")]
#[case::import("import a.b.*;", "import a.b.*;")]
#[case::include("include 'x.cfm';", "include 'x.cfm';")]
#[case::throw("throw 'boom';", "throw 'boom';")]
#[case::abort("abort;", "abort;")]
#[case::empty(";", ";")]
#[case::try_catch_finally(
    "try { a(); } catch (any e) { b(); } finally { c(); }",
    "try {\n\ta();\n} catch (any e) {\n\tb();\n} finally {\n\tc();\n}"
)]
#[case::quoted_catch_type("try { a(); } catch (\"my.Error\" e) { }", "try {\n\ta();\n} catch (my.Error e) {\n}")]
#[case::lock("lock name='a' timeout=5 { x(); }", "lock name='a' timeout=5 {\n\tx();\n}")]
#[case::param_shorthand("param numeric id = 0;", "param default=0 name='id' type='numeric';")]
#[case::property_shorthand("property string title;", "property name='title' type='string';")]
#[case::thread("thread name='t' { work(); }", "thread name='t' {\n\twork();\n}")]
fn test_statement_layout(#[case] source: &str, #[case] expected: &str) {
    assert_stmt(&parse_script(source))
        .statement_count(1)
        .decompiles_to(expected);
}

#[test]
fn test_switch_cases_keep_declared_order() {
    let script = parse_script("switch(x){case 'a': break; default: y;}");
    assert_stmt(&script).statement(0, |switch| {
        switch
            .kind("Switch")
            .child(0, |case| {
                case.kind("Case").child(0, |body| {
                    body.kind("Break");
                });
            })
            .child(1, |default| {
                default.kind("Case");
            })
            .decompiles_to("switch (x) {\n\tcase 'a':\n\t\tbreak;\n\tdefault:\n\t\ty;\n}");
    });

    let StatementKind::Switch(switch) = &script.as_compound().unwrap().statements[0].kind else {
        panic!("expected a switch");
    };
    assert_eq!(switch.cases.len(), 2);
    assert!(switch.default_case().is_some());
}

#[test]
fn test_function_declarations_are_hoisted() {
    let script = parse_script("x = 1;\nfunction f(a) { return a; }\ny = 2;\nfunction g() {}");
    assert_stmt(&script)
        .statement_count(4)
        .statement(0, |first| {
            first.function("f", &["a"]).at(2, 0);
        })
        .statement(1, |second| {
            second.function("g", &[]);
        })
        .statement(2, |third| {
            third.kind("ExpressionStatement").at(1, 0);
        });

    let text = script.decompile(0).unwrap();
    assert!(text.starts_with("public function f(a) {\n\treturn a;\n}\npublic function g() {\n}\nx = 1;"));
}

#[test]
fn test_hoisting_inside_blocks() {
    assert_stmt(&parse_script("if (a) { b(); function inner() { } }")).statement(0, |stmt| {
        stmt.kind("If").child(0, |block| {
            block
                .kind("Compound")
                .statement_count(2)
                .statement(0, |first| {
                    first.function("inner", &[]);
                });
        });
    });
}

#[test]
fn test_component_layout() {
    let source = r#"component extends="Base" accessors=true {
    property name="id" type="numeric";

    function init() {
        return this;
    }

    private string function greet(required string name, greeting = "Hi") {
        var message = greeting & " " & name;
        return message;
    }
}"#;
    let script = parse_script(source);
    assert_stmt(&script).statement(0, |component| {
        component.kind("Component").attribute("extends", "'Base'");
    });

    insta::assert_snapshot!(script.decompile(0).unwrap(), @r###"
component accessors=true extends='Base' {
	public function init() {
		return this;
	}
	private string function greet(required string name,greeting='Hi') {
		var message = greeting&' '&name;
		return message;
	}
	property name='id' type='numeric';
}
"###);
}

#[test]
fn test_interface_and_function_metadata() {
    let script = parse_script("interface { public void function run() output=false {} }");
    assert_stmt(&script).statement(0, |interface| {
        interface.kind("Interface").child(0, |body| {
            body.statement(0, |function| {
                function
                    .function("run", &[])
                    .decompiles_to("public void function run() output=false {\n}");
            });
        });
    });
}

#[test]
fn test_tag_keywords_used_as_variables() {
    assert_stmt(&parse_script("param = 5;\nparam += 1;"))
        .statement_count(2)
        .statement(0, |first| {
            first.kind("ExpressionStatement").decompiles_to("param = 5;");
        });
}

#[test]
fn test_block_or_struct() {
    assert_stmt(&parse_script("{ a = 1; }"))
        .statement(0, |block| {
            block.kind("Compound").statement_count(1);
        });

    assert_stmt(&parse_script("{a: 1};")).statement(0, |statement| {
        statement.kind("ExpressionStatement").expression(|expr| {
            expr.kind("Struct");
        });
    });
}
