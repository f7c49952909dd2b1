// Integration tests for parsing and reconstruction

use std::fs;
use std::path::Path;

use cpprecon::parser::ast::*;
use cpprecon::{parse_file, parse_str, BraceStyle, Error, Writer, WriterOptions};

/// Parse, render, re-parse; the two units must be structurally equal
fn round_trip_with(source: &str, options: WriterOptions) -> String {
    let unit = parse_str(source).expect("Parsing failed");
    let text = Writer::new(options).render(&unit);
    let reparsed = parse_str(&text).unwrap_or_else(|e| panic!("Reconstruction does not parse: {}\n{}", e, text));
    assert_eq!(unit, reparsed, "Reconstruction changed structure:\n{}", text);
    text
}

fn round_trip(source: &str) -> String {
    round_trip_with(source, WriterOptions::default())
}

fn function_body(unit: &ProgramUnit, index: usize) -> &Block {
    match &unit.declarations[index].kind {
        DeclKind::Function(FunctionDecl {
            body: FunctionBody::Defined(block),
            ..
        }) => block,
        other => panic!("Expected function definition, got {:?}", other),
    }
}

#[test]
fn test_main_function_scenario() {
    let source = "int main(int argc, char* argv[]) { return 0; }";
    let unit = parse_str(source).expect("Parsing failed");

    assert_eq!(unit.declarations.len(), 1);
    let DeclKind::Function(func) = &unit.declarations[0].kind else {
        panic!("Expected function");
    };
    assert_eq!(unit.declarations[0].name(), "main");
    assert_eq!(func.params.len(), 2);

    let body = function_body(&unit, 0);
    assert_eq!(body.statements.len(), 1);
    assert_eq!(body.statements[0].kind, StmtKind::Return(Some(Expr::int("0"))));

    let text = round_trip(source);
    assert!(text.starts_with("int main(int argc, char* argv[])\n{\n  return 0;\n}"), "{}", text);
}

#[test]
fn test_missing_closing_brace_points_at_end_of_file() {
    let source = "int helper() { return 1; }\n\nint main() {\n  int x = helper();\n  return x;\n";
    let err = parse_str(source).unwrap_err();
    assert_eq!(err.line(), 6);
    assert_eq!(err.found, "end of file");
}

#[test]
fn test_error_reported_inside_offending_construct() {
    let source = "int a;\nint f() {\n  return 1 +;\n}\nint b;\n";
    let err = parse_str(source).unwrap_err();
    assert_eq!(err.line(), 3);
    assert!(err.column() > 1, "column {}", err.column());
}

#[test]
fn test_multiplication_binds_tighter_after_round_trip() {
    let text = round_trip("int x = a + b * c;");
    let unit = parse_str(&text).unwrap();
    let DeclKind::Variable(var) = &unit.declarations[0].kind else {
        panic!("Expected variable");
    };
    let Some(Initializer::Assign(Expr::Binary { op, right, .. })) = &var.declarators[0].init else {
        panic!("Expected binary initializer");
    };
    assert_eq!(*op, BinOp::Add);
    assert!(matches!(**right, Expr::Binary { op: BinOp::Mul, .. }));

    let text = round_trip("int y = (a + b) * c;");
    assert!(text.contains("(a + b) * c"), "{}", text);
}

#[test]
fn test_declaration_expression_ambiguity_survives() {
    round_trip(
        "struct Foo {};\n\
         void f(int a, int b) {\n\
           Foo * p;\n\
           a * b;\n\
           Foo q(a);\n\
           Foo r(Foo());\n\
           a < b;\n\
         }\n",
    );
}

#[test]
fn test_nested_templates_and_comparisons() {
    round_trip(
        "#include <map>\n\
         std::map<int, std::vector<std::pair<int, int>>> table;\n\
         bool check(int a, int b, int c) { return a < b && b > c; }\n\
         template <int N> struct Bits { static constexpr int value = (N > 2) ? 1 : 0; };\n\
         Bits<(3 > 2)> bits;\n",
    );
}

#[test]
fn test_brace_style_and_indent_options() {
    let options = WriterOptions {
        indent_width: 4,
        brace_style: BraceStyle::SameLine,
    };
    let text = round_trip_with("namespace n { struct S { int f() { while (true) { break; } return 1; } }; }", options);
    let expected = "\
namespace n {
struct S {
    int f() {
        while (true) {
            break;
        }
        return 1;
    }
};
}
";
    assert_eq!(text, expected);
}

#[test]
fn test_fixture_files_round_trip() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut seen = 0;
    for entry in fs::read_dir(&dir).expect("fixture directory") {
        let path = entry.expect("fixture entry").path();
        if path.extension().and_then(|e| e.to_str()) != Some("cpp") {
            continue;
        }
        seen += 1;
        let unit = parse_file(&path).unwrap_or_else(|e| panic!("{}: {:?}", path.display(), e));
        for options in [
            WriterOptions::default(),
            WriterOptions {
                indent_width: 4,
                brace_style: BraceStyle::SameLine,
            },
        ] {
            let writer = Writer::new(options);
            let text = writer.render(&unit);
            let reparsed = parse_str(&text).unwrap_or_else(|e| panic!("{}: {}\n{}", path.display(), e, text));
            assert_eq!(unit, reparsed, "{} changed structure:\n{}", path.display(), text);
            // Writing the reconstruction again changes nothing
            assert_eq!(writer.render(&reparsed), text, "{} is not stable", path.display());
        }
    }
    assert!(seen >= 3, "expected fixture files in {}", dir.display());
}

#[test]
fn test_fixture_comments_survive() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let unit = parse_file(dir.join("shapes.cpp")).unwrap();
    let text = Writer::default().render(&unit);
    assert!(text.starts_with("// Shape hierarchy with virtual dispatch\n#include <cmath>\n"));
    assert!(text.contains("} // namespace geometry\n"), "{}", text);
}

#[test]
fn test_parse_file_distinguishes_io_and_syntax_errors() {
    let missing = parse_file("/nonexistent/input.cpp").unwrap_err();
    assert!(matches!(missing, Error::Io { .. }));
    assert_eq!(missing.to_string(), "Cannot open: /nonexistent/input.cpp");
    assert!(missing.parse_error().is_none());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.cpp");
    fs::write(&path, "class A {\n  int x\n};\n").unwrap();
    let broken = parse_file(&path).unwrap_err();
    assert!(matches!(broken, Error::Parse { .. }));
    assert_eq!(broken.parse_error().map(|e| e.line()), Some(3));
}
