#[cfg(test)]
mod parser_tests {
    use indoc::indoc;
    use tinypy as py;

    use py::ast_printer::AstPrinter;
    use py::error::{PyError, Result};
    use py::parser::Parser;
    use py::scanner::Scanner;
    use py::stmt::{Program, Stmt};

    fn parse(source: &str) -> Result<Program> {
        let tokens = Scanner::new(source.as_bytes()).scan_all()?;
        Parser::new(tokens).parse()
    }

    fn print_program(source: &str) -> String {
        let program = parse(source).expect("source should parse");
        AstPrinter::print_program(&program)
    }

    fn print_expression(source: &str) -> String {
        let tokens = Scanner::new(source.as_bytes())
            .scan_all()
            .expect("source should scan");
        let expr = Parser::new(tokens)
            .parse_expression()
            .expect("expression should parse");

        AstPrinter::print(&expr)
    }

    fn parse_error(source: &str) -> PyError {
        parse(source).expect_err("source should be rejected")
    }

    #[test]
    fn test_parser_01_simple_statements() {
        let source = indoc! {"
            x = 1 + 2 * 3
            print x
            pass
        "};

        assert_eq!(
            print_program(source),
            "(= x (+ 1 (* 2 3)))\n(print x)\n(pass)\n"
        );
    }

    #[test]
    fn test_parser_02_power_binds_tighter_than_negation() {
        assert_eq!(print_expression("-2 ** 2"), "(- (** 2 2))");
        assert_eq!(print_expression("2 ** -1"), "(** 2 (- 1))");
    }

    #[test]
    fn test_parser_03_power_is_right_associative() {
        assert_eq!(print_expression("2 ** 3 ** 2"), "(** 2 (** 3 2))");
    }

    #[test]
    fn test_parser_04_not_sits_below_comparison() {
        assert_eq!(print_expression("not a == b"), "(not (== a b))");
        assert_eq!(
            print_expression("a or b and not c"),
            "(or a (and b (not c)))"
        );
    }

    #[test]
    fn test_parser_05_arithmetic_is_left_associative() {
        assert_eq!(print_expression("10 - 4 - 3"), "(- (- 10 4) 3)");
        assert_eq!(print_expression("7 // 2 % 3 / 1"), "(/ (% (// 7 2) 3) 1)");
        assert_eq!(print_expression("(1 + 2) * 3"), "(* (+ 1 2) 3)");
    }

    #[test]
    fn test_parser_06_calls_and_properties() {
        assert_eq!(
            print_expression("p.x = f(1, 'a').y"),
            "(.= p x (. (call f 1 \"a\") y))"
        );
        assert_eq!(print_expression("a = b = c"), "(= a (= b c))");
    }

    #[test]
    fn test_parser_07_if_elif_else_chain() {
        let source = indoc! {"
            if x < 1:
                print 'small'
            elif x < 10:
                print 'medium'
            elif x < 100:
                print 'large'
            else:
                print 'huge'
        "};

        let program = parse(source).expect("source should parse");

        assert_eq!(program.statements.len(), 1);

        match &program.statements[0] {
            Stmt::If {
                elif_branches,
                else_branch,
                ..
            } => {
                assert_eq!(elif_branches.len(), 2);
                assert!(else_branch.is_some());
            }
            other => panic!("expected if statement, got {:?}", other),
        }

        assert_eq!(
            AstPrinter::print_program(&program),
            indoc! {r#"
                (if (< x 1)
                  (print "small")
                (elif (< x 10)
                  (print "medium")
                (elif (< x 100)
                  (print "large")
                (else
                  (print "huge")
            "#}
        );
    }

    #[test]
    fn test_parser_08_class_with_methods() {
        let source = indoc! {"
            class Point():
                def __init__(self, x):
                    self.x = x
                    return

                def get(self):
                    return self.x
        "};

        assert_eq!(
            print_program(source),
            indoc! {"
                (class Point
                  (def __init__ (self x)
                    (.= self x x)
                    (return)
                  (def get (self)
                    (return (. self x))
            "}
        );
    }

    #[test]
    fn test_parser_09_single_line_suite() {
        let source = indoc! {"
            while x: x = x - 1
            if done: break
        "};

        assert_eq!(
            print_program(source),
            "(while x\n  (= x (- x 1))\n(if done\n  (break)\n"
        );
    }

    #[test]
    fn test_parser_10_invalid_assignment_target() {
        let err = parse_error("1 = 2\n");

        assert!(matches!(err, PyError::InvalidAssignmentTarget { line: 1 }));
        assert!(err.is_syntax_error());

        assert!(matches!(
            parse_error("f() = 3\n"),
            PyError::InvalidAssignmentTarget { .. }
        ));
    }

    #[test]
    fn test_parser_11_missing_colon() {
        let err = parse_error("if x\n    pass\n");

        assert!(matches!(err, PyError::Parse { line: 1, .. }));
        assert!(err.to_string().contains("Expected ':'"), "got: {}", err);
    }

    #[test]
    fn test_parser_12_missing_block() {
        let err = parse_error("def f():\nprint 1\n");

        assert!(
            err.to_string().contains("Expected an indented block"),
            "got: {}",
            err
        );
    }

    #[test]
    fn test_parser_13_unexpected_indent() {
        let err = parse_error("  x = 1\n");

        assert!(err.to_string().contains("Unexpected indent"), "got: {}", err);
    }

    #[test]
    fn test_parser_14_trailing_tokens() {
        let err = parse_error("x = 1 y\n");
        assert!(err.to_string().contains("Expected end of line"), "got: {}", err);

        let err = parse_error("print (1 + 2\n");
        assert!(err.to_string().contains("Expected ')'"), "got: {}", err);
    }

    #[test]
    fn test_parser_15_empty_program() {
        let program = parse("\n# only a comment\n\n").expect("empty program parses");

        assert!(program.statements.is_empty());
    }

    #[test]
    fn test_parser_16_program_serializes_to_json() {
        let program = parse("print 1\n").expect("source should parse");
        let json = serde_json::to_value(&program).expect("AST serializes");

        let statements = json["statements"]
            .as_array()
            .expect("statements array");

        assert_eq!(statements.len(), 1);
        assert!(statements[0].get("Print").is_some(), "got: {}", json);
    }
}
