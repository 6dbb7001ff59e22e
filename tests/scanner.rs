#[cfg(test)]
mod scanner_tests {
    use indoc::indoc;
    use tinypy as py;

    use py::error::PyError;
    use py::scanner::*;
    use py::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(
            tokens.len(),
            expected.len(),
            "token count mismatch: {:?}",
            tokens
        );

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    fn token_types(source: &str) -> Vec<TokenType> {
        Scanner::new(source.as_bytes())
            .scan_all()
            .expect("source should scan")
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "(:*.,+-%)",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::COLON, ":"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::MINUS, "-"),
                (TokenType::PERCENT, "%"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::NEWLINE, ""),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_doubled_operators() {
        assert_token_sequence(
            "a ** b // c != d <= e >= f == g = h < i > j / k",
            &[
                (TokenType::NAME, "a"),
                (TokenType::DOUBLE_STAR, "**"),
                (TokenType::NAME, "b"),
                (TokenType::DOUBLE_SLASH, "//"),
                (TokenType::NAME, "c"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::NAME, "d"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::NAME, "e"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::NAME, "f"),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::NAME, "g"),
                (TokenType::EQUAL, "="),
                (TokenType::NAME, "h"),
                (TokenType::LESS, "<"),
                (TokenType::NAME, "i"),
                (TokenType::GREATER, ">"),
                (TokenType::NAME, "j"),
                (TokenType::SLASH, "/"),
                (TokenType::NAME, "k"),
                (TokenType::NEWLINE, ""),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_literals() {
        assert_token_sequence(
            "while not done and True or None: print 3.25 + 7 # trailing",
            &[
                (TokenType::WHILE, "while"),
                (TokenType::NOT, "not"),
                (TokenType::NAME, "done"),
                (TokenType::AND, "and"),
                (TokenType::TRUE, "True"),
                (TokenType::OR, "or"),
                (TokenType::NONE, "None"),
                (TokenType::COLON, ":"),
                (TokenType::PRINT, "print"),
                (TokenType::FLOAT, "3.25"),
                (TokenType::PLUS, "+"),
                (TokenType::INT, "7"),
                (TokenType::NEWLINE, ""),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_indent_and_dedent() {
        let source = indoc! {"
            if x:
                y = 1
            print y
        "};

        assert_token_sequence(
            source,
            &[
                (TokenType::IF, "if"),
                (TokenType::NAME, "x"),
                (TokenType::COLON, ":"),
                (TokenType::NEWLINE, "\n"),
                (TokenType::INDENT, ""),
                (TokenType::NAME, "y"),
                (TokenType::EQUAL, "="),
                (TokenType::INT, "1"),
                (TokenType::NEWLINE, "\n"),
                (TokenType::DEDENT, ""),
                (TokenType::PRINT, "print"),
                (TokenType::NAME, "y"),
                (TokenType::NEWLINE, "\n"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_05_closing_two_levels_at_once() {
        let source = indoc! {"
            def f():
                while x:
                    pass
            print 1
        "};

        assert_eq!(
            token_types(source),
            vec![
                TokenType::DEF,
                TokenType::NAME,
                TokenType::LEFT_PAREN,
                TokenType::RIGHT_PAREN,
                TokenType::COLON,
                TokenType::NEWLINE,
                TokenType::INDENT,
                TokenType::WHILE,
                TokenType::NAME,
                TokenType::COLON,
                TokenType::NEWLINE,
                TokenType::INDENT,
                TokenType::PASS,
                TokenType::NEWLINE,
                TokenType::DEDENT,
                TokenType::DEDENT,
                TokenType::PRINT,
                TokenType::INT,
                TokenType::NEWLINE,
                TokenType::EOF,
            ]
        );
    }

    #[test]
    fn test_scanner_06_open_blocks_closed_at_eof() {
        assert_eq!(
            token_types("if x:\n    pass"),
            vec![
                TokenType::IF,
                TokenType::NAME,
                TokenType::COLON,
                TokenType::NEWLINE,
                TokenType::INDENT,
                TokenType::PASS,
                TokenType::NEWLINE,
                TokenType::DEDENT,
                TokenType::EOF,
            ]
        );
    }

    #[test]
    fn test_scanner_07_blank_and_comment_lines_keep_indentation() {
        let source = indoc! {"
            if x:
                a = 1

              # an unaligned comment
                b = 2
        "};

        let types = token_types(source);

        assert_eq!(
            types.iter().filter(|t| **t == TokenType::INDENT).count(),
            1
        );
        assert_eq!(
            types.iter().filter(|t| **t == TokenType::DEDENT).count(),
            1
        );
        assert_eq!(
            types.iter().filter(|t| **t == TokenType::NEWLINE).count(),
            3
        );
    }

    #[test]
    fn test_scanner_08_newlines_inside_parentheses() {
        let source = indoc! {"
            total = add(1,
                        2)
            print total
        "};

        let tokens = Scanner::new(source.as_bytes())
            .scan_all()
            .expect("source should scan");

        assert!(!tokens.iter().any(|t| t.token_type == TokenType::INDENT));

        let print = tokens
            .iter()
            .find(|t| t.token_type == TokenType::PRINT)
            .expect("print token");

        assert_eq!(print.line, 3);
    }

    #[test]
    fn test_scanner_09_string_literals() {
        let tokens = Scanner::new(br#"'it\'s' "tab\there""#)
            .scan_all()
            .expect("strings should scan");

        assert!(matches!(&tokens[0].token_type, TokenType::STRING(s) if s == "it's"));
        assert!(matches!(&tokens[1].token_type, TokenType::STRING(s) if s == "tab\there"));
        assert_eq!(tokens[1].lexeme, r#""tab\there""#);
    }

    #[test]
    fn test_scanner_10_unterminated_string() {
        let err = Scanner::new(b"x = 'open\nprint x")
            .scan_all()
            .expect_err("string must not span lines");

        assert!(matches!(err, PyError::Lex { line: 1, .. }));
        assert!(err.to_string().contains("Unterminated string."));
    }

    #[test]
    fn test_scanner_11_inconsistent_dedent() {
        let source = "if x:\n        a = 1\n    b = 2\n";
        let err = Scanner::new(source.as_bytes())
            .scan_all()
            .expect_err("dedent to an unknown level must fail");

        assert!(matches!(err, PyError::Lex { line: 3, .. }));
    }

    #[test]
    fn test_scanner_12_token_display() {
        let tokens = Scanner::new(b"x = 2.0\n")
            .scan_all()
            .expect("source should scan");

        let rendered: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

        assert_eq!(
            rendered,
            vec![
                "NAME x null",
                "EQUAL = null",
                "FLOAT 2.0 2.0",
                "NEWLINE \\n null",
                "EOF  null",
            ]
        );
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(?";
        let scanner = Scanner::new(source.as_bytes());

        // Collect all results (both tokens and errors)
        let results: Vec<_> = scanner.collect();

        // We expect this sequence:
        // 0: COMMA ','
        // 1: DOT '.'
        // 2: Error for '$'
        // 3: LEFT_PAREN '('
        // 4: Error for '?'
        // 5: NEWLINE
        // 6: EOF
        assert_eq!(results.len(), 7, "Expected 7 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::NEWLINE, "");
        assert_token_matches(&results[6], TokenType::EOF, "");

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2, "Expected 2 error messages");

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                err.to_string().contains("Unexpected character"),
                "Error message should contain 'Unexpected character', got: {}",
                err
            );
        }

        fn assert_token_matches(
            result: &Result<Token, PyError>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(
                        token.token_type, expected_type,
                        "Expected token type {:?}, got {:?}",
                        expected_type, token.token_type
                    );
                    assert_eq!(
                        token.lexeme, expected_lexeme,
                        "Expected lexeme '{}', got '{}'",
                        expected_lexeme, token.lexeme
                    );
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }
}
