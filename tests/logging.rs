#[cfg(test)]
mod logging_tests {
    use indoc::indoc;
    use tinypy as py;

    use py::interpreter::Interpreter;
    use py::parser::Parser;
    use py::scanner::Scanner;

    /// Every `debug!` call formats its arguments under this logger.
    fn init_debug_logger() {
        let _ = env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }

    fn run_logged(source: &str) -> String {
        init_debug_logger();

        let tokens = Scanner::new(source.as_bytes())
            .scan_all()
            .expect("source should scan");
        let program = Parser::new(tokens).parse().expect("source should parse");

        let mut interpreter = Interpreter::with_output(Vec::new());
        interpreter.interpret(&program).expect("program should run");

        String::from_utf8(interpreter.into_output()).expect("print output is UTF-8")
    }

    #[test]
    fn test_logging_01_self_referencing_instance_returned_from_function() {
        let source = indoc! {"
            class N:
                pass

            n = N()
            n.me = n

            def f():
                return n

            print f()
            print f().me.me
        "};

        assert_eq!(run_logged(source), "<N object>\n<N object>\n");
    }

    #[test]
    fn test_logging_02_cycle_through_two_instances() {
        let source = indoc! {"
            class Node:
                def __init__(self, name):
                    self.name = name

            a = Node('a')
            b = Node('b')
            a.next = b
            b.next = a

            def walk(node, steps):
                while steps > 0:
                    node = node.next
                    steps = steps - 1
                    if steps == 1:
                        break
                return node

            print walk(a, 3).name
        "};

        assert_eq!(run_logged(source), "a\n");
    }
}
