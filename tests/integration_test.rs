use {
    kart::{
        parse::{
            def_recognizer,
            grammar::{GrammarBuilder, SymbolKind},
        },
        source::{FileSource, StrSource},
        QueryMetrics, QueryRunner,
    },
    std::{error::Error, path::Path},
};

#[test]
fn test_anbn() {
    test_queries("anbn", "YES\nYES\nYES\nNO\nNO\nNO\n");
}

#[test]
fn test_arith() {
    test_queries("arith", "YES\nYES\nYES\nNO\nNO\nNO\nNO\n");
}

#[test]
fn test_brackets() {
    test_queries("brackets", "YES\nYES\nYES\nYES\nNO\nNO\n");
}

#[test]
fn test_bad_rule() {
    //setup
    let mut source = FileSource::new(&fixture("grammars", "bad_rule"));

    //exercise
    let res = QueryRunner::build(&mut source);

    //verify
    let mut err: &dyn Error = &res.err().unwrap();
    assert_eq!(
        format!("{}", err),
        "Failed to parse grammar specification: rule number 3 is wrong: \
         expected '->' but found '=>'"
    );

    err = err.source().unwrap();
    assert_eq!(
        format!("{}", err),
        "rule number 3 is wrong: expected '->' but found '=>'"
    );
}

#[test]
fn test_grammar_reused_across_inputs() {
    //setup
    let qr = QueryRunner::build(&mut FileSource::new(&fixture("grammars", "arith"))).unwrap();

    //exercise
    let first = qr.accepts("a*(a+a)");
    let rejected = qr.accepts("a*(a+a");
    let second = qr.accepts("a*(a+a)");

    //verify
    assert!(first);
    assert!(!rejected);
    assert!(second);
    assert_eq!(qr.grammar().classify(&'E'), SymbolKind::NonTerminal);
    assert_eq!(qr.grammar().classify(&'+'), SymbolKind::Terminal);
    assert_eq!(qr.grammar().classify(&'-'), SymbolKind::Undefined);
}

#[test]
fn test_long_input() {
    //setup
    let qr = QueryRunner::build(&mut FileSource::new(&fixture("grammars", "anbn"))).unwrap();
    let word = "a".repeat(300) + &"b".repeat(300);
    let unbalanced = "a".repeat(300) + &"b".repeat(299);

    //exercise
    let accepted = qr.accepts(&word);
    let rejected = qr.accepts(&unbalanced);

    //verify
    assert!(accepted);
    assert!(!rejected);
}

#[test]
fn test_token_grammar() {
    //setup
    let t = |val: &str| val.to_string();
    let mut builder = GrammarBuilder::new();
    builder
        .non_terminal(t("stmt"))
        .non_terminal(t("expr"))
        .terminal(t("let"))
        .terminal(t("id"))
        .terminal(t("="))
        .terminal(t("num"));
    builder
        .from(t("stmt"))
        .to(vec![t("let"), t("id"), t("="), t("expr")]);
    builder
        .from(t("expr"))
        .to(vec![t("id")])
        .to(vec![t("num")]);
    builder.mark_start(&t("stmt"));
    let grammar = builder.build().unwrap();
    let recognizer = def_recognizer::<String>();

    //exercise
    let accepted = recognizer.recognize(&[t("let"), t("id"), t("="), t("num")], &grammar);
    let rejected = recognizer.recognize(&[t("let"), t("="), t("num")], &grammar);

    //verify
    assert!(accepted);
    assert!(!rejected);
}

#[test]
fn test_inline_queries() {
    //setup
    let qr = QueryRunner::build(&mut FileSource::new(&fixture("grammars", "brackets"))).unwrap();
    let mut queries = StrSource::new("3\n  ()  \n)(\n(x)\n");
    let mut out: Vec<u8> = Vec::new();

    //exercise
    let metrics = qr.run(&mut queries, &mut out).unwrap();

    //verify
    assert_eq!(String::from_utf8(out).unwrap(), "YES\nNO\nNO\n");
    assert_eq!(
        metrics,
        QueryMetrics {
            total: 3,
            accepted: 1,
            rejected: 1,
            malformed: 1,
        }
    );
}

fn fixture(dir: &str, name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join(dir)
        .join(format!("{}.txt", name))
}

fn test_queries(grammar: &str, expected: &str) {
    //setup
    let qr = QueryRunner::build(&mut FileSource::new(&fixture("grammars", grammar))).unwrap();
    let mut queries = FileSource::new(&fixture("queries", grammar));
    let mut out: Vec<u8> = Vec::new();

    //exercise
    qr.run(&mut queries, &mut out).unwrap();

    //verify
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}
