#![cfg_attr(tarpaulin, skip)]

use std::sync::Arc;

use super::*;
use crate::parse;
use crate::symbol::Obarray;
use crate::value::Placeholder;

fn heap() -> Heap {
    Heap::with_obarray(Arc::new(Obarray::new()))
}

fn reprint_with(text: &str, options: Options) -> String {
    let mut heap = heap();
    let value = parse::from_str(&mut heap, text).unwrap();
    to_string_custom(&heap, &value, options).unwrap()
}

fn reprint(text: &str) -> String {
    let mut heap = heap();
    let value = parse::from_str(&mut heap, text).unwrap();
    to_string(&heap, &value).unwrap()
}

#[test]
fn test_canonical_text_is_reproduced() {
    for text in &[
        "nil",
        "t",
        ":key",
        "42",
        "-7",
        "123456789012345678901234567890",
        "1.5",
        "-0.0",
        "1.0e+INF",
        "0.0e+NaN",
        "\"hello\"",
        "(a b c)",
        "(a . b)",
        "(a b . c)",
        "[1 [2] \"x\"]",
        "#s(foo 1 2)",
        "'a",
        "#'car",
        "`(a ,b ,@c)",
        "(quote a b)",
        "(quote . a)",
        "#&5\"\\037\"",
        "#s(hash-table test equal data (a 1 b 2))",
        "#s(hash-table weakness key)",
        "#s(hash-table)",
        "##",
    ] {
        assert_eq!(reprint(text), *text);
    }
}

#[test]
fn test_numbers() {
    assert_eq!(reprint("1e3"), "1000.0");
    assert_eq!(reprint("+5"), "5");
    assert_eq!(reprint("1."), "1");
    assert_eq!(reprint("#x-FF"), "-255");
}

#[test]
fn test_radix() {
    for (radix, text, expected) in &[
        (16, "255", "#xff"),
        (16, "-255", "#x-ff"),
        (8, "8", "#o10"),
        (2, "5", "#b101"),
        (3, "5", "#3r12"),
        (16, "1.5", "1.5"),
        (16, "#x10000000000000000", "#x10000000000000000"),
    ] {
        let options = Options::new().with_radix(*radix);
        assert_eq!(reprint_with(text, options), *expected);
    }
    assert_eq!(Options::new().with_radix(37).radix(), 10);
}

#[test]
fn test_characters() {
    for (text, expected) in &[
        ("?a", "?a"),
        ("?\\(", "?\\("),
        ("?\\;", "?\\;"),
        ("?\\\\", "?\\\\"),
        ("?\\n", "?\\n"),
        ("? ", "?\\s"),
        ("?\\C-a", "?\\^A"),
        ("?\\^@", "?\\^@"),
        ("?\\^\\\\", "?\\^\\\\"),
        ("?\\d", "?\\d"),
        ("?\\N{GREEK SMALL LETTER ALPHA}", "?α"),
        ("?\\x85", "?\\x85"),
    ] {
        assert_eq!(reprint(text), *expected, "{}", text);
        assert_eq!(reprint(expected), *expected, "{}", expected);
    }
}

#[test]
fn test_char_syntax_integer() {
    let options = Options::new().with_char_syntax(CharSyntax::Integer);
    assert_eq!(reprint_with("(?a ?\\n)", options), "(97 10)");
}

#[test]
fn test_str_escapes_default() {
    // Only quotes and backslashes are escaped; everything else is written
    // as is.
    assert_eq!(
        reprint("\"a\\\"b\\\\c\\nd\\te\\001\""),
        "\"a\\\"b\\\\c\nd\te\u{1}\""
    );
}

#[test]
fn test_str_escapes_options() {
    let options = Options::new()
        .with_escape_newlines(true)
        .with_escape_control_characters(true);
    assert_eq!(
        reprint_with("\"a\\nb\\fc\\td\\de\"", options),
        "\"a\\nb\\fc\\011d\\177e\""
    );

    let options = Options::new().with_escape_control_characters(true);
    assert_eq!(reprint_with("\"a\\nb\\tc\"", options), "\"a\nb\\011c\"");
}

#[test]
fn test_unibyte_strings() {
    assert_eq!(reprint("\"\\377a\\\"\""), "\"\\377a\\\"\"");
    assert_eq!(reprint("\"\\x80\\n\""), "\"\\200\\012\"");
    let mut heap = heap();
    assert_eq!(
        to_string(&heap, &Value::bytes(vec![b'x', 0u8, 0xe9u8])).unwrap(),
        "\"x\\000\\351\""
    );
    let code = parse::from_str(&mut heap, "#[(x) \"\\10\\211\" [] 2]").unwrap();
    assert_eq!(to_string(&heap, &code).unwrap(), "#[(x) \"\\010\\211\" [] 2]");
}

#[test]
fn test_symbol_escapes() {
    for (text, expected) in &[
        ("foo\\ bar", "foo\\ bar"),
        ("\\1", "\\1"),
        ("\\-1.5", "\\-1.5"),
        ("\\?x", "\\?x"),
        ("\\.", "\\."),
        ("a\\#b", "a\\#b"),
        ("a\\(b\\)", "a\\(b\\)"),
        ("a\\\\b", "a\\\\b"),
        ("a?b.c", "a?b.c"),
        ("-", "-"),
        ("1+", "1+"),
        ("\\`", "\\`"),
    ] {
        assert_eq!(reprint(text), *expected, "{}", text);
    }
}

#[test]
fn test_quoted_option() {
    let options = Options::new().with_quoted(false);
    assert_eq!(reprint_with("'a", options), "(quote a)");
    assert_eq!(reprint_with("#'f", options), "(function f)");
    assert_eq!(reprint_with("`(,a)", options), "(\\` ((\\, a)))");
}

#[test]
fn test_comma_before_at_sign_is_not_abbreviated() {
    assert_eq!(reprint("(\\, @x)"), "(\\, @x)");
    assert_eq!(reprint(",x"), ",x");
}

#[test]
fn test_cycles_without_circle() {
    for (text, expected) in &[
        ("#1=(a . #1#)", "(a . #0)"),
        ("#1=(a #1#)", "(a #0)"),
        ("#1=[a #1#]", "[a #0]"),
        ("#1=(a [#1#])", "(a [#0])"),
        ("(x . #1=(a b . #1#))", "(x a b . #1)"),
        ("(#1=(y) #1#)", "((y) (y))"),
    ] {
        assert_eq!(reprint(text), *expected, "{}", text);
    }
}

#[test]
fn test_circle() {
    let options = Options::new().with_circle(true);
    for (text, expected) in &[
        ("#1=(a . #1#)", "#1=(a . #1#)"),
        ("#1=(a #1#)", "#1=(a #1#)"),
        ("(#1=(y) #1#)", "(#1=(y) #1#)"),
        ("(#1=(b) a . #1#)", "(#1=(b) a . #1#)"),
        ("(#5=[x] #7=[y] #7# #5#)", "(#1=[x] #2=[y] #2# #1#)"),
        ("'#1=(a . #1#)", "'#1=(a . #1#)"),
        ("(a b)", "(a b)"),
        ("#s(hash-table data (k #1=(v) j #1#))", "#s(hash-table data (k #1=(v) j #1#))"),
    ] {
        assert_eq!(reprint_with(text, options), *expected, "{}", text);
    }
}

#[test]
fn test_circle_keeps_labels_visible() {
    // The tail `(x)` is shared, so `'x` would hide its label.
    let mut heap = heap();
    let x = heap.symbol("x");
    let tail = heap.list(vec![x]);
    let quote = heap.symbol("quote");
    let form = heap.cons(quote, tail.clone());
    let root = heap.list(vec![form, tail]);
    let options = Options::new().with_circle(true);
    assert_eq!(
        to_string_custom(&heap, &root, options).unwrap(),
        "((quote . #1=(x)) #1#)"
    );
}

#[test]
fn test_gensym() {
    let mut heap = heap();
    let value = parse::from_str(&mut heap, "(#:g #: g)").unwrap();
    assert_eq!(to_string(&heap, &value).unwrap(), "(g ## g)");
    let options = Options::new().with_gensym(true);
    assert_eq!(
        to_string_custom(&heap, &value, options).unwrap(),
        "(#:g #: g)"
    );

    let gensym = Value::Symbol(Symbol::uninterned("g"));
    let shared = heap.list(vec![gensym.clone(), gensym]);
    let options = Options::new().with_gensym(true).with_circle(true);
    assert_eq!(
        to_string_custom(&heap, &shared, options).unwrap(),
        "(#1=#:g #1#)"
    );
}

#[test]
fn test_princ() {
    let options = Options::princ();
    assert!(!options.escape());
    assert_eq!(
        reprint_with("(\"a\\\"b\" foo\\ bar ?x)", options),
        "(a\"b foo bar x)"
    );

    let heap = heap();
    let err = to_string_custom(&heap, &Value::bytes(vec![0xffu8]), options).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert_eq!(
        to_vec_custom(&heap, &Value::bytes(vec![0xffu8]), options).unwrap(),
        vec![0xffu8]
    );
}

#[test]
fn test_placeholders_are_not_printable() {
    let heap = heap();
    let err = to_string(&heap, &Value::Placeholder(Placeholder::new(0))).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn test_printer_reuse() {
    let mut heap = heap();
    let a = parse::from_str(&mut heap, "#1=(#1#)").unwrap();
    let b = parse::from_str(&mut heap, "(x)").unwrap();
    let mut printer = Printer::with_options(Vec::new(), Options::new().with_circle(true));
    printer.print(&heap, &a).unwrap();
    printer.print(&heap, &b).unwrap();
    printer.print(&heap, &a).unwrap();
    let text = String::from_utf8(printer.into_inner()).unwrap();
    assert_eq!(text, "#1=(#1#)(x)#1=(#1#)");
}

#[test]
fn test_custom_formatter() {
    struct NilAsEmptyList;

    impl Formatter for NilAsEmptyList {
        fn write_nil<W>(&mut self, writer: &mut W) -> io::Result<()>
        where
            W: ?Sized + io::Write,
        {
            writer.write_all(b"()")
        }
    }

    let mut heap = heap();
    let value = parse::from_str(&mut heap, "(nil [nil])").unwrap();
    let mut printer = Printer::with_formatter(Vec::new(), NilAsEmptyList);
    printer.print(&heap, &value).unwrap();
    assert_eq!(printer.into_inner(), b"(() [()])");
}

#[test]
fn test_nesting_limit() {
    fn nested_vectors(heap: &mut Heap, depth: usize) -> Value {
        let mut value = heap.vector(vec![]);
        for _ in 1..depth {
            value = heap.vector(vec![value]);
        }
        value
    }

    let mut heap = heap();
    let deepest = nested_vectors(&mut heap, MAX_DEPTH);
    let text = to_string(&heap, &deepest).unwrap();
    assert_eq!(text.len(), 2 * MAX_DEPTH);
    assert!(text.starts_with("[[[") && text.ends_with("]]]"));

    let too_deep = nested_vectors(&mut heap, MAX_DEPTH + 1);
    let err = to_string(&heap, &too_deep).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::Other);

    let mut list = Value::Nil;
    for _ in 0..MAX_DEPTH + 1 {
        list = heap.list(vec![list]);
    }
    assert!(to_string(&heap, &list).is_err());
}

#[test]
fn test_long_lists_are_not_nesting() {
    let mut heap = heap();
    let list = heap.list((0..100_000).map(Value::from));
    let text = to_string(&heap, &list).unwrap();
    assert!(text.starts_with("(0 1 2 ") && text.ends_with(" 99999)"));
}
