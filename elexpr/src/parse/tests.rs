use std::cell::Cell;
use std::io::Cursor;
use std::rc::Rc;
use std::sync::Arc;

use super::*;
use crate::equal::equal;
use crate::hash_table::{HashTest, Weakness};
use crate::load::LoadError;
use crate::symbol::Obarray;
use crate::Number;

fn heap() -> Heap {
    Heap::with_obarray(Arc::new(Obarray::new()))
}

fn read(heap: &mut Heap, s: &str) -> Value {
    from_str(heap, s).unwrap()
}

fn read_err(s: &str) -> Error {
    from_str(&mut heap(), s).unwrap_err()
}

fn syntax_message(s: &str) -> String {
    let err = read_err(s);
    assert!(err.is_syntax(), "{:?} gave {:?}", s, err);
    err.message()
}

fn same(heap: &mut Heap, a: &str, b: &str) -> bool {
    let a = read(heap, a);
    let b = read(heap, b);
    equal(heap, &a, &b)
}

fn elements(heap: &Heap, list: &Value) -> Vec<Value> {
    heap.list_iter(list).cloned().collect()
}

#[test]
fn test_atoms() {
    let mut heap = heap();
    let mut parser = Parser::from_str("foo :key nil () t 100 -42 4.5 1. 1.e3 .5 +1 - 1+ \\1 #_1");
    let foo = heap.symbol("foo");
    let t = heap.symbol("t");
    let expected = vec![
        foo,
        heap.symbol(":key"),
        Value::Nil,
        Value::Nil,
        t,
        Value::from(100),
        Value::from(-42),
        Value::from(4.5),
        Value::from(1),
        Value::from(1000.0),
        Value::from(0.5),
        Value::from(1),
        heap.symbol("-"),
        heap.symbol("1+"),
        heap.symbol("1"),
        heap.symbol("1"),
    ];
    for value in expected {
        assert_eq!(parser.parse(&mut heap).unwrap(), Some(value));
    }
    assert_eq!(parser.parse(&mut heap).unwrap(), None);
    parser.end().unwrap();
    assert!(read(&mut heap, ":key").is_keyword());
}

#[test]
fn test_numbers() {
    let mut heap = heap();
    let big = read(&mut heap, "123456789012345678901234567890");
    assert!(big.as_number().map_or(false, Number::is_bignum));
    assert_eq!(read(&mut heap, "-9223372036854775808"), Value::from(i64::MIN));
    assert_eq!(read(&mut heap, "1.0e+INF").as_f64(), Some(f64::INFINITY));
    assert_eq!(read(&mut heap, "-1.0e+INF").as_f64(), Some(f64::NEG_INFINITY));
    assert!(read(&mut heap, "0.0e+NaN").as_f64().map_or(false, f64::is_nan));
    assert!(read(&mut heap, "-0.0")
        .as_f64()
        .map_or(false, f64::is_sign_negative));
    assert!(read(&mut heap, "1e+INF").is_float());
    assert!(read(&mut heap, ".e5").is_symbol());
}

#[test]
fn test_radix_integers() {
    let mut heap = heap();
    assert_eq!(read(&mut heap, "#x10"), Value::from(16));
    assert_eq!(read(&mut heap, "#Xff"), Value::from(255));
    assert_eq!(read(&mut heap, "#b-101"), Value::from(-5));
    assert_eq!(read(&mut heap, "#o17"), Value::from(15));
    assert_eq!(read(&mut heap, "#24r1k"), Value::from(44));
    assert_eq!(read(&mut heap, "#36rZZ"), Value::from(1295));
    assert!(read(&mut heap, "#x10000000000000000").is_integer());

    assert_eq!(syntax_message("#x"), "integer, radix 16");
    assert_eq!(syntax_message("#b2"), "integer, radix 2");
    assert_eq!(syntax_message("#x1g"), "integer, radix 16");
    assert_eq!(syntax_message("#1r0"), "integer, radix 1");
    assert_eq!(syntax_message("#37r0"), "integer, radix 37");
    assert!(read_err("#").is_eof());
    assert!(read_err("#12").is_eof());
}

#[test]
fn test_characters() {
    let mut heap = heap();
    for (text, code) in [
        ("?a", 97),
        ("? ", 32),
        ("?\t", 9),
        (r"?\n", 10),
        (r"?\a", 7),
        (r"?\e", 27),
        (r"?\s", 32),
        (r"?\d", 127),
        (r"?\(", 40),
        (r"?\C-a", 1),
        (r"?\^a", 1),
        (r"?\^?", 127),
        (r"?\^@", 0),
        (r"?\x41", 65),
        (r"?\xff", 255),
        (r"?\377", 255),
        (r"?\101", 65),
        (r"?é", 0xE9),
        (r"?\U0001F600", 0x1F600),
        (r"?\N{LATIN SMALL LETTER A}", 97),
        ("?\\N{latin small\n   letter a}", 97),
        (r"?\N{U+1F600}", 0x1F600),
        (r"?\N{VARIATION SELECTOR-17}", 0xE0100),
        ("?é", 0xE9),
    ] {
        assert_eq!(read(&mut heap, text), Value::Char(code), "{:?}", text);
    }
}

#[test]
fn test_modifier_characters() {
    let mut heap = heap();
    assert_eq!(read(&mut heap, r"?\M-a"), Value::from(0x800_0061));
    assert_eq!(read(&mut heap, r"?\C-%"), Value::from(0x400_0025));
    assert_eq!(read(&mut heap, r"?\s-a"), Value::from(0x80_0061));
    assert_eq!(read(&mut heap, r"?\A-\H-a"), Value::from(0x140_0061));
    assert_eq!(read(&mut heap, r"?\S-a"), Value::from(0x200_0061));
    assert_eq!(read(&mut heap, r"?\C-\C-a"), Value::from(0x400_0001));
}

#[test]
fn test_character_errors() {
    assert!(read_err("?").is_eof());
    assert!(read_err(r"?\").is_eof());
    assert_eq!(syntax_message("?ab"), "?");
    assert_eq!(syntax_message(r"?\N{}"), "empty character name");
    assert_eq!(syntax_message(r"?\N{NOT A REAL NAME}"), r"\N{NOT A REAL NAME}");
    assert_eq!(syntax_message(r"?\N{U+D800}"), r"\N{U+D800}");
    assert_eq!(syntax_message(r"?\N{U+110000}"), r"\N{U+110000}");
    assert_eq!(syntax_message(r"?\N{VARIATION SELECTOR-0}"), r"\N{VARIATION SELECTOR-0}");
    assert!(read_err("?\\N{caf\u{e9}}").is_syntax());
    for text in [r"?\uD800", r"?\U00110000", r"?\u12g4", r"?\x", r"?\Ma", r"?\C", "?\\\n"] {
        assert!(read_err(text).is_syntax(), "{:?}", text);
    }
    let long_name = format!(r"?\N{{{}}}", "A".repeat(201));
    assert!(read_err(&long_name).is_syntax());
}

#[test]
fn test_unescaped_character_literals() {
    let mut heap = heap();
    let mut parser = Parser::from_str("?( ?a ?] ?\\; (?) ?;)");
    let mut count = 0;
    while let Some(value) = parser.parse(&mut heap).unwrap() {
        assert!(value.is_char() || value.is_cons());
        count += 1;
    }
    assert_eq!(count, 5);
    let seen: String = parser.unescaped_character_literals().collect();
    assert_eq!(seen, "();]");

    let mut parser = Parser::from_str("(?] ?[ ?; ?) ?( ?\")");
    let list = parser.parse(&mut heap).unwrap().unwrap();
    assert_eq!(heap.list_iter(&list).count(), 6);
    let seen: String = parser.unescaped_character_literals().collect();
    assert_eq!(seen, "\"();[]");
}

// This is generic over the parser to allow testing both the slice-based and
// I/O-based `Read` trait implementations.
fn check_strings<F>(parse: F)
where
    F: Fn(&mut Heap, &str) -> Result<Value>,
{
    let mut heap = heap();
    let mut string = |s: &str| parse(&mut heap, s).unwrap();
    assert_eq!(string(r#""A plain string""#), Value::from("A plain string"));
    assert_eq!(
        string(r#""\a\b\t\n\v\f\r\e\"\\\d""#),
        Value::from("\x07\x08\t\n\x0B\x0C\r\x1B\"\\\x7F")
    );
    assert_eq!(string("\"line\\\ncontinued\""), Value::from("linecontinued"));
    assert_eq!(string(r#""\x41\ b""#), Value::from("Ab"));
    assert_eq!(string(r#""\x0e9""#), Value::from("é"));
    assert_eq!(string(r#""é\U0001F600""#), Value::from("é😀"));
    assert_eq!(string(r#""\N{GREEK SMALL LETTER ALPHA}""#), Value::from("α"));
    assert_eq!(string(r#""\s-a""#), Value::from(" -a"));
    assert_eq!(string(r#""\C-a\^@\C- ""#), Value::from("\u{1}\0\0"));
    assert_eq!(string(r#""\S-a\S-B""#), Value::from("AB"));
    assert_eq!(string(r#""\q""#), Value::from("q"));
    assert_eq!(string("\"é\""), Value::from("é"));

    assert_eq!(string(r#""\xe9""#), Value::bytes(vec![0xE9u8]));
    assert_eq!(string(r#""a\351""#), Value::bytes(vec![b'a', 0xE9]));
    assert_eq!(string(r#""\M-a""#), Value::bytes(vec![0xE1u8]));
}

#[test]
fn test_strings_str() {
    check_strings(|heap, s| from_str(heap, s));
}

#[test]
fn test_strings_reader() {
    check_strings(|heap, s| from_reader(heap, Cursor::new(s)));
}

#[test]
fn test_string_errors() {
    assert!(read_err("\"abc").is_eof());
    assert!(read_err("\"abc\\").is_eof());
    assert_eq!(
        syntax_message("\"\u{e9}\\351\""),
        "string mixes raw bytes and non-ASCII characters"
    );
    assert_eq!(syntax_message(r#""\H-a""#), "invalid modifier in string");
    assert_eq!(syntax_message(r#""\M-é""#), "invalid modifier in string");
    assert_eq!(syntax_message(r#""\xd800""#), "non-Unicode character: 0xd800");
    assert!(read_err(r#""\x100000000""#).is_syntax());
}

#[test]
fn test_lists() {
    let mut heap = heap();
    let list = read(&mut heap, "(a b . c)");
    let a = heap.symbol("a");
    let b = heap.symbol("b");
    let c = heap.symbol("c");
    let mut iter = heap.list_iter(&list);
    assert_eq!(iter.next(), Some(&a));
    assert_eq!(iter.next(), Some(&b));
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next(), Some(&c));

    assert!(same(&mut heap, "(a . (b))", "(a b)"));
    assert!(same(&mut heap, "( a\n ;; comment\n b )", "(a b)"));
    assert!(same(&mut heap, "(a .b)", "(a \\.b)"));
    assert!(same(&mut heap, "(1 . 2.5)", "(1 . 2.5)"));
    assert!(!same(&mut heap, "(1 2)", "(1 2 3)"));
    assert_eq!(read(&mut heap, "( )"), Value::Nil);
}

#[test]
fn test_list_errors() {
    for text in ["(. b)", "(a . )", "(a . b c)", ".", "[a . b]"] {
        assert_eq!(syntax_message(text), ".", "{:?}", text);
    }
    assert_eq!(syntax_message(")"), ")");
    assert_eq!(syntax_message("]"), "]");
    assert_eq!(syntax_message("(]"), "mismatched parenthesis");
    assert_eq!(syntax_message("[)"), "mismatched parenthesis");
    assert!(read_err("(1 2").is_eof());
    assert!(read_err("(1 .").is_eof());
    assert!(read_err("[1 2").is_eof());
    assert!(read_err("'").is_eof());
    assert!(read_err("").is_eof());
    assert_eq!(syntax_message("1 2"), "trailing characters");
}

#[test]
fn test_quote_shorthands() {
    let mut heap = heap();
    assert!(same(&mut heap, "'a", "(quote a)"));
    assert!(same(&mut heap, "#'car", "(function car)"));
    assert!(same(&mut heap, "`(a ,b ,@c)", "(\\` (a (\\, b) (\\,@ c)))"));
    assert!(same(&mut heap, "'  ;; gap\n a", "(quote a)"));
}

#[test]
fn test_vectors() {
    let mut heap = heap();
    let vector = read(&mut heap, "[1 [2] \"x\" (a)]");
    let slots = heap.slots(&vector).unwrap().to_vec();
    assert_eq!(slots.len(), 4);
    assert_eq!(slots[0], Value::from(1));
    assert!(slots[1].is_vector());
    assert_eq!(slots[2], Value::from("x"));
    assert!(slots[3].is_cons());
    let empty = read(&mut heap, "[]");
    assert!(heap.slots(&empty).unwrap().is_empty());
}

#[test]
fn test_records() {
    let mut heap = heap();
    let record = read(&mut heap, "#s(foo 1 2)");
    assert!(record.is_record());
    assert_eq!(heap.slots(&record).map(<[Value]>::len), Some(3));
    assert_eq!(syntax_message("#s()"), "#s");
    assert!(read_err("#sfoo").is_syntax());
}

#[test]
fn test_hash_tables() {
    let mut heap = heap();
    let value = read(&mut heap, r#"#s(hash-table test equal data ("a" 1 "a" 2 b 3))"#);
    let b = heap.symbol("b");
    let table = heap.as_hash_table(&value).unwrap();
    assert_eq!(table.test(), HashTest::Equal);
    assert_eq!(table.weakness(), None);
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(&heap, &Value::from("a")), Some(&Value::from(2)));
    assert_eq!(table.get(&heap, &b), Some(&Value::from(3)));

    let value = read(
        &mut heap,
        "#s(hash-table size 10 weakness t rehash-size 1.5 purecopy t)",
    );
    let table = heap.as_hash_table(&value).unwrap();
    assert_eq!(table.test(), HashTest::Eql);
    assert_eq!(table.weakness(), Some(Weakness::KeyAndValue));
    assert!(table.is_empty());

    let value = read(&mut heap, "#s(hash-table test eq data (k 1) data (k 2))");
    let k = heap.symbol("k");
    let table = heap.as_hash_table(&value).unwrap();
    assert_eq!(table.get(&heap, &k), Some(&Value::from(1)));

    let mut text = String::from("#s(hash-table test equal data (");
    for i in 0..5000 {
        text.push_str(&format!("(k {}) {} ", i, i));
    }
    text.push_str("(k 42) last))");
    let value = read(&mut heap, &text);
    let key = heap.list(vec![k, Value::from(42)]);
    let table = heap.as_hash_table(&value).unwrap();
    assert_eq!(table.len(), 5000);
    assert_eq!(table.get(&heap, &key), Some(&Value::from("last")));
}

#[test]
fn test_hash_table_errors() {
    for text in [
        "#s(hash-table test foo)",
        "#s(hash-table test)",
        "#s(hash-table weakness foo)",
        "#s(hash-table size -1)",
        "#s(hash-table data (a))",
        "#s(hash-table data 5)",
        "#s(hash-table data (a . b))",
        "#s(hash-table data #0=(#0# . #0#))",
        "#1=#s(hash-table data (#1# 1))",
    ] {
        let err = read_err(text);
        assert!(err.is_syntax(), "{:?}", text);
        assert!(err.message().starts_with("#s(hash-table ...)"), "{:?}", text);
    }
}

#[test]
fn test_byte_code() {
    let mut heap = heap();
    let value = read(&mut heap, r#"#[(x) "\300\207" [nil] 1]"#);
    assert!(value.is_byte_code());
    let slots = heap.slots(&value).unwrap();
    assert_eq!(slots[1], Value::bytes(vec![0o300u8, 0o207]));

    let value = read(&mut heap, r#"#[257 "abc" [a b] 3 "doc" (interactive)]"#);
    let slots = heap.slots(&value).unwrap();
    assert_eq!(slots.len(), 6);
    assert_eq!(slots[1], Value::bytes(&b"abc"[..]));

    assert!(read(&mut heap, "#[(x) (y) nil 0]").is_byte_code());

    for text in [
        "#[1 2 3]",
        r#"#[(x) "" [nil] 1 nil nil nil]"#,
        r#"#[(x) "" [nil] -1]"#,
        r#"#["x" "" [nil] 1]"#,
        r#"#[(x) "" (a) 1]"#,
        "#[(x) (y) [nil] 1]",
    ] {
        assert!(read_err(text).is_syntax(), "{:?}", text);
    }
}

#[test]
fn test_bool_vectors() {
    let mut heap = heap();
    assert_eq!(
        read(&mut heap, r#"#&3"\5""#),
        Value::from(vec![true, false, true])
    );
    assert_eq!(
        read(&mut heap, r#"#&10"\377\3""#),
        Value::from(vec![true; 10])
    );
    assert_eq!(read(&mut heap, r#"#&0"""#), Value::from(Vec::<bool>::new()));
    assert_eq!(syntax_message(r#"#&9"a""#), "#&...");
    assert_eq!(syntax_message("#&x"), "#&...");
}

#[test]
fn test_propertized_strings() {
    let mut heap = heap();
    assert_eq!(
        read(&mut heap, r#"#("foo" 0 3 (face bold))"#),
        Value::from("foo")
    );
    assert_eq!(read(&mut heap, r#"#("bar")"#), Value::from("bar"));
    assert!(read_err(r#"#("foo" 0 3)"#).is_syntax());
    assert!(read_err("#(foo)").is_syntax());
}

#[test]
fn test_symbols() {
    let mut heap = heap();
    let a = read(&mut heap, "#:foo");
    let b = read(&mut heap, "#:foo");
    let interned = heap.symbol("foo");
    assert_ne!(a, b);
    assert_ne!(a, interned);
    assert_eq!(a.as_name(), Some("foo"));
    assert!(!a.as_symbol().unwrap().is_interned());
    assert_eq!(read(&mut heap, "#:").as_name(), Some(""));

    let empty = read(&mut heap, "##");
    assert_eq!(empty, heap.symbol(""));
    assert_eq!(read(&mut heap, "#_foo"), interned);
    assert_eq!(read(&mut heap, "\\(a"), heap.symbol("(a"));
    assert_eq!(read(&mut heap, "a\\ b"), heap.symbol("a b"));
    assert_eq!(read(&mut heap, "\\nil"), Value::Nil);
    assert_eq!(read(&mut heap, "é"), heap.symbol("é"));
}

#[test]
fn test_labels() {
    let mut heap = heap();
    let list = read(&mut heap, "#1=(a . #1#)");
    assert_eq!(heap.cdr(&list), Some(&list));

    let list = read(&mut heap, "(#1=(x) #1#)");
    let items = elements(&heap, &list);
    assert_eq!(items[0], items[1]);
    assert!(items[0].is_cons());

    let vector = read(&mut heap, "#1=[#1# 2]");
    assert_eq!(heap.slots(&vector).map(|s| s[0].clone()), Some(vector.clone()));

    let list = read(&mut heap, "#1=(#2=(b) #2# #1#)");
    let items = elements(&heap, &list);
    assert_eq!(items[0], items[1]);
    assert_eq!(items[2], list);

    let table = read(&mut heap, "#1=#s(hash-table data (k #1#))");
    let k = heap.symbol("k");
    assert_eq!(
        heap.as_hash_table(&table).and_then(|t| t.get(&heap, &k)),
        Some(&table)
    );

    assert_eq!(read(&mut heap, "#1=5"), Value::from(5));
    assert!(same(&mut heap, "(#1=a #1#)", "(a a)"));

    // `#2#` is used after the form it aliases is complete.
    let list = read(&mut heap, "(#1=(#2=#1#) #2#)");
    let items = elements(&heap, &list);
    assert_eq!(items[0], items[1]);
    assert_eq!(heap.car(&items[0]), Some(&items[0]));
    assert!(!labels::contains_placeholder(&heap, &list));

    let list = read(&mut heap, "(#1=[#2=#1# #2#] #2#)");
    let items = elements(&heap, &list);
    assert_eq!(items[0], items[1]);
    assert_eq!(
        heap.slots(&items[0]).map(|s| s.to_vec()),
        Some(vec![items[0].clone(), items[0].clone()])
    );
}

#[test]
fn test_label_errors() {
    assert_eq!(syntax_message("#1=#1#"), "nonsensical self-reference");
    assert_eq!(syntax_message("#1#"), "#1#");
    assert_eq!(syntax_message("(#1=a #1=b)"), "#1= label defined twice");
    assert_eq!(syntax_message("#1a"), "#1a");

    let options = Options::new().with_read_circle(false);
    assert!(from_str_custom(&mut heap(), "#1=(a)", options.clone()).is_err());
    assert!(from_str_custom(&mut heap(), "#1#", options).is_err());

    let mut heap = heap();
    let mut parser = Parser::from_str("#1=(a) #1#");
    assert!(parser.parse(&mut heap).unwrap().is_some());
    assert!(parser.parse(&mut heap).is_err());
}

#[test]
fn test_dispatch_forms() {
    let mut heap = heap();
    let options = Options::new().with_load_file_name("foo.el");
    assert_eq!(
        from_str_custom(&mut heap, "#$", options).unwrap(),
        Value::from("foo.el")
    );
    assert_eq!(read(&mut heap, "#$"), Value::Nil);

    assert_eq!(read(&mut heap, "#@5 abcd42"), Value::from(42));
    assert_eq!(read(&mut heap, "#!/usr/bin/env emacs --script\n42"), Value::from(42));
    assert!(same(&mut heap, "(1 #@3 xx 2)", "(1 2)"));
    assert!(read_err("#@00 foo").is_eof());
    assert!(read_err("(1 #@00 2)").is_eof());

    let mut parser = Parser::from_str("1 #@00 2");
    assert_eq!(parser.parse(&mut heap).unwrap(), Some(Value::from(1)));
    assert_eq!(parser.parse(&mut heap).unwrap(), None);

    assert_eq!(syntax_message("#<buffer foo>"), "#<");
    assert_eq!(syntax_message("#z"), "#z");
}

#[test]
fn test_depth_limit() {
    let mut heap = heap();
    let nested = |n: usize| format!("{}1{}", "(".repeat(n), ")".repeat(n));

    let options = Options::new().with_max_depth(10);
    let err = from_str_custom(&mut heap, &nested(12), options.clone()).unwrap_err();
    assert_eq!(err.message(), "nesting too deep");
    assert!(from_str_custom(&mut heap, &nested(5), options).is_ok());

    assert!(from_str(&mut heap, &nested(100)).is_ok());
    assert!(read_err(&nested(100_000)).is_syntax());
}

#[test]
fn test_read_from_str_offsets() {
    let mut heap = heap();
    for (text, end) in [
        ("foo bar", 3),
        ("  (a b) c", 7),
        ("\"x\"  y", 3),
        ("?a b", 2),
        ("é b", 2),
        ("#x1f)", 4),
        ("'a", 2),
    ] {
        let (_, offset) = read_from_str(&mut heap, text).unwrap();
        assert_eq!(offset, end, "{:?}", text);
    }
    assert!(read_from_str(&mut heap, "  ; nothing\n").unwrap_err().is_eof());
}

#[test]
fn test_input_sources() {
    let mut heap = heap();
    assert!(from_reader(&mut heap, Cursor::new("(1 2)")).unwrap().is_cons());
    assert_eq!(from_slice(&mut heap, b"; \xff\n1").unwrap(), Value::from(1));
    assert!(from_slice(&mut heap, b"\"\xff\"").unwrap_err().is_syntax());
    assert!(from_slice(&mut heap, b"\xe9").unwrap_err().is_syntax());
}

#[test]
fn test_error_display() {
    assert_eq!(
        read_err(")").to_string(),
        "invalid read syntax: ) at line 1 column 1"
    );
    let err = read_err("\n(1 2");
    assert!(err.to_string().starts_with("end of file during parsing"));
    assert_eq!(err.location().map(|l| l.line()), Some(2));
}

#[test]
fn test_loader_for_character_names() {
    let mut heap = heap();
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let mut parser = Parser::from_str(r"?\N{U+41} ?\N{LATIN SMALL LETTER A} ?\N{LATIN SMALL LETTER B}")
        .with_loader(move |unit: &str| -> std::result::Result<(), LoadError> {
            assert_eq!(unit, crate::load::CHARACTER_NAMES_UNIT);
            counter.set(counter.get() + 1);
            Ok(())
        });
    assert_eq!(parser.parse(&mut heap).unwrap(), Some(Value::Char(0x41)));
    assert_eq!(calls.get(), 0);
    assert_eq!(parser.parse(&mut heap).unwrap(), Some(Value::Char(0x61)));
    assert_eq!(parser.parse(&mut heap).unwrap(), Some(Value::Char(0x62)));
    assert_eq!(calls.get(), 1);

    let mut parser = Parser::from_str(r"?\N{LATIN SMALL LETTER A}")
        .with_loader(|_: &str| -> std::result::Result<(), LoadError> {
            Err(LoadError::Failed("no such file".into()))
        });
    let err = parser.parse(&mut heap).unwrap_err();
    assert!(err.is_syntax());
    assert!(err.message().contains("no such file"));
}
