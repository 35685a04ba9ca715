//! End-to-end parse → mutate → print scenarios, exercising the document
//! pipeline the way an external caller would: read bytes, get a tree,
//! inspect or mutate it, print it back out.

use common::{ParseFlags, PrintFlags};
use document::ValueKind;

fn compact() -> PrintFlags {
    PrintFlags::new(PrintFlags::NO_WHITESPACE)
}

#[test]
fn scenario_1_nested_object_with_canonical_number() {
    let doc = parser::parse::<u8>(br#"{"a":1,"b":[true,false,null],"c":{"d":-0.5e2}}"#, ParseFlags::default())
        .unwrap();
    let root = doc.root().unwrap();
    assert_eq!(doc.child_count(root), 3);

    let c = doc.object_get(root, "c").unwrap();
    let d = doc.object_get(c, "d").unwrap();
    match doc.kind(d) {
        ValueKind::Number { value, .. } => assert_eq!(*value, 50.0),
        other => panic!("expected number, got {other:?}"),
    }

    let out = printer::print_to_string(&doc, compact()).unwrap();
    assert_eq!(out, r#"{"a":1,"b":[true,false,null],"c":{"d":-50}}"#);
}

#[test]
fn scenario_2_surrogate_pair_round_trips_through_utf8() {
    let doc = parser::parse::<u8>(b"[\"\\ud834\\udd1e\"]", ParseFlags::default()).unwrap();
    let root = doc.root().unwrap();
    let s = doc.array_get(root, 0).unwrap();
    let ValueKind::String(text) = doc.kind(s) else {
        panic!("expected string");
    };
    let decoded = doc.text_str(*text);
    assert_eq!(decoded.chars().count(), 1);
    assert_eq!(decoded.chars().next().unwrap(), '\u{1D11E}');
    assert_eq!(decoded.as_bytes(), [0xF0, 0x9D, 0x84, 0x9E]);
}

#[test]
fn scenario_3_unicode_escape_decodes_to_space() {
    let doc = parser::parse::<u8>(br#"{"k": "a b"}"#, ParseFlags::default()).unwrap();
    let root = doc.root().unwrap();
    let k = doc.object_get(root, "k").unwrap();
    let ValueKind::String(text) = doc.kind(k) else {
        panic!("expected string");
    };
    assert_eq!(doc.text_str(*text), "a b");
}

#[test]
fn scenario_4_trailing_content_is_rejected_at_exact_offset() {
    parser::parse::<u8>(b"{} ", ParseFlags::default()).expect("trailing whitespace is fine");

    let err = parser::parse::<u8>(b"{} {}", ParseFlags::default()).unwrap_err();
    assert_eq!(err.kind, common::ErrorKind::UnexpectedTrailing);
    assert_eq!(err.offset, 3);
}

#[test]
fn scenario_5_trailing_comma_gated_by_flag() {
    let err = parser::parse::<u8>(b"[1,]", ParseFlags::default()).unwrap_err();
    assert_eq!(err.kind, common::ErrorKind::UnexpectedToken);
    assert_eq!(err.offset, 3);

    let flags = ParseFlags::new(ParseFlags::TRAILING_COMMAS);
    let doc = parser::parse::<u8>(b"[1,]", flags).unwrap();
    let root = doc.root().unwrap();
    assert_eq!(doc.child_count(root), 1);
}

#[test]
fn scenario_6_block_comment_gated_by_flag() {
    assert!(parser::parse::<u8>(b"[1, /* two */ 2]", ParseFlags::default()).is_err());

    let flags = ParseFlags::new(ParseFlags::COMMENTS);
    let doc = parser::parse::<u8>(b"[1, /* two */ 2]", flags).unwrap();
    let out = printer::print_to_string(&doc, compact()).unwrap();
    assert_eq!(out, "[1,2]");
}

#[test]
fn scenario_7_leading_zero_is_a_complete_number() {
    let err = parser::parse::<u8>(b"[0123]", ParseFlags::default()).unwrap_err();
    assert_eq!(err.kind, common::ErrorKind::ExpectedSeparator);
    assert_eq!(err.offset, 2);
}

#[test]
fn scenario_8_lone_surrogate_is_invalid() {
    let err = parser::parse::<u8>(br#"[ "\ud800" ]"#, ParseFlags::default()).unwrap_err();
    assert_eq!(err.kind, common::ErrorKind::InvalidSurrogate);
    assert_eq!(err.offset, 3);
}

#[test]
fn scenario_9_arena_handles_many_small_allocations() {
    for (static_cap, dynamic_cap) in [(0, 0), (0, 4096), (4096, 0), (32 * 1024, 32 * 1024)] {
        let mut a = arena::Arena::with_capacities(static_cap, dynamic_cap, std::mem::size_of::<usize>()).unwrap();
        for i in 0..10_000usize {
            let len = (i % 17) + 1;
            let r = a.alloc(len).unwrap();
            assert_eq!(r.len(), len);
        }
    }
}

#[test]
fn scenario_10_insert_at_extremes_clamps() {
    let mut doc: document::Document<u8> = document::Document::new();
    let array = doc.new_array();
    doc.set_root(array);

    let a = doc.new_number(1.0);
    let b = doc.new_number(2.0);
    doc.array_add(array, a);
    doc.array_add(array, b);

    let front = doc.new_number(0.0);
    doc.array_insert(array, isize::MIN, front);
    assert_eq!(doc.array_get(array, 0), Some(front));

    let back = doc.new_number(3.0);
    doc.array_insert(array, isize::MAX, back);
    assert_eq!(doc.array_get(array, -1), Some(back));

    let out = printer::print_to_string(&doc, compact()).unwrap();
    assert_eq!(out, "[0,1,2,3]");
}

#[test]
fn round_trip_through_mutation_api() {
    let mut doc: document::Document<u8> = document::Document::new();
    let root = doc.new_object();
    doc.set_root(root);

    let name = doc.new_string("example").unwrap();
    doc.object_set(root, "name", name).unwrap().unwrap();
    let count = doc.new_number(3.0);
    doc.object_set(root, "count", count).unwrap().unwrap();

    let printed = printer::print_to_string(&doc, compact()).unwrap();
    let reparsed = parser::parse::<u8>(printed.as_bytes(), ParseFlags::default()).unwrap();
    let reparsed_root = reparsed.root().unwrap();
    assert_eq!(reparsed.child_count(reparsed_root), 2);
    let reparsed_count = reparsed.object_get(reparsed_root, "count").unwrap();
    match reparsed.kind(reparsed_count) {
        ValueKind::Number { value, .. } => assert_eq!(*value, 3.0),
        other => panic!("expected number, got {other:?}"),
    }
}

#[test]
fn non_destructive_parse_leaves_input_untouched() {
    let input = br#"{"a": "hello", "b": [1, 2, 3]}"#.to_vec();
    let before = input.clone();
    let flags = ParseFlags::new(ParseFlags::NON_DESTRUCTIVE);
    let _doc = parser::parse::<u8>(&input, flags).unwrap();
    assert_eq!(input, before);
}
