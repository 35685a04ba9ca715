//! jsoncat — a small CLI front end over the `parser`/`document`/`printer`
//! crates, in the spirit of a `cat` that understands JSON well enough to
//! reformat, validate and pretty-print it.

use std::fs;
use std::process::ExitCode;

use common::{Encoding, ParseFlags, PrintFlags};

fn print_help() {
    println!("Usage: jsoncat [OPTIONS] <FILE>");
    println!();
    println!("Options:");
    println!("  --minify, --compact     Emit compact JSON (no whitespace)");
    println!("  --indent N              Indent by N columns when pretty-printing (1, 2, 4 or 8)");
    println!("  --trailing-commas       Accept a trailing comma before '}}' or ']'");
    println!("  --comments              Accept '//', '/* */' and '#' comments");
    println!("  --non-destructive       Parse without touching the input buffer");
    println!("  --encoding <enc>        Force the input encoding instead of auto-detecting it");
    println!("                          (utf8, utf16le, utf16be, utf32le, utf32be)");
    println!("  --demo                  Run spec.md's seed scenarios inline (ignores FILE)");
    println!("  --help                  Show this help message");
    println!();
    println!("Reads FILE, parses it as JSON (auto-detecting its encoding unless");
    println!("--encoding is given), and re-prints it to stdout.");
}

fn encoding_from_args(args: &[String]) -> Option<Encoding> {
    let name = args
        .iter()
        .position(|a| a == "--encoding")
        .and_then(|i| args.get(i + 1))?;
    match name.as_str() {
        "utf8" => Some(Encoding::Utf8),
        "utf16le" => Some(Encoding::Utf16Le),
        "utf16be" => Some(Encoding::Utf16Be),
        "utf32le" => Some(Encoding::Utf32Le),
        "utf32be" => Some(Encoding::Utf32Be),
        other => {
            eprintln!("jsoncat: unknown --encoding '{other}', auto-detecting instead");
            None
        }
    }
}

fn parse_flags_from_args(args: &[String]) -> ParseFlags {
    let mut bits = ParseFlags::NONE;
    if args.iter().any(|a| a == "--trailing-commas") {
        bits |= ParseFlags::TRAILING_COMMAS;
    }
    if args.iter().any(|a| a == "--comments") {
        bits |= ParseFlags::COMMENTS;
    }
    if args.iter().any(|a| a == "--non-destructive") {
        bits |= ParseFlags::NON_DESTRUCTIVE;
    }
    ParseFlags::new(bits)
}

fn indent_bit_for(columns: u8) -> u32 {
    if columns <= 1 {
        PrintFlags::INDENT_1
    } else if columns <= 2 {
        PrintFlags::INDENT_2
    } else if columns <= 4 {
        PrintFlags::INDENT_4
    } else {
        PrintFlags::INDENT_8
    }
}

fn print_flags_from_args(args: &[String]) -> PrintFlags {
    if args.iter().any(|a| a == "--minify" || a == "--compact") {
        return PrintFlags::new(PrintFlags::NO_WHITESPACE);
    }

    let mut bits = PrintFlags::default().0;
    if let Some(columns) = args
        .iter()
        .position(|a| a == "--indent")
        .and_then(|i| args.get(i + 1))
        .and_then(|n| n.parse::<u8>().ok())
    {
        bits = indent_bit_for(columns);
    }
    PrintFlags::new(bits)
}

/// The first bare argument that isn't itself a flag's value (`--encoding`'s
/// and `--indent`'s next argument are skipped, not mistaken for FILE).
fn find_file_arg(args: &[String]) -> Option<String> {
    let mut iter = args.iter().skip(1).peekable();
    while let Some(a) = iter.next() {
        if a == "--encoding" || a == "--indent" {
            iter.next();
            continue;
        }
        if !a.starts_with('-') {
            return Some(a.clone());
        }
    }
    None
}

fn run_cat(path: &str, encoding: Option<Encoding>, parse_flags: ParseFlags, print_flags: PrintFlags) -> ExitCode {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("jsoncat: cannot read '{path}': {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match encoding {
        Some(enc) => parser::parse_with_encoding::<u8>(&bytes, enc, parse_flags),
        None => parser::parse::<u8>(&bytes, parse_flags),
    };

    let doc = match result {
        Ok(d) => d,
        Err(e) => {
            eprintln!("jsoncat: {path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    match printer::print_to_string(&doc, print_flags) {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("jsoncat: failed to format output: {e}");
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Walkthrough: the ten seed scenarios, narrated inline.
// ─────────────────────────────────────────────────────────────────────────────

fn scenario_1() {
    println!("  1. nested object with a non-canonical number");
    let input = r#"{"a":1,"b":[true,false,null],"c":{"d":-0.5e2}}"#;
    let doc = parser::parse::<u8>(input.as_bytes(), ParseFlags::default()).unwrap();
    let out = printer::print_to_string(&doc, PrintFlags::new(PrintFlags::NO_WHITESPACE)).unwrap();
    println!("     in:  {input}");
    println!("     out: {out}  (canonicalized -0.5e2 → -50)\n");
}

fn scenario_2() {
    println!("  2. surrogate pair decodes to one code point, re-emitted as UTF-8");
    let doc = parser::parse::<u8>(b"[\"\\ud834\\udd1e\"]", ParseFlags::default()).unwrap();
    let root = doc.root().unwrap();
    let s = doc.array_get(root, 0).unwrap();
    let document::ValueKind::String(text) = doc.kind(s) else {
        unreachable!()
    };
    let decoded = doc.text_str(*text);
    println!("     in:  [\"\\ud834\\udd1e\"]");
    println!("     out: {:?} → bytes {:02X?}\n", decoded.as_ref(), decoded.as_bytes());
}

fn scenario_3() {
    println!("  3. \\u0020 escape decodes to a literal space");
    let doc = parser::parse::<u8>(br#"{"k": "a\u0020b"}"#, ParseFlags::default()).unwrap();
    let root = doc.root().unwrap();
    let k = doc.object_get(root, "k").unwrap();
    let document::ValueKind::String(text) = doc.kind(k) else {
        unreachable!()
    };
    println!("     in:  {{\"k\": \"a\\u0020b\"}}");
    println!("     out: k.text == {:?}\n", doc.text_str(*text).as_ref());
}

fn scenario_4() {
    println!("  4. trailing content after the root value");
    parser::parse::<u8>(b"{} ", ParseFlags::default()).expect("trailing whitespace is fine");
    let err = parser::parse::<u8>(b"{} {}", ParseFlags::default()).unwrap_err();
    println!("     in:  \"{{}} \" → ok");
    println!("     in:  \"{{}} {{}}\" → {err}\n");
}

fn scenario_5() {
    println!("  5. trailing comma gated by TRAILING_COMMAS");
    let err = parser::parse::<u8>(b"[1,]", ParseFlags::default()).unwrap_err();
    println!("     in:  [1,] (default flags) → {err}");
    let doc = parser::parse::<u8>(b"[1,]", ParseFlags::new(ParseFlags::TRAILING_COMMAS)).unwrap();
    println!("     in:  [1,] (TRAILING_COMMAS) → {} element(s)\n", doc.child_count(doc.root().unwrap()));
}

fn scenario_6() {
    println!("  6. block comment gated by COMMENTS");
    let rejected = parser::parse::<u8>(b"[1, /* two */ 2]", ParseFlags::default()).is_err();
    println!("     in:  [1, /* two */ 2] (default flags) → rejected: {rejected}");
    let doc = parser::parse::<u8>(b"[1, /* two */ 2]", ParseFlags::new(ParseFlags::COMMENTS)).unwrap();
    let out = printer::print_to_string(&doc, PrintFlags::new(PrintFlags::NO_WHITESPACE)).unwrap();
    println!("     in:  [1, /* two */ 2] (COMMENTS) → {out}\n");
}

fn scenario_7() {
    println!("  7. a leading zero is already a complete number");
    let err = parser::parse::<u8>(b"[0123]", ParseFlags::default()).unwrap_err();
    println!("     in:  [0123] → {err} (0 is the whole number, '1' is unexpected)\n");
}

fn scenario_8() {
    println!("  8. a lone surrogate is invalid");
    let err = parser::parse::<u8>(br#"[ "\ud800" ]"#, ParseFlags::default()).unwrap_err();
    println!("     in:  [ \"\\ud800\" ] → {err}\n");
}

fn scenario_9() {
    println!("  9. the arena survives 10,000 small allocations under any pool split");
    for (static_cap, dynamic_cap) in [(0, 0), (0, 4096), (4096, 0), (32 * 1024, 32 * 1024)] {
        let mut a = arena::Arena::with_capacities(static_cap, dynamic_cap, std::mem::size_of::<usize>()).unwrap();
        for i in 0..10_000usize {
            a.alloc((i % 17) + 1).unwrap();
        }
    }
    println!("     ok across (static, dynamic) ∈ {{(0,0), (0,4096), (4096,0), (32Ki,32Ki)}}\n");
}

fn scenario_10() {
    println!("  10. array_insert at INT_MIN/INT_MAX clamps to front/back");
    let mut doc: document::Document<u8> = document::Document::new();
    let array = doc.new_array();
    doc.set_root(array);
    let a = doc.new_number(1.0);
    let b = doc.new_number(2.0);
    doc.array_add(array, a);
    doc.array_add(array, b);
    let front = doc.new_number(0.0);
    doc.array_insert(array, isize::MIN, front);
    let back = doc.new_number(3.0);
    doc.array_insert(array, isize::MAX, back);
    let out = printer::print_to_string(&doc, PrintFlags::new(PrintFlags::NO_WHITESPACE)).unwrap();
    println!("     array_insert(MIN, 0) then array_insert(MAX, 3) on [1,2] → {out}\n");
}

fn run_demo() {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("   jsoncat --demo — spec.md §8 seed scenarios");
    println!("═══════════════════════════════════════════════════════════════\n");

    scenario_1();
    scenario_2();
    scenario_3();
    scenario_4();
    scenario_5();
    scenario_6();
    scenario_7();
    scenario_8();
    scenario_9();
    scenario_10();

    println!("═══════════════════════════════════════════════════════════════");
    println!("✅ All ten scenarios ran as specified.");
    println!();
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return ExitCode::SUCCESS;
    }

    if args.iter().any(|a| a == "--demo") {
        run_demo();
        return ExitCode::SUCCESS;
    }

    let path = match find_file_arg(&args) {
        Some(p) => p,
        None => {
            print_help();
            return ExitCode::FAILURE;
        }
    };

    let encoding = encoding_from_args(&args);
    let parse_flags = parse_flags_from_args(&args);
    let print_flags = print_flags_from_args(&args);
    run_cat(&path, encoding, parse_flags, print_flags)
}
