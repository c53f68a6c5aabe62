use bpsyntax::tokenizer::{tokenize, Prefix};

#[test]
fn test_groups_in_source_order() {
    let instrs = tokenize("[0xA0] [0x01 r:8]");

    assert_eq!(instrs.len(), 2);
    assert_eq!(instrs[0].raw, "[0xA0]");
    assert_eq!(instrs[0].tokens, vec!["0xA0"]);
    assert_eq!(instrs[1].raw, "[0x01 r:8]");
    assert_eq!(instrs[1].tokens, vec!["0x01", "r:8"]);
}

#[test]
fn test_text_outside_groups_is_ignored() {
    let instrs = tokenize("hello [r] world");

    assert_eq!(instrs.len(), 1);
    assert_eq!(instrs[0].tokens, vec!["r"]);
}

#[test]
fn test_prefixes() {
    let instrs = tokenize("[1] {2] >3");
    let prefixes: Vec<Prefix> = instrs.iter().map(|i| i.prefix).collect();

    assert_eq!(prefixes, vec![Prefix::Bracket, Prefix::Brace, Prefix::Arrow]);
    assert_eq!(instrs[2].raw, ">3");
    assert_eq!(instrs[2].tokens, vec!["3"]);
}

#[test]
fn test_brace_closes_brace_group() {
    let instrs = tokenize("{0x01 0x02}");

    assert_eq!(instrs.len(), 1);
    assert_eq!(instrs[0].tokens, vec!["0x01", "0x02"]);
}

#[test]
fn test_literals_are_verbatim() {
    let instrs = tokenize("[\"a ]b\" 'c' 0x01]");

    assert_eq!(instrs.len(), 1);
    assert_eq!(instrs[0].tokens, vec!["\"a ]b\"", "'c'", "0x01"]);
}

#[test]
fn test_quote_ends_pending_token() {
    let instrs = tokenize("[ab'c']");

    assert_eq!(instrs[0].tokens, vec!["ab", "'c'"]);
}

#[test]
fn test_whitespace_runs() {
    let instrs = tokenize("[  r \t  r  ]");

    assert_eq!(instrs[0].tokens, vec!["r", "r"]);
}

#[test]
fn test_unterminated_bracket_is_dropped() {
    let instrs = tokenize("[0x01] [0x02 0x03");

    assert_eq!(instrs.len(), 1);
    assert_eq!(instrs[0].raw, "[0x01]");
}

#[test]
fn test_unterminated_quote_is_dropped() {
    assert!(tokenize("[\"abc]").is_empty());
    assert!(tokenize(">'abc").is_empty());
}

#[test]
fn test_reopened_group_replaces_partial() {
    let instrs = tokenize("[0x01 [0x02]");

    assert_eq!(instrs.len(), 1);
    assert_eq!(instrs[0].raw, "[0x02]");
}

#[test]
fn test_empty_group() {
    let instrs = tokenize("[]");

    assert_eq!(instrs.len(), 1);
    assert!(instrs[0].tokens.is_empty());
}

#[test]
fn test_arrow_group_ends_at_next_opener() {
    let instrs = tokenize(">0x01 >0x02");

    assert_eq!(instrs.len(), 2);
    assert_eq!(instrs[0].raw, ">0x01");
    assert_eq!(instrs[0].tokens, vec!["0x01"]);
    assert_eq!(instrs[1].raw, ">0x02");
    assert_eq!(instrs[1].tokens, vec!["0x02"]);

    let instrs = tokenize("> 0x01 [0x02]");
    let prefixes: Vec<Prefix> = instrs.iter().map(|i| i.prefix).collect();

    assert_eq!(prefixes, vec![Prefix::Arrow, Prefix::Bracket]);
    assert_eq!(instrs[0].raw, "> 0x01");
    assert_eq!(instrs[0].tokens, vec!["0x01"]);
    assert_eq!(instrs[1].tokens, vec!["0x02"]);
}
