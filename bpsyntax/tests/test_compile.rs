use bpsyntax::compiler::{compile, compile_line, Token};
use bpsyntax::tokenizer::tokenize;
use bpsyntax::{ByteCode, Op};

fn ops(sequence: &[ByteCode]) -> Vec<Op> {
    sequence.iter().map(|code| code.op()).collect()
}

fn single(line: &str) -> Vec<ByteCode> {
    let mut groups = compile_line(line);
    assert_eq!(groups.len(), 1, "expected one group in {:?}", line);
    groups.remove(0)
}

#[test]
fn test_framed_single_write() {
    let seq = single("[0xAA]");

    assert_eq!(
        seq,
        vec![
            ByteCode::new(Op::Start),
            ByteCode::write(0xAA),
            ByteCode::new(Op::Stop),
        ]
    );
    assert_eq!(seq[1].bits(), 8);
    assert_eq!(seq[1].repeat(), 1);
}

#[test]
fn test_explicit_start_stop_inside_frame() {
    let seq = single("[s 0x01 S]");

    assert_eq!(
        ops(&seq),
        vec![Op::Start, Op::Start, Op::Write, Op::Stop, Op::Stop]
    );
}

#[test]
fn test_unframed_groups() {
    assert_eq!(ops(&single("{0x01 r]")), vec![Op::Write, Op::Read]);
    assert_eq!(ops(&single(">0x01 r")), vec![Op::Write, Op::Read]);
}

#[test]
fn test_repeat_is_clamped() {
    let seq = single(">r:9999");

    assert_eq!(seq, vec![ByteCode::new(Op::Read).with_repeat(255)]);
    assert_eq!(seq[0].repeat(), 255);
    assert_eq!(single(">r:99999999999999999999")[0].repeat(), 255);
}

#[test]
fn test_symbol_runs_match_repeat_form() {
    for symbol in &['r', 'd', 'D', 'h', 'l', 's', 'S'] {
        let run: String = std::iter::repeat(*symbol).take(4).collect();
        let repeat = format!("{}:4", symbol);

        assert_ne!(Token::classify(&run), Token::Unrecognized, "{}", run);
        assert_eq!(single(&format!(">{}", run)), single(&format!(">{}", repeat)));
    }
}

#[test]
fn test_symbol_ops() {
    let seq = single(">r d D s S h l");

    assert_eq!(
        ops(&seq),
        vec![
            Op::Read,
            Op::DelayUs,
            Op::DelayMs,
            Op::Start,
            Op::Stop,
            Op::AuxHigh,
            Op::AuxLow
        ]
    );
    assert!(seq.iter().all(|code| code.repeat() == 1 && !code.explicit_repeat()));
}

#[test]
fn test_char_and_string_literals() {
    assert_eq!(single(">'a'"), vec![ByteCode::write(0x61)]);
    assert_eq!(
        single(">\"ab\""),
        vec![ByteCode::write(0x61), ByteCode::write(0x62)]
    );
    assert_eq!(
        single(">'xyz'"),
        vec![
            ByteCode::write(b'x' as u32),
            ByteCode::write(b'y' as u32),
            ByteCode::write(b'z' as u32)
        ]
    );
}

#[test]
fn test_numeric_literals() {
    assert_eq!(single(">10"), vec![ByteCode::write(10)]);
    assert_eq!(single(">0x10"), vec![ByteCode::write(16)]);
    assert_eq!(single(">0X1f"), vec![ByteCode::write(31)]);
    assert_eq!(single(">0b101"), vec![ByteCode::write(5)]);
}

#[test]
fn test_numeric_suffixes() {
    let seq = single(">0x55:3 0x1234.16 7.4:2");

    assert_eq!(seq[0].data(), 0x55);
    assert_eq!(seq[0].repeat(), 3);
    assert!(seq[0].explicit_repeat());
    assert!(!seq[0].explicit_bits());

    assert_eq!(seq[1].data(), 0x1234);
    assert_eq!(seq[1].bits(), 16);
    assert!(seq[1].explicit_bits());

    assert_eq!(seq[2].data(), 7);
    assert_eq!(seq[2].bits(), 4);
    assert_eq!(seq[2].repeat(), 2);
}

#[test]
fn test_bad_suffixes_are_skipped() {
    assert!(single(">0x55:").is_empty());
    assert!(single(">0x55:1:2").is_empty());
    assert!(single(">0x55.x").is_empty());
}

#[test]
fn test_bits_are_clamped() {
    assert_eq!(single(">1.64")[0].bits(), 32);
    assert_eq!(single(">1.0")[0].bits(), 1);
}

#[test]
fn test_malformed_token_does_not_abort() {
    let seq = single("[0xAA ???]");

    assert_eq!(
        seq,
        vec![
            ByteCode::new(Op::Start),
            ByteCode::write(0xAA),
            ByteCode::new(Op::Stop),
        ]
    );
}

#[test]
fn test_unrecognized_tokens_are_skipped() {
    assert!(single(">0xZZ").is_empty());
    assert!(single(">x").is_empty());
    assert!(single(">r:").is_empty());
    assert!(single(">rrx").is_empty());
    assert!(single(">^^").is_empty());
}

#[test]
fn test_punctuation() {
    let seq = single(">^ / \\ - _ . @ & % ~ ! ,");

    assert_eq!(
        ops(&seq),
        vec![
            Op::TickClock,
            Op::SetClkHigh,
            Op::SetClkLow,
            Op::SetDatHigh,
            Op::SetDatLow,
            Op::ReadDat,
            Op::AuxInput,
            Op::DelayUs,
            Op::DelayMs,
            Op::Adc,
            Op::None,
            Op::None
        ]
    );
}

#[test]
fn test_two_instructions() {
    let groups = compile_line("[0xA0] [0x01 r:8]");

    assert_eq!(groups.len(), 2);
    assert_eq!(ops(&groups[0]), vec![Op::Start, Op::Write, Op::Stop]);
    assert_eq!(
        ops(&groups[1]),
        vec![Op::Start, Op::Write, Op::Read, Op::Stop]
    );
    assert_eq!(groups[1][2].repeat(), 8);
}

#[test]
fn test_line_without_instructions() {
    assert!(compile_line("no brackets here").is_empty());
    let instrs = tokenize("[???]");
    assert_eq!(ops(&compile(&instrs[0])), vec![Op::Start, Op::Stop]);
}

#[test]
fn test_listing_format() {
    let code = ByteCode::new(Op::Read).with_repeat(4);

    assert_eq!(code.to_string(), "Read | data=0 | bits=8 | repeat=4");
}

#[test]
fn test_listing_shows_data_as_sent() {
    let sequence = single("[0x1FF 0x1FF.16]");

    assert_eq!(sequence[1].data(), 0x1FF);
    assert_eq!(sequence[1].to_string(), "Write | data=255 | bits=8 | repeat=1");
    assert_eq!(sequence[2].to_string(), "Write | data=511 | bits=16 | repeat=1");
}
