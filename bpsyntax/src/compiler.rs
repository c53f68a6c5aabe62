//! Module `compiler` classifies the tokens of an `Instruction` and lowers
//! them into a `ByteCode` sequence.
//!
//! Classification is ordered and the first matching rule wins. A token that
//! matches no rule is skipped without affecting the rest of the group.

use alloc::vec::Vec;

use crate::bytecode::{clamp_repeat, ByteCode, Op, MAX_REPEAT};
use crate::tokenizer::{Instruction, Prefix};

/// `Symbol` is one of the letters that may carry a repeat count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Read,
    DelayUs,
    DelayMs,
    Start,
    Stop,
    AuxHigh,
    AuxLow,
}

impl Symbol {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'r' => Some(Symbol::Read),
            'd' => Some(Symbol::DelayUs),
            'D' => Some(Symbol::DelayMs),
            's' => Some(Symbol::Start),
            'S' => Some(Symbol::Stop),
            'h' => Some(Symbol::AuxHigh),
            'l' => Some(Symbol::AuxLow),
            _ => None,
        }
    }

    pub fn op(self) -> Op {
        match self {
            Symbol::Read => Op::Read,
            Symbol::DelayUs => Op::DelayUs,
            Symbol::DelayMs => Op::DelayMs,
            Symbol::Start => Op::Start,
            Symbol::Stop => Op::Stop,
            Symbol::AuxHigh => Op::AuxHigh,
            Symbol::AuxLow => Op::AuxLow,
        }
    }
}

/// `Suffix` holds the optional `:repeat` and `.bits` modifiers of a numeric
/// literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Suffix {
    pub repeat: Option<u32>,
    pub bits: Option<u32>,
}

/// `Token` is a classified token of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// `'x'`
    CharLiteral(u8),
    /// `"..."` or `'...'`, holding the text between the delimiters.
    StringLiteral(&'a str),
    /// `0x..`
    HexLiteral(u32, Suffix),
    /// `0b..`
    BinaryLiteral(u32, Suffix),
    DecimalLiteral(u32, Suffix),
    /// `r:8`
    SymbolWithRepeat(Symbol, u32),
    /// `rrrr`
    RepeatedSymbolRun(Symbol, u32),
    /// A single letter symbol or punctuation mark.
    BareSymbol(char),
    Unrecognized,
}

impl<'a> Token<'a> {
    /// `classify` applies the classification rules to one token's text.
    pub fn classify(text: &'a str) -> Self {
        let bytes = text.as_bytes();
        if bytes.is_empty() {
            return Token::Unrecognized;
        }

        if bytes.len() == 3 && bytes[0] == b'\'' && bytes[2] == b'\'' {
            return Token::CharLiteral(bytes[1]);
        }

        if bytes.len() >= 2 {
            let first = bytes[0];
            if (first == b'\'' || first == b'"') && bytes[bytes.len() - 1] == first {
                return Token::StringLiteral(&text[1..text.len() - 1]);
            }
        }

        if bytes.len() > 2 && (text.starts_with("0x") || text.starts_with("0X")) {
            return match parse_number(&text[2..], 16) {
                Some((value, suffix)) => Token::HexLiteral(value, suffix),
                None => Token::Unrecognized,
            };
        }

        if bytes.len() > 2 && (text.starts_with("0b") || text.starts_with("0B")) {
            if let Some((value, suffix)) = parse_number(&text[2..], 2) {
                return Token::BinaryLiteral(value, suffix);
            }
        }

        if bytes[0].is_ascii_digit() {
            if let Some((value, suffix)) = parse_number(text, 10) {
                return Token::DecimalLiteral(value, suffix);
            }
        }

        let mut chars = text.chars();
        let first = match chars.next() {
            Some(c) => c,
            None => return Token::Unrecognized,
        };
        let rest = chars.as_str();

        if let Some(symbol) = Symbol::from_char(first) {
            if let Some(digits) = rest.strip_prefix(':') {
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    // All digits, so a parse failure can only be overflow.
                    let repeat = digits.parse::<u32>().unwrap_or(MAX_REPEAT);
                    return Token::SymbolWithRepeat(symbol, clamp_repeat(repeat));
                }
            }

            if !rest.is_empty() && rest.chars().all(|c| c == first) {
                let count = text.chars().count() as u32;
                return Token::RepeatedSymbolRun(symbol, clamp_repeat(count));
            }
        }

        if rest.is_empty() && (Symbol::from_char(first).is_some() || first.is_ascii_punctuation())
        {
            return Token::BareSymbol(first);
        }

        Token::Unrecognized
    }

    /// `lower` appends the operations this token stands for to `out`.
    pub fn lower(self, out: &mut Vec<ByteCode>) {
        match self {
            Token::CharLiteral(c) => out.push(ByteCode::write(c as u32)),
            Token::StringLiteral(s) => out.extend(s.bytes().map(|b| ByteCode::write(b as u32))),
            Token::HexLiteral(value, suffix)
            | Token::BinaryLiteral(value, suffix)
            | Token::DecimalLiteral(value, suffix) => {
                let mut code = ByteCode::write(value);
                if let Some(repeat) = suffix.repeat {
                    code = code.with_repeat(repeat);
                }
                if let Some(bits) = suffix.bits {
                    code = code.with_bits(bits);
                }
                out.push(code);
            }
            Token::SymbolWithRepeat(symbol, repeat) | Token::RepeatedSymbolRun(symbol, repeat) => {
                out.push(ByteCode::new(symbol.op()).with_repeat(repeat))
            }
            Token::BareSymbol(c) => out.push(ByteCode::new(symbol_op(c))),
            Token::Unrecognized => {}
        }
    }
}

/// `symbol_op` maps a bare single-character symbol to its operation.
/// Punctuation without a meaning maps to `Op::None`.
pub fn symbol_op(c: char) -> Op {
    if let Some(symbol) = Symbol::from_char(c) {
        return symbol.op();
    }
    match c {
        '^' => Op::TickClock,
        '/' => Op::SetClkHigh,
        '\\' => Op::SetClkLow,
        '-' => Op::SetDatHigh,
        '_' => Op::SetDatLow,
        '.' => Op::ReadDat,
        '@' => Op::AuxInput,
        '&' => Op::DelayUs,
        '%' => Op::DelayMs,
        '~' => Op::Adc,
        _ => Op::None,
    }
}

/// `parse_number` parses digits in `radix` followed by at most one `:repeat`
/// and at most one `.bits` suffix, in either order.
fn parse_number(text: &str, radix: u32) -> Option<(u32, Suffix)> {
    let body_end = text.find(|c| c == ':' || c == '.').unwrap_or(text.len());
    if text.starts_with('+') {
        return None;
    }
    let value = u32::from_str_radix(&text[..body_end], radix).ok()?;

    let mut suffix = Suffix::default();
    let mut rest = &text[body_end..];
    while !rest.is_empty() {
        let marker = rest.as_bytes()[0];
        let digits_end = rest[1..]
            .find(|c| c == ':' || c == '.')
            .map_or(rest.len(), |n| n + 1);
        let digits = &rest[1..digits_end];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let n = digits.parse::<u32>().unwrap_or(u32::MAX);
        let slot = if marker == b':' {
            &mut suffix.repeat
        } else {
            &mut suffix.bits
        };
        if slot.replace(n).is_some() {
            return None;
        }
        rest = &rest[digits_end..];
    }

    Some((value, suffix))
}

/// `compile` lowers one instruction into its operation sequence.
///
/// A `[` group is always framed by a Start and a Stop, even when the
/// operator also typed `s` or `S`.
pub fn compile(instr: &Instruction<'_>) -> Vec<ByteCode> {
    let mut out = Vec::with_capacity(instr.tokens.len() + 2);
    let framed = instr.prefix == Prefix::Bracket;

    if framed {
        out.push(ByteCode::new(Op::Start));
    }

    for text in instr.tokens.iter() {
        let token = Token::classify(text);
        if token == Token::Unrecognized {
            log::debug!("skipping unrecognized token {:?}", text);
        }
        token.lower(&mut out);
    }

    if framed {
        out.push(ByteCode::new(Op::Stop));
    }

    out
}

/// `compile_line` tokenizes and compiles every instruction of `line`.
pub fn compile_line(line: &str) -> Vec<Vec<ByteCode>> {
    crate::tokenizer::tokenize(line)
        .iter()
        .map(compile)
        .collect()
}
