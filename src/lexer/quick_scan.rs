//! The quick-scan fast path.
//!
//! A small DFA over character classes recognizes the common run of "simple
//! leading whitespace, simple token, trailing whitespace up to one line
//! break" without invoking the full lexer, computing an FNV-1a hash on the
//! way so the result can be looked up in the token cache. Anything that
//! could interact with comments, strings, long brackets or multi-character
//! operators drops to `Bad` and takes the slow path; the table is built so
//! that every `Done` boundary is exactly where the slow lexer would stop
//! too.

/// Character classes of the quick scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum CharFlags {
    White = 0,
    Cr,
    Lf,
    Letter,
    Digit,
    Punct,
    Dot,
    CompoundPunctStart,
    Complex,
    EndOfFile,
}

const CLASS_COUNT: usize = 10;

/// Scanner states. `Bad` must stay `Done + 1` so a single comparison
/// terminates the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub(crate) enum QuickScanState {
    Initial = 0,
    FollowingWhite,
    FollowingCr,
    FollowingLf,
    Ident,
    Number,
    Punctuation,
    Dot,
    CompoundPunctStart,
    DoneAfterNext,
    Done,
    Bad,
}

const STATE_COUNT: usize = 10;
const DONE: u8 = QuickScanState::Done as u8;

/// Tokens longer than this never hit the cache; the quick path gives up on
/// them.
pub(crate) const MAX_CACHED_TOKEN_SIZE: usize = 42;

const I: u8 = QuickScanState::Initial as u8;
const FW: u8 = QuickScanState::FollowingWhite as u8;
const FC: u8 = QuickScanState::FollowingCr as u8;
const FL: u8 = QuickScanState::FollowingLf as u8;
const ID: u8 = QuickScanState::Ident as u8;
const NM: u8 = QuickScanState::Number as u8;
const PN: u8 = QuickScanState::Punctuation as u8;
const DT: u8 = QuickScanState::Dot as u8;
const CP: u8 = QuickScanState::CompoundPunctStart as u8;
const DN: u8 = QuickScanState::DoneAfterNext as u8;
const DO: u8 = QuickScanState::Done as u8;
const BD: u8 = QuickScanState::Bad as u8;

/// Flat `state * class` transition matrix. Column order matches
/// [`CharFlags`]: White, Cr, Lf, Letter, Digit, Punct, Dot,
/// CompoundPunctStart, Complex, EndOfFile.
#[rustfmt::skip]
static STATE_TRANSITIONS: [u8; STATE_COUNT * CLASS_COUNT] = [
    // Initial: leading simple whitespace, then the token's first character.
    I,  I,  I,  ID, NM, PN, DT, CP, BD, BD,
    // FollowingWhite: trailing blanks; a line break finishes the token.
    FW, FC, FL, DO, DO, DO, DO, DO, BD, DO,
    // FollowingCr: a `\r\n` pair is one break, anything else ends before.
    DO, DO, DN, DO, DO, DO, DO, DO, DO, DO,
    // FollowingLf: `\n\r` pairs up the same way.
    DO, DN, DO, DO, DO, DO, DO, DO, DO, DO,
    // Ident
    FW, FC, FL, ID, ID, DO, DO, DO, BD, DO,
    // Number: dots, signs and anything complex need the slow scanner.
    FW, FC, FL, NM, NM, DO, BD, BD, BD, DO,
    // Punctuation: a complete one- or two-character token.
    FW, FC, FL, DO, DO, DO, DO, DO, BD, DO,
    // Dot: `..`, `...` and `.5` take the slow path.
    FW, FC, FL, DO, BD, DO, BD, DO, BD, DO,
    // CompoundPunctStart: two compound starters in a row go slow.
    FW, FC, FL, DO, DO, DO, DO, BD, BD, DO,
    // DoneAfterNext: the entering character was the last one consumed.
    DO, DO, DO, DO, DO, DO, DO, DO, DO, DO,
];

/// Character classification for code units below 0x180; everything above is
/// treated as a letter (identifier material, validated by the slow lexer).
static CHAR_CLASSES: [u8; 0x180] = build_char_classes();

const fn build_char_classes() -> [u8; 0x180] {
    const W: u8 = CharFlags::White as u8;
    const CR: u8 = CharFlags::Cr as u8;
    const LF: u8 = CharFlags::Lf as u8;
    const LT: u8 = CharFlags::Letter as u8;
    const DG: u8 = CharFlags::Digit as u8;
    const PT: u8 = CharFlags::Punct as u8;
    const DO_: u8 = CharFlags::Dot as u8;
    const CS: u8 = CharFlags::CompoundPunctStart as u8;
    const CX: u8 = CharFlags::Complex as u8;

    let mut table = [CX; 0x180];
    table[b' ' as usize] = W;
    table[b'\t' as usize] = W;
    table[0x0B] = W; // \v
    table[0x0C] = W; // \f
    table[b'\r' as usize] = CR;
    table[b'\n' as usize] = LF;

    let mut c = b'a' as usize;
    while c <= b'z' as usize {
        table[c] = LT;
        c += 1;
    }
    let mut c = b'A' as usize;
    while c <= b'Z' as usize {
        table[c] = LT;
        c += 1;
    }
    table[b'_' as usize] = LT;

    let mut c = b'0' as usize;
    while c <= b'9' as usize {
        table[c] = DG;
        c += 1;
    }

    // Punctuation that is always a complete single-character token.
    table[b'(' as usize] = PT;
    table[b')' as usize] = PT;
    table[b'{' as usize] = PT;
    table[b'}' as usize] = PT;
    table[b']' as usize] = PT;
    table[b';' as usize] = PT;
    table[b',' as usize] = PT;
    table[b'#' as usize] = PT;

    table[b'.' as usize] = DO_;

    // Characters that may begin a two-character operator.
    table[b'=' as usize] = CS;
    table[b'<' as usize] = CS;
    table[b'>' as usize] = CS;
    table[b'~' as usize] = CS;
    table[b':' as usize] = CS;
    table[b'+' as usize] = CS;
    table[b'*' as usize] = CS;
    table[b'%' as usize] = CS;
    table[b'^' as usize] = CS;
    table[b'&' as usize] = CS;
    table[b'|' as usize] = CS;
    table[b'!' as usize] = CS;

    // `-` (comments), `/` (C comments, floor division), `[` (long brackets)
    // and the quote characters stay Complex, along with the remaining ASCII
    // and all control characters.

    // Code units 0x80..0x180 behave like letters; the slow lexer decides
    // whether the dialect actually allows them in identifiers.
    let mut c = 0x80;
    while c < 0x180 {
        table[c] = LT;
        c += 1;
    }
    table
}

#[inline]
pub(crate) fn classify(c: char) -> CharFlags {
    let code = c as usize;
    let raw = if code < 0x180 {
        CHAR_CLASSES[code]
    } else {
        CharFlags::Letter as u8
    };
    // The table only ever stores valid class values.
    match raw {
        0 => CharFlags::White,
        1 => CharFlags::Cr,
        2 => CharFlags::Lf,
        3 => CharFlags::Letter,
        4 => CharFlags::Digit,
        5 => CharFlags::Punct,
        6 => CharFlags::Dot,
        7 => CharFlags::CompoundPunctStart,
        _ => CharFlags::Complex,
    }
}

const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;

#[inline]
pub(crate) fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// A successful quick scan: the token's full byte length (leading blanks and
/// trailing blanks included) and the FNV-1a hash of those bytes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct QuickScan {
    pub(crate) byte_len: usize,
    pub(crate) hash: u32,
}

/// Runs the DFA over the start of `rest`. Returns `None` whenever the slow
/// lexer must take over.
pub(crate) fn quick_scan(rest: &str) -> Option<QuickScan> {
    let mut state = QuickScanState::Initial as u8;
    let mut hash = FNV_OFFSET_BASIS;
    let mut byte_len = 0usize;
    let mut chars_seen = 0usize;
    let mut chars = rest.char_indices();

    loop {
        let next = chars.next();
        let class = match next {
            Some((_, c)) => classify(c) as usize,
            None => CharFlags::EndOfFile as usize,
        };
        state = STATE_TRANSITIONS[state as usize * CLASS_COUNT + class];
        if state >= DONE {
            if state == DONE {
                break;
            }
            return None;
        }
        let (index, c) = next.expect("only EndOfFile transitions past the input, and those exit");
        chars_seen += 1;
        if chars_seen > MAX_CACHED_TOKEN_SIZE {
            return None;
        }
        let mut buffer = [0u8; 4];
        for &byte in c.encode_utf8(&mut buffer).as_bytes() {
            hash ^= u32::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        byte_len = index + c.len_utf8();
    }

    if byte_len == 0 {
        return None;
    }
    Some(QuickScan { byte_len, hash })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_len(text: &str) -> Option<usize> {
        quick_scan(text).map(|scan| scan.byte_len)
    }

    #[test]
    fn bad_is_done_plus_one() {
        assert_eq!(QuickScanState::Bad as u8, QuickScanState::Done as u8 + 1);
    }

    #[test]
    fn simple_tokens() {
        assert_eq!(scan_len("local x"), Some(6)); // `local ` with trailing blank
        assert_eq!(scan_len("x = 1"), Some(2)); // `x `
        assert_eq!(scan_len("42)"), Some(2));
        assert_eq!(scan_len("( x"), Some(2));
    }

    #[test]
    fn trailing_line_break_is_consumed() {
        assert_eq!(scan_len("x\ny"), Some(2));
        assert_eq!(scan_len("x \r\ny"), Some(4));
        assert_eq!(scan_len("x \n\ry"), Some(4));
    }

    #[test]
    fn comment_starters_go_slow() {
        assert_eq!(scan_len("x -- hi"), None);
        assert_eq!(scan_len("x / y"), None);
        assert_eq!(scan_len("-x"), None);
        assert_eq!(scan_len("[[s]]"), None);
        assert_eq!(scan_len("\"s\""), None);
    }

    #[test]
    fn numbers_with_structure_go_slow() {
        assert_eq!(scan_len("1.5"), None);
        assert_eq!(scan_len("1e+5"), None);
        assert_eq!(scan_len("1 + 2").is_some(), true); // just `1 `
        assert_eq!(scan_len("0x1F)"), Some(4));
    }

    #[test]
    fn compound_operators_go_slow() {
        assert_eq!(scan_len("== b"), None);
        assert_eq!(scan_len("= b"), Some(2));
        assert_eq!(scan_len(".. b"), None);
        assert_eq!(scan_len(". b"), Some(2));
    }

    #[test]
    fn long_tokens_are_rejected() {
        let long = "a".repeat(MAX_CACHED_TOKEN_SIZE + 1);
        assert_eq!(scan_len(&long), None);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(scan_len(""), None);
    }
}
