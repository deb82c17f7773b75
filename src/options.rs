//! Dialect configuration for the lexer and parser.

use std::fmt;

/// The Lua flavors with a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum LuaVersion {
    Lua51,
    Lua52,
    Lua53,
    Lua54,
    LuaJit,
    GLua,
    FiveM,
}

impl fmt::Display for LuaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuaVersion::Lua51 => f.write_str("Lua 5.1"),
            LuaVersion::Lua52 => f.write_str("Lua 5.2"),
            LuaVersion::Lua53 => f.write_str("Lua 5.3"),
            LuaVersion::Lua54 => f.write_str("Lua 5.4"),
            LuaVersion::LuaJit => f.write_str("LuaJIT"),
            LuaVersion::GLua => f.write_str("Garry's Mod Lua"),
            LuaVersion::FiveM => f.write_str("FiveM Lua"),
        }
    }
}

/// Which pieces of syntax the front-end accepts.
///
/// Options never make the lexer or parser fail: syntax outside the selected
/// dialect still produces a tree, with "not available in this version"
/// diagnostics attached to the offending tokens or nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct LuaSyntaxOptions {
    pub version: LuaVersion,
    /// `//` and `/* ... */` comments (GLua).
    pub accept_c_comments: bool,
    /// `&&`, `||`, `!`, `!=` operator aliases (GLua).
    pub accept_c_operators: bool,
    /// `&`, `|`, `~`, `<<`, `>>` bitwise operators (5.3+).
    pub accept_bitwise_operators: bool,
    /// Floor division `//` as an operator (5.3+). When C comments are also
    /// accepted the comment reading wins.
    pub accept_floor_division: bool,
    /// `0b101` binary number literals (GLua, FiveM).
    pub accept_binary_numbers: bool,
    /// `0x1p4` hexadecimal floats (5.2+).
    pub accept_hex_floats: bool,
    /// `10LL`, `10ULL`, `2i` LuaJIT number suffixes.
    pub accept_luajit_number_suffixes: bool,
    /// Underscores as digit separators, `1_000_000` (FiveM).
    pub accept_underscores_in_numbers: bool,
    /// `` `hash string` `` backtick literals (FiveM).
    pub accept_backtick_strings: bool,
    /// `\x41`, `\z`, `\u{2603}` string escapes (5.2+/5.3+).
    pub accept_extended_escapes: bool,
    /// Invalid escapes are carried through verbatim instead of diagnosed
    /// (GLua behavior).
    pub accept_invalid_escapes: bool,
    /// `goto label` and `::label::` (5.2+, LuaJIT).
    pub accept_goto: bool,
    /// `continue` as a statement keyword (GLua, FiveM).
    pub accept_continue: bool,
    /// `a += 1`-style compound assignment (FiveM).
    pub accept_compound_assignment: bool,
    /// `local x <const>` attributes (5.4).
    pub accept_local_attributes: bool,
    /// Integer literals kept as integers (5.3+).
    pub integers: bool,
    /// Identifiers may contain non-ASCII characters (LuaJIT).
    pub accept_non_ascii_identifiers: bool,
    /// A `#!...` line at the very start of the file becomes shebang trivia.
    pub accept_shebang: bool,
}

impl LuaSyntaxOptions {
    pub fn lua51() -> Self {
        Self {
            version: LuaVersion::Lua51,
            accept_c_comments: false,
            accept_c_operators: false,
            accept_bitwise_operators: false,
            accept_floor_division: false,
            accept_binary_numbers: false,
            accept_hex_floats: false,
            accept_luajit_number_suffixes: false,
            accept_underscores_in_numbers: false,
            accept_backtick_strings: false,
            accept_extended_escapes: false,
            accept_invalid_escapes: false,
            accept_goto: false,
            accept_continue: false,
            accept_compound_assignment: false,
            accept_local_attributes: false,
            integers: false,
            accept_non_ascii_identifiers: false,
            accept_shebang: true,
        }
    }

    pub fn lua52() -> Self {
        Self {
            version: LuaVersion::Lua52,
            accept_hex_floats: true,
            accept_extended_escapes: true,
            accept_goto: true,
            ..Self::lua51()
        }
    }

    pub fn lua53() -> Self {
        Self {
            version: LuaVersion::Lua53,
            accept_bitwise_operators: true,
            accept_floor_division: true,
            integers: true,
            ..Self::lua52()
        }
    }

    pub fn lua54() -> Self {
        Self {
            version: LuaVersion::Lua54,
            accept_local_attributes: true,
            ..Self::lua53()
        }
    }

    pub fn luajit() -> Self {
        Self {
            version: LuaVersion::LuaJit,
            accept_hex_floats: true,
            accept_luajit_number_suffixes: true,
            accept_goto: true,
            accept_non_ascii_identifiers: true,
            ..Self::lua51()
        }
    }

    pub fn glua() -> Self {
        Self {
            version: LuaVersion::GLua,
            accept_c_comments: true,
            accept_c_operators: true,
            accept_binary_numbers: true,
            accept_invalid_escapes: true,
            accept_continue: true,
            ..Self::lua51()
        }
    }

    pub fn fivem() -> Self {
        Self {
            version: LuaVersion::FiveM,
            accept_binary_numbers: true,
            accept_underscores_in_numbers: true,
            accept_backtick_strings: true,
            accept_continue: true,
            accept_compound_assignment: true,
            ..Self::lua54()
        }
    }

    /// The most permissive option set: everything every dialect accepts.
    pub fn all() -> Self {
        Self {
            version: LuaVersion::FiveM,
            accept_c_comments: true,
            accept_c_operators: true,
            accept_bitwise_operators: true,
            accept_floor_division: true,
            accept_binary_numbers: true,
            accept_hex_floats: true,
            accept_luajit_number_suffixes: true,
            accept_underscores_in_numbers: true,
            accept_backtick_strings: true,
            accept_extended_escapes: true,
            accept_invalid_escapes: false,
            accept_goto: true,
            accept_continue: true,
            accept_compound_assignment: true,
            accept_local_attributes: true,
            integers: true,
            accept_non_ascii_identifiers: true,
            accept_shebang: true,
        }
    }
}

impl Default for LuaSyntaxOptions {
    fn default() -> Self {
        Self::lua54()
    }
}
