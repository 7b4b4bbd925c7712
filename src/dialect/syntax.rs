// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Static syntax tables, one per dialect.
//!
//! Tokens are matched case-insensitively against the instruction field.
//! Dialects disagree on which tokens mean what; nothing here is shared
//! between tables.

use crate::core::tokenizer::CommentSyntax;
use crate::index::definition::DefinitionKind;

use super::Dialect;

/// Which definitions inside a section are invisible outside of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalVisibility {
    /// Every definition belongs to the innermost section.
    ScopedAll,
    /// Only names starting with one of the prefixes are section-local.
    LocalPrefix(&'static [&'static str]),
    /// Sections never hide names.
    Global,
}

/// Open/close tokens of one section kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTokens {
    pub kind: DefinitionKind,
    pub open: &'static [&'static str],
    pub close: &'static [&'static str],
    /// Opening a new section of this kind closes the previous one.
    pub implicit_close: bool,
}

/// An include directive, optionally qualified by the first operand word
/// (e.g. Kick Assembler `.import source "file"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncludeToken {
    pub instruction: &'static str,
    pub qualifier: Option<&'static str>,
    pub kind: DefinitionKind,
}

const fn source(instruction: &'static str) -> IncludeToken {
    IncludeToken {
        instruction,
        qualifier: None,
        kind: DefinitionKind::SourceInclude,
    }
}

const fn qualified(
    instruction: &'static str,
    qualifier: &'static str,
    kind: DefinitionKind,
) -> IncludeToken {
    IncludeToken {
        instruction,
        qualifier: Some(qualifier),
        kind,
    }
}

const fn binary(instruction: &'static str) -> IncludeToken {
    IncludeToken {
        instruction,
        qualifier: None,
        kind: DefinitionKind::BinaryInclude,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectSyntax {
    pub comments: CommentSyntax,
    pub case_sensitive_symbols: bool,
    /// `SYMBOL <token> value` defines an equate.
    pub equates: &'static [&'static str],
    /// `<token> NAME = value` defines an equate with no symbol field.
    pub operand_equates: &'static [&'static str],
    pub macro_open: &'static [&'static str],
    pub macro_close: &'static [&'static str],
    pub repeat_open: &'static [&'static str],
    pub repeat_close: &'static [&'static str],
    pub sections: &'static [SectionTokens],
    pub includes: &'static [IncludeToken],
    /// Macro and repeat bodies are delimited by `{` and `}`.
    pub brace_blocks: bool,
    pub visibility: LocalVisibility,
}

impl DialectSyntax {
    pub fn is_equate(&self, instruction: &str) -> bool {
        contains_token(self.equates, instruction)
    }

    pub fn is_operand_equate(&self, instruction: &str) -> bool {
        contains_token(self.operand_equates, instruction)
    }

    pub fn is_macro_open(&self, instruction: &str) -> bool {
        contains_token(self.macro_open, instruction)
    }

    pub fn is_macro_close(&self, instruction: &str) -> bool {
        contains_token(self.macro_close, instruction)
    }

    pub fn is_repeat_open(&self, instruction: &str) -> bool {
        contains_token(self.repeat_open, instruction)
    }

    pub fn is_repeat_close(&self, instruction: &str) -> bool {
        contains_token(self.repeat_close, instruction)
    }

    pub fn section_opened_by(&self, instruction: &str) -> Option<&SectionTokens> {
        self.sections
            .iter()
            .find(|section| contains_token(section.open, instruction))
    }

    pub fn section_closed_by(&self, instruction: &str) -> Option<&SectionTokens> {
        self.sections
            .iter()
            .find(|section| contains_token(section.close, instruction))
    }

    /// Whether `token` is any directive this table knows about.
    pub fn is_directive(&self, token: &str) -> bool {
        self.is_macro_open(token)
            || self.is_macro_close(token)
            || self.is_repeat_open(token)
            || self.is_repeat_close(token)
            || self.is_operand_equate(token)
            || self.section_opened_by(token).is_some()
            || self.section_closed_by(token).is_some()
            || self
                .includes
                .iter()
                .any(|include| include.instruction.eq_ignore_ascii_case(token))
    }

    pub fn include_for(&self, instruction: &str, operand: &str) -> Option<&IncludeToken> {
        let first_word = operand.split_whitespace().next().unwrap_or_default();
        self.includes.iter().find(|include| {
            include.instruction.eq_ignore_ascii_case(instruction)
                && include
                    .qualifier
                    .map_or(true, |qualifier| qualifier.eq_ignore_ascii_case(first_word))
        })
    }
}

fn contains_token(tokens: &[&str], instruction: &str) -> bool {
    !instruction.is_empty() && tokens.iter().any(|token| token.eq_ignore_ascii_case(instruction))
}

const SEMICOLON_STAR: CommentSyntax = CommentSyntax {
    line_markers: &[";"],
    column_zero_markers: &["*"],
    block_delimiters: &[],
    single_quote_strings: false,
};

static ACME: DialectSyntax = DialectSyntax {
    comments: CommentSyntax {
        line_markers: &[";"],
        column_zero_markers: &[],
        block_delimiters: &[],
        single_quote_strings: true,
    },
    case_sensitive_symbols: true,
    equates: &["="],
    operand_equates: &[],
    macro_open: &["!macro"],
    macro_close: &[],
    repeat_open: &["!for", "!do", "!while"],
    repeat_close: &[],
    sections: &[SectionTokens {
        kind: DefinitionKind::LocalSection,
        open: &["!zone", "!zn"],
        close: &[],
        implicit_close: true,
    }],
    includes: &[source("!source"), source("!src"), binary("!binary"), binary("!bin")],
    brace_blocks: true,
    visibility: LocalVisibility::LocalPrefix(&[".", "@"]),
};

static ASM6: DialectSyntax = DialectSyntax {
    comments: CommentSyntax::SEMICOLON,
    case_sensitive_symbols: true,
    equates: &["=", "EQU"],
    operand_equates: &[],
    macro_open: &["MACRO"],
    macro_close: &["ENDM"],
    repeat_open: &["REPT"],
    repeat_close: &["ENDR"],
    sections: &[SectionTokens {
        kind: DefinitionKind::EnumSection,
        open: &["ENUM"],
        close: &["ENDE"],
        implicit_close: false,
    }],
    includes: &[
        source("INCLUDE"),
        source("INCSRC"),
        binary("INCBIN"),
        binary("BIN"),
    ],
    brace_blocks: false,
    visibility: LocalVisibility::Global,
};

static ATASM: DialectSyntax = DialectSyntax {
    comments: CommentSyntax {
        line_markers: &[";"],
        column_zero_markers: &[],
        block_delimiters: &[],
        single_quote_strings: false,
    },
    case_sensitive_symbols: false,
    equates: &["=", "EQU"],
    operand_equates: &[],
    macro_open: &[".MACRO"],
    macro_close: &[".ENDM"],
    repeat_open: &[".REPT"],
    repeat_close: &[".ENDR"],
    sections: &[SectionTokens {
        kind: DefinitionKind::LocalSection,
        open: &[".LOCAL"],
        close: &[],
        implicit_close: true,
    }],
    includes: &[source(".INCLUDE"), binary(".INCBIN")],
    brace_blocks: false,
    visibility: LocalVisibility::LocalPrefix(&["?"]),
};

static DASM: DialectSyntax = DialectSyntax {
    comments: CommentSyntax::SEMICOLON,
    case_sensitive_symbols: true,
    equates: &["EQU", "=", "SET", "EQM", "SETSTR"],
    operand_equates: &[],
    macro_open: &["MAC", "MACRO"],
    macro_close: &["ENDM"],
    repeat_open: &["REPEAT"],
    repeat_close: &["REPEND"],
    sections: &[SectionTokens {
        kind: DefinitionKind::LocalSection,
        open: &["SUBROUTINE"],
        close: &[],
        implicit_close: true,
    }],
    includes: &[source("INCLUDE"), binary("INCBIN")],
    brace_blocks: false,
    visibility: LocalVisibility::LocalPrefix(&["."]),
};

static KICKASS: DialectSyntax = DialectSyntax {
    comments: CommentSyntax {
        line_markers: &["//"],
        column_zero_markers: &[],
        block_delimiters: &[("/*", "*/")],
        single_quote_strings: true,
    },
    case_sensitive_symbols: true,
    equates: &["="],
    operand_equates: &[".const", ".var", ".label"],
    macro_open: &[".macro", ".function", ".pseudocommand"],
    macro_close: &[],
    repeat_open: &[".for", ".while"],
    repeat_close: &[],
    sections: &[],
    includes: &[
        source("#import"),
        qualified(".import", "source", DefinitionKind::SourceInclude),
        qualified(".import", "binary", DefinitionKind::BinaryInclude),
        qualified(".import", "c64", DefinitionKind::BinaryInclude),
        qualified(".import", "text", DefinitionKind::BinaryInclude),
    ],
    brace_blocks: true,
    visibility: LocalVisibility::Global,
};

static MADS: DialectSyntax = DialectSyntax {
    comments: CommentSyntax {
        line_markers: &[";", "//"],
        column_zero_markers: &["*"],
        block_delimiters: &[("/*", "*/")],
        single_quote_strings: true,
    },
    case_sensitive_symbols: false,
    equates: &["=", "EQU"],
    operand_equates: &[],
    macro_open: &[".MACRO", "MACRO"],
    macro_close: &[".ENDM", ".MEND", "ENDM", "MEND"],
    repeat_open: &[".REPT"],
    repeat_close: &[".ENDR"],
    sections: &[
        SectionTokens {
            kind: DefinitionKind::Procedure,
            open: &[".PROC"],
            close: &[".ENDP", ".PEND"],
            implicit_close: false,
        },
        SectionTokens {
            kind: DefinitionKind::LocalSection,
            open: &[".LOCAL"],
            close: &[".ENDL", ".LEND"],
            implicit_close: false,
        },
        SectionTokens {
            kind: DefinitionKind::EnumSection,
            open: &[".ENUM"],
            close: &[".ENDE", ".EEND"],
            implicit_close: false,
        },
        SectionTokens {
            kind: DefinitionKind::StructureSection,
            open: &[".STRUCT"],
            close: &[".ENDS", ".SEND"],
            implicit_close: false,
        },
    ],
    includes: &[source("ICL"), binary("INS")],
    brace_blocks: false,
    visibility: LocalVisibility::ScopedAll,
};

static MERLIN32: DialectSyntax = DialectSyntax {
    comments: SEMICOLON_STAR,
    case_sensitive_symbols: true,
    equates: &["=", "EQU"],
    operand_equates: &[],
    macro_open: &["MAC"],
    macro_close: &["<<<", "EOM"],
    repeat_open: &["LUP"],
    repeat_close: &["--^"],
    sections: &[],
    includes: &[source("PUT"), source("USE"), binary("PUTBIN")],
    brace_blocks: false,
    visibility: LocalVisibility::Global,
};

static TASS: DialectSyntax = DialectSyntax {
    comments: CommentSyntax {
        line_markers: &[";"],
        column_zero_markers: &[],
        block_delimiters: &[],
        single_quote_strings: true,
    },
    case_sensitive_symbols: false,
    equates: &["=", ":=", ".var"],
    operand_equates: &[],
    macro_open: &[".macro", ".segment", ".function"],
    macro_close: &[".endm", ".endmacro", ".endsegment", ".endf", ".endfunction"],
    repeat_open: &[".rept", ".for", ".bfor", ".brept"],
    repeat_close: &[".next", ".endrept", ".endfor"],
    sections: &[
        SectionTokens {
            kind: DefinitionKind::Procedure,
            open: &[".proc"],
            close: &[".pend", ".endproc"],
            implicit_close: false,
        },
        SectionTokens {
            kind: DefinitionKind::LocalSection,
            open: &[".block"],
            close: &[".bend", ".endblock"],
            implicit_close: false,
        },
        SectionTokens {
            kind: DefinitionKind::StructureSection,
            open: &[".struct", ".union"],
            close: &[".ends", ".endstruct", ".endu", ".endunion"],
            implicit_close: false,
        },
    ],
    includes: &[source(".include"), binary(".binary")],
    brace_blocks: false,
    visibility: LocalVisibility::ScopedAll,
};

static XASM: DialectSyntax = DialectSyntax {
    comments: CommentSyntax {
        line_markers: &[";", "|"],
        column_zero_markers: &["*"],
        block_delimiters: &[],
        single_quote_strings: true,
    },
    case_sensitive_symbols: false,
    equates: &["EQU", "="],
    operand_equates: &[],
    macro_open: &[],
    macro_close: &[],
    repeat_open: &[],
    repeat_close: &[],
    sections: &[],
    includes: &[source("ICL"), binary("INS")],
    brace_blocks: false,
    visibility: LocalVisibility::Global,
};

static MAD_PASCAL: DialectSyntax = DialectSyntax {
    comments: CommentSyntax {
        line_markers: &["//"],
        column_zero_markers: &[],
        block_delimiters: &[("{", "}"), ("(*", "*)")],
        single_quote_strings: true,
    },
    case_sensitive_symbols: false,
    equates: &[],
    operand_equates: &[],
    macro_open: &[],
    macro_close: &[],
    repeat_open: &[],
    repeat_close: &[],
    sections: &[],
    includes: &[],
    brace_blocks: false,
    visibility: LocalVisibility::ScopedAll,
};

pub(super) fn syntax_for(dialect: Dialect) -> &'static DialectSyntax {
    match dialect {
        Dialect::Acme => &ACME,
        Dialect::Asm6 => &ASM6,
        Dialect::Atasm => &ATASM,
        Dialect::Dasm => &DASM,
        Dialect::KickAss => &KICKASS,
        Dialect::Mads => &MADS,
        Dialect::Merlin32 => &MERLIN32,
        Dialect::Tass => &TASS,
        Dialect::Xasm => &XASM,
        Dialect::MadPascal => &MAD_PASCAL,
    }
}
