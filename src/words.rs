//! Word bank
//!
//! Every enemy carries one of these. The reserved word is never drawn from the
//! bank; it only appears on superpower carriers.

/// Reserved word that triggers freeze mode
pub const FREEZE_WORD: &str = "freeze";

/// Candidate enemy words (lowercase ASCII)
pub const WORDS: &[&str] = &[
    "cat", "meow", "purr", "paw", "whisker", "tail", "kitty", "feline", "hunter", "shadow",
    "ghost", "spirit", "demon", "beast", "monster", "dark", "evil", "curse", "spell", "magic",
    "power", "death", "note", "write", "type", "word", "letter", "key", "strike", "attack",
    "defend",
];

/// True if `word` is the reserved freeze trigger (case-insensitive)
#[inline]
pub fn is_freeze_word(word: &str) -> bool {
    word.eq_ignore_ascii_case(FREEZE_WORD)
}
