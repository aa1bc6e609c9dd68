//! Glob matching for directory `find` (§4.11): `*` and `?` over UTF-16 code
//! units, case-insensitive via the code-page bridge's upper-case fold.
//!
//! Has no teacher analogue (the teacher never implemented a pattern-matching
//! `find`); grounded directly on §4.11's recursive description and on
//! `original_source/src/private/ef_prv_dirfunc_vfat.c`'s matcher, which walks
//! the same way: `*` tries every possible consumed-run length by recursing
//! forward, `?` consumes exactly one code point.

use crate::codepage::CodePage;

/// Recursively matches `name` against `pattern`, case-insensitive (§4.11).
/// `*` matches any run, including empty; `?` matches exactly one code unit.
pub fn matches(pattern: &[u16], name: &[u16], codepage: &impl CodePage) -> bool {
    match pattern.first() {
        None => name.is_empty(),
        Some(&0x2A) => {
            // '*': try consuming 0, 1, 2, ... units of `name`.
            for i in 0..=name.len() {
                if matches(&pattern[1..], &name[i..], codepage) {
                    return true;
                }
            }
            false
        }
        Some(&0x3F) => {
            // '?': exactly one code unit, any value.
            !name.is_empty() && matches(&pattern[1..], &name[1..], codepage)
        }
        Some(&p) => match name.first() {
            Some(&n) if codepage.upper_fold(p as u32) == codepage.upper_fold(n as u32) => {
                matches(&pattern[1..], &name[1..], codepage)
            }
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codepage::Ascii;

    fn u(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn exact_match() {
        assert!(matches(&u("readme.txt"), &u("README.TXT"), &Ascii));
        assert!(!matches(&u("readme.txt"), &u("README.DOC"), &Ascii));
    }

    #[test]
    fn star_matches_any_run_including_empty() {
        assert!(matches(&u("*.txt"), &u("a.txt"), &Ascii));
        assert!(matches(&u("*.txt"), &u(".txt"), &Ascii));
        assert!(matches(&u("a*c"), &u("abbbbc"), &Ascii));
        assert!(!matches(&u("a*c"), &u("abbbbd"), &Ascii));
    }

    #[test]
    fn question_matches_exactly_one() {
        assert!(matches(&u("a?c"), &u("abc"), &Ascii));
        assert!(!matches(&u("a?c"), &u("ac"), &Ascii));
        assert!(!matches(&u("a?c"), &u("abbc"), &Ascii));
    }

    #[test]
    fn combination_of_star_and_question() {
        assert!(matches(&u("*.?xt"), &u("readme.txt"), &Ascii));
        assert!(!matches(&u("*.?xt"), &u("readme.text"), &Ascii));
    }

    #[test]
    fn empty_pattern_only_matches_empty_name() {
        assert!(matches(&[], &[], &Ascii));
        assert!(!matches(&[], &u("a"), &Ascii));
    }
}
