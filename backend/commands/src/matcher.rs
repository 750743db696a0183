//! Option matcher: resolves one user-typed token against the full option
//! strings that are legal at the current step.
//!
//! Users may type an abbreviation instead of the whole option. The matcher
//! tries progressively more lenient comparisons and refuses to guess whenever
//! more than one option could be meant:
//!
//! 1. exact match (case-sensitive first, then case-insensitive)
//! 2. for each representation level, finest first:
//!    full uppercase form, *munged* form (letters and digits only),
//!    *caps* form (uppercase letters only, e.g. `"Flame-Grilled Steak"` → `"FGS"`)
//!    - unique prefix match
//!    - unique subsequence match, for tokens of at least [`MIN_SUBSEQUENCE_LEN`] chars
//!
//! Two options reducing to the same form at some level make that form
//! ambiguous. An ambiguous form still counts as a candidate (so it keeps other
//! forms from looking unique) but is never returned.
use std::collections::{HashMap, HashSet};

/// Tokens shorter than this never resolve by subsequence.
pub const MIN_SUBSEQUENCE_LEN: usize = 3;

/// Resolve `token` to the single option it stands for, or `None`.
pub fn resolve<I, S>(token: &str, options: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let owned: Vec<S> = options.into_iter().collect();
    let options: Vec<&str> = owned.iter().map(|o| o.as_ref()).collect();
    if token.is_empty() || options.is_empty() {
        return None;
    }

    if let Some(exact) = exact_match(token, &options) {
        return Some(exact.to_string());
    }

    let wanted = token.to_uppercase();
    let levels = build_levels(&options);
    levels
        .iter()
        .find_map(|level| level.unique_match(&wanted))
        .map(str::to_string)
}

fn exact_match<'a>(token: &str, options: &[&'a str]) -> Option<&'a str> {
    if let Some(hit) = options.iter().copied().find(|o| *o == token) {
        return Some(hit);
    }
    let wanted = token.to_uppercase();
    let mut hits = options
        .iter()
        .copied()
        .filter(|o| o.to_uppercase() == wanted);
    match (hits.next(), hits.next()) {
        (Some(one), None) => Some(one),
        _ => None,
    }
}

/// Letters and digits only, case preserved.
pub fn munged_form(option: &str) -> String {
    option.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Uppercase letters of the munged form.
pub fn caps_form(option: &str) -> String {
    option.chars().filter(|c| c.is_uppercase()).collect()
}

fn build_levels<'a>(options: &[&'a str]) -> [Level<'a>; 3] {
    let forms: Vec<(&'a str, [String; 3])> = options
        .iter()
        .copied()
        .map(|option| {
            let munged = munged_form(option);
            let caps = caps_form(&munged);
            (option, [option.to_uppercase(), munged.to_uppercase(), caps])
        })
        .collect();

    let mut levels: [Level<'a>; 3] = Default::default();
    for depth in 0..levels.len() {
        for (option, reduced) in &forms {
            levels[depth].record(reduced[depth].clone(), *option);
        }
        if depth == 0 {
            continue;
        }
        // A form that did not change between levels keeps the finer level's ambiguity.
        for (_, reduced) in &forms {
            let form = &reduced[depth];
            if *form == reduced[depth - 1] && levels[depth - 1].ambiguous.contains(form) {
                levels[depth].ambiguous.insert(form.clone());
            }
        }
    }
    levels
}

/// One representation level: reduced form → owning option.
#[derive(Debug, Default)]
struct Level<'a> {
    forms: HashMap<String, &'a str>,
    ambiguous: HashSet<String>,
}

impl<'a> Level<'a> {
    fn record(&mut self, form: String, option: &'a str) {
        if form.is_empty() {
            return;
        }
        match self.forms.get(&form) {
            Some(owner) if *owner != option => {
                self.ambiguous.insert(form);
            }
            Some(_) => {}
            None => {
                self.forms.insert(form, option);
            }
        }
    }

    fn unique_match(&self, wanted: &str) -> Option<&'a str> {
        if let Some(hit) = self.unique_by(|form| form.starts_with(wanted)) {
            return Some(hit);
        }
        if wanted.chars().count() >= MIN_SUBSEQUENCE_LEN {
            return self.unique_by(|form| is_subsequence(wanted, form));
        }
        None
    }

    fn unique_by(&self, pred: impl Fn(&str) -> bool) -> Option<&'a str> {
        let mut hits = self.forms.iter().filter(|(form, _)| pred(form));
        match (hits.next(), hits.next()) {
            (Some((form, option)), None) if !self.ambiguous.contains(form) => Some(*option),
            _ => None,
        }
    }
}

/// True if every char of `needle` appears in `haystack`, in order.
fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut rest = haystack.chars();
    needle.chars().all(|c| rest.any(|h| h == c))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIRATES: [&str; 3] = ["Black Bart", "BlackBeard", "Black Caesar"];

    #[test]
    fn exact_match_beats_longer_prefix() {
        assert_eq!(resolve("hit", ["hi", "hit"]).as_deref(), Some("hit"));
        assert_eq!(resolve("hi", ["hi", "hit"]).as_deref(), Some("hi"));
    }

    #[test]
    fn shared_prefix_is_ambiguous() {
        assert_eq!(resolve("h", ["hi", "hit"]), None);
    }

    #[test]
    fn exact_match_ignores_case() {
        assert_eq!(resolve("FILTER", ["filter", "filters"]).as_deref(), Some("filter"));
        assert_eq!(resolve("list", ["List", "Listen"]).as_deref(), Some("List"));
    }

    #[test]
    fn case_only_duplicates_never_resolve_by_case_insensitive_exact() {
        assert_eq!(resolve("hi", ["Hi", "HI"]), None);
        assert_eq!(resolve("Hi", ["Hi", "HI"]).as_deref(), Some("Hi"));
    }

    #[test]
    fn unique_prefix_resolves() {
        assert_eq!(resolve("filt", ["filter", "role"]).as_deref(), Some("filter"));
        assert_eq!(resolve("r", ["filter", "role"]).as_deref(), Some("role"));
    }

    #[test]
    fn subsequence_requires_three_chars() {
        assert_eq!(resolve("fr", ["filter", "role"]), None);
        assert_eq!(resolve("flr", ["filter", "role"]).as_deref(), Some("filter"));
    }

    #[test]
    fn ambiguous_subsequence_is_rejected() {
        // both contain L, S, T in order
        assert_eq!(resolve("lst", ["list", "blast"]), None);
    }

    #[test]
    fn caps_abbreviation_resolves() {
        let options = ["Flame-Grilled Steak", "Fried Rice"];
        assert_eq!(resolve("FGS", options).as_deref(), Some("Flame-Grilled Steak"));
        assert_eq!(resolve("fgs", options).as_deref(), Some("Flame-Grilled Steak"));
        assert_eq!(resolve("FR", options).as_deref(), Some("Fried Rice"));
    }

    #[test]
    fn colliding_caps_forms_are_ambiguous() {
        assert_eq!(resolve("BB", PIRATES), None);
        assert_eq!(resolve("BC", PIRATES).as_deref(), Some("Black Caesar"));
    }

    #[test]
    fn munged_form_strips_punctuation_and_spaces() {
        assert_eq!(resolve("blackc", PIRATES).as_deref(), Some("Black Caesar"));
        // the full form of "Black Bart" has a space, so only the munged form matches
        assert_eq!(resolve("blackba", PIRATES).as_deref(), Some("Black Bart"));
        assert_eq!(resolve("blackb", PIRATES).as_deref(), Some("BlackBeard"));
    }

    #[test]
    fn ambiguous_form_still_blocks_other_candidates() {
        // "B" prefixes both the ambiguous "BB" and the unique "BC".
        assert_eq!(resolve("B", PIRATES), None);
    }

    #[test]
    fn colliding_munged_forms_do_not_pick_one() {
        assert_eq!(resolve("fbr", ["foo-bar", "foobar"]), None);
        assert_eq!(resolve("foobar", ["foo-bar", "foobar"]).as_deref(), Some("foobar"));
    }

    #[test]
    fn no_options_or_empty_token_never_match() {
        assert_eq!(resolve("x", Vec::<String>::new()), None);
        assert_eq!(resolve("", ["a"]), None);
        assert_eq!(resolve("zzz", ["filter", "role"]), None);
    }

    #[test]
    fn reduced_forms() {
        assert_eq!(munged_form("Flame-Grilled Steak"), "FlameGrilledSteak");
        assert_eq!(caps_form(&munged_form("Flame-Grilled Steak")), "FGS");
        assert_eq!(caps_form("lowercase"), "");
    }

    #[test]
    fn subsequence_helper() {
        assert!(is_subsequence("FLT", "FILTER"));
        assert!(!is_subsequence("FTL", "FILTER"));
        assert!(is_subsequence("", "ANY"));
    }
}
