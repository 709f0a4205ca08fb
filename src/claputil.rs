use std::ffi::OsStr;

use clap::builder::StyledStr;
use clap_complete::engine::{ArgValueCompleter, CompletionCandidate};

use crate::alias::KINDS;

/// Create an `ArgValueCompleter` that lists every resource alias the mirror understands.
///
/// Candidates carry the canonical kind as help text so `po` shows up as `pod`.
pub fn resource_value_completer() -> ArgValueCompleter {
    ArgValueCompleter::new(|input: &OsStr| -> Vec<CompletionCandidate> {
        let input = input.to_string_lossy();
        let input = input.trim();

        KINDS
            .iter()
            .flat_map(|kind| kind.aliases().map(move |alias| (alias, kind.canonical)))
            .filter(|(alias, _)| alias.starts_with(input))
            .map(|(alias, canonical)| {
                CompletionCandidate::new(alias).help(Some(StyledStr::from(canonical)))
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use super::*;

    fn complete(input: &str) -> Vec<String> {
        resource_value_completer()
            .complete(OsStr::new(input))
            .into_iter()
            .map(|candidate| candidate.get_value().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn completes_aliases_by_prefix() {
        assert_eq!(complete("po"), vec!["po", "pod", "pods"]);
        assert_eq!(complete("dep"), vec!["deploy", "deployment", "deployments"]);
        assert!(complete("x").is_empty());
    }
}
