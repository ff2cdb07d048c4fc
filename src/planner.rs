//! Transfer planning
//!
//! Turns a validated request plus a directory listing into an ordered list
//! of per-file operations. Planning is a pure function of its inputs: no
//! transport or filesystem call happens here, which keeps the branching
//! policy (direction, overwrite, move) independently testable.

use std::path::{Path, PathBuf};

use crate::error::{IglooError, IglooResult};
use crate::selector::Selector;

/// Which way bytes flow for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Push,
    Pull,
}

/// What to do when the destination already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    Overwrite,
    Skip,
}

/// One file movement, fully resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOperation {
    pub local_path: PathBuf,
    pub remote_name: String,
    pub direction: Direction,
    pub on_conflict: ConflictPolicy,
    /// Move semantics: remove the remote source once the local copy is
    /// confirmed written. Pull only.
    pub delete_source_after: bool,
}

/// Parsed transfer command, before planning
///
/// `selector` is `Some` iff an expression was given on the command line;
/// explicit `files` and an expression are mutually exclusive.
#[derive(Debug, Default)]
pub struct TransferRequest {
    pub pull: bool,
    pub list_only: bool,
    pub force: bool,
    pub move_source: bool,
    pub files: Vec<String>,
    pub selector: Option<Selector>,
    pub stream: Option<String>,
}

impl TransferRequest {
    pub fn direction(&self) -> Direction {
        if self.pull {
            Direction::Pull
        } else {
            Direction::Push
        }
    }

    /// Whether planning needs a directory listing (local or remote)
    ///
    /// Pull and list fall back to the full listing even without an
    /// expression; push only lists when filtering.
    pub fn needs_listing(&self) -> bool {
        if self.stream.is_some() {
            return false;
        }
        self.selector.is_some() || ((self.pull || self.list_only) && self.files.is_empty())
    }

    /// Reject flag combinations before anything has side effects
    pub fn validate(&self) -> IglooResult<()> {
        if self.move_source && !self.pull {
            return Err(IglooError::invalid_combination(
                "--move is only valid with --remote",
            ));
        }
        if self.list_only && (self.force || self.move_source || self.stream.is_some()) {
            return Err(IglooError::invalid_combination(
                "--list cannot be combined with --force, --move or --stream",
            ));
        }
        if self.stream.is_some() && (self.selector.is_some() || self.move_source) {
            return Err(IglooError::invalid_combination(
                "--stream cannot be combined with --expr or --move",
            ));
        }
        if self.selector.is_some() && !self.files.is_empty() {
            return Err(IglooError::invalid_combination(
                "give either an expression or explicit filepaths, not both",
            ));
        }
        Ok(())
    }

    /// Source filenames surviving selection, discovery order preserved
    ///
    /// With an expression (or a bare pull/list), `listing` is filtered
    /// through the selector; explicitly named files bypass it verbatim.
    pub fn select_names(&self, listing: &[String]) -> Vec<String> {
        if !self.files.is_empty() {
            return self.files.clone();
        }
        match &self.selector {
            Some(selector) => selector.filter(listing.iter().cloned()),
            None => Selector::match_all().filter(listing.iter().cloned()),
        }
    }
}

/// Build the ordered operation list for a request
///
/// `listing` is the directory listing matching the request's direction
/// (remote for pull/list, local for a filtered push); it is ignored when
/// explicit filenames were given.
pub fn build_plan(
    request: &TransferRequest,
    listing: &[String],
) -> IglooResult<Vec<TransferOperation>> {
    request.validate()?;

    let direction = request.direction();
    let on_conflict = if request.force {
        ConflictPolicy::Overwrite
    } else {
        ConflictPolicy::Skip
    };

    let mut names = request.select_names(listing);
    if let Some(stream_name) = &request.stream {
        if !names.contains(stream_name) {
            names.push(stream_name.clone());
        }
    }

    let operations = names
        .into_iter()
        .map(|name| {
            let (local_path, remote_name) = match direction {
                // push keeps the path it was given; the remote side is flat
                Direction::Push => (PathBuf::from(&name), basename(&name)),
                Direction::Pull => (PathBuf::from(basename(&name)), name),
            };
            TransferOperation {
                local_path,
                remote_name,
                direction,
                on_conflict,
                delete_source_after: request.move_source,
            }
        })
        .collect();

    Ok(operations)
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_request(files: &[&str]) -> TransferRequest {
        TransferRequest {
            files: files.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn listing() -> Vec<String> {
        vec!["a.txt".to_string(), "b.log".to_string()]
    }

    #[test]
    fn push_plan_takes_files_verbatim_in_order() {
        let plan = build_plan(&push_request(&["a.txt", "b.log"]), &[]).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].remote_name, "a.txt");
        assert_eq!(plan[1].remote_name, "b.log");
        for op in &plan {
            assert_eq!(op.direction, Direction::Push);
            assert_eq!(op.on_conflict, ConflictPolicy::Skip);
            assert!(!op.delete_source_after);
        }
    }

    #[test]
    fn push_flattens_remote_name_but_keeps_local_path() {
        let plan = build_plan(&push_request(&["sub/dir/a.txt"]), &[]).unwrap();
        assert_eq!(plan[0].local_path, PathBuf::from("sub/dir/a.txt"));
        assert_eq!(plan[0].remote_name, "a.txt");
    }

    #[test]
    fn push_with_move_is_invalid_regardless_of_other_flags() {
        for force in [false, true] {
            let request = TransferRequest {
                move_source: true,
                force,
                files: vec!["a.txt".to_string()],
                ..Default::default()
            };
            let err = build_plan(&request, &[]).unwrap_err();
            assert!(matches!(err, IglooError::InvalidCombination { .. }));
        }
    }

    #[test]
    fn pull_without_force_skips_conflicts_everywhere() {
        let request = TransferRequest {
            pull: true,
            ..Default::default()
        };
        let plan = build_plan(&request, &listing()).unwrap();
        assert_eq!(plan.len(), 2);
        assert!(plan
            .iter()
            .all(|op| op.on_conflict == ConflictPolicy::Skip));
    }

    #[test]
    fn pull_with_force_overwrites_everywhere() {
        let request = TransferRequest {
            pull: true,
            force: true,
            ..Default::default()
        };
        let plan = build_plan(&request, &listing()).unwrap();
        assert!(plan
            .iter()
            .all(|op| op.on_conflict == ConflictPolicy::Overwrite));
    }

    #[test]
    fn pull_defaults_to_match_all_listing() {
        let request = TransferRequest {
            pull: true,
            ..Default::default()
        };
        let plan = build_plan(&request, &listing()).unwrap();
        let names: Vec<_> = plan.iter().map(|op| op.remote_name.clone()).collect();
        assert_eq!(names, listing());
    }

    #[test]
    fn pull_filters_listing_through_selector() {
        let request = TransferRequest {
            pull: true,
            selector: Some(Selector::new(r"\.log$", false, false).unwrap()),
            ..Default::default()
        };
        let plan = build_plan(&request, &listing()).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].remote_name, "b.log");
        assert_eq!(plan[0].local_path, PathBuf::from("b.log"));
    }

    #[test]
    fn pull_move_with_inverse_match_selects_the_rest() {
        let request = TransferRequest {
            pull: true,
            move_source: true,
            selector: Some(Selector::new(r"\.log$", true, false).unwrap()),
            ..Default::default()
        };
        let plan = build_plan(&request, &listing()).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].remote_name, "a.txt");
        assert!(plan[0].delete_source_after);
    }

    #[test]
    fn stream_name_joins_the_push_set() {
        let request = TransferRequest {
            stream: Some("notes.txt".to_string()),
            ..Default::default()
        };
        let plan = build_plan(&request, &[]).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].remote_name, "notes.txt");
        assert_eq!(plan[0].direction, Direction::Push);
    }

    #[test]
    fn list_with_write_flags_is_invalid() {
        for (force, move_source) in [(true, false), (false, true)] {
            let request = TransferRequest {
                pull: true,
                list_only: true,
                force,
                move_source,
                ..Default::default()
            };
            assert!(matches!(
                request.validate(),
                Err(IglooError::InvalidCombination { .. })
            ));
        }
    }

    #[test]
    fn expression_with_explicit_files_is_invalid() {
        let request = TransferRequest {
            files: vec!["a.txt".to_string()],
            selector: Some(Selector::match_all()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn empty_request_yields_empty_plan() {
        let plan = build_plan(&TransferRequest::default(), &[]).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn needs_listing_rules() {
        assert!(!push_request(&["a.txt"]).needs_listing());
        let pull = TransferRequest {
            pull: true,
            ..Default::default()
        };
        assert!(pull.needs_listing());
        let filtered_push = TransferRequest {
            selector: Some(Selector::match_all()),
            ..Default::default()
        };
        assert!(filtered_push.needs_listing());
        let stream = TransferRequest {
            stream: Some("x".to_string()),
            ..Default::default()
        };
        assert!(!stream.needs_listing());
    }
}
