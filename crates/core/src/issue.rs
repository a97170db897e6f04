//! Issue and PR views as fetched from the platform, grounded on spec §3 and
//! on the field set `loom_tools/common/github.py` actually requests
//! (`number`, `title`, `labels`, `state`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub labels: Vec<String>,
    pub state: String,
}

impl Issue {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pr {
    pub number: u64,
    pub title: String,
    pub labels: Vec<String>,
    pub state: String,
    /// GitHub's aggregate review decision, e.g. `"CHANGES_REQUESTED"`,
    /// `"APPROVED"`, or empty when no review has been requested yet.
    #[serde(default)]
    pub review_decision: String,
    /// The branch this PR builds from (`headRefName`), per spec §3's
    /// `headBranch` attribute. Also the fallback signal for
    /// [`derive_linked_issue`] when the PR body carries no closing
    /// keyword.
    #[serde(default)]
    pub head_branch: String,
    /// Issue number this PR closes, derived by [`derive_linked_issue`] from
    /// the PR body/branch name at fetch time — never set by hand.
    #[serde(default)]
    pub linked_issue: Option<u64>,
    /// How many `changes-requested -> commits pushed` cycles this PR has
    /// been through, derived by the platform client from the PR's review
    /// and commit timeline at fetch time.
    #[serde(default)]
    pub review_cycles: u32,
}

impl Pr {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn is_merged(&self) -> bool {
        self.state.eq_ignore_ascii_case("MERGED")
    }
}

/// Parse an issue number out of a PR body's closing keyword — `Closes #42`,
/// `Fixes #42`, `Resolves #42` (and their singular/plural, case-insensitive
/// variants, with or without a colon) — the convention GitHub itself uses
/// to auto-link a PR to the issue it closes.
pub fn issue_from_closing_keyword(body: &str) -> Option<u64> {
    let lower = body.to_ascii_lowercase();
    for keyword in ["closes", "close", "closed", "fixes", "fix", "fixed", "resolves", "resolve", "resolved"] {
        let mut search_from = 0;
        while let Some(found) = lower[search_from..].find(keyword) {
            let idx = search_from + found;
            let rest = &body[idx + keyword.len()..];
            let rest = rest.trim_start();
            let rest = rest.strip_prefix(':').map(str::trim_start).unwrap_or(rest);
            if let Some(rest) = rest.strip_prefix('#') {
                let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                if !digits.is_empty() {
                    if let Ok(number) = digits.parse() {
                        return Some(number);
                    }
                }
            }
            search_from = idx + keyword.len();
        }
    }
    None
}

/// Parse an issue number out of a branch name following the `.../issue-<n>`
/// convention `loom-worktree` creates branches under (`loom/issue-<n>`).
pub fn issue_from_branch_name(head_ref: &str) -> Option<u64> {
    let lower = head_ref.to_ascii_lowercase();
    let idx = lower.find("issue")?;
    let rest = &head_ref[idx + "issue".len()..];
    let digits: String = rest
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Derive the issue a PR closes: prefer the body's closing keyword, fall
/// back to the head branch's `issue-<n>` naming convention. Per spec §3
/// ("linked issue (derived)"), applied once at fetch time by the platform
/// client rather than carried as raw input.
pub fn derive_linked_issue(body: &str, head_branch: &str) -> Option<u64> {
    issue_from_closing_keyword(body).or_else(|| issue_from_branch_name(head_branch))
}
