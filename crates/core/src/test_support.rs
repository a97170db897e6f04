//! Small builders shared by other crates' test suites, behind
//! `feature = "test-support"` the way `oj-core::test_support` is.

use crate::issue::{Issue, Pr};

pub fn issue(number: u64, labels: &[&str]) -> Issue {
    Issue {
        number,
        title: format!("issue {number}"),
        labels: labels.iter().map(|l| l.to_string()).collect(),
        state: "OPEN".into(),
    }
}

pub fn pr(number: u64, labels: &[&str]) -> Pr {
    Pr {
        number,
        title: format!("pr {number}"),
        labels: labels.iter().map(|l| l.to_string()).collect(),
        state: "OPEN".into(),
        review_decision: String::new(),
        head_branch: String::new(),
        linked_issue: None,
        review_cycles: 0,
    }
}
