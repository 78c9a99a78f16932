use anyhow::Result;
use regex::Regex;

use super::sections::ANY_HEADER;
use crate::models::Group;

/// Splits a section body into blank-line separated groups.
///
/// Lines inside an unbalanced `[`/`{` run stay in the same group even across
/// blank lines. Candidates without a non-comment `key = value` line are dropped
/// and do not consume an index.
pub struct GroupSplitter {
    header: Regex,
}

impl GroupSplitter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            header: Regex::new(ANY_HEADER)?,
        })
    }

    pub fn split(&self, body: &str) -> Vec<Group> {
        let lines: Vec<&str> = body.split('\n').collect();

        let start = lines
            .iter()
            .position(|l| self.header.is_match(l.trim()))
            .map(|i| i + 1)
            .unwrap_or(0);

        let mut groups = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut in_multiline = false;
        let mut depth: i64 = 0;

        for &line in &lines[start..] {
            let delta = bracket_delta(line);
            if !in_multiline {
                if delta > 0 {
                    in_multiline = true;
                    depth = delta;
                }
            } else {
                depth += delta;
                if depth <= 0 {
                    in_multiline = false;
                    depth = 0;
                }
            }

            if line.trim().is_empty() && !in_multiline {
                push_candidate(&mut groups, &current);
                current.clear();
            } else {
                current.push(line);
            }
        }

        push_candidate(&mut groups, &current);
        groups
    }
}

/// Opening minus closing brackets (`[`, `{`, `]`, `}`) on one line.
fn bracket_delta(line: &str) -> i64 {
    line.chars().fold(0, |acc, c| match c {
        '[' | '{' => acc + 1,
        ']' | '}' => acc - 1,
        _ => acc,
    })
}

/// True when at least one line looks like an assignment rather than a comment.
fn has_assignment(lines: &[&str]) -> bool {
    lines.iter().any(|l| {
        let t = l.trim();
        !t.is_empty() && !t.starts_with('#') && t.contains('=')
    })
}

fn push_candidate(groups: &mut Vec<Group>, lines: &[&str]) {
    if lines.is_empty() || !has_assignment(lines) {
        return;
    }
    groups.push(Group {
        index: groups.len() + 1,
        text: lines.join("\n"),
    });
}
