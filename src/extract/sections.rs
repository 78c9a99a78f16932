use anyhow::Result;
use regex::{Regex, RegexBuilder};

use crate::models::Section;

/// Matches any single-line bracketed table header (`[package]`, `[[bin]]`, ...).
pub(crate) const ANY_HEADER: &str = r"^\[.*\]$";

/// Slices recognized dependency tables out of a manifest.
///
/// Recognized headers are matched case-insensitively against the trimmed line
/// as a prefix, so `[dependencies] # pinned` still opens a section. Any other
/// header closes the open section without starting a new one.
pub struct SectionExtractor {
    patterns: Vec<(Regex, String)>,
    any_header: Regex,
}

impl SectionExtractor {
    pub fn new(headers: &[String]) -> Result<Self> {
        let patterns = headers
            .iter()
            .map(|name| -> Result<(Regex, String)> {
                let re = RegexBuilder::new(&format!(r"^\[{}\]", regex::escape(name)))
                    .case_insensitive(true)
                    .build()?;
                Ok((re, name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            any_header: Regex::new(ANY_HEADER)?,
        })
    }

    /// Extract every recognized section, in order of first appearance.
    ///
    /// A header repeated within one document replaces the earlier body.
    pub fn extract(&self, document: &str) -> Vec<Section> {
        let mut sections: Vec<Section> = Vec::new();
        let mut current: Option<(String, Vec<&str>)> = None;

        for line in document.split('\n') {
            let trimmed = line.trim();

            let recognized = self
                .patterns
                .iter()
                .find(|(re, _)| re.is_match(trimmed))
                .map(|(_, name)| name.clone());

            match recognized {
                Some(name) => {
                    flush(&mut sections, current.take());
                    current = Some((name, vec![line]));
                }
                None if self.any_header.is_match(trimmed) => {
                    flush(&mut sections, current.take());
                }
                None => {
                    if let Some((_, body)) = current.as_mut() {
                        body.push(line);
                    }
                }
            }
        }

        flush(&mut sections, current);
        sections
    }
}

fn flush(sections: &mut Vec<Section>, current: Option<(String, Vec<&str>)>) {
    let Some((name, lines)) = current else {
        return;
    };
    if lines.is_empty() {
        return;
    }

    let body = lines.join("\n");
    match sections.iter_mut().find(|s| s.name == name) {
        Some(existing) => existing.body = body,
        None => sections.push(Section { name, body }),
    }
}
