use grep::regex::RegexMatcher;
use grep::searcher::{Searcher, Sink, SinkMatch};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

// Directories holding crate sources. Everything else in the checkout is ignored.
const SOURCE_DIRS: [&str; 6] = ["score", "price", "portfolio", "cli", "tests", "benches"];

const FORBIDDEN_WORDS: [&str; 14] = [
    "FIXED",
    "CORRECTED",
    "FIX",
    "FIXES",
    "NEW",
    "CHANGED",
    "CHANGES",
    "CHANGE",
    "MODIFIED",
    "MODIFIES",
    "MODIFY",
    "UPDATED",
    "UPDATES",
    "UPDATE",
];

// How a matched line is judged once the regex has fired.
#[derive(Clone, Copy)]
enum Rule {
    UnderscorePrefix,
    ForbiddenWords,
    StarsOutsideDocs,
    AllCapsComment,
    AllowDeadCode,
}

struct Policy {
    rule: Rule,
    pattern: &'static str,
    headline: &'static str,
    advice: &'static str,
}

const POLICIES: [Policy; 5] = [
    Policy {
        rule: Rule::UnderscorePrefix,
        pattern: r"\b(_[a-zA-Z0-9_]+)\b",
        headline: "underscore-prefixed identifiers",
        advice: "Either use the binding (removing the underscore) or remove it completely.",
    },
    Policy {
        rule: Rule::ForbiddenWords,
        pattern: r"(//|/\*|///).*(?:FIXED|CORRECTED|FIX|FIXES|NEW|CHANGED|CHANGES|CHANGE|MODIFIED|MODIFIES|MODIFY|UPDATED|UPDATES|UPDATE)",
        headline: "comments narrating edits",
        advice: "Comments describe the code as it is. Remove change-log wording instead of commenting it out.",
    },
    Policy {
        rule: Rule::StarsOutsideDocs,
        pattern: r"(//|/\*).*\*\*",
        headline: "'**' in regular comments",
        advice: "Emphasis markers are only allowed in doc comments.",
    },
    Policy {
        rule: Rule::AllCapsComment,
        pattern: r"(//|/\*|///).*",
        headline: "comments written entirely in uppercase",
        advice: "Rewrite the comment in sentence case or delete it.",
    },
    Policy {
        rule: Rule::AllowDeadCode,
        pattern: r"#\s*\[\s*allow\s*\(\s*dead_code\s*\)\s*\]",
        headline: "#[allow(dead_code)] attributes",
        advice: "Either use the code (removing the attribute) or remove it completely.",
    },
];

struct Collector {
    rule: Rule,
    violations: Vec<String>,
}

impl Collector {
    fn new(rule: Rule) -> Self {
        Self {
            rule,
            violations: Vec::new(),
        }
    }

    fn report(&self, policy: &Policy, file_path: &Path) -> Option<String> {
        if self.violations.is_empty() {
            return None;
        }
        let mut msg = format!(
            "\n❌ ERROR: Found {} {} in {}:\n",
            self.violations.len(),
            policy.headline,
            file_path.display()
        );
        for violation in &self.violations {
            msg.push_str(&format!("   {violation}\n"));
        }
        msg.push_str(&format!("\n⚠️ {}\n", policy.advice));
        Some(msg)
    }
}

fn is_doc_comment(line: &str) -> bool {
    line.trim_start().starts_with("///")
}

fn comment_body(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed.strip_prefix("///") {
        return Some(rest.trim());
    }
    if let Some(rest) = trimmed.strip_prefix("//") {
        return Some(rest.trim());
    }
    let start = line.find("/*")? + 2;
    let body = &line[start..];
    Some(match body.find("*/") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    })
}

// Underscore matches inside string literals or pure comment lines are not bindings.
fn underscore_is_binding(line: &str) -> bool {
    if line.trim_start().starts_with("//") {
        return false;
    }
    !line
        .split('"')
        .enumerate()
        .any(|(i, part)| i % 2 == 1 && part.contains('_'))
}

impl Sink for Collector {
    type Error = std::io::Error;

    fn matched(&mut self, _: &Searcher, mat: &SinkMatch) -> Result<bool, Self::Error> {
        let line_number = mat.line_number().unwrap_or(0);
        let line = std::str::from_utf8(mat.bytes()).unwrap_or("").trim_end();

        let violates = match self.rule {
            Rule::UnderscorePrefix => underscore_is_binding(line),
            Rule::ForbiddenWords | Rule::AllowDeadCode => true,
            Rule::StarsOutsideDocs => {
                !is_doc_comment(line) || FORBIDDEN_WORDS.iter().any(|w| line.contains(w))
            }
            Rule::AllCapsComment => comment_body(line).is_some_and(|body| {
                let mut letters = body.chars().filter(|c| c.is_alphabetic()).peekable();
                letters.peek().is_some() && letters.all(char::is_uppercase)
            }),
        };

        if violates {
            self.violations.push(format!("{line_number}:{line}"));
        }
        Ok(true)
    }
}

fn source_files() -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = SOURCE_DIRS
        .iter()
        .flat_map(|dir| WalkDir::new(dir).into_iter().filter_map(|e| e.ok()))
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn enforce_source_policies(files: &[PathBuf]) -> Result<(), Box<dyn Error>> {
    let mut searcher = Searcher::new();
    for policy in &POLICIES {
        let matcher = RegexMatcher::new_line_matcher(policy.pattern)?;
        for path in files {
            let mut collector = Collector::new(policy.rule);
            searcher.search_path(&matcher, path, &mut collector)?;
            if let Some(msg) = collector.report(policy, path) {
                return Err(msg.into());
            }
        }
    }
    Ok(())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    for dir in SOURCE_DIRS {
        println!("cargo:rerun-if-changed={dir}");
    }

    let files = source_files();
    if let Err(e) = enforce_source_policies(&files) {
        // eprintln so the report shows up in cargo's output
        eprintln!("{e}");
        std::process::exit(1);
    }

    // Read back by `idearank version` to show the build age.
    let built_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    println!("cargo:rustc-env=IDEARANK_BUILD_TIMESTAMP={built_at}");
}
