//! Version ordering.
//!
//! [`ComparableVersion`] implements Maven's generic version ordering: a
//! version is split into items on `.`, `-`, and transitions between digits
//! and letters. Numbers compare numerically (of any length), qualifiers by
//! their well-known rank, and trailing "null" items (`0`, `ga`, `final`,
//! `release`) are insignificant, so `1.0` equals `1`.
//!
//! [`compare`] adds the lookup-specific normalization on top: a leading `v`
//! and any `-jdkN`/`.jdkN` tail are ignored.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Qualifiers in ascending order. The empty string is the release itself.
const QUALIFIERS: [&str; 7] = ["alpha", "beta", "milestone", "rc", "snapshot", "", "sp"];

/// Rank of the release qualifier, as a comparable string.
const RELEASE_RANK: &str = "5";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    /// Digits with leading zeros stripped; zero is `"0"`.
    Int(String),
    /// Lowercased qualifier after alias expansion.
    Str(String),
    List(Vec<Item>),
}

impl Item {
    fn int(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Self::Int("0".to_string())
        } else {
            Self::Int(trimmed.to_string())
        }
    }

    fn string(value: &str, followed_by_digit: bool) -> Self {
        let value = if followed_by_digit && value.len() == 1 {
            match value {
                "a" => "alpha",
                "b" => "beta",
                "m" => "milestone",
                other => other,
            }
        } else {
            value
        };
        let value = match value {
            "ga" | "final" | "release" => "",
            "cr" => "rc",
            other => other,
        };
        Self::Str(value.to_string())
    }

    fn parse(digit: bool, buf: &str) -> Self {
        if digit {
            Self::int(buf)
        } else {
            Self::string(buf, false)
        }
    }

    fn is_null(&self) -> bool {
        match self {
            Self::Int(v) => v == "0",
            Self::Str(v) => qualifier_rank(v) == RELEASE_RANK,
            Self::List(items) => items.is_empty(),
        }
    }

    /// Compare against another item, `None` standing for the padding used
    /// when one version has fewer items than the other.
    fn compare(&self, other: Option<&Self>) -> Ordering {
        match (self, other) {
            (Self::Int(v), None) => {
                if v == "0" {
                    Ordering::Equal
                } else {
                    Ordering::Greater
                }
            }
            (Self::Int(a), Some(Self::Int(b))) => compare_digits(a, b),
            (Self::Int(_), Some(Self::Str(_) | Self::List(_))) => Ordering::Greater,

            (Self::Str(v), None) => qualifier_rank(v).as_str().cmp(RELEASE_RANK),
            (Self::Str(_), Some(Self::Int(_) | Self::List(_))) => Ordering::Less,
            (Self::Str(a), Some(Self::Str(b))) => qualifier_rank(a).cmp(&qualifier_rank(b)),

            (Self::List(items), None) => items
                .first()
                .map_or(Ordering::Equal, |first| first.compare(None)),
            (Self::List(_), Some(Self::Int(_))) => Ordering::Less,
            (Self::List(_), Some(Self::Str(_))) => Ordering::Greater,
            (Self::List(left), Some(Self::List(right))) => compare_lists(left, right),
        }
    }
}

fn compare_lists(left: &[Item], right: &[Item]) -> Ordering {
    let mut l = left.iter();
    let mut r = right.iter();
    loop {
        let result = match (l.next(), r.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(r)) => r.compare(None).reverse(),
            (Some(l), r) => l.compare(r),
        };
        if result != Ordering::Equal {
            return result;
        }
    }
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn qualifier_rank(qualifier: &str) -> String {
    QUALIFIERS
        .iter()
        .position(|q| *q == qualifier)
        .map_or_else(|| format!("{}-{qualifier}", QUALIFIERS.len()), |i| i.to_string())
}

/// Drop trailing null items. Stops at the first non-null item that is not a
/// nested list.
fn normalize_items(items: &mut Vec<Item>) {
    let mut i = items.len();
    while i > 0 {
        i -= 1;
        if items[i].is_null() {
            items.remove(i);
        } else if !matches!(items[i], Item::List(_)) {
            break;
        }
    }
}

fn parse_items(version: &str) -> Vec<Item> {
    let version = version.to_lowercase();
    let chars: Vec<char> = version.chars().collect();
    let mut stack: Vec<Vec<Item>> = vec![Vec::new()];
    let mut digit = false;
    let mut start = 0;

    let slice = |from: usize, to: usize| chars[from..to].iter().collect::<String>();

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '.' | '-' => {
                let item = if i == start {
                    Item::int("0")
                } else {
                    Item::parse(digit, &slice(start, i))
                };
                if let Some(list) = stack.last_mut() {
                    list.push(item);
                }
                start = i + 1;
                if c == '-' {
                    stack.push(Vec::new());
                }
            }
            c if c.is_ascii_digit() => {
                if !digit && i > start {
                    if let Some(list) = stack.last_mut() {
                        list.push(Item::string(&slice(start, i), true));
                    }
                    start = i;
                    stack.push(Vec::new());
                }
                digit = true;
            }
            _ => {
                if digit && i > start {
                    if let Some(list) = stack.last_mut() {
                        list.push(Item::parse(true, &slice(start, i)));
                    }
                    start = i;
                    stack.push(Vec::new());
                }
                digit = false;
            }
        }
    }

    if chars.len() > start
        && let Some(list) = stack.last_mut()
    {
        list.push(Item::parse(digit, &slice(start, chars.len())));
    }

    // Each nested list is the last element of its parent.
    while stack.len() > 1 {
        let Some(mut child) = stack.pop() else { break };
        normalize_items(&mut child);
        if let Some(parent) = stack.last_mut() {
            parent.push(Item::List(child));
        }
    }
    let mut root = stack.pop().unwrap_or_default();
    normalize_items(&mut root);
    root
}

/// A parsed version with Maven ordering.
#[derive(Debug, Clone)]
pub struct ComparableVersion {
    original: String,
    items: Vec<Item>,
}

impl ComparableVersion {
    /// Parse a version string. Parsing never fails.
    #[must_use]
    pub fn new(version: &str) -> Self {
        Self {
            original: version.to_string(),
            items: parse_items(version),
        }
    }

    /// The string this version was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.original
    }
}

impl FromStr for ComparableVersion {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl fmt::Display for ComparableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl PartialEq for ComparableVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ComparableVersion {}

impl PartialOrd for ComparableVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComparableVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_lists(&self.items, &other.items)
    }
}

/// Strip a leading `v` and everything from the first `-jdk` or `.jdk`.
#[must_use]
pub fn normalize(version: &str) -> &str {
    let mut version = version.strip_prefix('v').unwrap_or(version);
    if let Some(idx) = version.find("-jdk") {
        version = &version[..idx];
    }
    if let Some(idx) = version.find(".jdk") {
        version = &version[..idx];
    }
    version
}

/// Compare two version strings after [`normalize`].
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    ComparableVersion::new(normalize(a)).cmp(&ComparableVersion::new(normalize(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn less(a: &str, b: &str) {
        assert_eq!(compare(a, b), Ordering::Less, "{a} < {b}");
        assert_eq!(compare(b, a), Ordering::Greater, "{b} > {a}");
    }

    fn equal(a: &str, b: &str) {
        assert_eq!(compare(a, b), Ordering::Equal, "{a} == {b}");
        assert_eq!(compare(b, a), Ordering::Equal, "{b} == {a}");
    }

    #[test]
    fn test_numeric_ordering() {
        less("1", "2");
        less("1.2.3", "1.2.4");
        less("1.2.9", "1.2.10");
        less("0.9.2709", "3.5.3");
        assert_eq!(compare("2", "1"), Ordering::Greater);
    }

    #[test]
    fn test_qualifier_ordering() {
        less("1.0-beta1", "1.0-beta2");
        less("1.0-beta", "1.0-beta1");
        less("1.0-beta3", "1.0-GA");
        less("1.0-beta3", "1.0-release");
        less("1.0-beta3", "1.0-final");
        less("1.0-beta33", "1.0-GA");
        less("1.0-alpha92", "1.0-beta22");
        less("1.2.40-beta2", "1.2.40");
        less("1.2.4-beta3", "1.2.4");
        less("1.0-alpha", "1.0-beta");
        less("1.0-milestone", "1.0-rc");
        less("1.0-rc", "1.0-SNAPSHOT");
        less("1.0-SNAPSHOT", "1.0");
        less("1.0", "1.0-sp");
        less("1.0-sp", "1.0-zzz");
    }

    #[test]
    fn test_aliases() {
        equal("1.0-cr1", "1.0-rc1");
        equal("1.0a1", "1.0-alpha-1");
        equal("1.0b2", "1.0-beta-2");
        equal("1.0m3", "1.0-milestone-3");
        equal("1.2.4-GA", "1.2.4-GA");
        equal("1.0-ga", "1.0");
        equal("1.0.final", "1");
    }

    #[test]
    fn test_trailing_zeros_are_insignificant() {
        equal("1", "1.0");
        equal("1", "1.0.0");
        equal("1.0-1", "1-1");
        equal("01.002", "1.2");
    }

    #[test]
    fn test_jdk_suffix_and_prefix_stripped() {
        equal("1.2.9", "1.2.9-jdk11");
        equal("1.2.9", "1.2.9.jdk8");
        equal("v2.0", "2.0");
        assert_eq!(normalize("v1.2-jdk11"), "1.2");
    }

    #[test]
    fn test_huge_numbers_do_not_overflow() {
        less("1.99999999999999999999", "1.100000000000000000000");
        equal("1.000000000000000000001", "1.1");
    }

    #[test]
    fn test_comparable_version_traits() {
        let mut versions: Vec<ComparableVersion> = ["1.10", "1.2", "1.2-beta", "1.0"]
            .iter()
            .map(|v| ComparableVersion::new(v))
            .collect();
        versions.sort();
        let sorted: Vec<&str> = versions.iter().map(ComparableVersion::as_str).collect();
        assert_eq!(sorted, vec!["1.0", "1.2-beta", "1.2", "1.10"]);
    }
}
