//! Datastream identifiers and sequential dsid allocation.
//!
//! A dsid is a single URI path segment. Generated dsids are a fixed prefix
//! followed by a decimal suffix (`FOO1`, `FOO57`). Hand-assigned dsids may be
//! any non-empty segment (`abcd`, `foo.bar`).

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{TypeError, TypeResult};

/// Characters that cannot appear in a dsid, besides any whitespace.
const FORBIDDEN_CHARS: &[char] = &['/', '?', '#'];

fn is_forbidden(c: char) -> bool {
    c.is_whitespace() || FORBIDDEN_CHARS.contains(&c)
}

/// Key of a datastream within its owning object.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatastreamId(String);

impl DatastreamId {
    /// Validate and wrap a dsid.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsr_types::DatastreamId;
    ///
    /// assert!(DatastreamId::new("FOO1").is_ok());
    /// assert!(DatastreamId::new("foo.bar").is_ok());
    /// assert!(DatastreamId::new("").is_err());
    /// assert!(DatastreamId::new("a/b").is_err());
    /// ```
    pub fn new(dsid: impl Into<String>) -> TypeResult<Self> {
        let dsid: String = dsid.into();
        if dsid.is_empty() {
            return Err(TypeError::EmptyDsid);
        }
        if let Some(ch) = dsid.chars().find(|c| is_forbidden(*c)) {
            return Err(TypeError::InvalidDsid {
                dsid,
                reason: format!("contains forbidden character: {ch:?}"),
            });
        }
        Ok(Self(dsid))
    }

    /// The raw dsid string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL-parameter form of the dsid. Dots are escaped as `%2e` so that
    /// routers do not mistake the tail of the id for a format extension.
    pub fn to_param(&self) -> String {
        self.0.replace('.', "%2e")
    }

    /// The decimal suffix of this dsid under `prefix`, without leading
    /// zeros, if it has one.
    pub fn suffix_under(&self, prefix: &str) -> Option<&str> {
        parse_suffix(&self.0, prefix)
    }
}

impl fmt::Debug for DatastreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DatastreamId({})", self.0)
    }
}

impl fmt::Display for DatastreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DatastreamId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DatastreamId {
    type Error = TypeError;

    fn try_from(value: String) -> TypeResult<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for DatastreamId {
    type Error = TypeError;

    fn try_from(value: &str) -> TypeResult<Self> {
        Self::new(value)
    }
}

impl From<DatastreamId> for String {
    fn from(id: DatastreamId) -> Self {
        id.0
    }
}

/// The positive decimal suffix of `id` under `prefix`, leading zeros
/// stripped.
///
/// Returns `None` when `id` does not start with `prefix`, or when the
/// remainder is empty, contains anything but ASCII digits, or is zero.
/// Suffixes are kept as digit strings so arbitrarily long ones still order
/// correctly.
fn parse_suffix<'a>(id: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = id.strip_prefix(prefix)?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = rest.trim_start_matches('0');
    (!digits.is_empty()).then_some(digits)
}

/// Numeric order of two normalised digit strings.
fn cmp_decimal(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Add one to a normalised digit string. The empty string counts as zero.
fn increment_decimal(digits: &str) -> String {
    match digits.rfind(|c: char| c != '9') {
        Some(idx) => {
            let bumped = char::from(digits.as_bytes()[idx] + 1);
            format!("{}{bumped}{}", &digits[..idx], "0".repeat(digits.len() - idx - 1))
        }
        None => format!("1{}", "0".repeat(digits.len())),
    }
}

/// Largest suffix under `prefix`, or the empty string when there is none.
fn max_suffix<I, S>(existing: I, prefix: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut max = String::new();
    for id in existing {
        let id = id.as_ref();
        if !id.starts_with(prefix) {
            continue;
        }
        match parse_suffix(id, prefix) {
            Some(digits) if cmp_decimal(digits, &max) == Ordering::Greater => {
                max = digits.to_string();
            }
            Some(_) => {}
            None => warn!(id, prefix, "skipping id without numeric suffix"),
        }
    }
    max
}

/// Compute the next unused id in the `prefix` sequence.
///
/// Ids with other prefixes are ignored. Ids that carry the prefix but no
/// positive integer suffix are skipped, so allocation never fails. The
/// result's suffix is one more than the largest existing suffix, however
/// many digits that takes.
///
/// # Examples
///
/// ```
/// use dsr_types::next_id;
///
/// assert_eq!(next_id(Vec::<String>::new(), "FOO"), "FOO1");
/// assert_eq!(next_id(["FOO56", "BAR3"], "FOO"), "FOO57");
/// assert_eq!(next_id(["FOOx"], "FOO"), "FOO1");
/// assert_eq!(next_id(["FOO999"], "FOO"), "FOO1000");
/// ```
pub fn next_id<I, S>(existing: I, prefix: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    format!("{prefix}{}", increment_decimal(&max_suffix(existing, prefix)))
}

/// Typed form of [`next_id`].
///
/// Fails only if `prefix` itself contains characters that are not allowed in
/// a dsid; an empty prefix is allowed since the suffix is never empty.
pub fn next_dsid<'a, I>(existing: I, prefix: &str) -> TypeResult<DatastreamId>
where
    I: IntoIterator<Item = &'a DatastreamId>,
{
    DatastreamId::new(next_id(existing, prefix))
}

/// Sequential allocator over a snapshot of existing dsids.
///
/// Each [`allocate`](Self::allocate) registers the id it returns, so
/// successive calls yield `FOO1`, `FOO2`, ... Not internally synchronised:
/// callers sharing an owner across threads must serialise allocation.
#[derive(Debug, Clone)]
pub struct DsidAllocator {
    prefix: String,
    next_suffix: String,
}

impl DsidAllocator {
    /// Create an allocator for `prefix` seeded from the existing dsids.
    pub fn new<I, S>(prefix: impl Into<String>, existing: I) -> TypeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefix: String = prefix.into();
        if let Some(ch) = prefix.chars().find(|c| is_forbidden(*c)) {
            return Err(TypeError::InvalidDsid {
                dsid: prefix,
                reason: format!("prefix contains forbidden character: {ch:?}"),
            });
        }
        let next_suffix = increment_decimal(&max_suffix(existing, &prefix));
        Ok(Self {
            prefix,
            next_suffix,
        })
    }

    /// The prefix this allocator hands out.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The id the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> String {
        format!("{}{}", self.prefix, self.next_suffix)
    }

    /// Record an externally assigned id so it is never handed out.
    pub fn register(&mut self, id: &str) {
        if let Some(digits) = parse_suffix(id, &self.prefix) {
            if cmp_decimal(digits, &self.next_suffix) != Ordering::Less {
                self.next_suffix = increment_decimal(digits);
            }
        }
    }

    /// Return the next id and register it.
    pub fn allocate(&mut self) -> DatastreamId {
        let id = DatastreamId(self.peek());
        self.next_suffix = increment_decimal(&self.next_suffix);
        debug!(dsid = %id, "allocated dsid");
        id
    }
}
