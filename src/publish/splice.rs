//! Container splice.
//!
//! Replaces the inner markup of the first `<tag ...>...</tag>` region. This is
//! plain text substitution, not an HTML parse: the opening and closing tags
//! are kept byte-for-byte, later occurrences of the tag are left alone, and
//! the fragment is not checked for well-formedness.

use regex::Regex;

/// Compiled matcher for one container tag
#[derive(Debug, Clone)]
pub struct ContainerSplicer {
    tag: String,
    pattern: Regex,
}

impl ContainerSplicer {
    pub fn new(tag: &str) -> Result<Self, regex::Error> {
        let escaped = regex::escape(tag);
        let pattern = Regex::new(&format!(r"(?is)(<{escaped}(?:\s[^>]*)?>)(.*?)(</{escaped}>)"))?;
        Ok(Self {
            tag: tag.to_string(),
            pattern,
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Swap the first region's inner markup for `fragment`.
    ///
    /// Returns `None` when the document has no such region. The fragment is
    /// inserted literally, `$` sequences are not expanded.
    pub fn splice(&self, document: &str, fragment: &str) -> Option<String> {
        let caps = self.pattern.captures(document)?;
        let inner = caps.get(2)?;

        let mut out = String::with_capacity(document.len() - inner.len() + fragment.len());
        out.push_str(&document[..inner.start()]);
        out.push_str(fragment);
        out.push_str(&document[inner.end()..]);
        Some(out)
    }
}
