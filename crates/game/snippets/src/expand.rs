//! `<category>` tag expansion.

use crate::error::ExpandError;
use crate::registry::SnippetRegistry;
use crate::rng::{SeedSource, ThreadSeeds};

impl SnippetRegistry {
    /// Replaces `<category>` tags in `input` with random entries of the
    /// category named by the tag, delimiters included.
    ///
    /// Replacements are expanded in turn, so an entry may contain further
    /// tags. Tags that do not name a category are left as written.
    ///
    /// # Errors
    ///
    /// [`ExpandError::DepthExceeded`] if replacements nest deeper than
    /// [`SnippetConfig::max_expansion_depth`](crate::SnippetConfig::max_expansion_depth).
    pub fn expand(&self, input: &str) -> Result<String, ExpandError> {
        self.expand_with(input, &mut ThreadSeeds)
    }

    /// [`expand`](Self::expand) drawing one seed per replaced tag from `seeds`.
    ///
    /// With a deterministic source such as [`SnippetRng`](crate::SnippetRng)
    /// the output is reproducible.
    pub fn expand_with(
        &self,
        input: &str,
        seeds: &mut dyn SeedSource,
    ) -> Result<String, ExpandError> {
        self.expand_at_depth(input, seeds, 0)
    }

    fn expand_at_depth(
        &self,
        input: &str,
        seeds: &mut dyn SeedSource,
        depth: usize,
    ) -> Result<String, ExpandError> {
        let mut output = String::with_capacity(input.len());
        let mut rest = input;

        loop {
            let Some((begin, end)) = find_tag(rest) else {
                output.push_str(rest);
                return Ok(output);
            };
            let tag = &rest[begin..=end];

            match self.pick_from_category(tag, seeds) {
                None => output.push_str(&rest[..=end]),
                Some(replacement) => {
                    let max_depth = self.config().max_expansion_depth;
                    if depth >= max_depth {
                        tracing::error!(
                            "snippet expansion of {} exceeded maximum depth {}",
                            tag,
                            max_depth
                        );
                        return Err(ExpandError::DepthExceeded {
                            tag: tag.to_owned(),
                            depth: max_depth,
                        });
                    }
                    output.push_str(&rest[..begin]);
                    let expanded =
                        self.expand_at_depth(&replacement.translated(), seeds, depth + 1)?;
                    output.push_str(&expanded);
                }
            }

            rest = &rest[end + 1..];
        }
    }
}

/// Byte offsets of the first `<` and the next `>` after it.
fn find_tag(text: &str) -> Option<(usize, usize)> {
    let begin = text.find('<')?;
    let end = begin + 1 + text[begin + 1..].find('>')?;
    Some((begin, end))
}
