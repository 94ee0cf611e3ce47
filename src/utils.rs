/// Longest prefix of `text` holding at most `limit` characters
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Removes a code fence wrapped around a whole markdown reply
///
/// Models sometimes answer with the brochure inside ```` ```markdown ````;
/// rendered as-is that shows up as a code block.
pub fn strip_markdown_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return text;
    };
    let inner = inner
        .strip_prefix("markdown")
        .or_else(|| inner.strip_prefix("md"))
        .unwrap_or(inner);
    inner.trim_matches('\n')
}

/// [`strip_markdown_fence`] for a reply arriving in fragments
///
/// Text is held back only while it could still be part of an opening fence
/// line or of a closing fence at the very end; everything else passes
/// through as soon as it is pushed.
#[derive(Debug, Default)]
pub struct FenceStripper {
    head: String,
    started: bool,
    fenced: bool,
    tail: String,
}

impl FenceStripper {
    /// Feeds one fragment and returns the text that can be shown now
    pub fn push(&mut self, fragment: &str) -> String {
        let text = if self.started {
            fragment.to_string()
        } else {
            self.head.push_str(fragment);
            let opening = self.head.trim_start();
            if opening.len() < 3 && "```".starts_with(opening) {
                return String::new();
            }
            if opening.starts_with("```") {
                // Wait for the whole opening line, e.g. "```markdown\n"
                let Some(newline) = opening.find('\n') else {
                    return String::new();
                };
                let rest = opening[newline + 1..].to_string();
                self.head.clear();
                self.started = true;
                self.fenced = true;
                rest
            } else {
                self.started = true;
                std::mem::take(&mut self.head)
            }
        };

        if !self.fenced {
            return text;
        }
        self.tail.push_str(&text);
        let keep = self
            .tail
            .trim_end_matches(|c: char| c == '`' || c.is_whitespace())
            .len();
        let ready = self.tail[..keep].to_string();
        self.tail.drain(..keep);
        ready
    }

    /// Returns whatever was held back, minus a closing fence
    pub fn finish(&mut self) -> String {
        if !self.started {
            return std::mem::take(&mut self.head);
        }
        let tail = std::mem::take(&mut self.tail);
        if self.fenced && tail.trim() == "```" {
            String::new()
        } else {
            tail
        }
    }
}
