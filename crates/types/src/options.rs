use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_NUMBER_FORMAT: &str = "Page {page} of {total}";

/// Runtime overrides supplied by the caller.
///
/// Every field is optional: a value set here wins over the template's
/// directive, which in turn wins over the built-in default. The `effective_*`
/// methods apply that precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationOptions {
    pub include_page_numbers: Option<bool>,
    pub page_number_format: Option<String>,
    pub watermark: Option<String>,
    pub compress: Option<bool>,
}

impl GenerationOptions {
    pub fn effective_include_page_numbers(&self, directive: Option<bool>) -> bool {
        self.include_page_numbers.or(directive).unwrap_or(true)
    }

    pub fn effective_page_number_format<'a>(&'a self, directive: Option<&'a str>) -> &'a str {
        self.page_number_format
            .as_deref()
            .or(directive)
            .unwrap_or(DEFAULT_PAGE_NUMBER_FORMAT)
    }

    pub fn effective_watermark<'a>(&'a self, directive: Option<&'a str>) -> Option<&'a str> {
        self.watermark
            .as_deref()
            .or(directive)
            .filter(|w| !w.trim().is_empty())
    }

    pub fn effective_compress(&self) -> bool {
        self.compress.unwrap_or(true)
    }

    /// Fills every unset field from `fallback`.
    pub fn with_fallback(&self, fallback: &GenerationOptions) -> GenerationOptions {
        GenerationOptions {
            include_page_numbers: self.include_page_numbers.or(fallback.include_page_numbers),
            page_number_format: self
                .page_number_format
                .clone()
                .or_else(|| fallback.page_number_format.clone()),
            watermark: self.watermark.clone().or_else(|| fallback.watermark.clone()),
            compress: self.compress.or(fallback.compress),
        }
    }
}

/// One piece of a page-number format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageNumberToken<'a> {
    Text(&'a str),
    Page,
    Total,
}

/// Splits a format such as `"Page {page} of {total}"` into literal text and
/// page/total placeholders. Unknown `{...}` sequences stay literal.
pub fn tokenize_page_format(format: &str) -> Vec<PageNumberToken<'_>> {
    let mut tokens = Vec::new();
    let mut rest = format;
    while !rest.is_empty() {
        let next = [("{page}", PageNumberToken::Page), ("{total}", PageNumberToken::Total)]
            .into_iter()
            .filter_map(|(pat, tok)| rest.find(pat).map(|idx| (idx, pat.len(), tok)))
            .min_by_key(|(idx, _, _)| *idx);
        match next {
            Some((idx, len, tok)) => {
                if idx > 0 {
                    tokens.push(PageNumberToken::Text(&rest[..idx]));
                }
                tokens.push(tok);
                rest = &rest[idx + len..];
            }
            None => {
                tokens.push(PageNumberToken::Text(rest));
                break;
            }
        }
    }
    tokens
}

/// True if the text contains a `{page}` or `{total}` placeholder.
pub fn has_page_tokens(text: &str) -> bool {
    text.contains("{page}") || text.contains("{total}")
}

/// Substitutes page placeholders with concrete numbers.
pub fn substitute_page_tokens(text: &str, page: usize, total: usize) -> String {
    text.replace("{page}", &page.to_string())
        .replace("{total}", &total.to_string())
}
