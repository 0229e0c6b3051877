//! Individual processing steps

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::asset::{Asset, AssetTransformer, RegisterTemplate, path};
use crate::bundle::Bundle;
use crate::error::{Result, fs};
use crate::hash;
use crate::reference::{DirectiveKind, ReferenceParser};

static CSS_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\burl\(\s*(?:"([^"]*)"|'([^']*)'|([^'")\s]*))\s*\)"#)
        .unwrap_or_else(|e| unreachable!("invalid CSS url pattern: {e}"))
});

/// Which bytes reference parsing reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Untransformed source
    Original,
    /// Source with the asset's transformers applied
    Transformed,
}

/// One stage of bundle processing
#[derive(Clone)]
pub enum PipelineStep {
    /// Scan each source asset for directives and record what they name
    ParseReferences(ReadPolicy),
    /// Record `url(...)` targets of stylesheets as raw file references
    ParseCssUrls,
    /// Wrap html templates so they register with a JavaScript variable
    RegisterTemplates { variable: String },
    /// Add a transformer to every asset
    Transform(Arc<dyn AssetTransformer>),
    /// Compute and assign the bundle hash
    AssignHash,
}

impl fmt::Debug for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStep::ParseReferences(policy) => {
                f.debug_tuple("ParseReferences").field(policy).finish()
            }
            PipelineStep::ParseCssUrls => f.write_str("ParseCssUrls"),
            PipelineStep::RegisterTemplates { variable } => f
                .debug_struct("RegisterTemplates")
                .field("variable", variable)
                .finish(),
            PipelineStep::Transform(transformer) => {
                f.debug_tuple("Transform").field(&transformer.name()).finish()
            }
            PipelineStep::AssignHash => f.write_str("AssignHash"),
        }
    }
}

impl PipelineStep {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStep::ParseReferences(_) => "parse_references",
            PipelineStep::ParseCssUrls => "parse_css_urls",
            PipelineStep::RegisterTemplates { .. } => "register_templates",
            PipelineStep::Transform(_) => "transform",
            PipelineStep::AssignHash => "assign_hash",
        }
    }

    pub fn apply(&self, bundle: &mut Bundle) -> Result<()> {
        match self {
            PipelineStep::ParseReferences(policy) => parse_references(bundle, *policy),
            PipelineStep::ParseCssUrls => parse_css_urls(bundle),
            PipelineStep::RegisterTemplates { variable } => {
                let register: Arc<dyn AssetTransformer> =
                    Arc::new(RegisterTemplate::new(bundle.path(), variable.as_str()));
                add_transformer(bundle, &register)
            }
            PipelineStep::Transform(transformer) => add_transformer(bundle, transformer),
            PipelineStep::AssignHash => {
                let digest = bundle.compute_hash()?;
                tracing::debug!(
                    bundle = bundle.path(),
                    hash = %hash::to_hex(&digest),
                    "assigned hash"
                );
                bundle.set_hash(digest);
                Ok(())
            }
        }
    }
}

fn read_text(asset: &dyn Asset, policy: ReadPolicy) -> Result<String> {
    let mut stream = match policy {
        ReadPolicy::Original => asset.open_original()?,
        ReadPolicy::Transformed => asset.open_stream()?,
    };
    let mut bytes = Vec::new();
    stream
        .read_to_end(&mut bytes)
        .map_err(|e| fs::read_failed(asset.path(), e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn parse_references(bundle: &mut Bundle, policy: ReadPolicy) -> Result<()> {
    let kind = bundle.kind();
    let parser = ReferenceParser::new(kind.scanner());
    let scope = bundle.scope();

    for asset in bundle.assets_mut() {
        if !kind.is_source(asset.path()) {
            continue;
        }

        let text = read_text(&**asset, policy)?;
        let references = parser.parse(&text, asset.path())?;
        tracing::trace!(asset = asset.path(), count = references.len(), "parsed directives");

        for reference in references {
            match reference.kind {
                DirectiveKind::Asset => {
                    asset.add_reference(&reference.path, reference.line, &scope)?
                }
                DirectiveKind::LocalizedString => {
                    asset.add_localized_string(&reference.path, reference.line)?
                }
                DirectiveKind::AbConfig => asset.add_ab_config(&reference.path, reference.line)?,
            }
        }
    }

    Ok(())
}

fn parse_css_urls(bundle: &mut Bundle) -> Result<()> {
    for asset in bundle.assets_mut() {
        if !asset.path().to_ascii_lowercase().ends_with(".css") {
            continue;
        }

        let text = read_text(&**asset, ReadPolicy::Original)?;
        for (target, line) in css_urls(&text) {
            asset.add_raw_file_reference(&target, line)?;
        }
    }
    Ok(())
}

/// Relative file targets of `url(...)` expressions with their 1-based lines
pub fn css_urls(css: &str) -> Vec<(String, usize)> {
    let mut lines = LineCounter::new(css);
    CSS_URL
        .captures_iter(css)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let target = captures
                .get(1)
                .or_else(|| captures.get(2))
                .or_else(|| captures.get(3))?
                .as_str()
                .trim();
            let line = lines.line_at(whole.start());
            raw_file_target(target).map(|t| (t.to_string(), line))
        })
        .collect()
}

/// Drop URLs, data URIs, fragments and query strings
fn raw_file_target(target: &str) -> Option<&str> {
    let lower = target.to_ascii_lowercase();
    if target.is_empty()
        || target.starts_with('#')
        || lower.starts_with("data:")
        || path::is_url(target)
    {
        return None;
    }
    let end = target.find(['?', '#']).unwrap_or(target.len());
    let file = &target[..end];
    (!file.is_empty()).then_some(file)
}

/// Line numbers for increasing byte offsets, counting `\r\n` once
struct LineCounter<'a> {
    bytes: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    /// 1-based line of byte `offset`; offsets must not decrease between calls
    fn line_at(&mut self, offset: usize) -> usize {
        let end = offset.min(self.bytes.len());
        while self.offset < end {
            match self.bytes[self.offset] {
                b'\n' => self.line += 1,
                b'\r' if self.bytes.get(self.offset + 1) != Some(&b'\n') => self.line += 1,
                _ => {}
            }
            self.offset += 1;
        }
        self.line
    }
}

fn add_transformer(bundle: &mut Bundle, transformer: &Arc<dyn AssetTransformer>) -> Result<()> {
    for asset in bundle.assets_mut() {
        asset.add_transformer(Arc::clone(transformer))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_urls_quote_styles_and_lines() {
        let css = "a { background: url(img/a.png); }\r\nb { background: url( 'img/b.png' ); }\nc { background: URL(\"../c.gif\") }";
        assert_eq!(
            css_urls(css),
            vec![
                ("img/a.png".to_string(), 1),
                ("img/b.png".to_string(), 2),
                ("../c.gif".to_string(), 3),
            ]
        );
    }

    #[test]
    fn test_css_urls_lines_across_many_rules() {
        let css: String = (0..500)
            .map(|i| format!(".r{i} {{\r\n  background: url(img/{i}.png);\r\n}}\r\n"))
            .collect();
        let urls = css_urls(&css);
        assert_eq!(urls.len(), 500);
        assert_eq!(urls[0], ("img/0.png".to_string(), 2));
        assert_eq!(urls[499], ("img/499.png".to_string(), 1499));
    }

    #[test]
    fn test_line_counter_treats_lone_cr_as_break() {
        let mut lines = LineCounter::new("a\rb\r\nc\nd");
        assert_eq!(lines.line_at(0), 1);
        assert_eq!(lines.line_at(2), 2);
        assert_eq!(lines.line_at(3), 2);
        assert_eq!(lines.line_at(5), 3);
        assert_eq!(lines.line_at(7), 4);
    }

    #[test]
    fn test_css_urls_skip_urls_and_data_uris() {
        let css = "a { background: url(http://cdn/x.png) }\
                   b { background: url(//cdn/y.png) }\
                   c { background: url(data:image/png;base64,AAAA) }\
                   d { filter: url(#svg-filter) }";
        assert!(css_urls(css).is_empty());
    }

    #[test]
    fn test_css_urls_strip_query_and_fragment() {
        let css = "@font-face { src: url('fonts/icons.eot?#iefix') }";
        assert_eq!(css_urls(css), vec![("fonts/icons.eot".to_string(), 1)]);
    }
}
