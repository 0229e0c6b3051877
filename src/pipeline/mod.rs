//! Bundle processing pipeline
//!
//! A pipeline is an ordered list of [`PipelineStep`]s run once per bundle:
//! reference resolution first, then kind-specific steps and registered
//! transformers, and the hash last so it reflects the final asset set.

pub mod steps;

use std::sync::Arc;

use crate::asset::AssetTransformer;
use crate::bundle::{Bundle, BundleKind};
use crate::config::Settings;
use crate::error::Result;

pub use steps::{PipelineStep, ReadPolicy};

#[derive(Debug, Clone, Default)]
pub struct BundlePipeline {
    steps: Vec<PipelineStep>,
}

impl BundlePipeline {
    pub fn new(steps: Vec<PipelineStep>) -> Self {
        Self { steps }
    }

    /// The standard steps for `kind`
    pub fn for_kind(kind: BundleKind, settings: &Settings) -> Self {
        let mut steps = vec![PipelineStep::ParseReferences(ReadPolicy::Original)];
        match kind {
            BundleKind::Script => {}
            BundleKind::Stylesheet => steps.push(PipelineStep::ParseCssUrls),
            BundleKind::HtmlTemplate => steps.push(PipelineStep::RegisterTemplates {
                variable: settings.template_variable.clone(),
            }),
        }
        steps.push(PipelineStep::AssignHash);
        Self { steps }
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// Insert `step` ahead of hash assignment
    pub fn insert_before_hash(&mut self, step: PipelineStep) {
        let position = self
            .steps
            .iter()
            .position(|s| matches!(s, PipelineStep::AssignHash))
            .unwrap_or(self.steps.len());
        self.steps.insert(position, step);
    }

    /// Register a transformer (minifier, compiler) applied to every asset.
    ///
    /// Transformers run ahead of a transformed-content parse.
    pub fn add_transformer(&mut self, transformer: Arc<dyn AssetTransformer>) {
        let position = self
            .steps
            .iter()
            .position(|s| {
                matches!(
                    s,
                    PipelineStep::AssignHash | PipelineStep::ParseReferences(ReadPolicy::Transformed)
                )
            })
            .unwrap_or(self.steps.len());
        self.steps.insert(position, PipelineStep::Transform(transformer));
    }

    /// Choose which bytes directive parsing reads.
    ///
    /// [`ReadPolicy::Transformed`] moves the parse after every transform step,
    /// so directives a compiler emits are recorded.
    pub fn set_read_policy(&mut self, policy: ReadPolicy) {
        self.steps
            .retain(|s| !matches!(s, PipelineStep::ParseReferences(_)));
        match policy {
            ReadPolicy::Original => self.steps.insert(0, PipelineStep::ParseReferences(policy)),
            ReadPolicy::Transformed => {
                self.insert_before_hash(PipelineStep::ParseReferences(policy));
            }
        }
    }

    /// Run every step against `bundle`.
    ///
    /// # Errors
    ///
    /// The first failing step aborts processing; the bundle is then left
    /// without a hash. Whatever a failed run recorded on the assets is
    /// cleared when the bundle is processed again.
    #[tracing::instrument(skip_all, fields(bundle = %bundle.path(), kind = %bundle.kind()))]
    pub fn process(&self, bundle: &mut Bundle) -> Result<()> {
        if bundle.is_processed() {
            tracing::debug!("bundle already processed");
            return Ok(());
        }

        for asset in bundle.assets_mut() {
            asset.reset()?;
        }
        for step in &self.steps {
            tracing::trace!(step = step.name(), "running step");
            step.apply(bundle)?;
        }

        tracing::info!(assets = bundle.assets().len(), "processed bundle");
        Ok(())
    }
}

/// One pipeline per bundle kind
#[derive(Debug, Clone)]
pub struct PipelineSet {
    script: BundlePipeline,
    stylesheet: BundlePipeline,
    html_template: BundlePipeline,
}

impl PipelineSet {
    pub fn new(settings: &Settings) -> Self {
        Self {
            script: BundlePipeline::for_kind(BundleKind::Script, settings),
            stylesheet: BundlePipeline::for_kind(BundleKind::Stylesheet, settings),
            html_template: BundlePipeline::for_kind(BundleKind::HtmlTemplate, settings),
        }
    }

    pub fn get(&self, kind: BundleKind) -> &BundlePipeline {
        match kind {
            BundleKind::Script => &self.script,
            BundleKind::Stylesheet => &self.stylesheet,
            BundleKind::HtmlTemplate => &self.html_template,
        }
    }

    pub fn get_mut(&mut self, kind: BundleKind) -> &mut BundlePipeline {
        match kind {
            BundleKind::Script => &mut self.script,
            BundleKind::Stylesheet => &mut self.stylesheet,
            BundleKind::HtmlTemplate => &mut self.html_template,
        }
    }

    pub fn process(&self, bundle: &mut Bundle) -> Result<()> {
        self.get(bundle.kind()).process(bundle)
    }
}

impl Default for PipelineSet {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Asset, AssetReferenceType, FileAsset, MemoryFile};
    use crate::error::SatchelError;

    fn bundle(path: &str, kind: BundleKind, files: &[(&str, &str)]) -> Bundle {
        let mut bundle = Bundle::new(path, kind);
        for (file, content) in files {
            bundle.add_asset(Box::new(FileAsset::new(Arc::new(MemoryFile::new(file, *content)))));
        }
        bundle
    }

    #[test]
    fn test_step_order_per_kind() {
        let settings = Settings::default();
        let names = |kind| {
            BundlePipeline::for_kind(kind, &settings)
                .steps()
                .iter()
                .map(PipelineStep::name)
                .collect::<Vec<_>>()
        };
        assert_eq!(names(BundleKind::Script), vec!["parse_references", "assign_hash"]);
        assert_eq!(
            names(BundleKind::Stylesheet),
            vec!["parse_references", "parse_css_urls", "assign_hash"]
        );
        assert_eq!(
            names(BundleKind::HtmlTemplate),
            vec!["parse_references", "register_templates", "assign_hash"]
        );
    }

    #[test]
    fn test_transformer_runs_before_hash() {
        let mut pipeline = BundlePipeline::for_kind(BundleKind::Script, &Settings::default());
        pipeline.add_transformer(Arc::new(|c: Vec<u8>, _: &str| -> Result<Vec<u8>> { Ok(c) }));
        let names: Vec<_> = pipeline.steps().iter().map(PipelineStep::name).collect();
        assert_eq!(names, vec!["parse_references", "transform", "assign_hash"]);
    }

    #[test]
    fn test_process_script_bundle() {
        let mut b = bundle(
            "~/scripts",
            BundleKind::Script,
            &[
                ("~/scripts/a.js", "// @reference \"b.js\"\nvar x = i18n.t('Key.One');"),
                ("~/scripts/b.js", "// @reference ~/lib\nAB.isOn('Flag');"),
            ],
        );
        PipelineSet::default().process(&mut b).unwrap();

        assert!(b.is_processed());
        let a = &b.assets()[0];
        assert_eq!(a.references()[0].path, "~/scripts/b.js");
        assert_eq!(a.references()[0].kind, AssetReferenceType::SameBundle);
        assert_eq!(a.localized_strings()[0].name, "Key.One");
        assert_eq!(a.localized_strings()[0].source_line, 2);
        assert_eq!(b.assets()[1].references()[0].kind, AssetReferenceType::DifferentBundle);
        assert_eq!(b.ab_configs(), vec!["Flag"]);
        assert_eq!(b.dependency_paths(), vec!["~/lib"]);
    }

    #[test]
    fn test_process_stylesheet_records_raw_files() {
        let mut b = bundle(
            "~/styles",
            BundleKind::Stylesheet,
            &[(
                "~/styles/site.css",
                "/* @reference 'reset.css'; */\n.logo { background: url(img/logo.png); }\n.x { background: url(img/logo.png); }",
            )],
        );
        PipelineSet::default().process(&mut b).unwrap();

        let references = b.assets()[0].references();
        assert_eq!(references.len(), 2);
        assert_eq!(references[0].path, "~/styles/reset.css");
        assert_eq!(references[1].path, "~/styles/img/logo.png");
        assert_eq!(references[1].kind, AssetReferenceType::RawFilename);
        assert_eq!(references[1].source_line, 2);
    }

    #[test]
    fn test_process_html_templates_registers_and_localizes() {
        let mut b = bundle(
            "~/templates",
            BundleKind::HtmlTemplate,
            &[("~/templates/item.htm", "<p>{{#i18n}}Item.Title{{/i18n}}</p>")],
        );
        PipelineSet::default().process(&mut b).unwrap();

        assert_eq!(b.localized_strings(), vec!["Item.Title"]);
        let content = String::from_utf8(b.read_content().unwrap()).unwrap();
        assert!(content.starts_with("var JST = JST || {};\nJST['item'] = "));
    }

    #[test]
    fn test_hash_ignores_transformers() {
        let files = [("~/s/a.js", "var a;")];
        let mut plain = bundle("~/s", BundleKind::Script, &files);
        let mut transformed = bundle("~/s", BundleKind::Script, &files);

        let mut set = PipelineSet::default();
        set.process(&mut plain).unwrap();
        set.get_mut(BundleKind::Script)
            .add_transformer(Arc::new(|_: Vec<u8>, _: &str| -> Result<Vec<u8>> {
                Ok(b"minified".to_vec())
            }));
        set.process(&mut transformed).unwrap();

        assert_eq!(plain.hash().unwrap(), transformed.hash().unwrap());
        assert_eq!(transformed.read_content().unwrap(), b"minified");
    }

    #[test]
    fn test_malformed_directive_aborts_bundle() {
        let mut b = bundle(
            "~/s",
            BundleKind::Script,
            &[("~/s/a.js", "var a;\n// @reference 'oops.js\n")],
        );
        let err = PipelineSet::default().process(&mut b).unwrap_err();
        assert!(matches!(
            err,
            SatchelError::MalformedDirective { ref path, line: 2, .. } if path == "~/s/a.js"
        ));
        assert!(!b.is_processed());
    }

    #[test]
    fn test_non_source_assets_are_not_scanned() {
        let mut b = bundle(
            "~/s",
            BundleKind::Script,
            &[("~/s/data.json", "// @reference 'x.js'")],
        );
        PipelineSet::default().process(&mut b).unwrap();
        assert!(b.assets()[0].references().is_empty());
    }

    #[test]
    fn test_retry_after_failure_does_not_duplicate() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let mut b = bundle(
            "~/s",
            BundleKind::Script,
            &[
                ("~/s/a.js", "// @reference b.js\n// @localize K"),
                ("~/s/b.js", "var b;"),
            ],
        );
        let fail_next = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&fail_next);
        let mut pipeline = BundlePipeline::for_kind(BundleKind::Script, &Settings::default());
        pipeline.set_read_policy(ReadPolicy::Transformed);
        pipeline.add_transformer(Arc::new(
            move |mut content: Vec<u8>, path: &str| -> Result<Vec<u8>> {
                if path == "~/s/b.js" && flag.swap(false, Ordering::SeqCst) {
                    return Err(crate::error::bundle::transform_failed(path, "not yet"));
                }
                content.push(b'\n');
                Ok(content)
            },
        ));

        assert!(pipeline.process(&mut b).is_err());
        assert_eq!(b.assets()[0].references().len(), 1);
        assert!(!fail_next.load(Ordering::SeqCst));

        pipeline.process(&mut b).unwrap();
        let a = &b.assets()[0];
        assert_eq!(a.references().len(), 1);
        assert_eq!(a.localized_strings().len(), 1);
        assert_eq!(a.read_content().unwrap(), b"// @reference b.js\n// @localize K\n");
    }

    #[test]
    fn test_transformed_read_policy_parses_after_transformers() {
        let mut pipeline = BundlePipeline::for_kind(BundleKind::Script, &Settings::default());
        pipeline.set_read_policy(ReadPolicy::Transformed);
        pipeline.add_transformer(Arc::new(|c: Vec<u8>, _: &str| -> Result<Vec<u8>> {
            let mut out = b"// @reference generated.js\n".to_vec();
            out.extend(c);
            Ok(out)
        }));
        let names: Vec<_> = pipeline.steps().iter().map(PipelineStep::name).collect();
        assert_eq!(names, vec!["transform", "parse_references", "assign_hash"]);

        let mut b = bundle("~/s", BundleKind::Script, &[("~/s/a.js", "// @localize K")]);
        pipeline.process(&mut b).unwrap();
        let a = &b.assets()[0];
        assert_eq!(a.references()[0].path, "~/s/generated.js");
        assert_eq!(a.localized_strings()[0].source_line, 2);
    }

    #[test]
    fn test_original_read_policy_ignores_transformer_output() {
        let mut pipeline = BundlePipeline::for_kind(BundleKind::Script, &Settings::default());
        pipeline.set_read_policy(ReadPolicy::Transformed);
        pipeline.set_read_policy(ReadPolicy::Original);
        pipeline.add_transformer(Arc::new(|_: Vec<u8>, _: &str| -> Result<Vec<u8>> {
            Ok(b"// @localize Generated".to_vec())
        }));

        let mut b = bundle("~/s", BundleKind::Script, &[("~/s/a.js", "var a;")]);
        pipeline.process(&mut b).unwrap();
        assert!(b.localized_strings().is_empty());
    }

    #[test_log::test]
    fn test_processing_twice_is_a_no_op() {
        let mut b = bundle("~/s", BundleKind::Script, &[("~/s/a.js", "// @localize K")]);
        let set = PipelineSet::default();
        set.process(&mut b).unwrap();
        set.process(&mut b).unwrap();
        assert_eq!(b.assets()[0].localized_strings().len(), 1);
    }
}
