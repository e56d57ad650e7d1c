//! Scan classification: survey the pages, sample them, vote on density.

use std::path::Path;
use std::time::Instant;

use rand::Rng;

use super::policy::{ClassifyPolicy, ImageDiscovery, SamplingMode, THRESHOLD};
use super::result::{ClassificationResult, Verdict};
use crate::backend::{
    walk_drawn, walk_resources, DocumentModel, ImageRef, ImageRegistry, LopdfModel, Scope, Walk,
};
use crate::error::{Error, Result};
use crate::model::{Dimension, DpiHistogram, PageSample};

/// Everything the vote needs from a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Survey {
    /// One sample per page, in page order
    pub samples: Vec<PageSample>,
    /// Number of images found (`I`)
    pub image_count: usize,
}

impl Survey {
    /// Number of pages (`P`).
    pub fn page_count(&self) -> usize {
        self.samples.len()
    }
}

/// Classifies documents as scanned or native.
///
/// # Example
///
/// ```no_run
/// use pdfscan::classify::{ClassifyPolicy, ScanClassifier};
///
/// let classifier = ScanClassifier::new(ClassifyPolicy::strict());
/// let result = classifier.detect_file("book.pdf");
/// println!("{}", result.report_line("book.pdf"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScanClassifier {
    policy: ClassifyPolicy,
}

impl ScanClassifier {
    /// Create a classifier with the given policy.
    pub fn new(policy: ClassifyPolicy) -> Self {
        Self { policy }
    }

    /// Walk every page, recording geometry and counting images.
    pub fn survey<M: DocumentModel + ?Sized>(&self, model: &M) -> Result<Survey> {
        let mut survey = Survey::default();
        let mut registry = ImageRegistry::new();

        for (index, page) in model.pages()?.into_iter().enumerate() {
            let page_dimension = model.page_dimension(page)?;
            let user_unit = model.page_user_unit(page);
            let mut first_image = Dimension::EMPTY;
            let mut found = 0usize;

            let visit = |image: &ImageRef| {
                if image.dimension.is_empty() {
                    return Walk::Continue;
                }
                let counted = match self.policy.discovery {
                    ImageDiscovery::Resources => true,
                    ImageDiscovery::ContentStream => registry.register(image.key).is_some(),
                };
                if counted {
                    found += 1;
                    if first_image.is_empty() {
                        first_image = image.dimension;
                    }
                }
                Walk::Continue
            };

            match self.policy.discovery {
                ImageDiscovery::Resources => walk_resources(model, Scope::Page(page), visit)?,
                ImageDiscovery::ContentStream => walk_drawn(model, Scope::Page(page), visit)?,
            };

            log::trace!(
                "{}: page {} {} first image {} ({} new)",
                model.name(),
                index,
                page_dimension,
                first_image,
                found
            );
            survey.image_count += found;
            survey.samples.push(
                PageSample::new(index, page_dimension, first_image).with_user_unit(user_unit),
            );
        }

        Ok(survey)
    }

    /// Classify a loaded document.
    ///
    /// A failure while walking the document is returned as is; nothing is
    /// retried.
    pub fn classify<M: DocumentModel + ?Sized>(&self, model: &M) -> Result<ClassificationResult> {
        let start = Instant::now();
        let survey = self.survey(model)?;
        let verdict = decide(
            &survey.samples,
            survey.image_count,
            &self.policy,
            &mut rand::rng(),
        );
        log::info!(
            "{}: {} pages, {} images, {:?}",
            model.name(),
            survey.page_count(),
            survey.image_count,
            verdict
        );
        Ok(
            ClassificationResult::new(survey.page_count(), survey.image_count, verdict)
                .with_elapsed_ms(start.elapsed().as_millis() as u64),
        )
    }

    /// Load and classify a file.
    ///
    /// Any load or walk failure is reported as [`Error::DocumentUnreadable`].
    pub fn classify_file<P: AsRef<Path>>(&self, path: P) -> Result<ClassificationResult> {
        let path = path.as_ref();
        let unreadable = |e: Error| Error::DocumentUnreadable {
            name: path.display().to_string(),
            reason: e.to_string(),
        };
        let model = LopdfModel::load_file(path).map_err(unreadable)?;
        self.classify(&model).map_err(unreadable)
    }

    /// Like [`classify_file`](Self::classify_file) but never fails: an
    /// unreadable document gives an invalid result.
    pub fn detect_file<P: AsRef<Path>>(&self, path: P) -> ClassificationResult {
        let start = Instant::now();
        match self.classify_file(path) {
            Ok(result) => result,
            Err(e) => {
                log::error!("{}", e);
                ClassificationResult::invalid().with_elapsed_ms(start.elapsed().as_millis() as u64)
            }
        }
    }
}

/// Choose `count` distinct page indices out of `pages`.
///
/// Random sampling draws uniformly in `[0, pages)` and keeps unseen indices
/// until `count` are chosen. The result is in draw order.
pub fn pick_samples<R: Rng + ?Sized>(
    rng: &mut R,
    mode: SamplingMode,
    count: usize,
    pages: usize,
) -> Vec<usize> {
    let count = count.min(pages);
    match mode {
        SamplingMode::FirstN => (0..count).collect(),
        SamplingMode::Random => {
            let mut chosen = Vec::with_capacity(count);
            while chosen.len() < count {
                let index = rng.random_range(0..pages);
                if !chosen.contains(&index) {
                    chosen.push(index);
                }
            }
            chosen
        }
    }
}

/// Decide a verdict from page samples.
///
/// `samples` holds one entry per page; `image_count` is the number of
/// images found in the whole document.
pub fn decide<R: Rng + ?Sized>(
    samples: &[PageSample],
    image_count: usize,
    policy: &ClassifyPolicy,
    rng: &mut R,
) -> Verdict {
    let pages = samples.len();
    if policy.page_image_rule.rules_out_scan(pages, image_count) {
        log::debug!("{} pages for {} images, native", pages, image_count);
        return Verdict::Native;
    }

    let count = pages.min(policy.max_samples);
    let mut histogram = DpiHistogram::new();
    for index in pick_samples(rng, policy.sampling, count, pages) {
        let sample = &samples[index];
        if !sample.has_image() {
            if policy.fail_fast_on_empty_image {
                log::debug!("page {} has no image, native", index);
                return Verdict::Native;
            }
            continue;
        }
        let density = sample.density();
        if density == 0 {
            if policy.fail_fast_on_zero_density {
                log::debug!("page {} image does not cover the page, native", index);
                return Verdict::Native;
            }
            continue;
        }
        histogram.increment(density);
    }

    if histogram.is_empty() {
        log::debug!("no sampled page out of {} has a usable density", count);
        return Verdict::Native;
    }
    let best = histogram.best();
    log::debug!("{} samples: {}", count, histogram);
    if best.key != 0 && best.count > count as u32 / THRESHOLD {
        Verdict::Scanned {
            resolution: best.key,
        }
    } else {
        Verdict::Native
    }
}
