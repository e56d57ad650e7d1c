//! Classification policy and its presets.

/// Default maximum number of pages sampled for the density vote.
pub const MAX_SAMPLES: usize = 10;

/// A bucket wins when its count exceeds `samples / THRESHOLD`.
pub const THRESHOLD: u32 = 2;

/// Options driving a [`ScanClassifier`](super::ScanClassifier).
///
/// The presets [`lenient`](Self::lenient), [`streaming`](Self::streaming)
/// and [`strict`](Self::strict) cover the known-good combinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyPolicy {
    /// Which pages are sampled
    pub sampling: SamplingMode,
    /// How images are found and counted
    pub discovery: ImageDiscovery,
    /// Page/image count precondition
    pub page_image_rule: PageImageRule,
    /// A sampled page without image ends the vote as native
    pub fail_fast_on_empty_image: bool,
    /// A sampled page with zero density ends the vote as native
    pub fail_fast_on_zero_density: bool,
    /// Upper bound on sampled pages
    pub max_samples: usize,
}

impl ClassifyPolicy {
    /// Create the default (lenient) policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Random sampling, images counted through page resources, pure vote.
    pub fn lenient() -> Self {
        Self {
            sampling: SamplingMode::Random,
            discovery: ImageDiscovery::Resources,
            page_image_rule: PageImageRule::Equal,
            fail_fast_on_empty_image: false,
            fail_fast_on_zero_density: false,
            max_samples: MAX_SAMPLES,
        }
    }

    /// Lenient vote over images actually drawn by the content streams.
    pub fn streaming() -> Self {
        Self {
            discovery: ImageDiscovery::ContentStream,
            ..Self::lenient()
        }
    }

    /// First pages only, images counted as drawn; every sampled page must
    /// look like a scan.
    ///
    /// Suited to image-heavy documents that are not scans, such as
    /// illustrated books.
    pub fn strict() -> Self {
        Self {
            sampling: SamplingMode::FirstN,
            discovery: ImageDiscovery::ContentStream,
            page_image_rule: PageImageRule::AtLeastOnePerPage,
            fail_fast_on_empty_image: true,
            fail_fast_on_zero_density: true,
            max_samples: MAX_SAMPLES,
        }
    }

    /// Set the sampling mode.
    pub fn with_sampling(mut self, sampling: SamplingMode) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set the image discovery mode.
    pub fn with_discovery(mut self, discovery: ImageDiscovery) -> Self {
        self.discovery = discovery;
        self
    }

    /// Set the page/image precondition.
    pub fn with_page_image_rule(mut self, rule: PageImageRule) -> Self {
        self.page_image_rule = rule;
        self
    }

    /// Enable or disable the empty-image early exit.
    pub fn with_fail_fast_on_empty_image(mut self, enabled: bool) -> Self {
        self.fail_fast_on_empty_image = enabled;
        self
    }

    /// Enable or disable the zero-density early exit.
    pub fn with_fail_fast_on_zero_density(mut self, enabled: bool) -> Self {
        self.fail_fast_on_zero_density = enabled;
        self
    }

    /// Set the maximum number of sampled pages (at least 1).
    pub fn with_max_samples(mut self, max: usize) -> Self {
        self.max_samples = max.max(1);
        self
    }
}

impl Default for ClassifyPolicy {
    fn default() -> Self {
        Self::lenient()
    }
}

/// Page selection for the density vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingMode {
    /// Uniformly random pages, without replacement
    #[default]
    Random,
    /// The first pages of the document
    FirstN,
}

/// How images are discovered and counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageDiscovery {
    /// Every image reachable from page resources, nested forms included
    #[default]
    Resources,
    /// Images painted by content streams, each distinct image counted once;
    /// a page only records an image it is the first to paint
    ContentStream,
}

/// Precondition on page count `P` versus image count `I`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageImageRule {
    /// `P != I` means native
    #[default]
    Equal,
    /// `P > I` means native
    AtLeastOnePerPage,
}

impl PageImageRule {
    /// Whether the counts alone already rule out a scan.
    pub fn rules_out_scan(self, pages: usize, images: usize) -> bool {
        match self {
            PageImageRule::Equal => pages != images,
            PageImageRule::AtLeastOnePerPage => pages > images,
        }
    }
}
