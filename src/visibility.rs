//! Visibility-triggered behaviors: lazy images, reveals, counters, scroll cue.
//!
//! These are the headless counterparts of the page's intersection observers.
//! Geometry is in document coordinates: an element is a vertical [`Rect`] and
//! the viewport is a window `[scroll_y, scroll_y + height]`, optionally grown
//! or shrunk by a root margin.
//!
//! One-shot observers (lazy load, reveal, counters) stop watching a target the
//! first time it intersects. Continuous observers (hero fold) report every
//! change for as long as they live.
//!
//! The class names and attributes `folio.js` works with are defined here as
//! [`HOOKS`] and shipped to the browser inside [`BrowserConfig`], and the
//! markup that carries them ([`lazy_img`], [`deferred_img`], [`counter`]) is
//! rendered here too, so the page and its script cannot drift apart.

use crate::config::MotionConfig;
use maud::{Markup, html};
use serde::Serialize;

/// Attribute holding a lazy image's source until it nears the viewport.
pub const LAZY_SRC_ATTR: &str = "data-src";
/// Attribute holding a source that stays unloaded until its article is shown.
pub const DEFER_SRC_ATTR: &str = "data-defer-src";
/// Class a lazy image gains once loaded.
pub const LOADED_CLASS: &str = "is-loaded";
/// Class added by reveals and the scroll cue.
pub const VISIBLE_CLASS: &str = "visible";
/// Class the scroll cue gains once scrolled past.
pub const HIDDEN_CLASS: &str = "hidden";
pub const REVEAL_CLASS: &str = "fade-up";
pub const HERO_REVEAL_CLASS: &str = "hero-reveal";
/// Attribute carrying a counter's final value.
pub const COUNTER_ATTR: &str = "data-target";
/// Body class while the hero is out of view.
pub const HERO_FOLDED_CLASS: &str = "hero-folded";

/// Names shared between generated markup and `folio.js`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrowserHooks {
    pub lazy_src: &'static str,
    pub defer_src: &'static str,
    pub loaded: &'static str,
    pub visible: &'static str,
    pub hidden: &'static str,
    pub reveal: &'static str,
    pub hero_reveal: &'static str,
    pub counter: &'static str,
    pub hero_folded: &'static str,
}

pub const HOOKS: BrowserHooks = BrowserHooks {
    lazy_src: LAZY_SRC_ATTR,
    defer_src: DEFER_SRC_ATTR,
    loaded: LOADED_CLASS,
    visible: VISIBLE_CLASS,
    hidden: HIDDEN_CLASS,
    reveal: REVEAL_CLASS,
    hero_reveal: HERO_REVEAL_CLASS,
    counter: COUNTER_ATTR,
    hero_folded: HERO_FOLDED_CLASS,
};

/// The `#folioConfig` payload: motion tuning plus [`HOOKS`].
#[derive(Debug, Clone, Serialize)]
pub struct BrowserConfig<'a> {
    #[serde(flatten)]
    pub motion: &'a MotionConfig,
    pub hooks: BrowserHooks,
}

pub fn browser_config(motion: &MotionConfig) -> BrowserConfig<'_> {
    BrowserConfig {
        motion,
        hooks: HOOKS,
    }
}

/// An image loaded by [`LazyLoader`] in the browser, with a `<noscript>`
/// copy for pages viewed without scripting.
pub fn lazy_img(src: &str, alt: &str, class: Option<&str>, hidden: bool) -> Markup {
    html! {
        img class=[class] data-src=(src) alt=(alt) hidden[hidden]
            onerror="this.style.display='none'";
        noscript {
            img class=[class] src=(src) alt=(alt) hidden[hidden];
        }
    }
}

/// An image with no request until the script assigns its source.
pub fn deferred_img(src: &str, alt: &str, hidden: bool) -> Markup {
    html! {
        img data-defer-src=(src) alt=(alt) hidden[hidden]
            onerror="this.style.display='none'";
    }
}

/// A stat that counts up to `target` when scrolled into view.
///
/// The final value is rendered as text, so it reads correctly with reduced
/// motion or without scripting.
pub fn counter(label: &str, target: u64) -> Markup {
    html! {
        div.counter {
            span.num data-target=(target) { (target) }
            span.counter-label { (label) }
        }
    }
}

/// Vertical extent of an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// The visible window of the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_y: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(scroll_y: f64, height: f64) -> Self {
        Self { scroll_y, height }
    }

    /// Fraction of `rect` inside the viewport grown by `margin` on both edges.
    ///
    /// Zero-height elements count as fully visible when they sit inside.
    pub fn intersection_ratio(&self, rect: Rect, margin: f64) -> f64 {
        let top = self.scroll_y - margin;
        let bottom = self.scroll_y + self.height + margin;
        if rect.height <= 0.0 {
            return if rect.top >= top && rect.top <= bottom { 1.0 } else { 0.0 };
        }
        let visible = rect.bottom().min(bottom) - rect.top.max(top);
        (visible.max(0.0) / rect.height).min(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveMode {
    OneShot,
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Minimum visible fraction to count as intersecting.
    pub threshold: f64,
    /// Pixels added above and below the viewport; negative shrinks it.
    pub root_margin: f64,
    pub mode: ObserveMode,
}

/// A visibility change reported by [`IntersectionObserver::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection<K> {
    pub key: K,
    pub is_intersecting: bool,
    pub ratio: f64,
}

#[derive(Debug, Clone)]
struct Observed<K> {
    key: K,
    last: Option<bool>,
}

/// Watches a set of keyed elements against the viewport.
#[derive(Debug, Clone)]
pub struct IntersectionObserver<K> {
    options: ObserverOptions,
    targets: Vec<Observed<K>>,
}

impl<K: Clone + PartialEq> IntersectionObserver<K> {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            targets: Vec::new(),
        }
    }

    pub fn observe(&mut self, key: K) {
        if !self.is_observing(&key) {
            self.targets.push(Observed { key, last: None });
        }
    }

    pub fn unobserve(&mut self, key: &K) {
        self.targets.retain(|t| &t.key != key);
    }

    pub fn is_observing(&self, key: &K) -> bool {
        self.targets.iter().any(|t| &t.key == key)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Recompute visibility and return what changed since the last update.
    ///
    /// The first update reports every target. Targets whose bounds are
    /// unknown are skipped. One-shot targets are dropped once they intersect.
    pub fn update(
        &mut self,
        viewport: &Viewport,
        bounds: impl Fn(&K) -> Option<Rect>,
    ) -> Vec<Intersection<K>> {
        let options = self.options;
        let mut changes = Vec::new();
        for target in &mut self.targets {
            let Some(rect) = bounds(&target.key) else {
                continue;
            };
            let ratio = viewport.intersection_ratio(rect, options.root_margin);
            let is_intersecting = ratio > 0.0 && ratio >= options.threshold;
            if target.last != Some(is_intersecting) {
                target.last = Some(is_intersecting);
                changes.push(Intersection {
                    key: target.key.clone(),
                    is_intersecting,
                    ratio,
                });
            }
        }
        if options.mode == ObserveMode::OneShot {
            self.targets.retain(|t| t.last != Some(true));
        }
        changes
    }
}

/// An image whose source is deferred until it nears the viewport.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LazyImage {
    pub data_src: Option<String>,
    pub src: Option<String>,
    pub loaded: bool,
}

impl LazyImage {
    pub fn deferred(data_src: &str) -> Self {
        Self {
            data_src: Some(data_src.to_string()),
            ..Default::default()
        }
    }

    /// Move `data-src` into `src`. Returns whether a source was assigned.
    pub fn start_loading(&mut self) -> bool {
        match self.data_src.take() {
            Some(src) => {
                self.src = Some(src);
                true
            }
            None => false,
        }
    }

    pub fn on_load(&mut self) {
        self.loaded = true;
    }

    /// [`LOADED_CLASS`] once the image has loaded.
    pub fn class(&self) -> Option<&'static str> {
        self.loaded.then_some(LOADED_CLASS)
    }
}

/// Lazy-loads a list of images as they come within range.
#[derive(Debug, Clone)]
pub struct LazyLoader {
    pub images: Vec<LazyImage>,
    observer: IntersectionObserver<usize>,
}

impl LazyLoader {
    /// Without observer support every image starts loading immediately.
    pub fn new(mut images: Vec<LazyImage>, motion: &MotionConfig, observer_supported: bool) -> Self {
        let mut observer = IntersectionObserver::new(ObserverOptions {
            threshold: motion.lazy_threshold,
            root_margin: motion.lazy_root_margin,
            mode: ObserveMode::OneShot,
        });
        if observer_supported {
            for idx in 0..images.len() {
                observer.observe(idx);
            }
        } else {
            for image in &mut images {
                image.start_loading();
            }
        }
        Self { images, observer }
    }

    /// Start loading every image that intersects; returns their indices.
    pub fn on_viewport(&mut self, viewport: &Viewport, bounds: &[Rect]) -> Vec<usize> {
        let changes = self
            .observer
            .update(viewport, |idx| bounds.get(*idx).copied());
        let mut started = Vec::new();
        for change in changes.into_iter().filter(|c| c.is_intersecting) {
            if self.images[change.key].start_loading() {
                started.push(change.key);
            }
        }
        started
    }

    pub fn pending(&self) -> usize {
        self.observer.len()
    }
}

/// Elements that gain `visible` once, the first time they are seen.
#[derive(Debug, Clone)]
pub struct Revealer {
    pub visible: Vec<bool>,
    observer: IntersectionObserver<usize>,
}

impl Revealer {
    /// With reduced motion every element is visible from the start.
    pub fn new(count: usize, threshold: f64, prefers_reduced_motion: bool) -> Self {
        let mut observer = IntersectionObserver::new(ObserverOptions {
            threshold,
            root_margin: 0.0,
            mode: ObserveMode::OneShot,
        });
        if !prefers_reduced_motion {
            for idx in 0..count {
                observer.observe(idx);
            }
        }
        Self {
            visible: vec![prefers_reduced_motion; count],
            observer,
        }
    }

    pub fn on_viewport(&mut self, viewport: &Viewport, bounds: &[Rect]) -> Vec<usize> {
        let changes = self
            .observer
            .update(viewport, |idx| bounds.get(*idx).copied());
        let mut revealed = Vec::new();
        for change in changes.into_iter().filter(|c| c.is_intersecting) {
            self.visible[change.key] = true;
            revealed.push(change.key);
        }
        revealed
    }
}

/// Count-up animation for a numeric stat.
///
/// With reduced motion the counter shows its target from the start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterAnimation {
    pub target: u64,
    pub duration_ms: f64,
    pub reduced_motion: bool,
}

impl CounterAnimation {
    pub fn new(target: u64, motion: &MotionConfig, prefers_reduced_motion: bool) -> Self {
        Self {
            target,
            duration_ms: motion.counter_duration_ms,
            reduced_motion: prefers_reduced_motion,
        }
    }

    /// Displayed value `elapsed_ms` after start: ease-out `p(2 - p)`, floored,
    /// exactly `target` once finished.
    pub fn value_at(&self, elapsed_ms: f64) -> u64 {
        if self.target == 0 || self.reduced_motion {
            return self.target;
        }
        let p = if self.duration_ms <= 0.0 {
            1.0
        } else {
            (elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
        };
        if p >= 1.0 {
            return self.target;
        }
        let eased = p * (2.0 - p);
        (eased * self.target as f64).floor() as u64
    }

    pub fn is_finished(&self, elapsed_ms: f64) -> bool {
        self.target == 0 || self.reduced_motion || elapsed_ms >= self.duration_ms
    }
}

/// The "scroll down" hint on the landing view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCue {
    pub threshold: f64,
    pub visible: bool,
    prefers_reduced_motion: bool,
}

impl ScrollCue {
    /// Threshold is `max(min_px, fraction × viewport height)`.
    pub fn new(viewport_height: f64, motion: &MotionConfig, prefers_reduced_motion: bool) -> Self {
        let threshold = motion
            .scroll_cue_min_px
            .max(viewport_height * motion.scroll_cue_fraction);
        Self {
            threshold,
            visible: true,
            prefers_reduced_motion,
        }
    }

    pub fn on_scroll(&mut self, scroll_y: f64) {
        self.visible = scroll_y <= self.threshold;
    }

    /// Touch hides the cue, unless the user prefers reduced motion.
    pub fn on_touch(&mut self) {
        if !self.prefers_reduced_motion {
            self.visible = false;
        }
    }
}

/// Fold marker that hides while the hero is scrolled out of view.
#[derive(Debug, Clone)]
pub struct HeroFold {
    pub hidden: bool,
    observer: IntersectionObserver<()>,
}

impl HeroFold {
    pub fn new(motion: &MotionConfig) -> Self {
        let mut observer = IntersectionObserver::new(ObserverOptions {
            threshold: 0.0,
            root_margin: motion.hero_fold_margin,
            mode: ObserveMode::Continuous,
        });
        observer.observe(());
        Self {
            hidden: false,
            observer,
        }
    }

    pub fn on_viewport(&mut self, viewport: &Viewport, hero: Rect) {
        for change in self.observer.update(viewport, |_| Some(hero)) {
            self.hidden = !change.is_intersecting;
        }
    }
}
