//! On-screen page breaks for the live editor surface.
//!
//! Presentation only: the exporters lay out their own pages and never read
//! this state, so the two page counts can disagree.

use std::cell::RefCell;
use std::rc::Rc;

use crate::events::{EditorEvent, EditorEvents, SubscriptionId};
use crate::geometry::{PageDimensions, PageFormatId, resolve_format, to_pixel_dimensions};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageBreakInfo {
    /// 1-based number of the page that starts at this break. Always >= 2.
    pub page_number: usize,
    /// Distance from the top of the editor content, in pixels.
    pub top_offset: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageLayout {
    pub page_breaks: Vec<PageBreakInfo>,
    pub total_pages: usize,
    pub page_width: f32,
    pub page_height: f32,
    /// Usable height of one page.
    pub content_height: f32,
    pub margin_size: f32,
}

/// Live height of the rendered editor content, in pixels.
pub trait ContentHeightSource {
    fn content_height(&self) -> f32;
}

impl ContentHeightSource for f32 {
    fn content_height(&self) -> f32 {
        *self
    }
}

impl<F: Fn() -> f32> ContentHeightSource for F {
    fn content_height(&self) -> f32 {
        self()
    }
}

/// Split `content_height` pixels of content into pages of `dims`.
pub fn compute_layout(content_height: f32, dims: &PageDimensions) -> PageLayout {
    let height = if content_height.is_finite() {
        content_height.max(0.0)
    } else {
        0.0
    };
    let per_page = dims.content_height;
    let total_pages = if per_page > 0.0 {
        ((height / per_page).ceil() as usize).max(1)
    } else {
        1
    };
    let page_breaks = (1..total_pages)
        .map(|i| PageBreakInfo {
            page_number: i + 1,
            top_offset: i as f32 * per_page,
        })
        .collect();
    PageLayout {
        page_breaks,
        total_pages,
        page_width: dims.width,
        page_height: dims.height,
        content_height: per_page,
        margin_size: dims.margin_top,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTrigger {
    ContentResized,
    DomMutated,
    EditorUpdated,
    FormatChanged(PageFormatId),
}

/// Recomputes page breaks at most once per animation frame no matter how
/// many triggers arrive in between.
#[derive(Debug)]
pub struct PaginationEngine {
    format: PageFormatId,
    dims: PageDimensions,
    layout: PageLayout,
    frame_pending: bool,
    recomputations: u64,
}

impl PaginationEngine {
    pub fn new(format: PageFormatId) -> Self {
        let dims = to_pixel_dimensions(resolve_format(format));
        Self {
            format,
            dims,
            layout: compute_layout(0.0, &dims),
            frame_pending: false,
            recomputations: 0,
        }
    }

    pub fn format(&self) -> PageFormatId {
        self.format
    }

    pub fn dimensions(&self) -> &PageDimensions {
        &self.dims
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Whether a recomputation is scheduled for the next frame.
    pub fn is_pending(&self) -> bool {
        self.frame_pending
    }

    /// Number of recomputations performed so far.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    pub fn trigger(&mut self, trigger: LayoutTrigger) {
        match trigger {
            LayoutTrigger::FormatChanged(id) if id != self.format => {
                self.format = id;
                self.dims = to_pixel_dimensions(resolve_format(id));
                log::debug!("pagination format -> {id}");
            }
            _ => {}
        }
        self.frame_pending = true;
    }

    pub fn handle_event(&mut self, event: &EditorEvent) {
        self.trigger(match event {
            EditorEvent::Update | EditorEvent::Transaction => LayoutTrigger::EditorUpdated,
            EditorEvent::ContentResized => LayoutTrigger::ContentResized,
            EditorEvent::DomMutated => LayoutTrigger::DomMutated,
        });
    }

    /// Frame callback. Returns true when the layout was recomputed.
    pub fn on_animation_frame(&mut self, source: &dyn ContentHeightSource) -> bool {
        if !self.frame_pending {
            return false;
        }
        self.frame_pending = false;
        self.recompute_now(source);
        true
    }

    /// Immediate recomputation, used for the initial layout.
    pub fn recompute_now(&mut self, source: &dyn ContentHeightSource) -> &PageLayout {
        let height = source.content_height();
        self.layout = compute_layout(height, &self.dims);
        self.recomputations += 1;
        log::debug!(
            "pagination: {:.0}px of content -> {} pages",
            height,
            self.layout.total_pages
        );
        &self.layout
    }
}

/// Route editor events from `events` into `engine`. The returned id
/// detaches the engine again.
pub fn attach(engine: Rc<RefCell<PaginationEngine>>, events: &mut EditorEvents) -> SubscriptionId {
    events.subscribe(move |event| engine.borrow_mut().handle_event(event))
}
