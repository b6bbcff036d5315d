use std::cell::{Cell, RefCell};
use std::rc::Rc;

use richdoc_export::PageFormatId;
use richdoc_export::events::{EditorEvent, EditorEvents};
use richdoc_export::geometry::{resolve_format, to_pixel_dimensions};
use richdoc_export::pagination::{LayoutTrigger, PaginationEngine, attach, compute_layout};

#[test]
fn breaks_at_each_page_multiple() {
    let dims = to_pixel_dimensions(resolve_format(PageFormatId::Letter));
    let per_page = dims.content_height;
    let layout = compute_layout(per_page * 3.5, &dims);

    assert_eq!(layout.total_pages, 4);
    let offsets: Vec<f32> = layout.page_breaks.iter().map(|b| b.top_offset).collect();
    assert_eq!(offsets, vec![per_page, per_page * 2.0, per_page * 3.0]);
    let numbers: Vec<usize> = layout.page_breaks.iter().map(|b| b.page_number).collect();
    assert_eq!(numbers, vec![2, 3, 4]);
    assert_eq!(layout.page_width, 816.0);
    assert_eq!(layout.margin_size, dims.margin_top);
}

#[test]
fn short_or_empty_content_is_one_page() {
    let dims = to_pixel_dimensions(resolve_format(PageFormatId::A4));
    for height in [0.0, 10.0, dims.content_height, -5.0, f32::NAN] {
        let layout = compute_layout(height, &dims);
        assert_eq!(layout.total_pages, 1, "height {height}");
        assert!(layout.page_breaks.is_empty());
    }
}

#[test]
fn exact_multiple_does_not_add_a_page() {
    let dims = to_pixel_dimensions(resolve_format(PageFormatId::Letter));
    let layout = compute_layout(dims.content_height * 2.0, &dims);
    assert_eq!(layout.total_pages, 2);
    assert_eq!(layout.page_breaks.len(), 1);
}

#[test]
fn triggers_coalesce_into_one_frame() {
    let mut engine = PaginationEngine::new(PageFormatId::Letter);
    assert!(!engine.on_animation_frame(&2000.0_f32));

    engine.trigger(LayoutTrigger::EditorUpdated);
    engine.trigger(LayoutTrigger::DomMutated);
    engine.trigger(LayoutTrigger::ContentResized);
    assert!(engine.is_pending());

    assert!(engine.on_animation_frame(&2000.0_f32));
    assert!(!engine.on_animation_frame(&2000.0_f32));
    assert_eq!(engine.recomputations(), 1);
    assert_eq!(engine.layout().total_pages, 3);
}

#[test]
fn height_is_read_when_the_frame_runs() {
    let height = Cell::new(100.0_f32);
    let source = || height.get();
    let mut engine = PaginationEngine::new(PageFormatId::Letter);

    engine.trigger(LayoutTrigger::ContentResized);
    height.set(1800.0);
    engine.on_animation_frame(&source);

    assert_eq!(engine.layout().total_pages, 3);
}

#[test]
fn format_change_recomputes_with_new_dimensions() {
    let mut engine = PaginationEngine::new(PageFormatId::Letter);
    engine.recompute_now(&1000.0_f32);
    assert_eq!(engine.layout().total_pages, 2);

    engine.trigger(LayoutTrigger::FormatChanged(PageFormatId::Tabloid));
    assert_eq!(engine.format(), PageFormatId::Tabloid);
    assert_eq!(engine.dimensions().width, 1056.0);
    // Layout stays stale until the frame runs.
    assert_eq!(engine.layout().total_pages, 2);

    engine.on_animation_frame(&1000.0_f32);
    assert_eq!(engine.layout().total_pages, 1);
    assert_eq!(engine.layout().page_height, 17.0 * 96.0);
}

#[test]
fn attached_engine_follows_editor_events() {
    let engine = Rc::new(RefCell::new(PaginationEngine::new(PageFormatId::A4)));
    let mut events = EditorEvents::new();
    let id = attach(Rc::clone(&engine), &mut events);

    events.emit(&EditorEvent::Transaction);
    events.emit(&EditorEvent::Update);
    assert!(engine.borrow().is_pending());
    assert!(engine.borrow_mut().on_animation_frame(&500.0_f32));

    assert!(events.unsubscribe(id));
    events.emit(&EditorEvent::DomMutated);
    assert!(!engine.borrow().is_pending());
    assert_eq!(engine.borrow().recomputations(), 1);
}
