//! Widget behaviour against a headless host page.
//!
//! Covers mounting, remounting, resize bridging and the theme relay through
//! the public `Widget` API, the same way a host page drives it.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use testify::embed::{
    EmbedMode, HeadlessPage, LoaderState, Theme, Widget, WidgetSettings,
};

fn carousel_page() -> HeadlessPage {
    HeadlessPage::with_container("testify-testimonials")
}

fn widget(page: HeadlessPage) -> Widget<HeadlessPage> {
    Widget::new(page, WidgetSettings::default())
}

fn snapshot(widget: &Widget<HeadlessPage>) -> String {
    let page = widget.page();
    page.outer_html(&page.body())
}

fn frame_src(widget: &Widget<HeadlessPage>, iframe_id: &str) -> String {
    let page = widget.page();
    let frame = page
        .iframes()
        .into_iter()
        .find(|node| page.attribute(node, "id").as_deref() == Some(iframe_id))
        .expect("iframe is mounted");
    page.attribute(&frame, "src").unwrap()
}

#[test]
fn test_empty_space_name_leaves_page_untouched() {
    for mode in EmbedMode::ALL {
        let mut w = widget(HeadlessPage::with_container(mode.container_id()));
        let before = snapshot(&w);
        let handle = match mode {
            EmbedMode::Carousel => w.init("", &json!({"theme": "dark"})),
            EmbedMode::Wall => w.init_wall("", &Value::Null),
        };
        assert!(handle.is_none());
        assert_eq!(snapshot(&w), before);
        assert!(w.page().iframes().is_empty());
        assert!(w.page().script_loads().is_empty());
    }
}

#[test]
fn test_missing_container_leaves_page_untouched() {
    let mut w = widget(HeadlessPage::with_container("somewhere-else"));
    let before = snapshot(&w);
    assert!(w.init("acme", &Value::Null).is_none());
    assert!(w.init_wall("acme", &json!({"columns": 5})).is_none());
    assert_eq!(snapshot(&w), before);
    assert!(w.page().script_loads().is_empty());
    assert_eq!(w.instances().count(), 0);
}

#[test]
fn test_unusable_options_fall_back_to_defaults() {
    let mut w = widget(carousel_page());
    let handle = w.init("acme", &json!("dark")).unwrap();
    let src = frame_src(&w, &handle.iframe_id);
    assert!(src.ends_with("?theme=light&autoplay=true&delay=5000&slidesPerView=auto"));

    w.init("acme", &json!({"delay": "soon", "slidesPerView": 0})).unwrap();
    assert!(frame_src(&w, &handle.iframe_id).ends_with("&delay=5000&slidesPerView=auto"));
    assert_eq!(w.page().iframes().len(), 1);
}

#[test]
fn test_wall_mounts_with_carousel_only_values() {
    let mut w = widget(HeadlessPage::with_container("testify-wall"));
    let handle = w.init_wall("acme", &json!({"slidesPerView": 0})).unwrap();
    assert!(frame_src(&w, &handle.iframe_id).ends_with("?theme=light&columns=3"));
}

#[test]
fn test_carousel_reads_values_given_as_text() {
    let mut w = widget(carousel_page());
    let handle = w
        .init("acme", &json!({"delay": "3000", "autoplay": "false"}))
        .unwrap();
    let src = frame_src(&w, &handle.iframe_id);
    assert!(src.ends_with("?theme=light&autoplay=false&delay=3000&slidesPerView=auto"));
}

#[test]
fn test_init_carousel_src_and_id() {
    let mut w = widget(carousel_page());
    let handle = w.init("acme", &json!({"theme": "dark"})).unwrap();
    assert_eq!(handle.iframe_id, "testify-carousel-acme");
    assert_eq!(handle.container_id, "testify-testimonials");

    let src = frame_src(&w, "testify-carousel-acme");
    assert_eq!(
        src,
        "http://localhost:5173/embed/carousel/acme?theme=dark&autoplay=true&delay=5000&slidesPerView=auto"
    );
}

#[test]
fn test_init_carousel_frame_attributes() {
    let mut w = widget(carousel_page());
    w.init("acme", &Value::Null).unwrap();
    let page = w.page();
    let frame = page.iframes()[0];
    assert_eq!(page.attribute(&frame, "frameborder").as_deref(), Some("0"));
    assert_eq!(page.attribute(&frame, "scrolling").as_deref(), Some("no"));
    assert_eq!(page.attribute(&frame, "width").as_deref(), Some("100%"));
    assert_eq!(page.attribute(&frame, "height").as_deref(), Some("500px"));
    assert_eq!(page.style(&frame, "width").as_deref(), Some("1px"));
    assert_eq!(page.style(&frame, "min-width").as_deref(), Some("100%"));
    assert_eq!(page.style(&frame, "border").as_deref(), Some("none"));
}

#[test]
fn test_init_wall_query_and_container_height() {
    let page = HeadlessPage::with_container("testify-wall");
    let mut w = widget(page);
    let handle = w.init_wall("acme", &json!({"columns": 5})).unwrap();

    let src = frame_src(&w, &handle.iframe_id);
    let query = src.split_once('?').map(|(_, q)| q).unwrap();
    assert_eq!(query, "theme=light&columns=5");

    let page = w.page();
    let container = page.children(&page.body())[0];
    assert_eq!(page.style(&container, "height").as_deref(), Some("100vh"));
    assert_eq!(page.style(&container, "overflow").as_deref(), Some("visible"));
    let frame = page.iframes()[0];
    assert_eq!(page.attribute(&frame, "scrolling").as_deref(), Some("yes"));
}

#[test]
fn test_wall_ignores_carousel_options() {
    let mut w = widget(HeadlessPage::with_container("testify-wall"));
    let handle = w
        .init_wall("acme", &json!({"autoplay": false, "slidesPerView": 2}))
        .unwrap();
    let src = frame_src(&w, &handle.iframe_id);
    assert!(src.ends_with("?theme=light&columns=3"));
}

#[test]
fn test_remount_keeps_single_iframe() {
    let page = carousel_page();
    let container = page.children(&page.body())[0];
    page.append_text(&container, "Loading testimonials...");
    let mut w = widget(page);

    w.init("acme", &Value::Null).unwrap();
    w.init("acme", &json!({"theme": "dark"})).unwrap();

    let page = w.page();
    let children = page.children(&container);
    assert_eq!(children.len(), 1);
    assert_eq!(page.tag_name(&children[0]), "iframe");
    assert_eq!(page.iframes().len(), 1);
    assert!(frame_src(&w, "testify-carousel-acme").contains("theme=dark"));
}

#[test]
fn test_both_modes_on_one_page() {
    let page = HeadlessPage::new();
    page.add_element(&page.body(), "div", "testify-testimonials");
    page.add_element(&page.body(), "div", "testify-wall");
    let mut w = widget(page);

    w.init("acme", &Value::Null).unwrap();
    w.init_wall("globex", &Value::Null).unwrap();

    assert_eq!(w.page().iframes().len(), 2);
    let tracked: Vec<_> = w.instances().map(|h| h.iframe_id.clone()).collect();
    assert_eq!(tracked, vec!["testify-carousel-acme", "testify-wall-globex"]);
}

#[test]
fn test_height_update_through_resizer_callback() {
    let mut w = widget(carousel_page().with_resizer_loaded());
    let handle = w.init("acme", &Value::Null).unwrap();

    let applied = w.handle_resizer_message(
        &handle.iframe_id,
        &json!({"type": "testify-height-update", "height": 742}),
    );
    assert!(applied);
    let page = w.page();
    let frame = page.iframes()[0];
    assert_eq!(page.style(&frame, "height").as_deref(), Some("742px"));
}

#[test]
fn test_resizer_channel_ignores_theme_changes() {
    let mut w = widget(carousel_page().with_resizer_loaded());
    let handle = w.init("acme", &Value::Null).unwrap();
    let before = frame_src(&w, &handle.iframe_id);

    assert!(!w.handle_resizer_message(
        &handle.iframe_id,
        &json!({"type": "testify-theme-change", "theme": "dark"}),
    ));
    assert_eq!(frame_src(&w, &handle.iframe_id), before);
}

#[test]
fn test_window_channel_ignores_height_updates() {
    let mut w = widget(carousel_page().with_resizer_loaded());
    w.init("acme", &Value::Null).unwrap();
    assert_eq!(
        w.handle_window_message(&json!({"type": "testify-height-update", "height": 10})),
        0
    );
    let page = w.page();
    assert_eq!(page.style(&page.iframes()[0], "height"), None);
}

#[test]
fn test_theme_change_before_any_mount_is_a_no_op() {
    let w = widget(carousel_page());
    let before = snapshot(&w);
    assert_eq!(
        w.handle_window_message(&json!({"type": "testify-theme-change", "theme": "dark"})),
        0
    );
    assert_eq!(snapshot(&w), before);
}

#[test]
fn test_theme_change_rewrites_only_theme() {
    let mut w = widget(carousel_page());
    let handle = w.init("acme", &json!({"delay": 800})).unwrap();

    let reloaded =
        w.handle_window_message(&json!({"type": "testify-theme-change", "theme": "dark"}));
    assert_eq!(reloaded, 1);
    assert_eq!(
        frame_src(&w, &handle.iframe_id),
        "http://localhost:5173/embed/carousel/acme?theme=dark&autoplay=true&delay=800&slidesPerView=auto"
    );
}

#[test]
fn test_theme_change_targets_space() {
    let page = HeadlessPage::new();
    page.add_element(&page.body(), "div", "testify-testimonials");
    page.add_element(&page.body(), "div", "testify-wall");
    let mut w = widget(page);
    w.init("acme", &Value::Null).unwrap();
    w.init_wall("globex", &Value::Null).unwrap();

    let reloaded = w.handle_window_message(
        &json!({"type": "testify-theme-change", "theme": "dark", "spaceName": "globex"}),
    );
    assert_eq!(reloaded, 1);
    assert!(frame_src(&w, "testify-carousel-acme").contains("theme=light"));
    assert!(frame_src(&w, "testify-wall-globex").contains("theme=dark"));
}

#[test]
fn test_unrelated_window_messages_are_ignored() {
    let mut w = widget(carousel_page());
    w.init("acme", &Value::Null).unwrap();
    for message in [
        json!("[iFrameSizer]testify-carousel-acme:500:300:init"),
        json!({"type": "something-else", "theme": "dark"}),
        json!({"type": "testify-theme-change"}),
        Value::Null,
    ] {
        assert_eq!(w.handle_window_message(&message), 0);
    }
}

#[test]
fn test_handle_update_theme() {
    let mut w = widget(carousel_page());
    let handle = w.init("acme", &Value::Null).unwrap();
    assert!(w.update_instance_theme(&handle, &Theme::Custom("sepia".to_string())));
    assert!(frame_src(&w, &handle.iframe_id).contains("theme=sepia"));
}

#[test]
fn test_concurrent_mounts_share_one_library_load() {
    let page = HeadlessPage::new();
    page.add_element(&page.body(), "div", "testify-testimonials");
    page.add_element(&page.body(), "div", "testify-wall");
    let mut w = widget(page);

    w.init("acme", &Value::Null).unwrap();
    w.init_wall("acme", &Value::Null).unwrap();
    assert_eq!(w.page().script_loads().len(), 1);
    assert!(w.page().attached_resizers().is_empty());
    assert_eq!(
        w.resize_state(),
        &LoaderState::Loading {
            waiting: vec![
                "testify-carousel-acme".to_string(),
                "testify-wall-acme".to_string()
            ]
        }
    );

    w.resizer_loaded();
    assert_eq!(w.resize_state(), &LoaderState::Ready);
    assert_eq!(
        w.page().attached_resizers(),
        vec!["testify-carousel-acme", "testify-wall-acme"]
    );

    // Later mounts attach straight away.
    w.init("acme", &Value::Null).unwrap();
    assert_eq!(w.page().script_loads().len(), 1);
    assert_eq!(w.page().attached_resizers().len(), 3);
}

#[test]
fn test_failed_library_load_is_not_retried() {
    let mut w = widget(carousel_page());
    w.init("acme", &Value::Null).unwrap();
    w.resizer_failed();
    assert_eq!(w.resize_state(), &LoaderState::Unavailable);

    let handle = w.init("acme", &json!({"theme": "dark"})).unwrap();
    assert_eq!(w.page().script_loads().len(), 1);
    assert!(w.page().attached_resizers().is_empty());
    // The embed is still mounted at its configured height.
    assert!(frame_src(&w, &handle.iframe_id).contains("theme=dark"));
}

#[test]
fn test_custom_settings() {
    let settings =
        WidgetSettings::new("https://testify.example.com/e/", "https://cdn.example.com/r.js")
            .unwrap();
    let mut w = Widget::new(carousel_page(), settings);
    let handle = w.init("acme co", &Value::Null).unwrap();
    assert_eq!(handle.iframe_id, "testify-carousel-acme co");
    assert!(
        frame_src(&w, &handle.iframe_id)
            .starts_with("https://testify.example.com/e/carousel/acme%20co?")
    );
    assert_eq!(w.page().script_loads(), vec!["https://cdn.example.com/r.js"]);
}
