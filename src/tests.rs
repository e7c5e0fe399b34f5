#![cfg(test)]

use futures::executor::block_on;

use crate::config::UiConfig;
use crate::controllers::SubmitOutcome;
use crate::dom::{Dom, MemoryDom, NodeId};
use crate::fingerprint::{fallback_fingerprint, BrowserTraits, FingerprintSource, HashKind};
use crate::host::{Host, MemoryHost};
use crate::page::{Dispatch, Page, PageEvent};
use crate::testing::RecordingTransport;
use crate::toggle::{FavoriteState, MenuState};

/// Article page as rendered by the public templates: navbar, search,
/// article actions, article-page signup, footer signup, back-to-top.
const ARTICLE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>How to set up a proxy</title>
  <script src="https://openfpcdn.io/fingerprintjs/v4"></script>
</head>
<body class="bg-gray-50">
  <nav id="navbar" class="fixed top-0 w-full bg-transparent">
    <a href="/" class="logo">Site</a>
    <button id="menu-toggle" class="md:hidden"><i class="fa-solid fa-bars"></i></button>
    <div id="mobile-menu" class="hidden md:hidden">
      <a id="mobile-home" href="/">Home</a>
      <a href="/category/1">Guides</a>
    </div>
  </nav>

  <div class="search-bar">
    <input id="article-search" type="text" placeholder="Search articles">
    <select id="article-order-by">
      <option value="0">Latest</option>
      <option value="1">Most viewed</option>
    </select>
    <button id="search-button"><i class="fa-solid fa-magnifying-glass"></i></button>
  </div>

  <article id="article-body">
    <h1>How to set up a proxy</h1>
    <p id="first-paragraph">Lorem ipsum &amp; dolor.</p>
    <div class="actions">
      <button id="favorite-btn" class="text-gray-600"><i class="fa-regular fa-heart"></i> <span>Favorite</span></button>
      <button id="copy-link-btn"><i class="fa-solid fa-link"></i> Copy link</button>
    </div>
    <form id="article-subscribe-form">
      <input type="email" id="article-subscribe-email" placeholder="Email">
      <input type="hidden" id="article-browser-fingerprint" name="fingerprint">
      <button type="submit" id="article-subscribe-button">Subscribe</button>
    </form>
  </article>

  <footer>
    <form id="subscribe-form">
      <input type="email" id="subscribe-email" placeholder="Email">
      <input type="hidden" id="browser-fingerprint" name="fingerprint">
      <button type="submit" id="subscribe-button"><i class="fa-solid fa-paper-plane"></i></button>
    </form>
  </footer>

  <button id="back-to-top" class="fixed bottom-8 right-8 opacity-0 invisible"><i class="fa-solid fa-arrow-up"></i></button>
</body>
</html>"#;

const FINGERPRINT: &str = "fp-0123456789abcdef";

struct Env {
    dom: MemoryDom,
    host: MemoryHost,
    page: Page<MemoryDom>,
}

fn article_page() -> Env {
    let dom = MemoryDom::from_html(ARTICLE_PAGE).unwrap();
    let host = MemoryHost::new("https://blog.example.com/article/42");
    let page = Page::mount(&dom, &host, &UiConfig::default(), FINGERPRINT).unwrap();
    Env { dom, host, page }
}

fn node(env: &Env, id: &str) -> NodeId {
    env.dom.by_id(id).unwrap()
}

fn click(env: &mut Env, id: &str) -> bool {
    let target = node(env, id);
    env.page
        .handle(&env.dom, &env.host, PageEvent::Click { target })
        .is_handled()
}

fn sorted_classes(env: &Env, id: &str) -> Vec<String> {
    let mut c = env.dom.class_names(node(env, id));
    c.sort();
    c
}

// ═══════════════════════════════════════════════════════════
// Mount
// ═══════════════════════════════════════════════════════════

#[test]
fn mount_binds_every_controller_on_article_page() {
    let env = article_page();
    assert_eq!(
        env.page.mounted(),
        vec![
            "back-to-top",
            "navbar",
            "mobile-menu",
            "favorite",
            "copy-link",
            "search",
            "subscribe:subscribe-form",
            "subscribe:article-subscribe-form",
        ]
    );
}

#[test]
fn mount_writes_fingerprint_into_both_forms() {
    let env = article_page();
    for id in ["browser-fingerprint", "article-browser-fingerprint"] {
        assert_eq!(env.dom.value(&node(&env, id)), FINGERPRINT);
    }
}

#[test]
fn mount_on_listing_page_skips_article_controllers() {
    let html = r#"<body>
<nav id="navbar"></nav>
<button id="back-to-top"></button>
</body>"#;
    let dom = MemoryDom::from_html(html).unwrap();
    let host = MemoryHost::default();
    let page = Page::mount(&dom, &host, &UiConfig::default(), "").unwrap();
    assert_eq!(page.mounted(), vec!["back-to-top", "navbar"]);
    assert!(page.favorite().is_none());
    assert!(page.forms().is_empty());
}

#[test]
fn mount_fails_fast_on_template_drift() {
    let html = ARTICLE_PAGE.replace("id=\"article-order-by\"", "id=\"order\"");
    let dom = MemoryDom::from_html(&html).unwrap();
    let host = MemoryHost::default();
    let err = Page::mount(&dom, &host, &UiConfig::default(), FINGERPRINT)
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "missing element #article-order-by");
}

#[test]
fn mount_applies_current_scroll_offset() {
    let dom = MemoryDom::from_html(ARTICLE_PAGE).unwrap();
    let host = MemoryHost::default();
    host.set_scroll_offset(1200.0);
    Page::mount(&dom, &host, &UiConfig::default(), FINGERPRINT).unwrap();
    let navbar = dom.by_id("navbar").unwrap();
    let top = dom.by_id("back-to-top").unwrap();
    assert!(dom.has_class(&navbar, "shadow-md"));
    assert!(dom.has_class(&top, "visible"));
}

// ═══════════════════════════════════════════════════════════
// Scroll
// ═══════════════════════════════════════════════════════════

#[test]
fn scroll_back_to_top_classes_over_all_offsets() {
    let mut env = article_page();
    let cfg = UiConfig::default().back_to_top;
    let layout = ["bottom-8", "fixed", "right-8"];

    for offset in (0..=1000).step_by(7).map(|o| o as f64).chain([299.0, 300.0, 300.5]) {
        env.page
            .handle(&env.dom, &env.host, PageEvent::Scroll { offset });
        let expected = if offset >= 300.0 {
            &cfg.visible_classes
        } else {
            &cfg.hidden_classes
        };
        let mut expected: Vec<String> = expected.clone();
        expected.extend(layout.iter().map(|s| s.to_string()));
        expected.sort();
        assert_eq!(sorted_classes(&env, "back-to-top"), expected, "offset {}", offset);
    }
}

#[test]
fn scroll_navbar_style() {
    let mut env = article_page();
    env.page
        .handle(&env.dom, &env.host, PageEvent::Scroll { offset: 51.0 });
    assert!(env.dom.has_class(&node(&env, "navbar"), "shadow-md"));
    env.page
        .handle(&env.dom, &env.host, PageEvent::Scroll { offset: 50.0 });
    assert!(!env.dom.has_class(&node(&env, "navbar"), "shadow-md"));
    assert!(env.dom.has_class(&node(&env, "navbar"), "bg-transparent"));
}

#[test]
fn scroll_reapplying_same_range_is_idempotent() {
    let mut env = article_page();
    env.page
        .handle(&env.dom, &env.host, PageEvent::Scroll { offset: 400.0 });
    let once = (sorted_classes(&env, "back-to-top"), sorted_classes(&env, "navbar"));
    env.page
        .handle(&env.dom, &env.host, PageEvent::Scroll { offset: 450.0 });
    let twice = (sorted_classes(&env, "back-to-top"), sorted_classes(&env, "navbar"));
    assert_eq!(once, twice);
}

#[test]
fn back_to_top_click_scrolls() {
    let mut env = article_page();
    assert!(click(&mut env, "back-to-top"));
    assert_eq!(env.host.scroll_to_top_calls(), 1);
}

// ═══════════════════════════════════════════════════════════
// Mobile menu
// ═══════════════════════════════════════════════════════════

#[test]
fn menu_opens_and_closes_on_outside_click_when_narrow() {
    let mut env = article_page();
    env.host.set_viewport_width(390.0);
    let menu_state = |env: &Env| env.page.menu().unwrap().state(&env.dom);

    assert_eq!(menu_state(&env), MenuState::Closed);
    click(&mut env, "menu-toggle");
    assert_eq!(menu_state(&env), MenuState::Open);

    // inside the menu: swallowed
    click(&mut env, "mobile-home");
    assert_eq!(menu_state(&env), MenuState::Open);

    click(&mut env, "first-paragraph");
    assert_eq!(menu_state(&env), MenuState::Closed);
}

#[test]
fn menu_stays_open_on_desktop_outside_click() {
    let mut env = article_page();
    env.host.set_viewport_width(1440.0);
    click(&mut env, "menu-toggle");
    assert!(!click(&mut env, "first-paragraph"));
    assert_eq!(env.page.menu().unwrap().state(&env.dom), MenuState::Open);
}

// ═══════════════════════════════════════════════════════════
// Favorite / copy link / toasts
// ═══════════════════════════════════════════════════════════

#[test]
fn favorite_twice_round_trips() {
    let mut env = article_page();
    let button = node(&env, "favorite-btn");
    let icon = env.dom.first_by_tag(&button, "i").unwrap();
    let before = (
        env.dom.text(&button),
        env.dom.class_names(icon),
        sorted_classes(&env, "favorite-btn"),
    );

    click(&mut env, "favorite-btn");
    assert_eq!(env.page.favorite().unwrap().state(), FavoriteState::Favorited);
    assert_eq!(env.dom.text(&button), " Favorited");

    click(&mut env, "favorite-btn");
    let mut icon_after = env.dom.class_names(icon);
    icon_after.sort();
    let mut icon_before = before.1.clone();
    icon_before.sort();
    assert_eq!(env.dom.text(&button), before.0);
    assert_eq!(icon_after, icon_before);
    assert_eq!(sorted_classes(&env, "favorite-btn"), before.2);
}

#[test]
fn favorite_click_on_icon_counts() {
    let mut env = article_page();
    let icon = env.dom.find_by_class("fa-heart")[0];
    env.page
        .handle(&env.dom, &env.host, PageEvent::Click { target: icon });
    assert_eq!(env.page.favorite().unwrap().state(), FavoriteState::Favorited);
}

#[test]
fn favorite_toast_fades_and_is_removed() {
    let mut env = article_page();
    let body_before = env.dom.body_len();
    let faded_before = env.dom.find_by_class("opacity-0").len();
    click(&mut env, "favorite-btn");
    assert_eq!(env.dom.body_len(), body_before + 1);
    assert_eq!(env.page.next_tick_in(env.host.now_ms()), Some(2000));

    env.host.advance(2000);
    env.page.handle(&env.dom, &env.host, PageEvent::Tick);
    assert_eq!(env.dom.find_by_class("opacity-0").len(), faded_before + 1);
    assert_eq!(env.dom.body_len(), body_before + 1);

    env.host.advance(300);
    env.page.handle(&env.dom, &env.host, PageEvent::Tick);
    assert_eq!(env.dom.body_len(), body_before);
    assert!(env.page.toasts().is_empty());
    assert_eq!(env.page.next_tick_in(env.host.now_ms()), None);
}

#[test]
fn unfavorite_shows_no_toast() {
    let mut env = article_page();
    click(&mut env, "favorite-btn");
    env.host.advance(5000);
    env.page.handle(&env.dom, &env.host, PageEvent::Tick);
    let body = env.dom.body_len();
    click(&mut env, "favorite-btn");
    assert_eq!(env.dom.body_len(), body);
}

#[test]
fn copy_link_copies_location_and_toasts() {
    let mut env = article_page();
    let body_before = env.dom.body_len();
    assert!(click(&mut env, "copy-link-btn"));
    assert_eq!(
        env.dom.clipboard().as_deref(),
        Some("https://blog.example.com/article/42")
    );
    assert_eq!(env.dom.body_len(), body_before + 1);
    assert_eq!(env.page.toasts().len(), 1);
}

// ═══════════════════════════════════════════════════════════
// Search
// ═══════════════════════════════════════════════════════════

#[test]
fn search_enter_navigates_exactly() {
    let mut env = article_page();
    let input = node(&env, "article-search");
    env.dom.set_value(&input, "rust");
    env.dom.set_value(&node(&env, "article-order-by"), "date");
    let d = env.page.handle(
        &env.dom,
        &env.host,
        PageEvent::KeyDown {
            target: input,
            key: "Enter".into(),
        },
    );
    assert!(d.is_handled());
    assert_eq!(
        env.host.navigations(),
        vec!["/search?keyword=rust&order_by=date"]
    );
}

#[test]
fn search_button_click_with_empty_keyword() {
    let mut env = article_page();
    env.dom.set_value(&node(&env, "article-order-by"), "1");
    click(&mut env, "search-button");
    assert_eq!(env.host.navigations(), vec!["/search?keyword=&order_by=1"]);
}

#[test]
fn keydown_elsewhere_is_ignored() {
    let mut env = article_page();
    let email = node(&env, "subscribe-email");
    let d = env.page.handle(
        &env.dom,
        &env.host,
        PageEvent::KeyDown {
            target: email,
            key: "Enter".into(),
        },
    );
    assert!(!d.is_handled());
    assert!(env.host.navigations().is_empty());
}

// ═══════════════════════════════════════════════════════════
// Subscription
// ═══════════════════════════════════════════════════════════

fn submit(env: &mut Env, form_id: &str, transport: &RecordingTransport) -> Option<SubmitOutcome> {
    let form = node(env, form_id);
    block_on(
        env.page
            .dispatch(&env.dom, &env.host, transport, PageEvent::Submit { form }),
    )
}

#[test]
fn subscribe_invalid_email_sends_nothing() {
    let mut env = article_page();
    env.dom.set_value(&node(&env, "subscribe-email"), "not-an-email");
    let transport = RecordingTransport::replying(true, "ok");
    let outcome = submit(&mut env, "subscribe-form", &transport);
    assert_eq!(outcome, Some(SubmitOutcome::Rejected));
    assert_eq!(
        env.host.alerts(),
        vec![UiConfig::default().subscribe.invalid_email_message]
    );
    assert!(transport.requests().is_empty());
}

#[test]
fn subscribe_success_posts_once_and_clears() {
    let mut env = article_page();
    env.dom.set_value(&node(&env, "subscribe-email"), "a@b.com");
    let transport = RecordingTransport::replying(true, "ok");
    let outcome = submit(&mut env, "subscribe-form", &transport);
    assert_eq!(outcome, Some(SubmitOutcome::Subscribed("ok".into())));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].email, "a@b.com");
    assert!(!requests[0].browser_fingerprint.is_empty());
    assert_eq!(env.dom.value(&node(&env, "subscribe-email")), "");
    assert_eq!(env.host.alerts(), vec!["ok"]);
}

#[test]
fn subscribe_declined_keeps_email() {
    let mut env = article_page();
    env.dom.set_value(&node(&env, "subscribe-email"), "a@b.com");
    let transport = RecordingTransport::replying(false, "x");
    submit(&mut env, "subscribe-form", &transport);
    assert_eq!(env.dom.value(&node(&env, "subscribe-email")), "a@b.com");
    assert_eq!(env.host.alerts(), vec!["x"]);
}

#[test]
fn subscribe_article_variant_uses_its_own_fields() {
    let mut env = article_page();
    env.dom.set_value(&node(&env, "subscribe-email"), "footer@b.com");
    env.dom
        .set_value(&node(&env, "article-subscribe-email"), "article@b.com");
    let transport = RecordingTransport::replying(true, "welcome");
    submit(&mut env, "article-subscribe-form", &transport);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].email, "article@b.com");
    assert_eq!(requests[0].browser_fingerprint, FINGERPRINT);
    assert_eq!(env.dom.value(&node(&env, "article-subscribe-email")), "");
    assert_eq!(env.dom.value(&node(&env, "subscribe-email")), "footer@b.com");
}

#[test]
fn subscribe_network_failure_restores_button() {
    let mut env = article_page();
    env.dom.set_value(&node(&env, "subscribe-email"), "a@b.com");
    let button = node(&env, "subscribe-button");
    let label = env.dom.inner_html(&button);
    let transport = RecordingTransport::failing("dns error");
    let outcome = submit(&mut env, "subscribe-form", &transport);
    assert!(matches!(outcome, Some(SubmitOutcome::Failed(_))));
    assert_eq!(
        env.host.alerts(),
        vec![UiConfig::default().subscribe.failure_message]
    );
    assert!(!env.dom.is_disabled(&button));
    assert_eq!(env.dom.inner_html(&button), label);
}

#[test]
fn submit_of_unmanaged_form_is_ignored() {
    let html = format!("{}<form id=\"login\"></form>", ARTICLE_PAGE);
    let dom = MemoryDom::from_html(&html).unwrap();
    let host = MemoryHost::default();
    let mut page = Page::mount(&dom, &host, &UiConfig::default(), FINGERPRINT).unwrap();
    let form = dom.by_id("login").unwrap();
    assert!(matches!(
        page.handle(&dom, &host, PageEvent::Submit { form }),
        Dispatch::Ignored
    ));
}

// ═══════════════════════════════════════════════════════════
// Setup with fingerprinting
// ═══════════════════════════════════════════════════════════

struct Unavailable;

#[async_trait::async_trait(?Send)]
impl FingerprintSource for Unavailable {
    async fn visitor_id(&self) -> Result<String, String> {
        Err("FingerprintJS not loaded".into())
    }
}

fn traits() -> BrowserTraits {
    BrowserTraits {
        user_agent: "Mozilla/5.0".into(),
        screen_width: 390,
        screen_height: 844,
        color_depth: 24,
        timezone_offset: 0,
        language: "en-US".into(),
    }
}

#[test]
fn setup_falls_back_to_local_hash() {
    let dom = MemoryDom::from_html(ARTICLE_PAGE).unwrap();
    let host = MemoryHost::default();
    let page = block_on(Page::setup(
        &dom,
        &host,
        &UiConfig::default(),
        Some(&Unavailable),
        &traits(),
    ))
    .unwrap();
    assert_eq!(page.forms().len(), 2);
    let field = dom.by_id("browser-fingerprint").unwrap();
    assert_eq!(
        dom.value(&field),
        fallback_fingerprint(&traits(), HashKind::Sha256)
    );
    assert!(host.alerts().is_empty());
}

#[test]
fn setup_uses_fold_hash_when_digest_disabled() {
    let dom = MemoryDom::from_html(ARTICLE_PAGE).unwrap();
    let host = MemoryHost::default();
    let config = UiConfig::from_toml_str("[subscribe]\nuse_digest = false\n").unwrap();
    block_on(Page::setup(&dom, &host, &config, None::<&Unavailable>, &traits())).unwrap();
    let field = dom.by_id("article-browser-fingerprint").unwrap();
    assert_eq!(dom.value(&field), fallback_fingerprint(&traits(), HashKind::Fold));
}

struct NeverSettles;

#[async_trait::async_trait(?Send)]
impl FingerprintSource for NeverSettles {
    async fn visitor_id(&self) -> Result<String, String> {
        futures::future::pending::<()>().await;
        Err("unreachable".into())
    }
}

#[test]
fn controllers_work_while_fingerprint_library_is_pending() {
    let dom = MemoryDom::from_html(ARTICLE_PAGE).unwrap();
    let host = MemoryHost::default();
    let config = UiConfig::default();
    let mut page = Page::mount_with_fallback(&dom, &host, &config, &traits()).unwrap();

    let browser = traits();
    let lookup = crate::fingerprint::browser_fingerprint(
        Some(&NeverSettles),
        &browser,
        crate::page::hash_kind(&config),
    );
    assert!(futures::FutureExt::now_or_never(lookup).is_none());

    let favorite = dom.by_id("favorite-btn").unwrap();
    page.handle(&dom, &host, PageEvent::Click { target: favorite });
    assert_eq!(page.favorite().unwrap().state(), FavoriteState::Favorited);

    let local = fallback_fingerprint(&traits(), HashKind::Sha256);
    dom.set_value(&dom.by_id("subscribe-email").unwrap(), "a@b.com");
    let transport = RecordingTransport::replying(true, "ok");
    let form = dom.by_id("subscribe-form").unwrap();
    block_on(page.dispatch(&dom, &host, &transport, PageEvent::Submit { form }));
    assert_eq!(transport.requests()[0].browser_fingerprint, local);
}

#[test]
fn library_fingerprint_replaces_fallback_once_resolved() {
    let dom = MemoryDom::from_html(ARTICLE_PAGE).unwrap();
    let host = MemoryHost::default();
    let mut page = Page::mount_with_fallback(&dom, &host, &UiConfig::default(), &traits()).unwrap();
    page.set_fingerprint(&dom, "visitor-42");

    for id in ["browser-fingerprint", "article-browser-fingerprint"] {
        assert_eq!(dom.value(&dom.by_id(id).unwrap()), "visitor-42");
    }
    dom.set_value(&dom.by_id("article-subscribe-email").unwrap(), "a@b.com");
    let transport = RecordingTransport::replying(true, "ok");
    let form = dom.by_id("article-subscribe-form").unwrap();
    block_on(page.dispatch(&dom, &host, &transport, PageEvent::Submit { form }));
    assert_eq!(transport.requests()[0].browser_fingerprint, "visitor-42");
}

#[test]
fn mount_with_fallback_skips_hashing_without_forms() {
    let dom = MemoryDom::from_html("<body><button id=\"back-to-top\"></button></body>").unwrap();
    let host = MemoryHost::default();
    let page = Page::mount_with_fallback(&dom, &host, &UiConfig::default(), &traits()).unwrap();
    assert!(page.forms().is_empty());
    assert!(!Page::wants_fingerprint(&dom, &UiConfig::default()));
}
