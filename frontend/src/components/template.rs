use dioxus::prelude::*;

use crate::{components::search::CoinSearch, utils::dashboard::Dashboard};

static CSS: Asset = asset!("assets/template.css");

// Modified clicks (new tab, new window) are left to the browser.
#[component]
pub fn NavLink(to: String, #[props(default)] class: String, children: Element) -> Element {
  let dashboard = use_context::<Dashboard>();
  let href = dashboard.href(&to);

  rsx! {
    a {
      href: "{href}",
      class: "{class}",
      onclick: move |evt: MouseEvent| {
        if !evt.modifiers().is_empty() {
          return;
        }
        evt.prevent_default();
        dashboard.navigate(&to);
      },
      {children}
    }
  }
}

#[component]
pub fn Template(children: Element) -> Element {
  rsx! {
    document::Stylesheet {href: CSS},
    Header { }
    main {
      class: "page",
      {children}
    }
    Footer { }
  }
}

#[component]
fn Header() -> Element {
  rsx!{
    nav {
      div {
        class: "nav-container",
        NavLink {
          class: "logo",
          to: "/",
          "CoinPrice",
        }
        div {
          class: "nav-links",
          NavLink { to: "/", "Markets" },
          NavLink { to: "/trending", "Trending" },
          NavLink { to: "/portfolio", "Portfolio" },
          NavLink { to: "/marketcapof", "Market cap of" },
        }
        CoinSearch { }
      }
    }
  }
}

#[component]
fn Footer() -> Element {
  rsx!{
    footer {
      div {
        class: "footer-container",
        div {
          class: "copyright",
          p { "Market data by CoinGecko" }
        },
        div {
          class: "social-links",
          a {
            href: "https://www.coingecko.com/en/api",
            target: "_blank",
            class: "social-link",
            title: "Data source",
            svg {
              xmlns: "http://www.w3.org/2000/svg",
              width: "24",
              height: "24",
              view_box: "0 0 24 24",
              fill: "none",
              stroke: "currentcolor",
              stroke_width: "2",
              stroke_linecap: "round",
              stroke_linejoin: "round",
              circle { cx: "12", cy: "12", r: "10" }
              path { d: "M2 12h20M12 2a15.3 15.3 0 0 1 0 20M12 2a15.3 15.3 0 0 0 0 20" }
            }
          }
        }
      }
    }
  }
}
