mod chat;
mod index;

pub use chat::chat_page;
pub use index::index_page;

use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = r#"
:root { --bg: #0a0e1a; --panel: #16213e; --border: #2a3655; --accent: #4299e1; --text: #e2e8f0; --muted: #8795ab; }
* { box-sizing: border-box; }
body { margin: 0; background: var(--bg); color: var(--text); font-family: system-ui, sans-serif; }
a { color: var(--accent); }
.shell { max-width: 720px; margin: 0 auto; padding: 2rem 1rem; }
.panel { background: var(--panel); border: 1px solid var(--border); border-radius: 8px; padding: 1rem; }
button { background: var(--accent); color: #fff; border: none; border-radius: 6px; padding: 0.5rem 1rem; cursor: pointer; font-size: 1rem; }
button:hover { filter: brightness(1.1); }
input { background: var(--bg); color: var(--text); border: 1px solid var(--border); border-radius: 6px; padding: 0.5rem; font-size: 1rem; }
.system { color: var(--muted); font-style: italic; margin: 0.25rem 0; }
.chat { margin: 0.5rem 0; }
.chat small { color: var(--muted); }
"#;

/// Shared page skeleton: head with the site styles, body from the caller.
pub(crate) fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                title { (title) }
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                style { (PreEscaped(CSS)) }
            }
            body {
                div class="shell" { (body) }
            }
        }
    }
}
