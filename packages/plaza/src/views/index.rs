use axum::response::IntoResponse;
use maud::html;

pub async fn index_page() -> impl IntoResponse {
    super::layout(
        "Plaza",
        html! {
            h1 { "Plaza" }
            p { "Real-time chat for the Plaza storefront." }
            div class="panel" {
                p { "The chat room is open to anyone with a display name - no account needed." }
                p { a href="/chat" { "Enter the chat room" } }
            }
            p style="color: var(--muted); font-size: 0.9rem;" {
                "Service endpoints: "
                a href="/health" { "/health" }
                " · "
                a href="/metrics" { "/metrics" }
                " · "
                a href="/api/chat/participants" { "/api/chat/participants" }
            }
        },
    )
}
