use axum::response::IntoResponse;
use maud::{PreEscaped, html};

/// Browser client for the chat WebSocket protocol.
const CHAT_JS: &str = r#"
let socket = null;
let joined = false;
let typingTimer = null;
let isTyping = false;

const $ = (id) => document.getElementById(id);

function addLine(cls, html) {
    const el = document.createElement('div');
    el.className = cls;
    el.innerHTML = html;
    $('messages').appendChild(el);
    $('messages').scrollTop = $('messages').scrollHeight;
}

function esc(text) {
    const el = document.createElement('span');
    el.textContent = text;
    return el.innerHTML;
}

function connect() {
    const proto = location.protocol === 'https:' ? 'wss:' : 'ws:';
    socket = new WebSocket(proto + '//' + location.host + '/api/ws');

    socket.addEventListener('open', () => {
        const displayName = $('name').value.trim();
        socket.send(JSON.stringify({ type: 'Join', display_name: displayName }));
        joined = true;
        $('join-form').style.display = 'none';
        $('chat-form').style.display = 'flex';
        $('message').focus();
    });

    socket.addEventListener('message', (frame) => {
        const event = JSON.parse(frame.data);
        switch (event.type) {
            case 'Welcome':
                addLine('system', esc(event.greeting));
                break;
            case 'ParticipantJoined':
                addLine('system', esc(event.display_name) + ' has joined the chat');
                break;
            case 'ParticipantLeft':
                addLine('system', esc(event.display_name) + ' has left the chat');
                break;
            case 'Chat': {
                const when = new Date(event.sent_at).toLocaleTimeString();
                addLine('chat', '<b>' + esc(event.sender_display_name) + '</b> '
                    + '<small>' + when + '</small><br>' + esc(event.body));
                break;
            }
            case 'TypingUpdate':
                $('typing').textContent = event.typing.length
                    ? event.typing.join(', ') + (event.typing.length === 1 ? ' is' : ' are') + ' typing...'
                    : '';
                break;
        }
    });

    socket.addEventListener('close', () => {
        joined = false;
        addLine('system', 'Disconnected from the chat');
    });
}

function sendMessage(e) {
    e.preventDefault();
    const body = $('message').value.trim();
    if (!body || !joined) return;
    stopTyping();
    socket.send(JSON.stringify({ type: 'Chat', body: body }));
    $('message').value = '';
}

function stopTyping() {
    if (!isTyping) return;
    isTyping = false;
    clearTimeout(typingTimer);
    if (joined) socket.send(JSON.stringify({ type: 'TypingStop' }));
}

function handleTyping() {
    if (!joined) return;
    if (!isTyping) {
        isTyping = true;
        socket.send(JSON.stringify({ type: 'TypingStart' }));
    }
    clearTimeout(typingTimer);
    typingTimer = setTimeout(stopTyping, 2000);
}

document.addEventListener('DOMContentLoaded', () => {
    $('join-form').addEventListener('submit', (e) => {
        e.preventDefault();
        if ($('name').value.trim()) connect();
    });
    $('chat-form').addEventListener('submit', sendMessage);
    $('message').addEventListener('input', handleTyping);
});
"#;

pub async fn chat_page() -> impl IntoResponse {
    super::layout(
        "Plaza Chat",
        html! {
            h1 { "Plaza Chat" }
            form id="join-form" class="panel" style="display: flex; gap: 0.5rem;" {
                input id="name" type="text" placeholder="Display name" autocomplete="off";
                button type="submit" { "Join" }
            }
            div class="panel" style="margin-top: 1rem;" {
                div id="messages" style="height: 50vh; overflow-y: auto;" {}
                div id="typing" style="color: var(--muted); font-size: 0.9rem; min-height: 1.2rem;" {}
            }
            form id="chat-form" style="display: none; gap: 0.5rem; margin-top: 1rem;" {
                input id="message" type="text" placeholder="Say something" autocomplete="off" style="flex: 1;";
                button type="submit" { "Send" }
            }
            script { (PreEscaped(CHAT_JS)) }
        },
    )
}
