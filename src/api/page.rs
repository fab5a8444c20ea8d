//! HTML for the single chat view and the blocking credentials page.

use crate::chat::escape_html;

pub const MISSING_KEYS_ERROR: &str =
    "One or more API keys are missing. Please configure your secrets.";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 46rem; margin: 2rem auto; padding: 0 1rem; }
.msg { display: flex; gap: .75rem; padding: .6rem .8rem; border-radius: .5rem; margin: .4rem 0; }
.msg.user { background: #f0f2f6; }
.msg .role { font-weight: 600; min-width: 5.5rem; }
.msg .content { white-space: pre-wrap; }
.error { background: #fde8e8; color: #7d1a1a; padding: .8rem; border-radius: .5rem; margin: .5rem 0; }
.info { background: #e8f0fd; color: #1a3a7d; padding: .8rem; border-radius: .5rem; margin: .5rem 0; }
.warning { background: #fdf6e3; color: #7a5b00; padding: .6rem; border-radius: .5rem; margin: .4rem 0; }
#spinner { display: none; color: #666; margin: .5rem 0; }
form { display: flex; gap: .5rem; margin-top: 1rem; }
input { flex: 1; padding: .6rem; }
"#;

const HEADER: &str = r#"<h1>🌦️ Weather AI Chatbot</h1>
<p>Ask me anything about the current weather in any city!</p>"#;

const SCRIPT: &str = r#"
const log = document.getElementById('log');
const banners = document.getElementById('banners');
const spinner = document.getElementById('spinner');
const form = document.getElementById('chat');
const input = document.getElementById('prompt');

function escapeHtml(s) {
  return s.replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}[c]));
}

function render(messages) {
  log.innerHTML = messages.map(m =>
    `<div class="msg ${m.role}"><span class="role">${m.role}</span><div class="content">${escapeHtml(m.content)}</div></div>`
  ).join('\n');
}

function banner(kind, text) {
  const div = document.createElement('div');
  div.className = kind;
  div.textContent = text;
  banners.appendChild(div);
}

async function session() {
  let id = sessionStorage.getItem('weather-chat-session');
  if (id) {
    const res = await fetch(`/api/sessions/${id}`);
    if (res.ok) { render((await res.json()).messages); return id; }
  }
  const res = await fetch('/api/sessions', { method: 'POST' });
  const body = await res.json();
  sessionStorage.setItem('weather-chat-session', body.id);
  render(body.messages);
  return body.id;
}

const ready = session();

form.addEventListener('submit', async (event) => {
  event.preventDefault();
  const content = input.value;
  if (!content.trim()) return;
  const id = await ready;
  input.value = '';
  input.disabled = true;
  banners.innerHTML = '';
  log.insertAdjacentHTML('beforeend',
    `<div class="msg user"><span class="role">user</span><div class="content">${escapeHtml(content)}</div></div>`);
  spinner.style.display = 'block';
  try {
    const res = await fetch(`/api/sessions/${id}/messages`, {
      method: 'POST',
      headers: { 'content-type': 'application/json' },
      body: JSON.stringify({ content }),
    });
    const body = await res.json();
    if (!res.ok) { banner('error', body.error); return; }
    (body.warnings || []).forEach(w => banner('warning', w));
    if (body.banner) banner('error', body.banner);
    render(body.messages);
  } catch (err) {
    banner('error', `An error occurred: ${err}`);
  } finally {
    spinner.style.display = 'none';
    input.disabled = false;
    input.focus();
  }
});
"#;

/// The chat view.
pub fn chat_page() -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Weather AI Chatbot</title><style>{STYLE}</style></head>
<body>
{HEADER}
<div id="banners"></div>
<div id="log"></div>
<div id="spinner">Thinking...</div>
<form id="chat"><input id="prompt" autocomplete="off" placeholder="What is the weather like in London?"><button type="submit">Send</button></form>
<script>{SCRIPT}</script>
</body>
</html>"#
    )
}

/// Full-page error shown instead of the chat when credentials are missing.
pub fn missing_credentials_page(missing: &[&str]) -> String {
    let names = missing
        .iter()
        .map(|name| format!("<code>{}</code>", escape_html(name)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Weather AI Chatbot</title><style>{STYLE}</style></head>
<body>
{HEADER}
<div class="error">{MISSING_KEYS_ERROR}</div>
<div class="info">You need to set <code>GROQ_API_KEY</code> and <code>OPENWEATHER_API_KEY</code> in your secrets. Missing: {names}</div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_page_has_no_input() {
        let page = missing_credentials_page(&["GROQ_API_KEY"]);
        assert!(page.contains(MISSING_KEYS_ERROR));
        assert!(page.contains("Missing: <code>GROQ_API_KEY</code>"));
        assert!(!page.contains("<input"));
    }

    #[test]
    fn chat_page_has_input_and_spinner() {
        let page = chat_page();
        assert!(page.contains("placeholder=\"What is the weather like in London?\""));
        assert!(page.contains("Thinking..."));
    }
}
