//! Embedded HTML/CSS/JS frontend for the dqai web dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>DataQualityAI</title>
<style>
:root {
  --bg: #0b0f19;
  --surface: #141a29;
  --border: #263046;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #00b0ff;
  --good: #00e676;
  --warn: #ffc400;
  --crit: #ff1744;
  --radius: 10px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

/* Navbar */
nav {
  display: flex;
  align-items: center;
  justify-content: space-between;
  padding: 14px 24px;
  background: var(--surface);
  border-bottom: 1px solid var(--border);
}
nav .brand { font-size: 18px; font-weight: 700; }
nav .brand span { color: var(--accent); font-family: var(--mono); }
nav .controls { display: flex; align-items: center; gap: 14px; }
nav select {
  background: var(--bg);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 6px 10px;
  font-size: 13px;
}
nav select:disabled { opacity: 0.5; cursor: not-allowed; }
.status {
  font-family: var(--mono);
  font-size: 12px;
  padding: 4px 10px;
  border-radius: 12px;
  border: 1px solid var(--good);
  color: var(--good);
}
.status.busy { border-color: var(--warn); color: var(--warn); }

/* Layout */
.app { max-width: 1100px; margin: 0 auto; padding: 32px 24px; }
.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
}
.card h3 {
  font-size: 12px;
  text-transform: uppercase;
  letter-spacing: 0.06em;
  color: var(--text-muted);
  margin-bottom: 14px;
}
.hidden { display: none !important; }

button.primary {
  background: var(--accent);
  color: #001018;
  border: none;
  border-radius: 6px;
  padding: 10px 18px;
  font-weight: 600;
  cursor: pointer;
}
button.primary:disabled { opacity: 0.5; cursor: not-allowed; }
button.ghost {
  background: transparent;
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 6px 12px;
  cursor: pointer;
}

/* Upload */
.dropzone {
  border: 2px dashed var(--border);
  border-radius: var(--radius);
  padding: 48px;
  text-align: center;
  cursor: pointer;
}
.dropzone.over { border-color: var(--accent); }
.dropzone p { color: var(--text-muted); margin-top: 6px; }
.file-row {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-top: 18px;
  gap: 12px;
}
.file-name { font-family: var(--mono); }
.profile-row {
  display: flex;
  align-items: center;
  gap: 10px;
  margin-bottom: 18px;
  color: var(--text-muted);
}
.profile-row select {
  background: var(--bg);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 6px 10px;
}

/* Loading */
.loading { text-align: center; padding: 80px 0; }
.spinner {
  width: 48px; height: 48px;
  margin: 0 auto 20px;
  border: 4px solid var(--border);
  border-top-color: var(--accent);
  border-radius: 50%;
  animation: spin 0.9s linear infinite;
}
@keyframes spin { to { transform: rotate(360deg); } }
.loading-msg { font-family: var(--mono); color: var(--accent); }

/* Results */
.grid { display: grid; grid-template-columns: 300px 1fr; gap: 20px; margin-bottom: 20px; }
.gauge { position: relative; width: 200px; height: 200px; margin: 0 auto; }
.gauge svg { transform: rotate(-90deg); }
.gauge .score {
  position: absolute; inset: 0;
  display: flex; flex-direction: column; align-items: center; justify-content: center;
}
.gauge .score b { font-size: 48px; line-height: 1; }
.gauge .score small { color: var(--text-muted); }
.dim { margin-bottom: 14px; }
.dim .head { display: flex; justify-content: space-between; margin-bottom: 4px; }
.dim .track { height: 8px; background: var(--bg); border-radius: 4px; overflow: hidden; }
.dim .fill { height: 100%; border-radius: 4px; }
.insight { white-space: pre-wrap; margin-bottom: 20px; }
.rec {
  border: 1px solid var(--border);
  border-radius: 8px;
  padding: 12px 14px;
  margin-bottom: 10px;
}
.rec .head { display: flex; justify-content: space-between; align-items: center; gap: 12px; }
.rec .fix {
  margin-top: 12px;
  padding-top: 12px;
  border-top: 1px solid var(--border);
}
.rec .fix h4 { font-size: 12px; color: var(--accent); margin-bottom: 6px; }
.rec .fix p { margin-bottom: 6px; font-family: var(--mono); font-size: 13px; }
.actions { text-align: center; margin-top: 24px; }

/* Chat */
.chat-toggle {
  position: fixed; right: 24px; bottom: 24px;
  width: 56px; height: 56px; border-radius: 50%;
  background: var(--accent); color: #001018; border: none;
  font-size: 22px; cursor: pointer;
}
.chat {
  position: fixed; right: 24px; bottom: 92px;
  width: 340px; height: 440px;
  display: flex; flex-direction: column;
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  overflow: hidden;
}
.chat header { padding: 12px 14px; border-bottom: 1px solid var(--border); font-weight: 600; }
.chat .log { flex: 1; overflow-y: auto; padding: 12px; }
.msg { max-width: 85%; padding: 8px 12px; border-radius: 10px; margin-bottom: 8px; white-space: pre-wrap; }
.msg.ai { background: var(--bg); }
.msg.user { background: var(--accent); color: #001018; margin-left: auto; }
.msg.typing { color: var(--text-muted); font-style: italic; }
.chat form { display: flex; border-top: 1px solid var(--border); }
.chat input {
  flex: 1; padding: 10px; border: none;
  background: var(--bg); color: var(--text);
}
.chat form button { border-radius: 0; }

/* Toast */
.toast {
  position: fixed; left: 50%; top: 20px; transform: translateX(-50%);
  background: var(--surface); border: 1px solid var(--border);
  padding: 10px 18px; border-radius: 8px;
  opacity: 0; transition: opacity 0.2s; pointer-events: none;
}
.toast.show { opacity: 1; }
.toast.error { border-color: var(--crit); color: var(--crit); }
</style>
</head>
<body>

<nav>
  <div class="brand">DataQuality<span>AI</span></div>
  <div class="controls">
    <select id="profile" disabled></select>
    <span class="status" id="status">ACTIVE</span>
  </div>
</nav>

<div class="app">
  <!-- Upload -->
  <section id="screen-upload" class="card">
    <div class="profile-row">
      <label for="upload-profile">Governance Profile:</label>
      <select id="upload-profile"></select>
    </div>
    <div class="dropzone" id="dropzone">
      <strong>Drop a CSV file here or click to browse</strong>
      <p>The dataset is scored by the governance agent you select.</p>
      <input type="file" id="file-input" accept=".csv" class="hidden">
    </div>
    <div class="file-row hidden" id="file-row">
      <span class="file-name" id="file-name"></span>
      <div>
        <button class="ghost" id="clear-file">Remove</button>
        <button class="primary" id="analyze"></button>
      </div>
    </div>
  </section>

  <!-- Loading -->
  <section id="screen-loading" class="loading hidden">
    <div class="spinner"></div>
    <div class="loading-msg" id="loading-msg"></div>
  </section>

  <!-- Results -->
  <section id="screen-results" class="hidden">
    <div class="grid">
      <div class="card">
        <h3>Data Quality Score</h3>
        <div class="gauge" id="gauge"></div>
      </div>
      <div class="card">
        <h3>Quality Dimensions</h3>
        <div id="dimensions"></div>
      </div>
    </div>
    <div class="card">
      <h3>GenAI Analyst</h3>
      <div class="insight" id="insight"></div>
      <h3>Suggested Fixes</h3>
      <div id="recommendations"></div>
    </div>
    <div class="actions">
      <button class="ghost" id="reset">Analyze Another Dataset</button>
    </div>
  </section>
</div>

<!-- Chat -->
<button class="chat-toggle" id="chat-toggle" title="Ask the AI">?</button>
<div class="chat hidden" id="chat">
  <header>DataQualityAI Assistant</header>
  <div class="log" id="chat-log"></div>
  <form id="chat-form">
    <input id="chat-input" autocomplete="off" placeholder="Ask about your data...">
    <button class="primary" type="submit">Send</button>
  </form>
</div>

<!-- Toast -->
<div class="toast" id="toast"></div>

<script>
// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
const LOADING_MESSAGES = [
  'Ingesting CSV stream...',
  'Detecting PII & Anonymizing...',
  'Consulting GenAI Agent...',
  'Calculating Dimensions...',
  'Generating Business Insights...',
];
let view = null;
let loadingTimer = null;
let pendingRows = new Set();
let chosenProfile = null;

// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body !== undefined) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  const data = await res.json();
  return { ok: res.ok, status: res.status, data };
}

function toast(msg, isError) {
  const el = document.getElementById('toast');
  el.textContent = msg;
  el.className = 'toast show' + (isError ? ' error' : '');
  setTimeout(() => el.className = 'toast', 3000);
}

async function refresh() {
  const res = await api('GET', '/api/state');
  if (res.ok) render(res.data);
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------
function render(v) {
  view = v;
  renderNav(v);
  showScreen(v.screen);
  renderUpload(v);
  if (v.result) renderResult(v.result);
  renderChat(v.chat);
}

function profileOptions(v, selected) {
  return v.profiles
    .map(p => `<option value="${p.tag}"${p.tag === selected ? ' selected' : ''}>${esc(p.label)}</option>`)
    .join('');
}

function renderNav(v) {
  const sel = document.getElementById('profile');
  sel.innerHTML = profileOptions(v, v.profile);
  sel.disabled = !v.profile_selector_enabled;
  const status = document.getElementById('status');
  status.textContent = v.status;
  status.className = 'status' + (v.screen === 'loading' ? ' busy' : '');
}

function showScreen(screen) {
  for (const name of ['upload', 'loading', 'results']) {
    document.getElementById('screen-' + name).classList.toggle('hidden', name !== screen);
  }
  if (screen === 'loading') startLoading(); else stopLoading();
}

function renderUpload(v) {
  if (!v.file_name || v.screen !== 'upload') chosenProfile = null;
  const profile = chosenProfile || v.profile;
  document.getElementById('upload-profile').innerHTML = profileOptions(v, profile);
  const row = document.getElementById('file-row');
  row.classList.toggle('hidden', !v.file_name);
  document.getElementById('file-name').textContent = v.file_name || '';
  document.getElementById('analyze').textContent = v.file_name ? analyzeLabel(profile) : '';
}

function analyzeLabel(profile) {
  return `Initialize ${profile.toUpperCase()} Agent`;
}

function renderResult(r) {
  const g = r.gauge;
  const circumference = 2 * Math.PI * 80;
  const filled = circumference * g.quality / 100;
  document.getElementById('gauge').innerHTML = `
    <svg width="200" height="200">
      <circle cx="100" cy="100" r="80" fill="none" stroke="#263046" stroke-width="16"/>
      <circle cx="100" cy="100" r="80" fill="none" stroke="${g.color}" stroke-width="16"
        stroke-dasharray="${filled} ${circumference - filled}"/>
    </svg>
    <div class="score"><b style="color:${g.color}">${esc(g.label)}</b><small>DQS</small></div>`;

  document.getElementById('dimensions').innerHTML = r.dimensions.map(d => `
    <div class="dim">
      <div class="head"><span>${esc(d.label)}</span><span style="color:${d.color}">${esc(d.score_text)}</span></div>
      <div class="track"><div class="fill" style="width:${d.width_pct}%;background:${d.color}"></div></div>
    </div>`).join('');

  document.getElementById('insight').textContent = r.insights;

  document.getElementById('recommendations').innerHTML = r.recommendations.map(rec => {
    const busy = rec.loading || pendingRows.has(rec.index);
    const label = busy ? 'Consulting AI...' : (rec.expanded ? 'Close' : 'Apply Fix');
    const fix = rec.expanded && rec.fix
      ? `<div class="fix"><h4>AI Implementation Guide:</h4>${rec.fix.map(p => `<p>${esc(p)}</p>`).join('')}</div>`
      : '';
    return `<div class="rec">
      <div class="head"><span>${esc(rec.text)}</span>
        <button class="ghost" data-index="${rec.index}"${busy ? ' disabled' : ''}>${label}</button></div>
      ${fix}</div>`;
  }).join('');
}

function renderChat(c) {
  const log = document.getElementById('chat-log');
  const items = c.messages.map(m => `<div class="msg ${m.sender}">${esc(m.text)}</div>`);
  if (c.typing) items.push(`<div class="msg ai typing">${esc(c.typing_indicator)}</div>`);
  log.innerHTML = items.join('');
  log.scrollTop = log.scrollHeight;
}

// ---------------------------------------------------------------------------
// Loading messages
// ---------------------------------------------------------------------------
function startLoading() {
  if (loadingTimer) return;
  let tick = 0;
  const el = document.getElementById('loading-msg');
  el.textContent = LOADING_MESSAGES[0];
  loadingTimer = setInterval(() => {
    tick += 1;
    el.textContent = LOADING_MESSAGES[tick % LOADING_MESSAGES.length];
  }, 800);
}

function stopLoading() {
  clearInterval(loadingTimer);
  loadingTimer = null;
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------
async function selectFile(file) {
  if (!file) return;
  if (!file.name.endsWith('.csv')) {
    toast('Please upload a CSV file.', true);
    return;
  }
  const res = await fetch('/api/file?name=' + encodeURIComponent(file.name), {
    method: 'POST',
    body: await file.arrayBuffer(),
  });
  const data = await res.json();
  if (!res.ok) {
    toast(data.warning || data.error, true);
    return;
  }
  render(data);
}

async function analyze(profile) {
  if (view && view.file_name) {
    view.screen = 'loading';
    view.status = 'ANALYZING...';
    view.profile_selector_enabled = false;
    renderNav(view);
    showScreen('loading');
  }
  const body = profile ? { profile } : {};
  const res = await api('POST', '/api/analyze', body);
  if (res.status === 502) {
    toast(res.data.error, true);
    render(res.data.state);
    return;
  }
  if (!res.ok) {
    toast(res.data.error, true);
    await refresh();
    return;
  }
  render(res.data);
}

async function toggleRow(index) {
  pendingRows.add(index);
  if (view && view.result) renderResult(view.result);
  const res = await api('POST', `/api/recommendations/${index}/toggle`);
  pendingRows.delete(index);
  if (res.ok) render(res.data); else await refresh();
}

async function sendChat(message) {
  if (!message.trim() || (view && view.chat.typing)) return;
  if (view) {
    view.chat.messages.push({ sender: 'user', text: message });
    view.chat.typing = true;
    view.chat.typing_indicator = 'AI is thinking...';
    renderChat(view.chat);
  }
  const res = await api('POST', '/api/chat', { message });
  if (res.ok) {
    view.chat = res.data.chat;
    renderChat(view.chat);
  } else {
    toast(res.data.error, true);
    await refresh();
  }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------
const dropzone = document.getElementById('dropzone');
const fileInput = document.getElementById('file-input');
dropzone.addEventListener('click', () => fileInput.click());
dropzone.addEventListener('dragover', e => { e.preventDefault(); dropzone.classList.add('over'); });
dropzone.addEventListener('dragleave', () => dropzone.classList.remove('over'));
dropzone.addEventListener('drop', e => {
  e.preventDefault();
  dropzone.classList.remove('over');
  selectFile(e.dataTransfer.files[0]);
});
fileInput.addEventListener('change', () => { selectFile(fileInput.files[0]); fileInput.value = ''; });

document.getElementById('clear-file').addEventListener('click', async () => {
  const res = await api('DELETE', '/api/file');
  if (res.ok) render(res.data);
});
document.getElementById('analyze').addEventListener('click', () => analyze(chosenProfile));
document.getElementById('upload-profile').addEventListener('change', e => {
  // Without a file the server only remembers the profile.
  if (!view || !view.file_name) {
    analyze(e.target.value);
    return;
  }
  chosenProfile = e.target.value;
  document.getElementById('analyze').textContent = analyzeLabel(chosenProfile);
});
document.getElementById('profile').addEventListener('change', e => analyze(e.target.value));
document.getElementById('reset').addEventListener('click', async () => {
  const res = await api('POST', '/api/reset');
  if (res.ok) render(res.data);
});
document.getElementById('recommendations').addEventListener('click', e => {
  const btn = e.target.closest('button[data-index]');
  if (btn) toggleRow(Number(btn.dataset.index));
});
document.getElementById('chat-toggle').addEventListener('click', () => {
  document.getElementById('chat').classList.toggle('hidden');
});
document.getElementById('chat-form').addEventListener('submit', e => {
  e.preventDefault();
  const input = document.getElementById('chat-input');
  const message = input.value;
  input.value = '';
  sendChat(message);
});

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------
function esc(s) {
  if (!s) return '';
  return String(s).replace(/&/g,'&amp;').replace(/</g,'&lt;').replace(/>/g,'&gt;').replace(/"/g,'&quot;');
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
refresh();
</script>
</body>
</html>"##;
