//! Chat page served at `/`

/// Index HTML template
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Mistral AI Chat</title>
    <link rel="icon" href="data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><text y='.9em' font-size='90'>🤖</text></svg>">
    <style>
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #f5f5f5;
            color: #333;
            line-height: 1.6;
            display: flex;
            min-height: 100vh;
        }
        aside {
            width: 280px;
            background: #2c3e50;
            color: white;
            padding: 20px;
            flex-shrink: 0;
        }
        aside h2 { font-size: 18px; margin-bottom: 16px; }
        aside h3 { font-size: 15px; margin: 20px 0 8px; }
        aside hr { border: none; border-top: 1px solid rgba(255,255,255,0.2); margin: 20px 0; }
        .clear-btn {
            width: 100%;
            background: #3498db;
            color: white;
            border: none;
            padding: 10px 20px;
            border-radius: 4px;
            cursor: pointer;
        }
        .clear-btn:hover { background: #2980b9; }
        .info {
            background: rgba(52,152,219,0.2);
            border-radius: 4px;
            padding: 12px;
            font-size: 14px;
        }
        .info ul { margin-left: 18px; }
        main {
            flex: 1;
            display: flex;
            flex-direction: column;
            max-width: 900px;
            margin: 0 auto;
            padding: 20px;
            width: 100%;
        }
        header h1 { font-size: 28px; }
        header p { color: #666; margin-bottom: 16px; }
        .notice {
            display: none;
            background: #f8d7da;
            color: #721c24;
            border-radius: 4px;
            padding: 12px;
            margin-bottom: 16px;
        }
        #messages { flex: 1; overflow-y: auto; padding-bottom: 20px; }
        .message {
            display: flex;
            gap: 12px;
            margin-bottom: 12px;
        }
        .avatar { font-size: 22px; width: 32px; text-align: center; }
        .bubble {
            background: white;
            border-radius: 8px;
            padding: 12px 16px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
            white-space: pre-wrap;
            word-wrap: break-word;
            flex: 1;
        }
        .message.user .bubble { background: #eaf2fb; }
        .thinking { color: #888; font-style: italic; }
        form { display: flex; gap: 8px; }
        #prompt {
            flex: 1;
            padding: 12px;
            border: 1px solid #ccc;
            border-radius: 8px;
            font-size: 15px;
        }
        #prompt:disabled { background: #eee; }
    </style>
</head>
<body>
    <aside>
        <h2>⚙️ Settings</h2>
        <button class="clear-btn" id="clear">🔄 Clear Chat History</button>
        <hr>
        <h3>About</h3>
        <div class="info">
            This app uses:
            <ul>
                <li><span id="model-name">Mistral</span> model via Ollama</li>
                <li>A conversation buffer for memory</li>
                <li>A local web interface</li>
            </ul>
        </div>
    </aside>
    <main>
        <header>
            <h1>🤖 Mistral AI Chat Assistant</h1>
            <p>Chat with your local Mistral model powered by Ollama</p>
        </header>
        <div class="notice" id="notice"></div>
        <div id="messages"></div>
        <form id="chat-form">
            <input id="prompt" autocomplete="off" placeholder="What would you like to ask?">
        </form>
    </main>
    <script>
        const SESSION_KEY = 'mistral-chat-session';
        let sessionId = sessionStorage.getItem(SESSION_KEY);

        const messagesEl = document.getElementById('messages');
        const promptEl = document.getElementById('prompt');

        function appendMessage(role, content, extraClass) {
            const row = document.createElement('div');
            row.className = 'message ' + role;
            const avatar = document.createElement('div');
            avatar.className = 'avatar';
            avatar.textContent = role === 'user' ? '🧑' : '🤖';
            const bubble = document.createElement('div');
            bubble.className = 'bubble' + (extraClass ? ' ' + extraClass : '');
            bubble.textContent = content;
            row.appendChild(avatar);
            row.appendChild(bubble);
            messagesEl.appendChild(row);
            messagesEl.scrollTop = messagesEl.scrollHeight;
            return bubble;
        }

        function render(messages) {
            messagesEl.innerHTML = '';
            messages.forEach(m => appendMessage(m.role, m.content));
        }

        async function createSession() {
            const res = await fetch('/api/sessions', { method: 'POST' });
            const body = await res.json();
            sessionId = body.session_id;
            sessionStorage.setItem(SESSION_KEY, sessionId);
            render([]);
        }

        async function loadSession() {
            if (sessionId) {
                const res = await fetch('/api/sessions/' + sessionId + '/messages');
                if (res.ok) {
                    render(await res.json());
                    return;
                }
            }
            await createSession();
        }

        async function loadStatus() {
            const res = await fetch('/api/status');
            if (!res.ok) return;
            const status = await res.json();
            if (status.model) {
                document.getElementById('model-name').textContent = status.model;
            }
            if (!status.ready) {
                const notice = document.getElementById('notice');
                notice.textContent = status.error || 'Model not initialized. Please check your Ollama setup.';
                notice.style.display = 'block';
            }
        }

        document.getElementById('chat-form').addEventListener('submit', async (e) => {
            e.preventDefault();
            const content = promptEl.value;
            if (!content.trim()) return;

            promptEl.value = '';
            promptEl.disabled = true;
            appendMessage('user', content);
            const pending = appendMessage('assistant', 'Thinking...', 'thinking');

            try {
                let res = await fetch('/api/sessions/' + sessionId + '/messages', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ content })
                });
                if (res.status === 404) {
                    // server restarted: the old session is gone
                    await createSession();
                    appendMessage('user', content);
                    res = await fetch('/api/sessions/' + sessionId + '/messages', {
                        method: 'POST',
                        headers: { 'Content-Type': 'application/json' },
                        body: JSON.stringify({ content })
                    });
                    const body = await res.json();
                    appendMessage('assistant', body.reply ? body.reply.content : body.error);
                    return;
                }
                const body = await res.json();
                pending.classList.remove('thinking');
                pending.textContent = res.ok ? body.reply.content : body.error;
            } catch (err) {
                pending.classList.remove('thinking');
                pending.textContent = 'Error generating response: ' + err;
            } finally {
                promptEl.disabled = false;
                promptEl.focus();
            }
        });

        document.getElementById('clear').addEventListener('click', async () => {
            if (sessionId) {
                await fetch('/api/sessions/' + sessionId + '/history', { method: 'DELETE' });
            }
            await loadSession();
        });

        // closing the tab ends the session
        window.addEventListener('pagehide', () => {
            if (!sessionId) return;
            fetch('/api/sessions/' + sessionId, { method: 'DELETE', keepalive: true });
            sessionStorage.removeItem(SESSION_KEY);
            sessionId = null;
        });

        loadStatus();
        loadSession();
    </script>
</body>
</html>
"#;
