//! UI Routes - landing page for langguard-web
//!
//! One submission form per media kind (vanilla JS, no frameworks). Language
//! selectors are filled from `/api/languages`; stage progress comes from the
//! `/events` stream.

use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::AppState;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(root_page))
}

/// Root page
async fn root_page() -> impl IntoResponse {
    Html(ROOT_PAGE)
}

const ROOT_PAGE: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>LangGuard - Media Translation</title>
    <style>
        body {
            font-family: system-ui, -apple-system, sans-serif;
            max-width: 900px;
            margin: 40px auto;
            padding: 20px;
            line-height: 1.6;
        }
        h1 {
            color: #333;
            border-bottom: 2px solid #0066cc;
            padding-bottom: 10px;
        }
        fieldset {
            border: 1px solid #ccc;
            border-radius: 4px;
            margin-bottom: 20px;
            padding: 15px;
        }
        legend { font-weight: bold; text-transform: capitalize; }
        label { display: block; margin: 6px 0; }
        .button {
            padding: 8px 18px;
            background: #0066cc;
            color: white;
            border: none;
            border-radius: 4px;
            cursor: pointer;
        }
        .button:hover { background: #0052a3; }
        .button:disabled { background: #999; }
        #progress { color: #555; font-size: 0.9em; min-height: 1.5em; }
        #result { display: none; background: #f5f5f5; padding: 15px; border-radius: 4px; }
        #result pre { white-space: pre-wrap; }
        .notice { color: #a15c00; }
        .error { color: #b00020; }
    </style>
</head>
<body>
    <h1>LangGuard</h1>
    <p>Upload a file or give a link. The text is extracted or transcribed,
       translated, and read aloud in the target language.</p>

    <div id="forms"></div>
    <div id="progress"></div>
    <div id="result"></div>

    <script>
        const KINDS = {
            audio: '.mp3,.wav,.m4a,.flac',
            document: '.pdf,.docx,.txt',
            video: '.mp4,.mov,.avi,.mkv',
            image: '.jpg,.jpeg,.png,.gif'
        };

        function escapeHtml(text) {
            const div = document.createElement('div');
            div.textContent = text;
            return div.innerHTML;
        }

        function languageOptions(languages, withAuto) {
            let html = withAuto ? '<option value="auto">Detect automatically</option>' : '';
            for (const lang of languages) {
                html += `<option value="${lang.code}">${escapeHtml(lang.name)}</option>`;
            }
            return html;
        }

        function buildForms(languages) {
            const container = document.getElementById('forms');
            for (const [kind, accept] of Object.entries(KINDS)) {
                const form = document.createElement('form');
                form.innerHTML = `
                    <fieldset>
                        <legend>${kind}</legend>
                        <label>File <input type="file" name="file" accept="${accept}"></label>
                        <label>or URL <input type="url" name="file_url" size="60"></label>
                        <label>From <select name="source_lang">${languageOptions(languages, true)}</select></label>
                        <label>To <select name="target_lang">${languageOptions(languages, false)}</select></label>
                        <button class="button" type="submit">Translate ${kind}</button>
                    </fieldset>`;
                form.addEventListener('submit', (event) => submit(event, kind, form));
                container.appendChild(form);
            }
        }

        async function submit(event, kind, form) {
            event.preventDefault();
            const button = form.querySelector('button');
            const result = document.getElementById('result');
            button.disabled = true;
            result.style.display = 'none';
            document.getElementById('progress').textContent = 'Processing...';

            try {
                const response = await fetch(`/translate/${kind}`, {
                    method: 'POST',
                    body: new FormData(form)
                });
                const body = await response.json();
                if (!response.ok) {
                    showError(body.error ? body.error.message : response.statusText);
                } else {
                    showResult(body);
                }
            } catch (err) {
                showError(err.message);
            } finally {
                button.disabled = false;
            }
        }

        function showError(message) {
            const result = document.getElementById('result');
            result.innerHTML = `<p class="error">${escapeHtml(message)}</p>`;
            result.style.display = 'block';
            document.getElementById('progress').textContent = '';
        }

        function showResult(r) {
            const percent = Math.round(r.confidence * 100);
            let html = `<p><strong>${escapeHtml(r.source_language.name)}</strong>
                        (${percent}% confidence) to <strong>${escapeHtml(r.target_language.name)}</strong></p>`;
            for (const notice of r.notices) {
                html += `<p class="notice">${escapeHtml(notice)}</p>`;
            }
            html += `<h3>Original</h3><pre>${escapeHtml(r.source_text)}</pre>`;
            if (r.has_translation) {
                html += `<h3>Translation</h3><pre>${escapeHtml(r.translated_text)}</pre>`;
            }
            if (r.artifacts.includes('audio')) {
                html += `<audio controls src="/download/audio/${r.session_id}"></audio>`;
            }
            html += '<p>';
            for (const artifact of r.artifacts) {
                html += `<a class="button" href="/download/${artifact}/${r.session_id}">Download ${artifact}</a> `;
            }
            html += '</p>';

            const result = document.getElementById('result');
            result.innerHTML = html;
            result.style.display = 'block';
        }

        function connectEvents() {
            const source = new EventSource('/events');
            source.addEventListener('StageCompleted', (event) => {
                const data = JSON.parse(event.data);
                document.getElementById('progress').textContent =
                    `Finished ${data.stage.replace('_', ' ')} (${data.elapsed_ms} ms)`;
            });
            source.addEventListener('SessionCompleted', () => {
                document.getElementById('progress').textContent = 'Done';
            });
        }

        fetch('/api/languages')
            .then((response) => response.json())
            .then((body) => buildForms(body.languages))
            .catch((err) => showError(`Could not load languages: ${err.message}`));
        connectEvents();
    </script>
</body>
</html>
"#;
